use map1905_defrag::ReassemblyError;
use map1905_wire::err::CmduError;

/// Errors surfaced while dispatching a CMDU.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("CMDU received on an interface that is not authenticated")]
    NotAuthenticated,

    #[error("CMDU originated from the local AL-MAC address")]
    Loopback,

    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),

    #[error(transparent)]
    Codec(#[from] CmduError),

    #[error("no interface found for MAC {0}")]
    UnknownInterface(map1905_wire::mac::MacAddress),
}

/// Errors constructing a [`crate::config::Config`] from CLI arguments.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--al-mac is required")]
    MissingAlMac,

    #[error("'{0}' is not a valid MAC address (expected six colon-separated hex octets)")]
    InvalidAlMac(String),

    #[error("no usable interfaces were reported by the platform")]
    NoInterfaces,
}

/// Errors talking to the platform I/O capability.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("failed to send on interface {interface}: {reason}")]
    SendFailed { interface: String, reason: String },

    #[error("interface {0} reported a receive error")]
    ReceiveFailed(String),

    #[error("no such interface: {0}")]
    NoSuchInterface(String),
}

/// Process exit codes, mirroring the CLI surface's documented contract.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum ExitCode {
    Normal = 0,
    OsFailure = 1,
    InvalidArguments = 2,
    NoInterfaces = 3,
    InterfaceError = 4,
    ProtocolExtensionFailure = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as u8 as i32
    }
}
