use core::fmt;

use crate::err::TlvError;

/// Error parsing or forging a CMDU (header + TLV stream).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CmduError {
    /// Fewer than 8 bytes were available for the CMDU header.
    HeaderTooShort { len: usize },

    /// The header's `message_version` byte was not one this codec knows.
    UnsupportedVersion(u8),

    /// A TLV inside the CMDU's TLV stream failed to parse.
    Tlv(TlvError),

    /// The TLV stream did not end with an End-of-message TLV.
    MissingEndOfMessage,

    /// A CMDU's TLV stream, once forged, would not fit in a single 1500-byte
    /// Ethernet payload and the caller asked for a non-fragmenting forge.
    ExceedsSingleFragment { len: usize },
}

impl fmt::Display for CmduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmduError::HeaderTooShort { len } => {
                write!(f, "CMDU header requires 8 bytes, only {len} available")
            }
            CmduError::UnsupportedVersion(v) => {
                write!(f, "unsupported CMDU message_version {v:#04x}")
            }
            CmduError::Tlv(e) => write!(f, "{e}"),
            CmduError::MissingEndOfMessage => {
                write!(f, "CMDU TLV stream is missing a terminating End of message TLV")
            }
            CmduError::ExceedsSingleFragment { len } => write!(
                f,
                "CMDU TLV stream of {len} bytes exceeds a single 1500-byte fragment"
            ),
        }
    }
}

impl From<TlvError> for CmduError {
    fn from(e: TlvError) -> CmduError {
        CmduError::Tlv(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CmduError {}
