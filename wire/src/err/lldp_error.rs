use core::fmt;

/// Error parsing or forging an LLDP bridge-discovery payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LldpError {
    UnexpectedEnd { read_so_far: usize },
    LengthExceedsSlice { tlv_type: u8, length: u16, remaining: usize },
    InvalidChassisIdSubtype(u8),
    InvalidPortIdSubtype(u8),
    MissingEndOfLldppdu,
}

impl fmt::Display for LldpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LldpError::UnexpectedEnd { read_so_far } => write!(
                f,
                "unexpected end of buffer while reading an LLDP TLV header ({read_so_far} bytes available)"
            ),
            LldpError::LengthExceedsSlice { tlv_type, length, remaining } => write!(
                f,
                "LLDP TLV type {tlv_type} declares length {length} but only {remaining} bytes remain"
            ),
            LldpError::InvalidChassisIdSubtype(v) => {
                write!(f, "unsupported LLDP chassis id subtype {v}")
            }
            LldpError::InvalidPortIdSubtype(v) => {
                write!(f, "unsupported LLDP port id subtype {v}")
            }
            LldpError::MissingEndOfLldppdu => {
                write!(f, "LLDPDU is missing a terminating End Of LLDPDU TLV")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LldpError {}
