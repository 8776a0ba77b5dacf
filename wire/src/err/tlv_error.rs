use core::fmt;

/// Error parsing or forging a single TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TlvError {
    /// Not enough bytes remained to read the 3-byte `type`/`length` header.
    UnexpectedEnd { read_so_far: usize },

    /// The TLV's `length` field claims more payload bytes than are actually
    /// present in the buffer.
    LengthExceedsSlice { tlv_type: u8, length: u16, remaining: usize },

    /// A TLV who's type is known had a payload that didn't decode into the
    /// shape the type requires (wrong fixed-size length, bad count field,
    /// trailing garbage, etc).
    InvalidPayload { tlv_type: u8, reason: &'static str },

    /// A value to be forged does not fit in the TLV's length field (length is
    /// a u16, so payload > 65535 bytes cannot be represented).
    PayloadTooLarge { tlv_type: u8, len: usize },
}

impl fmt::Display for TlvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlvError::UnexpectedEnd { read_so_far } => write!(
                f,
                "unexpected end of buffer while reading a TLV header ({read_so_far} bytes available)"
            ),
            TlvError::LengthExceedsSlice { tlv_type, length, remaining } => write!(
                f,
                "TLV type {tlv_type:#04x} declares length {length} but only {remaining} bytes remain"
            ),
            TlvError::InvalidPayload { tlv_type, reason } => {
                write!(f, "TLV type {tlv_type:#04x} has an invalid payload: {reason}")
            }
            TlvError::PayloadTooLarge { tlv_type, len } => write!(
                f,
                "TLV type {tlv_type:#04x} payload of {len} bytes does not fit in a 16 bit length field"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TlvError {}
