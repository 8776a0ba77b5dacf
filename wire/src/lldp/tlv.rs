use crate::err::LldpError;
use crate::mac::MacAddress;

/// Read an LLDP TLV header (7-bit type, 9-bit length packed into 2 bytes)
/// from the front of `slice`.
fn read_header(slice: &[u8]) -> Result<(u8, usize), LldpError> {
    if slice.len() < 2 {
        return Err(LldpError::UnexpectedEnd { read_so_far: slice.len() });
    }
    let word = u16::from_be_bytes([slice[0], slice[1]]);
    let tlv_type = (word >> 9) as u8;
    let length = (word & 0x01FF) as usize;
    Ok((tlv_type, length))
}

fn write_header(out: &mut Vec<u8>, tlv_type: u8, length: usize) {
    let word = ((tlv_type as u16) << 9) | (length as u16 & 0x01FF);
    out.extend_from_slice(&word.to_be_bytes());
}

/// Chassis ID subtype. The bridge-discovery payload always uses
/// `MacAddress`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChassisIdSubtype {
    MacAddress,
}

impl ChassisIdSubtype {
    const fn code(self) -> u8 {
        match self {
            ChassisIdSubtype::MacAddress => 4,
        }
    }

    fn from_code(v: u8) -> Result<Self, LldpError> {
        match v {
            4 => Ok(ChassisIdSubtype::MacAddress),
            other => Err(LldpError::InvalidChassisIdSubtype(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChassisIdTlv {
    pub mac_address: MacAddress,
}

impl ChassisIdTlv {
    pub const TYPE: u8 = 1;

    pub fn parse(slice: &[u8]) -> Result<(ChassisIdTlv, &[u8]), LldpError> {
        let (tlv_type, length) = read_header(slice)?;
        if tlv_type != Self::TYPE || length != 7 {
            return Err(LldpError::LengthExceedsSlice { tlv_type, length: length as u16, remaining: slice.len() });
        }
        let value = &slice[2..2 + length];
        ChassisIdSubtype::from_code(value[0])?;
        let mac_address = MacAddress::from_slice(&value[1..7]).unwrap();
        Ok((ChassisIdTlv { mac_address }, &slice[2 + length..]))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        write_header(out, Self::TYPE, 7);
        out.push(ChassisIdSubtype::MacAddress.code());
        out.extend_from_slice(&self.mac_address.octets());
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PortIdSubtype {
    MacAddress,
}

impl PortIdSubtype {
    const fn code(self) -> u8 {
        match self {
            PortIdSubtype::MacAddress => 3,
        }
    }

    fn from_code(v: u8) -> Result<Self, LldpError> {
        match v {
            3 => Ok(PortIdSubtype::MacAddress),
            other => Err(LldpError::InvalidPortIdSubtype(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PortIdTlv {
    pub mac_address: MacAddress,
}

impl PortIdTlv {
    pub const TYPE: u8 = 2;

    pub fn parse(slice: &[u8]) -> Result<(PortIdTlv, &[u8]), LldpError> {
        let (tlv_type, length) = read_header(slice)?;
        if tlv_type != Self::TYPE || length != 7 {
            return Err(LldpError::LengthExceedsSlice { tlv_type, length: length as u16, remaining: slice.len() });
        }
        let value = &slice[2..2 + length];
        PortIdSubtype::from_code(value[0])?;
        let mac_address = MacAddress::from_slice(&value[1..7]).unwrap();
        Ok((PortIdTlv { mac_address }, &slice[2 + length..]))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        write_header(out, Self::TYPE, 7);
        out.push(PortIdSubtype::MacAddress.code());
        out.extend_from_slice(&self.mac_address.octets());
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeToLiveTlv {
    pub seconds: u16,
}

impl TimeToLiveTlv {
    pub const TYPE: u8 = 3;

    /// The bridge-discovery payload always advertises a fixed TTL.
    pub const DEFAULT_SECONDS: u16 = 180;

    pub fn parse(slice: &[u8]) -> Result<(TimeToLiveTlv, &[u8]), LldpError> {
        let (tlv_type, length) = read_header(slice)?;
        if tlv_type != Self::TYPE || length != 2 {
            return Err(LldpError::LengthExceedsSlice { tlv_type, length: length as u16, remaining: slice.len() });
        }
        let seconds = u16::from_be_bytes([slice[2], slice[3]]);
        Ok((TimeToLiveTlv { seconds }, &slice[4..]))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        write_header(out, Self::TYPE, 2);
        out.extend_from_slice(&self.seconds.to_be_bytes());
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EndOfLldppduTlv;

impl EndOfLldppduTlv {
    pub const TYPE: u8 = 0;

    pub fn parse(slice: &[u8]) -> Result<(EndOfLldppduTlv, &[u8]), LldpError> {
        let (tlv_type, length) = read_header(slice)?;
        if tlv_type != Self::TYPE || length != 0 {
            return Err(LldpError::LengthExceedsSlice { tlv_type, length: length as u16, remaining: slice.len() });
        }
        Ok((EndOfLldppduTlv, &slice[2..]))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        write_header(out, Self::TYPE, 0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chassis_id_round_trip() {
        let t = ChassisIdTlv { mac_address: MacAddress::new([1; 6]) };
        let mut buf = Vec::new();
        t.write(&mut buf);
        let (parsed, rest) = ChassisIdTlv::parse(&buf).unwrap();
        assert_eq!(parsed, t);
        assert!(rest.is_empty());
    }

    #[test]
    fn ttl_default_round_trip() {
        let t = TimeToLiveTlv { seconds: TimeToLiveTlv::DEFAULT_SECONDS };
        let mut buf = Vec::new();
        t.write(&mut buf);
        let (parsed, _) = TimeToLiveTlv::parse(&buf).unwrap();
        assert_eq!(parsed, t);
    }
}
