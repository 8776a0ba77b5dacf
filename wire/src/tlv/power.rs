use crate::err::TlvError;
use crate::mac::MacAddress;

/// An interface's power state, restored from the original source's implicit
/// `PWR_STATE_*` enum (see SPEC_FULL §2). The forwarder only relays through
/// interfaces in `On` or `Save`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerState {
    On,
    Save,
    Off,
}

impl PowerState {
    pub const fn requested_code(self) -> u8 {
        match self {
            PowerState::On => 0x00,
            PowerState::Save => 0x01,
            PowerState::Off => 0x02,
        }
    }

    pub const fn from_requested_code(tlv_type: u8, v: u8) -> Result<Self, TlvError> {
        match v {
            0x00 => Ok(PowerState::On),
            0x01 => Ok(PowerState::Save),
            0x02 => Ok(PowerState::Off),
            _ => Err(TlvError::InvalidPayload { tlv_type, reason: "unknown power state code" }),
        }
    }
}

/// A single interface powered off via a power-off interface TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PowerOffEntry {
    pub mac_address: MacAddress,
    pub media_type: u16,
    pub generic_phy_oui: [u8; 3],
    pub generic_phy_variant_index: u8,
    pub generic_phy_info: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct PowerOffInterfaceTlv {
    pub interfaces: Vec<PowerOffEntry>,
}

impl PowerOffInterfaceTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 27;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "expected at least 1 byte (count)" });
        }
        let count = value[0] as usize;
        let mut rest = &value[1..];
        let mut interfaces = Vec::with_capacity(count);
        for _ in 0..count {
            if rest.len() < 12 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "power-off entry truncated before generic phy info length",
                });
            }
            let mac_address = MacAddress::from_slice(&rest[0..6]).unwrap();
            let media_type = u16::from_be_bytes([rest[6], rest[7]]);
            let mut generic_phy_oui = [0u8; 3];
            generic_phy_oui.copy_from_slice(&rest[8..11]);
            let generic_phy_variant_index = rest[11];
            let info_len = rest[12] as usize;
            if rest.len() < 13 + info_len {
                return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "generic phy info truncated" });
            }
            let generic_phy_info = rest[13..13 + info_len].to_vec();
            interfaces.push(PowerOffEntry {
                mac_address,
                media_type,
                generic_phy_oui,
                generic_phy_variant_index,
                generic_phy_info,
            });
            rest = &rest[13 + info_len..];
        }
        Ok(PowerOffInterfaceTlv { interfaces })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.interfaces.len() as u8);
        for e in &self.interfaces {
            out.extend_from_slice(&e.mac_address.octets());
            out.extend_from_slice(&e.media_type.to_be_bytes());
            out.extend_from_slice(&e.generic_phy_oui);
            out.push(e.generic_phy_variant_index);
            out.push(e.generic_phy_info.len() as u8);
            out.extend_from_slice(&e.generic_phy_info);
        }
    }
}

/// A single interface named in an interface power change request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerChangeRequest {
    pub mac_address: MacAddress,
    pub requested_power_state: PowerState,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct InterfacePowerChangeInformationTlv {
    pub requests: Vec<PowerChangeRequest>,
}

impl InterfacePowerChangeInformationTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 28;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "expected at least 1 byte (count)" });
        }
        let count = value[0] as usize;
        let rest = &value[1..];
        if rest.len() != count * 7 {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "entry count does not match payload length" });
        }
        let mut requests = Vec::with_capacity(count);
        for chunk in rest.chunks_exact(7) {
            requests.push(PowerChangeRequest {
                mac_address: MacAddress::from_slice(&chunk[..6]).unwrap(),
                requested_power_state: PowerState::from_requested_code(TYPE, chunk[6])?,
            });
        }
        Ok(InterfacePowerChangeInformationTlv { requests })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.requests.len() as u8);
        for r in &self.requests {
            out.extend_from_slice(&r.mac_address.octets());
            out.push(r.requested_power_state.requested_code());
        }
    }
}

/// Result of a single interface's requested power change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerChangeResult {
    Completed,
    NoChange,
    AlternateState(PowerState),
}

impl PowerChangeResult {
    const fn code(self) -> u8 {
        match self {
            PowerChangeResult::Completed => 0x00,
            PowerChangeResult::NoChange => 0x01,
            PowerChangeResult::AlternateState(s) => 0x10 | s.requested_code(),
        }
    }

    fn from_code(tlv_type: u8, v: u8) -> Result<Self, TlvError> {
        match v {
            0x00 => Ok(PowerChangeResult::Completed),
            0x01 => Ok(PowerChangeResult::NoChange),
            other if other & 0x10 != 0 => {
                Ok(PowerChangeResult::AlternateState(PowerState::from_requested_code(tlv_type, other & 0x0F)?))
            }
            _ => Err(TlvError::InvalidPayload { tlv_type, reason: "unknown power change result code" }),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerChangeStatus {
    pub mac_address: MacAddress,
    pub result: PowerChangeResult,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct InterfacePowerChangeStatusTlv {
    pub statuses: Vec<PowerChangeStatus>,
}

impl InterfacePowerChangeStatusTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 29;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "expected at least 1 byte (count)" });
        }
        let count = value[0] as usize;
        let rest = &value[1..];
        if rest.len() != count * 7 {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "entry count does not match payload length" });
        }
        let mut statuses = Vec::with_capacity(count);
        for chunk in rest.chunks_exact(7) {
            statuses.push(PowerChangeStatus {
                mac_address: MacAddress::from_slice(&chunk[..6]).unwrap(),
                result: PowerChangeResult::from_code(TYPE, chunk[6])?,
            });
        }
        Ok(InterfacePowerChangeStatusTlv { statuses })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.statuses.len() as u8);
        for s in &self.statuses {
            out.extend_from_slice(&s.mac_address.octets());
            out.push(s.result.code());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn power_change_information_round_trip() {
        let t = InterfacePowerChangeInformationTlv {
            requests: vec![PowerChangeRequest {
                mac_address: MacAddress::new([1; 6]),
                requested_power_state: PowerState::Save,
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(InterfacePowerChangeInformationTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn power_change_status_round_trip() {
        let t = InterfacePowerChangeStatusTlv {
            statuses: vec![PowerChangeStatus {
                mac_address: MacAddress::new([1; 6]),
                result: PowerChangeResult::AlternateState(PowerState::On),
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(InterfacePowerChangeStatusTlv::from_value(&buf).unwrap(), t);
    }
}
