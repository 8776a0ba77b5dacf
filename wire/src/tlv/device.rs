use crate::err::TlvError;
use crate::mac::MacAddress;

/// A single local interface entry inside a [`DeviceInformationTlv`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalInterface {
    pub mac_address: MacAddress,
    pub media_type: u16,
    pub media_specific_info: Vec<u8>,
}

/// Device information TLV: the AL's own MAC address plus one entry per local
/// 1905 interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceInformationTlv {
    pub al_mac_address: MacAddress,
    pub local_interfaces: Vec<LocalInterface>,
}

impl DeviceInformationTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 3;
        if value.len() < 7 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 7 bytes (AL MAC + interface count)",
            });
        }
        let al_mac_address = MacAddress::from_slice(&value[..6]).unwrap();
        let count = value[6] as usize;
        let mut rest = &value[7..];
        let mut local_interfaces = Vec::with_capacity(count);
        for _ in 0..count {
            if rest.len() < 9 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "interface entry truncated before media-specific length",
                });
            }
            let mac_address = MacAddress::from_slice(&rest[..6]).unwrap();
            let media_type = u16::from_be_bytes([rest[6], rest[7]]);
            let info_len = rest[8] as usize;
            if rest.len() < 9 + info_len {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "interface entry's media-specific info is truncated",
                });
            }
            let media_specific_info = rest[9..9 + info_len].to_vec();
            local_interfaces.push(LocalInterface { mac_address, media_type, media_specific_info });
            rest = &rest[9 + info_len..];
        }
        Ok(DeviceInformationTlv { al_mac_address, local_interfaces })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.al_mac_address.octets());
        out.push(self.local_interfaces.len() as u8);
        for iface in &self.local_interfaces {
            out.extend_from_slice(&iface.mac_address.octets());
            out.extend_from_slice(&iface.media_type.to_be_bytes());
            out.push(iface.media_specific_info.len() as u8);
            out.extend_from_slice(&iface.media_specific_info);
        }
    }
}

/// A bridged group of MAC addresses, one entry in a
/// [`DeviceBridgingCapabilityTlv`].
pub type BridgingTuple = Vec<MacAddress>;

/// Device bridging capability TLV: groups of local interfaces the AL has
/// bridged together.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct DeviceBridgingCapabilityTlv {
    pub bridging_tuples: Vec<BridgingTuple>,
}

impl DeviceBridgingCapabilityTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 4;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 1 byte (tuple count)",
            });
        }
        let tuple_count = value[0] as usize;
        let mut rest = &value[1..];
        let mut bridging_tuples = Vec::with_capacity(tuple_count);
        for _ in 0..tuple_count {
            if rest.is_empty() {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "tuple list truncated before a MAC count byte",
                });
            }
            let mac_count = rest[0] as usize;
            rest = &rest[1..];
            if rest.len() < mac_count * 6 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "tuple's MAC address list is truncated",
                });
            }
            let mut tuple = Vec::with_capacity(mac_count);
            for chunk in rest[..mac_count * 6].chunks_exact(6) {
                tuple.push(MacAddress::from_slice(chunk).unwrap());
            }
            bridging_tuples.push(tuple);
            rest = &rest[mac_count * 6..];
        }
        Ok(DeviceBridgingCapabilityTlv { bridging_tuples })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.bridging_tuples.len() as u8);
        for tuple in &self.bridging_tuples {
            out.push(tuple.len() as u8);
            for mac in tuple {
                out.extend_from_slice(&mac.octets());
            }
        }
    }
}

fn read_fixed_str(tlv_type: u8, bytes: &[u8]) -> Result<String, TlvError> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    core::str::from_utf8(&bytes[..end])
        .map(str::to_owned)
        .map_err(|_| TlvError::InvalidPayload { tlv_type, reason: "not valid UTF-8" })
}

fn write_fixed_str(out: &mut Vec<u8>, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    out.extend_from_slice(&bytes[..n]);
    out.resize(out.len() + (width - n), 0);
}

/// Device identification TLV: fixed-width, NUL-padded friendly/manufacturer
/// strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceIdentificationTlv {
    pub friendly_name: String,
    pub manufacturer_name: String,
    pub manufacturer_model: String,
}

impl DeviceIdentificationTlv {
    const FIELD_WIDTH: usize = 64;

    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 21;
        if value.len() != Self::FIELD_WIDTH * 3 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected exactly 192 bytes (three 64-byte fields)",
            });
        }
        Ok(DeviceIdentificationTlv {
            friendly_name: read_fixed_str(TYPE, &value[0..64])?,
            manufacturer_name: read_fixed_str(TYPE, &value[64..128])?,
            manufacturer_model: read_fixed_str(TYPE, &value[128..192])?,
        })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        write_fixed_str(out, &self.friendly_name, Self::FIELD_WIDTH);
        write_fixed_str(out, &self.manufacturer_name, Self::FIELD_WIDTH);
        write_fixed_str(out, &self.manufacturer_model, Self::FIELD_WIDTH);
    }
}

/// A single interface's generic-phy identity, as reported by
/// [`GenericPhyDeviceInformationTlv`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenericPhyInterface {
    pub mac_address: MacAddress,
    pub oui: [u8; 3],
    pub variant_index: u8,
    pub variant_name: String,
    pub media_specific_info: Vec<u8>,
}

/// Generic phy device information TLV, used by interfaces whose media type
/// code is `0xFFFF` (media-type-unknown) to self-describe.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenericPhyDeviceInformationTlv {
    pub al_mac_address: MacAddress,
    pub interfaces: Vec<GenericPhyInterface>,
}

impl GenericPhyDeviceInformationTlv {
    const VARIANT_NAME_WIDTH: usize = 32;

    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 20;
        if value.len() < 7 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 7 bytes (AL MAC + interface count)",
            });
        }
        let al_mac_address = MacAddress::from_slice(&value[..6]).unwrap();
        let count = value[6] as usize;
        let mut rest = &value[7..];
        let mut interfaces = Vec::with_capacity(count);
        for _ in 0..count {
            let header_len = 6 + 3 + 1 + Self::VARIANT_NAME_WIDTH + 1;
            if rest.len() < header_len {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "generic phy interface entry truncated",
                });
            }
            let mac_address = MacAddress::from_slice(&rest[0..6]).unwrap();
            let mut oui = [0u8; 3];
            oui.copy_from_slice(&rest[6..9]);
            let variant_index = rest[9];
            let variant_name = read_fixed_str(TYPE, &rest[10..10 + Self::VARIANT_NAME_WIDTH])?;
            let info_len = rest[header_len - 1] as usize;
            if rest.len() < header_len + info_len {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "generic phy interface media-specific info truncated",
                });
            }
            let media_specific_info = rest[header_len..header_len + info_len].to_vec();
            interfaces.push(GenericPhyInterface {
                mac_address,
                oui,
                variant_index,
                variant_name,
                media_specific_info,
            });
            rest = &rest[header_len + info_len..];
        }
        Ok(GenericPhyDeviceInformationTlv { al_mac_address, interfaces })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.al_mac_address.octets());
        out.push(self.interfaces.len() as u8);
        for iface in &self.interfaces {
            out.extend_from_slice(&iface.mac_address.octets());
            out.extend_from_slice(&iface.oui);
            out.push(iface.variant_index);
            write_fixed_str(out, &iface.variant_name, Self::VARIANT_NAME_WIDTH);
            out.push(iface.media_specific_info.len() as u8);
            out.extend_from_slice(&iface.media_specific_info);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn device_information_round_trip_no_interfaces() {
        let t = DeviceInformationTlv {
            al_mac_address: MacAddress::new([1, 2, 3, 4, 5, 6]),
            local_interfaces: vec![],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(DeviceInformationTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn device_information_round_trip_with_interfaces() {
        let t = DeviceInformationTlv {
            al_mac_address: MacAddress::new([1, 2, 3, 4, 5, 6]),
            local_interfaces: vec![LocalInterface {
                mac_address: MacAddress::new([6, 5, 4, 3, 2, 1]),
                media_type: 0x0100,
                media_specific_info: vec![0xAA, 0xBB],
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(DeviceInformationTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn bridging_capability_round_trip() {
        let t = DeviceBridgingCapabilityTlv {
            bridging_tuples: vec![
                vec![MacAddress::new([1; 6]), MacAddress::new([2; 6])],
                vec![MacAddress::new([3; 6])],
            ],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(DeviceBridgingCapabilityTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn device_identification_round_trip() {
        let t = DeviceIdentificationTlv {
            friendly_name: "living-room-ap".into(),
            manufacturer_name: "Acme".into(),
            manufacturer_model: "AP-9000".into(),
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(buf.len(), 192);
        assert_eq!(DeviceIdentificationTlv::from_value(&buf).unwrap(), t);
    }
}
