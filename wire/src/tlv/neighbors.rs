use crate::err::TlvError;
use crate::mac::MacAddress;

/// Non-1905 neighbor device list TLV: neighbors seen on a local interface
/// that do not themselves speak 1905.1.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Non1905NeighborDeviceListTlv {
    pub local_mac_address: MacAddress,
    pub neighbors: Vec<MacAddress>,
}

impl Non1905NeighborDeviceListTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 6;
        if value.len() < 6 || (value.len() - 6) % 6 != 0 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected a 6-byte MAC address followed by a whole number of 6-byte MACs",
            });
        }
        let local_mac_address = MacAddress::from_slice(&value[..6]).unwrap();
        let neighbors = value[6..].chunks_exact(6).map(|c| MacAddress::from_slice(c).unwrap()).collect();
        Ok(Non1905NeighborDeviceListTlv { local_mac_address, neighbors })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.local_mac_address.octets());
        for mac in &self.neighbors {
            out.extend_from_slice(&mac.octets());
        }
    }
}

/// A single 1905 neighbor entry, as carried by [`NeighborDeviceListTlv`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NeighborEntry {
    pub al_mac_address: MacAddress,
    /// Whether this neighbor is reachable through IEEE 802.1 bridges
    /// (the "bridges exist" bit).
    pub bridges_present: bool,
}

/// Neighbor device list TLV: other 1905 AL entities seen directly on a
/// local interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NeighborDeviceListTlv {
    pub local_mac_address: MacAddress,
    pub neighbors: Vec<NeighborEntry>,
}

impl NeighborDeviceListTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 7;
        if value.len() < 6 || (value.len() - 6) % 7 != 0 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected a 6-byte MAC address followed by a whole number of 7-byte entries",
            });
        }
        let local_mac_address = MacAddress::from_slice(&value[..6]).unwrap();
        let neighbors = value[6..]
            .chunks_exact(7)
            .map(|c| NeighborEntry {
                al_mac_address: MacAddress::from_slice(&c[..6]).unwrap(),
                bridges_present: c[6] & 0x80 != 0,
            })
            .collect();
        Ok(NeighborDeviceListTlv { local_mac_address, neighbors })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.local_mac_address.octets());
        for n in &self.neighbors {
            out.extend_from_slice(&n.al_mac_address.octets());
            out.push(if n.bridges_present { 0x80 } else { 0x00 });
        }
    }
}

/// A non-1905 neighbor reached behind a directly-seen L2 neighbor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct L2NeighborEntry {
    pub neighbor_mac_address: MacAddress,
    pub behind_mac_addresses: Vec<MacAddress>,
}

/// All L2 neighbors reachable through one local interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct L2NeighborInterface {
    pub local_mac_address: MacAddress,
    pub neighbors: Vec<L2NeighborEntry>,
}

/// L2 neighbor device TLV, restored from the original source (see
/// SPEC_FULL §2). Parsed and stored but not consulted by the dispatcher.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct L2NeighborDeviceTlv {
    pub interfaces: Vec<L2NeighborInterface>,
}

impl L2NeighborDeviceTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 30;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 1 byte (interface count)",
            });
        }
        let iface_count = value[0] as usize;
        let mut rest = &value[1..];
        let mut interfaces = Vec::with_capacity(iface_count);
        for _ in 0..iface_count {
            if rest.len() < 8 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "interface entry truncated before neighbor count",
                });
            }
            let local_mac_address = MacAddress::from_slice(&rest[..6]).unwrap();
            let neighbor_count = u16::from_be_bytes([rest[6], rest[7]]) as usize;
            rest = &rest[8..];
            let mut neighbors = Vec::with_capacity(neighbor_count);
            for _ in 0..neighbor_count {
                if rest.len() < 8 {
                    return Err(TlvError::InvalidPayload {
                        tlv_type: TYPE,
                        reason: "neighbor entry truncated before behind-mac count",
                    });
                }
                let neighbor_mac_address = MacAddress::from_slice(&rest[..6]).unwrap();
                let behind_count = u16::from_be_bytes([rest[6], rest[7]]) as usize;
                rest = &rest[8..];
                if rest.len() < behind_count * 6 {
                    return Err(TlvError::InvalidPayload {
                        tlv_type: TYPE,
                        reason: "behind-mac list truncated",
                    });
                }
                let behind_mac_addresses =
                    rest[..behind_count * 6].chunks_exact(6).map(|c| MacAddress::from_slice(c).unwrap()).collect();
                rest = &rest[behind_count * 6..];
                neighbors.push(L2NeighborEntry { neighbor_mac_address, behind_mac_addresses });
            }
            interfaces.push(L2NeighborInterface { local_mac_address, neighbors });
        }
        Ok(L2NeighborDeviceTlv { interfaces })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.interfaces.len() as u8);
        for iface in &self.interfaces {
            out.extend_from_slice(&iface.local_mac_address.octets());
            out.extend_from_slice(&(iface.neighbors.len() as u16).to_be_bytes());
            for n in &iface.neighbors {
                out.extend_from_slice(&n.neighbor_mac_address.octets());
                out.extend_from_slice(&(n.behind_mac_addresses.len() as u16).to_be_bytes());
                for mac in &n.behind_mac_addresses {
                    out.extend_from_slice(&mac.octets());
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn non_1905_round_trip() {
        let t = Non1905NeighborDeviceListTlv {
            local_mac_address: MacAddress::new([1; 6]),
            neighbors: vec![MacAddress::new([2; 6]), MacAddress::new([3; 6])],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(Non1905NeighborDeviceListTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn neighbor_device_list_round_trip() {
        let t = NeighborDeviceListTlv {
            local_mac_address: MacAddress::new([1; 6]),
            neighbors: vec![
                NeighborEntry { al_mac_address: MacAddress::new([2; 6]), bridges_present: true },
                NeighborEntry { al_mac_address: MacAddress::new([3; 6]), bridges_present: false },
            ],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(NeighborDeviceListTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn l2_neighbor_round_trip() {
        let t = L2NeighborDeviceTlv {
            interfaces: vec![L2NeighborInterface {
                local_mac_address: MacAddress::new([1; 6]),
                neighbors: vec![L2NeighborEntry {
                    neighbor_mac_address: MacAddress::new([2; 6]),
                    behind_mac_addresses: vec![MacAddress::new([3; 6])],
                }],
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(L2NeighborDeviceTlv::from_value(&buf).unwrap(), t);
    }
}
