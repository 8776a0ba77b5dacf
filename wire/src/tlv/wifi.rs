use crate::err::TlvError;
use crate::mac::MacAddress;

/// One operational BSS advertised by a radio in an
/// [`ApOperationalBssTlv`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationalBss {
    pub bssid: MacAddress,
    pub ssid: Vec<u8>,
}

/// One radio's set of operational BSSes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RadioOperationalBss {
    pub radio_unique_identifier: MacAddress,
    pub bsses: Vec<OperationalBss>,
}

/// AP operational BSS TLV: the BSSes currently running on each local radio.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct ApOperationalBssTlv {
    pub radios: Vec<RadioOperationalBss>,
}

impl ApOperationalBssTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 0x83;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 1 byte (radio count)",
            });
        }
        let radio_count = value[0] as usize;
        let mut rest = &value[1..];
        let mut radios = Vec::with_capacity(radio_count);
        for _ in 0..radio_count {
            if rest.len() < 7 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "radio entry truncated before BSS count",
                });
            }
            let radio_unique_identifier = MacAddress::from_slice(&rest[..6]).unwrap();
            let bss_count = rest[6] as usize;
            rest = &rest[7..];
            let mut bsses = Vec::with_capacity(bss_count);
            for _ in 0..bss_count {
                if rest.len() < 7 {
                    return Err(TlvError::InvalidPayload {
                        tlv_type: TYPE,
                        reason: "BSS entry truncated before SSID length",
                    });
                }
                let bssid = MacAddress::from_slice(&rest[..6]).unwrap();
                let ssid_len = rest[6] as usize;
                if rest.len() < 7 + ssid_len {
                    return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "SSID truncated" });
                }
                let ssid = rest[7..7 + ssid_len].to_vec();
                bsses.push(OperationalBss { bssid, ssid });
                rest = &rest[7 + ssid_len..];
            }
            radios.push(RadioOperationalBss { radio_unique_identifier, bsses });
        }
        Ok(ApOperationalBssTlv { radios })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.radios.len() as u8);
        for radio in &self.radios {
            out.extend_from_slice(&radio.radio_unique_identifier.octets());
            out.push(radio.bsses.len() as u8);
            for bss in &radio.bsses {
                out.extend_from_slice(&bss.bssid.octets());
                out.push(bss.ssid.len() as u8);
                out.extend_from_slice(&bss.ssid);
            }
        }
    }
}

/// A single client associated to a BSS.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AssociatedClient {
    pub mac_address: MacAddress,
    pub seconds_since_association: u16,
}

/// One BSS's list of associated clients.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BssAssociatedClients {
    pub bssid: MacAddress,
    pub clients: Vec<AssociatedClient>,
}

/// Associated clients TLV.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct AssociatedClientsTlv {
    pub bsses: Vec<BssAssociatedClients>,
}

impl AssociatedClientsTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 0x84;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 1 byte (BSS count)",
            });
        }
        let bss_count = value[0] as usize;
        let mut rest = &value[1..];
        let mut bsses = Vec::with_capacity(bss_count);
        for _ in 0..bss_count {
            if rest.len() < 8 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "BSS entry truncated before client count",
                });
            }
            let bssid = MacAddress::from_slice(&rest[..6]).unwrap();
            let client_count = u16::from_be_bytes([rest[6], rest[7]]) as usize;
            rest = &rest[8..];
            if rest.len() < client_count * 8 {
                return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "client list truncated" });
            }
            let clients = rest[..client_count * 8]
                .chunks_exact(8)
                .map(|c| AssociatedClient {
                    mac_address: MacAddress::from_slice(&c[..6]).unwrap(),
                    seconds_since_association: u16::from_be_bytes([c[6], c[7]]),
                })
                .collect();
            rest = &rest[client_count * 8..];
            bsses.push(BssAssociatedClients { bssid, clients });
        }
        Ok(AssociatedClientsTlv { bsses })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.bsses.len() as u8);
        for bss in &self.bsses {
            out.extend_from_slice(&bss.bssid.octets());
            out.extend_from_slice(&(bss.clients.len() as u16).to_be_bytes());
            for c in &bss.clients {
                out.extend_from_slice(&c.mac_address.octets());
                out.extend_from_slice(&c.seconds_since_association.to_be_bytes());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ap_operational_bss_round_trip() {
        let t = ApOperationalBssTlv {
            radios: vec![RadioOperationalBss {
                radio_unique_identifier: MacAddress::new([1; 6]),
                bsses: vec![OperationalBss { bssid: MacAddress::new([2; 6]), ssid: b"guest".to_vec() }],
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(ApOperationalBssTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn associated_clients_round_trip() {
        let t = AssociatedClientsTlv {
            bsses: vec![BssAssociatedClients {
                bssid: MacAddress::new([1; 6]),
                clients: vec![AssociatedClient {
                    mac_address: MacAddress::new([2; 6]),
                    seconds_since_association: 42,
                }],
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(AssociatedClientsTlv::from_value(&buf).unwrap(), t);
    }
}
