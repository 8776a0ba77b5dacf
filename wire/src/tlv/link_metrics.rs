use crate::err::TlvError;
use crate::mac::MacAddress;

/// Which neighbor(s) a link metric query TLV is asking about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NeighborSelector {
    AllNeighbors,
    SpecificNeighbor(MacAddress),
}

/// Which direction(s) of link metric a query is asking for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkMetricsType {
    TransmitterOnly,
    ReceiverOnly,
    Both,
}

impl LinkMetricsType {
    const fn code(self) -> u8 {
        match self {
            LinkMetricsType::TransmitterOnly => 0x00,
            LinkMetricsType::ReceiverOnly => 0x01,
            LinkMetricsType::Both => 0x02,
        }
    }

    fn from_code(tlv_type: u8, v: u8) -> Result<Self, TlvError> {
        match v {
            0x00 => Ok(LinkMetricsType::TransmitterOnly),
            0x01 => Ok(LinkMetricsType::ReceiverOnly),
            0x02 => Ok(LinkMetricsType::Both),
            _ => Err(TlvError::InvalidPayload { tlv_type, reason: "unknown link metrics type" }),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LinkMetricQueryTlv {
    pub selector: NeighborSelector,
    pub metrics_type: LinkMetricsType,
}

impl LinkMetricQueryTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 8;
        match value {
            [0x00, metrics_type] => Ok(LinkMetricQueryTlv {
                selector: NeighborSelector::AllNeighbors,
                metrics_type: LinkMetricsType::from_code(TYPE, *metrics_type)?,
            }),
            [0x01, mac @ .., metrics_type] if mac.len() == 6 => Ok(LinkMetricQueryTlv {
                selector: NeighborSelector::SpecificNeighbor(MacAddress::from_slice(mac).unwrap()),
                metrics_type: LinkMetricsType::from_code(TYPE, *metrics_type)?,
            }),
            _ => Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected a neighbor-type byte, optional MAC, and a metrics-type byte",
            }),
        }
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        match self.selector {
            NeighborSelector::AllNeighbors => out.push(0x00),
            NeighborSelector::SpecificNeighbor(mac) => {
                out.push(0x01);
                out.extend_from_slice(&mac.octets());
            }
        }
        out.push(self.metrics_type.code());
    }
}

/// One local-to-neighbor link's transmit-side metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransmitterLinkEntry {
    pub local_interface: MacAddress,
    pub neighbor_interface: MacAddress,
    pub media_type: u16,
    pub bridges_present: bool,
    pub packet_errors: u32,
    pub packets_transmitted: u32,
    pub mac_throughput_capacity_mbps: u16,
    pub link_availability_pct: u16,
    pub phy_rate_mbps: u16,
}

const TX_ENTRY_LEN: usize = 6 + 6 + 2 + 1 + 4 + 4 + 2 + 2 + 2;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransmitterLinkMetricTlv {
    pub reporter_al_mac_address: MacAddress,
    pub neighbor_al_mac_address: MacAddress,
    pub entries: Vec<TransmitterLinkEntry>,
}

impl TransmitterLinkMetricTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 9;
        if value.len() < 12 || (value.len() - 12) % TX_ENTRY_LEN != 0 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "malformed transmitter link metric payload",
            });
        }
        let reporter_al_mac_address = MacAddress::from_slice(&value[..6]).unwrap();
        let neighbor_al_mac_address = MacAddress::from_slice(&value[6..12]).unwrap();
        let mut entries = Vec::new();
        for chunk in value[12..].chunks_exact(TX_ENTRY_LEN) {
            entries.push(TransmitterLinkEntry {
                local_interface: MacAddress::from_slice(&chunk[0..6]).unwrap(),
                neighbor_interface: MacAddress::from_slice(&chunk[6..12]).unwrap(),
                media_type: u16::from_be_bytes([chunk[12], chunk[13]]),
                bridges_present: chunk[14] != 0,
                packet_errors: u32::from_be_bytes(chunk[15..19].try_into().unwrap()),
                packets_transmitted: u32::from_be_bytes(chunk[19..23].try_into().unwrap()),
                mac_throughput_capacity_mbps: u16::from_be_bytes([chunk[23], chunk[24]]),
                link_availability_pct: u16::from_be_bytes([chunk[25], chunk[26]]),
                phy_rate_mbps: u16::from_be_bytes([chunk[27], chunk[28]]),
            });
        }
        Ok(TransmitterLinkMetricTlv { reporter_al_mac_address, neighbor_al_mac_address, entries })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.reporter_al_mac_address.octets());
        out.extend_from_slice(&self.neighbor_al_mac_address.octets());
        for e in &self.entries {
            out.extend_from_slice(&e.local_interface.octets());
            out.extend_from_slice(&e.neighbor_interface.octets());
            out.extend_from_slice(&e.media_type.to_be_bytes());
            out.push(if e.bridges_present { 1 } else { 0 });
            out.extend_from_slice(&e.packet_errors.to_be_bytes());
            out.extend_from_slice(&e.packets_transmitted.to_be_bytes());
            out.extend_from_slice(&e.mac_throughput_capacity_mbps.to_be_bytes());
            out.extend_from_slice(&e.link_availability_pct.to_be_bytes());
            out.extend_from_slice(&e.phy_rate_mbps.to_be_bytes());
        }
    }
}

/// One local-to-neighbor link's receive-side metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReceiverLinkEntry {
    pub local_interface: MacAddress,
    pub neighbor_interface: MacAddress,
    pub media_type: u16,
    pub packet_errors: u32,
    pub packets_received: u32,
    pub rssi_dbm: u8,
}

const RX_ENTRY_LEN: usize = 6 + 6 + 2 + 4 + 4 + 1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReceiverLinkMetricTlv {
    pub reporter_al_mac_address: MacAddress,
    pub neighbor_al_mac_address: MacAddress,
    pub entries: Vec<ReceiverLinkEntry>,
}

impl ReceiverLinkMetricTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 10;
        if value.len() < 12 || (value.len() - 12) % RX_ENTRY_LEN != 0 {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "malformed receiver link metric payload",
            });
        }
        let reporter_al_mac_address = MacAddress::from_slice(&value[..6]).unwrap();
        let neighbor_al_mac_address = MacAddress::from_slice(&value[6..12]).unwrap();
        let mut entries = Vec::new();
        for chunk in value[12..].chunks_exact(RX_ENTRY_LEN) {
            entries.push(ReceiverLinkEntry {
                local_interface: MacAddress::from_slice(&chunk[0..6]).unwrap(),
                neighbor_interface: MacAddress::from_slice(&chunk[6..12]).unwrap(),
                media_type: u16::from_be_bytes([chunk[12], chunk[13]]),
                packet_errors: u32::from_be_bytes(chunk[14..18].try_into().unwrap()),
                packets_received: u32::from_be_bytes(chunk[18..22].try_into().unwrap()),
                rssi_dbm: chunk[22],
            });
        }
        Ok(ReceiverLinkMetricTlv { reporter_al_mac_address, neighbor_al_mac_address, entries })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.reporter_al_mac_address.octets());
        out.extend_from_slice(&self.neighbor_al_mac_address.octets());
        for e in &self.entries {
            out.extend_from_slice(&e.local_interface.octets());
            out.extend_from_slice(&e.neighbor_interface.octets());
            out.extend_from_slice(&e.media_type.to_be_bytes());
            out.extend_from_slice(&e.packet_errors.to_be_bytes());
            out.extend_from_slice(&e.packets_received.to_be_bytes());
            out.push(e.rssi_dbm);
        }
    }
}

/// Link metric result code TLV: sent instead of transmitter/receiver TLVs
/// when the queried neighbor is invalid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LinkMetricResultCodeTlv {
    pub invalid_neighbor: bool,
}

impl LinkMetricResultCodeTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        let &[code] = value else {
            return Err(TlvError::InvalidPayload { tlv_type: 12, reason: "expected 1 byte" });
        };
        Ok(LinkMetricResultCodeTlv { invalid_neighbor: code == 0x00 })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(if self.invalid_neighbor { 0x00 } else { 0x01 });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn query_all_neighbors_round_trip() {
        let t = LinkMetricQueryTlv {
            selector: NeighborSelector::AllNeighbors,
            metrics_type: LinkMetricsType::Both,
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(LinkMetricQueryTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn query_specific_neighbor_round_trip() {
        let t = LinkMetricQueryTlv {
            selector: NeighborSelector::SpecificNeighbor(MacAddress::new([9; 6])),
            metrics_type: LinkMetricsType::ReceiverOnly,
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(LinkMetricQueryTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn transmitter_metric_round_trip() {
        let t = TransmitterLinkMetricTlv {
            reporter_al_mac_address: MacAddress::new([1; 6]),
            neighbor_al_mac_address: MacAddress::new([2; 6]),
            entries: vec![TransmitterLinkEntry {
                local_interface: MacAddress::new([3; 6]),
                neighbor_interface: MacAddress::new([4; 6]),
                media_type: 0x0100,
                bridges_present: true,
                packet_errors: 7,
                packets_transmitted: 12345,
                mac_throughput_capacity_mbps: 866,
                link_availability_pct: 100,
                phy_rate_mbps: 300,
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(TransmitterLinkMetricTlv::from_value(&buf).unwrap(), t);
    }
}
