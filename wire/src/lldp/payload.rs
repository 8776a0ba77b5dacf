use crate::err::LldpError;
use crate::lldp::tlv::{ChassisIdTlv, EndOfLldppduTlv, PortIdTlv, TimeToLiveTlv};
use crate::mac::MacAddress;

/// The bridge-discovery LLDPDU sent alongside topology discovery CMDUs
/// (`chassis id` = AL MAC, `port id` = transmitting interface's MAC, fixed
/// 180 second TTL, terminated by an End Of LLDPDU TLV).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LldpBridgeDiscovery {
    pub chassis_id: MacAddress,
    pub port_id: MacAddress,
    pub ttl_seconds: u16,
}

impl LldpBridgeDiscovery {
    pub fn new(chassis_id: MacAddress, port_id: MacAddress) -> LldpBridgeDiscovery {
        LldpBridgeDiscovery { chassis_id, port_id, ttl_seconds: TimeToLiveTlv::DEFAULT_SECONDS }
    }

    pub fn from_slice(slice: &[u8]) -> Result<LldpBridgeDiscovery, LldpError> {
        let (chassis, rest) = ChassisIdTlv::parse(slice)?;
        let (port, rest) = PortIdTlv::parse(rest)?;
        let (ttl, rest) = TimeToLiveTlv::parse(rest)?;
        let (_, _rest) = EndOfLldppduTlv::parse(rest)?;
        Ok(LldpBridgeDiscovery {
            chassis_id: chassis.mac_address,
            port_id: port.mac_address,
            ttl_seconds: ttl.seconds,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        ChassisIdTlv { mac_address: self.chassis_id }.write(&mut out);
        PortIdTlv { mac_address: self.port_id }.write(&mut out);
        TimeToLiveTlv { seconds: self.ttl_seconds }.write(&mut out);
        EndOfLldppduTlv.write(&mut out);
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let pdu = LldpBridgeDiscovery::new(MacAddress::new([1; 6]), MacAddress::new([2; 6]));
        let bytes = pdu.to_bytes();
        assert_eq!(LldpBridgeDiscovery::from_slice(&bytes).unwrap(), pdu);
    }
}
