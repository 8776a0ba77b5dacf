use map1905_wire::cmdu::Cmdu;
use map1905_wire::mac::MacAddress;
use map1905_wire::tlv::PowerState;

use crate::topology::Network;

/// One outgoing retransmission the event loop should hand to the platform.
#[derive(Clone, Debug)]
pub struct Retransmission {
    pub egress_interface_mac: MacAddress,
    pub destination: MacAddress,
    pub cmdu: Cmdu,
}

/// Implements the "relayed multicast" rule (§4.6): a CMDU with its relay
/// flag set is retransmitted on every authenticated, powered local
/// interface other than the one it arrived on. The original `message_id`
/// and destination MAC are preserved; only the Ethernet source changes per
/// egress interface.
pub fn forward(network: &Network, cmdu: &Cmdu, destination: MacAddress, ingress_interface_mac: MacAddress) -> Vec<Retransmission> {
    if !cmdu.relay_indicator {
        return Vec::new();
    }

    let Some(local) = network.local_device.and_then(|d| network.devices.get(d)) else {
        return Vec::new();
    };

    local
        .interfaces
        .iter()
        .filter_map(|&idx| network.interfaces.get(idx))
        .filter(|iface| iface.mac != ingress_interface_mac)
        .filter(|iface| iface.is_secured)
        .filter(|iface| matches!(iface.power_state, PowerState::On | PowerState::Save))
        .map(|iface| Retransmission { egress_interface_mac: iface.mac, destination, cmdu: cmdu.clone() })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use map1905_wire::cmdu::CmduType;
    use map1905_wire::mac::MacAddress;

    fn relayed_cmdu() -> Cmdu {
        Cmdu {
            message_type: CmduType::TopologyDiscovery,
            message_id: 42,
            relay_indicator: true,
            tlvs: vec![map1905_wire::tlv::Tlv::EndOfMessage],
        }
    }

    fn network_with_two_secured_interfaces() -> (Network, MacAddress, MacAddress) {
        let mut network = Network::new();
        let dev = network.insert_device(MacAddress::new([9; 6]), 0);
        network.local_device = Some(dev);
        let mac_a = MacAddress::new([0xA; 6]);
        let mac_b = MacAddress::new([0xB; 6]);
        let a = network.ensure_interface(mac_a);
        let b = network.ensure_interface(mac_b);
        network.attach_interface_to_device(dev, a);
        network.attach_interface_to_device(dev, b);
        network.interfaces.get_mut(a).unwrap().is_secured = true;
        network.interfaces.get_mut(b).unwrap().is_secured = true;
        (network, mac_a, mac_b)
    }

    #[test]
    fn never_retransmits_on_ingress_interface() {
        let (network, mac_a, mac_b) = network_with_two_secured_interfaces();
        let cmdu = relayed_cmdu();
        let out = forward(&network, &cmdu, MacAddress::IEEE1905_MULTICAST, mac_a);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].egress_interface_mac, mac_b);
    }

    #[test]
    fn does_not_forward_when_relay_flag_is_unset() {
        let (network, mac_a, _mac_b) = network_with_two_secured_interfaces();
        let mut cmdu = relayed_cmdu();
        cmdu.relay_indicator = false;
        let out = forward(&network, &cmdu, MacAddress::IEEE1905_MULTICAST, mac_a);
        assert!(out.is_empty());
    }

    #[test]
    fn skips_unsecured_interfaces() {
        let (mut network, mac_a, mac_b) = network_with_two_secured_interfaces();
        let b = network.find_interface_anywhere(mac_b).unwrap();
        network.interfaces.get_mut(b).unwrap().is_secured = false;
        let cmdu = relayed_cmdu();
        let out = forward(&network, &cmdu, MacAddress::IEEE1905_MULTICAST, mac_a);
        assert!(out.is_empty());
    }
}
