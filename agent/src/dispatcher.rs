use map1905_wire::cmdu::{Cmdu, CmduType};
use map1905_wire::mac::MacAddress;
use map1905_wire::tlv::{
    AlMacAddressTlv, DeviceInformationTlv, LinkMetricResultCodeTlv, LocalInterface, MacAddressTlv,
    NeighborDeviceListTlv, NeighborEntry, Role, SearchedRoleTlv, ServiceType, SupportedFreqBandTlv,
    SupportedRoleTlv, SupportedServiceTlv, Tlv, WscTlv,
};

use crate::config::Config;
use crate::error::DispatchError;
use crate::extension::ExtensionRegistry;
use crate::topology::Network;

/// Outcome of dispatching one CMDU, used by the event loop to decide
/// whether to follow up with an AP-autoconfig search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    Ok,
    OkTriggerApSearch,
}

/// A CMDU the dispatcher wants sent out. `interface` of `None` means "every
/// authenticated local interface".
#[derive(Clone, Debug)]
pub struct OutgoingCmdu {
    pub interface: Option<MacAddress>,
    pub destination: MacAddress,
    pub cmdu: Cmdu,
}

/// All event-loop-owned, non-platform state: the topology graph, the
/// monotonic per-device message id counter, and the vendor extension table.
/// Bundled into one value per §9's "encapsulate global mutable state"
/// design note — every component takes it explicitly rather than reaching
/// for a process-wide singleton.
pub struct AlState {
    pub config: Config,
    pub network: Network,
    pub extensions: ExtensionRegistry,
    next_message_id: u16,
}

impl AlState {
    pub fn new(config: Config) -> Self {
        AlState { config, network: Network::new(), extensions: ExtensionRegistry::new(), next_message_id: 0 }
    }

    /// The next value of the strictly monotonic, wrapping message-id
    /// counter used for autonomously originated CMDUs.
    pub fn next_message_id(&mut self) -> u16 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1);
        id
    }
}

fn find_al_mac(tlvs: &[Tlv]) -> Option<MacAddress> {
    tlvs.iter().find_map(|t| match t {
        Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address }) => Some(*al_mac_address),
        _ => None,
    })
}

fn find_mac_address_tlv(tlvs: &[Tlv]) -> Option<MacAddress> {
    tlvs.iter().find_map(|t| match t {
        Tlv::MacAddress(MacAddressTlv { mac_address }) => Some(*mac_address),
        _ => None,
    })
}

fn end_of_message() -> Vec<Tlv> {
    vec![Tlv::EndOfMessage]
}

fn local_device_information(state: &AlState) -> DeviceInformationTlv {
    let local_interfaces = match state.network.local_device.and_then(|d| state.network.devices.get(d)) {
        Some(dev) => dev
            .interfaces
            .iter()
            .filter_map(|&idx| state.network.interfaces.get(idx))
            .map(|iface| LocalInterface {
                mac_address: iface.mac,
                media_type: iface.media_type,
                media_specific_info: iface.media_specific_info.clone(),
            })
            .collect(),
        None => Vec::new(),
    };
    DeviceInformationTlv { al_mac_address: state.config.al_mac_address, local_interfaces }
}

/// Dispatch one de-duplicated, reassembled CMDU. `ingress_interface_mac` is
/// the local interface it arrived on; `eth_src` the Ethernet source address
/// of the frame. Returns the dispatch outcome plus any CMDUs to send in
/// response — forwarding (the "relayed multicast" rule) is the caller's
/// job, not this function's.
pub fn dispatch(
    state: &mut AlState,
    cmdu: &Cmdu,
    ingress_interface_mac: MacAddress,
    eth_src: MacAddress,
    now_ns: u64,
) -> Result<(DispatchOutcome, Vec<OutgoingCmdu>), DispatchError> {
    if let Some(ingress) = state.network.find_interface_anywhere(ingress_interface_mac) {
        if let Some(iface) = state.network.interfaces.get(ingress) {
            if !iface.is_secured {
                return Err(DispatchError::NotAuthenticated);
            }
        }
    }
    if find_al_mac(&cmdu.tlvs) == Some(state.config.al_mac_address) {
        return Err(DispatchError::Loopback);
    }

    let mut out = Vec::new();
    let outcome = match cmdu.message_type {
        CmduType::TopologyDiscovery => {
            handle_topology_discovery(state, cmdu, ingress_interface_mac, eth_src, now_ns, &mut out)
        }
        CmduType::TopologyNotification => {
            if let Some(al_mac) = find_al_mac(&cmdu.tlvs) {
                state.network.insert_device(al_mac, now_ns);
            }
            DispatchOutcome::Ok
        }
        CmduType::TopologyQuery => {
            out.push(OutgoingCmdu {
                interface: Some(ingress_interface_mac),
                destination: eth_src,
                cmdu: Cmdu {
                    message_type: CmduType::TopologyResponse,
                    message_id: cmdu.message_id,
                    relay_indicator: false,
                    tlvs: {
                        let mut tlvs = vec![Tlv::DeviceInformation(local_device_information(state))];
                        if let Some(dev) = state.network.local_device.and_then(|d| state.network.devices.get(d)) {
                            for &if_idx in &dev.interfaces {
                                let Some(iface) = state.network.interfaces.get(if_idx) else { continue };
                                if iface.neighbors.is_empty() {
                                    continue;
                                }
                                let neighbors = iface
                                    .neighbors
                                    .iter()
                                    .filter_map(|&n| state.network.interfaces.get(n))
                                    .map(|n| NeighborEntry { al_mac_address: n.mac, bridges_present: false })
                                    .collect();
                                tlvs.push(Tlv::NeighborDeviceList(NeighborDeviceListTlv {
                                    local_mac_address: iface.mac,
                                    neighbors,
                                }));
                            }
                        }
                        tlvs.extend(end_of_message());
                        tlvs
                    },
                },
            });
            DispatchOutcome::Ok
        }
        CmduType::TopologyResponse => {
            if let Some(al_mac) = find_al_mac(&cmdu.tlvs) {
                state.network.insert_device(al_mac, now_ns);
            }
            DispatchOutcome::Ok
        }
        CmduType::LinkMetricQuery => {
            out.push(OutgoingCmdu {
                interface: Some(ingress_interface_mac),
                destination: eth_src,
                cmdu: Cmdu {
                    message_type: CmduType::LinkMetricResponse,
                    message_id: cmdu.message_id,
                    relay_indicator: false,
                    tlvs: vec![
                        Tlv::LinkMetricResultCode(LinkMetricResultCodeTlv { invalid_neighbor: false }),
                        Tlv::EndOfMessage,
                    ],
                },
            });
            DispatchOutcome::Ok
        }
        CmduType::LinkMetricResponse => DispatchOutcome::Ok,
        CmduType::ApAutoconfigurationSearch => handle_autoconfig_search(state, cmdu, ingress_interface_mac, eth_src, &mut out),
        CmduType::ApAutoconfigurationResponse => {
            if let Some(al_mac) = find_al_mac(&cmdu.tlvs) {
                state.network.registrar.device = state.network.find_device(al_mac).or_else(|| {
                    Some(state.network.insert_device(al_mac, now_ns))
                });
            }
            out.push(OutgoingCmdu {
                interface: Some(ingress_interface_mac),
                destination: eth_src,
                cmdu: Cmdu {
                    message_type: CmduType::ApAutoconfigurationWscM1,
                    message_id: state.next_message_id(),
                    relay_indicator: false,
                    tlvs: vec![Tlv::Wsc(WscTlv { wsc_message: Vec::new() }), Tlv::EndOfMessage],
                },
            });
            DispatchOutcome::Ok
        }
        CmduType::ApAutoconfigurationWscM1 | CmduType::ApAutoconfigurationWscM2 => DispatchOutcome::Ok,
        CmduType::ApAutoconfigurationRenew => DispatchOutcome::OkTriggerApSearch,
        CmduType::PushButtonEventNotification => DispatchOutcome::Ok,
        CmduType::PushButtonJoinNotification => {
            if let Some(if_mac) = find_mac_address_tlv(&cmdu.tlvs) {
                let a = state.network.ensure_interface(ingress_interface_mac);
                let b = state.network.ensure_interface(if_mac);
                state.network.add_neighbor(a, b);
            }
            DispatchOutcome::Ok
        }
        CmduType::VendorSpecific => {
            for tlv in &cmdu.tlvs {
                if let Tlv::VendorSpecific(v) = tlv {
                    let _ = state.extensions.dispatch(v);
                }
            }
            DispatchOutcome::Ok
        }
        _ => DispatchOutcome::Ok,
    };

    Ok((outcome, out))
}

fn handle_topology_discovery(
    state: &mut AlState,
    cmdu: &Cmdu,
    ingress_interface_mac: MacAddress,
    eth_src: MacAddress,
    now_ns: u64,
    out: &mut Vec<OutgoingCmdu>,
) -> DispatchOutcome {
    let Some(al_mac) = find_al_mac(&cmdu.tlvs) else { return DispatchOutcome::Ok };
    let is_new = state.network.find_device(al_mac).is_none();
    state.network.insert_device(al_mac, now_ns);

    let neighbor_if_mac = find_mac_address_tlv(&cmdu.tlvs).unwrap_or(eth_src);
    let local = state.network.ensure_interface(ingress_interface_mac);
    let peer = state.network.ensure_interface(neighbor_if_mac);
    if let Some(iface) = state.network.interfaces.get_mut(peer) {
        iface.last_discovery = Some(now_ns);
    }
    state.network.add_neighbor(local, peer);

    if is_new {
        out.push(OutgoingCmdu {
            interface: Some(ingress_interface_mac),
            destination: eth_src,
            cmdu: Cmdu {
                message_type: CmduType::TopologyQuery,
                message_id: state.next_message_id(),
                relay_indicator: false,
                tlvs: end_of_message(),
            },
        });
    }
    DispatchOutcome::Ok
}

fn handle_autoconfig_search(
    state: &mut AlState,
    cmdu: &Cmdu,
    ingress_interface_mac: MacAddress,
    eth_src: MacAddress,
    out: &mut Vec<OutgoingCmdu>,
) -> DispatchOutcome {
    let searched_registrar = cmdu
        .tlvs
        .iter()
        .any(|t| matches!(t, Tlv::SearchedRole(SearchedRoleTlv { role: Role::Registrar })));
    let we_are_registrar = state.network.registrar.is_multi_ap
        && state.network.registrar.device == state.network.local_device;

    if searched_registrar && we_are_registrar {
        out.push(OutgoingCmdu {
            interface: Some(ingress_interface_mac),
            destination: eth_src,
            cmdu: Cmdu {
                message_type: CmduType::ApAutoconfigurationResponse,
                message_id: cmdu.message_id,
                relay_indicator: false,
                tlvs: vec![
                    Tlv::SupportedRole(SupportedRoleTlv { role: Role::Registrar }),
                    Tlv::SupportedFreqBand(SupportedFreqBandTlv {
                        band: map1905_wire::tlv::FreqBand::Ghz2_4,
                    }),
                    Tlv::SupportedService(SupportedServiceTlv { services: vec![ServiceType::MultiApController] }),
                    Tlv::EndOfMessage,
                ],
            },
        });
    }
    DispatchOutcome::Ok
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use map1905_wire::tlv::AutoconfigFreqBandTlv;

    fn test_config() -> Config {
        Config {
            al_mac_address: MacAddress::new([0x02, 0xee, 0xff, 0x33, 0x44, 0x00]),
            registrar_interface_name: None,
            map_whole_network: false,
            verbosity: 0,
        }
    }

    fn authenticated_interface(state: &mut AlState, mac: MacAddress) {
        let idx = state.network.ensure_interface(mac);
        if let Some(iface) = state.network.interfaces.get_mut(idx) {
            iface.is_secured = true;
        }
    }

    #[test]
    fn topology_discovery_from_new_peer_triggers_topology_query() {
        let mut state = AlState::new(test_config());
        let local_if = MacAddress::new([1; 6]);
        authenticated_interface(&mut state, local_if);
        let peer_al = MacAddress::new([2; 6]);
        let cmdu = Cmdu {
            message_type: CmduType::TopologyDiscovery,
            message_id: 1,
            relay_indicator: false,
            tlvs: vec![
                Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address: peer_al }),
                Tlv::MacAddress(MacAddressTlv { mac_address: peer_al }),
                Tlv::EndOfMessage,
            ],
        };
        let (_, out) = dispatch(&mut state, &cmdu, local_if, peer_al, 0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].cmdu.message_type, CmduType::TopologyQuery);
    }

    #[test]
    fn topology_query_gets_response_with_same_message_id() {
        let mut state = AlState::new(test_config());
        let local_if = MacAddress::new([1; 6]);
        authenticated_interface(&mut state, local_if);
        let peer = MacAddress::new([2; 6]);
        let cmdu = Cmdu {
            message_type: CmduType::TopologyQuery,
            message_id: 0x4225,
            relay_indicator: false,
            tlvs: vec![Tlv::EndOfMessage],
        };
        let (_, out) = dispatch(&mut state, &cmdu, local_if, peer, 0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].cmdu.message_type, CmduType::TopologyResponse);
        assert_eq!(out[0].cmdu.message_id, 0x4225);
    }

    #[test]
    fn rejects_cmdu_from_unauthenticated_interface() {
        let mut state = AlState::new(test_config());
        let local_if = state.network.ensure_interface(MacAddress::new([1; 6]));
        let local_if_mac = state.network.interfaces.get(local_if).unwrap().mac;
        let cmdu = Cmdu {
            message_type: CmduType::TopologyQuery,
            message_id: 1,
            relay_indicator: false,
            tlvs: vec![Tlv::EndOfMessage],
        };
        let err = dispatch(&mut state, &cmdu, local_if_mac, MacAddress::new([2; 6]), 0);
        assert!(matches!(err, Err(DispatchError::NotAuthenticated)));
    }

    #[test]
    fn rejects_loopback_of_own_al_mac() {
        let mut state = AlState::new(test_config());
        let local_if = MacAddress::new([1; 6]);
        authenticated_interface(&mut state, local_if);
        let own_mac = state.config.al_mac_address;
        let cmdu = Cmdu {
            message_type: CmduType::TopologyDiscovery,
            message_id: 1,
            relay_indicator: false,
            tlvs: vec![Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address: own_mac }), Tlv::EndOfMessage],
        };
        let err = dispatch(&mut state, &cmdu, local_if, MacAddress::new([2; 6]), 0);
        assert!(matches!(err, Err(DispatchError::Loopback)));
    }

    #[test]
    fn autoconfig_search_answered_only_when_we_are_registrar() {
        let mut state = AlState::new(test_config());
        let local_if = MacAddress::new([1; 6]);
        authenticated_interface(&mut state, local_if);
        let cmdu = Cmdu {
            message_type: CmduType::ApAutoconfigurationSearch,
            message_id: 1,
            relay_indicator: false,
            tlvs: vec![
                Tlv::SearchedRole(SearchedRoleTlv { role: Role::Registrar }),
                Tlv::AutoconfigFreqBand(AutoconfigFreqBandTlv { band: map1905_wire::tlv::FreqBand::Ghz2_4 }),
                Tlv::EndOfMessage,
            ],
        };
        let (_, out) = dispatch(&mut state, &cmdu, local_if, MacAddress::new([2; 6]), 0).unwrap();
        assert!(out.is_empty());

        state.network.registrar.is_multi_ap = true;
        state.network.registrar.device = state.network.local_device;
        let (_, out) = dispatch(&mut state, &cmdu, local_if, MacAddress::new([2; 6]), 0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].cmdu.message_type, CmduType::ApAutoconfigurationResponse);
    }
}
