use map1905_defrag::{DuplicateFilter, Reassembler};
use map1905_wire::cmdu::{Cmdu, CmduHeader, CmduType};
use map1905_wire::lldp::LldpBridgeDiscovery;
use map1905_wire::mac::MacAddress;
use map1905_wire::tlv::{AlMacAddressTlv, MacAddressTlv, PowerState, Tlv};

use crate::dispatcher::{dispatch, AlState, DispatchOutcome, OutgoingCmdu};
use crate::forwarder::forward;
use crate::platform::{Event, PlatformIO, TimerKind};

const ETHER_TYPE_1905: u16 = 0x893a;
const ETHER_TYPE_LLDP: u16 = 0x88cc;

/// Everything the loop needs besides the platform and `AlState`: the
/// reassembler and duplicate filter, which are loop-private rather than
/// part of the shared topology/dispatch state.
pub struct EventLoop<P: PlatformIO> {
    platform: P,
    state: AlState,
    reassembler: Reassembler<u64>,
    dup_filter: DuplicateFilter,
}

impl<P: PlatformIO> EventLoop<P> {
    pub fn new(platform: P, state: AlState) -> Self {
        EventLoop {
            platform,
            state,
            reassembler: Reassembler::default(),
            dup_filter: DuplicateFilter::default(),
        }
    }

    /// Runs until `poll_event` returns an error indicating the channel was
    /// closed, or some other unrecoverable platform error occurs.
    pub fn run(&mut self) -> Result<(), crate::error::PlatformError> {
        loop {
            let event = self.platform.poll_event()?;
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::NewPacket { interface_mac, source_mac, ether_type, bytes } => {
                self.handle_new_packet(interface_mac, source_mac, ether_type, &bytes);
            }
            Event::Timer(TimerKind::Discovery) => self.handle_discovery_timer(),
            Event::Timer(TimerKind::GarbageCollector) => self.handle_gc_timer(),
            Event::PushButton => self.handle_push_button(),
            Event::AuthenticatedLink { local_mac, new_peer_mac, origin_al_mac, origin_message_id } => {
                self.handle_authenticated_link(local_mac, new_peer_mac, origin_al_mac, origin_message_id);
            }
            Event::TopologyChange => self.broadcast_topology_notification(),
            Event::Alme { client_id, request } => self.handle_alme(client_id, &request),
        }
    }

    fn handle_new_packet(&mut self, interface_mac: MacAddress, source_mac: MacAddress, ether_type: u16, bytes: &[u8]) {
        match ether_type {
            ETHER_TYPE_LLDP => self.handle_lldp_packet(interface_mac, bytes),
            ETHER_TYPE_1905 => self.handle_1905_packet(interface_mac, source_mac, bytes),
            other => log::debug!("dropping frame on {interface_mac} with unhandled ether-type {other:#06x}"),
        }
    }

    fn handle_lldp_packet(&mut self, interface_mac: MacAddress, bytes: &[u8]) {
        let Ok(payload) = LldpBridgeDiscovery::from_slice(bytes) else {
            log::info!("dropping malformed LLDP frame on {interface_mac}");
            return;
        };
        let peer = self.state.network.ensure_interface(payload.chassis_id);
        let local = self.state.network.ensure_interface(interface_mac);
        self.state.network.add_neighbor(local, peer);
    }

    fn handle_1905_packet(&mut self, interface_mac: MacAddress, eth_src: MacAddress, bytes: &[u8]) {
        if bytes.len() < CmduHeader::LEN {
            log::info!("dropping truncated 1905 frame on {interface_mac}");
            return;
        }
        let header = match CmduHeader::from_slice(&bytes[..CmduHeader::LEN]) {
            Ok(h) => h,
            Err(e) => {
                log::info!("dropping malformed CMDU header on {interface_mac}: {e}");
                return;
            }
        };
        let now_ns = self.platform.clock_monotonic_ns();
        let dst = MacAddress::IEEE1905_MULTICAST;
        let cmdu = match self.reassembler.accept(eth_src, dst, &header, &bytes[CmduHeader::LEN..], now_ns) {
            Ok(Some(cmdu)) => cmdu,
            Ok(None) => return,
            Err(e) => {
                log::warn!("dropping CMDU fragment on {interface_mac}: {e}");
                return;
            }
        };

        let al_mac = find_al_mac(&cmdu.tlvs).unwrap_or(eth_src);
        if self.dup_filter.is_duplicate(al_mac, cmdu.message_id, cmdu.message_type) {
            log::warn!("dropping duplicate CMDU {:#06x} from {al_mac}", cmdu.message_id);
            return;
        }

        match dispatch(&mut self.state, &cmdu, interface_mac, eth_src, now_ns) {
            Ok((outcome, outgoing)) => {
                for msg in outgoing {
                    self.send(msg);
                }
                for retransmission in forward(&self.state.network, &cmdu, dst, interface_mac) {
                    if let Err(e) = self.send_cmdu_on(retransmission.egress_interface_mac, retransmission.destination, &retransmission.cmdu)
                    {
                        log::warn!("forwarding failed on {}: {e}", retransmission.egress_interface_mac);
                    }
                }
                if outcome == DispatchOutcome::OkTriggerApSearch {
                    self.broadcast_autoconfig_search();
                }
            }
            Err(e) => log::debug!("not dispatching CMDU from {interface_mac}: {e}"),
        }
    }

    fn handle_discovery_timer(&mut self) {
        let message_id = self.state.next_message_id();
        let al_mac = self.state.config.al_mac_address;
        for iface in self.authenticated_interfaces() {
            let discovery = Cmdu {
                message_type: CmduType::TopologyDiscovery,
                message_id,
                relay_indicator: false,
                tlvs: vec![
                    Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address: al_mac }),
                    Tlv::MacAddress(MacAddressTlv { mac_address: iface }),
                    Tlv::EndOfMessage,
                ],
            };
            if let Err(e) = self.send_cmdu_on(iface, MacAddress::IEEE1905_MULTICAST, &discovery) {
                log::warn!("discovery send failed on {iface}: {e}");
            }
            if let Err(e) = self.send_lldp_on(iface) {
                log::warn!("LLDP discovery send failed on {iface}: {e}");
            }
        }
    }

    fn handle_gc_timer(&mut self) {
        let now_ns = self.platform.clock_monotonic_ns();
        if self.state.network.run_garbage_collector(now_ns) {
            self.broadcast_topology_notification();
        }
    }

    fn handle_push_button(&mut self) {
        let interfaces = self.authenticated_interfaces();
        let mut any_unsupported = false;
        for iface in &interfaces {
            let Some(name) = self.interface_name(*iface) else { continue };
            if let Err(e) = self.platform.start_push_button(&name) {
                log::warn!("push-button start failed on {iface}: {e}");
                any_unsupported = true;
            }
        }
        let message_id = self.state.next_message_id();
        for iface in &interfaces {
            let notification = Cmdu {
                message_type: CmduType::PushButtonEventNotification,
                message_id,
                relay_indicator: false,
                tlvs: vec![Tlv::EndOfMessage],
            };
            let _ = self.send_cmdu_on(*iface, MacAddress::IEEE1905_MULTICAST, &notification);
        }
        if any_unsupported {
            self.broadcast_autoconfig_search();
        }
    }

    fn handle_authenticated_link(
        &mut self,
        local_mac: MacAddress,
        new_peer_mac: Option<MacAddress>,
        origin_al_mac: MacAddress,
        origin_message_id: u16,
    ) {
        if let Some(peer_mac) = new_peer_mac {
            let message_id = self.state.next_message_id();
            for iface in self.authenticated_interfaces() {
                if iface == local_mac {
                    continue;
                }
                let notification = Cmdu {
                    message_type: CmduType::PushButtonJoinNotification,
                    message_id,
                    relay_indicator: false,
                    tlvs: vec![
                        Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address: origin_al_mac }),
                        Tlv::MacAddress(MacAddressTlv { mac_address: peer_mac }),
                        Tlv::EndOfMessage,
                    ],
                };
                let _ = self.send_cmdu_on(iface, MacAddress::IEEE1905_MULTICAST, &notification);
            }
        }
        let _ = origin_message_id;
        self.broadcast_autoconfig_search();
    }

    fn handle_alme(&mut self, client_id: u32, _request: &[u8]) {
        log::debug!("ALME request from client {client_id} acknowledged but not interpreted (no ALME handler configured)");
    }

    fn broadcast_topology_notification(&mut self) {
        let message_id = self.state.next_message_id();
        for iface in self.authenticated_interfaces() {
            let notification = Cmdu {
                message_type: CmduType::TopologyNotification,
                message_id,
                relay_indicator: false,
                tlvs: vec![
                    Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address: self.state.config.al_mac_address }),
                    Tlv::EndOfMessage,
                ],
            };
            let _ = self.send_cmdu_on(iface, MacAddress::IEEE1905_MULTICAST, &notification);
        }
    }

    fn broadcast_autoconfig_search(&mut self) {
        let message_id = self.state.next_message_id();
        for iface in self.authenticated_interfaces() {
            let search = Cmdu {
                message_type: CmduType::ApAutoconfigurationSearch,
                message_id,
                relay_indicator: false,
                tlvs: vec![
                    Tlv::SearchedRole(map1905_wire::tlv::SearchedRoleTlv { role: map1905_wire::tlv::Role::Registrar }),
                    Tlv::EndOfMessage,
                ],
            };
            let _ = self.send_cmdu_on(iface, MacAddress::IEEE1905_MULTICAST, &search);
        }
    }

    fn authenticated_interfaces(&self) -> Vec<MacAddress> {
        let Some(dev) = self.state.network.local_device.and_then(|d| self.state.network.devices.get(d)) else {
            return Vec::new();
        };
        dev.interfaces
            .iter()
            .filter_map(|&idx| self.state.network.interfaces.get(idx))
            .filter(|iface| iface.is_secured && matches!(iface.power_state, PowerState::On | PowerState::Save))
            .map(|iface| iface.mac)
            .collect()
    }

    fn interface_name(&self, mac: MacAddress) -> Option<String> {
        let idx = self.state.network.find_interface_anywhere(mac)?;
        self.state.network.interfaces.get(idx)?.name.clone()
    }

    fn send(&mut self, msg: OutgoingCmdu) {
        let Some(egress) = msg.interface else {
            for iface in self.authenticated_interfaces() {
                let _ = self.send_cmdu_on(iface, msg.destination, &msg.cmdu);
            }
            return;
        };
        if let Err(e) = self.send_cmdu_on(egress, msg.destination, &msg.cmdu) {
            log::warn!("send failed on {egress}: {e}");
        }
    }

    fn send_cmdu_on(&self, egress: MacAddress, destination: MacAddress, cmdu: &Cmdu) -> Result<(), crate::error::PlatformError> {
        let Some(name) = self.interface_name(egress) else {
            return Err(crate::error::PlatformError::NoSuchInterface(egress.to_string()));
        };
        let fragments = cmdu.forge_fragmented().map_err(|e| crate::error::PlatformError::SendFailed {
            interface: name.clone(),
            reason: e.to_string(),
        })?;
        for fragment in fragments {
            self.platform.send_raw(&name, destination, egress, ETHER_TYPE_1905, &fragment)?;
        }
        Ok(())
    }

    fn send_lldp_on(&self, egress: MacAddress) -> Result<(), crate::error::PlatformError> {
        let Some(name) = self.interface_name(egress) else {
            return Err(crate::error::PlatformError::NoSuchInterface(egress.to_string()));
        };
        let payload = LldpBridgeDiscovery::new(self.state.config.al_mac_address, egress);
        self.platform.send_raw(&name, MacAddress::LLDP_MULTICAST, egress, ETHER_TYPE_LLDP, &payload.to_bytes())
    }
}

fn find_al_mac(tlvs: &[Tlv]) -> Option<MacAddress> {
    tlvs.iter().find_map(|t| match t {
        Tlv::AlMacAddress(AlMacAddressTlv { al_mac_address }) => Some(*al_mac_address),
        _ => None,
    })
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use super::*;
    use crate::config::Config;
    use crate::error::PlatformError;
    use crate::platform::InterfaceInfo;
    use crate::topology::network::GC_THRESHOLD_NS;

    struct SentFrame {
        interface: String,
        destination: MacAddress,
        eth_type: u16,
    }

    struct FakePlatform {
        interfaces: Vec<(String, MacAddress)>,
        sent: RefCell<Vec<SentFrame>>,
        push_button_calls: RefCell<Vec<String>>,
        now_ns: u64,
    }

    impl FakePlatform {
        fn new(interfaces: Vec<(&str, MacAddress)>, now_ns: u64) -> Self {
            FakePlatform {
                interfaces: interfaces.into_iter().map(|(n, m)| (n.to_string(), m)).collect(),
                sent: RefCell::new(Vec::new()),
                push_button_calls: RefCell::new(Vec::new()),
                now_ns,
            }
        }
    }

    impl PlatformIO for FakePlatform {
        fn list_interfaces(&self) -> Vec<String> {
            self.interfaces.iter().map(|(n, _)| n.clone()).collect()
        }

        fn interface_info(&self, name: &str) -> Result<InterfaceInfo, PlatformError> {
            let (_, mac) =
                self.interfaces.iter().find(|(n, _)| n == name).ok_or_else(|| PlatformError::NoSuchInterface(name.to_string()))?;
            Ok(InterfaceInfo {
                name: name.to_string(),
                mac_address: *mac,
                media_type: 0,
                is_secured: true,
                power_state: PowerState::On,
                push_button_on_going: false,
            })
        }

        fn send_raw(&self, interface: &str, dst: MacAddress, _src: MacAddress, eth_type: u16, _payload: &[u8]) -> Result<(), PlatformError> {
            self.sent.borrow_mut().push(SentFrame { interface: interface.to_string(), destination: dst, eth_type });
            Ok(())
        }

        fn poll_event(&self) -> Result<Event, PlatformError> {
            Err(PlatformError::ReceiveFailed("not used in tests".into()))
        }

        fn register_event_source(&self, _kind: TimerKind, _args: &[u8]) -> Result<(), PlatformError> {
            Ok(())
        }

        fn start_push_button(&self, interface: &str) -> Result<(), PlatformError> {
            self.push_button_calls.borrow_mut().push(interface.to_string());
            Ok(())
        }

        fn set_power_mode(&self, _interface: &str, _mode: PowerState) -> Result<(), PlatformError> {
            Ok(())
        }

        fn configure_ap(
            &self,
            _interface: &str,
            _ssid: &[u8],
            _bssid: MacAddress,
            _authentication_types: u16,
            _encryption_types: u16,
            _key: &[u8],
        ) -> Result<(), PlatformError> {
            Ok(())
        }

        fn clock_monotonic_ns(&self) -> u64 {
            self.now_ns
        }
    }

    fn test_config() -> Config {
        Config {
            al_mac_address: MacAddress::new([0x02, 0xee, 0xff, 0x33, 0x44, 0x00]),
            registrar_interface_name: None,
            map_whole_network: false,
            verbosity: 0,
        }
    }

    fn setup(now_ns: u64) -> (EventLoop<FakePlatform>, MacAddress) {
        let local_if_mac = MacAddress::new([1; 6]);
        let platform = FakePlatform::new(vec![("eth0", local_if_mac)], now_ns);
        let mut state = AlState::new(test_config());
        let dev = state.network.insert_device(state.config.al_mac_address, 0);
        state.network.local_device = Some(dev);
        let if_idx = state.network.ensure_interface(local_if_mac);
        state.network.attach_interface_to_device(dev, if_idx);
        if let Some(iface) = state.network.interfaces.get_mut(if_idx) {
            iface.name = Some("eth0".to_string());
            iface.is_secured = true;
            iface.power_state = PowerState::On;
        }
        (EventLoop::new(platform, state), local_if_mac)
    }

    #[test]
    fn discovery_timer_sends_cmdu_and_lldp_on_every_authenticated_interface() {
        let (mut event_loop, _) = setup(0);
        event_loop.handle_discovery_timer();
        let sent = event_loop.platform.sent.borrow();
        assert!(sent.iter().any(|f| f.interface == "eth0" && f.eth_type == ETHER_TYPE_1905));
        assert!(sent.iter().any(|f| f.interface == "eth0" && f.eth_type == ETHER_TYPE_LLDP));
    }

    #[test]
    fn gc_timer_broadcasts_topology_notification_when_a_device_expires() {
        let (mut event_loop, _) = setup(GC_THRESHOLD_NS + 1);
        event_loop.state.network.insert_device(MacAddress::new([9; 6]), 0);
        event_loop.handle_gc_timer();
        let sent = event_loop.platform.sent.borrow();
        assert!(sent.iter().any(|f| f.eth_type == ETHER_TYPE_1905 && f.destination == MacAddress::IEEE1905_MULTICAST));
    }

    #[test]
    fn gc_timer_stays_quiet_when_nothing_expired() {
        let (mut event_loop, _) = setup(0);
        event_loop.handle_gc_timer();
        assert!(event_loop.platform.sent.borrow().is_empty());
    }

    #[test]
    fn push_button_event_starts_on_platform_and_notifies() {
        let (mut event_loop, _) = setup(0);
        event_loop.handle_push_button();
        assert_eq!(event_loop.platform.push_button_calls.borrow().as_slice(), ["eth0"]);
        assert!(event_loop.platform.sent.borrow().iter().any(|f| f.eth_type == ETHER_TYPE_1905));
    }

    #[test]
    fn authenticated_link_with_new_peer_triggers_autoconfig_search() {
        let (mut event_loop, local_if) = setup(0);
        let peer = MacAddress::new([7; 6]);
        event_loop.handle_authenticated_link(local_if, Some(peer), peer, 1);
        let sent = event_loop.platform.sent.borrow();
        assert!(sent.iter().any(|f| f.eth_type == ETHER_TYPE_1905));
    }

    #[test]
    fn lldp_frame_adds_neighbor_edge_between_ingress_and_peer() {
        let (mut event_loop, local_if) = setup(0);
        let peer_mac = MacAddress::new([5; 6]);
        let lldp = LldpBridgeDiscovery::new(peer_mac, peer_mac);
        event_loop.handle_lldp_packet(local_if, &lldp.to_bytes());

        let local_idx = event_loop.state.network.find_interface_anywhere(local_if).unwrap();
        let peer_idx = event_loop.state.network.find_interface_anywhere(peer_mac).unwrap();
        assert!(event_loop.state.network.interfaces.get(local_idx).unwrap().neighbors.contains(&peer_idx));
    }

    #[test]
    fn topology_query_over_the_wire_gets_a_response_sent_back() {
        let (mut event_loop, local_if) = setup(0);
        let peer = MacAddress::new([7; 6]);
        let cmdu = Cmdu { message_type: CmduType::TopologyQuery, message_id: 0x99, relay_indicator: false, tlvs: vec![Tlv::EndOfMessage] };
        let bytes = cmdu.forge().unwrap();
        event_loop.handle_1905_packet(local_if, peer, &bytes);
        let sent = event_loop.platform.sent.borrow();
        assert!(sent.iter().any(|f| f.eth_type == ETHER_TYPE_1905 && f.destination == peer));
    }
}
