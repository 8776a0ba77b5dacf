//! A Linux raw-socket [`PlatformIO`] implementation built on `pnet`'s
//! datalink channels, mirroring the ping example's combination of
//! `pnet` + `socket2` + `crossbeam-channel` for a small networking daemon.
//!
//! Netlink/UCI driven AP (re)configuration is out of scope (§1 Non-goals);
//! `configure_ap`/`set_power_mode`/`start_push_button` log their intent and
//! return `Ok(())` so the rest of the core can be exercised against a real
//! interface without a full hostapd/wpa_supplicant integration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use pnet::datalink::{self, Channel::Ethernet, DataLinkSender};
use pnet::packet::ethernet::EthernetPacket;
use pnet::packet::Packet;

use map1905_wire::mac::MacAddress;
use map1905_wire::tlv::PowerState;

use crate::error::PlatformError;
use crate::platform::{Event, InterfaceInfo, PlatformIO, TimerKind};

struct InterfaceHandle {
    mac: MacAddress,
    sender: Mutex<Box<dyn DataLinkSender>>,
    is_secured: AtomicU64,
}

/// Platform backed by one raw Ethernet socket per local interface. Received
/// frames are pumped into a shared [`crossbeam_channel`] by one reader
/// thread per interface; timers run on their own threads and push
/// `Event::Timer` the same way.
pub struct LinuxPlatform {
    interfaces: HashMap<String, InterfaceHandle>,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    start: Instant,
}

/// Every non-loopback interface `pnet` can see, for use as the default
/// interface set when the CLI is not told to restrict to specific ones.
pub fn discover_interface_names() -> Vec<String> {
    datalink::interfaces()
        .into_iter()
        .filter(|i| !i.is_loopback() && i.mac.is_some())
        .map(|i| i.name)
        .collect()
}

impl LinuxPlatform {
    /// Opens a raw Ethernet channel on every interface named in
    /// `interface_names`. All are treated as authenticated/On at startup;
    /// a real deployment would source `is_secured` from hostapd/wpa_cli.
    pub fn new(interface_names: &[String]) -> Result<Self, PlatformError> {
        let (events_tx, events_rx) = unbounded();
        let known = datalink::interfaces();
        let mut interfaces = HashMap::new();

        for name in interface_names {
            let iface = known
                .iter()
                .find(|i| &i.name == name)
                .ok_or_else(|| PlatformError::NoSuchInterface(name.clone()))?;
            let mac = iface
                .mac
                .map(|m| MacAddress::new(m.octets()))
                .ok_or_else(|| PlatformError::NoSuchInterface(name.clone()))?;

            let (tx, rx) = match datalink::channel(iface, Default::default()) {
                Ok(Ethernet(tx, rx)) => (tx, rx),
                Ok(_) => return Err(PlatformError::ReceiveFailed(format!("{name}: unsupported channel type"))),
                Err(e) => return Err(PlatformError::ReceiveFailed(format!("{name}: {e}"))),
            };

            spawn_receive_thread(name.clone(), mac, rx, events_tx.clone());
            interfaces.insert(name.clone(), InterfaceHandle { mac, sender: Mutex::new(tx), is_secured: AtomicU64::new(1) });
        }

        Ok(LinuxPlatform { interfaces, events_tx, events_rx, start: Instant::now() })
    }
}

fn spawn_receive_thread(
    name: String,
    interface_mac: MacAddress,
    mut rx: Box<dyn pnet::datalink::DataLinkReceiver>,
    events_tx: Sender<Event>,
) {
    thread::spawn(move || loop {
        match rx.next() {
            Ok(frame) => {
                let Some(packet) = EthernetPacket::new(frame) else { continue };
                let source_mac = MacAddress::new(packet.get_source().octets());
                let ether_type = packet.get_ethertype().0;
                let bytes = packet.payload().to_vec();
                if events_tx.send(Event::NewPacket { interface_mac, source_mac, ether_type, bytes }).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::warn!("receive error on {name}: {e}");
                return;
            }
        }
    });
}

fn spawn_timer_thread(kind: TimerKind, period: Duration, events_tx: Sender<Event>) {
    thread::spawn(move || loop {
        thread::sleep(period);
        if events_tx.send(Event::Timer(kind)).is_err() {
            return;
        }
    });
}

impl PlatformIO for LinuxPlatform {
    fn list_interfaces(&self) -> Vec<String> {
        self.interfaces.keys().cloned().collect()
    }

    fn interface_info(&self, name: &str) -> Result<InterfaceInfo, PlatformError> {
        let handle = self.interfaces.get(name).ok_or_else(|| PlatformError::NoSuchInterface(name.to_string()))?;
        Ok(InterfaceInfo {
            name: name.to_string(),
            mac_address: handle.mac,
            media_type: 0x0000,
            is_secured: handle.is_secured.load(Ordering::Relaxed) != 0,
            power_state: PowerState::On,
            push_button_on_going: false,
        })
    }

    fn send_raw(
        &self,
        interface: &str,
        dst: MacAddress,
        src: MacAddress,
        eth_type: u16,
        payload: &[u8],
    ) -> Result<(), PlatformError> {
        let handle = self.interfaces.get(interface).ok_or_else(|| PlatformError::NoSuchInterface(interface.to_string()))?;
        let mut frame = Vec::with_capacity(14 + payload.len());
        frame.extend_from_slice(&dst.octets());
        frame.extend_from_slice(&src.octets());
        frame.extend_from_slice(&eth_type.to_be_bytes());
        frame.extend_from_slice(payload);

        let mut sender = handle.sender.lock().expect("interface sender mutex poisoned");
        match sender.send_to(&frame, None) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(PlatformError::SendFailed { interface: interface.to_string(), reason: e.to_string() }),
            None => Err(PlatformError::SendFailed { interface: interface.to_string(), reason: "no route to send on this channel".into() }),
        }
    }

    fn poll_event(&self) -> Result<Event, PlatformError> {
        self.events_rx.recv().map_err(|_| PlatformError::ReceiveFailed("event channel closed".into()))
    }

    fn register_event_source(&self, kind: TimerKind, args: &[u8]) -> Result<(), PlatformError> {
        let period_ms = args.get(0..8).map(|b| u64::from_be_bytes(b.try_into().unwrap())).unwrap_or(match kind {
            TimerKind::Discovery => 60_000,
            TimerKind::GarbageCollector => 70_000,
        });
        spawn_timer_thread(kind, Duration::from_millis(period_ms), self.events_tx.clone());
        Ok(())
    }

    fn start_push_button(&self, interface: &str) -> Result<(), PlatformError> {
        log::info!("push-button procedure requested on {interface} (no technology-specific driver wired up)");
        Ok(())
    }

    fn set_power_mode(&self, interface: &str, mode: PowerState) -> Result<(), PlatformError> {
        log::info!("power mode change requested on {interface}: {mode:?}");
        Ok(())
    }

    fn configure_ap(
        &self,
        interface: &str,
        ssid: &[u8],
        bssid: MacAddress,
        authentication_types: u16,
        encryption_types: u16,
        key: &[u8],
    ) -> Result<(), PlatformError> {
        log::info!(
            "AP configuration requested on {interface}: bssid={bssid} ssid_len={} auth={authentication_types:#06x} encr={encryption_types:#06x} key_len={}",
            ssid.len(),
            key.len()
        );
        Ok(())
    }

    fn clock_monotonic_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}
