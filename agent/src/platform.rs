use map1905_wire::mac::MacAddress;
use map1905_wire::tlv::PowerState;

use crate::error::PlatformError;

/// A timer source the platform schedules on the loop's behalf.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerKind {
    Discovery,
    GarbageCollector,
}

/// Everything the event loop can be woken up by (§4.7).
#[derive(Clone, Debug)]
pub enum Event {
    NewPacket { interface_mac: MacAddress, source_mac: MacAddress, ether_type: u16, bytes: Vec<u8> },
    Timer(TimerKind),
    PushButton,
    AuthenticatedLink {
        local_mac: MacAddress,
        new_peer_mac: Option<MacAddress>,
        origin_al_mac: MacAddress,
        origin_message_id: u16,
    },
    TopologyChange,
    Alme { client_id: u32, request: Vec<u8> },
}

/// Static facts and live state about one local interface, as reported by
/// the platform.
#[derive(Clone, Debug)]
pub struct InterfaceInfo {
    pub name: String,
    pub mac_address: MacAddress,
    pub media_type: u16,
    pub is_secured: bool,
    pub power_state: PowerState,
    pub push_button_on_going: bool,
}

/// The capability the core consumes for everything outside its own process:
/// raw packet I/O, interface enumeration, and AP (re)configuration (§6.2).
/// All calls are synchronous with respect to the event loop; an
/// implementation is free to push blocking work to a worker thread as long
/// as results come back as [`Event`]s on the loop's queue.
pub trait PlatformIO {
    fn list_interfaces(&self) -> Vec<String>;

    fn interface_info(&self, name: &str) -> Result<InterfaceInfo, PlatformError>;

    fn send_raw(
        &self,
        interface: &str,
        dst: MacAddress,
        src: MacAddress,
        eth_type: u16,
        payload: &[u8],
    ) -> Result<(), PlatformError>;

    /// Blocking receive of the next platform-sourced event.
    fn poll_event(&self) -> Result<Event, PlatformError>;

    /// Arm a recurring or one-shot source of [`Event`]s (a timer, a socket,
    /// a management-channel listener) that the platform is responsible for
    /// waking and delivering back through `poll_event`. `args` is an opaque,
    /// kind-specific payload (e.g. a period in milliseconds for timers).
    fn register_event_source(&self, kind: TimerKind, args: &[u8]) -> Result<(), PlatformError>;

    fn start_push_button(&self, interface: &str) -> Result<(), PlatformError>;

    fn set_power_mode(&self, interface: &str, mode: PowerState) -> Result<(), PlatformError>;

    #[allow(clippy::too_many_arguments)]
    fn configure_ap(
        &self,
        interface: &str,
        ssid: &[u8],
        bssid: MacAddress,
        authentication_types: u16,
        encryption_types: u16,
        key: &[u8],
    ) -> Result<(), PlatformError>;

    fn clock_monotonic_ns(&self) -> u64;
}
