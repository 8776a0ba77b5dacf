use std::collections::HashMap;

use map1905_wire::mac::MacAddress;
use map1905_wire::tlv::{FreqBand, PowerState};

use crate::topology::arena::{Arena, Index};

/// How long (in nanoseconds of monotonic clock) an `AlDevice` may go without
/// a refresh before the garbage collector reclaims it. 70s timer + margin,
/// per §8 scenario 6 (71s triggers removal).
pub const GC_THRESHOLD_NS: u64 = 70_000_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WifiRole {
    Ap,
    Sta,
    Other,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BssInfo {
    pub bssid: MacAddress,
    pub ssid: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct WifiInterface {
    pub role: WifiRole,
    pub bss: BssInfo,
    pub channel: u8,
    /// MAC addresses of associated clients. Invariant: every entry here is
    /// also present in the owning `Interface`'s `neighbors`.
    pub clients: Vec<MacAddress>,
}

#[derive(Clone, Debug)]
pub struct Interface {
    /// Local-only: absent for dangling neighbor interfaces we've only heard
    /// about, never enumerated from the platform.
    pub name: Option<String>,
    pub mac: MacAddress,
    pub media_type: u16,
    pub media_specific_info: Vec<u8>,
    pub last_discovery: Option<u64>,
    pub neighbors: Vec<Index<Interface>>,
    pub owner: Option<Index<AlDevice>>,
    pub is_secured: bool,
    pub power_state: PowerState,
    pub wifi: Option<WifiInterface>,
    pub l2_neighbors: Vec<(MacAddress, Vec<MacAddress>)>,
}

impl Interface {
    fn dangling(mac: MacAddress) -> Interface {
        Interface {
            name: None,
            mac,
            media_type: 0xFFFF,
            media_specific_info: Vec::new(),
            last_discovery: None,
            neighbors: Vec::new(),
            owner: None,
            is_secured: false,
            power_state: PowerState::On,
            wifi: None,
            l2_neighbors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Band {
    pub band: FreqBand,
    pub channels: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Radio {
    pub unique_id: MacAddress,
    pub name: String,
    pub index: u32,
    pub bands: Vec<Band>,
    pub configured_bsses: Vec<Index<Interface>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Profile {
    Profile1,
    Profile2,
}

#[derive(Clone, Debug)]
pub struct AlDevice {
    pub al_mac: MacAddress,
    pub interfaces: Vec<Index<Interface>>,
    pub radios: Vec<Index<Radio>>,
    pub is_multi_ap_agent: bool,
    pub last_seen_ns: u64,
    pub profile: Profile,
    pub bridging_tuples: Vec<Vec<MacAddress>>,
}

#[derive(Clone, Debug)]
pub struct WscDeviceData {
    pub bssid: MacAddress,
    pub device_name: String,
    pub manufacturer: String,
    pub model_name: String,
    pub serial_number: String,
    pub uuid: [u8; 16],
    pub rf_bands: u8,
    pub ssid: Vec<u8>,
    pub authentication_types: u16,
    pub encryption_types: u16,
    pub key: Vec<u8>,
}

/// Singleton record of the network's Multi-AP registrar/controller, one
/// WSC credential slot per RF band (2.4/5/60 GHz).
#[derive(Clone, Debug, Default)]
pub struct Registrar {
    pub device: Option<Index<AlDevice>>,
    pub is_multi_ap: bool,
    pub wsc_slots: [Option<WscDeviceData>; 3],
}

/// The process-wide topology graph. Mutated only by the event loop (§4.4);
/// there are no internal locks.
#[derive(Default)]
pub struct Network {
    pub devices: Arena<AlDevice>,
    pub radios: Arena<Radio>,
    pub interfaces: Arena<Interface>,
    pub local_device: Option<Index<AlDevice>>,
    pub registrar: Registrar,
    by_al_mac: HashMap<MacAddress, Index<AlDevice>>,
    by_if_mac: HashMap<MacAddress, Index<Interface>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: returns the existing device if already known, else
    /// creates one. Always refreshes `last_seen_ns`.
    pub fn insert_device(&mut self, al_mac: MacAddress, now_ns: u64) -> Index<AlDevice> {
        if let Some(&idx) = self.by_al_mac.get(&al_mac) {
            if let Some(dev) = self.devices.get_mut(idx) {
                dev.last_seen_ns = now_ns;
            }
            return idx;
        }
        let idx = self.devices.insert(AlDevice {
            al_mac,
            interfaces: Vec::new(),
            radios: Vec::new(),
            is_multi_ap_agent: false,
            last_seen_ns: now_ns,
            profile: Profile::Profile1,
            bridging_tuples: Vec::new(),
        });
        self.by_al_mac.insert(al_mac, idx);
        idx
    }

    pub fn find_device(&self, al_mac: MacAddress) -> Option<Index<AlDevice>> {
        self.by_al_mac.get(&al_mac).copied()
    }

    pub fn find_interface_anywhere(&self, if_mac: MacAddress) -> Option<Index<Interface>> {
        self.by_if_mac.get(&if_mac).copied()
    }

    pub fn find_interface(&self, al_mac: MacAddress, if_mac: MacAddress) -> Option<Index<Interface>> {
        let dev_idx = self.find_device(al_mac)?;
        let dev = self.devices.get(dev_idx)?;
        let if_idx = self.find_interface_anywhere(if_mac)?;
        dev.interfaces.contains(&if_idx).then_some(if_idx)
    }

    /// Look up an interface by MAC, creating a dangling (owner-less)
    /// interface record for it if this is the first time it's been seen.
    pub fn ensure_interface(&mut self, if_mac: MacAddress) -> Index<Interface> {
        if let Some(&idx) = self.by_if_mac.get(&if_mac) {
            return idx;
        }
        let idx = self.interfaces.insert(Interface::dangling(if_mac));
        self.by_if_mac.insert(if_mac, idx);
        idx
    }

    /// Moves a previously-dangling interface into `dev`'s ownership.
    pub fn attach_interface_to_device(&mut self, dev: Index<AlDevice>, iface: Index<Interface>) {
        if let Some(i) = self.interfaces.get_mut(iface) {
            i.owner = Some(dev);
        }
        if let Some(d) = self.devices.get_mut(dev) {
            if !d.interfaces.contains(&iface) {
                d.interfaces.push(iface);
            }
        }
    }

    /// Symmetric; no-op if the edge already exists.
    pub fn add_neighbor(&mut self, a: Index<Interface>, b: Index<Interface>) {
        if a == b {
            return;
        }
        if let Some(ia) = self.interfaces.get_mut(a) {
            if !ia.neighbors.contains(&b) {
                ia.neighbors.push(b);
            }
        }
        if let Some(ib) = self.interfaces.get_mut(b) {
            if !ib.neighbors.contains(&a) {
                ib.neighbors.push(a);
            }
        }
    }

    /// Symmetric; destroys either endpoint if it is now both owner-less and
    /// neighbor-less (the dangling-interface invariant in §3.4).
    pub fn remove_neighbor(&mut self, a: Index<Interface>, b: Index<Interface>) {
        if let Some(ia) = self.interfaces.get_mut(a) {
            ia.neighbors.retain(|&x| x != b);
        }
        if let Some(ib) = self.interfaces.get_mut(b) {
            ib.neighbors.retain(|&x| x != a);
        }
        self.prune_if_dangling(a);
        self.prune_if_dangling(b);
    }

    fn prune_if_dangling(&mut self, idx: Index<Interface>) {
        let should_remove = match self.interfaces.get(idx) {
            Some(iface) => iface.owner.is_none() && iface.neighbors.is_empty(),
            None => false,
        };
        if should_remove {
            if let Some(iface) = self.interfaces.remove(idx) {
                self.by_if_mac.remove(&iface.mac);
            }
        }
    }

    /// Drops every `AlDevice` stale beyond `GC_THRESHOLD_NS`, cascading to
    /// its owned radios and interfaces (interfaces become dangling
    /// neighbors and are pruned in turn if nothing still points at them).
    /// Returns whether anything was removed.
    pub fn run_garbage_collector(&mut self, now_ns: u64) -> bool {
        let stale: Vec<Index<AlDevice>> = self
            .devices
            .iter()
            .filter(|(idx, dev)| {
                Some(*idx) != self.local_device && now_ns.saturating_sub(dev.last_seen_ns) >= GC_THRESHOLD_NS
            })
            .map(|(idx, _)| idx)
            .collect();

        let changed = !stale.is_empty();
        for dev_idx in stale {
            let Some(dev) = self.devices.remove(dev_idx) else { continue };
            self.by_al_mac.remove(&dev.al_mac);
            for radio_idx in dev.radios {
                self.radios.remove(radio_idx);
            }
            for if_idx in dev.interfaces {
                if let Some(iface) = self.interfaces.get_mut(if_idx) {
                    iface.owner = None;
                }
                let neighbors = self.interfaces.get(if_idx).map(|i| i.neighbors.clone()).unwrap_or_default();
                for n in neighbors {
                    self.remove_neighbor(if_idx, n);
                }
                self.prune_if_dangling(if_idx);
            }
        }
        changed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_device_is_idempotent_and_refreshes_last_seen() {
        let mut net = Network::new();
        let mac = MacAddress::new([1; 6]);
        let a = net.insert_device(mac, 100);
        let b = net.insert_device(mac, 200);
        assert_eq!(a, b);
        assert_eq!(net.devices.get(a).unwrap().last_seen_ns, 200);
    }

    #[test]
    fn neighbor_edges_are_symmetric() {
        let mut net = Network::new();
        let a = net.ensure_interface(MacAddress::new([1; 6]));
        let b = net.ensure_interface(MacAddress::new([2; 6]));
        net.add_neighbor(a, b);
        assert!(net.interfaces.get(a).unwrap().neighbors.contains(&b));
        assert!(net.interfaces.get(b).unwrap().neighbors.contains(&a));
        net.remove_neighbor(a, b);
        assert!(net.interfaces.get(a).is_none());
        assert!(net.interfaces.get(b).is_none());
    }

    #[test]
    fn dangling_interface_survives_while_neighbor_edge_remains() {
        let mut net = Network::new();
        let dev = net.insert_device(MacAddress::new([9; 6]), 0);
        let owned = net.ensure_interface(MacAddress::new([1; 6]));
        net.attach_interface_to_device(dev, owned);
        let dangling = net.ensure_interface(MacAddress::new([2; 6]));
        net.add_neighbor(owned, dangling);
        // dangling has no owner but does have a neighbor edge: must survive.
        assert!(net.interfaces.get(dangling).is_some());
    }

    #[test]
    fn gc_removes_stale_devices_and_reports_change() {
        let mut net = Network::new();
        let mac = MacAddress::new([1; 6]);
        net.insert_device(mac, 0);
        let changed = net.run_garbage_collector(GC_THRESHOLD_NS + 1);
        assert!(changed);
        assert!(net.find_device(mac).is_none());
    }

    #[test]
    fn gc_never_removes_local_device() {
        let mut net = Network::new();
        let mac = MacAddress::new([1; 6]);
        let idx = net.insert_device(mac, 0);
        net.local_device = Some(idx);
        let changed = net.run_garbage_collector(GC_THRESHOLD_NS + 1);
        assert!(!changed);
        assert!(net.find_device(mac).is_some());
    }
}
