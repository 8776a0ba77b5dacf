//! The in-memory topology graph: `AlDevice -> Radio -> Interface ->
//! WifiInterface -> BssInfo`, with symmetric neighbor cross-links and an
//! implicit process-wide `Network` root.

pub mod arena;
pub mod network;

pub use arena::{Arena, Index};
pub use network::{
    AlDevice, Band, BssInfo, Interface, Network, Profile, Radio, Registrar, WifiInterface, WifiRole,
    WscDeviceData, GC_THRESHOLD_NS,
};
