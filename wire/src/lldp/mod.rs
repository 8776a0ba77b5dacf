pub mod tlv;

mod payload;
pub use payload::LldpBridgeDiscovery;
