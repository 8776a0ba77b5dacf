//! Wire codec for the IEEE 1905.1a Abstraction Layer: CMDU headers, the TLV
//! table carried in their payloads, and the LLDP bridge-discovery PDU sent
//! alongside topology discovery.
//!
//! This crate does no I/O and no fragmentation bookkeeping of its own — it
//! turns a complete, already-reassembled CMDU into bytes and back. Splitting
//! a CMDU across multiple Ethernet frames and reassembling it on receipt is
//! `map1905-defrag`'s job.
pub mod cmdu;
pub mod err;
pub mod lldp;
pub mod mac;
pub mod tlv;

pub use cmdu::{Cmdu, CmduHeader, CmduType};
pub use mac::MacAddress;
