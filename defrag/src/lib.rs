//! CMDU fragment reassembly and duplicate-CMDU suppression.
//!
//! Two independent pieces sit between the raw-frame receive path and CMDU
//! dispatch: [`Reassembler`] glues fragment_id-numbered frames back into a
//! single [`map1905_wire::cmdu::Cmdu`], and [`DuplicateFilter`] drops CMDUs
//! already processed from the same sender.

mod dup_filter;
mod error;
mod reassembler;

pub use dup_filter::{DuplicateFilter, DEFAULT_CAPACITY};
pub use error::ReassemblyError;
pub use reassembler::{Reassembler, DEFAULT_MAX_SLOTS, MAX_FRAGMENTS_PER_CMDU};
