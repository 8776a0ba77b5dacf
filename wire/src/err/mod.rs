mod tlv_error;
pub use tlv_error::*;

mod cmdu_error;
pub use cmdu_error::*;

mod lldp_error;
pub use lldp_error::*;
