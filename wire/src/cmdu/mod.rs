mod cmdu_type;
pub use cmdu_type::CmduType;

mod header;
pub use header::CmduHeader;

mod codec;
pub use codec::{Cmdu, MAX_FRAGMENT_PAYLOAD};
