use map1905_wire::err::CmduError;

/// Error reassembling or decoding a CMDU fragment stream.
#[derive(Debug, thiserror::Error)]
pub enum ReassemblyError {
    #[error("fragment {fragment_id} for message id {message_id:#06x} arrived after the slot's last fragment was already seen")]
    FragmentAfterLast { message_id: u16, fragment_id: u8 },

    #[error("message id {message_id:#06x} has more than {max} fragments outstanding")]
    TooManyFragments { message_id: u16, max: usize },

    #[error("duplicate fragment {fragment_id} for message id {message_id:#06x}")]
    DuplicateFragment { message_id: u16, fragment_id: u8 },

    #[error(transparent)]
    Decode(#[from] CmduError),
}
