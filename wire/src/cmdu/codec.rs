use crate::cmdu::{CmduHeader, CmduType};
use crate::err::CmduError;
use crate::tlv::{parse_tlv_stream, Tlv};

/// A single 1905.1 CMDU: an 8-byte header plus a TLV stream ending in
/// `End of message`.
///
/// This type always represents a *complete* (reassembled) CMDU. Splitting
/// one across Ethernet frames and putting it back together again is the
/// `map1905-defrag` crate's job; this crate only knows how to turn bytes
/// into TLVs and back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cmdu {
    pub message_type: CmduType,
    pub message_id: u16,
    pub relay_indicator: bool,
    pub tlvs: Vec<Tlv>,
}

/// Ethernet payloads this large or smaller are guaranteed to fit in one
/// fragment without exceeding the standard 1500-byte MTU.
pub const MAX_FRAGMENT_PAYLOAD: usize = 1500;

impl Cmdu {
    /// Parse a single already-reassembled CMDU (header + full TLV stream).
    pub fn from_slice(slice: &[u8]) -> Result<Cmdu, CmduError> {
        let header = CmduHeader::from_slice(slice)?;
        let tlvs = parse_tlv_stream(&slice[CmduHeader::LEN..])?;
        if !matches!(tlvs.last(), Some(Tlv::EndOfMessage)) {
            return Err(CmduError::MissingEndOfMessage);
        }
        Ok(Cmdu {
            message_type: header.message_type,
            message_id: header.message_id,
            relay_indicator: header.relay_indicator,
            tlvs,
        })
    }

    fn tlv_stream_bytes(&self) -> Result<Vec<u8>, CmduError> {
        let mut out = Vec::new();
        for tlv in &self.tlvs {
            tlv.forge(&mut out)?;
        }
        if !matches!(self.tlvs.last(), Some(Tlv::EndOfMessage)) {
            Tlv::EndOfMessage.forge(&mut out)?;
        }
        Ok(out)
    }

    /// Forge this CMDU as a single, unfragmented frame. Fails if the TLV
    /// stream would not fit in one `MAX_FRAGMENT_PAYLOAD`-byte fragment;
    /// use [`Cmdu::forge_fragmented`] when the payload may be larger.
    pub fn forge(&self) -> Result<Vec<u8>, CmduError> {
        let body = self.tlv_stream_bytes()?;
        if CmduHeader::LEN + body.len() > MAX_FRAGMENT_PAYLOAD {
            return Err(CmduError::ExceedsSingleFragment { len: body.len() });
        }
        let header = CmduHeader {
            message_version: 0,
            message_type: self.message_type,
            message_id: self.message_id,
            fragment_id: 0,
            last_fragment: true,
            relay_indicator: self.relay_indicator,
        };
        let mut out = Vec::with_capacity(CmduHeader::LEN + body.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Forge this CMDU, splitting the TLV stream across as many
    /// `fragment_id`-numbered frames as necessary so that no single frame
    /// exceeds `MAX_FRAGMENT_PAYLOAD` bytes. A TLV is never split across a
    /// fragment boundary — a lone TLV larger than a fragment's budget is an
    /// error, since the 1905.1 wire format has no sub-TLV fragmentation.
    pub fn forge_fragmented(&self) -> Result<Vec<Vec<u8>>, CmduError> {
        let mut per_tlv = Vec::with_capacity(self.tlvs.len());
        for tlv in &self.tlvs {
            let mut buf = Vec::new();
            tlv.forge(&mut buf)?;
            per_tlv.push(buf);
        }
        let budget = MAX_FRAGMENT_PAYLOAD - CmduHeader::LEN;

        let mut fragments: Vec<Vec<u8>> = Vec::new();
        let mut current = Vec::new();
        for (tlv, bytes) in self.tlvs.iter().zip(per_tlv.into_iter()) {
            if bytes.len() > budget {
                return Err(CmduError::ExceedsSingleFragment { len: bytes.len() });
            }
            if !current.is_empty() && current.len() + bytes.len() > budget {
                fragments.push(std::mem::take(&mut current));
            }
            current.extend_from_slice(&bytes);
            let _ = tlv;
        }
        if !current.is_empty() || fragments.is_empty() {
            fragments.push(current);
        }

        let last_index = fragments.len() - 1;
        let has_eom = matches!(self.tlvs.last(), Some(Tlv::EndOfMessage));
        let mut out = Vec::with_capacity(fragments.len());
        for (i, mut body) in fragments.into_iter().enumerate() {
            let is_last = i == last_index;
            if is_last && !has_eom {
                Tlv::EndOfMessage.forge(&mut body)?;
            }
            let header = CmduHeader {
                message_version: 0,
                message_type: self.message_type,
                message_id: self.message_id,
                fragment_id: i as u8,
                last_fragment: is_last,
                relay_indicator: self.relay_indicator,
            };
            let mut frame = Vec::with_capacity(CmduHeader::LEN + body.len());
            frame.extend_from_slice(&header.to_bytes());
            frame.extend_from_slice(&body);
            out.push(frame);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tlv::SearchedRoleTlv;
    use crate::tlv::common::Role;

    #[test]
    fn round_trip_single_fragment() {
        let cmdu = Cmdu {
            message_type: CmduType::TopologyQuery,
            message_id: 7,
            relay_indicator: false,
            tlvs: vec![Tlv::EndOfMessage],
        };
        let bytes = cmdu.forge().unwrap();
        assert_eq!(Cmdu::from_slice(&bytes).unwrap(), cmdu);
    }

    #[test]
    fn adds_missing_end_of_message() {
        let cmdu = Cmdu {
            message_type: CmduType::ApAutoconfigurationSearch,
            message_id: 1,
            relay_indicator: false,
            tlvs: vec![Tlv::SearchedRole(SearchedRoleTlv { role: Role::Registrar })],
        };
        let bytes = cmdu.forge().unwrap();
        let parsed = Cmdu::from_slice(&bytes).unwrap();
        assert_eq!(parsed.tlvs.last(), Some(&Tlv::EndOfMessage));
    }

    #[test]
    fn fragments_large_tlv_streams() {
        let big_tlv = Tlv::VendorSpecific(crate::tlv::VendorSpecificTlv {
            oui: [1, 2, 3],
            payload: vec![0xAB; 2000],
        });
        let cmdu = Cmdu {
            message_type: CmduType::VendorSpecific,
            message_id: 42,
            relay_indicator: true,
            tlvs: vec![big_tlv, Tlv::EndOfMessage],
        };
        let fragments = cmdu.forge_fragmented().unwrap();
        assert!(fragments.len() > 1);
        for (i, frame) in fragments.iter().enumerate() {
            let header = CmduHeader::from_slice(frame).unwrap();
            assert_eq!(header.fragment_id as usize, i);
            assert_eq!(header.last_fragment, i == fragments.len() - 1);
        }
    }
}
