use std::collections::{HashMap, VecDeque};

use map1905_wire::cmdu::{Cmdu, CmduHeader};
use map1905_wire::mac::MacAddress;

use crate::error::ReassemblyError;

/// A 1905.1 CMDU may be split across at most this many fragments
/// (`fragment_id` 0, 1, 2).
pub const MAX_FRAGMENTS_PER_CMDU: usize = 3;

/// Default number of concurrent in-flight fragment streams the reassembler
/// keeps before evicting the least recently touched one.
pub const DEFAULT_MAX_SLOTS: usize = 5;

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
struct SlotKey {
    src: MacAddress,
    dst: MacAddress,
    message_id: u16,
}

#[derive(Debug, Clone)]
struct Slot<Timestamp> {
    fragments: [Option<Vec<u8>>; MAX_FRAGMENTS_PER_CMDU],
    last_fragment_id: Option<u8>,
    last_touched: Timestamp,
}

impl<Timestamp> Slot<Timestamp> {
    fn received_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_some()).count()
    }

    fn is_complete(&self) -> bool {
        match self.last_fragment_id {
            Some(last) => self.received_count() == last as usize + 1,
            None => false,
        }
    }
}

/// Reassembles CMDU fragment streams keyed by `(src_mac, dst_mac,
/// message_id)`, evicting the least recently touched in-flight stream once
/// `max_slots` is exceeded.
///
/// `Timestamp` is caller-supplied so the event loop's own notion of time can
/// be threaded through without this crate depending on `std::time` or any
/// particular clock; pass `()` if you don't need one.
#[derive(Debug, Clone)]
pub struct Reassembler<Timestamp = ()>
where
    Timestamp: Clone + core::fmt::Debug,
{
    slots: HashMap<SlotKey, Slot<Timestamp>>,
    recency: VecDeque<SlotKey>,
    max_slots: usize,
}

impl<Timestamp> Default for Reassembler<Timestamp>
where
    Timestamp: Clone + core::fmt::Debug,
{
    fn default() -> Self {
        Reassembler::new(DEFAULT_MAX_SLOTS)
    }
}

impl<Timestamp> Reassembler<Timestamp>
where
    Timestamp: Clone + core::fmt::Debug,
{
    pub fn new(max_slots: usize) -> Self {
        Reassembler { slots: HashMap::new(), recency: VecDeque::new(), max_slots }
    }

    fn touch(&mut self, key: SlotKey) {
        self.recency.retain(|k| *k != key);
        self.recency.push_back(key);
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self.recency.pop_front() {
            self.slots.remove(&oldest);
            log::warn!(
                "fragment reassembly slot table full, evicting in-flight CMDU message id {:#06x} from {}",
                oldest.message_id,
                oldest.src
            );
        }
    }

    /// Feed one received fragment into the reassembler. `tlv_bytes` is the
    /// fragment's payload *after* the 8-byte CMDU header. Returns the
    /// reassembled [`Cmdu`] once its last fragment has arrived, or `None`
    /// while more fragments are still outstanding.
    pub fn accept(
        &mut self,
        src: MacAddress,
        dst: MacAddress,
        header: &CmduHeader,
        tlv_bytes: &[u8],
        now: Timestamp,
    ) -> Result<Option<Cmdu>, ReassemblyError> {
        let key = SlotKey { src, dst, message_id: header.message_id };
        let fragment_id = header.fragment_id as usize;
        if fragment_id >= MAX_FRAGMENTS_PER_CMDU {
            return Err(ReassemblyError::TooManyFragments {
                message_id: header.message_id,
                max: MAX_FRAGMENTS_PER_CMDU,
            });
        }

        if !self.slots.contains_key(&key) && self.slots.len() >= self.max_slots {
            self.evict_lru();
        }

        let slot = self.slots.entry(key).or_insert_with(|| Slot {
            fragments: Default::default(),
            last_fragment_id: None,
            last_touched: now.clone(),
        });

        if let Some(last) = slot.last_fragment_id {
            if fragment_id as u8 > last {
                return Err(ReassemblyError::FragmentAfterLast {
                    message_id: header.message_id,
                    fragment_id: header.fragment_id,
                });
            }
        }
        if slot.fragments[fragment_id].is_some() {
            return Err(ReassemblyError::DuplicateFragment {
                message_id: header.message_id,
                fragment_id: header.fragment_id,
            });
        }

        slot.fragments[fragment_id] = Some(tlv_bytes.to_vec());
        slot.last_touched = now;
        if header.last_fragment {
            slot.last_fragment_id = Some(header.fragment_id);
        }

        let complete = slot.is_complete();
        self.touch(key);

        if !complete {
            return Ok(None);
        }

        let slot = self.slots.remove(&key).expect("slot was just touched");
        self.recency.retain(|k| *k != key);

        let mut body = Vec::new();
        for fragment in slot.fragments.iter().take(slot.last_fragment_id.unwrap() as usize + 1) {
            body.extend_from_slice(fragment.as_ref().expect("is_complete guarantees every slot is filled"));
        }

        let mut frame = Vec::with_capacity(CmduHeader::LEN + body.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&body);
        Ok(Some(Cmdu::from_slice(&frame)?))
    }

    /// Number of fragment streams currently in flight.
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use map1905_wire::cmdu::CmduType;
    use map1905_wire::tlv::Tlv;

    fn header(message_id: u16, fragment_id: u8, last: bool) -> CmduHeader {
        CmduHeader {
            message_version: 0,
            message_type: CmduType::TopologyQuery,
            message_id,
            fragment_id,
            last_fragment: last,
            relay_indicator: false,
        }
    }

    #[test]
    fn single_fragment_completes_immediately() {
        let mut r = Reassembler::<()>::default();
        let mut eom = Vec::new();
        Tlv::EndOfMessage.forge(&mut eom).unwrap();
        let out = r.accept(MacAddress::new([1; 6]), MacAddress::new([2; 6]), &header(1, 0, true), &eom, ()).unwrap();
        assert!(out.is_some());
        assert_eq!(r.in_flight(), 0);
    }

    #[test]
    fn waits_for_all_fragments() {
        let mut r = Reassembler::<()>::default();
        let src = MacAddress::new([1; 6]);
        let dst = MacAddress::new([2; 6]);
        let first = r.accept(src, dst, &header(5, 0, false), &[0xAA], ()).unwrap();
        assert!(first.is_none());
        assert_eq!(r.in_flight(), 1);

        let mut eom = Vec::new();
        Tlv::EndOfMessage.forge(&mut eom).unwrap();
        let second = r.accept(src, dst, &header(5, 1, true), &eom, ()).unwrap();
        assert!(second.is_some());
        assert_eq!(r.in_flight(), 0);
    }

    #[test]
    fn rejects_too_many_fragments() {
        let mut r = Reassembler::<()>::default();
        let err = r.accept(MacAddress::new([1; 6]), MacAddress::new([2; 6]), &header(9, 3, false), &[], ());
        assert!(matches!(err, Err(ReassemblyError::TooManyFragments { .. })));
    }

    #[test]
    fn rejects_duplicate_fragment_id() {
        let mut r = Reassembler::<()>::default();
        let src = MacAddress::new([1; 6]);
        let dst = MacAddress::new([2; 6]);
        r.accept(src, dst, &header(2, 0, false), &[0xAA], ()).unwrap();
        let err = r.accept(src, dst, &header(2, 0, false), &[0xBB], ());
        assert!(matches!(err, Err(ReassemblyError::DuplicateFragment { .. })));
    }

    #[test]
    fn evicts_least_recently_touched_slot_when_full() {
        let mut r = Reassembler::<()>::new(1);
        let a = MacAddress::new([1; 6]);
        let b = MacAddress::new([2; 6]);
        let dst = MacAddress::new([9; 6]);
        r.accept(a, dst, &header(1, 0, false), &[0x01], ()).unwrap();
        assert_eq!(r.in_flight(), 1);
        r.accept(b, dst, &header(2, 0, false), &[0x02], ()).unwrap();
        assert_eq!(r.in_flight(), 1);
    }
}
