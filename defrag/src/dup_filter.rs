use std::collections::VecDeque;

use map1905_wire::cmdu::CmduType;
use map1905_wire::mac::MacAddress;

/// Default capacity of the duplicate-suppression FIFO.
pub const DEFAULT_CAPACITY: usize = 10;

/// Suppresses CMDUs already seen from the same source AL, keyed by
/// `(al_mac_address, message_id)` in a bounded FIFO.
///
/// Response-type CMDUs (`TopologyResponse`, `LinkMetricResponse`, ...) are
/// deliberately exempt: a controller may legitimately re-query and receive
/// the same `message_id` more than once in quick succession, and suppressing
/// those would silently drop a legitimate reply. This mirrors the original
/// implementation's handling exactly and is not a bug to be fixed.
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    seen: VecDeque<(MacAddress, u16)>,
    capacity: usize,
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        DuplicateFilter::new(DEFAULT_CAPACITY)
    }
}

impl DuplicateFilter {
    pub fn new(capacity: usize) -> Self {
        DuplicateFilter { seen: VecDeque::with_capacity(capacity), capacity }
    }

    /// Returns `true` if this CMDU has already been seen from `al_mac_address`
    /// and should be dropped, recording it as seen if not. Response CMDUs
    /// always return `false` (never suppressed) but are still not recorded,
    /// since they're exempt from the filter entirely.
    pub fn is_duplicate(&mut self, al_mac_address: MacAddress, message_id: u16, message_type: CmduType) -> bool {
        if message_type.is_response() {
            return false;
        }
        let key = (al_mac_address, message_id);
        if self.seen.contains(&key) {
            return true;
        }
        if self.seen.len() >= self.capacity {
            self.seen.pop_front();
        }
        self.seen.push_back(key);
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn suppresses_repeat_of_non_response() {
        let mut f = DuplicateFilter::new(4);
        let mac = MacAddress::new([1; 6]);
        assert!(!f.is_duplicate(mac, 1, CmduType::TopologyDiscovery));
        assert!(f.is_duplicate(mac, 1, CmduType::TopologyDiscovery));
    }

    #[test]
    fn never_suppresses_responses() {
        let mut f = DuplicateFilter::new(4);
        let mac = MacAddress::new([1; 6]);
        assert!(!f.is_duplicate(mac, 1, CmduType::TopologyResponse));
        assert!(!f.is_duplicate(mac, 1, CmduType::TopologyResponse));
    }

    #[test]
    fn evicts_oldest_once_full() {
        let mut f = DuplicateFilter::new(2);
        let mac = MacAddress::new([1; 6]);
        assert!(!f.is_duplicate(mac, 1, CmduType::TopologyDiscovery));
        assert!(!f.is_duplicate(mac, 2, CmduType::TopologyDiscovery));
        assert!(!f.is_duplicate(mac, 3, CmduType::TopologyDiscovery));
        // message id 1 was evicted, so it is no longer considered a duplicate
        assert!(!f.is_duplicate(mac, 1, CmduType::TopologyDiscovery));
    }
}
