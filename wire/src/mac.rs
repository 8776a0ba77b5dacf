use core::fmt;

/// A 6-octet IEEE 802 MAC address.
#[derive(Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// The IEEE 1905.1 multicast destination address (01:80:c2:00:00:13).
    pub const IEEE1905_MULTICAST: MacAddress =
        MacAddress([0x01, 0x80, 0xc2, 0x00, 0x00, 0x13]);

    /// The LLDP nearest-bridge multicast destination address (01:80:c2:00:00:0e).
    pub const LLDP_MULTICAST: MacAddress = MacAddress([0x01, 0x80, 0xc2, 0x00, 0x00, 0x0e]);

    pub const ZERO: MacAddress = MacAddress([0; 6]);

    #[inline]
    pub const fn new(octets: [u8; 6]) -> MacAddress {
        MacAddress(octets)
    }

    #[inline]
    pub fn from_slice(slice: &[u8]) -> Option<MacAddress> {
        if slice.len() != 6 {
            return None;
        }
        let mut octets = [0u8; 6];
        octets.copy_from_slice(slice);
        Some(MacAddress(octets))
    }

    #[inline]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 6]
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({})", self)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> MacAddress {
        MacAddress(octets)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_is_lowercase_colon_separated() {
        let mac = MacAddress([0x02, 0xEE, 0xff, 0x33, 0x44, 0x00]);
        assert_eq!(mac.to_string(), "02:ee:ff:33:44:00");
    }

    #[test]
    fn well_known_constants() {
        assert_eq!(
            MacAddress::IEEE1905_MULTICAST.to_string(),
            "01:80:c2:00:00:13"
        );
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(MacAddress::from_slice(&[1, 2, 3]).is_none());
        assert!(MacAddress::from_slice(&[1, 2, 3, 4, 5, 6, 7]).is_none());
        assert!(MacAddress::from_slice(&[1, 2, 3, 4, 5, 6]).is_some());
    }
}
