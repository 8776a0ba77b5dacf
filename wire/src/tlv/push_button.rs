use crate::err::TlvError;
use crate::mac::MacAddress;

/// One media type entered into push button configuration mode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PushButtonMedia {
    pub media_type: u16,
    pub media_specific_info: Vec<u8>,
}

/// Push button event notification TLV: sent by an AL when a user presses its
/// physical push button, listing which media types entered configuration
/// mode.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct PushButtonEventNotificationTlv {
    pub media: Vec<PushButtonMedia>,
}

impl PushButtonEventNotificationTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 18;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload {
                tlv_type: TYPE,
                reason: "expected at least 1 byte (media type count)",
            });
        }
        let count = value[0] as usize;
        let mut rest = &value[1..];
        let mut media = Vec::with_capacity(count);
        for _ in 0..count {
            if rest.len() < 3 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "media entry truncated before info length",
                });
            }
            let media_type = u16::from_be_bytes([rest[0], rest[1]]);
            let info_len = rest[2] as usize;
            if rest.len() < 3 + info_len {
                return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "media-specific info truncated" });
            }
            media.push(PushButtonMedia { media_type, media_specific_info: rest[3..3 + info_len].to_vec() });
            rest = &rest[3 + info_len..];
        }
        Ok(PushButtonEventNotificationTlv { media })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.media.len() as u8);
        for m in &self.media {
            out.extend_from_slice(&m.media_type.to_be_bytes());
            out.push(m.media_specific_info.len() as u8);
            out.extend_from_slice(&m.media_specific_info);
        }
    }
}

/// Push button join notification TLV: sent by the AL that ran the push
/// button exchange to tell the rest of the network which device just
/// joined.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PushButtonJoinNotificationTlv {
    pub al_mac_address: MacAddress,
    pub message_identifier: u16,
    pub local_interface_mac_address: MacAddress,
    pub new_device_mac_address: MacAddress,
}

impl PushButtonJoinNotificationTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 19;
        if value.len() != 20 {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "expected exactly 20 bytes" });
        }
        Ok(PushButtonJoinNotificationTlv {
            al_mac_address: MacAddress::from_slice(&value[0..6]).unwrap(),
            message_identifier: u16::from_be_bytes([value[6], value[7]]),
            local_interface_mac_address: MacAddress::from_slice(&value[8..14]).unwrap(),
            new_device_mac_address: MacAddress::from_slice(&value[14..20]).unwrap(),
        })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.al_mac_address.octets());
        out.extend_from_slice(&self.message_identifier.to_be_bytes());
        out.extend_from_slice(&self.local_interface_mac_address.octets());
        out.extend_from_slice(&self.new_device_mac_address.octets());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_button_event_round_trip() {
        let t = PushButtonEventNotificationTlv {
            media: vec![PushButtonMedia { media_type: 0x0100, media_specific_info: vec![1, 2] }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(PushButtonEventNotificationTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn push_button_join_round_trip() {
        let t = PushButtonJoinNotificationTlv {
            al_mac_address: MacAddress::new([1; 6]),
            message_identifier: 7,
            local_interface_mac_address: MacAddress::new([2; 6]),
            new_device_mac_address: MacAddress::new([3; 6]),
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(PushButtonJoinNotificationTlv::from_value(&buf).unwrap(), t);
    }
}
