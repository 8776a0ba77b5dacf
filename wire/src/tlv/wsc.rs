use crate::err::TlvError;

/// WSC TLV: carries an opaque Wi-Fi Simple Configuration message (M1/M2/...).
/// The cryptographic exchange itself is out of scope here; this type only
/// round-trips the TLV's payload bytes so the AL can relay autoconfiguration
/// CMDUs without having to understand WSC internals.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WscTlv {
    pub wsc_message: Vec<u8>,
}

impl WscTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        Ok(WscTlv { wsc_message: value.to_vec() })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.wsc_message);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let t = WscTlv { wsc_message: vec![1, 2, 3, 4, 5] };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(WscTlv::from_value(&buf).unwrap(), t);
    }
}
