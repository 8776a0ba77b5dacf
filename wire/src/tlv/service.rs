use crate::err::TlvError;

/// A Multi-AP service role.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServiceType {
    MultiApController,
    MultiApAgent,
    Unknown(u8),
}

impl ServiceType {
    const fn code(self) -> u8 {
        match self {
            ServiceType::MultiApController => 0x00,
            ServiceType::MultiApAgent => 0x01,
            ServiceType::Unknown(v) => v,
        }
    }

    const fn from_code(v: u8) -> ServiceType {
        match v {
            0x00 => ServiceType::MultiApController,
            0x01 => ServiceType::MultiApAgent,
            other => ServiceType::Unknown(other),
        }
    }
}

fn services_from_value(tlv_type: u8, value: &[u8]) -> Result<Vec<ServiceType>, TlvError> {
    if value.is_empty() {
        return Err(TlvError::InvalidPayload { tlv_type, reason: "expected at least 1 byte (count)" });
    }
    let count = value[0] as usize;
    if value.len() != 1 + count {
        return Err(TlvError::InvalidPayload { tlv_type, reason: "service count does not match payload length" });
    }
    Ok(value[1..].iter().map(|&c| ServiceType::from_code(c)).collect())
}

fn services_write_value(out: &mut Vec<u8>, services: &[ServiceType]) {
    out.push(services.len() as u8);
    for s in services {
        out.push(s.code());
    }
}

/// Supported service TLV: services the sender itself implements.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct SupportedServiceTlv {
    pub services: Vec<ServiceType>,
}

impl SupportedServiceTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        Ok(SupportedServiceTlv { services: services_from_value(0x80, value)? })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        services_write_value(out, &self.services);
    }
}

/// Searched service TLV: services the sender is looking for in a reply.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct SearchedServiceTlv {
    pub services: Vec<ServiceType>,
}

impl SearchedServiceTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        Ok(SearchedServiceTlv { services: services_from_value(0x81, value)? })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        services_write_value(out, &self.services);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn supported_service_round_trip() {
        let t = SupportedServiceTlv { services: vec![ServiceType::MultiApAgent] };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(SupportedServiceTlv::from_value(&buf).unwrap(), t);
    }
}
