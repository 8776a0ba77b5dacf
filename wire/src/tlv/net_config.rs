use crate::err::TlvError;
use crate::mac::MacAddress;

/// Control URL TLV: the URL of the device's WSC/web configuration UI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControlUrlTlv {
    pub url: String,
}

impl ControlUrlTlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        let url = core::str::from_utf8(value)
            .map_err(|_| TlvError::InvalidPayload { tlv_type: 22, reason: "not valid UTF-8" })?
            .to_owned();
        Ok(ControlUrlTlv { url })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.url.as_bytes());
    }
}

/// How an IPv4/IPv6 address was assigned to an interface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddressType {
    Dhcp,
    Static,
    Autoip,
    Unknown(u8),
}

impl AddressType {
    const fn code(self) -> u8 {
        match self {
            AddressType::Dhcp => 0x00,
            AddressType::Static => 0x01,
            AddressType::Autoip => 0x02,
            AddressType::Unknown(v) => v,
        }
    }

    const fn from_code(v: u8) -> AddressType {
        match v {
            0x00 => AddressType::Dhcp,
            0x01 => AddressType::Static,
            0x02 => AddressType::Autoip,
            other => AddressType::Unknown(other),
        }
    }
}

/// One IPv4 address assigned to an interface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv4Entry {
    pub address_type: AddressType,
    pub address: [u8; 4],
    pub dhcp_server: [u8; 4],
}

/// One local interface's IPv4 addresses.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv4Interface {
    pub mac_address: MacAddress,
    pub addresses: Vec<Ipv4Entry>,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Ipv4Tlv {
    pub interfaces: Vec<Ipv4Interface>,
}

impl Ipv4Tlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 23;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "expected at least 1 byte (count)" });
        }
        let iface_count = value[0] as usize;
        let mut rest = &value[1..];
        let mut interfaces = Vec::with_capacity(iface_count);
        for _ in 0..iface_count {
            if rest.len() < 7 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "interface entry truncated before address count",
                });
            }
            let mac_address = MacAddress::from_slice(&rest[..6]).unwrap();
            let addr_count = rest[6] as usize;
            rest = &rest[7..];
            if rest.len() < addr_count * 9 {
                return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "address list truncated" });
            }
            let addresses = rest[..addr_count * 9]
                .chunks_exact(9)
                .map(|c| Ipv4Entry {
                    address_type: AddressType::from_code(c[0]),
                    address: c[1..5].try_into().unwrap(),
                    dhcp_server: c[5..9].try_into().unwrap(),
                })
                .collect();
            rest = &rest[addr_count * 9..];
            interfaces.push(Ipv4Interface { mac_address, addresses });
        }
        Ok(Ipv4Tlv { interfaces })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.interfaces.len() as u8);
        for iface in &self.interfaces {
            out.extend_from_slice(&iface.mac_address.octets());
            out.push(iface.addresses.len() as u8);
            for a in &iface.addresses {
                out.push(a.address_type.code());
                out.extend_from_slice(&a.address);
                out.extend_from_slice(&a.dhcp_server);
            }
        }
    }
}

/// One IPv6 address assigned to an interface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv6Entry {
    pub address_type: AddressType,
    pub address: [u8; 16],
    pub origin: [u8; 16],
}

/// One local interface's IPv6 addresses.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6Interface {
    pub mac_address: MacAddress,
    pub link_local_address: [u8; 16],
    pub addresses: Vec<Ipv6Entry>,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Ipv6Tlv {
    pub interfaces: Vec<Ipv6Interface>,
}

impl Ipv6Tlv {
    pub fn from_value(value: &[u8]) -> Result<Self, TlvError> {
        const TYPE: u8 = 24;
        if value.is_empty() {
            return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "expected at least 1 byte (count)" });
        }
        let iface_count = value[0] as usize;
        let mut rest = &value[1..];
        let mut interfaces = Vec::with_capacity(iface_count);
        for _ in 0..iface_count {
            if rest.len() < 23 {
                return Err(TlvError::InvalidPayload {
                    tlv_type: TYPE,
                    reason: "interface entry truncated before address count",
                });
            }
            let mac_address = MacAddress::from_slice(&rest[..6]).unwrap();
            let link_local_address: [u8; 16] = rest[6..22].try_into().unwrap();
            let addr_count = rest[22] as usize;
            rest = &rest[23..];
            if rest.len() < addr_count * 33 {
                return Err(TlvError::InvalidPayload { tlv_type: TYPE, reason: "address list truncated" });
            }
            let addresses = rest[..addr_count * 33]
                .chunks_exact(33)
                .map(|c| Ipv6Entry {
                    address_type: AddressType::from_code(c[0]),
                    address: c[1..17].try_into().unwrap(),
                    origin: c[17..33].try_into().unwrap(),
                })
                .collect();
            rest = &rest[addr_count * 33..];
            interfaces.push(Ipv6Interface { mac_address, link_local_address, addresses });
        }
        Ok(Ipv6Tlv { interfaces })
    }

    pub fn write_value(&self, out: &mut Vec<u8>) {
        out.push(self.interfaces.len() as u8);
        for iface in &self.interfaces {
            out.extend_from_slice(&iface.mac_address.octets());
            out.extend_from_slice(&iface.link_local_address);
            out.push(iface.addresses.len() as u8);
            for a in &iface.addresses {
                out.push(a.address_type.code());
                out.extend_from_slice(&a.address);
                out.extend_from_slice(&a.origin);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn control_url_round_trip() {
        let t = ControlUrlTlv { url: "http://192.168.1.1/wsc".into() };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(ControlUrlTlv::from_value(&buf).unwrap(), t);
    }

    #[test]
    fn ipv4_round_trip() {
        let t = Ipv4Tlv {
            interfaces: vec![Ipv4Interface {
                mac_address: MacAddress::new([1; 6]),
                addresses: vec![Ipv4Entry {
                    address_type: AddressType::Dhcp,
                    address: [192, 168, 1, 50],
                    dhcp_server: [192, 168, 1, 1],
                }],
            }],
        };
        let mut buf = Vec::new();
        t.write_value(&mut buf);
        assert_eq!(Ipv4Tlv::from_value(&buf).unwrap(), t);
    }
}
