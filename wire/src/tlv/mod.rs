//! TLV (type/length/value) codec for the IEEE 1905.1a information elements
//! carried inside a CMDU's payload.
//!
//! Each TLV on the wire is `type: u8, length: u16 (BE), value: [u8; length]`.
//! Unknown types are preserved verbatim as [`Tlv::Unknown`] so that a relay
//! can forward TLVs it does not understand without losing them.

use crate::err::TlvError;

pub mod common;
pub mod device;
pub mod link_metrics;
pub mod net_config;
pub mod neighbors;
pub mod power;
pub mod push_button;
pub mod service;
pub mod wifi;
pub mod wsc;

pub use common::*;
pub use device::*;
pub use link_metrics::*;
pub use net_config::*;
pub use neighbors::*;
pub use power::*;
pub use push_button::*;
pub use service::*;
pub use wifi::*;
pub use wsc::*;

/// The one-byte TLV type tag as it appears on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum TlvType {
    EndOfMessage,
    AlMacAddress,
    MacAddress,
    DeviceInformation,
    DeviceBridgingCapability,
    Non1905NeighborDeviceList,
    NeighborDeviceList,
    LinkMetricQuery,
    TransmitterLinkMetric,
    ReceiverLinkMetric,
    VendorSpecific,
    LinkMetricResultCode,
    SearchedRole,
    AutoconfigFreqBand,
    SupportedRole,
    SupportedFreqBand,
    Wsc,
    PushButtonEventNotification,
    PushButtonJoinNotification,
    GenericPhyDeviceInformation,
    DeviceIdentification,
    ControlUrl,
    Ipv4,
    Ipv6,
    GenericPhyEventNotification,
    Profile1905Version,
    PowerOffInterface,
    InterfacePowerChangeInformation,
    InterfacePowerChangeStatus,
    L2NeighborDevice,
    SupportedService,
    SearchedService,
    ApOperationalBss,
    AssociatedClients,
    Unknown(u8),
}

impl TlvType {
    pub const fn code(self) -> u8 {
        use TlvType::*;
        match self {
            EndOfMessage => 0,
            AlMacAddress => 1,
            MacAddress => 2,
            DeviceInformation => 3,
            DeviceBridgingCapability => 4,
            Non1905NeighborDeviceList => 6,
            NeighborDeviceList => 7,
            LinkMetricQuery => 8,
            TransmitterLinkMetric => 9,
            ReceiverLinkMetric => 10,
            VendorSpecific => 11,
            LinkMetricResultCode => 12,
            SearchedRole => 13,
            AutoconfigFreqBand => 14,
            SupportedRole => 15,
            SupportedFreqBand => 16,
            Wsc => 17,
            PushButtonEventNotification => 18,
            PushButtonJoinNotification => 19,
            GenericPhyDeviceInformation => 20,
            DeviceIdentification => 21,
            ControlUrl => 22,
            Ipv4 => 23,
            Ipv6 => 24,
            GenericPhyEventNotification => 25,
            Profile1905Version => 26,
            PowerOffInterface => 27,
            InterfacePowerChangeInformation => 28,
            InterfacePowerChangeStatus => 29,
            L2NeighborDevice => 30,
            SupportedService => 0x80,
            SearchedService => 0x81,
            ApOperationalBss => 0x83,
            AssociatedClients => 0x84,
            Unknown(code) => code,
        }
    }

    pub const fn from_code(code: u8) -> TlvType {
        use TlvType::*;
        match code {
            0 => EndOfMessage,
            1 => AlMacAddress,
            2 => MacAddress,
            3 => DeviceInformation,
            4 => DeviceBridgingCapability,
            6 => Non1905NeighborDeviceList,
            7 => NeighborDeviceList,
            8 => LinkMetricQuery,
            9 => TransmitterLinkMetric,
            10 => ReceiverLinkMetric,
            11 => VendorSpecific,
            12 => LinkMetricResultCode,
            13 => SearchedRole,
            14 => AutoconfigFreqBand,
            15 => SupportedRole,
            16 => SupportedFreqBand,
            17 => Wsc,
            18 => PushButtonEventNotification,
            19 => PushButtonJoinNotification,
            20 => GenericPhyDeviceInformation,
            21 => DeviceIdentification,
            22 => ControlUrl,
            23 => Ipv4,
            24 => Ipv6,
            25 => GenericPhyEventNotification,
            26 => Profile1905Version,
            27 => PowerOffInterface,
            28 => InterfacePowerChangeInformation,
            29 => InterfacePowerChangeStatus,
            30 => L2NeighborDevice,
            0x80 => SupportedService,
            0x81 => SearchedService,
            0x83 => ApOperationalBss,
            0x84 => AssociatedClients,
            other => Unknown(other),
        }
    }
}

/// An opaque TLV whose type this codec does not interpret. Kept verbatim so
/// a relay can forward it unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownTlv {
    pub tlv_type: u8,
    pub value: Vec<u8>,
}

/// A single decoded TLV.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Tlv {
    EndOfMessage,
    AlMacAddress(AlMacAddressTlv),
    MacAddress(MacAddressTlv),
    DeviceInformation(DeviceInformationTlv),
    DeviceBridgingCapability(DeviceBridgingCapabilityTlv),
    Non1905NeighborDeviceList(Non1905NeighborDeviceListTlv),
    NeighborDeviceList(NeighborDeviceListTlv),
    LinkMetricQuery(LinkMetricQueryTlv),
    TransmitterLinkMetric(TransmitterLinkMetricTlv),
    ReceiverLinkMetric(ReceiverLinkMetricTlv),
    VendorSpecific(VendorSpecificTlv),
    LinkMetricResultCode(LinkMetricResultCodeTlv),
    SearchedRole(SearchedRoleTlv),
    AutoconfigFreqBand(AutoconfigFreqBandTlv),
    SupportedRole(SupportedRoleTlv),
    SupportedFreqBand(SupportedFreqBandTlv),
    Wsc(WscTlv),
    PushButtonEventNotification(PushButtonEventNotificationTlv),
    PushButtonJoinNotification(PushButtonJoinNotificationTlv),
    GenericPhyDeviceInformation(GenericPhyDeviceInformationTlv),
    DeviceIdentification(DeviceIdentificationTlv),
    ControlUrl(ControlUrlTlv),
    Ipv4(Ipv4Tlv),
    Ipv6(Ipv6Tlv),
    Profile1905Version(Profile1905VersionTlv),
    PowerOffInterface(PowerOffInterfaceTlv),
    InterfacePowerChangeInformation(InterfacePowerChangeInformationTlv),
    InterfacePowerChangeStatus(InterfacePowerChangeStatusTlv),
    L2NeighborDevice(L2NeighborDeviceTlv),
    SupportedService(SupportedServiceTlv),
    SearchedService(SearchedServiceTlv),
    ApOperationalBss(ApOperationalBssTlv),
    AssociatedClients(AssociatedClientsTlv),
    Unknown(UnknownTlv),
}

impl Tlv {
    pub fn tlv_type(&self) -> TlvType {
        use Tlv::*;
        match self {
            EndOfMessage => TlvType::EndOfMessage,
            AlMacAddress(_) => TlvType::AlMacAddress,
            MacAddress(_) => TlvType::MacAddress,
            DeviceInformation(_) => TlvType::DeviceInformation,
            DeviceBridgingCapability(_) => TlvType::DeviceBridgingCapability,
            Non1905NeighborDeviceList(_) => TlvType::Non1905NeighborDeviceList,
            NeighborDeviceList(_) => TlvType::NeighborDeviceList,
            LinkMetricQuery(_) => TlvType::LinkMetricQuery,
            TransmitterLinkMetric(_) => TlvType::TransmitterLinkMetric,
            ReceiverLinkMetric(_) => TlvType::ReceiverLinkMetric,
            VendorSpecific(_) => TlvType::VendorSpecific,
            LinkMetricResultCode(_) => TlvType::LinkMetricResultCode,
            SearchedRole(_) => TlvType::SearchedRole,
            AutoconfigFreqBand(_) => TlvType::AutoconfigFreqBand,
            SupportedRole(_) => TlvType::SupportedRole,
            SupportedFreqBand(_) => TlvType::SupportedFreqBand,
            Wsc(_) => TlvType::Wsc,
            PushButtonEventNotification(_) => TlvType::PushButtonEventNotification,
            PushButtonJoinNotification(_) => TlvType::PushButtonJoinNotification,
            GenericPhyDeviceInformation(_) => TlvType::GenericPhyDeviceInformation,
            DeviceIdentification(_) => TlvType::DeviceIdentification,
            ControlUrl(_) => TlvType::ControlUrl,
            Ipv4(_) => TlvType::Ipv4,
            Ipv6(_) => TlvType::Ipv6,
            Profile1905Version(_) => TlvType::Profile1905Version,
            PowerOffInterface(_) => TlvType::PowerOffInterface,
            InterfacePowerChangeInformation(_) => TlvType::InterfacePowerChangeInformation,
            InterfacePowerChangeStatus(_) => TlvType::InterfacePowerChangeStatus,
            L2NeighborDevice(_) => TlvType::L2NeighborDevice,
            SupportedService(_) => TlvType::SupportedService,
            SearchedService(_) => TlvType::SearchedService,
            ApOperationalBss(_) => TlvType::ApOperationalBss,
            AssociatedClients(_) => TlvType::AssociatedClients,
            Unknown(u) => TlvType::Unknown(u.tlv_type),
        }
    }

    /// Forge this TLV's `type`/`length`/`value` triple, appending it to `out`.
    pub fn forge(&self, out: &mut Vec<u8>) -> Result<(), TlvError> {
        let tlv_type = self.tlv_type().code();
        let mut value = Vec::new();
        match self {
            Tlv::EndOfMessage => {}
            Tlv::AlMacAddress(t) => t.write_value(&mut value),
            Tlv::MacAddress(t) => t.write_value(&mut value),
            Tlv::DeviceInformation(t) => t.write_value(&mut value),
            Tlv::DeviceBridgingCapability(t) => t.write_value(&mut value),
            Tlv::Non1905NeighborDeviceList(t) => t.write_value(&mut value),
            Tlv::NeighborDeviceList(t) => t.write_value(&mut value),
            Tlv::LinkMetricQuery(t) => t.write_value(&mut value),
            Tlv::TransmitterLinkMetric(t) => t.write_value(&mut value),
            Tlv::ReceiverLinkMetric(t) => t.write_value(&mut value),
            Tlv::VendorSpecific(t) => t.write_value(&mut value),
            Tlv::LinkMetricResultCode(t) => t.write_value(&mut value),
            Tlv::SearchedRole(t) => t.write_value(&mut value),
            Tlv::AutoconfigFreqBand(t) => t.write_value(&mut value),
            Tlv::SupportedRole(t) => t.write_value(&mut value),
            Tlv::SupportedFreqBand(t) => t.write_value(&mut value),
            Tlv::Wsc(t) => t.write_value(&mut value),
            Tlv::PushButtonEventNotification(t) => t.write_value(&mut value),
            Tlv::PushButtonJoinNotification(t) => t.write_value(&mut value),
            Tlv::GenericPhyDeviceInformation(t) => t.write_value(&mut value),
            Tlv::DeviceIdentification(t) => t.write_value(&mut value),
            Tlv::ControlUrl(t) => t.write_value(&mut value),
            Tlv::Ipv4(t) => t.write_value(&mut value),
            Tlv::Ipv6(t) => t.write_value(&mut value),
            Tlv::Profile1905Version(t) => t.write_value(&mut value),
            Tlv::PowerOffInterface(t) => t.write_value(&mut value),
            Tlv::InterfacePowerChangeInformation(t) => t.write_value(&mut value),
            Tlv::InterfacePowerChangeStatus(t) => t.write_value(&mut value),
            Tlv::L2NeighborDevice(t) => t.write_value(&mut value),
            Tlv::SupportedService(t) => t.write_value(&mut value),
            Tlv::SearchedService(t) => t.write_value(&mut value),
            Tlv::ApOperationalBss(t) => t.write_value(&mut value),
            Tlv::AssociatedClients(t) => t.write_value(&mut value),
            Tlv::Unknown(u) => value.extend_from_slice(&u.value),
        }
        if value.len() > u16::MAX as usize {
            return Err(TlvError::PayloadTooLarge { tlv_type, len: value.len() });
        }
        out.push(tlv_type);
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(&value);
        Ok(())
    }
}

/// Read one `type`/`length`/`value` TLV from the front of `slice`, returning
/// the decoded TLV and the remainder of the slice.
pub fn parse_tlv(slice: &[u8]) -> Result<(Tlv, &[u8]), TlvError> {
    if slice.len() < 3 {
        return Err(TlvError::UnexpectedEnd { read_so_far: slice.len() });
    }
    let tlv_type = slice[0];
    let length = u16::from_be_bytes([slice[1], slice[2]]);
    let value_start = 3;
    let value_end = value_start + length as usize;
    if slice.len() < value_end {
        return Err(TlvError::LengthExceedsSlice {
            tlv_type,
            length,
            remaining: slice.len() - value_start,
        });
    }
    let value = &slice[value_start..value_end];
    let rest = &slice[value_end..];

    let tlv = match TlvType::from_code(tlv_type) {
        TlvType::EndOfMessage => Tlv::EndOfMessage,
        TlvType::AlMacAddress => Tlv::AlMacAddress(AlMacAddressTlv::from_value(value)?),
        TlvType::MacAddress => Tlv::MacAddress(MacAddressTlv::from_value(value)?),
        TlvType::DeviceInformation => {
            Tlv::DeviceInformation(DeviceInformationTlv::from_value(value)?)
        }
        TlvType::DeviceBridgingCapability => {
            Tlv::DeviceBridgingCapability(DeviceBridgingCapabilityTlv::from_value(value)?)
        }
        TlvType::Non1905NeighborDeviceList => {
            Tlv::Non1905NeighborDeviceList(Non1905NeighborDeviceListTlv::from_value(value)?)
        }
        TlvType::NeighborDeviceList => {
            Tlv::NeighborDeviceList(NeighborDeviceListTlv::from_value(value)?)
        }
        TlvType::LinkMetricQuery => {
            Tlv::LinkMetricQuery(LinkMetricQueryTlv::from_value(value)?)
        }
        TlvType::TransmitterLinkMetric => {
            Tlv::TransmitterLinkMetric(TransmitterLinkMetricTlv::from_value(value)?)
        }
        TlvType::ReceiverLinkMetric => {
            Tlv::ReceiverLinkMetric(ReceiverLinkMetricTlv::from_value(value)?)
        }
        TlvType::VendorSpecific => Tlv::VendorSpecific(VendorSpecificTlv::from_value(value)?),
        TlvType::LinkMetricResultCode => {
            Tlv::LinkMetricResultCode(LinkMetricResultCodeTlv::from_value(value)?)
        }
        TlvType::SearchedRole => Tlv::SearchedRole(SearchedRoleTlv::from_value(value)?),
        TlvType::AutoconfigFreqBand => {
            Tlv::AutoconfigFreqBand(AutoconfigFreqBandTlv::from_value(value)?)
        }
        TlvType::SupportedRole => Tlv::SupportedRole(SupportedRoleTlv::from_value(value)?),
        TlvType::SupportedFreqBand => {
            Tlv::SupportedFreqBand(SupportedFreqBandTlv::from_value(value)?)
        }
        TlvType::Wsc => Tlv::Wsc(WscTlv::from_value(value)?),
        TlvType::PushButtonEventNotification => Tlv::PushButtonEventNotification(
            PushButtonEventNotificationTlv::from_value(value)?,
        ),
        TlvType::PushButtonJoinNotification => Tlv::PushButtonJoinNotification(
            PushButtonJoinNotificationTlv::from_value(value)?,
        ),
        TlvType::GenericPhyDeviceInformation => Tlv::GenericPhyDeviceInformation(
            GenericPhyDeviceInformationTlv::from_value(value)?,
        ),
        TlvType::DeviceIdentification => {
            Tlv::DeviceIdentification(DeviceIdentificationTlv::from_value(value)?)
        }
        TlvType::ControlUrl => Tlv::ControlUrl(ControlUrlTlv::from_value(value)?),
        TlvType::Ipv4 => Tlv::Ipv4(Ipv4Tlv::from_value(value)?),
        TlvType::Ipv6 => Tlv::Ipv6(Ipv6Tlv::from_value(value)?),
        TlvType::GenericPhyEventNotification => {
            Tlv::Unknown(UnknownTlv { tlv_type, value: value.to_vec() })
        }
        TlvType::Profile1905Version => {
            Tlv::Profile1905Version(Profile1905VersionTlv::from_value(value)?)
        }
        TlvType::PowerOffInterface => {
            Tlv::PowerOffInterface(PowerOffInterfaceTlv::from_value(value)?)
        }
        TlvType::InterfacePowerChangeInformation => Tlv::InterfacePowerChangeInformation(
            InterfacePowerChangeInformationTlv::from_value(value)?,
        ),
        TlvType::InterfacePowerChangeStatus => Tlv::InterfacePowerChangeStatus(
            InterfacePowerChangeStatusTlv::from_value(value)?,
        ),
        TlvType::L2NeighborDevice => {
            Tlv::L2NeighborDevice(L2NeighborDeviceTlv::from_value(value)?)
        }
        TlvType::SupportedService => {
            Tlv::SupportedService(SupportedServiceTlv::from_value(value)?)
        }
        TlvType::SearchedService => {
            Tlv::SearchedService(SearchedServiceTlv::from_value(value)?)
        }
        TlvType::ApOperationalBss => {
            Tlv::ApOperationalBss(ApOperationalBssTlv::from_value(value)?)
        }
        TlvType::AssociatedClients => {
            Tlv::AssociatedClients(AssociatedClientsTlv::from_value(value)?)
        }
        TlvType::Unknown(code) => Tlv::Unknown(UnknownTlv { tlv_type: code, value: value.to_vec() }),
    };
    Ok((tlv, rest))
}

/// Parse a whole TLV stream (as found in a CMDU payload) up to and including
/// its terminating End of message TLV.
pub fn parse_tlv_stream(mut slice: &[u8]) -> Result<Vec<Tlv>, TlvError> {
    let mut tlvs = Vec::new();
    loop {
        let (tlv, rest) = parse_tlv(slice)?;
        let is_eom = matches!(tlv, Tlv::EndOfMessage);
        tlvs.push(tlv);
        slice = rest;
        if is_eom {
            break;
        }
    }
    Ok(tlvs)
}
