use std::collections::HashMap;

use map1905_wire::tlv::VendorSpecificTlv;

/// A handler for a vendor-specific TLV's OUI. Returning `None` leaves the
/// TLV untouched (it is still forwarded verbatim by the dispatcher).
pub type ExtensionHandler = Box<dyn Fn(&VendorSpecificTlv) -> Option<VendorSpecificTlv> + Send + Sync>;

/// Dispatch table for vendor-specific (OUI-keyed) TLV extensions. Unknown
/// OUIs are preserved as opaque payloads and re-forged unchanged — this
/// registry only intercepts OUIs a caller has explicitly registered.
#[derive(Default)]
pub struct ExtensionRegistry {
    handlers: HashMap<[u8; 3], ExtensionHandler>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, oui: [u8; 3], handler: ExtensionHandler) {
        self.handlers.insert(oui, handler);
    }

    /// Run the registered handler for `tlv`'s OUI, if any, returning its
    /// reply TLV. An unregistered OUI yields `None` and the caller should
    /// treat the vendor-specific TLV as opaque.
    pub fn dispatch(&self, tlv: &VendorSpecificTlv) -> Option<VendorSpecificTlv> {
        self.handlers.get(&tlv.oui).and_then(|handler| handler(tlv))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unregistered_oui_is_left_alone() {
        let registry = ExtensionRegistry::new();
        let tlv = VendorSpecificTlv { oui: [1, 2, 3], payload: vec![9] };
        assert!(registry.dispatch(&tlv).is_none());
    }

    #[test]
    fn registered_oui_is_dispatched() {
        let mut registry = ExtensionRegistry::new();
        registry.register([1, 2, 3], Box::new(|tlv| Some(tlv.clone())));
        let tlv = VendorSpecificTlv { oui: [1, 2, 3], payload: vec![9] };
        assert_eq!(registry.dispatch(&tlv), Some(tlv));
    }
}
