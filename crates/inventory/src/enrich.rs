//! Name enrichment from the `usb.ids` database

use common::UsbIdRegistry;
use protocol::DeviceRecord;

/// Replace raw names with canonical database names where known
///
/// Order-preserving and one-to-one. A record whose ids are absent from the
/// database keeps its original names.
pub fn enrich(records: Vec<DeviceRecord>, registry: &UsbIdRegistry) -> Vec<DeviceRecord> {
    records
        .into_iter()
        .map(|record| enrich_record(record, registry))
        .collect()
}

pub fn enrich_record(mut record: DeviceRecord, registry: &UsbIdRegistry) -> DeviceRecord {
    if !record.has_ids() {
        return record;
    }

    if let Some(vendor) = registry.lookup_vendor_name(&record.vendor_id) {
        record.manufacturer_name = vendor.to_string();
    }
    if let Some(product) = registry.lookup_product_name(&record.vendor_id, &record.product_id) {
        record.product_name = product.to_string();
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_utils::{
        SAMPLE_USB_IDS, create_mock_record, create_mock_record_with_class,
        create_mock_record_with_names,
    };
    use protocol::UNKNOWN_NAME;

    #[test]
    fn test_enrich_replaces_unknown_names() {
        let registry = UsbIdRegistry::parse(SAMPLE_USB_IDS);
        let record = create_mock_record_with_class("046d", "0001", "Keyboard");

        let enriched = enrich(vec![record], &registry);
        assert_eq!(enriched[0].manufacturer_name, "Logitech, Inc.");
        assert_eq!(enriched[0].product_name, "Premium Keyboard");
        assert_eq!(enriched[0].device_class.as_deref(), Some("Keyboard"));
    }

    #[test]
    fn test_database_name_wins_over_source_name() {
        let registry = UsbIdRegistry::parse(SAMPLE_USB_IDS);
        let record = create_mock_record_with_names("046D", "C52B", "Logitech", "USB Receiver");

        let enriched = enrich_record(record, &registry);
        assert_eq!(enriched.manufacturer_name, "Logitech, Inc.");
        assert_eq!(enriched.product_name, "Unifying Receiver");
    }

    #[test]
    fn test_known_vendor_unknown_product() {
        let registry = UsbIdRegistry::parse(SAMPLE_USB_IDS);
        let record = create_mock_record_with_names("046D", "FFFF", "", "Mystery Gadget");

        let enriched = enrich_record(record, &registry);
        assert_eq!(enriched.manufacturer_name, "Logitech, Inc.");
        assert_eq!(enriched.product_name, "Mystery Gadget");
    }

    #[test]
    fn test_unknown_ids_leave_record_unchanged() {
        let registry = UsbIdRegistry::parse(SAMPLE_USB_IDS);
        let records = vec![
            create_mock_record_with_names("ABCD", "0001", "Acme", "Widget"),
            create_mock_record("EEEE", "0002"),
        ];

        let enriched = enrich(records.clone(), &registry);
        assert_eq!(enriched, records);
    }

    #[test]
    fn test_records_without_ids_are_untouched() {
        let registry = UsbIdRegistry::parse(SAMPLE_USB_IDS);
        let record = DeviceRecord::new(None);
        let enriched = enrich_record(record.clone(), &registry);
        assert_eq!(enriched, record);
        assert_eq!(enriched.product_name, UNKNOWN_NAME);
    }

    #[test]
    fn test_enrich_preserves_order_and_length() {
        let registry = UsbIdRegistry::parse(SAMPLE_USB_IDS);
        let records = vec![
            create_mock_record("05E3", "0608"),
            create_mock_record("9999", "9999"),
            create_mock_record("046D", "C077"),
        ];

        let enriched = enrich(records, &registry);
        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0].product_name, "Hub");
        assert_eq!(enriched[1].product_name, UNKNOWN_NAME);
        assert_eq!(enriched[2].product_name, "M105 Optical Mouse");
    }

    #[test]
    fn test_empty_registry_is_identity() {
        let records = vec![create_mock_record("046D", "0001")];
        assert_eq!(enrich(records.clone(), &UsbIdRegistry::empty()), records);
    }
}
