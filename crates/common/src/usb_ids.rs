//! Parser and lookup table for the `usb.ids` vendor/product name database
//!
//! Only the vendor/product hierarchy is modelled. Class, HID, language and
//! other sections of the file are skipped.

use regex::Regex;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Environment variable that overrides the database location
pub const USB_IDS_PATH_ENV: &str = "USB_IDS_PATH";

/// Location of the database shipped alongside the binary
pub const BUNDLED_USB_IDS_PATH: &str = "data/usb.ids";

/// Well-known places distributions install `usb.ids`
pub const SYSTEM_USB_IDS_PATHS: &[&str] = &[
    "/usr/share/hwdata/usb.ids",
    "/usr/share/misc/usb.ids",
    "/usr/share/usb.ids",
    "/var/lib/usbutils/usb.ids",
];

static VENDOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{4})  +(.+)$").expect("vendor line pattern is valid")
});

static PRODUCT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\t([0-9A-Fa-f]{4})  +(.+)$").expect("product line pattern is valid")
});

static TAB_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t{2,}").expect("tab run pattern is valid"));

/// One vendor and the products listed under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorEntry {
    /// Four uppercase hex digits
    pub vendor_id: String,
    pub name: String,
    /// Product id (four uppercase hex digits) to product name
    pub products: HashMap<String, String>,
}

/// In-memory vendor/product name database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbIdRegistry {
    vendors: HashMap<String, VendorEntry>,
}

impl UsbIdRegistry {
    /// A registry with no entries; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create from a string containing `usb.ids`
    ///
    /// Malformed lines are skipped, so this never fails.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut vendors: HashMap<String, VendorEntry> = HashMap::new();
        let mut current: Option<String> = None;

        for raw in text.lines() {
            let line = TAB_RUN.replace_all(raw, "\t");
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = VENDOR_LINE.captures(&line) {
                let name = caps[2].trim();
                if name.is_empty() {
                    // Unnamed vendor: its products must not land on the previous one
                    current = None;
                    continue;
                }
                let vendor_id = caps[1].to_ascii_uppercase();
                vendors
                    .entry(vendor_id.clone())
                    .or_insert_with(|| VendorEntry {
                        vendor_id: vendor_id.clone(),
                        name: name.to_string(),
                        products: HashMap::new(),
                    });
                current = Some(vendor_id);
                continue;
            }

            if let Some(caps) = PRODUCT_LINE.captures(&line) {
                let name = caps[2].trim();
                if let Some(entry) = current.as_ref().and_then(|vid| vendors.get_mut(vid)) {
                    if !name.is_empty() {
                        entry
                            .products
                            .insert(caps[1].to_ascii_uppercase(), name.to_string());
                    }
                }
                continue;
            }

            // A section header (C, AT, HID, L, ...) closes the vendor block
            if !line.starts_with(['\t', ' ']) {
                current = None;
            }
        }

        Self { vendors }
    }

    /// Create from a file containing `usb.ids`
    pub fn load(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)?;
        let registry = Self::parse(&String::from_utf8_lossy(&bytes));
        debug!(
            "Parsed {} vendors and {} products from {}",
            registry.vendor_count(),
            registry.product_count(),
            path.display()
        );
        Ok(registry)
    }

    /// Vendor name for a vendor id, case-insensitive on the hex digits
    pub fn lookup_vendor_name(&self, vendor_id: &str) -> Option<&str> {
        self.vendor(vendor_id).map(|v| v.name.as_str())
    }

    /// Product name for a vendor/product pair
    pub fn lookup_product_name(&self, vendor_id: &str, product_id: &str) -> Option<&str> {
        self.vendor(vendor_id)?
            .products
            .get(&product_id.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Full entry for a vendor id
    pub fn vendor(&self, vendor_id: &str) -> Option<&VendorEntry> {
        self.vendors.get(&vendor_id.trim().to_ascii_uppercase())
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    pub fn product_count(&self) -> usize {
        self.vendors.values().map(|v| v.products.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

/// Resolve the database location for this process
///
/// `USB_IDS_PATH` wins, then the configured path, then the first system
/// location that exists, then the bundled copy.
pub fn resolve_usb_ids_path(configured: Option<&Path>) -> PathBuf {
    let system = SYSTEM_USB_IDS_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists());
    resolve_with(std::env::var_os(USB_IDS_PATH_ENV), configured, system)
}

fn resolve_with(
    env: Option<OsString>,
    configured: Option<&Path>,
    system: Option<PathBuf>,
) -> PathBuf {
    env.filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| configured.map(Path::to_path_buf))
        .or(system)
        .unwrap_or_else(|| PathBuf::from(BUNDLED_USB_IDS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Vendors, devices and interfaces.
#
046d  Logitech, Inc.
\t0001  Premium Keyboard
\tc52b  Unifying Receiver
\t\t00  interface zero
05e3  Genesys Logic, Inc.
\t0608  Hub
";

    #[test]
    fn test_parse_vendor_and_products() {
        let registry = UsbIdRegistry::parse(SAMPLE);
        assert_eq!(registry.vendor_count(), 2);
        assert_eq!(registry.product_count(), 3);
        assert_eq!(registry.lookup_vendor_name("046d"), Some("Logitech, Inc."));
        assert_eq!(registry.lookup_vendor_name("046D"), Some("Logitech, Inc."));
        assert_eq!(
            registry.lookup_product_name("046D", "0001"),
            Some("Premium Keyboard")
        );
        assert_eq!(
            registry.lookup_product_name("046d", "C52B"),
            Some("Unifying Receiver")
        );
        assert_eq!(registry.lookup_product_name("05E3", "0608"), Some("Hub"));
    }

    #[test]
    fn test_lookup_misses_are_none() {
        let registry = UsbIdRegistry::parse(SAMPLE);
        assert_eq!(registry.lookup_vendor_name("FFFF"), None);
        assert_eq!(registry.lookup_vendor_name(""), None);
        assert_eq!(registry.lookup_product_name("046D", "FFFF"), None);
        assert_eq!(registry.lookup_product_name("FFFF", "0001"), None);
    }

    #[test]
    fn test_interface_lines_are_not_products() {
        let registry = UsbIdRegistry::parse(SAMPLE);
        let logitech = registry.vendor("046d").unwrap();
        assert_eq!(logitech.products.len(), 2);
        assert!(!logitech.products.contains_key("00"));
    }

    #[test]
    fn test_repeated_vendor_keeps_products() {
        let text = "1234  First Name\n\t0001  One\n1234  Second Name\n\t0002  Two\n";
        let registry = UsbIdRegistry::parse(text);
        let entry = registry.vendor("1234").unwrap();
        assert_eq!(entry.name, "First Name");
        assert_eq!(entry.products.len(), 2);
    }

    #[test]
    fn test_unnamed_vendor_closes_previous_block() {
        let text = "1111  Acme\n\t0001  Acme Widget\n2222   \n\t0001  Other Widget\n";
        let registry = UsbIdRegistry::parse(text);
        assert_eq!(registry.lookup_product_name("1111", "0001"), Some("Acme Widget"));
        assert_eq!(registry.lookup_vendor_name("2222"), None);
        assert_eq!(registry.product_count(), 1);
    }

    #[test]
    fn test_product_overwrites_within_vendor() {
        let text = "1234  Vendor\n\t0001  Old\n\t0001  New\n";
        let registry = UsbIdRegistry::parse(text);
        assert_eq!(registry.lookup_product_name("1234", "0001"), Some("New"));
    }

    #[test]
    fn test_crlf_and_bom() {
        let text = "\u{feff}046d  Logitech, Inc.\r\n\t0001  Premium Keyboard\r\n";
        let registry = UsbIdRegistry::parse(text);
        assert_eq!(registry.lookup_vendor_name("046D"), Some("Logitech, Inc."));
        assert_eq!(
            registry.lookup_product_name("046D", "0001"),
            Some("Premium Keyboard")
        );
    }

    #[test]
    fn test_section_header_ends_vendor_block() {
        let text = "\
ffee  Last Vendor
\t0001  Real Product
C 00  (Defined at Interface level)
\t1234  Not A Product
";
        let registry = UsbIdRegistry::parse(text);
        assert_eq!(
            registry.lookup_product_name("FFEE", "0001"),
            Some("Real Product")
        );
        assert_eq!(registry.lookup_product_name("FFEE", "1234"), None);
    }

    #[test]
    fn test_product_before_any_vendor_is_ignored() {
        let registry = UsbIdRegistry::parse("\t0001  Orphan\n");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_single_space_separator_is_ignored() {
        let registry = UsbIdRegistry::parse("1234 Vendor\n");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_with_precedence() {
        let configured = PathBuf::from("/etc/custom/usb.ids");
        let system = Some(PathBuf::from("/usr/share/hwdata/usb.ids"));

        assert_eq!(
            resolve_with(
                Some(OsString::from("/tmp/env.ids")),
                Some(&configured),
                system.clone()
            ),
            PathBuf::from("/tmp/env.ids")
        );
        assert_eq!(
            resolve_with(None, Some(&configured), system.clone()),
            configured
        );
        assert_eq!(
            resolve_with(Some(OsString::new()), None, system.clone()),
            PathBuf::from("/usr/share/hwdata/usb.ids")
        );
        assert_eq!(
            resolve_with(None, None, None),
            PathBuf::from(BUNDLED_USB_IDS_PATH)
        );
    }
}
