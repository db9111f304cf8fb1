//! Test utilities for usb-inventory
//!
//! Provides fixture builders shared by the unit and integration tests of
//! every crate in the workspace.
//!
//! # Example
//!
//! ```
//! use common::test_utils::create_mock_record;
//!
//! let record = create_mock_record("046d", "c52b");
//! assert_eq!(record.vendor_id, "046D");
//! ```

use protocol::{DeviceRecord, VidPid};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A small excerpt in `usb.ids` format covering every line kind the parser sees
pub const SAMPLE_USB_IDS: &str = "\
#
#\tList of USB ID's
#
# Version: 2025.01.01
#
# Syntax:
# vendor  vendor_name
#\tdevice  device_name\t\t\t\t<-- single tab
#\t\tinterface  interface_name\t\t<-- two tabs

046d  Logitech, Inc.
\t0001  Premium Keyboard
\tc077  M105 Optical Mouse
\tc52b  Unifying Receiver
\t\t00  Keyboard interface
05e0  Symbol Technologies
\t1200  Bar Code Scanner
05e3  Genesys Logic, Inc.
\t0608  Hub
0c2e  Metrologic Instruments
\t0b61  Vuquest 3310g

# List of known device classes, subclasses and protocols
C 00  (Defined at Interface level)
C 03  Human Interface Device
\t01  Boot Interface Subclass
\t\t01  Keyboard
";

/// Create a record with the given ids and `(unknown)` names
pub fn create_mock_record(vendor_id: &str, product_id: &str) -> DeviceRecord {
    DeviceRecord::new(VidPid::new(vendor_id, product_id).ok())
}

/// Create a record with explicit manufacturer and product names
pub fn create_mock_record_with_names(
    vendor_id: &str,
    product_id: &str,
    manufacturer: &str,
    product: &str,
) -> DeviceRecord {
    DeviceRecord {
        manufacturer_name: manufacturer.to_string(),
        product_name: product.to_string(),
        ..create_mock_record(vendor_id, product_id)
    }
}

/// Create a record with a device class (code or Windows class name)
pub fn create_mock_record_with_class(
    vendor_id: &str,
    product_id: &str,
    device_class: &str,
) -> DeviceRecord {
    DeviceRecord {
        device_class: Some(device_class.to_string()),
        ..create_mock_record(vendor_id, product_id)
    }
}

/// Create a list of distinct records on bus 1
pub fn create_mock_record_list(count: u16) -> Vec<DeviceRecord> {
    (0..count)
        .map(|i| DeviceRecord {
            bus: "1".to_string(),
            device_number: (i + 1).to_string(),
            manufacturer_name: format!("Test Manufacturer {}", i),
            product_name: format!("Test Product {}", i),
            ..create_mock_record("1234", &format!("{:04X}", i))
        })
        .collect()
}

/// Write [`SAMPLE_USB_IDS`] into `dir` and return the file path
pub fn write_sample_usb_ids(dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join("usb.ids");
    fs::write(&path, SAMPLE_USB_IDS)?;
    Ok(path)
}

/// Create a fake sysfs device directory under `root`
///
/// Each attribute is written as its own file with a trailing newline, the way
/// the kernel exposes them.
pub fn create_sysfs_device(root: &Path, node: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
    let dir = root.join(node);
    fs::create_dir_all(&dir)?;
    for (name, value) in attributes {
        fs::write(dir.join(name), format!("{}\n", value))?;
    }
    Ok(())
}
