//! Linux sysfs device tree walk

use common::Result;
use protocol::{DeviceRecord, UNKNOWN_NAME, VidPid};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Where the kernel exposes one directory per USB device
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/bus/usb/devices";

/// Read every device directory under `root`
///
/// Only bus-address style names (`1-1`, `2-1.4`) are considered; root hubs
/// (`usb1`) are skipped by name and interface directories (`1-1:1.0`) fall out
/// because they carry no vendor id. Missing attributes read as empty. Results
/// are sorted by zero-padded bus and device number.
pub fn read_sysfs_tree(root: &Path) -> Result<Vec<DeviceRecord>> {
    let mut devices = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable sysfs entry: {}", e);
                continue;
            }
        };

        let node = entry.file_name().to_string_lossy().into_owned();
        // Entries are usually symlinks, so follow them when checking for a directory
        let dir = entry.path();
        if !node.contains('-') || !dir.is_dir() {
            continue;
        }

        if let Some(record) = read_device(&dir, &node) {
            devices.push(record);
        }
    }

    devices.sort_by_cached_key(|d| format!("{:0>3}-{:0>3}", d.bus, d.device_number));
    Ok(devices)
}

fn read_device(dir: &Path, node: &str) -> Option<DeviceRecord> {
    let vendor = read_attribute(dir, "idVendor");
    let product = read_attribute(dir, "idProduct");
    if vendor.is_empty() || product.is_empty() {
        return None;
    }

    let ids = match VidPid::new(&vendor, &product) {
        Ok(ids) => ids,
        Err(e) => {
            debug!("Skipping sysfs node {}: {}", node, e);
            return None;
        }
    };

    let mut record = DeviceRecord::new(Some(ids));
    record.bus = read_attribute(dir, "busnum");
    record.device_number = read_attribute(dir, "devnum");
    record.manufacturer_name = or_unknown(read_attribute(dir, "manufacturer"));
    record.product_name = or_unknown(read_attribute(dir, "product"));
    record.serial_number = non_empty(read_attribute(dir, "serial"));
    record.speed = non_empty(read_attribute(dir, "speed"));
    record.device_class = non_empty(read_attribute(dir, "bDeviceClass"));
    record.platform_node_id = Some(node.to_string());

    trace!("sysfs {} -> {}", node, record.id_label());
    Some(record)
}

fn read_attribute(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        value
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
