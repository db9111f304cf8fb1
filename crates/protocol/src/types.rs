//! Device record type definitions
//!
//! This module defines the normalized shape every enumeration strategy
//! produces, the grouped form used by compact mode, and the `{ count, devices }`
//! envelope handed to callers.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder name used when a source reports an empty or absent name
pub const UNKNOWN_NAME: &str = "(unknown)";

/// Normalized vendor/product identifier pair
///
/// Both halves are always exactly four uppercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VidPid {
    vendor_id: String,
    product_id: String,
}

impl VidPid {
    /// Build a pair from two raw identifiers
    ///
    /// Accepts either case and an optional `0x` prefix; anything that is not
    /// exactly four hex digits is rejected.
    pub fn new(vendor_id: &str, product_id: &str) -> Result<Self> {
        Ok(Self {
            vendor_id: normalize_hex_id(vendor_id)?,
            product_id: normalize_hex_id(product_id)?,
        })
    }

    /// Parse the `VVVV:PPPP` form printed by `lsusb` and friends
    pub fn parse(s: &str) -> Result<Self> {
        let (vendor, product) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ProtocolError::InvalidIdPair(s.to_string()))?;
        Self::new(vendor, product)
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }
}

impl fmt::Display for VidPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor_id, self.product_id)
    }
}

/// Normalize a single hex identifier to four uppercase digits
pub fn normalize_hex_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProtocolError::InvalidHexId(raw.to_string()));
    }

    Ok(digits.to_ascii_uppercase())
}

/// One discovered device
///
/// `vendor_id` and `product_id` are either both four uppercase hex digits or
/// both empty. Use [`DeviceRecord::new`] or [`DeviceRecord::set_ids`] to keep
/// that invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Bus number as reported by the source (may be empty)
    #[serde(default)]
    pub bus: String,
    /// Device number on the bus (may be empty)
    #[serde(default)]
    pub device_number: String,
    #[serde(default)]
    pub vendor_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub manufacturer_name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Class code (sysfs) or class name (Windows), depending on the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    /// Opaque source-specific identifier (sysfs node name, PnP instance id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_node_id: Option<String>,
}

impl DeviceRecord {
    /// Create a record with the given identifiers and `(unknown)` names
    pub fn new(ids: Option<VidPid>) -> Self {
        let mut record = Self {
            manufacturer_name: UNKNOWN_NAME.to_string(),
            product_name: UNKNOWN_NAME.to_string(),
            ..Self::default()
        };
        record.set_ids(ids);
        record
    }

    /// Replace both identifiers at once
    pub fn set_ids(&mut self, ids: Option<VidPid>) {
        match ids {
            Some(ids) => {
                self.vendor_id = ids.vendor_id;
                self.product_id = ids.product_id;
            }
            None => {
                self.vendor_id.clear();
                self.product_id.clear();
            }
        }
    }

    /// Whether the record carries a vendor/product pair
    pub fn has_ids(&self) -> bool {
        !self.vendor_id.is_empty() && !self.product_id.is_empty()
    }

    /// The `VVVV:PPPP` label, or an empty string when the ids are absent
    pub fn id_label(&self) -> String {
        if self.has_ids() {
            format!("{}:{}", self.vendor_id, self.product_id)
        } else {
            String::new()
        }
    }
}

/// A set of duplicate devices merged into one display row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CondensedGroup {
    /// Representative device, possibly upgraded with names from later duplicates
    #[serde(flatten)]
    pub device: DeviceRecord,
    /// Number of input records merged into this group
    pub count: usize,
}

/// Envelope returned to callers: `{ "count": n, "devices": [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList<T> {
    pub count: usize,
    pub devices: Vec<T>,
}

impl<T> From<Vec<T>> for DeviceList<T> {
    fn from(devices: Vec<T>) -> Self {
        Self {
            count: devices.len(),
            devices,
        }
    }
}
