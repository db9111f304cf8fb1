//! Compact mode: filter noisy system devices and merge duplicates
//!
//! A composite device shows up once per interface on Windows, and hubs,
//! keyboards and mice crowd out the devices an operator is looking for. Compact
//! mode drops records without ids, drops records whose class is in the skip set
//! unless their name looks like a barcode scanner, then merges records sharing
//! vendor id, product id and product name into one counted group.

use protocol::{CondensedGroup, DeviceRecord, UNKNOWN_NAME};
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};

/// Device classes hidden in compact mode
pub const DEFAULT_SKIP_CLASSES: &[&str] =
    &["USB", "HIDClass", "Keyboard", "Mouse", "Camera", "Bluetooth"];

/// Names matching this pattern are always kept (case-insensitive)
pub const DEFAULT_KEEP_PATTERN: &str = "barcode|scanner";

/// Filter settings for compact mode
#[derive(Debug, Clone)]
pub struct CondenseOptions {
    skip_classes: HashSet<String>,
    keep_pattern: Regex,
}

impl Default for CondenseOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_CLASSES.iter().copied(), DEFAULT_KEEP_PATTERN)
            .expect("default keep pattern is valid")
    }
}

impl CondenseOptions {
    /// Build options; `keep_pattern` is compiled case-insensitively
    pub fn new<I, S>(skip_classes: I, keep_pattern: &str) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            skip_classes: skip_classes.into_iter().map(Into::into).collect(),
            keep_pattern: RegexBuilder::new(keep_pattern)
                .case_insensitive(true)
                .build()?,
        })
    }

    /// Whether a record survives the compact-mode filter
    pub fn keeps(&self, record: &DeviceRecord) -> bool {
        if !record.has_ids() {
            return false;
        }

        let name = format!("{} {}", record.product_name, record.manufacturer_name);
        if self.keep_pattern.is_match(&name) {
            return true;
        }

        let class = record.device_class.as_deref().unwrap_or("");
        !self.skip_classes.contains(class)
    }
}

/// Grouping key: `VID:PID|lowercased product name`
pub fn group_key(record: &DeviceRecord) -> String {
    format!(
        "{}:{}|{}",
        record.vendor_id.to_ascii_uppercase(),
        record.product_id.to_ascii_uppercase(),
        record.product_name.to_lowercase()
    )
}

/// Condense with the default skip set and keep pattern
pub fn condense(records: Vec<DeviceRecord>) -> Vec<CondensedGroup> {
    condense_with(records, &CondenseOptions::default())
}

/// Filter, group and sort records for compact display
///
/// The first record of a group is its representative. A later duplicate with
/// a real (non-empty, non-`(unknown)`) manufacturer or product name replaces
/// the representative's. Groups are sorted by `VID:PID`; groups sharing a pair
/// keep first-seen order.
pub fn condense_with(records: Vec<DeviceRecord>, options: &CondenseOptions) -> Vec<CondensedGroup> {
    let mut groups: Vec<CondensedGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records.into_iter().filter(|r| options.keeps(r)) {
        let key = group_key(&record);
        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                group.count += 1;
                if is_informative(&record.manufacturer_name) {
                    group.device.manufacturer_name = record.manufacturer_name;
                }
                if is_informative(&record.product_name) {
                    group.device.product_name = record.product_name;
                }
            }
            None => {
                index.insert(key, groups.len());
                groups.push(CondensedGroup {
                    device: record,
                    count: 1,
                });
            }
        }
    }

    groups.sort_by(|a, b| {
        (a.device.vendor_id.as_str(), a.device.product_id.as_str())
            .cmp(&(b.device.vendor_id.as_str(), b.device.product_id.as_str()))
    });
    groups
}

fn is_informative(name: &str) -> bool {
    !name.is_empty() && name != UNKNOWN_NAME
}
