//! `lsusb` output parsing

use protocol::{DeviceRecord, VidPid};
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

pub const LSUSB_PROGRAM: &str = "lsusb";

static LSUSB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Bus\s+(\d+)\s+Device\s+(\d+):\s+ID\s+([0-9A-Fa-f]{4}):([0-9A-Fa-f]{4})\s+(.+)$")
        .expect("lsusb line pattern is valid")
});

/// Parse `lsusb` listing lines into records
///
/// The free text after the id pair becomes the product name; the manufacturer
/// is left empty because `lsusb` never reports it separately. Lines that do
/// not match, including lines with nothing after the id pair, are dropped.
pub fn parse_lsusb(output: &str) -> Vec<DeviceRecord> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<DeviceRecord> {
    let Some(caps) = LSUSB_LINE.captures(line) else {
        trace!("Ignoring lsusb line: {}", line);
        return None;
    };
    let ids = VidPid::new(&caps[3], &caps[4]).ok()?;

    let mut record = DeviceRecord::new(Some(ids));
    record.bus = caps[1].to_string();
    record.device_number = caps[2].to_string();
    record.manufacturer_name = String::new();
    record.product_name = caps[5].trim().to_string();
    Some(record)
}
