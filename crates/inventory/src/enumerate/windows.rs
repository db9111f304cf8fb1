//! Windows device queries
//!
//! Three sources in decreasing order of capability: `Get-PnpDevice`, the
//! `Win32_PnPEntity` CIM class, and legacy `wmic` CSV output. All of them
//! identify devices by an instance id such as
//! `USB\VID_046D&PID_C52B\5&2A5B3C1&0&2`.

use common::{Error, Result};
use protocol::{DeviceRecord, UNKNOWN_NAME, VidPid};
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

pub const POWERSHELL_PROGRAM: &str = "powershell.exe";
pub const WMIC_PROGRAM: &str = "wmic";

/// Present USB/HID devices plus HID-adjacent classes
pub const PNP_DEVICE_QUERY: &str = "$d = Get-PnpDevice -PresentOnly | \
Where-Object { $_.InstanceId -match '^(USB|HID)\\\\' -or $_.Class -in @('HIDClass','Mouse','Keyboard') } | \
Select-Object InstanceId, FriendlyName, Name, Class, Manufacturer; \
$d | ConvertTo-Json -Depth 3";

/// Broader device inventory, same identifier filter
pub const CIM_PNP_ENTITY_QUERY: &str = "$items = Get-CimInstance Win32_PnPEntity | \
Where-Object { $_.DeviceID -match '^(USB|HID)\\\\' } | \
Select-Object DeviceID, Name, Manufacturer, ClassGuid; \
$items | ConvertTo-Json -Depth 3";

pub const WMIC_ARGS: &[&str] = &[
    "path",
    "Win32_PnPEntity",
    "where",
    "DeviceID like 'USB%' or DeviceID like 'HID%'",
    "get",
    "DeviceID,Name,Manufacturer",
    "/format:csv",
];

static VID_PID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)VID_([0-9A-F]{4}).*PID_([0-9A-F]{4})").expect("VID/PID pattern is valid")
});

/// Arguments for running a script through PowerShell without a profile
pub fn powershell_args(script: &str) -> [&str; 5] {
    ["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", script]
}

/// Pull the vendor/product pair out of a PnP instance id
pub fn extract_vid_pid(instance_id: &str) -> Option<VidPid> {
    let caps = VID_PID.captures(instance_id)?;
    VidPid::new(&caps[1], &caps[2]).ok()
}

/// Locate the JSON payload in PowerShell output
///
/// PowerShell may emit a byte-order mark or warning text before the payload;
/// everything up to the first `[` or `{` is discarded.
pub fn extract_json_payload(output: &str) -> Option<&str> {
    let output = output.trim_start_matches('\u{feff}');
    output.find(['[', '{']).map(|start| output[start..].trim_end())
}

/// `ConvertTo-Json` emits a bare object for a single result
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Decode a PowerShell JSON payload into rows
///
/// Output with no payload at all is an empty result; a payload that is not
/// valid JSON for `T` is a [`Error::Parse`].
fn decode_json_rows<T: DeserializeOwned>(output: &str) -> Result<Vec<T>> {
    let Some(payload) = extract_json_payload(output) else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<OneOrMany<T>>(payload)
        .map_err(|e| Error::Parse(format!("PowerShell JSON payload: {}", e)))?
    {
        OneOrMany::Many(rows) => Ok(rows),
        OneOrMany::One(row) => Ok(vec![row]),
    }
}

fn parse_json_rows<T: DeserializeOwned>(output: &str) -> Vec<T> {
    decode_json_rows(output).unwrap_or_else(|e| {
        debug!("Discarding PowerShell output: {}", e);
        Vec::new()
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PnpDeviceRow {
    instance_id: Option<String>,
    friendly_name: Option<String>,
    name: Option<String>,
    class: Option<String>,
    manufacturer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CimPnpEntityRow {
    #[serde(rename = "DeviceID")]
    device_id: Option<String>,
    name: Option<String>,
    manufacturer: Option<String>,
    class_guid: Option<String>,
}

/// Parse `Get-PnpDevice` JSON output
pub fn parse_pnp_device_json(output: &str) -> Vec<DeviceRecord> {
    parse_json_rows::<PnpDeviceRow>(output)
        .into_iter()
        .map(|row| {
            windows_record(
                row.instance_id,
                row.manufacturer,
                present(row.friendly_name).or(row.name),
                row.class,
            )
        })
        .collect()
}

/// Parse `Win32_PnPEntity` JSON output
pub fn parse_cim_pnp_json(output: &str) -> Vec<DeviceRecord> {
    parse_json_rows::<CimPnpEntityRow>(output)
        .into_iter()
        .map(|row| windows_record(row.device_id, row.manufacturer, row.name, row.class_guid))
        .collect()
}

/// Parse `wmic ... /format:csv` output
///
/// Columns are located through the header row. `wmic` does not quote fields,
/// so surplus commas are folded into the last column.
pub fn parse_wmic_csv(output: &str) -> Vec<DeviceRecord> {
    let mut lines = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    // Warnings may precede the header; the header is the first line naming DeviceID
    let columns = match lines.by_ref().find_map(|line| wmic_columns(line).ok()) {
        Some(columns) => columns,
        None => {
            debug!("Discarding wmic output: no DeviceID header row");
            return Vec::new();
        }
    };
    let device_id_col = columns["deviceid"];
    let name_col = columns.get("name").copied();
    let manufacturer_col = columns.get("manufacturer").copied();
    let width = columns.len();

    lines
        .filter_map(|line| {
            let fields: Vec<&str> = line.splitn(width, ',').map(str::trim).collect();
            let field = |col: Option<usize>| {
                col.and_then(|i| fields.get(i).copied())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let device_id = field(Some(device_id_col));
            let name = field(name_col);
            let manufacturer = field(manufacturer_col);

            if device_id.is_none() && name.is_none() && manufacturer.is_none() {
                return None;
            }
            Some(windows_record(device_id, manufacturer, name, None))
        })
        .collect()
}

/// Map lowercased `wmic` CSV header names to column positions
fn wmic_columns(header: &str) -> Result<HashMap<String, usize>> {
    let columns: HashMap<String, usize> = header
        .split(',')
        .enumerate()
        .map(|(i, name)| (name.trim().to_ascii_lowercase(), i))
        .collect();
    if !columns.contains_key("deviceid") {
        return Err(Error::Parse(format!("not a wmic header row: {}", header)));
    }
    Ok(columns)
}

fn windows_record(
    instance_id: Option<String>,
    manufacturer: Option<String>,
    name: Option<String>,
    class: Option<String>,
) -> DeviceRecord {
    let instance_id = present(instance_id);
    let ids = instance_id.as_deref().and_then(extract_vid_pid);

    let mut record = DeviceRecord::new(ids);
    record.manufacturer_name = present(manufacturer).unwrap_or_else(|| UNKNOWN_NAME.to_string());
    record.product_name = present(name).unwrap_or_else(|| UNKNOWN_NAME.to_string());
    record.device_class = present(class);
    record.platform_node_id = instance_id;
    record
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
