//! Boundary types for usb-inventory
//!
//! This crate defines the normalized device record produced by every
//! enumeration strategy, the grouped record used in compact mode, and the
//! `{ count, devices }` envelope returned to callers.
//!
//! # Example
//!
//! ```
//! use protocol::{DeviceList, DeviceRecord, VidPid, UNKNOWN_NAME};
//!
//! let ids = VidPid::parse("046d:c52b").unwrap();
//! let record = DeviceRecord::new(Some(ids));
//! assert_eq!(record.vendor_id, "046D");
//! assert_eq!(record.manufacturer_name, UNKNOWN_NAME);
//!
//! let list: DeviceList<DeviceRecord> = vec![record].into();
//! assert_eq!(list.count, 1);
//! ```

pub mod error;
pub mod types;

pub use error::{ProtocolError, Result};
pub use types::{CondensedGroup, DeviceList, DeviceRecord, UNKNOWN_NAME, VidPid, normalize_hex_id};
