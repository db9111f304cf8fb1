//! Common utilities for usb-inventory
//!
//! This crate provides the pieces shared by every front end: error handling,
//! logging setup, the `usb.ids` name database and the process-wide registry
//! built from it.

pub mod error;
pub mod logging;
pub mod registry;
pub mod test_utils;
pub mod usb_ids;

pub use error::{Error, Result};
pub use logging::setup_logging;
pub use usb_ids::{UsbIdRegistry, VendorEntry, resolve_usb_ids_path};
