//! USB device inventory
//!
//! Discovers attached USB devices through platform-specific probes, fills in
//! vendor and product names from the `usb.ids` database, and optionally
//! condenses duplicate and noisy entries for display.
//!
//! # Example
//!
//! ```no_run
//! use inventory::{DeviceInventory, InventoryConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let inventory = DeviceInventory::from_config(&InventoryConfig::default())?;
//! let listing = inventory.list(true).await;
//! println!("{}", serde_json::to_string_pretty(&listing)?);
//! # Ok(())
//! # }
//! ```

pub mod condense;
pub mod config;
pub mod enrich;
pub mod enumerate;
pub mod host;
pub mod inventory;

pub use condense::{CondenseOptions, condense, condense_with};
pub use config::InventoryConfig;
pub use enrich::enrich;
pub use enumerate::{CommandRunner, Enumerator, Strategy, SystemCommandRunner};
pub use host::{HostClass, HostClassSetting};
pub use inventory::{DeviceInventory, InventoryListing, NameLookup, RegistrySource};
