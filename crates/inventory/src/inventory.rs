//! Device inventory facade
//!
//! The two entry points a front end needs: list current devices (optionally
//! condensed) and look up names for a vendor/product pair.

use crate::condense::{CondenseOptions, condense_with};
use crate::config::InventoryConfig;
use crate::enrich::enrich;
use crate::enumerate::{CommandRunner, Enumerator, SystemCommandRunner};
use common::{UsbIdRegistry, registry};
use protocol::{CondensedGroup, DeviceList, DeviceRecord, normalize_hex_id};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where the name database comes from
#[derive(Debug, Clone)]
pub enum RegistrySource {
    /// The process-wide registry, loaded lazily from this path
    Shared(PathBuf),
    /// A registry owned by this inventory
    Fixed(Arc<UsbIdRegistry>),
}

impl RegistrySource {
    pub fn get(&self) -> Arc<UsbIdRegistry> {
        match self {
            Self::Shared(path) => registry::ensure_loaded(path),
            Self::Fixed(registry) => Arc::clone(registry),
        }
    }

    /// Like [`get`](Self::get), but a first load runs on the blocking pool
    pub async fn get_async(&self) -> Arc<UsbIdRegistry> {
        match self {
            Self::Shared(path) => {
                if let Some(registry) = registry::current() {
                    return registry;
                }
                let path = path.clone();
                tokio::task::spawn_blocking(move || registry::ensure_loaded(&path))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("USB ID database load task failed: {}", e);
                        Arc::new(UsbIdRegistry::empty())
                    })
            }
            Self::Fixed(registry) => Arc::clone(registry),
        }
    }
}

/// Result of a listing request, serialized as `{ "count": n, "devices": [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InventoryListing {
    Full(DeviceList<DeviceRecord>),
    Compact(DeviceList<CondensedGroup>),
}

impl InventoryListing {
    pub fn count(&self) -> usize {
        match self {
            Self::Full(list) => list.count,
            Self::Compact(list) => list.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Names resolved for a vendor/product pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameLookup {
    pub vendor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Empty when the vendor is not in the database
    pub vendor_name: String,
    /// Empty when the pair is not in the database
    pub product_name: String,
}

/// Enumerates, enriches and optionally condenses devices
#[derive(Debug, Clone)]
pub struct DeviceInventory<R = SystemCommandRunner> {
    enumerator: Enumerator<R>,
    registry: RegistrySource,
    condense: CondenseOptions,
}

impl DeviceInventory<SystemCommandRunner> {
    /// Build an inventory wired to the real host
    pub fn from_config(config: &InventoryConfig) -> anyhow::Result<Self> {
        let enumeration = &config.enumeration;
        let host = enumeration.host_class.resolve();
        debug!("Host classified as {}", host);

        let runner =
            SystemCommandRunner::new(enumeration.command_timeout(), enumeration.max_output_bytes);
        Ok(Self::new(
            Enumerator::new(host, enumeration.sysfs_root.clone(), runner),
            RegistrySource::Shared(config.usb_ids_path()),
            config.condense.options()?,
        ))
    }
}

impl<R: CommandRunner> DeviceInventory<R> {
    pub fn new(enumerator: Enumerator<R>, registry: RegistrySource, condense: CondenseOptions) -> Self {
        Self {
            enumerator,
            registry,
            condense,
        }
    }

    pub fn enumerator(&self) -> &Enumerator<R> {
        &self.enumerator
    }

    /// The name database, loading it on first use
    pub fn registry(&self) -> Arc<UsbIdRegistry> {
        self.registry.get()
    }

    /// Enumerate fresh, enrich with database names, condense if requested
    ///
    /// Never fails; an unusable host yields an empty listing.
    pub async fn list(&self, compact: bool) -> InventoryListing {
        let devices = self.enumerator.list_devices().await;
        let devices = enrich(devices, &*self.registry.get_async().await);

        if compact {
            let groups = condense_with(devices, &self.condense);
            debug!("Condensed into {} group(s)", groups.len());
            InventoryListing::Compact(groups.into())
        } else {
            InventoryListing::Full(devices.into())
        }
    }

    /// Look up names for a vendor id and optional product id
    ///
    /// Unknown or malformed ids produce empty names rather than errors.
    pub fn lookup_name(&self, vendor_id: &str, product_id: Option<&str>) -> NameLookup {
        let vendor_id = normalize_hex_id(vendor_id).unwrap_or_else(|_| vendor_id.trim().to_string());
        let product_id = product_id
            .map(|p| normalize_hex_id(p).unwrap_or_else(|_| p.trim().to_string()));

        let registry = self.registry();
        let vendor_name = registry
            .lookup_vendor_name(&vendor_id)
            .unwrap_or_default()
            .to_string();
        let product_name = product_id
            .as_deref()
            .and_then(|p| registry.lookup_product_name(&vendor_id, p))
            .unwrap_or_default()
            .to_string();

        NameLookup {
            vendor_id,
            product_id,
            vendor_name,
            product_name,
        }
    }
}
