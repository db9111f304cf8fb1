//! Process-wide name database
//!
//! The registry starts unloaded and is populated on first use. A failed load
//! leaves an empty registry in place so lookups miss instead of erroring; it is
//! only retried through [`reload`]. Two callers racing on the first load both
//! parse the file and the last one to store wins, which is harmless because
//! both produce the same table.

use crate::usb_ids::UsbIdRegistry;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

static REGISTRY: RwLock<Option<Arc<UsbIdRegistry>>> = RwLock::new(None);

/// The registry if it has been populated
pub fn current() -> Option<Arc<UsbIdRegistry>> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Whether a load (successful or not) has happened in this process
pub fn is_loaded() -> bool {
    current().is_some()
}

/// Return the process-wide registry, loading it from `path` if needed
///
/// Never fails: an unreadable file yields an empty registry.
pub fn ensure_loaded(path: &Path) -> Arc<UsbIdRegistry> {
    if let Some(registry) = current() {
        return registry;
    }

    let registry = match UsbIdRegistry::load(path) {
        Ok(registry) => {
            info!(
                "Loaded USB ID database from {} ({} vendors, {} products)",
                path.display(),
                registry.vendor_count(),
                registry.product_count()
            );
            registry
        }
        Err(e) => {
            warn!(
                "Failed to load USB ID database from {}: {}, names will not be enriched",
                path.display(),
                e
            );
            UsbIdRegistry::empty()
        }
    };

    store(Arc::new(registry))
}

/// Replace the process-wide registry with a fresh parse of `path`
///
/// On failure the current registry is left untouched.
pub fn reload(path: &Path) -> crate::Result<Arc<UsbIdRegistry>> {
    let registry = UsbIdRegistry::load(path)?;
    info!(
        "Reloaded USB ID database from {} ({} vendors)",
        path.display(),
        registry.vendor_count()
    );
    Ok(store(Arc::new(registry)))
}

fn store(registry: Arc<UsbIdRegistry>) -> Arc<UsbIdRegistry> {
    *REGISTRY.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&registry));
    registry
}
