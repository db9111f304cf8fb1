//! Shared Registry Tests
//!
//! Listing against the process-wide name database, loaded lazily on the
//! blocking pool. Kept in its own binary so the database starts unloaded.
//!
//! Run with: `cargo test -p inventory --test shared_registry_tests`

use common::registry;
use common::test_utils::{create_sysfs_device, write_sample_usb_ids};
use common::{Error, Result};
use inventory::{
    CommandRunner, CondenseOptions, DeviceInventory, Enumerator, HostClass, InventoryListing,
    RegistrySource,
};
use tempfile::tempdir;

#[derive(Debug, Clone)]
struct NoCommands;

impl CommandRunner for NoCommands {
    async fn run(&self, program: &str, _args: &[&str]) -> Result<String> {
        Err(Error::ExternalCommand {
            program: program.to_string(),
            reason: "spawn failed: No such file or directory".to_string(),
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_loads_shared_registry_lazily() {
    let dir = tempdir().unwrap();
    let ids = write_sample_usb_ids(dir.path()).unwrap();
    let sysfs = dir.path().join("devices");
    create_sysfs_device(
        &sysfs,
        "1-3",
        &[("idVendor", "05e3"), ("idProduct", "0608"), ("busnum", "1"), ("devnum", "7")],
    )
    .unwrap();

    let inventory = DeviceInventory::new(
        Enumerator::new(HostClass::Linux, &sysfs, NoCommands),
        RegistrySource::Shared(ids.clone()),
        CondenseOptions::default(),
    );

    assert!(!registry::is_loaded());
    let InventoryListing::Full(list) = inventory.list(false).await else {
        panic!("expected a full listing");
    };
    assert!(registry::is_loaded());

    assert_eq!(list.count, 1);
    assert_eq!(list.devices[0].manufacturer_name, "Genesys Logic, Inc.");
    assert_eq!(list.devices[0].product_name, "Hub");

    // Later lookups reuse the loaded table
    let lookup = inventory.lookup_name("05e3", Some("0608"));
    assert_eq!(lookup.product_name, "Hub");
    assert_eq!(inventory.registry().vendor_count(), 4);
}
