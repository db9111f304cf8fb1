//! Configuration file tests
//!
//! Run with: `cargo test -p inventory --test config_tests`

use inventory::{DeviceInventory, HostClass, HostClassSetting, InventoryConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

const FULL_CONFIG: &str = r#"
[general]
log_level = "debug"
compact = true

[registry]
usb_ids_path = "/opt/hwdata/usb.ids"

[enumeration]
host_class = "linux"
command_timeout_secs = 5
max_output_bytes = 65536
sysfs_root = "/tmp/fake-sysfs"

[condense]
skip_classes = ["Keyboard", "Mouse"]
keep_pattern = "scanner|reader"
"#;

#[test]
fn test_load_full_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventory.toml");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = InventoryConfig::load(Some(path)).unwrap();
    assert_eq!(config.general.log_level, "debug");
    assert!(config.general.compact);
    assert_eq!(
        config.configured_usb_ids_path(),
        Some(PathBuf::from("/opt/hwdata/usb.ids"))
    );
    assert_eq!(config.enumeration.host_class, HostClassSetting::Linux);
    assert_eq!(config.enumeration.command_timeout(), Duration::from_secs(5));
    assert_eq!(config.enumeration.max_output_bytes, 65536);
    assert_eq!(config.enumeration.sysfs_root, PathBuf::from("/tmp/fake-sysfs"));
    assert_eq!(config.condense.skip_classes, vec!["Keyboard", "Mouse"]);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = InventoryConfig::parse("[enumeration]\nhost_class = \"windows\"\n").unwrap();

    assert_eq!(config.enumeration.host_class, HostClassSetting::Windows);
    assert_eq!(config.enumeration.command_timeout(), Duration::from_secs(15));
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.condense.keep_pattern, "barcode|scanner");
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventory.toml");

    fs::write(&path, "[enumeration]\ncommand_timeout_secs = 0\n").unwrap();
    assert!(InventoryConfig::load(Some(path.clone())).is_err());

    fs::write(&path, "[enumeration]\nhost_class = \"macos\"\n").unwrap();
    assert!(InventoryConfig::load(Some(path.clone())).is_err());

    fs::write(&path, "[condense]\nkeep_pattern = \"(\"\n").unwrap();
    assert!(InventoryConfig::load(Some(path.clone())).is_err());

    fs::write(&path, "not toml at all [").unwrap();
    assert!(InventoryConfig::load(Some(path)).is_err());
}

#[test]
fn test_load_missing_file_is_error() {
    let dir = tempdir().unwrap();
    assert!(InventoryConfig::load(Some(dir.path().join("absent.toml"))).is_err());
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("inventory.toml");

    let mut config = InventoryConfig::default();
    config.general.compact = true;
    config.enumeration.host_class = HostClassSetting::Unsupported;
    config.save(&path).unwrap();

    let loaded = InventoryConfig::load(Some(path)).unwrap();
    assert!(loaded.general.compact);
    assert_eq!(loaded.enumeration.host_class, HostClassSetting::Unsupported);
    assert_eq!(loaded.condense.skip_classes, config.condense.skip_classes);
}

#[tokio::test]
async fn test_inventory_from_config() {
    let dir = tempdir().unwrap();
    let config = InventoryConfig::parse(&format!(
        "[registry]\nusb_ids_path = \"{}\"\n\n[enumeration]\nhost_class = \"unsupported\"\n",
        dir.path().join("usb.ids").display()
    ))
    .unwrap();

    let inventory = DeviceInventory::from_config(&config).unwrap();
    assert_eq!(inventory.enumerator().host(), HostClass::Unsupported);
    assert!(inventory.list(true).await.is_empty());
}
