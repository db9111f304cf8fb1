//! usb-inventory
//!
//! Lists USB devices attached to this host, with vendor and product names
//! taken from the `usb.ids` database.

use anyhow::{Context, Result};
use clap::Parser;
use common::setup_logging;
use inventory::{DeviceInventory, InventoryConfig, InventoryListing, NameLookup};
use protocol::{CondensedGroup, DeviceRecord};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "usb-inventory")]
#[command(
    author,
    version,
    about = "USB Inventory - List attached USB devices with vendor names"
)]
#[command(long_about = "
Lists USB devices attached to this host. Devices are discovered through sysfs
or lsusb on Linux and through PowerShell or wmic on Windows (including WSL),
then annotated with names from the usb.ids database.

EXAMPLES:
    # List all devices
    usb-inventory

    # Hide hubs, keyboards and mice and merge duplicate interfaces
    usb-inventory --compact

    # Machine-readable output
    usb-inventory --json

    # Look up a vendor/product pair
    usb-inventory --lookup 046d:c52b

CONFIGURATION:
    The tool looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usb-inventory/inventory.toml
    3. /etc/usb-inventory/inventory.toml
    4. Built-in defaults

    The usb.ids location can be overridden with the USB_IDS_PATH environment
    variable.
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Filter noisy device classes and merge duplicates
    #[arg(long, conflicts_with = "full")]
    compact: bool,

    /// List every device even if compact mode is configured
    #[arg(long)]
    full: bool,

    /// Print JSON ({ count, devices }) instead of a table
    #[arg(long)]
    json: bool,

    /// Look up names for VID or VID:PID and exit
    #[arg(long, value_name = "VID[:PID]")]
    lookup: Option<String>,

    /// Show name database location and statistics and exit
    #[arg(long)]
    ids_info: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = InventoryConfig::default();
        let path = InventoryConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        InventoryConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        InventoryConfig::load_or_default()
    };

    // Use CLI log level if specified, otherwise use config value
    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.general.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("usb-inventory v{}", env!("CARGO_PKG_VERSION"));

    let inventory =
        DeviceInventory::from_config(&config).context("Failed to initialize inventory")?;

    if let Some(ref query) = args.lookup {
        let (vendor, product) = match query.split_once(':') {
            Some((vendor, product)) => (vendor, Some(product)),
            None => (query.as_str(), None),
        };
        let lookup = inventory.lookup_name(vendor, product);
        return print_lookup(&lookup, args.json);
    }

    if args.ids_info {
        let registry = inventory.registry();
        println!("Database: {}", config.usb_ids_path().display());
        println!("Vendors:  {}", registry.vendor_count());
        println!("Products: {}", registry.product_count());
        return Ok(());
    }

    let compact = args.compact || (config.general.compact && !args.full);
    let listing = inventory.list(compact).await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).context("Failed to serialize device list")?
        );
    } else {
        print_listing(&listing);
    }

    Ok(())
}

fn print_lookup(lookup: &NameLookup, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(lookup).context("Failed to serialize lookup")?
        );
        return Ok(());
    }

    let vendor = if lookup.vendor_name.is_empty() {
        "(not found)"
    } else {
        lookup.vendor_name.as_str()
    };
    println!("Vendor  {}: {}", lookup.vendor_id, vendor);

    if let Some(product_id) = &lookup.product_id {
        let product = if lookup.product_name.is_empty() {
            "(not found)"
        } else {
            lookup.product_name.as_str()
        };
        println!("Product {}: {}", product_id, product);
    }
    Ok(())
}

fn print_listing(listing: &InventoryListing) {
    if listing.is_empty() {
        println!("No USB devices found.");
        return;
    }

    println!("Found {} USB device(s):\n", listing.count());
    match listing {
        InventoryListing::Full(list) => list.devices.iter().for_each(print_device),
        InventoryListing::Compact(list) => list.devices.iter().for_each(print_group),
    }
}

fn print_device(device: &DeviceRecord) {
    let location = if device.bus.is_empty() {
        "-------".to_string()
    } else {
        format!("{:0>3}:{:0>3}", device.bus, device.device_number)
    };
    let ids = if device.has_ids() {
        device.id_label()
    } else {
        "----:----".to_string()
    };

    println!(
        "  [{}] {} - {} {}",
        location, ids, device.manufacturer_name, device.product_name
    );

    let mut details = Vec::new();
    if let Some(class) = &device.device_class {
        details.push(format!("Class: {}", class));
    }
    if let Some(speed) = &device.speed {
        details.push(format!("Speed: {} Mbps", speed));
    }
    if let Some(serial) = &device.serial_number {
        details.push(format!("Serial: {}", serial));
    }
    if !details.is_empty() {
        println!("      {}", details.join("  "));
    }
}

fn print_group(group: &CondensedGroup) {
    let device = &group.device;
    println!(
        "  {} x{} - {} {}",
        device.id_label(),
        group.count,
        device.manufacturer_name,
        device.product_name
    );
}
