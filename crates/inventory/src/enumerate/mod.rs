//! USB device enumeration
//!
//! Enumeration is an ordered list of independent probes. Each probe either
//! produces records or fails, and the first probe that yields at least one
//! record wins:
//! - Windows-like hosts: `Get-PnpDevice`, then `Win32_PnPEntity`, then `wmic`
//! - Linux hosts: the sysfs device tree, then `lsusb`
//! - Anything else: nothing
//!
//! Failures never escape [`Enumerator::list_devices`]; a failing probe just
//! hands over to the next one.

pub mod command;
pub mod lsusb;
pub mod sysfs;
pub mod windows;

pub use command::{CommandRunner, SystemCommandRunner};

use crate::host::HostClass;
use common::Result;
use protocol::DeviceRecord;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One way of listing attached devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// PowerShell `Get-PnpDevice -PresentOnly`
    PnpDevice,
    /// PowerShell `Get-CimInstance Win32_PnPEntity`
    CimPnpEntity,
    /// Legacy `wmic` CSV query
    Wmic,
    /// Walk of `/sys/bus/usb/devices`
    Sysfs,
    /// `lsusb` text output
    Lsusb,
}

impl Strategy {
    /// Probes to try, in order, for a host class
    pub fn plan(host: HostClass) -> &'static [Strategy] {
        match host {
            HostClass::Windows => &[Self::PnpDevice, Self::CimPnpEntity, Self::Wmic],
            HostClass::Linux => &[Self::Sysfs, Self::Lsusb],
            HostClass::Unsupported => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PnpDevice => "pnp-device",
            Self::CimPnpEntity => "cim-pnp-entity",
            Self::Wmic => "wmic",
            Self::Sysfs => "sysfs",
            Self::Lsusb => "lsusb",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lists devices attached to the host
#[derive(Debug, Clone)]
pub struct Enumerator<R = SystemCommandRunner> {
    host: HostClass,
    sysfs_root: PathBuf,
    runner: R,
}

impl<R: CommandRunner> Enumerator<R> {
    pub fn new(host: HostClass, sysfs_root: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            host,
            sysfs_root: sysfs_root.into(),
            runner,
        }
    }

    pub fn host(&self) -> HostClass {
        self.host
    }

    pub fn sysfs_root(&self) -> &Path {
        &self.sysfs_root
    }

    /// List attached devices using the first probe that finds any
    ///
    /// Never fails; returns an empty list when every probe comes up empty.
    pub async fn list_devices(&self) -> Vec<DeviceRecord> {
        for &strategy in Strategy::plan(self.host) {
            match self.run_strategy(strategy).await {
                Ok(devices) if !devices.is_empty() => {
                    info!("{} found {} device(s)", strategy, devices.len());
                    return devices;
                }
                Ok(_) => debug!("{} found no devices", strategy),
                Err(e) => debug!("{} failed: {}", strategy, e),
            }
        }

        debug!("No enumeration strategy produced devices on {} host", self.host);
        Vec::new()
    }

    /// Run a single probe
    pub async fn run_strategy(&self, strategy: Strategy) -> Result<Vec<DeviceRecord>> {
        match strategy {
            Strategy::PnpDevice => {
                let args = windows::powershell_args(windows::PNP_DEVICE_QUERY);
                let output = self.runner.run(windows::POWERSHELL_PROGRAM, &args).await?;
                Ok(windows::parse_pnp_device_json(&output))
            }
            Strategy::CimPnpEntity => {
                let args = windows::powershell_args(windows::CIM_PNP_ENTITY_QUERY);
                let output = self.runner.run(windows::POWERSHELL_PROGRAM, &args).await?;
                Ok(windows::parse_cim_pnp_json(&output))
            }
            Strategy::Wmic => {
                let output = self
                    .runner
                    .run(windows::WMIC_PROGRAM, windows::WMIC_ARGS)
                    .await?;
                Ok(windows::parse_wmic_csv(&output))
            }
            Strategy::Sysfs => {
                let root = self.sysfs_root.clone();
                tokio::task::spawn_blocking(move || sysfs::read_sysfs_tree(&root))
                    .await
                    .map_err(std::io::Error::from)?
            }
            Strategy::Lsusb => {
                let output = self.runner.run(lsusb::LSUSB_PROGRAM, &[]).await?;
                Ok(lsusb::parse_lsusb(&output))
            }
        }
    }
}
