//! Inventory configuration management

use crate::condense::{CondenseOptions, DEFAULT_KEEP_PATTERN, DEFAULT_SKIP_CLASSES};
use crate::enumerate::command::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES};
use crate::enumerate::sysfs::DEFAULT_SYSFS_ROOT;
use crate::host::HostClassSetting;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub general: GeneralSettings,
    /// Name database location
    #[serde(default)]
    pub registry: RegistrySettings,
    /// Host detection and external command limits
    #[serde(default)]
    pub enumeration: EnumerationSettings,
    /// Compact mode filter
    #[serde(default)]
    pub condense: CondenseSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default = "GeneralSettings::default_log_level")]
    pub log_level: String,
    /// Use compact mode unless the caller asks otherwise
    #[serde(default)]
    pub compact: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            compact: false,
        }
    }
}

impl GeneralSettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Path to `usb.ids`; `~` is expanded. `USB_IDS_PATH` takes precedence.
    #[serde(default)]
    pub usb_ids_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationSettings {
    /// auto, windows, linux or unsupported
    #[serde(default)]
    pub host_class: HostClassSetting,
    #[serde(default = "EnumerationSettings::default_command_timeout")]
    pub command_timeout_secs: u64,
    #[serde(default = "EnumerationSettings::default_max_output_bytes")]
    pub max_output_bytes: usize,
    #[serde(default = "EnumerationSettings::default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

impl Default for EnumerationSettings {
    fn default() -> Self {
        Self {
            host_class: HostClassSetting::default(),
            command_timeout_secs: Self::default_command_timeout(),
            max_output_bytes: Self::default_max_output_bytes(),
            sysfs_root: Self::default_sysfs_root(),
        }
    }
}

impl EnumerationSettings {
    fn default_command_timeout() -> u64 {
        DEFAULT_COMMAND_TIMEOUT.as_secs()
    }

    fn default_max_output_bytes() -> usize {
        DEFAULT_MAX_OUTPUT_BYTES
    }

    fn default_sysfs_root() -> PathBuf {
        PathBuf::from(DEFAULT_SYSFS_ROOT)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondenseSettings {
    /// Device classes hidden in compact mode
    #[serde(default = "CondenseSettings::default_skip_classes")]
    pub skip_classes: Vec<String>,
    /// Case-insensitive pattern for names that are always kept
    #[serde(default = "CondenseSettings::default_keep_pattern")]
    pub keep_pattern: String,
}

impl Default for CondenseSettings {
    fn default() -> Self {
        Self {
            skip_classes: Self::default_skip_classes(),
            keep_pattern: Self::default_keep_pattern(),
        }
    }
}

impl CondenseSettings {
    fn default_skip_classes() -> Vec<String> {
        DEFAULT_SKIP_CLASSES.iter().map(|s| s.to_string()).collect()
    }

    fn default_keep_pattern() -> String {
        DEFAULT_KEEP_PATTERN.to_string()
    }

    pub fn options(&self) -> Result<CondenseOptions> {
        CondenseOptions::new(self.skip_classes.iter().cloned(), &self.keep_pattern)
            .with_context(|| format!("Invalid keep_pattern '{}'", self.keep_pattern))
    }
}

impl InventoryConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/usb-inventory/inventory.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: InventoryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usb-inventory").join("inventory.toml")
        } else {
            PathBuf::from(".config/usb-inventory/inventory.toml")
        }
    }

    /// Configured `usb.ids` path with `~` expanded, if any
    pub fn configured_usb_ids_path(&self) -> Option<PathBuf> {
        self.registry
            .usb_ids_path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }

    /// Name database location after applying environment and fallbacks
    pub fn usb_ids_path(&self) -> PathBuf {
        common::resolve_usb_ids_path(self.configured_usb_ids_path().as_deref())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.enumeration.command_timeout_secs == 0 {
            return Err(anyhow!("command_timeout_secs must be greater than 0"));
        }

        if self.enumeration.max_output_bytes == 0 {
            return Err(anyhow!("max_output_bytes must be greater than 0"));
        }

        if self.condense.skip_classes.iter().any(|c| c.trim().is_empty()) {
            return Err(anyhow!("Empty class name in skip_classes list"));
        }

        self.condense.options()?;

        Ok(())
    }
}
