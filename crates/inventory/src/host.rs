//! Host classification
//!
//! Picks the family of enumeration strategies to run. Detection is heuristic,
//! so configuration can pin the class and tests can construct one directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variables set inside a Windows-hosted Linux environment
pub const WSL_ENV_MARKERS: &[&str] = &["WSL_INTEROP", "WSL_DISTRO_NAME"];

const KERNEL_RELEASE_PATH: &str = "/proc/sys/kernel/osrelease";

/// Operating-system family used to select enumeration strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostClass {
    /// Native Windows, or Linux running under a Windows compatibility layer
    Windows,
    /// Native Linux
    Linux,
    /// Anything else; no strategy is implemented
    Unsupported,
}

impl HostClass {
    /// Classify the running host
    pub fn detect() -> Self {
        let os = std::env::consts::OS;
        let kernel_release = if os == "linux" {
            std::fs::read_to_string(KERNEL_RELEASE_PATH).unwrap_or_default()
        } else {
            String::new()
        };

        Self::classify(
            os,
            |name| std::env::var_os(name).is_some_and(|v| !v.is_empty()),
            &kernel_release,
        )
    }

    /// Classify from explicit inputs
    pub fn classify(os: &str, env_is_set: impl Fn(&str) -> bool, kernel_release: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "linux" => {
                let under_wsl = WSL_ENV_MARKERS.iter().any(|name| env_is_set(name))
                    || kernel_release.to_lowercase().contains("microsoft");
                if under_wsl { Self::Windows } else { Self::Linux }
            }
            _ => Self::Unsupported,
        }
    }
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Configured host class: detect at runtime or pin one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostClassSetting {
    #[default]
    Auto,
    Windows,
    Linux,
    Unsupported,
}

impl HostClassSetting {
    pub fn resolve(self) -> HostClass {
        match self {
            Self::Auto => HostClass::detect(),
            Self::Windows => HostClass::Windows,
            Self::Linux => HostClass::Linux,
            Self::Unsupported => HostClass::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> bool {
        false
    }

    #[test]
    fn test_native_windows() {
        assert_eq!(HostClass::classify("windows", no_env, ""), HostClass::Windows);
    }

    #[test]
    fn test_native_linux() {
        assert_eq!(
            HostClass::classify("linux", no_env, "6.8.0-45-generic\n"),
            HostClass::Linux
        );
    }

    #[test]
    fn test_wsl_by_kernel_release() {
        assert_eq!(
            HostClass::classify("linux", no_env, "5.15.153.1-microsoft-standard-WSL2\n"),
            HostClass::Windows
        );
        assert_eq!(
            HostClass::classify("linux", no_env, "4.4.0-19041-Microsoft"),
            HostClass::Windows
        );
    }

    #[test]
    fn test_wsl_by_env_marker() {
        assert_eq!(
            HostClass::classify("linux", |name| name == "WSL_DISTRO_NAME", "6.1.0"),
            HostClass::Windows
        );
    }

    #[test]
    fn test_other_os_is_unsupported() {
        assert_eq!(HostClass::classify("macos", no_env, ""), HostClass::Unsupported);
        assert_eq!(HostClass::classify("freebsd", no_env, ""), HostClass::Unsupported);
    }

    #[test]
    fn test_setting_pins_class() {
        assert_eq!(HostClassSetting::Linux.resolve(), HostClass::Linux);
        assert_eq!(HostClassSetting::Windows.resolve(), HostClass::Windows);
        assert_eq!(HostClassSetting::Unsupported.resolve(), HostClass::Unsupported);
    }

    #[test]
    fn test_setting_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            host_class: HostClassSetting,
        }
        let parsed: Wrapper = toml::from_str("host_class = \"windows\"").unwrap();
        assert_eq!(parsed.host_class, HostClassSetting::Windows);
    }
}
