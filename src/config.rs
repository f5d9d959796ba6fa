// SPDX-License-Identifier: MPL-2.0

//! Persistent preferences and fixed system locations.

use std::env;
use std::path::PathBuf;

use cosmic::cosmic_config::{self, cosmic_config_derive::CosmicConfigEntry, CosmicConfigEntry};

/// Configuration category holding the keyboard options applied at login.
pub const STARTUP_ENABLE: &str = "StartupEnable";

/// Options the session applies when the user logs in.
#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq)]
#[version = 1]
pub struct StartupEnable {
    /// Turn Num Lock on at login
    pub num_lock: bool,
}

impl Default for StartupEnable {
    fn default() -> Self {
        Self { num_lock: true }
    }
}

impl StartupEnable {
    /// Opens the `StartupEnable` category under the application namespace.
    pub fn handler(app_id: &str) -> Result<cosmic_config::Config, cosmic_config::Error> {
        cosmic_config::Config::new(&format!("{app_id}.{STARTUP_ENABLE}"), Self::VERSION)
    }

    /// Loads the stored entry, falling back to defaults for missing or unparsable keys.
    pub fn load(handler: Option<&cosmic_config::Config>) -> Self {
        handler
            .map(|context| match Self::get_entry(context) {
                Ok(entry) => entry,
                Err((errors, entry)) => {
                    for err in errors {
                        log::warn!("Failed to read startup preference: {err}");
                    }
                    entry
                }
            })
            .unwrap_or_default()
    }
}

/// Locations of the system resources the panel reads and runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// JSON status object exposing the active keymap
    pub status: PathBuf,
    /// Directory of `<layout>.json` definitions
    pub keymaps: PathBuf,
    /// Read-only resource tree the keymap directory lives in
    pub resources: PathBuf,
    /// Helper program that switches the active layout
    pub helper: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            status: PathBuf::from("/proc/keymap"),
            keymaps: PathBuf::from("/res/keymaps"),
            resources: PathBuf::from("/res"),
            helper: PathBuf::from("/bin/keymap"),
        }
    }
}

impl Paths {
    /// Defaults, with any `KEYBOARD_SETTINGS_*` variable taking precedence.
    pub fn from_env() -> Self {
        Self::with_overrides(|key| env::var_os(key).map(PathBuf::from))
    }

    fn with_overrides(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            status: lookup("KEYBOARD_SETTINGS_STATUS").unwrap_or(defaults.status),
            keymaps: lookup("KEYBOARD_SETTINGS_KEYMAPS").unwrap_or(defaults.keymaps),
            resources: lookup("KEYBOARD_SETTINGS_RESOURCES").unwrap_or(defaults.resources),
            helper: lookup("KEYBOARD_SETTINGS_HELPER").unwrap_or(defaults.helper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_lock_defaults_to_enabled() {
        assert!(StartupEnable::default().num_lock);
        assert!(StartupEnable::load(None).num_lock);
    }

    #[test]
    fn test_paths_override_single_location() {
        let paths = Paths::with_overrides(|key| {
            (key == "KEYBOARD_SETTINGS_HELPER").then(|| PathBuf::from("/usr/bin/keymap"))
        });
        assert_eq!(paths.helper, PathBuf::from("/usr/bin/keymap"));
        assert_eq!(paths.status, Paths::default().status);
        assert_eq!(paths.keymaps, Paths::default().keymaps);
    }
}
