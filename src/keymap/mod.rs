// SPDX-License-Identifier: MPL-2.0

//! Startup state: the active keymap and the layouts to choose from.

pub mod catalog;
pub mod status;

pub use catalog::LayoutCatalog;

use crate::config::Paths;
use crate::error::StartupError;

/// Everything the settings window needs from the system at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    pub catalog: LayoutCatalog,
    /// Catalog position of the active keymap
    pub selected: usize,
}

/// Reads the status resource, lists the layouts, and locates the active one.
///
/// A status failure is checked before the directory is listed, and a missing
/// match only after the listing succeeded.
pub fn load_initial_state(paths: &Paths) -> Result<InitialState, StartupError> {
    let current = status::read_current_keymap(&paths.status)?;
    log::info!("Current keymap is {current}");

    let catalog = LayoutCatalog::from_dir(&paths.keymaps)?;
    log::debug!("Found {} keymaps in {}", catalog.len(), paths.keymaps.display());

    resolve(catalog, &current)
}

fn resolve(catalog: LayoutCatalog, current: &str) -> Result<InitialState, StartupError> {
    let selected = catalog
        .position_of(current)
        .ok_or_else(|| StartupError::NoMatchingLayout {
            current: current.to_owned(),
        })?;
    Ok(InitialState { catalog, selected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn system(root: &Path, status: &str, layouts: &[&str]) -> Paths {
        let keymaps = root.join("keymaps");
        fs::create_dir(&keymaps).unwrap();
        for layout in layouts {
            fs::write(keymaps.join(format!("{layout}.json")), "{}").unwrap();
        }
        let status_path = root.join("keymap");
        fs::write(&status_path, status).unwrap();

        Paths {
            status: status_path,
            keymaps,
            resources: root.to_path_buf(),
            helper: root.join("keymap-helper"),
        }
    }

    #[test]
    fn test_selects_active_layout() {
        let root = tempfile::tempdir().unwrap();
        let paths = system(root.path(), r#"{"keymap": "EN"}"#, &["fr", "de", "en"]);

        let state = load_initial_state(&paths).unwrap();
        assert_eq!(state.catalog.layouts(), ["de", "en", "fr"]);
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn test_no_match_aborts() {
        let root = tempfile::tempdir().unwrap();
        let paths = system(root.path(), r#"{"keymap": "xx"}"#, &["de", "en", "fr"]);

        let err = load_initial_state(&paths).unwrap_err();
        assert!(matches!(err, StartupError::NoMatchingLayout { ref current } if current == "xx"));
        assert!(!err.is_user_facing());
    }

    #[test]
    fn test_status_checked_before_listing() {
        let root = tempfile::tempdir().unwrap();
        let mut paths = system(root.path(), "not json", &["en"]);
        paths.keymaps = root.path().join("missing");

        let err = load_initial_state(&paths).unwrap_err();
        assert!(matches!(err, StartupError::StatusMalformed(_)));
    }

    #[test]
    fn test_listing_failure_reported_before_match() {
        let root = tempfile::tempdir().unwrap();
        let mut paths = system(root.path(), r#"{"keymap": "xx"}"#, &[]);
        paths.keymaps = root.path().join("missing");

        let err = load_initial_state(&paths).unwrap_err();
        assert!(matches!(err, StartupError::CatalogUnreadable { .. }));
    }
}
