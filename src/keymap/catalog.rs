// SPDX-License-Identifier: MPL-2.0

//! Catalog of the keyboard layouts installed on the system.

use std::fs;
use std::path::Path;

use crate::error::StartupError;

/// File suffix of layout definitions.
const LAYOUT_SUFFIX: &str = ".json";

/// Sorted list of layout identifiers, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutCatalog {
    layouts: Vec<String>,
}

impl LayoutCatalog {
    /// Lists `dir` and builds the catalog from its entry names.
    ///
    /// Only names are used; the layout files themselves are never opened.
    /// Names that are not valid UTF-8 cannot be passed on to the helper
    /// unchanged, so they are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self, StartupError> {
        let unreadable = |source| StartupError::CatalogUnreadable {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => log::warn!("Skipping keymap with non UTF-8 name {name:?}"),
            }
        }

        Ok(Self::from_names(names))
    }

    /// Builds a catalog from raw file names, stripping the `.json` suffix.
    ///
    /// Duplicates are kept as they come.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut layouts: Vec<String> = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                name.strip_suffix(LAYOUT_SUFFIX).unwrap_or(name).to_owned()
            })
            .collect();
        layouts.sort();
        Self { layouts }
    }

    /// Position of `current`, ignoring ASCII case.
    ///
    /// If several entries match, the last one wins.
    pub fn position_of(&self, current: &str) -> Option<usize> {
        self.layouts
            .iter()
            .rposition(|layout| layout.eq_ignore_ascii_case(current))
    }

    pub fn layouts(&self) -> &[String] {
        &self.layouts
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_stripped_and_sorted() {
        let catalog = LayoutCatalog::from_names(["fr.json", "en.json", "de.json", "en-dvorak.json"]);
        assert_eq!(catalog.layouts(), ["de", "en", "en-dvorak", "fr"]);
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let catalog = LayoutCatalog::from_names(["de.json", "Fr.json", "en.json"]);
        assert_eq!(catalog.layouts(), ["Fr", "de", "en"]);
    }

    #[test]
    fn test_match_ignores_case() {
        let catalog = LayoutCatalog::from_names(["de.json", "en.json", "fr.json"]);
        assert_eq!(catalog.position_of("en"), Some(1));
        assert_eq!(catalog.position_of("EN"), Some(1));
        assert_eq!(catalog.position_of("xx"), None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let catalog = LayoutCatalog::from_names(["en.json", "en", "de.json"]);
        assert_eq!(catalog.layouts(), ["de", "en", "en"]);
        assert_eq!(catalog.position_of("en"), Some(2));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tr.json", "de.json", "en.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let catalog = LayoutCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.layouts(), ["de", "en", "tr"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en.json"), "{}").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"d\xffe.json")), "{}").unwrap();

        let catalog = LayoutCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.layouts(), ["en"]);
    }

    #[test]
    fn test_missing_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = LayoutCatalog::from_dir(&dir.path().join("keymaps")).unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(err.exit_code(), 4);
    }
}
