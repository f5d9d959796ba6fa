// SPDX-License-Identifier: MPL-2.0

//! Reads the active keymap from the system status resource.
//!
//! The resource holds a small JSON object such as `{"keymap": "en"}`. Only the
//! `keymap` field is used; any other fields are ignored.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::StartupError;

/// Key of the field naming the active layout.
const KEYMAP_FIELD: &str = "keymap";

/// Reads and parses the status resource at `path`.
pub fn read_current_keymap(path: &Path) -> Result<String, StartupError> {
    let contents = fs::read_to_string(path).map_err(|source| StartupError::StatusUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_status(&contents)
}

/// Extracts the `keymap` identifier from a status document.
pub fn parse_status(contents: &str) -> Result<String, StartupError> {
    let value: Value = serde_json::from_str(contents)?;
    let object = value.as_object().ok_or(StartupError::StatusNotObject)?;
    let keymap = object.get(KEYMAP_FIELD).ok_or(StartupError::MissingKeymap)?;
    keymap
        .as_str()
        .map(str::to_owned)
        .ok_or(StartupError::KeymapNotString)
}
