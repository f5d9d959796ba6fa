// SPDX-License-Identifier: MPL-2.0

//! Error types for startup and commit.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that prevent the settings window from being shown.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("sandbox setup failed: {0}")]
    Sandbox(String),

    #[error("cannot read keymap status {}: {source}", .path.display())]
    StatusUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("keymap status is not valid JSON: {0}")]
    StatusMalformed(#[from] serde_json::Error),

    #[error("keymap status is not a JSON object")]
    StatusNotObject,

    #[error("keymap status has no \"keymap\" field")]
    MissingKeymap,

    #[error("keymap status field \"keymap\" is not a string")]
    KeymapNotString,

    #[error("cannot list keymaps in {}: {source}", .path.display())]
    CatalogUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("current keymap {current:?} matches no available layout")]
    NoMatchingLayout { current: String },
}

impl StartupError {
    /// Process exit status reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Sandbox(_) => 1,
            Self::StatusUnreadable { .. }
            | Self::StatusMalformed(_)
            | Self::StatusNotObject
            | Self::MissingKeymap
            | Self::KeymapNotString => 2,
            Self::NoMatchingLayout { .. } => 3,
            Self::CatalogUnreadable { .. } => 4,
        }
    }

    /// Whether the user is told about this failure in a dialog rather than on stderr only.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::CatalogUnreadable { .. })
    }
}

/// Failures while applying the selected layout.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("failed to launch {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}
