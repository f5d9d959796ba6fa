// SPDX-License-Identifier: MPL-2.0

//! Applying the user's choices.
//!
//! A commit launches the layout helper with the selected identifier and then
//! stores the Num Lock preference. Both effects are fire-and-forget: the
//! helper's exit status is never observed and nothing is read back.

use std::path::{Path, PathBuf};
use std::process::Command;

use cosmic::cosmic_config::{self, CosmicConfigEntry};

use crate::config::StartupEnable;
use crate::error::CommitError;
use crate::keymap::InitialState;

// ============================================================================
// External collaborators
// ============================================================================

/// Starts the helper that switches the active layout.
pub trait ProcessLauncher {
    /// Starts `program` with `layout` as its only argument without waiting on it.
    fn launch(&mut self, program: &Path, layout: &str) -> Result<(), CommitError>;
}

/// Spawns real processes, inheriting the environment.
#[derive(Debug, Default)]
pub struct SpawnLauncher;

impl ProcessLauncher for SpawnLauncher {
    fn launch(&mut self, program: &Path, layout: &str) -> Result<(), CommitError> {
        let child = Command::new(program)
            .arg(layout)
            .spawn()
            .map_err(|source| CommitError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;
        log::info!("Launched {} {layout} (pid {})", program.display(), child.id());
        Ok(())
    }
}

/// Where the Num Lock preference is written.
pub trait PreferenceStore {
    fn write_num_lock(&mut self, enabled: bool) -> Result<(), cosmic_config::Error>;
}

/// The `StartupEnable` category in cosmic-config.
pub struct CosmicPreferences {
    handler: Option<cosmic_config::Config>,
    entry: StartupEnable,
}

impl CosmicPreferences {
    pub fn open(app_id: &str) -> Self {
        let handler = match StartupEnable::handler(app_id) {
            Ok(handler) => Some(handler),
            Err(err) => {
                log::warn!("Preferences unavailable, using defaults: {err}");
                None
            }
        };
        let entry = StartupEnable::load(handler.as_ref());
        Self { handler, entry }
    }

    pub fn num_lock(&self) -> bool {
        self.entry.num_lock
    }
}

impl PreferenceStore for CosmicPreferences {
    fn write_num_lock(&mut self, enabled: bool) -> Result<(), cosmic_config::Error> {
        self.entry.num_lock = enabled;
        match self.handler {
            Some(ref handler) => self.entry.write_entry(handler),
            None => {
                log::warn!("Preferences unavailable, Num Lock setting not saved");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Panel state
// ============================================================================

/// Buttons and menu entries that end or commit an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Apply, then close
    Confirm,
    /// Close without applying
    Cancel,
    /// Apply and stay open
    Apply,
}

/// What the window should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    StayOpen,
    Close,
    /// Nothing was applied; the user must pick a layout first
    SelectionRequired,
}

/// Editable state of the settings panel.
#[derive(Debug, Clone)]
pub struct Panel {
    layouts: Vec<String>,
    selected: Option<usize>,
    num_lock: bool,
    helper: PathBuf,
}

impl Panel {
    pub fn new(initial: InitialState, num_lock: bool, helper: PathBuf) -> Self {
        Self {
            layouts: initial.catalog.layouts().to_vec(),
            selected: Some(initial.selected),
            num_lock,
            helper,
        }
    }

    pub fn layouts(&self) -> &[String] {
        &self.layouts
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Selects a catalog entry; indices outside the catalog are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.layouts.len() {
            self.selected = Some(index);
        }
    }

    pub fn num_lock(&self) -> bool {
        self.num_lock
    }

    pub fn set_num_lock(&mut self, enabled: bool) {
        self.num_lock = enabled;
    }

    /// Text currently shown in the layout dropdown.
    pub fn selection_text(&self) -> &str {
        self.selected
            .and_then(|index| self.layouts.get(index))
            .map_or("", String::as_str)
    }

    /// Runs `action` against the external collaborators.
    ///
    /// An empty selection aborts before either effect. A launch failure is
    /// returned before the preference is written.
    pub fn perform(
        &self,
        action: PanelAction,
        launcher: &mut impl ProcessLauncher,
        store: &mut impl PreferenceStore,
    ) -> Result<ActionOutcome, CommitError> {
        if action == PanelAction::Cancel {
            return Ok(ActionOutcome::Close);
        }

        let layout = self.selection_text();
        if layout.is_empty() {
            log::warn!("Commit rejected, no layout selected");
            return Ok(ActionOutcome::SelectionRequired);
        }

        launcher.launch(&self.helper, layout)?;

        if let Err(err) = store.write_num_lock(self.num_lock) {
            log::error!("Failed to save Num Lock setting: {err}");
        } else {
            log::debug!("Saved Num Lock on login = {}", self.num_lock);
        }

        Ok(match action {
            PanelAction::Confirm => ActionOutcome::Close,
            _ => ActionOutcome::StayOpen,
        })
    }
}
