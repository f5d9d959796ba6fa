// SPDX-License-Identifier: MPL-2.0

//! Keyboard Settings
//!
//! Lets the user pick the active keyboard layout from the installed layout
//! definitions and choose whether Num Lock is turned on at login.
//!
//! # Startup
//!
//! 1. Logging starts and privileges are locked (first sandbox step).
//! 2. Localisation is initialised.
//! 3. The filesystem is confined to the resources the panel needs.
//! 4. The active keymap and the layout catalog are read. Failures here end the
//!    process before any window appears, except an unreadable layout
//!    directory, which is reported in a dialog.
//! 5. The settings window runs until OK, Cancel, or Quit.

mod commit;
mod config;
mod error;
mod i18n;
mod keymap;
mod sandbox;
mod settings;

use std::process::ExitCode;

use config::Paths;
use settings::{SettingsApp, Startup};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = sandbox::lock_privileges() {
        log::error!("{err}");
        return ExitCode::from(err.exit_code());
    }

    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let paths = Paths::from_env();
    if let Err(err) = sandbox::confine_filesystem(&sandbox::Policy::for_paths(&paths)) {
        log::error!("{err}");
        return ExitCode::from(err.exit_code());
    }

    let (startup, exit_code) = match keymap::load_initial_state(&paths) {
        Ok(initial) => (Startup::Ready { initial, paths }, ExitCode::SUCCESS),
        Err(err) if err.is_user_facing() => {
            log::error!("{err}");
            let code = ExitCode::from(err.exit_code());
            (Startup::CatalogUnreadable(err.to_string()), code)
        }
        Err(err) => {
            log::error!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    match cosmic::app::run::<SettingsApp>(settings::window_settings(), startup) {
        Ok(()) => exit_code,
        Err(err) => {
            log::error!("Settings window failed: {err}");
            ExitCode::FAILURE
        }
    }
}
