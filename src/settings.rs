// SPDX-License-Identifier: MPL-2.0

//! Keyboard settings window
//!
//! A single "Keyboard" tab with the layout dropdown and the Num Lock checkbox,
//! OK / Cancel / Apply buttons, and a File / Help menu bar in the header.
//! Startup data is read before the window exists and handed in as [`Startup`].

use std::collections::HashMap;

use crate::commit::{
    ActionOutcome, CosmicPreferences, Panel, PanelAction, PreferenceStore, ProcessLauncher,
    SpawnLauncher,
};
use crate::config::Paths;
use crate::error::CommitError;
use crate::fl;
use crate::keymap::InitialState;
use cosmic::iced::Length;
use cosmic::prelude::*;
use cosmic::widget::{self, menu, segmented_button};
use cosmic::{app, Application, Element};

/// What `main` learned before the window was created.
#[derive(Debug, Clone)]
pub enum Startup {
    /// Status and catalog were read; show the panel.
    Ready { initial: InitialState, paths: Paths },
    /// The layout directory could not be listed; report and quit.
    CatalogUnreadable(String),
}

/// Modal dialogs shown over the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogPage {
    SelectionRequired,
    CatalogUnreadable(String),
    About,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Quit,
    About,
}

impl menu::action::MenuAction for MenuAction {
    type Message = Message;

    fn message(&self) -> Message {
        match self {
            MenuAction::Quit => Message::Quit,
            MenuAction::About => Message::About,
        }
    }
}

/// What the runtime must do once a message has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Close the window and end the event loop
    Quit,
}

/// Panel and dialog state, kept apart from the COSMIC runtime.
#[derive(Debug)]
pub struct WindowState {
    /// Layout and Num Lock choices; absent when startup failed.
    panel: Option<Panel>,
    dialog: Option<DialogPage>,
}

impl WindowState {
    pub fn new(startup: Startup, num_lock: bool) -> Self {
        match startup {
            Startup::Ready { initial, paths } => Self {
                panel: Some(Panel::new(initial, num_lock, paths.helper)),
                dialog: None,
            },
            Startup::CatalogUnreadable(error) => Self {
                panel: None,
                dialog: Some(DialogPage::CatalogUnreadable(error)),
            },
        }
    }

    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    pub fn dialog(&self) -> Option<&DialogPage> {
        self.dialog.as_ref()
    }

    /// Applies `message`. A helper launch failure is returned as is.
    pub fn handle(
        &mut self,
        message: Message,
        launcher: &mut impl ProcessLauncher,
        store: &mut impl PreferenceStore,
    ) -> Result<Effect, CommitError> {
        match message {
            Message::SelectLayout(index) => {
                if let Some(ref mut panel) = self.panel {
                    panel.select(index);
                }
            }
            Message::ToggleNumLock(enabled) => {
                if let Some(ref mut panel) = self.panel {
                    panel.set_num_lock(enabled);
                }
            }
            Message::Perform(action) => {
                let Some(ref panel) = self.panel else {
                    return Ok(Effect::None);
                };
                match panel.perform(action, launcher, store)? {
                    ActionOutcome::StayOpen => {}
                    ActionOutcome::Close => return Ok(Effect::Quit),
                    ActionOutcome::SelectionRequired => {
                        self.dialog = Some(DialogPage::SelectionRequired);
                    }
                }
            }
            Message::DialogDismissed => {
                if let Some(DialogPage::CatalogUnreadable(_)) = self.dialog.take() {
                    return Ok(Effect::Quit);
                }
            }
            Message::About => {
                self.dialog = Some(DialogPage::About);
            }
            Message::Quit | Message::CloseRequested => return Ok(Effect::Quit),
            Message::TabActivated(_) => {}
        }
        Ok(Effect::None)
    }
}

/// The settings model
pub struct SettingsApp {
    /// Application state which is managed by the COSMIC runtime.
    core: cosmic::app::Core,
    state: WindowState,
    /// Stored Num Lock preference.
    preferences: CosmicPreferences,
    /// Starts the layout helper.
    launcher: SpawnLauncher,
    /// Single "Keyboard" tab.
    tabs: segmented_button::SingleSelectModel,
    key_binds: HashMap<menu::KeyBind, MenuAction>,
}

/// Messages emitted by the settings app
#[derive(Debug, Clone)]
pub enum Message {
    SelectLayout(usize),
    ToggleNumLock(bool),
    Perform(PanelAction),
    TabActivated(segmented_button::Entity),
    DialogDismissed,
    About,
    Quit,
    CloseRequested,
}

impl SettingsApp {
    /// Closes the window, which ends the event loop.
    fn quit() -> Task<cosmic::Action<Message>> {
        cosmic::iced::window::get_latest().and_then(|id| cosmic::iced::window::close(id))
    }

    fn keyboard_tab(panel: &Panel) -> Element<'_, Message> {
        widget::column()
            .spacing(12)
            .push(widget::settings::item(
                fl!("character-map-file"),
                widget::dropdown(panel.layouts(), panel.selected(), Message::SelectLayout),
            ))
            .push(
                widget::checkbox(fl!("num-lock-on-login"), panel.num_lock())
                    .on_toggle(Message::ToggleNumLock),
            )
            .into()
    }

    fn buttons<'a>() -> Element<'a, Message> {
        widget::row()
            .spacing(8)
            .push(widget::column().width(Length::Fill))
            .push(
                widget::button::suggested(fl!("ok"))
                    .on_press(Message::Perform(PanelAction::Confirm)),
            )
            .push(
                widget::button::standard(fl!("cancel"))
                    .on_press(Message::Perform(PanelAction::Cancel)),
            )
            .push(
                widget::button::standard(fl!("apply"))
                    .on_press(Message::Perform(PanelAction::Apply)),
            )
            .into()
    }
}

/// Create a COSMIC application from the settings model
impl Application for SettingsApp {
    type Executor = cosmic::executor::Default;

    type Flags = Startup;

    type Message = Message;

    const APP_ID: &'static str = "com.github.keyboardsettings.KeyboardSettings";

    fn core(&self) -> &cosmic::app::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::app::Core {
        &mut self.core
    }

    fn on_close_requested(&self, _id: cosmic::iced::window::Id) -> Option<Message> {
        Some(Message::CloseRequested)
    }

    fn init(core: cosmic::app::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Message>>) {
        let preferences = CosmicPreferences::open(Self::APP_ID);

        let state = WindowState::new(flags, preferences.num_lock());

        let tabs = segmented_button::SingleSelectModel::builder()
            .insert(|b| b.text(fl!("keyboard-tab")).activate())
            .build();

        let mut app = SettingsApp {
            core,
            state,
            preferences,
            launcher: SpawnLauncher,
            tabs,
            key_binds: HashMap::new(),
        };

        let title = fl!("app-title");
        app.set_header_title(title.clone());
        let task = match app.core.main_window_id() {
            Some(id) => app.set_window_title(title, id),
            None => Task::none(),
        };

        (app, task)
    }

    fn header_start(&self) -> Vec<Element<'_, Message>> {
        if self.state.panel().is_none() {
            return Vec::new();
        }

        let bar = menu::bar(vec![
            menu::Tree::with_children(
                Element::from(menu::root(fl!("file"))),
                menu::items(
                    &self.key_binds,
                    vec![menu::Item::Button(fl!("quit"), None, MenuAction::Quit)],
                ),
            ),
            menu::Tree::with_children(
                Element::from(menu::root(fl!("help"))),
                menu::items(
                    &self.key_binds,
                    vec![menu::Item::Button(fl!("about"), None, MenuAction::About)],
                ),
            ),
        ]);

        vec![bar.into()]
    }

    fn dialog(&self) -> Option<Element<'_, Message>> {
        let page = self.state.dialog()?;

        let (title, body) = match page {
            DialogPage::SelectionRequired => (fl!("error-title"), fl!("select-mapping-file")),
            DialogPage::CatalogUnreadable(error) => (
                fl!("error-title"),
                fl!("mapping-list-error", error = error.as_str()),
            ),
            DialogPage::About => (
                fl!("about-title"),
                fl!("about-body", version = env!("CARGO_PKG_VERSION")),
            ),
        };

        let dialog = widget::dialog()
            .title(title)
            .body(body)
            .primary_action(widget::button::suggested(fl!("ok")).on_press(Message::DialogDismissed));

        Some(dialog.into())
    }

    fn view(&self) -> Element<'_, Message> {
        // Startup failed: only the error dialog is shown.
        let Some(panel) = self.state.panel() else {
            return widget::container(widget::column())
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        };

        let content = widget::column()
            .spacing(12)
            .padding(4)
            .push(widget::tab_bar::horizontal(&self.tabs).on_activate(Message::TabActivated))
            .push(
                widget::container(Self::keyboard_tab(panel))
                    .padding(12)
                    .height(Length::Fill),
            )
            .push(Self::buttons());

        widget::container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        if let Message::TabActivated(entity) = message {
            self.tabs.activate(entity);
            return Task::none();
        }

        match self
            .state
            .handle(message, &mut self.launcher, &mut self.preferences)
        {
            Ok(Effect::None) => Task::none(),
            Ok(Effect::Quit) => Self::quit(),
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        }
    }
}

/// Window settings: fixed 400x480, no resizing.
pub fn window_settings() -> app::Settings {
    let limits = cosmic::iced::Limits::NONE
        .min_width(400.0)
        .max_width(400.0)
        .min_height(480.0)
        .max_height(480.0);

    app::Settings::default()
        .size(cosmic::iced::Size::new(400.0, 480.0))
        .size_limits(limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::testing::{MemoryStore, RecordingLauncher};
    use crate::keymap::LayoutCatalog;
    use std::path::PathBuf;

    fn ready(layouts: &[&str], selected: usize) -> WindowState {
        let catalog = LayoutCatalog::from_names(layouts.iter().map(|l| format!("{l}.json")));
        let paths = Paths {
            helper: PathBuf::from("/bin/keymap"),
            ..Paths::default()
        };
        WindowState::new(
            Startup::Ready {
                initial: InitialState { catalog, selected },
                paths,
            },
            true,
        )
    }

    fn send(state: &mut WindowState, message: Message) -> (Effect, RecordingLauncher, MemoryStore) {
        let mut launcher = RecordingLauncher::default();
        let mut store = MemoryStore::default();
        let effect = state.handle(message, &mut launcher, &mut store).unwrap();
        (effect, launcher, store)
    }

    #[test]
    fn test_catalog_failure_shows_only_dialog() {
        let mut state = WindowState::new(Startup::CatalogUnreadable("denied".into()), true);
        assert!(state.panel().is_none());
        assert_eq!(
            state.dialog(),
            Some(&DialogPage::CatalogUnreadable("denied".into()))
        );

        let (effect, launcher, store) = send(&mut state, Message::Perform(PanelAction::Apply));
        assert_eq!(effect, Effect::None);
        assert!(launcher.launched.is_empty());
        assert!(store.writes.is_empty());
    }

    #[test]
    fn test_dismissing_catalog_error_quits() {
        let mut state = WindowState::new(Startup::CatalogUnreadable("denied".into()), true);
        let (effect, ..) = send(&mut state, Message::DialogDismissed);
        assert_eq!(effect, Effect::Quit);
        assert!(state.dialog().is_none());
    }

    #[test]
    fn test_empty_selection_opens_dialog_and_stays() {
        let mut state = ready(&["", "de"], 0);

        let (effect, launcher, store) = send(&mut state, Message::Perform(PanelAction::Confirm));
        assert_eq!(effect, Effect::None);
        assert_eq!(state.dialog(), Some(&DialogPage::SelectionRequired));
        assert!(launcher.launched.is_empty());
        assert!(store.writes.is_empty());

        let (effect, ..) = send(&mut state, Message::DialogDismissed);
        assert_eq!(effect, Effect::None);
        assert!(state.dialog().is_none());
    }

    #[test]
    fn test_about_dismissal_keeps_window() {
        let mut state = ready(&["de", "en"], 1);
        send(&mut state, Message::About);
        assert_eq!(state.dialog(), Some(&DialogPage::About));

        let (effect, ..) = send(&mut state, Message::DialogDismissed);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_quit_and_close_skip_commit() {
        for message in [Message::Quit, Message::CloseRequested] {
            let mut state = ready(&["de", "en"], 0);
            let (effect, launcher, store) = send(&mut state, message);
            assert_eq!(effect, Effect::Quit);
            assert!(launcher.launched.is_empty());
            assert!(store.writes.is_empty());
        }
    }

    #[test]
    fn test_apply_stays_and_confirm_quits() {
        let mut state = ready(&["de", "en", "fr"], 1);
        send(&mut state, Message::SelectLayout(0));
        send(&mut state, Message::ToggleNumLock(false));

        let (effect, launcher, store) = send(&mut state, Message::Perform(PanelAction::Apply));
        assert_eq!(effect, Effect::None);
        assert_eq!(launcher.launched[0].1, "de");
        assert_eq!(store.writes, [false]);

        let (effect, launcher, _) = send(&mut state, Message::Perform(PanelAction::Confirm));
        assert_eq!(effect, Effect::Quit);
        assert_eq!(launcher.launched.len(), 1);
    }

    #[test]
    fn test_launch_failure_is_returned() {
        let mut state = ready(&["de"], 0);
        let mut launcher = RecordingLauncher {
            fail: true,
            ..Default::default()
        };
        let mut store = MemoryStore::default();

        let result = state.handle(Message::Perform(PanelAction::Apply), &mut launcher, &mut store);
        assert!(matches!(result, Err(CommitError::Spawn { .. })));
        assert!(store.writes.is_empty());
    }
}
