// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

mod app;
pub mod cell;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data_source;
pub mod dump;
pub mod grid;
mod keymap;
pub mod lookback;
pub mod metrics;
pub mod org_data;
pub mod render;
mod search;
pub mod tab;
mod theme;
mod tui;
mod util;

pub use app::App;
pub use columns::Columns;
pub use data_source::{Fetcher, SnapshotSource, StatsSource};
pub use dump::Dump;
pub use grid::{Grid, RankedRow, SortDirection, SortState};
pub use keymap::Key;
pub use keymap::KeyMap;
pub use lookback::{LookbackWindow, QueryWindow};
pub use metrics::{MetricKey, Row};
pub use org_data::OrganizationRecord;
pub use tab::{Tab, TabShell, TabView};
pub use theme::AppTheme;
pub use tui::Event;
pub use tui::Tui;
pub use util::read_file_string;

use std::sync::Arc;

pub const APP: &str = "orgtop";
pub const LICENSE: &str = "Copyright (c) Meta Platforms, Inc. and affiliates.

This software may be used and distributed according to the terms of the
GNU General Public License version 2.";

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AppState {
    /// Application is showing the active tab.
    #[default]
    Default,
    /// Application is in the help state.
    Help,
}

/// A completed fetch for one lookback window.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordsLoadedAction {
    pub window: LookbackWindow,
    pub records: Arc<Vec<OrganizationRecord>>,
}

/// A fetch for one lookback window that returned an error.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadFailedAction {
    pub window: LookbackWindow,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Backspace,
    ChangeTheme,
    Down,
    Enter,
    Esc,
    Filter,
    InputEntry(String),
    LoadFailed(LoadFailedAction),
    NextColumn,
    NextLookback,
    NextTab,
    PageDown,
    PageUp,
    PrevColumn,
    PrevLookback,
    PrevTab,
    Quit,
    RecordsLoaded(RecordsLoadedAction),
    Reload,
    Render,
    RequestRecords(LookbackWindow),
    SaveConfig,
    SelectTab(Tab),
    SetState(AppState),
    ToggleLocalization,
    ToggleSort,
    Up,
    None,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::SetState(AppState::Default) => write!(f, "AppStateDefault"),
            Action::SetState(AppState::Help) => write!(f, "AppStateHelp"),
            Action::SelectTab(tab) => write!(f, "SelectTab({})", tab.label()),
            Action::RequestRecords(window) => write!(f, "RequestRecords({})", window.days()),
            Action::RecordsLoaded(_) => write!(f, "RecordsLoaded"),
            Action::LoadFailed(failed) => write!(f, "LoadFailed({})", failed.window.days()),
            Action::InputEntry(_) => write!(f, "InputEntry"),
            _ => write!(f, "{:?}", self),
        }
    }
}
