// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::columns::{
    get_activities_columns, get_all_columns, get_general_columns, get_organizations_columns,
    get_users_columns, Columns,
};
use crate::grid::{Grid, RankedRow, SortState};
use crate::metrics::{
    reduce_activities, reduce_all, reduce_general, reduce_organizations, reduce_records,
    reduce_users, MetricKey, MetricReducer, Row,
};
use crate::org_data::OrganizationRecord;
use crate::LookbackWindow;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    General,
    Activities,
    Users,
    Organizations,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::All,
        Tab::General,
        Tab::Activities,
        Tab::Users,
        Tab::Organizations,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::All => "All",
            Tab::General => "General",
            Tab::Activities => "Activities",
            Tab::Users => "Users",
            Tab::Organizations => "Organizations",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Tab::All => "all",
            Tab::General => "general",
            Tab::Activities => "activities",
            Tab::Users => "users",
            Tab::Organizations => "organizations",
        }
    }

    pub(crate) fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    pub fn columns(&self) -> Columns {
        match self {
            Tab::All => get_all_columns(),
            Tab::General => get_general_columns(),
            Tab::Activities => get_activities_columns(),
            Tab::Users => get_users_columns(),
            Tab::Organizations => get_organizations_columns(),
        }
    }

    pub fn reducer(&self) -> MetricReducer {
        match self {
            Tab::All => reduce_all,
            Tab::General => reduce_general,
            Tab::Activities => reduce_activities,
            Tab::Users => reduce_users,
            Tab::Organizations => reduce_organizations,
        }
    }

    /// Initial sort, always descending.
    pub fn default_sort(&self) -> SortState {
        SortState::descending(match self {
            Tab::All | Tab::Users => MetricKey::ActiveStudents,
            Tab::General => MetricKey::Academy,
            Tab::Activities => MetricKey::Scheduled,
            Tab::Organizations => MetricKey::ActiveClassrooms,
        })
    }

    /// General holds no windowed statistics.
    pub fn shows_period_selector(&self) -> bool {
        !matches!(self, Tab::General)
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Tab::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown tab '{s}'"))
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One tab's columns, rows and grid state. Views never share state.
pub struct TabView {
    tab: Tab,
    columns: Columns,
    grid: Grid,
    rows: Vec<Row>,
}

impl TabView {
    pub fn new(tab: Tab) -> Self {
        Self {
            tab,
            columns: tab.columns(),
            grid: Grid::new(tab.default_sort()),
            rows: Vec::new(),
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rebuilds every row from the snapshot.
    pub fn refresh(&mut self, records: &[OrganizationRecord], window: LookbackWindow) {
        self.rows = reduce_records(records, self.tab.reducer(), window);
    }

    pub fn toggle_sort(&mut self, key: MetricKey) -> bool {
        self.grid.toggle_sort(&self.columns, key)
    }

    pub fn visible_rows(&self, self_id: Option<&str>) -> Vec<RankedRow<'_>> {
        self.grid.visible_rows(&self.rows, &self.columns, self_id)
    }
}

/// Called with the new window whenever the selection changes.
pub type LookbackHandler = Box<dyn FnMut(LookbackWindow) + Send>;

/// Owns the tab views, the active tab and the shared lookback window.
pub struct TabShell {
    views: Vec<TabView>,
    active: Tab,
    lookback: LookbackWindow,
    /// Window of the snapshot on screen. Lags `lookback` while a fetch runs.
    applied: LookbackWindow,
    on_change_lookback: LookbackHandler,
    records: Arc<Vec<OrganizationRecord>>,
}

impl TabShell {
    pub fn new(active: Tab, lookback: LookbackWindow, on_change_lookback: LookbackHandler) -> Self {
        Self {
            views: Tab::ALL.into_iter().map(TabView::new).collect(),
            active,
            lookback,
            applied: lookback,
            on_change_lookback,
            records: Arc::new(Vec::new()),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn view(&self, tab: Tab) -> &TabView {
        &self.views[tab.index()]
    }

    pub fn active_view(&self) -> &TabView {
        self.view(self.active)
    }

    pub fn active_view_mut(&mut self) -> &mut TabView {
        &mut self.views[self.active.index()]
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Selected window, the one the next snapshot is fetched for.
    pub fn lookback(&self) -> LookbackWindow {
        self.lookback
    }

    /// Window the displayed rows were fetched for. Captions use this one.
    pub fn applied_lookback(&self) -> LookbackWindow {
        self.applied
    }

    pub fn records(&self) -> &[OrganizationRecord] {
        &self.records
    }

    /// Changes the window and notifies the handler. Returns false when the
    /// window is unchanged.
    pub fn set_lookback(&mut self, window: LookbackWindow) -> bool {
        if window == self.lookback {
            return false;
        }
        self.lookback = window;
        (self.on_change_lookback)(window);
        true
    }

    /// Selects the window of the displayed snapshot again without notifying
    /// the handler. Used when the fetch for the selected window failed.
    pub fn revert_lookback(&mut self) -> bool {
        if self.lookback == self.applied {
            return false;
        }
        self.lookback = self.applied;
        true
    }

    /// Replaces the snapshot with one fetched for `window` and rederives
    /// every view.
    pub fn update_records(
        &mut self,
        window: LookbackWindow,
        records: Arc<Vec<OrganizationRecord>>,
    ) {
        self.applied = window;
        self.records = records;
        for view in self.views.iter_mut() {
            view.refresh(&self.records, window);
        }
    }
}
