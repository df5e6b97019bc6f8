// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::cli::DumpArgs;
use crate::config::Config;
use crate::render::PlainRenderer;
use crate::{MetricKey, QueryWindow, SortDirection, StatsSource, TabView};

use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Non-interactive rendering of one tab.
pub struct Dump {
    sort: Option<MetricKey>,
    direction: Option<SortDirection>,
    filter: Option<String>,
    localize: bool,
}

impl Dump {
    pub fn from_args(args: &DumpArgs) -> Result<Self> {
        let sort = args.sort.as_deref().map(str::parse).transpose()?;
        let direction = match (args.asc, args.desc) {
            (true, _) => Some(SortDirection::Ascending),
            (_, true) => Some(SortDirection::Descending),
            _ => None,
        };
        Ok(Self {
            sort,
            direction,
            filter: args.filter.clone(),
            localize: args.localize,
        })
    }

    /// Applies the requested sort using the same toggle rules as the TUI.
    fn apply_sort(&self, view: &mut TabView) -> Result<()> {
        let key = self.sort.unwrap_or(view.grid().sort_state().key);
        if key != view.grid().sort_state().key && !view.toggle_sort(key) {
            bail!("column '{key}' cannot be sorted on the {} tab", view.tab().id());
        }
        if let Some(direction) = self.direction {
            if view.grid().sort_state().direction != direction {
                view.toggle_sort(key);
            }
        }
        Ok(())
    }

    /// Fetches the configured window ending on `today` and renders the
    /// configured tab.
    pub fn run(
        &self,
        config: &Config,
        source: &dyn StatsSource,
        today: NaiveDate,
    ) -> Result<String> {
        let window = config.lookback();
        let query = QueryWindow::ending_on(today, window);
        let records = source.fetch(config.organization_id(), &query)?;
        log::debug!("dumping {} organizations", records.len());

        let mut view = TabView::new(config.default_tab());
        view.refresh(&records, window);
        self.apply_sort(&mut view)?;
        if let Some(filter) = &self.filter {
            view.grid_mut().set_filter(filter);
        }
        Ok(PlainRenderer::render(
            &view,
            window,
            config.organization_id(),
            self.localize,
        ))
    }
}
