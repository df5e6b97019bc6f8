// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Sort and filter engine shared by every tab.

use crate::columns::Columns;
use crate::metrics::{MetricKey, Row};
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The single active sort. There is no unsorted state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SortState {
    pub key: MetricKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: MetricKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn descending(key: MetricKey) -> Self {
        Self::new(key, SortDirection::Descending)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterState {
    pub query: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }
}

/// A row with its 1-based position in the sorted, filtered order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedRow<'a> {
    pub rank: usize,
    pub row: &'a Row,
}

#[derive(Clone, Debug)]
pub struct Grid {
    sort: SortState,
    filter: FilterState,
}

impl Grid {
    pub fn new(default_sort: SortState) -> Self {
        Self {
            sort: default_sort,
            filter: FilterState::default(),
        }
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Same column flips direction, a new column starts ascending. Returns
    /// false, leaving the sort untouched, for columns without a comparator.
    pub fn toggle_sort(&mut self, columns: &Columns, key: MetricKey) -> bool {
        if !columns.get(key).is_some_and(|c| c.is_sortable()) {
            return false;
        }
        if self.sort.key == key {
            self.sort.direction = self.sort.direction.flip();
        } else {
            self.sort = SortState::new(key, SortDirection::Ascending);
        }
        true
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter.query = query.to_string();
    }

    /// Filtered and sorted rows. Ties fall back to ascending row id.
    pub fn arrange<'a>(&self, rows: &'a [Row], columns: &Columns) -> Vec<RankedRow<'a>> {
        let filter_column = columns.filter_column();
        let mut matched: Vec<&Row> = rows
            .iter()
            .filter(|row| {
                !self.filter.is_active()
                    || filter_column.map_or(true, |c| c.matches(row, &self.filter.query))
            })
            .collect();

        let sort_column = columns.get(self.sort.key);
        matched.sort_by(|a, b| {
            let primary = sort_column
                .and_then(|c| c.compare(a, b))
                .unwrap_or(Ordering::Equal);
            self.sort.direction.apply(primary).then_with(|| a.id.cmp(&b.id))
        });

        matched
            .into_iter()
            .enumerate()
            .map(|(i, row)| RankedRow { rank: i + 1, row })
            .collect()
    }

    /// Rows to render. The self row is dropped after ranking, so ranks of the
    /// remaining rows may skip a number.
    pub fn visible_rows<'a>(
        &self,
        rows: &'a [Row],
        columns: &Columns,
        self_id: Option<&str>,
    ) -> Vec<RankedRow<'a>> {
        self.arrange(rows, columns)
            .into_iter()
            .filter(|ranked| self_id != Some(ranked.row.id.as_str()))
            .collect()
    }
}
