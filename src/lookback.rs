// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::{anyhow, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of trailing days statistics are aggregated over.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LookbackWindow {
    Week,
    #[default]
    TwoWeeks,
    Month,
    Year,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 4] = [
        LookbackWindow::Week,
        LookbackWindow::TwoWeeks,
        LookbackWindow::Month,
        LookbackWindow::Year,
    ];

    pub fn days(&self) -> u32 {
        match self {
            LookbackWindow::Week => 7,
            LookbackWindow::TwoWeeks => 14,
            LookbackWindow::Month => 30,
            LookbackWindow::Year => 365,
        }
    }

    /// Selector label.
    pub fn label(&self) -> &'static str {
        match self {
            LookbackWindow::Week => "7 days",
            LookbackWindow::TwoWeeks => "14 days",
            LookbackWindow::Month => "1 month",
            LookbackWindow::Year => "1 year",
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.days() == days)
    }

    /// Returns the next option, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            LookbackWindow::Week => LookbackWindow::TwoWeeks,
            LookbackWindow::TwoWeeks => LookbackWindow::Month,
            LookbackWindow::Month => LookbackWindow::Year,
            LookbackWindow::Year => LookbackWindow::Week,
        }
    }

    /// Returns the previous option, wrapping around.
    pub fn prev(&self) -> Self {
        match self {
            LookbackWindow::Week => LookbackWindow::Year,
            LookbackWindow::TwoWeeks => LookbackWindow::Week,
            LookbackWindow::Month => LookbackWindow::TwoWeeks,
            LookbackWindow::Year => LookbackWindow::Month,
        }
    }
}

impl TryFrom<u32> for LookbackWindow {
    type Error = anyhow::Error;

    fn try_from(days: u32) -> Result<Self> {
        Self::from_days(days).ok_or_else(|| {
            anyhow!("unsupported lookback window {days} days, expected one of 7, 14, 30 or 365")
        })
    }
}

impl From<LookbackWindow> for u32 {
    fn from(window: LookbackWindow) -> u32 {
        window.days()
    }
}

impl std::fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// Date boundaries sent to the upstream provider for one window.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct QueryWindow {
    pub window: LookbackWindow,
    pub current_start: NaiveDate,
    pub current_end: NaiveDate,
    pub previous_start: NaiveDate,
    pub previous_end: NaiveDate,
}

impl QueryWindow {
    /// The current window ends today; the previous one has the same length and ends where the
    /// current one starts.
    pub fn ending_on(today: NaiveDate, window: LookbackWindow) -> Self {
        let days = Days::new(window.days() as u64);
        let current_start = today.checked_sub_days(days).unwrap_or(NaiveDate::MIN);
        let previous_start = current_start
            .checked_sub_days(days)
            .unwrap_or(NaiveDate::MIN);
        Self {
            window,
            current_start,
            current_end: today,
            previous_start,
            previous_end: current_start,
        }
    }

    pub fn ending_today(window: LookbackWindow) -> Self {
        Self::ending_on(chrono::Local::now().date_naive(), window)
    }
}
