// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A plain counter as delivered by the upstream provider.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// One bucket of a grouped time series. Buckets may carry a null value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GroupedValue {
    #[serde(default)]
    pub value: Option<f64>,
}

/// A per-bucket (usually daily) breakdown of a statistic.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSeries {
    #[serde(default)]
    pub group_by: Vec<GroupedValue>,
}

impl GroupedSeries {
    /// Bucket values with null buckets replaced by zero.
    pub fn values(&self) -> Vec<f64> {
        self.group_by
            .iter()
            .map(|bucket| bucket.value.filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect()
    }
}

fn count(counter: &Option<Counter>) -> u64 {
    counter
        .as_ref()
        .and_then(|c| c.total_count)
        .unwrap_or_default()
}

fn series(series: &Option<GroupedSeries>) -> Vec<f64> {
    series.as_ref().map(GroupedSeries::values).unwrap_or_default()
}

/// Nested statistics bag of one organization. Any member may be missing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    #[serde(alias = "activitesLast14Days")]
    pub activities_in_window: Option<Counter>,
    pub completed: Option<Counter>,
    pub missed: Option<Counter>,
    pub waiting_to_be_graded: Option<Counter>,
    pub student_users: Option<Counter>,
    pub active_staff_users: Option<Counter>,
    pub current_active_users: Option<GroupedSeries>,
    pub previous_active_users: Option<GroupedSeries>,
    pub positive_impressions: Option<GroupedSeries>,
    pub negative_impressions: Option<GroupedSeries>,
    pub total_impressions: Option<GroupedSeries>,
    pub classrooms: Option<GroupedSeries>,
    pub student_time_on_platform_ms: Option<GroupedSeries>,
    pub student_time_on_platform_previous_ms: Option<GroupedSeries>,
    pub staff_time_on_platform_ms: Option<GroupedSeries>,
    pub staff_time_on_platform_previous_ms: Option<GroupedSeries>,
}

impl Statistics {
    /// Activities scheduled in the lookback window. Shared denominator of every ratio metric.
    pub fn activities_in_window(&self) -> u64 {
        count(&self.activities_in_window)
    }

    pub fn completed(&self) -> u64 {
        count(&self.completed)
    }

    pub fn missed(&self) -> u64 {
        count(&self.missed)
    }

    pub fn waiting_to_be_graded(&self) -> u64 {
        count(&self.waiting_to_be_graded)
    }

    pub fn student_users(&self) -> u64 {
        count(&self.student_users)
    }

    pub fn active_staff_users(&self) -> u64 {
        count(&self.active_staff_users)
    }

    pub fn current_active_users(&self) -> Vec<f64> {
        series(&self.current_active_users)
    }

    pub fn previous_active_users(&self) -> Vec<f64> {
        series(&self.previous_active_users)
    }

    pub fn positive_impressions(&self) -> Vec<f64> {
        series(&self.positive_impressions)
    }

    pub fn negative_impressions(&self) -> Vec<f64> {
        series(&self.negative_impressions)
    }

    pub fn total_impressions(&self) -> Vec<f64> {
        series(&self.total_impressions)
    }

    pub fn classrooms(&self) -> Vec<f64> {
        series(&self.classrooms)
    }

    pub fn student_time_on_platform_ms(&self) -> Vec<f64> {
        series(&self.student_time_on_platform_ms)
    }

    pub fn student_time_on_platform_previous_ms(&self) -> Vec<f64> {
        series(&self.student_time_on_platform_previous_ms)
    }

    pub fn staff_time_on_platform_ms(&self) -> Vec<f64> {
        series(&self.staff_time_on_platform_ms)
    }

    pub fn staff_time_on_platform_previous_ms(&self) -> Vec<f64> {
        series(&self.staff_time_on_platform_previous_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Creator {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Package {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageList {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub nodes: Vec<Package>,
}

/// A child organization of the academy group as delivered upstream.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub active_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Creator>,
    #[serde(default)]
    pub packages: Option<PackageList>,
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

impl OrganizationRecord {
    /// Returns a record with no statistics, packages or creator.
    pub fn new(id: &str, name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            state: String::new(),
            created_at,
            active_at: None,
            created_by: None,
            packages: None,
            statistics: None,
        }
    }

    /// Statistics, or an empty bag when the provider sent none.
    pub fn stats(&self) -> Statistics {
        self.statistics.clone().unwrap_or_default()
    }

    pub fn creator_name(&self) -> Option<&str> {
        self.created_by
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}
