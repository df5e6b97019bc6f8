// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Metric reducers: one organization record in, one flat row out.

use crate::cell::{
    CellValue, Impressions, PackagesSummary, Persona, Ratio, Scalar, Trend, TrendUnit,
};
use crate::org_data::{OrganizationRecord, Statistics};
use crate::util::MS_PER_MINUTE;
use crate::LookbackWindow;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Field keys shared by rows and column descriptors.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MetricKey {
    Academy,
    Status,
    Missed,
    Completed,
    WaitingForGrading,
    Scheduled,
    Impressions,
    ActiveStudents,
    ActiveStaff,
    StudentTime,
    StaffTime,
    ActiveClassrooms,
    LastActivity,
    Created,
    CreatedBy,
    Packages,
}

impl MetricKey {
    pub const ALL: [MetricKey; 16] = [
        MetricKey::Academy,
        MetricKey::Status,
        MetricKey::Missed,
        MetricKey::Completed,
        MetricKey::WaitingForGrading,
        MetricKey::Scheduled,
        MetricKey::Impressions,
        MetricKey::ActiveStudents,
        MetricKey::ActiveStaff,
        MetricKey::StudentTime,
        MetricKey::StaffTime,
        MetricKey::ActiveClassrooms,
        MetricKey::LastActivity,
        MetricKey::Created,
        MetricKey::CreatedBy,
        MetricKey::Packages,
    ];

    /// Stable identifier used on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            MetricKey::Academy => "academy",
            MetricKey::Status => "status",
            MetricKey::Missed => "missed",
            MetricKey::Completed => "completed",
            MetricKey::WaitingForGrading => "waiting",
            MetricKey::Scheduled => "scheduled",
            MetricKey::Impressions => "impressions",
            MetricKey::ActiveStudents => "students",
            MetricKey::ActiveStaff => "staff",
            MetricKey::StudentTime => "student-time",
            MetricKey::StaffTime => "staff-time",
            MetricKey::ActiveClassrooms => "classrooms",
            MetricKey::LastActivity => "last-activity",
            MetricKey::Created => "created",
            MetricKey::CreatedBy => "created-by",
            MetricKey::Packages => "packages",
        }
    }
}

impl FromStr for MetricKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        MetricKey::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown column '{s}'"))
    }
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Flat per-organization view consumed by the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub id: String,
    pub name: String,
    cells: BTreeMap<MetricKey, CellValue>,
}

impl Row {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: MetricKey, value: CellValue) -> Self {
        self.cells.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: MetricKey, value: CellValue) {
        self.cells.insert(key, value);
    }

    pub fn get(&self, key: MetricKey) -> Option<&CellValue> {
        self.cells.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MetricKey> {
        self.cells.keys()
    }
}

/// Builds one tab's row from a record.
pub type MetricReducer = fn(&OrganizationRecord, LookbackWindow) -> Row;

fn ms_to_minutes(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(|ms| ms / MS_PER_MINUTE).collect()
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn identity(row: &mut Row, record: &OrganizationRecord) {
    row.insert(MetricKey::Academy, CellValue::Persona(Persona::named(&record.name)));
}

fn general(row: &mut Row, record: &OrganizationRecord) {
    identity(row, record);
    row.insert(MetricKey::Status, CellValue::text(&record.state));
}

/// Every ratio cell of a row is built from the same window total.
fn activities(row: &mut Row, stats: &Statistics) {
    let window_total = stats.activities_in_window();
    let ratio = |count| CellValue::Ratio(Ratio::new(count, window_total));

    row.insert(MetricKey::Missed, ratio(stats.missed()));
    row.insert(MetricKey::Completed, ratio(stats.completed()));
    row.insert(
        MetricKey::WaitingForGrading,
        ratio(stats.waiting_to_be_graded()),
    );
    row.insert(MetricKey::Scheduled, CellValue::count(window_total));
    row.insert(
        MetricKey::Impressions,
        CellValue::Impressions(Impressions {
            positive: sum(&stats.positive_impressions()),
            negative: sum(&stats.negative_impressions()),
            total: sum(&stats.total_impressions()),
        }),
    );
}

fn users(row: &mut Row, stats: &Statistics) {
    row.insert(
        MetricKey::ActiveStudents,
        CellValue::Trend(
            Trend::new(
                stats.current_active_users(),
                stats.previous_active_users(),
                TrendUnit::Users,
            )
            .out_of(stats.student_users()),
        ),
    );
    // Upstream only exposes the active staff counter, so it doubles as the total.
    let staff = stats.active_staff_users();
    row.insert(
        MetricKey::ActiveStaff,
        CellValue::Scalar(Scalar::Fraction {
            count: staff,
            total: staff,
        }),
    );
    row.insert(
        MetricKey::StudentTime,
        CellValue::Trend(Trend::new(
            ms_to_minutes(stats.student_time_on_platform_ms()),
            ms_to_minutes(stats.student_time_on_platform_previous_ms()),
            TrendUnit::Minutes,
        )),
    );
    row.insert(
        MetricKey::StaffTime,
        CellValue::Trend(Trend::new(
            ms_to_minutes(stats.staff_time_on_platform_ms()),
            ms_to_minutes(stats.staff_time_on_platform_previous_ms()),
            TrendUnit::Minutes,
        )),
    );
}

fn organizations(row: &mut Row, record: &OrganizationRecord, stats: &Statistics) {
    row.insert(
        MetricKey::ActiveClassrooms,
        CellValue::count(sum(&stats.classrooms()).max(0.0) as u64),
    );
    row.insert(
        MetricKey::LastActivity,
        CellValue::Scalar(Scalar::Timestamp(record.active_at)),
    );
    row.insert(
        MetricKey::Created,
        CellValue::Scalar(Scalar::Date(record.created_at)),
    );
    row.insert(
        MetricKey::CreatedBy,
        CellValue::Persona(Persona {
            name: record.creator_name().map(str::to_string),
        }),
    );
    row.insert(
        MetricKey::Packages,
        CellValue::Packages(PackagesSummary {
            count: record.packages.as_ref().and_then(|p| p.total_count),
            names: record
                .packages
                .as_ref()
                .map(|p| p.nodes.iter().map(|n| n.name.clone()).collect())
                .unwrap_or_default(),
        }),
    );
}

/// The window only shapes the upstream query, rows carry no window-dependent values.
pub fn reduce_general(record: &OrganizationRecord, _window: LookbackWindow) -> Row {
    let mut row = Row::new(&record.id, &record.name);
    general(&mut row, record);
    row
}

pub fn reduce_activities(record: &OrganizationRecord, _window: LookbackWindow) -> Row {
    let mut row = Row::new(&record.id, &record.name);
    identity(&mut row, record);
    activities(&mut row, &record.stats());
    row
}

pub fn reduce_users(record: &OrganizationRecord, _window: LookbackWindow) -> Row {
    let mut row = Row::new(&record.id, &record.name);
    identity(&mut row, record);
    users(&mut row, &record.stats());
    row
}

pub fn reduce_organizations(record: &OrganizationRecord, _window: LookbackWindow) -> Row {
    let mut row = Row::new(&record.id, &record.name);
    identity(&mut row, record);
    organizations(&mut row, record, &record.stats());
    row
}

pub fn reduce_all(record: &OrganizationRecord, _window: LookbackWindow) -> Row {
    let stats = record.stats();
    let mut row = Row::new(&record.id, &record.name);
    general(&mut row, record);
    activities(&mut row, &stats);
    users(&mut row, &stats);
    organizations(&mut row, record, &stats);
    row
}

/// Reduces a whole snapshot with one reducer.
pub fn reduce_records(
    records: &[OrganizationRecord],
    reducer: MetricReducer,
    window: LookbackWindow,
) -> Vec<Row> {
    records.iter().map(|r| reducer(r, window)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org_data::{Counter, GroupedSeries, GroupedValue};
    use chrono::{TimeZone, Utc};

    fn counter(v: u64) -> Option<Counter> {
        Some(Counter {
            total_count: Some(v),
        })
    }

    fn grouped(values: &[f64]) -> Option<GroupedSeries> {
        Some(GroupedSeries {
            group_by: values
                .iter()
                .map(|v| GroupedValue { value: Some(*v) })
                .collect(),
        })
    }

    fn record() -> OrganizationRecord {
        let mut record = OrganizationRecord::new(
            "org-1",
            "Acme",
            Utc.with_ymd_and_hms(2023, 1, 4, 10, 0, 0).unwrap(),
        );
        record.statistics = Some(Statistics {
            activities_in_window: counter(10),
            missed: counter(3),
            completed: counter(6),
            waiting_to_be_graded: counter(2),
            student_time_on_platform_ms: grouped(&[100.0, 200.0]),
            student_time_on_platform_previous_ms: grouped(&[0.0, 0.0]),
            classrooms: grouped(&[2.0, 3.0]),
            ..Default::default()
        });
        record
    }

    #[test]
    fn test_ratio_metrics_share_window_total() {
        let row = reduce_activities(&record(), LookbackWindow::TwoWeeks);
        for key in [
            MetricKey::Missed,
            MetricKey::Completed,
            MetricKey::WaitingForGrading,
        ] {
            match row.get(key) {
                Some(CellValue::Ratio(r)) => assert_eq!(r.total, 10),
                other => panic!("unexpected cell {other:?}"),
            }
        }
        assert_eq!(row.get(MetricKey::Missed).unwrap().render(false), "3 (30%)");
    }

    #[test]
    fn test_time_on_platform_in_minutes() {
        let row = reduce_users(&record(), LookbackWindow::Week);
        match row.get(MetricKey::StudentTime) {
            Some(CellValue::Trend(t)) => {
                assert!((t.current_sum() - 300.0 / 60000.0).abs() < 1e-12);
                assert_eq!(t.percent_change(), None);
            }
            other => panic!("unexpected cell {other:?}"),
        }
        assert_eq!(
            row.get(MetricKey::StudentTime).unwrap().render(false),
            "0.0 minutes (n/a)"
        );
    }

    #[test]
    fn test_reducers_select_fields() {
        let rec = record();
        let general = reduce_general(&rec, LookbackWindow::Week);
        assert!(general.get(MetricKey::Missed).is_none());
        assert!(general.get(MetricKey::Status).is_some());

        let all = reduce_all(&rec, LookbackWindow::Week);
        assert_eq!(all.keys().count(), MetricKey::ALL.len());
        assert_eq!(
            all.get(MetricKey::ActiveClassrooms),
            Some(&CellValue::count(5))
        );
    }

    #[test]
    fn test_missing_statistics_substitute_zero() {
        let rec = OrganizationRecord::new("org-2", "Beta", Utc::now());
        let row = reduce_all(&rec, LookbackWindow::TwoWeeks);
        assert_eq!(row.get(MetricKey::Missed).unwrap().render(false), "0 (0%)");
        assert_eq!(row.get(MetricKey::CreatedBy).unwrap().render(false), "-");
        assert_eq!(
            row.get(MetricKey::LastActivity).unwrap().render(false),
            "No activity yet"
        );
    }

    #[test]
    fn test_metric_key_ids_round_trip() {
        for key in MetricKey::ALL {
            assert_eq!(key.id().parse::<MetricKey>().unwrap(), key);
        }
        assert!("nope".parse::<MetricKey>().is_err());
    }
}
