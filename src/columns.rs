// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::cell::{CellValue, Scalar, SortKey, TrendUnit};
use crate::metrics::{MetricKey, Row};
use crate::search::contains_ignore_case;
use crate::util::{format_change, format_sum};
use crate::LookbackWindow;
use ratatui::prelude::Constraint;
use std::cmp::Ordering;
use std::collections::HashMap;

type CellFn = Box<dyn Fn(&CellValue, bool) -> String>;
type DetailFn = Box<dyn Fn(&CellValue, LookbackWindow) -> Option<String>>;
type SortFn = Box<dyn Fn(&Row, &Row) -> Ordering>;
type FilterFn = Box<dyn Fn(&Row, &str) -> bool>;

/// Header grouping. Has no effect on sorting or filtering.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Section {
    General,
    Activities,
    Users,
    Organizations,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::General => "General",
            Section::Activities => "Activities",
            Section::Users => "Users",
            Section::Organizations => "Organizations",
        }
    }

    /// Period caption of windowed sections.
    pub fn period(&self, window: LookbackWindow) -> Option<String> {
        match self {
            Section::General => None,
            _ => Some(format!("Period: {} days", window.days())),
        }
    }
}

pub enum HeaderLabel {
    Static(&'static str),
    Windowed(fn(LookbackWindow) -> String),
}

pub struct Column {
    pub key: MetricKey,
    pub header: HeaderLabel,
    pub section: Section,
    pub constraint: Constraint,
    pub value_fn: CellFn,
    pub detail_fn: Option<DetailFn>,
    pub sort_fn: Option<SortFn>,
    pub filter_fn: Option<FilterFn>,
}

impl Column {
    /// Header text for the current window.
    pub fn header(&self, window: LookbackWindow) -> String {
        match &self.header {
            HeaderLabel::Static(s) => s.to_string(),
            HeaderLabel::Windowed(f) => f(window),
        }
    }

    /// Renders this column's cell of `row`; rows without the field show `-`.
    pub fn render(&self, row: &Row, localize: bool) -> String {
        row.get(self.key)
            .map(|value| (self.value_fn)(value, localize))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn detail(&self, row: &Row, window: LookbackWindow) -> Option<String> {
        let detail_fn = self.detail_fn.as_ref()?;
        row.get(self.key).and_then(|value| detail_fn(value, window))
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_fn.is_some()
    }

    pub fn is_filterable(&self) -> bool {
        self.filter_fn.is_some()
    }

    /// Compares two rows by this column, None when the column is not sortable.
    pub fn compare(&self, a: &Row, b: &Row) -> Option<Ordering> {
        self.sort_fn.as_ref().map(|f| f(a, b))
    }

    /// Filter predicate, columns without one match everything.
    pub fn matches(&self, row: &Row, query: &str) -> bool {
        self.filter_fn.as_ref().map_or(true, |f| f(row, query))
    }
}

pub struct Columns {
    columns: Vec<Column>,
    key_to_index: HashMap<MetricKey, usize>,
}

impl Columns {
    pub fn new(columns: Vec<Column>) -> Self {
        let key_to_index = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.key, i))
            .collect();

        Self {
            columns,
            key_to_index,
        }
    }

    pub fn get(&self, key: MetricKey) -> Option<&Column> {
        self.key_to_index.get(&key).map(|&idx| &self.columns[idx])
    }

    pub fn position(&self, key: MetricKey) -> Option<usize> {
        self.key_to_index.get(&key).copied()
    }

    /// Return all columns in display order
    pub fn all_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column the free-text filter applies to.
    pub fn filter_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_filterable())
    }

    /// Consecutive runs of columns sharing a section, as `(section, span)`.
    pub fn sections(&self) -> Vec<(Section, usize)> {
        let mut spans: Vec<(Section, usize)> = Vec::new();
        for col in &self.columns {
            match spans.last_mut() {
                Some((section, span)) if *section == col.section => *span += 1,
                _ => spans.push((col.section, 1)),
            }
        }
        spans
    }
}

fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a.map(CellValue::sort_key), b.map(CellValue::sort_key)) {
        (Some(a), Some(b)) => a.compare(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Comparator on the source statistic behind `key`.
pub fn sort_by_cell(key: MetricKey) -> SortFn {
    Box::new(move |a: &Row, b: &Row| compare_cells(a.get(key), b.get(key)))
}

fn render_value() -> CellFn {
    Box::new(|value: &CellValue, localize| value.render(localize))
}

/// Column shared by every tab: organization name, sortable and filterable.
macro_rules! academy_column {
    ($section:expr) => {
        Column {
            key: MetricKey::Academy,
            header: HeaderLabel::Static("Academy"),
            section: $section,
            constraint: Constraint::Min(20),
            value_fn: render_value(),
            detail_fn: None,
            sort_fn: Some(Box::new(|a: &Row, b: &Row| {
                SortKey::Text(a.name.to_lowercase()).compare(&SortKey::Text(b.name.to_lowercase()))
            })),
            filter_fn: Some(Box::new(|row: &Row, query: &str| {
                contains_ignore_case(&row.name, query)
            })),
        }
    };
}

macro_rules! ratio_column {
    ($key:expr, $header:expr, $detail:expr) => {
        Column {
            key: $key,
            header: HeaderLabel::Static($header),
            section: Section::Activities,
            constraint: Constraint::Length(21),
            value_fn: render_value(),
            detail_fn: Some(Box::new(|value: &CellValue, window: LookbackWindow| {
                match value {
                    CellValue::Ratio(r) => Some($detail(r, window.days())),
                    _ => None,
                }
            })),
            sort_fn: Some(sort_by_cell($key)),
            filter_fn: None,
        }
    };
}

fn status_column() -> Column {
    Column {
        key: MetricKey::Status,
        header: HeaderLabel::Static("Status"),
        section: Section::General,
        constraint: Constraint::Length(10),
        value_fn: render_value(),
        detail_fn: None,
        sort_fn: None,
        filter_fn: None,
    }
}

fn missed_column() -> Column {
    ratio_column!(
        MetricKey::Missed,
        "Missed",
        |r: &crate::cell::Ratio, days| format!(
            "Missed: {} out of {} ({}%) activities missed over the last {} days",
            r.count,
            r.total,
            r.percentage_or_zero(),
            days
        )
    )
}

fn completed_column() -> Column {
    ratio_column!(
        MetricKey::Completed,
        "Completed",
        |r: &crate::cell::Ratio, days| format!(
            "Completed: {} out of {} ({}%) activities completed over the last {} days",
            r.count,
            r.total,
            r.percentage_or_zero(),
            days
        )
    )
}

fn waiting_column() -> Column {
    ratio_column!(
        MetricKey::WaitingForGrading,
        "Waiting for grading",
        |r: &crate::cell::Ratio, days| format!(
            "Waiting for grading: {} out of {} submissions over the last {} days are waiting to be graded",
            r.count, r.total, days
        )
    )
}

fn scheduled_column() -> Column {
    Column {
        key: MetricKey::Scheduled,
        header: HeaderLabel::Windowed(|window| format!("Scheduled ({}d)", window.days())),
        section: Section::Activities,
        constraint: Constraint::Length(20),
        value_fn: render_value(),
        detail_fn: Some(Box::new(|value: &CellValue, window: LookbackWindow| {
            match value {
                CellValue::Scalar(Scalar::Count(n)) => Some(format!(
                    "Scheduled: {} activities are scheduled over the upcoming {} days",
                    n,
                    window.days()
                )),
                _ => None,
            }
        })),
        sort_fn: Some(sort_by_cell(MetricKey::Scheduled)),
        filter_fn: None,
    }
}

fn impressions_column() -> Column {
    Column {
        key: MetricKey::Impressions,
        header: HeaderLabel::Static("Impressions"),
        section: Section::Activities,
        constraint: Constraint::Length(14),
        value_fn: render_value(),
        detail_fn: Some(Box::new(|value: &CellValue, window: LookbackWindow| {
            match value {
                CellValue::Impressions(imp) => Some(format!(
                    "Impressions: {} impressions have been submitted over the last {} days. Positive={}% Negative={}%",
                    format_sum(imp.total, false),
                    window.days(),
                    imp.positive_share(),
                    imp.negative_share()
                )),
                _ => None,
            }
        })),
        sort_fn: Some(sort_by_cell(MetricKey::Impressions)),
        filter_fn: None,
    }
}

fn trend_detail(title: &'static str, per: &'static str) -> DetailFn {
    Box::new(move |value: &CellValue, _window: LookbackWindow| {
        let CellValue::Trend(trend) = value else {
            return None;
        };
        let diff = trend.difference();
        let direction = if diff < 0.0 { "decreased" } else { "increased" };
        let change = format_change(trend.percent_change());
        Some(match trend.unit {
            TrendUnit::Users => format!(
                "{title}: has {direction} by {} {per} {change} compared to previous period.",
                format_sum(diff.abs(), false)
            ),
            TrendUnit::Minutes => format!(
                "{title}: the average time has {direction} by {:.1} minutes {change} per {per} compared to previous period ({:.1} minutes).",
                diff.abs(),
                trend.previous_sum()
            ),
        })
    })
}

fn active_students_column() -> Column {
    Column {
        key: MetricKey::ActiveStudents,
        header: HeaderLabel::Static("Active students"),
        section: Section::Users,
        constraint: Constraint::Length(17),
        value_fn: render_value(),
        detail_fn: Some(trend_detail("Active students", "students")),
        sort_fn: Some(sort_by_cell(MetricKey::ActiveStudents)),
        filter_fn: None,
    }
}

fn active_staff_column() -> Column {
    Column {
        key: MetricKey::ActiveStaff,
        header: HeaderLabel::Static("Active staff"),
        section: Section::Users,
        constraint: Constraint::Length(14),
        value_fn: render_value(),
        detail_fn: None,
        sort_fn: Some(sort_by_cell(MetricKey::ActiveStaff)),
        filter_fn: None,
    }
}

fn student_time_column() -> Column {
    Column {
        key: MetricKey::StudentTime,
        header: HeaderLabel::Static("Time per student"),
        section: Section::Users,
        constraint: Constraint::Length(20),
        value_fn: render_value(),
        detail_fn: Some(trend_detail("Average time on platform per student", "student")),
        sort_fn: Some(sort_by_cell(MetricKey::StudentTime)),
        filter_fn: None,
    }
}

fn staff_time_column() -> Column {
    Column {
        key: MetricKey::StaffTime,
        header: HeaderLabel::Static("Time per staff"),
        section: Section::Users,
        constraint: Constraint::Length(20),
        value_fn: render_value(),
        detail_fn: Some(trend_detail("Average time on platform per staff", "staff member")),
        sort_fn: Some(sort_by_cell(MetricKey::StaffTime)),
        filter_fn: None,
    }
}

fn classrooms_column() -> Column {
    Column {
        key: MetricKey::ActiveClassrooms,
        header: HeaderLabel::Static("Active classrooms"),
        section: Section::Organizations,
        constraint: Constraint::Length(19),
        value_fn: render_value(),
        detail_fn: None,
        sort_fn: Some(sort_by_cell(MetricKey::ActiveClassrooms)),
        filter_fn: None,
    }
}

fn last_activity_column() -> Column {
    Column {
        key: MetricKey::LastActivity,
        header: HeaderLabel::Static("Last activity"),
        section: Section::Organizations,
        constraint: Constraint::Length(20),
        value_fn: render_value(),
        detail_fn: None,
        sort_fn: Some(sort_by_cell(MetricKey::LastActivity)),
        filter_fn: None,
    }
}

fn created_column() -> Column {
    Column {
        key: MetricKey::Created,
        header: HeaderLabel::Static("Created"),
        section: Section::Organizations,
        constraint: Constraint::Length(12),
        value_fn: render_value(),
        detail_fn: None,
        sort_fn: Some(sort_by_cell(MetricKey::Created)),
        filter_fn: None,
    }
}

fn created_by_column() -> Column {
    Column {
        key: MetricKey::CreatedBy,
        header: HeaderLabel::Static("Created by"),
        section: Section::Organizations,
        constraint: Constraint::Length(16),
        value_fn: render_value(),
        detail_fn: None,
        sort_fn: Some(sort_by_cell(MetricKey::CreatedBy)),
        filter_fn: None,
    }
}

fn packages_column() -> Column {
    Column {
        key: MetricKey::Packages,
        header: HeaderLabel::Static("Packages"),
        section: Section::Organizations,
        constraint: Constraint::Length(10),
        value_fn: render_value(),
        detail_fn: Some(Box::new(|value: &CellValue, _window: LookbackWindow| {
            match value {
                CellValue::Packages(p) if p.count.unwrap_or_default() > 0 => {
                    Some(format!("Packages: {}", p.names.join(", ")))
                }
                CellValue::Packages(_) => Some("Packages: No packages found".to_string()),
                _ => None,
            }
        })),
        sort_fn: Some(sort_by_cell(MetricKey::Packages)),
        filter_fn: None,
    }
}

pub fn get_general_columns() -> Columns {
    Columns::new(vec![academy_column!(Section::General), status_column()])
}

pub fn get_activities_columns() -> Columns {
    Columns::new(vec![
        academy_column!(Section::Activities),
        missed_column(),
        completed_column(),
        waiting_column(),
        scheduled_column(),
        impressions_column(),
    ])
}

pub fn get_users_columns() -> Columns {
    Columns::new(vec![
        academy_column!(Section::Users),
        active_students_column(),
        active_staff_column(),
        student_time_column(),
        staff_time_column(),
    ])
}

pub fn get_organizations_columns() -> Columns {
    Columns::new(vec![
        academy_column!(Section::Organizations),
        classrooms_column(),
        last_activity_column(),
        created_column(),
        created_by_column(),
        packages_column(),
    ])
}

pub fn get_all_columns() -> Columns {
    Columns::new(vec![
        academy_column!(Section::General),
        status_column(),
        missed_column(),
        completed_column(),
        waiting_column(),
        scheduled_column(),
        impressions_column(),
        active_students_column(),
        active_staff_column(),
        student_time_column(),
        staff_time_column(),
        classrooms_column(),
        last_activity_column(),
        created_column(),
        created_by_column(),
        packages_column(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{PackagesSummary, Ratio};

    fn row(id: &str, name: &str, missed: u64) -> Row {
        Row::new(id, name).with(MetricKey::Missed, CellValue::Ratio(Ratio::new(missed, 10)))
    }

    #[test]
    fn test_new_columns_builds_key_index() {
        let cols = get_activities_columns();
        assert_eq!(cols.len(), 6);
        assert_eq!(cols.position(MetricKey::Academy), Some(0));
        assert_eq!(cols.position(MetricKey::Impressions), Some(5));
        assert!(cols.get(MetricKey::Packages).is_none());
    }

    #[test]
    fn test_only_academy_is_filterable() {
        for cols in [
            get_all_columns(),
            get_general_columns(),
            get_activities_columns(),
            get_users_columns(),
            get_organizations_columns(),
        ] {
            let filterable: Vec<_> = cols
                .all_columns()
                .iter()
                .filter(|c| c.is_filterable())
                .map(|c| c.key)
                .collect();
            assert_eq!(filterable, vec![MetricKey::Academy]);
        }
    }

    #[test]
    fn test_all_columns_cover_every_metric() {
        let cols = get_all_columns();
        for key in MetricKey::ALL {
            assert!(cols.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_sections_group_consecutive_columns() {
        let sections = get_all_columns().sections();
        assert_eq!(
            sections,
            vec![
                (Section::General, 2),
                (Section::Activities, 5),
                (Section::Users, 4),
                (Section::Organizations, 5),
            ]
        );
    }

    #[test]
    fn test_comparator_uses_statistic() {
        let cols = get_activities_columns();
        let missed = cols.get(MetricKey::Missed).unwrap();
        assert_eq!(
            missed.compare(&row("a", "A", 9), &row("b", "B", 10)),
            Some(Ordering::Less)
        );
        let status = get_general_columns();
        assert_eq!(
            status
                .get(MetricKey::Status)
                .unwrap()
                .compare(&row("a", "A", 1), &row("b", "B", 2)),
            None
        );
    }

    #[test]
    fn test_render_missing_field() {
        let cols = get_activities_columns();
        let scheduled = cols.get(MetricKey::Scheduled).unwrap();
        assert_eq!(scheduled.render(&Row::new("x", "X"), false), "-");
    }

    #[test]
    fn test_headers_follow_window() {
        let cols = get_activities_columns();
        let scheduled = cols.get(MetricKey::Scheduled).unwrap();
        assert_eq!(scheduled.header(LookbackWindow::Week), "Scheduled (7d)");
        assert_eq!(scheduled.header(LookbackWindow::Year), "Scheduled (365d)");
        assert_eq!(
            Section::Activities.period(LookbackWindow::TwoWeeks).as_deref(),
            Some("Period: 14 days")
        );
        assert_eq!(Section::General.period(LookbackWindow::TwoWeeks), None);
    }

    #[test]
    fn test_ratio_detail_mentions_window() {
        let cols = get_activities_columns();
        let missed = cols.get(MetricKey::Missed).unwrap();
        let detail = missed
            .detail(&row("a", "Acme", 3), LookbackWindow::Month)
            .unwrap();
        assert_eq!(
            detail,
            "Missed: 3 out of 10 (30%) activities missed over the last 30 days"
        );
    }

    #[test]
    fn test_packages_detail() {
        let cols = get_organizations_columns();
        let packages = cols.get(MetricKey::Packages).unwrap();
        let empty = Row::new("a", "A").with(
            MetricKey::Packages,
            CellValue::Packages(PackagesSummary::default()),
        );
        assert_eq!(
            packages.detail(&empty, LookbackWindow::Week).unwrap(),
            "Packages: No packages found"
        );
        let some = Row::new("a", "A").with(
            MetricKey::Packages,
            CellValue::Packages(PackagesSummary {
                count: Some(2),
                names: vec!["Math".to_string(), "Art".to_string()],
            }),
        );
        assert_eq!(
            packages.detail(&some, LookbackWindow::Week).unwrap(),
            "Packages: Math, Art"
        );
        assert_eq!(packages.render(&some, false), "2");
    }

    #[test]
    fn test_academy_filter_predicate() {
        let cols = get_general_columns();
        let academy = cols.filter_column().unwrap();
        assert!(academy.matches(&Row::new("1", "Acme Academy"), "acme"));
        assert!(!academy.matches(&Row::new("2", "Beta"), "acme"));
    }
}
