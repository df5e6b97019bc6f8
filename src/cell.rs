// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Cell values produced by the metric reducers, one variant per display shape.

use crate::util::{
    format_change, format_count, format_date, format_minutes, format_sum, format_timestamp,
    percentage,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Count(u64),
    /// `count/total` without a percentage.
    Fraction { count: u64, total: u64 },
    Text(String),
    /// Last activity, rendered with time of day.
    Timestamp(Option<DateTime<Utc>>),
    Date(DateTime<Utc>),
}

/// A count over the shared window total.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ratio {
    pub count: u64,
    pub total: u64,
}

impl Ratio {
    pub fn new(count: u64, total: u64) -> Self {
        Self { count, total }
    }

    /// Rounded percentage, None when total is zero.
    pub fn percentage(&self) -> Option<i64> {
        percentage(self.count as f64, self.total as f64)
    }

    /// Percentage with the undefined ratio shown as 0.
    pub fn percentage_or_zero(&self) -> i64 {
        self.percentage().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrendUnit {
    Users,
    Minutes,
}

/// Current window buckets against the preceding window of equal length.
#[derive(Clone, Debug, PartialEq)]
pub struct Trend {
    pub current: Vec<f64>,
    pub previous: Vec<f64>,
    pub unit: TrendUnit,
    /// Population the current sum is drawn from, shown as `sum/out_of`.
    pub out_of: Option<u64>,
}

impl Trend {
    pub fn new(current: Vec<f64>, previous: Vec<f64>, unit: TrendUnit) -> Self {
        Self {
            current,
            previous,
            unit,
            out_of: None,
        }
    }

    pub fn out_of(mut self, out_of: u64) -> Self {
        self.out_of = Some(out_of);
        self
    }

    pub fn current_sum(&self) -> f64 {
        self.current.iter().sum()
    }

    pub fn previous_sum(&self) -> f64 {
        self.previous.iter().sum()
    }

    pub fn difference(&self) -> f64 {
        self.current_sum() - self.previous_sum()
    }

    /// Percent change against the previous window, None when the previous sum is zero.
    pub fn percent_change(&self) -> Option<i64> {
        percentage(self.difference(), self.previous_sum())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Persona {
    pub name: Option<String>,
}

impl Persona {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackagesSummary {
    pub count: Option<u64>,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Impressions {
    pub positive: f64,
    pub negative: f64,
    pub total: f64,
}

impl Impressions {
    pub fn positive_share(&self) -> i64 {
        percentage(self.positive, self.total).unwrap_or(0)
    }

    pub fn negative_share(&self) -> i64 {
        percentage(self.negative, self.total).unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Scalar(Scalar),
    Ratio(Ratio),
    Trend(Trend),
    Persona(Persona),
    Packages(PackagesSummary),
    Impressions(Impressions),
}

/// Source value a column comparator orders by.
#[derive(Clone, Debug, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
    Time(Option<i64>),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Time(_) => 2,
        }
    }

    /// Total order over keys; keys of different kinds order by kind.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl CellValue {
    pub fn count(value: u64) -> Self {
        CellValue::Scalar(Scalar::Count(value))
    }

    pub fn text(value: &str) -> Self {
        CellValue::Scalar(Scalar::Text(value.to_string()))
    }

    /// Renders the compact cell text.
    pub fn render(&self, localize: bool) -> String {
        match self {
            CellValue::Scalar(scalar) => render_scalar(scalar, localize),
            CellValue::Ratio(ratio) => render_ratio(ratio, localize),
            CellValue::Trend(trend) => render_trend(trend, localize),
            CellValue::Persona(persona) => render_persona(persona),
            CellValue::Packages(packages) => render_packages(packages, localize),
            CellValue::Impressions(impressions) => render_impressions(impressions, localize),
        }
    }

    /// The statistic this cell sorts by, never its rendered text.
    pub fn sort_key(&self) -> SortKey {
        match self {
            CellValue::Scalar(Scalar::Count(v)) => SortKey::Number(*v as f64),
            CellValue::Scalar(Scalar::Fraction { count, .. }) => SortKey::Number(*count as f64),
            CellValue::Scalar(Scalar::Text(s)) => SortKey::Text(s.to_lowercase()),
            CellValue::Scalar(Scalar::Timestamp(ts)) => {
                SortKey::Time(ts.map(|t| t.timestamp_millis()))
            }
            CellValue::Scalar(Scalar::Date(ts)) => SortKey::Time(Some(ts.timestamp_millis())),
            CellValue::Ratio(ratio) => SortKey::Number(ratio.count as f64),
            CellValue::Trend(trend) => SortKey::Number(trend.current_sum()),
            CellValue::Persona(persona) => {
                SortKey::Text(persona.name.clone().unwrap_or_default().to_lowercase())
            }
            CellValue::Packages(packages) => {
                SortKey::Number(packages.count.unwrap_or_default() as f64)
            }
            CellValue::Impressions(impressions) => SortKey::Number(impressions.positive),
        }
    }
}

fn render_scalar(scalar: &Scalar, localize: bool) -> String {
    match scalar {
        Scalar::Count(v) => format_count(*v, localize),
        Scalar::Fraction { count, total } => format!(
            "{}/{}",
            format_count(*count, localize),
            format_count(*total, localize)
        ),
        Scalar::Text(s) => s.clone(),
        Scalar::Timestamp(Some(ts)) => format_timestamp(ts),
        Scalar::Timestamp(None) => "No activity yet".to_string(),
        Scalar::Date(ts) => format_date(ts),
    }
}

fn render_ratio(ratio: &Ratio, localize: bool) -> String {
    format!(
        "{} ({}%)",
        format_count(ratio.count, localize),
        ratio.percentage_or_zero()
    )
}

fn render_trend(trend: &Trend, localize: bool) -> String {
    let change = format_change(trend.percent_change());
    match trend.unit {
        TrendUnit::Users => match trend.out_of {
            Some(out_of) => format!(
                "{}/{} {change}",
                format_sum(trend.current_sum(), localize),
                format_count(out_of, localize)
            ),
            None => format!("{} {change}", format_sum(trend.current_sum(), localize)),
        },
        TrendUnit::Minutes => format!("{} {change}", format_minutes(trend.current_sum())),
    }
}

fn render_persona(persona: &Persona) -> String {
    persona.name.clone().unwrap_or_else(|| "-".to_string())
}

fn render_packages(packages: &PackagesSummary, localize: bool) -> String {
    format_count(packages.count.unwrap_or_default(), localize)
}

fn render_impressions(impressions: &Impressions, localize: bool) -> String {
    format!(
        "+{} / -{}",
        format_sum(impressions.positive, localize),
        format_sum(impressions.negative, localize)
    )
}
