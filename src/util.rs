// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Marker shown wherever a value cannot be derived.
pub const UNAVAILABLE: &str = "n/a";

/// Milliseconds per minute, time-on-platform is delivered in ms.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Returns the file content as a String.
pub fn read_file_string(path: &Path) -> Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Rounds half up, so -2.5 becomes -2 and 2.5 becomes 3.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// `round(100 * part / whole)`, None when the ratio is undefined.
pub fn percentage(part: f64, whole: f64) -> Option<i64> {
    if whole == 0.0 {
        return None;
    }
    let pct = round_half_up(part / whole * 100.0);
    pct.is_finite().then_some(pct as i64)
}

/// Formats a count with thousands separators, optionally localized.
pub fn format_count(value: u64, localize: bool) -> String {
    if localize {
        value.to_formatted_string(&Locale::en)
    } else {
        value.to_string()
    }
}

/// Formats a sum of bucket values, which are whole numbers for user counts.
pub fn format_sum(value: f64, localize: bool) -> String {
    if value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64 {
        format_count(value as u64, localize)
    } else {
        format!("{value:.1}")
    }
}

/// Formats a signed percent change as `(+5%)`, `(-3%)` or `(0%)`.
pub fn format_change(change: Option<i64>) -> String {
    match change {
        Some(c) if c > 0 => format!("(+{c}%)"),
        Some(c) => format!("({c}%)"),
        None => format!("({UNAVAILABLE})"),
    }
}

pub fn format_minutes(minutes: f64) -> String {
    format!("{minutes:.1} minutes")
}

/// `HH:MM - Mon D YYYY`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M - %b %-d %Y").to_string()
}

/// `Mon D YYYY`
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d %Y").to_string()
}
