// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use chrono::NaiveDate;
use clap::Parser;
use orgtop::cli::{Cli, Commands, DumpArgs};
use orgtop::config::Config;
use orgtop::{Dump, SnapshotSource};
use std::fs;

const SNAPSHOT: &str = r#"[
  {
    "id": "north",
    "name": "North Academy",
    "state": "active",
    "createdAt": "2023-03-04T10:00:00Z",
    "activeAt": "2024-05-01T08:30:00Z",
    "createdBy": { "name": "Dana" },
    "packages": { "totalCount": 2, "nodes": [{ "id": "p1", "name": "Math" }, { "id": "p2", "name": "Art" }] },
    "statistics": {
      "activitiesInWindow": { "totalCount": 1200 },
      "missed": { "totalCount": 300 },
      "classrooms": { "groupBy": [{ "value": 4 }, { "value": null }, { "value": 3 }] }
    }
  },
  {
    "id": "south",
    "name": "South Academy",
    "state": "inactive",
    "createdAt": "2023-05-06T10:00:00Z",
    "statistics": {
      "activitiesInWindow": { "totalCount": 10 },
      "missed": { "totalCount": 1 },
      "classrooms": { "groupBy": [{ "value": 9 }] }
    }
  }
]"#;

fn dump_args(argv: &[&str]) -> DumpArgs {
    let mut full = vec!["orgtop", "dump"];
    full.extend_from_slice(argv);
    match Cli::try_parse_from(full).unwrap().command {
        Some(Commands::Dump(args)) => args,
        _ => panic!("expected dump"),
    }
}

fn run(argv: &[&str], dir: &std::path::Path) -> String {
    let args = dump_args(argv);
    let config = Config::merge_cli(&Config::default_config(), &args.source);
    let source = SnapshotSource::new(dir);
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    Dump::from_args(&args)
        .unwrap()
        .run(&config, &source, today)
        .unwrap()
}

fn snapshot_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("14.json"), SNAPSHOT).unwrap();
    fs::write(dir.path().join("30.json"), "[]").unwrap();
    dir
}

#[test]
fn test_dump_organizations_tab() {
    let dir = snapshot_dir();
    let out = run(&["--tab", "organizations"], dir.path());
    let lines: Vec<&str> = out.lines().collect();

    assert!(lines[0].starts_with("   Organizations  Period: 14 days"));
    assert!(lines[1].contains("Active classrooms ▼"));
    assert!(lines[2].starts_with("1"));
    assert!(lines[2].contains("South Academy"));
    assert!(lines[3].contains("North Academy"));
    assert!(lines[3].contains("08:30 - May 1 2024"));
    assert!(lines[3].contains("Mar 4 2023"));
    assert!(lines[3].contains("Dana"));
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_dump_sort_filter_and_localize() {
    let dir = snapshot_dir();
    let out = run(
        &["--tab", "activities", "--sort", "missed", "--desc", "--localize"],
        dir.path(),
    );
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[1].contains("Missed ▼"));
    assert!(lines[2].contains("North Academy"));
    assert!(lines[2].contains("300 (25%)"));
    assert!(lines[2].contains("1,200"));

    let out = run(&["--tab", "activities", "-f", "south"], dir.path());
    assert_eq!(out.lines().count(), 3);
    assert!(out.contains("1 (10%)"));
}

#[test]
fn test_dump_window_selects_snapshot() {
    let dir = snapshot_dir();
    let out = run(&["--lookback-days", "30", "--tab", "users"], dir.path());
    assert!(out.lines().next().unwrap().contains("Period: 30 days"));
    assert_eq!(out.lines().count(), 2);

    let args = dump_args(&["--lookback-days", "7"]);
    let config = Config::merge_cli(&Config::default_config(), &args.source);
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert!(Dump::from_args(&args)
        .unwrap()
        .run(&config, &SnapshotSource::new(dir.path()), today)
        .is_err());
}
