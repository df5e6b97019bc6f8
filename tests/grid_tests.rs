// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use orgtop::cell::{CellValue, Persona};
use orgtop::columns::get_activities_columns;
use orgtop::{Grid, MetricKey, RankedRow, Row, SortState};
use proptest::prelude::*;

fn scheduled_row(id: usize, name: &str, scheduled: u64) -> Row {
    Row::new(&format!("org{id:04}"), name)
        .with(MetricKey::Academy, CellValue::Persona(Persona::named(name)))
        .with(MetricKey::Scheduled, CellValue::count(scheduled))
}

fn build_rows(entries: &[(String, u64)]) -> Vec<Row> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (name, scheduled))| scheduled_row(i, name, *scheduled))
        .collect()
}

fn ids(ranked: &[RankedRow]) -> Vec<String> {
    ranked.iter().map(|r| r.row.id.clone()).collect()
}

fn entries() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec(("[a-zA-Z ]{1,12}", 0u64..20), 0..40)
}

proptest! {
    #[test]
    fn sorting_is_idempotent(entries in entries(), query in "[a-z]{0,2}") {
        let columns = get_activities_columns();
        let rows = build_rows(&entries);
        let mut grid = Grid::new(SortState::descending(MetricKey::Scheduled));
        grid.set_filter(&query);

        let first = ids(&grid.arrange(&rows, &columns));
        let second = ids(&grid.arrange(&rows, &columns));
        prop_assert_eq!(&first, &second);

        // input order does not matter either, ties fall back to the id
        let reversed: Vec<Row> = rows.iter().rev().cloned().collect();
        prop_assert_eq!(first, ids(&grid.arrange(&reversed, &columns)));
    }

    #[test]
    fn toggling_reverses_without_ties(
        values in prop::collection::hash_set(0u64..10_000, 0..40)
    ) {
        let columns = get_activities_columns();
        let entries: Vec<(String, u64)> =
            values.into_iter().map(|v| (format!("Academy {v}"), v)).collect();
        let rows = build_rows(&entries);
        let mut grid = Grid::new(SortState::descending(MetricKey::Scheduled));

        let before = ids(&grid.visible_rows(&rows, &columns, None));
        prop_assert!(grid.toggle_sort(&columns, MetricKey::Scheduled));
        let mut after = ids(&grid.visible_rows(&rows, &columns, None));
        after.reverse();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn empty_filter_keeps_every_row(entries in entries()) {
        let columns = get_activities_columns();
        let rows = build_rows(&entries);
        let mut grid = Grid::new(SortState::descending(MetricKey::Scheduled));
        let unfiltered = ids(&grid.arrange(&rows, &columns));

        grid.set_filter("abc");
        grid.set_filter("");
        let cleared = grid.arrange(&rows, &columns);
        prop_assert_eq!(cleared.len(), rows.len());
        prop_assert_eq!(ids(&cleared), unfiltered);
        let ranks: Vec<usize> = cleared.iter().map(|r| r.rank).collect();
        prop_assert_eq!(ranks, (1..=rows.len()).collect::<Vec<_>>());
    }

    #[test]
    fn self_row_never_visible(
        entries in prop::collection::vec(("[a-c]{1,4}", 0u64..5), 1..30),
        self_index in any::<prop::sample::Index>(),
        query in "[a-c]{0,2}",
        flip in any::<bool>(),
    ) {
        let columns = get_activities_columns();
        let rows = build_rows(&entries);
        let self_id = rows[self_index.index(rows.len())].id.clone();
        let mut grid = Grid::new(SortState::descending(MetricKey::Scheduled));
        grid.set_filter(&query);
        if flip {
            grid.toggle_sort(&columns, MetricKey::Academy);
        }

        let visible = grid.visible_rows(&rows, &columns, Some(&self_id));
        prop_assert!(visible.iter().all(|r| r.row.id != self_id));

        let ranked = grid.arrange(&rows, &columns);
        let expected = ranked.iter().filter(|r| r.row.id != self_id).count();
        prop_assert_eq!(visible.len(), expected);
    }
}

#[test]
fn test_filter_matches_academy_only() {
    let columns = get_activities_columns();
    let rows = vec![
        scheduled_row(1, "Northside Academy", 4),
        scheduled_row(2, "Southside", 9),
        scheduled_row(3, "NORTH Campus", 1),
    ];
    let mut grid = Grid::new(SortState::descending(MetricKey::Scheduled));
    grid.set_filter("north");
    assert_eq!(
        ids(&grid.arrange(&rows, &columns)),
        vec!["org0001".to_string(), "org0003".to_string()]
    );
    grid.set_filter("4");
    assert!(grid.arrange(&rows, &columns).is_empty());
}
