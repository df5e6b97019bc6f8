// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use orgtop::render::{TableContext, TableRenderer};
use orgtop::{AppTheme, LookbackWindow, MetricKey, SnapshotSource, Tab, TabView};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;

const SNAPSHOT: &str = r#"[
  {
    "id": "parent",
    "name": "Parent Group",
    "createdAt": "2022-01-01T00:00:00Z",
    "statistics": { "activitiesInWindow": { "totalCount": 50 } }
  },
  {
    "id": "north",
    "name": "North Academy",
    "createdAt": "2023-03-04T10:00:00Z",
    "statistics": {
      "activitiesInWindow": { "totalCount": 20 },
      "missed": { "totalCount": 5 }
    }
  },
  {
    "id": "south",
    "name": "South Academy",
    "createdAt": "2023-05-06T10:00:00Z",
    "statistics": { "activitiesInWindow": { "totalCount": 8 } }
  }
]"#;

fn view(tab: Tab) -> TabView {
    let records = SnapshotSource::parse(SNAPSHOT).unwrap();
    let mut view = TabView::new(tab);
    view.refresh(&records, LookbackWindow::TwoWeeks);
    view
}

fn context<'a>(theme: &'a AppTheme, input: &'a str, filtering: bool) -> TableContext<'a> {
    TableContext {
        window: LookbackWindow::TwoWeeks,
        focused_column: 0,
        selected: 0,
        filtering,
        input_buffer: input,
        self_id: Some("parent"),
        localize: false,
        theme,
    }
}

fn lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

fn draw(view: &TabView, ctx: &TableContext) -> (Vec<String>, usize, u16) {
    let mut terminal = Terminal::new(TestBackend::new(160, 12)).unwrap();
    let mut result = (0, 0);
    terminal
        .draw(|frame| {
            result = TableRenderer::render_table(frame, frame.area(), view, ctx).unwrap();
        })
        .unwrap();
    (lines(terminal.backend().buffer()), result.0, result.1)
}

#[test]
fn test_activities_table_layout() {
    let theme = AppTheme::Default;
    let view = view(Tab::Activities);
    let (lines, visible, page_size) = draw(&view, &context(&theme, "", false));

    assert_eq!(visible, 2);
    assert_eq!(page_size, 8);
    assert!(lines[0].contains("Activities (total: 2)"));
    assert!(lines[0].contains("[ 14 days ]"));
    assert!(lines[0].contains("filter"));
    assert!(lines[1].contains("Activities"));
    assert!(lines[1].contains("Period: 14 days"));
    assert!(lines[2].contains("Academy"));
    assert!(lines[2].contains("Waiting for grading"));
    assert!(lines[2].contains("Scheduled (14d) ▼"));
    assert!(!lines.iter().any(|l| l.contains("Parent Group")));
}

#[test]
fn test_ranks_skip_self_row() {
    let theme = AppTheme::Default;
    let view = view(Tab::Activities);
    let (lines, _, _) = draw(&view, &context(&theme, "", false));

    let north = lines.iter().position(|l| l.contains("North Academy")).unwrap();
    let south = lines.iter().position(|l| l.contains("South Academy")).unwrap();
    assert!(north < south);
    assert!(lines[north].contains("│2 "));
    assert!(lines[north].contains("5 (25%)"));
    assert!(lines[south].contains("│3 "));
}

#[test]
fn test_general_has_no_period() {
    let theme = AppTheme::Default;
    let view = view(Tab::General);
    let (lines, _, _) = draw(&view, &context(&theme, "", false));

    assert!(lines[0].contains("General (total: 2)"));
    assert!(!lines.iter().any(|l| l.contains("Period:")));
    assert!(!lines[0].contains("14 days"));
    assert!(lines[2].contains("Academy ▼"));
}

#[test]
fn test_filter_title_and_rows() {
    let theme = AppTheme::Default;
    let mut view = view(Tab::Activities);
    view.grid_mut().set_filter("nor");
    let (lines, visible, _) = draw(&view, &context(&theme, "nor", true));

    assert_eq!(visible, 1);
    assert!(lines[0].contains("f nor_"));
    assert!(lines[0].contains("Activities (total: 1)"));
    assert!(!lines.iter().any(|l| l.contains("South Academy")));
}

#[test]
fn test_header_marks_sort_direction() {
    let theme = AppTheme::Default;
    let mut view = view(Tab::Activities);
    assert!(view.toggle_sort(MetricKey::Missed));
    let (lines, _, _) = draw(&view, &context(&theme, "", false));
    assert!(lines[2].contains("▲"));
    assert!(!lines[2].contains("▼"));

    let south = lines.iter().position(|l| l.contains("South Academy")).unwrap();
    let north = lines.iter().position(|l| l.contains("North Academy")).unwrap();
    assert!(south < north);
}

#[test]
fn test_section_cells_align_with_columns() {
    let view = view(Tab::Users);
    let cells = TableRenderer::section_cells(view.columns(), LookbackWindow::Month);
    assert_eq!(cells.len(), view.columns().len() + 1);
    assert_eq!(cells[0], "");
    assert_eq!(cells[1], "Users");
    assert_eq!(cells[2], "Period: 30 days");
    assert!(cells[3..].iter().all(|c| c.is_empty()));
}
