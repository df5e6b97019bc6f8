// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use super::TableRenderer;
use crate::tab::TabView;
use crate::LookbackWindow;

/// Renders a tab as aligned plain text, one line per row.
pub struct PlainRenderer;

impl PlainRenderer {
    pub fn render(
        view: &TabView,
        window: LookbackWindow,
        self_id: Option<&str>,
        localize: bool,
    ) -> String {
        let columns = view.columns();
        let sort = view.grid().sort_state();

        let mut lines: Vec<Vec<String>> = Vec::new();
        lines.push(TableRenderer::section_cells(columns, window));
        lines.push(
            std::iter::once("#".to_string())
                .chain(
                    columns
                        .all_columns()
                        .iter()
                        .map(|col| TableRenderer::header_text(col, window, sort)),
                )
                .collect(),
        );
        for ranked in view.visible_rows(self_id) {
            lines.push(TableRenderer::row_cells(columns, &ranked, localize));
        }

        let mut widths = vec![0; columns.len() + 1];
        for line in &lines {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for line in lines {
            let padded: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            out.push_str(padded.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}
