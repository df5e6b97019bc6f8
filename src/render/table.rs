// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::columns::{Column, Columns};
use crate::grid::{RankedRow, SortState};
use crate::tab::TabView;
use crate::{AppTheme, LookbackWindow};
use anyhow::Result;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Cell, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
    TableState,
};
use ratatui::Frame;

const RANK_WIDTH: u16 = 4;

/// What the table needs from the app besides the tab view.
pub struct TableContext<'a> {
    pub window: LookbackWindow,
    pub focused_column: usize,
    pub selected: usize,
    pub filtering: bool,
    pub input_buffer: &'a str,
    pub self_id: Option<&'a str>,
    pub localize: bool,
    pub theme: &'a AppTheme,
}

/// Renderer for the organization grid
pub struct TableRenderer;

impl TableRenderer {
    /// Creates the column header row and constraints, rank column first.
    pub fn create_table_header_and_constraints<'a>(
        columns: &'a Columns,
        window: LookbackWindow,
        sort: SortState,
        focused_column: usize,
        theme: &'a AppTheme,
    ) -> (Row<'a>, Vec<Constraint>) {
        let header = std::iter::once(Cell::from("#"))
            .chain(columns.all_columns().iter().enumerate().map(|(i, col)| {
                let cell = Cell::from(Self::header_text(col, window, sort));
                if i == focused_column {
                    cell.style(theme.focus_style())
                } else {
                    cell
                }
            }))
            .collect::<Row>()
            .height(1)
            .style(theme.text_color())
            .bold()
            .underlined();

        let constraints = std::iter::once(Constraint::Length(RANK_WIDTH))
            .chain(columns.all_columns().iter().map(|col| col.constraint))
            .collect::<Vec<_>>();

        (header, constraints)
    }

    /// Column header with the sort indicator on the active column.
    pub fn header_text(col: &Column, window: LookbackWindow, sort: SortState) -> String {
        if col.key == sort.key {
            format!("{} {}", col.header(window), sort.direction.arrow())
        } else {
            col.header(window)
        }
    }

    /// Section captions over the headers. A section's label sits over its
    /// first column and the period, if any, over its second.
    pub fn section_cells(columns: &Columns, window: LookbackWindow) -> Vec<String> {
        let mut cells = vec![String::new()];
        for (section, span) in columns.sections() {
            let period = section.period(window);
            let mut texts = Vec::with_capacity(span);
            match (span, period) {
                (1, Some(period)) => texts.push(format!("{} {period}", section.label())),
                (_, Some(period)) => {
                    texts.push(section.label().to_string());
                    texts.push(period);
                }
                (_, None) => texts.push(section.label().to_string()),
            }
            texts.resize(span, String::new());
            cells.extend(texts);
        }
        cells
    }

    fn create_section_row<'a>(
        columns: &Columns,
        window: LookbackWindow,
        theme: &AppTheme,
    ) -> Row<'a> {
        Self::section_cells(columns, window)
            .into_iter()
            .map(Cell::from)
            .collect::<Row>()
            .height(1)
            .style(theme.section_style())
    }

    /// Cell texts of one ranked row, rank first.
    pub fn row_cells(columns: &Columns, ranked: &RankedRow, localize: bool) -> Vec<String> {
        std::iter::once(ranked.rank.to_string())
            .chain(
                columns
                    .all_columns()
                    .iter()
                    .map(|col| col.render(ranked.row, localize)),
            )
            .collect()
    }

    fn title_bar<'a>(view: &TabView, ctx: &TableContext<'a>, total: usize) -> Block<'a> {
        let theme = ctx.theme;
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style())
            .title_top(
                Line::from(format!("{} (total: {})", view.tab().label(), total))
                    .style(theme.title_style())
                    .centered(),
            )
            .title_top(
                Line::from(vec![
                    Span::styled("f", theme.text_important_color()),
                    Span::styled(
                        if ctx.filtering {
                            format!(" {}_", ctx.input_buffer)
                        } else if !ctx.input_buffer.is_empty() {
                            format!("ilter: {}", ctx.input_buffer)
                        } else {
                            "ilter".to_string()
                        },
                        theme.text_color(),
                    ),
                ])
                .left_aligned(),
            );
        if view.tab().shows_period_selector() {
            block = block.title_top(
                Line::from(vec![
                    Span::styled("[", theme.text_important_color()),
                    Span::styled(format!(" {} ", ctx.window.label()), theme.text_color()),
                    Span::styled("]", theme.text_important_color()),
                ])
                .right_aligned(),
            );
        }
        block
    }

    /// Renders the grid of one tab. Returns the number of rendered rows and
    /// the number of rows that fit on a page.
    pub fn render_table(
        frame: &mut Frame,
        area: Rect,
        view: &TabView,
        ctx: &TableContext,
    ) -> Result<(usize, u16)> {
        let [scroll_area, data_area] =
            Layout::horizontal(vec![Constraint::Min(1), Constraint::Percentage(100)]).areas(area);

        // borders plus section and header rows
        let page_size = data_area.height.saturating_sub(4).max(1);

        let columns = view.columns();
        let (header, constraints) = Self::create_table_header_and_constraints(
            columns,
            ctx.window,
            view.grid().sort_state(),
            ctx.focused_column,
            ctx.theme,
        );
        let section_row = Self::create_section_row(columns, ctx.window, ctx.theme);

        let visible = view.visible_rows(ctx.self_id);
        let selected = ctx.selected.min(visible.len().saturating_sub(1));
        let block = Self::title_bar(view, ctx, visible.len());
        let inner = block.inner(data_area);
        frame.render_widget(block, data_area);

        let [section_area, table_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        frame.render_widget(
            Table::new(vec![section_row], constraints.clone()),
            section_area,
        );

        let rows = visible.iter().map(|ranked| {
            Self::row_cells(columns, ranked, ctx.localize)
                .into_iter()
                .map(Cell::from)
                .collect::<Row>()
                .height(1)
                .style(ctx.theme.text_color())
        });
        let table = Table::new(rows, constraints)
            .header(header)
            .row_highlight_style(ctx.theme.highlight_style());
        let mut state =
            TableState::new().with_selected((!visible.is_empty()).then_some(selected));
        frame.render_stateful_widget(table, table_area, &mut state);

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalLeft)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓")),
            scroll_area,
            &mut ScrollbarState::new(visible.len()).position(selected),
        );

        Ok((visible.len(), page_size))
    }
}
