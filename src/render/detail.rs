// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::cell::{CellValue, Trend};
use crate::metrics::Row;
use crate::tab::TabView;
use crate::{AppTheme, LookbackWindow};
use anyhow::Result;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Sparkline, Wrap};
use ratatui::Frame;

const SPARKLINE_MAX: u64 = 100;

/// Renderer for the selected organization's detail pane
pub struct DetailRenderer;

impl DetailRenderer {
    /// Header and detail text of every column that has one.
    pub fn detail_lines(view: &TabView, row: &Row, window: LookbackWindow) -> Vec<String> {
        view.columns()
            .all_columns()
            .iter()
            .filter_map(|col| col.detail(row, window))
            .collect()
    }

    /// Scales both periods against their common maximum.
    pub fn sparkline_data(trend: &Trend) -> (Vec<u64>, Vec<u64>) {
        let max = trend
            .current
            .iter()
            .chain(trend.previous.iter())
            .copied()
            .fold(0.0_f64, f64::max);
        let scale = |values: &[f64]| -> Vec<u64> {
            values
                .iter()
                .map(|v| {
                    if max > 0.0 {
                        (v.max(0.0) / max * SPARKLINE_MAX as f64).round() as u64
                    } else {
                        0
                    }
                })
                .collect()
        };
        (scale(&trend.current), scale(&trend.previous))
    }

    fn trends<'a>(
        view: &TabView,
        row: &'a Row,
        window: LookbackWindow,
    ) -> Vec<(String, &'a Trend)> {
        view.columns()
            .all_columns()
            .iter()
            .filter_map(|col| match row.get(col.key) {
                Some(CellValue::Trend(trend)) => Some((col.header(window), trend)),
                _ => None,
            })
            .collect()
    }

    fn render_trend(
        frame: &mut Frame,
        area: Rect,
        title: String,
        trend: &Trend,
        theme: &AppTheme,
    ) {
        let (current, previous) = Self::sparkline_data(trend);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style())
            .title_top(Line::from(title).style(theme.title_style()).left_aligned())
            .title_bottom(
                Line::from(vec![
                    Span::styled("current", theme.sparkline_style()),
                    Span::raw(" / "),
                    Span::styled("previous", theme.previous_sparkline_style()),
                ])
                .right_aligned(),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [current_area, previous_area] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inner);
        frame.render_widget(
            Sparkline::default()
                .data(&current)
                .max(SPARKLINE_MAX)
                .style(theme.sparkline_style()),
            current_area,
        );
        frame.render_widget(
            Sparkline::default()
                .data(&previous)
                .max(SPARKLINE_MAX)
                .style(theme.previous_sparkline_style()),
            previous_area,
        );
    }

    /// Renders the detail pane for `row`, or a hint when nothing is selected.
    pub fn render_detail(
        frame: &mut Frame,
        area: Rect,
        view: &TabView,
        row: Option<&Row>,
        window: LookbackWindow,
        theme: &AppTheme,
    ) -> Result<()> {
        let Some(row) = row else {
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(theme.border_style());
            frame.render_widget(
                Paragraph::new("No organization selected").block(block),
                area,
            );
            return Ok(());
        };

        let trends = Self::trends(view, row, window);
        let text_height = if trends.is_empty() {
            area.height
        } else {
            area.height / 2
        };
        let [text_area, chart_area] =
            Layout::vertical([Constraint::Length(text_height), Constraint::Min(0)]).areas(area);

        let lines = Self::detail_lines(view, row, window);
        let lines: Vec<Line> = if lines.is_empty() {
            vec![Line::from("No details for this tab")]
        } else {
            lines.into_iter().map(Line::from).collect()
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style())
            .title_top(Line::from(row.name.clone()).style(theme.title_style()).centered());
        frame.render_widget(
            Paragraph::new(lines)
                .style(theme.text_color())
                .wrap(Wrap { trim: true })
                .block(block),
            text_area,
        );

        if !trends.is_empty() {
            let areas = Layout::horizontal(vec![
                Constraint::Ratio(1, trends.len() as u32);
                trends.len()
            ])
            .split(chart_area);
            for ((title, trend), area) in trends.into_iter().zip(areas.iter()) {
                Self::render_trend(frame, *area, title, trend, theme);
            }
        }

        Ok(())
    }
}
