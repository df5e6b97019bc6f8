// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum AppTheme {
    /// Default theme.
    #[default]
    Default,
    /// Dark theme with green text.
    Chalkboard,
    /// Blue on dark, low contrast borders.
    Classroom,
}

impl AppTheme {
    /// Returns the default text color for the theme.
    pub fn text_color(&self) -> Color {
        match self {
            AppTheme::Chalkboard => Color::Green,
            AppTheme::Classroom => Color::Blue,
            AppTheme::Default => Color::White,
        }
    }

    /// Returns the title text style for the theme.
    pub fn title_style(&self) -> Style {
        match self {
            AppTheme::Chalkboard => Style::default().fg(Color::White),
            AppTheme::Classroom => Style::default().fg(Color::Blue),
            AppTheme::Default => Style::default().fg(Color::Green),
        }
    }

    /// Returns the border style for the theme.
    pub fn border_style(&self) -> Style {
        match self {
            AppTheme::Chalkboard => Style::default().fg(Color::Green),
            AppTheme::Classroom => Style::default().fg(Color::DarkGray),
            AppTheme::Default => Style::default().fg(Color::White),
        }
    }

    /// Section captions above the column headers.
    pub fn section_style(&self) -> Style {
        self.title_style().add_modifier(Modifier::BOLD)
    }

    /// Header of the focused column.
    pub fn focus_style(&self) -> Style {
        Style::default()
            .fg(self.text_important_color())
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    /// Selected row.
    pub fn highlight_style(&self) -> Style {
        match self {
            AppTheme::Chalkboard => Style::default().bg(Color::DarkGray),
            AppTheme::Classroom => Style::default().bg(Color::Blue).fg(Color::White),
            AppTheme::Default => Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Returns the default text important color for the theme.
    pub fn text_important_color(&self) -> Color {
        match self {
            AppTheme::Chalkboard => Color::Red,
            AppTheme::Classroom => Color::White,
            AppTheme::Default => Color::Red,
        }
    }

    /// Color of a trend that went up or down.
    pub fn change_color(&self, change: Option<i64>) -> Color {
        match change {
            Some(c) if c > 0 => Color::Green,
            Some(c) if c < 0 => Color::Red,
            _ => self.text_color(),
        }
    }

    /// Returns the sparkline style for the current period.
    pub fn sparkline_style(&self) -> Style {
        match self {
            AppTheme::Chalkboard => Style::default().fg(Color::Green),
            AppTheme::Classroom => Style::default().fg(Color::Blue),
            AppTheme::Default => Style::default().fg(Color::Yellow),
        }
    }

    /// Sparkline style for the previous period.
    pub fn previous_sparkline_style(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    /// Returns the next theme.
    pub fn next(&self) -> Self {
        match self {
            AppTheme::Default => AppTheme::Chalkboard,
            AppTheme::Chalkboard => AppTheme::Classroom,
            AppTheme::Classroom => AppTheme::Default,
        }
    }
}
