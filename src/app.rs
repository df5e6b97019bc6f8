// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::config::Config;
use crate::render::{DetailRenderer, TableContext, TableRenderer};
use crate::tab::TabView;
use crate::{
    Action, AppState, AppTheme, Fetcher, KeyMap, LoadFailedAction, LookbackWindow,
    RecordsLoadedAction, Row, StatsSource, Tab, TabShell, LICENSE,
};

use anyhow::Result;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Tabs};
use ratatui::Frame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Cursor position inside one tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cursor {
    selected: usize,
    focused_column: usize,
}

/// App is the struct for orgtop application state.
pub struct App {
    config: Config,
    keymap: KeyMap,
    state: AppState,
    prev_state: AppState,
    theme: AppTheme,
    shell: TabShell,
    fetcher: Fetcher,
    organization_id: Option<String>,
    pub should_quit: Arc<AtomicBool>,

    filtering: bool,
    cursors: Vec<Cursor>,
    show_detail: bool,
    localize: bool,
    page_size: u16,
    loading: bool,
    status: Option<String>,
}

impl App {
    /// Creates a new App. Lookback changes are turned into record requests
    /// on `action_tx`.
    pub fn new(
        config: Config,
        source: Arc<dyn StatsSource>,
        action_tx: UnboundedSender<Action>,
    ) -> Self {
        let organization_id = config.organization_id().map(String::from);
        let fetcher = Fetcher::new(source, organization_id.clone(), action_tx.clone());
        let on_change_lookback = Box::new(move |window: LookbackWindow| {
            if let Err(e) = action_tx.send(Action::RequestRecords(window)) {
                log::debug!("dropping lookback change: {e}");
            }
        });
        let shell = TabShell::new(config.default_tab(), config.lookback(), on_change_lookback);

        Self {
            keymap: config.active_keymap(),
            theme: config.theme().clone(),
            config,
            state: AppState::Default,
            prev_state: AppState::Default,
            shell,
            fetcher,
            organization_id,
            should_quit: Arc::new(AtomicBool::new(false)),
            filtering: false,
            cursors: vec![Cursor::default(); Tab::ALL.len()],
            show_detail: false,
            localize: true,
            page_size: 1,
            loading: false,
            status: None,
        }
    }

    /// Fetches records for the current lookback window.
    pub fn request_records(&mut self) {
        self.loading = true;
        self.fetcher.request(self.shell.lookback());
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn theme(&self) -> &AppTheme {
        &self.theme
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shell(&self) -> &TabShell {
        &self.shell
    }

    /// Whether key presses go to the filter input.
    pub fn filtering(&self) -> bool {
        self.filtering
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn showing_detail(&self) -> bool {
        self.show_detail
    }

    pub fn localize(&self) -> bool {
        self.localize
    }

    /// Selected row index within the visible rows of the active tab.
    pub fn selected(&self) -> usize {
        self.cursor().selected
    }

    pub fn focused_column(&self) -> usize {
        self.cursor().focused_column
    }

    fn cursor(&self) -> &Cursor {
        &self.cursors[self.shell.active_tab().index()]
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursors[self.shell.active_tab().index()]
    }

    fn visible_count(&self) -> usize {
        self.shell
            .active_view()
            .visible_rows(self.organization_id.as_deref())
            .len()
    }

    /// Keeps every tab's selection inside its visible rows.
    fn clamp_cursors(&mut self) {
        for tab in Tab::ALL {
            let len = self
                .shell
                .view(tab)
                .visible_rows(self.organization_id.as_deref())
                .len();
            let cursor = &mut self.cursors[tab.index()];
            cursor.selected = cursor.selected.min(len.saturating_sub(1));
        }
    }

    fn set_state(&mut self, state: AppState) {
        self.prev_state = self.state.clone();
        self.state = state;
    }

    fn select_tab(&mut self, tab: Tab) {
        self.filtering = false;
        self.shell.select(tab);
    }

    fn filter_query(&self) -> String {
        self.shell.active_view().grid().filter_state().query.clone()
    }

    fn set_filter(&mut self, query: &str) {
        self.shell.active_view_mut().grid_mut().set_filter(query);
        self.cursor_mut().selected = 0;
    }

    fn on_up(&mut self) {
        let cursor = self.cursor_mut();
        cursor.selected = cursor.selected.saturating_sub(1);
    }

    fn on_down(&mut self) {
        let last = self.visible_count().saturating_sub(1);
        let cursor = self.cursor_mut();
        cursor.selected = (cursor.selected + 1).min(last);
    }

    fn on_pg_up(&mut self) {
        let page = self.page_size as usize;
        let cursor = self.cursor_mut();
        cursor.selected = cursor.selected.saturating_sub(page);
    }

    fn on_pg_down(&mut self) {
        let page = self.page_size as usize;
        let last = self.visible_count().saturating_sub(1);
        let cursor = self.cursor_mut();
        cursor.selected = (cursor.selected + page).min(last);
    }

    fn on_next_column(&mut self) {
        let len = self.shell.active_view().columns().len().max(1);
        let cursor = self.cursor_mut();
        cursor.focused_column = (cursor.focused_column + 1) % len;
    }

    fn on_prev_column(&mut self) {
        let len = self.shell.active_view().columns().len().max(1);
        let cursor = self.cursor_mut();
        cursor.focused_column = (cursor.focused_column + len - 1) % len;
    }

    fn on_toggle_sort(&mut self) {
        let view = self.shell.active_view();
        let Some(column) = view.columns().all_columns().get(self.focused_column()) else {
            return;
        };
        let key = column.key;
        let header = column.header(self.shell.applied_lookback());
        if self.shell.active_view_mut().toggle_sort(key) {
            self.status = None;
        } else {
            self.status = Some(format!("{header} cannot be sorted"));
        }
    }

    fn on_change_lookback(&mut self, window: LookbackWindow) {
        if !self.shell.active_tab().shows_period_selector() {
            return;
        }
        if self.shell.set_lookback(window) {
            log::debug!("lookback changed to {window}");
        }
    }

    fn on_records_loaded(&mut self, loaded: &RecordsLoadedAction) {
        if loaded.window != self.shell.lookback() {
            log::info!(
                "discarding snapshot for {}, current lookback is {}",
                loaded.window,
                self.shell.lookback()
            );
            return;
        }
        self.loading = false;
        self.status = None;
        self.shell.update_records(loaded.window, Arc::clone(&loaded.records));
        self.clamp_cursors();
    }

    fn on_load_failed(&mut self, failed: &LoadFailedAction) {
        if failed.window != self.shell.lookback() {
            log::info!(
                "discarding failure for {}, current lookback is {}",
                failed.window,
                self.shell.lookback()
            );
            return;
        }
        self.loading = false;
        self.status = Some(format!("Failed to load statistics: {}", failed.message));
        if self.shell.revert_lookback() {
            log::debug!("lookback reverted to {}", self.shell.lookback());
        }
    }

    fn on_escape(&mut self) {
        if self.state == AppState::Help {
            self.set_state(AppState::Default);
        } else if self.filtering {
            self.filtering = false;
            self.set_filter("");
        } else if self.show_detail {
            self.show_detail = false;
        } else {
            self.should_quit.store(true, Ordering::Relaxed);
        }
    }

    fn on_enter(&mut self) {
        if self.filtering {
            self.filtering = false;
        } else {
            self.show_detail = !self.show_detail;
        }
    }

    fn save_config(&mut self) {
        self.config.set_theme(self.theme.clone());
        self.config.set_lookback(self.shell.lookback());
        self.config.set_default_tab(self.shell.active_tab());
        match self.config.save() {
            Ok(()) => self.status = Some("Config saved".to_string()),
            Err(e) => {
                log::error!("failed to save config: {e:#}");
                self.status = Some(format!("Failed to save config: {e:#}"));
            }
        }
    }

    /// Updates app state when an action is received.
    pub fn handle_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => match self.state {
                AppState::Help => self.set_state(AppState::Default),
                _ => self.should_quit.store(true, Ordering::Relaxed),
            },
            Action::SetState(state) => {
                if *state == self.state {
                    self.set_state(self.prev_state.clone());
                } else {
                    self.set_state(state.clone());
                }
            }
            Action::SelectTab(tab) => self.select_tab(*tab),
            Action::NextTab => self.select_tab(self.shell.active_tab().next()),
            Action::PrevTab => self.select_tab(self.shell.active_tab().prev()),
            Action::Filter => {
                self.filtering = true;
            }
            Action::InputEntry(input) => {
                if self.filtering {
                    let mut query = self.filter_query();
                    query.push_str(input);
                    self.set_filter(&query);
                }
            }
            Action::Backspace => {
                if self.filtering {
                    let mut query = self.filter_query();
                    query.pop();
                    self.set_filter(&query);
                }
            }
            Action::Esc => self.on_escape(),
            Action::Enter => self.on_enter(),
            Action::Up => self.on_up(),
            Action::Down => self.on_down(),
            Action::PageUp => self.on_pg_up(),
            Action::PageDown => self.on_pg_down(),
            Action::NextColumn => self.on_next_column(),
            Action::PrevColumn => self.on_prev_column(),
            Action::ToggleSort => self.on_toggle_sort(),
            Action::NextLookback => self.on_change_lookback(self.shell.lookback().next()),
            Action::PrevLookback => self.on_change_lookback(self.shell.lookback().prev()),
            Action::RequestRecords(window) => {
                if *window == self.shell.lookback() {
                    self.loading = true;
                    self.fetcher.request(*window);
                }
            }
            Action::Reload => self.request_records(),
            Action::RecordsLoaded(loaded) => self.on_records_loaded(loaded),
            Action::LoadFailed(failed) => self.on_load_failed(failed),
            Action::ChangeTheme => {
                self.theme = self.theme.next();
            }
            Action::ToggleLocalization => {
                self.localize = !self.localize;
            }
            Action::SaveConfig => self.save_config(),
            Action::Render | Action::None => {}
        }
        Ok(())
    }

    /// Renders the application to the frame.
    pub fn render(&mut self, frame: &mut Frame) -> Result<()> {
        match self.state {
            AppState::Help => self.render_help(frame),
            AppState::Default => self.render_default(frame),
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| format!("{} {}", i + 1, tab.label()));
        let tabs = Tabs::new(titles)
            .select(self.shell.active_tab().index())
            .style(self.theme.text_color())
            .highlight_style(self.theme.title_style().add_modifier(Modifier::BOLD))
            .divider("|");
        frame.render_widget(tabs, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match (&self.status, self.loading) {
            (Some(status), _) => Line::from(Span::styled(
                status.clone(),
                Style::default().fg(self.theme.text_important_color()),
            )),
            (None, true) => Line::from(Span::styled(
                format!("Loading {}...", self.shell.lookback().label()),
                self.theme.text_color(),
            )),
            (None, false) => Line::from(vec![
                Span::styled(
                    self.keymap.action_keys_string(&Action::SetState(AppState::Help)),
                    self.theme.text_important_color(),
                ),
                Span::styled(": help", self.theme.text_color()),
            ]),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn selected_row<'a>(&self, view: &'a TabView) -> Option<&'a Row> {
        view.visible_rows(self.organization_id.as_deref())
            .get(self.selected())
            .map(|ranked| ranked.row)
    }

    fn render_default(&mut self, frame: &mut Frame) -> Result<()> {
        let [tabs_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        self.render_tabs(frame, tabs_area);
        self.render_footer(frame, footer_area);

        let (table_area, detail_area) = if self.show_detail {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(body_area);
            (left, Some(right))
        } else {
            (body_area, None)
        };

        let window = self.shell.applied_lookback();
        let view = self.shell.active_view();
        let query = view.grid().filter_state().query.clone();
        let ctx = TableContext {
            window,
            focused_column: self.focused_column(),
            selected: self.selected(),
            filtering: self.filtering,
            input_buffer: &query,
            self_id: self.organization_id.as_deref(),
            localize: self.localize,
            theme: &self.theme,
        };
        let (_, page_size) = TableRenderer::render_table(frame, table_area, view, &ctx)?;

        if let Some(area) = detail_area {
            let row = self.selected_row(view);
            DetailRenderer::render_detail(frame, area, view, row, window, &self.theme)?;
        }

        self.page_size = page_size;
        Ok(())
    }

    fn help_line(&self, action: Action, text: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                self.keymap.action_keys_string(&action),
                self.theme.text_important_color(),
            ),
            Span::styled(format!(": {text}"), self.theme.text_color()),
        ])
    }

    fn render_help(&mut self, frame: &mut Frame) -> Result<()> {
        let area = frame.area();
        let tab_keys = Tab::ALL
            .iter()
            .map(|tab| self.keymap.action_keys_string(&Action::SelectTab(*tab)))
            .collect::<Vec<_>>()
            .join("/");

        let mut text: Vec<Line> = LICENSE
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().add_modifier(Modifier::ITALIC))))
            .collect();
        text.extend([
            Line::from(""),
            Line::from(Span::styled("Key Bindings:", self.theme.title_style())),
            self.help_line(
                Action::SetState(AppState::Help),
                "(press to exit help)",
            ),
            self.help_line(Action::Quit, "quit"),
            Line::from(vec![
                Span::styled(tab_keys, self.theme.text_important_color()),
                Span::styled(": select tab", self.theme.text_color()),
            ]),
            self.help_line(Action::NextTab, "next tab"),
            self.help_line(Action::PrevTab, "previous tab"),
            self.help_line(Action::Up, "list scroll up"),
            self.help_line(Action::Down, "list scroll down"),
            self.help_line(Action::PageUp, "list scroll page up"),
            self.help_line(Action::PageDown, "list scroll page down"),
            self.help_line(Action::NextColumn, "focus next column"),
            self.help_line(Action::PrevColumn, "focus previous column"),
            self.help_line(Action::ToggleSort, "sort by focused column, again to reverse"),
            self.help_line(Action::Filter, "filter by academy name"),
            self.help_line(Action::Enter, "show organization details"),
            self.help_line(Action::Esc, "clear filter / close details"),
            self.help_line(Action::NextLookback, "next lookback window"),
            self.help_line(Action::PrevLookback, "previous lookback window"),
            self.help_line(Action::Reload, "reload statistics"),
            self.help_line(Action::ToggleLocalization, "toggle number grouping"),
            self.help_line(Action::ChangeTheme, "change theme"),
            self.help_line(Action::SaveConfig, "save config"),
        ]);
        if let Some(path) = self.config.data_path() {
            text.push(Line::from(""));
            text.push(Line::from(format!("Data: {path}")));
        }

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border_style())
            .title_top(Line::from("Help").style(self.theme.title_style()).centered());
        frame.render_widget(Paragraph::new(text).block(block), area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookback::QueryWindow;
    use crate::org_data::OrganizationRecord;
    use chrono::Utc;
    use tokio::sync::mpsc;

    struct EmptySource;

    impl StatsSource for EmptySource {
        fn fetch(
            &self,
            _organization_id: Option<&str>,
            _query: &QueryWindow,
        ) -> Result<Vec<OrganizationRecord>> {
            Ok(Vec::new())
        }
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(Config::default_config(), Arc::new(EmptySource), tx);
        (app, rx)
    }

    fn records(names: &[&str]) -> Arc<Vec<OrganizationRecord>> {
        Arc::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| OrganizationRecord::new(&format!("org{i}"), name, Utc::now()))
                .collect(),
        )
    }

    #[test]
    fn test_help_toggles() {
        let (mut app, _rx) = test_app();
        app.handle_action(&Action::SetState(AppState::Help)).unwrap();
        assert_eq!(app.state(), AppState::Help);
        app.handle_action(&Action::SetState(AppState::Help)).unwrap();
        assert_eq!(app.state(), AppState::Default);

        app.handle_action(&Action::SetState(AppState::Help)).unwrap();
        app.handle_action(&Action::Quit).unwrap();
        assert_eq!(app.state(), AppState::Default);
        assert!(!app.should_quit.load(Ordering::Relaxed));
        app.handle_action(&Action::Quit).unwrap();
        assert!(app.should_quit.load(Ordering::Relaxed));
    }

    #[test]
    fn test_navigation_is_bounded() {
        let (mut app, _rx) = test_app();
        app.handle_action(&Action::RecordsLoaded(RecordsLoadedAction {
            window: LookbackWindow::TwoWeeks,
            records: records(&["a", "b", "c"]),
        }))
        .unwrap();
        app.handle_action(&Action::Up).unwrap();
        assert_eq!(app.selected(), 0);
        for _ in 0..5 {
            app.handle_action(&Action::Down).unwrap();
        }
        assert_eq!(app.selected(), 2);
        app.handle_action(&Action::PageUp).unwrap();
        assert_eq!(app.selected(), 1);
    }

    #[test]
    fn test_column_focus_wraps() {
        let (mut app, _rx) = test_app();
        app.handle_action(&Action::PrevColumn).unwrap();
        let len = app.shell().active_view().columns().len();
        assert_eq!(app.focused_column(), len - 1);
        app.handle_action(&Action::NextColumn).unwrap();
        assert_eq!(app.focused_column(), 0);
    }

    #[test]
    fn test_filter_input() {
        let (mut app, _rx) = test_app();
        app.handle_action(&Action::InputEntry("x".into())).unwrap();
        assert_eq!(app.filter_query(), "");

        app.handle_action(&Action::Filter).unwrap();
        app.handle_action(&Action::InputEntry("a".into())).unwrap();
        app.handle_action(&Action::InputEntry("b".into())).unwrap();
        app.handle_action(&Action::Backspace).unwrap();
        assert_eq!(app.filter_query(), "a");

        app.handle_action(&Action::Enter).unwrap();
        assert!(!app.filtering());
        assert_eq!(app.filter_query(), "a");

        app.handle_action(&Action::Filter).unwrap();
        app.handle_action(&Action::Esc).unwrap();
        assert!(!app.filtering());
        assert_eq!(app.filter_query(), "");
    }

    #[test]
    fn test_escape_closes_detail_before_quitting() {
        let (mut app, _rx) = test_app();
        app.handle_action(&Action::Enter).unwrap();
        assert!(app.showing_detail());
        app.handle_action(&Action::Esc).unwrap();
        assert!(!app.showing_detail());
        assert!(!app.should_quit.load(Ordering::Relaxed));
        app.handle_action(&Action::Esc).unwrap();
        assert!(app.should_quit.load(Ordering::Relaxed));
    }

    #[test]
    fn test_tabs_keep_their_own_cursor() {
        let (mut app, _rx) = test_app();
        app.handle_action(&Action::NextColumn).unwrap();
        app.handle_action(&Action::SelectTab(Tab::Users)).unwrap();
        assert_eq!(app.focused_column(), 0);
        app.handle_action(&Action::PrevTab).unwrap();
        assert_eq!(app.shell().active_tab(), Tab::Activities);
        app.handle_action(&Action::SelectTab(Tab::All)).unwrap();
        assert_eq!(app.focused_column(), 1);
    }
}
