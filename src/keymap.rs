// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::Action;
use crate::AppState;
use crate::Tab;
use anyhow::anyhow;
use anyhow::Result;
use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Eq, Hash, PartialOrd, PartialEq)]
pub enum Key {
    Char(char),
    Code(KeyCode),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Code(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyMap {
    bindings: HashMap<Key, Action>,
}

impl Default for KeyMap {
    /// Returns the default keymap.
    fn default() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Key::Char('f'), Action::Filter);
        bindings.insert(Key::Char('/'), Action::Filter);
        bindings.insert(Key::Char('h'), Action::SetState(AppState::Help));
        bindings.insert(Key::Char('?'), Action::SetState(AppState::Help));
        bindings.insert(Key::Char('q'), Action::Quit);
        bindings.insert(Key::Char('Q'), Action::Quit);
        bindings.insert(Key::Char('t'), Action::ChangeTheme);
        bindings.insert(Key::Char('L'), Action::ToggleLocalization);
        bindings.insert(Key::Char('S'), Action::SaveConfig);
        bindings.insert(Key::Char('r'), Action::Reload);
        bindings.insert(Key::Char('s'), Action::ToggleSort);
        bindings.insert(Key::Char(']'), Action::NextLookback);
        bindings.insert(Key::Char('['), Action::PrevLookback);
        for (i, tab) in Tab::ALL.iter().enumerate() {
            if let Some(c) = char::from_digit(i as u32 + 1, 10) {
                bindings.insert(Key::Char(c), Action::SelectTab(*tab));
            }
        }
        bindings.insert(Key::Code(KeyCode::Tab), Action::NextTab);
        bindings.insert(Key::Code(KeyCode::BackTab), Action::PrevTab);
        bindings.insert(Key::Code(KeyCode::Right), Action::NextColumn);
        bindings.insert(Key::Code(KeyCode::Left), Action::PrevColumn);
        bindings.insert(Key::Code(KeyCode::Down), Action::Down);
        bindings.insert(Key::Code(KeyCode::Up), Action::Up);
        bindings.insert(Key::Code(KeyCode::PageDown), Action::PageDown);
        bindings.insert(Key::Code(KeyCode::PageUp), Action::PageUp);
        bindings.insert(Key::Code(KeyCode::Enter), Action::Enter);
        bindings.insert(Key::Code(KeyCode::Esc), Action::Esc);
        bindings.insert(Key::Code(KeyCode::Backspace), Action::Backspace);

        Self { bindings }
    }
}

impl KeyMap {
    /// Default bindings with `overrides` (key name to action name) applied.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<KeyMap> {
        let mut keymap = KeyMap::default();
        for (key, action) in overrides {
            keymap.insert(parse_key(key)?, parse_action(action)?);
        }
        Ok(keymap)
    }

    /// Maps the Key to an Action.
    pub fn action(&self, key: &Key) -> Action {
        self.bindings.get(key).cloned().unwrap_or(Action::None)
    }

    /// Inserts a Key mapping for an Action.
    pub fn insert(&mut self, key: Key, action: Action) {
        self.bindings.insert(key, action);
    }

    /// Returns the Keys for an Action, sorted for stable display.
    pub fn action_keys(&self, action: &Action) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(_, bound)| *bound == action)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }

    /// Returns a String of the keys for an Action.
    pub fn action_keys_string(&self, action: &Action) -> String {
        self.action_keys(action)
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialOrd, PartialEq, Serialize, Deserialize)]
pub enum KeyCodeWrapper {
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    BackTab,
    Enter,
    Esc,
    Delete,
    Insert,
    F(u8),
}

impl From<KeyCodeWrapper> for KeyCode {
    fn from(keycode_wrapper: KeyCodeWrapper) -> Self {
        match keycode_wrapper {
            KeyCodeWrapper::Backspace => KeyCode::Backspace,
            KeyCodeWrapper::Left => KeyCode::Left,
            KeyCodeWrapper::Right => KeyCode::Right,
            KeyCodeWrapper::Up => KeyCode::Up,
            KeyCodeWrapper::Down => KeyCode::Down,
            KeyCodeWrapper::Home => KeyCode::Home,
            KeyCodeWrapper::End => KeyCode::End,
            KeyCodeWrapper::PageUp => KeyCode::PageUp,
            KeyCodeWrapper::PageDown => KeyCode::PageDown,
            KeyCodeWrapper::Tab => KeyCode::Tab,
            KeyCodeWrapper::BackTab => KeyCode::BackTab,
            KeyCodeWrapper::Enter => KeyCode::Enter,
            KeyCodeWrapper::Esc => KeyCode::Esc,
            KeyCodeWrapper::Delete => KeyCode::Delete,
            KeyCodeWrapper::Insert => KeyCode::Insert,
            KeyCodeWrapper::F(n) => KeyCode::F(n),
        }
    }
}

/// Parses a key from a string.
pub fn parse_key(key_str: &str) -> Result<Key> {
    let mut chars = key_str.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Key::Char(c));
    }
    let quoted = format!("\"{key_str}\"");
    if let Ok(keycode_wrapper) = serde_json::from_str::<KeyCodeWrapper>(&quoted) {
        return Ok(Key::Code(keycode_wrapper.into()));
    }
    match key_str.to_lowercase().as_str() {
        "page up" | "pageup" => Ok(Key::Code(KeyCode::PageUp)),
        "page down" | "pagedown" => Ok(Key::Code(KeyCode::PageDown)),
        "up" => Ok(Key::Code(KeyCode::Up)),
        "down" => Ok(Key::Code(KeyCode::Down)),
        "left" => Ok(Key::Code(KeyCode::Left)),
        "right" => Ok(Key::Code(KeyCode::Right)),
        "tab" => Ok(Key::Code(KeyCode::Tab)),
        "back tab" | "backtab" => Ok(Key::Code(KeyCode::BackTab)),
        "enter" => Ok(Key::Code(KeyCode::Enter)),
        "backspace" => Ok(Key::Code(KeyCode::Backspace)),
        "esc" | "escape" => Ok(Key::Code(KeyCode::Esc)),
        _ => Err(anyhow!("Invalid key: {}", key_str)),
    }
}

/// Parses an Action from a string.
pub fn parse_action(action_str: &str) -> Result<Action> {
    if let Some(tab) = action_str
        .strip_prefix("SelectTab(")
        .and_then(|s| s.strip_suffix(')'))
    {
        return Ok(Action::SelectTab(tab.parse()?));
    }
    match action_str {
        "AppStateDefault" | "SetState(Default)" => Ok(Action::SetState(AppState::Default)),
        "AppStateHelp" | "SetState(Help)" => Ok(Action::SetState(AppState::Help)),
        "Filter" => Ok(Action::Filter),
        "ToggleLocalization" => Ok(Action::ToggleLocalization),
        "ToggleSort" => Ok(Action::ToggleSort),
        "SaveConfig" => Ok(Action::SaveConfig),
        "Reload" => Ok(Action::Reload),
        "Quit" => Ok(Action::Quit),
        "ChangeTheme" => Ok(Action::ChangeTheme),
        "NextTab" => Ok(Action::NextTab),
        "PrevTab" => Ok(Action::PrevTab),
        "NextColumn" => Ok(Action::NextColumn),
        "PrevColumn" => Ok(Action::PrevColumn),
        "NextLookback" => Ok(Action::NextLookback),
        "PrevLookback" => Ok(Action::PrevLookback),
        "Down" => Ok(Action::Down),
        "Up" => Ok(Action::Up),
        "PageDown" => Ok(Action::PageDown),
        "PageUp" => Ok(Action::PageUp),
        "Enter" => Ok(Action::Enter),
        "Esc" => Ok(Action::Esc),
        "Backspace" => Ok(Action::Backspace),
        _ => Err(anyhow!("Invalid action: {}", action_str)),
    }
}
