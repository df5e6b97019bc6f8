// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use crate::cli::TuiArgs;
use crate::AppTheme;
use crate::KeyMap;
use crate::LookbackWindow;
use crate::Tab;
use crate::APP;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use xdg;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// TUI theme.
    theme: Option<AppTheme>,
    /// Frame rate in milliseconds.
    frame_rate_ms: Option<usize>,
    /// Lookback window in days.
    lookback_days: Option<u32>,
    /// Tab shown on start.
    default_tab: Option<String>,
    /// Snapshot file or directory.
    data_path: Option<String>,
    /// Organization whose children are listed.
    organization_id: Option<String>,
    /// Key name to action name overrides.
    keymap: Option<HashMap<String, String>>,
}

pub fn get_config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP)?;
    let config_path = xdg_dirs.get_config_file(format!("{APP}.toml"));
    Ok(config_path)
}

impl Config {
    /// App theme.
    pub fn theme(&self) -> &AppTheme {
        match &self.theme {
            Some(theme) => theme,
            None => &AppTheme::Default,
        }
    }

    /// Set the app theme.
    pub fn set_theme(&mut self, theme: AppTheme) {
        self.theme = Some(theme);
    }

    /// Frame rate in milliseconds.
    pub fn frame_rate_ms(&self) -> usize {
        self.frame_rate_ms.unwrap_or(250)
    }

    /// Lookback window, unknown day counts fall back to 14 days.
    pub fn lookback(&self) -> LookbackWindow {
        match self.lookback_days {
            Some(days) => LookbackWindow::from_days(days).unwrap_or_else(|| {
                log::warn!("unsupported lookback of {days} days, using 14");
                LookbackWindow::default()
            }),
            None => LookbackWindow::default(),
        }
    }

    pub fn set_lookback(&mut self, window: LookbackWindow) {
        self.lookback_days = Some(window.days());
    }

    /// Tab shown on start.
    pub fn default_tab(&self) -> Tab {
        match &self.default_tab {
            Some(tab) => tab.parse().unwrap_or_else(|e| {
                log::warn!("{e}, using all");
                Tab::default()
            }),
            None => Tab::default(),
        }
    }

    pub fn set_default_tab(&mut self, tab: Tab) {
        self.default_tab = Some(tab.id().to_string());
    }

    /// Snapshot file or directory.
    pub fn data_path(&self) -> Option<&str> {
        self.data_path.as_deref()
    }

    /// Organization whose children are listed.
    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    /// Default keymap with the configured overrides, or the default keymap
    /// when an override does not parse.
    pub fn active_keymap(&self) -> KeyMap {
        match &self.keymap {
            Some(overrides) => KeyMap::with_overrides(overrides).unwrap_or_else(|e| {
                log::warn!("ignoring keymap overrides: {e}");
                KeyMap::default()
            }),
            None => KeyMap::default(),
        }
    }

    /// Returns a config with nothing set.
    pub fn empty_config() -> Config {
        Config::default()
    }

    /// Returns the default config.
    pub fn default_config() -> Config {
        let mut config = Config::empty_config();
        config.frame_rate_ms = Some(config.frame_rate_ms());
        config.lookback_days = Some(config.lookback().days());
        config.default_tab = Some(config.default_tab().id().to_string());
        config
    }

    /// Loads the config from XDG configuration.
    pub fn load() -> Result<Config> {
        Config::load_from(&get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Merges a Config with the CLI arguments, CLI values win.
    pub fn merge_cli(config: &Config, args: &TuiArgs) -> Config {
        let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();
        Config {
            theme: config.theme.clone(),
            frame_rate_ms: Some(args.frame_rate_ms.unwrap_or(config.frame_rate_ms())),
            lookback_days: args.lookback_days.or(config.lookback_days),
            default_tab: non_empty(&args.tab).or_else(|| config.default_tab.clone()),
            data_path: non_empty(&args.data).or_else(|| config.data_path.clone()),
            organization_id: non_empty(&args.organization_id)
                .or_else(|| config.organization_id.clone()),
            keymap: config.keymap.clone(),
        }
    }

    /// Saves the current config.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let config_str = toml::to_string(&self)?;
        fs::write(path, config_str).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::empty_config();
        assert_eq!(config.frame_rate_ms(), 250);
        assert_eq!(config.lookback(), LookbackWindow::TwoWeeks);
        assert_eq!(config.default_tab(), Tab::All);
        assert_eq!(config.theme(), &AppTheme::Default);
        assert!(config.data_path().is_none());
    }

    #[test]
    fn test_invalid_lookback_falls_back() {
        let config: Config = toml::from_str("lookback_days = 9").unwrap();
        assert_eq!(config.lookback(), LookbackWindow::TwoWeeks);
        let config: Config = toml::from_str("lookback_days = 365").unwrap();
        assert_eq!(config.lookback(), LookbackWindow::Year);
    }

    #[test]
    fn test_merge_cli_prefers_cli() {
        let config: Config =
            toml::from_str("lookback_days = 30\ndefault_tab = \"users\"\ndata_path = \"/a\"")
                .unwrap();
        let args = TuiArgs {
            lookback_days: Some(7),
            data: Some(String::new()),
            ..Default::default()
        };
        let merged = Config::merge_cli(&config, &args);
        assert_eq!(merged.lookback(), LookbackWindow::Week);
        assert_eq!(merged.default_tab(), Tab::Users);
        assert_eq!(merged.data_path(), Some("/a"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orgtop.toml");
        let mut config = Config::default_config();
        config.set_theme(AppTheme::Chalkboard);
        config.set_lookback(LookbackWindow::Month);
        config.set_default_tab(Tab::Organizations);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme(), &AppTheme::Chalkboard);
        assert_eq!(loaded.lookback(), LookbackWindow::Month);
        assert_eq!(loaded.default_tab(), Tab::Organizations);
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_keymap_overrides() {
        let config: Config = toml::from_str("[keymap]\nx = \"Quit\"").unwrap();
        assert_eq!(config.active_keymap().action(&crate::Key::Char('x')), crate::Action::Quit);
        let config: Config = toml::from_str("[keymap]\nx = \"Nope\"").unwrap();
        assert_eq!(config.active_keymap(), KeyMap::default());
    }
}
