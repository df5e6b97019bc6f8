// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use orgtop::cli::{generate_completions, Cli, Commands, TuiArgs};
use orgtop::config::Config;
use orgtop::Action;
use orgtop::App;
use orgtop::Dump;
use orgtop::Event;
use orgtop::Key;
use orgtop::KeyMap;
use orgtop::SnapshotSource;
use orgtop::StatsSource;
use orgtop::Tui;

use anyhow::anyhow;
use anyhow::Result;
use clap::{CommandFactory, Parser};
use ratatui::crossterm::event::KeyCode::{Backspace, Char};
use simplelog::{LevelFilter, WriteLogger};
use tokio::sync::mpsc;

use std::fs::File;
use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn get_action(app: &App, keymap: &KeyMap, event: Event) -> Action {
    match event {
        Event::Error => Action::None,
        Event::Render => Action::Render,
        Event::Paste(text) if app.filtering() => Action::InputEntry(text),
        Event::Key(key) => match key.code {
            Char(c) if app.filtering() => Action::InputEntry(c.to_string()),
            Backspace if app.filtering() => Action::Backspace,
            Char(c) => keymap.action(&Key::Char(c)),
            _ => keymap.action(&Key::Code(key.code)),
        },
        _ => Action::None,
    }
}

fn load_config(args: &TuiArgs) -> Config {
    let config = Config::load().unwrap_or_else(|e| {
        log::debug!("using default config: {e:#}");
        Config::default_config()
    });
    Config::merge_cli(&config, args)
}

fn snapshot_source(config: &Config) -> Result<SnapshotSource> {
    let path = config
        .data_path()
        .ok_or_else(|| anyhow!("no data path, pass --data or set data_path in the config"))?;
    Ok(SnapshotSource::new(path))
}

fn run_tui(args: &TuiArgs) -> Result<()> {
    let config = load_config(args);
    let source: Arc<dyn StatsSource> = Arc::new(snapshot_source(&config)?);
    let frame_rate_ms = config.frame_rate_ms();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let (action_tx, mut action_rx) = mpsc::unbounded_channel();

            let mut app = App::new(config, source, action_tx.clone());
            let keymap = app.keymap().clone();
            app.request_records();

            let mut tui = Tui::new(frame_rate_ms)?;
            tui.enter()?;

            loop {
                let e = tui.next().await?;
                let action = get_action(&app, &keymap, e);
                if action != Action::None {
                    action_tx.send(action)?;
                }

                while let Ok(action) = action_rx.try_recv() {
                    if let Action::Render = action {
                        tui.draw(|f| {
                            if let Err(e) = app.render(f) {
                                log::error!("render failed: {e:#}");
                            }
                        })?;
                    } else {
                        app.handle_action(&action)?;
                    }
                }

                if app.should_quit.load(Ordering::Relaxed) {
                    break;
                }
            }
            tui.exit()?;
            Ok(())
        })
}

fn main() -> Result<()> {
    if let Ok(log_path) = std::env::var("RUST_LOG_PATH") {
        let log_level = match std::env::var("RUST_LOG") {
            Ok(v) => LevelFilter::from_str(&v)?,
            Err(_) => LevelFilter::Info,
        };

        WriteLogger::init(
            log_level,
            simplelog::Config::default(),
            File::create(log_path)?,
        )?;

        log_panics::Config::new()
            .backtrace_mode(log_panics::BacktraceMode::Resolved)
            .install_panic_hook();
    };
    let args = Cli::parse();

    match args.command {
        Some(Commands::Tui(tui_args)) => run_tui(&tui_args),
        Some(Commands::Dump(dump_args)) => {
            let config = load_config(&dump_args.source);
            let source = snapshot_source(&config)?;
            let dump = Dump::from_args(&dump_args)?;
            let today = chrono::Local::now().date_naive();
            print!("{}", dump.run(&config, &source, today)?);
            Ok(())
        }
        Some(Commands::GenerateCompletions { shell, output }) => {
            generate_completions(Cli::command(), shell, output)
        }
        None => run_tui(&args.tui),
    }
}
