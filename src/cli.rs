// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.
use crate::{LookbackWindow, APP};

use anyhow::Result;
use clap::{Command, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io;

use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[clap(flatten)]
    pub tui: TuiArgs,
}

#[derive(Clone, Parser, Debug, Default)]
#[command(about = APP)]
pub struct TuiArgs {
    /// Snapshot file, or directory of `<days>.json` snapshots.
    #[arg(short = 'd', long, env = "ORGTOP_DATA")]
    pub data: Option<String>,
    /// Organization whose children are listed. Its own row is hidden.
    #[arg(short, long, env = "ORGTOP_ORGANIZATION_ID")]
    pub organization_id: Option<String>,
    /// Lookback window in days: 7, 14, 30 or 365.
    #[arg(short, long, value_parser = parse_lookback_days)]
    pub lookback_days: Option<u32>,
    /// Initial tab: all, general, activities, users or organizations.
    #[arg(short, long)]
    pub tab: Option<String>,
    /// Frame rate in milliseconds.
    #[arg(short = 'r', long, default_missing_value = "250")]
    pub frame_rate_ms: Option<usize>,
}

#[derive(Clone, Parser, Debug)]
#[command(about = "Prints one tab as plain text")]
pub struct DumpArgs {
    #[clap(flatten)]
    pub source: TuiArgs,
    /// Column to sort by, for example `missed` or `students`.
    #[arg(short, long)]
    pub sort: Option<String>,
    /// Sort ascending.
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,
    /// Sort descending.
    #[arg(long)]
    pub desc: bool,
    /// Only organizations whose name contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,
    /// Use thousands separators.
    #[arg(long, default_value_t = false)]
    pub localize: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Runs the orgtop TUI.
    Tui(TuiArgs),

    /// Prints one tab to stdout.
    Dump(DumpArgs),

    #[clap(hide = true)]
    GenerateCompletions {
        /// The shell type
        #[clap(short, long, default_value = "bash")]
        shell: Shell,
        /// Output file, stdout if not present
        #[arg(long, value_parser(clap::value_parser!(PathBuf)))]
        output: Option<PathBuf>,
    },
}

fn parse_lookback_days(s: &str) -> Result<u32, String> {
    let days: u32 = s.parse().map_err(|e| format!("{e}"))?;
    match LookbackWindow::from_days(days) {
        Some(window) => Ok(window.days()),
        None => Err("must be one of 7, 14, 30, 365".to_string()),
    }
}

/// Generates clap completions
pub fn generate_completions(mut app: Command, shell: Shell, output: Option<PathBuf>) -> Result<()> {
    let mut file: Box<dyn io::Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    generate(shell, &mut app, APP, &mut file);
    Ok(())
}
