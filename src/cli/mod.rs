//! Command-line parsing for the poll series builder.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the transformation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{Coalition, PipelineConfig, TableKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "polls",
    version,
    about = "Opinion poll series: cross-firm averages, coalitions, and threshold reapportionment"
)]
pub struct Cli {
    /// Debug logging on stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the four poll tables from a CSV poll table, print a summary, and optionally export.
    Build(BuildArgs),
    /// Print one table from a previously exported snapshot, optionally sliced.
    Show(ShowArgs),
}

/// Options for building the tables.
#[derive(Debug, Parser, Clone)]
pub struct BuildArgs {
    /// Poll table as CSV (one header row, one row per poll).
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Drop polls whose fieldwork ended before this date (YYYY-MM-DD).
    #[arg(long, env = "POLLS_CUTOFF", default_value_t = PipelineConfig::default_cutoff())]
    pub cutoff: NaiveDate,

    /// Electoral threshold in percentage points.
    #[arg(long, env = "POLLS_THRESHOLD", default_value_t = PipelineConfig::DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Rolling window (number of poll dates) for the averages.
    #[arg(long, env = "POLLS_WINDOW", default_value_t = PipelineConfig::DEFAULT_WINDOW)]
    pub window: usize,

    /// Coalition column as NAME=PARTY+PARTY (repeatable; replaces the default set).
    #[arg(long = "coalition", value_name = "NAME=PARTIES")]
    pub coalitions: Vec<Coalition>,

    /// Write the four tables as CSV files into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Write a JSON snapshot of the run (readable by `polls show`).
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Decimal places for printed and exported values.
    #[arg(long, default_value_t = 1)]
    pub decimals: usize,
}

/// Options for printing a saved table.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Snapshot JSON produced by `polls build --export-json`.
    #[arg(long, value_name = "JSON")]
    pub snapshot: PathBuf,

    /// Which table to print.
    #[arg(long, value_enum, default_value_t = TableKind::RawAverage)]
    pub table: TableKind,

    /// First fieldwork date to include (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last fieldwork date to include (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Only polls by this firm (per-poll tables only).
    #[arg(long)]
    pub firm: Option<String>,

    /// Party code or coalition name to print (repeatable; default: all).
    #[arg(long = "column", value_name = "LABEL")]
    pub columns: Vec<String>,

    /// Decimal places for printed values.
    #[arg(long, default_value_t = 1)]
    pub decimals: usize,
}
