//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - reads the poll table
//! - runs the transformation pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{BuildArgs, Command, ShowArgs};
use crate::domain::{Coalition, PipelineConfig};
use crate::error::AppError;
use crate::io::{SnapshotFile, read_raw_table, read_snapshot_json, write_datasets_csv, write_snapshot_json};
use crate::report::{TableFilter, format_run_summary, format_table, select_columns};

pub mod pipeline;

/// Entry point for the `polls` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_build(args: BuildArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args);
    let raw = read_raw_table(&args.input)?;
    let run = pipeline::build_datasets(&raw, &config)?;

    if run.datasets.raw_polls.rows.is_empty() {
        warn!(cutoff = %config.cutoff, "no polls remain after normalization and the cutoff filter");
    }

    println!("{}", format_run_summary(&run, &config, args.decimals));

    // Optional exports.
    if let Some(dir) = &args.export_dir {
        for path in write_datasets_csv(dir, &run.datasets, args.decimals)? {
            info!(path = %path.display(), "wrote table");
        }
    }
    if let Some(path) = &args.export_json {
        write_snapshot_json(path, &SnapshotFile::new(&config, &run.datasets))?;
        info!(path = %path.display(), "wrote snapshot");
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let snapshot = read_snapshot_json(&args.snapshot)?;

    let filter = TableFilter {
        from: args.from,
        to: args.to,
        firm: args.firm.clone(),
    };
    let table = filter.apply(snapshot.tables.table(args.table));
    let columns = select_columns(&table, &args.columns).map_err(|e| AppError::new(2, e))?;

    println!("{}", format_table(&table, &columns, args.decimals));
    Ok(())
}

pub fn pipeline_config_from_args(args: &BuildArgs) -> PipelineConfig {
    PipelineConfig {
        cutoff: args.cutoff,
        threshold: args.threshold,
        window: args.window,
        coalitions: if args.coalitions.is_empty() {
            Coalition::defaults()
        } else {
            args.coalitions.clone()
        },
    }
}
