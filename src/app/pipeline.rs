//! Shared "build pipeline" logic used by the CLI and by library callers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw rows -> normalize -> {raw, reapportioned} -> coalitions -> averages
//!
//! Nothing here performs I/O; callers hand in an already-extracted table.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::{Coalition, Datasets, PipelineConfig, PollRecord, PollTable, RawTable, TableKind, TableRow};
use crate::error::PipelineError;
use crate::transform::{
    DatedShares, NormalizedPolls, ReapportionOutcome, augment_rows, normalize_table, reapportion, rolling_average,
};

/// All computed outputs of a single build run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub datasets: Datasets,
    pub normalized: NormalizedPolls,
    /// How many rows fell into each reapportionment outcome.
    pub outcomes: HashMap<ReapportionOutcome, usize>,
}

impl RunOutput {
    pub fn outcome_count(&self, outcome: ReapportionOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }
}

/// Execute the full pipeline over a raw table.
pub fn build_datasets(raw: &RawTable, config: &PipelineConfig) -> Result<RunOutput, PipelineError> {
    config.validate()?;

    // 1) Normalize raw rows.
    let normalized = normalize_table(raw, config.cutoff)?;
    info!(
        rows_read = normalized.rows_read,
        records = normalized.records.len(),
        dropped = normalized.row_errors.len(),
        before_cutoff = normalized.rows_before_cutoff,
        "normalized poll table"
    );

    // 2) Reapportion each record independently.
    let mut outcomes: HashMap<ReapportionOutcome, usize> = HashMap::new();
    let reapportioned: Vec<PollRecord> = normalized
        .records
        .iter()
        .map(|record| {
            let r = reapportion(&record.shares, config.threshold);
            match r.outcome {
                ReapportionOutcome::Redistributed => {}
                ReapportionOutcome::NoQualifyingParty => debug!(
                    firm = %record.polling_firm,
                    date = %record.fieldwork_date,
                    "no party reached the threshold; row zeroed"
                ),
                ReapportionOutcome::NoData => debug!(
                    firm = %record.polling_firm,
                    date = %record.fieldwork_date,
                    "poll reported no values; row zeroed"
                ),
            }
            *outcomes.entry(r.outcome).or_default() += 1;
            PollRecord {
                shares: r.shares,
                ..record.clone()
            }
        })
        .collect();

    // 3) Per-poll tables and their averages, each with coalition columns.
    let datasets = Datasets {
        raw_polls: per_poll_table(TableKind::RawPolls, &normalized.records, &config.coalitions),
        raw_average: average_table(TableKind::RawAverage, &normalized.records, config),
        reapportioned_polls: per_poll_table(TableKind::ReapportionedPolls, &reapportioned, &config.coalitions),
        reapportioned_average: average_table(TableKind::ReapportionedAverage, &reapportioned, config),
    };

    Ok(RunOutput {
        datasets,
        normalized,
        outcomes,
    })
}

fn per_poll_table(kind: TableKind, records: &[PollRecord], coalitions: &[Coalition]) -> PollTable {
    let mut rows: Vec<TableRow> = records
        .iter()
        .map(|r| TableRow {
            fieldwork_date: r.fieldwork_date,
            polling_firm: Some(r.polling_firm.clone()),
            shares: r.shares,
            coalitions: Vec::new(),
        })
        .collect();
    augment_rows(&mut rows, coalitions);

    PollTable {
        kind,
        coalitions: coalitions.to_vec(),
        rows,
    }
}

fn average_table(kind: TableKind, records: &[PollRecord], config: &PipelineConfig) -> PollTable {
    let series = rolling_average(records.iter().map(|r| (r.fieldwork_date, &r.shares)), config.window);

    let mut rows: Vec<TableRow> = series
        .into_iter()
        .map(|DatedShares { date, shares }| TableRow {
            fieldwork_date: date,
            polling_firm: None,
            shares,
            coalitions: Vec::new(),
        })
        .collect();
    augment_rows(&mut rows, &config.coalitions);

    PollTable {
        kind,
        coalitions: config.coalitions.clone(),
        rows,
    }
}
