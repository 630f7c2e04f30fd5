//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the transformation code stays clean and testable
//! - output changes are localized

use std::collections::BTreeSet;

use crate::app::pipeline::RunOutput;
use crate::domain::{Party, PipelineConfig, PollTable, TableRow};
use crate::report::filter::Column;
use crate::transform::ReapportionOutcome;

/// Share at or above which a coalition holds a majority.
pub const MAJORITY: f64 = 50.0;

/// How many dropped rows to list in the summary.
const MAX_ROW_ERRORS: usize = 10;

/// Format the full run summary (dataset stats + latest averages).
pub fn format_run_summary(run: &RunOutput, config: &PipelineConfig, decimals: usize) -> String {
    let mut out = String::new();
    let normalized = &run.normalized;
    let polls = &run.datasets.raw_polls;

    out.push_str("=== polls - Opinion poll series ===\n");
    out.push_str(&format!(
        "Cutoff: {} | Threshold: {:.1}% | Window: {}\n",
        config.cutoff, config.threshold, config.window
    ));
    out.push_str(&format!(
        "Rows: read={} used={} dropped={} before_cutoff={}\n",
        normalized.rows_read,
        normalized.records.len(),
        normalized.row_errors.len(),
        normalized.rows_before_cutoff
    ));

    let firms: BTreeSet<&str> = polls.rows.iter().filter_map(|r| r.polling_firm.as_deref()).collect();
    match (polls.rows.iter().map(|r| r.fieldwork_date).min(), polls.rows.iter().map(|r| r.fieldwork_date).max()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Polls: n={} | firms={} | dates=[{first}, {last}]\n",
            polls.rows.len(),
            firms.len()
        )),
        _ => out.push_str("Polls: n=0\n"),
    }

    out.push_str(&format!(
        "Reapportionment: redistributed={} no_qualifying_party={} no_data={}\n",
        run.outcome_count(ReapportionOutcome::Redistributed),
        run.outcome_count(ReapportionOutcome::NoQualifyingParty),
        run.outcome_count(ReapportionOutcome::NoData),
    ));

    if let (Some(raw), Some(adj)) = (
        run.datasets.raw_average.rows.last(),
        run.datasets.reapportioned_average.rows.last(),
    ) {
        out.push('\n');
        out.push_str(&format_latest(raw, adj, &run.datasets.raw_average, decimals));
    }

    if !normalized.row_errors.is_empty() {
        out.push_str("\nDropped rows:\n");
        for e in normalized.row_errors.iter().take(MAX_ROW_ERRORS) {
            out.push_str(&format!("  row {}: {}\n", e.line, e.message));
        }
        let rest = normalized.row_errors.len().saturating_sub(MAX_ROW_ERRORS);
        if rest > 0 {
            out.push_str(&format!("  ... and {rest} more\n"));
        }
    }

    out
}

/// Latest smoothed values, raw next to reapportioned.
fn format_latest(raw: &TableRow, adj: &TableRow, table: &PollTable, decimals: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Latest average ({}):\n", raw.fieldwork_date));
    out.push_str(&format!("{:<20} {:>8} {:>8}\n", "", "raw", "reapp."));

    for p in Party::ALL {
        out.push_str(
            format!(
                "{:<20} {:>8} {:>8}\n",
                p.code(),
                fmt_share(raw.shares.get(p), decimals),
                fmt_share(adj.shares.get(p), decimals)
            )
            .as_str(),
        );
    }

    let mut any_majority = false;
    for (i, c) in table.coalitions.iter().enumerate() {
        let raw_v = raw.coalitions.get(i).copied().flatten();
        let adj_v = adj.coalitions.get(i).copied().flatten();
        let majority = adj_v.is_some_and(|v| v >= MAJORITY);
        any_majority |= majority;
        out.push_str(
            format!(
                "{:<20} {:>8} {:>8} {}\n",
                truncate(&c.name, 20),
                fmt_share(raw_v, decimals),
                fmt_share(adj_v, decimals),
                if majority { "*" } else { "" }
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if any_majority {
        out.push_str(&format!("(* = at least {MAJORITY:.0}% after reapportionment)\n"));
    }

    out
}

/// Format a table for the terminal.
pub fn format_table(table: &PollTable, columns: &[Column], decimals: usize) -> String {
    let mut out = String::new();
    let per_poll = table.kind.is_per_poll();

    let labels: Vec<String> = columns
        .iter()
        .map(|col| match *col {
            Column::Party(p) => p.code().to_string(),
            Column::Coalition(i) => table.coalitions.get(i).map(|c| c.name.clone()).unwrap_or_default(),
        })
        .collect();
    let widths: Vec<usize> = labels.iter().map(|l| l.chars().count().max(7)).collect();

    out.push_str(&format!("{}\n", table.kind.display_name()));

    let mut header = format!("{:<10}", "date");
    if per_poll {
        header.push_str(&format!(" {:<20}", "firm"));
    }
    for (label, &w) in labels.iter().zip(&widths) {
        header.push_str(&format!(" {label:>w$}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let rule_len = 10 + if per_poll { 21 } else { 0 } + widths.iter().map(|w| w + 1).sum::<usize>();
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');

    for row in &table.rows {
        let mut line = format!("{:<10}", row.fieldwork_date.to_string());
        if per_poll {
            line.push_str(&format!(" {:<20}", truncate(row.polling_firm.as_deref().unwrap_or(""), 20)));
        }
        for (col, &w) in columns.iter().zip(&widths) {
            let v = match *col {
                Column::Party(p) => row.shares.get(p),
                Column::Coalition(i) => row.coalitions.get(i).copied().flatten(),
            };
            line.push_str(&format!(" {:>w$}", fmt_share(v, decimals)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if table.rows.is_empty() {
        out.push_str("(no rows)\n");
    }

    out
}

fn fmt_share(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
