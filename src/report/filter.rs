//! Read-only slicing of output tables for display.

use chrono::NaiveDate;

use crate::domain::{Party, PollTable};

/// Row filter for `polls show`.
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only applied to per-poll tables; averages have no firm.
    pub firm: Option<String>,
}

impl TableFilter {
    /// A copy of `table` holding only the matching rows.
    pub fn apply(&self, table: &PollTable) -> PollTable {
        let rows = table
            .rows
            .iter()
            .filter(|row| self.from.is_none_or(|from| row.fieldwork_date >= from))
            .filter(|row| self.to.is_none_or(|to| row.fieldwork_date <= to))
            .filter(|row| match (&self.firm, &row.polling_firm) {
                (Some(want), Some(firm)) => firm.trim().eq_ignore_ascii_case(want.trim()),
                _ => true,
            })
            .cloned()
            .collect();

        PollTable {
            kind: table.kind,
            coalitions: table.coalitions.clone(),
            rows,
        }
    }
}

/// A displayed value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Party(Party),
    /// Index into the table's coalitions.
    Coalition(usize),
}

/// Resolve column labels (party codes or coalition names) against a table.
///
/// An empty selection means every party followed by every coalition.
pub fn select_columns(table: &PollTable, labels: &[String]) -> Result<Vec<Column>, String> {
    if labels.is_empty() {
        let mut cols: Vec<Column> = Party::ALL.into_iter().map(Column::Party).collect();
        cols.extend((0..table.coalitions.len()).map(Column::Coalition));
        return Ok(cols);
    }

    labels
        .iter()
        .map(|label| {
            if let Some(p) = Party::from_header(label) {
                return Ok(Column::Party(p));
            }
            table
                .coalitions
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(label.trim()))
                .map(Column::Coalition)
                .ok_or_else(|| format!("Unknown column '{label}' (expected a party code or coalition name)."))
        })
        .collect()
}
