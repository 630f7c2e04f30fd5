//! Coalition columns.
//!
//! A coalition value is a pure function of the row's current party values, so
//! augmentation always overwrites and may be applied any number of times.

use crate::domain::{Coalition, PartyShares, TableRow};

/// Sum of the coalition's member shares, or `None` if any member is missing.
pub fn coalition_share(shares: &PartyShares, coalition: &Coalition) -> Option<f64> {
    coalition
        .parties
        .iter()
        .map(|&p| shares.get(p))
        .sum::<Option<f64>>()
}

/// All coalition values for one row, aligned with `coalitions`.
pub fn coalition_values(shares: &PartyShares, coalitions: &[Coalition]) -> Vec<Option<f64>> {
    coalitions.iter().map(|c| coalition_share(shares, c)).collect()
}

/// Recompute a row's coalition columns from its party shares.
pub fn augment_row(row: &mut TableRow, coalitions: &[Coalition]) {
    row.coalitions = coalition_values(&row.shares, coalitions);
}

pub fn augment_rows(rows: &mut [TableRow], coalitions: &[Coalition]) {
    for row in rows {
        augment_row(row, coalitions);
    }
}
