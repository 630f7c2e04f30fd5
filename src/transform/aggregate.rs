//! Cross-firm averaging over time.
//!
//! Two steps, always in this order:
//!
//! 1. group records by exact fieldwork date and take the per-column mean of
//!    the values that are present (ascending by date)
//! 2. smooth each column with a trailing rolling mean over the last `window`
//!    grouped dates; the first dates use the shorter prefix
//!
//! Smoothing per-poll rows directly would weight firms by how often they
//! publish, so the grouping step is not optional.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Party, PartyShares};

/// One point of an aggregated series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedShares {
    pub date: NaiveDate,
    pub shares: PartyShares,
}

/// Running per-column sums for the mean of present values.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnMean {
    sum: [f64; Party::COUNT],
    n: [usize; Party::COUNT],
}

impl ColumnMean {
    fn add(&mut self, shares: &PartyShares) {
        for (p, value) in shares.iter() {
            if let Some(v) = value {
                self.sum[p.index()] += v;
                self.n[p.index()] += 1;
            }
        }
    }

    fn mean(&self) -> PartyShares {
        Party::ALL
            .into_iter()
            .map(|p| {
                let i = p.index();
                let v = (self.n[i] > 0).then(|| self.sum[i] / self.n[i] as f64);
                (p, v)
            })
            .collect()
    }
}

/// Group by date and average each column over the present values.
///
/// The result is sorted ascending by date.
pub fn group_by_date<'a, I>(records: I) -> Vec<DatedShares>
where
    I: IntoIterator<Item = (NaiveDate, &'a PartyShares)>,
{
    let mut groups: BTreeMap<NaiveDate, ColumnMean> = BTreeMap::new();
    for (date, shares) in records {
        groups.entry(date).or_default().add(shares);
    }

    groups
        .into_iter()
        .map(|(date, acc)| DatedShares {
            date,
            shares: acc.mean(),
        })
        .collect()
}

/// Trailing rolling mean over the last `window` points of a date-sorted series.
///
/// Missing values inside a window are skipped; a column is missing only if
/// its whole window is missing. A `window` of 0 is treated as 1.
pub fn smooth(series: &[DatedShares], window: usize) -> Vec<DatedShares> {
    let window = window.max(1);
    debug_assert!(series.windows(2).all(|w| w[0].date <= w[1].date));

    (0..series.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let mut acc = ColumnMean::default();
            for point in &series[start..=i] {
                acc.add(&point.shares);
            }
            DatedShares {
                date: series[i].date,
                shares: acc.mean(),
            }
        })
        .collect()
}

/// Grouped mean followed by smoothing.
pub fn rolling_average<'a, I>(records: I, window: usize) -> Vec<DatedShares>
where
    I: IntoIterator<Item = (NaiveDate, &'a PartyShares)>,
{
    smooth(&group_by_date(records), window)
}
