//! Electoral-threshold reapportionment.
//!
//! Parties below the threshold win no seats. Their share (the "excluded
//! mass") is handed to the qualifying parties in proportion to each
//! qualifying party's own share, so the row total is unchanged:
//!
//! `adjusted_i = v_i / S * (S + E)` for every `v_i >= T`, else `0`
//!
//! where `S` is the qualifying sum and `E` the excluded mass. A missing value
//! is excluded and contributes 0 to `E`.
//!
//! The transform is row-local and applies no rounding.

use serde::{Deserialize, Serialize};

use crate::domain::{Party, PartyShares};

/// How a row was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReapportionOutcome {
    /// At least one party qualified and absorbed the excluded mass.
    Redistributed,
    /// Values were present but none reached the threshold; all shares are 0.
    NoQualifyingParty,
    /// Every value was missing; all shares are 0, as for a degenerate row.
    NoData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reapportionment {
    pub shares: PartyShares,
    pub outcome: ReapportionOutcome,
    /// `S`: sum of qualifying values before redistribution.
    pub qualifying_sum: f64,
    /// `E`: sum of values below the threshold.
    pub excluded_mass: f64,
}

/// Reapportion one row's shares against `threshold` (percentage points).
pub fn reapportion(shares: &PartyShares, threshold: f64) -> Reapportionment {
    if shares.is_all_missing() {
        return Reapportionment {
            shares: zeroed(),
            outcome: ReapportionOutcome::NoData,
            qualifying_sum: 0.0,
            excluded_mass: 0.0,
        };
    }

    let mut qualifying_sum = 0.0;
    let mut excluded_mass = 0.0;
    for (_, value) in shares.iter() {
        match value {
            Some(v) if v >= threshold => qualifying_sum += v,
            Some(v) => excluded_mass += v,
            None => {}
        }
    }

    if qualifying_sum <= 0.0 {
        return Reapportionment {
            shares: zeroed(),
            outcome: ReapportionOutcome::NoQualifyingParty,
            qualifying_sum,
            excluded_mass,
        };
    }

    let scale = (qualifying_sum + excluded_mass) / qualifying_sum;
    let adjusted = shares
        .iter()
        .map(|(p, value)| {
            let v = match value {
                Some(v) if v >= threshold => v * scale,
                _ => 0.0,
            };
            (p, Some(v))
        })
        .collect();

    Reapportionment {
        shares: adjusted,
        outcome: ReapportionOutcome::Redistributed,
        qualifying_sum,
        excluded_mass,
    }
}

fn zeroed() -> PartyShares {
    Party::ALL.into_iter().map(|p| (p, Some(0.0))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(values: &[(Party, f64)]) -> PartyShares {
        values.iter().map(|&(p, v)| (p, Some(v))).collect()
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value present");
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn redistributes_proportionally() {
        let row = shares(&[(Party::Spd, 30.0), (Party::Union, 20.0), (Party::Green, 4.0)]);
        let out = reapportion(&row, 5.0);

        assert_eq!(out.outcome, ReapportionOutcome::Redistributed);
        assert!((out.qualifying_sum - 50.0).abs() < 1e-12);
        assert!((out.excluded_mass - 4.0).abs() < 1e-12);
        assert_close(out.shares.get(Party::Spd), 32.4);
        assert_close(out.shares.get(Party::Union), 21.6);
        assert_close(out.shares.get(Party::Green), 0.0);
        assert!((out.shares.total() - 54.0).abs() < 1e-9);
    }

    #[test]
    fn no_party_reaching_threshold_zeroes_the_row() {
        let row = shares(&[(Party::Spd, 3.0), (Party::Union, 4.0)]);
        let out = reapportion(&row, 5.0);

        assert_eq!(out.outcome, ReapportionOutcome::NoQualifyingParty);
        for (_, v) in out.shares.iter() {
            assert_eq!(v, Some(0.0));
        }
    }

    #[test]
    fn all_missing_row_is_distinguishable_from_degenerate_row() {
        let out = reapportion(&PartyShares::default(), 5.0);
        assert_eq!(out.outcome, ReapportionOutcome::NoData);
        for (_, v) in out.shares.iter() {
            assert_eq!(v, Some(0.0));
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let eps = 1e-9;
        let row = shares(&[(Party::Spd, 5.0), (Party::Fdp, 5.0 - eps), (Party::Union, 40.0)]);
        let out = reapportion(&row, 5.0);

        assert!(out.shares.get(Party::Spd).unwrap() > 5.0);
        assert_eq!(out.shares.get(Party::Fdp), Some(0.0));
    }

    #[test]
    fn missing_values_count_as_zero_excluded_mass() {
        let mut row = shares(&[(Party::Spd, 30.0), (Party::Union, 20.0), (Party::Linke, 4.0)]);
        row.set(Party::Bsw, None);
        let out = reapportion(&row, 5.0);

        assert!((out.excluded_mass - 4.0).abs() < 1e-12);
        assert_eq!(out.shares.get(Party::Bsw), Some(0.0));
        assert!((out.shares.total() - 54.0).abs() < 1e-9);
    }

    #[test]
    fn conserves_mass_across_realistic_rows() {
        let rows = [
            [16.0, 32.0, 12.0, 4.0, 19.0, 3.0, 2.0, 6.0, 6.0],
            [15.5, 31.0, 13.5, 3.5, 18.5, 4.0, 1.5, 5.0, 7.5],
            [5.0, 4.9, 90.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        for values in rows {
            let row = PartyShares::new(values.map(Some));
            let out = reapportion(&row, 5.0);
            assert_eq!(out.outcome, ReapportionOutcome::Redistributed);
            assert!((out.shares.total() - row.total()).abs() < 1e-9);
        }
    }
}
