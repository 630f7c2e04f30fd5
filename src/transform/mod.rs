//! The poll transformation pipeline stages.
//!
//! - raw rows → typed records (`normalize`)
//! - coalition columns (`coalition`)
//! - threshold reapportionment (`threshold`)
//! - grouped, smoothed averages (`aggregate`)

pub mod aggregate;
pub mod coalition;
pub mod normalize;
pub mod threshold;

pub use aggregate::{DatedShares, rolling_average};
pub use coalition::{augment_row, augment_rows, coalition_values};
pub use normalize::{NormalizedPolls, RowError, normalize_table};
pub use threshold::{ReapportionOutcome, Reapportionment, reapportion};
