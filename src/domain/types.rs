//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the transformation pipeline
//! - exported to CSV/JSON
//! - reloaded later for slicing and display

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A party tracked by the poll table.
///
/// The set is closed: columns outside it are ignored by the normalizer, and
/// every per-row transform iterates `Party::ALL` rather than whatever columns
/// happened to be present in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    #[serde(rename = "SPD")]
    Spd,
    #[serde(rename = "Union")]
    Union,
    #[serde(rename = "Green")]
    Green,
    #[serde(rename = "FDP")]
    Fdp,
    #[serde(rename = "AfD")]
    Afd,
    #[serde(rename = "Linke")]
    Linke,
    #[serde(rename = "FW")]
    Fw,
    #[serde(rename = "BSW")]
    Bsw,
    #[serde(rename = "Others")]
    Others,
}

impl Party {
    pub const COUNT: usize = 9;

    /// Canonical column order.
    pub const ALL: [Party; Party::COUNT] = [
        Party::Spd,
        Party::Union,
        Party::Green,
        Party::Fdp,
        Party::Afd,
        Party::Linke,
        Party::Fw,
        Party::Bsw,
        Party::Others,
    ];

    /// Canonical column label.
    pub fn code(self) -> &'static str {
        match self {
            Party::Spd => "SPD",
            Party::Union => "Union",
            Party::Green => "Green",
            Party::Fdp => "FDP",
            Party::Afd => "AfD",
            Party::Linke => "Linke",
            Party::Fw => "FW",
            Party::Bsw => "BSW",
            Party::Others => "Others",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a source column header to a party.
    ///
    /// Matching is case-insensitive on the canonical code. The source table
    /// labels the Greens `Grüne`; that header is renamed to `Green` here.
    pub fn from_header(header: &str) -> Option<Party> {
        let header = header.trim();
        if header.eq_ignore_ascii_case("Grüne") || header == "GRÜNE" {
            return Some(Party::Green);
        }
        Party::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(header))
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Vote shares for one row, one optional percentage per party.
///
/// `None` means "no value" (not polled, placeholder, unreadable). It is never
/// the same thing as `Some(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyShares([Option<f64>; Party::COUNT]);

impl PartyShares {
    pub fn new(values: [Option<f64>; Party::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, party: Party) -> Option<f64> {
        self.0[party.index()]
    }

    pub fn set(&mut self, party: Party, value: Option<f64>) {
        self.0[party.index()] = value;
    }

    /// Iterate `(party, value)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Party, Option<f64>)> + '_ {
        Party::ALL.into_iter().map(|p| (p, self.get(p)))
    }

    /// Sum of present values (missing values count as 0).
    pub fn total(&self) -> f64 {
        self.0.iter().flatten().sum()
    }

    pub fn is_all_missing(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

impl FromIterator<(Party, Option<f64>)> for PartyShares {
    fn from_iter<I: IntoIterator<Item = (Party, Option<f64>)>>(iter: I) -> Self {
        let mut shares = PartyShares::default();
        for (party, value) in iter {
            shares.set(party, value);
        }
        shares
    }
}

/// A named alliance whose share is the sum of its member parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coalition {
    pub name: String,
    pub parties: Vec<Party>,
}

impl Coalition {
    pub fn new(name: impl Into<String>, parties: Vec<Party>) -> Self {
        Self {
            name: name.into(),
            parties,
        }
    }

    /// The alliances charted by default.
    pub fn defaults() -> Vec<Coalition> {
        vec![
            Coalition::new("CDU + SPD", vec![Party::Union, Party::Spd]),
            Coalition::new("CDU + Green", vec![Party::Union, Party::Green]),
            Coalition::new("CDU + SPD + FDP", vec![Party::Union, Party::Spd, Party::Fdp]),
            Coalition::new("CDU + SPD + Green", vec![Party::Union, Party::Spd, Party::Green]),
            Coalition::new("SPD + Green + FDP", vec![Party::Spd, Party::Green, Party::Fdp]),
        ]
    }
}

/// Parses `NAME=PARTY+PARTY` (members may also be separated by commas).
impl FromStr for Coalition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, members) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected NAME=PARTY+PARTY, got '{s}'."))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Coalition '{s}' has an empty name."));
        }

        let mut parties = Vec::new();
        for code in members.split(['+', ',']).map(str::trim).filter(|c| !c.is_empty()) {
            let party = Party::from_header(code).ok_or_else(|| format!("Unknown party '{code}' in coalition '{name}'."))?;
            if !parties.contains(&party) {
                parties.push(party);
            }
        }
        if parties.is_empty() {
            return Err(format!("Coalition '{name}' has no member parties."));
        }

        Ok(Coalition::new(name, parties))
    }
}

/// A raw table row: column header → cell text, exactly as extracted.
pub type RawRow = HashMap<String, String>;

/// The raw poll table handed over by the data-acquisition side.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// One normalized poll observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PollRecord {
    pub fieldwork_date: NaiveDate,
    pub polling_firm: String,
    pub shares: PartyShares,
}

/// A row of an output table: party shares plus derived coalition columns.
///
/// `polling_firm` is `None` for the cross-firm average tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub fieldwork_date: NaiveDate,
    pub polling_firm: Option<String>,
    pub shares: PartyShares,
    /// Aligned with the owning table's `coalitions`.
    pub coalitions: Vec<Option<f64>>,
}

/// Which of the four output tables a `PollTable` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    RawPolls,
    RawAverage,
    ReapportionedPolls,
    ReapportionedAverage,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::RawPolls,
        TableKind::RawAverage,
        TableKind::ReapportionedPolls,
        TableKind::ReapportionedAverage,
    ];

    /// Stable name used for export file names.
    pub fn name(self) -> &'static str {
        match self {
            TableKind::RawPolls => "raw_polls",
            TableKind::RawAverage => "raw_average",
            TableKind::ReapportionedPolls => "reapportioned_polls",
            TableKind::ReapportionedAverage => "reapportioned_average",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            TableKind::RawPolls => "Polls",
            TableKind::RawAverage => "Polling average",
            TableKind::ReapportionedPolls => "Polls (reapportioned)",
            TableKind::ReapportionedAverage => "Polling average (reapportioned)",
        }
    }

    /// Per-poll tables carry a firm column; averages are firm-agnostic.
    pub fn is_per_poll(self) -> bool {
        matches!(self, TableKind::RawPolls | TableKind::ReapportionedPolls)
    }
}

/// One output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollTable {
    pub kind: TableKind,
    pub coalitions: Vec<Coalition>,
    pub rows: Vec<TableRow>,
}

impl PollTable {
    /// Look up a coalition column by name.
    pub fn coalition_index(&self, name: &str) -> Option<usize> {
        self.coalitions.iter().position(|c| c.name == name)
    }
}

/// The four tables produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasets {
    pub raw_polls: PollTable,
    pub raw_average: PollTable,
    pub reapportioned_polls: PollTable,
    pub reapportioned_average: PollTable,
}

impl Datasets {
    pub fn table(&self, kind: TableKind) -> &PollTable {
        match kind {
            TableKind::RawPolls => &self.raw_polls,
            TableKind::RawAverage => &self.raw_average,
            TableKind::ReapportionedPolls => &self.reapportioned_polls,
            TableKind::ReapportionedAverage => &self.reapportioned_average,
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &PollTable> + '_ {
        TableKind::ALL.into_iter().map(|kind| self.table(kind))
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Polls whose fieldwork ended before this date are dropped.
    pub cutoff: NaiveDate,
    /// Electoral threshold in percentage points.
    pub threshold: f64,
    /// Rolling window (number of grouped dates) for the averages.
    pub window: usize,
    pub coalitions: Vec<Coalition>,
}

impl PipelineConfig {
    pub const DEFAULT_THRESHOLD: f64 = 5.0;
    pub const DEFAULT_WINDOW: usize = 4;

    pub fn default_cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or(NaiveDate::MIN)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "threshold must be within [0, 100], got {}",
                self.threshold
            )));
        }
        if self.window == 0 {
            return Err(PipelineError::InvalidConfig(
                "rolling window must be at least 1".to_string(),
            ));
        }
        for c in &self.coalitions {
            if c.parties.is_empty() {
                return Err(PipelineError::InvalidConfig(format!(
                    "coalition '{}' has no member parties",
                    c.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cutoff: PipelineConfig::default_cutoff(),
            threshold: PipelineConfig::DEFAULT_THRESHOLD,
            window: PipelineConfig::DEFAULT_WINDOW,
            coalitions: Coalition::defaults(),
        }
    }
}
