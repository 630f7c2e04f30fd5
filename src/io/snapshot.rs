//! Read/write run snapshot JSON files.
//!
//! A snapshot is the "portable" representation of one build run:
//! - run metadata (cutoff, threshold, window, party order, coalitions)
//! - the four output tables, unrounded
//!
//! `polls show` reads it back to slice and print tables without rebuilding.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Coalition, Datasets, Party, PipelineConfig};
use crate::error::AppError;

pub const TOOL_NAME: &str = "polls";

/// A saved run (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub tool: String,
    pub cutoff: NaiveDate,
    pub threshold: f64,
    pub window: usize,
    /// Column order of every `shares` array in `tables`.
    pub parties: Vec<Party>,
    pub coalitions: Vec<Coalition>,
    pub tables: Datasets,
}

impl SnapshotFile {
    pub fn new(config: &PipelineConfig, datasets: &Datasets) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            cutoff: config.cutoff,
            threshold: config.threshold,
            window: config.window,
            parties: Party::ALL.to_vec(),
            coalitions: config.coalitions.clone(),
            tables: datasets.clone(),
        }
    }
}

/// Write a snapshot JSON file.
pub fn write_snapshot_json(path: &Path, snapshot: &SnapshotFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)
        .map_err(|e| AppError::new(2, format!("Failed to write snapshot JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush snapshot JSON '{}': {e}", path.display())))?;

    Ok(())
}

/// Read a snapshot JSON file.
pub fn read_snapshot_json(path: &Path) -> Result<SnapshotFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open snapshot JSON '{}': {e}", path.display())))?;
    let snapshot: SnapshotFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid snapshot JSON: {e}")))?;

    // Shares are stored positionally; refuse files written with another order.
    if snapshot.parties != Party::ALL {
        return Err(AppError::new(
            2,
            "Snapshot party order does not match this build of `polls`.",
        ));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_datasets;
    use crate::domain::RawTable;
    use crate::io::ingest::read_raw_table_from;

    fn sample_table() -> RawTable {
        let csv = "\
Polling firm,Fieldwork date,SPD,Union,Grüne,FDP,AfD,Linke,FW,BSW,Others
INSA,4–6 Dec 2024,16,32,12,4,19,3,–,6,8
Forsa,5 Dec 2024,17.5,31,13,3,18,3,2,5,7.5
";
        read_raw_table_from(csv.as_bytes()).unwrap()
    }

    #[test]
    fn snapshot_survives_a_write_and_read() {
        let raw = sample_table();
        let config = PipelineConfig::default();
        let run = build_datasets(&raw, &config).unwrap();
        let snapshot = SnapshotFile::new(&config, &run.datasets);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        write_snapshot_json(&path, &snapshot).unwrap();
        let back = read_snapshot_json(&path).unwrap();

        assert_eq!(back.tool, TOOL_NAME);
        assert_eq!(back.tables, run.datasets);
        assert_eq!(back.coalitions, config.coalitions);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_final_write_is_reported() {
        let config = PipelineConfig::default();
        let run = build_datasets(&sample_table(), &config).unwrap();
        let snapshot = SnapshotFile::new(&config, &run.datasets);
        let err = write_snapshot_json(Path::new("/dev/full"), &snapshot).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"tool\": 3}").unwrap();
        assert_eq!(read_snapshot_json(&path).unwrap_err().exit_code(), 2);
    }
}
