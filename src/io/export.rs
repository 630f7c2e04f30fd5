//! Export output tables to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or charting
//! scripts. Values are rounded here, and only here.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{Datasets, Party, PollTable};
use crate::error::AppError;

/// Write one table as CSV to any writer.
pub fn write_table_csv_to<W: Write>(writer: W, table: &PollTable, decimals: usize) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec!["fieldwork_date"];
    if table.kind.is_per_poll() {
        header.push("polling_firm");
    }
    header.extend(Party::ALL.iter().map(|p| p.code()));
    header.extend(table.coalitions.iter().map(|c| c.name.as_str()));
    wtr.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &table.rows {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        record.push(row.fieldwork_date.to_string());
        if table.kind.is_per_poll() {
            record.push(row.polling_firm.clone().unwrap_or_default());
        }
        record.extend(row.shares.iter().map(|(_, v)| fmt_cell(v, decimals)));
        record.extend(row.coalitions.iter().map(|&v| fmt_cell(v, decimals)));
        wtr.write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write one table to a CSV file.
pub fn write_table_csv(path: &Path, table: &PollTable, decimals: usize) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_table_csv_to(file, table, decimals)
}

/// Write all four tables into `dir` as `<table_kind>.csv`.
///
/// Returns the written paths in table order.
pub fn write_datasets_csv(dir: &Path, datasets: &Datasets, decimals: usize) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut paths = Vec::with_capacity(4);
    for table in datasets.tables() {
        let path = dir.join(format!("{}.csv", table.kind.name()));
        write_table_csv(&path, table, decimals)?;
        paths.push(path);
    }
    Ok(paths)
}

fn fmt_cell(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Coalition, PartyShares, TableKind, TableRow};

    fn table(kind: TableKind) -> PollTable {
        let mut shares = PartyShares::default();
        shares.set(Party::Spd, Some(16.04));
        shares.set(Party::Union, Some(32.66));
        PollTable {
            kind,
            coalitions: vec![Coalition::new("CDU + SPD", vec![Party::Union, Party::Spd])],
            rows: vec![TableRow {
                fieldwork_date: NaiveDate::from_ymd_opt(2024, 12, 6).unwrap(),
                polling_firm: kind.is_per_poll().then(|| "Forschungsgruppe, Wahlen".to_string()),
                shares,
                coalitions: vec![Some(48.7)],
            }],
        }
    }

    #[test]
    fn per_poll_csv_rounds_and_leaves_missing_empty() {
        let mut buf = Vec::new();
        write_table_csv_to(&mut buf, &table(TableKind::RawPolls), 1).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "fieldwork_date,polling_firm,SPD,Union,Green,FDP,AfD,Linke,FW,BSW,Others,CDU + SPD"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-12-06,\"Forschungsgruppe, Wahlen\",16.0,32.7,,,,,,,,48.7"
        );
    }

    #[test]
    fn average_csv_has_no_firm_column() {
        let mut buf = Vec::new();
        write_table_csv_to(&mut buf, &table(TableKind::RawAverage), 2).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("fieldwork_date,SPD,"));
        assert!(text.contains("2024-12-06,16.04,32.66,"));
    }

    #[test]
    fn writes_one_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let datasets = Datasets {
            raw_polls: table(TableKind::RawPolls),
            raw_average: table(TableKind::RawAverage),
            reapportioned_polls: table(TableKind::ReapportionedPolls),
            reapportioned_average: table(TableKind::ReapportionedAverage),
        };

        let paths = write_datasets_csv(dir.path(), &datasets, 1).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "raw_polls.csv",
                "raw_average.csv",
                "reapportioned_polls.csv",
                "reapportioned_average.csv"
            ]
        );
        assert!(paths.iter().all(|p| p.exists()));
    }
}
