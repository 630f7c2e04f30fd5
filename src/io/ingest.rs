//! CSV ingest.
//!
//! Reads an already-extracted poll table (one header row, one row per poll)
//! into the raw `header → cell text` shape the normalizer consumes. No value
//! interpretation happens here; that is the normalizer's job.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{RawRow, RawTable};
use crate::error::AppError;

/// Load a poll table from a CSV file.
pub fn read_raw_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = read_raw_table_from(file)?;
    debug!(path = %path.display(), rows = table.rows.len(), "read poll table");
    Ok(table)
}

/// Load a poll table from any CSV reader.
pub fn read_raw_table_from<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, "skipping unreadable CSV line: {e}");
                continue;
            }
        };

        // Short rows simply lack the trailing cells. A repeated header keeps
        // its first cell.
        let mut row = RawRow::with_capacity(headers.len());
        for (h, v) in headers.iter().zip(record.iter()) {
            row.entry(h.clone()).or_insert_with(|| v.to_string());
        }
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows_as_text() {
        let csv = "\
Polling firm,Fieldwork date,SPD,Grüne
INSA,\"4–6 Dec 2024\",16,–
Forsa,5 Dec 2024,17
";
        let table = read_raw_table_from(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Polling firm", "Fieldwork date", "SPD", "Grüne"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Fieldwork date"], "4–6 Dec 2024");
        assert_eq!(table.rows[0]["Grüne"], "–");
        assert!(!table.rows[1].contains_key("Grüne"));
    }

    #[test]
    fn repeated_header_keeps_first_cell() {
        let csv = "\
Polling firm,Fieldwork date,SPD,SPD
INSA,5 Dec 2024,16,99
";
        let table = read_raw_table_from(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0]["SPD"], "16");
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_raw_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
