//! Raw row normalization.
//!
//! This module turns the heterogeneous poll table (header → cell text) into
//! typed `PollRecord`s that are safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for required columns (a missing column stops the run)
//! - **Row-level tolerance** (skip bad rows, but report what happened)
//! - **No silent zeros**: unreadable cells become "no value", never `0.0`

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Party, PollRecord, RawRow, RawTable};
use crate::error::PipelineError;

pub const FIELDWORK_DATE_COLUMN: &str = "Fieldwork date";
pub const POLLING_FIRM_COLUMN: &str = "Polling firm";

const RANGE_SEPARATORS: [char; 2] = ['–', '—'];
const PLACEHOLDERS: [&str; 6] = ["–", "—", "-", "N/A", "n/a", "?"];

/// A row dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row index (header excluded).
    pub line: usize,
    pub message: String,
}

/// Normalizer output: records in input order + diagnostics.
#[derive(Debug, Clone)]
pub struct NormalizedPolls {
    pub records: Vec<PollRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_before_cutoff: usize,
}

/// Header keys for the columns the normalizer reads.
struct ColumnMap {
    date: String,
    firm: String,
    parties: [String; Party::COUNT],
}

/// Normalize a raw table into poll records, dropping rows before `cutoff`.
pub fn normalize_table(table: &RawTable, cutoff: NaiveDate) -> Result<NormalizedPolls, PipelineError> {
    if table.rows.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let columns = resolve_columns(&table.headers)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut row_errors = Vec::new();
    let mut rows_before_cutoff = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        let line = idx + 1;

        let raw_date = cell(row, &columns.date).unwrap_or_default();
        let Some(fieldwork_date) = parse_fieldwork_date(raw_date) else {
            debug!(line, raw_date, "dropping row with unparsable fieldwork date");
            row_errors.push(RowError {
                line,
                message: format!("Invalid fieldwork date '{raw_date}'."),
            });
            continue;
        };

        if fieldwork_date < cutoff {
            rows_before_cutoff += 1;
            continue;
        }

        let polling_firm = cell(row, &columns.firm).unwrap_or_default().to_string();
        let shares = Party::ALL
            .into_iter()
            .map(|party| (party, cell(row, &columns.parties[party.index()]).and_then(parse_share)))
            .collect();

        records.push(PollRecord {
            fieldwork_date,
            polling_firm,
            shares,
        });
    }

    Ok(NormalizedPolls {
        records,
        row_errors,
        rows_read: table.rows.len(),
        rows_before_cutoff,
    })
}

fn resolve_columns(headers: &[String]) -> Result<ColumnMap, PipelineError> {
    // First occurrence wins when a header repeats.
    let mut by_name: HashMap<String, &String> = HashMap::new();
    let mut by_party: HashMap<Party, &String> = HashMap::new();
    for header in headers {
        let name = normalize_header_name(header);
        if let Some(party) = Party::from_header(&name) {
            by_party.entry(party).or_insert(header);
        }
        by_name.entry(name.to_lowercase()).or_insert(header);
    }

    let required = |name: &str| -> Result<String, PipelineError> {
        by_name
            .get(&name.to_lowercase())
            .map(|h| (*h).clone())
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    };

    let date = required(FIELDWORK_DATE_COLUMN)?;
    let firm = required(POLLING_FIRM_COLUMN)?;

    let mut parties: [String; Party::COUNT] = Default::default();
    for party in Party::ALL {
        let header = by_party
            .get(&party)
            .ok_or_else(|| PipelineError::MissingColumn(party.code().to_string()))?;
        parties[party.index()] = (*header).clone();
    }

    Ok(ColumnMap { date, firm, parties })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn cell<'a>(row: &'a RawRow, header: &str) -> Option<&'a str> {
    row.get(header).map(|s| s.trim())
}

/// Parse the end date of a fieldwork range such as `4–6 Dec 2024`.
pub fn parse_fieldwork_date(raw: &str) -> Option<NaiveDate> {
    let end = raw.rsplit(RANGE_SEPARATORS).next()?.trim();
    if end.is_empty() {
        return None;
    }

    const FMTS: [&str; 7] = [
        "%d %b %Y",
        "%d %B %Y",
        "%Y-%m-%d",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d/%m/%Y",
        "%d.%m.%Y",
    ];
    FMTS.into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(end, fmt).ok())
}

/// Coerce one party cell to a percentage, or "no value".
pub fn parse_share(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || PLACEHOLDERS.contains(&s) {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && (0.0..=100.0).contains(&v) {
        Some(v)
    } else {
        debug!(value = v, "discarding out-of-range share");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PipelineConfig;

    const PARTY_HEADERS: [&str; 9] = ["SPD", "Union", "Grüne", "FDP", "AfD", "Linke", "FW", "BSW", "Others"];

    fn headers() -> Vec<String> {
        let mut h = vec!["Polling firm".to_string(), "Fieldwork date".to_string(), "Samplesize".to_string()];
        h.extend(PARTY_HEADERS.iter().map(|s| s.to_string()));
        h.push("Lead".to_string());
        h
    }

    fn row(firm: &str, date: &str, values: [&str; 9]) -> RawRow {
        let mut r = RawRow::new();
        r.insert("Polling firm".to_string(), firm.to_string());
        r.insert("Fieldwork date".to_string(), date.to_string());
        r.insert("Samplesize".to_string(), "1,204".to_string());
        for (h, v) in PARTY_HEADERS.iter().zip(values) {
            r.insert(h.to_string(), v.to_string());
        }
        r.insert("Lead".to_string(), "13".to_string());
        r
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fieldwork_date_takes_end_of_range() {
        assert_eq!(parse_fieldwork_date("4–6 Dec 2024"), Some(date(2024, 12, 6)));
        assert_eq!(parse_fieldwork_date("29 Nov – 2 Dec 2024"), Some(date(2024, 12, 2)));
        assert_eq!(parse_fieldwork_date("2024-12-06"), Some(date(2024, 12, 6)));
        assert_eq!(parse_fieldwork_date(" 6 December 2024 "), Some(date(2024, 12, 6)));
        assert_eq!(parse_fieldwork_date("Fieldwork date"), None);
        assert_eq!(parse_fieldwork_date(""), None);
    }

    #[test]
    fn share_cells_coerce_placeholders_to_no_value() {
        assert_eq!(parse_share("31.5"), Some(31.5));
        assert_eq!(parse_share("0"), Some(0.0));
        assert_eq!(parse_share("–"), None);
        assert_eq!(parse_share(""), None);
        assert_eq!(parse_share("n/a"), None);
        assert_eq!(parse_share("see note"), None);
        assert_eq!(parse_share("140"), None);
    }

    #[test]
    fn normalizes_rows_and_renames_green() {
        let table = RawTable {
            headers: headers(),
            rows: vec![
                row("INSA", "4–6 Dec 2024", ["16", "32", "12", "4", "19", "3", "–", "6", "8"]),
                row("Forsa", "5 Dec 2024", ["17", "31", "13", "3", "18", "3", "", "5", "10"]),
            ],
        };

        let out = normalize_table(&table, PipelineConfig::default_cutoff()).unwrap();
        assert_eq!(out.rows_read, 2);
        assert_eq!(out.records.len(), 2);
        assert!(out.row_errors.is_empty());

        let first = &out.records[0];
        assert_eq!(first.polling_firm, "INSA");
        assert_eq!(first.fieldwork_date, date(2024, 12, 6));
        assert_eq!(first.shares.get(Party::Green), Some(12.0));
        assert_eq!(first.shares.get(Party::Fw), None);
        assert_eq!(out.records[1].shares.get(Party::Fw), None);
    }

    #[test]
    fn drops_bad_dates_and_rows_before_cutoff() {
        let values = ["16", "32", "12", "4", "19", "3", "2", "6", "6"];
        let table = RawTable {
            headers: headers(),
            rows: vec![
                row("", "", values),
                row("INSA", "20 Dec 2023", values),
                row("INSA", "31 Dec 2023", values),
                row("INSA", "sometime", values),
            ],
        };

        let out = normalize_table(&table, date(2023, 12, 31)).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].fieldwork_date, date(2023, 12, 31));
        assert_eq!(out.rows_before_cutoff, 1);
        assert_eq!(out.row_errors.len(), 2);
        assert_eq!(out.row_errors[0].line, 1);
        assert_eq!(out.row_errors[1].line, 4);
    }

    #[test]
    fn empty_input_is_an_error() {
        let table = RawTable {
            headers: headers(),
            rows: Vec::new(),
        };
        assert_eq!(
            normalize_table(&table, date(2023, 12, 31)).unwrap_err(),
            PipelineError::EmptyInput
        );
    }

    #[test]
    fn missing_party_column_is_an_error() {
        let mut table = RawTable {
            headers: headers(),
            rows: vec![row("INSA", "5 Dec 2024", ["1"; 9])],
        };
        table.headers.retain(|h| h != "BSW");
        assert_eq!(
            normalize_table(&table, date(2023, 12, 31)).unwrap_err(),
            PipelineError::MissingColumn("BSW".to_string())
        );
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let mut table = RawTable {
            headers: headers(),
            rows: vec![row("INSA", "5 Dec 2024", ["1"; 9])],
        };
        table.headers.retain(|h| h != "Fieldwork date");
        assert_eq!(
            normalize_table(&table, date(2023, 12, 31)).unwrap_err(),
            PipelineError::MissingColumn(FIELDWORK_DATE_COLUMN.to_string())
        );
    }
}
