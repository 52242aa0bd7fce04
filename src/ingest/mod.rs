//! CSV ingest.
//!
//! Turns the raw nominee CSV into typed [`NomineeRecord`]s. Columns are
//! looked up by header name, every ethnic-background label is resolved
//! through the [`LabelMap`] here, and rows with a non-numeric year either
//! abort the run or are skipped, depending on [`YearPolicy`].

use crate::config::InputConfig;
use crate::error::IngestError;
use crate::models::{LabelMap, NomineeRecord};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use tracing::{debug, warn};

/// Handling of rows whose year is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearPolicy {
    /// Abort on the first bad row.
    #[default]
    Fail,
    /// Drop the row and keep going.
    Skip,
}

/// CSV layout and row policy.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub year_column: String,
    pub ethnicity_column: String,
    pub delimiter: u8,
    pub on_invalid_year: YearPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}

impl From<&InputConfig> for IngestOptions {
    fn from(config: &InputConfig) -> Self {
        Self {
            year_column: config.year_column.clone(),
            ethnicity_column: config.ethnicity_column.clone(),
            delimiter: u8::try_from(config.delimiter).unwrap_or(b','),
            on_invalid_year: config.on_invalid_year,
        }
    }
}

/// A row dropped under [`YearPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub records: Vec<NomineeRecord>,
    /// Data rows seen, including skipped ones.
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    /// Distinct raw labels with no table entry, sorted.
    pub unmapped_labels: Vec<String>,
}

/// Parse a year field. Surrounding whitespace is ignored.
pub fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize, IngestError> {
    let wanted = normalize_header_name(name);
    headers
        .iter()
        .position(|h| normalize_header_name(h) == wanted)
        .ok_or_else(|| IngestError::MissingColumn {
            column: name.to_string(),
            found: headers.iter().collect::<Vec<_>>().join(", "),
        })
}

/// Read every record from `reader`.
pub fn parse_records<R: Read>(
    reader: R,
    labels: &LabelMap,
    options: &IngestOptions,
) -> Result<Ingested, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(IngestError::Headers)?.clone();
    let year_idx = find_column(&headers, &options.year_column)?;
    let ethnicity_idx = find_column(&headers, &options.ethnicity_column)?;
    debug!(
        "Columns: year at {}, ethnic background at {}",
        year_idx, ethnicity_idx
    );

    let mut ingested = Ingested::default();
    let mut unmapped = BTreeSet::new();

    for (idx, result) in csv_reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = idx + 2;
        ingested.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                let error = IngestError::Csv {
                    line,
                    message: e.to_string(),
                };
                skip_or_fail(&mut ingested, options, error)?;
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        let raw_year = record.get(year_idx).unwrap_or("");
        let Some(year) = parse_year(raw_year) else {
            let error = IngestError::InvalidYear {
                line,
                value: raw_year.to_string(),
            };
            skip_or_fail(&mut ingested, options, error)?;
            continue;
        };

        // A short row has no ethnicity field; that is the empty label.
        let nominee = NomineeRecord::new(year, record.get(ethnicity_idx).unwrap_or(""), labels);
        if !labels.contains(&nominee.raw_label) && unmapped.insert(nominee.raw_label.clone()) {
            warn!(
                "Unrecognized ethnic background '{}' on line {}; counting it as {}",
                nominee.raw_label,
                line,
                labels.default_group()
            );
        }

        ingested.records.push(nominee);
    }

    ingested.unmapped_labels = unmapped.into_iter().collect();
    debug!(
        "Parsed {} records from {} rows ({} skipped)",
        ingested.records.len(),
        ingested.rows_read,
        ingested.row_errors.len()
    );
    Ok(ingested)
}

fn skip_or_fail(
    ingested: &mut Ingested,
    options: &IngestOptions,
    error: IngestError,
) -> Result<(), IngestError> {
    match options.on_invalid_year {
        YearPolicy::Fail => Err(error),
        YearPolicy::Skip => {
            warn!("Skipping row: {}", error);
            let line = match &error {
                IngestError::InvalidYear { line, .. } | IngestError::Csv { line, .. } => *line,
                _ => 0,
            };
            ingested.row_errors.push(RowError {
                line,
                message: error.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupKey;

    const SAMPLE: &str = include_str!("../../fixtures/academy_awards_nominees_sample.csv");

    fn parse(csv: &str, policy: YearPolicy) -> Result<Ingested, IngestError> {
        let options = IngestOptions {
            on_invalid_year: policy,
            ..IngestOptions::default()
        };
        parse_records(csv.as_bytes(), &LabelMap::default(), &options)
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1990"), Some(1990));
        assert_eq!(parse_year(" 2001 "), Some(2001));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("19x0"), None);
    }

    #[test]
    fn test_parse_basic() {
        let csv = "year,name,ethnic_background\n1990,A,\n1990,B,black\n1991,C,asian\n";
        let ingested = parse(csv, YearPolicy::Fail).unwrap();

        assert_eq!(ingested.rows_read, 3);
        assert_eq!(ingested.records.len(), 3);
        assert_eq!(ingested.records[0].group, GroupKey::Caucasian);
        assert_eq!(ingested.records[1].group, GroupKey::Afrodescendant);
        assert_eq!(ingested.records[2].year, 1991);
        assert_eq!(ingested.records[2].group, GroupKey::Asian);
        assert!(ingested.unmapped_labels.is_empty());
    }

    #[test]
    fn test_unknown_label_is_counted_as_default() {
        let csv = "year,ethnic_background\n2000,unknown\n2000,unknown\n2000,martian\n";
        let ingested = parse(csv, YearPolicy::Fail).unwrap();

        assert_eq!(ingested.records.len(), 3);
        assert!(ingested
            .records
            .iter()
            .all(|r| r.group == GroupKey::Caucasian));
        assert_eq!(ingested.unmapped_labels, vec!["martian", "unknown"]);
    }

    #[test]
    fn test_headers_are_normalized() {
        let csv = "\u{feff}Year , Ethnic_Background\n1995,hispanic\n";
        let ingested = parse(csv, YearPolicy::Fail).unwrap();
        assert_eq!(ingested.records[0].group, GroupKey::Hispanic);
    }

    #[test]
    fn test_missing_column() {
        let csv = "year,name\n1990,A\n";
        let err = parse(csv, YearPolicy::Fail).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "ethnic_background"));
    }

    #[test]
    fn test_invalid_year_fails_fast() {
        let csv = "year,ethnic_background\n1990,black\nNaN,asian\n1991,\n";
        let err = parse(csv, YearPolicy::Fail).unwrap_err();
        match err {
            IngestError::InvalidYear { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "NaN");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_year_skipped() {
        let csv = "year,ethnic_background\n1990,black\nNaN,asian\n1991,\n";
        let ingested = parse(csv, YearPolicy::Skip).unwrap();
        assert_eq!(ingested.rows_read, 3);
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 3);
    }

    // Invalid UTF-8 in the year field makes the csv reader reject the record.
    const MALFORMED: &[u8] = b"year,ethnic_background\n1990,black\n\xff,asian\n";

    fn parse_bytes(bytes: &[u8], policy: YearPolicy) -> Result<Ingested, IngestError> {
        let options = IngestOptions {
            on_invalid_year: policy,
            ..IngestOptions::default()
        };
        parse_records(bytes, &LabelMap::default(), &options)
    }

    #[test]
    fn test_malformed_row_fails_fast() {
        let err = parse_bytes(MALFORMED, YearPolicy::Fail).unwrap_err();
        assert!(
            matches!(err, IngestError::Csv { line: 3, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_malformed_row_skipped() {
        let ingested = parse_bytes(MALFORMED, YearPolicy::Skip).unwrap();
        assert_eq!(ingested.rows_read, 2);
        assert_eq!(ingested.records.len(), 1);
        assert_eq!(ingested.records[0].group, GroupKey::Afrodescendant);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 3);
    }

    #[test]
    fn test_short_row_uses_empty_label() {
        let csv = "year,ethnic_background\n1990\n";
        let ingested = parse(csv, YearPolicy::Fail).unwrap();
        assert_eq!(ingested.records[0].group, GroupKey::Caucasian);
        assert_eq!(ingested.records[0].raw_label, "");
    }

    #[test]
    fn test_custom_delimiter() {
        let options = IngestOptions {
            delimiter: b';',
            ..IngestOptions::default()
        };
        let csv = "year;ethnic_background\n1990;asian\n";
        let ingested = parse_records(csv.as_bytes(), &LabelMap::default(), &options).unwrap();
        assert_eq!(ingested.records[0].group, GroupKey::Asian);
    }

    #[test]
    fn test_sample_fixture() {
        let ingested = parse(SAMPLE, YearPolicy::Fail).unwrap();
        assert_eq!(ingested.rows_read, ingested.records.len());
        assert!(ingested.records.iter().any(|r| r.group == GroupKey::Hispanic));
        assert!(ingested.records.iter().any(|r| r.group == GroupKey::Asian));
    }

    #[test]
    fn test_empty_input() {
        let ingested = parse("year,ethnic_background\n", YearPolicy::Fail).unwrap();
        assert_eq!(ingested.rows_read, 0);
        assert!(ingested.records.is_empty());
    }
}
