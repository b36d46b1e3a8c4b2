//! CSV upload ingest.
//!
//! Turns an uploaded CSV (header row plus one or more data rows) into
//! [`RawRecord`]s keyed by the bundle's input columns. Cells are typed
//! one at a time with [`Value::parse_cell`]; nothing is inferred across
//! rows.

use std::collections::{HashMap, HashSet};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use quotelens_types::{QuoteLensError, RawRecord, Result, Value};

use crate::artifacts::ArtifactBundle;

/// What ingest needs to know about the expected input.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Known input columns in training order.
    pub columns: Vec<String>,
    /// Known columns an upload may omit.
    pub optional: HashSet<String>,
    /// Raw cell contents read as null.
    pub null_tokens: Vec<String>,
}

impl IngestSettings {
    /// Settings matching a loaded bundle.
    pub fn from_bundle(bundle: &ArtifactBundle) -> Self {
        let config = bundle.pipeline_config();
        Self {
            columns: bundle.input_columns().to_vec(),
            optional: config.constant_fields.iter().cloned().collect(),
            null_tokens: config.null_tokens.clone(),
        }
    }
}

/// Parse an uploaded CSV into raw records.
///
/// Fails with a schema error naming the first required column absent from
/// the header, and with a validation error for an empty upload, a ragged
/// row or undecodable bytes.
pub fn read_records(bytes: &[u8], settings: &IngestSettings) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(bytes);

    let header: StringRecord = reader.headers().map_err(csv_error)?.clone();
    if header.is_empty() {
        return Err(QuoteLensError::validation("<upload>", "the file is empty"));
    }

    let positions: HashMap<&str, usize> = header.iter().enumerate().map(|(i, h)| (h, i)).collect();
    let mut layout = Vec::with_capacity(settings.columns.len());
    for column in &settings.columns {
        match positions.get(column.as_str()) {
            Some(&idx) => layout.push((column.as_str(), idx)),
            None if settings.optional.contains(column) => {}
            None => return Err(QuoteLensError::schema(column.clone())),
        }
    }

    let known: HashSet<&str> = settings.columns.iter().map(String::as_str).collect();
    let extra: Vec<&str> = header.iter().filter(|h| !known.contains(h)).collect();
    if !extra.is_empty() {
        debug!(columns = ?extra, "ignoring columns outside the input schema");
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row + 2;
        let raw = result.map_err(csv_error)?;
        if raw.len() != header.len() {
            return Err(QuoteLensError::validation(
                format!("<row {line}>"),
                format!("expected {} cells, found {}", header.len(), raw.len()),
            ));
        }
        let mut record = RawRecord::new();
        for &(column, idx) in &layout {
            let cell = raw.get(idx).unwrap_or_default();
            record.insert(column, Value::parse_cell(cell, &settings.null_tokens));
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(QuoteLensError::validation("<upload>", "the file has no data rows"));
    }
    debug!(rows = records.len(), columns = layout.len(), "csv ingested");
    Ok(records)
}

fn csv_error(err: csv::Error) -> QuoteLensError {
    let field = match err.position() {
        Some(pos) => format!("<row {}>", pos.line()),
        None => "<upload>".to_string(),
    };
    QuoteLensError::validation(field, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn settings() -> IngestSettings {
        IngestSettings::from_bundle(&fixtures::bundle())
    }

    #[test]
    fn reads_fixture_upload() {
        let records = read_records(fixtures::csv_upload().as_bytes(), &settings()).unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.get("QuoteNumber").unwrap(), &Value::Int(1));
        assert_eq!(rec.get("Field10").unwrap(), &Value::from("1,165"));
        assert_eq!(rec.get("Original_Quote_Date").unwrap(), &Value::from("2023-07-15"));
    }

    #[test]
    fn empty_cells_become_null_and_spaces_survive() {
        let s = settings();
        let header = s.columns.join(",");
        let cells: Vec<&str> = s
            .columns
            .iter()
            .map(|col| match col.as_str() {
                "Field7" => "",
                "GeographicField63" => " ",
                "Original_Quote_Date" => "2023-07-15",
                _ => "1",
            })
            .collect();
        let csv = format!("{header}\n{}\n", cells.join(","));
        let records = read_records(csv.as_bytes(), &s).unwrap();
        assert_eq!(records[0].get("Field7").unwrap(), &Value::Null);
        assert_eq!(records[0].get("GeographicField63").unwrap(), &Value::from(" "));
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let csv = "QuoteNumber,Original_Quote_Date\n1,2023-07-15\n";
        let err = read_records(csv.as_bytes(), &settings()).unwrap_err();
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn constant_columns_are_optional_and_extras_ignored() {
        let s = settings();
        let kept: Vec<&String> = s.columns.iter().filter(|c| !s.optional.contains(*c)).collect();
        let mut header: Vec<&str> = kept.iter().map(|c| c.as_str()).collect();
        header.push("QuoteConversion_Flag");
        let row: Vec<&str> = header
            .iter()
            .map(|c| if *c == "Original_Quote_Date" { "2023-07-15" } else { "0" })
            .collect();
        let csv = format!("{}\n{}\n", header.join(","), row.join(","));
        let records = read_records(csv.as_bytes(), &s).unwrap();
        assert!(!records[0].contains("PropertyField6"));
        assert!(!records[0].contains("QuoteConversion_Flag"));
        assert_eq!(records[0].len(), kept.len());
    }

    #[test]
    fn header_only_upload_is_validation_error() {
        let header = settings().columns.join(",");
        let err = read_records(format!("{header}\n").as_bytes(), &settings()).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn empty_upload_is_validation_error() {
        assert_eq!(read_records(b"", &settings()).unwrap_err().kind(), "validation");
    }

    #[test]
    fn ragged_row_is_validation_error() {
        let mut csv = fixtures::csv_upload();
        csv.push_str("2,2023-07-16\n");
        let err = read_records(csv.as_bytes(), &settings()).unwrap_err();
        assert!(matches!(err, QuoteLensError::Validation { ref field, .. } if field == "<row 3>"));
    }
}
