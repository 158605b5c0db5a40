//! CSV parsing into typed MLS records.
//!
//! Headers are trimmed and mapped by name, so column order in the export
//! does not matter. Known columns are parsed into typed fields; a value
//! that does not parse becomes `None` for that field only. Rows the CSV
//! reader cannot decode are logged and skipped without aborting the load.

use realty_map_listing_models::{CsvValue, RawRecord};

use crate::StoreError;

/// Result of parsing one CSV document.
#[derive(Debug, Default)]
pub struct ParsedCsv {
    /// Trimmed header names, in file order.
    pub headers: Vec<String>,
    /// Successfully decoded rows, in file order.
    pub records: Vec<RawRecord>,
    /// Rows the reader could not decode (skipped).
    pub skipped_rows: usize,
    /// Rows whose field count differs from the header (kept).
    pub ragged_rows: usize,
}

/// Parses a comma-delimited MLS export with a header row.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the header row cannot be read, or
/// [`StoreError::MissingHeader`] if the document has no columns.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedCsv, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(StoreError::MissingHeader);
    }

    let mut parsed = ParsedCsv {
        headers,
        ..ParsedCsv::default()
    };

    for (i, result) in reader.records().enumerate() {
        // Row 1 is the header.
        let line = i + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Skipping malformed CSV row {line}: {e}");
                parsed.skipped_rows += 1;
                continue;
            }
        };

        if row.len() != parsed.headers.len() {
            log::debug!(
                "CSV row {line} has {} fields, expected {}",
                row.len(),
                parsed.headers.len()
            );
            parsed.ragged_rows += 1;
        }

        let fields = parsed
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| (header.as_str(), row.get(col).unwrap_or("")));
        parsed.records.push(record_from_fields(fields));
    }

    if parsed.skipped_rows > 0 || parsed.ragged_rows > 0 {
        log::warn!(
            "CSV parsing warnings: {} rows skipped, {} rows with unexpected field counts",
            parsed.skipped_rows,
            parsed.ragged_rows
        );
    }

    Ok(parsed)
}

/// Builds a record from `(header, value)` pairs.
#[must_use]
pub fn record_from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> RawRecord {
    let mut record = RawRecord::default();

    for (header, value) in fields {
        match header {
            "LIST_NO" => record.list_no = parse_text(value),
            "LIST_PRICE" => record.list_price = parse_f64(value),
            "ADDRESS" => record.address = parse_text(value),
            "TOWN" => record.town = parse_text(value),
            "STATE" => record.state = parse_text(value),
            "ZIP_CODE" => record.zip_code = parse_text(value),
            "NO_BEDROOMS" => record.bedrooms = parse_u32(value),
            "TOTAL_BATHS" => record.total_baths = parse_f64(value),
            "SQUARE_FEET" => record.square_feet = parse_f64(value),
            "LATITUDE" => record.latitude = parse_f64(value),
            "LONGITUDE" => record.longitude = parse_f64(value),
            "YEAR_BUILT" => record.year_built = parse_i32(value),
            "ACRE" => record.acre = parse_f64(value),
            "REMARKS" => record.remarks = parse_text(value),
            "STYLE_SF" => record.style = parse_text(value),
            "" => {}
            other => {
                record
                    .extra
                    .insert(other.to_owned(), CsvValue::infer(value));
            }
        }
    }

    record
}

/// Trimmed text, `None` if empty.
#[must_use]
pub fn parse_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Finite floating point number, `None` if empty or not numeric.
#[must_use]
pub fn parse_f64(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Non-negative whole number. Accepts `"3"` and `"3.0"`, rejects `"2.5"`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_u32(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return Some(n);
    }
    parse_f64(value)
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
}

/// Signed whole number. Accepts `"1920"` and `"1920.0"`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_i32(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i32>() {
        return Some(n);
    }
    parse_f64(value)
        .filter(|v| v.fract() == 0.0 && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
        .map(|v| v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
LIST_NO , LIST_PRICE,ADDRESS,TOWN,STATE,ZIP_CODE,NO_BEDROOMS,TOTAL_BATHS,SQUARE_FEET,LATITUDE,LONGITUDE,YEAR_BUILT,ACRE,REMARKS,STYLE_SF,GARAGE_SPACES
73000001,400000,10 Elm St,Boston,MA,02108,3,1.5,1200,42.3570,-71.0630,1920,0.1,\"Sunny, renovated\",Colonial,1
73000002,650000,5 Main St,Cambridge,MA,02139,4,2,1800,,,,,,,
";

    #[test]
    fn parses_typed_columns() {
        let parsed = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped_rows, 0);
        assert_eq!(parsed.headers[0], "LIST_NO");

        let first = &parsed.records[0];
        assert_eq!(first.list_no.as_deref(), Some("73000001"));
        assert_eq!(first.list_price, Some(400_000.0));
        assert_eq!(first.address.as_deref(), Some("10 Elm St"));
        assert_eq!(first.zip_code.as_deref(), Some("02108"));
        assert_eq!(first.bedrooms, Some(3));
        assert_eq!(first.total_baths, Some(1.5));
        assert_eq!(first.year_built, Some(1920));
        assert_eq!(first.remarks.as_deref(), Some("Sunny, renovated"));
        assert_eq!(first.style.as_deref(), Some("Colonial"));
        assert_eq!(
            first.extra.get("GARAGE_SPACES"),
            Some(&CsvValue::Integer(1))
        );
        assert!(first.coordinates().is_some());
    }

    #[test]
    fn empty_cells_become_none() {
        let parsed = parse_csv(SAMPLE.as_bytes()).unwrap();
        let second = &parsed.records[1];
        assert!(second.latitude.is_none());
        assert!(second.longitude.is_none());
        assert!(second.year_built.is_none());
        assert!(second.style.is_none());
        assert_eq!(second.extra.get("GARAGE_SPACES"), Some(&CsvValue::Null));
    }

    #[test]
    fn malformed_numbers_become_none() {
        let record = record_from_fields([
            ("LIST_PRICE", "call agent"),
            ("NO_BEDROOMS", "2.5"),
            ("YEAR_BUILT", "circa 1900"),
            ("SQUARE_FEET", "NaN"),
        ]);
        assert!(record.list_price.is_none());
        assert!(record.bedrooms.is_none());
        assert!(record.year_built.is_none());
        assert!(record.square_feet.is_none());
    }

    #[test]
    fn whole_floats_are_accepted_for_integer_columns() {
        assert_eq!(parse_u32("3.0"), Some(3));
        assert_eq!(parse_u32("-1"), None);
        assert_eq!(parse_i32("1999.0"), Some(1999));
        assert_eq!(parse_i32("-5"), Some(-5));
    }

    #[test]
    fn short_rows_are_kept_and_counted() {
        let csv = "LIST_NO,TOWN,STATE\n1,Boston\n2,Salem,MA\n";
        let parsed = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.ragged_rows, 1);
        assert!(parsed.records[0].state.is_none());
        assert_eq!(parsed.records[1].state.as_deref(), Some("MA"));
    }

    #[test]
    fn invalid_utf8_rows_are_skipped() {
        let mut bytes = b"LIST_NO,TOWN\n1,Boston\n2,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\n3,Salem\n");

        let parsed = parse_csv(&bytes).unwrap();
        assert_eq!(parsed.skipped_rows, 1);
        let ids: Vec<_> = parsed
            .records
            .iter()
            .filter_map(|r| r.list_no.as_deref())
            .collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let csv = "LIST_NO,TOWN\n1,Boston\n\n2,Salem\n";
        let parsed = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 2);
    }

    #[test]
    fn empty_document_has_no_header() {
        assert!(matches!(parse_csv(b""), Err(StoreError::MissingHeader)));
    }
}
