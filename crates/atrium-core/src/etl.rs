//! CSV import pipeline
//!
//! Deliberately naive: the first line is the header, fields split on commas
//! with no quoted-comma handling, surrounding quotes and whitespace trimmed.
//! Rows whose field count does not match the header are dropped silently.
//! Good enough for the hand-exported spreadsheets this feeds on; anything
//! fancier belongs in the exporting tool.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{record_id, Record};

/// A parsed CSV: header names plus one map per surviving row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

/// Parse raw CSV text. Blank lines are skipped; an input with no header row
/// is an error.
pub fn parse_csv(text: &str) -> Result<CsvData> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| Error::InvalidInput("CSV input is empty".to_string()))?;
    let headers: Vec<String> = split_line(header_line);
    if headers.is_empty() {
        return Err(Error::InvalidInput("CSV header row is empty".to_string()));
    }

    let mut rows = Vec::new();
    for line in lines {
        let fields = split_line(line);
        if fields.len() != headers.len() {
            continue;
        }
        let mut row = Record::new();
        for (header, field) in headers.iter().zip(fields) {
            row.insert(header.clone(), Value::String(field));
        }
        rows.push(row);
    }

    Ok(CsvData { headers, rows })
}

fn split_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().trim_matches('"').to_string())
        .collect()
}

/// Map parsed rows onto store records. `mapping` pairs a destination field
/// name with the CSV header it reads from; unmapped headers are dropped, and
/// mapped headers absent from the row are skipped rather than written empty.
/// A record whose mapping yields no non-empty `id` gets a fresh
/// `imported_<millis>_<n>` one.
pub fn transform(rows: &[Record], mapping: &[(String, String)]) -> Vec<Record> {
    let millis = chrono::Utc::now().timestamp_millis();
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut record = Record::new();
            for (field, header) in mapping {
                if let Some(value) = row.get(header) {
                    record.insert(field.clone(), value.clone());
                }
            }
            let has_id = record_id(&record).is_some_and(|id| !id.is_empty());
            if !has_id {
                record.insert(
                    "id".to_string(),
                    Value::String(format!("imported_{}_{}", millis, index)),
                );
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record_id;

    const SAMPLE: &str = "name, url ,category\n\"Figma\",https://figma.com,design\n\nBroken,row\nNotion,https://notion.so,docs\n";

    #[test]
    fn test_parse_trims_and_unquotes() {
        let parsed = parse_csv(SAMPLE).unwrap();
        assert_eq!(parsed.headers, vec!["name", "url", "category"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0]["name"], "Figma");
        assert_eq!(parsed.rows[0]["url"], "https://figma.com");
    }

    #[test]
    fn test_mismatched_rows_dropped() {
        let parsed = parse_csv(SAMPLE).unwrap();
        assert!(parsed.rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            parse_csv("   \n  \n"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_transform_maps_and_generates_ids() {
        let parsed = parse_csv(SAMPLE).unwrap();
        let mapping = vec![
            ("name".to_string(), "name".to_string()),
            ("link".to_string(), "url".to_string()),
            ("notes".to_string(), "missing_header".to_string()),
        ];

        let records = transform(&parsed.rows, &mapping);
        assert_eq!(records.len(), 2);
        assert!(record_id(&records[0]).unwrap().starts_with("imported_"));
        assert_ne!(record_id(&records[0]), record_id(&records[1]));
        assert_eq!(records[0]["link"], "https://figma.com");
        // A mapped header absent from the row is skipped, not written empty
        assert!(!records[0].contains_key("notes"));
        assert!(!records[0].contains_key("category"));
    }

    #[test]
    fn test_transform_keeps_mapped_id() {
        let parsed = parse_csv("codigo,nombre\nt_externo,Figma\n").unwrap();
        let mapping = vec![
            ("id".to_string(), "codigo".to_string()),
            ("name".to_string(), "nombre".to_string()),
        ];

        let records = transform(&parsed.rows, &mapping);
        assert_eq!(record_id(&records[0]), Some("t_externo"));
    }

    #[test]
    fn test_transform_regenerates_missing_or_empty_id() {
        // Header "codigo" does not exist; the empty second row maps id to ""
        let parsed = parse_csv("nombre,codigo\nFigma,\n").unwrap();

        let unmapped = transform(
            &parsed.rows,
            &[("id".to_string(), "no_such_header".to_string())],
        );
        assert!(record_id(&unmapped[0]).unwrap().starts_with("imported_"));

        let empty = transform(&parsed.rows, &[("id".to_string(), "codigo".to_string())]);
        assert!(record_id(&empty[0]).unwrap().starts_with("imported_"));
    }
}
