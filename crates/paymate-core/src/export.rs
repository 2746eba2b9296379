//! # CSV Export
//!
//! Turns any list of serializable records into CSV text for download.
//!
//! ```text
//!   records ──serde_json──► [{ "id": .., "amount": .. }, ..]
//!                                 │
//!        header = keys of the first object, in field order
//!                                 │
//!                                 ▼
//!   id,amount
//!   "a1","1500"
//!   "a2","2400.5"
//! ```
//!
//! Every data cell is quoted with embedded quotes doubled. Newlines inside a
//! value are written as-is. Nested objects and arrays are written as JSON.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult, ValidationError};

/// Renders `records` as CSV. Returns `Ok(None)` for an empty slice.
///
/// The header row is written as-is; every data cell is quoted. There is no
/// trailing newline.
///
/// ## Errors
/// - `Validation` if a record does not serialize to a JSON object
/// - `Export` if the CSV writer fails
pub fn to_csv<T: Serialize>(records: &[T]) -> CoreResult<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }

    let rows = records
        .iter()
        .map(|record| match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(not_an_object("record is not an object")),
            Err(e) => Err(not_an_object(&e.to_string())),
        })
        .collect::<CoreResult<Vec<Map<String, Value>>>>()?;

    let headers: Vec<&str> = match rows.first() {
        Some(first) => first.keys().map(String::as_str).collect(),
        None => return Ok(None),
    };

    let mut out = Vec::new();
    {
        let mut header = writer(QuoteStyle::Necessary).from_writer(&mut out);
        header.write_record(&headers)?;
        header.flush().map_err(csv::Error::from)?;
    }
    {
        let mut body = writer(QuoteStyle::Always).from_writer(&mut out);
        for row in &rows {
            body.write_record(headers.iter().map(|h| cell_text(row.get(*h))))?;
        }
        body.flush().map_err(csv::Error::from)?;
    }

    if out.last() == Some(&b'\n') {
        out.pop();
    }
    String::from_utf8(out)
        .map(Some)
        .map_err(|e| not_an_object(&e.to_string()))
}

fn writer(style: QuoteStyle) -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .has_headers(false)
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'));
    builder
}

fn not_an_object(reason: &str) -> CoreError {
    ValidationError::InvalidFormat {
        field: "record".to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
    }
}

/// Whole-valued floats are written without a trailing `.0`.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        invoice_number: String,
        client_name: String,
        total: f64,
        notes: Option<String>,
    }

    fn row(number: &str, client: &str, total: f64) -> Row {
        Row {
            invoice_number: number.to_string(),
            client_name: client.to_string(),
            total,
            notes: None,
        }
    }

    #[test]
    fn test_empty_input_has_no_output() {
        let rows: Vec<Row> = vec![];
        assert_eq!(to_csv(&rows).unwrap(), None);
    }

    #[test]
    fn test_header_follows_field_order() {
        let csv = to_csv(&[row("INV-1", "Acme", 2596.0)]).unwrap().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("invoiceNumber,clientName,total,notes"));
        assert_eq!(lines.next(), Some("\"INV-1\",\"Acme\",\"2596\",\"\""));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = to_csv(&[row("INV-2", "The \"Best\" Co", 10.5)])
            .unwrap()
            .unwrap();
        assert!(csv.ends_with("\"INV-2\",\"The \"\"Best\"\" Co\",\"10.5\",\"\""));
    }

    #[test]
    fn test_rows_joined_by_newline() {
        let csv = to_csv(&[row("A", "x", 1.0), row("B", "y", 2.0)])
            .unwrap()
            .unwrap();
        assert_eq!(csv.split('\n').count(), 3);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_embedded_newline_is_written_raw() {
        let mut multi = row("C", "Acme", 1.0);
        multi.notes = Some("line one\nline two".to_string());
        let csv = to_csv(&[multi]).unwrap().unwrap();
        assert_eq!(
            csv,
            "invoiceNumber,clientName,total,notes\n\"C\",\"Acme\",\"1\",\"line one\nline two\""
        );
    }

    #[test]
    fn test_nested_values_are_json() {
        #[derive(Serialize)]
        struct WithItems {
            id: String,
            items: Vec<u32>,
        }
        let csv = to_csv(&[WithItems {
            id: "a".to_string(),
            items: vec![1, 2],
        }])
        .unwrap()
        .unwrap();
        assert_eq!(csv, "id,items\n\"a\",\"[1,2]\"");
    }

    #[test]
    fn test_non_object_records_are_rejected() {
        let err = to_csv(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
