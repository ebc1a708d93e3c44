//! Stateless value conversion keyed by cast tag.
//!
//! Each cast maps to a pure coercion function over raw string values.
//! Already-typed values pass through unchanged, so conversion is idempotent;
//! list values convert element-wise. The file and document casts touch the
//! filesystem and fail fast on a missing or unreadable target.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ConversionError;
use crate::types::Cast;
use crate::value::Value;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Converts a value according to the given cast tag.
///
/// Lists convert element-wise; non-string values are returned unchanged.
///
/// # Errors
///
/// [`ConversionError`] naming the offending raw value when it cannot be
/// interpreted as the target type, or when a file/document target is missing
/// or unreadable.
pub fn convert(cast: Cast, value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::List(items) => {
            let converted = items
                .into_iter()
                .map(|item| convert_scalar(cast, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::List(converted))
        }
        other => convert_scalar(cast, other),
    }
}

fn convert_scalar(cast: Cast, value: Value) -> Result<Value, ConversionError> {
    let raw = match value {
        Value::Str(raw) => raw,
        already_typed => return Ok(already_typed),
    };

    match cast {
        Cast::String | Cast::Boolean => Ok(Value::Str(raw)),
        Cast::Atom => Ok(Value::Atom(raw)),
        Cast::Integer => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| invalid(&raw, "an integer")),
        Cast::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid(&raw, "a float")),
        Cast::Date => parse_date(&raw)
            .map(Value::Date)
            .ok_or_else(|| invalid(&raw, "a date")),
        Cast::Time => parse_time(&raw)
            .map(Value::Time)
            .ok_or_else(|| invalid(&raw, "a time")),
        Cast::DateTime => parse_datetime(&raw)
            .map(Value::DateTime)
            .ok_or_else(|| invalid(&raw, "a datetime")),
        Cast::File => {
            let path = Path::new(&raw);
            if path.exists() {
                Ok(Value::Path(path.to_path_buf()))
            } else {
                Err(ConversionError::MissingFile(raw))
            }
        }
        Cast::Document => load_document(&raw),
    }
}

fn invalid(value: &str, target: &'static str) -> ConversionError {
    ConversionError::Invalid {
        value: value.to_string(),
        target,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn load_document(raw: &str) -> Result<Value, ConversionError> {
    let path = Path::new(raw);
    if !path.exists() {
        return Err(ConversionError::MissingFile(raw.to_string()));
    }

    let text = std::fs::read_to_string(path).map_err(|e| ConversionError::Document {
        path: raw.to_string(),
        detail: e.to_string(),
    })?;

    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    let doc = if is_json {
        serde_json::from_str(&text).map_err(|e| ConversionError::Document {
            path: raw.to_string(),
            detail: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&text).map_err(|e| ConversionError::Document {
            path: raw.to_string(),
            detail: e.to_string(),
        })?
    };

    Ok(Value::Doc(doc))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_string_passthrough() {
        let value = convert(Cast::String, Value::from("anything")).unwrap();
        assert_eq!(value, Value::from("anything"));
    }

    #[test]
    fn test_boolean_passthrough() {
        let value = convert(Cast::Boolean, Value::Bool(true)).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_integer_conversion_is_idempotent() {
        let first = convert(Cast::Integer, Value::from("42")).unwrap();
        let second = convert(Cast::Integer, Value::from("42")).unwrap();
        assert_eq!(first, Value::Int(42));
        assert_eq!(first, second);

        // An already-converted value passes through untouched.
        let again = convert(Cast::Integer, first.clone()).unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_integer_error_quotes_the_raw_value() {
        let err = convert(Cast::Integer, Value::from("4x")).unwrap_err();
        assert_eq!(err.to_string(), "cannot interpret '4x' as an integer");
    }

    #[test]
    fn test_float_conversion() {
        let value = convert(Cast::Float, Value::from("3.25")).unwrap();
        assert_eq!(value, Value::Float(3.25));
        assert!(convert(Cast::Float, Value::from("pi")).is_err());
    }

    #[test]
    fn test_atom_conversion() {
        let value = convert(Cast::Atom, Value::from("fast")).unwrap();
        assert_eq!(value, Value::Atom("fast".to_string()));
    }

    #[test]
    fn test_date_conversion() {
        let value = convert(Cast::Date, Value::from("2011-02-25")).unwrap();
        assert_eq!(
            value,
            Value::Date(NaiveDate::from_ymd_opt(2011, 2, 25).unwrap())
        );
        assert!(convert(Cast::Date, Value::from("not-a-date")).is_err());
    }

    #[test]
    fn test_time_conversion() {
        let value = convert(Cast::Time, Value::from("14:30:05")).unwrap();
        assert_eq!(
            value,
            Value::Time(NaiveTime::from_hms_opt(14, 30, 5).unwrap())
        );
        let short = convert(Cast::Time, Value::from("14:30")).unwrap();
        assert_eq!(
            short,
            Value::Time(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_datetime_conversion() {
        let value = convert(Cast::DateTime, Value::from("2011-02-25T14:30:05")).unwrap();
        let expected = NaiveDate::from_ymd_opt(2011, 2, 25)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(value, Value::DateTime(expected));
    }

    #[test]
    fn test_file_checks_existence() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let value = convert(Cast::File, Value::Str(path.clone())).unwrap();
        assert_eq!(value.as_path(), Some(Path::new(&path)));

        let err = convert(Cast::File, Value::from("/no/such/file/here")).unwrap_err();
        assert_eq!(err, ConversionError::MissingFile("/no/such/file/here".to_string()));
    }

    #[test]
    fn test_document_loads_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "name: demo\nretries: 3").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let value = convert(Cast::Document, Value::Str(path)).unwrap();
        let doc = match value {
            Value::Doc(doc) => doc,
            other => panic!("expected a document, got {other:?}"),
        };
        assert_eq!(doc["name"], "demo");
        assert_eq!(doc["retries"], 3);
    }

    #[test]
    fn test_document_loads_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{\"enabled\": true}}").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let value = convert(Cast::Document, Value::Str(path)).unwrap();
        let doc = match value {
            Value::Doc(doc) => doc,
            other => panic!("expected a document, got {other:?}"),
        };
        assert_eq!(doc["enabled"], true);
    }

    #[test]
    fn test_document_rejects_garbage() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{not json").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = convert(Cast::Document, Value::Str(path)).unwrap_err();
        assert!(matches!(err, ConversionError::Document { .. }));
    }

    #[test]
    fn test_lists_convert_element_wise() {
        let value = convert(Cast::Integer, Value::from(vec!["1", "2", "3"])).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );

        let err = convert(Cast::Integer, Value::from(vec!["1", "x"])).unwrap_err();
        assert_eq!(err.to_string(), "cannot interpret 'x' as an integer");
    }
}
