//! Typed table built from a walked sheet

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

use crate::config::ReadOptions;
use crate::error::{OdsError, Result};
use crate::reader::cell::ValueType;
use crate::reader::rows::WalkedRows;

/// Semantic column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    DateTime,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::DateTime => "datetime",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Cast a raw cell value. Empty input is `Null` for every type, and
    /// whitespace-only input is `Null` for every type but `Text`.
    pub fn cast(&self, raw: &str) -> Option<Value> {
        let trimmed = raw.trim();
        match self {
            ColumnType::Text if raw.is_empty() => Some(Value::Null),
            ColumnType::Text => Some(Value::Text(raw.to_string())),
            _ if trimmed.is_empty() => Some(Value::Null),
            ColumnType::Number => trimmed.parse::<f64>().ok().map(Value::Number),
            ColumnType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(Value::Boolean(true)),
                "false" | "no" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            ColumnType::DateTime => parse_datetime(trimmed).map(Value::DateTime),
        }
    }
}

impl From<ValueType> for ColumnType {
    fn from(value_type: ValueType) -> Self {
        match value_type {
            ValueType::String => ColumnType::Text,
            ValueType::Float | ValueType::Currency | ValueType::Percentage => ColumnType::Number,
            ValueType::Date | ValueType::Time => ColumnType::DateTime,
            ValueType::Boolean => ColumnType::Boolean,
        }
    }
}

impl FromStr for ColumnType {
    type Err = OdsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "number" => Ok(ColumnType::Number),
            "datetime" => Ok(ColumnType::DateTime),
            "boolean" => Ok(ColumnType::Boolean),
            _ => Err(OdsError::UnknownColumnType(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spreadsheet epoch that time-only values are anchored on
fn spreadsheet_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// ISO date, ISO date-time, or an ODS duration such as `PT12H30M00S`.
///
/// Durations may carry a day component and a leading minus sign
/// (`P1DT2H`, `-PT1H`). Year and month components are not accepted.
/// Out-of-range durations are `None`.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(date) = s.parse::<NaiveDate>() {
        return date.and_hms_opt(0, 0, 0);
    }

    spreadsheet_epoch()?.checked_add_signed(parse_duration(s)?)
}

fn parse_duration(s: &str) -> Option<TimeDelta> {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    let re = DURATION.get_or_init(|| {
        Regex::new(r"^(-)?P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$").unwrap()
    });
    let caps = re.captures(s)?;
    // bare "P" or "PT"
    if (2..=5).all(|i| caps.get(i).is_none()) {
        return None;
    }

    let component = |i: usize| -> Option<i64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let seconds: f64 = caps.get(5).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;

    let whole_seconds = component(2)?
        .checked_mul(86_400)?
        .checked_add(component(3)?.checked_mul(3_600)?)?
        .checked_add(component(4)?.checked_mul(60)?)?;
    let fraction_millis = (seconds * 1000.0).round();
    if fraction_millis >= i64::MAX as f64 {
        return None;
    }
    let millis = whole_seconds
        .checked_mul(1000)?
        .checked_add(fraction_millis as i64)?;

    let millis = if caps.get(1).is_some() { -millis } else { millis };
    TimeDelta::try_milliseconds(millis)
}

/// A typed cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Column names, column types and typed rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    column_names: Vec<String>,
    column_types: Vec<ColumnType>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, casting every raw value to its column type.
    ///
    /// Short rows are padded with `Null`; a row longer than the column list
    /// or a value that cannot be cast fails the whole construction.
    pub fn new(
        column_names: Vec<String>,
        column_types: Vec<ColumnType>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        if column_names.len() != column_types.len() {
            return Err(OdsError::ColumnCountMismatch {
                names: column_names.len(),
                types: column_types.len(),
            });
        }

        let width = column_names.len();
        let mut typed_rows = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(OdsError::RowTooLong {
                    row: index + 1,
                    len: row.len(),
                    columns: width,
                });
            }

            let mut typed = Vec::with_capacity(width);
            for (column, raw) in row.iter().enumerate() {
                let column_type = column_types[column];
                let value = column_type.cast(raw).ok_or_else(|| OdsError::CastError {
                    value: raw.clone(),
                    column: column_names[column].clone(),
                    column_type: column_type.to_string(),
                })?;
                typed.push(value);
            }
            typed.resize(width, Value::Null);
            typed_rows.push(typed);
        }

        Ok(Self {
            column_names,
            column_types,
            rows: typed_rows,
        })
    }

    /// Named constructor reading one sheet of an ODS file
    pub fn from_ods<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self> {
        crate::from_ods(path, options)
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the named column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_names.iter().position(|n| n == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

/// Combine walked rows with column names and types into a table
pub fn assemble(
    walked: WalkedRows,
    column_names: Option<&[String]>,
    column_types: Option<&[ColumnType]>,
) -> Result<Table> {
    let WalkedRows {
        header,
        rows,
        observations,
    } = walked;
    let mut rows = rows.into_iter();

    let names = if header {
        if column_names.is_some() {
            debug!("Ignoring column_names because the header row supplies them");
        }
        rows.next().ok_or(OdsError::EmptySheet)?.into_values()
    } else {
        column_names
            .map(<[String]>::to_vec)
            .ok_or(OdsError::MissingColumnNames)?
    };

    let types = match column_types {
        Some(types) => types.to_vec(),
        None => observations.column_types(names.len()),
    };

    let data = rows.map(|row| row.into_values()).collect();
    Table::new(names, types, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_value_type_mapping() {
        assert_eq!(ColumnType::from(ValueType::String), ColumnType::Text);
        assert_eq!(ColumnType::from(ValueType::Float), ColumnType::Number);
        assert_eq!(ColumnType::from(ValueType::Currency), ColumnType::Number);
        assert_eq!(ColumnType::from(ValueType::Percentage), ColumnType::Number);
        assert_eq!(ColumnType::from(ValueType::Date), ColumnType::DateTime);
        assert_eq!(ColumnType::from(ValueType::Time), ColumnType::DateTime);
        assert_eq!(ColumnType::from(ValueType::Boolean), ColumnType::Boolean);
    }

    #[test]
    fn test_parse_column_type_names() {
        assert_eq!("DateTime".parse::<ColumnType>().unwrap(), ColumnType::DateTime);
        assert!(matches!(
            "decimal".parse::<ColumnType>(),
            Err(OdsError::UnknownColumnType(t)) if t == "decimal"
        ));
    }

    #[test]
    fn test_casting() {
        assert_eq!(ColumnType::Number.cast("1234.56"), Some(Value::Number(1234.56)));
        assert_eq!(ColumnType::Number.cast("abc"), None);
        assert_eq!(ColumnType::Boolean.cast("TRUE"), Some(Value::Boolean(true)));
        assert_eq!(ColumnType::Text.cast(""), Some(Value::Null));
        assert_eq!(ColumnType::Text.cast("   "), Some(Value::Text("   ".into())));
        assert_eq!(ColumnType::Number.cast("  "), Some(Value::Null));

        let date = NaiveDate::from_ymd_opt(2023, 8, 1).unwrap();
        assert_eq!(
            ColumnType::DateTime.cast("2023-08-01"),
            Some(Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap()))
        );
        assert_eq!(
            ColumnType::DateTime.cast("2023-08-01T10:15:30"),
            Some(Value::DateTime(date.and_hms_opt(10, 15, 30).unwrap()))
        );
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
        assert_eq!(
            ColumnType::DateTime.cast("PT12H30M00S"),
            Some(Value::DateTime(epoch.and_hms_opt(12, 30, 0).unwrap()))
        );
        assert_eq!(
            ColumnType::DateTime.cast("P1DT2H"),
            Some(Value::DateTime(
                NaiveDate::from_ymd_opt(1899, 12, 31).unwrap().and_hms_opt(2, 0, 0).unwrap()
            ))
        );
        assert_eq!(
            ColumnType::DateTime.cast("-PT1H"),
            Some(Value::DateTime(
                NaiveDate::from_ymd_opt(1899, 12, 29).unwrap().and_hms_opt(23, 0, 0).unwrap()
            ))
        );
        assert_eq!(ColumnType::DateTime.cast("PT"), None);
        assert_eq!(ColumnType::DateTime.cast("P1Y"), None);
    }

    #[test]
    fn test_oversized_durations_fail_to_cast() {
        for raw in [
            "PT9999999999999999H",
            "P9999999999999999D",
            "PT9223372036854775807S",
            "PT99999999999999999999M",
        ] {
            assert_eq!(ColumnType::DateTime.cast(raw), None, "{raw}");
        }

        let err = Table::new(
            vec!["at".to_string()],
            vec![ColumnType::DateTime],
            vec![vec!["PT9999999999999999H".to_string()]],
        )
        .unwrap_err();
        assert!(matches!(err, OdsError::CastError { column, .. } if column == "at"));
    }

    #[test]
    fn test_new_pads_short_rows() {
        let table = Table::new(
            strings(&["a", "b"]),
            vec![ColumnType::Text, ColumnType::Number],
            vec![strings(&["x", "1"]), strings(&["y"])],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec![Value::Text("y".into()), Value::Null]);
        assert_eq!(
            table.column("b").unwrap(),
            vec![&Value::Number(1.0), &Value::Null]
        );
    }

    #[test]
    fn test_new_is_atomic() {
        let too_long = Table::new(
            strings(&["a"]),
            vec![ColumnType::Text],
            vec![strings(&["x", "y"])],
        );
        assert!(matches!(
            too_long,
            Err(OdsError::RowTooLong { row: 1, len: 2, columns: 1 })
        ));

        let bad_cast = Table::new(
            strings(&["n"]),
            vec![ColumnType::Number],
            vec![strings(&["1"]), strings(&["one"])],
        );
        assert!(matches!(bad_cast, Err(OdsError::CastError { .. })));

        let mismatch = Table::new(strings(&["a", "b"]), vec![ColumnType::Text], vec![]);
        assert!(matches!(
            mismatch,
            Err(OdsError::ColumnCountMismatch { names: 2, types: 1 })
        ));
    }
}
