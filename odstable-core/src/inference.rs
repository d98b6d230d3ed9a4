//! Column type inference from declared cell value types

use std::collections::BTreeMap;

use crate::error::{OdsError, Result};
use crate::reader::cell::ValueType;
use crate::reader::rows::ParsedRow;
use crate::table::ColumnType;

/// Column position (0-based) -> the single value type seen there
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnObservations(BTreeMap<usize, ValueType>);

impl ColumnObservations {
    /// Observe every typed cell of the given data rows.
    /// Cells without a declared type (blank cells) are not observed.
    pub fn observe(rows: &[ParsedRow]) -> Result<Self> {
        let mut observations = Self::default();
        for row in rows {
            for (column, cell) in row.cells.iter().enumerate() {
                if let Some(value_type) = cell.value_type {
                    observations.record(row.number, column, value_type)?;
                }
            }
        }
        Ok(observations)
    }

    /// Record one cell; a type differing from an earlier observation is fatal
    pub fn record(&mut self, row: usize, column: usize, value_type: ValueType) -> Result<()> {
        match self.0.get(&column) {
            Some(&expected) if expected != value_type => Err(OdsError::ColumnTypeMismatch {
                row,
                column,
                expected,
                found: value_type,
            }),
            Some(_) => Ok(()),
            None => {
                self.0.insert(column, value_type);
                Ok(())
            }
        }
    }

    pub fn get(&self, column: usize) -> Option<ValueType> {
        self.0.get(&column).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Observations sorted by column position
    pub fn iter(&self) -> impl Iterator<Item = (usize, ValueType)> + '_ {
        self.0.iter().map(|(&column, &value_type)| (column, value_type))
    }

    /// Semantic types for the first `width` columns; unobserved columns are text
    pub fn column_types(&self, width: usize) -> Vec<ColumnType> {
        (0..width)
            .map(|column| {
                self.get(column)
                    .map(ColumnType::from)
                    .unwrap_or(ColumnType::Text)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::cell::ResolvedCell;

    fn row(number: usize, types: &[Option<ValueType>]) -> ParsedRow {
        ParsedRow {
            number,
            cells: types
                .iter()
                .map(|&value_type| ResolvedCell {
                    value: String::new(),
                    value_type,
                })
                .collect(),
        }
    }

    #[test]
    fn test_consistent_columns() {
        let rows = vec![
            row(2, &[Some(ValueType::String), Some(ValueType::Float)]),
            row(3, &[Some(ValueType::String), Some(ValueType::Float)]),
        ];
        let observations = ColumnObservations::observe(&rows).unwrap();
        assert_eq!(
            observations.iter().collect::<Vec<_>>(),
            vec![(0, ValueType::String), (1, ValueType::Float)]
        );
        assert_eq!(
            observations.column_types(2),
            vec![ColumnType::Text, ColumnType::Number]
        );
    }

    #[test]
    fn test_mismatch_names_row_and_column() {
        let rows = vec![
            row(2, &[Some(ValueType::String), Some(ValueType::Float)]),
            row(5, &[Some(ValueType::String), Some(ValueType::String)]),
        ];
        let err = ColumnObservations::observe(&rows).unwrap_err();
        assert!(matches!(
            err,
            OdsError::ColumnTypeMismatch {
                row: 5,
                column: 1,
                expected: ValueType::Float,
                found: ValueType::String,
            }
        ));
    }

    #[test]
    fn test_blank_cells_are_not_observed() {
        let rows = vec![
            row(1, &[None, Some(ValueType::Date)]),
            row(2, &[Some(ValueType::Currency), None]),
        ];
        let observations = ColumnObservations::observe(&rows).unwrap();
        assert_eq!(
            observations.column_types(3),
            vec![ColumnType::Number, ColumnType::DateTime, ColumnType::Text]
        );
    }
}
