//! Error type shared by every stage of the ODS pipeline

use std::path::PathBuf;

use crate::reader::cell::ValueType;

pub type Result<T> = std::result::Result<T, OdsError>;

#[derive(Debug, thiserror::Error)]
pub enum OdsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Neither a zip archive nor named like an ODS file
    #[error("Failed to read {} as an ODS file", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Archive has no content.xml entry")]
    MissingContentStream,

    #[error("content.xml has no root element")]
    EmptyDocument,

    #[error("Namespace prefix '{0}' is not declared on the document root")]
    MissingNamespace(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No sheet with name '{0}'")]
    NoSuchSheet(String),

    #[error("Sheet index {index} is out of range ({count} sheets)")]
    SheetIndexOutOfRange { index: usize, count: usize },

    /// `row` is the 1-based row number in the sheet, `column` is 0-based
    #[error(
        "Column {column} changes type from '{expected}' to '{found}' at row {row}"
    )]
    ColumnTypeMismatch {
        row: usize,
        column: usize,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Unknown column type '{0}'")]
    UnknownColumnType(String),

    #[error("Unsupported cell value type '{0}'")]
    UnsupportedCellType(String),

    #[error("Element is missing the '{0}' attribute")]
    MissingAttribute(String),

    #[error("column_names argument must be provided if header is set to be false")]
    MissingColumnNames,

    #[error("Sheet has no rows to read a header from")]
    EmptySheet,

    #[error("{names} column names given for {types} column types")]
    ColumnCountMismatch { names: usize, types: usize },

    #[error("Row {row} has {len} values but the table has {columns} columns")]
    RowTooLong {
        row: usize,
        len: usize,
        columns: usize,
    },

    #[error("Cannot cast '{value}' in column '{column}' to {column_type}")]
    CastError {
        value: String,
        column: String,
        column_type: String,
    },
}
