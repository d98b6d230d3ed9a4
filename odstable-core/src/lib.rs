//! odstable-core: read one sheet of an OpenDocument Spreadsheet into a typed table
//!
//! The pipeline opens the zip container, parses `content.xml` into a
//! namespace-aware element tree, selects a sheet, walks its rows under the
//! skip/header/limit policy, infers column types from the declared cell value
//! types and casts every value into a [`Table`].

pub mod config;
pub mod error;
pub mod inference;
pub mod reader;
pub mod table;

use std::io::{Read, Seek};
use std::path::Path;

pub use config::ReadOptions;
pub use error::{OdsError, Result};
pub use reader::{OdsDocument, SheetSelector, ValueType};
pub use table::{ColumnType, Table, Value};

/// Read one sheet of the ODS file at `path`
pub fn from_ods<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Table> {
    OdsDocument::open(path)?.read_table(options)
}

/// Read one sheet of an ODS archive from any seekable source
pub fn from_ods_reader<R: Read + Seek>(reader: R, options: &ReadOptions) -> Result<Table> {
    let content = reader::archive::read_content(reader)?;
    OdsDocument::parse(&content)?.read_table(options)
}

/// Names of every sheet in document order
pub fn sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    OdsDocument::open(path)?.sheet_names()
}
