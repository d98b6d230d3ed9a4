//! Read options, buildable in code or loaded from a TOML file
//!
//! ```toml
//! sheet = "Sales"        # or a 0-based index
//! skip_lines = 2
//! header = true
//! row_limit = 100
//! column_types = ["text", "number", "datetime"]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{OdsError, Result};
use crate::reader::sheet::SheetSelector;
use crate::table::ColumnType;

/// Options for reading one sheet into a table
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Sheet to read; the first sheet when `None`
    pub sheet: Option<SheetSelector>,
    /// Rows to discard before data begins (the header row is exempt)
    pub skip_lines: usize,
    /// Whether the first retained row holds the column names
    pub header: bool,
    /// Maximum number of data rows
    pub row_limit: Option<usize>,
    /// Explicit column types, bypassing inference
    pub column_types: Option<Vec<ColumnType>>,
    /// Column names, required when `header` is false
    pub column_names: Option<Vec<String>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            skip_lines: 0,
            header: true,
            row_limit: None,
            column_types: None,
            column_names: None,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, sheet: impl Into<SheetSelector>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = Some(row_limit);
        self
    }

    pub fn column_types(mut self, column_types: Vec<ColumnType>) -> Self {
        self.column_types = Some(column_types);
        self
    }

    pub fn column_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Load options from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from TOML text. Ill-typed values are `InvalidArgument`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawOptions =
            toml::from_str(content).map_err(|e| OdsError::InvalidArgument(e.to_string()))?;
        raw.try_into()
    }
}

/// On-disk shape; column types stay textual so unknown names surface as
/// `UnknownColumnType` rather than a TOML error
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    sheet: Option<SheetSelector>,
    #[serde(default)]
    skip_lines: usize,
    header: Option<bool>,
    row_limit: Option<usize>,
    column_types: Option<Vec<String>>,
    column_names: Option<Vec<String>>,
}

impl TryFrom<RawOptions> for ReadOptions {
    type Error = OdsError;

    fn try_from(raw: RawOptions) -> Result<Self> {
        let column_types = raw
            .column_types
            .map(|types| {
                types
                    .iter()
                    .map(|t| t.parse::<ColumnType>())
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            sheet: raw.sheet,
            skip_lines: raw.skip_lines,
            header: raw.header.unwrap_or(true),
            row_limit: raw.row_limit,
            column_types,
            column_names: raw.column_names,
        })
    }
}
