//! ODS reader: zip container, namespace-aware XML tree, sheets, rows and cells

use std::io::Cursor;
use std::path::Path;

pub mod archive;
pub mod cell;
pub mod rows;
pub mod sheet;
pub mod xml;

pub use cell::{ResolvedCell, ValueType};
pub use rows::{ParsedRow, RowPolicy, WalkedRows};
pub use sheet::SheetSelector;
pub use xml::{Element, NamespaceMap, OdsNames, QName};

use crate::config::ReadOptions;
use crate::error::Result;
use crate::table::{self, Table};

/// Parsed `content.xml` with the qualified names of its declared prefixes
#[derive(Debug, Clone)]
pub struct OdsDocument {
    root: Element,
    names: OdsNames,
}

impl OdsDocument {
    /// Open the ODS file at `path` and parse its content stream
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = archive::open_content(path)?;
        Self::parse(&content)
    }

    /// Parse raw `content.xml` bytes
    pub fn parse(content: &[u8]) -> Result<Self> {
        let root = xml::parse_document(content)?;
        let namespaces = xml::extract_namespaces(&mut Cursor::new(content))?;
        let names = OdsNames::new(&namespaces)?;
        Ok(Self { root, names })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn names(&self) -> &OdsNames {
        &self.names
    }

    pub fn sheet_names(&self) -> Result<Vec<String>> {
        let sheets = sheet::sheet_elements(&self.root, &self.names);
        sheet::sheet_names(&sheets, &self.names)
    }

    pub fn select_sheet(&self, selector: Option<&SheetSelector>) -> Result<&Element> {
        sheet::select_sheet(&self.root, &self.names, selector)
    }

    /// Select, walk and assemble one sheet into a typed table
    pub fn read_table(&self, options: &ReadOptions) -> Result<Table> {
        let sheet = self.select_sheet(options.sheet.as_ref())?;
        let walked = rows::walk_rows(
            sheet,
            &self.names,
            options.skip_lines,
            options.header,
            options.row_limit,
        )?;
        table::assemble(
            walked,
            options.column_names.as_deref(),
            options.column_types.as_deref(),
        )
    }
}
