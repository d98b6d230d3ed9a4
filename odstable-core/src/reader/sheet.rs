//! Sheet lookup by position or name

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::xml::{Element, OdsNames};
use crate::error::{OdsError, Result};

/// Which worksheet to read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// 0-based position in document order
    Index(usize),
    /// Exact `table:name`
    Name(String),
}

impl From<usize> for SheetSelector {
    fn from(index: usize) -> Self {
        SheetSelector::Index(index)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_string())
    }
}

impl From<String> for SheetSelector {
    fn from(name: String) -> Self {
        SheetSelector::Name(name)
    }
}

/// All-digit text selects by position, anything else by name
impl FromStr for SheetSelector {
    type Err = OdsError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(OdsError::InvalidArgument(
                "sheet argument must be an int or a sheet name".to_string(),
            ));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            let index = s
                .parse::<usize>()
                .map_err(|e| OdsError::InvalidArgument(format!("sheet index '{s}': {e}")))?;
            Ok(SheetSelector::Index(index))
        } else {
            Ok(SheetSelector::Name(s.to_string()))
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{i}"),
            SheetSelector::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Every `table:table` element in document order
pub fn sheet_elements<'a>(root: &'a Element, names: &'a OdsNames) -> Vec<&'a Element> {
    root.descendants(&names.table).collect()
}

/// Names of all sheets, parallel to [`sheet_elements`]
pub fn sheet_names(sheets: &[&Element], names: &OdsNames) -> Result<Vec<String>> {
    sheets
        .iter()
        .map(|sheet| {
            sheet
                .required_attribute(&names.table_name)
                .map(str::to_string)
        })
        .collect()
}

/// Resolve the selector to one sheet; `None` picks the first
pub fn select_sheet<'a>(
    root: &'a Element,
    names: &'a OdsNames,
    selector: Option<&SheetSelector>,
) -> Result<&'a Element> {
    let sheets = sheet_elements(root, names);

    let index = match selector {
        None => 0,
        Some(SheetSelector::Index(index)) => *index,
        Some(SheetSelector::Name(name)) => {
            let sheet_names = sheet_names(&sheets, names)?;
            sheet_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| OdsError::NoSuchSheet(name.clone()))?
        }
    };

    let count = sheets.len();
    let sheet = sheets
        .get(index)
        .copied()
        .ok_or(OdsError::SheetIndexOutOfRange { index, count })?;

    debug!(
        "Selected sheet {} of {}: {:?}",
        index,
        count,
        sheet.attribute(&names.table_name)
    );
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::xml::{extract_namespaces, parse_document};
    use std::io::Cursor;

    const DOC: &str = r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
<office:body><office:spreadsheet>
<table:table table:name="Sheet1"><table:table-row><table:table-cell><text:p>one</text:p></table:table-cell></table:table-row></table:table>
<table:table table:name="Sheet2"><table:table-row><table:table-cell><text:p>two</text:p></table:table-cell></table:table-row></table:table>
</office:spreadsheet></office:body></office:document-content>"#;

    fn load() -> (Element, OdsNames) {
        let root = parse_document(DOC.as_bytes()).unwrap();
        let names = OdsNames::new(&extract_namespaces(&mut Cursor::new(DOC.as_bytes())).unwrap())
            .unwrap();
        (root, names)
    }

    #[test]
    fn test_sheet_names_in_document_order() {
        let (root, names) = load();
        let sheets = sheet_elements(&root, &names);
        assert_eq!(sheet_names(&sheets, &names).unwrap(), vec!["Sheet1", "Sheet2"]);
    }

    #[test]
    fn test_default_is_first_sheet() {
        let (root, names) = load();
        let sheet = select_sheet(&root, &names, None).unwrap();
        assert_eq!(sheet.attribute(&names.table_name), Some("Sheet1"));
    }

    #[test]
    fn test_name_and_index_select_same_sheet() {
        let (root, names) = load();
        let by_index = select_sheet(&root, &names, Some(&SheetSelector::Index(1))).unwrap();
        let by_name = select_sheet(&root, &names, Some(&"Sheet2".into())).unwrap();
        assert_eq!(by_index, by_name);
    }

    #[test]
    fn test_unknown_name_and_index() {
        let (root, names) = load();
        assert!(matches!(
            select_sheet(&root, &names, Some(&"Missing".into())),
            Err(OdsError::NoSuchSheet(name)) if name == "Missing"
        ));
        assert!(matches!(
            select_sheet(&root, &names, Some(&SheetSelector::Index(2))),
            Err(OdsError::SheetIndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!("3".parse::<SheetSelector>().unwrap(), SheetSelector::Index(3));
        assert_eq!(
            "Data 2024".parse::<SheetSelector>().unwrap(),
            SheetSelector::Name("Data 2024".to_string())
        );
        assert!(matches!(
            "".parse::<SheetSelector>(),
            Err(OdsError::InvalidArgument(_))
        ));
    }
}
