//! Cell value resolution
//!
//! ODS cells declare their kind in `office:value-type`. String-like cells keep
//! their value in the `<text:p>` paragraph, typed cells in a value attribute:
//! `<table:table-cell office:value-type="float" office:value="3.5">`.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::xml::{Element, Node, OdsNames, QName};
use crate::error::{OdsError, Result};

/// Declared value type of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Float,
    Currency,
    Date,
    Time,
    Boolean,
    Percentage,
}

impl ValueType {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "string" => Ok(ValueType::String),
            "float" => Ok(ValueType::Float),
            "currency" => Ok(ValueType::Currency),
            "date" => Ok(ValueType::Date),
            "time" => Ok(ValueType::Time),
            "boolean" => Ok(ValueType::Boolean),
            "percentage" => Ok(ValueType::Percentage),
            other => Err(OdsError::UnsupportedCellType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Float => "float",
            ValueType::Currency => "currency",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Boolean => "boolean",
            ValueType::Percentage => "percentage",
        }
    }

    /// Attribute holding the value for attribute-backed types
    fn value_attribute<'a>(&self, names: &'a OdsNames) -> Option<&'a QName> {
        match self {
            ValueType::String | ValueType::Currency => None,
            ValueType::Float | ValueType::Percentage => Some(&names.value),
            ValueType::Date => Some(&names.date_value),
            ValueType::Time => Some(&names.time_value),
            ValueType::Boolean => Some(&names.boolean_value),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell's raw value together with its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCell {
    pub value: String,
    pub value_type: Option<ValueType>,
}

pub fn declared_type(cell: &Element, names: &OdsNames) -> Result<Option<ValueType>> {
    cell.attribute(&names.value_type)
        .map(ValueType::parse)
        .transpose()
}

/// Structural filler cell (`table:number-columns-repeated`)
pub fn is_padding(cell: &Element, names: &OdsNames) -> bool {
    cell.has_attribute(&names.columns_repeated)
}

pub fn resolve_cell_value(cell: &Element, names: &OdsNames) -> Result<ResolvedCell> {
    let value_type = declared_type(cell, names)?;

    let value = match value_type {
        None | Some(ValueType::String) => paragraph_text(cell, names),
        Some(ValueType::Currency) => strip_currency(&paragraph_text(cell, names)),
        Some(other) => match other.value_attribute(names) {
            Some(attribute) => cell.required_attribute(attribute)?.to_string(),
            None => paragraph_text(cell, names),
        },
    };

    Ok(ResolvedCell { value, value_type })
}

/// Keep only ASCII digits and '.', e.g. "$1,234.56" -> "1234.56"
pub fn strip_currency(text: &str) -> String {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    let re = NON_NUMERIC.get_or_init(|| Regex::new(r"[^0-9.]").unwrap());
    re.replace_all(text, "").into_owned()
}

/// Text of the first paragraph, or an empty string
pub fn paragraph_text(cell: &Element, names: &OdsNames) -> String {
    let mut text = String::new();
    if let Some(p) = cell.find(&names.text_p) {
        collect_text(p, names, &mut text);
    }
    text
}

fn collect_text(element: &Element, names: &OdsNames, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) if el.name == names.text_s => {
                let count = el
                    .attribute(&names.text_c)
                    .and_then(|c| c.parse::<usize>().ok())
                    .unwrap_or(1);
                out.extend(std::iter::repeat_n(' ', count));
            }
            Node::Element(el) if el.name == names.text_tab => out.push('\t'),
            Node::Element(el) if el.name == names.text_line_break => out.push('\n'),
            Node::Element(el) => collect_text(el, names, out),
        }
    }
}
