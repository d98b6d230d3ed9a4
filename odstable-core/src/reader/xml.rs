//! In-memory XML tree for content.xml, with namespace-qualified names

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Reader};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, Seek, SeekFrom};
use tracing::debug;

use crate::error::{OdsError, Result};

/// A namespace-qualified XML name: (namespace URI, local name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: Option<String>,
    local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// A name outside any namespace
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    fn resolved(ns: ResolveResult<'_>, local: &[u8]) -> Self {
        let namespace = match ns {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            _ => None,
        };
        Self {
            namespace,
            local: String::from_utf8_lossy(local).into_owned(),
        }
    }
}

impl fmt::Display for QName {
    // Clark notation, e.g. {urn:...:table:1.0}table-row
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Prefix -> URI declarations found on the document root.
/// The default namespace, if any, is stored under the empty prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap(BTreeMap<String, String>);

impl NamespaceMap {
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.0.insert(prefix.into(), uri.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    /// Look up a prefix that the caller requires to be declared
    pub fn uri(&self, prefix: &str) -> Result<&str> {
        self.get(prefix)
            .ok_or_else(|| OdsError::MissingNamespace(prefix.to_string()))
    }

    /// Qualify a local name under a declared prefix
    pub fn qualify(&self, prefix: &str, local: &str) -> Result<QName> {
        Ok(QName::new(self.uri(prefix)?, local))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read the namespace declarations of the root element.
///
/// The stream is rewound first, and reading stops at the first start tag.
pub fn extract_namespaces<R: BufRead + Seek>(stream: &mut R) -> Result<NamespaceMap> {
    stream.seek(SeekFrom::Start(0))?;
    let mut reader = Reader::from_reader(stream);
    let mut buf = Vec::new();
    let mut namespaces = NamespaceMap::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    if key == b"xmlns" {
                        namespaces.insert("", attr.unescape_value()?.into_owned());
                    } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                        namespaces.insert(
                            String::from_utf8_lossy(prefix).into_owned(),
                            attr.unescape_value()?.into_owned(),
                        );
                    }
                }
                break;
            }
            Event::Eof => return Err(OdsError::EmptyDocument),
            _ => {}
        }
        buf.clear();
    }

    debug!("Found {} namespace declarations on root", namespaces.len());
    Ok(namespaces)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<(QName, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &QName) -> bool {
        self.attribute(name).is_some()
    }

    /// Attribute lookup that fails with the attribute's qualified name
    pub fn required_attribute(&self, name: &QName) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| OdsError::MissingAttribute(name.to_string()))
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given name
    pub fn find(&self, name: &QName) -> Option<&Element> {
        self.elements().find(|el| el.name == *name)
    }

    /// All descendant elements with the given name, in document order
    pub fn descendants<'a>(&'a self, name: &'a QName) -> Descendants<'a> {
        Descendants {
            name,
            stack: vec![self.children.iter()],
        }
    }
}

pub struct Descendants<'a> {
    name: &'a QName,
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    if el.name == *self.name {
                        return Some(el);
                    }
                }
                Some(Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Parse a whole XML document into an element tree
pub fn parse_document(content: &[u8]) -> Result<Element> {
    let mut reader = NsReader::from_reader(content);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = start_element(&reader, &e)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = start_element(&reader, &e)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    close_element(&mut stack, &mut root, element);
                }
            }
            Event::Text(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape()?;
                    if !text.is_empty() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::Text(String::from_utf8_lossy(e.as_ref()).into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or(OdsError::EmptyDocument)
}

fn start_element<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<Element> {
    let (ns, local) = reader.resolve_element(e.name());
    let name = QName::resolved(ns, local.as_ref());

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        // Declarations are read separately by extract_namespaces
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        let attr_name = QName::resolved(ns, local.as_ref());
        attributes.push((attr_name, attr.unescape_value()?.into_owned()));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn close_element(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Every qualified name the sheet walk needs, built once per document
#[derive(Debug, Clone)]
pub struct OdsNames {
    pub table: QName,
    pub table_name: QName,
    pub table_row: QName,
    pub table_cell: QName,
    pub columns_repeated: QName,
    pub text_p: QName,
    pub text_s: QName,
    pub text_c: QName,
    pub text_tab: QName,
    pub text_line_break: QName,
    pub value_type: QName,
    pub value: QName,
    pub date_value: QName,
    pub time_value: QName,
    pub boolean_value: QName,
}

impl OdsNames {
    pub fn new(namespaces: &NamespaceMap) -> Result<Self> {
        let table = |local: &str| namespaces.qualify("table", local);
        let text = |local: &str| namespaces.qualify("text", local);
        let office = |local: &str| namespaces.qualify("office", local);

        Ok(Self {
            table: table("table")?,
            table_name: table("name")?,
            table_row: table("table-row")?,
            table_cell: table("table-cell")?,
            columns_repeated: table("number-columns-repeated")?,
            text_p: text("p")?,
            text_s: text("s")?,
            text_c: text("c")?,
            text_tab: text("tab")?,
            text_line_break: text("line-break")?,
            value_type: office("value-type")?,
            value: office("value")?,
            date_value: office("date-value")?,
            time_value: office("time-value")?,
            boolean_value: office("boolean-value")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    const TABLE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:table:1.0";

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
  <office:body>
    <office:spreadsheet>
      <table:table table:name="First">
        <table:table-row><table:table-cell><text:p>a &amp; b</text:p></table:table-cell></table:table-row>
      </table:table>
      <table:table table:name="Second"/>
    </office:spreadsheet>
  </office:body>
</office:document-content>"#;

    #[test]
    fn test_extract_namespaces_rewinds_stream() {
        let mut stream = Cursor::new(SAMPLE.as_bytes());
        let mut peek = [0u8; 16];
        stream.read_exact(&mut peek).unwrap();

        let namespaces = extract_namespaces(&mut stream).unwrap();
        assert_eq!(namespaces.len(), 3);
        assert_eq!(namespaces.get("table"), Some(TABLE_NS));
        assert!(matches!(
            namespaces.uri("style"),
            Err(OdsError::MissingNamespace(prefix)) if prefix == "style"
        ));
    }

    #[test]
    fn test_qualified_names_compare_by_uri() {
        // Same URI bound to a different prefix resolves to the same name
        let doc = parse_document(
            br#"<t:root xmlns:t="urn:oasis:names:tc:opendocument:xmlns:table:1.0"><t:table/></t:root>"#,
        )
        .unwrap();
        let wanted = QName::new(TABLE_NS, "table");
        assert_eq!(doc.descendants(&wanted).count(), 1);
        assert_eq!(wanted.to_string(), format!("{{{}}}table", TABLE_NS));
    }

    #[test]
    fn test_parse_document_tree() {
        let root = parse_document(SAMPLE.as_bytes()).unwrap();
        let mut stream = Cursor::new(SAMPLE.as_bytes());
        let names = OdsNames::new(&extract_namespaces(&mut stream).unwrap()).unwrap();

        let sheets: Vec<_> = root.descendants(&names.table).collect();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].attribute(&names.table_name), Some("First"));
        assert_eq!(sheets[1].attribute(&names.table_name), Some("Second"));

        let cell = sheets[0].descendants(&names.table_cell).next().unwrap();
        let p = cell.find(&names.text_p).unwrap();
        assert_eq!(p.children, vec![Node::Text("a & b".to_string())]);
    }

    #[test]
    fn test_missing_required_attribute() {
        let root = parse_document(b"<root/>").unwrap();
        let err = root
            .required_attribute(&QName::unqualified("name"))
            .unwrap_err();
        assert!(matches!(err, OdsError::MissingAttribute(name) if name == "name"));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(
            parse_document(b"<?xml version=\"1.0\"?>"),
            Err(OdsError::EmptyDocument)
        ));
    }
}
