//! Schema document loading.
//!
//! Documents are parsed with `quick-xml` into a small generic [`Element`]
//! tree, then converted once into a typed [`Database`]. Conversion validates
//! as it goes and every failure is fatal.

use crate::catalog::Database;
use crate::error::{DiffError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

mod convert;

/// A parsed XML element with ordered children.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
    pub line: usize,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value with surrounding whitespace removed; empty counts as absent.
    pub fn attr_trimmed(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }
}

/// Load and convert a schema document from disk.
pub fn load_file(path: &Path) -> Result<Database> {
    info!("Loading schema document {}", path.display());
    let xml = fs::read_to_string(path).map_err(|e| DiffError::io(path, e))?;
    load_str(&xml, &path.display().to_string())
}

/// Load and convert a schema document held in memory.
pub fn load_str(xml: &str, source_name: &str) -> Result<Database> {
    let root = parse_document(xml, source_name)?;
    let database = convert::convert_document(&root, source_name)?;
    debug!(
        "Loaded {}: {} schemas, {} tables",
        source_name,
        database.schemas.len(),
        database.tables().count()
    );
    Ok(database)
}

/// Parse XML text into its root element.
pub fn parse_document(xml: &str, source_name: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            DiffError::invalid(
                source_name,
                format!(
                    "XML parse error at line {}: {}",
                    line_of(xml, reader.buffer_position() as usize),
                    e
                ),
            )
        })?;
        let line = line_of(xml, reader.buffer_position() as usize);

        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                stack.push(start_element(e, line, source_name)?);
            }
            Event::Empty(ref e) => {
                let element = start_element(e, line, source_name)?;
                attach(element, &mut stack, &mut root, source_name)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DiffError::invalid(source_name, "unbalanced closing tag"))?;
                attach(element, &mut stack, &mut root, source_name)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|err| {
                    DiffError::invalid(source_name, format!("bad text at line {line}: {err}"))
                })?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DiffError::invalid(source_name, "unexpected end of document"));
    }
    root.ok_or_else(|| DiffError::invalid(source_name, "document has no root element"))
}

fn start_element(e: &BytesStart<'_>, line: usize, source_name: &str) -> Result<Element> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            DiffError::invalid(source_name, format!("bad attribute at line {line}: {err}"))
        })?;
        let key = local_name(attr.key.as_ref());
        let value = attr.unescape_value().map_err(|err| {
            DiffError::invalid(source_name, format!("bad attribute at line {line}: {err}"))
        })?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element {
        name: local_name(e.name().as_ref()),
        attributes,
        children: Vec::new(),
        text: String::new(),
        line,
    })
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    source_name: &str,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DiffError::invalid(
                source_name,
                format!("second root element <{}>", element.name),
            ));
        }
    }
    Ok(())
}

/// `ns:tag` becomes `tag`.
fn local_name(name: &[u8]) -> String {
    let full = String::from_utf8_lossy(name);
    match full.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => full.to_string(),
    }
}

fn line_of(xml: &str, offset: usize) -> usize {
    let clamped = offset.min(xml.len());
    xml.as_bytes()[..clamped].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_ordered_tree() {
        let xml = r#"<dbsteward>
            <schema name="app">
                <table name="a"/>
                <sequence name="s"/>
                <table name="b"><column name="id" type="int"/></table>
            </schema>
        </dbsteward>"#;
        let root = parse_document(xml, "test.xml").unwrap();
        assert_eq!(root.name, "dbsteward");
        let schema = root.child("schema").unwrap();
        let tables: Vec<_> = schema
            .children_named("table")
            .filter_map(|t| t.attr("name"))
            .collect();
        assert_eq!(tables, vec!["a", "b"]);
        assert!(schema.has_child("sequence"));
    }

    #[test]
    fn test_text_and_entities_are_unescaped() {
        let xml = r#"<viewQuery sqlFormat="pgsql8">SELECT 1 WHERE a &lt; b</viewQuery>"#;
        let root = parse_document(xml, "test.xml").unwrap();
        assert_eq!(root.text(), "SELECT 1 WHERE a < b");
        assert_eq!(root.attr("sqlFormat"), Some("pgsql8"));
    }

    #[test]
    fn test_cdata_is_kept_verbatim() {
        let xml = "<functionDefinition><![CDATA[BEGIN RETURN a < b; END]]></functionDefinition>";
        let root = parse_document(xml, "test.xml").unwrap();
        assert_eq!(root.text(), "BEGIN RETURN a < b; END");
    }

    #[test]
    fn test_malformed_document_is_invalid() {
        let err = parse_document("<dbsteward><schema></dbsteward>", "bad.xml").unwrap_err();
        assert!(matches!(err, DiffError::InvalidDocument { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/schema.xml")).unwrap_err();
        assert!(matches!(err, DiffError::Io { .. }));
    }
}
