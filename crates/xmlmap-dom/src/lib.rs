#![cfg_attr(docsrs, feature(doc_cfg))]
//! Owned XML element tree built from quick-xml events.
//!
//! A [`Document`] is parsed once and never mutated. Elements are cheap
//! handles into the shared tree, so a parsed document can be sliced into
//! candidate node sequences and handed to several consumers.
//!
//! ```rust
//! use xmlmap_dom::Document;
//!
//! let doc = Document::parse(r#"<Rows><Row Id="1"><Name>a</Name></Row><Row Id="2"/></Rows>"#)
//!     .expect("parse xml");
//! let rows: Vec<_> = doc.descendants("Row").collect();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].attribute("Id"), Some("1"));
//! assert_eq!(rows[0].child("Name").map(|name| name.text()).as_deref(), Some("a"));
//! ```

use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum XmlError {
    /// Tokenizer failure reported by quick-xml.
    #[error("xml: {0}")]
    Xml(String),
    /// The token stream does not form a single well-formed document.
    #[error("malformed document: {0}")]
    Malformed(String),
    /// The underlying reader failed.
    #[error("io: {0}")]
    Io(String),
}

#[derive(Debug)]
struct NodeData {
    local_name: String,
    qualified_name: String,
    attributes: Vec<(String, String)>,
    content: Vec<Content>,
    parent: Option<usize>,
    /// One past the index of the last element in this subtree.
    end: usize,
}

#[derive(Debug)]
enum Content {
    Element(usize),
    Text(String),
}

/// Elements stored in document (pre-)order, so a subtree occupies the
/// contiguous index range `id..end`.
#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeData>,
}

/// Parsed XML document.
#[derive(Clone)]
pub struct Document {
    tree: Arc<Tree>,
}

/// Handle to one element of a parsed [`Document`].
#[derive(Clone)]
pub struct Element {
    tree: Arc<Tree>,
    id: usize,
}

impl Document {
    /// Parse a complete document from text.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        Self::from_reader(xml.as_bytes())
    }

    /// Parse a complete document from a buffered byte stream.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(reader);
        let mut builder = TreeBuilder::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => builder.open(&e, false)?,
                Ok(Event::Empty(e)) => builder.open(&e, true)?,
                Ok(Event::End(_)) => builder.close()?,
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| XmlError::Xml(err.to_string()))?;
                    builder.text(&text)?;
                }
                Ok(Event::CData(e)) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|err| XmlError::Xml(format!("invalid UTF-8 in CDATA: {err}")))?;
                    builder.text(text)?;
                }
                Ok(Event::Eof) => break,
                Err(quick_xml::Error::Io(err)) => return Err(XmlError::Io(err.to_string())),
                Err(err) => {
                    return Err(XmlError::Xml(format!(
                        "{err} at position {}",
                        reader.buffer_position()
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        let tree = builder.finish()?;
        debug!(elements = tree.nodes.len(), "parsed xml document");
        Ok(Document {
            tree: Arc::new(tree),
        })
    }

    /// The single top-level element.
    pub fn root(&self) -> Element {
        Element {
            tree: Arc::clone(&self.tree),
            id: 0,
        }
    }

    /// Every element named `name` in document order, the root included.
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Element> + 'a {
        select(&self.tree, 0..self.tree.nodes.len(), name)
    }

    /// Total number of elements in the document.
    pub fn element_count(&self) -> usize {
        self.tree.nodes.len()
    }
}

impl Element {
    /// Local name, without any namespace prefix.
    pub fn name(&self) -> &str {
        &self.node().local_name
    }

    /// Name as written in the source, prefix included.
    pub fn qualified_name(&self) -> &str {
        &self.node().qualified_name
    }

    /// Attributes in source order as `(local name, unescaped value)` pairs.
    /// Namespace declarations are not reported.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.node()
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Element> + '_ {
        self.node().content.iter().filter_map(|content| match content {
            Content::Element(id) => Some(Element {
                tree: Arc::clone(&self.tree),
                id: *id,
            }),
            Content::Text(_) => None,
        })
    }

    /// First direct child element with the given local name.
    pub fn child(&self, name: &str) -> Option<Element> {
        self.children().find(|child| child.name() == name)
    }

    /// Elements named `name` below this one, in document order. The element
    /// itself is not included.
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Element> + 'a {
        select(&self.tree, self.id + 1..self.node().end, name)
    }

    pub fn parent(&self) -> Option<Element> {
        self.node().parent.map(|id| Element {
            tree: Arc::clone(&self.tree),
            id,
        })
    }

    /// Concatenated text and CDATA of the whole subtree, verbatim.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.tree, self.id, &mut out);
        out
    }

    fn node(&self) -> &NodeData {
        &self.tree.nodes[self.id]
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.qualified_name())
            .field("index", &self.id)
            .finish()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.tree.nodes[0].qualified_name)
            .field("elements", &self.tree.nodes.len())
            .finish()
    }
}

fn select<'a>(
    tree: &'a Arc<Tree>,
    range: std::ops::Range<usize>,
    name: &'a str,
) -> impl Iterator<Item = Element> + 'a {
    range
        .filter(move |&id| tree.nodes[id].local_name == name)
        .map(move |id| Element {
            tree: Arc::clone(tree),
            id,
        })
}

fn collect_text(tree: &Tree, id: usize, out: &mut String) {
    for content in &tree.nodes[id].content {
        match content {
            Content::Text(text) => out.push_str(text),
            Content::Element(child) => collect_text(tree, *child, out),
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<usize>,
}

impl TreeBuilder {
    fn open(&mut self, event: &BytesStart<'_>, empty: bool) -> Result<(), XmlError> {
        let parent = self.open.last().copied();
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(XmlError::Malformed(format!(
                "second root element <{}>",
                String::from_utf8_lossy(event.name().as_ref())
            )));
        }
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            local_name: utf8(event.local_name().as_ref())?,
            qualified_name: utf8(event.name().as_ref())?,
            attributes: collect_attributes(event)?,
            content: Vec::new(),
            parent,
            end: id + 1,
        });
        if let Some(parent) = parent {
            self.nodes[parent].content.push(Content::Element(id));
        }
        if empty {
            self.seal(id);
        } else {
            self.open.push(id);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), XmlError> {
        let id = self
            .open
            .pop()
            .ok_or_else(|| XmlError::Malformed("closing tag without an open element".into()))?;
        self.seal(id);
        Ok(())
    }

    fn seal(&mut self, id: usize) {
        self.nodes[id].end = self.nodes.len();
    }

    fn text(&mut self, text: &str) -> Result<(), XmlError> {
        match self.open.last() {
            Some(&id) => {
                if !text.is_empty() {
                    self.nodes[id].content.push(Content::Text(text.to_string()));
                }
                Ok(())
            }
            None if text.trim_start_matches('\u{feff}').trim().is_empty() => Ok(()),
            None => Err(XmlError::Malformed(
                "text outside of the root element".into(),
            )),
        }
    }

    fn finish(self) -> Result<Tree, XmlError> {
        if let Some(&id) = self.open.last() {
            return Err(XmlError::Malformed(format!(
                "unclosed element <{}>",
                self.nodes[id].qualified_name
            )));
        }
        if self.nodes.is_empty() {
            return Err(XmlError::Malformed("missing root element".into()));
        }
        Ok(Tree { nodes: self.nodes })
    }
}

fn collect_attributes(event: &BytesStart<'_>) -> Result<Vec<(String, String)>, XmlError> {
    let mut attributes = Vec::new();
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let name = utf8(attr.key.local_name().as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        attributes.push((name, value.into_owned()));
    }
    Ok(attributes)
}

fn utf8(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|err| XmlError::Xml(format!("invalid UTF-8 in name: {err}")))
}
