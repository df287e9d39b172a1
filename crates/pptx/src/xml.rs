//! Owned XML node tree with typed accessors.
//!
//! Every XML part is decoded into an [`XmlNode`] tree. Attributes and child
//! elements live in separate collections, so an attribute never shadows a
//! child element of the same name. Children keep document order, which is
//! the z-order of drawing elements.
//!
//! Element lookups match on the local name (the part after the namespace
//! prefix), since pptx slides (`p:sp`) and clipboard drawings (`a:sp`) use
//! different prefixes for the same structures.

use ppt_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    /// Qualified element name as written (`p:sp`).
    pub name: String,
    /// Attributes in document order, keyed by qualified name.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Character data directly inside this element.
    pub text: String,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The node substituted for optional parts that failed to decode.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.children.is_empty()
    }

    /// Element name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute by exact qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Namespaced attribute by local name (`r:embed` via `"embed"`).
    pub fn attr_ns(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.contains(':') && local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Integer attribute. `Ok(None)` when absent, an error when present but
    /// not an integer.
    pub fn attr_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
                Error::XmlError(format!("<{}> attribute {}=\"{}\" is not an integer", self.name, name, raw))
            }),
        }
    }

    /// Integer attribute, treating unparsable values as absent.
    pub fn attr_i64_lenient(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|raw| raw.trim().parse().ok())
    }

    pub fn attr_u32_lenient(&self, name: &str) -> Option<u32> {
        self.attr(name).and_then(|raw| raw.trim().parse().ok())
    }

    /// OOXML boolean attribute (`1`/`true`/`on`).
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        self.attr(name).map(|v| matches!(v.trim(), "1" | "true" | "on"))
    }

    /// First child with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.is(local))
    }

    /// All children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.is(local))
    }

    /// Follow a chain of child local names.
    pub fn find(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter().try_fold(self, |node, step| node.child(step))
    }

    /// First descendant (depth-first, document order) with the local name.
    pub fn descendant(&self, local: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.is(local) {
                return Some(child);
            }
            if let Some(found) = child.descendant(local) {
                return Some(found);
            }
        }
        None
    }

    pub fn has_child(&self, local: &str) -> bool {
        self.child(local).is_some()
    }

    /// Character data of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

/// Extract the local name from a potentially namespaced XML name.
pub fn local_name(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// Decode an XML document into its root element.
pub fn parse_xml(bytes: &[u8]) -> Result<XmlNode> {
    let content = std::str::from_utf8(bytes).map_err(|e| Error::XmlError(format!("invalid UTF-8: {}", e)))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = Reader::from_str(content);
    reader.trim_text(false);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(node_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let node = node_from_start(e)?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::XmlError("closing tag without an open element".to_string()))?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("bad character data: {}", e)))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::XmlError(format!("unclosed element <{}>", stack[stack.len() - 1].name)));
    }
    root.ok_or_else(|| Error::XmlError("document has no root element".to_string()))
}

fn node_from_start(e: &BytesStart<'_>) -> Result<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::XmlError(format!("bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlError(format!("bad attribute value: {}", e)))?
            .to_string();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
