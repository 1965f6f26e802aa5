//! Minimal XML tree for reading SOAP responses.
//!
//! Responses are small, so the whole document is read into a [`Node`] tree
//! and walked by local name. Namespace prefixes and `xmlns` declarations
//! are dropped.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ApiError, ApiResult};

/// An element with its attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute with the given local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text content (direct text only).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direct children in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First node named `name`, searching self then descendants depth-first.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// All descendants named `name`, in document order.
    ///
    /// Matching nodes are not searched further, so nested elements of the
    /// same name are not returned twice.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect(name, &mut found);
        }
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Node>) {
        if self.name == name {
            found.push(self);
            return;
        }
        for child in &self.children {
            child.collect(name, found);
        }
    }
}

/// Parses a document into its root element.
pub fn parse(xml: &str) -> ApiResult<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(node_from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let node = node_from_start(&e)?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ApiError::invalid_response("unbalanced end tag"))?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| {
                        ApiError::invalid_response(format!("bad text content: {}", err))
                    })?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ApiError::invalid_response(format!(
                    "malformed XML at byte {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ApiError::invalid_response("document ended inside an element"));
    }
    root.ok_or_else(|| ApiError::invalid_response("empty response document"))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn node_from_start(e: &BytesStart<'_>) -> ApiResult<Node> {
    let mut node = Node {
        name: lossy(e.local_name().as_ref()).into_owned(),
        ..Node::default()
    };
    for attr in e.attributes() {
        let attr = attr
            .map_err(|err| ApiError::invalid_response(format!("bad attribute: {}", err)))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|err| ApiError::invalid_response(format!("bad attribute value: {}", err)))?;
        node.attributes.push((
            lossy(attr.key.local_name().as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(node)
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
