//! Node tree produced by the markup parser and cloned into shadow roots

use std::fmt;

/// A node in a parsed markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    /// Borrow the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutably borrow the element if this node is one
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Check whether this is a text node made only of whitespace
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

/// Element with a lowercase tag name, ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child (builder style)
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn is_template(&self) -> bool {
        self.tag == "template"
    }
}

/// Root of a parsed markup source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    /// All `<template>` elements in document order.
    ///
    /// Template contents are inert, so the walk never descends into a
    /// template's children.
    pub fn template_blocks(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        walk_elements(&self.children, &mut |el| {
            if el.is_template() {
                found.push(el);
            }
        });
        found
    }

    /// First element in document order whose `id` equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        let mut found = None;
        walk_elements(&self.children, &mut |el| {
            if found.is_none() && el.id() == Some(id) {
                found = Some(el);
            }
        });
        found
    }
}

fn walk_elements<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            visit(el);
            if !el.is_template() {
                walk_elements(&el.children, visit);
            }
        }
    }
}

/// The content of a template block, ready to be cloned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub children: Vec<Node>,
}

impl Fragment {
    /// Take the content of a template element
    pub fn from_template(template: &Element) -> Self {
        Self {
            children: template.children.clone(),
        }
    }

    /// Structural deep copy of the fragment's nodes
    pub fn clone_nodes(&self) -> Vec<Node> {
        self.children.clone()
    }
}

/// An open, isolated subtree owned by a single widget instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowRoot {
    children: Vec<Node>,
}

impl ShadowRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a deep clone of `fragment`
    pub fn append_fragment(&mut self, fragment: &Fragment) {
        self.children.extend(fragment.clone_nodes());
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// First element in the boundary whose `id` equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        let mut found = None;
        walk_elements(&self.children, &mut |el| {
            if found.is_none() && el.id() == Some(id) {
                found = Some(el);
            }
        });
        found
    }
}

/// Elements serialized without a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(t) => f.write_str(&escape_text(t)),
            Node::Comment(c) => write!(f, "<!--{}-->", c),
            Node::Element(el) => write!(f, "{}", el),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            if value.is_empty() {
                write!(f, " {}", name)?;
            } else {
                write!(f, " {}=\"{}\"", name, escape_attribute(value))?;
            }
        }
        f.write_str(">")?;
        if is_void_element(&self.tag) {
            return Ok(());
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.children.iter().try_for_each(|n| write!(f, "{}", n))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.children.iter().try_for_each(|n| write!(f, "{}", n))
    }
}

impl fmt::Display for ShadowRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.children.iter().try_for_each(|n| write!(f, "{}", n))
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
