//! Document fragments
//!
//! Detached content built by drag-and-drop and clipboard paths before it is
//! inserted into a document.

use crate::tree::DomTree;
use crate::{DomError, NodeId};
use crate::node::NodeData;

/// Node inside a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<FragmentNode>,
    },
    Text(String),
}

impl FragmentNode {
    pub fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<FragmentNode>) -> Self {
        FragmentNode::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        FragmentNode::Text(text.to_string())
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            FragmentNode::Text(t) => out.push_str(t),
            FragmentNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            FragmentNode::Text(t) => out.push_str(&escape_text(t)),
            FragmentNode::Element { tag, attrs, children } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                for child in children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Detached list of nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFragment {
    children: Vec<FragmentNode>,
}

impl DocumentFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: FragmentNode) {
        self.children.push(node);
    }

    pub fn children(&self) -> &[FragmentNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Plain text as fragment content.
    ///
    /// A single line becomes a bare text node; multi-line text becomes one
    /// paragraph per line, with `<br>` standing in for empty lines.
    pub fn from_plain_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut fragment = Self::new();
        if !normalized.contains('\n') {
            if !normalized.is_empty() {
                fragment.push(FragmentNode::Text(normalized));
            }
            return fragment;
        }
        for line in normalized.split('\n') {
            let content = if line.is_empty() {
                FragmentNode::element("br", &[], Vec::new())
            } else {
                FragmentNode::text(line)
            };
            fragment.push(FragmentNode::element("p", &[], vec![content]));
        }
        fragment
    }

    /// `<a href=url>title</a>`
    pub fn anchor(url: &str, title: &str) -> Self {
        let mut fragment = Self::new();
        fragment.push(FragmentNode::element("a", &[("href", url)], vec![FragmentNode::text(title)]));
        fragment
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_markup(&mut out);
        }
        out
    }

    /// Materialize the fragment under `parent`, before `reference` when given.
    /// Returns the inserted top-level nodes.
    pub fn insert_into(
        &self,
        tree: &mut DomTree,
        parent: NodeId,
        reference: Option<NodeId>,
    ) -> Result<Vec<NodeId>, DomError> {
        let mut inserted = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let id = build(tree, child)?;
            tree.insert_before(parent, id, reference)?;
            inserted.push(id);
        }
        Ok(inserted)
    }
}

fn build(tree: &mut DomTree, node: &FragmentNode) -> Result<NodeId, DomError> {
    match node {
        FragmentNode::Text(t) => Ok(tree.create_text(t)),
        FragmentNode::Element { tag, attrs, children } => {
            let id = tree.create_element(tag);
            if let Some(element) = tree.element_mut(id) {
                for (name, value) in attrs {
                    element.set_attr(name, value);
                }
            }
            for child in children {
                let child_id = build(tree, child)?;
                tree.append_child(id, child_id)?;
            }
            Ok(id)
        }
    }
}

/// Serialize a live subtree
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Text(t) => out.push_str(&escape_text(t)),
        NodeData::Document => {
            for child in tree.children(id) {
                write_node(tree, *child, out);
            }
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(element.tag());
            for attr in element.attrs() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attr(&attr.value));
                out.push('"');
            }
            out.push('>');
            if is_void(element.tag()) {
                return;
            }
            for child in tree.children(id) {
                write_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(element.tag());
            out.push('>');
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "img" | "input" | "hr" | "meta" | "link" | "embed")
}

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
