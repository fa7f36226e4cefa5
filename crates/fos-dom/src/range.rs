//! Ranges
//!
//! Boundary-point ordering and serialization of selected content. A boundary
//! point is keyed by the child-index path from the document node, followed by
//! the offset inside its container, so keys compare lexicographically in
//! document order.

use std::cmp::Ordering;

use crate::NodeId;
use crate::fragment::{escape_attr, escape_text};
use crate::node::NodeData;
use crate::selection::{Position, SelectionRange};
use crate::tree::DomTree;

fn node_path(tree: &DomTree, node: NodeId) -> Option<Vec<usize>> {
    if !tree.contains(node) {
        return None;
    }
    let mut path = Vec::new();
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        path.push(tree.index_in_parent(current)?);
        current = parent;
    }
    if current != tree.root() {
        // Detached subtree
        return None;
    }
    path.reverse();
    Some(path)
}

fn boundary_key(tree: &DomTree, position: Position) -> Option<Vec<usize>> {
    let mut key = node_path(tree, position.node)?;
    key.push(position.offset.min(tree.offset_count(position.node)));
    Some(key)
}

/// Document order of two positions, `None` when either is detached
pub fn compare_positions(tree: &DomTree, a: Position, b: Position) -> Option<Ordering> {
    Some(boundary_key(tree, a)?.cmp(&boundary_key(tree, b)?))
}

impl SelectionRange {
    /// Same range with `start` before `end`
    pub fn ordered(self, tree: &DomTree) -> Option<SelectionRange> {
        Some(match compare_positions(tree, self.start, self.end)? {
            Ordering::Greater => SelectionRange { start: self.end, end: self.start },
            _ => self,
        })
    }

    /// Range covering `node` itself
    pub fn select_node(tree: &DomTree, node: NodeId) -> Option<SelectionRange> {
        let parent = tree.parent(node)?;
        let index = tree.index_in_parent(node)?;
        Some(SelectionRange {
            start: Position::new(parent, index),
            end: Position::new(parent, index + 1),
        })
    }

    /// Range covering the contents of `node`
    pub fn select_contents(tree: &DomTree, node: NodeId) -> SelectionRange {
        SelectionRange {
            start: Position::new(node, 0),
            end: Position::new(node, tree.offset_count(node)),
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(tag, "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre" | "tr")
}

struct RangeWalker<'a> {
    tree: &'a DomTree,
    start: Vec<usize>,
    end: Vec<usize>,
    markup: bool,
    out: String,
}

impl RangeWalker<'_> {
    /// Offset inside a container at `path` where a boundary key lands
    fn clamp(&self, key: &[usize], path: &[usize], len: usize) -> usize {
        if key.len() == path.len() + 1 && key.starts_with(path) {
            return key[path.len()].min(len);
        }
        if key <= path { 0 } else { len }
    }

    fn write_children(&mut self, node: NodeId, path: &mut Vec<usize>) {
        let children = self.tree.children(node).to_vec();
        for (index, child) in children.into_iter().enumerate() {
            path.push(index);
            let mut next = path.clone();
            if let Some(last) = next.last_mut() {
                *last += 1;
            }
            // Node occupies the open interval (path, next)
            if path.as_slice() < self.end.as_slice() && next.as_slice() > self.start.as_slice() {
                self.write_node(child, path);
            }
            path.pop();
        }
    }

    fn write_node(&mut self, id: NodeId, path: &mut Vec<usize>) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => {
                let len = text.chars().count();
                let from = self.clamp(&self.start, path, len);
                let to = self.clamp(&self.end, path, len);
                if from < to {
                    let selected: String = text.chars().skip(from).take(to - from).collect();
                    if self.markup {
                        self.out.push_str(&escape_text(&selected));
                    } else {
                        self.out.push_str(&selected);
                    }
                }
            }
            NodeData::Document => self.write_children(id, path),
            NodeData::Element(element) => {
                let tag = element.tag().to_string();
                if self.markup {
                    self.out.push('<');
                    self.out.push_str(&tag);
                    for attr in element.attrs() {
                        self.out.push(' ');
                        self.out.push_str(&attr.name);
                        self.out.push_str("=\"");
                        self.out.push_str(&escape_attr(&attr.value));
                        self.out.push('"');
                    }
                    self.out.push('>');
                } else if tag == "br" {
                    self.out.push('\n');
                }
                self.write_children(id, path);
                if self.markup {
                    if !matches!(tag.as_str(), "br" | "img" | "input" | "hr") {
                        self.out.push_str("</");
                        self.out.push_str(&tag);
                        self.out.push('>');
                    }
                } else if is_block(&tag) && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
        }
    }
}

fn walk(tree: &DomTree, range: SelectionRange, markup: bool) -> Option<String> {
    let range = range.ordered(tree)?;
    let start = boundary_key(tree, range.start)?;
    let end = boundary_key(tree, range.end)?;

    let start_path = node_path(tree, range.start.node)?;
    let end_path = node_path(tree, range.end.node)?;
    let common_len = start_path.iter().zip(&end_path).take_while(|(a, b)| a == b).count();

    let mut common = tree.root();
    for index in &start_path[..common_len] {
        common = *tree.children(common).get(*index)?;
    }

    let mut walker = RangeWalker { tree, start, end, markup, out: String::new() };
    let mut path = start_path[..common_len].to_vec();
    if tree.get(common).is_some_and(|n| n.is_text()) {
        walker.write_node(common, &mut path);
    } else {
        walker.write_children(common, &mut path);
    }
    Some(walker.out)
}

/// Markup of the content selected by `range`
pub fn range_markup(tree: &DomTree, range: SelectionRange) -> String {
    walk(tree, range, true).unwrap_or_default()
}

/// Plain text of the content selected by `range`, with block boundaries as newlines
pub fn range_text(tree: &DomTree, range: SelectionRange) -> String {
    let text = walk(tree, range, false).unwrap_or_default();
    text.trim_end_matches('\n').to_string()
}
