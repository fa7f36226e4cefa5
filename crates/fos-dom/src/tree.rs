//! DOM Tree (arena-based allocation)

use crate::generation::GenArena;
use crate::node::{ContentEditable, ElementData, ElementState, FileInputState, ImageResource, Node, NodeData};
use crate::{DomError, NodeId};

/// Editability of a position in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editability {
    ReadOnly,
    PlainText,
    Rich,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: GenArena<Node>,
    root: NodeId,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        let mut nodes = GenArena::new();
        let root = NodeId(nodes.insert(Node::new(NodeData::Document)));
        Self { nodes, root }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Whether the handle still points at a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Number of live nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        NodeId(self.nodes.insert(Node::new(NodeData::Element(ElementData::new(tag)))))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        NodeId(self.nodes.insert(Node::new(NodeData::Text(text.to_string()))))
    }

    /// Create a detached `<img src>` backed by `resource`
    pub fn create_image(&mut self, src: &str, resource: ImageResource) -> NodeId {
        let mut data = ElementData::new("img");
        data.set_attr("src", src);
        data.state = ElementState::Image(resource);
        NodeId(self.nodes.insert(Node::new(NodeData::Element(data))))
    }

    /// Create a detached `<input type=file>`
    pub fn create_file_input(&mut self) -> NodeId {
        let mut data = ElementData::new("input");
        data.set_attr("type", "file");
        data.state = ElementState::FileInput(FileInputState::default());
        NodeId(self.nodes.insert(Node::new(NodeData::Element(data))))
    }

    /// Create a detached plugin element (`<object>`, `<embed>`)
    pub fn create_plugin(&mut self, tag: &str, can_process_drag: bool) -> NodeId {
        let mut data = ElementData::new(tag);
        data.state = ElementState::Plugin { can_process_drag };
        NodeId(self.nodes.insert(Node::new(NodeData::Element(data))))
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node (empty for stale handles)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Inclusive ancestor chain, innermost first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Append `child` under `parent`, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(DomError::NotFound);
        }
        if child == self.root || self.is_inclusive_ancestor_of(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if self.get(parent).is_some_and(Node::is_text) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) || reference == child {
                return Err(DomError::NotFound);
            }
        }

        self.detach(child);

        let parent_node = self.get_mut(parent).ok_or(DomError::NotFound)?;
        let position = reference
            .and_then(|r| parent_node.children.iter().position(|c| *c == r))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(position, child);

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlink a node from its parent without freeing it
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Remove a node and free its whole subtree
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        self.detach(id);

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current.0) {
                stack.extend(node.children);
            }
        }
        tracing::trace!("Removed subtree at {:?}", id);
        true
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let Some(text) = node.as_text() {
            out.push_str(text);
            return;
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Editability inherited from the closest `contenteditable` ancestor
    pub fn editability(&self, id: NodeId) -> Editability {
        for ancestor in self.ancestors(id) {
            let Some(element) = self.element(ancestor) else {
                continue;
            };
            match element.content_editable() {
                Some(ContentEditable::True) => return Editability::Rich,
                Some(ContentEditable::PlainTextOnly) => return Editability::PlainText,
                Some(ContentEditable::False) => return Editability::ReadOnly,
                None => {}
            }
        }
        Editability::ReadOnly
    }

    pub fn has_editable_style(&self, id: NodeId) -> bool {
        self.editability(id) != Editability::ReadOnly
    }

    /// Outermost element of the editing host containing `id`
    pub fn root_editable_element(&self, id: NodeId) -> Option<NodeId> {
        if !self.has_editable_style(id) {
            return None;
        }
        let mut root = None;
        for ancestor in self.ancestors(id) {
            if self.element(ancestor).is_some() && self.has_editable_style(ancestor) {
                root = Some(ancestor);
            } else if self.element(ancestor).is_some() {
                break;
            }
        }
        root
    }

    /// Whether a mouse press on `id` may start a text selection.
    ///
    /// Live links and `draggable=true` elements are unselectable unless they
    /// sit in editable content.
    pub fn can_start_selection(&self, id: NodeId) -> bool {
        for ancestor in self.ancestors(id) {
            if self.has_editable_style(ancestor) {
                return true;
            }
            let Some(element) = self.element(ancestor) else {
                continue;
            };
            if element.is_live_link() || element.get_attr("draggable") == Some("true") {
                return false;
            }
        }
        true
    }

    /// Index of `id` among its siblings
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Number of offsets inside a node: characters for text, children otherwise
    pub fn offset_count(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(node) => match node.as_text() {
                Some(text) => text.chars().count(),
                None => node.children.len(),
            },
            None => 0,
        }
    }

    /// Closest `<a>` enclosing `id`
    pub fn enclosing_anchor(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| self.element(*a).is_some_and(ElementData::is_anchor))
    }

    /// Closest element, `id` itself when it is one
    pub fn enclosing_element(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|a| self.element(*a).is_some())
    }
}

/// Iterator over inclusive ancestors
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        let text = tree.create_text("hello");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, p).unwrap();
        tree.append_child(p, text).unwrap();
        (tree, div, p, text)
    }

    #[test]
    fn test_ancestors_and_containment() {
        let (tree, div, p, text) = sample();
        let chain: Vec<NodeId> = tree.ancestors(text).collect();
        assert_eq!(chain, vec![text, p, div, tree.root()]);
        assert!(tree.is_inclusive_ancestor_of(div, text));
        assert!(tree.is_inclusive_ancestor_of(text, text));
        assert!(!tree.is_inclusive_ancestor_of(text, div));
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, div, p, _) = sample();
        assert_eq!(tree.append_child(p, div), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_remove_invalidates_subtree() {
        let (mut tree, div, p, text) = sample();
        assert!(tree.remove(p));
        assert!(!tree.contains(p));
        assert!(!tree.contains(text));
        assert!(tree.children(div).is_empty());
        assert_eq!(tree.text_content(div), "");
    }

    #[test]
    fn test_insert_before() {
        let (mut tree, div, p, _) = sample();
        let h1 = tree.create_element("h1");
        tree.insert_before(div, h1, Some(p)).unwrap();
        assert_eq!(tree.children(div), &[h1, p]);
    }

    #[test]
    fn test_editability_inheritance() {
        let (mut tree, div, p, text) = sample();
        assert!(!tree.has_editable_style(text));

        tree.element_mut(div).unwrap().set_attr("contenteditable", "true");
        assert_eq!(tree.editability(text), Editability::Rich);
        assert_eq!(tree.root_editable_element(text), Some(div));

        tree.element_mut(p).unwrap().set_attr("contenteditable", "false");
        assert_eq!(tree.editability(text), Editability::ReadOnly);
    }

    #[test]
    fn test_can_start_selection() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let text = tree.create_text("link");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(a, text).unwrap();
        assert!(tree.can_start_selection(text));

        tree.element_mut(a).unwrap().set_attr("href", "https://example.com/");
        assert!(!tree.can_start_selection(text));

        tree.element_mut(a).unwrap().set_attr("contenteditable", "true");
        assert!(tree.can_start_selection(text));
    }

    #[test]
    fn test_enclosing_anchor() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let span = tree.create_element("span");
        let text = tree.create_text("link");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(a, span).unwrap();
        tree.append_child(span, text).unwrap();

        assert_eq!(tree.enclosing_anchor(text), Some(a));
        assert_eq!(tree.enclosing_element(text), Some(span));
        assert_eq!(tree.text_content(a), "link");
    }
}
