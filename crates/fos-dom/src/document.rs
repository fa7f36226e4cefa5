//! Document - High-level document API

use fos_security::SecurityOrigin;
use url::Url;

use crate::generation::GenArena;
use crate::geometry::{IntPoint, IntSize};
use crate::selection::FrameSelection;
use crate::tree::{DomTree, Editability};
use crate::{DocumentId, DomError, NodeId, NodeRef};

/// Viewport of a frame, positioned inside the root frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameView {
    /// Offset of this frame's viewport from the root frame's origin
    pub frame_offset: IntSize,
    /// Current scroll position
    pub scroll_offset: IntSize,
}

impl FrameView {
    pub const fn new(frame_offset: IntSize, scroll_offset: IntSize) -> Self {
        Self { frame_offset, scroll_offset }
    }

    /// Root frame point to document (contents) coordinates
    pub fn root_frame_to_contents(&self, point: IntPoint) -> IntPoint {
        point - self.frame_offset + self.scroll_offset
    }

    /// Document (contents) point to root frame coordinates
    pub fn contents_to_root_frame(&self, point: IntPoint) -> IntPoint {
        point - self.scroll_offset + self.frame_offset
    }
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Selection of the frame showing this document
    pub selection: FrameSelection,
    /// `designMode = "on"`
    pub design_mode: bool,
    url: Url,
    origin: SecurityOrigin,
    view: Option<FrameView>,
    parent: Option<NodeRef>,
    plugin_document: bool,
    html_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a new document with `<html><body>` structure and a default view
    pub fn new(url: Url) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let body = tree.create_element("body");
        // Freshly created nodes under the root cannot fail to link
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, body);

        let origin = SecurityOrigin::from_url(&url);
        Self {
            tree,
            selection: FrameSelection::new(),
            design_mode: false,
            url,
            origin,
            view: Some(FrameView::default()),
            parent: None,
            plugin_document: false,
            html_element: html,
            body_element: body,
        }
    }

    /// Document hosting a full-frame plugin
    pub fn new_plugin_document(url: Url) -> Self {
        let mut doc = Self::new(url);
        doc.plugin_document = true;
        doc
    }

    /// Get document URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn security_origin(&self) -> &SecurityOrigin {
        &self.origin
    }

    pub fn security_origin_mut(&mut self) -> &mut SecurityOrigin {
        &mut self.origin
    }

    pub fn html(&self) -> NodeId {
        self.html_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Frame view, `None` once the frame is detached
    pub fn view(&self) -> Option<&FrameView> {
        self.view.as_ref()
    }

    pub fn set_view(&mut self, view: Option<FrameView>) {
        self.view = view;
    }

    /// Frame owner element in the parent document
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    pub fn is_plugin_document(&self) -> bool {
        self.plugin_document
    }

    /// Editability of `node`, with design mode making everything rich
    pub fn editability(&self, node: NodeId) -> Editability {
        if self.design_mode && self.tree.contains(node) {
            return Editability::Rich;
        }
        self.tree.editability(node)
    }

    pub fn has_editable_style(&self, node: NodeId) -> bool {
        self.editability(node) != Editability::ReadOnly
    }

    /// Whole document is editable (design mode or editable body)
    pub fn is_editable(&self) -> bool {
        self.design_mode || self.tree.has_editable_style(self.body_element)
    }

    /// Append a new element under `<body>`
    pub fn append_to_body(&mut self, tag: &str) -> Result<NodeId, DomError> {
        let id = self.tree.create_element(tag);
        self.tree.append_child(self.body_element, id)?;
        Ok(id)
    }
}

/// All documents of a page
#[derive(Debug, Default)]
pub struct Documents {
    docs: GenArena<Document>,
}

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level document
    pub fn insert(&mut self, doc: Document) -> DocumentId {
        let id = DocumentId(self.docs.insert(doc));
        tracing::trace!("Inserted document {:?}", id);
        id
    }

    /// Insert a subframe document owned by `owner`
    pub fn insert_child(&mut self, owner: NodeRef, mut doc: Document) -> Result<DocumentId, DomError> {
        if !self.get(owner.document).is_some_and(|d| d.tree.contains(owner.node)) {
            return Err(DomError::NotFound);
        }
        doc.parent = Some(owner);
        Ok(self.insert(doc))
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.docs.get(id.0)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.docs.get_mut(id.0)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.docs.contains(id.0)
    }

    /// Resolve a weak node reference
    pub fn node_exists(&self, node: NodeRef) -> bool {
        self.get(node.document).is_some_and(|d| d.tree.contains(node.node))
    }

    /// Parent document of a subframe
    pub fn parent(&self, id: DocumentId) -> Option<DocumentId> {
        self.get(id)?.parent.map(|owner| owner.document)
    }

    /// Topmost ancestor document
    pub fn local_root(&self, id: DocumentId) -> Option<DocumentId> {
        let mut current = self.contains(id).then_some(id)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Subframe documents whose owner lives in `id`
    pub fn children(&self, id: DocumentId) -> Vec<DocumentId> {
        self.docs
            .iter()
            .filter(|(_, doc)| doc.parent.is_some_and(|p| p.document == id))
            .map(|(idx, _)| DocumentId(idx))
            .collect()
    }

    /// Destroy a document and all of its subframes
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        for child in self.children(id) {
            self.remove(child);
        }
        let doc = self.docs.remove(id.0)?;
        tracing::debug!("Removed document {}", doc.url);
        Some(doc)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
