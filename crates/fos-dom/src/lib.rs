//! fOS DOM - Document Object Model
//!
//! Arena-based DOM substrate. Nodes and documents are addressed through
//! generational handles, so a handle kept across script execution simply
//! stops resolving once its target is destroyed.

mod document;
mod fragment;
mod generation;
mod geometry;
mod node;
mod range;
mod selection;
mod tree;

pub use document::{Document, Documents, FrameView};
pub use fragment::{DocumentFragment, FragmentNode, escape_attr, escape_text, outer_html};
pub use generation::{GenArena, GenIndex, Generation};
pub use geometry::{FloatSize, IntPoint, IntRect, IntSize};
pub use node::{
    Attribute, ContentEditable, ElementData, ElementState, FileInputState, ImageResource, Node,
    NodeData, UserDrag,
};
pub use range::{compare_positions, range_markup, range_text};
pub use selection::{FrameSelection, Granularity, Position, SelectionRange, SelectionType};
pub use tree::{Ancestors, DomTree, Editability};

/// Node identifier (generational index into a document's arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) GenIndex);

/// Document identifier (generational index into [`Documents`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub(crate) GenIndex);

/// Weak reference to a node in a specific document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub document: DocumentId,
    pub node: NodeId,
}

impl NodeRef {
    pub const fn new(document: DocumentId, node: NodeId) -> Self {
        Self { document, node }
    }
}

/// DOM error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found")]
    NotFound,

    #[error("Hierarchy request error")]
    HierarchyRequest,
}
