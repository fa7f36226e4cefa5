//! Outgoing drag state

use fos_dom::{DocumentId, NodeId, NodeRef};

use crate::data_transfer::SharedDataTransfer;
use crate::operation::DragSourceAction;

/// What an outgoing drag carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    /// Current selection, started from `node`
    Selection { node: NodeId },
    Image { element: NodeId },
    Link { anchor: NodeId },
    /// Element made draggable by script or `user-drag`
    Dhtml { element: NodeId },
}

impl DragSource {
    /// Source for a classified node; `None` for masks naming no single kind
    pub fn new(action: DragSourceAction, node: NodeId) -> Option<Self> {
        if action == DragSourceAction::SELECTION {
            Some(DragSource::Selection { node })
        } else if action == DragSourceAction::IMAGE {
            Some(DragSource::Image { element: node })
        } else if action == DragSourceAction::LINK {
            Some(DragSource::Link { anchor: node })
        } else if action == DragSourceAction::DHTML {
            Some(DragSource::Dhtml { element: node })
        } else {
            None
        }
    }

    /// Node being dragged
    pub fn node(&self) -> NodeId {
        match *self {
            DragSource::Selection { node } => node,
            DragSource::Image { element } => element,
            DragSource::Link { anchor } => anchor,
            DragSource::Dhtml { element } => element,
        }
    }

    pub fn action(&self) -> DragSourceAction {
        match self {
            DragSource::Selection { .. } => DragSourceAction::SELECTION,
            DragSource::Image { .. } => DragSourceAction::IMAGE,
            DragSource::Link { .. } => DragSourceAction::LINK,
            DragSource::Dhtml { .. } => DragSourceAction::DHTML,
        }
    }
}

/// State of a drag started from this page
#[derive(Debug, Clone)]
pub struct DragState {
    /// Document the drag started in
    pub frame: DocumentId,
    pub source: DragSource,
    /// Transfer used for the whole gesture
    pub transfer: SharedDataTransfer,
}

impl DragState {
    pub fn source_ref(&self) -> NodeRef {
        NodeRef::new(self.frame, self.source.node())
    }
}
