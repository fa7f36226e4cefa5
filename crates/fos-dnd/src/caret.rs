//! Drag caret
//!
//! Insertion point painted while dragging over editable content.

use fos_dom::{DocumentId, Documents, Editability, Position};

/// Page-wide drag caret
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragCaret {
    caret: Option<(DocumentId, Position)>,
}

impl DragCaret {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, document: DocumentId, position: Position) {
        self.caret = Some((document, position));
    }

    pub fn clear(&mut self) {
        if self.caret.take().is_some() {
            tracing::trace!("Cleared drag caret");
        }
    }

    pub fn has_caret(&self) -> bool {
        self.caret.is_some()
    }

    pub fn document(&self) -> Option<DocumentId> {
        self.caret.map(|(document, _)| document)
    }

    pub fn position(&self) -> Option<Position> {
        self.caret.map(|(_, position)| position)
    }

    /// Caret sits in content accepting markup
    pub fn is_content_richly_editable(&self, documents: &Documents) -> bool {
        let Some((document, position)) = self.caret else {
            return false;
        };
        documents
            .get(document)
            .is_some_and(|doc| doc.editability(position.node) == Editability::Rich)
    }
}
