//! Drag-over evaluation
//!
//! Whether the hovered document takes the drag (script first, then an
//! editable region) and which operation it would perform.

use fos_dom::{DocumentId, NodeRef};

use crate::client::HitTestResult;
use crate::controller::DragController;
use crate::data_transfer::{AccessPolicy, DataTransfer, NumbOnDrop};
use crate::drag_data::{DragData, FilenamePolicy};
use crate::mouse::PlatformMouseEvent;
use crate::operation::{DragDestinationAction, DragOperation};
use crate::page::Page;
use crate::session::DragSession;

/// Operation used when script accepts a drag without choosing one
pub fn default_operation_for_drag(source_operation_mask: DragOperation) -> DragOperation {
    if source_operation_mask == DragOperation::EVERY {
        return DragOperation::COPY;
    }
    if source_operation_mask.is_empty() {
        return DragOperation::NONE;
    }
    if source_operation_mask.contains(DragOperation::MOVE) {
        return DragOperation::MOVE;
    }
    if source_operation_mask.contains(DragOperation::COPY) {
        return DragOperation::COPY;
    }
    if source_operation_mask.contains(DragOperation::LINK) {
        return DragOperation::LINK;
    }
    DragOperation::GENERIC
}

impl DragController {
    /// Whether the hovered document claims the drag, through script or an
    /// editable region. Fills in `session` when it does.
    pub fn try_document_drag(
        &mut self,
        page: &mut Page,
        drag_data: &DragData,
        action_mask: DragDestinationAction,
        session: &mut DragSession,
        local_root: DocumentId,
    ) -> bool {
        let Some(document) = self.document_under_mouse(page) else {
            return false;
        };
        if let Some(initiator) = self.drag_initiator(page) {
            let can_access = match (page.documents.get(document), page.documents.get(initiator)) {
                (Some(doc), Some(source)) => doc.security_origin().can_access(source.security_origin()),
                _ => false,
            };
            if !can_access {
                tracing::debug!("Rejecting cross-origin drag into {:?}", document);
                return false;
            }
        }

        let token = self.session_token();
        let mut is_handling_drag = false;
        if action_mask.contains(DragDestinationAction::DHTML) {
            let operation = self.try_dhtml_drag(page, drag_data, local_root);
            if !self.resume_after_script(page, token) {
                return false;
            }
            if let Some(operation) = operation {
                session.operation = operation;
                is_handling_drag = true;
            }
        }

        let Some(document) = self.document_under_mouse(page) else {
            return false;
        };
        if page.documents.get(document).and_then(|doc| doc.view()).is_none() {
            return false;
        }

        if is_handling_drag {
            tracing::debug!("Drag handled by script, operation {:?}", session.operation);
            page.drag_caret.clear();
            return true;
        }

        if action_mask.contains(DragDestinationAction::EDIT) && self.can_process_drag(page, drag_data, local_root) {
            return self.track_edit_drag(page, drag_data, session, local_root);
        }

        // Not over an editable region
        page.drag_caret.clear();
        self.reset_file_input(page);
        false
    }

    fn track_edit_drag(
        &mut self,
        page: &mut Page,
        drag_data: &DragData,
        session: &mut DragSession,
        local_root: DocumentId,
    ) -> bool {
        let result = self.hit_test(page, drag_data, local_root);
        let Some(element) = element_under_mouse(page, &result) else {
            return false;
        };

        let is_file_input = page
            .documents
            .get(element.document)
            .and_then(|doc| doc.tree.element(element.node))
            .is_some_and(|e| e.is_file_input());
        let file_input = is_file_input.then_some(element);
        if self.file_input_element_under_mouse != file_input {
            self.set_file_input_can_receive(page, false);
            self.file_input_element_under_mouse = file_input;
        }

        if self.file_input_element_under_mouse.is_none() {
            match page.clients.editor.position_for_point(&page.documents, &result) {
                Some(position) => page.drag_caret.set(result.document, position),
                None => page.drag_caret.clear(),
            }
        }

        session.operation = if self.drag_is_move(page, element.document, drag_data) {
            DragOperation::MOVE
        } else {
            DragOperation::COPY
        };
        session.mouse_is_over_file_input = self.file_input_element_under_mouse.is_some();
        session.number_of_items_to_be_accepted = 0;

        let number_of_files = drag_data.number_of_files();
        let input = file_input
            .and_then(|input| page.documents.get(input.document)?.tree.element(input.node))
            .map(|input| (input.is_disabled_form_control(), input.multiple()));
        match input {
            Some((disabled, multiple)) => {
                session.number_of_items_to_be_accepted = if disabled {
                    0
                } else if multiple {
                    number_of_files
                } else if number_of_files > 1 {
                    0
                } else {
                    1
                };
                if session.number_of_items_to_be_accepted == 0 {
                    session.operation = DragOperation::NONE;
                }
                let accepts = session.number_of_items_to_be_accepted > 0;
                self.set_file_input_can_receive(page, accepts);
            }
            None => {
                // Outside a file input only a single dropped item can be loaded
                session.number_of_items_to_be_accepted = usize::from(number_of_files == 1);
            }
        }
        tracing::debug!("Drag over editable content: {:?}", session);
        true
    }

    /// Dispatch dragenter/dragover. `Some(operation)` when script handled it.
    ///
    /// Nested callbacks posted by script are left queued for the caller.
    pub fn try_dhtml_drag(
        &mut self,
        page: &mut Page,
        drag_data: &DragData,
        local_root: DocumentId,
    ) -> Option<DragOperation> {
        let document = self.document_under_mouse(page)?;
        let policy = if self.can_read_drag_payload(page, document) {
            AccessPolicy::Readable
        } else {
            AccessPolicy::TypesReadable
        };

        let source_operation_mask = drag_data.dragging_source_operation_mask();
        let transfer = DataTransfer::for_drag_data(drag_data, policy);
        transfer.borrow_mut().set_source_operation(source_operation_mask);
        let guard = NumbOnDrop::new(transfer);

        let event = PlatformMouseEvent::for_drag(drag_data);
        let result = page.with_script_scope(|events, scope| {
            events.update_drag_and_drop(scope, local_root, &event, guard.transfer())
        });
        if !result.is_handled() {
            tracing::debug!("Drag not handled by script");
            return None;
        }

        let operation = {
            let transfer = guard.transfer().borrow();
            if transfer.drop_effect_is_uninitialized() {
                default_operation_for_drag(source_operation_mask)
            } else {
                let operation = transfer.destination_operation();
                // Script may not pick an operation the source does not offer
                if source_operation_mask.intersects(operation) {
                    operation
                } else {
                    DragOperation::NONE
                }
            }
        };
        Some(operation)
    }

    /// Payload is readable during dragover for local documents and for drags
    /// this page started from an origin the document can access
    fn can_read_drag_payload(&self, page: &Page, document: DocumentId) -> bool {
        let Some(doc) = page.documents.get(document) else {
            return false;
        };
        if doc.security_origin().is_local() {
            return true;
        }
        self.drag_initiator(page)
            .and_then(|initiator| page.documents.get(initiator))
            .is_some_and(|source| doc.security_origin().can_access(source.security_origin()))
    }

    /// Whether an edit drop could take the drag at its position
    pub fn can_process_drag(&self, page: &Page, drag_data: &DragData, local_root: DocumentId) -> bool {
        if !drag_data.contains_compatible_content() {
            return false;
        }
        let result = self.hit_test(page, drag_data, local_root);
        let Some(node) = result.inner_node else {
            return false;
        };
        let Some(doc) = page.documents.get(result.document) else {
            return false;
        };

        if let Some(element) = doc.tree.element(node) {
            if drag_data.contains_files() && element.is_file_input() {
                return true;
            }
            if element.is_plugin() {
                if !element.plugin_can_process_drag() && !doc.has_editable_style(node) {
                    return false;
                }
            } else if !doc.has_editable_style(node) {
                return false;
            }
        } else if !doc.has_editable_style(node) {
            return false;
        }

        // Dropping a selection onto itself does nothing
        let is_selected = doc.selection.contains_point(result.local_point);
        if self.did_initiate_drag
            && self.document_under_mouse.is_some()
            && self.document_under_mouse == self.drag_initiator
            && is_selected
        {
            return false;
        }
        true
    }

    /// Operation a navigation drop would perform.
    ///
    /// Hit tests again instead of reusing the drag-over result, so a DOM
    /// changed by a dragover listener is seen as it is now.
    pub fn operation_for_load(&self, page: &Page, drag_data: &DragData, local_root: DocumentId) -> DragOperation {
        let document = self.document_at_point(page, drag_data, local_root);
        if let Some(doc) = document.and_then(|id| page.documents.get(id)) {
            if self.did_initiate_drag || doc.is_plugin_document() || doc.is_editable() {
                return DragOperation::NONE;
            }
        }
        if drag_data.contains_url(FilenamePolicy::ConvertFilenames) && !self.did_initiate_drag {
            DragOperation::COPY
        } else {
            DragOperation::NONE
        }
    }

    /// A drag of an editable selection within its own document moves it
    /// unless the copy key is held
    pub fn drag_is_move(&self, page: &Page, document: DocumentId, drag_data: &DragData) -> bool {
        if self.document_under_mouse.is_none() || self.document_under_mouse != self.drag_initiator {
            return false;
        }
        let Some(doc) = page.documents.get(document) else {
            return false;
        };
        let selection = &doc.selection;
        let is_content_editable = selection
            .range()
            .is_some_and(|range| doc.has_editable_style(range.start.node));
        selection.is_range() && is_content_editable && !drag_data.modifiers().is_copy_key_down()
    }
}

/// Element at the hit, text nodes resolving to their parent element
pub(crate) fn element_under_mouse(page: &Page, result: &HitTestResult) -> Option<NodeRef> {
    let node = result.inner_node?;
    let doc = page.documents.get(result.document)?;
    let element = doc.tree.enclosing_element(node)?;
    Some(NodeRef::new(result.document, element))
}
