//! Drag controller
//!
//! Tracks an inbound drag across the page's documents and decides, on every
//! native callback, whether script, an editable region or a navigation takes
//! it. There is no explicit state object; the controller re-derives what to
//! do from the document under the mouse and the destination action each time.
//!
//! Script dispatch can re-enter the controller through nested callbacks. Every
//! dispatch is bracketed by a [`SessionToken`]: callbacks queued during the
//! dispatch are drained first, and a token that no longer matches means the
//! session the caller was working on is gone.

use fos_dom::{DocumentId, NodeRef};
use url::Url;

use crate::client::{HitTestResult, NavigationRequest};
use crate::data_transfer::{AccessPolicy, DataTransfer, NumbOnDrop};
use crate::drag_data::{DragData, FilenamePolicy};
use crate::mouse::PlatformMouseEvent;
use crate::operation::DragDestinationAction;
use crate::page::{NestedCallback, Page};
use crate::session::DragSession;
use crate::state::DragState;

/// Snapshot of the controller's session epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

/// Drag and drop state machine of one page
#[derive(Debug, Default)]
pub struct DragController {
    pub(crate) document_under_mouse: Option<DocumentId>,
    pub(crate) drag_initiator: Option<DocumentId>,
    pub(crate) file_input_element_under_mouse: Option<NodeRef>,
    pub(crate) document_is_handling_drag: bool,
    pub(crate) drag_destination_action: DragDestinationAction,
    pub(crate) did_initiate_drag: bool,
    pub(crate) drag_state: Option<DragState>,
    epoch: u64,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Document currently hovered, if it is still alive
    pub fn document_under_mouse(&self, page: &Page) -> Option<DocumentId> {
        self.document_under_mouse.filter(|doc| page.documents.contains(*doc))
    }

    /// Document that started the current outgoing drag, if it is still alive
    pub fn drag_initiator(&self, page: &Page) -> Option<DocumentId> {
        self.drag_initiator.filter(|doc| page.documents.contains(*doc))
    }

    pub fn file_input_element_under_mouse(&self, page: &Page) -> Option<NodeRef> {
        self.file_input_element_under_mouse.filter(|input| page.documents.node_exists(*input))
    }

    pub fn document_is_handling_drag(&self) -> bool {
        self.document_is_handling_drag
    }

    pub fn drag_destination_action(&self) -> DragDestinationAction {
        self.drag_destination_action
    }

    pub fn did_initiate_drag(&self) -> bool {
        self.did_initiate_drag
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag_state.as_ref()
    }

    // ========================================================================
    // Session tokens
    // ========================================================================

    pub fn session_token(&self) -> SessionToken {
        SessionToken(self.epoch)
    }

    pub fn is_current(&self, token: SessionToken) -> bool {
        token.0 == self.epoch
    }

    fn invalidate_session(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Deliver callbacks script queued while it ran
    pub(crate) fn run_nested_callbacks(&mut self, page: &mut Page) {
        while let Some(callback) = page.take_nested_callback() {
            tracing::debug!("Running nested callback: {:?}", callback);
            match callback {
                NestedCallback::DragExited { drag_data, local_root } => {
                    self.drag_exited(page, &drag_data, local_root);
                }
                NestedCallback::DragEnded => self.drag_ended(page),
            }
        }
    }

    /// Drain nested callbacks and report whether the session behind `token`
    /// still has a live document under the mouse
    pub(crate) fn resume_after_script(&mut self, page: &mut Page, token: SessionToken) -> bool {
        self.run_nested_callbacks(page);
        if !self.is_current(token) {
            tracing::debug!("Drag session ended while script was running");
            return false;
        }
        if self.document_under_mouse.is_some() && self.document_under_mouse(page).is_none() {
            tracing::debug!("Document under mouse was destroyed while script was running");
            return false;
        }
        true
    }

    // ========================================================================
    // Inbound drags
    // ========================================================================

    /// Pointer entered or moved inside `local_root` while dragging
    pub fn drag_entered_or_updated(
        &mut self,
        page: &mut Page,
        drag_data: &DragData,
        local_root: DocumentId,
    ) -> DragSession {
        let document = self.document_at_point(page, drag_data, local_root);
        self.mouse_moved_into_document(page, document);

        self.drag_destination_action = if page.clients.chrome.accepts_load_drops() {
            DragDestinationAction::ANY
        } else {
            DragDestinationAction::DHTML | DragDestinationAction::EDIT
        };
        tracing::debug!("Drag destination action: {:?}", self.drag_destination_action);

        let token = self.session_token();
        let mut session = DragSession::default();
        self.document_is_handling_drag =
            self.try_document_drag(page, drag_data, self.drag_destination_action, &mut session, local_root);
        if !self.is_current(token) {
            return DragSession::default();
        }

        if !self.document_is_handling_drag && self.drag_destination_action.contains(DragDestinationAction::LOAD) {
            session.operation = self.operation_for_load(page, drag_data, local_root);
        }
        session
    }

    /// Pointer left `local_root` while dragging
    pub fn drag_exited(&mut self, page: &mut Page, drag_data: &DragData, local_root: DocumentId) {
        let has_view = page.documents.get(local_root).is_some_and(|doc| doc.view().is_some());
        if has_view {
            let readable = match self.document_under_mouse(page).and_then(|doc| page.documents.get(doc)) {
                Some(doc) => doc.security_origin().is_local(),
                None => true,
            };
            let policy = if readable { AccessPolicy::Readable } else { AccessPolicy::TypesReadable };
            let transfer = DataTransfer::for_drag_data(drag_data, policy);
            transfer.borrow_mut().set_source_operation(drag_data.dragging_source_operation_mask());

            let guard = NumbOnDrop::new(transfer);
            let event = PlatformMouseEvent::for_drag(drag_data);
            page.with_script_scope(|events, scope| {
                events.cancel_drag_and_drop(scope, local_root, &event, guard.transfer());
            });
        }

        self.invalidate_session();
        self.mouse_moved_into_document(page, None);
        self.reset_file_input(page);
        tracing::debug!("Drag exited");
        self.run_nested_callbacks(page);
    }

    /// Drop at the current position. Returns whether anything accepted it.
    pub fn perform_drag(&mut self, page: &mut Page, drag_data: &DragData, local_root: DocumentId) -> bool {
        let document = self.document_at_point(page, drag_data, local_root);
        self.mouse_moved_into_document(page, document);
        let _gesture = page.user_gesture.indicator();
        let token = self.session_token();

        if self.drag_destination_action.contains(DragDestinationAction::DHTML) && self.document_is_handling_drag {
            let mut prevented_default = false;
            let has_view = page.documents.get(local_root).is_some_and(|doc| doc.view().is_some());
            if has_view {
                let transfer = DataTransfer::for_drag_data(drag_data, AccessPolicy::Readable);
                transfer.borrow_mut().set_source_operation(drag_data.dragging_source_operation_mask());
                let guard = NumbOnDrop::new(transfer);

                let event = PlatformMouseEvent::for_drag(drag_data);
                let result = page.with_script_scope(|events, scope| {
                    events.perform_drag_and_drop(scope, local_root, &event, guard.transfer())
                });
                prevented_default = result.is_handled();
                drop(guard);

                if !self.resume_after_script(page, token) {
                    return false;
                }
                if !prevented_default {
                    // Plugins that take drags consume the drop themselves
                    let result = self.hit_test(page, drag_data, local_root);
                    prevented_default = self.is_drag_processing_plugin(page, &result);
                }
            }

            if prevented_default {
                tracing::debug!("Drop handled by script");
                self.mouse_moved_into_document(page, None);
                self.cancel_drag(page);
                return true;
            }
        }

        if self.drag_destination_action.contains(DragDestinationAction::EDIT) && self.conclude_edit_drag(page, drag_data) {
            tracing::debug!("Drop inserted into editable content");
            self.mouse_moved_into_document(page, None);
            return true;
        }
        if !self.is_current(token) {
            return false;
        }

        self.mouse_moved_into_document(page, None);
        if !self.drag_destination_action.contains(DragDestinationAction::LOAD) {
            return false;
        }
        if self.operation_for_load(page, drag_data, local_root).is_empty() {
            return false;
        }

        if !page.settings.navigate_on_drag_drop {
            tracing::debug!("Navigation on drop is disabled");
            return false;
        }
        let Some((url, _)) = drag_data.as_url(FilenamePolicy::ConvertFilenames) else {
            return false;
        };
        let url = match Url::parse(&url) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("Dropped URL is not navigable: {} ({})", url, err);
                return false;
            }
        };
        tracing::debug!("Navigating main frame to dropped URL: {}", url);
        let request = NavigationRequest {
            url,
            frame: page.main_frame(),
            has_user_gesture: page.processing_user_gesture(),
        };
        page.clients.loader.load(request);
        true
    }

    /// The outgoing drag is over
    pub fn drag_ended(&mut self, page: &mut Page) {
        self.drag_initiator = None;
        self.did_initiate_drag = false;
        page.drag_caret.clear();
        if let Some(state) = self.drag_state.take() {
            if let Ok(mut transfer) = state.transfer.try_borrow_mut() {
                transfer.set_access_policy(AccessPolicy::Numb);
            }
        }
        tracing::debug!("Drag ended");
    }

    /// Remove the drag caret
    pub fn cancel_drag(&mut self, page: &mut Page) {
        page.drag_caret.clear();
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    pub(crate) fn hit_test(&self, page: &Page, drag_data: &DragData, local_root: DocumentId) -> HitTestResult {
        let result = page
            .clients
            .hit_tester
            .hit_test(&page.documents, local_root, drag_data.client_position());
        tracing::trace!("Hit test at {:?}: {:?}", drag_data.client_position(), result);
        result
    }

    /// Document containing the node under the drag position
    pub(crate) fn document_at_point(
        &self,
        page: &Page,
        drag_data: &DragData,
        local_root: DocumentId,
    ) -> Option<DocumentId> {
        if !page.documents.contains(local_root) {
            return None;
        }
        let result = self.hit_test(page, drag_data, local_root);
        result.inner_node_ref().filter(|node| page.documents.node_exists(*node)).map(|node| node.document)
    }

    /// Track the hovered document, removing the caret from the one left behind
    pub(crate) fn mouse_moved_into_document(&mut self, page: &mut Page, document: Option<DocumentId>) {
        if self.document_under_mouse == document {
            return;
        }
        if self.document_under_mouse.is_some() {
            self.cancel_drag(page);
        }
        tracing::debug!("Document under mouse: {:?} -> {:?}", self.document_under_mouse, document);
        self.document_under_mouse = document;
        self.invalidate_session();
    }

    fn is_drag_processing_plugin(&self, page: &Page, result: &HitTestResult) -> bool {
        let Some(node) = result.inner_node else {
            return false;
        };
        page.documents
            .get(result.document)
            .and_then(|doc| doc.tree.element(node))
            .is_some_and(|element| element.is_plugin() && element.plugin_can_process_drag())
    }

    /// Set the receive-files flag of the tracked file input
    pub(crate) fn set_file_input_can_receive(&self, page: &mut Page, value: bool) {
        let Some(input) = self.file_input_element_under_mouse else {
            return;
        };
        let state = page
            .documents
            .get_mut(input.document)
            .and_then(|doc| doc.tree.element_mut(input.node))
            .and_then(|element| element.file_input_mut());
        if let Some(state) = state {
            state.set_can_receive_dropped_files(value);
        }
    }

    pub(crate) fn reset_file_input(&mut self, page: &mut Page) {
        self.set_file_input_can_receive(page, false);
        self.file_input_element_under_mouse = None;
    }
}
