//! Edit drops
//!
//! Inserting dropped content into editable regions and handing dropped files
//! to file inputs.

use fos_dom::{DocumentFragment, DocumentId, Granularity, NodeRef, Position};

use crate::client::{DeleteMode, DispatchEventResult, DragSourceType, InsertMode};
use crate::controller::DragController;
use crate::document_drag::element_under_mouse;
use crate::drag_data::{DragData, FilenamePolicy};
use crate::page::Page;

/// Fragment built from a drop payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFragment {
    pub fragment: DocumentFragment,
    /// Built from plain text rather than markup or a URL
    pub chose_plain_text: bool,
}

/// Best content the payload offers: markup, then a link for a URL, then
/// plain text when `allow_plain_text` is set
pub fn document_fragment_from_drag_data(
    page: &Page,
    document: DocumentId,
    drag_data: &DragData,
    allow_plain_text: bool,
) -> Option<DroppedFragment> {
    if drag_data.contains_compatible_content() {
        let from_markup = drag_data.html_and_base_url().and_then(|(html, base_url)| {
            page.clients.editor.fragment_from_markup(&page.documents, document, &html, &base_url)
        });
        if let Some(fragment) = from_markup {
            return Some(DroppedFragment { fragment, chose_plain_text: false });
        }

        if drag_data.contains_url(FilenamePolicy::DoNotConvertFilenames) {
            if let Some((url, mut title)) = drag_data.as_url(FilenamePolicy::DoNotConvertFilenames) {
                if !url.is_empty() {
                    if title.is_empty() {
                        // Plain text first, the URL may have been normalized
                        if drag_data.contains_plain_text() {
                            title = drag_data.as_plain_text();
                        }
                        if title.is_empty() {
                            title = url.clone();
                        }
                    }
                    return Some(DroppedFragment {
                        fragment: DocumentFragment::anchor(&url, &title),
                        chose_plain_text: false,
                    });
                }
            }
        }
    }

    if allow_plain_text && drag_data.contains_plain_text() {
        return Some(DroppedFragment {
            fragment: DocumentFragment::from_plain_text(&drag_data.as_plain_text()),
            chose_plain_text: true,
        });
    }
    None
}

impl DragController {
    /// Insert the drop into the editable content under the mouse, or give
    /// dropped files to the file input there
    pub fn conclude_edit_drag(&mut self, page: &mut Page, drag_data: &DragData) -> bool {
        let file_input = self.file_input_element_under_mouse(page);
        self.reset_file_input(page);

        let Some(document) = self.document_under_mouse(page) else {
            return false;
        };
        let Some(local_root) = page.documents.local_root(document) else {
            return false;
        };
        let result = self.hit_test(page, drag_data, local_root);
        let Some(element) = element_under_mouse(page, &result) else {
            return false;
        };
        let inner_document = element.document;

        if page.drag_caret.has_caret() {
            let token = self.session_token();
            let dispatch = self.dispatch_text_input(page, drag_data);
            if !self.resume_after_script(page, token) {
                return false;
            }
            if dispatch != DispatchEventResult::NotCanceled {
                tracing::debug!("textInput canceled, script owns the insertion");
                return true;
            }
        }

        if drag_data.contains_files() {
            if let Some(input) = file_input {
                return receive_dropped_files(page, input, &drag_data.file_paths());
            }
        }

        if !self.can_process_drag(page, drag_data, local_root) {
            page.drag_caret.clear();
            return false;
        }

        let caret = page
            .drag_caret
            .document()
            .zip(page.drag_caret.position())
            .filter(|(caret_document, _)| *caret_document == inner_document)
            .map(|(_, position)| position);
        let caret_is_richly_editable = page.drag_caret.is_content_richly_editable(&page.documents);
        page.drag_caret.clear();

        // Script may have detached the frame during textInput
        let available = page
            .documents
            .get(inner_document)
            .is_some_and(|doc| doc.selection.is_available());
        if !available {
            return false;
        }
        let Some(caret) = caret else {
            return false;
        };

        let is_move = self.drag_is_move(page, inner_document, drag_data);
        if is_move || caret_is_richly_editable {
            let Some(dropped) = document_fragment_from_drag_data(page, inner_document, drag_data, true) else {
                return false;
            };

            if is_move {
                return move_selection(page, inner_document, drag_data, &dropped.fragment, caret);
            }
            if set_selection_to_drag_caret(page, inner_document, caret) {
                let insert = if drag_data.can_smart_replace() { InsertMode::Smart } else { InsertMode::Simple };
                let source = if dropped.chose_plain_text { DragSourceType::PlainText } else { DragSourceType::Html };
                return replace_selection(page, inner_document, &dropped.fragment, insert, source);
            }
            return true;
        }

        let text = drag_data.as_plain_text();
        if text.is_empty() {
            return false;
        }
        if set_selection_to_drag_caret(page, inner_document, caret) {
            let fragment = DocumentFragment::from_plain_text(&text);
            return replace_selection(page, inner_document, &fragment, InsertMode::Simple, DragSourceType::PlainText);
        }
        true
    }

    fn dispatch_text_input(&mut self, page: &mut Page, drag_data: &DragData) -> DispatchEventResult {
        let text = if page.drag_caret.is_content_richly_editable(&page.documents) {
            String::new()
        } else {
            drag_data.as_plain_text()
        };
        let target = page.drag_caret.document().zip(page.drag_caret.position()).and_then(|(document, position)| {
            let element = page.documents.get(document)?.tree.enclosing_element(position.node)?;
            Some(NodeRef::new(document, element))
        });
        let Some(target) = target else {
            return DispatchEventResult::NotCanceled;
        };
        page.with_script_scope(|events, scope| events.dispatch_text_input(scope, target, &text))
    }
}

fn receive_dropped_files(page: &mut Page, input: NodeRef, paths: &[String]) -> bool {
    let Some(element) = page
        .documents
        .get_mut(input.document)
        .and_then(|doc| doc.tree.element_mut(input.node))
    else {
        return false;
    };
    if element.is_disabled_form_control() {
        return false;
    }
    let multiple = element.multiple();
    let Some(state) = element.file_input_mut() else {
        return false;
    };
    let received = state.receive_dropped_files(paths, multiple);
    tracing::debug!("File input received {} dropped file(s): {}", paths.len(), received);
    received
}

/// Delete the dragged selection, then insert at where the drop point moved to
fn move_selection(
    page: &mut Page,
    document: DocumentId,
    drag_data: &DragData,
    fragment: &DocumentFragment,
    caret: Position,
) -> bool {
    let Some(granularity) = page.documents.get(document).map(|doc| doc.selection.granularity()) else {
        return false;
    };
    // Moves always smart delete but only smart insert word selections
    let delete = if page.settings.smart_insert_delete_enabled { DeleteMode::Smart } else { DeleteMode::Simple };
    let insert = if delete == DeleteMode::Smart && granularity == Granularity::Word && drag_data.can_smart_replace() {
        InsertMode::Smart
    } else {
        InsertMode::Simple
    };

    let Page { documents, clients, .. } = page;
    let Some(drop_position) = clients.editor.delete_selection_after_dragging(documents, document, delete, caret) else {
        return false;
    };
    let Some(doc) = documents.get_mut(document) else {
        return false;
    };
    doc.selection.set_caret(drop_position);
    if !doc.selection.is_available() {
        return true;
    }
    replace_selection(page, document, fragment, insert, DragSourceType::Html)
}

/// Collapse the selection onto the drag caret; true when it lands in editable content
fn set_selection_to_drag_caret(page: &mut Page, document: DocumentId, caret: Position) -> bool {
    let Some(doc) = page.documents.get_mut(document) else {
        return false;
    };
    doc.selection.set_caret(caret);
    !doc.selection.is_none() && doc.has_editable_style(caret.node)
}

fn replace_selection(
    page: &mut Page,
    document: DocumentId,
    fragment: &DocumentFragment,
    insert: InsertMode,
    source: DragSourceType,
) -> bool {
    let Page { documents, clients, .. } = page;
    clients
        .editor
        .replace_selection_after_dragging(documents, document, fragment, insert, source)
}

