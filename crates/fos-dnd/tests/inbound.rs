//! Inbound drag tests
//!
//! Drags arriving from outside the page: script acceptance, operation
//! negotiation, file inputs, navigation drops and reentrant callbacks.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Fixture, HitRegion, drag_at, file_drag, text_drag, url_drag};
use fos_dnd::{
    AccessPolicy, DataObject, DataTransfer, DragOperation, DragSession, EventResult, MIME_TEXT_PLAIN, Modifiers,
    Settings,
};
use fos_dom::{Document, IntPoint, IntRect, NodeId, NodeRef};
use url::Url;

const POINT: IntPoint = IntPoint::new(20, 20);
const BOX: IntRect = IntRect::new(0, 0, 100, 100);

fn add_file_input(f: &mut Fixture, rect: IntRect) -> NodeId {
    let main = f.main;
    let doc = f.doc_mut(main);
    let input = doc.tree.create_file_input();
    let body = doc.body();
    doc.tree.append_child(body, input).unwrap();
    f.add_region(main, input, rect);
    input
}

fn can_receive_files(f: &Fixture, input: NodeId) -> bool {
    f.doc(f.main)
        .tree
        .element(input)
        .and_then(|e| e.file_input())
        .is_some_and(|state| state.can_receive_dropped_files())
}

fn accept_drag_over(f: &Fixture, effect: Option<&'static str>) {
    f.script.borrow_mut().drag_over = Some(Box::new(move |_, transfer| {
        if let Some(effect) = effect {
            transfer.borrow_mut().set_drop_effect(effect);
        }
        EventResult::HandledDefaultPrevented
    }));
}

// ============================================================================
// OPERATION NEGOTIATION
// ============================================================================

#[test]
fn test_script_accepts_without_drop_effect() {
    let mut f = Fixture::new("https://a.test/");
    accept_drag_over(&f, None);

    let mut data = DataObject::new();
    data.set_data(MIME_TEXT_PLAIN, "x");
    let drag = drag_at(data, POINT, DragOperation::COPY | DragOperation::LINK, Modifiers::empty());
    let session = f.enter(&drag);

    assert!(f.controller.document_is_handling_drag());
    assert_eq!(session.operation, DragOperation::COPY);
    assert!(!f.page.drag_caret.has_caret());
}

#[test]
fn test_script_operation_outside_mask_is_clamped() {
    let mut f = Fixture::new("https://a.test/");
    accept_drag_over(&f, Some("link"));

    let mut data = DataObject::new();
    data.set_data(MIME_TEXT_PLAIN, "x");
    let drag = drag_at(data, POINT, DragOperation::COPY, Modifiers::empty());
    let session = f.enter(&drag);

    assert!(f.controller.document_is_handling_drag());
    assert_eq!(session.operation, DragOperation::NONE);
}

#[test]
fn test_script_operation_inside_mask_is_kept() {
    let mut f = Fixture::new("https://a.test/");
    accept_drag_over(&f, Some("copy"));

    let drag = text_drag("x", POINT);
    let session = f.enter(&drag);
    assert_eq!(session.operation, DragOperation::COPY);
}

// ============================================================================
// ACCESS POLICY
// ============================================================================

#[test]
fn test_transfers_are_numb_after_dispatch() {
    let mut f = Fixture::new("https://a.test/");
    accept_drag_over(&f, None);
    f.script.borrow_mut().drop = Some(Box::new(|_, _| EventResult::HandledDefaultPrevented));

    let drag = text_drag("x", POINT);
    f.enter(&drag);
    assert!(f.drop(&drag));

    let script = f.script.borrow();
    assert_eq!(script.fired, ["dragover", "drop"]);
    assert_eq!(script.retained.len(), 2);
    for transfer in &script.retained {
        assert_eq!(transfer.borrow().access_policy(), AccessPolicy::Numb);
        assert!(transfer.borrow().types().is_empty());
        assert_eq!(transfer.borrow().get_data("text"), "");
    }
}

#[test]
fn test_unhandled_drag_over_still_numbs_transfer() {
    let mut f = Fixture::new("https://a.test/");
    let drag = text_drag("x", POINT);
    f.enter(&drag);

    let script = f.script.borrow();
    assert_eq!(script.retained.len(), 1);
    assert_eq!(script.retained[0].borrow().access_policy(), AccessPolicy::Numb);
}

#[test]
fn test_cross_origin_drag_over_sees_types_only() {
    let mut f = Fixture::new("https://a.test/");
    let seen = Rc::new(Cell::new(None));
    let seen_in_handler = seen.clone();
    f.script.borrow_mut().drag_over = Some(Box::new(move |_, transfer| {
        let transfer = transfer.borrow();
        seen_in_handler.set(Some((
            transfer.access_policy(),
            transfer.types() == [MIME_TEXT_PLAIN],
            transfer.get_data("text/plain").is_empty(),
        )));
        EventResult::NotHandled
    }));

    f.enter(&text_drag("secret", POINT));
    assert_eq!(seen.get(), Some((AccessPolicy::TypesReadable, true, true)));
}

#[test]
fn test_local_document_reads_payload() {
    let mut f = Fixture::new("file:///tmp/page.html");
    let seen = Rc::new(Cell::new(None));
    let seen_in_handler = seen.clone();
    f.script.borrow_mut().drag_over = Some(Box::new(move |_, transfer| {
        let transfer = transfer.borrow();
        seen_in_handler.set(Some((transfer.access_policy(), transfer.get_data("text") == "secret")));
        EventResult::NotHandled
    }));

    f.enter(&text_drag("secret", POINT));
    assert_eq!(seen.get(), Some((AccessPolicy::Readable, true)));
}

#[test]
fn test_drag_exit_policy_and_reset() {
    let mut f = Fixture::new("https://a.test/");
    let input = add_file_input(&mut f, BOX);
    let seen = Rc::new(Cell::new(None));
    let seen_in_handler = seen.clone();
    f.script.borrow_mut().drag_leave = Some(Box::new(move |_, transfer| {
        seen_in_handler.set(Some(transfer.borrow().access_policy()));
        EventResult::NotHandled
    }));

    let drag = file_drag(&["/tmp/a.txt"], POINT);
    f.enter(&drag);
    assert!(can_receive_files(&f, input));

    f.exit(&drag);
    assert_eq!(seen.get(), Some(AccessPolicy::TypesReadable));
    assert!(!can_receive_files(&f, input));
    assert!(f.controller.document_under_mouse(&f.page).is_none());
    assert!(f.controller.file_input_element_under_mouse(&f.page).is_none());
    let script = f.script.borrow();
    assert_eq!(script.fired, ["dragover", "dragleave"]);
    assert_eq!(script.retained[1].borrow().access_policy(), AccessPolicy::Numb);
}

// ============================================================================
// CROSS ORIGIN
// ============================================================================

#[test]
fn test_cross_origin_initiator_is_rejected() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let editable = f.add_element(main, "div", BOX);
    f.set_attr(main, editable, "contenteditable", "true");

    // A drag started by a document of another origin on the same page
    let other = f.page.documents.insert(Document::new(Url::parse("https://b.test/").unwrap()));
    let source = DataTransfer::for_drag_source();
    f.controller.do_system_drag(&mut f.page, other, None, POINT, POINT, &source);
    assert_eq!(f.controller.drag_initiator(&f.page), Some(other));

    let hit_tests_before = *f.hit_tests.borrow();
    let session = f.enter(&text_drag("x", POINT));

    assert!(!f.controller.document_is_handling_drag());
    assert_eq!(session, DragSession::default());
    assert!(!f.page.drag_caret.has_caret());
    assert!(f.fired().is_empty());
    // Only locating the document and the load check hit test
    assert_eq!(*f.hit_tests.borrow() - hit_tests_before, 2);
}

// ============================================================================
// FILE INPUTS
// ============================================================================

#[test]
fn test_repeated_updates_are_idempotent() {
    let mut f = Fixture::new("https://a.test/");
    let input = add_file_input(&mut f, BOX);
    let drag = file_drag(&["/tmp/a.txt"], POINT);

    let first = f.enter(&drag);
    assert!(first.mouse_is_over_file_input);
    assert_eq!(first.number_of_items_to_be_accepted, 1);
    assert_eq!(first.operation, DragOperation::COPY);
    assert!(can_receive_files(&f, input));

    let second = f.enter(&drag);
    assert_eq!(first, second);
    assert!(can_receive_files(&f, input));
    assert_eq!(
        f.controller.file_input_element_under_mouse(&f.page),
        Some(NodeRef::new(f.main, input))
    );
}

#[test]
fn test_disabled_file_input_accepts_nothing() {
    let mut f = Fixture::new("https://a.test/");
    let input = add_file_input(&mut f, BOX);
    let main = f.main;
    f.set_attr(main, input, "disabled", "");
    f.set_attr(main, input, "multiple", "");

    let session = f.enter(&file_drag(&["/tmp/a", "/tmp/b", "/tmp/c"], POINT));
    assert!(session.mouse_is_over_file_input);
    assert_eq!(session.number_of_items_to_be_accepted, 0);
    assert_eq!(session.operation, DragOperation::NONE);
    assert!(!can_receive_files(&f, input));
}

#[test]
fn test_single_file_input_rejects_many_files() {
    let mut f = Fixture::new("https://a.test/");
    let input = add_file_input(&mut f, BOX);

    let session = f.enter(&file_drag(&["/tmp/a", "/tmp/b"], POINT));
    assert_eq!(session.number_of_items_to_be_accepted, 0);
    assert_eq!(session.operation, DragOperation::NONE);
    assert!(!can_receive_files(&f, input));
}

#[test]
fn test_multiple_file_input_accepts_every_file() {
    let mut f = Fixture::new("https://a.test/");
    let input = add_file_input(&mut f, BOX);
    let main = f.main;
    f.set_attr(main, input, "multiple", "");

    let session = f.enter(&file_drag(&["/tmp/a", "/tmp/b", "/tmp/c"], POINT));
    assert_eq!(session.number_of_items_to_be_accepted, 3);
    assert_eq!(session.operation, DragOperation::COPY);
    assert!(can_receive_files(&f, input));
}

#[test]
fn test_leaving_file_input_clears_its_flag() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let input = add_file_input(&mut f, BOX);
    let editable = f.add_element(main, "div", IntRect::new(200, 0, 100, 100));
    f.set_attr(main, editable, "contenteditable", "true");

    f.enter(&file_drag(&["/tmp/a"], POINT));
    assert!(can_receive_files(&f, input));

    let session = f.enter(&file_drag(&["/tmp/a"], IntPoint::new(250, 20)));
    assert!(!session.mouse_is_over_file_input);
    assert!(!can_receive_files(&f, input));
    assert!(f.page.drag_caret.has_caret());
}

// ============================================================================
// NAVIGATION DROPS
// ============================================================================

#[test]
fn test_url_drop_navigates_main_frame() {
    let mut f = Fixture::new("https://a.test/");
    let drag = url_drag("https://b.test/page", POINT);

    let session = f.enter(&drag);
    assert!(!f.controller.document_is_handling_drag());
    assert_eq!(session.operation, DragOperation::COPY);

    assert!(f.drop(&drag));
    let navigations = f.navigations.borrow();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].url.as_str(), "https://b.test/page");
    assert_eq!(navigations[0].frame, f.main);
    assert!(navigations[0].has_user_gesture);
    assert!(!f.page.processing_user_gesture());
}

#[test]
fn test_navigation_on_drop_disabled() {
    let settings = Settings { navigate_on_drag_drop: false, ..Settings::default() };
    let mut f = Fixture::build("https://a.test/", true, settings, 1.0);
    let drag = url_drag("https://b.test/page", POINT);

    assert_eq!(f.enter(&drag).operation, DragOperation::COPY);
    assert!(!f.drop(&drag));
    assert!(f.navigations.borrow().is_empty());
}

#[test]
fn test_chrome_refusing_load_drops() {
    let mut f = Fixture::build("https://a.test/", false, Settings::default(), 1.0);
    let drag = url_drag("https://b.test/page", POINT);

    let session = f.enter(&drag);
    assert!(!f.controller.drag_destination_action().contains(fos_dnd::DragDestinationAction::LOAD));
    assert_eq!(session.operation, DragOperation::NONE);
    assert!(!f.drop(&drag));
    assert!(f.navigations.borrow().is_empty());
}

#[test]
fn test_editable_document_is_not_navigated() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    f.doc_mut(main).design_mode = true;

    let mut data = DataObject::new();
    data.set_url_and_title("https://b.test/", "");
    let drag = drag_at(data, POINT, DragOperation::COPY, Modifiers::empty());
    let operation = f.controller.operation_for_load(&f.page, &drag, main);
    assert_eq!(operation, DragOperation::NONE);
}

#[test]
fn test_operation_for_load_sees_dom_changed_by_drag_over() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let embed = f.add_element(main, "iframe", IntRect::new(0, 0, 10, 10));
    let plugin_doc = f
        .page
        .documents
        .insert_child(
            NodeRef::new(main, embed),
            Document::new_plugin_document(Url::parse("https://a.test/doc.pdf").unwrap()),
        )
        .unwrap();
    let plugin_body = f.doc(plugin_doc).body();

    // A dragover listener moves a plugin document under the pointer
    let regions = f.regions.clone();
    f.script.borrow_mut().drag_over = Some(Box::new(move |_, _| {
        regions.borrow_mut().push(HitRegion {
            document: plugin_doc,
            node: plugin_body,
            rect: BOX,
            image_rect: IntRect::default(),
        });
        EventResult::NotHandled
    }));

    let session = f.enter(&url_drag("https://b.test/", POINT));
    assert_eq!(f.controller.document_under_mouse(&f.page), Some(main));
    assert_eq!(session.operation, DragOperation::NONE);
}

// ============================================================================
// SCRIPT DROPS
// ============================================================================

#[test]
fn test_script_drop_prevents_default() {
    let mut f = Fixture::new("https://a.test/");
    accept_drag_over(&f, None);
    f.script.borrow_mut().drop = Some(Box::new(|_, _| EventResult::HandledApplication));

    let drag = url_drag("https://b.test/", POINT);
    f.enter(&drag);
    assert!(f.drop(&drag));
    assert!(f.navigations.borrow().is_empty());
    assert!(f.controller.document_under_mouse(&f.page).is_none());
}

#[test]
fn test_plugin_takes_unhandled_drop() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let doc = f.doc_mut(main);
    let plugin = doc.tree.create_plugin("embed", true);
    let body = doc.body();
    doc.tree.append_child(body, plugin).unwrap();
    f.add_region(main, plugin, BOX);
    accept_drag_over(&f, None);

    let drag = url_drag("https://b.test/", POINT);
    f.enter(&drag);
    assert!(f.drop(&drag));
    assert!(f.navigations.borrow().is_empty());
}

// ============================================================================
// REENTRANCY
// ============================================================================

#[test]
fn test_nested_drag_exit_from_drag_over() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let drag = text_drag("x", POINT);
    let nested = drag.clone();
    f.script.borrow_mut().drag_over = Some(Box::new(move |scope, _| {
        // A modal dialog spins a nested loop that delivers dragExited
        scope.post_drag_exited(nested.clone(), main);
        EventResult::HandledDefaultPrevented
    }));

    let session = f.enter(&drag);
    assert_eq!(session, DragSession::default());
    assert!(!f.controller.document_is_handling_drag());
    assert!(f.controller.document_under_mouse(&f.page).is_none());
    assert!(!f.page.drag_caret.has_caret());
    assert_eq!(f.fired(), ["dragover", "dragleave"]);
}

#[test]
fn test_nested_drag_exit_from_drop() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let drag = url_drag("https://b.test/", POINT);
    accept_drag_over(&f, None);
    let nested = drag.clone();
    f.script.borrow_mut().drop = Some(Box::new(move |scope, _| {
        scope.post_drag_exited(nested.clone(), main);
        EventResult::NotHandled
    }));

    f.enter(&drag);
    assert!(!f.drop(&drag));
    assert!(f.navigations.borrow().is_empty());
}

#[test]
fn test_document_destroyed_during_drag_over() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let iframe = f.add_element(main, "iframe", BOX);
    let frame = f.add_frame(NodeRef::new(main, iframe), "https://a.test/frame", BOX);
    let frame_body = f.doc(frame).body();
    f.set_attr(frame, frame_body, "contenteditable", "true");

    f.script.borrow_mut().drag_over = Some(Box::new(move |scope, _| {
        scope.documents.remove(frame);
        EventResult::HandledDefaultPrevented
    }));

    let session = f.enter(&text_drag("x", POINT));
    assert!(!f.controller.document_is_handling_drag());
    assert_eq!(session.operation, DragOperation::NONE);
    assert!(f.controller.document_under_mouse(&f.page).is_none());
    assert!(!f.page.drag_caret.has_caret());
}

#[test]
fn test_moving_between_frames_cancels_caret() {
    let mut f = Fixture::new("https://a.test/");
    let main = f.main;
    let editable = f.add_element(main, "div", BOX);
    f.set_attr(main, editable, "contenteditable", "true");
    let iframe = f.add_element(main, "iframe", IntRect::new(200, 0, 100, 100));
    let frame = f.add_frame(NodeRef::new(main, iframe), "https://a.test/frame", IntRect::new(200, 0, 100, 100));

    f.enter(&text_drag("x", POINT));
    assert_eq!(f.page.drag_caret.document(), Some(main));

    f.enter(&text_drag("x", IntPoint::new(250, 50)));
    assert_eq!(f.controller.document_under_mouse(&f.page), Some(frame));
    assert!(!f.page.drag_caret.has_caret());
}
