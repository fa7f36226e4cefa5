//! Outgoing drags
//!
//! Classifies what a drag gesture picked up, fills the transfer handed to
//! `dragstart`, synthesizes the drag image and hands the drag to the platform.

use fos_dom::{DocumentId, DomTree, IntPoint, NodeId, SelectionRange, UserDrag, outer_html, range_markup, range_text};
use url::Url;

use crate::client::{DispatchEventResult, HitTestResult};
use crate::controller::DragController;
use crate::data_transfer::{AccessPolicy, DataTransfer, DraggedImage, SharedDataTransfer};
use crate::drag_image::{
    DragImage, drag_image_for_image, drag_image_for_link, drag_location_for_dhtml_drag,
    drag_location_for_selection_drag,
};
use crate::mouse::PlatformMouseEvent;
use crate::operation::DragOperation;
use crate::page::Page;
use crate::state::{DragSource, DragState};

/// When a press over the selection becomes a selection drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionDragPolicy {
    /// Any press inside the selection drags it
    #[default]
    Immediate,
    /// Only when nothing else under the press is draggable
    Delayed,
}

/// Hit under the drag origin, with the URLs it resolves to
struct SourceHit {
    result: HitTestResult,
    link_url: Option<Url>,
    image_url: Option<Url>,
    /// Text of the link under the origin
    link_text: String,
    alt_text: String,
}

impl DragController {
    /// Node a press at `drag_origin` on `start_node` would drag, if any.
    ///
    /// Walks from `start_node` up its ancestors; the first draggable element
    /// wins. `drag_origin` is in the frame's contents coordinates.
    pub fn draggable_node(
        &self,
        page: &Page,
        frame: DocumentId,
        start_node: NodeId,
        drag_origin: IntPoint,
        policy: SelectionDragPolicy,
    ) -> Option<DragSource> {
        let doc = page.documents.get(frame)?;
        let tree = &doc.tree;
        if !tree.contains(start_node) {
            return None;
        }

        let over_selection = doc.selection.contains_point(drag_origin);
        if over_selection && policy == SelectionDragPolicy::Immediate {
            return Some(DragSource::Selection { node: start_node });
        }

        let mut candidate = None;
        for node in tree.ancestors(start_node) {
            if !over_selection && selects_text_instead_of_drag(doc, node) {
                return None;
            }
            let Some(element) = tree.element(node) else {
                continue;
            };
            match element.effective_user_drag() {
                UserDrag::None => continue,
                UserDrag::Element => {
                    candidate = Some(DragSource::Dhtml { element: node });
                    break;
                }
                UserDrag::Auto => {}
            }
            if element.is_image() && page.settings.loads_images_automatically {
                candidate = Some(DragSource::Image { element: node });
                break;
            }
            if element.is_live_link() {
                candidate = Some(DragSource::Link { anchor: node });
                break;
            }
        }

        // Delayed resolution with nothing else draggable leaves the press to
        // start a text selection
        let candidate = candidate?;
        if over_selection {
            let element_wins = matches!(candidate, DragSource::Dhtml { .. } | DragSource::Link { .. })
                && !tree.can_start_selection(start_node);
            if !element_wins {
                return Some(DragSource::Selection { node: start_node });
            }
        }
        Some(candidate)
    }

    /// Start an outgoing drag from a press on `start_node`.
    ///
    /// Fills the transfer, fires `dragstart` and, unless script cancels it,
    /// hands the drag to the platform. A drag abandoned after `dragstart`
    /// gets its `dragend`.
    pub fn begin_drag(
        &mut self,
        page: &mut Page,
        frame: DocumentId,
        start_node: NodeId,
        drag_origin: IntPoint,
        event: &PlatformMouseEvent,
        policy: SelectionDragPolicy,
    ) -> bool {
        let Some(source) = self.draggable_node(page, frame, start_node, drag_origin, policy) else {
            tracing::debug!("Nothing draggable at {:?}", drag_origin);
            return false;
        };
        tracing::debug!("Starting {:?} drag in {:?}", source, frame);

        let state = DragState { frame, source, transfer: DataTransfer::for_drag_source() };
        self.drag_state = Some(state.clone());

        if !self.populate_drag_data_transfer(page, &state, drag_origin) {
            self.abandon_drag_state(&state);
            return false;
        }

        let dispatch = page.with_script_scope(|events, scope| {
            events.dispatch_drag_start(scope, state.source_ref(), event, &state.transfer)
        });
        self.run_nested_callbacks(page);
        if dispatch != DispatchEventResult::NotCanceled {
            tracing::debug!("dragstart canceled by script");
            self.abandon_drag_state(&state);
            return false;
        }
        // Script may have ended the drag or removed its source while dragstart ran
        let still_current = self
            .drag_state
            .as_ref()
            .is_some_and(|current| std::rc::Rc::ptr_eq(&current.transfer, &state.transfer));
        if !still_current || !page.documents.node_exists(state.source_ref()) {
            tracing::debug!("Drag source went away during dragstart");
            self.abandon_drag_state(&state);
            return false;
        }

        if let Ok(mut transfer) = state.transfer.try_borrow_mut() {
            transfer.set_access_policy(AccessPolicy::ImageWritable);
        }
        if self.start_drag(page, &state, event, drag_origin) {
            return true;
        }

        // Canceled at the last minute, the source is owed a dragend
        tracing::debug!("Drag start aborted after dragstart");
        page.with_script_scope(|events, scope| {
            events.dispatch_drag_end(scope, state.source_ref(), event, &state.transfer);
        });
        self.run_nested_callbacks(page);
        self.abandon_drag_state(&state);
        false
    }

    /// Write the payload for `state` into its transfer.
    ///
    /// Returns `false` when the source is no longer under `drag_origin` or
    /// the hit carries no URL the drag kind needs.
    pub fn populate_drag_data_transfer(&self, page: &mut Page, state: &DragState, drag_origin: IntPoint) -> bool {
        let Some(hit) = self.source_hit(page, state, drag_origin) else {
            return false;
        };
        let frame = state.frame;
        let mut transfer = match state.transfer.try_borrow_mut() {
            Ok(transfer) => transfer,
            Err(_) => return false,
        };

        match state.source {
            DragSource::Selection { .. } => {
                let Some(doc) = page.documents.get(frame) else {
                    return false;
                };
                let Some(range) = doc.selection.range().and_then(|range| range.ordered(&doc.tree)) else {
                    return false;
                };
                let smart_replace = page.settings.smart_insert_delete_enabled
                    && doc.selection.granularity() == fos_dom::Granularity::Word;
                transfer.write_selection(
                    &range_markup(&doc.tree, range),
                    &range_text(&doc.tree, range),
                    doc.url().as_str(),
                    smart_replace,
                );
            }
            DragSource::Image { element } => {
                let Some(image_url) = &hit.image_url else {
                    return false;
                };
                let Some(doc) = page.documents.get_mut(frame) else {
                    return false;
                };
                if doc.editability(element) == fos_dom::Editability::Rich {
                    if let Some(range) = SelectionRange::select_node(&doc.tree, element) {
                        doc.selection.set_selection(range);
                    }
                }
                let Some(resource) = doc.tree.element(element).and_then(|e| e.image()) else {
                    return false;
                };
                let url = hit.link_url.as_ref().unwrap_or(image_url);
                let markup = outer_html(&doc.tree, element);
                transfer.declare_and_write_drag_image(&DraggedImage {
                    url: url.as_str(),
                    title: &hit.alt_text,
                    alt: &hit.alt_text,
                    resource,
                    markup: &markup,
                    base_url: doc.url().as_str(),
                });
            }
            DragSource::Link { anchor } => {
                let Some(link_url) = &hit.link_url else {
                    return false;
                };
                let Some(doc) = page.documents.get(frame) else {
                    return false;
                };
                // The title should read like the text shown on the page
                let title = simplify_white_space(&hit.link_text);
                transfer.write_url(link_url.as_str(), &title, &outer_html(&doc.tree, anchor));
            }
            // Script fills the payload itself during dragstart
            DragSource::Dhtml { .. } => {}
        }
        true
    }

    /// Pick the drag image and hand the drag to the platform
    pub fn start_drag(
        &mut self,
        page: &mut Page,
        state: &DragState,
        event: &PlatformMouseEvent,
        drag_origin: IntPoint,
    ) -> bool {
        let Some(hit) = self.source_hit(page, state, drag_origin) else {
            return false;
        };
        let frame = state.frame;
        let Some(view) = page.documents.get(frame).and_then(|doc| doc.view().copied()) else {
            return false;
        };
        let mouse_dragged_point = view.root_frame_to_contents(event.position);
        let device_scale_factor = page.clients.chrome.screen_info().device_scale_factor;

        let mut drag_location = IntPoint::zero();
        let script_image = state.transfer.try_borrow().ok().and_then(|transfer| transfer.create_drag_image());
        let mut drag_image = script_image.map(|script_image| {
            drag_location = drag_location_for_dhtml_drag(
                mouse_dragged_point,
                drag_origin,
                script_image.offset,
                hit.link_url.is_some(),
            );
            script_image.image
        });

        match state.source {
            DragSource::Selection { .. } => {
                if drag_image.is_none() {
                    let Some(doc) = page.documents.get(frame) else {
                        return false;
                    };
                    let bounds = doc.selection.bounds();
                    drag_image = page
                        .clients
                        .renderer
                        .paint_selection(doc, bounds)
                        .map(|bitmap| DragImage::with_opacity(bitmap, page.settings.drag_image_alpha));
                    drag_location = drag_location_for_selection_drag(bounds);
                }
                self.do_system_drag(page, frame, drag_image.as_ref(), drag_location, drag_origin, &state.transfer);
            }
            DragSource::Image { element } => {
                if hit.image_url.is_none() {
                    return false;
                }
                if drag_image.is_none() {
                    let Some(resource) = page
                        .documents
                        .get(frame)
                        .and_then(|doc| doc.tree.element(element))
                        .and_then(|e| e.image())
                    else {
                        return false;
                    };
                    let (image, location) = drag_image_for_image(
                        &page.settings,
                        resource,
                        device_scale_factor,
                        drag_origin,
                        hit.result.image_rect,
                    );
                    drag_image = image;
                    drag_location = location;
                }
                self.do_system_drag(page, frame, drag_image.as_ref(), drag_location, drag_origin, &state.transfer);
            }
            DragSource::Link { .. } => {
                let Some(link_url) = &hit.link_url else {
                    return false;
                };
                self.expand_caret_to_link(page, frame);
                if drag_image.is_none() {
                    drag_image = drag_image_for_link(
                        page.clients.renderer.as_ref(),
                        link_url.as_str(),
                        &hit.link_text,
                        device_scale_factor,
                    );
                    drag_location = drag_location_for_link(
                        drag_image.as_ref(),
                        mouse_dragged_point,
                        device_scale_factor,
                        page.settings.link_drag_border_inset,
                    );
                }
                self.do_system_drag(
                    page,
                    frame,
                    drag_image.as_ref(),
                    drag_location,
                    mouse_dragged_point,
                    &state.transfer,
                );
            }
            DragSource::Dhtml { .. } => {
                let Some(image) = drag_image else {
                    tracing::debug!("Draggable element has no drag image");
                    return false;
                };
                self.do_system_drag(page, frame, Some(&image), drag_location, drag_origin, &state.transfer);
            }
        }
        true
    }

    /// Record this page as the drag's initiator and call into the platform.
    ///
    /// `drag_location` and `event_position` are in `frame`'s contents
    /// coordinates; the platform gets the image offset from the pointer.
    pub fn do_system_drag(
        &mut self,
        page: &mut Page,
        frame: DocumentId,
        image: Option<&DragImage>,
        drag_location: IntPoint,
        event_position: IntPoint,
        transfer: &SharedDataTransfer,
    ) {
        self.did_initiate_drag = true;
        self.drag_initiator = Some(frame);

        let view = page.documents.get(frame).and_then(|doc| doc.view().copied()).unwrap_or_default();
        let adjusted_location = view.contents_to_root_frame(drag_location);
        let adjusted_event_position = view.contents_to_root_frame(event_position);
        let offset = adjusted_location - adjusted_event_position;
        let offset = IntPoint::new(offset.width, offset.height);

        let Ok(transfer) = transfer.try_borrow() else {
            return;
        };
        let operations = transfer.source_operation();
        tracing::debug!("Handing drag to the platform: operations {:?}, offset {:?}", operations, offset);
        page.clients
            .chrome
            .start_dragging(frame, transfer.data_object(), operations, image, offset);
    }

    /// The platform finished the drag at `event` with `operation`; fires
    /// `dragend` at the source
    pub fn drag_source_ended_at(&mut self, page: &mut Page, event: &PlatformMouseEvent, operation: DragOperation) {
        let Some(state) = self.drag_state.clone() else {
            return;
        };
        if page.documents.node_exists(state.source_ref()) {
            if let Ok(mut transfer) = state.transfer.try_borrow_mut() {
                transfer.set_destination_operation(operation);
            }
            page.with_script_scope(|events, scope| {
                events.dispatch_drag_end(scope, state.source_ref(), event, &state.transfer);
            });
        } else {
            tracing::debug!("Drag source removed before dragend");
        }
        self.abandon_drag_state(&state);
        self.run_nested_callbacks(page);
    }

    /// Hit test `drag_origin` and check the source is still what it hits
    fn source_hit(&self, page: &Page, state: &DragState, drag_origin: IntPoint) -> Option<SourceHit> {
        let doc = page.documents.get(state.frame)?;
        let view = doc.view()?;
        let local_root = page.documents.local_root(state.frame)?;
        let point = view.contents_to_root_frame(drag_origin);
        let result = page.clients.hit_tester.hit_test(&page.documents, local_root, point);
        tracing::trace!("Drag source hit test at {:?}: {:?}", point, result);

        let inner = result.inner_node?;
        if result.document != state.frame || !doc.tree.is_inclusive_ancestor_of(state.source.node(), inner) {
            tracing::debug!("Drag source {:?} is no longer under the drag origin", state.source);
            return None;
        }

        let tree = &doc.tree;
        let anchor = tree
            .enclosing_anchor(inner)
            .filter(|anchor| tree.element(*anchor).is_some_and(|e| e.is_live_link()));
        let link_url = anchor.and_then(|anchor| resolve_attr(doc.url(), tree, anchor, "href"));
        let link_text = anchor.map(|anchor| tree.text_content(anchor)).unwrap_or_default();

        let image = tree
            .enclosing_element(inner)
            .filter(|element| tree.element(*element).is_some_and(|e| e.is_image()));
        let image_url = image.and_then(|image| resolve_attr(doc.url(), tree, image, "src"));
        let alt_text = image
            .and_then(|image| tree.element(image)?.get_attr("alt").map(str::to_string))
            .unwrap_or_default();

        Some(SourceHit { result, link_url, image_url, link_text, alt_text })
    }

    /// A link dragged from a caret in editable content takes the whole link
    /// text as the selection
    fn expand_caret_to_link(&self, page: &mut Page, frame: DocumentId) {
        let Some(doc) = page.documents.get_mut(frame) else {
            return;
        };
        let Some(base) = doc.selection.base() else {
            return;
        };
        if !doc.selection.is_caret() || !doc.has_editable_style(base.node) {
            return;
        }
        if let Some(anchor) = doc.tree.enclosing_anchor(base.node) {
            let range = SelectionRange::select_contents(&doc.tree, anchor);
            doc.selection.set_selection(range);
        }
    }

    fn abandon_drag_state(&mut self, state: &DragState) {
        if let Ok(mut transfer) = state.transfer.try_borrow_mut() {
            transfer.set_access_policy(AccessPolicy::Numb);
        }
        let is_current = self
            .drag_state
            .as_ref()
            .is_some_and(|current| std::rc::Rc::ptr_eq(&current.transfer, &state.transfer));
        if is_current {
            self.drag_state = None;
        }
    }
}

/// A text press that should start a selection rather than a drag
fn selects_text_instead_of_drag(doc: &fos_dom::Document, node: NodeId) -> bool {
    let tree = &doc.tree;
    if !tree.get(node).is_some_and(|n| n.is_text()) {
        return false;
    }
    // Editable content is never dragged as an element
    if doc.has_editable_style(node) {
        return true;
    }
    if tree.ancestors(node).any(|ancestor| is_draggable_element(tree, ancestor)) {
        return false;
    }
    tree.can_start_selection(node)
}

fn is_draggable_element(tree: &DomTree, node: NodeId) -> bool {
    let Some(element) = tree.element(node) else {
        return false;
    };
    match element.effective_user_drag() {
        UserDrag::Element => true,
        UserDrag::None => false,
        UserDrag::Auto => element.is_image() || element.is_live_link(),
    }
}

fn resolve_attr(base: &Url, tree: &DomTree, node: NodeId, attr: &str) -> Option<Url> {
    let value = tree.element(node)?.get_attr(attr)?.trim();
    if value.is_empty() {
        return None;
    }
    match base.join(value) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::debug!("Cannot resolve {}={:?}: {}", attr, value, err);
            None
        }
    }
}

/// Runs of whitespace collapsed to one space, trimmed
fn simplify_white_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Link labels hang centered just above the pointer
fn drag_location_for_link(
    image: Option<&DragImage>,
    origin: IntPoint,
    device_scale_factor: f32,
    border_inset: i32,
) -> IntPoint {
    let Some(image) = image else {
        return origin;
    };
    let scale = 1.0 / device_scale_factor;
    let dx = -(image.size().width as f32) / 2.0 * scale;
    let dy = -(border_inset as f32) * scale;
    IntPoint::new(
        (origin.x as f32 + dx).round() as i32,
        (origin.y as f32 + dy).round() as i32,
    )
}
