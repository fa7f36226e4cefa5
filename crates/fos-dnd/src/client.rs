//! Collaborators the drag controller is driven against
//!
//! The embedder supplies these behind trait objects owned by the
//! [`Page`](crate::Page). None of them are `Send`; drag and drop runs on the
//! page's main thread.

use fos_dom::{
    Document, DocumentFragment, DocumentId, Documents, IntPoint, IntRect, NodeId, NodeRef, Position,
};
use image::RgbaImage;
use url::Url;

use crate::data_object::DataObject;
use crate::data_transfer::SharedDataTransfer;
use crate::drag_image::{DragImage, FontMetrics, LabelFont, LinkLabelLayout};
use crate::mouse::PlatformMouseEvent;
use crate::operation::DragOperation;
use crate::page::ScriptScope;

/// Screen the page is shown on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenInfo {
    pub device_scale_factor: f32,
}

impl Default for ScreenInfo {
    fn default() -> Self {
        Self { device_scale_factor: 1.0 }
    }
}

/// Embedder hooks
pub trait ChromeClient {
    /// Whether dropping on a page may navigate it
    fn accepts_load_drops(&self) -> bool;

    /// Hand an outgoing drag to the platform
    fn start_dragging(
        &mut self,
        frame: DocumentId,
        data: &DataObject,
        operations: DragOperation,
        image: Option<&DragImage>,
        offset: IntPoint,
    );

    fn screen_info(&self) -> ScreenInfo;
}

/// Top-level navigation issued by a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: Url,
    pub frame: DocumentId,
    pub has_user_gesture: bool,
}

/// Navigation sink
pub trait FrameLoader {
    fn load(&mut self, request: NavigationRequest);
}

/// Result of hit testing a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestResult {
    /// Innermost document containing the point
    pub document: DocumentId,
    /// Topmost node at the point
    pub inner_node: Option<NodeId>,
    /// Point in `document`'s contents coordinates
    pub local_point: IntPoint,
    /// Box of the image at the point, empty when there is none
    pub image_rect: IntRect,
}

impl HitTestResult {
    pub fn inner_node_ref(&self) -> Option<NodeRef> {
        self.inner_node.map(|node| NodeRef::new(self.document, node))
    }
}

/// Layout-backed hit testing
pub trait HitTester {
    /// Hit test `point`, given in `local_root`'s root frame coordinates
    fn hit_test(&self, documents: &Documents, local_root: DocumentId, point: IntPoint) -> HitTestResult;
}

/// Outcome of dispatching a drag event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    NotHandled,
    HandledApplication,
    HandledDefaultPrevented,
}

impl EventResult {
    pub fn is_handled(self) -> bool {
        self != EventResult::NotHandled
    }
}

/// Outcome of dispatching a cancelable DOM event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEventResult {
    NotCanceled,
    CanceledByEventHandler,
}

/// Script event dispatch.
///
/// Handlers run script and may mutate the DOM through the [`ScriptScope`]
/// or post nested embedder callbacks.
pub trait DragEventHandler {
    /// dragenter / dragover
    fn update_drag_and_drop(
        &mut self,
        scope: &mut ScriptScope<'_>,
        local_root: DocumentId,
        event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) -> EventResult;

    /// dragleave
    fn cancel_drag_and_drop(
        &mut self,
        scope: &mut ScriptScope<'_>,
        local_root: DocumentId,
        event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    );

    /// drop
    fn perform_drag_and_drop(
        &mut self,
        scope: &mut ScriptScope<'_>,
        local_root: DocumentId,
        event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) -> EventResult;

    /// textInput fired before an edit drop inserts content
    fn dispatch_text_input(&mut self, scope: &mut ScriptScope<'_>, target: NodeRef, text: &str) -> DispatchEventResult;

    /// dragstart at the drag source
    fn dispatch_drag_start(
        &mut self,
        scope: &mut ScriptScope<'_>,
        source: NodeRef,
        event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) -> DispatchEventResult;

    /// dragend at the drag source
    fn dispatch_drag_end(
        &mut self,
        scope: &mut ScriptScope<'_>,
        source: NodeRef,
        event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Simple,
    Smart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Simple,
    Smart,
}

/// Whether inserted drag content came from markup or plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSourceType {
    Html,
    PlainText,
}

/// Editing commands used by edit drops
pub trait Editor {
    /// Closest caret position for a hit
    fn position_for_point(&self, documents: &Documents, result: &HitTestResult) -> Option<Position>;

    /// Parse dropped markup in the context of `document`
    fn fragment_from_markup(
        &self,
        documents: &Documents,
        document: DocumentId,
        markup: &str,
        base_url: &str,
    ) -> Option<DocumentFragment>;

    /// Delete the current selection of `document` for a move.
    /// Returns where `drop_position` ended up after the deletion.
    fn delete_selection_after_dragging(
        &mut self,
        documents: &mut Documents,
        document: DocumentId,
        mode: DeleteMode,
        drop_position: Position,
    ) -> Option<Position>;

    /// Replace the current selection of `document` with `fragment`
    fn replace_selection_after_dragging(
        &mut self,
        documents: &mut Documents,
        document: DocumentId,
        fragment: &DocumentFragment,
        insert: InsertMode,
        source: DragSourceType,
    ) -> bool;
}

/// Painting for drag images
pub trait DragImageRenderer {
    /// Snapshot of the selection inside `bounds`, in device pixels
    fn paint_selection(&self, document: &Document, bounds: IntRect) -> Option<RgbaImage>;

    /// Advance width of `text` in CSS pixels
    fn measure_text(&self, text: &str, font: LabelFont) -> f32;

    fn font_metrics(&self, font: LabelFont) -> FontMetrics;

    /// Paint a laid out link label
    fn paint_link_label(&self, layout: &LinkLabelLayout) -> Option<RgbaImage>;
}
