//! Shared fakes for the drag and drop integration tests
//!
//! Every collaborator records what the controller asked of it into a shared
//! handle the test keeps, so assertions can run after the page owns the fake.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fos_dnd::{
    ChromeClient, DataObject, DeleteMode, DispatchEventResult, DragController, DragData, DragEventHandler, DragImage,
    DragImageRenderer, DragOperation, DragSourceType, Editor, EventResult, FontMetrics, FrameLoader, HitTestResult,
    HitTester, InsertMode, LabelFont, LinkLabelLayout, MIME_TEXT_PLAIN, Modifiers, NavigationRequest, Page,
    PageClients, PlatformMouseEvent, ScreenInfo, ScriptScope, Settings, SharedDataTransfer,
};
use fos_dom::{
    Document, DocumentFragment, DocumentId, Documents, FragmentNode, IntPoint, IntRect, IntSize, NodeId, NodeRef,
    Position,
};
use image::RgbaImage;
use url::Url;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Hit testing
// ============================================================================

/// Box of a node in root frame coordinates
#[derive(Debug, Clone, Copy)]
pub struct HitRegion {
    pub document: DocumentId,
    pub node: NodeId,
    pub rect: IntRect,
    /// Image box reported for hits, in document coordinates
    pub image_rect: IntRect,
}

pub type Regions = Rc<RefCell<Vec<HitRegion>>>;

/// Topmost (last registered) live region containing the point wins;
/// misses land on the local root's `<body>`
pub struct RectHitTester {
    regions: Regions,
    pub calls: Rc<RefCell<usize>>,
}

impl HitTester for RectHitTester {
    fn hit_test(&self, documents: &Documents, local_root: DocumentId, point: IntPoint) -> HitTestResult {
        *self.calls.borrow_mut() += 1;
        let regions = self.regions.borrow();
        let hit = regions
            .iter()
            .rev()
            .filter(|region| documents.node_exists(NodeRef::new(region.document, region.node)))
            .find(|region| region.rect.contains(point));
        match hit {
            Some(region) => {
                let local_point = documents
                    .get(region.document)
                    .and_then(|doc| doc.view())
                    .map(|view| view.root_frame_to_contents(point))
                    .unwrap_or(point);
                HitTestResult {
                    document: region.document,
                    inner_node: Some(region.node),
                    local_point,
                    image_rect: region.image_rect,
                }
            }
            None => HitTestResult {
                document: local_root,
                inner_node: documents.get(local_root).map(|doc| doc.body()),
                local_point: point,
                image_rect: IntRect::default(),
            },
        }
    }
}

// ============================================================================
// Script
// ============================================================================

pub type DragHandler = Box<dyn FnMut(&mut ScriptScope<'_>, &SharedDataTransfer) -> EventResult>;
pub type TextInputHandler = Box<dyn FnMut(&mut ScriptScope<'_>, NodeRef, &str) -> DispatchEventResult>;
pub type SourceHandler = Box<dyn FnMut(&mut ScriptScope<'_>, &SharedDataTransfer) -> DispatchEventResult>;

/// Listeners installed by a test, plus the events that fired
#[derive(Default)]
pub struct Script {
    pub fired: Vec<String>,
    pub drag_over: Option<DragHandler>,
    pub drag_leave: Option<DragHandler>,
    pub drop: Option<DragHandler>,
    pub text_input: Option<TextInputHandler>,
    pub drag_start: Option<SourceHandler>,
    pub drag_end: Option<SourceHandler>,
    /// Transfers handed to listeners, kept like a script-retained reference
    pub retained: Vec<SharedDataTransfer>,
}

pub struct ScriptedEvents(Rc<RefCell<Script>>);

impl ScriptedEvents {
    fn drag_event(
        &mut self,
        name: &str,
        scope: &mut ScriptScope<'_>,
        transfer: &SharedDataTransfer,
        pick: fn(&mut Script) -> Option<&mut DragHandler>,
    ) -> EventResult {
        let mut script = self.0.borrow_mut();
        script.fired.push(name.to_string());
        script.retained.push(transfer.clone());
        match pick(&mut *script) {
            Some(handler) => handler(scope, transfer),
            None => EventResult::NotHandled,
        }
    }
}

impl DragEventHandler for ScriptedEvents {
    fn update_drag_and_drop(
        &mut self,
        scope: &mut ScriptScope<'_>,
        _local_root: DocumentId,
        _event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) -> EventResult {
        self.drag_event("dragover", scope, transfer, |s| s.drag_over.as_mut())
    }

    fn cancel_drag_and_drop(
        &mut self,
        scope: &mut ScriptScope<'_>,
        _local_root: DocumentId,
        _event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) {
        self.drag_event("dragleave", scope, transfer, |s| s.drag_leave.as_mut());
    }

    fn perform_drag_and_drop(
        &mut self,
        scope: &mut ScriptScope<'_>,
        _local_root: DocumentId,
        _event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) -> EventResult {
        self.drag_event("drop", scope, transfer, |s| s.drop.as_mut())
    }

    fn dispatch_text_input(&mut self, scope: &mut ScriptScope<'_>, target: NodeRef, text: &str) -> DispatchEventResult {
        let mut script = self.0.borrow_mut();
        script.fired.push(format!("textInput:{}", text));
        match script.text_input.as_mut() {
            Some(handler) => handler(scope, target, text),
            None => DispatchEventResult::NotCanceled,
        }
    }

    fn dispatch_drag_start(
        &mut self,
        scope: &mut ScriptScope<'_>,
        _source: NodeRef,
        _event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) -> DispatchEventResult {
        let mut script = self.0.borrow_mut();
        script.fired.push("dragstart".to_string());
        script.retained.push(transfer.clone());
        match script.drag_start.as_mut() {
            Some(handler) => handler(scope, transfer),
            None => DispatchEventResult::NotCanceled,
        }
    }

    fn dispatch_drag_end(
        &mut self,
        scope: &mut ScriptScope<'_>,
        _source: NodeRef,
        _event: &PlatformMouseEvent,
        transfer: &SharedDataTransfer,
    ) {
        let mut script = self.0.borrow_mut();
        script.fired.push("dragend".to_string());
        if let Some(handler) = script.drag_end.as_mut() {
            handler(scope, transfer);
        }
    }
}

// ============================================================================
// Editing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub document: DocumentId,
    /// Text of the inserted fragment; markup is carried through as text
    pub text: String,
    pub insert: InsertMode,
    pub source: DragSourceType,
    /// Selection caret at the time of insertion
    pub at: Option<Position>,
}

#[derive(Debug, Default)]
pub struct EditLog {
    pub deletions: Vec<DeleteMode>,
    pub replacements: Vec<Replacement>,
}

pub struct RecordingEditor(Rc<RefCell<EditLog>>);

impl Editor for RecordingEditor {
    fn position_for_point(&self, documents: &Documents, result: &HitTestResult) -> Option<Position> {
        let node = result.inner_node?;
        let doc = documents.get(result.document)?;
        // Nearest offset: the end of the first text child, else the node itself
        let text = doc
            .tree
            .children(node)
            .iter()
            .copied()
            .find(|child| doc.tree.get(*child).is_some_and(|n| n.is_text()));
        Some(match text {
            Some(text) => Position::new(text, doc.tree.offset_count(text)),
            None => Position::new(node, 0),
        })
    }

    fn fragment_from_markup(
        &self,
        _documents: &Documents,
        _document: DocumentId,
        markup: &str,
        _base_url: &str,
    ) -> Option<DocumentFragment> {
        let mut fragment = DocumentFragment::new();
        fragment.push(FragmentNode::text(markup));
        Some(fragment)
    }

    fn delete_selection_after_dragging(
        &mut self,
        documents: &mut Documents,
        document: DocumentId,
        mode: DeleteMode,
        drop_position: Position,
    ) -> Option<Position> {
        self.0.borrow_mut().deletions.push(mode);
        if let Some(doc) = documents.get_mut(document) {
            doc.selection.clear();
        }
        Some(drop_position)
    }

    fn replace_selection_after_dragging(
        &mut self,
        documents: &mut Documents,
        document: DocumentId,
        fragment: &DocumentFragment,
        insert: InsertMode,
        source: DragSourceType,
    ) -> bool {
        let at = documents.get(document).and_then(|doc| doc.selection.base());
        self.0.borrow_mut().replacements.push(Replacement {
            document,
            text: fragment.text_content(),
            insert,
            source,
            at,
        });
        true
    }
}

// ============================================================================
// Chrome, loader and painting
// ============================================================================

#[derive(Debug, Clone)]
pub struct StartedDrag {
    pub frame: DocumentId,
    pub data: DataObject,
    pub operations: DragOperation,
    pub image_size: Option<IntSize>,
    pub offset: IntPoint,
}

pub struct RecordingChrome {
    accepts_load_drops: bool,
    device_scale_factor: f32,
    drags: Rc<RefCell<Vec<StartedDrag>>>,
}

impl ChromeClient for RecordingChrome {
    fn accepts_load_drops(&self) -> bool {
        self.accepts_load_drops
    }

    fn start_dragging(
        &mut self,
        frame: DocumentId,
        data: &DataObject,
        operations: DragOperation,
        image: Option<&DragImage>,
        offset: IntPoint,
    ) {
        self.drags.borrow_mut().push(StartedDrag {
            frame,
            data: data.clone(),
            operations,
            image_size: image.map(DragImage::size),
            offset,
        });
    }

    fn screen_info(&self) -> ScreenInfo {
        ScreenInfo { device_scale_factor: self.device_scale_factor }
    }
}

pub struct RecordingLoader(Rc<RefCell<Vec<NavigationRequest>>>);

impl FrameLoader for RecordingLoader {
    fn load(&mut self, request: NavigationRequest) {
        self.0.borrow_mut().push(request);
    }
}

/// Paints solid bitmaps; text is half an em wide per character
pub struct SolidPainter;

impl DragImageRenderer for SolidPainter {
    fn paint_selection(&self, _document: &Document, bounds: IntRect) -> Option<RgbaImage> {
        if bounds.is_empty() {
            return None;
        }
        Some(RgbaImage::from_pixel(
            bounds.size.width as u32,
            bounds.size.height as u32,
            image::Rgba([0, 0, 255, 255]),
        ))
    }

    fn measure_text(&self, text: &str, font: LabelFont) -> f32 {
        text.chars().count() as f32 * font.size / 2.0
    }

    fn font_metrics(&self, font: LabelFont) -> FontMetrics {
        FontMetrics { ascent: font.size * 0.8, descent: font.size * 0.2 }
    }

    fn paint_link_label(&self, layout: &LinkLabelLayout) -> Option<RgbaImage> {
        Some(RgbaImage::new(layout.scaled_size.width as u32, layout.scaled_size.height as u32))
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub page: Page,
    pub controller: DragController,
    pub main: DocumentId,
    pub regions: Regions,
    pub hit_tests: Rc<RefCell<usize>>,
    pub script: Rc<RefCell<Script>>,
    pub edits: Rc<RefCell<EditLog>>,
    pub drags: Rc<RefCell<Vec<StartedDrag>>>,
    pub navigations: Rc<RefCell<Vec<NavigationRequest>>>,
}

impl Fixture {
    /// Page with one main document at `url` whose chrome accepts load drops
    pub fn new(url: &str) -> Self {
        Self::build(url, true, Settings::default(), 1.0)
    }

    pub fn build(url: &str, accepts_load_drops: bool, settings: Settings, device_scale_factor: f32) -> Self {
        init_tracing();
        let mut documents = Documents::new();
        let main = documents.insert(Document::new(Url::parse(url).unwrap()));

        let regions = Regions::default();
        let hit_tests = Rc::new(RefCell::new(0));
        let script = Rc::new(RefCell::new(Script::default()));
        let edits = Rc::new(RefCell::new(EditLog::default()));
        let drags = Rc::new(RefCell::new(Vec::new()));
        let navigations = Rc::new(RefCell::new(Vec::new()));

        let clients = PageClients {
            chrome: Box::new(RecordingChrome {
                accepts_load_drops,
                device_scale_factor,
                drags: drags.clone(),
            }),
            loader: Box::new(RecordingLoader(navigations.clone())),
            hit_tester: Box::new(RectHitTester { regions: regions.clone(), calls: hit_tests.clone() }),
            events: Box::new(ScriptedEvents(script.clone())),
            editor: Box::new(RecordingEditor(edits.clone())),
            renderer: Box::new(SolidPainter),
        };
        let page = Page::new(documents, main, settings, clients);

        Self {
            page,
            controller: DragController::new(),
            main,
            regions,
            hit_tests,
            script,
            edits,
            drags,
            navigations,
        }
    }

    pub fn doc(&self, id: DocumentId) -> &Document {
        self.page.documents.get(id).unwrap()
    }

    pub fn doc_mut(&mut self, id: DocumentId) -> &mut Document {
        self.page.documents.get_mut(id).unwrap()
    }

    /// Append `tag` under `document`'s body, hit at `rect` (root frame coordinates)
    pub fn add_element(&mut self, document: DocumentId, tag: &str, rect: IntRect) -> NodeId {
        let node = self.doc_mut(document).append_to_body(tag).unwrap();
        self.add_region(document, node, rect);
        node
    }

    /// Text child under `parent`, hit at `rect`
    pub fn add_text(&mut self, document: DocumentId, parent: NodeId, text: &str, rect: IntRect) -> NodeId {
        let doc = self.doc_mut(document);
        let node = doc.tree.create_text(text);
        doc.tree.append_child(parent, node).unwrap();
        self.add_region(document, node, rect);
        node
    }

    pub fn add_region(&self, document: DocumentId, node: NodeId, rect: IntRect) {
        self.regions.borrow_mut().push(HitRegion { document, node, rect, image_rect: IntRect::default() });
    }

    /// Subframe document owned by `owner`, shown at `rect` of the root frame
    pub fn add_frame(&mut self, owner: NodeRef, url: &str, rect: IntRect) -> DocumentId {
        let mut doc = Document::new(Url::parse(url).unwrap());
        doc.set_view(Some(fos_dom::FrameView::new(IntSize::new(rect.x(), rect.y()), IntSize::default())));
        let id = self.page.documents.insert_child(owner, doc).unwrap();
        let body = self.doc(id).body();
        self.add_region(id, body, rect);
        id
    }

    pub fn set_attr(&mut self, document: DocumentId, node: NodeId, name: &str, value: &str) {
        self.doc_mut(document).tree.element_mut(node).unwrap().set_attr(name, value);
    }

    pub fn fired(&self) -> Vec<String> {
        self.script.borrow().fired.clone()
    }

    pub fn enter(&mut self, drag: &DragData) -> fos_dnd::DragSession {
        let main = self.main;
        self.controller.drag_entered_or_updated(&mut self.page, drag, main)
    }

    pub fn drop(&mut self, drag: &DragData) -> bool {
        let main = self.main;
        self.controller.perform_drag(&mut self.page, drag, main)
    }

    pub fn exit(&mut self, drag: &DragData) {
        let main = self.main;
        self.controller.drag_exited(&mut self.page, drag, main);
    }
}

// ============================================================================
// Drag payloads
// ============================================================================

pub fn drag_at(data: DataObject, point: IntPoint, mask: DragOperation, modifiers: Modifiers) -> DragData {
    DragData::new(Rc::new(data), point, point, mask, modifiers)
}

pub fn text_drag(text: &str, point: IntPoint) -> DragData {
    let mut data = DataObject::new();
    data.set_data(MIME_TEXT_PLAIN, text);
    drag_at(data, point, DragOperation::EVERY, Modifiers::empty())
}

pub fn url_drag(url: &str, point: IntPoint) -> DragData {
    let mut data = DataObject::new();
    data.set_url_and_title(url, "");
    drag_at(data, point, DragOperation::COPY | DragOperation::LINK, Modifiers::empty())
}

pub fn file_drag(paths: &[&str], point: IntPoint) -> DragData {
    let mut data = DataObject::new();
    for path in paths {
        data.add_file(path);
    }
    drag_at(data, point, DragOperation::COPY, Modifiers::empty())
}

pub fn mouse_at(point: IntPoint) -> PlatformMouseEvent {
    PlatformMouseEvent::new(point, point, fos_dnd::MouseEventKind::Moved, Modifiers::empty())
}
