//! fOS Drag and Drop
//!
//! Drag and drop controller for a page: routes native drag callbacks to
//! script, editable content or navigation, and starts drags that originate
//! in the page.
//!
//! The controller holds no references into the DOM. Documents and nodes are
//! addressed through generational handles and every collaborator is reached
//! through the [`Page`] passed into each call.

mod caret;
mod client;
mod controller;
mod data_object;
mod data_transfer;
mod document_drag;
mod drag_data;
mod drag_image;
mod edit_drop;
mod error;
mod mouse;
mod operation;
mod page;
mod session;
mod settings;
mod source;
mod state;

pub use caret::DragCaret;
pub use client::{
    ChromeClient, DeleteMode, DispatchEventResult, DragEventHandler, DragImageRenderer, DragSourceType, Editor,
    EventResult, FrameLoader, HitTestResult, HitTester, InsertMode, NavigationRequest, ScreenInfo,
};
pub use controller::{DragController, SessionToken};
pub use data_object::{
    DataObject, DataObjectItem, MIME_FILES, MIME_TEXT_HTML, MIME_TEXT_PLAIN, MIME_TEXT_URI_LIST, first_uri,
};
pub use data_transfer::{
    AccessPolicy, DataTransfer, DataTransferKind, DraggedImage, NumbOnDrop, ScriptDragImage, SharedDataTransfer,
    validate_filename,
};
pub use document_drag::default_operation_for_drag;
pub use drag_data::{DragData, FilenamePolicy, Modifiers};
pub use drag_image::{
    DragImage, FontMetrics, ImageFormat, LabelFont, LinkLabelLayout, clamped_image_scale, decode_image,
    drag_image_for_image, drag_image_for_link, drag_location_for_dhtml_drag, drag_location_for_selection_drag,
    layout_link_label,
};
pub use edit_drop::{DroppedFragment, document_fragment_from_drag_data};
pub use error::{DndError, Result};
pub use mouse::{MouseButton, MouseEventKind, PlatformMouseEvent};
pub use operation::{DragDestinationAction, DragOperation, DragSourceAction, DropEffect, EffectAllowed, UnknownEffect};
pub use page::{NestedCallback, Page, PageClients, ScriptScope, UserGestureIndicator, UserGestureState};
pub use session::DragSession;
pub use settings::Settings;
pub use source::SelectionDragPolicy;
pub use state::{DragSource, DragState};
