//! Native drag snapshot
//!
//! One `DragData` is built by the embedder for every native drag callback and
//! is never mutated afterwards.

use std::rc::Rc;

use bitflags::bitflags;
use fos_dom::IntPoint;
use url::Url;

use crate::data_object::{DataObject, MIME_TEXT_HTML, MIME_TEXT_PLAIN, MIME_TEXT_URI_LIST};
use crate::operation::DragOperation;

bitflags! {
    /// Keyboard modifiers held during the drag
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Key that turns a move into a copy (Option on macOS, Ctrl elsewhere)
    pub fn is_copy_key_down(self) -> bool {
        if cfg!(target_os = "macos") {
            self.contains(Modifiers::ALT)
        } else {
            self.contains(Modifiers::CTRL)
        }
    }
}

/// Whether dropped file paths count as URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenamePolicy {
    ConvertFilenames,
    DoNotConvertFilenames,
}

/// Immutable snapshot of one native drag callback
#[derive(Debug, Clone)]
pub struct DragData {
    client_position: IntPoint,
    global_position: IntPoint,
    modifiers: Modifiers,
    source_operation_mask: DragOperation,
    platform_data: Rc<DataObject>,
}

impl DragData {
    /// Create a snapshot over a platform payload
    pub fn new(
        platform_data: Rc<DataObject>,
        client_position: IntPoint,
        global_position: IntPoint,
        source_operation_mask: DragOperation,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            client_position,
            global_position,
            modifiers,
            source_operation_mask,
            platform_data,
        }
    }

    /// Position in the local root's frame coordinates
    pub fn client_position(&self) -> IntPoint {
        self.client_position
    }

    /// Position on screen
    pub fn global_position(&self) -> IntPoint {
        self.global_position
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Operations the drag source allows
    pub fn dragging_source_operation_mask(&self) -> DragOperation {
        self.source_operation_mask
    }

    pub fn platform_data(&self) -> &Rc<DataObject> {
        &self.platform_data
    }

    pub fn contains_url(&self, policy: FilenamePolicy) -> bool {
        self.platform_data.contains(MIME_TEXT_URI_LIST)
            || (policy == FilenamePolicy::ConvertFilenames && self.contains_files())
    }

    /// URL and title; a dropped file becomes a `file://` URL under `ConvertFilenames`
    pub fn as_url(&self, policy: FilenamePolicy) -> Option<(String, String)> {
        if self.platform_data.contains(MIME_TEXT_URI_LIST) {
            return self.platform_data.url_and_title();
        }
        if policy == FilenamePolicy::ConvertFilenames {
            let path = self.platform_data.file_paths().into_iter().next()?;
            let url = Url::from_file_path(&path).ok()?;
            return Some((url.to_string(), String::new()));
        }
        None
    }

    pub fn contains_plain_text(&self) -> bool {
        self.platform_data.contains(MIME_TEXT_PLAIN)
    }

    pub fn as_plain_text(&self) -> String {
        self.platform_data.get_data(MIME_TEXT_PLAIN).unwrap_or_default().to_string()
    }

    pub fn contains_html(&self) -> bool {
        self.platform_data.contains(MIME_TEXT_HTML)
    }

    pub fn html_and_base_url(&self) -> Option<(String, String)> {
        self.platform_data.html_and_base_url()
    }

    pub fn contains_files(&self) -> bool {
        self.platform_data.contains_files()
    }

    pub fn number_of_files(&self) -> usize {
        self.platform_data.file_paths().len()
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.platform_data.file_paths()
    }

    /// Anything an editable region or a navigation could consume
    pub fn contains_compatible_content(&self) -> bool {
        self.contains_plain_text()
            || self.contains_url(FilenamePolicy::ConvertFilenames)
            || self.contains_html()
            || self.contains_files()
    }

    /// Dragged text came from a selection rather than a link
    pub fn can_smart_replace(&self) -> bool {
        self.platform_data.can_smart_replace()
            || (self.contains_plain_text() && !self.platform_data.contains(MIME_TEXT_URI_LIST))
    }
}
