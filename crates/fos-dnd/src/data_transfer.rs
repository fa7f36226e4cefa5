//! Script-visible drag data
//!
//! `DataTransfer` wraps a [`DataObject`] behind an access policy. The policy
//! only ever moves down the ladder `Writable > ImageWritable > Readable >
//! TypesReadable > Numb`; every dispatch ends with the transfer numbed so a
//! handle retained by script reads nothing once its event is over.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::{ImageResource, IntPoint};
use url::Url;

use crate::data_object::{DataObject, MIME_TEXT_PLAIN, MIME_TEXT_URI_LIST, first_uri};
use crate::drag_data::DragData;
use crate::drag_image::{DragImage, ImageFormat};
use crate::operation::{DragOperation, DropEffect, EffectAllowed};

/// Longest filename written for a dragged image
const MAX_FILENAME_LENGTH: usize = 255;

/// What script may do with a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessPolicy {
    /// Nothing readable or writable
    Numb,
    /// Type list only (cross-origin drags before drop)
    TypesReadable,
    /// Types and payload
    Readable,
    /// Source side after dragstart: only the drag image may change
    ImageWritable,
    /// Source side during dragstart
    Writable,
}

/// What the transfer is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTransferKind {
    CopyAndPaste,
    DragAndDrop,
}

/// Drag image set by script with `setDragImage`
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDragImage {
    pub image: DragImage,
    /// Cursor position inside the image
    pub offset: IntPoint,
}

/// `DataTransfer` shared with script for the duration of a gesture
pub type SharedDataTransfer = Rc<RefCell<DataTransfer>>;

/// Script-visible drag payload
#[derive(Debug)]
pub struct DataTransfer {
    kind: DataTransferKind,
    policy: AccessPolicy,
    data_object: DataObject,
    effect_allowed: EffectAllowed,
    drop_effect: DropEffect,
    drag_image: Option<ScriptDragImage>,
}

impl DataTransfer {
    pub fn new(kind: DataTransferKind, policy: AccessPolicy, data_object: DataObject) -> Self {
        Self {
            kind,
            policy,
            data_object,
            effect_allowed: EffectAllowed::Uninitialized,
            drop_effect: DropEffect::Uninitialized,
            drag_image: None,
        }
    }

    /// Inbound transfer over a copy of the native payload
    pub fn for_drag_data(drag_data: &DragData, policy: AccessPolicy) -> SharedDataTransfer {
        let data_object = DataObject::clone(drag_data.platform_data());
        Rc::new(RefCell::new(Self::new(DataTransferKind::DragAndDrop, policy, data_object)))
    }

    /// Empty writable transfer for an outgoing drag
    pub fn for_drag_source() -> SharedDataTransfer {
        Rc::new(RefCell::new(Self::new(
            DataTransferKind::DragAndDrop,
            AccessPolicy::Writable,
            DataObject::new(),
        )))
    }

    pub fn kind(&self) -> DataTransferKind {
        self.kind
    }

    pub fn is_for_drag_and_drop(&self) -> bool {
        self.kind == DataTransferKind::DragAndDrop
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Downgrade the access policy
    pub fn set_access_policy(&mut self, policy: AccessPolicy) {
        debug_assert!(
            policy <= self.policy,
            "access policy may only be downgraded ({:?} -> {:?})",
            self.policy,
            policy
        );
        self.policy = policy.min(self.policy);
    }

    pub fn can_read_types(&self) -> bool {
        matches!(
            self.policy,
            AccessPolicy::Readable | AccessPolicy::TypesReadable | AccessPolicy::Writable
        )
    }

    pub fn can_read_data(&self) -> bool {
        matches!(self.policy, AccessPolicy::Readable | AccessPolicy::Writable)
    }

    pub fn can_write_data(&self) -> bool {
        self.policy == AccessPolicy::Writable
    }

    pub fn can_set_drag_image(&self) -> bool {
        matches!(self.policy, AccessPolicy::ImageWritable | AccessPolicy::Writable)
    }

    /// Payload, bypassing the access policy
    pub fn data_object(&self) -> &DataObject {
        &self.data_object
    }

    pub fn data_object_mut(&mut self) -> &mut DataObject {
        &mut self.data_object
    }

    // ========================================================================
    // Script API
    // ========================================================================

    /// `types`
    pub fn types(&self) -> Vec<String> {
        if !self.can_read_types() {
            return Vec::new();
        }
        self.data_object.types()
    }

    /// `getData(type)`; empty when the policy forbids reading
    pub fn get_data(&self, ty: &str) -> String {
        if !self.can_read_data() {
            return String::new();
        }
        let (ty, convert_to_url) = normalize_type(ty);
        let data = self.data_object.get_data(&ty).unwrap_or_default();
        if convert_to_url {
            return first_uri(data).unwrap_or_default();
        }
        data.to_string()
    }

    /// `setData(type, data)`
    pub fn set_data(&mut self, ty: &str, data: &str) {
        if !self.can_write_data() {
            return;
        }
        let (ty, _) = normalize_type(ty);
        self.data_object.set_data(&ty, data);
    }

    /// `clearData(type?)`; without a type everything but files is removed
    pub fn clear_data(&mut self, ty: Option<&str>) {
        if !self.can_write_data() {
            return;
        }
        match ty {
            Some(ty) => {
                let (ty, _) = normalize_type(ty);
                self.data_object.clear_data(&ty);
            }
            None => self.data_object.clear_all_except_files(),
        }
    }

    /// `files`
    pub fn files(&self) -> Vec<String> {
        if !self.can_read_data() {
            return Vec::new();
        }
        self.data_object.file_paths()
    }

    pub fn drop_effect(&self) -> DropEffect {
        self.drop_effect
    }

    /// `dropEffect = value`; unknown keywords are ignored
    pub fn set_drop_effect(&mut self, effect: &str) {
        if !self.can_read_types() {
            return;
        }
        if let Ok(effect) = effect.parse() {
            self.drop_effect = effect;
        }
    }

    pub fn drop_effect_is_uninitialized(&self) -> bool {
        self.drop_effect == DropEffect::Uninitialized
    }

    pub fn effect_allowed(&self) -> EffectAllowed {
        self.effect_allowed
    }

    /// `effectAllowed = value`; unknown keywords are ignored
    pub fn set_effect_allowed(&mut self, effect: &str) {
        if !self.can_write_data() {
            return;
        }
        if let Ok(effect) = effect.parse() {
            self.effect_allowed = effect;
        }
    }

    /// `setDragImage(image, x, y)`
    pub fn set_drag_image(&mut self, image: DragImage, offset: IntPoint) {
        if !self.is_for_drag_and_drop() || !self.can_set_drag_image() {
            return;
        }
        self.drag_image = Some(ScriptDragImage { image, offset });
    }

    /// Image script chose for the drag, if any
    pub fn create_drag_image(&self) -> Option<ScriptDragImage> {
        self.drag_image.clone()
    }

    // ========================================================================
    // Operation negotiation
    // ========================================================================

    /// Operations the source allows
    pub fn source_operation(&self) -> DragOperation {
        self.effect_allowed.to_drag_operation()
    }

    pub fn set_source_operation(&mut self, op: DragOperation) {
        self.effect_allowed = EffectAllowed::from_drag_operation(op);
    }

    /// Operation the drop target chose
    pub fn destination_operation(&self) -> DragOperation {
        self.drop_effect.to_drag_operation()
    }

    pub fn set_destination_operation(&mut self, op: DragOperation) {
        self.drop_effect = DropEffect::from_drag_operation(op);
    }

    // ========================================================================
    // Source side writers
    // ========================================================================

    /// Link drag payload: URL with title, the URL as text, and the anchor's markup
    pub fn write_url(&mut self, url: &str, title: &str, anchor_markup: &str) {
        self.data_object.set_url_and_title(url, title);
        self.data_object.set_data(MIME_TEXT_PLAIN, url);
        self.data_object.set_html_and_base_url(anchor_markup, url);
    }

    /// Selection payload
    pub fn write_selection(&mut self, markup: &str, text: &str, base_url: &str, smart_replace: bool) {
        self.data_object.set_html_and_base_url(markup, base_url);
        self.data_object.set_data(MIME_TEXT_PLAIN, &text.replace('\u{a0}', " "));
        self.data_object.set_can_smart_replace(smart_replace);
    }

    /// Image payload: URL and title, the encoded image as a file, and the element's markup
    pub fn declare_and_write_drag_image(&mut self, image: &DraggedImage<'_>) {
        self.data_object.set_url_and_title(image.url, image.title);
        self.write_image_file(image);
        self.data_object.set_html_and_base_url(image.markup, image.base_url);
    }

    fn write_image_file(&mut self, image: &DraggedImage<'_>) {
        let resource = image.resource;
        if resource.data.is_empty() {
            return;
        }
        let Some(image_extension) = ImageFormat::from_bytes(&resource.data).extension() else {
            tracing::debug!("Dragged image has no recognised format, skipping file contents");
            return;
        };

        let mut filename = resource.suggested_filename.clone().unwrap_or_default();
        if filename.is_empty() {
            filename = Url::parse(image.url)
                .ok()
                .and_then(|url| url.path_segments()?.next_back().map(str::to_string))
                .unwrap_or_default();
        }

        let mut file_extension = String::new();
        if filename.is_empty() {
            // Alt text is rarely a filename, keep it whole
            filename = image.alt.to_string();
        } else if let Some(dot) = filename.rfind('.') {
            file_extension = filename[dot + 1..].to_string();
            filename.truncate(dot);
        }

        let extension = if !file_extension.is_empty()
            && ImageFormat::from_extension(&file_extension) == ImageFormat::from_extension(image_extension)
        {
            file_extension
        } else {
            image_extension.to_string()
        };

        let (filename, extension) = validate_filename(&filename, &extension);
        let contents: Rc<[u8]> = Rc::from(resource.data.as_slice());
        self.data_object.add_shared_buffer(&format!("{}.{}", filename, extension), contents);
    }
}

/// Inputs for [`DataTransfer::declare_and_write_drag_image`]
#[derive(Debug, Clone, Copy)]
pub struct DraggedImage<'a> {
    /// Link URL when the image sits in a link, else the image URL
    pub url: &'a str,
    pub title: &'a str,
    pub alt: &'a str,
    pub resource: &'a ImageResource,
    /// Serialized `<img>` element
    pub markup: &'a str,
    /// Base URL for the markup
    pub base_url: &'a str,
}

/// Lowercased type, with the `text` and `url` aliases resolved.
/// The flag is set when the value must be reduced to its first URL.
fn normalize_type(ty: &str) -> (String, bool) {
    let ty = ty.trim().to_ascii_lowercase();
    if ty == "text" || ty.starts_with("text/plain;") {
        return (MIME_TEXT_PLAIN.to_string(), false);
    }
    if ty == "url" {
        return (MIME_TEXT_URI_LIST.to_string(), true);
    }
    (ty, false)
}

fn is_invalid_file_character(c: char) -> bool {
    c.is_control() || matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// Strip characters file systems reject and cap the total length
pub fn validate_filename(filename: &str, extension: &str) -> (String, String) {
    let mut filename: String = filename.chars().filter(|c| !is_invalid_file_character(*c)).collect();
    let mut extension: String = extension.chars().filter(|c| !is_invalid_file_character(*c)).collect();

    if extension.chars().count() >= MAX_FILENAME_LENGTH {
        extension.clear();
    }
    // One character is reserved for the dot
    let max = MAX_FILENAME_LENGTH - extension.chars().count() - 1;
    if let Some((index, _)) = filename.char_indices().nth(max) {
        filename.truncate(index);
    }
    (filename, extension)
}

/// Scope guard leaving a transfer numb however the dispatch exits
#[must_use]
pub struct NumbOnDrop(SharedDataTransfer);

impl NumbOnDrop {
    pub fn new(transfer: SharedDataTransfer) -> Self {
        Self(transfer)
    }

    pub fn transfer(&self) -> &SharedDataTransfer {
        &self.0
    }
}

impl Drop for NumbOnDrop {
    fn drop(&mut self) {
        if let Ok(mut transfer) = self.0.try_borrow_mut() {
            transfer.set_access_policy(AccessPolicy::Numb);
        }
    }
}
