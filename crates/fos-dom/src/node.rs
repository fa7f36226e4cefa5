//! DOM Node
//!
//! Nodes live in a generational arena; links are `NodeId` handles rather
//! than pointers.

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Computed `user-drag` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserDrag {
    #[default]
    Auto,
    None,
    Element,
}

/// Computed `contenteditable` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEditable {
    True,
    PlainTextOnly,
    False,
}

/// Image payload backing an `<img>`
#[derive(Debug, Clone, Default)]
pub struct ImageResource {
    /// Encoded bytes as fetched
    pub data: Vec<u8>,
    /// Filename suggested by the response, if any
    pub suggested_filename: Option<String>,
    /// EXIF orientation (1-8) already extracted by the decoder
    pub orientation: Option<u8>,
    /// `image-orientation: from-image`
    pub respect_orientation: bool,
    /// `image-rendering: pixelated`
    pub pixelated: bool,
}

/// State of an `<input type=file>`
#[derive(Debug, Clone, Default)]
pub struct FileInputState {
    files: Vec<String>,
    can_receive_dropped_files: bool,
}

impl FileInputState {
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn can_receive_dropped_files(&self) -> bool {
        self.can_receive_dropped_files
    }

    pub fn set_can_receive_dropped_files(&mut self, value: bool) {
        self.can_receive_dropped_files = value;
    }

    /// Replace the selected files; a single-file input keeps only the first
    pub fn receive_dropped_files(&mut self, paths: &[String], multiple: bool) -> bool {
        if paths.is_empty() {
            return false;
        }
        self.files = if multiple {
            paths.to_vec()
        } else {
            paths[..1].to_vec()
        };
        true
    }
}

/// Element kind specific state
#[derive(Debug, Clone, Default)]
pub enum ElementState {
    #[default]
    None,
    Image(ImageResource),
    FileInput(FileInputState),
    Plugin { can_process_drag: bool },
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    tag: String,
    attrs: Vec<Attribute>,
    /// Computed `user-drag`
    pub user_drag: UserDrag,
    /// Kind specific state
    pub state: ElementState,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            user_drag: UserDrag::Auto,
            state: ElementState::None,
        }
    }

    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute { name, value: value.to_string() });
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|a| a.name != name);
    }

    pub fn is_anchor(&self) -> bool {
        self.tag == "a"
    }

    /// Anchor with a non-empty `href`
    pub fn is_live_link(&self) -> bool {
        self.is_anchor() && self.get_attr("href").is_some_and(|h| !h.trim().is_empty())
    }

    pub fn is_image(&self) -> bool {
        self.tag == "img"
    }

    pub fn image(&self) -> Option<&ImageResource> {
        match &self.state {
            ElementState::Image(res) => Some(res),
            _ => None,
        }
    }

    pub fn is_file_input(&self) -> bool {
        self.tag == "input" && matches!(self.state, ElementState::FileInput(_))
    }

    pub fn file_input(&self) -> Option<&FileInputState> {
        match &self.state {
            ElementState::FileInput(state) => Some(state),
            _ => None,
        }
    }

    pub fn file_input_mut(&mut self) -> Option<&mut FileInputState> {
        match &mut self.state {
            ElementState::FileInput(state) => Some(state),
            _ => None,
        }
    }

    pub fn is_disabled_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select" | "button")
            && self.has_attr("disabled")
    }

    pub fn multiple(&self) -> bool {
        self.has_attr("multiple")
    }

    pub fn is_plugin(&self) -> bool {
        matches!(self.state, ElementState::Plugin { .. })
    }

    pub fn plugin_can_process_drag(&self) -> bool {
        matches!(self.state, ElementState::Plugin { can_process_drag: true })
    }

    /// `contenteditable` as declared on this element
    pub fn content_editable(&self) -> Option<ContentEditable> {
        let value = self.get_attr("contenteditable")?;
        Some(match value.to_ascii_lowercase().as_str() {
            "" | "true" => ContentEditable::True,
            "plaintext-only" => ContentEditable::PlainTextOnly,
            _ => ContentEditable::False,
        })
    }

    /// `user-drag` after applying the `draggable` attribute
    pub fn effective_user_drag(&self) -> UserDrag {
        if self.user_drag != UserDrag::Auto {
            return self.user_drag;
        }
        match self.get_attr("draggable") {
            Some("true") => UserDrag::Element,
            Some("false") => UserDrag::None,
            _ => UserDrag::Auto,
        }
    }
}
