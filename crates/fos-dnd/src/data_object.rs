//! Drag payload storage
//!
//! An ordered list of typed items shared by the platform drag data and the
//! script-visible `DataTransfer`.

use std::rc::Rc;

pub const MIME_TEXT_PLAIN: &str = "text/plain";
pub const MIME_TEXT_HTML: &str = "text/html";
pub const MIME_TEXT_URI_LIST: &str = "text/uri-list";
pub const MIME_FILES: &str = "Files";

/// Single item in a [`DataObject`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataObjectItem {
    /// String payload keyed by MIME type
    String {
        mime_type: String,
        data: String,
        /// Title of a `text/uri-list` item
        title: Option<String>,
        /// Base URL of a `text/html` item
        base_url: Option<String>,
    },
    /// File on disk
    File { path: String },
    /// In-memory file contents (dragged images)
    SharedBuffer { filename: String, contents: Rc<[u8]> },
}

impl DataObjectItem {
    fn is_string_of(&self, ty: &str) -> bool {
        matches!(self, DataObjectItem::String { mime_type, .. } if mime_type == ty)
    }
}

/// Typed drag payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataObject {
    items: Vec<DataObjectItem>,
    smart_replace: bool,
}

impl DataObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[DataObjectItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the string item of `mime_type`
    pub fn set_data(&mut self, mime_type: &str, data: &str) {
        self.clear_data(mime_type);
        self.items.push(DataObjectItem::String {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
            title: None,
            base_url: None,
        });
    }

    /// String item of `mime_type`
    pub fn get_data(&self, mime_type: &str) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            DataObjectItem::String { mime_type: ty, data, .. } if ty == mime_type => Some(data.as_str()),
            _ => None,
        })
    }

    pub fn clear_data(&mut self, mime_type: &str) {
        self.items.retain(|item| !item.is_string_of(mime_type));
    }

    /// Drop every string item, keeping files
    pub fn clear_all_except_files(&mut self) {
        self.items.retain(|item| !matches!(item, DataObjectItem::String { .. }));
    }

    pub fn contains(&self, mime_type: &str) -> bool {
        self.items.iter().any(|item| item.is_string_of(mime_type))
    }

    /// String types in insertion order, then `Files` if any file items exist
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| match item {
                DataObjectItem::String { mime_type, .. } => Some(mime_type.clone()),
                _ => None,
            })
            .collect();
        if self.items.iter().any(|item| !matches!(item, DataObjectItem::String { .. })) {
            types.push(MIME_FILES.to_string());
        }
        types
    }

    pub fn set_url_and_title(&mut self, url: &str, title: &str) {
        self.clear_data(MIME_TEXT_URI_LIST);
        self.items.push(DataObjectItem::String {
            mime_type: MIME_TEXT_URI_LIST.to_string(),
            data: url.to_string(),
            title: Some(title.to_string()),
            base_url: None,
        });
    }

    /// First URL of the uri-list with its title
    pub fn url_and_title(&self) -> Option<(String, String)> {
        self.items.iter().find_map(|item| match item {
            DataObjectItem::String { mime_type, data, title, .. } if mime_type == MIME_TEXT_URI_LIST => {
                Some((first_uri(data)?, title.clone().unwrap_or_default()))
            }
            _ => None,
        })
    }

    pub fn set_html_and_base_url(&mut self, html: &str, base_url: &str) {
        self.clear_data(MIME_TEXT_HTML);
        self.items.push(DataObjectItem::String {
            mime_type: MIME_TEXT_HTML.to_string(),
            data: html.to_string(),
            title: None,
            base_url: Some(base_url.to_string()),
        });
    }

    pub fn html_and_base_url(&self) -> Option<(String, String)> {
        self.items.iter().find_map(|item| match item {
            DataObjectItem::String { mime_type, data, base_url, .. } if mime_type == MIME_TEXT_HTML => {
                Some((data.clone(), base_url.clone().unwrap_or_default()))
            }
            _ => None,
        })
    }

    pub fn add_file(&mut self, path: &str) {
        self.items.push(DataObjectItem::File { path: path.to_string() });
    }

    pub fn add_shared_buffer(&mut self, filename: &str, contents: Rc<[u8]>) {
        self.items.push(DataObjectItem::SharedBuffer {
            filename: filename.to_string(),
            contents,
        });
    }

    /// Paths of file items (in-memory buffers excluded)
    pub fn file_paths(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| match item {
                DataObjectItem::File { path } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_files(&self) -> bool {
        self.items.iter().any(|item| matches!(item, DataObjectItem::File { .. }))
    }

    pub fn set_can_smart_replace(&mut self, value: bool) {
        self.smart_replace = value;
    }

    pub fn can_smart_replace(&self) -> bool {
        self.smart_replace
    }
}

/// First non-comment line of a `text/uri-list`
pub fn first_uri(uri_list: &str) -> Option<String> {
    uri_list
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_data_replaces() {
        let mut data = DataObject::new();
        data.set_data(MIME_TEXT_PLAIN, "one");
        data.set_data(MIME_TEXT_PLAIN, "two");
        assert_eq!(data.get_data(MIME_TEXT_PLAIN), Some("two"));
        assert_eq!(data.types(), vec![MIME_TEXT_PLAIN.to_string()]);
    }

    #[test]
    fn test_files_type_listed_last() {
        let mut data = DataObject::new();
        data.add_file("/tmp/a.txt");
        data.set_data(MIME_TEXT_PLAIN, "x");
        assert_eq!(data.types(), vec![MIME_TEXT_PLAIN.to_string(), MIME_FILES.to_string()]);
        assert_eq!(data.file_paths(), vec!["/tmp/a.txt".to_string()]);

        data.clear_all_except_files();
        assert_eq!(data.types(), vec![MIME_FILES.to_string()]);
    }

    #[test]
    fn test_shared_buffer_is_not_a_filename() {
        let mut data = DataObject::new();
        data.add_shared_buffer("photo.png", Rc::from(vec![1u8, 2, 3]));
        assert!(!data.contains_files());
        assert_eq!(data.types(), vec![MIME_FILES.to_string()]);
    }

    #[test]
    fn test_url_list_skips_comments() {
        let mut data = DataObject::new();
        data.set_url_and_title("# comment\r\nhttps://example.com/\r\nhttps://other.com/", "Example");
        assert_eq!(
            data.url_and_title(),
            Some(("https://example.com/".to_string(), "Example".to_string()))
        );
    }
}
