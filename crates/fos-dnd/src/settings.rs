//! Page settings consumed by drag and drop

use fos_dom::IntSize;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Drag thumbnails are never larger than this, before device scaling
#[cfg(target_os = "macos")]
const DEFAULT_MAX_DRAG_IMAGE_SIZE: IntSize = IntSize::new(400, 400);
#[cfg(not(target_os = "macos"))]
const DEFAULT_MAX_DRAG_IMAGE_SIZE: IntSize = IntSize::new(200, 200);

/// Drag and drop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dropping a URL on a page that does not handle it navigates the main frame
    pub navigate_on_drag_drop: bool,
    /// Images are draggable as images only when they load automatically
    pub loads_images_automatically: bool,
    /// Whitespace-aware insert and delete for word selections
    pub smart_insert_delete_enabled: bool,
    /// Opacity applied to selection and image thumbnails
    pub drag_image_alpha: f32,
    /// Images with more pixels than this get no thumbnail
    pub max_original_image_area: i64,
    /// Thumbnail bound in CSS pixels
    pub max_drag_image_size: IntSize,
    /// Vertical distance between the pointer and a link label
    pub link_drag_border_inset: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            navigate_on_drag_drop: true,
            loads_images_automatically: true,
            smart_insert_delete_enabled: true,
            drag_image_alpha: 0.75,
            max_original_image_area: 1500 * 1500,
            max_drag_image_size: DEFAULT_MAX_DRAG_IMAGE_SIZE,
            link_drag_border_inset: 2,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str(json)?;
        tracing::debug!("Loaded drag settings: {:?}", settings);
        Ok(settings)
    }

    /// Maximum thumbnail size in device pixels
    pub fn max_drag_image_size(&self, device_scale_factor: f32) -> IntSize {
        self.max_drag_image_size.scaled(device_scale_factor)
    }
}
