//! Error types

/// Drag and drop error
///
/// Acceptance of a drag is reported through return values; these errors only
/// cover the helpers around it (settings, drag image synthesis).
#[derive(Debug, thiserror::Error)]
pub enum DndError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Unsupported image format")]
    UnsupportedImageFormat,

    #[error("Empty image")]
    EmptyImage,
}

/// Result alias
pub type Result<T> = std::result::Result<T, DndError>;
