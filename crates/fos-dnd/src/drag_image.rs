//! Drag image synthesis
//!
//! Thumbnails for image drags, translucent selection snapshots and the label
//! shown when dragging a link. Painting is delegated to the
//! [`DragImageRenderer`]; sizing, orientation and placement live here.

use std::io::Cursor;

use fos_dom::{FloatSize, ImageResource, IntPoint, IntRect, IntSize};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat as ImgFormat, ImageReader, RgbaImage};

use crate::client::DragImageRenderer;
use crate::error::{DndError, Result};
use crate::settings::Settings;

/// Image formats a drag thumbnail can be made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.len() < 8 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// Get format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "gif" => Self::Gif,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Preferred filename extension
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("png"),
            Self::Jpeg => Some("jpg"),
            Self::Gif => Some("gif"),
            Self::WebP => Some("webp"),
            Self::Unknown => None,
        }
    }

    fn to_image_format(self) -> Option<ImgFormat> {
        match self {
            Self::Png => Some(ImgFormat::Png),
            Self::Jpeg => Some(ImgFormat::Jpeg),
            Self::Gif => Some(ImgFormat::Gif),
            Self::WebP => Some(ImgFormat::WebP),
            Self::Unknown => None,
        }
    }
}

/// Bitmap handed to the platform for drag feedback
#[derive(Debug, Clone, PartialEq)]
pub struct DragImage {
    bitmap: RgbaImage,
}

impl DragImage {
    pub fn new(bitmap: RgbaImage) -> Self {
        Self { bitmap }
    }

    /// Bitmap with every pixel's alpha multiplied by `opacity`
    pub fn with_opacity(mut bitmap: RgbaImage, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            for pixel in bitmap.pixels_mut() {
                pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
            }
        }
        Self { bitmap }
    }

    /// Size in device pixels
    pub fn size(&self) -> IntSize {
        IntSize::new(self.bitmap.width() as i32, self.bitmap.height() as i32)
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    /// Thumbnail of a decoded image scaled by `scale`
    pub fn from_decoded(image: &DynamicImage, scale: FloatSize, pixelated: bool, opacity: f32) -> Result<Self> {
        let width = (image.width() as f32 * scale.width) as u32;
        let height = (image.height() as f32 * scale.height) as u32;
        if width == 0 || height == 0 {
            return Err(DndError::EmptyImage);
        }
        let filter = if pixelated { FilterType::Nearest } else { FilterType::Triangle };
        let resized = image.resize_exact(width, height, filter);
        Ok(Self::with_opacity(resized.into_rgba8(), opacity))
    }
}

/// Decode an image resource, applying its orientation when the element asks for it
pub fn decode_image(resource: &ImageResource) -> Result<DynamicImage> {
    if resource.data.is_empty() {
        return Err(DndError::EmptyImage);
    }
    let format = ImageFormat::from_bytes(&resource.data)
        .to_image_format()
        .ok_or(DndError::UnsupportedImageFormat)?;

    let mut decoder = ImageReader::with_format(Cursor::new(resource.data.as_slice()), format).into_decoder()?;
    let orientation = match resource.orientation.and_then(Orientation::from_exif) {
        Some(orientation) => orientation,
        None => decoder.orientation()?,
    };
    let mut image = DynamicImage::from_decoder(decoder)?;
    if resource.respect_orientation {
        image.apply_orientation(orientation);
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(DndError::EmptyImage);
    }
    Ok(image)
}

/// Scale mapping `image_size` onto `size`, shrunk uniformly to fit `max_size`
pub fn clamped_image_scale(image_size: IntSize, size: IntSize, max_size: IntSize) -> FloatSize {
    // Non-uniform scaling for size mapping
    let mut scale = FloatSize::new(
        size.width as f32 / image_size.width as f32,
        size.height as f32 / image_size.height as f32,
    );

    // Uniform scaling for clamping
    let clamp_x = if size.width > max_size.width {
        max_size.width as f32 / size.width as f32
    } else {
        1.0
    };
    let clamp_y = if size.height > max_size.height {
        max_size.height as f32 / size.height as f32
    } else {
        1.0
    };
    scale.scale(clamp_x.min(clamp_y));
    scale
}

/// Thumbnail for an `<img>` drag and the point the image is anchored at.
///
/// `image_rect` is the element's box in document coordinates. Images whose
/// natural area exceeds the configured maximum get no thumbnail, in which
/// case the location is the drag origin.
pub fn drag_image_for_image(
    settings: &Settings,
    resource: &ImageResource,
    device_scale_factor: f32,
    drag_origin: IntPoint,
    image_rect: IntRect,
) -> (Option<DragImage>, IntPoint) {
    let mut origin = IntPoint::zero();
    let image = decode_image(resource).and_then(|decoded| {
        let image_size = IntSize::new(decoded.width() as i32, decoded.height() as i32);
        if image_size.area() > settings.max_original_image_area {
            tracing::debug!("Image too large for a drag thumbnail: {:?}", image_size);
            return Err(DndError::EmptyImage);
        }
        let scale = clamped_image_scale(
            image_size,
            image_rect.size,
            settings.max_drag_image_size(device_scale_factor),
        );
        DragImage::from_decoded(&decoded, scale, resource.pixelated, settings.drag_image_alpha)
    });

    let image = match image {
        Ok(image) => {
            // Keep the grab point at the same relative spot of a shrunk thumbnail
            let scale = image.size().width as f32 / image_rect.size.width as f32;
            let dx = (image_rect.x() - drag_origin.x) as f32 * scale;
            let dy = (image_rect.y() - drag_origin.y) as f32 * scale;
            origin = IntPoint::new((dx + 0.5) as i32, (dy + 0.5) as i32);
            Some(image)
        }
        Err(err) => {
            tracing::debug!("No drag image for image drag: {}", err);
            None
        }
    };
    (image, IntPoint::new(drag_origin.x + origin.x, drag_origin.y + origin.y))
}

/// Location of a script supplied drag image.
///
/// `image_offset` is the cursor position inside the image; link images follow
/// the pointer, everything else stays anchored at the drag origin.
pub fn drag_location_for_dhtml_drag(
    mouse_dragged_point: IntPoint,
    drag_origin: IntPoint,
    image_offset: IntPoint,
    is_link_image: bool,
) -> IntPoint {
    let y_offset = -image_offset.y;
    if is_link_image {
        return IntPoint::new(mouse_dragged_point.x - image_offset.x, mouse_dragged_point.y + y_offset);
    }
    IntPoint::new(drag_origin.x - image_offset.x, drag_origin.y + y_offset)
}

/// Top-left corner of the selection snapshot
pub fn drag_location_for_selection_drag(bounds: IntRect) -> IntPoint {
    IntPoint::new(bounds.x().min(bounds.max_x()), bounds.y().min(bounds.max_y()))
}

const DRAG_LABEL_BORDER_X: f32 = 4.0;
const DRAG_LABEL_BORDER_Y: f32 = 2.0;
const LABEL_BORDER_Y_OFFSET: f32 = 2.0;
const MAX_DRAG_LABEL_WIDTH: f32 = 300.0;
const MAX_DRAG_LABEL_STRING_WIDTH: f32 = MAX_DRAG_LABEL_WIDTH - 2.0 * DRAG_LABEL_BORDER_X;
const DRAG_LINK_LABEL_FONT_SIZE: f32 = 11.0;
const DRAG_LINK_URL_FONT_SIZE: f32 = 10.0;

/// Font used for one line of a link label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFont {
    pub size: f32,
    pub bold: bool,
}

impl LabelFont {
    pub const LABEL: LabelFont = LabelFont { size: DRAG_LINK_LABEL_FONT_SIZE, bold: true };
    pub const URL: LabelFont = LabelFont { size: DRAG_LINK_URL_FONT_SIZE, bold: false };
}

/// Vertical font metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Geometry of a link drag label, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLabelLayout {
    /// Size in CSS pixels
    pub size: IntSize,
    /// Bitmap size in device pixels
    pub scaled_size: IntSize,
    pub device_scale_factor: f32,
    /// Link text, truncated to fit
    pub label: String,
    /// Baseline origin of the label
    pub label_origin: IntPoint,
    /// URL line under the label, absent when the link text is empty
    pub url: Option<String>,
    pub url_origin: IntPoint,
}

fn truncate_to_width(
    renderer: &dyn DragImageRenderer,
    text: &str,
    max_width: f32,
    font: LabelFont,
    keep_tail: bool,
) -> String {
    const ELLIPSIS: char = '\u{2026}';
    if renderer.measure_text(text, font) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut keep = chars.len();
    while keep > 0 {
        keep -= 1;
        let candidate: String = if keep_tail {
            let head = keep.div_ceil(2);
            let tail = keep / 2;
            chars[..head]
                .iter()
                .chain(std::iter::once(&ELLIPSIS))
                .chain(chars[chars.len() - tail..].iter())
                .collect()
        } else {
            chars[..keep].iter().chain(std::iter::once(&ELLIPSIS)).collect()
        };
        if renderer.measure_text(&candidate, font) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Lay out the label for dragging `url` with link text `label`
pub fn layout_link_label(
    renderer: &dyn DragImageRenderer,
    url: &str,
    label: &str,
    device_scale_factor: f32,
) -> LinkLabelLayout {
    let label_metrics = renderer.font_metrics(LabelFont::LABEL);
    let url_metrics = renderer.font_metrics(LabelFont::URL);
    let max_string_width = MAX_DRAG_LABEL_STRING_WIDTH / device_scale_factor;

    let mut label = label.trim().to_string();
    let draw_url = !label.is_empty();
    if !draw_url {
        label = url.to_string();
    }

    let mut label_width = renderer.measure_text(&label, LabelFont::LABEL);
    let clip_label = label_width > max_string_width;
    if clip_label {
        label_width = max_string_width;
    }
    let label_height = label_metrics.height();

    let mut width = label_width + DRAG_LABEL_BORDER_X * 2.0;
    let mut height = label_height + DRAG_LABEL_BORDER_Y * 2.0;

    let mut url_line = None;
    let mut url_origin = IntPoint::zero();
    if draw_url {
        let url_width = renderer.measure_text(url, LabelFont::URL);
        height += url_metrics.height();
        let clip_url = url_width > max_string_width;
        if clip_url {
            width = MAX_DRAG_LABEL_WIDTH / device_scale_factor;
        } else {
            width = label_width.max(url_width) + DRAG_LABEL_BORDER_X * 2.0;
        }
        let text = if clip_url {
            truncate_to_width(renderer, url, width - DRAG_LABEL_BORDER_X * 2.0, LabelFont::URL, true)
        } else {
            url.to_string()
        };
        url_origin = IntPoint::new(
            DRAG_LABEL_BORDER_X as i32,
            (height - (LABEL_BORDER_Y_OFFSET + url_metrics.descent)) as i32,
        );
        url_line = Some(text);
    }

    if clip_label {
        label = truncate_to_width(renderer, &label, width - DRAG_LABEL_BORDER_X * 2.0, LabelFont::LABEL, false);
    }

    let size = IntSize::new(width as i32, height as i32);
    LinkLabelLayout {
        size,
        scaled_size: size.scaled(device_scale_factor),
        device_scale_factor,
        label,
        label_origin: IntPoint::new(
            DRAG_LABEL_BORDER_X as i32,
            (DRAG_LABEL_BORDER_Y + LabelFont::LABEL.size) as i32,
        ),
        url: url_line,
        url_origin,
    }
}

/// Label image for a link drag
pub fn drag_image_for_link(
    renderer: &dyn DragImageRenderer,
    url: &str,
    label: &str,
    device_scale_factor: f32,
) -> Option<DragImage> {
    let layout = layout_link_label(renderer, url, label, device_scale_factor);
    renderer.paint_link_label(&layout).map(DragImage::new)
}
