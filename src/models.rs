use serde::Deserialize;
use std::fmt;

/// Identifies one image in the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
}

impl ImageRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Normalized bounding box: each field is a fraction of the image
/// width or height, usually in [0, 1]. Out-of-range values are kept
/// as-is; projection and drawing stay permissive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Project into pixel space against the decoded image dimensions.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        let w = image_width as f32;
        let h = image_height as f32;
        let left = self.left * w;
        let top = self.top * h;
        PixelRect {
            left,
            top,
            right: left + self.width * w,
            bottom: top + self.height * h,
        }
    }
}

/// Axis-aligned rectangle in pixel coordinates of the decoded image.
/// Coordinates are kept as floats; the renderer truncates when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// One concrete occurrence of a label within an image. The bounding box
/// is optional: some labels apply to the whole image.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

/// A named classification returned by the detection service.
/// Confidence is a percentage in [0, 100].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionLabel {
    pub name: String,
    pub confidence: f32,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl DetectionLabel {
    /// One line of the textual report for this label.
    pub fn report_line(&self) -> String {
        format!("{} - Confidence: {:.2}%", self.name, self.confidence)
    }
}

/// Parameters forwarded to the detection service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectParams {
    /// Caps the number of returned labels. Must be > 0.
    pub max_labels: u32,
    /// Filters out detections below this confidence, in [0, 100].
    pub min_confidence: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            max_labels: 10,
            min_confidence: 70.0,
        }
    }
}
