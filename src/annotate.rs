use ab_glyph::{FontVec, PxScale};
use anyhow::Context;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

use crate::error::Error;
use crate::models::{DetectionLabel, PixelRect};

/// Outline and text color for every annotation.
pub const BOX_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Outline stroke width in pixels, growing inward from the rect edge.
pub const STROKE_WIDTH: i32 = 3;

/// Text height in pixels for label names.
const LABEL_SCALE: f32 = 16.0;

/// Rendering backend seam: decodes bytes into a canvas and draws the
/// primitives the annotator asks for. Keeps the coordinate math in
/// [`Annotator`] testable without a concrete codec.
pub trait Renderer: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, Error>;
    fn draw_rect(&self, canvas: &mut RgbaImage, rect: &PixelRect);
    fn draw_label(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32);
}

/// Renderer backed by the image/imageproc stack. Text needs a font; when
/// none is configured, rectangles are still drawn and label text is
/// skipped.
pub struct ImageprocRenderer {
    font: Option<FontVec>,
}

impl ImageprocRenderer {
    pub fn new() -> Self {
        Self { font: None }
    }

    pub fn with_font(font_path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(font_path)
            .with_context(|| format!("failed to read font {}", font_path.display()))?;
        let font = FontVec::try_from_vec(data)
            .with_context(|| format!("invalid font file {}", font_path.display()))?;
        Ok(Self { font: Some(font) })
    }
}

impl Default for ImageprocRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ImageprocRenderer {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, Error> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(decoded.to_rgba8())
    }

    fn draw_rect(&self, canvas: &mut RgbaImage, rect: &PixelRect) {
        let left = rect.left as i32;
        let top = rect.top as i32;
        let right = rect.right as i32;
        let bottom = rect.bottom as i32;

        // Both corners are on the outline (PIL rectangle semantics).
        let width = (right - left + 1).max(1) as u32;
        let height = (bottom - top + 1).max(1) as u32;

        for inset in 0..STROKE_WIDTH {
            let w = width.saturating_sub(2 * inset as u32);
            let h = height.saturating_sub(2 * inset as u32);
            if w == 0 || h == 0 {
                break;
            }
            let ring = Rect::at(left + inset, top + inset).of_size(w, h);
            draw_hollow_rect_mut(canvas, ring, BOX_COLOR);
        }
    }

    fn draw_label(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32) {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, BOX_COLOR, x, y, PxScale::from(LABEL_SCALE), font, text);
        }
    }
}

/// Decodes an image and overlays the detections on it.
pub struct Annotator {
    renderer: Box<dyn Renderer>,
}

impl Annotator {
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// Draws a hollow rectangle and the label name for every instance
    /// that carries a bounding box, in input order. Instances without a
    /// box, and labels without instances, draw nothing. An empty label
    /// list returns the decoded image untouched.
    pub fn annotate(
        &self,
        bytes: &[u8],
        labels: &[DetectionLabel],
    ) -> Result<RgbaImage, Error> {
        let mut canvas = self.renderer.decode(bytes)?;
        let (width, height) = canvas.dimensions();

        for label in labels {
            for instance in &label.instances {
                if let Some(bb) = &instance.bounding_box {
                    let rect = bb.to_pixel_rect(width, height);
                    self.renderer.draw_rect(&mut canvas, &rect);
                    self.renderer.draw_label(
                        &mut canvas,
                        &label.name,
                        rect.left as i32,
                        rect.top as i32,
                    );
                }
            }
        }

        Ok(canvas)
    }
}
