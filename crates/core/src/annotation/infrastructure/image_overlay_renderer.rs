use std::fs;
use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::annotation::domain::annotation_plan::{AnnotationPlan, Overlay};
use crate::annotation::domain::overlay_renderer::{OverlayRenderer, RenderError};
use crate::shared::bounding_box::PixelBox;
use crate::shared::constants::{LABEL_FONT_SIZE, LABEL_OFFSET_PX, REENCODE_QUALITY};

/// In-memory overlay renderer using the `image` and `imageproc` crates.
///
/// Labels use the bundled DejaVu Sans unless another font file is given.
/// Output is encoded in the input's format, JPEG at the configured quality.
pub struct ImageOverlayRenderer {
    font: Option<FontArc>,
    quality: u8,
}

impl ImageOverlayRenderer {
    pub fn new() -> Self {
        Self {
            font: bundled_font(),
            quality: REENCODE_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Replaces the bundled label font.
    pub fn with_font_file(mut self, path: &Path) -> Result<Self, RenderError> {
        let data = fs::read(path).map_err(|source| RenderError::FontIo {
            path: path.to_path_buf(),
            source,
        })?;
        let font =
            FontArc::try_from_vec(data).map_err(|_| RenderError::InvalidFont(path.to_path_buf()))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn draw(&self, canvas: &mut RgbImage, overlay: &Overlay) {
        let (width, height) = canvas.dimensions();
        let px = overlay.bounding_box.to_pixels(width, height);
        let color = Rgb(overlay.color);

        draw_hollow_rect_mut(canvas, pixel_rect(&px), color);

        match &self.font {
            Some(font) => {
                // Fixed upward shift; boxes near the top edge get a negative y.
                let x = px.left.round() as i32;
                let y = px.top.round() as i32 - LABEL_OFFSET_PX;
                draw_text_mut(
                    canvas,
                    color,
                    x,
                    y,
                    PxScale::from(LABEL_FONT_SIZE),
                    font,
                    &overlay.label,
                );
            }
            None => log::warn!("No label font available, skipping label {:?}", overlay.label),
        }
    }

    fn encode(&self, canvas: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        let mut out = Cursor::new(Vec::new());
        if format == ImageFormat::Jpeg {
            canvas.write_with_encoder(JpegEncoder::new_with_quality(&mut out, self.quality))?;
        } else {
            canvas.write_to(&mut out, format)?;
        }
        Ok(out.into_inner())
    }
}

impl Default for ImageOverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer for ImageOverlayRenderer {
    fn render(&self, image: &[u8], plan: &AnnotationPlan) -> Result<Vec<u8>, RenderError> {
        let format = image::guess_format(image)?;
        let mut canvas = image::load_from_memory_with_format(image, format)?.to_rgb8();

        for overlay in plan.overlays() {
            self.draw(&mut canvas, overlay);
        }

        self.encode(&canvas, format)
    }
}

const BUNDLED_FONT: &[u8] = include_bytes!("../../../assets/DejaVuSans.ttf");

fn bundled_font() -> Option<FontArc> {
    match FontArc::try_from_slice(BUNDLED_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            log::error!("Bundled label font is unusable, labels will be skipped: {e}");
            None
        }
    }
}

/// Rounds a pixel box to an integer rectangle. Degenerate boxes become one
/// pixel wide/high rather than being dropped.
fn pixel_rect(px: &PixelBox) -> Rect {
    let left = px.left.round();
    let top = px.top.round();
    let width = (px.right.round() - left).max(1.0) as u32;
    let height = (px.bottom.round() - top).max(1.0) as u32;
    Rect::at(left as i32, top as i32).of_size(width, height)
}
