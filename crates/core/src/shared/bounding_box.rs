use serde::Deserialize;

/// Axis-aligned box in normalized image-fraction units.
///
/// Every field is relative to the image dimensions, so `left = 0.5` means
/// half-way across regardless of resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Box in pixel coordinates with inclusive-exclusive edges.
///
/// Edges are not clamped: a box that extends past the image keeps its
/// computed coordinates and the renderer clips what it draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Scales the fractional box onto an image of the given size.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> PixelBox {
        let w = image_width as f64;
        let h = image_height as f64;
        let left = self.left * w;
        let top = self.top * h;
        PixelBox {
            left,
            top,
            right: left + self.width * w,
            bottom: top + self.height * h,
        }
    }
}

impl PixelBox {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}
