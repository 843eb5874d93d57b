//! Fixed-size drawing surface: a white RGBA raster that pointer strokes ink
//! into, with clear and PNG export.

pub mod stroke;

pub use stroke::{PointerEvent, StrokeCommand, StrokeGate, StrokeState};

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub const SURFACE_WIDTH: u32 = 400;
pub const SURFACE_HEIGHT: u32 = 400;
pub const STROKE_WIDTH: f32 = 8.0;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Errors raised while exporting the surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}

/// The canvas the user draws digits on.
///
/// Ink is composited source-over: opaque ink replaces the pixels it covers
/// and nothing is ever erased except by [`DrawingSurface::clear`].
#[derive(Debug)]
pub struct DrawingSurface {
    pixels: RgbaImage,
    stroke_width: f32,
    ink: Rgba<u8>,
    gate: StrokeGate,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface {
    pub fn new() -> Self {
        let mut surface = Self {
            pixels: RgbaImage::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            stroke_width: STROKE_WIDTH,
            ink: INK,
            gate: StrokeGate::default(),
        };
        surface.fill_background();
        surface.gate.attach();
        surface
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn is_drawing(&self) -> bool {
        self.gate.is_drawing()
    }

    /// Subscribes the surface to pointer input (surface mounted).
    pub fn attach(&mut self) {
        self.gate.attach();
    }

    /// Unsubscribes from pointer input (surface torn down).
    pub fn detach(&mut self) {
        self.gate.detach();
    }

    /// Feeds one pointer event through the stroke gate.
    ///
    /// Returns `true` when pixels changed and the view has to be refreshed.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        match self.gate.handle(event) {
            Some(StrokeCommand::LineTo { from, to }) => {
                self.draw_segment(from, to);
                true
            }
            Some(StrokeCommand::MoveTo(_)) | None => false,
        }
    }

    /// Erases everything to transparent, then repaints the white background.
    pub fn clear(&mut self) {
        self.pixels = RgbaImage::new(self.pixels.width(), self.pixels.height());
        self.gate.end_stroke();
        self.fill_background();
    }

    /// Encodes the current pixels as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn ink_pixel_count(&self) -> usize {
        self.pixels.pixels().filter(|px| **px != BACKGROUND).count()
    }

    pub fn is_blank(&self) -> bool {
        self.ink_pixel_count() == 0
    }

    fn fill_background(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    // A pixel is inked when its center lies within half the stroke width of
    // the segment, so a straight run covers exactly `stroke_width` pixels
    // across and ends in round caps that join consecutive segments.
    fn draw_segment(&mut self, from: (f32, f32), to: (f32, f32)) {
        let half = self.stroke_width / 2.0;
        let (width, height) = self.pixels.dimensions();

        let min_x = (from.0.min(to.0) - half).floor().max(0.0) as u32;
        let min_y = (from.1.min(to.1) - half).floor().max(0.0) as u32;
        let max_x = ((from.0.max(to.0) + half).ceil().max(0.0) as u32).min(width);
        let max_y = ((from.1.max(to.1) + half).ceil().max(0.0) as u32).min(height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= half {
                    self.pixels.put_pixel(x, y, self.ink);
                }
            }
        }
    }
}

fn distance_to_segment(point: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((point.0 - a.0) * dx + (point.1 - a.1) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let nearest = (a.0 + dx * t, a.1 + dy * t);
    ((point.0 - nearest.0).powi(2) + (point.1 - nearest.1).powi(2)).sqrt()
}
