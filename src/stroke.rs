//! Stroke tracking: pointer/touch input → an ordered polyline in native
//! image pixel space, with brush parameters frozen at gesture start.

use serde::{Deserialize, Serialize};

/// Smallest selectable brush diameter.
pub const MIN_BRUSH_SIZE: u32 = 1;
/// Stock maximum brush diameter (hosts may configure a different ceiling).
pub const DEFAULT_MAX_BRUSH_SIZE: u32 = 32;

/// Process-wide brush selection, read once at stroke start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushConfig {
    /// Index into the session palette.
    pub color_index: usize,
    /// Diameter in displayed pixels.
    pub size: u32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        // First real color (entry 0 is the muted grey), medium brush
        Self {
            color_index: 1,
            size: 8,
        }
    }
}

/// One recorded sample.  Every sample of a stroke carries the color/size of
/// the first one — brush parameters are fixed at gesture start, and a
/// mid-drag palette change only shows on the *next* stroke.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    /// Palette color index, identical across the stroke.
    pub color: usize,
    /// Brush diameter in displayed pixels, identical across the stroke.
    pub size: u32,
}

/// One continuous drag gesture: ordered samples plus the display→native
/// width scale captured at begin.  Sealed on gesture end; ephemeral after
/// commit.
#[derive(Clone, Debug)]
pub struct Stroke {
    points: Vec<StrokePoint>,
    width_scale: f32,
    sealed: bool,
}

impl Stroke {
    /// Start a stroke at a native-space position.  `brush` is captured here
    /// and never re-read.
    pub fn begin(pos: (f32, f32), brush: BrushConfig, width_scale: f32) -> Self {
        Self {
            points: vec![StrokePoint {
                x: pos.0,
                y: pos.1,
                color: brush.color_index,
                size: brush.size,
            }],
            width_scale,
            sealed: false,
        }
    }

    /// Append a sample.  Sealed strokes are immutable; extending one is a
    /// silent no-op.
    pub fn extend(&mut self, pos: (f32, f32)) {
        if self.sealed {
            return;
        }
        let first = self.points[0];
        self.points.push(StrokePoint {
            x: pos.0,
            y: pos.1,
            color: first.color,
            size: first.size,
        });
    }

    /// Seal the stroke at gesture end.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn color_index(&self) -> usize {
        self.points[0].color
    }

    /// Brush diameter in displayed pixels.
    pub fn brush_size(&self) -> u32 {
        self.points[0].size
    }

    pub fn width_scale(&self) -> f32 {
        self.width_scale
    }

    /// Line width in native pixels: `brushSize * naturalWidth / displayedWidth`,
    /// with the scale frozen at gesture start.
    pub fn native_width(&self) -> f32 {
        self.points[0].size as f32 * self.width_scale
    }
}

/// Mapping between displayed (CSS-scaled) canvas space and native image
/// pixel space.  The x and y scales are kept independent: aspect-fit
/// display can differ marginally from uniform scale at the boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    natural_w: u32,
    natural_h: u32,
    displayed_w: f32,
    displayed_h: f32,
}

impl ViewTransform {
    /// 1:1 transform at the image's natural resolution (headless default).
    pub fn native(natural_w: u32, natural_h: u32) -> Self {
        Self {
            natural_w,
            natural_h,
            displayed_w: natural_w as f32,
            displayed_h: natural_h as f32,
        }
    }

    /// Update the displayed size after a layout change.
    pub fn set_displayed(&mut self, width: f32, height: f32) {
        self.displayed_w = width;
        self.displayed_h = height;
    }

    pub fn natural_size(&self) -> (u32, u32) {
        (self.natural_w, self.natural_h)
    }

    pub fn displayed_size(&self) -> (f32, f32) {
        (self.displayed_w, self.displayed_h)
    }

    /// False until the image is decoded and the canvases are sized; all
    /// drawing handlers no-op in that state.
    pub fn is_ready(&self) -> bool {
        self.natural_w > 0 && self.natural_h > 0 && self.displayed_w > 0.0 && self.displayed_h > 0.0
    }

    /// Displayed-space position → native pixel space, per-axis.
    pub fn to_native(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.natural_w as f32 / self.displayed_w,
            y * self.natural_h as f32 / self.displayed_h,
        )
    }

    /// Scale applied to brush diameters so strokes stay proportionally
    /// sized under window resize.
    pub fn width_scale(&self) -> f32 {
        self.natural_w as f32 / self.displayed_w
    }
}

/// Contact-count gesture routing:
/// 1 simultaneous contact → draw, 2 → pan (stroke building suppressed),
/// 3 or more → completely inert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Drawing,
    Panning,
}
