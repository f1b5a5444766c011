//! Path rasterization: strokes → pixel coverage on a scratch or final
//! surface.
//!
//! A stroke is drawn as a connected polyline with round caps and joins by
//! dense sub-pixel circle stamping along each segment — the stamp spacing is
//! one native pixel, so consecutive dabs overlap into a smooth line and the
//! joins come out round for free.

use image::{Rgba, RgbaImage};

use crate::palette::Palette;
use crate::stroke::Stroke;

/// Compositing rule for a stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushMode {
    /// Normal source-over paint.
    Paint,
    /// Destination-out: erases existing content instead of painting.
    Erase,
}

/// Inclusive integer pixel rectangle, clamped to canvas bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0 + 1
    }
}

/// Dirty bounding box of a stroke: the union of all sample positions,
/// expanded outward by the stroke's native brush size in every direction,
/// clamped to canvas bounds.  `None` when the stroke is empty, the canvas
/// is not sized, or the box lies entirely off-canvas.
pub fn stroke_bounds(stroke: &Stroke, canvas_w: u32, canvas_h: u32) -> Option<PixelRect> {
    if stroke.is_empty() || canvas_w == 0 || canvas_h == 0 {
        return None;
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for p in stroke.points() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let pad = stroke.native_width().ceil();
    let x0 = (min_x - pad).floor().max(0.0) as u32;
    let y0 = (min_y - pad).floor().max(0.0) as u32;
    let x1 = ((max_x + pad).ceil().max(0.0) as u32).min(canvas_w - 1);
    let y1 = ((max_y + pad).ceil().max(0.0) as u32).min(canvas_h - 1);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some(PixelRect { x0, y0, x1, y1 })
}

/// Render a whole stroke onto `target`.
///
/// The line width is `brushSize * naturalWidth / displayedWidth` (the scale
/// captured at gesture start).  A single-sample stroke — a tap — still
/// renders a dot of the full brush diameter.
pub fn render_stroke(stroke: &Stroke, color: Rgba<u8>, mode: BrushMode, target: &mut RgbaImage) {
    if stroke.is_empty() {
        return;
    }
    let radius = stroke.native_width() / 2.0;
    let points = stroke.points();

    if points.len() == 1 {
        stamp_circle(target, (points[0].x, points[0].y), radius, color, mode);
        return;
    }
    for pair in points.windows(2) {
        stamp_segment(
            target,
            (pair[0].x, pair[0].y),
            (pair[1].x, pair[1].y),
            radius,
            color,
            mode,
        );
    }
}

/// Reset a surface to fully transparent.
pub fn clear_surface(target: &mut RgbaImage) {
    for px in target.pixels_mut() {
        *px = Rgba([0, 0, 0, 0]);
    }
}

/// Stamp circles densely along a segment (one native pixel apart).
fn stamp_segment(
    target: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
    mode: BrushMode,
) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance < 0.1 {
        // Degenerate segment — just one circle at the start
        stamp_circle(target, start, radius, color, mode);
        return;
    }

    let steps = distance.ceil() as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        // Float position, no rounding — sub-pixel smooth circles
        stamp_circle(target, (start.0 + dx * t, start.1 + dy * t), radius, color, mode);
    }
}

/// Hard round dab centred at a float position.
fn stamp_circle(
    target: &mut RgbaImage,
    center: (f32, f32),
    radius: f32,
    color: Rgba<u8>,
    mode: BrushMode,
) {
    let (cx, cy) = center;
    let radius_sq = radius * radius;
    if radius_sq < 0.001 {
        return;
    }
    let width = target.width();
    let height = target.height();

    let min_x = (cx - radius).max(0.0) as u32;
    let max_x = ((cx + radius).max(0.0) as u32).min(width.saturating_sub(1));
    let min_y = (cy - radius).max(0.0) as u32;
    let max_y = ((cy + radius).max(0.0) as u32).min(height.saturating_sub(1));
    if min_x > max_x || min_y > max_y {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy > radius_sq {
                continue;
            }
            match mode {
                BrushMode::Paint => {
                    // A stroke is one uniform color: overwrite rather than
                    // re-blend so overlapping dabs don't stack alpha
                    let existing = target.get_pixel(x, y);
                    if color[3] >= existing[3] {
                        target.put_pixel(x, y, color);
                    }
                }
                BrushMode::Erase => {
                    target.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }
}

/// Side length of the brush preview bitmap.
pub const PREVIEW_SIZE: u32 = 32;

/// Render a 32×32 brush preview (filled circle of the selected color, black
/// outline, half-alpha crosshair) for the host UI to turn into a cursor or
/// indicator however it likes.
pub fn brush_preview_bitmap(
    palette: &Palette,
    color_index: usize,
    size: u32,
    max_size: u32,
) -> RgbaImage {
    let size = size.clamp(2, max_size.max(2));
    let color = palette.color(color_index);
    let center = PREVIEW_SIZE as f32 / 2.0;
    let radius = size as f32 / 2.0;

    let mut bitmap = RgbaImage::new(PREVIEW_SIZE, PREVIEW_SIZE);
    for y in 0..PREVIEW_SIZE {
        for x in 0..PREVIEW_SIZE {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy * dy).sqrt();
            let px = if dist <= radius {
                color
            } else if dist <= radius + 1.0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            };
            bitmap.put_pixel(x, y, px);
        }
    }

    // Crosshair through the centre at 50% black
    let mid = PREVIEW_SIZE / 2;
    for i in 0..PREVIEW_SIZE {
        for (x, y) in [(i, mid), (mid, i)] {
            let existing = *bitmap.get_pixel(x, y);
            let blended = Rgba([
                (existing[0] as u16 / 2) as u8,
                (existing[1] as u16 / 2) as u8,
                (existing[2] as u16 / 2) as u8,
                existing[3].max(128),
            ]);
            bitmap.put_pixel(x, y, blended);
        }
    }
    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{BrushConfig, DEFAULT_MAX_BRUSH_SIZE};

    fn stroke_at(points: &[(f32, f32)], size: u32) -> Stroke {
        let brush = BrushConfig {
            color_index: 1,
            size,
        };
        let mut s = Stroke::begin(points[0], brush, 1.0);
        for &p in &points[1..] {
            s.extend(p);
        }
        s
    }

    #[test]
    fn single_sample_renders_a_dot() {
        let mut surface = RgbaImage::new(8, 8);
        let stroke = stroke_at(&[(4.0, 4.0)], 1);
        render_stroke(&stroke, Rgba([255, 0, 0, 204]), BrushMode::Paint, &mut surface);
        assert!(surface.pixels().any(|p| p[3] > 0));
        assert_eq!(surface.get_pixel(4, 4)[3], 204);
    }

    #[test]
    fn erase_mode_clears_coverage() {
        let mut surface = RgbaImage::new(8, 8);
        for px in surface.pixels_mut() {
            *px = Rgba([10, 20, 30, 255]);
        }
        let stroke = stroke_at(&[(4.0, 4.0)], 3);
        render_stroke(&stroke, Rgba([255, 255, 255, 204]), BrushMode::Erase, &mut surface);
        assert_eq!(*surface.get_pixel(4, 4), Rgba([0, 0, 0, 0]));
        // Far corner untouched
        assert_eq!(*surface.get_pixel(0, 7), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn bounds_expand_by_brush_size_and_clamp() {
        let stroke = stroke_at(&[(2.0, 2.0), (5.0, 2.0)], 4);
        let rect = stroke_bounds(&stroke, 100, 100).unwrap();
        assert_eq!(rect, PixelRect { x0: 0, y0: 0, x1: 9, y1: 6 });

        let clamped = stroke_bounds(&stroke, 4, 4).unwrap();
        assert_eq!(clamped, PixelRect { x0: 0, y0: 0, x1: 3, y1: 3 });
    }

    #[test]
    fn off_canvas_stroke_has_no_bounds() {
        let stroke = stroke_at(&[(500.0, 500.0)], 2);
        assert!(stroke_bounds(&stroke, 10, 10).is_none());
    }

    #[test]
    fn preview_bitmap_centre_carries_palette_color() {
        let palette = Palette::default();
        let bmp = brush_preview_bitmap(&palette, 1, 8, DEFAULT_MAX_BRUSH_SIZE);
        assert_eq!(bmp.dimensions(), (PREVIEW_SIZE, PREVIEW_SIZE));
        // Just off-centre (the exact centre is dimmed by the crosshair)
        let px = *bmp.get_pixel(14, 14);
        assert_eq!(px, palette.color(1));
    }
}
