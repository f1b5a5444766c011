//! Coloring session: owns all per-image state (allowed mask, colored-pixel
//! map, final + scratch surfaces, palette, brush, gesture routing) and runs
//! the commit/merge engine.
//!
//! Everything here is synchronous and single-threaded from the caller's
//! point of view: each pointer event runs to completion before the next one
//! is handled, and a `dragging`-style gesture gate prevents concurrent
//! strokes.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::analyzer::{self, AllowedPixels};
use crate::palette::Palette;
use crate::raster::{self, BrushMode};
use crate::store::{PixelEntry, PixelStore};
use crate::stroke::{
    BrushConfig, DEFAULT_MAX_BRUSH_SIZE, GestureState, MIN_BRUSH_SIZE, Stroke, ViewTransform,
};
use crate::{log_err, log_info, log_warn};

/// Committed color per native pixel.  Owned exclusively by the session's
/// commit engine; grows monotonically except on erase and explicit clear.
#[derive(Clone, Debug, Default)]
pub struct ColoredMap {
    pixels: HashMap<(u32, u32), [u8; 4]>,
}

impl ColoredMap {
    pub fn contains(&self, key: (u32, u32)) -> bool {
        self.pixels.contains_key(&key)
    }

    pub fn get(&self, key: (u32, u32)) -> Option<[u8; 4]> {
        self.pixels.get(&key).copied()
    }

    pub fn insert(&mut self, key: (u32, u32), color: [u8; 4]) {
        self.pixels.insert(key, color);
    }

    pub fn remove(&mut self, key: (u32, u32)) {
        self.pixels.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(u32, u32), &[u8; 4])> {
        self.pixels.iter()
    }

    /// Snapshot as an ordered (key, color) list — the persistence wire shape.
    pub fn entries(&self) -> Vec<PixelEntry> {
        let mut out: Vec<PixelEntry> = self.pixels.iter().map(|(k, c)| (*k, *c)).collect();
        out.sort_unstable_by_key(|(k, _)| *k);
        out
    }

    pub fn from_entries(entries: Vec<PixelEntry>) -> Self {
        Self {
            pixels: entries.into_iter().collect(),
        }
    }
}

/// One open coloring page: image identity, analysis result, committed
/// state, live surfaces, and input routing.
pub struct ColoringSession {
    image_id: String,
    base: RgbaImage,
    allowed: AllowedPixels,
    colored: ColoredMap,
    /// Persistent visible layer holding all committed coloring.
    final_layer: RgbaImage,
    /// Transient buffer for the in-flight stroke's live preview.
    scratch: RgbaImage,
    palette: Palette,
    brush: BrushConfig,
    max_brush_size: u32,
    view: ViewTransform,
    /// Displayed size reported mid-stroke; applied when the gesture ends.
    pending_displayed: Option<(f32, f32)>,
    gesture: GestureState,
    active: Option<Stroke>,
    store: Box<dyn PixelStore>,
}

impl ColoringSession {
    /// Open a page: analyze line art, restore any persisted coloring from
    /// the store, and redraw the final surface from the restored map.
    ///
    /// `page` must be the decoded image at its **natural** resolution.
    pub fn open(
        image_id: impl Into<String>,
        page: RgbaImage,
        palette: Palette,
        store: Box<dyn PixelStore>,
    ) -> Self {
        let image_id = image_id.into();
        let (width, height) = page.dimensions();

        let allowed = analyzer::analyze(&page);
        if allowed.paintable_count() == 0 {
            // Fully transparent or all-line-art page: nothing will ever be
            // paintable; the session still works (commits mask to nothing)
            log_warn!("'{}': no paintable pixels found by line-art analysis", image_id);
        }

        let entries = store.load(&image_id);
        let colored = ColoredMap::from_entries(entries);
        log_info!(
            "'{}': opened {}x{}, {} restored pixels",
            image_id,
            width,
            height,
            colored.len()
        );

        let mut session = Self {
            image_id,
            base: page,
            allowed,
            colored,
            final_layer: RgbaImage::new(width, height),
            scratch: RgbaImage::new(width, height),
            palette,
            brush: BrushConfig::default(),
            max_brush_size: DEFAULT_MAX_BRUSH_SIZE,
            view: ViewTransform::native(width, height),
            pending_displayed: None,
            gesture: GestureState::Idle,
            active: None,
            store,
        };
        session.redraw_final_from_map();
        session
    }

    // ---- accessors ---------------------------------------------------------

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn allowed(&self) -> &AllowedPixels {
        &self.allowed
    }

    pub fn colored(&self) -> &ColoredMap {
        &self.colored
    }

    pub fn final_layer(&self) -> &RgbaImage {
        &self.final_layer
    }

    pub fn scratch(&self) -> &RgbaImage {
        &self.scratch
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    // ---- configuration -----------------------------------------------------

    /// Select the active palette color.  Out-of-range indices clamp.
    /// Takes effect on the next stroke, never the in-flight one.
    pub fn set_color(&mut self, index: usize) {
        self.brush.color_index = self.palette.clamp_index(index);
    }

    /// Select the brush diameter, clamped to the configured range.
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.size = size.clamp(MIN_BRUSH_SIZE, self.max_brush_size);
    }

    pub fn set_max_brush_size(&mut self, max: u32) {
        self.max_brush_size = max.max(MIN_BRUSH_SIZE);
        self.brush.size = self.brush.size.clamp(MIN_BRUSH_SIZE, self.max_brush_size);
    }

    /// Report the displayed (CSS-scaled) canvas size after a layout change.
    /// Ignored until the current gesture ends when a stroke is in flight —
    /// the stroke keeps the scale captured at its start.
    pub fn set_displayed_size(&mut self, width: f32, height: f32) {
        if self.gesture == GestureState::Drawing {
            self.pending_displayed = Some((width, height));
        } else {
            self.view.set_displayed(width, height);
        }
    }

    /// 32×32 preview bitmap of the current brush for the host's cursor.
    pub fn brush_preview(&self) -> RgbaImage {
        raster::brush_preview_bitmap(
            &self.palette,
            self.brush.color_index,
            self.brush.size,
            self.max_brush_size,
        )
    }

    // ---- pointer/touch routing --------------------------------------------
    //
    // `contacts` is the number of simultaneous contacts after the event:
    // 1 → stroke, 2 → pan, ≥3 → completely inert.

    /// Begin a gesture.  No-ops while the canvases are not yet sized.
    pub fn pointer_down(&mut self, contacts: u32, x: f32, y: f32) {
        if !self.view.is_ready() {
            return;
        }
        match contacts {
            1 => {
                // dragging flag gates re-entrancy; starting a new stroke
                // while panning is not permitted either
                if self.gesture == GestureState::Idle {
                    let pos = self.view.to_native(x, y);
                    self.active = Some(Stroke::begin(pos, self.brush, self.view.width_scale()));
                    self.gesture = GestureState::Drawing;
                }
            }
            2 => {
                // Second simultaneous contact: the whole interaction becomes
                // a pan; any half-built stroke is dropped without commit
                if self.gesture == GestureState::Drawing {
                    self.discard_active();
                }
                self.gesture = GestureState::Panning;
            }
            _ => {
                // Third and further contacts change nothing at all
            }
        }
    }

    /// Extend the active stroke (1 contact) or do nothing (pan / inert).
    pub fn pointer_move(&mut self, contacts: u32, x: f32, y: f32) {
        if !self.view.is_ready() || contacts >= 3 {
            return;
        }
        if self.gesture != GestureState::Drawing || contacts != 1 {
            return;
        }
        let pos = self.view.to_native(x, y);
        if let Some(stroke) = self.active.as_mut() {
            stroke.extend(pos);
        }
        self.preview_active();
    }

    /// End the gesture.  A completed stroke is committed; a pan simply ends
    /// (the pointer-count drop is what allows the next stroke to begin).
    pub fn pointer_up(&mut self) {
        match self.gesture {
            GestureState::Drawing => self.commit_active(),
            GestureState::Panning | GestureState::Idle => {}
        }
        self.gesture = GestureState::Idle;
        self.apply_pending_view();
    }

    /// Releasing the pointer outside the canvas commits exactly like
    /// pointer-up; there is no abort gesture.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    // ---- commit/merge engine ----------------------------------------------

    /// Merge the completed stroke into the colored-pixel map and final
    /// surface, confined to the stroke's dirty bounding box, under the
    /// masking rule: paint lands only where the pixel is allowed or already
    /// colored.  Eraser strokes bypass the mask and delete map entries.
    fn commit_active(&mut self) {
        let Some(mut stroke) = self.active.take() else {
            return;
        };
        stroke.seal();
        raster::clear_surface(&mut self.scratch);

        let (width, height) = self.view.natural_size();
        let Some(bounds) = raster::stroke_bounds(&stroke, width, height) else {
            return;
        };

        let color_index = self.palette.clamp_index(stroke.color_index());
        let color = self.palette.color(color_index);
        let is_eraser = self.palette.is_eraser(color_index);

        // Rasterize coverage into the scratch buffer (paint mode even for
        // the eraser — alpha > 0 marks the pixels the stroke touched)
        raster::render_stroke(&stroke, color, BrushMode::Paint, &mut self.scratch);

        for y in bounds.y0..=bounds.y1 {
            for x in bounds.x0..=bounds.x1 {
                let covered = *self.scratch.get_pixel(x, y);
                if covered[3] == 0 {
                    continue;
                }
                let key = (x, y);
                if is_eraser {
                    // Full removal: the pixel is logically uncolored again
                    self.final_layer.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                    self.colored.remove(key);
                } else if self.colored.contains(key) || self.allowed.contains(x, y) {
                    self.final_layer.put_pixel(x, y, covered);
                    self.colored.insert(key, color.0);
                }
                // Neither allowed nor previously colored: skip — the final
                // surface stays untouched at that pixel
            }
        }

        raster::clear_surface(&mut self.scratch);
        self.persist();
        // Correctness backstop: the commit only touched a sub-region, so
        // rebuild the whole final surface from the canonical map
        self.redraw_final_from_map();
    }

    /// Re-render the in-flight stroke as a live preview: paint strokes on
    /// the scratch layer, eraser strokes destination-out on the final layer
    /// (the post-commit redraw reconciles the surface either way).
    fn preview_active(&mut self) {
        let Some(stroke) = self.active.as_ref() else {
            return;
        };
        let color_index = self.palette.clamp_index(stroke.color_index());
        let color = self.palette.color(color_index);
        if self.palette.is_eraser(color_index) {
            raster::render_stroke(stroke, color, BrushMode::Erase, &mut self.final_layer);
        } else {
            raster::clear_surface(&mut self.scratch);
            raster::render_stroke(stroke, color, BrushMode::Paint, &mut self.scratch);
        }
    }

    /// Drop the in-flight stroke without committing (two-finger pan took
    /// over).  The final surface is rebuilt in case a live eraser preview
    /// already cleared pixels on it.
    fn discard_active(&mut self) {
        self.active = None;
        raster::clear_surface(&mut self.scratch);
        self.redraw_final_from_map();
    }

    fn apply_pending_view(&mut self) {
        if let Some((w, h)) = self.pending_displayed.take() {
            self.view.set_displayed(w, h);
        }
    }

    /// Best-effort persistence; a failed write never rolls back the
    /// in-memory commit.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.image_id, &self.colored.entries()) {
            log_err!("'{}': failed to persist coloring state: {}", self.image_id, e);
        }
    }

    /// Rebuild the final surface from the colored-pixel map: one 1×1 fill
    /// per map entry.
    fn redraw_final_from_map(&mut self) {
        let (width, height) = self.view.natural_size();
        let mut fresh = RgbaImage::new(width, height);
        for (&(x, y), &color) in self.colored.iter() {
            if x < width && y < height {
                fresh.put_pixel(x, y, Rgba(color));
            }
        }
        self.final_layer = fresh;
    }

    // ---- clear & export ----------------------------------------------------

    /// Wipe the page: in-memory map, stored state, and the final surface.
    pub fn clear(&mut self) {
        self.active = None;
        self.gesture = GestureState::Idle;
        self.colored.clear();
        raster::clear_surface(&mut self.scratch);
        self.redraw_final_from_map();
        if let Err(e) = self.store.clear(&self.image_id) {
            log_err!("'{}': failed to clear stored state: {}", self.image_id, e);
        } else {
            log_info!("'{}': cleared", self.image_id);
        }
    }

    /// Read-only composed bitmap: background line art with the final
    /// colored layer composited source-over on top.
    pub fn composed(&self) -> RgbaImage {
        let mut out = self.base.clone();
        let dst: &mut [u8] = &mut out;
        let src: &[u8] = &self.final_layer;
        dst.par_chunks_exact_mut(4)
            .zip(src.par_chunks_exact(4))
            .for_each(|(d, s)| {
                let sa = s[3] as u32;
                if sa == 0 {
                    return;
                }
                if sa == 255 {
                    d.copy_from_slice(s);
                    return;
                }
                let inv = 255 - sa;
                for c in 0..3 {
                    d[c] = ((s[c] as u32 * sa + d[c] as u32 * inv + 127) / 255) as u8;
                }
                d[3] = (sa + d[3] as u32 * inv / 255).min(255) as u8;
            });
        out
    }

    /// Composed bitmap encoded as PNG bytes, ready for download/share.
    pub fn export_png(&self) -> Result<Vec<u8>, String> {
        crate::io::encode_png(&self.composed())
    }
}
