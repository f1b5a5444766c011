//! Line-art analysis: classify every pixel of a coloring page as paintable
//! or boundary/background.
//!
//! A pixel is paintable when it is visible (`a > 0`) and not near-black line
//! art.  Near-black or fully transparent pixels are the outlines and holes
//! of the page; paint never lands on them (first-time — see the commit
//! engine's re-color exception).

use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

/// Channel threshold below which an opaque pixel counts as line art.
const LINE_ART_THRESHOLD: u8 = 50;

/// Resolution-native mask of pixels that may receive paint.
///
/// Computed once per page load and read-only afterward.  Backed by a
/// `GrayImage` (255 = paintable, 0 = boundary/background) so it shares the
/// representation of every other mask in the crate.
#[derive(Clone, Debug)]
pub struct AllowedPixels {
    mask: GrayImage,
}

impl AllowedPixels {
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    /// True when (x, y) may receive paint.  Out-of-bounds coordinates are
    /// never paintable.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x >= self.mask.width() || y >= self.mask.height() {
            return false;
        }
        self.mask.get_pixel(x, y)[0] != 0
    }

    /// Number of paintable pixels.  Zero for a fully transparent page —
    /// nothing is ever paintable on such an image.
    pub fn paintable_count(&self) -> usize {
        self.mask.as_raw().iter().filter(|&&v| v != 0).count()
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }
}

/// Scan a decoded page once and build its allowed-pixel mask.
///
/// `page` must be at the image's **natural** resolution (the mask is
/// resolution-native and survives display resizes).  Single O(w·h) pass,
/// row-parallelised.
pub fn analyze(page: &RgbaImage) -> AllowedPixels {
    let (width, height) = page.dimensions();
    let raw: Vec<u8> = page
        .as_raw()
        .par_chunks_exact(4)
        .map(|px| {
            let visible = px[3] > 0;
            let line_art = px[0] < LINE_ART_THRESHOLD
                && px[1] < LINE_ART_THRESHOLD
                && px[2] < LINE_ART_THRESHOLD;
            if visible && !line_art { 255 } else { 0 }
        })
        .collect();

    // Length matches by construction (one byte out per RGBA quad in)
    let mask = GrayImage::from_raw(width, height, raw).unwrap();
    AllowedPixels { mask }
}
