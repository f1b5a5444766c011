use image::Rgba;
use serde::{Deserialize, Serialize};

/// One palette entry: an RGBA color plus an optional display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub color: [u8; 4],
    pub label: Option<String>,
}

impl ColorInfo {
    pub fn new(color: [u8; 4]) -> Self {
        Self { color, label: None }
    }

    pub fn labeled(color: [u8; 4], label: &str) -> Self {
        Self {
            color,
            label: Some(label.to_string()),
        }
    }
}

/// Ordered, session-immutable color list.  By convention the **last** entry
/// is the eraser.  Supplied as configuration; `Palette::default()` carries
/// the stock coloring-book set (14 colors + white eraser, all at 80% alpha).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<ColorInfo>,
}

/// Alpha used by the stock palette (0.8 of 255).
const STOCK_ALPHA: u8 = 204;

impl Default for Palette {
    fn default() -> Self {
        let rgb = |r, g, b| ColorInfo::new([r, g, b, STOCK_ALPHA]);
        Self {
            entries: vec![
                rgb(87, 87, 87),
                rgb(220, 35, 35),
                rgb(42, 75, 215),
                rgb(29, 105, 20),
                rgb(129, 74, 25),
                rgb(129, 38, 192),
                rgb(160, 160, 160),
                rgb(129, 197, 122),
                rgb(157, 175, 255),
                rgb(41, 208, 208),
                rgb(255, 146, 51),
                rgb(255, 238, 51),
                rgb(233, 222, 187),
                rgb(255, 205, 243),
                ColorInfo::labeled([255, 255, 255, STOCK_ALPHA], "Eraser"),
            ],
        }
    }
}

impl Palette {
    /// Build a palette from explicit entries.  An empty list falls back to
    /// the stock palette so a session always has at least one paint color
    /// and an eraser.
    pub fn new(entries: Vec<ColorInfo>) -> Self {
        if entries.is_empty() {
            return Self::default();
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ColorInfo] {
        &self.entries
    }

    /// Index of the eraser entry (always the last one).
    pub fn eraser_index(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_eraser(&self, index: usize) -> bool {
        self.clamp_index(index) == self.eraser_index()
    }

    /// Clamp an index into the valid range.  Out-of-range indices fall back
    /// to the first entry rather than failing — an invalid selection must
    /// never break the interaction loop.
    pub fn clamp_index(&self, index: usize) -> usize {
        if index < self.entries.len() { index } else { 0 }
    }

    /// Color for `index`, after clamping.
    pub fn color(&self, index: usize) -> Rgba<u8> {
        Rgba(self.entries[self.clamp_index(index)].color)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.entries[self.clamp_index(index)].label.as_deref()
    }
}
