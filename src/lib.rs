//! ColorFE — a region-constrained raster coloring engine.
//!
//! The engine tracks freehand brush strokes, constrains paint to the
//! paintable pixel regions derived from line-art analysis, persists
//! per-pixel color state keyed by image identity, and composites the
//! colored layer over the page for export.  A host UI feeds it pointer/
//! touch events and renders its surfaces; everything else (routing,
//! dialogs, settings) lives outside this crate.

pub mod analyzer;
pub mod cli;
pub mod io;
pub mod logger;
pub mod palette;
pub mod raster;
pub mod session;
pub mod store;
pub mod stroke;

pub use analyzer::{AllowedPixels, analyze};
pub use palette::{ColorInfo, Palette};
pub use raster::{BrushMode, PixelRect, brush_preview_bitmap};
pub use session::{ColoredMap, ColoringSession};
pub use store::{FileStore, MemoryStore, PixelStore, StoreError};
pub use stroke::{BrushConfig, GestureState, Stroke, StrokePoint, ViewTransform};
