// ABOUTME: Glyph atlas rasterization for glyph-row.
// ABOUTME: Packs font glyphs into one coverage row and exports it as an image.

pub mod atlas;
pub mod bdf;
pub mod bitmap;
pub mod export;
pub mod fonts;
pub mod quad;
pub mod rasterizer;

pub use atlas::{AtlasBuilder, AtlasError, FontAtlas, GlyphRect};
pub use bdf::BdfFont;
pub use bitmap::{Bitmap, BitmapRegion};
pub use export::{decode_png, encode_png, save_png, ExportError};
pub use fonts::bundled_font;
pub use quad::{GlyphQuad, Rect};
pub use rasterizer::{FontRasterizer, FontdueRasterizer};
