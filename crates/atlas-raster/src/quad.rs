// ABOUTME: Screen-space quad math for drawing one glyph from the atlas.
// ABOUTME: Maps a glyph rectangle from atlas pixels to a requested on-screen size.

use crate::atlas::{FontAtlas, GlyphRect};

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Source and destination rectangles for a textured-quad draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Region of the atlas texture, in atlas pixels
    pub src: Rect,
    /// Where the glyph lands on screen, anchored at the origin
    pub dst: Rect,
    /// `src` normalized to texture coordinates `[u1, v1, u2, v2]`
    pub uv: [f32; 4],
}

impl GlyphQuad {
    /// Quad drawing `glyph` so that the atlas row height becomes `target_px`
    pub fn for_glyph(glyph: &GlyphRect, atlas: &FontAtlas, target_px: f32) -> Self {
        let scale = target_px / atlas.height().max(1) as f32;
        let src = Rect {
            x: glyph.s1 as f32,
            y: glyph.t1 as f32,
            width: glyph.width() as f32,
            height: glyph.height() as f32,
        };
        let dst = Rect {
            x: 0.0,
            y: 0.0,
            width: src.width * scale,
            height: atlas.height() as f32 * scale,
        };
        Self {
            src,
            dst,
            uv: glyph.uv(atlas.width(), atlas.height()),
        }
    }
}
