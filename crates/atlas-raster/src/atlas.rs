// ABOUTME: Single-row glyph atlas for GPU text rendering.
// ABOUTME: Rasterizes a codepoint set side by side and records each glyph's rectangle.

use atlas_core::CodepointSource;

use crate::bitmap::Bitmap;
use crate::rasterizer::{FontRasterizer, FontdueRasterizer};

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("Failed to load font: {0}")]
    FontParse(String),

    #[error("Failed to allocate {width}x{height} atlas")]
    Allocation { width: u32, height: u32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Where one glyph lives in the atlas, in pixels.
///
/// `t1` is always 0 and `t2` the atlas height: rectangles cover the full row,
/// not the glyph's tight ink box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRect {
    pub codepoint: char,
    pub s1: u32,
    pub t1: u32,
    pub s2: u32,
    pub t2: u32,
}

impl GlyphRect {
    pub fn width(&self) -> u32 {
        self.s2 - self.s1
    }

    pub fn height(&self) -> u32 {
        self.t2 - self.t1
    }

    /// Normalized texture coordinates `[u1, v1, u2, v2]`
    pub fn uv(&self, atlas_width: u32, atlas_height: u32) -> [f32; 4] {
        let w = atlas_width.max(1) as f32;
        let h = atlas_height.max(1) as f32;
        [
            self.s1 as f32 / w,
            self.t1 as f32 / h,
            self.s2 as f32 / w,
            self.t2 as f32 / h,
        ]
    }
}

/// A finished atlas: one row of glyph coverage plus its rectangle table
#[derive(Debug, Clone, PartialEq)]
pub struct FontAtlas {
    bitmap: Bitmap,
    glyphs: Vec<GlyphRect>,
}

impl FontAtlas {
    /// Parse TrueType/OpenType bytes and build an atlas from them
    pub fn from_font_bytes(
        font_data: &[u8],
        pixel_size: u32,
        codepoints: CodepointSource,
    ) -> Result<Self, AtlasError> {
        let builder = AtlasBuilder::new(pixel_size).codepoints(codepoints);
        // Reject bad arguments before paying for the font parse.
        builder.validate()?;
        let raster = FontdueRasterizer::from_bytes(font_data)?;
        builder.build(&raster)
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Glyph rectangles in request order
    pub fn glyphs(&self) -> &[GlyphRect] {
        &self.glyphs
    }

    /// First rectangle recorded for `c`
    pub fn glyph(&self, c: char) -> Option<&GlyphRect> {
        self.glyphs.iter().find(|g| g.codepoint == c)
    }
}

/// Packs glyphs left to right into a single row `pixel_size` tall
#[derive(Debug, Clone)]
pub struct AtlasBuilder {
    pixel_size: u32,
    codepoints: CodepointSource,
}

impl AtlasBuilder {
    pub fn new(pixel_size: u32) -> Self {
        Self {
            pixel_size,
            codepoints: CodepointSource::DefaultAscii,
        }
    }

    pub fn codepoints(mut self, codepoints: CodepointSource) -> Self {
        self.codepoints = codepoints;
        self
    }

    fn validate(&self) -> Result<(), AtlasError> {
        if self.pixel_size == 0 {
            return Err(AtlasError::InvalidArgument(
                "pixel size must be positive".into(),
            ));
        }
        if self.codepoints.is_empty() {
            return Err(AtlasError::InvalidArgument(
                "explicit codepoint set is empty".into(),
            ));
        }
        Ok(())
    }

    pub fn build<R: FontRasterizer + ?Sized>(&self, raster: &R) -> Result<FontAtlas, AtlasError> {
        self.validate()?;

        let codepoints = self.codepoints.resolve();
        let units_per_em = raster.units_per_em();
        if units_per_em.is_nan() || units_per_em <= 0.0 {
            return Err(AtlasError::FontParse(format!(
                "invalid units per em: {}",
                units_per_em
            )));
        }
        let scale = self.pixel_size as f32 / units_per_em;
        let height = self.pixel_size;

        // Sizing pass
        let mut width: u32 = 0;
        for &c in codepoints.iter() {
            let advance = round_px(raster.horizontal_metrics(c).advance_width, scale);
            width = width
                .checked_add(advance)
                .ok_or(AtlasError::Allocation { width: u32::MAX, height })?;
        }

        let mut glyphs = Vec::new();
        glyphs
            .try_reserve_exact(codepoints.len())
            .map_err(|_| AtlasError::Allocation { width, height })?;
        let mut bitmap = Bitmap::new(width, height)?;

        // Placement and render pass
        let ascent = (raster.vertical_metrics().ascent * scale).round() as i32;
        let mut x: u32 = 0;
        for &c in codepoints.iter() {
            let h = raster.horizontal_metrics(c);
            let bbox = raster.bitmap_box(c, scale);

            let row = ascent.saturating_add(bbox.y0);
            let col = i32::try_from(x)
                .unwrap_or(i32::MAX)
                .saturating_add((h.left_side_bearing * scale).round() as i32);

            let mut region = bitmap.region_mut(col, row, bbox.width(), bbox.height());
            raster.render_glyph(c, scale, &mut region);
            if region.clipped() > 0 {
                tracing::debug!(
                    "Glyph {:?} clipped by {} pixels at ({}, {})",
                    c,
                    region.clipped(),
                    col,
                    row
                );
            }

            let s1 = x;
            x += round_px(h.advance_width, scale);
            glyphs.push(GlyphRect {
                codepoint: c,
                s1,
                t1: 0,
                s2: x,
                t2: height,
            });
        }

        tracing::debug!(
            "Built {}x{} atlas with {} glyphs",
            width,
            height,
            glyphs.len()
        );

        Ok(FontAtlas { bitmap, glyphs })
    }
}

/// Font units to whole pixels, rounding half away from zero
fn round_px(units: f32, scale: f32) -> u32 {
    (units * scale).round().max(0.0) as u32
}
