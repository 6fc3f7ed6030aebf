// ABOUTME: Font rasterizer seam used by the atlas builder.
// ABOUTME: Provides metrics in font units and renders coverage into bitmap regions.

use fontdue::{Font, FontSettings};

use crate::atlas::AtlasError;
use crate::bitmap::BitmapRegion;

/// Font-wide vertical metrics, in font units (y up, descent negative)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// Per-glyph horizontal metrics, in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalMetrics {
    pub advance_width: f32,
    pub left_side_bearing: f32,
}

/// Pixel-space ink box relative to the glyph origin on the baseline.
/// y grows downward, so `y0` is negative for ink above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl GlyphBox {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0).max(0) as u32
    }
}

/// Everything the atlas builder needs from a parsed font
pub trait FontRasterizer {
    fn units_per_em(&self) -> f32;

    fn vertical_metrics(&self) -> VerticalMetrics;

    fn horizontal_metrics(&self, c: char) -> HorizontalMetrics;

    /// Ink box of `c` at `scale` pixels per font unit
    fn bitmap_box(&self, c: char, scale: f32) -> GlyphBox;

    /// Draw the coverage of `c` at `scale` into `dst`, whose size matches
    /// [`FontRasterizer::bitmap_box`].
    fn render_glyph(&self, c: char, scale: f32, dst: &mut BitmapRegion<'_>);
}

/// TrueType/OpenType rasterizer backed by fontdue
pub struct FontdueRasterizer {
    font: Font,
}

impl FontdueRasterizer {
    pub fn from_bytes(font_data: &[u8]) -> Result<Self, AtlasError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| AtlasError::FontParse(e.to_string()))?;
        Ok(Self { font })
    }

    fn px(&self, scale: f32) -> f32 {
        scale * self.font.units_per_em()
    }
}

impl FontRasterizer for FontdueRasterizer {
    fn units_per_em(&self) -> f32 {
        self.font.units_per_em()
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        // At px == units_per_em fontdue's scale factor is 1, so these are font units.
        match self.font.horizontal_line_metrics(self.font.units_per_em()) {
            Some(m) => VerticalMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
            },
            None => {
                let em = self.font.units_per_em();
                tracing::warn!("Font has no horizontal line metrics, estimating from em size");
                VerticalMetrics {
                    ascent: em * 0.8,
                    descent: em * -0.2,
                    line_gap: 0.0,
                }
            }
        }
    }

    fn horizontal_metrics(&self, c: char) -> HorizontalMetrics {
        let metrics = self.font.metrics(c, self.font.units_per_em());
        HorizontalMetrics {
            advance_width: metrics.advance_width,
            left_side_bearing: metrics.bounds.xmin,
        }
    }

    fn bitmap_box(&self, c: char, scale: f32) -> GlyphBox {
        let metrics = self.font.metrics(c, self.px(scale));
        let top = metrics.ymin + metrics.height as i32;
        GlyphBox {
            x0: metrics.xmin,
            y0: -top,
            x1: metrics.xmin + metrics.width as i32,
            y1: -metrics.ymin,
        }
    }

    fn render_glyph(&self, c: char, scale: f32, dst: &mut BitmapRegion<'_>) {
        let (metrics, coverage) = self.font.rasterize(c, self.px(scale));
        dst.blit(&coverage, metrics.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::fonts::bundled_font;

    #[test]
    fn test_invalid_font_data() {
        let err = FontdueRasterizer::from_bytes(b"definitely not a font").err().unwrap();
        assert!(matches!(err, AtlasError::FontParse(_)));
    }

    #[test]
    fn test_bundled_font_metrics() {
        let raster = FontdueRasterizer::from_bytes(bundled_font()).unwrap();
        assert!(raster.units_per_em() > 0.0);

        let v = raster.vertical_metrics();
        assert!(v.ascent > 0.0);
        assert!(v.descent < 0.0);

        // Monospace: every printable ASCII glyph shares one advance.
        let a = raster.horizontal_metrics('A');
        let i = raster.horizontal_metrics('i');
        assert!(a.advance_width > 0.0);
        assert_eq!(a.advance_width, i.advance_width);
    }

    #[test]
    fn test_space_has_empty_box() {
        let raster = FontdueRasterizer::from_bytes(bundled_font()).unwrap();
        let scale = 32.0 / raster.units_per_em();
        let bbox = raster.bitmap_box(' ', scale);
        assert_eq!(bbox.width(), 0);
        assert_eq!(bbox.height(), 0);
    }

    #[test]
    fn test_box_matches_rendered_coverage() {
        let raster = FontdueRasterizer::from_bytes(bundled_font()).unwrap();
        let scale = 48.0 / raster.units_per_em();
        let bbox = raster.bitmap_box('H', scale);
        assert!(bbox.y0 < 0, "capital letters sit above the baseline");
        assert!(bbox.width() > 0 && bbox.height() > 0);

        let mut bitmap = Bitmap::new(bbox.width(), bbox.height()).unwrap();
        let mut region = bitmap.region_mut(0, 0, bbox.width(), bbox.height());
        raster.render_glyph('H', scale, &mut region);
        assert_eq!(region.clipped(), 0);
        assert!(bitmap.as_bytes().iter().any(|&b| b > 0));
    }
}
