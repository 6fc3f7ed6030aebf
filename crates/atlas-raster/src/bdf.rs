// ABOUTME: BDF (Bitmap Distribution Format) font parser and rasterizer.
// ABOUTME: Lets bitmap fonts feed the atlas builder, scaled nearest-neighbour.

use std::collections::HashMap;

use crate::bitmap::BitmapRegion;
use crate::rasterizer::{FontRasterizer, GlyphBox, HorizontalMetrics, VerticalMetrics};

/// A parsed BDF font. Its font unit is one native pixel.
#[derive(Debug, Clone)]
pub struct BdfFont {
    /// Font name from FONT property
    pub name: String,
    /// Pixel size from SIZE or PIXEL_SIZE
    pub pixel_size: u32,
    /// Font ascent (from FONT_ASCENT property)
    pub ascent: i32,
    /// Font descent, positive below the baseline (from FONT_DESCENT property)
    pub descent: i32,
    /// Glyph drawn for codepoints the font lacks (from DEFAULT_CHAR property)
    pub default_char: Option<char>,
    pub glyphs: HashMap<char, BdfGlyph>,
}

/// A single glyph in a BDF font
#[derive(Debug, Clone)]
pub struct BdfGlyph {
    /// Character name (e.g., "A", "space", "exclam")
    pub name: String,
    /// Device width - how much to advance cursor horizontally
    pub dwidth_x: i32,
    /// Bounding box width in pixels
    pub width: u32,
    /// Bounding box height in pixels
    pub height: u32,
    /// X offset from origin
    pub offset_x: i32,
    /// Y offset of the box bottom from the baseline (positive = above)
    pub offset_y: i32,
    /// One entry per row, bits left-aligned, (width + 7) / 8 bytes each
    pub bitmap: Vec<Vec<u8>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BdfError {
    #[error("Invalid BDF format: {0}")]
    InvalidFormat(String),
    #[error("Failed to parse number: {0}")]
    ParseNumber(String),
}

fn number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T, BdfError> {
    field
        .parse()
        .map_err(|_| BdfError::ParseNumber(format!("{}: {}", what, field)))
}

/// Largest magnitude accepted for BDF metrics. Keeps derived values such as
/// `offset_y + height` and `ascent + descent` inside `i32`.
const MAX_METRIC: i32 = i16::MAX as i32;

/// Reject metrics outside `-MAX_METRIC..=MAX_METRIC`
fn in_range<const N: usize>(values: [i32; N], what: &str) -> Result<[i32; N], BdfError> {
    match values.iter().find(|v| !(-MAX_METRIC..=MAX_METRIC).contains(*v)) {
        Some(v) => Err(BdfError::InvalidFormat(format!("{} value out of range: {}", what, v))),
        None => Ok(values),
    }
}

/// Parse exactly `N` whitespace-separated numbers
fn numbers<const N: usize>(rest: &str, what: &str) -> Result<[i32; N], BdfError> {
    let mut out = [0; N];
    let mut fields = rest.split_whitespace();
    for slot in out.iter_mut() {
        let field = fields
            .next()
            .ok_or_else(|| BdfError::InvalidFormat(format!("{} needs {} values", what, N)))?;
        *slot = number(field, what)?;
    }
    Ok(out)
}

impl BdfFont {
    /// Parse a BDF font from raw bytes
    pub fn parse(data: &[u8]) -> Result<Self, BdfError> {
        let content = std::str::from_utf8(data)
            .map_err(|e| BdfError::InvalidFormat(format!("Invalid UTF-8: {}", e)))?;
        Self::parse_str(content)
    }

    /// Parse a BDF font from a string
    pub fn parse_str(content: &str) -> Result<Self, BdfError> {
        let mut lines = content.lines();

        let first_line = lines
            .next()
            .ok_or(BdfError::InvalidFormat("Empty file".into()))?;
        if !first_line.starts_with("STARTFONT") {
            return Err(BdfError::InvalidFormat("Missing STARTFONT".into()));
        }

        let mut name = String::new();
        let mut pixel_size = 0u32;
        let mut bbox_height = 0i32;
        let mut bbox_offset_y = 0i32;
        let mut ascent = None;
        let mut descent = None;
        let mut default_char = None;

        for line in lines.by_ref() {
            let line = line.trim();
            if line.starts_with("CHARS ") {
                break;
            }

            if let Some(rest) = line.strip_prefix("FONT ") {
                name = rest.to_string();
            } else if let Some(rest) = line.strip_prefix("SIZE ") {
                pixel_size = numbers::<1>(rest, "SIZE")?[0].max(0) as u32;
            } else if let Some(rest) = line.strip_prefix("PIXEL_SIZE ") {
                pixel_size = number(rest.trim(), "PIXEL_SIZE")?;
            } else if let Some(rest) = line.strip_prefix("FONTBOUNDINGBOX ") {
                let [_, h, _, y] = in_range(numbers::<4>(rest, "FONTBOUNDINGBOX")?, "FONTBOUNDINGBOX")?;
                bbox_height = h;
                bbox_offset_y = y;
            } else if let Some(rest) = line.strip_prefix("FONT_ASCENT ") {
                ascent = Some(in_range(numbers::<1>(rest, "FONT_ASCENT")?, "FONT_ASCENT")?[0]);
            } else if let Some(rest) = line.strip_prefix("FONT_DESCENT ") {
                descent = Some(in_range(numbers::<1>(rest, "FONT_DESCENT")?, "FONT_DESCENT")?[0]);
            } else if let Some(rest) = line.strip_prefix("DEFAULT_CHAR ") {
                default_char = char::from_u32(number(rest.trim(), "DEFAULT_CHAR")?);
            }
        }

        // The box offset is the (negative) distance from baseline to bottom.
        let descent = descent.unwrap_or(-bbox_offset_y);
        let ascent = ascent.unwrap_or(bbox_height - descent);

        let mut glyphs = HashMap::new();
        while let Some(line) = lines.next() {
            let line = line.trim();
            if line == "ENDFONT" {
                break;
            }
            if let Some(glyph_name) = line.strip_prefix("STARTCHAR ") {
                if let Some((c, glyph)) = Self::parse_glyph(glyph_name, &mut lines)? {
                    glyphs.insert(c, glyph);
                }
            }
        }

        Ok(BdfFont {
            name,
            pixel_size,
            ascent,
            descent,
            default_char,
            glyphs,
        })
    }

    fn parse_glyph<'a, I>(name: &str, lines: &mut I) -> Result<Option<(char, BdfGlyph)>, BdfError>
    where
        I: Iterator<Item = &'a str>,
    {
        let mut encoding: Option<char> = None;
        let mut dwidth_x = 0i32;
        let mut bbx = [0i32; 4];
        let mut bitmap = Vec::new();
        let mut in_bitmap = false;

        for line in lines.by_ref() {
            let line = line.trim();

            if line == "ENDCHAR" {
                break;
            }

            if in_bitmap {
                bitmap.push(Self::parse_hex_row(line)?);
            } else if let Some(rest) = line.strip_prefix("ENCODING ") {
                // Negative (Adobe-specific) encodings and non-scalar values never match a char.
                let [enc] = numbers::<1>(rest, "ENCODING")?;
                encoding = u32::try_from(enc).ok().and_then(char::from_u32);
            } else if let Some(rest) = line.strip_prefix("DWIDTH ") {
                dwidth_x = in_range(numbers::<1>(rest, "DWIDTH")?, "DWIDTH")?[0];
            } else if let Some(rest) = line.strip_prefix("BBX ") {
                bbx = in_range(numbers::<4>(rest, "BBX")?, "BBX")?;
            } else if line == "BITMAP" {
                in_bitmap = true;
            }
        }

        let Some(c) = encoding else {
            return Ok(None);
        };
        let [width, height, offset_x, offset_y] = bbx;

        Ok(Some((
            c,
            BdfGlyph {
                name: name.to_string(),
                dwidth_x,
                width: width.max(0) as u32,
                height: height.max(0) as u32,
                offset_x,
                offset_y,
                bitmap,
            },
        )))
    }

    fn parse_hex_row(hex: &str) -> Result<Vec<u8>, BdfError> {
        let hex = hex.trim().as_bytes();
        hex.chunks(2)
            .map(|pair| {
                let digits = std::str::from_utf8(pair)
                    .map_err(|_| BdfError::InvalidFormat("Non-ASCII bitmap row".into()))?;
                let byte = if digits.len() == 1 {
                    u8::from_str_radix(digits, 16).map(|hi| hi << 4)
                } else {
                    u8::from_str_radix(digits, 16)
                };
                byte.map_err(|_| BdfError::InvalidFormat(format!("Invalid hex: {}", digits)))
            })
            .collect()
    }

    /// Glyph for `c`, falling back to DEFAULT_CHAR
    pub fn glyph_or_default(&self, c: char) -> Option<&BdfGlyph> {
        self.glyphs
            .get(&c)
            .or_else(|| self.default_char.and_then(|d| self.glyphs.get(&d)))
    }

    /// Cell height (ascent + descent)
    pub fn cell_height(&self) -> u32 {
        (self.ascent + self.descent).max(0) as u32
    }

    fn lookup(&self, c: char) -> Option<&BdfGlyph> {
        let glyph = self.glyph_or_default(c);
        if glyph.is_none() {
            tracing::warn!("BDF font {:?} has no glyph for {:?}", self.name, c);
        }
        glyph
    }
}

impl BdfGlyph {
    /// Whether the pixel at `col`, `row` (row 0 = top) is inked
    pub fn is_set(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return false;
        }
        let col = col as usize;
        self.bitmap
            .get(row as usize)
            .and_then(|bytes| bytes.get(col / 8))
            .map_or(false, |byte| (byte >> (7 - col % 8)) & 1 == 1)
    }

    fn top(&self) -> i32 {
        self.offset_y + self.height as i32
    }

    fn scaled_box(&self, scale: f32) -> GlyphBox {
        if self.width == 0 || self.height == 0 {
            return GlyphBox::default();
        }
        GlyphBox {
            x0: (self.offset_x as f32 * scale).floor() as i32,
            y0: (-(self.top() as f32 * scale).ceil()) as i32,
            x1: ((self.offset_x + self.width as i32) as f32 * scale).ceil() as i32,
            y1: (-(self.offset_y as f32 * scale).floor()) as i32,
        }
    }
}

impl FontRasterizer for BdfFont {
    fn units_per_em(&self) -> f32 {
        let em = if self.pixel_size > 0 {
            self.pixel_size
        } else {
            self.cell_height()
        };
        em.max(1) as f32
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        VerticalMetrics {
            ascent: self.ascent as f32,
            descent: -self.descent as f32,
            line_gap: 0.0,
        }
    }

    fn horizontal_metrics(&self, c: char) -> HorizontalMetrics {
        match self.lookup(c) {
            Some(glyph) => HorizontalMetrics {
                advance_width: glyph.dwidth_x as f32,
                left_side_bearing: glyph.offset_x as f32,
            },
            None => HorizontalMetrics {
                advance_width: 0.0,
                left_side_bearing: 0.0,
            },
        }
    }

    fn bitmap_box(&self, c: char, scale: f32) -> GlyphBox {
        self.glyph_or_default(c)
            .map(|glyph| glyph.scaled_box(scale))
            .unwrap_or_default()
    }

    fn render_glyph(&self, c: char, scale: f32, dst: &mut BitmapRegion<'_>) {
        let Some(glyph) = self.glyph_or_default(c) else {
            return;
        };
        let bbox = glyph.scaled_box(scale);

        // Sample the source pixel under each destination pixel centre.
        for dy in 0..dst.height() {
            let py = bbox.y0 as f32 + dy as f32 + 0.5;
            let row = ((py / scale).floor() as i32).saturating_add(glyph.top());
            for dx in 0..dst.width() {
                let px = bbox.x0 as f32 + dx as f32 + 0.5;
                let col = ((px / scale).floor() as i32).saturating_sub(glyph.offset_x);
                if glyph.is_set(col, row) {
                    dst.put(dx, dy, 255);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasBuilder;
    use crate::bitmap::Bitmap;
    use atlas_core::CodepointSource;

    const TEST_BDF: &str = r#"STARTFONT 2.1
FONT -Test-Fixed-Medium-R-Normal--13-120-75-75-C-60-ISO10646-1
SIZE 13 75 75
FONTBOUNDINGBOX 6 13 0 -2
STARTPROPERTIES 3
FONT_ASCENT 11
FONT_DESCENT 2
DEFAULT_CHAR 65
ENDPROPERTIES
CHARS 3
STARTCHAR space
ENCODING 32
SWIDTH 480 0
DWIDTH 6 0
BBX 0 0 0 0
BITMAP
ENDCHAR
STARTCHAR A
ENCODING 65
SWIDTH 480 0
DWIDTH 6 0
BBX 5 7 0 0
BITMAP
20
50
88
88
F8
88
88
ENDCHAR
STARTCHAR adobe
ENCODING -1
DWIDTH 6 0
BBX 1 1 0 0
BITMAP
80
ENDCHAR
ENDFONT
"#;

    #[test]
    fn test_parse_bdf() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        assert_eq!(font.pixel_size, 13);
        assert_eq!(font.ascent, 11);
        assert_eq!(font.descent, 2);
        assert_eq!(font.default_char, Some('A'));
        assert_eq!(font.glyphs.len(), 2);

        let a = &font.glyphs[&'A'];
        assert_eq!(a.name, "A");
        assert_eq!((a.width, a.height), (5, 7));
        assert_eq!(a.bitmap.len(), 7);
    }

    #[test]
    fn test_missing_startfont() {
        let err = BdfFont::parse_str("FONT x\n").unwrap_err();
        assert!(matches!(err, BdfError::InvalidFormat(_)));
    }

    #[test]
    fn test_bad_number() {
        let bdf = TEST_BDF.replace("DWIDTH 6 0\nBBX 5", "DWIDTH six 0\nBBX 5");
        let err = BdfFont::parse_str(&bdf).unwrap_err();
        assert!(matches!(err, BdfError::ParseNumber(_)));
    }

    #[test]
    fn test_huge_glyph_offset_rejected() {
        let bdf = TEST_BDF.replace("BBX 5 7 0 0", "BBX 1 2 0 2147483647");
        let err = BdfFont::parse_str(&bdf).unwrap_err();
        assert!(matches!(err, BdfError::InvalidFormat(_)));
    }

    #[test]
    fn test_huge_font_bounding_box_rejected() {
        let bdf = TEST_BDF
            .replace("FONTBOUNDINGBOX 6 13 0 -2", "FONTBOUNDINGBOX 8 8 0 -2147483648")
            .replace("FONT_ASCENT 11\n", "")
            .replace("FONT_DESCENT 2\n", "");
        let err = BdfFont::parse_str(&bdf).unwrap_err();
        assert!(matches!(err, BdfError::InvalidFormat(_)));
    }

    #[test]
    fn test_out_of_range_ascent_rejected() {
        let bdf = TEST_BDF.replace("FONT_ASCENT 11", "FONT_ASCENT 2147483647");
        let err = BdfFont::parse_str(&bdf).unwrap_err();
        assert!(matches!(err, BdfError::InvalidFormat(_)));
    }

    #[test]
    fn test_tiny_scale_does_not_overflow() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        let scale = 1e-30;
        let bbox = font.bitmap_box('A', scale);
        let mut bitmap = Bitmap::new(4, 4).unwrap();
        let mut region = bitmap.region_mut(0, 0, bbox.width(), bbox.height());
        font.render_glyph('A', scale, &mut region);
        assert_eq!(region.clipped(), 0);
        assert!(bitmap.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixels() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        let a = &font.glyphs[&'A'];
        // 0x20 = 00100000 on the top row.
        assert!(a.is_set(2, 0));
        assert!(!a.is_set(0, 0));
        // 0xF8 = 11111000 on row 4.
        assert!(a.is_set(0, 4) && a.is_set(4, 4));
        assert!(!a.is_set(5, 4));
        assert!(!a.is_set(-1, 4));
    }

    #[test]
    fn test_default_char_fallback() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        let missing = font.horizontal_metrics('Q');
        assert_eq!(missing.advance_width, 6.0);
        assert_eq!(font.bitmap_box('Q', 1.0), font.bitmap_box('A', 1.0));
    }

    #[test]
    fn test_native_scale_render() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        let bbox = font.bitmap_box('A', 1.0);
        assert_eq!(bbox, GlyphBox { x0: 0, y0: -7, x1: 5, y1: 0 });

        let mut bitmap = Bitmap::new(5, 7).unwrap();
        let mut region = bitmap.region_mut(0, 0, 5, 7);
        font.render_glyph('A', 1.0, &mut region);
        assert_eq!(bitmap.row(0), Some(&[0, 0, 255, 0, 0][..]));
        assert_eq!(bitmap.row(4), Some(&[255, 255, 255, 255, 255][..]));
    }

    #[test]
    fn test_double_scale_render() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        let bbox = font.bitmap_box('A', 2.0);
        assert_eq!((bbox.width(), bbox.height()), (10, 14));

        let mut bitmap = Bitmap::new(10, 14).unwrap();
        let mut region = bitmap.region_mut(0, 0, 10, 14);
        font.render_glyph('A', 2.0, &mut region);
        assert_eq!(
            bitmap.row(1),
            Some(&[0, 0, 0, 0, 255, 255, 0, 0, 0, 0][..])
        );
        assert_eq!(bitmap.row(9), Some(&[255; 10][..]));
    }

    #[test]
    fn test_bdf_atlas_at_native_size() {
        let font = BdfFont::parse_str(TEST_BDF).unwrap();
        let atlas = AtlasBuilder::new(13)
            .codepoints(CodepointSource::from_text(" A"))
            .build(&font)
            .unwrap();

        assert_eq!(atlas.width(), 12);
        assert_eq!(atlas.height(), 13);
        let a = atlas.glyph('A').unwrap();
        assert_eq!((a.s1, a.s2), (6, 12));

        // Ascent 11, glyph top 7 above the baseline -> first inked row is 4.
        let bitmap = atlas.bitmap();
        assert_eq!(bitmap.get(6 + 2, 4), Some(255));
        assert_eq!(bitmap.get(6 + 2, 3), Some(0));
        assert_eq!(bitmap.row(8).map(|r| &r[6..11]), Some(&[255u8; 5][..]));
    }
}
