// ABOUTME: PNG export and import for atlas coverage bitmaps.
// ABOUTME: Writes single-channel 8-bit grayscale images via the image crate.

use std::io::Cursor;
use std::path::Path;

use image::{GrayImage, ImageFormat};

use crate::atlas::FontAtlas;
use crate::bitmap::Bitmap;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot encode an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel buffer does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32 },
}

fn to_gray_image(bitmap: &Bitmap) -> Result<GrayImage, ExportError> {
    let (width, height) = (bitmap.width(), bitmap.height());
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyImage { width, height });
    }
    GrayImage::from_raw(width, height, bitmap.as_bytes().to_vec())
        .ok_or(ExportError::SizeMismatch { width, height })
}

/// Encode the atlas coverage as a grayscale PNG in memory
pub fn encode_png(atlas: &FontAtlas) -> Result<Vec<u8>, ExportError> {
    let image = to_gray_image(atlas.bitmap())?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Write the atlas coverage to `path` as a grayscale PNG
pub fn save_png(atlas: &FontAtlas, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let image = to_gray_image(atlas.bitmap())?;
    image.save_with_format(path, ImageFormat::Png)?;
    tracing::debug!("Wrote {}x{} atlas to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Decode a PNG into a coverage bitmap, converting colour images to luma
pub fn decode_png(bytes: &[u8]) -> Result<Bitmap, ExportError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_luma8();
    let (width, height) = image.dimensions();
    Bitmap::from_raw(width, height, image.into_raw())
        .ok_or(ExportError::SizeMismatch { width, height })
}

pub fn load_png(path: &Path) -> Result<Bitmap, ExportError> {
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasBuilder;
    use crate::bdf::BdfFont;
    use crate::fonts::bundled_font;
    use atlas_core::CodepointSource;

    fn sample_atlas() -> FontAtlas {
        FontAtlas::from_font_bytes(bundled_font(), 24, CodepointSource::from_text("Hello, atlas!"))
            .unwrap()
    }

    #[test]
    fn test_png_roundtrip_is_lossless() {
        let atlas = sample_atlas();
        let png = encode_png(&atlas).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = decode_png(&png).unwrap();
        assert_eq!(&decoded, atlas.bitmap());
    }

    #[test]
    fn test_save_and_load_file() {
        let atlas = sample_atlas();
        let path = std::env::temp_dir().join("glyph_row_test_atlas.png");

        save_png(&atlas, &path).unwrap();
        let loaded = load_png(&path).unwrap();
        assert_eq!(loaded.as_bytes(), atlas.bitmap().as_bytes());
        assert_eq!((loaded.width(), loaded.height()), (atlas.width(), atlas.height()));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_zero_width_atlas_cannot_be_encoded() {
        // A font whose only glyph has no advance produces a 0-wide atlas.
        let bdf = "STARTFONT 2.1\nSIZE 8 75 75\nFONTBOUNDINGBOX 8 8 0 0\nCHARS 1\n\
                   STARTCHAR nul\nENCODING 0\nDWIDTH 0 0\nBBX 0 0 0 0\nBITMAP\nENDCHAR\nENDFONT\n";
        let font = BdfFont::parse_str(bdf).unwrap();
        let atlas = AtlasBuilder::new(8)
            .codepoints(CodepointSource::Explicit(vec!['\0']))
            .build(&font)
            .unwrap();
        assert_eq!(atlas.width(), 0);

        let err = encode_png(&atlas).unwrap_err();
        assert!(matches!(err, ExportError::EmptyImage { width: 0, height: 8 }));
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_png(b"not a png").unwrap_err();
        assert!(matches!(err, ExportError::Image(_)));
    }
}
