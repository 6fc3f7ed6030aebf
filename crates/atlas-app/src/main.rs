// ABOUTME: Main application entry point.
// ABOUTME: Loads a font, builds its glyph atlas, writes the PNG and reports a preview quad.

use std::path::Path;

use anyhow::{Context, Result};

use atlas_core::Config;
use atlas_raster::{
    bundled_font, save_png, AtlasBuilder, BdfFont, FontAtlas, FontdueRasterizer, GlyphQuad,
};

fn is_bdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bdf"))
}

fn build_atlas(config: &Config) -> Result<FontAtlas> {
    let builder = AtlasBuilder::new(config.pixel_size).codepoints(config.codepoints.clone());

    let Some(path) = &config.font_path else {
        tracing::info!("Using bundled font at {}px", config.pixel_size);
        return Ok(builder.build(&FontdueRasterizer::from_bytes(bundled_font())?)?);
    };

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font file {}", path.display()))?;
    tracing::info!("Loaded {} ({} bytes) at {}px", path.display(), data.len(), config.pixel_size);

    let atlas = if is_bdf(path) {
        let font = BdfFont::parse(&data)?;
        builder.build(&font)?
    } else {
        builder.build(&FontdueRasterizer::from_bytes(&data)?)?
    };
    Ok(atlas)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting glyph-row");

    let config = Config::load_or_default();
    let atlas = build_atlas(&config)?;
    tracing::info!(
        "Built {}x{} atlas with {} glyphs",
        atlas.width(),
        atlas.height(),
        atlas.glyphs().len()
    );

    save_png(&atlas, &config.output)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    tracing::info!("Wrote {}", config.output.display());

    let preview = config.preview.codepoint;
    match atlas.glyph(preview) {
        Some(glyph) => {
            tracing::debug!(
                "cp({}) s1={},t1={},s2={},t2={}",
                glyph.codepoint,
                glyph.s1,
                glyph.t1,
                glyph.s2,
                glyph.t2
            );
            let quad = GlyphQuad::for_glyph(glyph, &atlas, config.preview.size);
            tracing::info!("Preview {:?}: src={:?} dst={:?}", preview, quad.src, quad.dst);
        }
        None => tracing::warn!("Preview glyph {:?} is not in the atlas", preview),
    }

    Ok(())
}
