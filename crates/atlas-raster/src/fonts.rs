// ABOUTME: Embedded font data for the bundled font.
// ABOUTME: Compiled into the binary so an atlas can be built with no font on disk.

static DEJAVU_SANS_MONO: &[u8] =
    include_bytes!("../../../assets/fonts/dejavu-sans-mono/DejaVuSansMono.ttf");

/// DejaVu Sans Mono, used when no font path is configured
pub fn bundled_font() -> &'static [u8] {
    DEJAVU_SANS_MONO
}
