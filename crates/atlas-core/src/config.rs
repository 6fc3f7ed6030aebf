// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves atlas build settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::CodepointSource;

/// Which glyph to preview after the atlas is built, and at what size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub codepoint: char,
    /// On-screen glyph height in pixels
    pub size: f32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            codepoint: 'A',
            size: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TTF/OTF or BDF font file. The bundled font is used when unset.
    pub font_path: Option<PathBuf>,

    /// Atlas row height in pixels
    pub pixel_size: u32,

    pub codepoints: CodepointSource,

    /// Where the PNG atlas is written
    pub output: PathBuf,

    pub preview: PreviewSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_path: None,
            pixel_size: 64,
            codepoints: CodepointSource::default(),
            output: PathBuf::from("out.png"),
            preview: PreviewSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl Config {
    /// Get the default config file path (~/.config/glyph-row/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glyph-row").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`. A missing file gives the defaults silently,
    /// an unreadable or invalid one gives the defaults with a warning.
    pub fn load_or_default_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
