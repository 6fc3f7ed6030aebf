// ABOUTME: Shared types and configuration for glyph-row.
// ABOUTME: Defines codepoint selection and config file handling.

pub mod codepoints;
pub mod config;

pub use codepoints::{CodepointSource, DEFAULT_ASCII};
pub use config::{Config, ConfigError, PreviewSettings};
