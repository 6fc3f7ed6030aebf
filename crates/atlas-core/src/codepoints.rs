// ABOUTME: Selection of the codepoints packed into an atlas.
// ABOUTME: Either an explicit ordered list or the printable ASCII range.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Printable ASCII, space through tilde (95 codepoints)
pub const DEFAULT_ASCII: RangeInclusive<char> = ' '..='~';

/// Which codepoints to pack, in order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodepointSource {
    /// Caller-supplied order, duplicates included
    Explicit(Vec<char>),
    /// 32..=126 ascending
    #[default]
    DefaultAscii,
}

impl CodepointSource {
    /// Every char of `text`, in order
    pub fn from_text(text: &str) -> Self {
        Self::Explicit(text.chars().collect())
    }

    /// Materialize the codepoint sequence. Borrows explicit lists.
    pub fn resolve(&self) -> Cow<'_, [char]> {
        match self {
            Self::Explicit(chars) => Cow::Borrowed(chars.as_slice()),
            Self::DefaultAscii => Cow::Owned(DEFAULT_ASCII.collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Explicit(chars) => chars.len(),
            Self::DefaultAscii => DEFAULT_ASCII.count(),
        }
    }

    /// True only for an explicit list with no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<char>> for CodepointSource {
    fn from(chars: Vec<char>) -> Self {
        Self::Explicit(chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ascii_range() {
        let resolved = CodepointSource::DefaultAscii.resolve();
        assert_eq!(resolved.len(), 95);
        for (i, c) in resolved.iter().enumerate() {
            assert_eq!(*c as u32, 32 + i as u32);
        }
        assert_eq!(CodepointSource::DefaultAscii.len(), 95);
    }

    #[test]
    fn test_explicit_keeps_order_and_duplicates() {
        let source = CodepointSource::from_text("baab");
        assert_eq!(&*source.resolve(), &['b', 'a', 'a', 'b']);
        assert!(matches!(source.resolve(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_is_empty() {
        assert!(CodepointSource::Explicit(Vec::new()).is_empty());
        assert!(!CodepointSource::DefaultAscii.is_empty());
    }
}
