//! Playlist data
//!
//! Immutable ordered sequence of media references, fixed for the process
//! lifetime. Length is at least 1 by construction, so index arithmetic
//! never needs an emptiness check.

use crate::error::{Error, Result};

/// A single media reference (file path or URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem(String);

impl MediaItem {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable ordered playlist, length >= 1
#[derive(Debug, Clone)]
pub struct Playlist {
    items: Vec<MediaItem>,
}

impl Playlist {
    /// Create a playlist. Rejects empty input.
    pub fn new(items: Vec<MediaItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::Config("playlist must not be empty".to_string()));
        }
        Ok(Self { items })
    }

    /// Create a playlist from reference strings
    pub fn from_strings<I, S>(references: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(references.into_iter().map(MediaItem::new).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`. Callers only hold indices produced by this
    /// playlist, so `index` is always in range.
    pub fn item(&self, index: usize) -> &MediaItem {
        &self.items[index]
    }

    /// Index following `index`, wrapping at the end. A single-entry
    /// playlist wraps to itself.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_playlist_rejected() {
        assert!(Playlist::new(Vec::new()).is_err());
        assert!(Playlist::from_strings(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_next_index_wraps() {
        let playlist = Playlist::from_strings(["a.mp4", "b.mp4", "c.mp4"]).unwrap();
        assert_eq!(playlist.next_index(0), 1);
        assert_eq!(playlist.next_index(1), 2);
        assert_eq!(playlist.next_index(2), 0);
    }

    #[test]
    fn test_single_entry_wraps_to_self() {
        let playlist = Playlist::from_strings(["solo.mp4"]).unwrap();
        assert_eq!(playlist.next_index(0), 0);
    }

    #[test]
    fn test_item_access() {
        let playlist = Playlist::from_strings(["a.mp4", "b.mp4"]).unwrap();
        assert_eq!(playlist.item(1).as_str(), "b.mp4");
        assert_eq!(playlist.len(), 2);
    }
}
