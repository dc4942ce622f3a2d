//! Catalog entry types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A recommendable book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Canonical title, possibly wrapped in decorative quotes (`《…》`).
    pub title: String,
    pub author: String,
    /// One-line pitch shown next to the title.
    #[serde(default)]
    pub description: String,
}

/// A recommendable, playable track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Playable resource reference.
    pub url: String,
    /// Short label describing what the track is for.
    #[serde(default)]
    pub category: String,
}

/// Either kind of catalog entry, shared by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Book(Arc<Book>),
    Track(Arc<Track>),
}

impl CatalogEntry {
    pub fn title(&self) -> &str {
        match self {
            Self::Book(book) => &book.title,
            Self::Track(track) => &track.title,
        }
    }

    /// The playable resource, for tracks.
    pub fn resource_ref(&self) -> Option<&str> {
        match self {
            Self::Book(_) => None,
            Self::Track(track) => Some(&track.url),
        }
    }
}
