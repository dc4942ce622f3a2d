//! Book and track catalogs.
//!
//! # Module Structure
//!
//! - `model`: Entry types (`Book`, `Track`, `CatalogEntry`)
//! - `resolver`: Free-text title resolution (`CatalogResolver`, `Recommendation`)
//!
//! The catalog contents live outside this crate; `CatalogIndex` only fixes
//! their shape and guarantees both lists are non-empty.

mod model;
mod resolver;

pub use model::{Book, CatalogEntry, Track};
pub use resolver::{CatalogResolver, Recommendation, normalize_title};

use crate::error::{MirrorError, Result};
use std::sync::Arc;

/// Immutable lookup structure over the two fixed entity lists.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    version: u32,
    books: Vec<Arc<Book>>,
    tracks: Vec<Arc<Track>>,
}

impl CatalogIndex {
    /// Builds an index.
    ///
    /// # Errors
    ///
    /// Returns a config error if either list is empty: resolution falls back
    /// to the first entry of each list, so both must have one.
    pub fn new(version: u32, books: Vec<Book>, tracks: Vec<Track>) -> Result<Self> {
        if books.is_empty() {
            return Err(MirrorError::config("book catalog is empty"));
        }
        if tracks.is_empty() {
            return Err(MirrorError::config("track catalog is empty"));
        }

        Ok(Self {
            version,
            books: books.into_iter().map(Arc::new).collect(),
            tracks: tracks.into_iter().map(Arc::new).collect(),
        })
    }

    /// Catalog data version.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn books(&self) -> &[Arc<Book>] {
        &self.books
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    /// The fallback book (index 0).
    pub fn first_book(&self) -> &Arc<Book> {
        &self.books[0]
    }

    /// The fallback track (index 0).
    pub fn first_track(&self) -> &Arc<Track> {
        &self.tracks[0]
    }

    /// Looks up a track by its exact title.
    pub fn track_by_title(&self, title: &str) -> Option<&Arc<Track>> {
        self.tracks.iter().find(|track| track.title == title)
    }
}
