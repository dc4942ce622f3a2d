//! Catalog loading.
//!
//! The built-in catalog is compiled into the binary. A TOML file with the
//! same layout can replace it:
//!
//! ```toml
//! version = 2
//!
//! [[books]]
//! title = "《当下的力量》"
//! author = "埃克哈特·托利"
//! description = "进入意识现场的必经之路"
//!
//! [[tracks]]
//! title = "Alpha Wave Focus"
//! url = "https://example.com/alpha.mp3"
//! category = "深度专注"
//! ```

use mirror_core::catalog::{Book, CatalogIndex, Track};
use mirror_core::{MirrorError, Result};
use serde::Deserialize;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

#[derive(Deserialize)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    books: Vec<Book>,
    #[serde(default)]
    tracks: Vec<Track>,
}

/// Loads catalogs into an immutable [`CatalogIndex`].
pub struct CatalogRepository;

impl CatalogRepository {
    /// The catalog shipped with the application.
    pub fn builtin() -> Result<CatalogIndex> {
        Self::parse(BUILTIN_CATALOG, "built-in catalog")
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// IO errors when the file cannot be read; config errors when it does
    /// not parse or either list is empty.
    pub fn load_file(path: &Path) -> Result<CatalogIndex> {
        let content = std::fs::read_to_string(path)?;
        let index = Self::parse(&content, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            version = index.version(),
            "Loaded catalog override"
        );
        Ok(index)
    }

    /// Loads `path` when given, the built-in catalog otherwise.
    pub fn load(path: Option<&Path>) -> Result<CatalogIndex> {
        match path {
            Some(path) => Self::load_file(path),
            None => Self::builtin(),
        }
    }

    fn parse(content: &str, origin: &str) -> Result<CatalogIndex> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| MirrorError::config(format!("Invalid catalog in {origin}: {e}")))?;
        CatalogIndex::new(file.version, file.books, file.tracks)
    }
}
