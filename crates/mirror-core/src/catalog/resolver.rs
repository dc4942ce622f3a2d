//! Maps free-text titles from the backend onto catalog entries.

use super::{Book, CatalogEntry, CatalogIndex, Track};
use crate::calibration::CalibrationResult;
use serde::Serialize;
use std::sync::Arc;

/// Quote marks that decorate titles without being part of them.
const DECORATIVE_QUOTES: &[char] = &[
    '《', '》', '〈', '〉', '「', '」', '『', '』', '【', '】', '“', '”', '‘', '’', '«', '»', '"',
    '\'', '`',
];

/// The book and track a result resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub book: Arc<Book>,
    pub track: Arc<Track>,
}

impl Recommendation {
    pub fn book_entry(&self) -> CatalogEntry {
        CatalogEntry::Book(Arc::clone(&self.book))
    }

    pub fn track_entry(&self) -> CatalogEntry {
        CatalogEntry::Track(Arc::clone(&self.track))
    }
}

/// Strips decorative quoting, surrounding whitespace and case.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !DECORATIVE_QUOTES.contains(c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Resolution of backend titles against a [`CatalogIndex`].
///
/// Resolution never fails: when nothing matches, the first entry of the
/// respective list is returned.
pub struct CatalogResolver;

impl CatalogResolver {
    pub fn resolve(result: &CalibrationResult, catalog: &CatalogIndex) -> Recommendation {
        Recommendation {
            book: Self::resolve_book(&result.recommended_book_title, catalog),
            track: Self::resolve_track(&result.recommended_music_title, catalog),
        }
    }

    pub fn resolve_book(title: &str, catalog: &CatalogIndex) -> Arc<Book> {
        let found = find_match(title, catalog.books(), |book| book.title.as_str());
        if found.is_none() {
            tracing::debug!(title, "No book matched, falling back to first catalog entry");
        }
        Arc::clone(found.unwrap_or_else(|| catalog.first_book()))
    }

    pub fn resolve_track(title: &str, catalog: &CatalogIndex) -> Arc<Track> {
        let found = find_match(title, catalog.tracks(), |track| track.title.as_str());
        if found.is_none() {
            tracing::debug!(title, "No track matched, falling back to first catalog entry");
        }
        Arc::clone(found.unwrap_or_else(|| catalog.first_track()))
    }
}

fn find_match<'a, T, F>(title: &str, entries: &'a [Arc<T>], title_of: F) -> Option<&'a Arc<T>>
where
    F: Fn(&T) -> &str,
{
    let wanted = normalize_title(title);
    if wanted.is_empty() {
        return None;
    }

    entries.iter().find(|entry| {
        let candidate = normalize_title(title_of(&***entry));
        !candidate.is_empty() && (wanted.contains(&candidate) || candidate.contains(&wanted))
    })
}
