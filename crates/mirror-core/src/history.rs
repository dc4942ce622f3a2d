//! Bounded, most-recent-first record of completed calibrations.

use crate::calibration::CalibrationResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// Default number of sessions kept.
pub const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// One completed calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Unique identifier (UUID format)
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// The text the user submitted.
    pub input_text: String,
    /// The same result the session holds, shared rather than copied.
    pub result: Arc<CalibrationResult>,
}

impl HistoryItem {
    /// Creates an item stamped with a fresh id and the current time.
    pub fn new(input_text: impl Into<String>, result: Arc<CalibrationResult>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            input_text: input_text.into(),
            result,
        }
    }
}

/// Capacity-bounded history; the oldest entry is evicted on overflow.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    items: VecDeque<Arc<HistoryItem>>,
    capacity: NonZeroUsize,
}

impl HistoryStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.get() + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item as the most recent entry.
    pub fn append(&mut self, item: HistoryItem) {
        self.items.push_front(Arc::new(item));
        while self.items.len() > self.capacity.get() {
            if let Some(evicted) = self.items.pop_back() {
                tracing::debug!(id = %evicted.id, "Evicted oldest history entry");
            }
        }
    }

    /// Entries, most recent first.
    pub fn list(&self) -> Vec<Arc<HistoryItem>> {
        self.items.iter().cloned().collect()
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&Arc<HistoryItem>> {
        self.items.front()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
