//! Taxonomy catalogs (tags, genres)
//!
//! [`CatalogCache`] pages the complete catalog out of the backend, keeps it
//! for a TTL, and mirrors it to a [`SnapshotStore`]. [`LookupIndex`] turns a
//! snapshot into names and options for display.

mod cache;
mod lookup;
mod store;

pub use cache::CatalogCache;
pub use lookup::LookupIndex;
pub use store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, storage_key};

use serde::{Deserialize, Serialize};
use shared::models::{CatalogEntry, CatalogKind, CatalogOption};
use std::time::Duration;

use crate::clock::duration_millis;

/// Complete materialization of one catalog
///
/// Persisted as-is: `{ "entries": [...], "options": [...], "lastUpdated": ms }`.
/// `last_updated == 0` means the snapshot was never loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub entries: Vec<CatalogEntry>,
    pub options: Vec<CatalogOption>,
    pub last_updated: i64,
}

impl CacheSnapshot {
    /// Build a snapshot and its option list from a full listing
    pub fn from_entries(
        kind: CatalogKind,
        entries: Vec<CatalogEntry>,
        locale: &str,
        last_updated: i64,
    ) -> Self {
        let options = entries
            .iter()
            .map(|entry| CatalogOption {
                label: entry.display_name(kind, locale),
                value: entry.id,
            })
            .collect();
        Self {
            entries,
            options,
            last_updated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First entry carrying `id`, by linear scan
    pub fn entry(&self, id: u64) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Non-empty and younger than `ttl` at `now`
    pub fn is_fresh_at(&self, now_millis: i64, ttl: Duration) -> bool {
        !self.is_empty() && now_millis.saturating_sub(self.last_updated) < duration_millis(ttl)
    }
}
