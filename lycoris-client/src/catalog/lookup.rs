use shared::models::{CatalogEntry, CatalogKind, CatalogOption};
use std::collections::HashMap;
use std::sync::Arc;

use super::CacheSnapshot;

/// Read view over one catalog snapshot
///
/// Holds the same `Arc` the cache published, so it never drifts from the
/// snapshot it was built from. Unknown ids resolve to the kind's
/// placeholder name. When the backend lists an id twice, the first
/// occurrence wins, the same entry [`CacheSnapshot::entry`] finds.
#[derive(Debug, Clone)]
pub struct LookupIndex {
    kind: CatalogKind,
    locale: String,
    snapshot: Arc<CacheSnapshot>,
    by_id: HashMap<u64, usize>,
}

impl LookupIndex {
    pub fn new(kind: CatalogKind, snapshot: Arc<CacheSnapshot>, locale: impl Into<String>) -> Self {
        let mut by_id = HashMap::with_capacity(snapshot.len());
        for (i, entry) in snapshot.entries.iter().enumerate() {
            by_id.entry(entry.id).or_insert(i);
        }
        Self {
            kind,
            locale: locale.into(),
            snapshot,
            by_id,
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn snapshot(&self) -> &Arc<CacheSnapshot> {
        &self.snapshot
    }

    pub fn entry(&self, id: u64) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&i| &self.snapshot.entries[i])
    }

    pub fn options(&self) -> &[CatalogOption] {
        &self.snapshot.options
    }

    pub fn resolve_name(&self, id: u64) -> String {
        match self.entry(id) {
            Some(entry) => entry.display_name(self.kind, &self.locale),
            None => self.kind.placeholder_name(id),
        }
    }

    /// One name per input id, in input order
    pub fn resolve_names(&self, ids: &[u64]) -> Vec<String> {
        ids.iter().map(|&id| self.resolve_name(id)).collect()
    }
}
