//! Catalog Cache
//!
//! One slot per catalog type. A slot publishes its snapshot as an
//! `Arc<CacheSnapshot>` that is swapped whole, so readers never observe a
//! half-loaded catalog. Reloads are shared: callers that find a reload
//! already running await that reload instead of starting another
//! pagination loop.
//!
//! `clear` moves the slot to a new generation. A reload only publishes and
//! persists if its slot is still on the generation it started from, so a
//! reload that straddles a clear (or an entry mutation) is discarded.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use shared::models::{CatalogEntry, CatalogEntryCreate, CatalogEntryUpdate, CatalogKind};
use std::sync::Arc;

use super::{CacheSnapshot, LookupIndex, SnapshotStore};
use crate::backend::TaxonomyBackend;
use crate::clock::Clock;
use crate::config::CatalogSettings;
use crate::{ClientError, ClientResult};

/// Pages between progress events during a reload
const PROGRESS_EVERY: u32 = 5;

type ReloadFuture = Shared<BoxFuture<'static, ClientResult<Arc<CacheSnapshot>>>>;

#[derive(Default)]
struct Slot {
    current: RwLock<Arc<CacheSnapshot>>,
    reload: Mutex<ReloadState>,
}

#[derive(Default)]
struct ReloadState {
    /// Bumped by every clear
    generation: u64,
    running: Option<ReloadFuture>,
}

struct Inner {
    backend: Arc<dyn TaxonomyBackend>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    settings: CatalogSettings,
    tags: Slot,
    genres: Slot,
}

/// TTL cache over the tag and genre catalogs
///
/// Cheap to clone; clones share the same slots.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<Inner>,
}

impl CatalogCache {
    pub fn new(
        backend: Arc<dyn TaxonomyBackend>,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                store,
                clock,
                settings,
                tags: Slot::default(),
                genres: Slot::default(),
            }),
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.inner.settings
    }

    // ========== Lifecycle ==========

    /// Adopt persisted snapshots that are still inside the TTL window
    ///
    /// Returns `true` when every catalog was restored. Stale, missing and
    /// unreadable snapshots leave their slot as it is.
    pub fn init_from_storage(&self) -> bool {
        let now = self.inner.clock.now_millis();
        let mut restored_all = true;

        for kind in CatalogKind::ALL {
            match self.inner.store.load(kind) {
                Ok(Some(snapshot)) if snapshot.is_fresh_at(now, self.inner.settings.ttl) => {
                    tracing::debug!(
                        kind = %kind,
                        entries = snapshot.len(),
                        last_updated = snapshot.last_updated,
                        "catalog restored from storage"
                    );
                    *self.inner.slot(kind).current.write() = Arc::new(snapshot);
                }
                Ok(Some(snapshot)) => {
                    tracing::debug!(kind = %kind, last_updated = snapshot.last_updated, "persisted catalog is stale");
                    restored_all = false;
                }
                Ok(None) => restored_all = false,
                Err(e) => {
                    tracing::warn!(kind = %kind, error = %e, "failed to read persisted catalog");
                    restored_all = false;
                }
            }
        }

        restored_all
    }

    /// Return a fresh snapshot, reloading the whole catalog if needed
    ///
    /// A failed reload leaves the previous snapshot in place and returns
    /// [`ClientError::PartialLoadAborted`].
    pub async fn ensure_fresh(&self, kind: CatalogKind) -> ClientResult<Arc<CacheSnapshot>> {
        let slot = self.inner.slot(kind);

        let reload = {
            let current = slot.current.read().clone();
            if self.inner.is_fresh(&current) {
                tracing::trace!(kind = %kind, "catalog cache hit");
                return Ok(current);
            }

            let mut state = slot.reload.lock();
            // A reload may have published between the check above and the lock
            let current = slot.current.read().clone();
            if self.inner.is_fresh(&current) {
                return Ok(current);
            }
            match state.running.as_ref() {
                Some(running) => {
                    tracing::debug!(kind = %kind, "joining catalog reload in flight");
                    running.clone()
                }
                None => {
                    let reload = Inner::spawn_reload(Arc::clone(&self.inner), kind, state.generation);
                    state.running = Some(reload.clone());
                    reload
                }
            }
        };

        reload.await
    }

    /// Refresh tags and genres concurrently
    pub async fn ensure_all(&self) -> ClientResult<(Arc<CacheSnapshot>, Arc<CacheSnapshot>)> {
        futures::try_join!(
            self.ensure_fresh(CatalogKind::Tag),
            self.ensure_fresh(CatalogKind::Genre)
        )
    }

    /// Drop the in-memory and persisted snapshot of `kind`, or of every kind
    ///
    /// A reload already running for a cleared kind is discarded: it neither
    /// publishes nor persists, and the next [`ensure_fresh`](Self::ensure_fresh)
    /// starts a new one. Callers already awaiting it still get its result.
    pub fn clear(&self, kind: Option<CatalogKind>) -> ClientResult<()> {
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => CatalogKind::ALL.to_vec(),
        };

        let mut result = Ok(());
        for kind in kinds {
            let slot = self.inner.slot(kind);
            let mut state = slot.reload.lock();
            state.generation += 1;
            if state.running.take().is_some() {
                tracing::debug!(kind = %kind, "catalog reload in flight discarded");
            }
            *slot.current.write() = Arc::default();
            if let Err(e) = self.inner.store.remove(kind) {
                tracing::warn!(kind = %kind, error = %e, "failed to remove persisted catalog");
                result = Err(e);
            }
            tracing::debug!(kind = %kind, "catalog cleared");
        }
        result
    }

    // ========== Reads ==========

    /// Current snapshot, whatever its age. Never triggers a load.
    pub fn snapshot(&self, kind: CatalogKind) -> Arc<CacheSnapshot> {
        self.inner.slot(kind).current.read().clone()
    }

    pub fn is_fresh(&self, kind: CatalogKind) -> bool {
        self.inner.is_fresh(&self.snapshot(kind))
    }

    /// Lookup view over the current snapshot
    pub fn lookup(&self, kind: CatalogKind) -> LookupIndex {
        LookupIndex::new(kind, self.snapshot(kind), self.inner.settings.locale.clone())
    }

    /// Single lookup by scan; use [`lookup`](Self::lookup) for batches
    pub fn resolve_name(&self, kind: CatalogKind, id: u64) -> String {
        let snapshot = self.snapshot(kind);
        match snapshot.entry(id) {
            Some(entry) => entry.display_name(kind, &self.inner.settings.locale),
            None => kind.placeholder_name(id),
        }
    }

    /// Builds one index for the whole batch
    pub fn resolve_names(&self, kind: CatalogKind, ids: &[u64]) -> Vec<String> {
        self.lookup(kind).resolve_names(ids)
    }

    // ========== Entry mutations ==========

    /// Create an entry; the catalog reloads on next access
    pub async fn create_entry(
        &self,
        kind: CatalogKind,
        request: &CatalogEntryCreate,
    ) -> ClientResult<CatalogEntry> {
        let created = self
            .inner
            .backend
            .create_entry(kind, request)
            .await?
            .into_result("catalog entry")?;
        tracing::info!(target: "audit", action = "create", kind = %kind, id = created.id, "catalog entry created");
        self.invalidate(kind);
        Ok(created)
    }

    /// Update an entry; the catalog reloads on next access
    pub async fn update_entry(
        &self,
        kind: CatalogKind,
        request: &CatalogEntryUpdate,
    ) -> ClientResult<CatalogEntry> {
        let updated = self
            .inner
            .backend
            .update_entry(kind, request)
            .await?
            .into_result("catalog entry")?;
        tracing::info!(target: "audit", action = "update", kind = %kind, id = request.id, "catalog entry updated");
        self.invalidate(kind);
        Ok(updated)
    }

    /// Read one entry straight from the backend
    pub async fn get_entry(&self, kind: CatalogKind, id: u64) -> ClientResult<CatalogEntry> {
        Ok(self
            .inner
            .backend
            .get_entry(kind, id)
            .await?
            .into_result("catalog entry")?)
    }

    fn invalidate(&self, kind: CatalogKind) {
        // Removal failures are already logged; the in-memory slot is empty either way
        let _ = self.clear(Some(kind));
    }
}

impl Inner {
    fn slot(&self, kind: CatalogKind) -> &Slot {
        match kind {
            CatalogKind::Tag => &self.tags,
            CatalogKind::Genre => &self.genres,
        }
    }

    fn is_fresh(&self, snapshot: &CacheSnapshot) -> bool {
        snapshot.is_fresh_at(self.clock.now_millis(), self.settings.ttl)
    }

    fn spawn_reload(inner: Arc<Inner>, kind: CatalogKind, generation: u64) -> ReloadFuture {
        async move { inner.reload(kind, generation).await }
            .boxed()
            .shared()
    }

    /// Fetch the whole catalog, then publish it unless `generation` is outdated
    ///
    /// Publishing and persisting happen under the reload lock, the same lock
    /// `clear` takes, so a cleared slot is never refilled by an older reload.
    async fn reload(&self, kind: CatalogKind, generation: u64) -> ClientResult<Arc<CacheSnapshot>> {
        let started = std::time::Instant::now();
        let fetched = self.fetch_all(kind).await;

        let slot = self.slot(kind);
        let mut state = slot.reload.lock();
        let superseded = state.generation != generation;
        if !superseded {
            state.running = None;
        }
        let entries = fetched?;

        let snapshot = Arc::new(CacheSnapshot::from_entries(
            kind,
            entries,
            &self.settings.locale,
            self.clock.now_millis(),
        ));
        if superseded {
            tracing::debug!(
                kind = %kind,
                entries = snapshot.len(),
                "catalog cleared during reload, result not published"
            );
            return Ok(snapshot);
        }
        *slot.current.write() = Arc::clone(&snapshot);

        if let Err(e) = self.store.save(kind, &snapshot) {
            tracing::warn!(kind = %kind, error = %e, "failed to persist catalog snapshot");
        }
        drop(state);

        tracing::info!(
            kind = %kind,
            entries = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog reloaded"
        );
        Ok(snapshot)
    }

    /// Fetch pages in order until a short page or the page ceiling
    async fn fetch_all(&self, kind: CatalogKind) -> ClientResult<Vec<CatalogEntry>> {
        let page_size = self.settings.page_size;
        let mut entries = Vec::new();

        for page in 1..=self.settings.max_pages {
            let items = match self.fetch_page(kind, page).await {
                Ok(items) => items,
                Err(source) => {
                    tracing::warn!(
                        kind = %kind,
                        page,
                        loaded = entries.len(),
                        error = %source,
                        "catalog reload aborted, keeping previous snapshot"
                    );
                    return Err(ClientError::PartialLoadAborted {
                        kind,
                        page,
                        loaded: entries.len(),
                        source: Box::new(source),
                    });
                }
            };

            let fetched = items.len();
            entries.extend(items);
            if page % PROGRESS_EVERY == 0 {
                tracing::debug!(kind = %kind, page, loaded = entries.len(), "catalog reload progress");
            }
            if fetched < page_size as usize {
                return Ok(entries);
            }
        }

        tracing::warn!(
            kind = %kind,
            max_pages = self.settings.max_pages,
            loaded = entries.len(),
            "catalog page ceiling reached"
        );
        Ok(entries)
    }

    async fn fetch_page(&self, kind: CatalogKind, page: u32) -> ClientResult<Vec<CatalogEntry>> {
        let listing = self
            .backend
            .list_page(kind, page, self.settings.page_size)
            .await?
            .into_result("catalog page")?;
        listing
            .items
            .ok_or_else(|| ClientError::InvalidResponse(format!("{} page {} has no items", kind, page)))
    }
}
