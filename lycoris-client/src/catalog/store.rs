// lycoris-client/src/catalog/store.rs
// 快照存储 - 支持 JSON 文件存储和内存存储

use parking_lot::Mutex;
use shared::models::CatalogKind;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::CacheSnapshot;
use crate::{ClientError, ClientResult};

/// 存储键
pub fn storage_key(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Tag => "kira-taxonomy-tags",
        CatalogKind::Genre => "kira-taxonomy-genres",
    }
}

/// Durable home of catalog snapshots, one slot per catalog type
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing was ever saved for `kind`
    fn load(&self, kind: CatalogKind) -> ClientResult<Option<CacheSnapshot>>;

    fn save(&self, kind: CatalogKind, snapshot: &CacheSnapshot) -> ClientResult<()>;

    /// Removing an absent slot is not an error
    fn remove(&self, kind: CatalogKind) -> ClientResult<()>;
}

/// 文件快照存储 (每个分类一个 JSON 文件)
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// 创建文件存储
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 确保目录存在
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// 获取文件路径
    pub fn path_for(&self, kind: CatalogKind) -> PathBuf {
        self.dir.join(format!("{}.json", storage_key(kind)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, kind: CatalogKind) -> ClientResult<Option<CacheSnapshot>> {
        let path = self.path_for(kind);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|e| storage_error("read", &path, e))?;
        let snapshot = serde_json::from_str(&json)?;
        Ok(Some(snapshot))
    }

    fn save(&self, kind: CatalogKind, snapshot: &CacheSnapshot) -> ClientResult<()> {
        let path = self.path_for(kind);
        self.ensure_dir()
            .map_err(|e| storage_error("create dir for", &path, e))?;
        let json = serde_json::to_string(snapshot)?;
        fs::write(&path, json).map_err(|e| storage_error("write", &path, e))
    }

    fn remove(&self, kind: CatalogKind) -> ClientResult<()> {
        let path = self.path_for(kind);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| storage_error("remove", &path, e))?;
        }
        Ok(())
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> ClientError {
    ClientError::Storage(format!("{} {}: {}", action, path.display(), e))
}

/// 内存快照存储
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slots: Mutex<HashMap<CatalogKind, CacheSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: CatalogKind) -> bool {
        self.slots.lock().contains_key(&kind)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, kind: CatalogKind) -> ClientResult<Option<CacheSnapshot>> {
        Ok(self.slots.lock().get(&kind).cloned())
    }

    fn save(&self, kind: CatalogKind, snapshot: &CacheSnapshot) -> ClientResult<()> {
        self.slots.lock().insert(kind, snapshot.clone());
        Ok(())
    }

    fn remove(&self, kind: CatalogKind) -> ClientResult<()> {
        self.slots.lock().remove(&kind);
        Ok(())
    }
}
