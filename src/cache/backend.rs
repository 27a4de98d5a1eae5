//! Cache backend implementations.

use super::key::{CacheKey, CacheKind};
use super::CacheError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Raw byte storage addressed by [`CacheKey`].
///
/// Backends know nothing about artifact validity; that is the
/// [`CacheStore`](super::CacheStore)'s job.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` when no entry exists.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;
    /// Replace the entry. Readers see either the old or the new bytes, never a mix.
    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError>;
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheError>;
    fn name(&self) -> &'static str;
}

/// One file per entry under a root directory.
///
/// Individual kinds can be redirected to their own directory, e.g. generated
/// images kept with the other static assets.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
    kind_dirs: HashMap<CacheKind, PathBuf>,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            kind_dirs: HashMap::new(),
        }
    }

    pub fn with_kind_dir(mut self, kind: CacheKind, dir: impl Into<PathBuf>) -> Self {
        self.kind_dirs.insert(kind, dir.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, kind: CacheKind) -> &Path {
        self.kind_dirs.get(&kind).unwrap_or(&self.root)
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir_for(key.kind).join(key.file_name())
    }
}

#[async_trait]
impl CacheBackend for FileCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        run_blocking(move || match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io("read", path, e)),
        })
        .await
    }

    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let bytes = value.to_vec();
        run_blocking(move || write_atomic(&path, &bytes)).await
    }

    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let path = self.path_for(key);
        run_blocking(move || match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io("stat", path, e)),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, CacheError>
where
    F: FnOnce() -> Result<T, CacheError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CacheError::Task(e.to_string()))?
}

/// Write to a temporary file in the target directory, fsync, then rename over
/// `path`. The temporary file is removed if any step fails.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| CacheError::io("create directory", &dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir)
        .map_err(|e| CacheError::io("create temp file in", &dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| CacheError::io("write temp file for", path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CacheError::io("sync temp file for", path, e))?;
    temp.persist(path)
        .map_err(|e| CacheError::io("rename into", path, e.error))?;
    Ok(())
}

/// In-process backend, mostly for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<CacheKey, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite an entry directly, bypassing any validation.
    pub fn insert_raw(&self, key: CacheKey, bytes: impl Into<Vec<u8>>) {
        self.write().insert(key, bytes.into());
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Vec<u8>>> {
        self.entries.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Vec<u8>>> {
        self.entries.write().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.read().get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError> {
        self.write().insert(key.clone(), value.to_vec());
        Ok(())
    }

    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.read().contains_key(key))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
