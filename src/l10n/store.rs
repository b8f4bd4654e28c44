//! Persistence collaborators: phrase cache snapshots and translated exports
//!
//! Snapshots are flat `phrase -> translation` maps, one per target channel.
//! Only resolved entries are ever saved (see [`PhraseCache::snapshot`]), so a
//! run that fails part way never persists a pending phrase as if translated.
//!
//! [`PhraseCache::snapshot`]: crate::l10n::cache::PhraseCache::snapshot

use crate::catalog::Product;
use crate::l10n::error::{L10nError, L10nResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Snapshot key for a target channel, e.g. "UK" → "uk"
pub fn cache_key(channel_tag: &str) -> String {
    channel_tag.trim().to_lowercase()
}

fn check_key(key: &str) -> L10nResult<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(L10nError::StoreError(format!("invalid cache key `{}`", key)));
    }
    Ok(())
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the snapshot for `key`; a snapshot that does not exist yet is empty
    async fn load(&self, key: &str) -> L10nResult<HashMap<String, String>>;

    async fn save(&self, key: &str, snapshot: &HashMap<String, String>) -> L10nResult<()>;
}

/// Snapshots as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl CacheStore for JsonFileStore {
    async fn load(&self, key: &str) -> L10nResult<HashMap<String, String>> {
        check_key(key)?;
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: HashMap<String, String> = serde_json::from_slice(&bytes)?;
                debug!(path = %path.display(), entries = snapshot.len(), "Loaded cache snapshot");
                Ok(snapshot)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, key: &str, snapshot: &HashMap<String, String>) -> L10nResult<()> {
        check_key(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);

        // Write beside the target and rename so a crash never leaves half a snapshot
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), entries = snapshot.len(), "Saved cache snapshot");
        Ok(())
    }
}

/// In-process store, mostly for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn load(&self, key: &str) -> L10nResult<HashMap<String, String>> {
        check_key(key)?;
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| L10nError::StoreError("memory store lock poisoned".to_string()))?;
        Ok(snapshots.get(key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: &str, snapshot: &HashMap<String, String>) -> L10nResult<()> {
        check_key(key)?;
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| L10nError::StoreError("memory store lock poisoned".to_string()))?;
        snapshots.insert(key.to_string(), snapshot.clone());
        Ok(())
    }
}

/// Destination for translated products
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn export(&self, products: &[Product], destination: &str) -> L10nResult<()>;
}

/// Writes translated products as pretty JSON to `<dir>/<destination>.json`
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ExportSink for JsonFileSink {
    async fn export(&self, products: &[Product], destination: &str) -> L10nResult<()> {
        check_key(destination)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.json", destination));
        tokio::fs::write(&path, serde_json::to_vec_pretty(products)?).await?;
        debug!(path = %path.display(), products = products.len(), "Exported products");
        Ok(())
    }
}
