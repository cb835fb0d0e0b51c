//! In-memory image cache with a durable write-through.
//!
//! Reads are served from memory only. A report saved in this session is
//! readable immediately; images from earlier sessions become readable once
//! [`ImageCache::preload`] has copied them in from the blob store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use dermadetect_blob::{BlobError, BlobStore};

const IMAGE_PREFIX: &str = "images/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Preloading,
    Ready,
}

impl CacheState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CacheState::Preloading,
            2 => CacheState::Ready,
            _ => CacheState::Uninitialized,
        }
    }
}

pub struct ImageCache {
    memory: RwLock<HashMap<String, String>>,
    state: AtomicU8,
    blob: Arc<dyn BlobStore>,
}

impl ImageCache {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            state: AtomicU8::new(CacheState::Uninitialized as u8),
            blob,
        }
    }

    pub fn state(&self) -> CacheState {
        CacheState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Look up an image by report id. Memory only; never touches disk.
    pub fn read(&self, id: &str) -> Option<String> {
        self.memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Store an image. The memory entry is visible as soon as this is called;
    /// a failed durable write is logged and otherwise ignored.
    pub async fn save(&self, id: &str, payload: String) {
        let bytes = payload.clone().into_bytes();
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), payload);

        let blob = Arc::clone(&self.blob);
        let key = format!("{}{}", IMAGE_PREFIX, id);
        let res = tokio::task::spawn_blocking(move || blob.put(&key, &bytes)).await;
        match res {
            Ok(Ok(())) => debug!(id, "image persisted"),
            Ok(Err(e)) => warn!(id, "image not persisted: {}", e),
            Err(e) => warn!(id, "image persist task failed: {}", e),
        }
    }

    /// Copy every durable image into memory. Entries already present are kept,
    /// so an image saved earlier in this session is never replaced by an
    /// older copy. Failures are logged and leave the cache usable.
    pub async fn preload(&self) {
        if self
            .state
            .compare_exchange(
                CacheState::Uninitialized as u8,
                CacheState::Preloading as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return;
        }

        let blob = Arc::clone(&self.blob);
        let loaded = tokio::task::spawn_blocking(move || load_all(blob.as_ref())).await;

        match loaded {
            Ok(Ok(images)) => {
                let count = images.len();
                let mut memory = self.memory.write().unwrap_or_else(PoisonError::into_inner);
                for (id, payload) in images {
                    memory.entry(id).or_insert(payload);
                }
                info!(count, "image cache preloaded");
            }
            Ok(Err(e)) => warn!("image preload failed: {}", e),
            Err(e) => warn!("image preload task failed: {}", e),
        }

        self.state.store(CacheState::Ready as u8, Ordering::Release);
    }

    /// Run [`preload`](Self::preload) in the background.
    pub fn spawn_preload(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.preload().await })
    }
}

fn load_all(blob: &dyn BlobStore) -> Result<Vec<(String, String)>, BlobError> {
    let mut images = Vec::new();
    for meta in blob.list(IMAGE_PREFIX)? {
        let Some(id) = meta.key.strip_prefix(IMAGE_PREFIX) else {
            continue;
        };
        match blob.get(&meta.key) {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(payload) => images.push((id.to_string(), payload)),
                Err(_) => warn!(key = %meta.key, "skipping non-utf8 image"),
            },
            Ok(None) => continue,
            Err(e) => warn!(key = %meta.key, "skipping unreadable image: {}", e),
        }
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermadetect_blob::{BlobMeta, FileStore};

    struct BrokenStore;

    impl BlobStore for BrokenStore {
        fn put(&self, _key: &str, _data: &[u8]) -> Result<(), BlobError> {
            Err(BlobError::Io("disk full".into()))
        }
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BlobError> {
            Err(BlobError::Io("disk gone".into()))
        }
        fn list(&self, _prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
            Err(BlobError::Io("disk gone".into()))
        }
    }

    /// File store that fails reads for a single key.
    struct FlakyStore {
        inner: FileStore,
        bad: &'static str,
    }

    impl BlobStore for FlakyStore {
        fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
            self.inner.put(key, data)
        }
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
            if key == self.bad {
                return Err(BlobError::Io("bad sector".into()));
            }
            self.inner.get(key)
        }
        fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
            self.inner.list(prefix)
        }
    }

    fn file_cache(dir: &std::path::Path) -> (Arc<dyn BlobStore>, ImageCache) {
        let blob: Arc<dyn BlobStore> = Arc::new(FileStore::open(dir).unwrap());
        let cache = ImageCache::new(Arc::clone(&blob));
        (blob, cache)
    }

    #[tokio::test]
    async fn save_is_readable_before_preload() {
        let dir = tempfile::tempdir().unwrap();
        let (blob, cache) = file_cache(dir.path());

        cache.save("42", "data:image/png;base64,AAAA".into()).await;
        assert_eq!(cache.state(), CacheState::Uninitialized);
        assert_eq!(cache.read("42").as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(
            blob.get("images/42").unwrap().unwrap(),
            b"data:image/png;base64,AAAA"
        );
    }

    #[tokio::test]
    async fn cold_start_misses_until_preload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let (_, cache) = file_cache(dir.path());
            cache.save("7", "data:image/jpeg;base64,BBBB".into()).await;
        }

        let (_, cache) = file_cache(dir.path());
        assert_eq!(cache.read("7"), None);

        cache.preload().await;
        assert_eq!(cache.state(), CacheState::Ready);
        assert_eq!(cache.read("7").as_deref(), Some("data:image/jpeg;base64,BBBB"));
    }

    #[tokio::test]
    async fn preload_keeps_session_saves() {
        let dir = tempfile::tempdir().unwrap();
        let (blob, cache) = file_cache(dir.path());
        blob.put("images/9", b"old").unwrap();

        cache.save("9", "new".into()).await;
        // Durable copy now says "new" too; make it stale to prove memory wins.
        blob.put("images/9", b"old").unwrap();
        cache.preload().await;
        assert_eq!(cache.read("9").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn spawned_preload_reaches_ready() {
        let dir = tempfile::tempdir().unwrap();
        let (blob, _) = file_cache(dir.path());
        blob.put("images/1", b"one").unwrap();
        blob.put("other/2", b"two").unwrap();

        let cache = Arc::new(ImageCache::new(blob));
        cache.spawn_preload().await.unwrap();
        assert_eq!(cache.state(), CacheState::Ready);
        assert_eq!(cache.read("1").as_deref(), Some("one"));
        assert_eq!(cache.read("2"), None);
    }

    #[tokio::test]
    async fn durable_failures_are_swallowed() {
        let cache = ImageCache::new(Arc::new(BrokenStore));
        cache.save("5", "payload".into()).await;
        assert_eq!(cache.read("5").as_deref(), Some("payload"));

        cache.preload().await;
        assert_eq!(cache.state(), CacheState::Ready);
        assert_eq!(cache.read("5").as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn unreadable_image_does_not_stop_preload() {
        let dir = tempfile::tempdir().unwrap();
        let inner = FileStore::open(dir.path()).unwrap();
        for id in ["1", "2", "3"] {
            inner.put(&format!("images/{}", id), id.as_bytes()).unwrap();
        }
        let cache = ImageCache::new(Arc::new(FlakyStore {
            inner,
            bad: "images/2",
        }));

        cache.preload().await;
        assert_eq!(cache.state(), CacheState::Ready);
        assert_eq!(cache.read("1").as_deref(), Some("1"));
        assert_eq!(cache.read("2"), None);
        assert_eq!(cache.read("3").as_deref(), Some("3"));
    }
}
