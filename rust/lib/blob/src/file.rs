use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::BlobError;
use crate::traits::{BlobMeta, BlobStore};

/// FileStore is a BlobStore implementation backed by the local filesystem.
///
/// Keys are mapped to paths under `base_dir`:
///   key "images/1718000000000" → `{base_dir}/images/1718000000000`
///
/// Parent directories are created automatically on `put`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at `base_dir`.
    /// The directory is created if it doesn't exist.
    pub fn open(base_dir: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a filesystem path. Only plain relative components are
    /// accepted, so a key can never name a file outside `base_dir`.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let rel = Path::new(key);
        let plain = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(rel))
    }

    /// Recursively walk a directory, collecting blobs whose keys match prefix.
    fn walk_dir(&self, dir: &Path, prefix: &str, results: &mut Vec<BlobMeta>) -> Result<(), BlobError> {
        if !dir.is_dir() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.walk_dir(&path, prefix, results)?;
                continue;
            }
            let Ok(rel) = path.strip_prefix(&self.base_dir) else {
                continue;
            };
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                results.push(BlobMeta {
                    key,
                    size: entry.metadata()?.len(),
                });
            }
        }
        Ok(())
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        debug!("FileStore: wrote {} ({} bytes)", key, data.len());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(&path)?))
    }

    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        let mut results = Vec::new();
        self.walk_dir(&self.base_dir, prefix, &mut results)?;
        results.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(store.get("images/1").unwrap().is_none());
        store.put("images/1", b"data:image/png;base64,AAAA").unwrap();
        assert_eq!(
            store.get("images/1").unwrap().as_deref(),
            Some(&b"data:image/png;base64,AAAA"[..])
        );

        store.put("images/1", b"x").unwrap();
        assert_eq!(store.get("images/1").unwrap().as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn list_filters_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.put("images/2", b"bb").unwrap();
        store.put("images/1", b"a").unwrap();
        store.put("exports/1", b"ccc").unwrap();

        let listed = store.list("images/").unwrap();
        assert_eq!(
            listed,
            vec![
                BlobMeta { key: "images/1".into(), size: 1 },
                BlobMeta { key: "images/2".into(), size: 2 },
            ]
        );
    }

    #[test]
    fn rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(store.put("../x", b"1"), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.put("/etc/x", b"1"), Err(BlobError::InvalidKey(_))));
        assert!(matches!(store.get(""), Err(BlobError::InvalidKey(_))));
    }
}
