use std::path::PathBuf;

/// Storage locations shared by the library and the CLI.
///
/// The CLI fills this from its TOML file and `--data-dir`, then hands it to
/// storage initialization.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Root directory for all persisted state.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb document store.
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Directory for the image blob store.
    /// Defaults to `{data_dir}/blobs/` if not specified.
    pub blob_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve the redb database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    /// Resolve the blob storage directory.
    pub fn resolve_blob_dir(&self) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("blobs"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/data.redb"));
        assert_eq!(config.resolve_blob_dir(), PathBuf::from("/data/blobs"));

        let bare = ServiceConfig::default();
        assert_eq!(bare.resolve_db_path(), PathBuf::from("data.redb"));
    }
}
