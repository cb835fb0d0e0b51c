//! Shared test fixtures.

use std::sync::Arc;
use std::time::Duration;

use dermadetect_blob::{BlobStore, FileStore};
use dermadetect_kv::{KVStore, RedbStore};

use crate::model::{Profile, Registration, Role};
use crate::service::{DermaConfig, DermaService};

/// Config with every simulated delay removed and all endpoints pointed at a
/// closed local port.
pub fn instant_config() -> DermaConfig {
    DermaConfig {
        auth_latency: Duration::ZERO,
        report_latency: Duration::ZERO,
        fallback_latency: Duration::ZERO,
        http_timeout: Duration::from_secs(5),
        inference_url: format!("{}/predict", closed_url()),
        geocoder_url: closed_url(),
        ..Default::default()
    }
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub kv: Arc<dyn KVStore>,
    pub blob: Arc<dyn BlobStore>,
    pub svc: Arc<DermaService>,
}

impl Fixture {
    /// A second service over the same files, as after a process restart.
    pub fn reopen(&self) -> Arc<DermaService> {
        DermaService::new(Arc::clone(&self.kv), Arc::clone(&self.blob), instant_config()).unwrap()
    }
}

pub fn fixture() -> Fixture {
    fixture_with(instant_config())
}

pub fn fixture_with(config: DermaConfig) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open(&dir.path().join("data.redb")).unwrap());
    let blob: Arc<dyn BlobStore> = Arc::new(FileStore::open(&dir.path().join("blobs")).unwrap());
    let svc = DermaService::new(Arc::clone(&kv), Arc::clone(&blob), config).unwrap();
    Fixture { dir, kv, blob, svc }
}

pub fn registration(name: &str, email: &str, role: Role) -> Registration {
    Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
        role,
        profile: Some(Profile {
            age: Some(30),
            gender: Some("Female".to_string()),
            phone: Some("555-0101".to_string()),
            medical_history: None,
        }),
    }
}

/// A base URL nothing listens on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
