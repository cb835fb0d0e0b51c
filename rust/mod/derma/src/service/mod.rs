pub mod appointment;
pub mod audit;
pub mod cases;
pub mod directory;
pub mod identity;
pub mod report;

pub use cases::{case_label, search_cases};
pub use directory::DirectoryStats;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use dermadetect_blob::BlobStore;
use dermadetect_core::ServiceError;
use dermadetect_kv::KVStore;

use crate::cache::ImageCache;
use crate::clinic::{ClinicLocator, NominatimClient};
use crate::diagnosis::{AdviceClient, AdviceConfig, EnsembleClassifier, EnsembleConfig};

/// DermaDetect error type. Each variant is one of the failure kinds callers
/// are expected to tell apart.
#[derive(Debug, Error)]
pub enum DermaError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Admin accounts cannot be created publicly.")]
    PrivilegedRoleForbidden,

    #[error("User already exists with this email address")]
    DuplicateEmail,

    #[error("Unauthorized")]
    Unauthorized,

    /// The endpoint could not be reached at the network level.
    #[error("{0}")]
    Transport(String),

    /// The endpoint was reached and refused the request.
    #[error("{0}")]
    Application(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A clinic search could not resolve a place or found nothing.
    #[error("{0}")]
    Location(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl DermaError {
    pub fn is_transport(&self) -> bool {
        matches!(self, DermaError::Transport(_))
    }
}

impl From<dermadetect_kv::KVError> for DermaError {
    fn from(e: dermadetect_kv::KVError) -> Self {
        DermaError::Storage(e.to_string())
    }
}

impl From<DermaError> for ServiceError {
    fn from(e: DermaError) -> Self {
        let msg = e.to_string();
        match e {
            DermaError::InvalidCredentials => ServiceError::Unauthorized(msg),
            DermaError::PrivilegedRoleForbidden | DermaError::Unauthorized => {
                ServiceError::PermissionDenied(msg)
            }
            DermaError::DuplicateEmail => ServiceError::Conflict(msg),
            DermaError::Transport(_) => ServiceError::Unavailable(msg),
            DermaError::Application(_) => ServiceError::Rejected(msg),
            DermaError::Validation(_) => ServiceError::Validation(msg),
            DermaError::NotFound(_) | DermaError::Location(_) => ServiceError::NotFound(msg),
            DermaError::Storage(_) => ServiceError::Storage(msg),
            DermaError::Internal(_) => ServiceError::Internal(msg),
        }
    }
}

/// Configuration for the DermaDetect service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DermaConfig {
    /// Simulated delay before login and registration complete.
    #[serde(with = "millis")]
    pub auth_latency: Duration,
    /// Simulated delay before a report is stored.
    #[serde(with = "millis")]
    pub report_latency: Duration,
    /// Delay before the offline fallback diagnosis is returned.
    #[serde(with = "millis")]
    pub fallback_latency: Duration,
    /// Timeout applied by the HTTP client to every outbound call.
    #[serde(with = "millis")]
    pub http_timeout: Duration,
    /// Ensemble inference endpoint.
    pub inference_url: String,
    /// Nominatim base URL for the clinic locator.
    pub geocoder_url: String,
    pub advice: AdviceConfig,
    pub ensemble: EnsembleConfig,
}

impl Default for DermaConfig {
    fn default() -> Self {
        Self {
            auth_latency: Duration::from_millis(500),
            report_latency: Duration::from_millis(300),
            fallback_latency: Duration::from_millis(1500),
            http_timeout: Duration::from_secs(30),
            inference_url: "http://localhost:5000/predict".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            advice: AdviceConfig::default(),
            ensemble: EnsembleConfig::default(),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// The DermaDetect service context. Holds storage handles, the image cache,
/// and the outbound clients. One instance per process; tests build their own.
pub struct DermaService {
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) images: Arc<ImageCache>,
    pub(crate) config: DermaConfig,
    pub(crate) classifier: EnsembleClassifier,
    pub(crate) advisor: AdviceClient,
    pub(crate) locator: ClinicLocator,
}

impl DermaService {
    /// Create a new DermaService over the given document and image stores.
    ///
    /// The image cache starts `Uninitialized`; call
    /// [`ImageCache::spawn_preload`] to warm it.
    pub fn new(
        kv: Arc<dyn KVStore>,
        blob: Arc<dyn BlobStore>,
        config: DermaConfig,
    ) -> Result<Arc<Self>, DermaError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| DermaError::Internal(format!("http client: {}", e)))?;

        let classifier = EnsembleClassifier::new(
            http.clone(),
            config.inference_url.clone(),
            config.ensemble.clone(),
            config.fallback_latency,
        );
        let locator = ClinicLocator::new(NominatimClient::new(http.clone(), config.geocoder_url.clone()));
        let advisor = AdviceClient::new(http, config.advice.clone());

        Ok(Arc::new(Self {
            kv,
            images: Arc::new(ImageCache::new(blob)),
            config,
            classifier,
            advisor,
            locator,
        }))
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    pub fn clinics(&self) -> &ClinicLocator {
        &self.locator
    }

    pub fn config(&self) -> &DermaConfig {
        &self.config
    }

    // ── Document helpers ──

    /// Load the JSON document stored under `key`, or the default when the key
    /// is absent.
    pub(crate) fn load_doc<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, DermaError> {
        match self.kv.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| DermaError::Internal(format!("decode {}: {}", key, e))),
            None => Ok(T::default()),
        }
    }

    /// Replace the whole document stored under `key`.
    pub(crate) fn store_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DermaError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| DermaError::Internal(format!("encode {}: {}", key, e)))?;
        self.kv.set(key, &bytes)?;
        debug!("stored document {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derma_error_maps_to_service_codes() {
        let cases: Vec<(DermaError, &str)> = vec![
            (DermaError::InvalidCredentials, "UNAUTHENTICATED"),
            (DermaError::PrivilegedRoleForbidden, "PERMISSION_DENIED"),
            (DermaError::Unauthorized, "PERMISSION_DENIED"),
            (DermaError::DuplicateEmail, "ALREADY_EXISTS"),
            (DermaError::Transport("down".into()), "UNAVAILABLE"),
            (DermaError::Application("no skin".into()), "REJECTED"),
            (DermaError::Location("nowhere".into()), "NOT_FOUND"),
            (DermaError::Storage("disk".into()), "STORAGE_ERROR"),
        ];
        for (err, code) in cases {
            assert_eq!(ServiceError::from(err).error_code(), code);
        }
    }

    #[test]
    fn application_message_passes_through_unchanged() {
        let err = ServiceError::from(DermaError::Application("No skin detected".into()));
        assert_eq!(err.to_string(), "No skin detected");
    }

    #[test]
    fn config_reads_millisecond_durations() {
        let config: DermaConfig = serde_json::from_value(serde_json::json!({
            "auth_latency": 0,
            "inference_url": "http://127.0.0.1:9/predict",
        }))
        .unwrap();
        assert_eq!(config.auth_latency, Duration::ZERO);
        assert_eq!(config.report_latency, Duration::from_millis(300));
        assert_eq!(config.inference_url, "http://127.0.0.1:9/predict");
    }
}
