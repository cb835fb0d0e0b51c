//! CLI configuration.
//!
//! Reads `~/.dermadetect/config.toml`. Every section is optional; a missing
//! file means all defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dermadetect::diagnosis::{AdviceConfig, EnsembleConfig};
use dermadetect::DermaConfig;
use dermadetect_core::ServiceConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub storage: StorageSection,
    pub inference: InferenceSection,
    pub advice: AdviceConfig,
    pub ensemble: EnsembleConfig,
    pub latency: LatencySection,
    pub clinics: ClinicsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Root directory for the document store and image blobs.
    pub data_dir: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: home_dir().join("data").to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSection {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for InferenceSection {
    fn default() -> Self {
        let d = DermaConfig::default();
        Self {
            url: d.inference_url,
            timeout_ms: d.http_timeout.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencySection {
    pub auth_ms: u64,
    pub report_ms: u64,
    pub fallback_ms: u64,
}

impl Default for LatencySection {
    fn default() -> Self {
        let d = DermaConfig::default();
        Self {
            auth_ms: d.auth_latency.as_millis() as u64,
            report_ms: d.report_latency.as_millis() as u64,
            fallback_ms: d.fallback_latency.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicsSection {
    pub geocoder_url: String,
}

impl Default for ClinicsSection {
    fn default() -> Self {
        Self {
            geocoder_url: DermaConfig::default().geocoder_url,
        }
    }
}

impl CliConfig {
    /// Default config file path: ~/.dermadetect/config.toml.
    pub fn default_path() -> PathBuf {
        home_dir().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn storage(&self, data_dir_override: Option<&str>) -> ServiceConfig {
        let data_dir = data_dir_override.unwrap_or(&self.storage.data_dir);
        ServiceConfig {
            data_dir: Some(PathBuf::from(data_dir)),
            ..Default::default()
        }
    }

    pub fn service(&self) -> DermaConfig {
        let mut advice = self.advice.clone();
        if let Ok(key) = std::env::var("DERMADETECT_ADVICE_KEY") {
            advice.api_key = Some(key);
        }
        DermaConfig {
            auth_latency: Duration::from_millis(self.latency.auth_ms),
            report_latency: Duration::from_millis(self.latency.report_ms),
            fallback_latency: Duration::from_millis(self.latency.fallback_ms),
            http_timeout: Duration::from_millis(self.inference.timeout_ms),
            inference_url: self.inference.url.clone(),
            geocoder_url: self.clinics.geocoder_url.clone(),
            advice,
            ensemble: self.ensemble.clone(),
        }
    }
}

/// Return the DermaDetect config directory (~/.dermadetect).
fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".dermadetect")
}
