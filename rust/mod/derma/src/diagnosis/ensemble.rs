use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Diagnosis, ModelVote};
use crate::scan::ImageUpload;
use crate::service::DermaError;

const FALLBACK_DIAGNOSIS: &str = "Eczema";
const FALLBACK_CONFIDENCE: f64 = 88.5;
const FALLBACK_METHOD: &str = "Offline Fallback";
const DEFAULT_METHOD: &str = "Ensemble Consensus";
const REJECTED: &str = "Server rejected the image.";

/// One synthetic ensemble member and its offset from the headline confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOffset {
    pub name: String,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub models: Vec<ModelOffset>,
    /// Lowest confidence a synthesized model vote may report.
    pub floor: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        let model = |name: &str, offset: f64| ModelOffset {
            name: name.to_string(),
            offset,
        };
        Self {
            models: vec![
                model("EfficientNetB0", 2.1),
                model("ResNet50", -1.2),
                model("MobileNetV2", -5.5),
            ],
            floor: 10.0,
        }
    }
}

/// Build a per-model breakdown around a headline result. Every model agrees on
/// the label; confidences are offset, clamped to `[floor, 100]` and rounded
/// to one decimal.
pub fn synthesize_breakdown(diagnosis: &str, confidence: f64, config: &EnsembleConfig) -> Vec<ModelVote> {
    config
        .models
        .iter()
        .map(|m| ModelVote {
            model: m.name.clone(),
            diagnosis: diagnosis.to_string(),
            confidence: round1((confidence + m.offset).clamp(config.floor, 100.0)),
        })
        .collect()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Default, Deserialize)]
struct InferenceReply {
    diagnosis: Option<String>,
    confidence: Option<f64>,
    breakdown: Option<Vec<ModelVote>>,
    method: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

impl InferenceReply {
    fn error_text(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}

/// Client for the ensemble inference endpoint.
pub struct EnsembleClassifier {
    http: reqwest::Client,
    url: String,
    config: EnsembleConfig,
    fallback_latency: Duration,
}

impl EnsembleClassifier {
    pub fn new(http: reqwest::Client, url: String, config: EnsembleConfig, fallback_latency: Duration) -> Self {
        Self {
            http,
            url,
            config,
            fallback_latency,
        }
    }

    /// Classify an image.
    ///
    /// If the endpoint cannot be reached at all, waits `fallback_latency` and
    /// returns the canned offline diagnosis. If it answers with an error, the
    /// error is returned as [`DermaError::Application`].
    pub async fn classify(&self, image: &ImageUpload) -> Result<Diagnosis, DermaError> {
        match self.request(image).await {
            Err(e) if e.is_transport() => {
                warn!("inference endpoint unreachable, using offline fallback: {}", e);
                tokio::time::sleep(self.fallback_latency).await;
                Ok(self.fallback())
            }
            other => other,
        }
    }

    /// The canned diagnosis used while the endpoint is offline.
    pub fn fallback(&self) -> Diagnosis {
        Diagnosis {
            diagnosis: FALLBACK_DIAGNOSIS.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            breakdown: synthesize_breakdown(FALLBACK_DIAGNOSIS, FALLBACK_CONFIDENCE, &self.config),
            method: FALLBACK_METHOD.to_string(),
            fallback: true,
        }
    }

    async fn request(&self, image: &ImageUpload) -> Result<Diagnosis, DermaError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)
            .map_err(|e| DermaError::Validation(format!("image type '{}': {}", image.mime, e)))?;
        let form = Form::new().part("image", part);

        let resp = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        let body = resp.bytes().await.unwrap_or_default();
        debug!(status = status.as_u16(), len = body.len(), "inference response");

        if !status.is_success() {
            let reply: InferenceReply = serde_json::from_slice(&body).unwrap_or_default();
            let msg = reply.error_text().unwrap_or_else(|| REJECTED.to_string());
            return Err(DermaError::Application(msg));
        }

        let reply: InferenceReply = serde_json::from_slice(&body)
            .map_err(|_| DermaError::Application("malformed inference response".into()))?;
        if let Some(msg) = reply.error_text().filter(|_| reply.error.is_some()) {
            return Err(DermaError::Application(msg));
        }
        let (Some(diagnosis), Some(confidence)) = (reply.diagnosis, reply.confidence) else {
            return Err(DermaError::Application("malformed inference response".into()));
        };

        let breakdown = match reply.breakdown {
            Some(votes) if !votes.is_empty() => votes,
            _ => synthesize_breakdown(&diagnosis, confidence, &self.config),
        };
        Ok(Diagnosis {
            diagnosis,
            confidence,
            breakdown,
            method: reply.method.unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            fallback: false,
        })
    }
}

/// Map a reqwest send error. Connection, timeout and request-level failures
/// mean the endpoint was never reached.
pub(crate) fn http_error(e: reqwest::Error) -> DermaError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        DermaError::Transport(e.to_string())
    } else {
        DermaError::Internal(format!("http: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_url, serve};
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    fn upload() -> ImageUpload {
        ImageUpload {
            file_name: "lesion.jpg".into(),
            mime: "image/jpeg".into(),
            bytes: vec![0xff, 0xd8, 0xff, 0xe0],
        }
    }

    fn classifier(url: String) -> EnsembleClassifier {
        EnsembleClassifier::new(
            reqwest::Client::new(),
            url,
            EnsembleConfig::default(),
            Duration::ZERO,
        )
    }

    #[test]
    fn breakdown_uses_offsets() {
        let votes = synthesize_breakdown("Eczema", 88.5, &EnsembleConfig::default());
        let got: Vec<(&str, f64)> = votes.iter().map(|v| (v.model.as_str(), v.confidence)).collect();
        assert_eq!(
            got,
            vec![("EfficientNetB0", 90.6), ("ResNet50", 87.3), ("MobileNetV2", 83.0)]
        );
        assert!(votes.iter().all(|v| v.diagnosis == "Eczema"));
    }

    #[test]
    fn breakdown_is_clamped() {
        let config = EnsembleConfig::default();
        let low = synthesize_breakdown("Psoriasis", 12.0, &config);
        assert_eq!(low[2].confidence, 10.0);
        let high = synthesize_breakdown("Psoriasis", 99.0, &config);
        assert_eq!(high[0].confidence, 100.0);
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back() {
        let diag = classifier(format!("{}/predict", closed_url()))
            .classify(&upload())
            .await
            .unwrap();
        assert!(diag.fallback);
        assert_eq!(diag.diagnosis, "Eczema");
        assert_eq!(diag.confidence, 88.5);
        assert_eq!(diag.method, "Offline Fallback");
        assert_eq!(diag.breakdown.len(), 3);
        assert!(diag.breakdown.iter().all(|v| v.confidence >= 10.0));
    }

    #[tokio::test]
    async fn live_result_is_returned() {
        let router = Router::new().route(
            "/predict",
            post(|body: Bytes| async move {
                let has_field = String::from_utf8_lossy(&body).contains("name=\"image\"");
                Json(json!({
                    "diagnosis": if has_field { "Psoriasis" } else { "missing field" },
                    "confidence": 91.2,
                    "method": "Ensemble Consensus (3 models)",
                }))
            }),
        );
        let base = serve(router).await;
        let diag = classifier(format!("{}/predict", base)).classify(&upload()).await.unwrap();
        assert!(!diag.fallback);
        assert_eq!(diag.diagnosis, "Psoriasis");
        assert_eq!(diag.confidence, 91.2);
        assert_eq!(diag.method, "Ensemble Consensus (3 models)");
        assert_eq!(diag.breakdown[0].confidence, 93.3);
    }

    #[tokio::test]
    async fn live_breakdown_is_kept() {
        let router = Router::new().route(
            "/predict",
            post(|| async {
                Json(json!({
                    "diagnosis": "Cellulitis",
                    "confidence": 70.0,
                    "breakdown": [
                        {"model_name": "A", "diagnosis": "Cellulitis", "confidence": 75.0},
                        {"model": "B", "diagnosis": "Eczema", "confidence": 40.0},
                    ],
                }))
            }),
        );
        let base = serve(router).await;
        let diag = classifier(format!("{}/predict", base)).classify(&upload()).await.unwrap();
        assert_eq!(diag.breakdown.len(), 2);
        assert_eq!(diag.breakdown[0].model, "A");
        assert_eq!(diag.breakdown[1].diagnosis, "Eczema");
        assert_eq!(diag.method, "Ensemble Consensus");
    }

    #[tokio::test]
    async fn server_error_is_application_failure() {
        let router = Router::new().route(
            "/predict",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "No image uploaded"})),
                )
            }),
        );
        let base = serve(router).await;
        let err = classifier(format!("{}/predict", base)).classify(&upload()).await.unwrap_err();
        assert!(matches!(err, DermaError::Application(ref m) if m == "No image uploaded"));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn server_error_without_body_uses_default_message() {
        let router = Router::new().route(
            "/predict",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;
        let err = classifier(format!("{}/predict", base)).classify(&upload()).await.unwrap_err();
        assert_eq!(err.to_string(), "Server rejected the image.");
    }

    #[tokio::test]
    async fn error_field_on_success_is_application_failure() {
        let router = Router::new().route(
            "/predict",
            post(|| async { Json(json!({"error": "Image too blurry"})) }),
        );
        let base = serve(router).await;
        let err = classifier(format!("{}/predict", base)).classify(&upload()).await.unwrap_err();
        assert_eq!(err.to_string(), "Image too blurry");
    }

    #[tokio::test]
    async fn undecodable_success_is_malformed() {
        let router = Router::new().route("/predict", post(|| async { "<html>ok</html>" }));
        let base = serve(router).await;
        let err = classifier(format!("{}/predict", base)).classify(&upload()).await.unwrap_err();
        assert!(matches!(err, DermaError::Application(ref m) if m == "malformed inference response"));
    }
}
