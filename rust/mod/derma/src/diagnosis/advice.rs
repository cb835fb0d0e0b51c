use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::diagnosis::ensemble::http_error;
use crate::model::{Account, Advice};
use crate::service::DermaError;

const NO_SKIN: &str =
    "Invalid Image: No human skin detected. Please upload a clear photo of a skin condition.";

const SKIN_QUESTION: &str = "Does this image clearly show human skin, a body part, or a skin condition? Answer STRICTLY 'YES' or 'NO'.";

/// Settings for the generative advice and image-check endpoints. Both are
/// disabled while `api_key` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-1.5-flash".to_string(),
            vision_model: "gemini-2.5-flash-preview-09-2025".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct AdviceReply {
    symptoms: String,
    treatment: String,
}

/// Client for the generative-language endpoint.
pub struct AdviceClient {
    http: reqwest::Client,
    config: AdviceConfig,
}

impl AdviceClient {
    pub fn new(http: reqwest::Client, config: AdviceConfig) -> Self {
        Self { http, config }
    }

    pub fn enabled(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Ask for tailored symptom and treatment text. Returns `None` when no key
    /// is configured or anything about the call fails.
    pub async fn advise(&self, diagnosis: &str, confidence: f64, patient: &Account) -> Option<Advice> {
        let age = patient
            .age()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let prompt = format!(
            "Act as a dermatologist. Patient: {}yo {}, History: {}.\nDiagnosis: \"{}\" ({}%).\nReturn JSON: {{ \"symptoms\": \"...\", \"treatment\": \"...\" }}",
            age,
            patient.gender().unwrap_or("unknown"),
            patient.medical_history().unwrap_or("None"),
            diagnosis,
            confidence,
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let text = match self.generate(&self.config.text_model, &body).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!("advice request failed: {}", e);
                return None;
            }
        };

        let reply: AdviceReply = match extract_json(&text).and_then(|j| serde_json::from_str(j).ok()) {
            Some(r) => r,
            None => {
                warn!("advice response had no usable JSON");
                return None;
            }
        };
        Some(Advice {
            symptoms: reply.symptoms,
            treatment: reply.treatment,
        })
    }

    /// Reject images the vision model says show no skin. Only an explicit NO
    /// blocks the scan; a missing key, a non-data-URI image, or any failure
    /// lets it through.
    pub async fn verify_skin(&self, image: &str) -> Result<(), DermaError> {
        let Some((mime, data)) = split_data_uri(image) else {
            return Ok(());
        };
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": SKIN_QUESTION },
                    { "inlineData": { "mimeType": mime, "data": data } },
                ],
            }],
        });

        match self.generate(&self.config.vision_model, &body).await {
            Ok(Some(answer)) if says_no(&answer) => Err(DermaError::Application(NO_SKIN.to_string())),
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("skin check skipped: {}", e);
                Ok(())
            }
        }
    }

    /// POST a generateContent request and return the first candidate's text.
    /// `Ok(None)` means no key is configured.
    async fn generate(&self, model: &str, body: &Value) -> Result<Option<String>, DermaError> {
        let Some(key) = self.api_key() else {
            return Ok(None);
        };
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        let resp = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DermaError::Application(format!("{} returned {}: {}", model, status, text)));
        }

        let reply: Value = resp
            .json()
            .await
            .map_err(|e| DermaError::Application(format!("{} response parse failed: {}", model, e)))?;
        let text = reply
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| DermaError::Application(format!("{} response has no text", model)))?;
        debug!(model, len = text.len(), "generated text");
        Ok(Some(text.to_string()))
    }
}

/// Pull the JSON object out of model output that may be wrapped in code
/// fences or prose.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Split `data:{mime};base64,{payload}`.
fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.split(';').next().filter(|m| !m.is_empty()).unwrap_or("image/jpeg");
    Some((mime, payload))
}

fn says_no(answer: &str) -> bool {
    answer
        .to_uppercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == "NO")
}
