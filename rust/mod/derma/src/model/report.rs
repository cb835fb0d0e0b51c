use serde::{Deserialize, Serialize};

/// One model's opinion inside an ensemble diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVote {
    #[serde(alias = "model_name", alias = "modelName")]
    pub model: String,
    pub diagnosis: String,
    pub confidence: f64,
}

/// Output of the ensemble classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub diagnosis: String,
    /// Headline confidence, 0–100.
    pub confidence: f64,
    pub breakdown: Vec<ModelVote>,
    pub method: String,
    /// True when the inference endpoint was unreachable and the canned result
    /// was used.
    pub fallback: bool,
}

/// Symptom and treatment narrative for a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub symptoms: String,
    pub treatment: String,
}

/// A diagnosis report. Immutable once stored.
///
/// `image` holds the inline data-URI payload while a report is in flight or
/// after it has been rehydrated by `list_reports`. The stored document only
/// ever carries `image_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: u64,
    pub account_id: String,
    pub diagnosis: String,
    pub confidence: f64,
    pub symptoms: String,
    pub treatment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<ModelVote>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Whether `symptoms`/`treatment` came from the generative endpoint.
    #[serde(default)]
    pub is_generative: bool,

    /// Id of the cached image, equal to `id` when an image was attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Local display date, `M/D/YYYY`.
    pub date: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}
