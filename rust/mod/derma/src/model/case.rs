use serde::{Deserialize, Serialize};

/// An anonymized report shown to students. Carries demographics only,
/// never name, contact details or credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub diagnosis: String,
    pub confidence: f64,
    pub symptoms: String,
    pub treatment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub date: String,
}
