use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::info;

use dermadetect_core::{locale_date, new_time_id, now_rfc3339};

use crate::diagnosis::static_advice;
use crate::model::{Account, Report};
use crate::service::{DermaError, DermaService};

/// An image submitted for analysis.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk. The MIME type is taken from the extension.
    pub fn from_path(path: &Path) -> Result<Self, DermaError> {
        let bytes = std::fs::read(path)
            .map_err(|e| DermaError::Validation(format!("read {}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(DermaError::Validation(format!("{} is empty", path.display())));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_for(path).to_string();
        Ok(Self { file_name, mime, bytes })
    }

    /// The image as a `data:` URI, the form reports carry inline.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

impl DermaService {
    /// Run a full analysis for `account`: skin check, classification, advice,
    /// then store the report. The returned report carries its image inline.
    pub async fn scan(&self, account: &Account, upload: &ImageUpload) -> Result<Report, DermaError> {
        let preview = upload.data_uri();
        self.advisor.verify_skin(&preview).await?;

        let diagnosis = self.classifier.classify(upload).await?;

        let (advice, is_generative) = match self
            .advisor
            .advise(&diagnosis.diagnosis, diagnosis.confidence, account)
            .await
        {
            Some(advice) => (advice, true),
            None => (static_advice(&diagnosis.diagnosis), false),
        };

        let report = Report {
            id: new_time_id(),
            account_id: account.uid.clone(),
            diagnosis: diagnosis.diagnosis,
            confidence: diagnosis.confidence,
            symptoms: advice.symptoms,
            treatment: advice.treatment,
            breakdown: Some(diagnosis.breakdown),
            method: Some(diagnosis.method),
            is_generative,
            image_ref: None,
            image: Some(preview),
            date: locale_date(),
            created_at: now_rfc3339(),
        };

        let report = self.add_report(&account.uid, report).await?;
        info!(
            uid = %account.uid,
            report = report.id,
            fallback = diagnosis.fallback,
            "scan complete"
        );
        Ok(report)
    }
}
