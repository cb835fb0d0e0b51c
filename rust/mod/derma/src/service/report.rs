use tracing::info;

use crate::model::Report;
use crate::service::{DermaError, DermaService};

pub(crate) fn reports_key(account_id: &str) -> String {
    format!("derma:reports:{}", account_id)
}

impl DermaService {
    /// Store a report for `account_id`.
    ///
    /// An inline image is written to the image cache under the report id and
    /// replaced by `image_ref` in the stored record. Returns the report as the
    /// caller supplied it, with `image_ref` filled in.
    ///
    /// Reports are prepended unconditionally; calling twice with the same id
    /// stores two copies.
    pub async fn add_report(&self, account_id: &str, mut report: Report) -> Result<Report, DermaError> {
        tokio::time::sleep(self.config.report_latency).await;

        report.account_id = account_id.to_string();
        if let Some(image) = report.image.clone() {
            let id = report.id.to_string();
            self.images.save(&id, image).await;
            report.image_ref = Some(id);
        }

        let key = reports_key(account_id);
        let mut reports: Vec<Report> = self.load_doc(&key)?;
        let stored = Report {
            image: None,
            ..report.clone()
        };
        reports.insert(0, stored);
        self.store_doc(&key, &reports)?;

        let owner = self.find_account(account_id)?;
        self.record_audit(
            "AI Scan",
            owner.as_ref(),
            &format!("Diagnosis: {} ({}%)", report.diagnosis, report.confidence),
        );
        info!(account_id, report = report.id, diagnosis = %report.diagnosis, "report stored");
        Ok(report)
    }

    /// Reports for `account_id`, newest first, with images filled in from the
    /// cache where available. A report whose image is not in memory yet comes
    /// back without one.
    pub fn list_reports(&self, account_id: &str) -> Result<Vec<Report>, DermaError> {
        let mut reports: Vec<Report> = self.load_doc(&reports_key(account_id))?;
        for report in &mut reports {
            if let Some(id) = &report.image_ref {
                report.image = self.images.read(id);
            }
        }
        Ok(reports)
    }

    /// Find one report by id.
    pub fn get_report(&self, account_id: &str, report_id: u64) -> Result<Report, DermaError> {
        self.list_reports(account_id)?
            .into_iter()
            .find(|r| r.id == report_id)
            .ok_or_else(|| DermaError::NotFound(format!("report {} not found", report_id)))
    }
}
