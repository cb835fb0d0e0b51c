use crate::model::{CaseStudy, Role};
use crate::service::{DermaError, DermaService};

impl DermaService {
    /// Every patient report as an anonymized case study, newest first.
    pub fn case_studies(&self) -> Result<Vec<CaseStudy>, DermaError> {
        let mut cases = Vec::new();
        for patient in self.accounts()?.into_iter().filter(|a| a.role == Role::Patient) {
            for report in self.list_reports(&patient.uid)? {
                cases.push(CaseStudy {
                    id: report.id,
                    age: patient.age(),
                    gender: patient.gender().map(str::to_string),
                    diagnosis: report.diagnosis,
                    confidence: report.confidence,
                    symptoms: report.symptoms,
                    treatment: report.treatment,
                    image: report.image,
                    date: report.date,
                });
            }
        }
        cases.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(cases)
    }
}

/// Filter cases by a search term. Matches diagnosis, symptoms or treatment
/// ignoring case, or a substring of the case id. A blank term keeps all.
pub fn search_cases(cases: &[CaseStudy], term: &str) -> Vec<CaseStudy> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return cases.to_vec();
    }
    cases
        .iter()
        .filter(|c| {
            c.diagnosis.to_lowercase().contains(&term)
                || c.symptoms.to_lowercase().contains(&term)
                || c.treatment.to_lowercase().contains(&term)
                || c.id.to_string().contains(&term)
        })
        .cloned()
        .collect()
}

/// Short display label for a case: the last six digits of its id.
pub fn case_label(id: u64) -> String {
    format!("#{:06}", id % 1_000_000)
}
