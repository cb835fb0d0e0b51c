//! Plain-text report export.

use crate::model::{Account, Report};

const WIDTH: usize = 72;

/// Render a report as the labelled text blocks handed to patients.
pub fn render_report(account: &Account, report: &Report) -> String {
    let mut out = String::new();
    let rule = "=".repeat(WIDTH);

    out.push_str(&rule);
    out.push_str("\nDermaDetect AI Report\n");
    out.push_str(&format!("Date: {}\n", report.date));
    out.push_str(&rule);
    out.push_str("\n\n");

    out.push_str("Patient Profile\n");
    out.push_str(&format!("Name: {}\n", non_empty(&account.name).unwrap_or("Unknown")));
    let age = account
        .age()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    out.push_str(&format!("Age/Gender: {} / {}\n", age, account.gender().unwrap_or("N/A")));
    if let Some(history) = account.medical_history() {
        out.push_str("Medical History:\n");
        push_wrapped(&mut out, history);
    }
    out.push('\n');

    out.push_str("Analysis Results\n");
    out.push_str(&format!("Condition: {}\n", report.diagnosis));
    out.push_str(&format!("Confidence: {}%\n", report.confidence));
    if let Some(method) = &report.method {
        out.push_str(&format!("Method: {}\n", method));
    }
    if let Some(votes) = report.breakdown.as_ref().filter(|v| !v.is_empty()) {
        for vote in votes {
            out.push_str(&format!("  {}: {} ({}%)\n", vote.model, vote.diagnosis, vote.confidence));
        }
    }
    out.push('\n');

    out.push_str("Symptoms:\n");
    push_wrapped(&mut out, non_empty(&report.symptoms).unwrap_or("None reported"));
    out.push('\n');

    out.push_str("Treatment:\n");
    push_wrapped(
        &mut out,
        non_empty(&report.treatment).unwrap_or("No treatment data available"),
    );
    out
}

/// `DermaDetect_Report_{Name}_{M-D-YYYY}.txt`. Whitespace in the name is
/// collapsed to underscores and anything outside `[A-Za-z0-9_-]` becomes `_`,
/// so the result is always a single path component.
pub fn export_file_name(account: &Account, report: &Report) -> String {
    let name = account.name.split_whitespace().collect::<Vec<_>>().join("_");
    let name = if name.is_empty() { "Patient".to_string() } else { name };
    format!(
        "DermaDetect_Report_{}_{}.txt",
        file_safe(&name),
        file_safe(&report.date.replace('/', "-"))
    )
}

fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.trim().is_empty())
}

fn push_wrapped(out: &mut String, text: &str) {
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > WIDTH {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        out.push_str(&line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelVote, Profile, Role};

    fn patient(history: Option<&str>) -> Account {
        Account {
            uid: "1".into(),
            name: "Asha  Rao".into(),
            email: "asha@x.com".into(),
            password: "pw".into(),
            role: Role::Patient,
            created_at: None,
            profile: Some(Profile {
                age: Some(34),
                gender: Some("Female".into()),
                phone: None,
                medical_history: history.map(str::to_string),
            }),
        }
    }

    fn report() -> Report {
        Report {
            id: 1,
            account_id: "1".into(),
            diagnosis: "Eczema".into(),
            confidence: 88.5,
            symptoms: "red ".repeat(40),
            treatment: String::new(),
            breakdown: Some(vec![ModelVote {
                model: "ResNet50".into(),
                diagnosis: "Eczema".into(),
                confidence: 87.3,
            }]),
            method: Some("Offline Fallback".into()),
            is_generative: false,
            image_ref: None,
            image: None,
            date: "3/14/2026".into(),
            created_at: "2026-03-14T10:00:00Z".into(),
        }
    }

    #[test]
    fn layout_has_labelled_blocks() {
        let text = render_report(&patient(Some("Asthma")), &report());
        let headings = [
            "DermaDetect AI Report",
            "Date: 3/14/2026",
            "Patient Profile",
            "Name: Asha  Rao",
            "Age/Gender: 34 / Female",
            "Medical History:",
            "Analysis Results",
            "Condition: Eczema",
            "Confidence: 88.5%",
            "  ResNet50: Eczema (87.3%)",
            "Symptoms:",
            "Treatment:",
            "No treatment data available",
        ];
        let mut from = 0;
        for h in headings {
            let at = text[from..].find(h).unwrap_or_else(|| panic!("missing {:?}", h));
            from += at + h.len();
        }
        assert!(text.lines().all(|l| l.len() <= WIDTH));
    }

    #[test]
    fn history_block_only_when_present() {
        let text = render_report(&patient(None), &report());
        assert!(!text.contains("Medical History"));
    }

    #[test]
    fn file_name_format() {
        assert_eq!(
            export_file_name(&patient(None), &report()),
            "DermaDetect_Report_Asha_Rao_3-14-2026.txt"
        );
    }

    #[test]
    fn file_name_stays_in_out_dir() {
        let mut account = patient(None);
        account.name = "Ana/../../tmp/evil".into();
        let name = export_file_name(&account, &report());
        assert_eq!(name, "DermaDetect_Report_Ana_______tmp_evil_3-14-2026.txt");

        account.name = r"..\win .dot".into();
        let name = export_file_name(&account, &report());
        assert!(!name[..name.len() - 4].contains(['.', '/', '\\']));

        let out = std::path::Path::new("/srv/out");
        assert_eq!(out.join(&name).parent(), Some(out));
    }
}
