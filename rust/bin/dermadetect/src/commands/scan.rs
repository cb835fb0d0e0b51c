//! `dermadetect scan` and `dermadetect reports`.

use std::path::Path;

use anyhow::Result;

use dermadetect::export::{export_file_name, render_report};
use dermadetect::model::Report;
use dermadetect::ImageUpload;

use super::{clip, App};

pub async fn scan(app: &App, image: &str) -> Result<()> {
    let account = app.session()?;
    let upload = ImageUpload::from_path(Path::new(image))?;
    let mut report = app.svc.scan(&account, &upload).await?;
    // The inline image is the upload itself; don't echo it back.
    report.image = None;

    app.emit(&report, |r| {
        println!("{:12} {}", "REPORT", r.id);
        println!("{:12} {}", "CONDITION", r.diagnosis);
        println!("{:12} {}%", "CONFIDENCE", r.confidence);
        if let Some(method) = &r.method {
            println!("{:12} {}", "METHOD", method);
        }
        if let Some(votes) = &r.breakdown {
            for v in votes {
                println!("{:12} {:16} {:24} {}%", "", v.model, clip(&v.diagnosis, 24), v.confidence);
            }
        }
        let source = if r.is_generative { "generative" } else { "catalog" };
        println!("{:12} {} ({})", "SYMPTOMS", r.symptoms, source);
        println!("{:12} {}", "TREATMENT", r.treatment);
    })
}

pub async fn reports(app: &App) -> Result<()> {
    let account = app.session()?;
    app.warm().await;
    let reports = app.svc.list_reports(&account.uid)?;

    if app.json {
        return app.emit(&reports, |_| {});
    }
    if reports.is_empty() {
        println!("No reports yet. Run: dermadetect scan <image>");
        return Ok(());
    }
    print_table(&reports);
    Ok(())
}

pub async fn export(app: &App, id: u64, out_dir: &str) -> Result<()> {
    let account = app.session()?;
    let report = app.svc.get_report(&account.uid, id)?;

    let path = Path::new(out_dir).join(export_file_name(&account, &report));
    std::fs::create_dir_all(out_dir)?;
    std::fs::write(&path, render_report(&account, &report))?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn print_table(reports: &[Report]) {
    println!("{:14} {:11} {:28} {:>6} {:6}", "ID", "DATE", "CONDITION", "CONF", "IMAGE");
    for r in reports {
        let image = if r.image.is_some() {
            "yes"
        } else if r.image_ref.is_some() {
            "cold"
        } else {
            "-"
        };
        println!(
            "{:14} {:11} {:28} {:>5}% {:6}",
            r.id,
            r.date,
            clip(&r.diagnosis, 28),
            r.confidence,
            image
        );
    }
}
