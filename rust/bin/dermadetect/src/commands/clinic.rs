//! `dermadetect clinics`, `book`, `appointments`.

use anyhow::Result;

use dermadetect::model::ClinicSearch;

use super::{clip, App};

pub async fn by_query(app: &App, query: &str) -> Result<()> {
    let found = app.svc.clinics().find_by_query(query).await?;
    print_search(app, &found)
}

pub async fn near(app: &App, lat: f64, lon: f64) -> Result<()> {
    let found = app.svc.clinics().find_near(lat, lon).await?;
    print_search(app, &found)
}

fn print_search(app: &App, found: &ClinicSearch) -> Result<()> {
    app.emit(found, |s| {
        println!("Clinics near {} ({:.4}, {:.4})\n", s.city, s.origin.0, s.origin.1);
        println!("{:12} {:36} {:9} {:>4} {}", "ID", "NAME", "DISTANCE", "RATE", "TYPE");
        for c in &s.clinics {
            let kind = if c.specialized { "specialist" } else { "general" };
            println!(
                "{:12} {:36} {:>6} km {:>4} {}",
                c.id,
                clip(&c.name, 36),
                c.distance_km,
                c.rating,
                kind
            );
        }
    })
}

pub fn book(app: &App, clinic_id: &str, clinic_name: &str, date: &str, time: &str) -> Result<()> {
    let account = app.session()?;
    let appt = app
        .svc
        .book_appointment(&account, clinic_id, clinic_name, date, time)?;
    if app.json {
        return app.emit(&appt, |_| {});
    }
    println!("Booking confirmed: {} on {} at {}.", appt.clinic_name, appt.date, appt.time);
    println!("The clinic will contact you with further details.");
    Ok(())
}

pub fn appointments(app: &App) -> Result<()> {
    let account = app.session()?;
    let list = app.svc.list_appointments(&account.uid)?;
    app.emit(&list, |list| {
        if list.is_empty() {
            println!("No appointments booked.");
            return;
        }
        println!("{:11} {:6} {:36} {}", "DATE", "TIME", "CLINIC", "CLINIC ID");
        for a in list {
            println!("{:11} {:6} {:36} {}", a.date, a.time, clip(&a.clinic_name, 36), a.clinic_id);
        }
    })
}
