//! Admin views: audit log, staff, user directory, case studies.

use anyhow::Result;

use dermadetect::model::{Account, NewStaff, Role};
use dermadetect::service::{case_label, search_cases};

use super::account::redacted;
use super::{clip, App};

fn require_admin(account: &Account) -> Result<()> {
    if !account.role.is_admin_tier() {
        anyhow::bail!("Admin access required.");
    }
    Ok(())
}

pub fn logs(app: &App) -> Result<()> {
    let account = app.session()?;
    if !account.is_main_admin() {
        anyhow::bail!("Only the main admin can view the audit log.");
    }
    let entries = app.svc.audit_log(Some(&account))?;
    app.emit(&entries, |entries| {
        if entries.is_empty() {
            println!("No audit entries.");
            return;
        }
        println!("{:24} {:20} {:20} {:12} {}", "TIME", "ACTION", "ACTOR", "ROLE", "DETAILS");
        for e in entries {
            println!(
                "{:24} {:20} {:20} {:12} {}",
                e.timestamp,
                clip(&e.action, 20),
                clip(&e.actor_name, 20),
                e.actor_role,
                e.details
            );
        }
    })
}

pub fn create_staff(app: &App, name: String, email: String, password: String) -> Result<()> {
    let actor = app.session()?;
    let account = app
        .svc
        .create_sub_admin(NewStaff { name, email, password }, &actor)?;
    if app.json {
        return app.emit(&redacted(&account), |_| {});
    }
    println!("Sub-admin {} created ({}).", account.name, account.uid);
    Ok(())
}

pub fn delete_staff(app: &App, uid: &str) -> Result<()> {
    let actor = app.session()?;
    let existed = app.svc.list_admins()?.iter().any(|a| a.uid == uid);
    app.svc.delete_sub_admin(uid, &actor)?;
    if existed {
        println!("Sub-admin {} deleted.", uid);
    } else {
        println!("No sub-admin with uid {}.", uid);
    }
    Ok(())
}

pub fn list_staff(app: &App) -> Result<()> {
    let actor = app.session()?;
    if !actor.is_main_admin() {
        anyhow::bail!("Only the main admin can manage staff.");
    }
    print_accounts(app, app.svc.list_admins()?, "No sub-admins found.")
}

pub fn users(app: &App) -> Result<()> {
    let actor = app.session()?;
    require_admin(&actor)?;

    let users = app.svc.list_users()?;
    if !app.json {
        let stats = app.svc.directory_stats()?;
        println!(
            "Patients: {}  Students: {}  Sub-admins: {}  Reports: {}\n",
            stats.patients, stats.students, stats.sub_admins, stats.reports
        );
    }
    print_accounts(app, users, "No registered users.")
}

fn print_accounts(app: &App, accounts: Vec<Account>, empty: &str) -> Result<()> {
    let accounts: Vec<Account> = accounts.iter().map(redacted).collect();
    app.emit(&accounts, |accounts| {
        if accounts.is_empty() {
            println!("{}", empty);
            return;
        }
        println!("{:24} {:24} {:32} {:10}", "UID", "NAME", "EMAIL", "ROLE");
        for a in accounts {
            println!(
                "{:24} {:24} {:32} {:10}",
                a.uid,
                clip(&a.name, 24),
                clip(&a.email, 32),
                a.role
            );
        }
    })
}

pub async fn cases(app: &App, search: Option<&str>) -> Result<()> {
    let viewer = app.session()?;
    if viewer.role == Role::Patient {
        anyhow::bail!("Case studies are available to students and admins.");
    }
    app.warm().await;
    let all = app.svc.case_studies()?;
    let cases = search_cases(&all, search.unwrap_or_default());

    app.emit(&cases, |cases| {
        if cases.is_empty() {
            println!("No cases found.");
            return;
        }
        println!("{} of {} cases\n", cases.len(), all.len());
        println!("{:9} {:11} {:5} {:8} {:28} {:>6}", "CASE", "DATE", "AGE", "GENDER", "CONDITION", "CONF");
        for c in cases {
            let age = c.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
            println!(
                "{:9} {:11} {:5} {:8} {:28} {:>5}%",
                case_label(c.id),
                c.date,
                age,
                c.gender.as_deref().unwrap_or("-"),
                clip(&c.diagnosis, 28),
                c.confidence
            );
        }
    })
}
