//! `dermadetect register`, `login`, `logout`, `whoami`.

use anyhow::Result;

use dermadetect::model::{Account, Profile, Registration, Role};

use super::App;

pub async fn register(
    app: &App,
    name: String,
    email: String,
    password: String,
    role: Role,
    profile: Profile,
) -> Result<()> {
    let profile = (profile != Profile::default()).then_some(profile);
    let account = app
        .svc
        .register(Registration {
            name,
            email,
            password,
            role,
            profile,
        })
        .await?;
    if !app.json {
        println!("Registered {} as {}.", account.email, account.role);
    }
    show(app, &account)
}

pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let account = app.svc.authenticate(email, password).await?;
    if !app.json {
        println!("Logged in as {} ({}).", account.name, account.role);
        return Ok(());
    }
    show(app, &account)
}

pub fn logout(app: &App) -> Result<()> {
    app.svc.end_session()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    let account = app.session()?;
    show(app, &account)
}

fn show(app: &App, account: &Account) -> Result<()> {
    app.emit(&redacted(account), |a| {
        println!("{:12} {}", "UID", a.uid);
        println!("{:12} {}", "NAME", a.name);
        println!("{:12} {}", "EMAIL", a.email);
        println!("{:12} {}", "ROLE", a.role);
        if let Some(age) = a.age() {
            println!("{:12} {}", "AGE", age);
        }
        if let Some(gender) = a.gender() {
            println!("{:12} {}", "GENDER", gender);
        }
        if let Some(history) = a.medical_history() {
            println!("{:12} {}", "HISTORY", history);
        }
    })
}

/// Copy of `account` safe to print.
pub fn redacted(account: &Account) -> Account {
    Account {
        password: "********".to_string(),
        ..account.clone()
    }
}
