pub mod account;
pub mod admin;
pub mod clinic;
pub mod scan;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use dermadetect::model::Account;
use dermadetect::DermaService;
use dermadetect_blob::FileStore;
use dermadetect_kv::RedbStore;

use crate::config::CliConfig;

/// Everything a command needs: the service over the local data directory and
/// the chosen output format.
pub struct App {
    pub svc: Arc<DermaService>,
    pub json: bool,
}

impl App {
    /// Open storage. The image cache stays cold until [`warm`](Self::warm).
    pub fn open(config: &CliConfig, data_dir: Option<&str>, json: bool) -> Result<Self> {
        let storage = config.storage(data_dir);
        let kv = RedbStore::open(&storage.resolve_db_path())?;
        let blob = FileStore::open(&storage.resolve_blob_dir())?;
        let svc = DermaService::new(Arc::new(kv), Arc::new(blob), config.service())?;
        Ok(Self { svc, json })
    }

    /// Load stored images into the cache so listed reports carry them.
    /// Only commands that show images call this; repeat calls are no-ops.
    pub async fn warm(&self) {
        self.svc.images().preload().await;
    }

    /// The logged-in account, or an error telling the user to log in.
    pub fn session(&self) -> Result<Account> {
        self.svc
            .current_session()
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `dermadetect login`."))
    }

    /// Print `value` as pretty JSON when `-o json` was given, otherwise run
    /// the table printer.
    pub fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            table(value);
        }
        Ok(())
    }
}

/// Read one line from stdin after printing `label` to stderr.
pub fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Use the given password or prompt for one. New passwords are confirmed.
pub fn password(given: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = given {
        if p.is_empty() {
            anyhow::bail!("Password cannot be empty.");
        }
        return Ok(p);
    }
    let pw = rpassword::prompt_password("Password: ")?;
    if confirm {
        let again = rpassword::prompt_password("Confirm password: ")?;
        if pw != again {
            anyhow::bail!("Passwords do not match.");
        }
    }
    if pw.is_empty() {
        anyhow::bail!("Password cannot be empty.");
    }
    Ok(pw)
}

/// Cut `s` to at most `max` characters for table cells.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermadetect::CacheState;

    #[test]
    fn clip_keeps_short_text() {
        assert_eq!(clip("Eczema", 10), "Eczema");
        assert_eq!(clip("Exanthems and Drug Eruptions", 10), "Exanthems…");
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(password(Some(String::new()), false).is_err());
        assert_eq!(password(Some("pw".into()), true).unwrap(), "pw");
    }

    #[test]
    fn app_opens_fresh_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let app = App::open(&CliConfig::default(), data.to_str(), true).unwrap();
        assert!(app.session().is_err());
        assert!(data.join("data.redb").exists());
    }

    #[tokio::test]
    async fn preload_waits_for_warm() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let app = App::open(&CliConfig::default(), data.to_str(), true).unwrap();
        assert_eq!(app.svc.images().state(), CacheState::Uninitialized);

        app.warm().await;
        assert_eq!(app.svc.images().state(), CacheState::Ready);
        app.warm().await;
        assert_eq!(app.svc.images().state(), CacheState::Ready);
    }
}
