use tracing::{info, warn};

use dermadetect_core::{new_time_id, now_rfc3339};

use crate::model::{Account, NewStaff, Registration, Role};
use crate::service::{DermaError, DermaService};

pub(crate) const ACCOUNTS_KEY: &str = "derma:accounts";
const SESSION_KEY: &str = "derma:session";

impl DermaService {
    /// Log in. The built-in main admin is checked first, then the account
    /// collection. The matched account becomes the session.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, DermaError> {
        tokio::time::sleep(self.config.auth_latency).await;

        let main = Account::main_admin();
        let account = if email == main.email && password == main.password {
            main
        } else {
            self.accounts()?
                .into_iter()
                .find(|a| a.email == email && a.password == password)
                .ok_or(DermaError::InvalidCredentials)?
        };

        self.store_doc(SESSION_KEY, &account)?;
        info!(uid = %account.uid, role = %account.role, "session started");
        Ok(account)
    }

    /// Self-service registration for patients and students. The new account
    /// becomes the session.
    pub async fn register(&self, input: Registration) -> Result<Account, DermaError> {
        tokio::time::sleep(self.config.auth_latency).await;

        if input.role.is_admin_tier() {
            return Err(DermaError::PrivilegedRoleForbidden);
        }

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email == input.email) {
            return Err(DermaError::DuplicateEmail);
        }

        let account = Account {
            uid: new_time_id().to_string(),
            name: input.name,
            email: input.email,
            password: input.password,
            role: input.role,
            created_at: Some(now_rfc3339()),
            profile: input.profile,
        };

        accounts.push(account.clone());
        self.store_doc(ACCOUNTS_KEY, &accounts)?;
        self.store_doc(SESSION_KEY, &account)?;

        let who = if account.role == Role::Student { "Student" } else { "Patient" };
        self.record_audit(
            "New Registration",
            Some(&account),
            &format!("{} joined the platform", who),
        );
        info!(uid = %account.uid, role = %account.role, "account registered");
        Ok(account)
    }

    /// Create a sub-admin. Only the main admin may do this.
    pub fn create_sub_admin(&self, input: NewStaff, actor: &Account) -> Result<Account, DermaError> {
        if !actor.is_main_admin() {
            return Err(DermaError::Unauthorized);
        }

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email == input.email) {
            return Err(DermaError::DuplicateEmail);
        }

        let account = Account {
            uid: format!("admin_{}", new_time_id()),
            name: input.name,
            email: input.email,
            password: input.password,
            role: Role::Admin,
            created_at: Some(now_rfc3339()),
            profile: None,
        };

        accounts.push(account.clone());
        self.store_doc(ACCOUNTS_KEY, &accounts)?;
        self.record_audit(
            "Staff Created",
            Some(actor),
            &format!("Created sub-admin: {}", account.name),
        );
        Ok(account)
    }

    /// Remove a sub-admin by uid. Only the main admin may do this. An unknown
    /// uid is not an error; nothing is removed and nothing is logged.
    pub fn delete_sub_admin(&self, uid: &str, actor: &Account) -> Result<(), DermaError> {
        if !actor.is_main_admin() {
            return Err(DermaError::Unauthorized);
        }

        let mut accounts = self.accounts()?;
        let Some(pos) = accounts
            .iter()
            .position(|a| a.uid == uid && a.role == Role::Admin)
        else {
            return Ok(());
        };

        let removed = accounts.remove(pos);
        self.store_doc(ACCOUNTS_KEY, &accounts)?;
        self.record_audit(
            "Staff Deleted",
            Some(actor),
            &format!("Removed sub-admin: {}", removed.name),
        );
        Ok(())
    }

    /// Clear the session. Safe to call when nobody is logged in.
    pub fn end_session(&self) -> Result<(), DermaError> {
        self.kv.delete(SESSION_KEY)?;
        Ok(())
    }

    /// The logged-in account, if any. Never fails; an unreadable session is
    /// treated as no session.
    pub fn current_session(&self) -> Option<Account> {
        match self.load_doc::<Option<Account>>(SESSION_KEY) {
            Ok(session) => session,
            Err(e) => {
                warn!("unreadable session: {}", e);
                None
            }
        }
    }

    /// The full account collection in insertion order. Does not include the
    /// main admin.
    pub fn accounts(&self) -> Result<Vec<Account>, DermaError> {
        self.load_doc(ACCOUNTS_KEY)
    }

    pub(crate) fn find_account(&self, uid: &str) -> Result<Option<Account>, DermaError> {
        Ok(self.accounts()?.into_iter().find(|a| a.uid == uid))
    }
}
