use serde::Serialize;

use crate::model::{Account, Report, Role};
use crate::service::{DermaError, DermaService};

/// Head counts shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryStats {
    pub patients: usize,
    pub students: usize,
    pub sub_admins: usize,
    pub reports: usize,
}

impl DermaService {
    /// Patients and students, in registration order.
    pub fn list_users(&self) -> Result<Vec<Account>, DermaError> {
        self.accounts_with(|r| matches!(r, Role::Patient | Role::Student))
    }

    pub fn list_patients(&self) -> Result<Vec<Account>, DermaError> {
        self.accounts_with(|r| r == Role::Patient)
    }

    /// Sub-admins. The built-in main admin is not included.
    pub fn list_admins(&self) -> Result<Vec<Account>, DermaError> {
        self.accounts_with(|r| r == Role::Admin)
    }

    pub fn directory_stats(&self) -> Result<DirectoryStats, DermaError> {
        let accounts = self.accounts()?;
        let count = |role: Role| accounts.iter().filter(|a| a.role == role).count();

        let mut reports = 0;
        for (key, bytes) in self.kv.scan("derma:reports:")? {
            let list: Vec<Report> = serde_json::from_slice(&bytes)
                .map_err(|e| DermaError::Internal(format!("decode {}: {}", key, e)))?;
            reports += list.len();
        }

        Ok(DirectoryStats {
            patients: count(Role::Patient),
            students: count(Role::Student),
            sub_admins: count(Role::Admin),
            reports,
        })
    }

    fn accounts_with(&self, keep: impl Fn(Role) -> bool) -> Result<Vec<Account>, DermaError> {
        Ok(self.accounts()?.into_iter().filter(|a| keep(a.role)).collect())
    }
}
