use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role. `Admin` and `MainAdmin` form the admin tier, which cannot be
/// reached through self-service registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Student,
    Admin,
    MainAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Student => "student",
            Role::Admin => "admin",
            Role::MainAdmin => "main_admin",
        }
    }

    pub fn is_admin_tier(self) -> bool {
        matches!(self, Role::Admin | Role::MainAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "main_admin" => Ok(Role::MainAdmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Optional patient profile fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
}

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Time-based id (`1718000000000`, `admin_1718000000000`, or the built-in
    /// `super_admin_001`).
    pub uid: String,

    /// Display name.
    pub name: String,

    /// Email address. Unique within the account collection.
    pub email: String,

    /// Plaintext credential. This is a demo identity store.
    pub password: String,

    pub role: Role,

    /// RFC 3339 creation timestamp. Absent for the built-in main admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

pub const MAIN_ADMIN_UID: &str = "super_admin_001";
pub const MAIN_ADMIN_NAME: &str = "Main Administrator";
pub const MAIN_ADMIN_EMAIL: &str = "super@admin.com";
pub const MAIN_ADMIN_PASSWORD: &str = "admin";

impl Account {
    /// The single built-in main admin. Never stored in the account collection.
    pub fn main_admin() -> Self {
        Self {
            uid: MAIN_ADMIN_UID.to_string(),
            name: MAIN_ADMIN_NAME.to_string(),
            email: MAIN_ADMIN_EMAIL.to_string(),
            password: MAIN_ADMIN_PASSWORD.to_string(),
            role: Role::MainAdmin,
            created_at: None,
            profile: None,
        }
    }

    pub fn is_main_admin(&self) -> bool {
        self.role == Role::MainAdmin
    }

    pub fn age(&self) -> Option<u32> {
        self.profile.as_ref().and_then(|p| p.age)
    }

    pub fn gender(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.gender.as_deref())
    }

    pub fn medical_history(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.medical_history.as_deref())
            .filter(|h| !h.trim().is_empty())
    }
}

/// Input for self-service registration.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Input for creating a sub-admin. The role is always `admin`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serde_is_snake_case() {
        assert_eq!(serde_json::to_string(&Role::MainAdmin).unwrap(), "\"main_admin\"");
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
        assert_eq!("Main_Admin".parse::<Role>().unwrap(), Role::MainAdmin);
        assert!("doctor".parse::<Role>().is_err());
    }

    #[test]
    fn admin_tier() {
        assert!(Role::Admin.is_admin_tier());
        assert!(Role::MainAdmin.is_admin_tier());
        assert!(!Role::Patient.is_admin_tier());
        assert!(!Role::Student.is_admin_tier());
    }

    #[test]
    fn optional_profile_is_omitted() {
        let json = serde_json::to_value(Account::main_admin()).unwrap();
        assert!(json.get("profile").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["role"], "main_admin");
    }

    #[test]
    fn blank_medical_history_counts_as_none() {
        let mut account = Account::main_admin();
        account.profile = Some(Profile {
            medical_history: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(account.medical_history(), None);
    }
}
