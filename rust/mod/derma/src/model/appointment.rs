use serde::{Deserialize, Serialize};

/// A clinic visit booked by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    pub account_id: String,
    pub clinic_id: String,
    pub clinic_name: String,
    /// Requested visit date as entered (`YYYY-MM-DD`).
    pub date: String,
    /// Requested visit time as entered (`HH:MM`).
    pub time: String,
    pub created_at: String,
}
