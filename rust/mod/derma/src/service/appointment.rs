use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use dermadetect_core::{new_time_id, now_rfc3339};

use crate::model::{Account, Appointment};
use crate::service::{DermaError, DermaService};

fn appointments_key(account_id: &str) -> String {
    format!("derma:appointments:{}", account_id)
}

impl DermaService {
    /// Book a visit at a clinic. `date` is `YYYY-MM-DD`, `time` is `HH:MM`.
    pub fn book_appointment(
        &self,
        account: &Account,
        clinic_id: &str,
        clinic_name: &str,
        date: &str,
        time: &str,
    ) -> Result<Appointment, DermaError> {
        let date = date.trim();
        let time = time.trim();
        if date.is_empty() || time.is_empty() {
            return Err(DermaError::Validation("date and time are required".into()));
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| DermaError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", date)))?;
        NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| DermaError::Validation(format!("invalid time '{}', expected HH:MM", time)))?;
        if clinic_name.trim().is_empty() {
            return Err(DermaError::Validation("clinic name is required".into()));
        }

        let appointment = Appointment {
            id: new_time_id(),
            account_id: account.uid.clone(),
            clinic_id: clinic_id.to_string(),
            clinic_name: clinic_name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            created_at: now_rfc3339(),
        };

        let key = appointments_key(&account.uid);
        let mut list: Vec<Appointment> = self.load_doc(&key)?;
        list.insert(0, appointment.clone());
        self.store_doc(&key, &list)?;

        self.record_audit(
            "Appointment Booked",
            Some(account),
            &format!("Booked {} on {} at {}", clinic_name, date, time),
        );
        info!(uid = %account.uid, clinic = clinic_id, "appointment booked");
        Ok(appointment)
    }

    /// Appointments for `account_id`, newest first.
    pub fn list_appointments(&self, account_id: &str) -> Result<Vec<Appointment>, DermaError> {
        self.load_doc(&appointments_key(account_id))
    }
}
