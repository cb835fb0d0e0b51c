pub mod account;
pub mod appointment;
pub mod audit;
pub mod case;
pub mod clinic;
pub mod report;

pub use account::{Account, NewStaff, Profile, Registration, Role};
pub use appointment::Appointment;
pub use audit::AuditEntry;
pub use case::CaseStudy;
pub use clinic::{Clinic, ClinicSearch};
pub use report::{Advice, Diagnosis, ModelVote, Report};
