//! DermaDetect: accounts, audit trail, diagnosis reports and the simulated
//! ensemble classifier behind the DermaDetect demo.
//!
//! # Components
//!
//! - **Identity**: one built-in main admin plus registered patients,
//!   students and sub-admins; a single persisted session
//! - **Audit log**: newest-first record of who did what
//! - **Reports**: per-account diagnosis history; images live in the
//!   [`cache::ImageCache`], not in the report document
//! - **Diagnosis**: inference call with an offline fallback, generative
//!   advice with a static catalog fallback
//! - **Clinics**: geocoded, keyword-filtered, distance-ranked clinic search
//!
//! # Usage
//!
//! ```ignore
//! use dermadetect::service::{DermaConfig, DermaService};
//!
//! let svc = DermaService::new(kv, blob, DermaConfig::default())?;
//! svc.images().spawn_preload();
//! let account = svc.authenticate("super@admin.com", "admin").await?;
//! ```

pub mod cache;
pub mod clinic;
pub mod diagnosis;
pub mod export;
pub mod model;
pub mod scan;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheState, ImageCache};
pub use scan::ImageUpload;
pub use service::{DermaConfig, DermaError, DermaService};
