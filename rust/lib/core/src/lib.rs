pub mod config;
pub mod error;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use types::{locale_date, locale_timestamp, new_time_id, now_rfc3339};
