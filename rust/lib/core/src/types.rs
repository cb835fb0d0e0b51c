use std::sync::atomic::{AtomicU64, Ordering};

static LAST_TIME_ID: AtomicU64 = AtomicU64::new(0);

/// Generate a time-based id: the current Unix time in milliseconds.
///
/// Ids are strictly increasing within one process. When two ids are requested
/// in the same millisecond the second one is bumped past the first.
pub fn new_time_id() -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_TIME_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_TIME_ID.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Local wall-clock timestamp in the `M/D/YYYY, h:mm:ss AM` form shown in
/// the audit log.
pub fn locale_timestamp() -> String {
    chrono::Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Local date in the `M/D/YYYY` form shown on reports.
pub fn locale_date() -> String {
    chrono::Local::now().format("%-m/%-d/%Y").to_string()
}
