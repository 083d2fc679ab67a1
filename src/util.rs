use std::{
    sync::atomic::{AtomicU64, Ordering},
    time,
};

/// Latest timestamp handed out by [`now_millis`].
static LAST_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Get the current system time in epoch milliseconds.
///
/// Successive calls within one process never go backwards, even when the
/// wall clock is stepped back.
///
/// # Panics
///
/// Panics if the system time is before epoch.
pub fn now_millis() -> u64 {
    let now = time::SystemTime::now()
        .duration_since(time::UNIX_EPOCH)
        .expect("system time is before epoch")
        .as_millis();
    let now = u64::try_from(now).unwrap_or(u64::MAX);

    let previous = LAST_MILLIS.fetch_max(now, Ordering::AcqRel);
    now.max(previous)
}
