//! Timestamp assignment for automatically timestamped writes.
//!
//! Timestamps only need to be consistent within one row. Inside one process
//! the monotonic clock is the single authority, so two writers never receive
//! the same timestamp. Writers in different processes must bring their own
//! timestamps from whatever component commits their batches.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AutoTimestamp;

/// The last timestamp handed out by [`next_monotonic_millis`].
static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(i64::MIN);

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
pub fn wall_clock_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

/// Returns a timestamp strictly greater than every one returned before it
/// in this process.
///
/// Tracks the wall clock, but runs ahead of it when called more than once
/// per millisecond or when the wall clock steps backwards.
pub fn next_monotonic_millis() -> i64 {
    let now = wall_clock_millis();
    let mut last = LAST_TIMESTAMP.load(Ordering::Acquire);
    loop {
        let next = now.max(last.saturating_add(1));
        match LAST_TIMESTAMP.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// The timestamp requested for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteTimestamp {
    /// Let the store assign the timestamp.
    #[default]
    Auto,

    /// Write at exactly this timestamp.
    At(i64),
}

impl WriteTimestamp {
    /// Returns the effective timestamp, drawing from `source` for `Auto`.
    pub(crate) fn resolve(self, source: AutoTimestamp) -> i64 {
        match self {
            WriteTimestamp::At(ts) => ts,
            WriteTimestamp::Auto => assign(source),
        }
    }
}

impl From<i64> for WriteTimestamp {
    fn from(ts: i64) -> Self {
        WriteTimestamp::At(ts)
    }
}

/// Resolves an automatic timestamp with the configured source.
pub(crate) fn assign(source: AutoTimestamp) -> i64 {
    match source {
        AutoTimestamp::Monotonic => next_monotonic_millis(),
        AutoTimestamp::WallClock => wall_clock_millis(),
    }
}
