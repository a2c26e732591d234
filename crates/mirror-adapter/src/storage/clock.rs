//! MonotonicClock - Millisecond wall-clock stamps that never repeat

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use mirror_domain::{StampSource, StampToken};

/// `YYYYMMDDhhmmssmmm` in local time
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Issues wall-clock stamps, bumping by one when two calls land in the same
/// millisecond (or the clock steps back).
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicU64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_after(&self, now: u64) -> u64 {
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

impl StampSource for MonotonicClock {
    fn next_stamp(&self) -> StampToken {
        let now = Local::now()
            .format(STAMP_FORMAT)
            .to_string()
            .parse::<u64>()
            .unwrap_or_default();
        StampToken::from_number(self.next_after(now))
    }
}
