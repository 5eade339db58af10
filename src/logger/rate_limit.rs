//! Token-bucket rate limiting for the logger's record throughput (§4.5,
//! P7). Refills continuously against a monotonic clock rather than in
//! discrete fixed windows, so a burst right at a window boundary can't
//! double the effective rate.

use parking_lot::Mutex;
use std::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity: capacity as f64,
            refill_per_sec,
            bucket: Mutex::new(Bucket { tokens: capacity as f64, last_refill: Instant::now() }),
        }
    }

    /// Try to take one token. Returns `false` if the bucket is empty.
    /// Validation-warning records never call this — they're exempt from
    /// rate limiting so a misconfigured template doesn't also silently
    /// suppress its own warning.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
