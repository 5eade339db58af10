//! Rotation policies for the rolling file sink (§6): rotate when the active
//! file crosses a size threshold, when a time period elapses, or both
//! (hybrid — whichever fires first).

use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Hourly,
    Daily,
}

impl Period {
    /// The period-aligned bucket a timestamp falls into, used to detect a
    /// period boundary crossing.
    pub fn bucket(&self, ts: SystemTime) -> i64 {
        let secs = ts.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_secs() as i64;
        match self {
            Period::Hourly => secs / 3600,
            Period::Daily => secs / 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    Size(u64),
    Time(Period),
    Hybrid { max_bytes: u64, period: Period },
    Never,
}

/// Tracks what's needed to decide if the next write should rotate first.
pub struct RotationState {
    pub bytes_written: u64,
    pub period_bucket: i64,
}

impl RotationState {
    pub fn new(policy: &RotationPolicy, now: SystemTime) -> Self {
        let period_bucket = match policy {
            RotationPolicy::Time(p) | RotationPolicy::Hybrid { period: p, .. } => p.bucket(now),
            _ => 0,
        };
        Self { bytes_written: 0, period_bucket }
    }

    /// Should the active file rotate before accepting `incoming_len` more
    /// bytes at `now`?
    pub fn should_rotate(&self, policy: &RotationPolicy, incoming_len: u64, now: SystemTime) -> bool {
        match policy {
            RotationPolicy::Never => false,
            RotationPolicy::Size(max) => self.bytes_written + incoming_len > *max,
            RotationPolicy::Time(p) => p.bucket(now) != self.period_bucket,
            RotationPolicy::Hybrid { max_bytes, period } => {
                self.bytes_written + incoming_len > *max_bytes || period.bucket(now) != self.period_bucket
            }
        }
    }

    pub fn record_write(&mut self, len: u64) {
        self.bytes_written += len;
    }

    pub fn reset(&mut self, policy: &RotationPolicy, now: SystemTime) {
        self.bytes_written = 0;
        self.period_bucket = match policy {
            RotationPolicy::Time(p) | RotationPolicy::Hybrid { period: p, .. } => p.bucket(now),
            _ => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn size_policy_rotates_past_threshold() {
        let policy = RotationPolicy::Size(100);
        let mut state = RotationState::new(&policy, SystemTime::now());
        state.record_write(90);
        assert!(!state.should_rotate(&policy, 5, SystemTime::now()));
        assert!(state.should_rotate(&policy, 20, SystemTime::now()));
    }

    #[test]
    fn time_policy_rotates_on_bucket_change() {
        let policy = RotationPolicy::Time(Period::Hourly);
        let now = SystemTime::now();
        let state = RotationState::new(&policy, now);
        assert!(!state.should_rotate(&policy, 1, now));
        assert!(state.should_rotate(&policy, 1, now + Duration::from_secs(3601)));
    }

    #[test]
    fn hybrid_rotates_on_either_trigger() {
        let policy = RotationPolicy::Hybrid { max_bytes: 100, period: Period::Daily };
        let now = SystemTime::now();
        let mut state = RotationState::new(&policy, now);
        state.record_write(50);
        assert!(state.should_rotate(&policy, 60, now));
        assert!(state.should_rotate(&policy, 1, now + Duration::from_secs(86_401)));
    }
}
