use std::time::Duration;

/// Highest estimate shown while a task is still pending.
pub const PENDING_PROGRESS_CAP: u8 = 95;

/// Client-side progress heuristic: elapsed server time over an assumed
/// duration, rounded, capped at [`PENDING_PROGRESS_CAP`]. Not a measurement.
pub fn estimate_progress(elapsed_secs: f64, assumed_duration: Duration) -> u8 {
    if elapsed_secs.is_nan() || elapsed_secs <= 0.0 {
        return 0;
    }
    let total = assumed_duration.as_secs_f64();
    if total <= 0.0 {
        return PENDING_PROGRESS_CAP;
    }
    let percent = (elapsed_secs / total * 100.0).round();
    percent.min(f64::from(PENDING_PROGRESS_CAP)) as u8
}

/// How status checks are spaced and when the client gives up.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Multiplier applied per pending response; 1.0 keeps the interval fixed.
    pub backoff_factor: f64,
    /// Upper bound for a backed-off delay. Never below `interval`.
    pub max_interval: Duration,
    /// Pending responses tolerated before giving up; `None` polls forever.
    pub max_attempts: Option<u32>,
    /// Denominator of the progress heuristic.
    pub assumed_duration: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            backoff_factor: 1.0,
            max_interval: Duration::from_secs(30),
            max_attempts: Some(300),
            assumed_duration: Duration::from_secs(120),
        }
    }
}

impl PollPolicy {
    /// Delay before the check that follows the `attempt`-th pending response
    /// (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let cap = self.max_interval.max(self.interval);
        if self.backoff_factor <= 1.0 || attempt <= 1 {
            return self.interval.min(cap);
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = self.interval.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(scaled)
            .map(|delay| delay.min(cap))
            .unwrap_or(cap)
    }

    /// Whether another check may follow `attempts` pending responses.
    pub fn allows_another_attempt(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    pub fn estimate(&self, elapsed_secs: f64) -> u8 {
        estimate_progress(elapsed_secs, self.assumed_duration)
    }
}
