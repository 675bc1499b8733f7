use crate::foundation::RestakeError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp_secs_env(env_var: Option<&str>) -> Result<u64, RestakeError> {
    if let Some(var) = env_var {
        if let Ok(value) = std::env::var(var) {
            return value.trim().parse::<u64>().map_err(|err| RestakeError::Message(format!("invalid {var}: {err}")));
        }
    }
    let now = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|err| RestakeError::Message(err.to_string()))?;
    Ok(now.as_secs())
}

/// Returns the current wall-clock timestamp in unix seconds.
///
/// For test determinism, this respects `TEST_NOW_SECS_ENV_VAR` when set.
pub fn now_secs() -> u64 {
    current_timestamp_secs_env(Some(crate::foundation::constants::TEST_NOW_SECS_ENV_VAR))
        .or_else(|_| current_timestamp_secs_env(None))
        .unwrap_or(0)
}

/// Source of "now" for expiration and deadline math.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        now_secs()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_secs(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
