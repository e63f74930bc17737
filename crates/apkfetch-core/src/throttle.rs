//! Attempt counting and backoff.
//!
//! Both backends rate-limit clients. The run pauses briefly after every
//! `threshold` attempts and for the longer cooldown whenever an attempt ends
//! with an overload signal from the backend.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleSettings {
    /// Periodic pauses are only issued when enabled; overload cooldowns
    /// always are.
    pub enabled: bool,
    pub threshold: u32,
    pub throttle: Duration,
    pub cooldown: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 10,
            throttle: Duration::from_secs(60),
            cooldown: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    Periodic,
    Overload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    pub duration: Duration,
    pub reason: PauseReason,
}

impl fmt::Display for Pause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let why = match self.reason {
            PauseReason::Periodic => "throttling",
            PauseReason::Overload => "backend overloaded, cooling down",
        };
        write!(f, "{why} for {}s", self.duration.as_secs())
    }
}

/// Process-wide attempt counter. One per run.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    settings: ThrottleSettings,
    attempts: u64,
}

impl RateLimiter {
    pub fn new(settings: ThrottleSettings) -> Self {
        Self {
            settings,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Counts one attempt and returns the pause due before the next one.
    ///
    /// An overload always yields the cooldown. When the periodic throttle
    /// falls due on the same attempt a single cooldown-length pause covers
    /// both.
    pub fn record_attempt(&mut self, overloaded: bool) -> Option<Pause> {
        self.attempts += 1;

        if overloaded {
            return Some(Pause {
                duration: self.settings.cooldown,
                reason: PauseReason::Overload,
            });
        }

        let threshold = u64::from(self.settings.threshold);
        if self.settings.enabled && threshold > 0 && self.attempts % threshold == 0 {
            return Some(Pause {
                duration: self.settings.throttle,
                reason: PauseReason::Periodic,
            });
        }
        None
    }
}

/// Whether an error message says the backend is throttling us.
pub fn signals_overload(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["busy", "too many requests", "rate limit", "rate-limit"]
        .iter()
        .any(|needle| message.contains(needle))
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
