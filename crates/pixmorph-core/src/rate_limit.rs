//! Rolling-window admission control for transformation requests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::{RateLimitConfig, RateLimitScope};
use crate::error::TransformError;
use crate::types::CallerId;

/// Key shared by every caller under [`RateLimitScope::Global`].
const GLOBAL_KEY: &str = "*";

/// Sliding-log rate limiter.
///
/// Each key keeps the instants of its admitted requests inside the window.
/// Rejected requests are not recorded, so hammering the limiter does not
/// extend the lockout. Keys with nothing left in the window are dropped by a
/// sweep that runs at most once per window.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Duration,
    log: Mutex<AdmissionLog>,
}

#[derive(Debug)]
struct AdmissionLog {
    by_key: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl AdmissionLog {
    /// Forget keys whose newest admission has left the window.
    fn sweep_idle(&mut self, now: Instant, window: Duration) {
        if now.saturating_duration_since(self.last_sweep) < window {
            return;
        }
        let before = self.by_key.len();
        self.by_key.retain(|_, admitted| {
            admitted
                .back()
                .is_some_and(|&t| now.saturating_duration_since(t) < window)
        });
        self.last_sweep = now;
        tracing::trace!("Rate limiter swept {} idle keys", before - self.by_key.len());
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            config,
            log: Mutex::new(AdmissionLog {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Admit or reject a request from `caller` now.
    pub fn check(&self, caller: &CallerId) -> Result<(), TransformError> {
        self.check_at(caller, Instant::now())
    }

    /// Admit or reject a request from `caller` at `now`.
    pub fn check_at(&self, caller: &CallerId, now: Instant) -> Result<(), TransformError> {
        if !self.config.enabled {
            return Ok(());
        }

        let key = match self.config.scope {
            RateLimitScope::PerCaller => caller.as_str(),
            RateLimitScope::Global => GLOBAL_KEY,
        };

        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        log.sweep_idle(now, self.window);
        let admitted = log.by_key.entry(key.to_string()).or_default();

        while admitted
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.window)
        {
            admitted.pop_front();
        }

        if admitted.len() >= self.config.max_requests as usize {
            let oldest = admitted.front().copied().unwrap_or(now);
            let reopens = (oldest + self.window).saturating_duration_since(now);
            let retry_after_secs = reopens.as_secs() + u64::from(reopens.subsec_nanos() > 0);
            tracing::warn!(
                "Rate limit hit for {}: {} requests in {}s",
                caller,
                admitted.len(),
                self.config.window_secs
            );
            return Err(TransformError::RateLimitExceeded {
                limit: self.config.max_requests,
                window_secs: self.config.window_secs,
                retry_after_secs: retry_after_secs.max(1),
            });
        }

        admitted.push_back(now);
        Ok(())
    }
}
