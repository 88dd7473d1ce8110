use super::{AttemptOutcome, AttemptStore, Clock, LockStatus, LoginAttemptRecord, SystemClock};
use crate::types::{ClientError, Result};
use crate::types::constants::{LOCKOUT_DURATION_SECS, LOGIN_ATTEMPTS_KEY, MAX_LOGIN_ATTEMPTS};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Threshold and lockout length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_attempts: u32,
    pub lockout: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            lockout: Duration::from_secs(LOCKOUT_DURATION_SECS),
        }
    }
}

/// Client-side cooldown for repeated failed logins.
///
/// Counts failures per identifier and locks the identifier for
/// [`ThrottlePolicy::lockout`] once [`ThrottlePolicy::max_attempts`] is
/// reached. Records live in an [`AttemptStore`] under a single key.
///
/// This is a deterrent, not a security boundary: every storage failure is
/// logged and treated as "no records", so the throttle fails open and never
/// returns an error.
pub struct LoginThrottle {
    store: Arc<dyn AttemptStore>,
    clock: Arc<dyn Clock>,
    policy: ThrottlePolicy,
    // Serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl LoginThrottle {
    pub fn new(store: Arc<dyn AttemptStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            policy: ThrottlePolicy::default(),
            guard: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: ThrottlePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ThrottlePolicy {
        self.policy
    }

    /// Whether `email` is currently locked out.
    ///
    /// An elapsed lock is cleared as a side effect, so the next failed
    /// attempt counts from one again.
    pub fn is_locked(&self, email: &str) -> LockStatus {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let mut records = self.load();

        let Some(index) = records.iter().position(|r| r.email == email) else {
            return LockStatus::unlocked();
        };

        if let Some(seconds) = records[index].remaining_seconds(now) {
            return LockStatus::locked_for(seconds);
        }

        if records[index].lock_expired(now) {
            tracing::debug!("Lockout for {} elapsed, clearing record", email);
            records.remove(index);
            self.save(&records);
        }
        LockStatus::unlocked()
    }

    /// Counts one failed login for `email`, locking it once the threshold is
    /// reached.
    pub fn record_failed_attempt(&self, email: &str) -> AttemptOutcome {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let mut records = self.load();

        let index = match records.iter().position(|r| r.email == email) {
            Some(index) => index,
            None => {
                records.push(LoginAttemptRecord::new(email));
                records.len() - 1
            }
        };

        let record = &mut records[index];
        if record.lock_expired(now) {
            record.attempts = 0;
            record.locked_until = None;
        }

        record.attempts = record.attempts.saturating_add(1);
        let attempts = record.attempts;

        let outcome = if attempts >= self.policy.max_attempts {
            let lockout = chrono::Duration::from_std(self.policy.lockout)
                .unwrap_or_else(|_| chrono::Duration::seconds(LOCKOUT_DURATION_SECS as i64));
            record.locked_until = Some(now + lockout);
            tracing::warn!(
                "Login for {} locked for {}s after {} failed attempts",
                email,
                self.policy.lockout.as_secs(),
                attempts
            );
            AttemptOutcome {
                locked: true,
                remaining_seconds: Some(self.policy.lockout.as_secs()),
                attempts,
            }
        } else {
            tracing::debug!(
                "Failed login {} of {} for {}",
                attempts,
                self.policy.max_attempts,
                email
            );
            AttemptOutcome {
                locked: false,
                remaining_seconds: None,
                attempts,
            }
        };

        self.save(&records);
        outcome
    }

    /// Forgets every failure for `email`; call after a successful login
    pub fn reset_attempts(&self, email: &str) {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load();
        let before = records.len();
        records.retain(|r| r.email != email);
        if records.len() != before {
            self.save(&records);
        }
    }

    /// Drops every record whose lock has elapsed. Meant to run once at
    /// startup. Returns how many records were removed.
    pub fn cleanup_expired_locks(&self) -> usize {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let mut records = self.load();
        let before = records.len();
        records.retain(|r| !r.lock_expired(now));

        let removed = before - records.len();
        if removed > 0 {
            tracing::info!("Cleared {} expired login lockout(s)", removed);
            self.save(&records);
        }
        removed
    }

    /// Failures left before `email` gets locked
    pub fn attempts_remaining(&self, outcome: &AttemptOutcome) -> u32 {
        self.policy.max_attempts.saturating_sub(outcome.attempts)
    }

    fn load(&self) -> Vec<LoginAttemptRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Ignoring unreadable login attempt records: {}", e);
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<LoginAttemptRecord>> {
        match self.store.get(LOGIN_ATTEMPTS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[LoginAttemptRecord]) {
        let result = serde_json::to_string(records)
            .map_err(ClientError::from)
            .and_then(|json| self.store.set(LOGIN_ATTEMPTS_KEY, &json));
        if let Err(e) = result {
            tracing::warn!("Failed to persist login attempt records: {}", e);
        }
    }
}
