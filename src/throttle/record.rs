use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted failed-login bookkeeping for one account identifier.
///
/// Stored as one element of the JSON array kept under
/// [`LOGIN_ATTEMPTS_KEY`](crate::types::constants::LOGIN_ATTEMPTS_KEY):
/// `{ "email": "...", "attempts": 2, "lockedUntil": 1718000000000 }`, where
/// `lockedUntil` is epoch milliseconds and omitted when not locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttemptRecord {
    pub email: String,
    pub attempts: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginAttemptRecord {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            attempts: 0,
            locked_until: None,
        }
    }

    /// Whole seconds left on the lock, rounded up. `None` when there is no
    /// lock or it has elapsed at `now`.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<u64> {
        let locked_until = self.locked_until?;
        if locked_until <= now {
            return None;
        }
        // Sub-millisecond remainders still count as a whole second
        let nanos = (locked_until - now).num_nanoseconds().unwrap_or(i64::MAX);
        Some((nanos as u64).div_ceil(1_000_000_000))
    }

    /// A lock was set and has already run out
    pub fn lock_expired(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until <= now)
    }
}

/// Answer to [`LoginThrottle::is_locked`](super::LoginThrottle::is_locked)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
}

impl LockStatus {
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            remaining_seconds: None,
        }
    }

    pub fn locked_for(seconds: u64) -> Self {
        Self {
            locked: true,
            remaining_seconds: Some(seconds),
        }
    }
}

/// Answer to
/// [`LoginThrottle::record_failed_attempt`](super::LoginThrottle::record_failed_attempt)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_wire_shape() {
        let locked = LoginAttemptRecord {
            email: "a@b.com".to_string(),
            attempts: 3,
            locked_until: Some(Utc.timestamp_millis_opt(1_718_000_060_000).unwrap()),
        };
        let open = LoginAttemptRecord {
            attempts: 1,
            ..LoginAttemptRecord::new("c@d.com")
        };

        let json = serde_json::to_value(vec![locked.clone(), open.clone()]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"email": "a@b.com", "attempts": 3, "lockedUntil": 1_718_000_060_000i64},
                {"email": "c@d.com", "attempts": 1}
            ])
        );

        let parsed: Vec<LoginAttemptRecord> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, vec![locked, open]);
    }

    #[test]
    fn test_remaining_seconds_rounds_up() {
        let now = Utc.timestamp_millis_opt(1_000_000).unwrap();
        let record = LoginAttemptRecord {
            locked_until: Some(now + chrono::Duration::milliseconds(59_001)),
            ..LoginAttemptRecord::new("a@b.com")
        };

        assert_eq!(record.remaining_seconds(now), Some(60));
        assert_eq!(
            record.remaining_seconds(now + chrono::Duration::milliseconds(59_000)),
            Some(1)
        );
        assert_eq!(
            record.remaining_seconds(now + chrono::Duration::milliseconds(59_001)),
            None
        );
        assert!(record.lock_expired(now + chrono::Duration::seconds(60)));
        assert!(!record.lock_expired(now));
    }

    #[test]
    fn test_lock_in_last_millisecond_is_still_locked() {
        let now = Utc.timestamp_millis_opt(5_000_000).unwrap();
        let record = LoginAttemptRecord {
            attempts: 3,
            locked_until: Some(now + chrono::Duration::microseconds(400)),
            ..LoginAttemptRecord::new("a@b.com")
        };

        assert_eq!(record.remaining_seconds(now), Some(1));
        assert!(!record.lock_expired(now));

        let later = now + chrono::Duration::nanoseconds(399_999);
        assert_eq!(record.remaining_seconds(later), Some(1));
        assert!(!record.lock_expired(later));

        let at_expiry = now + chrono::Duration::microseconds(400);
        assert_eq!(record.remaining_seconds(at_expiry), None);
        assert!(record.lock_expired(at_expiry));
    }
}
