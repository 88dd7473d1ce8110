//! Failed-login counting with a timed lockout.

mod clock;
mod limiter;
mod record;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{LoginThrottle, ThrottlePolicy};
pub use record::{AttemptOutcome, LockStatus, LoginAttemptRecord};
pub use store::{AttemptStore, FileStore, MemoryStore};
