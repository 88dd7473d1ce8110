use inventory_client_core::{FileStore, LoginThrottle};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Interactive walk-through of the login lockout.
///
/// Every line entered counts as a failed login for the given email; type `ok`
/// to simulate a successful login. Records are kept under `./data` (or
/// `INVENTORY_STATE_DIR`) so the lock survives restarts.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let dir = std::env::var("INVENTORY_STATE_DIR").unwrap_or_else(|_| "./data".to_string());
    let throttle = LoginThrottle::new(Arc::new(FileStore::open(&dir)?));

    let cleared = throttle.cleanup_expired_locks();
    if cleared > 0 {
        println!("🧹 Cleared {} expired lockout(s)", cleared);
    }

    let email = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "admin@example.com".to_string());
    println!("🔐 Simulating logins for {} (state in {})\n", email, dir);

    let stdin = io::stdin();
    loop {
        let status = throttle.is_locked(&email);
        if let Some(seconds) = status.remaining_seconds {
            println!("⛔ Locked, try again in {}s", seconds);
        }

        print!("password> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;

        if status.locked {
            continue;
        }

        if line.trim() == "ok" {
            throttle.reset_attempts(&email);
            println!("✅ Logged in, attempts reset\n");
            continue;
        }

        let outcome = throttle.record_failed_attempt(&email);
        if outcome.locked {
            println!(
                "❌ Too many failed attempts, locked for {}s",
                outcome.remaining_seconds.unwrap_or_default()
            );
        } else {
            println!(
                "❌ Wrong password, {} attempt(s) remaining",
                throttle.attempts_remaining(&outcome)
            );
        }
    }

    Ok(())
}
