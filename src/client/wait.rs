//! Bounded waits on session state.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, timeout};

use crate::session::Session;

// ============================================================================
// Wait
// ============================================================================

/// Waits until `predicate` holds for the current session, or `limit` elapses.
///
/// Wakes on every state change and at least once per `interval`. Returns
/// `false` on timeout or when the state channel closes.
pub(crate) async fn wait_until<F>(
    mut rx: watch::Receiver<Session>,
    predicate: F,
    interval: Duration,
    limit: Duration,
) -> bool
where
    F: Fn(&Session) -> bool,
{
    let deadline = Instant::now() + limit;

    loop {
        if predicate(&rx.borrow_and_update()) {
            return true;
        }

        let now = Instant::now();
        if now >= deadline {
            return false;
        }

        let step = interval.min(deadline - now);
        if let Ok(Err(_)) = timeout(step, rx.changed()).await {
            return false;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
