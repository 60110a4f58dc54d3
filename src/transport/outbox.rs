//! Outbound request queue.
//!
//! Requests are queued from anywhere (client calls, message handlers) and
//! written by the connection event loop, which is the only writer. Requests
//! queued before the WebSocket is up wait in the channel.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::Request;

// ============================================================================
// Outbox
// ============================================================================

/// Sending half of the outbound queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Request>,
}

/// Receiving half of the outbound queue, drained by the event loop.
pub type OutboxReceiver = mpsc::UnboundedReceiver<Request>;

impl Outbox {
    /// Creates a connected queue pair.
    #[must_use]
    pub fn channel() -> (Self, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop is gone.
    pub fn send(&self, request: Request) -> Result<()> {
        trace!(request = request.label(), "Request queued");
        self.tx.send(request).map_err(|_| Error::ConnectionClosed)
    }
}

// ============================================================================
// Tests
// ============================================================================
