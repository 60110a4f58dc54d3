//! Protocol socket.
//!
//! The [`Socket`] is the protocol state machine sitting between the
//! transport and the client. It does no I/O of its own: the transport feeds
//! it through [`on_open`](Socket::on_open), [`on_message`](Socket::on_message)
//! and [`on_close`](Socket::on_close), and everything it wants to send goes
//! to the [`Outbox`].
//!
//! ```text
//! transport ──on_message──► Frame::decode ──► FrameRouter ──► MessageRouter
//!                                                                 │
//!                         Outbox ◄── subscribe / call / pong ◄────┤
//!                                                                 ▼
//!                                                           SessionState
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use crate::error::Result;
use crate::identifiers::{RequestCounter, RequestId, SubscriptionId};
use crate::protocol::{Frame, Method, Request, Subscription, envelope};
use crate::router::{FrameRouter, MessageHandler, MessageRouter};
use crate::transport::Outbox;

use super::handlers;
use super::state::SessionState;

// ============================================================================
// Constants
// ============================================================================

/// Tracing target for raw frames.
pub const TRAFFIC_TARGET: &str = "lv20_client::traffic";

// ============================================================================
// Socket
// ============================================================================

/// Protocol state machine for one connection.
pub struct Socket {
    state: SessionState,
    outbox: Outbox,
    request_ids: RequestCounter,
    frames: FrameRouter<Socket>,
    messages: MessageRouter<Socket>,
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("state", &self.state.snapshot())
            .field("frames", &self.frames)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Socket - Constructor
// ============================================================================

impl Socket {
    /// Creates a socket with the built-in frame and message handlers.
    #[must_use]
    pub fn new(outbox: Outbox) -> Self {
        let mut socket = Self {
            state: SessionState::new(),
            outbox,
            request_ids: RequestCounter::new(),
            frames: FrameRouter::new(),
            messages: MessageRouter::new(),
        };

        handlers::install(&mut socket.frames, &mut socket.messages);

        socket
    }

    /// Appends a frame handler after the built-in ones.
    pub fn bind_frame<F>(&mut self, tag: char, handler: F)
    where
        F: Fn(&Socket, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.frames.bind(tag, handler);
    }

    /// Appends a message handler after the built-in ones.
    pub fn register_message(&mut self, handler: MessageHandler<Socket>) {
        self.messages.register(handler);
    }
}

// ============================================================================
// Socket - Transport Callbacks
// ============================================================================

impl Socket {
    /// Transport connected.
    pub fn on_open(&self) {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        debug!(connected_at = millis, "WebSocket is now connected");
        self.state.set_connected_at(millis);
    }

    /// Transport closed.
    pub fn on_close(&self) {
        debug!("WebSocket is now closed");
        self.state.mark_closed();
    }

    /// Dispatches one inbound text message.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`](crate::Error::Protocol) for empty frames or bad envelopes
    /// - [`Error::UnhandledFrame`](crate::Error::UnhandledFrame) if no handler claims the tag
    /// - any error raised by a message handler action
    pub fn on_message(&self, text: &str) -> Result<()> {
        let frame = Frame::decode(text)?;
        trace!(target: TRAFFIC_TARGET, tag = %frame.tag, payload = %frame.payload, "[<-]");

        self.frames.route(self, &frame)?;
        Ok(())
    }

    /// Decodes an answer payload and routes the message.
    ///
    /// Returns the number of message handlers that ran.
    ///
    /// # Errors
    ///
    /// Returns envelope decoding errors and handler action errors.
    pub fn process(&self, payload: &str) -> Result<usize> {
        let message = envelope::decode(payload)?;
        self.messages.route(self, &message)
    }
}

// ============================================================================
// Socket - Outbound
// ============================================================================

impl Socket {
    /// Queues a raw request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the outbox is closed.
    #[inline]
    pub fn send(&self, request: Request) -> Result<()> {
        self.outbox.send(request)
    }

    /// Queues a subscription with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the outbox is closed.
    pub fn subscribe(&self, subscription: &Subscription) -> Result<SubscriptionId> {
        let id = SubscriptionId::generate();
        self.send(Request::subscribe(subscription, id.clone()))?;
        Ok(id)
    }

    /// Queues a method call with the next request id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the outbox is closed.
    pub fn call(&self, method: &Method) -> Result<RequestId> {
        let id = self.request_ids.next_id();
        debug!(%method, %id, "Calling method");
        self.send(Request::call(method, id))?;
        Ok(id)
    }
}

// ============================================================================
// Socket - Accessors
// ============================================================================

impl Socket {
    /// Returns the session state handle.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
