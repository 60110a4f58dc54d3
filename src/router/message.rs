//! Message dispatch by kind and predicate.
//!
//! Handlers are evaluated in registration order: a handler's predicate sees
//! the state left behind by the actions of earlier handlers. Unlike frames,
//! an unmatched message is only logged, because the server speaks far more
//! message kinds than the client understands.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, trace};

use crate::error::Result;
use crate::protocol::Message;

// ============================================================================
// Types
// ============================================================================

/// Predicate deciding whether a handler accepts a message.
///
/// An `Err` (typically a failed path lookup) counts as "no match".
pub type Predicate<C> = Box<dyn Fn(&C, &Message) -> Result<bool> + Send + Sync>;

/// Action run for an accepted message.
pub type Action<C> = Box<dyn Fn(&C, &Message) -> Result<()> + Send + Sync>;

// ============================================================================
// MessageHandler
// ============================================================================

/// A `(kind, predicate, action)` record.
pub struct MessageHandler<C> {
    kind: String,
    predicate: Predicate<C>,
    action: Action<C>,
}

impl<C> fmt::Debug for MessageHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHandler")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<C> MessageHandler<C> {
    /// Creates a handler for messages whose `msg` equals `kind`.
    pub fn new<P, A>(kind: impl Into<String>, predicate: P, action: A) -> Self
    where
        P: Fn(&C, &Message) -> Result<bool> + Send + Sync + 'static,
        A: Fn(&C, &Message) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            kind: kind.into(),
            predicate: Box::new(predicate),
            action: Box::new(action),
        }
    }

    /// Creates a handler accepting every message of `kind`.
    pub fn any<A>(kind: impl Into<String>, action: A) -> Self
    where
        A: Fn(&C, &Message) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(kind, |_, _| Ok(true), action)
    }

    /// Returns the message kind this handler claims.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns `true` if kind and predicate both accept the message.
    #[must_use]
    pub fn matches(&self, ctx: &C, message: &Message) -> bool {
        if message.kind() != Some(self.kind.as_str()) {
            return false;
        }

        match (self.predicate)(ctx, message) {
            Ok(accepted) => accepted,
            Err(e) => {
                trace!(kind = %self.kind, error = %e, "Predicate lookup failed");
                false
            }
        }
    }

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns whatever the action returns.
    #[inline]
    pub fn handle(&self, ctx: &C, message: &Message) -> Result<()> {
        (self.action)(ctx, message)
    }
}

// ============================================================================
// MessageRouter
// ============================================================================

/// Ordered list of message handlers.
pub struct MessageRouter<C> {
    handlers: Vec<MessageHandler<C>>,
}

impl<C> Default for MessageRouter<C> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for MessageRouter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.handlers).finish()
    }
}

impl<C> MessageRouter<C> {
    /// Creates an empty router.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn register(&mut self, handler: MessageHandler<C>) {
        self.handlers.push(handler);
    }

    /// Returns the number of handlers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs every matching handler in order.
    ///
    /// Returns the number of handlers that ran; zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by an action.
    pub fn route(&self, ctx: &C, message: &Message) -> Result<usize> {
        let mut count = 0;

        for handler in &self.handlers {
            if handler.matches(ctx, message) {
                handler.handle(ctx, message)?;
                count += 1;
            }
        }

        if count == 0 {
            debug!(?message, "Message has not been processed");
        }

        Ok(count)
    }
}

// ============================================================================
// Tests
// ============================================================================
