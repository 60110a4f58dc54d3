//! Outbound request messages.
//!
//! Every request the client sends is one of four shapes.
//!
//! # Format
//!
//! ```json
//! {"msg": "connect", "version": "pre2", "support": ["pre2", "pre1"]}
//! {"msg": "sub", "id": "9vywbKZowez7Ks6vA", "name": "userData", "params": [], "route": null}
//! {"msg": "method", "method": "logout", "params": [], "id": "3"}
//! {"msg": "pong"}
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::{RequestId, SubscriptionId};

use super::{Message, Method, Subscription};

// ============================================================================
// Request
// ============================================================================

/// A request from the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg", rename_all = "lowercase")]
pub enum Request {
    /// Protocol handshake.
    Connect {
        /// Preferred protocol version.
        version: String,
        /// All versions the client speaks.
        support: Vec<String>,
    },

    /// Start a feed.
    Sub {
        /// Subscription identifier.
        id: SubscriptionId,
        /// Feed name.
        name: String,
        /// Feed parameters.
        params: Vec<Value>,
        /// Always `null`.
        route: Option<String>,
    },

    /// Remote method call.
    Method {
        /// Method name.
        method: String,
        /// Method parameters.
        params: Vec<Value>,
        /// Correlation identifier.
        id: RequestId,
    },

    /// Heartbeat reply.
    Pong,
}

impl Request {
    /// Creates a handshake request.
    #[must_use]
    pub fn connect<I, S>(version: impl Into<String>, support: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Connect {
            version: version.into(),
            support: support.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a subscription request.
    #[must_use]
    pub fn subscribe(subscription: &Subscription, id: SubscriptionId) -> Self {
        Self::Sub {
            id,
            name: subscription.name().to_string(),
            params: subscription.params(),
            route: None,
        }
    }

    /// Creates a method call request.
    #[must_use]
    pub fn call(method: &Method, id: RequestId) -> Self {
        Self::Method {
            method: method.name().to_string(),
            params: method.params(),
            id,
        }
    }

    /// Returns a short label for logging.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Sub { name, .. } => name.as_str(),
            Self::Method { method, .. } => method.as_str(),
            Self::Pong => "pong",
        }
    }

    /// Converts the request into a [`Message`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_message(&self) -> Result<Message> {
        Message::from_value(serde_json::to_value(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
