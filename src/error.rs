//! Error types for the LV-20 client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use lv20_client::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     if client.login("toon", "secret").await? {
//!         client.tell("friend", "hello")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Framing | [`Error::UnhandledFrame`], [`Error::Protocol`], [`Error::MissingField`] |
//! | Precondition | [`Error::InvalidArgument`], [`Error::NotLoggedIn`], [`Error::AlreadyLoggedIn`] |
//! | Session | [`Error::IdentityMismatch`] |
//! | External | [`Error::Json`], [`Error::WebSocket`] |
//!
//! Timeouts of `connect`, `login` and `logout` are not errors: those calls
//! report them as `Ok(false)`.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the transport cannot be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed, or the client was already closed.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Framing Errors
    // ========================================================================
    /// No frame handler claimed the frame tag.
    #[error("Unhandled frame tag '{tag}'")]
    UnhandledFrame {
        /// The unclaimed tag character.
        tag: char,
    },

    /// Protocol violation or malformed envelope.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// A message path did not resolve to a value.
    #[error("Missing field: {path}")]
    MissingField {
        /// Slash separated path that was looked up.
        path: String,
    },

    // ========================================================================
    // Precondition Errors
    // ========================================================================
    /// Invalid argument passed to a client operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Operation requires a logged in user.
    #[error("Cannot {operation} because user is not logged in")]
    NotLoggedIn {
        /// The rejected operation.
        operation: &'static str,
    },

    /// Login attempted while a user is already logged in.
    #[error("User {user} is already logged in")]
    AlreadyLoggedIn {
        /// Name of the logged in user.
        user: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Server removed a user that is not the tracked one.
    ///
    /// The local session no longer mirrors the server.
    #[error("Invalid user resource ID {received} received on logout, expected {expected:?}")]
    IdentityMismatch {
        /// Resource ID tracked locally.
        expected: Option<String>,
        /// Resource ID sent by the server.
        received: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an unhandled frame error.
    #[inline]
    pub fn unhandled_frame(tag: char) -> Self {
        Self::UnhandledFrame { tag }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    #[inline]
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not logged in error.
    #[inline]
    pub fn not_logged_in(operation: &'static str) -> Self {
        Self::NotLoggedIn { operation }
    }

    /// Creates an identity mismatch error.
    #[inline]
    pub fn identity_mismatch(expected: Option<String>, received: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            expected,
            received: received.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the error comes from a malformed or unexpected frame.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::UnhandledFrame { .. }
                | Self::Protocol { .. }
                | Self::MissingField { .. }
                | Self::Json(_)
        )
    }

    /// Returns `true` if an operation was rejected before touching the network.
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::NotLoggedIn { .. } | Self::AlreadyLoggedIn { .. }
        )
    }

    /// Returns `true` if the local session can no longer be trusted.
    ///
    /// The connection event loop stops on these errors.
    #[inline]
    #[must_use]
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::IdentityMismatch { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
