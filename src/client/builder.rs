//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use lv20_client::Client;
//!
//! # fn example() -> lv20_client::Result<()> {
//! let client = Client::builder()
//!     .url("wss://chat.example.org/sockjs/252/agrjomew/websocket")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::router::{FrameHandler, MessageHandler};
use crate::session::Socket;
use crate::transport::Outbox;

use super::core::Client;
use super::options::ClientOptions;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Default)]
pub struct ClientBuilder {
    /// Connection and protocol options.
    options: ClientOptions,
    /// Extra frame handlers, bound after the built-ins.
    frame_handlers: Vec<(char, FrameHandler<Socket>)>,
    /// Extra message handlers, registered after the built-ins.
    message_handlers: Vec<MessageHandler<Socket>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("options", &self.options)
            .field("frame_handlers", &self.frame_handlers.len())
            .field("message_handlers", &self.message_handlers.len())
            .finish()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the WebSocket endpoint.
    ///
    /// # Arguments
    ///
    /// * `url` - `ws://` or `wss://` URL of the SockJS websocket endpoint
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.options.url = url.into();
        self
    }

    /// Replaces all options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Sets the login language.
    #[inline]
    #[must_use]
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.options.lang = lang.into();
        self
    }

    /// Adds a handler for frames tagged `tag`.
    ///
    /// Runs after the built-in handlers for the same tag.
    #[must_use]
    pub fn frame_handler<F>(mut self, tag: char, handler: F) -> Self
    where
        F: Fn(&Socket, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.frame_handlers.push((tag, Box::new(handler)));
        self
    }

    /// Adds a message handler.
    ///
    /// Runs after the built-in handlers for the same kind.
    #[must_use]
    pub fn message_handler(mut self, handler: MessageHandler<Socket>) -> Self {
        self.message_handlers.push(handler);
        self
    }

    /// Builds the client with validation.
    ///
    /// Does not connect; see [`Client::connect`].
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL is not a valid `ws://` or `wss://` URL
    /// - [`Error::Config`] if the options are inconsistent
    pub fn build(self) -> Result<Client> {
        self.validate_url()?;
        self.options.validate().map_err(Error::config)?;

        let (outbox, outbox_rx) = Outbox::channel();
        let mut socket = Socket::new(outbox);

        for (tag, handler) in self.frame_handlers {
            socket.bind_frame(tag, handler);
        }
        for handler in self.message_handlers {
            socket.register_message(handler);
        }

        Ok(Client::new(self.options, socket, outbox_rx))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates the endpoint URL.
    fn validate_url(&self) -> Result<()> {
        let url = Url::parse(&self.options.url).map_err(|e| {
            Error::config(format!("Invalid URL '{}': {e}", self.options.url))
        })?;

        match url.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(Error::config(format!(
                "Unsupported URL scheme '{other}'. Use ws:// or wss://.\n\
                 Example: Client::builder().url(\"ws://localhost:3000/sockjs/1/a/websocket\")"
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
