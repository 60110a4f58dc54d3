//! LV-20 chat client.
//!
//! An asynchronous client for the LV-20 chat service, which speaks a
//! DDP-style subscription and method protocol over SockJS framing on a
//! WebSocket.
//!
//! # Architecture
//!
//! ```text
//! Client ──► Socket::call / subscribe ──► Outbox ──► Connection (event loop) ──► server
//!                                                         │
//! SessionState ◄── MessageRouter ◄── FrameRouter ◄── Socket::on_message ◄─┘
//! ```
//!
//! - One tokio task per connection owns the WebSocket and is its only writer
//! - Inbound frames are dispatched through closure tables, first by tag
//!   character, then by message kind
//! - Session state is published as whole snapshots through a watch channel,
//!   which the [`Client`] awaits with bounded timeouts
//!
//! # Quick Start
//!
//! ```no_run
//! use lv20_client::{Chat, Client, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .url("ws://megacorp.io/sockjs/252/agrjomew/websocket")
//!         .build()?;
//!
//!     if client.login("Tester", "secret").await? {
//!         client.send(Chat::Universe, "hello")?;
//!     }
//!
//!     client.close().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] façade and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Request and subscription ids |
//! | [`protocol`] | Frames, envelopes, messages and requests |
//! | [`router`] | Frame and message dispatch tables |
//! | [`session`] | Session state and built-in handlers |
//! | [`transport`] | WebSocket connection and outbox |

// ============================================================================
// Modules
// ============================================================================

/// Client façade and configuration.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Request and subscription identifiers.
pub mod identifiers;

/// Wire protocol: frames, envelopes, messages and outbound requests.
pub mod protocol;

/// Frame and message dispatch tables.
pub mod router;

/// Protocol session state and handlers.
pub mod session;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder, ClientOptions, ClientState};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, SubscriptionId};

// Protocol types
pub use protocol::{Chat, Frame, Message, Method, Request, Subscription};

// Dispatch types
pub use router::MessageHandler;

// Session types
pub use session::{Session, Socket};
