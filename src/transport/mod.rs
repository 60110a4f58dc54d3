//! WebSocket transport layer.
//!
//! The transport moves text frames between the chat service and the
//! protocol [`Socket`](crate::session::Socket). It knows nothing about
//! frame tags or messages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Chat service   │
//! │                 │         WebSocket            │                 │
//! │  Outbox ──►     │◄────────────────────────────►│  SockJS         │
//! │  Connection     │      ws[s]://…/websocket     │  endpoint       │
//! │  ──► Socket     │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `outbox` | Outbound request queue |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Outbound request queue.
pub mod outbox;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use outbox::{Outbox, OutboxReceiver};
