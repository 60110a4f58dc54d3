//! Protocol session: state, handlers and the socket tying them together.
//!
//! # Lifecycle
//!
//! ```text
//!  on_open ──► 'o' frame ──► connection open
//!                              │  client queues `connect`
//!                              ▼
//!                         `connected` ──► session established
//!                              │  client queues `login`
//!                              ▼
//!                          `added` ──► logged in (+ follow-up feeds)
//!                              │
//!                         `changed` ──► character / guild known (+ guild feed)
//!                              │  client queues `logout`
//!                              ▼
//!                         `removed` ──► logged out
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `handlers` | Built-in frame and message handlers |
//! | `socket` | Protocol state machine fed by the transport |
//! | `state` | Session snapshot published over a watch channel |

// ============================================================================
// Submodules
// ============================================================================

/// Built-in frame and message handlers.
pub mod handlers;

/// Protocol socket.
pub mod socket;

/// Session state.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use handlers::{USERS_COLLECTION, login_subscriptions};
pub use socket::{Socket, TRAFFIC_TARGET};
pub use state::{Session, SessionState};
