//! Wire protocol types.
//!
//! The chat service speaks two stacked protocols:
//!
//! | Layer | Unit | Module |
//! |-------|------|--------|
//! | Framing | tag character + payload | `frame` |
//! | Messaging | JSON object keyed by `msg` | `message`, `request` |
//!
//! # Message Kinds
//!
//! | Kind | Direction | Purpose |
//! |------|-----------|---------|
//! | `connect` | Client → Server | Protocol handshake |
//! | `connected` | Server → Client | Session established |
//! | `sub` | Client → Server | Start a feed |
//! | `added` / `changed` / `removed` | Server → Client | Collection updates |
//! | `method` | Client → Server | Remote call |
//! | `ping` / `pong` | Both | Keepalive |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Subscription, method and chat catalogue |
//! | `frame` | Frame and envelope codec |
//! | `message` | Decoded message with path lookups |
//! | `request` | Outbound request shapes |

// ============================================================================
// Submodules
// ============================================================================

/// Subscription, method and chat catalogue.
pub mod command;

/// Frame and envelope codec.
pub mod frame;

/// Decoded message type.
pub mod message;

/// Outbound request type.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{CHAT_TELL, Chat, Method, Subscription};
pub use frame::{Frame, TAG_ANSWER, TAG_CLOSE, TAG_HEARTBEAT, TAG_OPEN, envelope};
pub use message::Message;
pub use request::Request;
