//! Inbound dispatch tables.
//!
//! Dispatch happens in two stages:
//!
//! ```text
//! "a[...]" ──► FrameRouter ──(tag 'a')──► envelope decode ──► MessageRouter
//!                 │                                              │
//!                 └─ 'o', 'h', 'c' handled directly              └─ kind + predicate
//! ```
//!
//! Both routers are generic over a context type `C` handed to every
//! handler, so handlers are plain closures rather than trait objects tied
//! to one owner.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Tag bindings, unmatched frames are errors |
//! | `message` | Kind/predicate handlers, unmatched messages are logged |

// ============================================================================
// Submodules
// ============================================================================

/// Frame dispatch by tag.
pub mod frame;

/// Message dispatch by kind and predicate.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{FrameHandler, FrameRouter};
pub use message::{Action, MessageHandler, MessageRouter, Predicate};
