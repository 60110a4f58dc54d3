//! Chat client entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Request/await façade over the protocol session |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientOptions`] | Endpoint, timeouts and protocol settings |
//! | [`ClientState`] | Observable client lifecycle |
//!
//! # Example
//!
//! ```no_run
//! use lv20_client::{Client, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = Client::builder().build()?;
//!
//! if client.connect().await? {
//!     println!("session {:?}", client.session().session_id);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

/// Client options.
pub mod options;

mod wait;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::{Client, ClientState};
pub use options::ClientOptions;
