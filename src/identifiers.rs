//! Type-safe identifiers for protocol requests.
//!
//! | Type | Wire form | Source |
//! |------|-----------|--------|
//! | [`RequestId`] | `"7"` | per-connection counter ([`RequestCounter`]) |
//! | [`SubscriptionId`] | `"x25XiqYmop7CNEemG"` | random 17 character token |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde::{Serialize, Serializer};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Length of a subscription token.
const SUBSCRIPTION_ID_LEN: usize = 17;

// ============================================================================
// RequestId
// ============================================================================

/// Identifier correlating a method call with its result.
///
/// Serialized as a decimal string, the way the server issues them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw counter value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// RequestCounter
// ============================================================================

/// Monotonic request id source, one per connection.
#[derive(Debug, Default)]
pub struct RequestCounter {
    last: AtomicU64,
}

impl RequestCounter {
    /// Creates a counter whose first id is `1`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Returns the next request id.
    #[inline]
    pub fn next_id(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

// ============================================================================
// SubscriptionId
// ============================================================================

/// Opaque subscription identifier.
///
/// Only has to look unique to the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Generates a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        let encoded = Base64Standard.encode(Uuid::new_v4().as_bytes());
        let token = encoded
            .chars()
            .take(SUBSCRIPTION_ID_LEN)
            .map(|c| match c {
                '/' => 'a',
                '+' => 'b',
                '=' => 'c',
                other => other,
            })
            .collect();
        Self(token)
    }

    /// Returns the token.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
