//! Decoded application message.
//!
//! A [`Message`] is the JSON object carried inside an `a` frame envelope.
//! Its `msg` field names the message kind (`connected`, `added`, `ping`, ...);
//! the remaining fields depend on the kind.
//!
//! # Format
//!
//! ```json
//! {
//!   "msg": "added",
//!   "collection": "users",
//!   "id": "RN62wtdTrNjjDEFrP",
//!   "fields": { "profile": { "email": "x@y.z" }, "username": "Toon" }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Separator between keys in a lookup path.
const PATH_SEPARATOR: char = '/';

// ============================================================================
// Message
// ============================================================================

/// A read-only protocol message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    /// Wraps a JSON object.
    #[inline]
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Converts a JSON value into a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::protocol(format!(
                "message must be a JSON object, got {other}"
            ))),
        }
    }

    /// Returns the `msg` discriminator.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.0.get("msg").and_then(Value::as_str)
    }

    /// Returns the `collection` field.
    #[inline]
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        self.0.get("collection").and_then(Value::as_str)
    }

    /// Returns `true` if the message targets the named collection.
    #[inline]
    #[must_use]
    pub fn is_collection(&self, name: &str) -> bool {
        self.collection() == Some(name)
    }

    /// Resolves a slash separated path such as `fields/profile/email`.
    ///
    /// Missing keys, non-object intermediates and `null` leaves resolve to
    /// `None`.
    #[must_use]
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut keys = path.split(PATH_SEPARATOR);
        let first = self.0.get(keys.next()?)?;

        let value = keys.try_fold(first, |current, key| current.as_object()?.get(key))?;

        if value.is_null() { None } else { Some(value) }
    }

    /// Resolves a path or fails with [`Error::MissingField`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the path does not resolve.
    pub fn require(&self, path: &str) -> Result<&Value> {
        self.path(path).ok_or_else(|| Error::missing_field(path))
    }

    /// Resolves a path holding a string.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if the path does not resolve
    /// - [`Error::Protocol`] if the value is not a string
    pub fn require_str(&self, path: &str) -> Result<&str> {
        self.require(path)?
            .as_str()
            .ok_or_else(|| Error::protocol(format!("{path} is not a string")))
    }

    /// Resolves a path holding an integer.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if the path does not resolve
    /// - [`Error::Protocol`] if the value is not an integer
    pub fn require_i64(&self, path: &str) -> Result<i64> {
        self.require(path)?
            .as_i64()
            .ok_or_else(|| Error::protocol(format!("{path} is not an integer")))
    }
}

// ============================================================================
// Tests
// ============================================================================
