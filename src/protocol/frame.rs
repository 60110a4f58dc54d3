//! Outer frame and envelope codec.
//!
//! Every inbound WebSocket text message is a frame: one tag character
//! followed by a payload.
//!
//! | Tag | Meaning | Payload |
//! |-----|---------|---------|
//! | `o` | connection open | empty |
//! | `h` | heartbeat | empty |
//! | `a` | answer | envelope |
//! | `c` | close | `[code, "reason"]` |
//!
//! The envelope is a JSON array holding one JSON-encoded string, which in
//! turn holds the [`Message`] object:
//!
//! ```text
//! a["{\"msg\":\"connected\",\"session\":\"S1\"}"]
//! ```
//!
//! Outbound requests use the same envelope without a tag.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};

use super::Message;

// ============================================================================
// Tags
// ============================================================================

/// Server confirmed the connection is open.
pub const TAG_OPEN: char = 'o';

/// Server heartbeat.
pub const TAG_HEARTBEAT: char = 'h';

/// Server answer carrying an envelope.
pub const TAG_ANSWER: char = 'a';

/// Server is closing the connection.
pub const TAG_CLOSE: char = 'c';

// ============================================================================
// Frame
// ============================================================================

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame type discriminator.
    pub tag: char,
    /// Everything after the tag.
    pub payload: String,
}

impl Frame {
    /// Creates a frame.
    #[inline]
    #[must_use]
    pub fn new(tag: char, payload: impl Into<String>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// Splits raw text into tag and payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the text is empty.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let tag = chars
            .next()
            .ok_or_else(|| Error::protocol("empty frame"))?;

        Ok(Self::new(tag, chars.as_str()))
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Double-JSON envelope encoding.
pub mod envelope {
    use super::*;

    /// Encodes a message as `["<escaped message JSON>"]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn encode(message: &Message) -> Result<String> {
        let inner = serde_json::to_string(message)?;
        Ok(serde_json::to_string(&[inner])?)
    }

    /// Decodes an envelope into the message it carries.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if either JSON layer is malformed
    /// - [`Error::Protocol`] if the envelope shape is wrong
    pub fn decode(payload: &str) -> Result<Message> {
        let outer: Value = serde_json::from_str(payload)?;

        let inner = match outer {
            Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| Error::protocol("empty envelope"))?,
            other => {
                return Err(Error::protocol(format!(
                    "envelope must be a JSON array, got {other}"
                )));
            }
        };

        let text = inner
            .as_str()
            .ok_or_else(|| Error::protocol("envelope element is not a string"))?;

        Message::from_value(serde_json::from_str(text)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
