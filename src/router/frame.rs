//! Frame dispatch by tag character.
//!
//! Bindings run in registration order. More than one binding may claim a
//! tag; a frame nobody claims is a protocol error, since the tag set is
//! small and fixed and an unknown tag means the server changed.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::Frame;

// ============================================================================
// Types
// ============================================================================

/// Frame handler callback.
///
/// Receives the dispatch context and the frame payload.
pub type FrameHandler<C> = Box<dyn Fn(&C, &str) -> Result<()> + Send + Sync>;

// ============================================================================
// FrameRouter
// ============================================================================

/// Ordered `(tag, handler)` bindings.
pub struct FrameRouter<C> {
    bindings: Vec<(char, FrameHandler<C>)>,
}

impl<C> Default for FrameRouter<C> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for FrameRouter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRouter")
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

impl<C> FrameRouter<C> {
    /// Creates an empty router.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a binding for `tag`.
    pub fn bind<F>(&mut self, tag: char, handler: F)
    where
        F: Fn(&C, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.bindings.push((tag, Box::new(handler)));
    }

    /// Returns the bound tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = char> + '_ {
        self.bindings.iter().map(|(tag, _)| *tag)
    }

    /// Returns the number of bindings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Runs every binding whose tag equals the frame's tag.
    ///
    /// Returns the number of handlers invoked.
    ///
    /// # Errors
    ///
    /// - [`Error::UnhandledFrame`] if no binding matches
    /// - the first error returned by a handler
    pub fn route(&self, ctx: &C, frame: &Frame) -> Result<usize> {
        let mut count = 0;

        for (tag, handler) in &self.bindings {
            if *tag == frame.tag {
                handler(ctx, &frame.payload)?;
                count += 1;
            }
        }

        if count == 0 {
            return Err(Error::unhandled_frame(frame.tag));
        }

        trace!(tag = %frame.tag, count, "Frame routed");
        Ok(count)
    }
}

// ============================================================================
// Tests
// ============================================================================
