//! Protocol session state.
//!
//! [`SessionState`] owns the single mutable record of what the server told
//! us: whether the connection is open, the session id and the logged in
//! identity. The inbound dispatch path is the only writer. Readers receive
//! whole [`Session`] snapshots, so they never observe a half-applied update,
//! and can await changes through [`SessionState::subscribe`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

// ============================================================================
// Session
// ============================================================================

/// Snapshot of the protocol session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Server sent the open frame.
    pub connection_open: bool,
    /// Session id from the `connected` message.
    pub session_id: Option<String>,
    /// Logged in account name.
    pub user_name: Option<String>,
    /// Logged in account email.
    pub user_email: Option<String>,
    /// Server-side id of the user document.
    pub user_resource_id: Option<String>,
    /// Guild of the active character.
    pub guild_id: Option<i64>,
    /// Active character id.
    pub character_id: Option<i64>,
    /// Transport open time in epoch milliseconds.
    pub connected_at: Option<u64>,
}

impl Session {
    /// Returns `true` once the server confirmed the connection.
    #[inline]
    #[must_use]
    pub fn is_connection_open(&self) -> bool {
        self.connection_open
    }

    /// Returns `true` once a session id was assigned.
    #[inline]
    #[must_use]
    pub fn is_session_established(&self) -> bool {
        self.session_id.is_some()
    }

    /// Returns `true` if name, email and resource id are all known.
    #[inline]
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user_name.is_some() && self.user_email.is_some() && self.user_resource_id.is_some()
    }

    /// Returns `true` if name, email and resource id are all absent.
    #[inline]
    #[must_use]
    pub fn is_logged_out(&self) -> bool {
        self.user_name.is_none() && self.user_email.is_none() && self.user_resource_id.is_none()
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// Shared handle publishing [`Session`] snapshots.
///
/// Cloning the handle shares the same state.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SessionState - Readers
// ============================================================================

impl SessionState {
    /// Creates a fresh, disconnected state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Returns a copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Returns a receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Returns `true` once the server confirmed the connection.
    #[must_use]
    pub fn is_connection_open(&self) -> bool {
        self.tx.borrow().is_connection_open()
    }

    /// Returns `true` once a session id was assigned.
    #[must_use]
    pub fn is_session_established(&self) -> bool {
        self.tx.borrow().is_session_established()
    }

    /// Returns `true` if a user is logged in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().is_logged_in()
    }

    /// Returns `true` if no user is logged in.
    #[must_use]
    pub fn is_logged_out(&self) -> bool {
        self.tx.borrow().is_logged_out()
    }

    /// Returns the session id.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.tx.borrow().session_id.clone()
    }

    /// Returns the logged in account name.
    #[must_use]
    pub fn user_name(&self) -> Option<String> {
        self.tx.borrow().user_name.clone()
    }

    /// Returns the tracked user resource id.
    #[must_use]
    pub fn user_resource_id(&self) -> Option<String> {
        self.tx.borrow().user_resource_id.clone()
    }

    /// Returns the guild id.
    #[must_use]
    pub fn guild_id(&self) -> Option<i64> {
        self.tx.borrow().guild_id
    }

    /// Returns the character id.
    #[must_use]
    pub fn character_id(&self) -> Option<i64> {
        self.tx.borrow().character_id
    }

    /// Returns the transport open time in epoch milliseconds.
    #[must_use]
    pub fn connected_at(&self) -> Option<u64> {
        self.tx.borrow().connected_at
    }
}

// ============================================================================
// SessionState - Writers
// ============================================================================

impl SessionState {
    /// Records the transport open time.
    pub(crate) fn set_connected_at(&self, millis: u64) {
        self.tx.send_modify(|s| s.connected_at = Some(millis));
    }

    /// Marks the connection as confirmed by the server.
    pub(crate) fn mark_open(&self) {
        self.tx.send_if_modified(|s| !std::mem::replace(&mut s.connection_open, true));
    }

    /// Marks the connection as gone.
    pub(crate) fn mark_closed(&self) {
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.connection_open, false));
    }

    /// Stores the session id.
    pub(crate) fn set_session_id(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        debug!(%session_id, "Session established");
        self.tx.send_modify(|s| s.session_id = Some(session_id));
    }

    /// Stores the identity of the logged in user.
    pub(crate) fn set_user(
        &self,
        resource_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) {
        let (resource_id, email, name) = (resource_id.into(), email.into(), name.into());
        self.tx.send_modify(|s| {
            s.user_resource_id = Some(resource_id);
            s.user_email = Some(email);
            s.user_name = Some(name);
        });
    }

    /// Stores character and guild ids.
    ///
    /// Returns `true` if both were previously unknown.
    pub(crate) fn set_game(&self, character_id: i64, guild_id: i64) -> bool {
        let mut first = false;
        self.tx.send_modify(|s| {
            first = s.character_id.is_none() && s.guild_id.is_none();
            s.character_id = Some(character_id);
            s.guild_id = Some(guild_id);
        });
        first
    }

    /// Resets every identity field to the logged out shape.
    pub(crate) fn clear_user(&self) {
        self.tx.send_modify(|s| {
            s.user_name = None;
            s.user_email = None;
            s.user_resource_id = None;
            s.character_id = None;
            s.guild_id = None;
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
