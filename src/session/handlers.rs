//! Built-in frame and message handlers.
//!
//! # Frames
//!
//! | Tag | Effect |
//! |-----|--------|
//! | `o` | connection marked open |
//! | `h` | logged |
//! | `a` | envelope routed to the message handlers |
//! | `c` | connection marked closed |
//!
//! # Messages
//!
//! | Kind | Match | Effect |
//! |------|-------|--------|
//! | `connected` | has `session` | session id stored |
//! | `ping` | always | `pong` queued |
//! | `added` | `users`, has email and username | identity stored, follow-up feeds queued |
//! | `changed` | `users`, tracked id, has cid and guildId | game ids stored, guild feed queued once |
//! | `removed` | `users`, has id | identity cleared, fails on foreign id |

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::{Request, Subscription, TAG_ANSWER, TAG_CLOSE, TAG_HEARTBEAT, TAG_OPEN};
use crate::router::{FrameRouter, MessageHandler, MessageRouter};

use super::Socket;

// ============================================================================
// Constants
// ============================================================================

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

/// Feeds subscribed to right after login, in order.
#[must_use]
pub fn login_subscriptions() -> [Subscription; 7] {
    [
        Subscription::ClientVersions,
        Subscription::LoginServiceConfiguration,
        Subscription::IntercomHash,
        Subscription::LatestUniverseChats,
        Subscription::LatestTellChats,
        Subscription::NextEvents,
        Subscription::UserData,
    ]
}

// ============================================================================
// Installation
// ============================================================================

/// Registers every built-in handler.
pub(crate) fn install(frames: &mut FrameRouter<Socket>, messages: &mut MessageRouter<Socket>) {
    frames.bind(TAG_OPEN, on_open_frame);
    frames.bind(TAG_HEARTBEAT, on_heartbeat_frame);
    frames.bind(TAG_ANSWER, on_answer_frame);
    frames.bind(TAG_CLOSE, on_close_frame);

    messages.register(connected());
    messages.register(ping());
    messages.register(users_added());
    messages.register(users_changed());
    messages.register(users_removed());
}

// ============================================================================
// Frame Handlers
// ============================================================================

fn on_open_frame(socket: &Socket, _payload: &str) -> Result<()> {
    debug!("Server confirmed open connection");
    socket.state().mark_open();
    Ok(())
}

fn on_heartbeat_frame(_socket: &Socket, _payload: &str) -> Result<()> {
    debug!("Heartbeat");
    Ok(())
}

fn on_answer_frame(socket: &Socket, payload: &str) -> Result<()> {
    socket.process(payload).map(|_| ())
}

fn on_close_frame(socket: &Socket, payload: &str) -> Result<()> {
    info!(reason = %payload, "Server is closing the connection");
    socket.state().mark_closed();
    Ok(())
}

// ============================================================================
// Message Handlers
// ============================================================================

/// `connected`: the server assigned a session.
fn connected() -> MessageHandler<Socket> {
    MessageHandler::<Socket>::new(
        "connected",
        |_, m| m.require_str("session").map(|_| true),
        |socket, m| {
            socket.state().set_session_id(m.require_str("session")?);
            Ok(())
        },
    )
}

/// `ping`: keepalive request.
fn ping() -> MessageHandler<Socket> {
    MessageHandler::<Socket>::any("ping", |socket, _| socket.send(Request::Pong))
}

/// `added` on users: login succeeded.
///
/// ```text
/// {"msg":"added","collection":"users","id":"RN62wtdTrNjjDEFrP",
///  "fields":{"profile":{"lang":"en","email":"x@y.z"},"username":"Toon"}}
/// ```
fn users_added() -> MessageHandler<Socket> {
    MessageHandler::<Socket>::new(
        "added",
        |_, m| {
            m.require_str("fields/profile/email")?;
            m.require_str("fields/username")?;
            Ok(m.is_collection(USERS_COLLECTION))
        },
        |socket, m| {
            let resource_id = m.require_str("id")?;
            let email = m.require_str("fields/profile/email")?;
            let name = m.require_str("fields/username")?;

            socket.state().set_user(resource_id, email, name);
            info!(user = name, "User logged in");

            for subscription in login_subscriptions() {
                socket.subscribe(&subscription)?;
            }
            Ok(())
        },
    )
}

/// `changed` on the tracked user: character data arrived.
///
/// ```text
/// {"msg":"changed","collection":"users","id":"RN62wtdTrNjjDEFrP",
///  "fields":{"game":{"cid":11962608,"guildId":0},"status":{"online":true}}}
/// ```
fn users_changed() -> MessageHandler<Socket> {
    MessageHandler::<Socket>::new(
        "changed",
        |socket, m| {
            let id = m.require_str("id")?;
            m.require_i64("fields/game/cid")?;
            m.require_i64("fields/game/guildId")?;
            Ok(m.is_collection(USERS_COLLECTION)
                && socket.state().user_resource_id().as_deref() == Some(id))
        },
        |socket, m| {
            let character_id = m.require_i64("fields/game/cid")?;
            let guild_id = m.require_i64("fields/game/guildId")?;

            if socket.state().set_game(character_id, guild_id) {
                debug!(character_id, guild_id, "Character data received");
                socket.subscribe(&Subscription::LatestGuildChats { guild_id })?;
            }
            Ok(())
        },
    )
}

/// `removed` on users: logout completed.
fn users_removed() -> MessageHandler<Socket> {
    MessageHandler::<Socket>::new(
        "removed",
        |_, m| m.require_str("id").map(|_| m.is_collection(USERS_COLLECTION)),
        |socket, m| {
            let id = m.require_str("id")?;
            let expected = socket.state().user_resource_id();

            if expected.as_deref() != Some(id) {
                return Err(Error::identity_mismatch(expected, id));
            }

            socket.state().clear_user();
            info!("User logged out");
            Ok(())
        },
    )
}

// ============================================================================
// Tests
// ============================================================================
