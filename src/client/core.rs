//! Chat client façade.
//!
//! The [`Client`] turns the asynchronous protocol into request/await calls:
//! each operation queues its request and then waits, bounded by a timeout,
//! until the session state reflects the server's answer.
//!
//! # Example
//!
//! ```no_run
//! use lv20_client::{Chat, Client};
//!
//! # async fn example() -> lv20_client::Result<()> {
//! let client = Client::builder().build()?;
//!
//! if client.login("Tester", "secret").await? {
//!     client.send(Chat::English, "hello")?;
//!     client.tell("Friend", "psst")?;
//!     client.logout().await?;
//! }
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, SubscriptionId};
use crate::protocol::{CHAT_TELL, Chat, Method, Request, Subscription};
use crate::session::{Session, Socket};
use crate::transport::{Connection, OutboxReceiver};

use super::builder::ClientBuilder;
use super::options::ClientOptions;
use super::wait::wait_until;

// ============================================================================
// ClientState
// ============================================================================

/// Observable lifecycle of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Nothing opened yet.
    Idle,
    /// [`Client::connect`] is in progress.
    Connecting,
    /// Server sent the open frame.
    ConnectionOpen,
    /// Server assigned a session id.
    SessionEstablished,
    /// [`Client::login`] is waiting for the server.
    LoggingIn,
    /// A user is logged in.
    LoggedIn,
    /// [`Client::logout`] is waiting for the server.
    LoggingOut,
    /// Closed locally or by the server. Terminal.
    Closed,
}

/// Operation currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting,
    LoggingIn,
    LoggingOut,
    Closed,
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the client.
pub(crate) struct ClientInner {
    /// Connection and protocol options.
    options: ClientOptions,

    /// Protocol state machine.
    socket: Arc<Socket>,

    /// Outbox receiver, handed to the connection on first connect.
    outbox_rx: Mutex<Option<OutboxReceiver>>,

    /// Live transport, once opened.
    connection: Mutex<Option<Connection>>,

    /// Operation in flight.
    phase: Mutex<Phase>,

    /// Set while a connect call runs.
    connecting: AtomicBool,

    /// Set once the handshake request was queued.
    handshake_sent: AtomicBool,

    /// Set once the active presence was announced.
    presence_sent: AtomicBool,
}

// ============================================================================
// Client
// ============================================================================

/// LV-20 chat client.
///
/// Cheap to clone; clones share the same connection. The connection closes
/// when the last clone is dropped or on [`close`](Self::close).
#[derive(Clone)]
pub struct Client {
    /// Shared inner state.
    pub(crate) inner: Arc<ClientInner>,
}

// ============================================================================
// Client - Display
// ============================================================================

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.options.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Creates a configuration builder for the client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates an unconnected client.
    pub(crate) fn new(options: ClientOptions, socket: Socket, outbox_rx: OutboxReceiver) -> Self {
        let inner = ClientInner {
            options,
            socket: Arc::new(socket),
            outbox_rx: Mutex::new(Some(outbox_rx)),
            connection: Mutex::new(None),
            phase: Mutex::new(Phase::Idle),
            connecting: AtomicBool::new(false),
            handshake_sent: AtomicBool::new(false),
            presence_sent: AtomicBool::new(false),
        };

        Self {
            inner: Arc::new(inner),
        }
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Connects and establishes a protocol session.
    ///
    /// Returns `Ok(true)` once the session is established, or immediately if
    /// another connect call is already running. Returns `Ok(false)` if the
    /// server did not open the connection or assign a session in time.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the client was closed
    /// - [`Error::Connection`] if the WebSocket cannot be opened
    pub async fn connect(&self) -> Result<bool> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }

        if self.inner.connecting.swap(true, Ordering::AcqRel) {
            debug!("Connect already in progress");
            return Ok(true);
        }

        self.enter(Phase::Connecting);
        let result = self.connect_inner().await;
        self.leave(Phase::Connecting);
        self.inner.connecting.store(false, Ordering::Release);

        result
    }

    async fn connect_inner(&self) -> Result<bool> {
        let timeout = self.inner.options.connect_timeout;

        let (needs_transport, dropped) = {
            let connection = self.inner.connection.lock();
            (
                connection.is_none(),
                connection.as_ref().is_some_and(Connection::is_finished),
            )
        };

        if dropped {
            *self.inner.phase.lock() = Phase::Closed;
            return Err(Error::ConnectionClosed);
        }

        if needs_transport {
            self.open_transport().await?;
        }

        self.ensure_not_closed()?;
        if !self.wait_for(Session::is_connection_open, timeout).await {
            warn!(?timeout, "Server did not open the connection in time");
            return Ok(false);
        }

        self.ensure_not_closed()?;
        if !self.inner.handshake_sent.swap(true, Ordering::AcqRel) {
            let options = &self.inner.options;
            self.inner
                .socket
                .send(Request::connect(&options.version, &options.support))?;
        }

        self.ensure_not_closed()?;
        if !self.wait_for(Session::is_session_established, timeout).await {
            warn!(?timeout, "Server did not establish a session in time");
            return Ok(false);
        }

        self.ensure_not_closed()?;
        if !self.inner.presence_sent.swap(true, Ordering::AcqRel) {
            self.set_active()?;
        }

        info!(session_id = ?self.inner.socket.state().session_id(), "Connected");
        Ok(true)
    }

    /// Opens the WebSocket and hands it the outbox.
    async fn open_transport(&self) -> Result<()> {
        let outbox_rx = self
            .inner
            .outbox_rx
            .lock()
            .take()
            .ok_or(Error::ConnectionClosed)?;

        let url = &self.inner.options.url;
        debug!(url, "Opening WebSocket");

        let connection = match Connection::open(
            url,
            self.inner.options.connect_timeout,
            Arc::clone(&self.inner.socket),
            outbox_rx,
        )
        .await
        {
            Ok(connection) => connection,
            Err(e) => {
                // The outbox receiver is gone with the failed attempt
                *self.inner.phase.lock() = Phase::Closed;
                return Err(e);
            }
        };

        // close() may have run during the handshake and found no connection
        // to shut down. Storing under the phase lock orders us against it.
        let orphan = {
            let phase = self.inner.phase.lock();
            if *phase == Phase::Closed {
                Some(connection)
            } else {
                *self.inner.connection.lock() = Some(connection);
                None
            }
        };

        if let Some(connection) = orphan {
            debug!("Client closed during handshake, dropping transport");
            connection.shutdown();
            connection.closed().await;
            return Err(Error::ConnectionClosed);
        }

        Ok(())
    }

    /// Closes the client.
    ///
    /// Logs out first if a user is logged in. Calling `close` again has no
    /// effect, and the client cannot be reconnected.
    ///
    /// # Errors
    ///
    /// Does not fail today; logout problems are logged.
    pub async fn close(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        if self.inner.socket.state().is_logged_in() {
            match self.logout().await {
                Ok(true) => {}
                Ok(false) => warn!("Logout not confirmed before close"),
                Err(e) => warn!(error = %e, "Logout failed during close"),
            }
        }

        let connection = {
            let mut phase = self.inner.phase.lock();
            *phase = Phase::Closed;
            self.inner.connection.lock().take()
        };
        if let Some(connection) = connection {
            connection.shutdown();
            connection.closed().await;
        }

        info!("Client closed");
        Ok(())
    }
}

// ============================================================================
// Client - Authentication
// ============================================================================

impl Client {
    /// Logs a user in, connecting first if needed.
    ///
    /// Returns `Ok(false)` if the connection or the login was not confirmed
    /// in time.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `name` is blank
    /// - [`Error::AlreadyLoggedIn`] if a user is logged in
    /// - any error from [`connect`](Self::connect)
    pub async fn login(&self, name: &str, password: &str) -> Result<bool> {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("user name must not be blank"));
        }

        if let Some(user) = self.logged_in_user() {
            return Err(Error::AlreadyLoggedIn { user });
        }

        if !self.ensure_session().await? {
            return Ok(false);
        }

        debug!(user = name, "Logging in");

        self.enter(Phase::LoggingIn);
        let result = self.login_inner(name, password).await;
        self.leave(Phase::LoggingIn);

        result
    }

    async fn login_inner(&self, name: &str, password: &str) -> Result<bool> {
        self.inner.socket.call(&Method::Login {
            username: name.to_string(),
            password: password.to_string(),
            lang: self.inner.options.lang.clone(),
        })?;

        let timeout = self.inner.options.login_timeout;
        let logged_in = self.wait_for(Session::is_logged_in, timeout).await;

        if logged_in {
            info!(user = name, "Logged in");
        } else {
            warn!(user = name, ?timeout, "Login not confirmed in time");
        }

        Ok(logged_in)
    }

    /// Logs the current user out.
    ///
    /// Returns `Ok(false)` if the logout was not confirmed in time.
    ///
    /// # Errors
    ///
    /// - [`Error::NotLoggedIn`] if no user is logged in
    pub async fn logout(&self) -> Result<bool> {
        if !self.inner.socket.state().is_logged_in() {
            return Err(Error::not_logged_in("logout"));
        }

        self.enter(Phase::LoggingOut);
        let result = self.logout_inner().await;
        self.leave(Phase::LoggingOut);

        result
    }

    async fn logout_inner(&self) -> Result<bool> {
        self.inner.socket.call(&Method::Logout)?;

        let timeout = self.inner.options.logout_timeout;
        let logged_out = self.wait_for(Session::is_logged_out, timeout).await;

        if logged_out {
            info!("Logged out");
        } else {
            warn!(?timeout, "Logout not confirmed in time");
        }

        Ok(logged_out)
    }

    /// Connects unless a session is already up.
    async fn ensure_session(&self) -> Result<bool> {
        let state = self.inner.socket.state();
        if state.is_connection_open() && state.is_session_established() {
            return Ok(true);
        }

        if !self.connect().await? {
            return Ok(false);
        }

        // A concurrent connect returns early; wait for its outcome
        Ok(self
            .wait_for(
                Session::is_session_established,
                self.inner.options.connect_timeout,
            )
            .await)
    }

    fn logged_in_user(&self) -> Option<String> {
        let session = self.inner.socket.state().snapshot();
        session
            .is_logged_in()
            .then(|| session.user_name.unwrap_or_default())
    }
}

// ============================================================================
// Client - Chat
// ============================================================================

impl Client {
    /// Sends a private message.
    ///
    /// Whitespace-only text sends nothing.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `recipient` is blank
    /// - [`Error::NotLoggedIn`] if no user is logged in
    /// - [`Error::ConnectionClosed`] if the connection is gone
    pub fn tell(&self, recipient: &str, text: &str) -> Result<()> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(Error::invalid_argument("recipient must not be blank"));
        }

        let text = text.trim();
        if text.is_empty() {
            debug!(recipient, "Skipping empty private message");
            return Ok(());
        }

        if !self.inner.socket.state().is_logged_in() {
            return Err(Error::not_logged_in("tell"));
        }

        self.inner.socket.call(&Method::Chat {
            channel: CHAT_TELL.to_string(),
            text: format!("{recipient} {text}"),
        })?;

        Ok(())
    }

    /// Posts to a chat channel.
    ///
    /// Whitespace-only text sends nothing. The server rejects posts from
    /// anonymous sessions, so no login check happens here.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is gone
    pub fn send(&self, chat: Chat, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            debug!(%chat, "Skipping empty chat message");
            return Ok(());
        }

        self.inner.socket.call(&Method::Chat {
            channel: chat.id().to_string(),
            text: text.to_string(),
        })?;

        Ok(())
    }
}

// ============================================================================
// Client - Feeds & Presence
// ============================================================================

impl Client {
    /// Subscribes to a feed.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is gone
    pub fn subscribe(&self, subscription: &Subscription) -> Result<SubscriptionId> {
        self.inner.socket.subscribe(subscription)
    }

    /// Marks the user active.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is gone
    pub fn set_active(&self) -> Result<RequestId> {
        self.inner.socket.call(&Method::UserStatusActive {
            timestamp: self.connected_at(),
        })
    }

    /// Marks the user idle.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is gone
    pub fn set_idle(&self) -> Result<RequestId> {
        self.inner.socket.call(&Method::UserStatusIdle {
            timestamp: self.connected_at(),
        })
    }

    fn connected_at(&self) -> u64 {
        self.inner.socket.state().connected_at().unwrap_or_default()
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        match *self.inner.phase.lock() {
            Phase::Closed => return ClientState::Closed,
            Phase::Connecting => return ClientState::Connecting,
            Phase::LoggingIn => return ClientState::LoggingIn,
            Phase::LoggingOut => return ClientState::LoggingOut,
            Phase::Idle => {}
        }

        let finished = self
            .inner
            .connection
            .lock()
            .as_ref()
            .is_some_and(Connection::is_finished);
        if finished {
            return ClientState::Closed;
        }

        let session = self.inner.socket.state().snapshot();
        if !session.is_connection_open() {
            ClientState::Idle
        } else if session.is_logged_in() {
            ClientState::LoggedIn
        } else if session.is_session_established() {
            ClientState::SessionEstablished
        } else {
            ClientState::ConnectionOpen
        }
    }

    /// Returns a snapshot of the protocol session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.socket.state().snapshot()
    }

    /// Returns a receiver notified on every session change.
    #[inline]
    #[must_use]
    pub fn watch_session(&self) -> watch::Receiver<Session> {
        self.inner.socket.state().subscribe()
    }

    /// Returns the options the client was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }
}

// ============================================================================
// Client - Internal
// ============================================================================

impl Client {
    fn is_closed(&self) -> bool {
        *self.inner.phase.lock() == Phase::Closed
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }

    /// Marks `phase` in flight if nothing else is.
    ///
    /// A connect started under a running login keeps reporting the login.
    fn enter(&self, phase: Phase) {
        let mut current = self.inner.phase.lock();
        if *current == Phase::Idle {
            *current = phase;
        }
    }

    /// Clears `phase` if it is still the one in flight.
    fn leave(&self, phase: Phase) {
        let mut current = self.inner.phase.lock();
        if *current == phase {
            *current = Phase::Idle;
        }
    }

    async fn wait_for<F>(&self, predicate: F, limit: Duration) -> bool
    where
        F: Fn(&Session) -> bool,
    {
        wait_until(
            self.inner.socket.state().subscribe(),
            predicate,
            self.inner.options.poll_interval,
            limit,
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use tokio::net::TcpListener;

    fn client() -> Client {
        Client::builder()
            .url("ws://127.0.0.1:9/websocket")
            .build()
            .expect("build")
    }

    fn queued(client: &Client) -> Vec<Request> {
        let mut guard = client.inner.outbox_rx.lock();
        let rx = guard.as_mut().expect("receiver not taken");
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn log_in(client: &Client) {
        client
            .inner
            .socket
            .state()
            .set_user("uid", "tester@example.org", "Tester");
    }

    #[test]
    fn test_client_is_clone_and_debug() {
        fn assert_clone<T: Clone>() {}
        fn assert_debug<T: fmt::Debug>() {}
        assert_clone::<Client>();
        assert_debug::<Client>();
    }

    #[test]
    fn test_initial_state() {
        let client = client();
        assert_eq!(client.state(), ClientState::Idle);
        assert_eq!(client.session(), Session::default());
    }

    #[tokio::test]
    async fn test_login_rejects_blank_name() {
        let client = client();
        let err = client.login("  ", "pw").await.expect_err("should fail");
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(queued(&client).is_empty());
    }

    #[tokio::test]
    async fn test_login_rejects_second_login() {
        let client = client();
        log_in(&client);

        let err = client.login("Other", "pw").await.expect_err("should fail");
        assert!(matches!(err, Error::AlreadyLoggedIn { ref user } if user == "Tester"));
        assert!(queued(&client).is_empty());
    }

    #[tokio::test]
    async fn test_logout_requires_login() {
        let client = client();
        let err = client.logout().await.expect_err("should fail");
        assert!(matches!(err, Error::NotLoggedIn { operation: "logout" }));
        assert!(queued(&client).is_empty());
    }

    #[tokio::test]
    async fn test_tell_validation() {
        let client = client();

        let err = client.tell(" ", "hi").expect_err("blank recipient");
        assert!(matches!(err, Error::InvalidArgument { .. }));

        client.tell("Friend", " \t ").expect("whitespace is a no-op");

        let err = client.tell("Friend", "hi").expect_err("not logged in");
        assert!(matches!(err, Error::NotLoggedIn { operation: "tell" }));

        assert!(queued(&client).is_empty());
    }

    #[tokio::test]
    async fn test_tell_trims_both_parts() {
        let client = client();
        log_in(&client);

        client.tell("  Friend ", "  psst  ").expect("tell");

        match queued(&client).as_slice() {
            [Request::Method { method, params, .. }] => {
                assert_eq!(method, "chat");
                assert_eq!(params[0], "tell");
                assert_eq!(params[1], "Friend psst");
            }
            other => panic!("unexpected requests {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_without_login() {
        let client = client();

        client.send(Chat::Universe, "   ").expect("no-op");
        assert!(queued(&client).is_empty());

        client.send(Chat::German, "  hallo ").expect("send");
        match queued(&client).as_slice() {
            [Request::Method { params, .. }] => {
                assert_eq!(params[0], "de");
                assert_eq!(params[1], "hallo");
            }
            other => panic!("unexpected requests {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_presence_uses_connection_time() {
        let client = client();
        client.inner.socket.state().set_connected_at(1234);

        client.set_idle().expect("idle");
        client.set_active().expect("active");

        let requests = queued(&client);
        let names: Vec<_> = requests.iter().map(Request::label).collect();
        assert_eq!(names, ["user-status-idle", "user-status-active"]);

        match &requests[0] {
            Request::Method { params, .. } => assert_eq!(params[0], 1234),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_connect_keeps_login_phase() {
        let client = client();
        *client.inner.phase.lock() = Phase::LoggingIn;

        client.enter(Phase::Connecting);
        assert_eq!(client.state(), ClientState::LoggingIn);

        client.leave(Phase::Connecting);
        assert_eq!(client.state(), ClientState::LoggingIn);

        client.leave(Phase::LoggingIn);
        client.enter(Phase::Connecting);
        assert_eq!(client.state(), ClientState::Connecting);
    }

    #[tokio::test]
    async fn test_close_is_terminal_and_idempotent() {
        let client = client();
        client.close().await.expect("close");
        client.close().await.expect("second close");

        assert_eq!(client.state(), ClientState::Closed);
        assert!(matches!(client.connect().await, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_connect_refused_closes_client() {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let client = Client::builder()
            .url(format!("ws://127.0.0.1:{port}/websocket"))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .expect("build");

        let err = client.connect().await.expect_err("refused");
        assert!(err.is_connection_error());
        assert_eq!(client.state(), ClientState::Closed);
    }
}
