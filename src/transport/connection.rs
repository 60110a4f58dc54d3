//! WebSocket connection and event loop.
//!
//! This module owns the WebSocket to the chat service. Once connected it
//! spawns a tokio task that:
//!
//! - feeds inbound text frames to the [`Socket`], in arrival order
//! - drains the [`Outbox`](super::Outbox) and writes each request as an envelope
//! - reports the close back to the [`Socket`]
//!
//! The event loop is the only writer, so frames never interleave.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Request, envelope};
use crate::session::{Socket, TRAFFIC_TARGET};

use super::OutboxReceiver;

// ============================================================================
// Connection
// ============================================================================

/// Running WebSocket connection.
///
/// Dropping the connection stops its event loop.
pub struct Connection {
    /// Signals the event loop to close the WebSocket.
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    /// Event loop task.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Connection {
    /// Connects to `url` and starts the event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the handshake fails or exceeds `connect_timeout`
    pub async fn open(
        url: &str,
        connect_timeout: Duration,
        socket: Arc<Socket>,
        outbox_rx: OutboxReceiver,
    ) -> Result<Self> {
        let (ws_stream, _response) = timeout(connect_timeout, tokio_tungstenite::connect_async(url))
            .await
            .map_err(|_| {
                Error::connection(format!(
                    "WebSocket handshake timed out after {}ms",
                    connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

        info!(url, "WebSocket connection established");

        Ok(Self::spawn(ws_stream, socket, outbox_rx))
    }

    /// Starts the event loop over an already connected stream.
    pub fn spawn<S>(
        ws_stream: WebSocketStream<S>,
        socket: Arc<Socket>,
        outbox_rx: OutboxReceiver,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        socket.on_open();

        let handle = tokio::spawn(Self::run_event_loop(
            ws_stream,
            socket,
            outbox_rx,
            shutdown_rx,
        ));

        Self {
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Asks the event loop to close the WebSocket.
    ///
    /// Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
    }

    /// Waits until the event loop has exited.
    pub async fn closed(&self) {
        let handle = self.handle.lock().take();

        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Event loop task failed");
        }
    }

    /// Returns `true` once the event loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_none_or(JoinHandle::is_finished)
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        socket: Arc<Socket>,
        mut outbox_rx: OutboxReceiver,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = socket.on_message(&text) {
                                error!(error = %e, frame = %text.as_str(), "Failed to process frame");

                                if e.is_session_fatal() {
                                    let _ = ws_write.close().await;
                                    break;
                                }
                            }
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Requests queued by the client and by message handlers
                request = outbox_rx.recv() => {
                    match request {
                        Some(request) => {
                            if let Err(e) = Self::write_request(&mut ws_write, &request).await {
                                error!(error = %e, request = request.label(), "Failed to send request");

                                if e.is_connection_error() {
                                    break;
                                }
                            }
                        }

                        None => {
                            debug!("Outbox closed");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }

                _ = &mut shutdown_rx => {
                    debug!("Shutdown requested");
                    let _ = ws_write.close().await;
                    break;
                }
            }
        }

        socket.on_close();

        debug!("Event loop terminated");
    }

    /// Encodes and writes one request.
    async fn write_request<S>(
        ws_write: &mut SplitSink<WebSocketStream<S>, Message>,
        request: &Request,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let text = envelope::encode(&request.to_message()?)?;

        trace!(target: TRAFFIC_TARGET, request = request.label(), bytes = text.len(), "[-->]");

        ws_write.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
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

    use crate::transport::Outbox;

    #[tokio::test]
    async fn test_open_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let (outbox, rx) = Outbox::channel();
        let socket = Arc::new(Socket::new(outbox));
        let result = Connection::open(
            &format!("ws://127.0.0.1:{port}"),
            Duration::from_secs(2),
            socket,
            rx,
        )
        .await;

        assert!(matches!(result, Err(Error::Connection { .. })));
    }

    #[tokio::test]
    async fn test_event_loop_round_trip() {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");

            ws.send(Message::Text("o".into())).await.expect("open");
            ws.send(Message::Text(r#"a["{\"msg\":\"ping\"}"]"#.into()))
                .await
                .expect("ping");

            loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => return text.to_string(),
                    Some(Ok(_)) => continue,
                    other => panic!("unexpected {other:?}"),
                }
            }
        });

        let (outbox, rx) = Outbox::channel();
        let socket = Arc::new(Socket::new(outbox));
        let connection = Connection::open(
            &format!("ws://127.0.0.1:{port}"),
            Duration::from_secs(5),
            Arc::clone(&socket),
            rx,
        )
        .await
        .expect("open");

        let reply = server.await.expect("server task");
        assert_eq!(reply, r#"["{\"msg\":\"pong\"}"]"#);
        assert!(socket.state().is_connection_open());

        connection.shutdown();
        connection.closed().await;
        assert!(connection.is_finished());
        assert!(!socket.state().is_connection_open());
    }

    #[tokio::test]
    async fn test_identity_mismatch_closes_socket() {
        let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");

            ws.send(Message::Text("o".into())).await.expect("open");
            ws.send(Message::Text(
                r#"a["{\"msg\":\"removed\",\"collection\":\"users\",\"id\":\"intruder\"}"]"#.into(),
            ))
            .await
            .expect("removed");

            // Client must hang up on its own
            loop {
                match ws.next().await {
                    Some(Ok(Message::Close(_))) => return true,
                    Some(Ok(_)) => continue,
                    _ => return false,
                }
            }
        });

        let (outbox, rx) = Outbox::channel();
        let socket = Arc::new(Socket::new(outbox));
        let connection = Connection::open(
            &format!("ws://127.0.0.1:{port}"),
            Duration::from_secs(5),
            Arc::clone(&socket),
            rx,
        )
        .await
        .expect("open");

        let saw_close = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server finished")
            .expect("server task");
        assert!(saw_close);

        tokio::time::timeout(Duration::from_secs(5), connection.closed())
            .await
            .expect("event loop exited");
        assert!(connection.is_finished());
        assert!(!socket.state().is_connection_open());
    }
}
