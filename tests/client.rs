//! Client tests against an in-process chat server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lv20_client::{Chat, Client, ClientOptions, ClientState, Error};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Fake server
// ============================================================================

const USER_ID: &str = "RN62wtdTrNjjDEFrP";

/// Requests received by the fake server, decoded.
#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<Value>>>, Arc<AtomicBool>);

impl Received {
    fn hung_up(&self) -> bool {
        self.1.load(Ordering::SeqCst)
    }

    fn all(&self) -> Vec<Value> {
        self.0.lock().clone()
    }

    fn count(&self, msg: &str) -> usize {
        self.0.lock().iter().filter(|v| v["msg"] == msg).count()
    }

    fn methods(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|v| v["msg"] == "method")
            .filter_map(|v| v["method"].as_str().map(str::to_string))
            .collect()
    }
}

fn answer(message: Value) -> Message {
    let inner = message.to_string();
    let envelope = serde_json::to_string(&[inner]).expect("envelope");
    Message::Text(format!("a{envelope}").into())
}

/// Server side replies for one request.
fn replies(request: &Value) -> Vec<Message> {
    match (request["msg"].as_str(), request["method"].as_str()) {
        (Some("connect"), _) => vec![answer(json!({ "msg": "connected", "session": "S1" }))],
        (Some("method"), Some("login")) => vec![answer(json!({
            "msg": "added",
            "collection": "users",
            "id": USER_ID,
            "fields": { "username": "Tester", "profile": { "email": "tester@example.org" } },
        }))],
        (Some("method"), Some("logout")) => vec![answer(json!({
            "msg": "removed",
            "collection": "users",
            "id": USER_ID,
        }))],
        _ => Vec::new(),
    }
}

/// Accepts one client, opens the SockJS session and answers requests.
async fn serve() -> (String, Received) {
    serve_after(Duration::ZERO).await
}

/// Like [`serve`], holding the WebSocket upgrade back for `delay`.
async fn serve_after(delay: Duration) -> (String, Received) {
    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let received = Received::default();
    let log = received.clone();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(delay).await;
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade");

        // The client may already be hanging up
        let _ = ws.send(Message::Text("o".into())).await;

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };

            let envelope: Vec<String> = serde_json::from_str(&text).expect("envelope");
            let request: Value = serde_json::from_str(&envelope[0]).expect("message");
            let out = replies(&request);
            log.0.lock().push(request);

            for reply in out {
                if ws.send(reply).await.is_err() {
                    break;
                }
            }
        }

        log.1.store(true, Ordering::SeqCst);
    });

    (format!("ws://127.0.0.1:{port}/sockjs/1/test/websocket"), received)
}

fn options(url: &str) -> ClientOptions {
    ClientOptions::new()
        .with_url(url)
        .with_connect_timeout(Duration::from_secs(5))
        .with_login_timeout(Duration::from_secs(5))
        .with_logout_timeout(Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(10))
}

async fn client() -> (Client, Received) {
    let (url, received) = serve().await;
    let client = Client::builder()
        .options(options(&url))
        .build()
        .expect("build");
    (client, received)
}

/// Waits for queued requests to reach the server.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_connect_establishes_session() {
    let (client, received) = client().await;

    assert!(client.connect().await.expect("connect"));
    assert_eq!(client.state(), ClientState::SessionEstablished);
    assert_eq!(client.session().session_id.as_deref(), Some("S1"));
    assert!(client.session().connected_at.is_some());

    settle().await;
    let first = &received.all()[0];
    assert_eq!(first["msg"], "connect");
    assert_eq!(first["version"], "pre2");
    assert_eq!(first["support"], json!(["pre2", "pre1"]));
    assert_eq!(received.methods(), ["user-status-active"]);
}

#[tokio::test]
async fn test_double_connect_handshakes_once() {
    let (client, received) = client().await;

    assert!(client.connect().await.expect("first connect"));
    assert!(client.connect().await.expect("second connect"));

    settle().await;
    assert_eq!(received.count("connect"), 1);
}

#[tokio::test]
async fn test_concurrent_connect_handshakes_once() {
    let (client, received) = client().await;

    let (a, b) = tokio::join!(client.connect(), client.connect());
    assert!(a.expect("connect a"));
    assert!(b.expect("connect b"));

    assert!(client.connect().await.expect("connect"));
    settle().await;
    assert_eq!(received.count("connect"), 1);
}

#[tokio::test]
async fn test_login_and_logout() {
    let (client, received) = client().await;

    assert!(client.login("Tester", "secret").await.expect("login"));
    assert_eq!(client.state(), ClientState::LoggedIn);

    let session = client.session();
    assert_eq!(session.user_name.as_deref(), Some("Tester"));
    assert_eq!(session.user_email.as_deref(), Some("tester@example.org"));
    assert_eq!(session.user_resource_id.as_deref(), Some(USER_ID));

    let err = client.login("Tester", "secret").await.expect_err("second login");
    assert!(matches!(err, Error::AlreadyLoggedIn { .. }));

    assert!(client.logout().await.expect("logout"));
    assert!(client.session().is_logged_out());
    assert_eq!(client.state(), ClientState::SessionEstablished);

    settle().await;
    let login = received
        .all()
        .into_iter()
        .find(|v| v["method"] == "login")
        .expect("login request");
    assert_eq!(login["params"][0]["username"], "Tester");
    assert_eq!(login["params"][0]["ryzom"], true);
    assert_eq!(login["params"][0]["lang"], "en");
    assert_eq!(login["id"], "2");

    // Seven feeds follow the login
    assert_eq!(received.count("sub"), 7);
}

#[tokio::test]
async fn test_chat_after_login() {
    let (client, received) = client().await;
    assert!(client.login("Tester", "secret").await.expect("login"));

    client.send(Chat::French, " salut ").expect("send");
    client.tell(" Friend ", " psst ").expect("tell");

    settle().await;
    let chats: Vec<Value> = received
        .all()
        .into_iter()
        .filter(|v| v["method"] == "chat")
        .map(|v| v["params"].clone())
        .collect();

    assert_eq!(chats, [json!(["fr", "salut"]), json!(["tell", "Friend psst"])]);
}

#[tokio::test]
async fn test_whitespace_messages_send_nothing() {
    let (client, received) = client().await;
    assert!(client.login("Tester", "secret").await.expect("login"));

    client.send(Chat::Universe, "  \n ").expect("send");
    client.tell("Friend", "\t").expect("tell");

    settle().await;
    assert!(!received.methods().iter().any(|m| m == "chat"));
}

#[tokio::test]
async fn test_logout_without_login_sends_nothing() {
    let (client, received) = client().await;
    assert!(client.connect().await.expect("connect"));

    let err = client.logout().await.expect_err("not logged in");
    assert!(matches!(err, Error::NotLoggedIn { .. }));

    settle().await;
    assert!(!received.methods().iter().any(|m| m == "logout"));
}

#[tokio::test]
async fn test_close_logs_out_first() {
    let (client, received) = client().await;
    assert!(client.login("Tester", "secret").await.expect("login"));

    client.close().await.expect("close");
    assert_eq!(client.state(), ClientState::Closed);
    assert!(client.session().is_logged_out());
    assert!(!client.session().is_connection_open());

    assert!(received.methods().iter().any(|m| m == "logout"));
    assert!(matches!(client.connect().await, Err(Error::ConnectionClosed)));
}

#[tokio::test]
async fn test_close_during_handshake_drops_transport() {
    let (url, received) = serve_after(Duration::from_millis(300)).await;
    let client = Client::builder()
        .options(options(&url))
        .build()
        .expect("build");

    let connecting = tokio::spawn({
        let client = client.clone();
        async move { client.connect().await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.close().await.expect("close");
    assert_eq!(client.state(), ClientState::Closed);

    let result = connecting.await.expect("connect task");
    assert!(matches!(result, Err(Error::ConnectionClosed)));
    assert_eq!(client.state(), ClientState::Closed);
    assert!(!client.session().is_connection_open());

    // The late transport is hung up without a handshake
    let hung_up = tokio::time::timeout(Duration::from_secs(5), async {
        while !received.hung_up() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(hung_up.is_ok());
    assert_eq!(received.count("connect"), 0);
    assert!(received.methods().is_empty());
}

#[tokio::test]
async fn test_connect_times_out_without_open_frame() {
    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .expect("bind");
    let port = listener.local_addr().expect("addr").port();

    // Upgrades but never sends the open frame
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade");
        while ws.next().await.is_some() {}
    });

    let client = Client::builder()
        .options(
            options(&format!("ws://127.0.0.1:{port}/websocket"))
                .with_connect_timeout(Duration::from_millis(200)),
        )
        .build()
        .expect("build");

    assert!(!client.connect().await.expect("connect"));
    assert_eq!(client.state(), ClientState::Idle);
}
