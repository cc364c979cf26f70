//! WebSocket end-to-end suite
//!
//! Boots the router on an ephemeral port and drives it with a real
//! WebSocket client.

use assert_matches::assert_matches;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::common::{auth_header, generate_test_token, test_config};
use task_social::backend::routes::create_router;
use task_social::backend::scheduler::{MemoryStore, Store};
use task_social::backend::server::AppState;
use task_social::shared::Envelope;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const STEP: Duration = Duration::from_secs(5);

struct TestServer {
    addr: SocketAddr,
    state: AppState,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::new(test_config(), Store::Memory(Arc::new(MemoryStore::new())));
        let app = create_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state, task }
    }

    fn url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    /// Connect as `user_id` and wait until the server has registered it
    async fn connect(&self, user_id: &str) -> Client {
        let previous = self.state.registry.connection_id(user_id);
        let (client, _) = connect_async(self.url(&generate_test_token(user_id))).await.unwrap();
        let registry = Arc::clone(&self.state.registry);
        let user = user_id.to_string();
        wait_until(move || {
            let current = registry.connection_id(&user);
            current.is_some() && current != previous
        })
        .await;
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    let polled = tokio::time::timeout(STEP, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "condition not met within {STEP:?}");
}

/// Next text frame, skipping pings
async fn next_text(client: &mut Client) -> String {
    loop {
        let message = tokio::time::timeout(STEP, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("receive failed");
        match message {
            Message::Text(text) => return text.as_str().to_string(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected text frame, got {other:?}"),
        }
    }
}

/// Wait for the server to end the connection
async fn expect_closed(client: &mut Client) {
    loop {
        let message = tokio::time::timeout(STEP, client.next())
            .await
            .expect("timed out waiting for close");
        match message {
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(other)) => panic!("Expected close, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_broadcast_reaches_connected_client() {
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;

    let envelope = Envelope::new_post(serde_json::json!({"id": "p1", "body": "first!"}));
    let delivered = server
        .state
        .broadcaster
        .broadcast_event(&["alice", "carol"], &envelope)
        .await
        .unwrap();
    assert_eq!(delivered, 1);

    let text = next_text(&mut alice).await;
    let payload = crate::assert_envelope!(&text, "new_post");
    assert_eq!(payload["body"], "first!");
}

#[tokio::test]
async fn test_text_frames_are_echoed() {
    let server = TestServer::start().await;
    let mut client = server.connect("alice").await;

    client.send(Message::Text("ping".into())).await.unwrap();

    assert_eq!(next_text(&mut client).await, "ping");
}

#[tokio::test]
async fn test_authorization_header_is_accepted() {
    let server = TestServer::start().await;
    let mut request = format!("ws://{}/ws", server.addr).into_client_request().unwrap();
    let value = HeaderValue::from_str(&auth_header(&generate_test_token("bob"))).unwrap();
    request.headers_mut().insert(AUTHORIZATION, value);

    let (_client, response) = connect_async(request).await.unwrap();

    assert_eq!(response.status().as_u16(), 101);
    let registry = Arc::clone(&server.state.registry);
    wait_until(move || registry.contains("bob")).await;
}

#[tokio::test]
async fn test_invalid_token_is_refused_before_upgrade() {
    let server = TestServer::start().await;

    let result = connect_async(server.url("forged")).await;

    assert_matches!(result, Err(WsError::Http(response)) if response.status().as_u16() == 401);
    assert!(server.state.registry.is_empty());
}

#[tokio::test]
async fn test_reconnect_closes_previous_socket() {
    let server = TestServer::start().await;
    let mut first = server.connect("alice").await;
    let mut second = server.connect("alice").await;

    expect_closed(&mut first).await;
    assert_eq!(server.state.registry.len(), 1);

    server.state.broadcaster.send_to_one("alice", "to the newest").await.unwrap();
    assert_eq!(next_text(&mut second).await, "to the newest");
}

#[tokio::test]
async fn test_client_close_unregisters() {
    let server = TestServer::start().await;
    let mut client = server.connect("alice").await;

    client.close(None).await.unwrap();

    let registry = Arc::clone(&server.state.registry);
    wait_until(move || !registry.contains("alice")).await;
}

#[tokio::test]
async fn test_server_removal_sends_close() {
    let server = TestServer::start().await;
    let mut client = server.connect("alice").await;

    assert!(server.state.registry.remove("alice"));

    expect_closed(&mut client).await;
}
