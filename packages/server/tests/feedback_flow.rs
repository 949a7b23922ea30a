//! Integration tests: a real server on an ephemeral port, browser sessions
//! driven with tokio-tungstenite and the polling caller with reqwest.

use std::{net::SocketAddr, time::Duration};

use feedback_collector_server::{Application, ServerConfig, domain::Language};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage an in-process server's lifecycle
struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    async fn start_with(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Application::new(config).into_server();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let signal = async {
                let _ = shutdown_rx.await;
            };
            server.serve_with_shutdown(listener, signal).await.unwrap();
        });

        TestServer {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn request_feedback(&self, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.http_url("/api/request_feedback"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> Value {
        reqwest::get(self.http_url(path))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn wait_for_connections(&self, expected: u64) {
        for _ in 0..100 {
            let health = self.get_json("/health").await;
            if health["connections"] == json!(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("connection count never reached {}", expected);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

/// A browser session
struct TestSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    connection_id: String,
}

impl TestSession {
    async fn connect(url: &str) -> Self {
        let (ws, _) = connect_async(url).await.expect("Failed to connect");
        let mut session = TestSession {
            ws,
            connection_id: String::new(),
        };
        let greeting = session.recv_type("connection_established").await;
        session.connection_id = greeting["connection_id"].as_str().unwrap().to_string();
        session
    }

    async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    /// Next JSON text frame, or `None` if nothing arrives within `wait`
    async fn try_recv_json(&mut self, wait: Duration) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(wait, self.ws.next()).await.ok()??;
            if let Message::Text(text) = frame.unwrap() {
                return Some(serde_json::from_str(text.as_str()).unwrap());
            }
        }
    }

    /// Next frame of the given type, skipping heartbeat requests
    async fn recv_type(&mut self, kind: &str) -> Value {
        loop {
            let value = self
                .try_recv_json(RECV_TIMEOUT)
                .await
                .unwrap_or_else(|| panic!("no '{}' frame received", kind));
            if value["type"] == kind {
                return value;
            }
            assert_eq!(value["type"], "heartbeat_request", "unexpected frame: {}", value);
        }
    }

    async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

#[tokio::test]
async fn test_health_without_sessions() {
    // テスト項目: 接続がない状態で /health が healthy と 0、起動時の設定を返す
    // given (前提条件):
    let server = TestServer::start_with(
        ServerConfig::new("0.0.0.0", 8123).with_default_language(Language::EN),
    )
    .await;

    // when (操作):
    let health = server.get_json("/health").await;

    // then (期待する結果):
    assert_eq!(
        health,
        json!({
            "status": "healthy",
            "connections": 0,
            "config": {"host": "0.0.0.0", "port": 8123, "language": "EN"}
        })
    );
}

#[tokio::test]
async fn test_request_submit_and_poll() {
    // テスト項目: 依頼 → 配信 → 送信 → ポーリングで completed が読める
    // given (前提条件):
    let server = TestServer::start().await;
    let mut session = TestSession::connect(&server.ws_url()).await;

    // when (操作):
    let response: Value = server
        .request_feedback(json!({"id": "r1", "timeout": 60, "language": "EN"}))
        .await
        .json()
        .await
        .unwrap();
    let request = session.recv_type("request_feedback").await;
    let before = server.get_json("/api/feedback/r1").await;

    session
        .send_json(json!({
            "type": "feedback_submit",
            "request_id": "r1",
            "text": "looks good",
            "auto_append": false,
            "language": "EN"
        }))
        .await;
    let ack = session.recv_type("feedback_received").await;
    let after = server.get_json("/api/feedback/r1").await;

    // then (期待する結果):
    assert_eq!(response["status"], "success");
    assert_eq!(response["request_id"], "r1");
    assert_eq!(response["recipients"], 1);
    assert_eq!(request["id"], "r1");
    assert_eq!(request["timeout"], 60);
    assert_eq!(request["language"], "EN");
    assert_eq!(before["status"], "waiting");
    assert_eq!(ack, json!({"type": "feedback_received", "request_id": "r1", "status": "success"}));
    assert_eq!(after["status"], "completed");
    assert_eq!(after["data"]["text"], "looks good");
    assert_eq!(after["data"]["auto_append"], false);
    assert!(after["resolved_at"].is_string());
}

#[tokio::test]
async fn test_first_answer_wins_across_sessions() {
    // テスト項目: 二つのセッションのうち最初の終端応答だけが採用される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut first = TestSession::connect(&server.ws_url()).await;
    let mut second = TestSession::connect(&server.ws_url()).await;
    let response: Value = server
        .request_feedback(json!({"id": "r2"}))
        .await
        .json()
        .await
        .unwrap();
    first.recv_type("request_feedback").await;
    second.recv_type("request_feedback").await;

    // when (操作):
    first
        .send_json(json!({"type": "feedback_cancel", "request_id": "r2"}))
        .await;
    first.recv_type("feedback_cancelled").await;
    second
        .send_json(json!({"type": "feedback_submit", "request_id": "r2", "text": "late"}))
        .await;
    let rejected = second.recv_type("error").await;

    // then (期待する結果):
    assert_eq!(response["recipients"], 2);
    assert_eq!(rejected["message"], "request r2 is already cancelled");
    let stored = server.get_json("/api/feedback/r2").await;
    assert_eq!(stored["status"], "cancelled");
    assert_eq!(stored["data"]["reason"], "user cancelled");
}

#[tokio::test]
async fn test_request_without_sessions_and_unknown_poll() {
    // テスト項目: 接続ゼロでも依頼は成功し、未知の id は waiting として返る
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response: Value = server
        .request_feedback(json!({}))
        .await
        .json()
        .await
        .unwrap();
    let unknown = server.get_json("/api/feedback/never-created").await;

    // then (期待する結果):
    assert_eq!(response["status"], "success");
    assert_eq!(response["recipients"], 0);
    assert!(!response["request_id"].as_str().unwrap().is_empty());
    assert_eq!(unknown["status"], "waiting");
    assert_eq!(unknown["request_id"], "never-created");
    assert!(unknown["message"].is_string());
}

#[tokio::test]
async fn test_invalid_request_body_is_rejected() {
    // テスト項目: 不正なボディには 400 と status:error が返る
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::Client::new()
        .post(server.http_url("/api/request_feedback"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_release_feedback_entry() {
    // テスト項目: DELETE で解放すると 204、二度目は 404
    // given (前提条件):
    let server = TestServer::start().await;
    server.request_feedback(json!({"id": "r3"})).await;
    let client = reqwest::Client::new();

    // when (操作):
    let first = client
        .delete(server.http_url("/api/feedback/r3"))
        .send()
        .await
        .unwrap();
    let second = client
        .delete(server.http_url("/api/feedback/r3"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(first.status(), reqwest::StatusCode::NO_CONTENT);
    assert_eq!(second.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_heartbeat_round_trip_and_client_info() {
    // テスト項目: heartbeat_request が届き、heartbeat に heartbeat_response が返る
    // given (前提条件):
    let config = ServerConfig::default().with_heartbeat_interval(Duration::from_millis(100));
    let server = TestServer::start_with(config).await;
    let mut session = TestSession::connect(&format!("{}?agent=test", server.ws_url())).await;

    // when (操作):
    let ping = session.recv_type("heartbeat_request").await;
    session
        .send_json(json!({"type": "heartbeat", "timestamp": ping["timestamp"]}))
        .await;
    session.recv_type("heartbeat_response").await;
    let connections = server.get_json("/debug/connections").await;

    // then (期待する結果):
    let connections = connections.as_array().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["connection_id"], session.connection_id.as_str());
    assert_eq!(connections[0]["client_info"], json!({"agent": "test"}));
}

#[tokio::test]
async fn test_protocol_error_goes_only_to_originator() {
    // テスト項目: 不正なフレームへのエラー応答は送信元だけに届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut sender = TestSession::connect(&server.ws_url()).await;
    let mut bystander = TestSession::connect(&server.ws_url()).await;

    // when (操作):
    sender.send_text("definitely not json").await;
    let error = sender.recv_type("error").await;
    let leaked = bystander.try_recv_json(Duration::from_millis(200)).await;

    // then (期待する結果):
    assert_eq!(error["message"], "invalid format");
    assert!(leaked.is_none());
}

#[tokio::test]
async fn test_disconnect_removes_session() {
    // テスト項目: セッションを閉じるとレジストリから削除される
    // given (前提条件):
    let server = TestServer::start().await;
    let session = TestSession::connect(&server.ws_url()).await;
    server.wait_for_connections(1).await;

    // when (操作):
    session.close().await;

    // then (期待する結果):
    server.wait_for_connections(0).await;
}
