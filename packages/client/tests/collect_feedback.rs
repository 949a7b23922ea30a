//! Integration tests: the coordinator against a real server, with a browser
//! session answering over tokio-tungstenite.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use feedback_collector_client::{
    content::{ContentItem, ImageFormat},
    coordinator::{FeedbackResultKind, RequestCoordinator},
    gateway::{FeedbackGateway, HttpFeedbackGateway, InProcessFeedbackGateway},
    i18n::catalog,
};
use feedback_collector_server::{Application, ServerConfig, domain::Language, ui::AppState};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const FAST_POLL: Duration = Duration::from_millis(50);
const COLLECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Helper struct to manage an in-process server's lifecycle
struct TestServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Application::new(ServerConfig::default());
        let state = app.state();
        let server = app.into_server();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let signal = async {
                let _ = shutdown_rx.await;
            };
            server.serve_with_shutdown(listener, signal).await.unwrap();
        });

        TestServer {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn wait_for_connections(&self, expected: usize) {
        for _ in 0..100 {
            if self.state.get_connections_usecase.count().await == expected {
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

/// Connect a browser session that answers the first request it sees with
/// `answer(request_id)`
async fn spawn_answering_session(
    server: &TestServer,
    answer: impl Fn(&str) -> Value + Send + 'static,
) -> JoinHandle<()> {
    let (ws, _) = connect_async(format!("ws://{}/ws", server.addr))
        .await
        .expect("Failed to connect");
    server.wait_for_connections(1).await;

    tokio::spawn(async move {
        let (mut write, mut read) = ws.split();
        while let Some(Ok(message)) = read.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let frame: Value = serde_json::from_str(text.as_str()).unwrap();
            if frame["type"] == "request_feedback" {
                let reply = answer(frame["id"].as_str().unwrap());
                write
                    .send(Message::Text(reply.to_string().into()))
                    .await
                    .unwrap();
            }
        }
    })
}

#[tokio::test]
async fn test_collect_completed_feedback_over_http() {
    // テスト項目: HTTP 経由でテキストと画像付きの回答を受け取り、取得後にエントリが解放される
    // given (前提条件):
    let server = TestServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
    let encoded = format!("data:image/png;base64,{}", STANDARD.encode(&png));
    let session = spawn_answering_session(&server, move |request_id| {
        json!({
            "type": "feedback_submit",
            "request_id": request_id,
            "text": "looks good",
            "images": [{"name": "shot.png", "size": 7, "type": "image/png", "data": encoded}],
            "auto_append": false,
            "language": "EN"
        })
    })
    .await;
    let gateway = Arc::new(HttpFeedbackGateway::new(server.base_url()));
    let coordinator = RequestCoordinator::new(gateway.clone())
        .with_poll_interval(FAST_POLL)
        .with_language(Language::EN);

    // when (操作):
    let result = coordinator.collect_feedback(COLLECT_TIMEOUT).await;

    // then (期待する結果):
    let texts = catalog(Language::EN);
    assert_eq!(result.kind, FeedbackResultKind::Completed);
    assert_eq!(
        result.content,
        vec![
            ContentItem::Text(format!("{}looks good", texts.text_feedback_prefix)),
            ContentItem::Text(texts.image_caption(1, "shot.png", 7)),
            ContentItem::Image {
                data: png,
                format: ImageFormat::Png,
            },
        ]
    );

    // The entry was released after the terminal read
    let record = gateway.fetch_feedback(&result.request_id).await.unwrap();
    assert_eq!(record.status.to_string(), "waiting");
    assert!(record.created_at.is_none());

    session.abort();
}

#[tokio::test]
async fn test_collect_cancelled_feedback_in_process() {
    // テスト項目: 同一プロセスのゲートウェイでもキャンセルが理由付きで返る
    // given (前提条件):
    let server = TestServer::start().await;
    let session = spawn_answering_session(&server, |request_id| {
        json!({"type": "feedback_cancel", "request_id": request_id})
    })
    .await;
    let gateway = Arc::new(InProcessFeedbackGateway::new(server.state.clone()));
    let coordinator = RequestCoordinator::new(gateway)
        .with_poll_interval(FAST_POLL)
        .with_language(Language::EN);

    // when (操作):
    let result = coordinator.collect_feedback(COLLECT_TIMEOUT).await;

    // then (期待する結果):
    assert_eq!(result.kind, FeedbackResultKind::Cancelled);
    assert_eq!(
        result.content,
        vec![ContentItem::Text(catalog(Language::EN).cancelled("user cancelled"))]
    );

    session.abort();
}

#[tokio::test]
async fn test_collect_times_out_without_sessions() {
    // テスト項目: 誰も回答しない場合はタイムアウトになる
    // given (前提条件):
    let server = TestServer::start().await;
    let gateway = Arc::new(HttpFeedbackGateway::new(server.base_url()));
    let coordinator = RequestCoordinator::new(gateway)
        .with_poll_interval(FAST_POLL)
        .with_language(Language::CN);

    // when (操作):
    let result = coordinator.collect_feedback(Duration::from_secs(1)).await;

    // then (期待する結果):
    assert_eq!(result.kind, FeedbackResultKind::TimedOut);
    assert_eq!(
        result.content,
        vec![ContentItem::Text(catalog(Language::CN).timed_out.to_string())]
    );
}

#[tokio::test]
async fn test_collect_reports_unreachable_server() {
    // テスト項目: サーバーに接続できない場合は Unreachable になる
    // given (前提条件):
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gateway = Arc::new(HttpFeedbackGateway::new(format!("http://{}", addr)));
    let coordinator = RequestCoordinator::new(gateway).with_poll_interval(FAST_POLL);

    // when (操作):
    let result = coordinator.collect_feedback(COLLECT_TIMEOUT).await;

    // then (期待する結果):
    assert_eq!(result.kind, FeedbackResultKind::Unreachable);
    assert_eq!(result.content.len(), 1);
}
