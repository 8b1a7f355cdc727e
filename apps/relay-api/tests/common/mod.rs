#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use tokio::time;

use relay_api::config::Config;
use relay_api::relay::events::QueueItem;
use relay_api::relay::queue::QueueReceiver;
use relay_api::AppState;

/// How long a test waits for any single frame or condition.
pub const WAIT: Duration = Duration::from_secs(5);

/// Config for tests: heartbeat far in the future unless overridden, static
/// files from the crate's own `static/` directory.
pub fn test_config() -> Config {
    Config {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        heartbeat_interval: Duration::from_secs(3600),
        ..Config::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config())
}

pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = relay_api::routes::router(&state.config).with_state(state.clone());
    (app, state)
}

/// Start an actual TCP server for streaming tests. The server runs in the
/// background.
pub async fn start_server(state: AppState) -> SocketAddr {
    let app = relay_api::routes::router(&state.config).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Drain everything currently queued on a raw registry receiver, returning
/// the event payloads (keepalives skipped).
pub fn drain_events(rx: &mut QueueReceiver) -> Vec<serde_json::Value> {
    let mut events = Vec::new();
    while let Ok(item) = rx.try_recv() {
        if let QueueItem::Event(event) = item {
            events.push(serde_json::to_value(event.as_ref()).unwrap());
        }
    }
    events
}

/// Poll `check` until it returns true or [`WAIT`] elapses.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = time::Instant::now() + WAIT;
    while time::Instant::now() < deadline {
        if check() {
            return true;
        }
        time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

/// Minimal text-event-stream reader over a live `/logs` response.
pub struct SseClient {
    response: reqwest::Response,
    buffer: String,
}

/// One frame from the stream, without its terminating blank line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Comment(String),
    Data(serde_json::Value),
}

impl SseClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let response = reqwest::get(format!("http://{addr}/logs"))
            .await
            .expect("connect to /logs");
        assert!(response.status().is_success());
        Self {
            response,
            buffer: String::new(),
        }
    }

    pub fn content_type(&self) -> Option<String> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Next raw frame text, or `None` when the server ends the stream.
    pub async fn next_raw(&mut self) -> Option<String> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame = self.buffer[..end].to_string();
                self.buffer.drain(..end + 2);
                return Some(frame);
            }
            let chunk = time::timeout(WAIT, self.response.chunk())
                .await
                .expect("timed out waiting for stream data")
                .expect("stream read error")?;
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    pub async fn next_frame(&mut self) -> Option<Frame> {
        let raw = self.next_raw().await?;
        if let Some(comment) = raw.strip_prefix(':') {
            return Some(Frame::Comment(comment.trim().to_string()));
        }
        let data = raw
            .strip_prefix("data: ")
            .unwrap_or_else(|| panic!("unexpected frame: {raw:?}"));
        assert!(!data.contains('\n'), "event split across lines: {raw:?}");
        let value = serde_json::from_str(data).unwrap_or_else(|e| panic!("bad frame {raw:?}: {e}"));
        Some(Frame::Data(value))
    }

    /// Next data frame, skipping keepalive comments.
    pub async fn next_event(&mut self) -> Option<serde_json::Value> {
        loop {
            match self.next_frame().await? {
                Frame::Comment(_) => continue,
                Frame::Data(value) => return Some(value),
            }
        }
    }
}
