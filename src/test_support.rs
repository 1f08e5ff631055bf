use axum::{Json, Router, http::HeaderMap, http::StatusCode, http::header, routing::post};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One request received by the fake webhook.
#[derive(Debug, Clone)]
pub struct HookRequest {
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

pub type Captured = Arc<Mutex<Vec<HookRequest>>>;

pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("test listener should bind");
    let addr = listener.local_addr().expect("test listener should expose local address");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("test server should run") });
    addr
}

/// Fake Slack webhook at `/hook` answering `status` with an `ok` body.
pub async fn spawn_hook(status: StatusCode) -> (String, Captured) {
    spawn_hook_with_body(status, "ok").await
}

/// Fake Slack webhook at `/hook` recording every request it receives.
pub async fn spawn_hook_with_body(status: StatusCode, reply: &'static str) -> (String, Captured) {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let app = Router::new().route(
        "/hook",
        post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
            let sink = sink.clone();
            async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                sink.lock().unwrap().push(HookRequest { content_type, body });
                (status, reply)
            }
        }),
    );
    let addr = serve(app).await;
    (format!("http://{addr}/hook"), captured)
}

pub fn texts(captured: &Captured) -> Vec<String> {
    captured
        .lock()
        .unwrap()
        .iter()
        .filter_map(|request| request.body["text"].as_str().map(str::to_string))
        .collect()
}
