use std::net::SocketAddr;

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::StreamExt;
use tokio::net::TcpListener;

use partial_viewer::source::http_source::HttpSource;
use partial_viewer::source::traits::{SourceResponse, TextSource};
use partial_viewer::{DownloadError, ViewerConfig};

const BODY: &str = "It is a truth universally acknowledged, that a single man in possession \
of a good fortune, must be in want of a wife.\n";

async fn serve_text(req: Request) -> impl IntoResponse {
    let body = BODY.as_bytes();
    let total = body.len();

    if let Some(range_val) = req.headers().get(header::RANGE) {
        let range_str = range_val.to_str().unwrap_or("");
        // Only "bytes=START-" is ever sent.
        if let Some(start) = range_str
            .strip_prefix("bytes=")
            .and_then(|rest| rest.strip_suffix('-'))
            .and_then(|s| s.parse::<usize>().ok())
        {
            let slice = &body[start.min(total)..];
            let content_range = format!("bytes {}-{}/{}", start, total - 1, total);
            return (
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, "text/plain".to_string()),
                    (header::CONTENT_RANGE, content_range),
                ],
                slice.to_vec(),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain".to_string())],
        body.to_vec(),
    )
        .into_response()
}

async fn start_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/book.txt", get(serve_text))
        .route("/gone", get(|| async { StatusCode::GONE }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

async fn read_body(resp: SourceResponse) -> Vec<u8> {
    let mut body = resp.body;
    let mut out = Vec::new();
    while let Some(chunk) = body.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn test_http_source_full_body_without_offset() {
    let (addr, _handle) = start_server().await;
    let source = HttpSource::new(&ViewerConfig::default()).unwrap();

    let resp = source
        .open(&format!("http://{}/book.txt", addr), 0)
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert!(!resp.is_partial());
    assert_eq!(read_body(resp).await, BODY.as_bytes());
}

#[tokio::test]
async fn test_http_source_sends_range_when_resuming() {
    let (addr, _handle) = start_server().await;
    let source = HttpSource::new(&ViewerConfig::default()).unwrap();

    let resp = source
        .open(&format!("http://{}/book.txt", addr), 10)
        .await
        .unwrap();
    assert_eq!(resp.status, 206);
    assert!(resp.is_partial());
    assert_eq!(read_body(resp).await, &BODY.as_bytes()[10..]);
}

#[tokio::test]
async fn test_http_source_passes_error_status_through() {
    let (addr, _handle) = start_server().await;
    let source = HttpSource::new(&ViewerConfig::default()).unwrap();

    let resp = source
        .open(&format!("http://{}/gone", addr), 0)
        .await
        .unwrap();
    assert_eq!(resp.status, 410);
    assert_eq!(resp.reason, "Gone");
}

#[tokio::test]
async fn test_http_source_connection_refused_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpSource::new(&ViewerConfig::default()).unwrap();
    let err = source
        .open(&format!("http://{}/book.txt", addr), 0)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DownloadError::Transport(_)));
}
