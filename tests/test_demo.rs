//! Tests for the bundled demo handler

use std::time::Duration;

use httpwire::config::DemoConfig;
use httpwire::demo::{Demo, status_page};
use httpwire::http::connection::{BoxedWrite, serve};
use httpwire::http::request::Request;
use httpwire::http::response::StatusCode;
use httpwire::http::writer::ResponseWriter;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn request_demo(cfg: DemoConfig, raw: &[u8]) -> String {
    let demo = Demo::new(cfg);
    let handler = move |writer: ResponseWriter<BoxedWrite>, request: Request| {
        let demo = demo.clone();
        async move { demo.handle(writer, request).await }
    };

    let (mut client, server_side) = tokio::io::duplex(64 * 1024);
    client.write_all(raw).await.unwrap();

    let (reader, writer) = tokio::io::split(server_side);
    serve(reader, writer, Duration::from_secs(1), &handler)
        .await
        .unwrap();

    let mut response = String::new();
    client.read_to_string(&mut response).await.unwrap();
    response
}

#[test]
fn test_status_page_routes() {
    assert_eq!(status_page("/").0, StatusCode::OK);
    assert_eq!(status_page("/yourproblem").0, StatusCode::BAD_REQUEST);
    assert_eq!(status_page("/myproblem").0, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(status_page("/myproblem").1.contains("<h1>Internal Server Error</h1>"));
}

#[tokio::test]
async fn test_demo_success_page() {
    let response = request_demo(DemoConfig::default(), b"GET / HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("content-type: text/html\r\n"));
    assert!(response.contains("<title>200 OK</title>"));
}

#[tokio::test]
async fn test_demo_bad_request_page() {
    let response = request_demo(DemoConfig::default(), b"GET /yourproblem HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("Your request honestly kinda sucked."));
}

#[tokio::test]
async fn test_demo_video_missing_file() {
    let cfg = DemoConfig {
        video_path: "/nonexistent/httpwire/vim.mp4".to_string(),
        ..DemoConfig::default()
    };
    let response = request_demo(cfg, b"GET /video HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(response.contains("content-type: text/plain\r\n"));
}

#[tokio::test]
async fn test_demo_video_served() {
    let path = std::env::temp_dir().join(format!("httpwire-video-{}.mp4", std::process::id()));
    std::fs::write(&path, b"\x00\x00\x00\x18ftypmp42").unwrap();

    let cfg = DemoConfig {
        video_path: path.to_string_lossy().into_owned(),
        ..DemoConfig::default()
    };
    let response = request_demo(cfg, b"GET /video HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("content-type: video/mp4\r\n"));
    assert!(response.contains("content-length: 12\r\n"));
    assert!(response.ends_with("ftypmp42"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_demo_passthrough_upstream_down() {
    let addr = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let cfg = DemoConfig {
        upstream: format!("http://{}", addr),
        ..DemoConfig::default()
    };
    let response = request_demo(cfg, b"GET /httpbin/get HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
}

#[tokio::test]
async fn test_demo_non_utf8_target_is_not_forwarded() {
    let addr = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let cfg = DemoConfig {
        upstream: format!("http://{}", addr),
        ..DemoConfig::default()
    };
    let response = request_demo(cfg, b"GET /httpbin/a\xff HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.contains("content-type: text/html\r\n"));
}
