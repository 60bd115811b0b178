//! End-to-end lookup scenarios over real loopback connections.

use lookupd::config::TimeoutConfig;
use lookupd::store::MemoryBackend;

mod common;

use common::{get, parse_response, seed_rows, send_raw, start_server};

fn timeouts() -> TimeoutConfig {
    TimeoutConfig {
        read_ms: 2_000,
        handle_ms: 2_000,
        write_ms: 2_000,
    }
}

#[tokio::test]
async fn existing_row_returns_200_with_last_name() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;
    let (status, body) = get(server.addr, "/employee/42").await;
    assert_eq!(status, 200);
    assert_eq!(body, "Smith");
}

#[tokio::test]
async fn missing_row_returns_404_after_one_query() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;
    let (status, body) = get(server.addr, "/employee/9999").await;
    assert_eq!(status, 404);
    assert_eq!(body, "");
    assert_eq!(server.backend.queries(), 1);
}

#[tokio::test]
async fn wrong_prefix_returns_400_with_zero_store_calls() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;
    let (status, body) = get(server.addr, "/widget/42").await;
    assert_eq!(status, 400);
    assert_eq!(body, "");
    assert_eq!(server.backend.queries(), 0);
}

#[tokio::test]
async fn wrong_method_returns_400_with_zero_store_calls() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;
    let reply = send_raw(
        server.addr,
        b"POST /employee/42 HTTP/1.1\r\nHost: t\r\nContent-Length: 0\r\n\r\n",
    )
    .await;
    let (status, _) = parse_response(&reply);
    assert_eq!(status, 400);
    assert_eq!(server.backend.queries(), 0);
}

#[tokio::test]
async fn responses_always_announce_connection_close() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;
    for path in ["/employee/42", "/employee/9999", "/nope"] {
        let raw = format!("GET {path} HTTP/1.1\r\nHost: t\r\n\r\n");
        let reply = send_raw(server.addr, raw.as_bytes()).await;
        let text = String::from_utf8(reply).unwrap();
        assert!(text.contains("\r\nConnection: close\r\n"), "path {path}");
    }
}

#[tokio::test]
async fn response_version_mirrors_the_request() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;
    let reply = send_raw(server.addr, b"GET /employee/42 HTTP/1.0\r\n\r\n").await;
    let text = String::from_utf8(reply).unwrap();
    assert!(text.starts_with("HTTP/1.0 200 "));
}

#[tokio::test]
async fn concurrent_sessions_resolve_independently() {
    let server = start_server(MemoryBackend::new(seed_rows()), 4, timeouts()).await;

    let mut tasks = Vec::new();
    for i in 0..24u64 {
        let addr = server.addr;
        tasks.push(tokio::spawn(async move {
            match i % 3 {
                0 => (get(addr, "/employee/42").await, (200, "Smith".to_string())),
                1 => (get(addr, "/employee/7").await, (200, "Nakamura".to_string())),
                _ => (get(addr, "/employee/1").await, (404, String::new())),
            }
        }));
    }

    for task in tasks {
        let (got, want) = task.await.unwrap();
        assert_eq!(got, want);
    }
    assert_eq!(server.pool.available(), 4);
}
