//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use lookupd::config::{ListenerConfig, TimeoutConfig};
use lookupd::handler::LookupHandler;
use lookupd::lifecycle::Shutdown;
use lookupd::net::Listener;
use lookupd::store::{MemoryBackend, Pool, Row};

/// A running server over a seeded in-memory backend, bound to an ephemeral
/// loopback port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<MemoryBackend>,
    pub pool: Arc<Pool>,
    pub shutdown: Shutdown,
}

/// Rows every scenario can rely on.
pub fn seed_rows() -> Vec<Row> {
    vec![
        Row {
            id: 42,
            last_name: "Smith".into(),
        },
        Row {
            id: 7,
            last_name: "Nakamura".into(),
        },
    ]
}

pub async fn start_server(
    backend: MemoryBackend,
    pool_size: usize,
    timeouts: TimeoutConfig,
) -> TestServer {
    let backend = Arc::new(backend);
    let pool = Arc::new(Pool::new(
        Arc::clone(&backend) as Arc<dyn lookupd::store::StoreBackend>,
        pool_size,
    ));
    let handler = Arc::new(LookupHandler::new(
        Arc::clone(&pool),
        "/employee/",
        Duration::from_secs(1),
    ));

    let listener = Listener::bind(&ListenerConfig {
        bind_address: "127.0.0.1:0".into(),
        max_connections: 64,
    })
    .await
    .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(listener.serve(
        handler,
        timeouts,
        shutdown.sessions().clone(),
        shutdown_rx,
    ));

    TestServer {
        addr,
        backend,
        pool,
        shutdown,
    }
}

/// Write `raw` on a fresh connection and collect everything until the server
/// closes it.
pub async fn send_raw(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    reply
}

/// Issue a plain GET and return (status, body).
#[allow(dead_code)]
pub async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let raw = format!("GET {path} HTTP/1.1\r\nHost: test\r\n\r\n");
    parse_response(&send_raw(addr, raw.as_bytes()).await)
}

#[allow(dead_code)]
pub fn parse_response(reply: &[u8]) -> (u16, String) {
    let text = String::from_utf8(reply.to_vec()).unwrap();
    let status = text
        .split_whitespace()
        .nth(1)
        .expect("no status code in reply")
        .parse()
        .unwrap();
    let body = text.split("\r\n\r\n").nth(1).unwrap_or("").to_string();
    (status, body)
}
