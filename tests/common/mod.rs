//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use notebook_gateway::config::GatewayConfig;
use notebook_gateway::server::{default_app, GatewayServer};

/// Start a mock upstream that echoes the request target (path + query)
/// back as the response body. Returns the bound address.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();
                        // Request line: "GET /some/path?query HTTP/1.1"
                        let target = head.split_whitespace().nth(1).unwrap_or("?").to_string();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            target.len(),
                            target
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock upstream that streams chunks forever, so a response is
/// still in flight whenever the caller hangs up. Returns the bound
/// address and a live-connection counter: incremented on accept,
/// decremented when the upstream side observes the connection close.
#[allow(dead_code)]
pub async fn start_streaming_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let open_connections = Arc::new(AtomicUsize::new(0));
    let counter = open_connections.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let mut buf = vec![0u8; 8192];
                        let _ = socket.read(&mut buf).await;
                        let head = "HTTP/1.1 200 OK\r\n\
                                    Content-Type: application/octet-stream\r\n\
                                    Transfer-Encoding: chunked\r\n\r\n";
                        let _ = socket.write_all(head.as_bytes()).await;
                        loop {
                            // One 16-byte chunk per tick. Writes start
                            // failing once the peer closes.
                            let chunk = b"10\r\nAAAAAAAAAAAAAAAA\r\n";
                            if socket.write_all(chunk).await.is_err() {
                                break;
                            }
                            if socket.flush().await.is_err() {
                                break;
                            }
                            tokio::time::sleep(Duration::from_millis(25)).await;
                        }
                        counter.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, open_connections)
}

/// Build the gateway from `config`, serve it on an ephemeral port, and
/// return the bound address.
pub async fn start_gateway(config: GatewayConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(config, default_app()).expect("gateway should assemble");

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}

/// Plain reqwest client without connection pooling, so each test request
/// hits the gateway fresh.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
