//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use markdown_proxy::config::ProxyConfig;
use markdown_proxy::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned upstream response.
#[derive(Clone, Debug)]
pub struct MockRoute {
    pub path: &'static str,
    pub status: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: &'static str,
}

impl MockRoute {
    pub fn ok(path: &'static str, content_type: &'static str, body: &'static str) -> Self {
        Self {
            path,
            status: "200 OK",
            headers: vec![("Content-Type", content_type)],
            body,
        }
    }
}

/// Start a raw-TCP backend answering each path with its canned response.
pub async fn start_mock_backend(routes: Vec<MockRoute>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let text = String::from_utf8_lossy(&request);
                let path = text.split_whitespace().nth(1).unwrap_or("/").to_string();

                let response = match routes.iter().find(|r| r.path == path) {
                    Some(route) => {
                        let mut head = format!("HTTP/1.1 {}\r\n", route.status);
                        for (name, value) in &route.headers {
                            head.push_str(&format!("{name}: {value}\r\n"));
                        }
                        format!(
                            "{head}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            route.body.len(),
                            route.body
                        )
                    }
                    None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string(),
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start the proxy on an ephemeral port. Keep the `Shutdown` alive.
pub async fn start_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
