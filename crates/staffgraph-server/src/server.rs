//! MCP server runners: stdio and streamable HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use staffgraph_graph::GraphClient;

use crate::StaffGraphMcp;

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    /// rmcp settings for this server. Sessions and SSE streams end when
    /// `shutdown` is cancelled.
    fn service_config(&self, shutdown: &CancellationToken) -> StreamableHttpServerConfig {
        StreamableHttpServerConfig {
            sse_keep_alive: self.sse_keep_alive,
            sse_retry: self.sse_retry,
            stateful_mode: self.stateful_mode,
            cancellation_token: shutdown.child_token(),
        }
    }
}

/// Serve tools over stdin/stdout until the client disconnects.
pub async fn serve_stdio(graph: GraphClient) -> anyhow::Result<()> {
    let service = StaffGraphMcp::new(graph);
    let (stdin, stdout) = stdio();
    tracing::info!("Serving MCP over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "MCP stdio session ended");
    Ok(())
}

/// Serve tools over streamable HTTP at `/mcp`, with `GET /health`.
///
/// Returns after Ctrl-C once in-flight requests have completed. Open SSE
/// streams are closed on shutdown.
pub async fn serve_streamable_http(
    graph: GraphClient,
    config: McpHttpServerConfig,
) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let listener = TcpListener::bind(config.addr).await?;
    serve_streamable_http_on(listener, graph, config, shutdown).await
}

/// Serve streamable HTTP on an already bound listener until `shutdown` is
/// cancelled.
pub async fn serve_streamable_http_on(
    listener: TcpListener,
    graph: GraphClient,
    config: McpHttpServerConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let service: StreamableHttpService<StaffGraphMcp, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(StaffGraphMcp::new(graph.clone())),
            Arc::new(LocalSessionManager::default()),
            config.service_config(&shutdown),
        );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service);
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Serving MCP over streamable HTTP");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("HTTP server drained");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use staffgraph_graph::GraphConfig;

    use super::*;

    #[test]
    fn http_config_defaults() {
        let config = McpHttpServerConfig::new("127.0.0.1:8000".parse().unwrap());
        assert!(config.stateful_mode);
        assert_eq!(config.sse_keep_alive, Some(Duration::from_secs(15)));

        let config = config.with_stateful_mode(false);
        assert!(!config.stateful_mode);
    }

    #[test]
    fn service_config_follows_shutdown_token() {
        let shutdown = CancellationToken::new();
        let config = McpHttpServerConfig::new("127.0.0.1:8000".parse().unwrap())
            .with_stateful_mode(false)
            .service_config(&shutdown);
        assert!(!config.stateful_mode);
        assert!(!config.cancellation_token.is_cancelled());

        shutdown.cancel();
        assert!(config.cancellation_token.is_cancelled());
    }

    /// Send one HTTP/1.1 request and read up to the end of the response head.
    /// The connection is returned so a streaming body stays open.
    async fn request(addr: SocketAddr, raw: String) -> (String, TcpStream) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before response head");
            head.extend_from_slice(&buf[..n]);
        }
        (String::from_utf8_lossy(&head).into_owned(), stream)
    }

    fn post(addr: SocketAddr, session: Option<&str>, body: &str) -> String {
        let session = session
            .map(|id| format!("Mcp-Session-Id: {id}\r\n"))
            .unwrap_or_default();
        format!(
            "POST /mcp HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
             Accept: application/json, text/event-stream\r\n{session}\
             Content-Length: {}\r\n\r\n{body}",
            body.len()
        )
    }

    fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    #[tokio::test]
    async fn shutdown_closes_open_sse_streams() {
        // The pool connects lazily; no tool call reaches the database here.
        let graph = GraphClient::connect(&GraphConfig {
            uri: "bolt://127.0.0.1:1".to_string(),
            ..GraphConfig::default()
        })
        .await
        .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(serve_streamable_http_on(
            listener,
            graph,
            McpHttpServerConfig::new(addr),
            shutdown.clone(),
        ));

        let initialize = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"staffgraph-test","version":"0.1.0"}}}"#;
        let (head, _init) = request(addr, post(addr, None, initialize)).await;
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        let session = header(&head, "mcp-session-id")
            .expect("session id header")
            .to_string();

        let initialized = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        let (head, _notify) = request(addr, post(addr, Some(&session), initialized)).await;
        assert!(head.starts_with("HTTP/1.1 202"), "{head}");

        let get_stream = format!(
            "GET /mcp HTTP/1.1\r\nHost: {addr}\r\nAccept: text/event-stream\r\n\
             Mcp-Session-Id: {session}\r\n\r\n"
        );
        let (head, _sse) = request(addr, get_stream).await;
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");

        shutdown.cancel();
        let finished = tokio::time::timeout(Duration::from_secs(10), server).await;
        assert!(finished.is_ok(), "server still running with an open SSE stream");
        finished.unwrap().unwrap().unwrap();
    }
}
