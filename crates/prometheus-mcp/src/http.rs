use crate::server::PrometheusMcpServer;
use anyhow::Context as _;
use axum::Router;
use axum::routing::get;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// `/mcp` is rmcp's streamable HTTP endpoint (one session per client); `/health` is a liveness check.
///
/// Cancelling `ct` closes every open session stream.
pub fn router(server: PrometheusMcpServer, ct: CancellationToken) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );
    Router::new()
        .nest_service("/mcp", mcp)
        .route("/health", get(health))
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve(
    server: PrometheusMcpServer,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let ct = CancellationToken::new();
    let app = router(server, ct.child_token());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening (streamable http)");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            // Open SSE streams would otherwise hold graceful shutdown forever.
            ct.cancel();
        })
        .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}
