use crate::server::PrometheusMcpServer;
use rmcp::ServiceExt as _;

/// Serve one MCP session over stdin/stdout until the client disconnects.
pub async fn serve(server: PrometheusMcpServer) -> anyhow::Result<()> {
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| anyhow::anyhow!("failed to start MCP stdio session: {e}"))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP stdio session failed: {e}"))?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}
