mod common;
mod common_mcp;

use common::{KillOnDrop, MockPrometheus, MockResponse, pick_unused_port, spawn_http, wait_http_ok};
use common_mcp::McpStreamableHttpSession;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn http_transport_serves_tool_calls() -> anyhow::Result<()> {
    let prom = MockPrometheus::start(|_| {
        MockResponse::success(json!({
            "activeTargets": [{"health": "up"}, {"health": "down"}],
            "droppedTargets": []
        }))
    })
    .await?;

    let dir = tempfile::tempdir()?;
    let port = pick_unused_port()?;
    let child = spawn_http(
        dir.path(),
        port,
        &[("PROMETHEUS_URL", prom.base_url().to_string())],
    )?;
    let _child = KillOnDrop(child);

    let base = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base}/health"), Duration::from_secs(10)).await?;

    let session = McpStreamableHttpSession::connect(&base).await?;
    // The client's older protocol version is accepted as-is.
    assert_eq!(session.protocol_version, "2024-11-05");

    let list = session
        .request(1, "tools/list", json!({}), Duration::from_secs(10))
        .await?;
    assert_eq!(list["result"]["tools"].as_array().map(Vec::len), Some(7));

    let resp = session
        .request(
            2,
            "tools/call",
            json!({"name": "get_targets", "arguments": {}}),
            Duration::from_secs(10),
        )
        .await?;
    let body = &resp["result"]["structuredContent"];
    assert_eq!(body["active_count"], 2);
    assert_eq!(body["dropped_count"], 0);
    assert_eq!(body["tenant"], "default");
    assert_eq!(prom.requests()[0].path, "/api/v1/targets");

    let unknown = session
        .request(
            3,
            "tools/call",
            json!({"name": "nope", "arguments": {}}),
            Duration::from_secs(10),
        )
        .await?;
    assert_eq!(unknown["error"]["code"], -32602);

    Ok(())
}
