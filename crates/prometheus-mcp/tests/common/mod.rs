#![allow(dead_code)]

use anyhow::Context as _;
use rmcp::model::{CallToolRequestParams, CallToolResult};
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt as _};
use serde_json::Value;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub use unrelated_test_support::{
    KillOnDrop, MockPrometheus, MockResponse, pick_unused_port, wait_http_ok,
};

pub const BIN: &str = env!("CARGO_BIN_EXE_unrelated-prometheus-mcp");

/// The environment is cleared and `cwd` should be an empty temp dir, so no ambient
/// configuration or `.env` file reaches the server.
fn base_command(cwd: &std::path::Path, envs: &[(&str, String)]) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env_clear()
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd
}

pub fn spawn_http(
    cwd: &std::path::Path,
    port: u16,
    envs: &[(&str, String)],
) -> anyhow::Result<Child> {
    base_command(cwd, envs)
        .env("PROMETHEUS_MCP_SERVER_TRANSPORT", "http")
        .env("PROMETHEUS_MCP_BIND_HOST", "127.0.0.1")
        .env("PROMETHEUS_MCP_BIND_PORT", port.to_string())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn http server")
}

/// Run the server to completion with stdin closed and return its exit status and stderr.
pub async fn run_to_exit(
    cwd: &std::path::Path,
    envs: &[(&str, String)],
) -> anyhow::Result<(std::process::ExitStatus, String)> {
    let mut cmd = tokio::process::Command::from(base_command(cwd, envs));
    cmd.kill_on_drop(true);
    let out = tokio::time::timeout(Duration::from_secs(10), cmd.output())
        .await
        .context("server did not exit")??;
    Ok((out.status, String::from_utf8_lossy(&out.stderr).into_owned()))
}

/// An rmcp client session with the server running on the stdio transport.
pub struct StdioSession {
    client: RunningService<RoleClient, ()>,
    _child: tokio::process::Child,
}

impl StdioSession {
    pub async fn spawn(cwd: &std::path::Path, envs: &[(&str, String)]) -> anyhow::Result<Self> {
        let mut cmd = tokio::process::Command::from(base_command(cwd, envs));
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let mut child = cmd.spawn().context("spawn stdio server")?;
        let stdin = child.stdin.take().context("child stdin")?;
        let stdout = child.stdout.take().context("child stdout")?;

        let client = tokio::time::timeout(Duration::from_secs(10), ().serve((stdout, stdin)))
            .await
            .context("timed out during initialize")?
            .context("initialize")?;
        Ok(Self {
            client,
            _child: child,
        })
    }

    pub fn client(&self) -> &RunningService<RoleClient, ()> {
        &self.client
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> anyhow::Result<CallToolResult> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_string().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };
        tokio::time::timeout(Duration::from_secs(10), self.client.call_tool(params))
            .await
            .context("timed out waiting for tools/call")?
            .with_context(|| format!("tools/call {name}"))
    }
}

/// The `structuredContent` of a successful or failed tool result.
pub fn structured(result: &CallToolResult) -> anyhow::Result<&Value> {
    result
        .structured_content
        .as_ref()
        .context("tool result has no structuredContent")
}
