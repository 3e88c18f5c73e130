//! rmcp server handler exposing the Prometheus tool catalog.
//!
//! Protocol handling (initialize handshake, version negotiation, notifications, framing) is
//! rmcp's; this type only lists the tools and dispatches calls to them.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;
use unrelated_prometheus_tools::tools::{call_tool, list_tools};
use unrelated_prometheus_tools::{PrometheusTools, PrometheusToolsError};

pub const SERVER_NAME: &str = "prometheus-mcp";

#[derive(Clone)]
pub struct PrometheusMcpServer {
    tools: PrometheusTools,
    tool_list: Arc<Vec<Tool>>,
}

impl PrometheusMcpServer {
    #[must_use]
    pub fn new(tools: PrometheusTools) -> Self {
        let tool_list = Arc::new(list_tools(tools.registry()));
        Self { tools, tool_list }
    }
}

impl ServerHandler for PrometheusMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(format!(
                "Read-only Prometheus query tools. Tenants: {} (default: {}).",
                self.tools.registry().names().join(", "),
                self.tools.registry().default_tenant()
            )),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_list.as_ref().clone(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "tool call");
        let arguments = request.arguments.map_or(Value::Null, Value::Object);
        call_tool(&self.tools, &request.name, arguments)
            .await
            .map_err(to_mcp_error)
    }
}

fn to_mcp_error(e: PrometheusToolsError) -> McpError {
    match e {
        PrometheusToolsError::UnknownTool(_) | PrometheusToolsError::InvalidArguments { .. } => {
            McpError::invalid_params(e.to_string(), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}
