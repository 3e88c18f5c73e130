//! MCP tool catalog: tool definitions, argument decoding and dispatch to the handlers.

use crate::error::{PrometheusToolsError, Result};
use crate::handlers::PrometheusTools;
use crate::tenant::TenantRegistry;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

pub const LIST_TENANTS: &str = "list_tenants";
pub const EXECUTE_QUERY: &str = "execute_query";
pub const EXECUTE_RANGE_QUERY: &str = "execute_range_query";
pub const LIST_METRICS: &str = "list_metrics";
pub const GET_METRIC_METADATA: &str = "get_metric_metadata";
pub const GET_TARGETS: &str = "get_targets";
pub const EXECUTE_QUERY_ALL_TENANTS: &str = "execute_query_all_tenants";

pub const TOOL_NAMES: [&str; 7] = [
    LIST_TENANTS,
    EXECUTE_QUERY,
    EXECUTE_RANGE_QUERY,
    LIST_METRICS,
    GET_METRIC_METADATA,
    GET_TARGETS,
    EXECUTE_QUERY_ALL_TENANTS,
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TenantArgs {
    #[serde(default)]
    tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QueryArgs {
    query: String,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RangeQueryArgs {
    query: String,
    start: String,
    end: String,
    step: String,
    #[serde(default)]
    tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataArgs {
    metric: String,
    #[serde(default)]
    tenant: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AllTenantsArgs {
    query: String,
    #[serde(default)]
    time: Option<String>,
}

/// List the MCP `Tool`s exposed for this registry.
#[must_use]
pub fn list_tools(registry: &TenantRegistry) -> Vec<Tool> {
    let tenant = tenant_property(registry);
    let time = json!({
        "type": "string",
        "description": "Evaluation timestamp as RFC3339 or Unix timestamp (default: current server time)"
    });
    let query = json!({"type": "string", "description": "PromQL query string"});

    vec![
        tool(
            LIST_TENANTS,
            "List all configured Prometheus tenants",
            json!({}),
            &[],
        ),
        tool(
            EXECUTE_QUERY,
            "Execute a PromQL instant query against Prometheus",
            json!({"query": query, "time": time, "tenant": tenant}),
            &["query"],
        ),
        tool(
            EXECUTE_RANGE_QUERY,
            "Execute a PromQL range query with start time, end time, and step interval",
            json!({
                "query": query,
                "start": {"type": "string", "description": "Start time as RFC3339 or Unix timestamp"},
                "end": {"type": "string", "description": "End time as RFC3339 or Unix timestamp"},
                "step": {"type": "string", "description": "Query resolution step width (e.g. '15s', '1m', '1h')"},
                "tenant": tenant,
            }),
            &["query", "start", "end", "step"],
        ),
        tool(
            LIST_METRICS,
            "List all available metrics in Prometheus",
            json!({"tenant": tenant}),
            &[],
        ),
        tool(
            GET_METRIC_METADATA,
            "Get metadata for a specific metric",
            json!({
                "metric": {"type": "string", "description": "Name of the metric"},
                "tenant": tenant,
            }),
            &["metric"],
        ),
        tool(
            GET_TARGETS,
            "Get information about all scrape targets",
            json!({"tenant": tenant}),
            &[],
        ),
        tool(
            EXECUTE_QUERY_ALL_TENANTS,
            "Execute a query across all configured tenants",
            json!({"query": query, "time": time}),
            &["query"],
        ),
    ]
}

/// Execute a tool call.
///
/// Handler failures (unknown tenant, backend/transport errors) are returned as a tool result
/// with `isError: true` so the caller sees the message.
///
/// # Errors
///
/// Returns [`PrometheusToolsError::UnknownTool`] for unknown names and
/// [`PrometheusToolsError::InvalidArguments`] if the arguments do not match the tool's schema.
pub async fn call_tool(
    tools: &PrometheusTools,
    name: &str,
    arguments: Value,
) -> Result<CallToolResult> {
    let outcome = match name {
        LIST_TENANTS => {
            let NoArgs {} = parse_args(name, arguments)?;
            Ok(structured(&tools.list_tenants()))
        }
        EXECUTE_QUERY => {
            let args: QueryArgs = parse_args(name, arguments)?;
            tools
                .execute_query(&args.query, given(args.time.as_ref()), given(args.tenant.as_ref()))
                .await
                .map(|r| structured(&r))
        }
        EXECUTE_RANGE_QUERY => {
            let args: RangeQueryArgs = parse_args(name, arguments)?;
            tools
                .execute_range_query(
                    &args.query,
                    &args.start,
                    &args.end,
                    &args.step,
                    given(args.tenant.as_ref()),
                )
                .await
                .map(|r| structured(&r))
        }
        LIST_METRICS => {
            let args: TenantArgs = parse_args(name, arguments)?;
            tools
                .list_metrics(given(args.tenant.as_ref()))
                .await
                .map(|r| structured(&r))
        }
        GET_METRIC_METADATA => {
            let args: MetadataArgs = parse_args(name, arguments)?;
            tools
                .get_metric_metadata(&args.metric, given(args.tenant.as_ref()))
                .await
                .map(|r| structured(&r))
        }
        GET_TARGETS => {
            let args: TenantArgs = parse_args(name, arguments)?;
            tools
                .get_targets(given(args.tenant.as_ref()))
                .await
                .map(|r| structured(&r))
        }
        EXECUTE_QUERY_ALL_TENANTS => {
            let args: AllTenantsArgs = parse_args(name, arguments)?;
            Ok(structured(
                &tools
                    .execute_query_all_tenants(&args.query, args.time.as_deref())
                    .await,
            ))
        }
        _ => return Err(PrometheusToolsError::UnknownTool(name.to_string())),
    };

    Ok(match outcome {
        Ok(body) => success_result(body),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    })
}

fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> Tool {
    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    let schema_obj = schema.as_object().cloned().unwrap_or_else(JsonObject::new);

    let mut tool = Tool::new(name.to_string(), description.to_string(), Arc::new(schema_obj));
    tool.annotations = Some(ToolAnnotations {
        title: None,
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    });
    tool
}

fn tenant_property(registry: &TenantRegistry) -> Value {
    json!({
        "type": "string",
        "description": format!(
            "Tenant name (default: '{}'). Available tenants: {}",
            registry.default_tenant(),
            registry.names().join(", ")
        ),
    })
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(JsonObject::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| PrometheusToolsError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Empty strings count as "not given" so clients can send `""` for optional fields.
fn given(v: Option<&String>) -> Option<&str> {
    v.map(String::as_str).filter(|s| !s.is_empty())
}

fn structured<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn success_result(body: Value) -> CallToolResult {
    // Return both `structured_content` and `Content::text(...)` for interoperability:
    // some MCP clients only render `content` and ignore `structured_content`.
    let text = serde_json::to_string(&body).unwrap_or_else(|_| body.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(body),
        is_error: Some(false),
        meta: None,
    }
}
