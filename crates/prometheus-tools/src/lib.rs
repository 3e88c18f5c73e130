//! Multi-tenant Prometheus query tooling.
//!
//! This crate is intended to be used by:
//! - `unrelated-prometheus-mcp` (the MCP server binary)
//!
//! It maps logical tenant names to Prometheus deployments, builds per-tenant authentication,
//! executes read-only `/api/v1` requests and shapes the results for the MCP tool surface.
//! It contains **no** transport framing and **no** process/environment handling.

pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod redact;
pub mod tenant;
pub mod tools;

pub use error::{PrometheusToolsError, Result};
pub use executor::RequestExecutor;
pub use handlers::PrometheusTools;
pub use tenant::{TenantRecord, TenantRegistry, TenantSummary};
