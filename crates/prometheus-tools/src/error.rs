//! Error types for `unrelated-prometheus-tools`.

use thiserror::Error;

/// Main error type for Prometheus tooling.
///
/// `Config` is only produced while building the tenant registry (process start). Every other
/// variant is a recoverable, per-request condition.
#[derive(Error, Debug)]
pub enum PrometheusToolsError {
    /// Configuration errors (empty tenant list, malformed tenant JSON, missing fields,
    /// unknown default tenant).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested tenant is not registered.
    #[error("Tenant '{requested}' not found. Available tenants: {available:?}")]
    TenantNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// Connection/TLS/timeout failures and non-2xx HTTP statuses.
    #[error("HTTP request to Prometheus tenant '{tenant}' failed ({endpoint} at {url}): {message}")]
    Transport {
        endpoint: String,
        url: String,
        tenant: String,
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("Invalid JSON response from Prometheus tenant '{tenant}' ({endpoint} at {url}): {message}")]
    Decode {
        endpoint: String,
        url: String,
        tenant: String,
        message: String,
    },

    /// The backend answered with `status != "success"`.
    #[error("Prometheus API error for tenant '{tenant}' ({endpoint}): {message}")]
    Backend {
        endpoint: String,
        tenant: String,
        message: String,
    },

    /// Tool-call arguments failed to decode.
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// No tool with this name is exposed.
    #[error("Tool not found: {0}")]
    UnknownTool(String),
}

impl PrometheusToolsError {
    /// Tenant name the error is attributed to, if any.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        match self {
            Self::TenantNotFound { requested, .. } => Some(requested),
            Self::Transport { tenant, .. }
            | Self::Decode { tenant, .. }
            | Self::Backend { tenant, .. } => Some(tenant),
            Self::Config(_) | Self::InvalidArguments { .. } | Self::UnknownTool(_) => None,
        }
    }
}

/// Result type alias for Prometheus tooling operations.
pub type Result<T> = std::result::Result<T, PrometheusToolsError>;
