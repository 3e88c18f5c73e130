use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;
use unrelated_prometheus_tools::TenantRegistry;
use unrelated_prometheus_tools::config::{SingleTenantSettings, TenantSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// One MCP session on stdin/stdout.
    Stdio,
    /// MCP streamable HTTP at `/mcp`.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Process configuration. Every flag can also be set through its environment variable; a `.env`
/// file in the working directory is loaded first.
///
/// Not `Debug`: it carries credentials.
#[derive(Parser)]
#[command(name = "unrelated-prometheus-mcp", version, about)]
pub struct Args {
    /// Prometheus base URL (single-tenant mode; the tenant is named `default`).
    #[arg(long, env = "PROMETHEUS_URL")]
    pub url: Option<String>,

    #[arg(long, env = "PROMETHEUS_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "PROMETHEUS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "PROMETHEUS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Value for the `X-Scope-OrgID` header (single-tenant mode).
    #[arg(long, env = "ORG_ID")]
    pub org_id: Option<String>,

    /// JSON array of tenants: `[{"name", "url", "username"?, "password"?, "token"?, "org_id"?}]`.
    /// Takes precedence over the single-tenant flags.
    #[arg(long, env = "PROMETHEUS_TENANTS", hide_env_values = true)]
    pub tenants: Option<String>,

    /// Tenant used when a tool call does not name one (default: first tenant).
    #[arg(long, env = "PROMETHEUS_DEFAULT_TENANT")]
    pub default_tenant: Option<String>,

    #[arg(long, env = "PROMETHEUS_MCP_SERVER_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport. Overrides `--bind-host`/`--bind-port`.
    #[arg(long, env = "PROMETHEUS_MCP_BIND")]
    pub bind: Option<SocketAddr>,

    #[arg(long, env = "PROMETHEUS_MCP_BIND_HOST", default_value = "127.0.0.1")]
    pub bind_host: String,

    #[arg(long, env = "PROMETHEUS_MCP_BIND_PORT", default_value_t = 8000)]
    pub bind_port: u16,

    /// Timeout for each outbound Prometheus request.
    #[arg(
        long,
        env = "PROMETHEUS_REQUEST_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    /// Maximum number of tenants queried in parallel by `execute_query_all_tenants`.
    #[arg(long, env = "PROMETHEUS_FANOUT_CONCURRENCY", default_value_t = 4)]
    pub fanout_concurrency: usize,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "PROMETHEUS_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Args {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `host:port` for the HTTP listener; host names are resolved at bind time.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        if let Some(addr) = self.bind {
            return addr.to_string();
        }
        let host = self.bind_host.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.bind_port)
        } else {
            format!("{host}:{}", self.bind_port)
        }
    }

    fn tenant_source(&self) -> TenantSource {
        TenantSource::select(
            self.tenants.clone(),
            self.default_tenant.clone(),
            SingleTenantSettings {
                url: self.url.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                token: self.token.clone(),
                org_id: self.org_id.clone(),
            },
        )
    }

    /// Load and validate the tenant registry.
    pub fn build_registry(&self) -> anyhow::Result<TenantRegistry> {
        let (tenants, default_tenant) = self
            .tenant_source()
            .load()
            .context("load tenant configuration")?;
        TenantRegistry::from_configs(tenants, default_tenant).context("validate tenant configuration")
    }
}
