//! MCP server exposing read-only Prometheus query tools across multiple tenants.

mod config;
mod http;
mod logging;
mod server;
mod stdio;

use clap::Parser as _;
use config::{Args, Transport};
use server::PrometheusMcpServer;
use std::process::ExitCode;
use std::sync::Arc;
use unrelated_prometheus_tools::auth::resolve_auth;
use unrelated_prometheus_tools::redact::redact_url_str;
use unrelated_prometheus_tools::{PrometheusTools, RequestExecutor, TenantRegistry};

#[tokio::main]
async fn main() -> ExitCode {
    // `.env` must be loaded before clap reads the environment.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_level, args.log_format) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let registry = args.build_registry()?;
    log_tenants(&registry);

    let executor = RequestExecutor::new(args.request_timeout())?;
    let tools = PrometheusTools::new(Arc::new(registry), executor)
        .with_fanout_concurrency(args.fanout_concurrency);
    let server = PrometheusMcpServer::new(tools);

    match args.transport {
        Transport::Stdio => {
            tracing::info!("serving MCP over stdio");
            stdio::serve(server).await
        }
        Transport::Http => {
            http::serve(server, &args.bind_addr(), async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    // Without a signal handler the server runs until killed.
                    tracing::error!(error = %e, "failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
                tracing::info!("shutdown requested");
            })
            .await
        }
    }
}

fn log_tenants(registry: &TenantRegistry) {
    tracing::info!(
        tenants = registry.len(),
        default_tenant = %registry.default_tenant(),
        "tenant registry loaded"
    );
    for t in registry.tenants() {
        tracing::info!(
            tenant = %t.name(),
            url = %redact_url_str(t.base_url()),
            auth = resolve_auth(t).method(),
            org_id = t.org_id().unwrap_or("-"),
            "tenant"
        );
    }
}
