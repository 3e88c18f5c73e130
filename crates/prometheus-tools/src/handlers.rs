//! Operation handlers: one per exposed tool.
//!
//! Handlers are stateless. They resolve the tenant, route every backend call through the
//! [`RequestExecutor`] and shape the payload. Single-tenant operations propagate errors;
//! [`PrometheusTools::execute_query_all_tenants`] captures them per tenant.

use crate::error::{PrometheusToolsError, Result};
use crate::executor::{RequestExecutor, endpoint_url};
use crate::redact::redact_url_str;
use crate::tenant::{TenantRegistry, TenantSummary};
use futures::StreamExt as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_FANOUT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantList {
    pub tenants: Vec<TenantSummary>,
    pub default_tenant: String,
    pub total_count: usize,
}

/// Instant/range query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: Value,
    pub tenant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricList {
    pub metrics: Vec<String>,
    pub tenant: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricMetadata {
    pub metadata: Value,
    pub metric: String,
    pub tenant: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Targets {
    #[serde(rename = "activeTargets")]
    pub active_targets: Vec<Value>,
    #[serde(rename = "droppedTargets")]
    pub dropped_targets: Vec<Value>,
    pub tenant: String,
    pub active_count: usize,
    pub dropped_count: usize,
}

/// Fan-out result. `results` and `errors` are keyed by tenant name in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllTenantsQueryResult {
    pub query: String,
    pub time: Option<String>,
    pub results: Map<String, Value>,
    pub errors: Map<String, Value>,
    pub successful_tenants: usize,
    pub failed_tenants: usize,
    pub total_tenants: usize,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct TargetsData {
    #[serde(rename = "activeTargets")]
    active_targets: Vec<Value>,
    #[serde(rename = "droppedTargets", default)]
    dropped_targets: Vec<Value>,
}

/// The tool handlers, bound to one immutable tenant registry.
#[derive(Debug, Clone)]
pub struct PrometheusTools {
    registry: Arc<TenantRegistry>,
    executor: RequestExecutor,
    fanout_concurrency: usize,
}

impl PrometheusTools {
    #[must_use]
    pub fn new(registry: Arc<TenantRegistry>, executor: RequestExecutor) -> Self {
        Self {
            registry,
            executor,
            fanout_concurrency: DEFAULT_FANOUT_CONCURRENCY,
        }
    }

    /// Maximum number of tenants queried in parallel by the fan-out (at least 1).
    #[must_use]
    pub fn with_fanout_concurrency(mut self, concurrency: usize) -> Self {
        self.fanout_concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    #[must_use]
    pub fn list_tenants(&self) -> TenantList {
        info!("listing configured tenants");
        let tenants = self.registry.list_all();
        let out = TenantList {
            total_count: tenants.len(),
            tenants,
            default_tenant: self.registry.default_tenant().to_string(),
        };
        info!(
            tenant_count = out.total_count,
            default_tenant = %out.default_tenant,
            "tenants listed"
        );
        out
    }

    /// Instant query (`/api/v1/query`).
    ///
    /// # Errors
    ///
    /// Unknown tenant, or any executor failure.
    pub async fn execute_query(
        &self,
        query: &str,
        time: Option<&str>,
        tenant: Option<&str>,
    ) -> Result<QueryResult> {
        let record = self.registry.resolve(tenant)?;
        info!(query = %query, time = ?time, tenant = %record.name(), "executing instant query");

        let mut params = vec![("query", query)];
        if let Some(time) = time {
            params.push(("time", time));
        }
        let data = self.executor.execute("query", &params, record).await?;
        let out = self.shape_query("query", record.name(), data)?;

        info!(
            query = %query,
            result_type = %out.result_type,
            result_count = result_count(&out.result),
            tenant = %out.tenant,
            "instant query completed"
        );
        Ok(out)
    }

    /// Range query (`/api/v1/query_range`). Time and step syntax are validated by the backend.
    ///
    /// # Errors
    ///
    /// Unknown tenant, or any executor failure.
    pub async fn execute_range_query(
        &self,
        query: &str,
        start: &str,
        end: &str,
        step: &str,
        tenant: Option<&str>,
    ) -> Result<QueryResult> {
        let record = self.registry.resolve(tenant)?;
        info!(
            query = %query,
            start = %start,
            end = %end,
            step = %step,
            tenant = %record.name(),
            "executing range query"
        );

        let params = [("query", query), ("start", start), ("end", end), ("step", step)];
        let data = self.executor.execute("query_range", &params, record).await?;
        let out = self.shape_query("query_range", record.name(), data)?;

        info!(
            query = %query,
            result_type = %out.result_type,
            result_count = result_count(&out.result),
            tenant = %out.tenant,
            "range query completed"
        );
        Ok(out)
    }

    /// All metric names (`/api/v1/label/__name__/values`).
    ///
    /// # Errors
    ///
    /// Unknown tenant, or any executor failure.
    pub async fn list_metrics(&self, tenant: Option<&str>) -> Result<MetricList> {
        const ENDPOINT: &str = "label/__name__/values";

        let record = self.registry.resolve(tenant)?;
        info!(tenant = %record.name(), "listing available metrics");

        let data = self.executor.execute(ENDPOINT, &[], record).await?;
        let metrics: Vec<String> = self.decode_payload(ENDPOINT, record.name(), data)?;

        info!(metric_count = metrics.len(), tenant = %record.name(), "metrics list retrieved");
        Ok(MetricList {
            count: metrics.len(),
            metrics,
            tenant: record.name().to_string(),
        })
    }

    /// Metadata for one metric (`/api/v1/metadata?metric=<name>`).
    ///
    /// # Errors
    ///
    /// Unknown tenant, or any executor failure.
    pub async fn get_metric_metadata(
        &self,
        metric: &str,
        tenant: Option<&str>,
    ) -> Result<MetricMetadata> {
        let record = self.registry.resolve(tenant)?;
        info!(metric = %metric, tenant = %record.name(), "retrieving metric metadata");

        let data = self
            .executor
            .execute("metadata", &[("metric", metric)], record)
            .await?;

        // Prometheus returns `{<metric>: [...]}`; some proxies wrap it as `{"metadata": ...}`.
        // A metric literally named `metadata` looks the same and is left alone.
        let metadata = match data {
            Value::Object(mut obj)
                if metric != "metadata" && obj.len() == 1 && obj.contains_key("metadata") =>
            {
                obj.remove("metadata").unwrap_or(Value::Null)
            }
            other => other,
        };
        let count = match &metadata {
            Value::Object(obj) => obj.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        };

        info!(
            metric = %metric,
            metadata_count = count,
            tenant = %record.name(),
            "metric metadata retrieved"
        );
        Ok(MetricMetadata {
            metadata,
            metric: metric.to_string(),
            tenant: record.name().to_string(),
            count,
        })
    }

    /// Scrape targets (`/api/v1/targets`).
    ///
    /// # Errors
    ///
    /// Unknown tenant, or any executor failure.
    pub async fn get_targets(&self, tenant: Option<&str>) -> Result<Targets> {
        let record = self.registry.resolve(tenant)?;
        info!(tenant = %record.name(), "retrieving scrape targets");

        let data = self.executor.execute("targets", &[], record).await?;
        let targets: TargetsData = self.decode_payload("targets", record.name(), data)?;

        info!(
            active_targets = targets.active_targets.len(),
            dropped_targets = targets.dropped_targets.len(),
            tenant = %record.name(),
            "scrape targets retrieved"
        );
        Ok(Targets {
            active_count: targets.active_targets.len(),
            dropped_count: targets.dropped_targets.len(),
            active_targets: targets.active_targets,
            dropped_targets: targets.dropped_targets,
            tenant: record.name().to_string(),
        })
    }

    /// Run one instant query against every tenant.
    ///
    /// Each tenant is resolved and queried independently, so one failure never stops the rest.
    /// Sub-calls run with bounded parallelism; the result is assembled only after all of them
    /// finished, in registry order.
    ///
    /// `time` is echoed exactly as given; an empty string is not forwarded to the backends.
    pub async fn execute_query_all_tenants(
        &self,
        query: &str,
        time: Option<&str>,
    ) -> AllTenantsQueryResult {
        let total_tenants = self.registry.len();
        info!(
            query = %query,
            time = ?time,
            tenant_count = total_tenants,
            "executing query across all tenants"
        );

        let eval_time = time.filter(|t| !t.is_empty());
        let calls: Vec<_> = self
            .registry
            .names()
            .into_iter()
            .map(|name| async move {
                let outcome = self.execute_query(query, eval_time, Some(&name)).await;
                (name, outcome)
            })
            .collect();
        let outcomes: Vec<(String, Result<QueryResult>)> = futures::stream::iter(calls)
            .buffered(self.fanout_concurrency)
            .collect()
            .await;

        let mut results = Map::new();
        let mut errors = Map::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(r) => {
                    results.insert(
                        name,
                        json!({
                            "resultType": r.result_type,
                            "result": r.result,
                            "success": true,
                        }),
                    );
                }
                Err(e) => {
                    warn!(tenant = %name, error = %e, "query failed for tenant");
                    errors.insert(
                        name,
                        json!({
                            "error": e.to_string(),
                            "success": false,
                        }),
                    );
                }
            }
        }

        let out = AllTenantsQueryResult {
            query: query.to_string(),
            time: time.map(str::to_string),
            successful_tenants: results.len(),
            failed_tenants: errors.len(),
            total_tenants,
            results,
            errors,
        };
        info!(
            query = %query,
            successful_tenants = out.successful_tenants,
            failed_tenants = out.failed_tenants,
            total_tenants = out.total_tenants,
            "multi-tenant query completed"
        );
        out
    }

    fn shape_query(&self, endpoint: &str, tenant: &str, data: Value) -> Result<QueryResult> {
        let data: QueryData = self.decode_payload(endpoint, tenant, data)?;
        Ok(QueryResult {
            result_type: data.result_type,
            result: data.result,
            tenant: tenant.to_string(),
        })
    }

    fn decode_payload<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        tenant: &str,
        data: Value,
    ) -> Result<T> {
        serde_json::from_value(data).map_err(|e| {
            let url = self
                .registry
                .get(tenant)
                .map(|t| redact_url_str(&endpoint_url(t, endpoint)))
                .unwrap_or_default();
            PrometheusToolsError::Decode {
                endpoint: endpoint.to_string(),
                url,
                tenant: tenant.to_string(),
                message: format!("unexpected payload shape: {e}"),
            }
        })
    }
}

fn result_count(result: &Value) -> usize {
    result.as_array().map_or(1, Vec::len)
}
