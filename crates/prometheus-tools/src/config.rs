//! Tenant configuration sources: the `PROMETHEUS_TENANTS` JSON array or single-tenant
//! settings, whichever is set.

use crate::error::{PrometheusToolsError, Result};
use serde::Deserialize;
use serde_json::error::Category;
use std::fmt;

/// Name used for the tenant built from single-tenant settings.
pub const SINGLE_TENANT_NAME: &str = "default";

/// One tenant entry as it appears in the `PROMETHEUS_TENANTS` JSON array.
///
/// Unknown keys are ignored so deployments can carry extra annotations.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TenantConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
}

impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Parse the multi-tenant JSON array.
///
/// # Errors
///
/// Returns [`PrometheusToolsError::Config`] if the input is not valid JSON, is not an array of
/// objects, or an entry lacks `name`/`url`.
pub fn parse_tenants_json(raw: &str) -> Result<Vec<TenantConfig>> {
    serde_json::from_str::<Vec<TenantConfig>>(raw).map_err(|e| match e.classify() {
        Category::Data => PrometheusToolsError::Config(format!(
            "Missing or invalid field in tenant configuration: {e}"
        )),
        Category::Syntax | Category::Eof | Category::Io => {
            PrometheusToolsError::Config(format!("Invalid JSON in PROMETHEUS_TENANTS: {e}"))
        }
    })
}

/// Settings for the backward-compatible single-tenant mode.
#[derive(Clone, Default)]
pub struct SingleTenantSettings {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub org_id: Option<String>,
}

impl SingleTenantSettings {
    /// Build the single tenant entry, named [`SINGLE_TENANT_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`PrometheusToolsError::Config`] if no URL is configured.
    pub fn into_tenant(self) -> Result<TenantConfig> {
        let url = self.url.filter(|u| !u.trim().is_empty()).ok_or_else(|| {
            PrometheusToolsError::Config(
                "Either PROMETHEUS_TENANTS or PROMETHEUS_URL must be set".to_string(),
            )
        })?;
        Ok(TenantConfig {
            name: SINGLE_TENANT_NAME.to_string(),
            url,
            username: self.username,
            password: self.password,
            token: self.token,
            org_id: self.org_id,
        })
    }
}

/// Where the tenant list comes from.
#[derive(Clone)]
pub enum TenantSource {
    /// Raw `PROMETHEUS_TENANTS` JSON plus the optional default-tenant override.
    Json {
        raw: String,
        default_tenant: Option<String>,
    },
    /// Single-tenant variables.
    Single(SingleTenantSettings),
}

impl TenantSource {
    /// Pick multi-tenant JSON when present (non-blank), single-tenant settings otherwise.
    #[must_use]
    pub fn select(
        tenants_json: Option<String>,
        default_tenant: Option<String>,
        single: SingleTenantSettings,
    ) -> Self {
        match tenants_json.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => Self::Json {
                raw,
                default_tenant,
            },
            None => Self::Single(single),
        }
    }

    /// Resolve the tenant entries and the configured default-tenant name.
    ///
    /// Single-tenant mode always defaults to [`SINGLE_TENANT_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`PrometheusToolsError::Config`] for malformed JSON or missing settings.
    pub fn load(self) -> Result<(Vec<TenantConfig>, Option<String>)> {
        match self {
            Self::Json {
                raw,
                default_tenant,
            } => Ok((parse_tenants_json(&raw)?, default_tenant)),
            Self::Single(single) => Ok((
                vec![single.into_tenant()?],
                Some(SINGLE_TENANT_NAME.to_string()),
            )),
        }
    }
}
