//! Tenant records and the process-lifetime tenant registry.

use crate::config::TenantConfig;
use crate::error::{PrometheusToolsError, Result};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// A logical tenant: one Prometheus deployment plus how to authenticate against it.
///
/// Optional fields are normalized so that an empty string means "not set".
#[derive(Clone, PartialEq, Eq)]
pub struct TenantRecord {
    name: String,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
    org_id: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// Move `user:pass@` out of a base URL. Requests must never carry credentials in the URL:
/// the HTTP client would turn them into a second `Authorization` header.
///
/// Unparseable input is returned unchanged; validation reports it later.
fn split_userinfo(raw: String) -> (String, Option<(String, String)>) {
    let Ok(mut url) = Url::parse(&raw) else {
        return (raw, None);
    };
    if url.username().is_empty() && url.password().is_none() {
        return (raw, None);
    }

    let decode = |s: &str| percent_decode_str(s).decode_utf8_lossy().into_owned();
    let username = decode(url.username());
    let password = url.password().map(decode).unwrap_or_default();
    // Only cannot-be-a-base URLs reject these, and those never carry userinfo.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    (url.to_string(), Some((username, password)))
}

impl TenantRecord {
    /// Userinfo embedded in `base_url` is stripped and becomes the basic-auth pair.
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let (base_url, userinfo) = split_userinfo(base_url.into());
        let (username, password) = match userinfo {
            Some((username, password)) => (non_empty(Some(username)), non_empty(Some(password))),
            None => (None, None),
        };
        Self {
            name: name.into(),
            base_url,
            username,
            password,
            token: None,
            org_id: None,
        }
    }

    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = non_empty(Some(username.into()));
        self.password = non_empty(Some(password.into()));
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = non_empty(Some(token.into()));
        self
    }

    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = non_empty(Some(org_id.into()));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    /// True when a bearer token or a complete basic-auth pair is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.token.is_some() || (self.username.is_some() && self.password.is_some())
    }

    #[must_use]
    pub fn summary(&self) -> TenantSummary {
        TenantSummary {
            name: self.name.clone(),
            url: self.base_url.clone(),
            has_auth: self.has_credentials(),
            org_id: self.org_id.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(PrometheusToolsError::Config(
                "Tenant name is required".to_string(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(PrometheusToolsError::Config(format!(
                "URL is required for tenant '{}'",
                self.name
            )));
        }
        let url = Url::parse(&self.base_url).map_err(|e| {
            PrometheusToolsError::Config(format!(
                "Invalid URL for tenant '{}': {e}",
                self.name
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PrometheusToolsError::Config(format!(
                "Unsupported URL scheme '{}' for tenant '{}'",
                url.scheme(),
                self.name
            )));
        }
        Ok(())
    }
}

impl From<TenantConfig> for TenantRecord {
    fn from(cfg: TenantConfig) -> Self {
        let mut record = Self::new(cfg.name, cfg.url);
        let (username, password) = (non_empty(cfg.username), non_empty(cfg.password));
        // Explicit credentials replace any taken from the URL.
        if username.is_some() || password.is_some() {
            record.username = username;
            record.password = password;
        }
        record.token = non_empty(cfg.token);
        record.org_id = non_empty(cfg.org_id);
        record
    }
}

impl fmt::Debug for TenantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantRecord")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Public view of a tenant. Never carries credential values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantSummary {
    pub name: String,
    pub url: String,
    pub has_auth: bool,
    pub org_id: Option<String>,
}

/// Immutable set of tenants plus the tenant used when a call does not name one.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    tenants: Vec<TenantRecord>,
    default_tenant: String,
}

impl TenantRegistry {
    /// Build and validate a registry.
    ///
    /// An absent (or empty) `default_tenant` falls back to the first tenant.
    ///
    /// # Errors
    ///
    /// Returns [`PrometheusToolsError::Config`] if the tenant list is empty, a tenant has an empty
    /// name or an invalid URL, names are duplicated, or the default tenant is not registered.
    pub fn new(tenants: Vec<TenantRecord>, default_tenant: Option<String>) -> Result<Self> {
        let Some(first) = tenants.first() else {
            return Err(PrometheusToolsError::Config(
                "At least one tenant must be configured".to_string(),
            ));
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for tenant in &tenants {
            tenant.validate()?;
            if !seen.insert(tenant.name()) {
                return Err(PrometheusToolsError::Config(format!(
                    "Duplicate tenant name '{}'",
                    tenant.name()
                )));
            }
        }

        let default_tenant = match non_empty(default_tenant) {
            Some(name) => {
                if !seen.contains(name.as_str()) {
                    return Err(PrometheusToolsError::Config(format!(
                        "Default tenant '{name}' not found in tenant list"
                    )));
                }
                name
            }
            None => first.name().to_string(),
        };

        Ok(Self {
            tenants,
            default_tenant,
        })
    }

    /// Build a registry from parsed configuration entries.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TenantRegistry::new`].
    pub fn from_configs(
        configs: Vec<TenantConfig>,
        default_tenant: Option<String>,
    ) -> Result<Self> {
        Self::new(
            configs.into_iter().map(TenantRecord::from).collect(),
            default_tenant,
        )
    }

    /// Resolve a tenant by exact (case-sensitive) name; `None` selects the default tenant.
    ///
    /// # Errors
    ///
    /// Returns [`PrometheusToolsError::TenantNotFound`] with the full list of registered names.
    pub fn resolve(&self, name: Option<&str>) -> Result<&TenantRecord> {
        let requested = name.unwrap_or(self.default_tenant.as_str());
        self.get(requested)
            .ok_or_else(|| PrometheusToolsError::TenantNotFound {
                requested: requested.to_string(),
                available: self.names(),
            })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TenantRecord> {
        self.tenants.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn default_tenant(&self) -> &str {
        &self.default_tenant
    }

    /// Tenants in configuration order.
    #[must_use]
    pub fn tenants(&self) -> &[TenantRecord] {
        &self.tenants
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.tenants.iter().map(|t| t.name.clone()).collect()
    }

    #[must_use]
    pub fn list_all(&self) -> Vec<TenantSummary> {
        self.tenants.iter().map(TenantRecord::summary).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
