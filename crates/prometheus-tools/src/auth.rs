//! Per-tenant authentication material.
//!
//! Pure functions of a [`TenantRecord`]: no I/O, nothing cached. A bearer token wins over a
//! basic-auth pair when both are configured.

use crate::tenant::TenantRecord;
use std::fmt;

/// Header carrying the tenant-scoping org id (Cortex/Mimir/Thanos style multi-tenancy).
pub const SCOPE_ORG_ID_HEADER: &str = "X-Scope-OrgID";

/// Authentication to attach to one outbound request.
#[derive(Clone, PartialEq, Eq)]
pub enum ResolvedAuth<'a> {
    None,
    /// Sent as `Authorization: Bearer <token>`.
    Bearer(&'a str),
    /// Sent as HTTP Basic credentials.
    Basic { username: &'a str, password: &'a str },
}

impl ResolvedAuth<'_> {
    /// Short label for logs (`bearer_token`, `basic_auth`, `none`).
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer(_) => "bearer_token",
            Self::Basic { .. } => "basic_auth",
        }
    }
}

impl fmt::Debug for ResolvedAuth<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[must_use]
pub fn resolve_auth(tenant: &TenantRecord) -> ResolvedAuth<'_> {
    if let Some(token) = tenant.token() {
        return ResolvedAuth::Bearer(token);
    }
    match (tenant.username(), tenant.password()) {
        (Some(username), Some(password)) => ResolvedAuth::Basic { username, password },
        _ => ResolvedAuth::None,
    }
}

/// The `X-Scope-OrgID` header for tenants with an org id.
#[must_use]
pub fn scope_header(tenant: &TenantRecord) -> Option<(&'static str, &str)> {
    tenant.org_id().map(|org| (SCOPE_ORG_ID_HEADER, org))
}
