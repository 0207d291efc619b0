//! Active tenant resolution.
//!
//! Every scoped read and write takes a [`TenantContext`] explicitly.
//! The context is resolved once (normally from process configuration at
//! startup) and then copied into each request.

use uuid::Uuid;

use crate::error::{OutreachError, OutreachResult};

/// Environment variable holding the active organization id.
pub const TENANT_ENV_VAR: &str = "ORG";

/// The organization on whose behalf a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantContext {
    tenant_id: Uuid,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }

    /// Resolve a context from a raw configuration value.
    ///
    /// Fails when the value is unset, blank, or not a valid identifier.
    pub fn resolve(raw: Option<&str>) -> OutreachResult<Self> {
        let raw = raw
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| OutreachError::TenantContext(format!("{TENANT_ENV_VAR} is not set")))?;

        let tenant_id = Uuid::parse_str(raw).map_err(|e| {
            OutreachError::TenantContext(format!("invalid tenant id {raw:?}: {e}"))
        })?;

        Ok(Self::new(tenant_id))
    }

    /// Resolve the context from the `ORG` environment variable.
    pub fn from_env() -> OutreachResult<Self> {
        Self::resolve(std::env::var(TENANT_ENV_VAR).ok().as_deref())
    }

    /// The active tenant (organization) id.
    pub fn current_tenant(&self) -> Uuid {
        self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_uuid() {
        let id = Uuid::new_v4();
        let ctx = TenantContext::resolve(Some(&id.to_string())).unwrap();
        assert_eq!(ctx.current_tenant(), id);
    }

    #[test]
    fn resolve_trims_whitespace() {
        let id = Uuid::new_v4();
        let ctx = TenantContext::resolve(Some(&format!("  {id}\n"))).unwrap();
        assert_eq!(ctx.current_tenant(), id);
    }

    #[test]
    fn resolve_rejects_missing_and_blank() {
        assert!(matches!(
            TenantContext::resolve(None),
            Err(OutreachError::TenantContext(_))
        ));
        assert!(matches!(
            TenantContext::resolve(Some("   ")),
            Err(OutreachError::TenantContext(_))
        ));
    }

    #[test]
    fn resolve_rejects_malformed_id() {
        let err = TenantContext::resolve(Some("not-a-uuid")).unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }
}
