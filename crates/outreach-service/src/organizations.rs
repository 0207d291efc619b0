//! Read-only organization operations.

use outreach_core::error::OutreachResult;
use outreach_core::models::organization::Organization;
use outreach_core::query::FindOptions;
use outreach_core::repository::OrganizationRepository;
use outreach_core::tenant::TenantContext;
use outreach_core::validation::parse_id;
use tracing::warn;

use crate::config::ServiceConfig;

pub struct OrganizationService<R: OrganizationRepository> {
    repo: R,
    config: ServiceConfig,
}

impl<R: OrganizationRepository> OrganizationService<R> {
    pub fn new(repo: R, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// All organizations, newest first. Not tenant-scoped.
    pub async fn list(&self) -> OutreachResult<Vec<Organization>> {
        self.repo
            .list(FindOptions::recently_updated(self.config.list_limit))
            .await
    }

    pub async fn get(&self, id: &str) -> OutreachResult<Vec<Organization>> {
        let id = parse_id("id", id)?;
        Ok(self.repo.get_by_id(id).await?.into_iter().collect())
    }

    /// The organization of the active tenant.
    pub async fn current(&self, ctx: &TenantContext) -> OutreachResult<Option<Organization>> {
        let org = self.repo.get_by_id(ctx.current_tenant()).await?;
        if org.is_none() {
            warn!(tenant_id = %ctx.current_tenant(), "active tenant has no organization record");
        }
        Ok(org)
    }
}
