//! Client operations.

use outreach_core::error::OutreachResult;
use outreach_core::models::client::{Client, ClientInput};
use outreach_core::query::{ClientSearch, QueryBuilder, SearchParams};
use outreach_core::repository::ClientRepository;
use outreach_core::tenant::TenantContext;
use outreach_core::validation::{Validate, parse_id};
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;

pub struct ClientService<R: ClientRepository> {
    repo: R,
    config: ServiceConfig,
}

impl<R: ClientRepository> ClientService<R> {
    pub fn new(repo: R, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub async fn list(&self, ctx: &TenantContext) -> OutreachResult<Vec<Client>> {
        let query = QueryBuilder::new(ctx).list(self.config.list_limit);
        self.repo.find(&query.filter, query.options).await
    }

    /// The client with `id`, as a list of zero or one element.
    pub async fn get(&self, ctx: &TenantContext, id: &str) -> OutreachResult<Vec<Client>> {
        let id = parse_id("id", id)?;
        let client = self.repo.get_by_id(ctx.current_tenant(), id).await?;
        Ok(client.into_iter().collect())
    }

    /// Single-record lookup: the client with `id`, or `None`.
    pub async fn find(&self, ctx: &TenantContext, id: &str) -> OutreachResult<Option<Client>> {
        let id = parse_id("id", id)?;
        self.repo.get_by_id(ctx.current_tenant(), id).await
    }

    /// Search by `searchBy=name` (first/last name prefixes) or
    /// `searchBy=number` (primary phone prefix).
    pub async fn search(
        &self,
        ctx: &TenantContext,
        params: &SearchParams,
    ) -> OutreachResult<Vec<Client>> {
        let search = ClientSearch::from_params(params);
        if search == ClientSearch::Unrecognized {
            warn!(search_by = ?params.get("searchBy"), "unrecognized client search mode");
        }
        let query = QueryBuilder::new(ctx).client_search(&search);
        self.repo.find(&query.filter, query.options).await
    }

    pub async fn create(&self, ctx: &TenantContext, input: &ClientInput) -> OutreachResult<Client> {
        let draft = input.validate()?;
        let client = self.repo.create(ctx.current_tenant(), draft).await?;
        info!(client_id = %client.id, tenant_id = %ctx.current_tenant(), "client created");
        Ok(client)
    }

    pub async fn replace(
        &self,
        ctx: &TenantContext,
        id: &str,
        input: &ClientInput,
    ) -> OutreachResult<Option<Client>> {
        let id = parse_id("id", id)?;
        let draft = input.validate()?;
        let client = self.repo.replace(ctx.current_tenant(), id, draft).await?;
        if client.is_none() {
            debug!(client_id = %id, "replace matched no client");
        }
        Ok(client)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: &str) -> OutreachResult<Option<Client>> {
        let id = parse_id("id", id)?;
        let deleted = self
            .repo
            .delete(ctx.current_tenant(), id)
            .await
            .inspect_err(|e| error!(client_id = %id, error = %e, "client delete failed"))?;
        match &deleted {
            Some(_) => info!(client_id = %id, "client deleted"),
            None => warn!(client_id = %id, "delete matched no client"),
        }
        Ok(deleted)
    }
}
