//! Outreach Server — Application entry point.
//!
//! Loads configuration from the environment, connects to SurrealDB
//! (applying migrations), wires the services for the active tenant and
//! runs until interrupted.

use outreach_core::TenantContext;
use outreach_core::error::OutreachError;
use outreach_db::repository::{
    SurrealClientRepository, SurrealEventRepository, SurrealOrganizationRepository,
};
use outreach_db::{DbConfig, DbError, DbManager};
use outreach_service::{ClientService, EventService, OrganizationService, ServiceConfig};
use surrealdb::engine::remote::ws::Client;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "outreach=info";

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Outreach(#[from] OutreachError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

/// Everything the server reads from the environment at startup.
#[derive(Debug, Clone)]
struct ServerConfig {
    db: DbConfig,
    service: ServiceConfig,
    tenant: TenantContext,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ServerError> {
        Ok(Self {
            db: DbConfig::from_env(),
            service: ServiceConfig::from_env()?,
            tenant: TenantContext::from_env()?,
        })
    }
}

/// Services shared by every request handler.
struct AppState {
    events: EventService<SurrealEventRepository<Client>>,
    clients: ClientService<SurrealClientRepository<Client>>,
    organizations: OrganizationService<SurrealOrganizationRepository<Client>>,
}

impl AppState {
    fn new(db: &DbManager, config: &ServiceConfig) -> Self {
        Self {
            events: EventService::new(SurrealEventRepository::new(db.client()), config.clone()),
            clients: ClientService::new(SurrealClientRepository::new(db.client()), config.clone()),
            organizations: OrganizationService::new(
                SurrealOrganizationRepository::new(db.client()),
                config.clone(),
            ),
        }
    }

    /// Confirm the active tenant resolves and the scoped collections are
    /// readable.
    async fn probe(&self, tenant: &TenantContext) -> Result<(), ServerError> {
        match self.organizations.current(tenant).await? {
            Some(org) => info!(tenant_id = %org.id, name = %org.name, "active organization"),
            None => warn!(
                tenant_id = %tenant.current_tenant(),
                "active tenant has no organization record; scoped reads will be empty"
            ),
        }

        let events = self.events.list(tenant).await?;
        let clients = self.clients.list(tenant).await?;
        info!(
            recent_events = events.len(),
            recent_clients = clients.len(),
            "scoped collections readable"
        );
        Ok(())
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;
    info!(
        url = %config.db.url,
        tenant_id = %config.tenant.current_tenant(),
        list_limit = config.service.list_limit,
        "configuration loaded"
    );

    let db = DbManager::connect(&config.db).await?;
    let state = AppState::new(&db, &config.service);
    state.probe(&config.tenant).await?;

    info!("Outreach server ready");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting Outreach server...");

    if let Err(e) = run().await {
        error!(error = %e, "Outreach server failed");
        std::process::exit(1);
    }

    info!("Outreach server stopped.");
}
