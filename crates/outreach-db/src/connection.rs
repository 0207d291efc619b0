//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// WebSocket address (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "outreach".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Build a config from `OUTREACH_DB_*` variables supplied by `lookup`,
    /// falling back to the defaults for anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };
        Self {
            url: get("OUTREACH_DB_URL", defaults.url),
            namespace: get("OUTREACH_DB_NAMESPACE", defaults.namespace),
            database: get("OUTREACH_DB_DATABASE", defaults.database),
            username: get("OUTREACH_DB_USERNAME", defaults.username),
            password: get("OUTREACH_DB_PASSWORD", defaults.password),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Owns the shared SurrealDB client. Cloning is cheap; every repository
/// gets its own clone of the handle.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, sign in as root, select the namespace and database, and
    /// bring the schema up to date.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;

        info!("SurrealDB ready");

        Ok(Self { db })
    }

    /// Returns a clone of the underlying SurrealDB client handle.
    pub fn client(&self) -> Surreal<Client> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("OUTREACH_DB_URL", "db.internal:8000"),
            ("OUTREACH_DB_DATABASE", "staging"),
            ("OUTREACH_DB_PASSWORD", " "),
        ]
        .into_iter()
        .collect();

        let config = DbConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.url, "db.internal:8000");
        assert_eq!(config.database, "staging");
        assert_eq!(config.namespace, "outreach");
        // Blank values fall back to the default.
        assert_eq!(config.password, "root");
    }
}
