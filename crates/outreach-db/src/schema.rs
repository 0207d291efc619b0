//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs and calendar dates are stored as
//! strings (`YYYY-MM-DD` sorts lexically, which the date filters rely
//! on). The tenant column and `created_at` are READONLY once written.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (tenancy root)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD metadata ON TABLE organization TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_updated ON TABLE organization \
    COLUMNS updated_at;

-- =======================================================================
-- Events (tenant scope)
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE event TYPE string READONLY;
DEFINE FIELD event_name ON TABLE event TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD description ON TABLE event TYPE option<string>;
DEFINE FIELD date ON TABLE event TYPE string;
DEFINE FIELD attendees ON TABLE event TYPE array<string> DEFAULT [] \
    ASSERT array::len(array::distinct($value)) = array::len($value);
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_org_updated ON TABLE event \
    COLUMNS organization_id, updated_at;
DEFINE INDEX idx_event_org_date ON TABLE event \
    COLUMNS organization_id, date;

-- =======================================================================
-- Clients (tenant scope)
-- =======================================================================
DEFINE TABLE client SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE client TYPE string READONLY;
DEFINE FIELD first_name ON TABLE client TYPE string;
DEFINE FIELD last_name ON TABLE client TYPE string;
DEFINE FIELD email ON TABLE client TYPE string;
DEFINE FIELD phone_numbers ON TABLE client TYPE array<object> \
    DEFAULT [];
DEFINE FIELD phone_numbers.*.primary_phone ON TABLE client TYPE string;
DEFINE FIELD phone_numbers.*.secondary_phone ON TABLE client \
    TYPE option<string>;
DEFINE FIELD address ON TABLE client TYPE object;
DEFINE FIELD address.line1 ON TABLE client TYPE option<string>;
DEFINE FIELD address.line2 ON TABLE client TYPE option<string>;
DEFINE FIELD address.city ON TABLE client TYPE string;
DEFINE FIELD address.county ON TABLE client TYPE option<string>;
DEFINE FIELD address.zip ON TABLE client TYPE option<string>;
DEFINE FIELD created_at ON TABLE client TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE FIELD updated_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_client_org_updated ON TABLE client \
    COLUMNS organization_id, updated_at;
DEFINE INDEX idx_client_org_name ON TABLE client \
    COLUMNS organization_id, last_name, first_name;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
