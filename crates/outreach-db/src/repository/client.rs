//! SurrealDB implementation of the client store.

use chrono::{DateTime, Utc};
use outreach_core::error::OutreachResult;
use outreach_core::models::client::{Address, Client, NewClient, PhoneNumber};
use outreach_core::query::{Filter, FindOptions};
use outreach_core::repository::ScopedRepository;
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;
use crate::filter::select_statement;

const ENTITY: &str = "client";

/// Stored shape of one `phone_numbers` entry. Unset options are omitted
/// so the store sees NONE rather than NULL.
#[derive(Debug, Serialize, Deserialize)]
struct PhoneDoc {
    primary_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_phone: Option<String>,
}

/// Stored shape of `address`.
#[derive(Debug, Serialize, Deserialize)]
struct AddressDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line2: Option<String>,
    city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip: Option<String>,
}

fn phones_to_value(phones: Vec<PhoneNumber>) -> Result<serde_json::Value, DbError> {
    let docs: Vec<PhoneDoc> = phones
        .into_iter()
        .map(|p| PhoneDoc {
            primary_phone: p.primary_phone,
            secondary_phone: p.secondary_phone,
        })
        .collect();
    serde_json::to_value(docs).map_err(|e| DbError::invalid(ENTITY, e.to_string()))
}

fn address_to_value(address: Address) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(AddressDoc {
        line1: address.line1,
        line2: address.line2,
        city: address.city,
        county: address.county,
        zip: address.zip,
    })
    .map_err(|e| DbError::invalid(ENTITY, e.to_string()))
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ClientRow {
    organization_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone_numbers: serde_json::Value,
    address: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn try_into_client(self, id: Uuid) -> Result<Client, DbError> {
        let organization_id = parse_uuid(ENTITY, "organization_id", &self.organization_id)?;
        let phones: Vec<PhoneDoc> = serde_json::from_value(self.phone_numbers)
            .map_err(|e| DbError::invalid(ENTITY, format!("phone_numbers: {e}")))?;
        let address: AddressDoc = serde_json::from_value(self.address)
            .map_err(|e| DbError::invalid(ENTITY, format!("address: {e}")))?;

        Ok(Client {
            id,
            organization_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_numbers: phones
                .into_iter()
                .map(|p| PhoneNumber {
                    primary_phone: p.primary_phone,
                    secondary_phone: p.secondary_phone,
                })
                .collect(),
            address: Address {
                line1: address.line1,
                line2: address.line2,
                city: address.city,
                county: address.county,
                zip: address.zip,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ClientRowWithId {
    record_id: String,
    organization_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone_numbers: serde_json::Value,
    address: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRowWithId {
    fn try_into_client(self) -> Result<Client, DbError> {
        let id = parse_uuid(ENTITY, "id", &self.record_id)?;
        ClientRow {
            organization_id: self.organization_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_numbers: self.phone_numbers,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_client(id)
    }
}

fn first_client(rows: Vec<ClientRow>, id: Uuid) -> Result<Option<Client>, DbError> {
    rows.into_iter()
        .next()
        .map(|row| row.try_into_client(id))
        .transpose()
}

/// SurrealDB implementation of the Client repository.
#[derive(Clone)]
pub struct SurrealClientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealClientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScopedRepository for SurrealClientRepository<C> {
    type Record = Client;
    type Draft = NewClient;

    async fn find(&self, filter: &Filter, options: FindOptions) -> OutreachResult<Vec<Client>> {
        if filter.is_empty() {
            warn!("unscoped client find");
        }
        let stmt = select_statement(ENTITY, filter, &options);
        debug!(sql = %stmt.sql, "finding clients");

        let mut builder = self.db.query(stmt.sql);
        for binding in stmt.bindings {
            builder = builder.bind(binding);
        }
        if let Some(limit) = stmt.limit {
            builder = builder.bind(("limit", limit));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<ClientRowWithId> = result.take(0).map_err(DbError::from)?;

        let clients = rows
            .into_iter()
            .map(|row| row.try_into_client())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(clients)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> OutreachResult<Option<Client>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('client', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_client(rows, id)?)
    }

    async fn create(&self, tenant_id: Uuid, draft: NewClient) -> OutreachResult<Client> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('client', $id) SET \
                 organization_id = $organization_id, \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, phone_numbers = $phone_numbers, \
                 address = $address",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", tenant_id.to_string()))
            .bind(("first_name", draft.first_name))
            .bind(("last_name", draft.last_name))
            .bind(("email", draft.email))
            .bind(("phone_numbers", phones_to_value(draft.phone_numbers)?))
            .bind(("address", address_to_value(draft.address)?))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let client = first_client(rows, id)?.ok_or(DbError::MissingResult {
            entity: ENTITY,
            id: id_str,
        })?;

        debug!(client_id = %client.id, %tenant_id, "client created");
        Ok(client)
    }

    async fn replace(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        draft: NewClient,
    ) -> OutreachResult<Option<Client>> {
        let result = self
            .db
            .query(
                "UPDATE type::record('client', $id) SET \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, phone_numbers = $phone_numbers, \
                 address = $address, updated_at = time::now() \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .bind(("first_name", draft.first_name))
            .bind(("last_name", draft.last_name))
            .bind(("email", draft.email))
            .bind(("phone_numbers", phones_to_value(draft.phone_numbers)?))
            .bind(("address", address_to_value(draft.address)?))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_client(rows, id)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> OutreachResult<Option<Client>> {
        let result = self
            .db
            .query(
                "DELETE type::record('client', $id) \
                 WHERE organization_id = $organization_id RETURN BEFORE",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_client(rows, id)?)
    }
}
