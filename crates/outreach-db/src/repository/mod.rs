//! SurrealDB repository implementations.

mod client;
mod event;
mod organization;

pub use client::SurrealClientRepository;
pub use event::SurrealEventRepository;
pub use organization::SurrealOrganizationRepository;

use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_uuid(entity: &'static str, field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::invalid(entity, format!("{field}: {e}")))
}
