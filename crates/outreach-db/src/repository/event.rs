//! SurrealDB implementation of the event store and attendee registrar.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use outreach_core::error::OutreachResult;
use outreach_core::models::event::{AttendeeOutcome, Event, NewEvent};
use outreach_core::query::{Filter, FindOptions};
use outreach_core::repository::{AttendeeRegistrar, ScopedRepository};
use outreach_core::validation::DATE_FORMAT;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;
use crate::filter::select_statement;

const ENTITY: &str = "event";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct EventRow {
    organization_id: String,
    event_name: String,
    description: Option<String>,
    date: String,
    attendees: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    organization_id: String,
    event_name: String,
    description: Option<String>,
    date: String,
    attendees: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, DbError> {
        let id = parse_uuid(ENTITY, "id", &self.record_id)?;
        EventRow {
            organization_id: self.organization_id,
            event_name: self.event_name,
            description: self.description,
            date: self.date,
            attendees: self.attendees,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_event(id)
    }
}

impl EventRow {
    fn try_into_event(self, id: Uuid) -> Result<Event, DbError> {
        let organization_id = parse_uuid(ENTITY, "organization_id", &self.organization_id)?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| DbError::invalid(ENTITY, format!("date {:?}: {e}", self.date)))?;
        let attendees = self
            .attendees
            .iter()
            .map(|raw| parse_uuid(ENTITY, "attendees", raw))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Event {
            id,
            organization_id,
            event_name: self.event_name,
            description: self.description,
            date,
            attendees,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn first_event(rows: Vec<EventRow>, id: Uuid) -> Result<Option<Event>, DbError> {
    rows.into_iter()
        .next()
        .map(|row| row.try_into_event(id))
        .transpose()
}

fn attendee_strings(attendees: &BTreeSet<Uuid>) -> Vec<String> {
    attendees.iter().map(Uuid::to_string).collect()
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Event repository.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScopedRepository for SurrealEventRepository<C> {
    type Record = Event;
    type Draft = NewEvent;

    async fn find(&self, filter: &Filter, options: FindOptions) -> OutreachResult<Vec<Event>> {
        if filter.is_empty() {
            warn!("unscoped event find");
        }
        let stmt = select_statement(ENTITY, filter, &options);
        debug!(sql = %stmt.sql, "finding events");

        let mut builder = self.db.query(stmt.sql);
        for binding in stmt.bindings {
            builder = builder.bind(binding);
        }
        if let Some(limit) = stmt.limit {
            builder = builder.bind(("limit", limit));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;

        let events = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(events)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> OutreachResult<Option<Event>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('event', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_event(rows, id)?)
    }

    async fn create(&self, tenant_id: Uuid, draft: NewEvent) -> OutreachResult<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('event', $id) SET \
                 organization_id = $organization_id, \
                 event_name = $event_name, description = $description, \
                 date = $date, attendees = $attendees",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", tenant_id.to_string()))
            .bind(("event_name", draft.event_name))
            .bind(("description", draft.description))
            .bind(("date", draft.date.format(DATE_FORMAT).to_string()))
            .bind(("attendees", attendee_strings(&draft.attendees)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let event = first_event(rows, id)?.ok_or(DbError::MissingResult {
            entity: ENTITY,
            id: id_str,
        })?;

        debug!(event_id = %event.id, %tenant_id, "event created");
        Ok(event)
    }

    async fn replace(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        draft: NewEvent,
    ) -> OutreachResult<Option<Event>> {
        let result = self
            .db
            .query(
                "UPDATE type::record('event', $id) SET \
                 event_name = $event_name, description = $description, \
                 date = $date, attendees = $attendees, \
                 updated_at = time::now() \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .bind(("event_name", draft.event_name))
            .bind(("description", draft.description))
            .bind(("date", draft.date.format(DATE_FORMAT).to_string()))
            .bind(("attendees", attendee_strings(&draft.attendees)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_event(rows, id)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> OutreachResult<Option<Event>> {
        let result = self
            .db
            .query(
                "DELETE type::record('event', $id) \
                 WHERE organization_id = $organization_id RETURN BEFORE",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_event(rows, id)?)
    }
}

impl<C: Connection> AttendeeRegistrar for SurrealEventRepository<C> {
    async fn register(
        &self,
        tenant_id: Uuid,
        event_id: Uuid,
        client_id: Uuid,
    ) -> OutreachResult<Option<AttendeeOutcome>> {
        // Statement 0 is the conditional append: the membership test sits in
        // the WHERE of the same single-record UPDATE, so it is evaluated and
        // applied atomically. Statement 1 only classifies a no-op.
        let result = self
            .db
            .query(
                "UPDATE type::record('event', $id) SET \
                 attendees += $attendee, updated_at = time::now() \
                 WHERE organization_id = $organization_id \
                 AND attendees CONTAINSNOT $attendee; \
                 SELECT count() AS total FROM type::record('event', $id) \
                 WHERE organization_id = $organization_id GROUP ALL;",
            )
            .bind(("id", event_id.to_string()))
            .bind(("organization_id", tenant_id.to_string()))
            .bind(("attendee", client_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Statement(e.to_string()))?;

        let updated: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        if !updated.is_empty() {
            debug!(%event_id, %client_id, "attendee added");
            return Ok(Some(AttendeeOutcome::Added));
        }

        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let exists = counts.first().map(|r| r.total).unwrap_or(0) > 0;
        Ok(exists.then_some(AttendeeOutcome::Unchanged))
    }
}
