//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Scoped repositories take the
//! tenant id on every call and never return or touch another tenant's
//! records. A missing record is `Ok(None)`; `Err` always means the
//! store itself failed.

use uuid::Uuid;

use crate::error::OutreachResult;
use crate::models::{
    client::{Client, NewClient},
    event::{AttendeeOutcome, Event, NewEvent},
    organization::{CreateOrganization, Organization},
};
use crate::query::{Filter, FindOptions};

// ---------------------------------------------------------------------------
// Organizations (tenancy root, global scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = OutreachResult<Organization>> + Send;
    fn get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = OutreachResult<Option<Organization>>> + Send;
    fn list(
        &self,
        options: FindOptions,
    ) -> impl Future<Output = OutreachResult<Vec<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped record stores
// ---------------------------------------------------------------------------

/// Scoped CRUD over one collection.
pub trait ScopedRepository: Send + Sync {
    /// The stored record.
    type Record: Send;
    /// A validated document, as accepted by create and replace.
    type Draft: Send;

    /// Records matching `filter`. Callers build the filter with
    /// [`crate::query::QueryBuilder`], which always scopes it.
    fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> impl Future<Output = OutreachResult<Vec<Self::Record>>> + Send;

    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = OutreachResult<Option<Self::Record>>> + Send;

    /// Store a new record owned by `tenant_id`, stamping both timestamps.
    fn create(
        &self,
        tenant_id: Uuid,
        draft: Self::Draft,
    ) -> impl Future<Output = OutreachResult<Self::Record>> + Send;

    /// Replace the whole document. Optional fields absent from `draft`
    /// are cleared; the tenant and `createdAt` are kept and `updatedAt`
    /// is refreshed.
    fn replace(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        draft: Self::Draft,
    ) -> impl Future<Output = OutreachResult<Option<Self::Record>>> + Send;

    /// Delete and return the record, or `None` if there was nothing to
    /// delete.
    fn delete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = OutreachResult<Option<Self::Record>>> + Send;
}

/// Adds clients to event attendee sets.
pub trait AttendeeRegistrar: Send + Sync {
    /// Ensure `client_id` is an attendee of the event.
    ///
    /// The membership check and the insertion happen in one conditional
    /// store write, so concurrent registrations of the same client cannot
    /// duplicate it. Returns `None` when the event does not exist in this
    /// tenant.
    fn register(
        &self,
        tenant_id: Uuid,
        event_id: Uuid,
        client_id: Uuid,
    ) -> impl Future<Output = OutreachResult<Option<AttendeeOutcome>>> + Send;
}

pub trait EventRepository:
    ScopedRepository<Record = Event, Draft = NewEvent> + AttendeeRegistrar
{
}

impl<T> EventRepository for T where
    T: ScopedRepository<Record = Event, Draft = NewEvent> + AttendeeRegistrar
{
}

pub trait ClientRepository: ScopedRepository<Record = Client, Draft = NewClient> {}

impl<T> ClientRepository for T where T: ScopedRepository<Record = Client, Draft = NewClient> {}
