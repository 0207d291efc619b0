//! Event operations: listing, search, the recent-activity window,
//! attendee lookups and registration, and validated writes.

use chrono::{NaiveDate, Utc};
use outreach_core::error::{OutreachError, OutreachResult};
use outreach_core::models::event::{AttendeeInput, AttendeeOutcome, Event, EventInput};
use outreach_core::query::{EventSearch, QueryBuilder, SearchParams};
use outreach_core::repository::EventRepository;
use outreach_core::tenant::TenantContext;
use outreach_core::validation::{Validate, parse_id};
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;

/// Event service.
///
/// Generic over the repository implementation so that the service layer
/// has no dependency on the database crate.
pub struct EventService<R: EventRepository> {
    repo: R,
    config: ServiceConfig,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repo: R, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Most recently updated events of the tenant.
    pub async fn list(&self, ctx: &TenantContext) -> OutreachResult<Vec<Event>> {
        let query = QueryBuilder::new(ctx).list(self.config.list_limit);
        self.repo.find(&query.filter, query.options).await
    }

    /// The event with `id`, as a list of zero or one element.
    pub async fn get(&self, ctx: &TenantContext, id: &str) -> OutreachResult<Vec<Event>> {
        let id = parse_id("id", id)?;
        let event = self.repo.get_by_id(ctx.current_tenant(), id).await?;
        Ok(event.into_iter().collect())
    }

    pub async fn search(
        &self,
        ctx: &TenantContext,
        params: &SearchParams,
    ) -> OutreachResult<Vec<Event>> {
        let search = EventSearch::from_params(params)?;
        if search == EventSearch::Unrecognized {
            warn!(search_by = ?params.get("searchBy"), "unrecognized event search mode");
        }
        let query = QueryBuilder::new(ctx).event_search(&search);
        self.repo.find(&query.filter, query.options).await
    }

    /// Events dated inside the recent window ending at `today`, inclusive.
    pub async fn recent(
        &self,
        ctx: &TenantContext,
        today: NaiveDate,
    ) -> OutreachResult<Vec<Event>> {
        let query = QueryBuilder::new(ctx).recent_events(today, self.config.recent_window_months);
        self.repo.find(&query.filter, query.options).await
    }

    /// Recent window relative to the current UTC date.
    pub async fn event_data(&self, ctx: &TenantContext) -> OutreachResult<Vec<Event>> {
        self.recent(ctx, Utc::now().date_naive()).await
    }

    /// Events the client is registered for.
    pub async fn for_client(
        &self,
        ctx: &TenantContext,
        client_id: &str,
    ) -> OutreachResult<Vec<Event>> {
        let client_id = parse_id("id", client_id)?;
        let query = QueryBuilder::new(ctx).events_with_attendee(client_id);
        self.repo.find(&query.filter, query.options).await
    }

    pub async fn create(&self, ctx: &TenantContext, input: &EventInput) -> OutreachResult<Event> {
        let draft = input.validate()?;
        let event = self.repo.create(ctx.current_tenant(), draft).await?;
        info!(event_id = %event.id, tenant_id = %ctx.current_tenant(), "event created");
        Ok(event)
    }

    /// Register a client on an event. `None` when the event does not
    /// exist in this tenant.
    pub async fn add_attendee(
        &self,
        ctx: &TenantContext,
        event_id: &str,
        input: &AttendeeInput,
    ) -> OutreachResult<Option<AttendeeOutcome>> {
        let event_id = parse_id("id", event_id);
        let client_id = match input.attendee.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_id("attendee", raw),
            _ => Err(OutreachError::invalid_field("attendee", "attendee is required")),
        };

        let (event_id, client_id) = match (event_id, client_id) {
            (Ok(event_id), Ok(client_id)) => (event_id, client_id),
            (event_id, client_id) => {
                let violations = [event_id.err(), client_id.err()]
                    .into_iter()
                    .flatten()
                    .flat_map(|err| match err {
                        OutreachError::Validation(v) => v,
                        _ => Vec::new(),
                    })
                    .collect();
                return Err(OutreachError::Validation(violations));
            }
        };

        let outcome = self
            .repo
            .register(ctx.current_tenant(), event_id, client_id)
            .await?;
        match outcome {
            Some(outcome) => debug!(%event_id, %client_id, ?outcome, "attendee registration"),
            None => warn!(%event_id, "attendee registration on unknown event"),
        }
        Ok(outcome)
    }

    /// Replace the whole event document.
    pub async fn replace(
        &self,
        ctx: &TenantContext,
        id: &str,
        input: &EventInput,
    ) -> OutreachResult<Option<Event>> {
        let id = parse_id("id", id)?;
        let draft = input.validate()?;
        let event = self.repo.replace(ctx.current_tenant(), id, draft).await?;
        if event.is_none() {
            debug!(event_id = %id, "replace matched no event");
        }
        Ok(event)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: &str) -> OutreachResult<Option<Event>> {
        let id = parse_id("id", id)?;
        let deleted = self
            .repo
            .delete(ctx.current_tenant(), id)
            .await
            .inspect_err(|e| error!(event_id = %id, error = %e, "event delete failed"))?;
        match &deleted {
            Some(_) => info!(event_id = %id, "event deleted"),
            None => warn!(event_id = %id, "delete matched no event"),
        }
        Ok(deleted)
    }
}
