//! Event domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dated event hosted by an organization, with the set of clients
/// signed up for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "organization_id")]
    pub organization_id: Uuid,
    pub event_name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Client identifiers. Membership is unique and order-free.
    pub attendees: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound event payload as submitted by a caller, before validation.
///
/// Carries no tenant field: an `organization_id` in the payload is
/// dropped on deserialization and the active tenant is stamped instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub event_name: Option<String>,
    pub description: Option<String>,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: Option<String>,
    pub attendees: Option<Vec<String>>,
}

/// A validated event document, ready to be created or to replace an
/// existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub event_name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub attendees: BTreeSet<Uuid>,
}

/// Body of an attendee registration request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendeeInput {
    pub attendee: Option<String>,
}

/// Result of registering a client on an event that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeOutcome {
    /// The client was not yet an attendee and has been added.
    Added,
    /// The client was already an attendee; nothing was written.
    Unchanged,
}
