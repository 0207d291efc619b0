//! Search predicate construction.
//!
//! A [`Filter`] is a store-independent conjunction of [`Clause`]s over a
//! closed set of [`Field`]s. [`QueryBuilder`] produces one for each
//! search family, always starting from the tenant clause.

use std::collections::HashMap;

use chrono::{Days, Months, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::error::{OutreachError, OutreachResult};
use crate::tenant::TenantContext;
use crate::validation::{DATE_FORMAT, parse_date};

/// Raw query-string parameters of a search request.
pub type SearchParams = HashMap<String, String>;

/// Page size of the default listing.
pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// Length of the recent-events window in calendar months.
pub const DEFAULT_RECENT_WINDOW_MONTHS: u32 = 2;

/// Searchable fields across the scoped collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tenant,
    EventName,
    EventDate,
    Attendees,
    FirstName,
    LastName,
    /// `primaryPhone` of any entry in a client's `phoneNumbers`.
    PrimaryPhone,
    UpdatedAt,
}

/// A single predicate on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Exact equality.
    Eq(Field, String),
    /// Case-insensitive prefix match. The value is stored lowercased.
    PrefixCi(Field, String),
    /// Half-open range `[from, to)` over lexically ordered values.
    Range { field: Field, from: String, to: String },
    /// Set membership on a multi-valued field.
    Contains(Field, String),
}

/// Conjunction of clauses. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Filter matching every record of one tenant.
    pub fn tenant(ctx: &TenantContext) -> Self {
        Self::default().and(Clause::Eq(Field::Tenant, ctx.current_tenant().to_string()))
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether the filter pins results to `tenant_id`.
    pub fn is_scoped_to(&self, tenant_id: Uuid) -> bool {
        let tenant = tenant_id.to_string();
        self.clauses
            .iter()
            .any(|c| matches!(c, Clause::Eq(Field::Tenant, value) if *value == tenant))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: Field,
    pub direction: SortDirection,
}

/// Optional ordering and bound applied to a find.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Newest-first by `updatedAt`, bounded to `limit` records.
    pub fn recently_updated(limit: u64) -> Self {
        Self {
            sort: Some(Sort {
                field: Field::UpdatedAt,
                direction: SortDirection::Descending,
            }),
            limit: Some(limit),
        }
    }
}

/// A filter with its find options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    pub options: FindOptions,
}

impl Query {
    fn unbounded(filter: Filter) -> Self {
        Self {
            filter,
            options: FindOptions::default(),
        }
    }
}

/// Event search modes selected by `searchBy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSearch {
    /// `searchBy=name`: prefix of `eventName`.
    Name(String),
    /// `searchBy=date`: exact `eventDate`.
    Date(NaiveDate),
    /// Any other mode: tenant-only filter.
    Unrecognized,
}

impl EventSearch {
    pub fn from_params(params: &SearchParams) -> OutreachResult<Self> {
        match params.get("searchBy").map(String::as_str) {
            Some("name") => Ok(Self::Name(param(params, "eventName"))),
            Some("date") => {
                let raw = param(params, "eventDate");
                parse_date(&raw).map(Self::Date).ok_or_else(|| {
                    OutreachError::invalid_field(
                        "eventDate",
                        "date must be a valid date (YYYY-MM-DD)",
                    )
                })
            }
            _ => Ok(Self::Unrecognized),
        }
    }
}

/// Client search modes selected by `searchBy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSearch {
    /// `searchBy=name`: prefixes of `firstName` and `lastName`, both
    /// required to match. A missing prefix matches everything.
    Name { first: String, last: String },
    /// `searchBy=number`: prefix of any `primaryPhone`.
    Phone(String),
    Unrecognized,
}

impl ClientSearch {
    pub fn from_params(params: &SearchParams) -> Self {
        match params.get("searchBy").map(String::as_str) {
            Some("name") => Self::Name {
                first: param(params, "firstName"),
                last: param(params, "lastName"),
            },
            Some("number") => Self::Phone(param(params, "phoneNumbers.primaryPhone")),
            _ => Self::Unrecognized,
        }
    }
}

fn param(params: &SearchParams, key: &str) -> String {
    params
        .get(key)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn prefix(field: Field, value: &str) -> Clause {
    Clause::PrefixCi(field, value.to_lowercase())
}

/// Builds tenant-scoped queries for one request.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    tenant: &'a TenantContext,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(tenant: &'a TenantContext) -> Self {
        Self { tenant }
    }

    fn scoped(&self) -> Filter {
        Filter::tenant(self.tenant)
    }

    /// Default listing: newest-first, bounded.
    pub fn list(&self, limit: u64) -> Query {
        Query {
            filter: self.scoped(),
            options: FindOptions::recently_updated(limit),
        }
    }

    pub fn event_search(&self, search: &EventSearch) -> Query {
        let filter = match search {
            EventSearch::Name(name) => self.scoped().and(prefix(Field::EventName, name)),
            EventSearch::Date(date) => self.scoped().and(Clause::Eq(
                Field::EventDate,
                date.format(DATE_FORMAT).to_string(),
            )),
            EventSearch::Unrecognized => self.scoped(),
        };
        debug!(?search, clauses = filter.clauses().len(), "built event search");
        Query::unbounded(filter)
    }

    pub fn client_search(&self, search: &ClientSearch) -> Query {
        let filter = match search {
            ClientSearch::Name { first, last } => self
                .scoped()
                .and(prefix(Field::FirstName, first))
                .and(prefix(Field::LastName, last)),
            ClientSearch::Phone(number) => self.scoped().and(prefix(Field::PrimaryPhone, number)),
            ClientSearch::Unrecognized => self.scoped(),
        };
        debug!(?search, clauses = filter.clauses().len(), "built client search");
        Query::unbounded(filter)
    }

    /// Events dated within `(today - months, today]`.
    ///
    /// An event is dated at midnight and compared against the current
    /// instant, so today's events are in and the day exactly `months`
    /// back is out. Month subtraction clamps to the end of shorter
    /// months (e.g. 30 April minus two months is 29 February).
    pub fn recent_events(&self, today: NaiveDate, months: u32) -> Query {
        let from = today
            .checked_sub_months(Months::new(months))
            .and_then(|edge| edge.checked_add_days(Days::new(1)))
            .unwrap_or(NaiveDate::MIN);
        let to = today
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        Query::unbounded(self.scoped().and(Clause::Range {
            field: Field::EventDate,
            from: from.format(DATE_FORMAT).to_string(),
            to: to.format(DATE_FORMAT).to_string(),
        }))
    }

    /// Events whose attendee set contains `client_id`.
    pub fn events_with_attendee(&self, client_id: Uuid) -> Query {
        Query::unbounded(
            self.scoped()
                .and(Clause::Contains(Field::Attendees, client_id.to_string())),
        )
    }
}
