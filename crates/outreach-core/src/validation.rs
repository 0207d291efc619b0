//! Pre-write validation of inbound records.
//!
//! Each input type converts into its validated draft through
//! [`Validate::validate`]. Every rule runs; the caller gets either the
//! draft or the complete list of violations, never just the first one.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OutreachError, OutreachResult};
use crate::models::client::{Address, ClientInput, NewClient, PhoneNumber};
use crate::models::event::{EventInput, NewEvent};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ().-]*$").expect("phone pattern is valid"));

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `phoneNumbers[1].primaryPhone`.
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Conversion of a raw input into its validated form.
pub trait Validate {
    type Output;

    /// Check every rule. On failure returns
    /// [`OutreachError::Validation`] with all violations found.
    fn validate(&self) -> OutreachResult<Self::Output>;
}

/// Parse an identifier taken from a request path or body.
pub fn parse_id(field: &str, raw: &str) -> OutreachResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| OutreachError::invalid_field(field, "must be a valid identifier"))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

/// Accepts an optional leading `+`, digits and the usual separators,
/// with 7 to 15 digits in total.
pub fn is_valid_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    PHONE_RE.is_match(value) && (7..=15).contains(&digits)
}

/// Accumulates violations while the rules run.
#[derive(Debug, Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// Returns the trimmed value, or records `message` and returns an
    /// empty string when it is missing or blank.
    fn required_text(&mut self, field: &str, value: Option<&str>, message: &str) -> String {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => {
                self.push(field, message);
                String::new()
            }
        }
    }

    /// Required name made of ASCII letters only.
    fn alphabetic_name(&mut self, field: &str, value: Option<&str>, label: &str) -> String {
        let name = self.required_text(field, value, &format!("{label} is required"));
        if !name.is_empty() && !name.chars().all(|c| c.is_ascii_alphabetic()) {
            self.push(field, format!("{label} must contain only letters"));
        }
        name
    }

    fn finish(self) -> OutreachResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(OutreachError::Validation(self.0))
        }
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

impl Validate for EventInput {
    type Output = NewEvent;

    fn validate(&self) -> OutreachResult<NewEvent> {
        let mut v = Violations::default();

        let event_name =
            v.required_text("eventName", self.event_name.as_deref(), "event name is required");

        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_date(raw).or_else(|| {
                v.push("date", "date must be a valid date (YYYY-MM-DD)");
                None
            }),
            _ => {
                v.push("date", "date is required");
                None
            }
        };

        let mut attendees = BTreeSet::new();
        for (i, raw) in self.attendees.iter().flatten().enumerate() {
            match Uuid::parse_str(raw.trim()) {
                Ok(id) => {
                    attendees.insert(id);
                }
                Err(_) => v.push(
                    format!("attendees[{i}]"),
                    "attendee must be a valid client id",
                ),
            }
        }

        v.finish()?;

        Ok(NewEvent {
            event_name,
            description: optional_text(self.description.as_deref()),
            date: date.unwrap_or_default(),
            attendees,
        })
    }
}

impl Validate for ClientInput {
    type Output = NewClient;

    fn validate(&self) -> OutreachResult<NewClient> {
        let mut v = Violations::default();

        let first_name = v.alphabetic_name("firstName", self.first_name.as_deref(), "first name");
        let last_name = v.alphabetic_name("lastName", self.last_name.as_deref(), "last name");

        let email = v.required_text("email", self.email.as_deref(), "email is required");
        if !email.is_empty() && !is_valid_email(&email) {
            v.push("email", "email must be a valid email address");
        }

        let mut phone_numbers = Vec::new();
        for (i, entry) in self.phone_numbers.iter().flatten().enumerate() {
            let field = format!("phoneNumbers[{i}].primaryPhone");
            let primary_phone = v.required_text(
                &field,
                entry.primary_phone.as_deref(),
                "primary phone is required",
            );
            if !primary_phone.is_empty() && !is_valid_phone(&primary_phone) {
                v.push(field, "primary phone must be a valid phone number");
            }

            let secondary_phone = optional_text(entry.secondary_phone.as_deref());
            if let Some(secondary) = &secondary_phone
                && !is_valid_phone(secondary)
            {
                v.push(
                    format!("phoneNumbers[{i}].secondaryPhone"),
                    "secondary phone must be a valid phone number",
                );
            }

            phone_numbers.push(PhoneNumber {
                primary_phone,
                secondary_phone,
            });
        }

        let address = self.address.clone().unwrap_or_default();
        let city = v.required_text("address.city", address.city.as_deref(), "city is required");

        v.finish()?;

        Ok(NewClient {
            first_name,
            last_name,
            email,
            phone_numbers,
            address: Address {
                line1: optional_text(address.line1.as_deref()),
                line2: optional_text(address.line2.as_deref()),
                city,
                county: optional_text(address.county.as_deref()),
                zip: optional_text(address.zip.as_deref()),
            },
        })
    }
}
