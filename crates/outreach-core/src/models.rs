//! Domain models for Outreach.
//!
//! Wire names follow the platform's JSON contract (`eventName`,
//! `phoneNumbers`, ...). The tenant field is always `organization_id`.

pub mod client;
pub mod event;
pub mod organization;
