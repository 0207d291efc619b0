//! Outreach Core — domain models, tenant scoping, validation and query
//! building for the multi-tenant client/event platform.
//!
//! This crate performs no I/O. Persistence lives behind the
//! [`repository`] traits, implemented by `outreach-db`.

pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod tenant;
pub mod validation;

pub use error::{OutreachError, OutreachResult};
pub use tenant::TenantContext;
