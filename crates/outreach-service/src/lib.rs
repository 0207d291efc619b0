//! Outreach Service — request-level orchestration of scoped record
//! access.
//!
//! Each service mirrors one resource of the HTTP surface. Services are
//! generic over the `outreach-core` repository traits so that this crate
//! has no dependency on the database crate.

pub mod clients;
pub mod config;
pub mod events;
pub mod organizations;
pub mod response;

pub use clients::ClientService;
pub use config::ServiceConfig;
pub use events::EventService;
pub use organizations::OrganizationService;
pub use response::{ApiResponse, respond};
