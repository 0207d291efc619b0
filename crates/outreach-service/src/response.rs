//! Mapping of service outcomes onto the HTTP response contract.
//!
//! - success: `200` with the JSON value (`null` for an absent record)
//! - validation failure: `422` with `[{field, message}, ...]`
//! - store failure: `500` with `{"msg": "database error"}`
//! - anything else: `500` with a generic `msg`
//!
//! Internal causes are logged here and never written to the body.

use http::StatusCode;
use outreach_core::error::{OutreachError, OutreachResult};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Status code and JSON body for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn server_error(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "msg": msg }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// Convert a service result into its response.
pub fn respond<T: Serialize>(result: OutreachResult<T>) -> ApiResponse {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(body) => ApiResponse {
                status: StatusCode::OK,
                body,
            },
            Err(e) => {
                error!(error = %e, "response serialization failed");
                ApiResponse::server_error("internal error")
            }
        },
        Err(OutreachError::Validation(violations)) => ApiResponse {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!(violations),
        },
        Err(OutreachError::Database(cause)) => {
            error!(%cause, "store failure");
            ApiResponse::server_error("database error")
        }
        Err(err @ (OutreachError::TenantContext(_) | OutreachError::Configuration(_))) => {
            error!(error = %err, "server misconfigured");
            ApiResponse::server_error("server configuration error")
        }
        Err(OutreachError::Internal(cause)) => {
            error!(%cause, "internal failure");
            ApiResponse::server_error("internal error")
        }
    }
}
