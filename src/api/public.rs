//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::meetings::{ErrorKind, ProvisionError, SchedulingError};

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        let Some(err) = self.0.downcast_ref::<SchedulingError>() else {
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal");
        };
        match err {
            SchedulingError::Provision(ProvisionError::ReauthorizationRequired { .. }) => {
                (StatusCode::UNAUTHORIZED, "reauthorization_required")
            }
            SchedulingError::Provision(ProvisionError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "collaborator")
            }
            err => match err.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, "validation"),
                ErrorKind::Authorization => (StatusCode::FORBIDDEN, "authorization"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
                ErrorKind::Collaborator => (StatusCode::BAD_GATEWAY, "collaborator"),
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::warn!("{}", self.0);
        }

        let mut body = json!({
            "error": kind,
            "message": self.0.to_string(),
        });
        if let Some(SchedulingError::Provision(ProvisionError::ReauthorizationRequired {
            auth_url,
        })) = self.0.downcast_ref::<SchedulingError>()
        {
            body["auth_url"] = json!(auth_url);
        }

        (status, Json(body)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` or `Result<_, SchedulingError>` to turn them into
/// `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod meetings {
    pub use crate::api::routes::meetings::public::*;
}
