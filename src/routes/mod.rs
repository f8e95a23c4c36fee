//! JSON back-office endpoints.
//!
//! Every response is an object with a `success` flag; failures add a
//! `message`. Handlers check the session before reading the body.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::{ActionEnvelope, EnvelopeError};
use crate::services::ServiceError;

pub mod addons;
pub mod discounts;
pub mod images;
pub mod orders;
pub mod vehicles;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Schema(_) | ServiceError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        failure_body(self.status_code(), &self.to_string())
    }
}

impl ResponseError for EnvelopeError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        failure_body(self.status_code(), &self.to_string())
    }
}

fn failure_body(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "message": message,
    }))
}

/// Renders a service failure, logging the ones the client cannot fix.
pub(crate) fn failure(context: &str, err: ServiceError) -> HttpResponse {
    if err.status_code().is_server_error() {
        log::error!("Failed to {context}: {err}");
    }
    err.error_response()
}

/// `401` unless the request carries a session.
pub(crate) fn require_user(
    user: Option<AuthenticatedUser>,
) -> Result<AuthenticatedUser, HttpResponse> {
    user.ok_or_else(|| ServiceError::Unauthorized.error_response())
}

/// Parses the body and checks its action against `supported`.
pub(crate) fn parse_action(
    body: &[u8],
    supported: &[&str],
) -> Result<ActionEnvelope, HttpResponse> {
    let envelope = ActionEnvelope::parse(body).map_err(|err| err.error_response())?;
    if !supported.contains(&envelope.action.as_str()) {
        return Err(EnvelopeError::UnsupportedAction.error_response());
    }
    Ok(envelope)
}
