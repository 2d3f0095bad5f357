//! Defines the app level error type and its conversion to JSON responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// A problem with a single field of a client request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// The name of the offending field as the client sent it, e.g. "amount".
    pub field: &'static str,
    /// A human readable description of what is wrong with the field.
    pub message: String,
}

impl FieldError {
    /// Create a new error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request could not be decoded into the expected shape.
    ///
    /// Each entry describes one field that failed validation.
    #[error("invalid request: {}", describe_fields(.0))]
    Validation(Vec<FieldError>),

    /// The session cookie is missing from a request to a route that requires
    /// an established session.
    #[error("no session cookie in the request")]
    Unauthorized,

    /// The requested route does not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The amounts of a session's transactions add up to a number too large
    /// to represent.
    #[error("the sum of the transactions is out of range")]
    SumOutOfRange,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl Error {
    /// Shortcut for a validation error on a single field.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation(vec![FieldError::new(field, message)])
    }
}

fn describe_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "the request is invalid",
                    "fields": fields,
                })),
            )
                .into_response(),
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "a session cookie is required" })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "the requested resource could not be found" })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
