//! Error handler for accounts.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("missing email or password")]
    MissingCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("no user matches these credentials")]
    InvalidCredentials,

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),
}

impl ServerError {
    /// HTTP status sent back to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Axum(rejection) if transport_rejection(rejection) => rejection.status(),
            ServerError::Validation(_)
            | ServerError::Axum(_)
            | ServerError::MissingCredentials => StatusCode::BAD_REQUEST,
            ServerError::EmailTaken => StatusCode::CONFLICT,
            ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::Sql(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Never contains internal details.
    fn message(&self) -> &'static str {
        match self {
            ServerError::Axum(rejection) if transport_rejection(rejection) => {
                match rejection.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => "Payload too large.",
                    _ => "Content-Type must be application/json.",
                }
            },
            ServerError::Validation(_) | ServerError::Axum(_) => "Incomplete data.",
            ServerError::MissingCredentials => "Email and password are required.",
            ServerError::EmailTaken => "Email already registered.",
            ServerError::InvalidCredentials => "Invalid credentials.",
            ServerError::Sql(_) => "Internal server error.",
        }
    }

    /// Body could not be read at all: too large or not JSON.
    pub fn is_transport(&self) -> bool {
        matches!(self, ServerError::Axum(rejection) if transport_rejection(rejection))
    }

    /// Render this error without the `success` flag.
    pub fn bare(self) -> BareError {
        BareError(self)
    }

    fn to_response_error(&self) -> ResponseError {
        let response = ResponseError::default()
            .status(self.status())
            .message(self.message());

        match self {
            ServerError::Validation(errors) => response.errors(errors),
            ServerError::Sql(err) => {
                tracing::error!(error = %err, "server returned 500 status");
                response
            },
            _ => response,
        }
    }
}

/// Rejections about the request envelope rather than its fields.
fn transport_rejection(rejection: &JsonRejection) -> bool {
    matches!(
        rejection.status(),
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE
    )
}

/// Error body of the `/login` route: same statuses, no `success` flag.
#[derive(Debug)]
pub struct BareError(pub ServerError);

impl From<ServerError> for BareError {
    fn from(err: ServerError) -> Self {
        Self(err)
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip)]
    status: u16,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `message` field.
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }

    /// Drop the `success` field from the body.
    pub fn without_flag(mut self) -> Self {
        self.success = None;
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            success: Some(false),
            message: "Internal server error.".to_owned(),
            errors: None,
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.to_response_error()
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

impl IntoResponse for BareError {
    fn into_response(self) -> Response {
        self.0
            .to_response_error()
            .without_flag()
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "success": false,
                "message": "Internal server error.",
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
