//! HTTP error handler for identity-hub.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::application::error::IdentityError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Axum(#[from] JsonRejection),
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Identity(IdentityError::Validation(errors))
    }
}

impl From<crate::domain::error::DomainError> for ServerError {
    fn from(err: crate::domain::error::DomainError) -> Self {
        Self::Identity(err.into())
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Set machine-readable error kind.
    pub fn kind(mut self, kind: &str) -> Self {
        self.r#type = Some(kind.into());
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
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
                .header(header::CONTENT_TYPE, "application/problem+json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields = errors
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
        .collect::<Vec<_>>();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// HTTP status for an identity error.
pub fn status_code(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
        IdentityError::DuplicateEmail => StatusCode::CONFLICT,
        IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        IdentityError::NotFound => StatusCode::NOT_FOUND,
        IdentityError::Storage(_) | IdentityError::Hashing(_) | IdentityError::Token(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = match &self {
            ServerError::Identity(err) => {
                let response = ResponseError::default()
                    .kind(err.kind())
                    .status(status_code(err))
                    .details(&err.to_string());

                match err {
                    IdentityError::Validation(errors) => response
                        .title("There were validation errors with your request.")
                        .errors(errors),
                    IdentityError::DuplicateEmail => response.title("Email already in use."),
                    IdentityError::InvalidCredentials => response.title("Invalid credentials."),
                    IdentityError::NotFound => response.title("User not found."),
                    IdentityError::Storage(_)
                    | IdentityError::Hashing(_)
                    | IdentityError::Token(_) => {
                        tracing::error!(error = ?err, "server returned 500 status");

                        ResponseError::default().kind(err.kind())
                    },
                }
            },

            ServerError::Axum(rejection) => ResponseError::default()
                .kind("VALIDATION_ERROR")
                .title("Server error during data parsing.")
                .details(&rejection.body_text())
                .status(StatusCode::BAD_REQUEST),
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/problem+json")
        .body(
            serde_json::json!({
                "type": "INTERNAL_SERVER_ERROR",
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (IdentityError::DuplicateEmail, StatusCode::CONFLICT),
            (IdentityError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (IdentityError::NotFound, StatusCode::NOT_FOUND),
            (
                IdentityError::field("email", "email", "Email must be formatted."),
                StatusCode::BAD_REQUEST,
            ),
            (
                IdentityError::Hashing("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ServerError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_fields() {
        let err = IdentityError::field("email", "email", "Email must be formatted.");
        let IdentityError::Validation(errors) = err else {
            unreachable!()
        };

        let fields = parse_validation_errors(&errors);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].message, "Email must be formatted.");
    }
}
