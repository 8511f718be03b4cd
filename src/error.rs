use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::access::AccessError;
use crate::export::ExportError;
use crate::forms::ValidationError;
use crate::ordering::OrderingError;
use crate::store::StoreError;

/// Error returned by request handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Domain(String),
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage {
    status: u16,
    title: String,
    message: String,
    field: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Access(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Domain(_) => StatusCode::CONFLICT,
            AppError::Ordering(OrderingError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Ordering(OrderingError::OutOfRange { .. }) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Export(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid value",
            AppError::Access(AccessError::Forbidden) => "Modification forbidden",
            AppError::Access(AccessError::EventForbidden) => "Access denied",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) | AppError::Ordering(OrderingError::NotFound(_)) => "Not found",
            AppError::Domain(_) => "Action not possible",
            AppError::Ordering(_) => "Invalid position",
            AppError::Store(_) | AppError::Export(_) | AppError::Template(_) => "Internal error",
        }
    }
}

/// JSON body used for authentication failures
pub fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "error": "Unauthorized",
            "message": message
        })
        .to_string(),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Unauthorized(message) = &self {
            return unauthorized_response(message);
        }

        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "The server could not complete the request.".to_string()
        } else {
            if status == StatusCode::FORBIDDEN {
                tracing::warn!("Request denied: {}", self);
            }
            match &self {
                AppError::Validation(e) => e.message.clone(),
                other => other.to_string(),
            }
        };

        let page = ErrorPage {
            status: status.as_u16(),
            title: self.title().to_string(),
            message,
            field: match &self {
                AppError::Validation(e) => Some(e.field.clone()),
                _ => None,
            },
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Template error: {}", e);
                (status, page.message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(ValidationError::new("durationHours", "bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::from(AccessError::Forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::from(OrderingError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(OrderingError::OutOfRange { position: 9, len: 2 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Domain("closed".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(ExportError::Pdf("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_is_json() {
        let response = AppError::Unauthorized("Invalid or expired token.".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_forbidden_page() {
        let response = AppError::from(AccessError::Forbidden).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }
}
