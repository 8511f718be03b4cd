use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::config::is_valid_token_format;
use crate::error::unauthorized_response;
use crate::models::Principal;

/// The user a request acts as, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

/// Authentication middleware that validates Bearer tokens
///
/// Expects tokens in the `Authorization` header as `Bearer <token>`.
/// Tokens must be at least 32 characters and contain only alphanumeric characters, hyphens, and underscores.
/// Each configured token maps to a user id; the user must exist in the store.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_str = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => return unauthorized_response("Invalid Authorization header format."),
        },
        None => {
            return unauthorized_response(
                "Missing Authorization header. Please provide a Bearer token.",
            )
        }
    };

    let provided_token = match auth_str.strip_prefix("Bearer ") {
        Some(token) => token.trim(),
        None => {
            return unauthorized_response(
                "Authorization header must use Bearer scheme (e.g., 'Authorization: Bearer <token>').",
            )
        }
    };

    if !is_valid_token_format(provided_token) {
        return unauthorized_response("Invalid token format.");
    }

    let user_id = match state.config.user_for_token(provided_token) {
        Some(user_id) => user_id.to_string(),
        None => return unauthorized_response("Invalid or expired token."),
    };

    let principal = match state.store.principal(&user_id).await {
        Ok(Some(principal)) if principal.is_user() => principal,
        Ok(_) => {
            tracing::warn!("Token of unknown user {} rejected", user_id);
            return unauthorized_response("Invalid or expired token.");
        }
        Err(e) => {
            tracing::error!("Failed to load user {}: {}", user_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                json!({
                    "error": "Internal Server Error",
                    "message": "Authentication is not properly configured on the server."
                })
                .to_string(),
            )
                .into_response();
        }
    };

    request.extensions_mut().insert(CurrentUser(principal));
    next.run(request).await
}
