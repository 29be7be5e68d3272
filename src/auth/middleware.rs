//! Access Middleware
//! Mission: Protect API routes with bearer-token verification

use crate::auth::{jwt::JwtHandler, models::Subject};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Validates the `Authorization: Bearer <token>` header on protected routes.
///
/// On success the resolved subject id is attached to the request extensions.
/// The middleware trusts the token's encoded identity and performs no store
/// lookup; handlers that need the user row re-resolve it themselves.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AuthError::MissingToken)?;

    let claims = jwt_handler
        .verify(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    // Our tokens always carry a UUID subject; anything else is not ours.
    let subject = claims.subject().ok_or(AuthError::InvalidToken)?;

    req.extensions_mut().insert(Subject(subject));

    Ok(next.run(req).await)
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, mensaje) = match self {
            AuthError::MissingToken => (StatusCode::FORBIDDEN, "Token no proporcionado."),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token inválido."),
        };

        (status, Json(json!({ "mensaje": mensaje }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::FORBIDDEN);

        let invalid = AuthError::InvalidToken.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    }
}
