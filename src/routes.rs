//! HTTP Router Assembly
//! Mission: Compose public, auth and protected route trees over shared state

use crate::auth::{api as auth_api, auth_middleware, JwtHandler, UserStore};
use crate::gastos::{api as gastos_api, GastoStore};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,
    pub gastos: Arc<GastoStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

/// Create the API router
pub fn create_router(state: AppState, client_url: &str) -> Router {
    // Auth routes issue tokens; no middleware in front of them.
    let auth_routes = Router::new()
        .route("/api/auth/registro", post(auth_api::registro))
        .route("/api/auth/login", post(auth_api::login));

    // Everything behind the access middleware.
    let protected_routes = Router::new()
        .route("/api/auth/perfil", get(auth_api::perfil))
        .route(
            "/api/gastos",
            get(gastos_api::listar).post(gastos_api::crear),
        )
        .route(
            "/api/gastos/:id",
            put(gastos_api::actualizar).delete(gastos_api::eliminar),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt_handler.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .fallback(ruta_no_encontrada)
        .layer(cors_layer(client_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured client origin.
fn cors_layer(client_url: &str) -> CorsLayer {
    let origin = client_url
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// JSON 404 for unknown routes, same envelope as every other response.
async fn ruta_no_encontrada() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "mensaje": "Ruta no encontrada." })),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
