//! Expense API Endpoints
//! Mission: Ownership-scoped CRUD handlers for the expense ledger

use crate::auth::models::Subject;
use crate::gastos::models::{Gasto, GastoInput, GastoUpdate};
use crate::routes::AppState;
use crate::validation::ValidationError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

/// List the caller's expenses - GET /api/gastos
///
/// An empty ledger is an empty array, not an error.
pub async fn listar(
    State(state): State<AppState>,
    Extension(Subject(owner)): Extension<Subject>,
) -> Result<Json<Vec<Gasto>>, GastoApiError> {
    let gastos = state
        .gastos
        .list_by_owner(&owner)
        .map_err(|e| GastoApiError::internal("Error al obtener los gastos.", e))?;

    Ok(Json(gastos))
}

/// Create an expense - POST /api/gastos
pub async fn crear(
    State(state): State<AppState>,
    Extension(Subject(owner)): Extension<Subject>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Gasto>), GastoApiError> {
    let input = GastoInput::parse(&body)?;

    let gasto = state
        .gastos
        .create(&owner, input)
        .map_err(|e| GastoApiError::internal("Error al crear el gasto.", e))?;

    Ok((StatusCode::CREATED, Json(gasto)))
}

/// Update an expense - PUT /api/gastos/:id
pub async fn actualizar(
    State(state): State<AppState>,
    Extension(Subject(owner)): Extension<Subject>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, GastoApiError> {
    // Unparseable ids behave like missing records so existence never leaks.
    let id = Uuid::parse_str(&id).map_err(|_| GastoApiError::NotFound)?;
    let cambios = GastoUpdate::parse(&body)?;

    state
        .gastos
        .update(&id, &owner, &cambios)
        .map_err(|e| GastoApiError::internal("Error al actualizar el gasto.", e))?
        .ok_or(GastoApiError::NotFound)?;

    Ok(Json(json!({ "mensaje": "Gasto actualizado correctamente." })))
}

/// Delete an expense - DELETE /api/gastos/:id
pub async fn eliminar(
    State(state): State<AppState>,
    Extension(Subject(owner)): Extension<Subject>,
    Path(id): Path<String>,
) -> Result<Json<Value>, GastoApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| GastoApiError::NotFound)?;

    let eliminado = state
        .gastos
        .delete(&id, &owner)
        .map_err(|e| GastoApiError::internal("Error al eliminar el gasto.", e))?;
    if !eliminado {
        return Err(GastoApiError::NotFound);
    }

    Ok(Json(json!({ "mensaje": "Gasto eliminado correctamente." })))
}

/// Expense API errors
#[derive(Debug)]
pub enum GastoApiError {
    Validation(ValidationError),
    NotFound,
    Internal { mensaje: &'static str },
}

impl GastoApiError {
    /// Log the real failure; the client only ever sees the generic message.
    fn internal(mensaje: &'static str, err: anyhow::Error) -> Self {
        error!("{mensaje}: {err:#}");
        GastoApiError::Internal { mensaje }
    }
}

impl From<ValidationError> for GastoApiError {
    fn from(err: ValidationError) -> Self {
        GastoApiError::Validation(err)
    }
}

impl IntoResponse for GastoApiError {
    fn into_response(self) -> Response {
        let (status, mensaje) = match self {
            GastoApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.mensaje),
            GastoApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "Gasto no encontrado o no pertenece al usuario.".to_string(),
            ),
            GastoApiError::Internal { mensaje } => {
                (StatusCode::INTERNAL_SERVER_ERROR, mensaje.to_string())
            }
        };

        (status, Json(json!({ "mensaje": mensaje }))).into_response()
    }
}
