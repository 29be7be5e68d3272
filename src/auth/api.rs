//! Authentication API Endpoints
//! Mission: Registration, login and profile endpoints

use crate::auth::models::{LoginRequest, RegistroRequest, Subject, UsuarioResponse};
use crate::auth::user_store::DuplicateEmail;
use crate::routes::AppState;
use crate::validation::ValidationError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Register a new user - POST /api/auth/registro
///
/// A fresh token is issued immediately so the client lands logged in.
pub async fn registro(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AuthApiError> {
    let req = RegistroRequest::parse(&body)?;

    let existente = state
        .user_store
        .find_by_email(&req.email)
        .map_err(|e| AuthApiError::internal("Error al registrar usuario.", e))?;
    if existente.is_some() {
        return Err(AuthApiError::DuplicateEmail);
    }

    let usuario = match state
        .user_store
        .create_user(&req.nombre, &req.email, &req.contrasena)
    {
        Ok(usuario) => usuario,
        // Backstop for a concurrent registration racing past the pre-check.
        Err(e) if e.downcast_ref::<DuplicateEmail>().is_some() => {
            return Err(AuthApiError::DuplicateEmail)
        }
        Err(e) => return Err(AuthApiError::internal("Error al registrar usuario.", e)),
    };

    let token = state
        .jwt_handler
        .issue(&usuario.id)
        .map_err(|e| AuthApiError::internal("Error al registrar usuario.", e))?;

    info!("✅ Usuario registrado: {}", usuario.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Usuario registrado correctamente.",
            "token": token,
            "usuario": UsuarioResponse::from_usuario(&usuario),
        })),
    ))
}

/// Login - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AuthApiError> {
    let req = LoginRequest::parse(&body)?;

    let usuario = state
        .user_store
        .find_by_email(&req.email)
        .map_err(|e| AuthApiError::internal("Error al iniciar sesión.", e))?
        .ok_or(AuthApiError::UserNotFound)?;

    let valida = state
        .user_store
        .verify_password(&usuario, &req.contrasena)
        .map_err(|e| AuthApiError::internal("Error al iniciar sesión.", e))?;
    if !valida {
        warn!("❌ Intento de login fallido: {}", usuario.email);
        return Err(AuthApiError::BadCredentials);
    }

    let token = state
        .jwt_handler
        .issue(&usuario.id)
        .map_err(|e| AuthApiError::internal("Error al iniciar sesión.", e))?;

    info!("✅ Login exitoso: {}", usuario.email);

    Ok(Json(json!({ "mensaje": "Login exitoso.", "token": token })))
}

/// Current user's profile - GET /api/auth/perfil (protected)
///
/// Re-resolves the token subject against the store: a token can outlive the
/// row it points at.
pub async fn perfil(
    State(state): State<AppState>,
    Extension(Subject(id)): Extension<Subject>,
) -> Result<Json<Value>, AuthApiError> {
    let usuario = state
        .user_store
        .find_by_id(&id)
        .map_err(|e| AuthApiError::internal("Error al obtener perfil.", e))?
        .ok_or(AuthApiError::ProfileNotFound)?;

    Ok(Json(json!({
        "mensaje": "Perfil del usuario.",
        "usuario": UsuarioResponse::from_usuario(&usuario),
    })))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    Validation(ValidationError),
    DuplicateEmail,
    UserNotFound,
    BadCredentials,
    ProfileNotFound,
    Internal { mensaje: &'static str },
}

impl AuthApiError {
    /// Log the real failure; the client only ever sees the generic message.
    fn internal(mensaje: &'static str, err: anyhow::Error) -> Self {
        error!("{mensaje}: {err:#}");
        AuthApiError::Internal { mensaje }
    }
}

impl From<ValidationError> for AuthApiError {
    fn from(err: ValidationError) -> Self {
        AuthApiError::Validation(err)
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, mensaje) = match self {
            AuthApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.mensaje),
            AuthApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "El usuario ya está registrado.".to_string(),
            ),
            AuthApiError::UserNotFound => {
                (StatusCode::BAD_REQUEST, "Usuario no encontrado.".to_string())
            }
            AuthApiError::BadCredentials => (
                StatusCode::BAD_REQUEST,
                "Contraseña incorrecta.".to_string(),
            ),
            AuthApiError::ProfileNotFound => {
                (StatusCode::NOT_FOUND, "Usuario no encontrado.".to_string())
            }
            AuthApiError::Internal { mensaje } => {
                (StatusCode::INTERNAL_SERVER_ERROR, mensaje.to_string())
            }
        };

        (status, Json(json!({ "mensaje": mensaje }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_api_error_responses() {
        let validation: AuthApiError = ValidationError::new("Todos los campos son obligatorios.")
            .into();
        assert_eq!(
            validation.into_response().status(),
            StatusCode::BAD_REQUEST
        );

        let duplicate = AuthApiError::DuplicateEmail.into_response();
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

        let not_found = AuthApiError::ProfileNotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let internal = AuthApiError::Internal {
            mensaje: "Error al registrar usuario.",
        }
        .into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
