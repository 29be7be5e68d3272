//! Integration tests for the expense tracker API
//!
//! Drives the full router in-process: registration, login, token handling and
//! the ownership-scoped expense CRUD flow.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use gastos_backend::{
    auth::{JwtHandler, UserStore},
    gastos::GastoStore,
    routes::{create_router, AppState},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str = "test-secret-key-12345";

fn test_app() -> (Router, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap();

    let state = AppState {
        user_store: Arc::new(UserStore::new(db_path).unwrap()),
        gastos: Arc::new(GastoStore::new(db_path).unwrap()),
        jwt_handler: Arc::new(JwtHandler::new(TEST_SECRET.to_string())),
    };

    (create_router(state, "http://localhost:3000"), temp_file)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn registrar(
    app: &Router,
    nombre: &str,
    email: &str,
    contrasena: &str,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/registro",
        None,
        Some(json!({ "nombre": nombre, "email": email, "contraseña": contrasena })),
    )
    .await
}

async fn token_de(app: &Router, nombre: &str, email: &str) -> String {
    let (status, body) = registrar(app, nombre, email, "password1").await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_scenario() {
    let (app, _temp) = test_app();

    // Register Ana and get a token right away.
    let (status, body) = registrar(&app, "Ana", "ana@x.com", "password1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["mensaje"], "Usuario registrado correctamente.");
    assert!(body["token"].is_string());
    assert_eq!(body["usuario"]["nombre"], "Ana");
    assert_eq!(body["usuario"]["email"], "ana@x.com");
    assert!(body["usuario"].get("contraseña").is_none());
    assert!(body["usuario"].get("password_hash").is_none());

    // Login with a differently-cased email.
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@X.com", "contraseña": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Login exitoso.");
    let token = body["token"].as_str().unwrap().to_string();

    // Create an expense.
    let (status, gasto) = send(
        &app,
        "POST",
        "/api/gastos",
        Some(&token),
        Some(json!({
            "nombre": "Coffee",
            "monto": 5,
            "fecha": "2024-01-01",
            "categoria": "Otros"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(gasto["nombre"], "Coffee");
    assert_eq!(gasto["monto"], 5.0);
    assert_eq!(gasto["fecha"], "2024-01-01");
    assert_eq!(gasto["categoria"], "Otros");
    assert_eq!(gasto["completado"], false);
    let gasto_id = gasto["id"].as_str().unwrap().to_string();

    // It shows up in the list.
    let (status, lista) = send(&app, "GET", "/api/gastos", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lista.as_array().unwrap().len(), 1);
    assert_eq!(lista[0]["id"], gasto_id.as_str());

    // Delete it and the list is empty again.
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/gastos/{gasto_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Gasto eliminado correctamente.");

    let (status, lista) = send(&app, "GET", "/api/gastos", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lista, json!([]));
}

#[tokio::test]
async fn test_registro_validation_and_duplicates() {
    let (app, _temp) = test_app();

    // Missing fields.
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/registro",
        None,
        Some(json!({ "nombre": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "Todos los campos son obligatorios.");

    // Non-string field.
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/registro",
        None,
        Some(json!({ "nombre": "Ana", "email": 42, "contraseña": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["mensaje"],
        "Formato inválido. Todos los datos deben ser texto."
    );

    // Malformed email.
    let (status, _) = registrar(&app, "Ana", "no-es-un-email", "password1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Duplicate email, case-insensitive on the second attempt.
    let (status, _) = registrar(&app, "Ana", "ana@x.com", "password1").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = registrar(&app, "Otra Ana", "ANA@X.COM", "password2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "El usuario ya está registrado.");
}

#[tokio::test]
async fn test_login_failures() {
    let (app, _temp) = test_app();
    registrar(&app, "Ana", "ana@x.com", "password1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nadie@x.com", "contraseña": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "Usuario no encontrado.");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@x.com", "contraseña": "incorrecta" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "Contraseña incorrecta.");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "Todos los campos son obligatorios.");
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let (app, _temp) = test_app();

    // No token at all.
    let (status, body) = send(&app, "GET", "/api/gastos", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["mensaje"], "Token no proporcionado.");

    // Garbage token.
    let (status, body) = send(&app, "GET", "/api/gastos", Some("basura"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["mensaje"], "Token inválido.");

    // Token signed with a different secret.
    let foreign = JwtHandler::new("otro-secreto".to_string())
        .issue(&Uuid::new_v4())
        .unwrap();
    let (status, _) = send(&app, "GET", "/api/gastos", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_perfil() {
    let (app, _temp) = test_app();
    let token = token_de(&app, "Ana", "ana@x.com").await;

    let (status, body) = send(&app, "GET", "/api/auth/perfil", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Perfil del usuario.");
    assert_eq!(body["usuario"]["email"], "ana@x.com");

    // A valid token whose subject no longer exists resolves to 404.
    let ghost = JwtHandler::new(TEST_SECRET.to_string())
        .issue(&Uuid::new_v4())
        .unwrap();
    let (status, body) = send(&app, "GET", "/api/auth/perfil", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensaje"], "Usuario no encontrado.");
}

#[tokio::test]
async fn test_cross_user_isolation() {
    let (app, _temp) = test_app();
    let token_a = token_de(&app, "Ana", "ana@x.com").await;
    let token_b = token_de(&app, "Beto", "beto@x.com").await;

    let (_, gasto) = send(
        &app,
        "POST",
        "/api/gastos",
        Some(&token_a),
        Some(json!({ "nombre": "Cena", "monto": 30, "categoria": "Alimentación" })),
    )
    .await;
    let gasto_id = gasto["id"].as_str().unwrap().to_string();

    // B sees nothing and cannot touch A's record; the response never reveals
    // that the record exists.
    let (status, lista) = send(&app, "GET", "/api/gastos", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lista, json!([]));

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/gastos/{gasto_id}"),
        Some(&token_b),
        Some(json!({ "monto": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["mensaje"],
        "Gasto no encontrado o no pertenece al usuario."
    );

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/gastos/{gasto_id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A's record is untouched.
    let (_, lista) = send(&app, "GET", "/api/gastos", Some(&token_a), None).await;
    assert_eq!(lista.as_array().unwrap().len(), 1);
    assert_eq!(lista[0]["monto"], 30.0);
}

#[tokio::test]
async fn test_create_validation() {
    let (app, _temp) = test_app();
    let token = token_de(&app, "Ana", "ana@x.com").await;

    for monto in [json!(0), json!(-5), json!("no-numerico")] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/gastos",
            Some(&token),
            Some(json!({ "nombre": "Café", "monto": monto })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["mensaje"], "El monto debe ser un número mayor que 0.");
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/gastos",
        Some(&token),
        Some(json!({ "nombre": "   ", "monto": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "El nombre del gasto es obligatorio.");

    let (status, body) = send(
        &app,
        "POST",
        "/api/gastos",
        Some(&token),
        Some(json!({ "nombre": "Café", "monto": 5, "categoria": "Lujos" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensaje"], "Categoría inválida.");

    // Omitted optional fields take their defaults.
    let (status, gasto) = send(
        &app,
        "POST",
        "/api/gastos",
        Some(&token),
        Some(json!({ "nombre": "Café", "monto": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(gasto["categoria"], "Otros");
    assert_eq!(gasto["completado"], false);
    assert!(gasto["fecha"].is_string());
}

#[tokio::test]
async fn test_update_partial_fields() {
    let (app, _temp) = test_app();
    let token = token_de(&app, "Ana", "ana@x.com").await;

    let (_, gasto) = send(
        &app,
        "POST",
        "/api/gastos",
        Some(&token),
        Some(json!({
            "nombre": "Cine",
            "monto": 12,
            "fecha": "2024-02-10",
            "categoria": "Entretenimiento"
        })),
    )
    .await;
    let gasto_id = gasto["id"].as_str().unwrap().to_string();

    // Change only the amount and mark it completed.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/gastos/{gasto_id}"),
        Some(&token),
        Some(json!({ "monto": 15.5, "completado": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Gasto actualizado correctamente.");

    let (_, lista) = send(&app, "GET", "/api/gastos", Some(&token), None).await;
    assert_eq!(lista[0]["monto"], 15.5);
    assert_eq!(lista[0]["completado"], true);
    assert_eq!(lista[0]["nombre"], "Cine");
    assert_eq!(lista[0]["fecha"], "2024-02-10");
    assert_eq!(lista[0]["categoria"], "Entretenimiento");

    // Invalid values on provided fields are rejected.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/gastos/{gasto_id}"),
        Some(&token),
        Some(json!({ "monto": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A non-UUID id is indistinguishable from a missing record.
    let (status, _) = send(
        &app,
        "PUT",
        "/api/gastos/no-es-uuid",
        Some(&token),
        Some(json!({ "monto": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let (app, _temp) = test_app();

    let (status, body) = send(&app, "GET", "/api/desconocida", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensaje"], "Ruta no encontrada.");

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
