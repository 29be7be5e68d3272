//! Control de Gastos - Expense Tracker Backend
//! Mission: JWT-authenticated users managing their personal expense ledger

use anyhow::{Context, Result};
use dotenv::dotenv;
use gastos_backend::{
    auth::{JwtHandler, UserStore},
    gastos::GastoStore,
    models::Config,
    routes::{create_router, AppState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    // Init order matters: config, then stores, then the token service.
    let user_store = Arc::new(UserStore::new(&config.database_path)?);
    let gastos = Arc::new(GastoStore::new(&config.database_path)?);
    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));

    info!(
        "🔐 Autenticación inicializada, base de datos en: {}",
        config.database_path
    );

    let state = AppState {
        user_store,
        gastos,
        jwt_handler,
    };
    let app = create_router(state, &config.client_url);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 Servidor corriendo en el puerto {}.", config.port);
    info!(
        "📌 API de autenticación disponible en: http://localhost:{}/api/auth",
        config.port
    );
    info!(
        "📌 API de gastos disponible en: http://localhost:{}/api/gastos",
        config.port
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gastos_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
