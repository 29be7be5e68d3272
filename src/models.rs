//! Application Configuration
//! Mission: Collect every runtime knob from the environment in one place

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
    pub client_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./gastos.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .unwrap_or(3001);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            "dev-secret-change-in-production-minimum-32-characters".to_string()
        });

        let client_url =
            std::env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            client_url,
        })
    }
}
