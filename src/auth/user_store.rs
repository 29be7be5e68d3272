//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::Usuario;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Raised when a registration collides with an already-registered email.
#[derive(Debug)]
pub struct DuplicateEmail;

impl std::fmt::Display for DuplicateEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "email already registered")
    }
}

impl std::error::Error for DuplicateEmail {}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS usuarios (
                id TEXT PRIMARY KEY,
                nombre TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Create a new user. The email is stored lowercased, so the UNIQUE
    /// constraint makes uniqueness case-insensitive; a collision surfaces as
    /// a downcastable [`DuplicateEmail`].
    pub fn create_user(&self, nombre: &str, email: &str, password: &str) -> Result<Usuario> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let usuario = Usuario {
            id: Uuid::new_v4(),
            nombre: nombre.to_string(),
            email: email.to_lowercase(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        let inserted = conn.execute(
            "INSERT INTO usuarios (id, nombre, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                usuario.id.to_string(),
                usuario.nombre,
                usuario.email,
                usuario.password_hash,
                usuario.created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(anyhow::Error::new(DuplicateEmail));
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert user")),
        }

        info!("✅ Usuario creado: {} ({})", usuario.nombre, usuario.email);

        Ok(usuario)
    }

    /// Get user by email (case-insensitive)
    pub fn find_by_email(&self, email: &str) -> Result<Option<Usuario>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, nombre, email, password_hash, created_at
             FROM usuarios WHERE email = ?1",
        )?;

        let result = stmt.query_row(params![email.to_lowercase()], Self::row_to_usuario);

        match result {
            Ok(usuario) => Ok(Some(usuario)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id
    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<Usuario>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, nombre, email, password_hash, created_at
             FROM usuarios WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![id.to_string()], Self::row_to_usuario);

        match result {
            Ok(usuario) => Ok(Some(usuario)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Compare a supplied password against a stored bcrypt hash.
    pub fn verify_password(&self, usuario: &Usuario, password: &str) -> Result<bool> {
        verify(password, &usuario.password_hash).context("Failed to verify password")
    }

    fn row_to_usuario(row: &rusqlite::Row<'_>) -> rusqlite::Result<Usuario> {
        Ok(Usuario {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            nombre: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
