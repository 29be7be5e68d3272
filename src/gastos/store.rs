//! Expense Storage
//! Mission: Ownership-scoped expense persistence over SQLite
//!
//! Uses WAL mode and cached prepared statements. Every read or write against
//! a single record filters by both record id and owner id, so a record owned
//! by someone else is indistinguishable from a missing one.

use crate::gastos::models::{Categoria, Gasto, GastoInput, GastoUpdate};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Schema for the expense ledger. The owner column references usuarios(id)
/// as a weak link: it is only ever used for filtering, never cascaded.
const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS gastos (
    id TEXT PRIMARY KEY,
    nombre TEXT NOT NULL,
    monto REAL NOT NULL,
    fecha TEXT NOT NULL,
    categoria TEXT NOT NULL,
    completado INTEGER NOT NULL DEFAULT 0,
    usuario_id TEXT NOT NULL REFERENCES usuarios(id),
    created_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_gastos_usuario
    ON gastos(usuario_id, created_at, id);
"#;

/// Expense storage with SQLite backend
pub struct GastoStore {
    conn: Arc<Mutex<Connection>>,
}

impl GastoStore {
    /// Open (or create) the database and initialize the expense schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // locking handled by the Mutex around the connection

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize expense schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();
        if journal_mode.to_lowercase() != "wal" {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        info!("📊 Expense store initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new expense owned by `usuario_id`.
    pub fn create(&self, usuario_id: &Uuid, input: GastoInput) -> Result<Gasto> {
        let gasto = Gasto {
            id: Uuid::new_v4(),
            nombre: input.nombre,
            monto: input.monto,
            fecha: input.fecha,
            categoria: input.categoria,
            completado: input.completado,
            usuario_id: *usuario_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO gastos (id, nombre, monto, fecha, categoria, completado, usuario_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                gasto.id.to_string(),
                gasto.nombre,
                gasto.monto,
                gasto.fecha.to_string(),
                gasto.categoria.as_str(),
                gasto.completado,
                gasto.usuario_id.to_string(),
                gasto.created_at,
            ],
        )
        .context("Failed to insert expense")?;

        Ok(gasto)
    }

    /// All expenses owned by a user, in storage order.
    ///
    /// created_at carries an RFC 3339 timestamp so lexicographic order is
    /// chronological; id breaks ties deterministically.
    pub fn list_by_owner(&self, usuario_id: &Uuid) -> Result<Vec<Gasto>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare_cached(
            "SELECT id, nombre, monto, fecha, categoria, completado, usuario_id, created_at
             FROM gastos
             WHERE usuario_id = ?1
             ORDER BY created_at, id",
        )?;

        let gastos = stmt
            .query_map(params![usuario_id.to_string()], Self::row_to_gasto)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(gastos)
    }

    /// Fetch a single owned expense.
    pub fn get(&self, id: &Uuid, usuario_id: &Uuid) -> Result<Option<Gasto>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare_cached(
            "SELECT id, nombre, monto, fecha, categoria, completado, usuario_id, created_at
             FROM gastos WHERE id = ?1 AND usuario_id = ?2",
        )?;

        let result = stmt.query_row(
            params![id.to_string(), usuario_id.to_string()],
            Self::row_to_gasto,
        );

        match result {
            Ok(gasto) => Ok(Some(gasto)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update to an owned expense. Returns the updated record,
    /// or `None` when no matching owned record exists.
    pub fn update(
        &self,
        id: &Uuid,
        usuario_id: &Uuid,
        cambios: &GastoUpdate,
    ) -> Result<Option<Gasto>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare_cached(
            "SELECT id, nombre, monto, fecha, categoria, completado, usuario_id, created_at
             FROM gastos WHERE id = ?1 AND usuario_id = ?2",
        )?;
        let existing = match stmt.query_row(
            params![id.to_string(), usuario_id.to_string()],
            Self::row_to_gasto,
        ) {
            Ok(gasto) => gasto,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let gasto = Gasto {
            id: existing.id,
            nombre: cambios.nombre.clone().unwrap_or(existing.nombre),
            monto: cambios.monto.unwrap_or(existing.monto),
            fecha: cambios.fecha.unwrap_or(existing.fecha),
            categoria: cambios.categoria.unwrap_or(existing.categoria),
            completado: cambios.completado.unwrap_or(existing.completado),
            usuario_id: existing.usuario_id,
            created_at: existing.created_at,
        };

        conn.execute(
            "UPDATE gastos SET nombre = ?1, monto = ?2, fecha = ?3, categoria = ?4, completado = ?5
             WHERE id = ?6 AND usuario_id = ?7",
            params![
                gasto.nombre,
                gasto.monto,
                gasto.fecha.to_string(),
                gasto.categoria.as_str(),
                gasto.completado,
                gasto.id.to_string(),
                gasto.usuario_id.to_string(),
            ],
        )
        .context("Failed to update expense")?;

        Ok(Some(gasto))
    }

    /// Delete an owned expense. Returns false when nothing matched.
    pub fn delete(&self, id: &Uuid, usuario_id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();

        let changes = conn
            .execute(
                "DELETE FROM gastos WHERE id = ?1 AND usuario_id = ?2",
                params![id.to_string(), usuario_id.to_string()],
            )
            .context("Failed to delete expense")?;

        Ok(changes > 0)
    }

    fn row_to_gasto(row: &rusqlite::Row<'_>) -> rusqlite::Result<Gasto> {
        let fecha: String = row.get(3)?;
        let categoria: String = row.get(4)?;

        Ok(Gasto {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            nombre: row.get(1)?,
            monto: row.get(2)?,
            fecha: NaiveDate::parse_from_str(&fecha, "%Y-%m-%d").unwrap(),
            categoria: Categoria::from_str(&categoria).unwrap_or(Categoria::Otros),
            completado: row.get(5)?,
            usuario_id: Uuid::parse_str(&row.get::<_, String>(6)?).unwrap(),
            created_at: row.get(7)?,
        })
    }
}
