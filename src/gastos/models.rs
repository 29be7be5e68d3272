//! Expense Models
//! Mission: Expense record and request payload data structures

use crate::validation::{self, StrField, ValidationError};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Expense categories offered by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Categoria {
    #[serde(rename = "Alimentación")]
    Alimentacion,
    #[serde(rename = "Transporte")]
    Transporte,
    #[serde(rename = "Vivienda")]
    Vivienda,
    #[serde(rename = "Entretenimiento")]
    Entretenimiento,
    #[serde(rename = "Salud")]
    Salud,
    #[serde(rename = "Educación")]
    Educacion,
    #[serde(rename = "Ropa y accesorios")]
    RopaYAccesorios,
    #[serde(rename = "Viajes")]
    Viajes,
    #[serde(rename = "Otros")]
    Otros,
}

impl Categoria {
    pub fn as_str(&self) -> &'static str {
        match self {
            Categoria::Alimentacion => "Alimentación",
            Categoria::Transporte => "Transporte",
            Categoria::Vivienda => "Vivienda",
            Categoria::Entretenimiento => "Entretenimiento",
            Categoria::Salud => "Salud",
            Categoria::Educacion => "Educación",
            Categoria::RopaYAccesorios => "Ropa y accesorios",
            Categoria::Viajes => "Viajes",
            Categoria::Otros => "Otros",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Alimentación" => Some(Categoria::Alimentacion),
            "Transporte" => Some(Categoria::Transporte),
            "Vivienda" => Some(Categoria::Vivienda),
            "Entretenimiento" => Some(Categoria::Entretenimiento),
            "Salud" => Some(Categoria::Salud),
            "Educación" => Some(Categoria::Educacion),
            "Ropa y accesorios" => Some(Categoria::RopaYAccesorios),
            "Viajes" => Some(Categoria::Viajes),
            "Otros" => Some(Categoria::Otros),
            _ => None,
        }
    }
}

/// A single expense record, always owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gasto {
    pub id: Uuid,
    pub nombre: String,
    pub monto: f64,
    pub fecha: NaiveDate,
    pub categoria: Categoria,
    pub completado: bool,
    #[serde(rename = "usuarioId")]
    pub usuario_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Validated payload for creating an expense.
#[derive(Debug)]
pub struct GastoInput {
    pub nombre: String,
    pub monto: f64,
    pub fecha: NaiveDate,
    pub categoria: Categoria,
    pub completado: bool,
}

impl GastoInput {
    /// Check a dynamic create body into a typed input. Optional fields fall
    /// back to today / `Otros` / `false`.
    pub fn parse(body: &Value) -> Result<Self, ValidationError> {
        let nombre = match validation::str_field(body, "nombre") {
            StrField::Value(v) => v,
            _ => {
                return Err(ValidationError::new(
                    "El nombre del gasto es obligatorio.",
                ))
            }
        };

        let monto = body
            .get("monto")
            .and_then(validation::positive_amount)
            .ok_or_else(|| ValidationError::new("El monto debe ser un número mayor que 0."))?;

        let fecha = match body.get("fecha") {
            None | Some(Value::Null) => Utc::now().date_naive(),
            Some(v) => validation::calendar_date(v)
                .ok_or_else(|| ValidationError::new("Fecha inválida."))?,
        };

        let categoria = match body.get("categoria") {
            None | Some(Value::Null) => Categoria::Otros,
            Some(v) => v
                .as_str()
                .map(str::trim)
                .and_then(Categoria::from_str)
                .ok_or_else(|| ValidationError::new("Categoría inválida."))?,
        };

        let completado = match body.get("completado") {
            None | Some(Value::Null) => false,
            Some(v) => validation::boolean(v)
                .ok_or_else(|| ValidationError::new("El campo completado debe ser booleano."))?,
        };

        Ok(Self {
            nombre,
            monto,
            fecha,
            categoria,
            completado,
        })
    }
}

/// Validated partial update; `None` fields keep their stored values.
#[derive(Debug, Default)]
pub struct GastoUpdate {
    pub nombre: Option<String>,
    pub monto: Option<f64>,
    pub fecha: Option<NaiveDate>,
    pub categoria: Option<Categoria>,
    pub completado: Option<bool>,
}

impl GastoUpdate {
    /// Check a dynamic update body: each provided field is validated with the
    /// same rules as on create, omitted fields are left untouched.
    pub fn parse(body: &Value) -> Result<Self, ValidationError> {
        let mut update = Self::default();

        if body.get("nombre").is_some_and(|v| !v.is_null()) {
            update.nombre = match validation::str_field(body, "nombre") {
                StrField::Value(v) => Some(v),
                _ => {
                    return Err(ValidationError::new(
                        "El nombre del gasto es obligatorio.",
                    ))
                }
            };
        }

        if let Some(v) = body.get("monto").filter(|v| !v.is_null()) {
            update.monto = Some(
                validation::positive_amount(v)
                    .ok_or_else(|| ValidationError::new("El monto debe ser un número mayor que 0."))?,
            );
        }

        if let Some(v) = body.get("fecha").filter(|v| !v.is_null()) {
            update.fecha = Some(
                validation::calendar_date(v)
                    .ok_or_else(|| ValidationError::new("Fecha inválida."))?,
            );
        }

        if let Some(v) = body.get("categoria").filter(|v| !v.is_null()) {
            update.categoria = Some(
                v.as_str()
                    .map(str::trim)
                    .and_then(Categoria::from_str)
                    .ok_or_else(|| ValidationError::new("Categoría inválida."))?,
            );
        }

        if let Some(v) = body.get("completado").filter(|v| !v.is_null()) {
            update.completado = Some(
                validation::boolean(v)
                    .ok_or_else(|| ValidationError::new("El campo completado debe ser booleano."))?,
            );
        }

        Ok(update)
    }
}
