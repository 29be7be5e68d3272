//! Request Field Validation
//! Mission: Check every dynamic JSON body into typed values before handlers run
//!
//! Each endpoint parses its body with these per-field validators and either
//! gets a fully typed request value or a `ValidationError` with the
//! client-facing message.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// A field-level validation failure with a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub mensaje: String,
}

impl ValidationError {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self {
            mensaje: mensaje.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mensaje)
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of looking up a string field in a JSON body.
///
/// Empty-after-trim strings count as missing, the same as absent fields.
pub enum StrField {
    Missing,
    NotText,
    Value(String),
}

/// Look up `field` and require a non-empty string (trimmed).
pub fn str_field(body: &Value, field: &str) -> StrField {
    match body.get(field) {
        None | Some(Value::Null) => StrField::Missing,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                StrField::Missing
            } else {
                StrField::Value(trimmed.to_string())
            }
        }
        Some(_) => StrField::NotText,
    }
}

/// Strictly positive amount: a JSON number, or a string that parses as one.
///
/// String amounts are accepted because HTML number inputs submit text.
pub fn positive_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// Calendar date: an RFC 3339 timestamp (date part taken) or `YYYY-MM-DD`.
pub fn calendar_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// A JSON boolean, nothing else.
pub fn boolean(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// `local@domain.tld` shape: one `@`, no whitespace, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
