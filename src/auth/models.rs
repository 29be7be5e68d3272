//! Authentication Models
//! Mission: User and token data structures with safe serialization

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::validation::{self, StrField, ValidationError};

/// Registered user account
#[derive(Debug, Clone, Serialize)]
pub struct Usuario {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration timestamp
}

impl Claims {
    /// The encoded subject as a user id, if it is one of ours.
    pub fn subject(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Authenticated subject attached to the request by the access middleware.
#[derive(Debug, Clone, Copy)]
pub struct Subject(pub Uuid);

/// User response (sanitized wire shape of `usuario`)
#[derive(Debug, Serialize, Deserialize)]
pub struct UsuarioResponse {
    pub id: String,
    pub nombre: String,
    pub email: String,
}

impl UsuarioResponse {
    pub fn from_usuario(usuario: &Usuario) -> Self {
        Self {
            id: usuario.id.to_string(),
            nombre: usuario.nombre.clone(),
            email: usuario.email.clone(),
        }
    }
}

/// Registration request, checked out of a dynamic JSON body
#[derive(Debug)]
pub struct RegistroRequest {
    pub nombre: String,
    pub email: String,
    pub contrasena: String,
}

impl RegistroRequest {
    pub fn parse(body: &Value) -> Result<Self, ValidationError> {
        let nombre = validation::str_field(body, "nombre");
        let email = validation::str_field(body, "email");
        let contrasena = validation::str_field(body, "contraseña");

        if matches!(nombre, StrField::Missing)
            || matches!(email, StrField::Missing)
            || matches!(contrasena, StrField::Missing)
        {
            return Err(ValidationError::new("Todos los campos son obligatorios."));
        }

        let (StrField::Value(nombre), StrField::Value(email), StrField::Value(contrasena)) =
            (nombre, email, contrasena)
        else {
            return Err(ValidationError::new(
                "Formato inválido. Todos los datos deben ser texto.",
            ));
        };

        if !validation::is_valid_email(&email) {
            return Err(ValidationError::new(
                "Email inválido. Usa un formato válido (ejemplo@correo.com).",
            ));
        }

        let largo_nombre = nombre.chars().count();
        if !(3..=50).contains(&largo_nombre) {
            return Err(ValidationError::new(
                "El nombre debe tener entre 3 y 50 caracteres.",
            ));
        }

        if contrasena.chars().count() < 8 {
            return Err(ValidationError::new(
                "La contraseña debe tener al menos 8 caracteres.",
            ));
        }

        Ok(Self {
            nombre,
            email,
            contrasena,
        })
    }
}

/// Login request, checked out of a dynamic JSON body
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub contrasena: String,
}

impl LoginRequest {
    pub fn parse(body: &Value) -> Result<Self, ValidationError> {
        let email = validation::str_field(body, "email");
        let contrasena = validation::str_field(body, "contraseña");

        if matches!(email, StrField::Missing) || matches!(contrasena, StrField::Missing) {
            return Err(ValidationError::new("Todos los campos son obligatorios."));
        }

        let (StrField::Value(email), StrField::Value(contrasena)) = (email, contrasena) else {
            return Err(ValidationError::new(
                "Formato inválido. Todos los datos deben ser texto.",
            ));
        };

        Ok(Self { email, contrasena })
    }
}
