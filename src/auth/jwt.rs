//! JWT Token Handler
//! Mission: Issue and verify signed identity tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Tokens are trusted until natural expiry; no refresh, no revocation.
const TOKEN_TTL_HOURS: i64 = 1;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a signed token carrying the user id, expiring in one hour.
    pub fn issue(&self, user_id: &Uuid) -> Result<String> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp,
        };

        debug!(
            "Issuing JWT for user {}, expires in {}h",
            user_id, TOKEN_TTL_HOURS
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to issue JWT")
    }

    /// Verify a token and extract its claims.
    ///
    /// Malformed, tampered and expired tokens all fail through the same
    /// error; callers cannot tell the reasons apart.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}
