//! HS256 bearer tokens.
//!
//! The account service signs tokens with the shared `JWT_SECRET`; this server
//! only verifies them and turns the claims into an [`Actor`].

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quill_core::actor::Actor;
use quill_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Commenter id.
    pub sub: DbId,
    /// One of [`quill_core::roles`].
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role.clone())
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens issued by [`issue_token`].
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS` (default 15).
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or empty, or the expiry is not a
    /// number.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .unwrap_or_else(|_| panic!("JWT_ACCESS_EXPIRY_MINS is not a number: {raw}")),
            Err(_) => 15,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Sign a token for `user_id`. Used by local tooling and tests; production
/// tokens come from the account service.
pub fn issue_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}
