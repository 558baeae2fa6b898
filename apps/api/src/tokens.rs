//! Candidate access tokens.
//!
//! The engine never inspects token internals; it mints an opaque string
//! at assignment and resolves it back to an interview id on every chat
//! turn. The default issuer signs HS256 JWTs with an expiry, so a leaked
//! link dies on its own and no token state needs storing beyond the copy
//! on the interview row.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

pub trait TokenIssuer: Send + Sync {
    /// Mints an opaque candidate token bound to one interview.
    fn mint(&self, interview_id: Uuid) -> Result<String, AppError>;

    /// Resolves a presented token back to its interview id.
    /// Any failure (bad signature, expiry, garbage) is `Unauthorized`.
    fn verify(&self, token: &str) -> Result<Uuid, AppError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
}

pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::hours(ttl_hours),
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn mint(&self, interview_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: interview_id,
            exp: (chrono::Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|_| AppError::Unauthorized)
    }
}
