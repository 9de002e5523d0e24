/// Session token issuing and verification (HS256 JWT)
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::OperatorAccount;

/// Claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub level: i64,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Missing or invalid Authorization header")]
    Missing,

    #[error("Token revoked")]
    Revoked,

    #[error("Invalid or expired token")]
    InvalidOrExpired(#[source] jsonwebtoken::errors::Error),

    #[error("Token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short machine-readable reason used by the verify endpoint
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Missing => "missing",
            TokenError::Revoked => "revoked",
            TokenError::InvalidOrExpired(_) => "invalid",
            TokenError::Signing(_) => "internal",
        }
    }
}

/// Signs and checks session tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_hours * 3600,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for an authenticated account
    pub fn issue(&self, account: &OperatorAccount) -> Result<(String, Claims), TokenError> {
        self.issue_at(account, Utc::now().timestamp())
    }

    pub fn issue_at(
        &self,
        account: &OperatorAccount,
        now: i64,
    ) -> Result<(String, Claims), TokenError> {
        let claims = Claims {
            id: account.id,
            username: account.username.clone(),
            level: account.level,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok((token, claims))
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                TokenError::InvalidOrExpired(e)
            })
    }

    /// Check the signature only; used to learn a token's expiry at logout
    pub fn verify_signature(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::InvalidOrExpired)
    }
}
