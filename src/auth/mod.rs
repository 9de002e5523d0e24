/// Authentication extractors and token services
pub mod password;
pub mod privilege;
pub mod revocation;
pub mod token;

use crate::{api::middleware::extract_bearer_token, context::AppContext, error::ApiError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;

pub use privilege::PrivilegeLevel;
pub use revocation::RevocationList;
pub use token::{Claims, TokenError, TokenIssuer};

/// Token issuer plus the revocation list it answers to
#[derive(Clone)]
pub struct TokenService {
    issuer: TokenIssuer,
    revocations: RevocationList,
}

impl TokenService {
    pub fn new(issuer: TokenIssuer, revocations: RevocationList) -> Self {
        Self {
            issuer,
            revocations,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn revocations(&self) -> &RevocationList {
        &self.revocations
    }

    /// Verify a raw bearer token.
    ///
    /// The revocation list is consulted before the signature so a logged-out
    /// token is refused even while it is still cryptographically valid.
    pub async fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        if self.revocations.is_revoked(token).await {
            return Err(TokenError::Revoked);
        }

        self.issuer.verify(token)
    }

    /// Revoke a token for the rest of its lifetime.
    ///
    /// Returns false when there was nothing to record: forged or already
    /// expired tokens are refused by `verify` regardless.
    pub async fn revoke(&self, token: &str) -> bool {
        let Ok(claims) = self.issuer.verify_signature(token) else {
            return false;
        };

        if claims.exp <= Utc::now().timestamp() {
            return false;
        }

        self.revocations.revoke(token, claims.exp).await;
        tracing::info!(account_id = claims.id, "Token revoked");
        true
    }
}

/// Authenticated operator - extracted from the bearer token on every
/// protected route. Any valid token is accepted; the privilege level is
/// only enforced at login.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn privilege(&self) -> PrivilegeLevel {
        PrivilegeLevel::from_level(self.claims.level)
    }
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(TokenError::Missing)?;

        let claims = state.tokens.verify(&token).await.map_err(|e| {
            tracing::debug!(reason = e.reason(), "Rejected bearer token");
            e
        })?;

        Ok(AuthContext { claims })
    }
}
