/// In-memory revocation list for logged-out tokens
///
/// Entries are keyed by a SHA-256 fingerprint of the raw token and carry the
/// token's own expiry, so a sweep can drop anything that would fail the
/// expiry check anyway. Process-local: several instances behind a balancer
/// would each need to see the logout, which this list cannot provide.
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct RevocationList {
    entries: Arc<RwLock<HashMap<String, i64>>>,
}

fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token until `expires_at` (unix seconds)
    pub async fn revoke(&self, token: &str, expires_at: i64) {
        let mut entries = self.entries.write().await;
        entries.insert(fingerprint(token), expires_at);
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(&fingerprint(token))
    }

    /// Drop entries whose token has expired by `now`; returns how many went
    pub async fn sweep_expired(&self, now: i64) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
