//! CSRF token generation and verification.
//!
//! Tokens are bound to the browser session, single-use, and time-limited.
//! A failed verification is a silent no-op at the processor boundary: no
//! redirect, no state change, no user-visible message.

use anyhow::Result;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tower_sessions::Session;

/// Session key for stored CSRF tokens.
const CSRF_SESSION_KEY: &str = "csrf_tokens";

/// Maximum number of outstanding tokens per session.
const MAX_TOKENS: usize = 10;

/// Token validity period in seconds (1 hour).
const TOKEN_VALIDITY_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssuedToken {
    token: String,
    issued_at: i64,
}

/// Generate a CSRF token and store it in the session.
pub async fn generate(session: &Session) -> Result<String> {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let issued_at = chrono::Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(issued_at.to_le_bytes());
    let token = hex::encode(hasher.finalize());

    let mut tokens: Vec<IssuedToken> = session.get(CSRF_SESSION_KEY).await?.unwrap_or_default();

    tokens.push(IssuedToken {
        token: token.clone(),
        issued_at,
    });

    // Keep only the most recent tokens
    if tokens.len() > MAX_TOKENS {
        let skip = tokens.len() - MAX_TOKENS;
        tokens.drain(..skip);
    }

    session.insert(CSRF_SESSION_KEY, tokens).await?;

    Ok(token)
}

/// Verify a submitted CSRF token against the session.
///
/// A matching, unexpired token is consumed (single-use). Expired tokens are
/// pruned as a side effect.
pub async fn verify(session: &Session, submitted: &str) -> Result<bool> {
    if submitted.is_empty() {
        return Ok(false);
    }

    let mut tokens: Vec<IssuedToken> = session.get(CSRF_SESSION_KEY).await?.unwrap_or_default();
    if tokens.is_empty() {
        return Ok(false);
    }

    let now = chrono::Utc::now().timestamp();

    let found = tokens
        .iter()
        .position(|t| t.token == submitted && now - t.issued_at <= TOKEN_VALIDITY_SECS);

    let Some(index) = found else {
        return Ok(false);
    };

    tokens.remove(index);
    tokens.retain(|t| now - t.issued_at <= TOKEN_VALIDITY_SECS);
    session.insert(CSRF_SESSION_KEY, tokens).await?;

    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn token_is_hex_sha256() {
        let token = hex::encode(Sha256::digest(b"test"));
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
