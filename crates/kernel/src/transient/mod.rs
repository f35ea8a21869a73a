//! Ephemeral state store with per-entry TTL, backed by Moka.
//!
//! Carries two short-lived payloads across the render/submit round trip:
//! the per-page form configuration (keyed by a hash of the page URL) and the
//! post-submission result (keyed by the session identity token, read once).

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Key namespace shared by every transient entry.
pub const NAMESPACE: &str = "recapito";

/// Default TTL for transient entries (seconds).
///
/// Long enough to survive a realistic form fill, short enough to self-clean:
/// the happy path deletes entries explicitly well before this expires.
pub const TRANSIENT_TTL_SECS: u64 = 100;

/// Maximum number of live entries.
const MAX_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct Entry {
    payload: Arc<str>,
    ttl: Duration,
}

/// Expiry policy reading the TTL stored on each entry.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process transient store holding JSON payloads.
#[derive(Clone)]
pub struct TransientStore {
    inner: Cache<String, Entry>,
}

impl Default for TransientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransientStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let inner = Cache::builder()
            .max_capacity(MAX_CAPACITY)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner }
    }

    /// Store a value under `key` for `ttl_secs` seconds, replacing any
    /// previous value and resetting its TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let payload = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, key = %key, "failed to serialize transient value");
                return;
            }
        };

        let entry = Entry {
            payload: payload.into(),
            ttl: Duration::from_secs(ttl_secs),
        };
        self.inner.insert(key.to_string(), entry).await;

        debug!(key = %key, ttl = %ttl_secs, "transient set");
    }

    /// Get a value without consuming it.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.inner.get(key).await?;
        deserialize_payload(key, &entry.payload)
    }

    /// Atomically take a value: the entry is removed in the same store
    /// operation that reads it, so two concurrent readers can never both
    /// observe it.
    pub async fn take<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.inner.remove(key).await?;
        debug!(key = %key, "transient consumed");
        deserialize_payload(key, &entry.payload)
    }

    /// Delete a value.
    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Number of live entries (approximate, for diagnostics).
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

fn deserialize_payload<T: DeserializeOwned>(key: &str, payload: &str) -> Option<T> {
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, key = %key, "discarding undeserializable transient value");
            None
        }
    }
}

/// Key for the per-page form configuration: namespace plus a hex SHA-256 of
/// the canonical page URL.
pub fn page_key(canonical_url: &str) -> String {
    let digest = Sha256::digest(canonical_url.as_bytes());
    format!("{NAMESPACE}_{}", hex::encode(digest))
}

/// Key for the post-submission result of one browser session.
pub fn session_key(identity_token: &str) -> String {
    format!("{NAMESPACE}_{identity_token}")
}

impl std::fmt::Debug for TransientStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransientStore")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
