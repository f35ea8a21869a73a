//! Reversible timestamp obfuscation for the anti-spam token.
//!
//! The rendered form carries the server timestamp encrypted into an opaque
//! hidden field; the processor decrypts it on submission and range-checks it.
//! This is an anti-bot obfuscation layer, not a security boundary: the key is
//! derived from ordinary configuration, and a failed decode simply marks the
//! submission suspicious.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Encrypts and decrypts Unix timestamps.
pub struct TimestampCodec {
    cipher: Aes256Gcm,
}

impl TimestampCodec {
    /// Create a codec with a key derived from the given secret string.
    pub fn new(secret: &str) -> Self {
        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        Self { cipher }
    }

    /// Encrypt a timestamp into an opaque URL-safe token.
    ///
    /// Uses a fresh random nonce per token, prepended to the ciphertext.
    pub fn encode(&self, timestamp: i64) -> String {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // Encryption of an 8-byte payload cannot realistically fail; an empty
        // ciphertext simply produces a token that fails to decode, which the
        // caller already treats as suspicious.
        let ciphertext = self
            .cipher
            .encrypt(nonce, timestamp.to_be_bytes().as_slice())
            .unwrap_or_default();

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        URL_SAFE_NO_PAD.encode(combined)
    }

    /// Decrypt a token back into its timestamp.
    ///
    /// Returns `None` for malformed, truncated, or tampered input. Never
    /// panics and never propagates an error.
    pub fn decode(&self, token: &str) -> Option<i64> {
        let combined = URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;
        if combined.len() <= NONCE_LEN {
            return None;
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self.cipher.decrypt(nonce, ciphertext).ok()?;
        let bytes: [u8; 8] = plaintext.as_slice().try_into().ok()?;

        Some(i64::from_be_bytes(bytes))
    }
}

impl std::fmt::Debug for TimestampCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampCodec").finish()
    }
}
