//! AES-256-GCM envelope cipher.
//!
//! Ciphertext layout is a 12-byte random nonce followed by the GCM output
//! (ciphertext + 16-byte tag). The key is 32 bytes, sourced from the
//! `AQ_CREDENTIAL_KEY` environment variable (base64) in every environment
//! except `development`, where a host-derived key is used as a fallback so
//! local runs don't need secret provisioning.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;
const KEY_ENV_VAR: &str = "AQ_CREDENTIAL_KEY";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ciphertext is shorter than the nonce prefix")]
    Truncated,
    #[error("decryption failed: integrity check did not pass or key is wrong")]
    DecryptionFailed,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("key must be exactly 32 bytes, got {0}")]
    InvalidKeyLength(usize),
}

pub struct Cipher {
    inner: Aes256Gcm,
}

impl Cipher {
    /// Build a cipher from a raw 32-byte key.
    pub fn new(key_bytes: &[u8]) -> Result<Self, Error> {
        if key_bytes.len() != 32 {
            return Err(Error::InvalidKeyLength(key_bytes.len()));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self { inner: Aes256Gcm::new(key) })
    }

    /// Build a cipher from the process environment.
    ///
    /// Outside a `development` environment, panics at construction if
    /// `AQ_CREDENTIAL_KEY` is absent or does not decode to exactly 32 bytes —
    /// this is deliberately a hard failure rather than a silently-weak key.
    pub fn from_env(environment: &str) -> Self {
        match std::env::var(KEY_ENV_VAR) {
            Ok(encoded) => {
                let bytes = BASE64.decode(encoded.trim()).unwrap_or_else(|e| {
                    panic!("{KEY_ENV_VAR} is not valid base64: {e}");
                });
                Self::new(&bytes).unwrap_or_else(|e| panic!("{KEY_ENV_VAR} invalid: {e}"))
            }
            Err(_) if environment == "development" => Self::new(&Self::dev_fallback_key()).expect("derived key is 32 bytes"),
            Err(_) => panic!("{KEY_ENV_VAR} must be set outside the development environment"),
        }
    }

    /// Derive a stable, non-secret key from the machine hostname. Only ever
    /// used as the `development` fallback.
    fn dev_fallback_key() -> [u8; 32] {
        let host = hostname_best_effort();
        let mut hasher = Sha256::new();
        hasher.update(b"aq-crypto-dev-fallback");
        hasher.update(host.as_bytes());
        hasher.finalize().into()
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self.inner.encrypt(nonce, plaintext).expect("AES-GCM encryption is infallible for valid inputs");
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        out
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if data.len() < NONCE_LEN {
            return Err(Error::Truncated);
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.inner.decrypt(nonce, ciphertext).map_err(|_| Error::DecryptionFailed)
    }

    pub fn encrypt_to_string(&self, plaintext: &str) -> String {
        BASE64.encode(self.encrypt(plaintext.as_bytes()))
    }

    pub fn decrypt_from_str(&self, encoded: &str) -> Result<String, Error> {
        let data = BASE64.decode(encoded)?;
        let plaintext = self.decrypt(&data)?;
        String::from_utf8(plaintext).map_err(|_| Error::DecryptionFailed)
    }
}

fn hostname_best_effort() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "aq-dev-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> Cipher {
        Cipher::new(&[7u8; 32]).unwrap()
    }

    #[test]
    fn round_trips_plaintext() {
        let c = cipher();
        let ct = c.encrypt(b"super secret password");
        assert_eq!(c.decrypt(&ct).unwrap(), b"super secret password");
    }

    #[test]
    fn nonces_are_randomized_per_call() {
        let c = cipher();
        let a = c.encrypt(b"same input");
        let b = c.encrypt(b"same input");
        assert_ne!(a, b);
        assert_eq!(c.decrypt(&a).unwrap(), c.decrypt(&b).unwrap());
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let c = cipher();
        assert!(matches!(c.decrypt(&[1, 2, 3]), Err(Error::Truncated)));
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let c = cipher();
        let mut ct = c.encrypt(b"hello");
        let last = ct.len() - 1;
        ct[last] ^= 0xFF;
        assert!(matches!(c.decrypt(&ct), Err(Error::DecryptionFailed)));
    }

    #[test]
    fn rejects_wrong_key_length() {
        assert!(matches!(Cipher::new(&[0u8; 16]), Err(Error::InvalidKeyLength(16))));
    }

    #[test]
    fn string_helpers_round_trip() {
        let c = cipher();
        let encoded = c.encrypt_to_string("credential-value");
        assert_eq!(c.decrypt_from_str(&encoded).unwrap(), "credential-value");
    }
}
