use crate::features::cookies::protection::DataProtection;
use crate::shared::error::CollectionError;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use base64::Engine;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

const DPAPI_PREFIX: &[u8] = b"DPAPI";
const SUPPORTED_VERSIONS: [&[u8]; 2] = [b"v10", b"v11"];
const NONCE_START: usize = 3;
const NONCE_END: usize = 15;
const TAG_LEN: usize = 16;
const DOMAIN_DIGEST_LEN: usize = 32;

/// Unwraps the cookie key stored in a Chromium `Local State` file:
/// base64 `os_crypt.encrypted_key`, `DPAPI` prefix, DPAPI blob.
pub fn derive_encryption_key(
    local_state_path: &Path,
    protection: &dyn DataProtection,
) -> Result<Vec<u8>, CollectionError> {
    if !local_state_path.is_file() {
        return Err(CollectionError::PathNotFound(local_state_path.display().to_string()));
    }

    let raw = fs::read_to_string(local_state_path)?;
    let local_state: Value = serde_json::from_str(&raw)?;
    let encoded = local_state
        .get("os_crypt")
        .and_then(|o| o.get("encrypted_key"))
        .and_then(Value::as_str)
        .ok_or_else(|| CollectionError::Parse("Local State missing os_crypt.encrypted_key".to_string()))?;

    let wrapped = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CollectionError::Parse(format!("invalid encrypted_key: {}", e)))?;

    let blob = wrapped.strip_prefix(DPAPI_PREFIX).ok_or_else(|| {
        CollectionError::UnsupportedFormat("encrypted_key does not start with DPAPI".to_string())
    })?;

    protection.unprotect(blob)
}

/// AES-GCM decryption of a `v10`/`v11` value: 3-byte version, 12-byte nonce,
/// ciphertext with trailing tag.
pub fn decrypt_aes_gcm(encrypted: &[u8], key: &[u8]) -> Result<Vec<u8>, CollectionError> {
    let version = encrypted.get(..NONCE_START).unwrap_or(encrypted);
    if !SUPPORTED_VERSIONS.iter().any(|supported| *supported == version) {
        return Err(CollectionError::UnsupportedFormat(format!(
            "cookie version prefix {:?}",
            String::from_utf8_lossy(version)
        )));
    }
    if encrypted.len() < NONCE_END + TAG_LEN {
        return Err(CollectionError::Decryption(format!(
            "value too short for AES-GCM ({} bytes)",
            encrypted.len()
        )));
    }

    let nonce = Nonce::<U12>::from_slice(&encrypted[NONCE_START..NONCE_END]);
    let ciphertext = &encrypted[NONCE_END..];
    let result = match key.len() {
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(|e| CollectionError::Decryption(e.to_string()))?
            .decrypt(nonce, ciphertext),
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(|e| CollectionError::Decryption(e.to_string()))?
            .decrypt(nonce, ciphertext),
        n => {
            return Err(CollectionError::Decryption(format!(
                "unsupported key length {}",
                n
            )))
        }
    };

    result.map_err(|_| CollectionError::Decryption("AES-GCM authentication failed".to_string()))
}

/// Newer Chromium builds prefix the plaintext with SHA-256(host_key).
fn strip_domain_digest(plaintext: Vec<u8>, host_key: &str) -> Vec<u8> {
    if plaintext.len() >= DOMAIN_DIGEST_LEN
        && plaintext[..DOMAIN_DIGEST_LEN] == Sha256::digest(host_key.as_bytes())[..]
    {
        plaintext[DOMAIN_DIGEST_LEN..].to_vec()
    } else {
        plaintext
    }
}

/// Decrypts one stored cookie value.
///
/// Native unprotection is tried first; when it fails and a key is available,
/// the AES-GCM scheme is tried. The fallback error is the one reported.
pub fn decrypt_cookie_value(
    encrypted: &[u8],
    host_key: &str,
    key: Option<&[u8]>,
    protection: &dyn DataProtection,
) -> Result<String, CollectionError> {
    let plaintext = match protection.unprotect(encrypted) {
        Ok(plaintext) => plaintext,
        Err(native_err) => match key {
            Some(key) => strip_domain_digest(decrypt_aes_gcm(encrypted, key)?, host_key),
            None => return Err(native_err),
        },
    };

    String::from_utf8(plaintext)
        .map_err(|e| CollectionError::Decryption(format!("plaintext is not UTF-8: {}", e)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use aes_gcm::aead::AeadCore;

    pub struct FailingProtection;

    impl DataProtection for FailingProtection {
        fn unprotect(&self, _blob: &[u8]) -> Result<Vec<u8>, CollectionError> {
            Err(CollectionError::Decryption("native unprotection failed".to_string()))
        }
    }

    /// Treats the blob itself as the plaintext.
    pub struct PassthroughProtection;

    impl DataProtection for PassthroughProtection {
        fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>, CollectionError> {
            Ok(blob.to_vec())
        }
    }

    pub fn encrypt_v10(plaintext: &[u8], key: &[u8; 32]) -> Vec<u8> {
        let cipher = Aes256Gcm::new_from_slice(key).unwrap();
        let nonce = Aes256Gcm::generate_nonce(&mut aes_gcm::aead::OsRng);
        let mut out = b"v10".to_vec();
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&cipher.encrypt(&nonce, plaintext).unwrap());
        out
    }
}
