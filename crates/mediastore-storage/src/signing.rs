//! Signed read URLs for backends that have no native presigning.
//!
//! URL = `{base_url}/{key}?expires={unix_secs}&signature={sig}` where
//! sig = base64url(HMAC-SHA256(secret, key || "\n" || expires)).

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::traits::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> Self {
        UrlSigner {
            secret: secret.as_ref().to_vec(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn mac(&self, key: &str, expires: u64) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Signature for `key` valid until `expires` (unix seconds).
    pub fn signature(&self, key: &str, expires: u64) -> StorageResult<String> {
        let tag = self.mac(key, expires)?.finalize().into_bytes();
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag))
    }

    /// Build a signed URL for `key` valid for `expires_in`.
    pub fn sign(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if self.secret.is_empty() {
            return Err(StorageError::SigningFailed(
                "URL signing secret is not configured".to_string(),
            ));
        }

        let expires = now_secs().saturating_add(expires_in.as_secs());
        let signature = self.signature(key, expires)?;
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url, encoded_key, expires, signature
        ))
    }

    /// Check a signature presented with a read request.
    pub fn verify(&self, key: &str, expires: u64, signature: &str) -> StorageResult<()> {
        let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::InvalidSignature("Malformed signature".to_string()))?;

        self.mac(key, expires)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::InvalidSignature("Signature mismatch".to_string()))?;

        if now_secs() > expires {
            return Err(StorageError::InvalidSignature(
                "Signed URL has expired".to_string(),
            ));
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_url(url: &str) -> (String, u64, String) {
        let (path, query) = url.split_once('?').unwrap();
        let key = path
            .strip_prefix("http://localhost:3000/objects/")
            .unwrap()
            .to_string();
        let mut expires = 0;
        let mut signature = String::new();
        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "expires" => expires = v.parse().unwrap(),
                "signature" => signature = v.to_string(),
                _ => {}
            }
        }
        (key, expires, signature)
    }

    #[test]
    fn test_signed_url_verifies() {
        let signer = UrlSigner::new("secret", "http://localhost:3000/objects/");
        let url = signer
            .sign("default/default/v1-abc", Duration::from_secs(60))
            .unwrap();
        let (key, expires, signature) = split_url(&url);
        assert_eq!(key, "default/default/v1-abc");
        assert!(signer.verify(&key, expires, &signature).is_ok());
    }

    #[test]
    fn test_tampered_key_rejected() {
        let signer = UrlSigner::new("secret", "http://localhost:3000/objects");
        let url = signer.sign("a/b/c", Duration::from_secs(60)).unwrap();
        let (_, expires, signature) = split_url(&url);
        let result = signer.verify("a/b/d", expires, &signature);
        assert!(matches!(result, Err(StorageError::InvalidSignature(_))));
    }

    #[test]
    fn test_other_secret_rejected() {
        let signer = UrlSigner::new("secret", "http://localhost:3000/objects");
        let other = UrlSigner::new("other", "http://localhost:3000/objects");
        let url = signer.sign("a/b/c", Duration::from_secs(60)).unwrap();
        let (key, expires, signature) = split_url(&url);
        assert!(other.verify(&key, expires, &signature).is_err());
    }

    #[test]
    fn test_expired_signature_rejected() {
        let signer = UrlSigner::new("secret", "http://localhost:3000/objects");
        let expires = now_secs() - 10;
        let signature = signer.signature("a/b/c", expires).unwrap();
        let result = signer.verify("a/b/c", expires, &signature);
        assert!(matches!(result, Err(StorageError::InvalidSignature(_))));
    }

    #[test]
    fn test_empty_secret_cannot_sign() {
        let signer = UrlSigner::new("", "http://localhost:3000/objects");
        let result = signer.sign("a/b/c", Duration::from_secs(60));
        assert!(matches!(result, Err(StorageError::SigningFailed(_))));
    }
}
