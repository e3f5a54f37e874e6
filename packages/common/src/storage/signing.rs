use std::fmt;

use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;

use super::error::StorageError;

type HmacSha256 = Hmac<Sha256>;

/// Everything but RFC 3986 unreserved characters and the `/` separator.
const KEY_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Why a presented download signature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature is not valid hex.
    Malformed,
    /// Signature does not match the key and expiry.
    Mismatch,
    /// The link's expiry time has passed.
    Expired,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed signature"),
            Self::Mismatch => write!(f, "signature mismatch"),
            Self::Expired => write!(f, "link expired"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// HMAC-SHA256 signer for self-served download links.
///
/// The signed message is `"{key}\n{expires}"` where `expires` is a Unix
/// timestamp in seconds.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha256,
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, StorageError> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|e| StorageError::Backend(format!("invalid signing secret: {e}")))?;
        Ok(Self { mac })
    }

    /// Hex-encoded signature over `key` and `expires`.
    pub fn sign(&self, key: &str, expires: i64) -> String {
        let mut mac = self.mac.clone();
        mac.update(message(key, expires).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a signature and expiry against the current time `now`.
    pub fn verify(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let presented = hex::decode(signature).map_err(|_| SignatureError::Malformed)?;
        let mut mac = self.mac.clone();
        mac.update(message(key, expires).as_bytes());
        mac.verify_slice(&presented)
            .map_err(|_| SignatureError::Mismatch)?;
        if now > expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

fn message(key: &str, expires: i64) -> String {
    format!("{key}\n{expires}")
}

/// Percent-encode an object key for use in a URL path, keeping `/` separators.
pub fn encode_key_path(key: &str) -> String {
    utf8_percent_encode(key, KEY_PATH).to_string()
}
