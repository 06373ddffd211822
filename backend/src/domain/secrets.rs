//! Opaque secrets handed to clients and the digests stored in their place.
//!
//! Refresh tokens and email-confirmation tokens are never persisted in raw
//! form: the store keeps `base64(sha256(token))` and lookups hash the
//! presented value the same way.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::RngCore as _;
use rand::rngs::OsRng;
use sha2::{Digest as _, Sha256};
use zeroize::Zeroizing;

/// Number of random bytes behind every generated secret.
pub const SECRET_BYTES: usize = 32;

fn random_bytes() -> Zeroizing<[u8; SECRET_BYTES]> {
    let mut bytes = Zeroizing::new([0_u8; SECRET_BYTES]);
    OsRng.fill_bytes(&mut *bytes);
    bytes
}

/// Generate a refresh token: 32 random bytes, standard base64.
///
/// # Examples
/// ```
/// use ideahub::domain::secrets::generate_refresh_token;
///
/// let token = generate_refresh_token();
/// assert_eq!(token.len(), 44);
/// ```
#[must_use]
pub fn generate_refresh_token() -> Zeroizing<String> {
    Zeroizing::new(STANDARD.encode(random_bytes().as_slice()))
}

/// Generate an email-confirmation token safe to embed in a query string.
#[must_use]
pub fn generate_confirmation_token() -> Zeroizing<String> {
    Zeroizing::new(URL_SAFE_NO_PAD.encode(random_bytes().as_slice()))
}

/// One-way digest of a secret over its UTF-8 bytes.
///
/// # Examples
/// ```
/// use ideahub::domain::secrets::digest_secret;
///
/// assert_eq!(digest_secret("abc"), digest_secret("abc"));
/// assert_ne!(digest_secret("abc"), digest_secret("abd"));
/// ```
#[must_use]
pub fn digest_secret(raw: &str) -> String {
    STANDARD.encode(Sha256::digest(raw.as_bytes()))
}
