//! Argon2id password hashing.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore as _;
use rand::rngs::OsRng;
use tracing::warn;

use super::Error;

/// Hashes new passwords and verifies presented ones against PHC strings.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordHasher {
    /// Hasher with explicit cost parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Cheapest parameters Argon2 accepts; only for tests.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn insecure_fast() -> Self {
        match Params::new(Params::MIN_M_COST, 1, 1, None) {
            Ok(params) => Self::with_params(params),
            Err(_) => Self::default(),
        }
    }

    /// Produce a PHC string for `password` with a fresh random salt.
    ///
    /// # Errors
    /// Returns an internal error when Argon2 rejects the input.
    pub fn hash(&self, password: &str) -> Result<String, Error> {
        let mut salt_bytes = [0_u8; 16];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| Error::internal(format!("failed to encode salt: {err}")))?;
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::internal(format!("failed to hash password: {err}")))
    }

    /// Whether `password` matches `stored`. Malformed stored hashes never match.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_password() {
        let hasher = PasswordHasher::insecure_fast();
        let hash = hasher.hash("Abc12345!").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Abc12345!", &hash));
        assert!(!hasher.verify("abc12345!", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let hasher = PasswordHasher::insecure_fast();
        let first = hasher.hash("same").expect("hash");
        let second = hasher.hash("same").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!PasswordHasher::insecure_fast().verify("x", "not-a-phc-string"));
    }
}
