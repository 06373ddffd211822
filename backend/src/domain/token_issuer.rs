//! HS256 access-token issuance and validation.
//!
//! The signing key is the raw byte form of a hex-encoded configuration
//! secret. Every validation failure collapses to [`InvalidToken`]; the
//! reason is only logged.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{Actor, Error, Role, RoleSet, UserAccount, UserId};

/// Immutable settings for the token issuer.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// Hex-encoded HMAC key.
    pub secret_hex: Zeroizing<String>,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl: Duration,
}

/// Raised when the configured signing secret cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SigningKeyError {
    /// The secret is blank.
    #[error("signing secret must not be empty")]
    Empty,
    /// The secret is not valid hex.
    #[error("signing secret is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Single failure class for every rejected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Claim set embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Display name.
    pub name: String,
    /// Every role assigned to the user.
    #[serde(default)]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    /// Parsed `sub` claim.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] when the claim is not a user id.
    pub fn user_id(&self) -> Result<UserId, InvalidToken> {
        UserId::new(&self.sub).map_err(|_| InvalidToken)
    }

    /// Known roles from the `role` claim; unknown names are ignored.
    #[must_use]
    pub fn roles(&self) -> RoleSet {
        self.role
            .iter()
            .filter_map(|name| match name.parse::<Role>() {
                Ok(role) => Some(role),
                Err(err) => {
                    debug!(error = %err, "ignoring unknown role claim");
                    None
                }
            })
            .collect()
    }

    /// Caller identity for domain services.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] when `sub` is malformed.
    pub fn actor(&self) -> Result<Actor, InvalidToken> {
        Ok(Actor::new(self.user_id()?, self.roles()))
    }
}

/// Signed access token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Validates bearer tokens on inbound requests.
pub trait AccessTokenVerifier: Send + Sync {
    /// Validate signature, issuer, audience and expiry.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] for any rejected token.
    fn verify(&self, token: &str) -> Result<AccessClaims, InvalidToken>;
}

/// Mints and validates HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Build an issuer from settings.
    ///
    /// # Errors
    /// Returns [`SigningKeyError`] when the secret is blank or not hex.
    pub fn new(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Result<Self, SigningKeyError> {
        let trimmed = settings.secret_hex.trim();
        if trimmed.is_empty() {
            return Err(SigningKeyError::Empty);
        }
        let key_bytes = Zeroizing::new(hex::decode(trimmed)?);
        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key_bytes),
            decoding_key: DecodingKey::from_secret(&key_bytes),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            ttl: settings.access_token_ttl,
            clock,
        })
    }

    /// Sign an access token for `user`.
    ///
    /// # Errors
    /// Returns an internal error if encoding fails.
    pub fn issue(&self, user: &UserAccount) -> Result<IssuedAccessToken, Error> {
        let now = self.clock.utc();
        let expires_at = now + self.ttl;
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            name: user.display_name.to_string(),
            role: user.roles.iter().map(|role| role.as_str().to_owned()).collect(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("failed to sign access token: {err}")))?;
        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Validate signature, issuer and audience while ignoring expiry.
    ///
    /// Used when exchanging a refresh token: the presented access token has
    /// normally already expired.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] for a bad signature, wrong issuer or
    /// audience, or malformed input.
    pub fn validate_expired_token(&self, token: &str) -> Result<AccessClaims, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = false;

        jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!(error = %err, "access token rejected");
                InvalidToken
            })
    }

    /// Full validation including expiry against the issuer's clock.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] for any rejected token, expired ones included.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, InvalidToken> {
        let claims = self.validate_expired_token(token)?;
        if claims.exp <= self.clock.utc().timestamp() {
            debug!(jti = %claims.jti, "access token expired");
            return Err(InvalidToken);
        }
        Ok(claims)
    }
}

impl AccessTokenVerifier for TokenIssuer {
    fn verify(&self, token: &str) -> Result<AccessClaims, InvalidToken> {
        self.validate(token)
    }
}
