//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `IDEAHUB_*` environment variables, CLI flags or a
//! configuration file. Settings are read once at startup and handed to the
//! rest of the process as immutable values.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{
    AdminSeed, AuthSettings, DisplayName, EmailAddress, JwtSettings, NewPassword,
};
use crate::outbound::email::HttpEmailConfig;

const DEFAULT_ISSUER: &str = "ideahub";
const DEFAULT_AUDIENCE: &str = "ideahub-clients";
const DEFAULT_EXPIRY_MINUTES: i64 = 15;
const DEFAULT_REFRESH_DAYS: i64 = 7;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:4200";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Failure to turn raw settings into usable values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{key} must be set")]
    Missing { key: &'static str },
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Raw IdeaHub configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IDEAHUB")]
pub struct IdeaHubSettings {
    /// Hex-encoded HS256 signing key.
    pub jwt_secret: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    /// Access-token lifetime in minutes.
    pub jwt_expiry_minutes: Option<i64>,
    /// Refresh-token lifetime in days.
    pub refresh_token_days: Option<i64>,
    /// Block logins until the email address is confirmed. Defaults to on.
    pub require_confirmed_email: Option<bool>,
    /// Where browsers land after confirming their email.
    pub frontend_url: Option<String>,
    /// Externally visible base URL of this service.
    pub public_base_url: Option<String>,
    pub database_url: Option<String>,
    pub bind_addr: Option<String>,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
    pub seed_admin_display_name: Option<String>,
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`. Defaults to on.
    pub cookie_secure: Option<bool>,
}

impl IdeaHubSettings {
    /// Token issuer settings.
    ///
    /// # Errors
    /// Fails when the secret is absent or the lifetime is not positive.
    pub fn jwt_settings(&self) -> Result<JwtSettings, SettingsError> {
        let secret = self
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(SettingsError::Missing {
                key: "IDEAHUB_JWT_SECRET",
            })?;
        let minutes = self.jwt_expiry_minutes.unwrap_or(DEFAULT_EXPIRY_MINUTES);
        if minutes <= 0 {
            return Err(SettingsError::invalid(
                "IDEAHUB_JWT_EXPIRY_MINUTES",
                "must be positive",
            ));
        }
        Ok(JwtSettings {
            secret_hex: Zeroizing::new(secret.trim().to_owned()),
            issuer: self
                .jwt_issuer
                .clone()
                .unwrap_or_else(|| DEFAULT_ISSUER.to_owned()),
            audience: self
                .jwt_audience
                .clone()
                .unwrap_or_else(|| DEFAULT_AUDIENCE.to_owned()),
            access_token_ttl: Duration::minutes(minutes),
        })
    }

    /// Authentication service settings.
    ///
    /// # Errors
    /// Fails when the refresh lifetime is not positive.
    pub fn auth_settings(&self) -> Result<AuthSettings, SettingsError> {
        let days = self.refresh_token_days.unwrap_or(DEFAULT_REFRESH_DAYS);
        if days <= 0 {
            return Err(SettingsError::invalid(
                "IDEAHUB_REFRESH_TOKEN_DAYS",
                "must be positive",
            ));
        }
        Ok(AuthSettings {
            require_confirmed_email: self.require_confirmed_email.unwrap_or(true),
            public_base_url: self
                .public_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_owned()),
            refresh_token_ttl: Duration::days(days),
        })
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    #[must_use]
    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL)
    }

    /// # Errors
    /// Fails when no database URL is configured.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                key: "IDEAHUB_DATABASE_URL",
            })
    }

    /// # Errors
    /// Fails when the configured address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err: std::net::AddrParseError| {
                SettingsError::invalid("IDEAHUB_BIND_ADDR", err.to_string())
            })
    }

    #[must_use]
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// HTTP email API settings when all three values are present.
    ///
    /// # Errors
    /// Fails when only some of the values are set or the sender is invalid.
    pub fn email_api(&self) -> Result<Option<HttpEmailConfig>, SettingsError> {
        match (&self.email_api_url, &self.email_api_key, &self.email_from) {
            (None, None, None) => Ok(None),
            (Some(url), Some(key), Some(from)) => {
                let from = EmailAddress::new(from)
                    .map_err(|err| SettingsError::invalid("IDEAHUB_EMAIL_FROM", err.to_string()))?;
                Ok(Some(HttpEmailConfig {
                    endpoint: url.clone(),
                    api_key: Zeroizing::new(key.clone()),
                    from,
                }))
            }
            _ => Err(SettingsError::invalid(
                "IDEAHUB_EMAIL_API_URL",
                "email API url, key and sender must be set together",
            )),
        }
    }

    /// Super admin seed when an email is configured.
    ///
    /// # Errors
    /// Fails when the seed is incomplete or violates account rules.
    pub fn admin_seed(&self) -> Result<Option<AdminSeed>, SettingsError> {
        let Some(email) = self.seed_admin_email.as_deref() else {
            return Ok(None);
        };
        let email = EmailAddress::new(email)
            .map_err(|err| SettingsError::invalid("IDEAHUB_SEED_ADMIN_EMAIL", err.to_string()))?;
        let password = self
            .seed_admin_password
            .as_deref()
            .ok_or(SettingsError::Missing {
                key: "IDEAHUB_SEED_ADMIN_PASSWORD",
            })?;
        let password = NewPassword::new(password).map_err(|violations| {
            let codes: Vec<&str> = violations.iter().map(|rule| rule.code()).collect();
            SettingsError::invalid("IDEAHUB_SEED_ADMIN_PASSWORD", codes.join(", "))
        })?;
        let display_name = DisplayName::new(
            self.seed_admin_display_name
                .as_deref()
                .unwrap_or("Administrator"),
        )
        .map_err(|err| {
            SettingsError::invalid("IDEAHUB_SEED_ADMIN_DISPLAY_NAME", err.to_string())
        })?;
        Ok(Some(AdminSeed {
            email,
            display_name,
            password,
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 9] = [
        "IDEAHUB_JWT_SECRET",
        "IDEAHUB_JWT_EXPIRY_MINUTES",
        "IDEAHUB_REFRESH_TOKEN_DAYS",
        "IDEAHUB_REQUIRE_CONFIRMED_EMAIL",
        "IDEAHUB_COOKIE_SECURE",
        "IDEAHUB_DATABASE_URL",
        "IDEAHUB_BIND_ADDR",
        "IDEAHUB_SEED_ADMIN_EMAIL",
        "IDEAHUB_SEED_ADMIN_PASSWORD",
    ];

    fn cleared(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| (*value).to_owned());
                (*key, value)
            })
            .collect()
    }

    fn load() -> IdeaHubSettings {
        IdeaHubSettings::load_from_iter([OsString::from("ideahub")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared(&[("IDEAHUB_JWT_SECRET", "0f0f")]));

        let settings = load();
        let jwt = settings.jwt_settings().expect("jwt settings");
        assert_eq!(jwt.issuer, DEFAULT_ISSUER);
        assert_eq!(jwt.audience, DEFAULT_AUDIENCE);
        assert_eq!(jwt.access_token_ttl, Duration::minutes(15));
        let auth = settings.auth_settings().expect("auth settings");
        assert!(auth.require_confirmed_email);
        assert!(settings.cookie_secure());
        assert_eq!(auth.refresh_token_ttl, Duration::days(7));
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.admin_seed().expect("seed").is_none());
    }

    #[rstest]
    fn missing_secret_and_database_are_reported() {
        let _guard = lock_env(cleared(&[]));

        let settings = load();
        assert_eq!(
            settings.jwt_settings().map(|_| ()),
            Err(SettingsError::Missing {
                key: "IDEAHUB_JWT_SECRET"
            })
        );
        assert!(settings.database_url().is_err());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared(&[
            ("IDEAHUB_JWT_SECRET", "0f0f"),
            ("IDEAHUB_JWT_EXPIRY_MINUTES", "30"),
            ("IDEAHUB_REQUIRE_CONFIRMED_EMAIL", "false"),
            ("IDEAHUB_COOKIE_SECURE", "false"),
            ("IDEAHUB_DATABASE_URL", "postgres://localhost/ideahub"),
            ("IDEAHUB_SEED_ADMIN_EMAIL", "Root@IdeaHub.test"),
            ("IDEAHUB_SEED_ADMIN_PASSWORD", "Sup3r!secret"),
        ]));

        let settings = load();
        assert_eq!(
            settings.jwt_settings().expect("jwt").access_token_ttl,
            Duration::minutes(30)
        );
        assert!(!settings.auth_settings().expect("auth").require_confirmed_email);
        assert!(!settings.cookie_secure());
        assert_eq!(
            settings.database_url(),
            Ok("postgres://localhost/ideahub")
        );
        let seed = settings.admin_seed().expect("seed").expect("seed present");
        assert_eq!(seed.email.as_ref(), "root@ideahub.test");
    }

    #[rstest]
    fn weak_seed_password_is_rejected() {
        let _guard = lock_env(cleared(&[
            ("IDEAHUB_SEED_ADMIN_EMAIL", "root@ideahub.test"),
            ("IDEAHUB_SEED_ADMIN_PASSWORD", "short"),
        ]));

        assert!(matches!(
            load().admin_seed(),
            Err(SettingsError::Invalid { key: "IDEAHUB_SEED_ADMIN_PASSWORD", .. })
        ));
    }
}
