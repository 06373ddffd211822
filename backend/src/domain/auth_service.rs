//! Registration, email confirmation, login and token rotation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::{
    AuthCommand, ConfirmationOutcome, EmailMessage, EmailSender, LoginOutcome, RefreshRequest,
    RefreshTokenRepository, UserRepository,
};
use super::refresh_ledger::RefreshTokenLedger;
use super::secrets::{digest_secret, generate_confirmation_token};
use super::{
    AuthTokens, Deletion, EmailAddress, Error, LoginCredentials, PasswordHasher, Registration,
    Role, RoleSet, TokenIssuer, UserAccount, UserId, UserSummary,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH: &str = "Invalid access or refresh token";
const UNCONFIRMED: &str = "Please confirm your email before logging in";
const CONFIRMATION_SUBJECT: &str = "IdeaHub Email Confirmation";
const RECONFIRMATION_SUBJECT: &str = "IdeaHub Email Reconfirmation";

/// Immutable authentication settings resolved at startup.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Block logins until the email address is confirmed.
    pub require_confirmed_email: bool,
    /// Base URL used to build confirmation links.
    pub public_base_url: String,
    pub refresh_token_ttl: Duration,
}

/// Authentication service implementing [`AuthCommand`].
pub struct AuthService<U, R, E: ?Sized> {
    users: Arc<U>,
    ledger: RefreshTokenLedger<R>,
    mailer: Arc<E>,
    tokens: Arc<TokenIssuer>,
    hasher: Arc<PasswordHasher>,
    clock: Arc<dyn Clock>,
    settings: AuthSettings,
}

/// Collaborators of [`AuthService`].
pub struct AuthServiceDeps<U, R, E: ?Sized> {
    pub users: Arc<U>,
    pub refresh_tokens: Arc<R>,
    pub mailer: Arc<E>,
    pub tokens: Arc<TokenIssuer>,
    pub hasher: Arc<PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

impl<U, R, E: ?Sized> AuthService<U, R, E> {
    pub fn new(deps: AuthServiceDeps<U, R, E>, settings: AuthSettings) -> Self {
        let ledger = RefreshTokenLedger::new(
            deps.refresh_tokens,
            deps.clock.clone(),
            settings.refresh_token_ttl,
        );
        Self {
            users: deps.users,
            ledger,
            mailer: deps.mailer,
            tokens: deps.tokens,
            hasher: deps.hasher,
            clock: deps.clock,
            settings,
        }
    }

    fn confirmation_link(&self, user_id: &UserId, token: &str) -> String {
        format!(
            "{}/api/auth/confirm-email?userId={user_id}&token={token}",
            self.settings.public_base_url.trim_end_matches('/')
        )
    }

    fn invalid_refresh() -> Error {
        Error::unauthorized(INVALID_REFRESH)
    }
}

impl<U, R, E> AuthService<U, R, E>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    E: EmailSender + ?Sized,
{
    async fn send_confirmation(
        &self,
        user_id: &UserId,
        email: &EmailAddress,
        token: &str,
        subject: &str,
    ) -> Result<(), Error> {
        let link = self.confirmation_link(user_id, token);
        let message = EmailMessage {
            to: email.clone(),
            subject: subject.to_owned(),
            body: format!("Please confirm your email address by visiting: {link}"),
        };
        self.mailer.send(&message).await.map_err(Error::from)
    }

    async fn issue_pair(&self, user: &UserAccount) -> Result<AuthTokens, Error> {
        let access = self.tokens.issue(user)?;
        let refresh = self.ledger.issue(&user.id).await?;
        Ok(AuthTokens {
            access_token: access.token,
            refresh_token: refresh.raw.to_string(),
            refresh_token_expiry: refresh.expires_at,
        })
    }
}

#[async_trait]
impl<U, R, E> AuthCommand for AuthService<U, R, E>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    E: EmailSender + ?Sized,
{
    async fn register(&self, registration: Registration) -> Result<UserSummary, Error> {
        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(Error::conflict(super::port_errors::EMAIL_TAKEN));
        }

        let token = generate_confirmation_token();
        let user = UserAccount {
            id: UserId::random(),
            email: registration.email,
            display_name: registration.display_name,
            password_hash: self.hasher.hash(registration.password.expose())?,
            email_confirmed: !self.settings.require_confirmed_email,
            confirmation_token_hash: Some(digest_secret(&token)),
            roles: RoleSet::from([Role::RegularUser]),
            created_at: self.clock.utc(),
            last_login_at: None,
            deletion: Deletion::live(),
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, "user registered");

        let sent = self
            .send_confirmation(&user.id, &user.email, &token, CONFIRMATION_SUBJECT)
            .await;
        if let Err(error) = sent {
            if self.settings.require_confirmed_email {
                warn!(user_id = %user.id, %error, "confirmation email failed; removing account");
                self.users.remove(&user.id).await?;
                return Err(Error::internal("Failed to send confirmation email"));
            }
            warn!(user_id = %user.id, %error, "confirmation email failed");
        }
        Ok(user.summary())
    }

    async fn confirm_email(
        &self,
        user_id: UserId,
        token: String,
    ) -> Result<ConfirmationOutcome, Error> {
        if token.trim().is_empty() {
            return Err(Error::invalid_request("User ID and token are required"));
        }
        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;
        if user.email_confirmed {
            return Ok(ConfirmationOutcome::AlreadyConfirmed);
        }
        let presented = digest_secret(&token);
        if user.confirmation_token_hash.as_deref() != Some(presented.as_str()) {
            debug!(user_id = %user_id, "confirmation token mismatch");
            return Err(Error::invalid_request("Invalid confirmation token"));
        }
        self.users.mark_email_confirmed(&user_id).await?;
        info!(user_id = %user_id, "email confirmed");
        Ok(ConfirmationOutcome::Confirmed)
    }

    async fn resend_confirmation(&self, email: EmailAddress) -> Result<(), Error> {
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| Error::invalid_request("No account is registered for this email"))?;
        if user.email_confirmed {
            return Err(Error::invalid_request("Email is already confirmed"));
        }
        let token = generate_confirmation_token();
        self.users
            .set_confirmation_token(&user.id, Some(digest_secret(&token)))
            .await?;
        self.send_confirmation(&user.id, &user.email, &token, RECONFIRMATION_SUBJECT)
            .await
            .map_err(|error| {
                warn!(user_id = %user.id, %error, "reconfirmation email failed");
                Error::internal("Failed to send confirmation email")
            })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some(user) = self.users.find_by_email(credentials.email()).await? else {
            debug!("login for unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self.hasher.verify(credentials.password(), &user.password_hash) {
            debug!(user_id = %user.id, "password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if self.settings.require_confirmed_email && !user.email_confirmed {
            return Err(Error::unauthorized(UNCONFIRMED));
        }

        self.users.record_login(&user.id, self.clock.utc()).await?;
        let tokens = self.issue_pair(&user).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            user: user.summary(),
            tokens,
        })
    }

    async fn refresh(&self, request: RefreshRequest) -> Result<AuthTokens, Error> {
        let claims = self
            .tokens
            .validate_expired_token(&request.access_token)
            .map_err(|_| {
                debug!("refresh presented an invalid access token");
                Self::invalid_refresh()
            })?;
        let user_id = claims.user_id().map_err(|_| Self::invalid_refresh())?;
        let Some(user) = self.users.find_by_id(&user_id).await? else {
            debug!(user_id = %user_id, "refresh for unknown user");
            return Err(Self::invalid_refresh());
        };

        // Roles are re-read from the store so new grants reach the token.
        let access = self.tokens.issue(&user)?;
        let refresh = self
            .ledger
            .rotate(&user.id, &request.refresh_token)
            .await?
            .ok_or_else(Self::invalid_refresh)?;
        info!(user_id = %user.id, "refresh token rotated");
        Ok(AuthTokens {
            access_token: access.token,
            refresh_token: refresh.raw.to_string(),
            refresh_token_expiry: refresh.expires_at,
        })
    }

    async fn logout(&self, user_id: UserId) -> Result<(), Error> {
        self.ledger.revoke_all(&user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
