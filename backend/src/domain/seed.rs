//! Startup seeding of the platform administrator account.

use mockable::Clock;
use tracing::info;

use super::ports::UserRepository;
use super::{
    Deletion, DisplayName, EmailAddress, Error, NewPassword, PasswordHasher, Role, RoleSet,
    UserAccount, UserId,
};

/// Credentials for the seeded `SuperAdmin`.
#[derive(Debug)]
pub struct AdminSeed {
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub password: NewPassword,
}

/// Outcome of [`seed_super_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(UserId),
    AlreadyPresent,
}

/// Create a confirmed `SuperAdmin` unless the email is already registered.
///
/// Running the seed again is a no-op.
///
/// # Errors
/// Propagates repository and hashing failures.
pub async fn seed_super_admin<U>(
    users: &U,
    hasher: &PasswordHasher,
    clock: &dyn Clock,
    seed: AdminSeed,
) -> Result<SeedOutcome, Error>
where
    U: UserRepository + ?Sized,
{
    if users.find_by_email(&seed.email).await?.is_some() {
        info!(email = %seed.email, "super admin already present; skipping seed");
        return Ok(SeedOutcome::AlreadyPresent);
    }
    let account = UserAccount {
        id: UserId::random(),
        email: seed.email,
        display_name: seed.display_name,
        password_hash: hasher.hash(seed.password.expose())?,
        email_confirmed: true,
        confirmation_token_hash: None,
        roles: RoleSet::from([Role::RegularUser, Role::SuperAdmin]),
        created_at: clock.utc(),
        last_login_at: None,
        deletion: Deletion::live(),
    };
    users.insert(&account).await?;
    info!(user_id = %account.id, "seeded super admin");
    Ok(SeedOutcome::Created(account.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockUserRepository;
    use crate::test_support::{ManualClock, fixture_timestamp, user_account};

    fn seed() -> AdminSeed {
        AdminSeed {
            email: EmailAddress::new("root@ideahub.test").expect("email"),
            display_name: DisplayName::new("Root").expect("name"),
            password: NewPassword::new("Sup3r!secret").expect("password"),
        }
    }

    #[tokio::test]
    async fn creates_confirmed_super_admin() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().return_once(|_| Ok(None));
        users
            .expect_insert()
            .withf(|account| {
                account.email_confirmed
                    && account.has_role(Role::SuperAdmin)
                    && account.has_role(Role::RegularUser)
            })
            .times(1)
            .return_once(|_| Ok(()));
        let clock = ManualClock::new(fixture_timestamp());

        let outcome = seed_super_admin(&users, &PasswordHasher::insecure_fast(), &clock, seed())
            .await
            .expect("seed");
        assert!(matches!(outcome, SeedOutcome::Created(_)));
    }

    #[tokio::test]
    async fn existing_email_is_left_alone() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().return_once(|email| {
            Ok(Some(user_account(
                email.clone(),
                DisplayName::new("Root").expect("name"),
                RoleSet::from([Role::SuperAdmin]),
            )))
        });
        users.expect_insert().never();
        let clock = ManualClock::new(fixture_timestamp());

        let outcome = seed_super_admin(&users, &PasswordHasher::insecure_fast(), &clock, seed())
            .await
            .expect("seed");
        assert_eq!(outcome, SeedOutcome::AlreadyPresent);
    }
}
