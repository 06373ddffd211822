//! Roles, named authorization policies and the authenticated caller.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Error, UserId};

/// Role names carried in the `role` claim and stored per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Assigned at registration.
    RegularUser,
    /// Granted to a user when they create a group.
    GroupAdmin,
    /// Platform operator; seeded from configuration.
    SuperAdmin,
}

impl Role {
    /// Claim and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegularUser => "RegularUser",
            Self::GroupAdmin => "GroupAdmin",
            Self::SuperAdmin => "SuperAdmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or claimed role name is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RegularUser" => Ok(Self::RegularUser),
            "GroupAdmin" => Ok(Self::GroupAdmin),
            "SuperAdmin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Ordered set of roles held by a user.
pub type RoleSet = BTreeSet<Role>;

/// Named policies evaluated against role claims.
///
/// Policies are role-level: they do not know which group a request targets.
/// Services add per-group ownership checks on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Requires `SuperAdmin`.
    SuperAdminOnly,
    /// Requires `SuperAdmin` or `GroupAdmin`.
    GroupAdminOnly,
}

impl Policy {
    /// Whether `roles` satisfy the policy.
    ///
    /// # Examples
    /// ```
    /// use ideahub::domain::{Policy, Role, RoleSet};
    ///
    /// let roles = RoleSet::from([Role::RegularUser, Role::GroupAdmin]);
    /// assert!(Policy::GroupAdminOnly.allows(&roles));
    /// assert!(!Policy::SuperAdminOnly.allows(&roles));
    /// ```
    #[must_use]
    pub fn allows(self, roles: &RoleSet) -> bool {
        match self {
            Self::SuperAdminOnly => roles.contains(&Role::SuperAdmin),
            Self::GroupAdminOnly => {
                roles.contains(&Role::SuperAdmin) || roles.contains(&Role::GroupAdmin)
            }
        }
    }
}

/// Authenticated caller as established by a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    roles: RoleSet,
}

impl Actor {
    /// Build an actor from a user id and its role claims.
    #[must_use]
    pub const fn new(user_id: UserId, roles: RoleSet) -> Self {
        Self { user_id, roles }
    }

    /// Caller's user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Caller's role claims.
    #[must_use]
    pub const fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Whether the caller holds `SuperAdmin`.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.roles.contains(&Role::SuperAdmin)
    }

    /// Fail with `Forbidden` unless the caller satisfies `policy`.
    ///
    /// # Errors
    /// Returns [`Error::forbidden`] when the role claims do not satisfy the
    /// policy.
    pub fn require(&self, policy: Policy) -> Result<(), Error> {
        if policy.allows(&self.roles) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.user_id, ?policy, "policy rejected caller");
            Err(Error::forbidden("you do not have permission to perform this action"))
        }
    }
}
