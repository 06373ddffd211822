//! Groups, memberships and the join-request workflow.
//!
//! A join request moves `Pending -> Approved` or `Pending -> Rejected` and
//! never leaves a terminal state. The transition itself lives on
//! [`MembershipRequest::decide`]; persisting it is a compare-and-swap on the
//! `pending` status so a request can only be decided once.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Deletion, GroupId, MembershipRequestId, SoftDeletable, Title, UserId, UserSummary};

/// Stored group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: Title,
    pub description: String,
    pub is_active: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub deletion: Deletion,
}

impl Group {
    /// Whether `user` created this group.
    #[must_use]
    pub fn is_created_by(&self, user: &UserId) -> bool {
        self.created_by == *user
    }
}

impl SoftDeletable for Group {
    fn deletion(&self) -> &Deletion {
        &self.deletion
    }

    fn deletion_mut(&mut self) -> &mut Deletion {
        &mut self.deletion
    }
}

/// Group to be created; the creator joins it as its first member.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: Title,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a group's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupChanges {
    pub name: Option<Title>,
    pub description: Option<String>,
}

impl GroupChanges {
    /// Apply the present fields to `group`.
    pub fn apply_to(self, group: &mut Group) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(description) = self.description {
            group.description = description;
        }
    }
}

/// Group list entry as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupOverview {
    #[schema(value_type = i64)]
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = Uuid)]
    pub created_by_user_id: UserId,
    pub created_by: Option<UserSummary>,
    pub is_member: bool,
    pub has_pending_request: bool,
    pub member_count: i64,
    pub idea_count: i64,
}

/// Single group with its member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    #[schema(value_type = i64)]
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub members: Vec<UserSummary>,
}

/// Join request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MembershipStatus {
    Pending,
    Approved,
    Rejected,
}

impl MembershipStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Raised when a stored status value is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown membership status: {0}")]
pub struct UnknownMembershipStatus(pub String);

impl FromStr for MembershipStatus {
    type Err = UnknownMembershipStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownMembershipStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Raised when deciding a request that is no longer pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("membership request already decided as {0}")]
pub struct AlreadyDecided(pub MembershipStatus);

/// Join request for a (user, group) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    #[schema(value_type = i64)]
    pub id: MembershipRequestId,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    #[schema(value_type = i64)]
    pub group_id: GroupId,
    pub status: MembershipStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl MembershipRequest {
    /// Move a pending request to its terminal state.
    ///
    /// # Errors
    /// Returns [`AlreadyDecided`] unless the request is pending.
    pub fn decide(&mut self, decision: Decision, at: DateTime<Utc>) -> Result<(), AlreadyDecided> {
        if self.status != MembershipStatus::Pending {
            return Err(AlreadyDecided(self.status));
        }
        self.status = match decision {
            Decision::Approve => MembershipStatus::Approved,
            Decision::Reject => MembershipStatus::Rejected,
        };
        self.decided_at = Some(at);
        Ok(())
    }
}

/// Join request to be stored as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembershipRequest {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub requested_at: DateTime<Utc>,
}

/// Pending request as listed for group admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestView {
    #[schema(value_type = i64)]
    pub request_id: MembershipRequestId,
    #[schema(value_type = String, format = Uuid)]
    pub request_user_id: UserId,
    pub display_name: String,
    pub email: String,
    pub requested_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    fn pending() -> MembershipRequest {
        MembershipRequest {
            id: MembershipRequestId::new(1),
            user_id: UserId::random(),
            group_id: GroupId::new(7),
            status: MembershipStatus::Pending,
            requested_at: fixture_timestamp(),
            decided_at: None,
        }
    }

    #[rstest]
    #[case(Decision::Approve, MembershipStatus::Approved)]
    #[case(Decision::Reject, MembershipStatus::Rejected)]
    fn pending_requests_reach_terminal_state(
        #[case] decision: Decision,
        #[case] expected: MembershipStatus,
    ) {
        let mut request = pending();
        request
            .decide(decision, fixture_timestamp())
            .expect("pending request is decidable");
        assert_eq!(request.status, expected);
        assert_eq!(request.decided_at, Some(fixture_timestamp()));
    }

    #[rstest]
    #[case(Decision::Approve)]
    #[case(Decision::Reject)]
    fn terminal_states_are_final(#[case] second: Decision) {
        let mut request = pending();
        request
            .decide(Decision::Reject, fixture_timestamp())
            .expect("first decision");
        assert_eq!(
            request.decide(second, fixture_timestamp()),
            Err(AlreadyDecided(MembershipStatus::Rejected))
        );
    }

    #[rstest]
    #[case("pending", MembershipStatus::Pending)]
    #[case("approved", MembershipStatus::Approved)]
    #[case("rejected", MembershipStatus::Rejected)]
    fn status_storage_names(#[case] raw: &str, #[case] status: MembershipStatus) {
        assert_eq!(raw.parse::<MembershipStatus>(), Ok(status));
        assert_eq!(status.as_str(), raw);
    }

    #[test]
    fn changes_only_touch_present_fields() {
        let mut group = Group {
            id: GroupId::new(1),
            name: Title::new("Eng").expect("title"),
            description: "old".to_owned(),
            is_active: true,
            created_by: UserId::random(),
            created_at: fixture_timestamp(),
            deletion: Deletion::live(),
        };
        GroupChanges {
            name: None,
            description: Some("new".to_owned()),
        }
        .apply_to(&mut group);
        assert_eq!(group.name.as_ref(), "Eng");
        assert_eq!(group.description, "new");
    }
}
