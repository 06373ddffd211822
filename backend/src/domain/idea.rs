//! Ideas submitted to a group.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Deletion, GroupId, IdeaId, SoftDeletable, Title, UserId, UserSummary};

/// Lifecycle status of an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum IdeaStatus {
    Open,
    Closed,
}

impl IdeaStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for a status outside `Open`/`Closed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid idea status: {0}")]
pub struct InvalidIdeaStatus(pub String);

impl FromStr for IdeaStatus {
    type Err = InvalidIdeaStatus;

    /// Case-insensitive parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("open") {
            Ok(Self::Open)
        } else if trimmed.eq_ignore_ascii_case("closed") {
            Ok(Self::Closed)
        } else {
            Err(InvalidIdeaStatus(s.to_owned()))
        }
    }
}

/// Stored idea.
#[derive(Debug, Clone, PartialEq)]
pub struct Idea {
    pub id: IdeaId,
    pub title: Title,
    pub description: String,
    pub status: IdeaStatus,
    pub is_promoted_to_project: bool,
    pub author_id: UserId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deletion: Deletion,
}

impl SoftDeletable for Idea {
    fn deletion(&self) -> &Deletion {
        &self.deletion
    }

    fn deletion_mut(&mut self) -> &mut Deletion {
        &mut self.deletion
    }
}

/// Idea to be stored; starts `Open` and not promoted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIdea {
    pub title: Title,
    pub description: String,
    pub author_id: UserId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied by the idea's author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaChanges {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub status: Option<IdeaStatus>,
}

impl IdeaChanges {
    /// Apply the present fields and stamp `updated_at`.
    pub fn apply_to(self, idea: &mut Idea, at: DateTime<Utc>) {
        if let Some(title) = self.title {
            idea.title = title;
        }
        if let Some(description) = self.description {
            idea.description = description;
        }
        if let Some(status) = self.status {
            idea.status = status;
        }
        idea.updated_at = Some(at);
    }
}

/// Idea as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdeaView {
    #[schema(value_type = i64)]
    pub id: IdeaId,
    pub title: String,
    pub description: String,
    pub status: IdeaStatus,
    pub is_promoted_to_project: bool,
    pub author: UserSummary,
    #[schema(value_type = i64)]
    pub group_id: GroupId,
    pub group_name: String,
    pub vote_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    #[rstest]
    #[case("open", IdeaStatus::Open)]
    #[case("OPEN", IdeaStatus::Open)]
    #[case(" Closed ", IdeaStatus::Closed)]
    fn status_parses_case_insensitively(#[case] raw: &str, #[case] expected: IdeaStatus) {
        assert_eq!(raw.parse::<IdeaStatus>(), Ok(expected));
    }

    #[rstest]
    #[case("archived")]
    #[case("")]
    fn status_rejects_unknown_values(#[case] raw: &str) {
        assert!(raw.parse::<IdeaStatus>().is_err());
    }

    #[test]
    fn changes_stamp_updated_at() {
        let mut idea = Idea {
            id: IdeaId::new(1),
            title: Title::new("Old").expect("title"),
            description: "d".to_owned(),
            status: IdeaStatus::Open,
            is_promoted_to_project: false,
            author_id: UserId::random(),
            group_id: GroupId::new(1),
            created_at: fixture_timestamp(),
            updated_at: None,
            deletion: Deletion::live(),
        };
        IdeaChanges {
            status: Some(IdeaStatus::Closed),
            ..IdeaChanges::default()
        }
        .apply_to(&mut idea, fixture_timestamp());
        assert_eq!(idea.status, IdeaStatus::Closed);
        assert_eq!(idea.title.as_ref(), "Old");
        assert_eq!(idea.updated_at, Some(fixture_timestamp()));
    }
}
