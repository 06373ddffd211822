//! Projects grown from promoted ideas.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Deletion, GroupId, IdeaId, ProjectId, SoftDeletable, Title, UserId};

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    Shelved,
    Cancelled,
}

impl ProjectStatus {
    const ALL: [Self; 5] = [
        Self::Planning,
        Self::Active,
        Self::Completed,
        Self::Shelved,
        Self::Cancelled,
    ];

    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Shelved => "Shelved",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for an unknown project status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid project status: {0}")]
pub struct InvalidProjectStatus(pub String);

impl FromStr for ProjectStatus {
    type Err = InvalidProjectStatus;

    /// Case-insensitive parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidProjectStatus(s.to_owned()))
    }
}

/// Stored project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub title: Title,
    pub description: String,
    pub status: ProjectStatus,
    pub created_by: UserId,
    pub overseen_by: UserId,
    pub idea_id: IdeaId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deletion: Deletion,
}

impl Project {
    /// Whether `user` may edit the project (creator or overseer).
    #[must_use]
    pub fn is_editable_by(&self, user: &UserId) -> bool {
        self.created_by == *user || self.overseen_by == *user
    }
}

impl SoftDeletable for Project {
    fn deletion(&self) -> &Deletion {
        &self.deletion
    }

    fn deletion_mut(&mut self) -> &mut Deletion {
        &mut self.deletion
    }
}

/// Project to be stored; starts in `Planning`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: Title,
    pub description: String,
    pub created_by: UserId,
    pub overseen_by: UserId,
    pub idea_id: IdeaId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
}

/// Partial update. The overseer is already resolved from an email.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub overseen_by: Option<UserId>,
    pub status: Option<ProjectStatus>,
}

impl ProjectChanges {
    /// Apply the present fields and stamp `updated_at`.
    pub fn apply_to(self, project: &mut Project, at: DateTime<Utc>) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(overseer) = self.overseen_by {
            project.overseen_by = overseer;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        project.updated_at = Some(at);
    }
}

/// Project as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[schema(value_type = i64)]
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    #[schema(value_type = String, format = Uuid)]
    pub created_by_user_id: UserId,
    #[schema(value_type = String, format = Uuid)]
    pub overseen_by_user_id: UserId,
    pub overseen_by_user_name: String,
    #[schema(value_type = i64)]
    pub idea_id: IdeaId,
    pub idea_title: String,
    #[schema(value_type = i64)]
    pub group_id: GroupId,
    pub group_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("planning", ProjectStatus::Planning)]
    #[case("ACTIVE", ProjectStatus::Active)]
    #[case("Completed", ProjectStatus::Completed)]
    #[case("shelved", ProjectStatus::Shelved)]
    #[case("cancelled", ProjectStatus::Cancelled)]
    fn parses_every_status(#[case] raw: &str, #[case] expected: ProjectStatus) {
        assert_eq!(raw.parse::<ProjectStatus>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_status() {
        assert_eq!(
            "done".parse::<ProjectStatus>(),
            Err(InvalidProjectStatus("done".to_owned()))
        );
    }
}
