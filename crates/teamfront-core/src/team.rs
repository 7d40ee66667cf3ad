#![forbid(unsafe_code)]

//! Team domain shapes exchanged with the backend.
//!
//! These are wire contracts only: snake_case keys, RFC 3339 timestamps, and
//! optional fields omitted when absent. Nothing here validates or rewrites
//! what the backend sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact user view embedded in team payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub captain_id: String,
    pub max_members: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captain: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_count: Option<u32>,
}

impl Team {
    /// Remaining seats, when the backend included a member count.
    #[must_use]
    pub fn open_slots(&self) -> Option<u32> {
        self.members_count
            .map(|count| self.max_members.saturating_sub(count))
    }

    /// `Some(true)` once the roster is at capacity; `None` without a count.
    #[must_use]
    pub fn is_full(&self) -> Option<bool> {
        self.open_slots().map(|open| open == 0)
    }
}

/// Role of a member within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Captain,
    Member,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl TeamMember {
    #[must_use]
    pub fn is_captain(&self) -> bool {
        self.role == TeamRole::Captain
    }
}

/// Lifecycle state of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvite {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Box<Team>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl TeamInvite {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }
}

/// Body of a create-team submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeamData {
    pub name: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_members: Option<u32>,
}

impl CreateTeamData {
    #[must_use]
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            description: None,
            max_members: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_max_members(mut self, max_members: u32) -> Self {
        self.max_members = Some(max_members);
        self
    }
}
