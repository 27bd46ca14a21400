//! Performance goal records and payloads.
//!
//! # Purpose
//! Defines stored goals plus the create/patch payloads accepted by the goal
//! lifecycle manager.
//!
//! # Notes
//! Goal status is free-form: any authorised editor may set any status,
//! including moving a `COMPLETED` goal back to `ON_TRACK`. Only progress is
//! range-checked.
use crate::ids::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MAX_PROGRESS: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    #[default]
    OnTrack,
    AtRisk,
    Completed,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Goal {
    pub id: Uuid,
    /// Assignee.
    pub user_id: UserId,
    pub assigned_by_id: Option<UserId>,
    pub title: String,
    pub description: String,
    pub status: GoalStatus,
    pub progress: u8,
    pub target: f64,
    pub current: f64,
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub goal_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload. `user_id` defaults to the creator when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GoalDraft {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<GoalStatus>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "type")]
    pub goal_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub progress: Option<u8>,
    pub target: Option<f64>,
    pub current: Option<f64>,
    pub due_date: Option<NaiveDate>,
}

impl GoalDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("goal title is required".to_string());
        }
        validate_progress(self.progress)
    }

    /// Materialise a goal for `assignee`; `assigned_by` is set when the creator
    /// is somebody else.
    pub fn into_goal(self, assignee: UserId, assigned_by: Option<UserId>) -> Goal {
        let now = Utc::now();
        Goal {
            id: Uuid::new_v4(),
            user_id: assignee,
            assigned_by_id: assigned_by,
            title: self.title.trim().to_string(),
            description: self.description,
            status: self.status.unwrap_or_default(),
            progress: self.progress.unwrap_or(0),
            target: self.target,
            current: self.current,
            due_date: self.due_date,
            goal_type: self.goal_type,
            created_at: now,
            updated_at: now,
        }
    }
}

impl GoalPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("goal title cannot be blank".to_string());
            }
        }
        validate_progress(self.progress)
    }

    pub fn apply(self, goal: &mut Goal) {
        if let Some(title) = self.title {
            goal.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            goal.description = description;
        }
        if let Some(status) = self.status {
            goal.status = status;
        }
        if let Some(progress) = self.progress {
            goal.progress = progress;
        }
        if let Some(target) = self.target {
            goal.target = target;
        }
        if let Some(current) = self.current {
            goal.current = current;
        }
        if let Some(due_date) = self.due_date {
            goal.due_date = Some(due_date);
        }
        goal.updated_at = Utc::now();
    }
}

fn validate_progress(progress: Option<u8>) -> Result<(), String> {
    match progress {
        Some(value) if value > MAX_PROGRESS => {
            Err(format!("progress must be between 0 and {MAX_PROGRESS}"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> GoalDraft {
        GoalDraft {
            title: title.to_string(),
            ..GoalDraft::default()
        }
    }

    #[test]
    fn draft_requires_title_and_bounded_progress() {
        assert!(draft("  ").validate().is_err());
        let mut over = draft("Ship v2");
        over.progress = Some(101);
        assert!(over.validate().is_err());
        over.progress = Some(100);
        assert!(over.validate().is_ok());
    }

    #[test]
    fn completed_goal_can_be_reopened_by_patch() {
        let mut goal = draft("Close books").into_goal(UserId::new("u1"), None);
        goal.status = GoalStatus::Completed;
        GoalPatch {
            status: Some(GoalStatus::OnTrack),
            progress: Some(40),
            ..GoalPatch::default()
        }
        .apply(&mut goal);
        assert_eq!(goal.status, GoalStatus::OnTrack);
        assert_eq!(goal.progress, 40);
    }

    #[test]
    fn status_uses_screaming_snake_case() {
        let json = serde_json::to_string(&GoalStatus::AtRisk).expect("json");
        assert_eq!(json, "\"AT_RISK\"");
    }
}
