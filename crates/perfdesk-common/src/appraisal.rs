//! Appraisal records and the forward-only appraisal status machine.
//!
//! # Purpose
//! Defines stored appraisals, create/update payloads, and the
//! `DRAFT -> SUBMITTED -> COMPLETED` lifecycle.
//!
//! # Key invariants
//! - Status never moves backwards and never skips a step.
//! - `COMPLETED` is terminal: no status change and no field edits.
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const NEUTRAL_RATING: f64 = 3.0;
pub const MIN_APPRAISAL_RATING: f64 = 1.0;
pub const MAX_APPRAISAL_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppraisalStatus {
    #[default]
    Draft,
    Submitted,
    Completed,
}

impl AppraisalStatus {
    fn rank(self) -> u8 {
        match self {
            AppraisalStatus::Draft => 0,
            AppraisalStatus::Submitted => 1,
            AppraisalStatus::Completed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == AppraisalStatus::Completed
    }

    /// Whether a record in this status may be moved to `next`.
    ///
    /// Staying in place is allowed for editable states so that content edits
    /// do not need a status change; `COMPLETED` accepts nothing.
    pub fn can_transition_to(self, next: AppraisalStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() == self.rank() || next.rank() == self.rank() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Appraisal {
    pub id: Uuid,
    pub employee_id: UserId,
    pub manager_id: UserId,
    pub period: String,
    pub rating: f64,
    pub achievements: String,
    pub improvements: String,
    pub goals: String,
    pub manager_comments: String,
    pub employee_comments: Option<String>,
    pub status: AppraisalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppraisalDraft {
    pub employee_id: Option<UserId>,
    pub manager_id: Option<UserId>,
    #[serde(default)]
    pub period: String,
    pub rating: Option<f64>,
    #[serde(default)]
    pub achievements: String,
    #[serde(default)]
    pub improvements: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub manager_comments: String,
    pub employee_comments: Option<String>,
    pub status: Option<AppraisalStatus>,
}

impl AppraisalDraft {
    /// Checks the minimum viable fields and returns the owning pair.
    pub fn validate(&self) -> Result<(UserId, UserId), String> {
        let employee = self
            .employee_id
            .clone()
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or_else(|| "employee_id is required".to_string())?;
        let manager = self
            .manager_id
            .clone()
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or_else(|| "manager_id is required".to_string())?;
        if self.period.trim().is_empty() {
            return Err("period is required".to_string());
        }
        validate_rating(self.rating)?;
        if self.status.is_some_and(|status| status != AppraisalStatus::Draft) {
            return Err("appraisals are created as DRAFT".to_string());
        }
        Ok((employee, manager))
    }

    pub fn into_appraisal(self, employee: UserId, manager: UserId) -> Appraisal {
        let now = Utc::now();
        Appraisal {
            id: Uuid::new_v4(),
            employee_id: employee,
            manager_id: manager,
            period: self.period.trim().to_string(),
            rating: self.rating.unwrap_or(NEUTRAL_RATING),
            achievements: self.achievements,
            improvements: self.improvements,
            goals: self.goals,
            manager_comments: self.manager_comments,
            employee_comments: self.employee_comments,
            status: AppraisalStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full edit of an appraisal's mutable fields, optionally moving its status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppraisalUpdate {
    pub period: Option<String>,
    pub rating: Option<f64>,
    pub achievements: Option<String>,
    pub improvements: Option<String>,
    pub goals: Option<String>,
    pub manager_comments: Option<String>,
    pub employee_comments: Option<String>,
    pub status: Option<AppraisalStatus>,
}

impl AppraisalUpdate {
    /// Edit draft seeded from the stored record.
    pub fn from_appraisal(appraisal: &Appraisal) -> Self {
        Self {
            period: Some(appraisal.period.clone()),
            rating: Some(appraisal.rating),
            achievements: Some(appraisal.achievements.clone()),
            improvements: Some(appraisal.improvements.clone()),
            goals: Some(appraisal.goals.clone()),
            manager_comments: Some(appraisal.manager_comments.clone()),
            employee_comments: appraisal.employee_comments.clone(),
            status: Some(appraisal.status),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(period) = &self.period {
            if period.trim().is_empty() {
                return Err("period cannot be blank".to_string());
            }
        }
        validate_rating(self.rating)
    }

    pub fn apply(self, appraisal: &mut Appraisal) {
        if let Some(period) = self.period {
            appraisal.period = period.trim().to_string();
        }
        if let Some(rating) = self.rating {
            appraisal.rating = rating;
        }
        if let Some(achievements) = self.achievements {
            appraisal.achievements = achievements;
        }
        if let Some(improvements) = self.improvements {
            appraisal.improvements = improvements;
        }
        if let Some(goals) = self.goals {
            appraisal.goals = goals;
        }
        if let Some(comments) = self.manager_comments {
            appraisal.manager_comments = comments;
        }
        if let Some(comments) = self.employee_comments {
            appraisal.employee_comments = Some(comments);
        }
        if let Some(status) = self.status {
            appraisal.status = status;
        }
        appraisal.updated_at = Utc::now();
    }
}

fn validate_rating(rating: Option<f64>) -> Result<(), String> {
    match rating {
        Some(value) if !(MIN_APPRAISAL_RATING..=MAX_APPRAISAL_RATING).contains(&value) => Err(
            format!("rating must be between {MIN_APPRAISAL_RATING} and {MAX_APPRAISAL_RATING}"),
        ),
        _ => Ok(()),
    }
}
