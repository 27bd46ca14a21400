//! Feedback and feedback-request records.
//!
//! # Purpose
//! Defines 360° feedback entries, the separate request entity that asks a
//! colleague for feedback, and the request status machine.
//!
//! # Key invariants
//! - `DECLINED` and `COMPLETED` requests never transition again.
//! - A feedback written in response to a request carries the request id in
//!   `responds_to_request_id`; linkage is never inferred from matching fields.
//! - `SELF` feedback is the only kind where reviewer and recipient coincide.
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum FeedbackType {
    #[serde(rename = "SELF")]
    SelfAssessment,
    #[serde(rename = "PEER")]
    Peer,
    #[serde(rename = "MANAGER")]
    Manager,
    #[serde(rename = "SUBORDINATE")]
    Subordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Feedback {
    pub id: Uuid,
    pub recipient_id: UserId,
    pub reviewer_id: UserId,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub rating: u8,
    pub comment: String,
    pub review_period: String,
    pub is_anonymous: bool,
    pub responds_to_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Feedback as shown to a viewer; `reviewer_id` is withheld for anonymous
/// entries unless the viewer may see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceivedFeedback {
    pub id: Uuid,
    pub recipient_id: UserId,
    pub reviewer_id: Option<UserId>,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub rating: u8,
    pub comment: String,
    pub review_period: String,
    pub is_anonymous: bool,
    pub responds_to_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ReceivedFeedback {
    pub fn from_feedback(feedback: Feedback, reveal_reviewer: bool) -> Self {
        let reviewer_id = if feedback.is_anonymous && !reveal_reviewer {
            None
        } else {
            Some(feedback.reviewer_id)
        };
        Self {
            id: feedback.id,
            recipient_id: feedback.recipient_id,
            reviewer_id,
            feedback_type: feedback.feedback_type,
            rating: feedback.rating,
            comment: feedback.comment,
            review_period: feedback.review_period,
            is_anonymous: feedback.is_anonymous,
            responds_to_request_id: feedback.responds_to_request_id,
            created_at: feedback.created_at,
        }
    }
}

/// Inbound feedback split by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackBuckets {
    pub peer: Vec<ReceivedFeedback>,
    pub manager: Vec<ReceivedFeedback>,
    pub self_assessment: Vec<ReceivedFeedback>,
    pub subordinate: Vec<ReceivedFeedback>,
}

impl FeedbackBuckets {
    pub fn push(&mut self, item: ReceivedFeedback) {
        match item.feedback_type {
            FeedbackType::Peer => self.peer.push(item),
            FeedbackType::Manager => self.manager.push(item),
            FeedbackType::SelfAssessment => self.self_assessment.push(item),
            FeedbackType::Subordinate => self.subordinate.push(item),
        }
    }

    pub fn len(&self) -> usize {
        self.peer.len() + self.manager.len() + self.self_assessment.len() + self.subordinate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create payload for feedback. A missing recipient means a self-assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackDraft {
    #[serde(default)]
    pub recipient_id: Option<UserId>,
    #[serde(default, rename = "type")]
    pub feedback_type: Option<FeedbackType>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub review_period: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl FeedbackDraft {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            ));
        }
        if self.review_period.trim().is_empty() {
            return Err("review period is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Declined | RequestStatus::Completed)
    }

    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Declined)
                | (RequestStatus::Pending, RequestStatus::Completed)
                | (RequestStatus::Accepted, RequestStatus::Declined)
                | (RequestStatus::Accepted, RequestStatus::Completed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub id: Uuid,
    pub requester_id: UserId,
    /// The person asked to give feedback.
    pub recipient_id: UserId,
    pub feedback_type: FeedbackType,
    pub review_period: String,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackRequest {
    pub fn involves(&self, user: &UserId) -> bool {
        &self.requester_id == user || &self.recipient_id == user
    }

    /// Feedback pre-filled for the asked party: the requester becomes the
    /// recipient and the requested type and period are fixed.
    pub fn response_draft(&self) -> FeedbackDraft {
        FeedbackDraft {
            recipient_id: Some(self.requester_id.clone()),
            feedback_type: Some(self.feedback_type),
            rating: MIN_RATING,
            comment: String::new(),
            review_period: self.review_period.clone(),
            is_anonymous: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRequestDraft {
    pub recipient_id: UserId,
    pub feedback_type: FeedbackType,
    pub review_period: String,
    #[serde(default)]
    pub message: String,
}

impl FeedbackRequestDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.feedback_type == FeedbackType::SelfAssessment {
            return Err("self-assessments are not requested from others".to_string());
        }
        if self.review_period.trim().is_empty() {
            return Err("review period is required".to_string());
        }
        Ok(())
    }

    pub fn into_request(self, requester: UserId) -> FeedbackRequest {
        let now = Utc::now();
        FeedbackRequest {
            id: Uuid::new_v4(),
            requester_id: requester,
            recipient_id: self.recipient_id,
            feedback_type: self.feedback_type,
            review_period: self.review_period.trim().to_string(),
            message: self.message,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
