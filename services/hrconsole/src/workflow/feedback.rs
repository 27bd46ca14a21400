//! Feedback and feedback-request workflow.
//!
//! # Request state machine
//! `PENDING -> ACCEPTED` (asked party acknowledges), `PENDING|ACCEPTED ->
//! COMPLETED` (asked party responds), `PENDING|ACCEPTED -> DECLINED` (either
//! party dismisses). `COMPLETED` and `DECLINED` are terminal.
//!
//! # Linkage
//! A response is stored with `responds_to_request_id` set, and the request is
//! then completed by id. If completing the request fails the feedback is kept
//! and the outcome says so; the request stays open, and responding again
//! completes it with the stored answer instead of writing a second one.
use super::{
    Mutation, Workflow, WorkflowError, WorkflowResult, conceal, count_op, deny, role_reason,
};
use crate::store::StoreError;
use perfdesk_authz::{
    DenyReason, can_request_or_give_feedback, can_view_feedback_about, partition_received,
    visible_feedback_recipients,
};
use perfdesk_common::{
    Feedback, FeedbackBuckets, FeedbackDraft, FeedbackRequest, FeedbackRequestDraft, FeedbackType,
    Principal, RequestStatus, User, UserFilter, UserId, ViewEffect,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// What the asked party fills in when responding. Recipient, type and period
/// are taken from the request and cannot be changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestReply {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RespondOutcome {
    pub feedback: Feedback,
    /// The completed request; `None` when completing it failed.
    pub request: Option<FeedbackRequest>,
    pub request_completed: bool,
    pub effect: ViewEffect,
}

impl Workflow {
    pub async fn create_feedback(
        &self,
        principal: &Principal,
        draft: FeedbackDraft,
    ) -> WorkflowResult<Mutation<Feedback>> {
        let feedback = self.store_feedback(principal, draft, None).await?;
        Ok(Mutation::new(feedback, ViewEffect::InsertLocal))
    }

    async fn store_feedback(
        &self,
        principal: &Principal,
        draft: FeedbackDraft,
        responds_to: Option<Uuid>,
    ) -> WorkflowResult<Feedback> {
        if !can_request_or_give_feedback(principal) {
            return Err(deny(
                "feedback.create",
                principal,
                role_reason(principal),
                "feedback",
            ));
        }
        draft.validate().map_err(WorkflowError::Validation)?;

        let (recipient, feedback_type) = match draft.recipient_id.clone() {
            None => (principal.id.clone(), FeedbackType::SelfAssessment),
            Some(recipient) if recipient == principal.id => {
                (recipient, FeedbackType::SelfAssessment)
            }
            Some(recipient) => {
                let feedback_type = match draft.feedback_type {
                    Some(FeedbackType::SelfAssessment) => {
                        return Err(WorkflowError::Validation(
                            "self-assessment must be about yourself".to_string(),
                        ));
                    }
                    Some(feedback_type) => feedback_type,
                    None => {
                        return Err(WorkflowError::Validation(
                            "feedback type is required".to_string(),
                        ));
                    }
                };
                // A response goes back to whoever asked; the request names them.
                if responds_to.is_none() {
                    self.ensure_recipient_visible("feedback.create", principal, &recipient)
                        .await?;
                }
                (recipient, feedback_type)
            }
        };

        let is_anonymous = draft.is_anonymous
            && self.settings.anonymous_feedback_enabled
            && feedback_type != FeedbackType::SelfAssessment;
        let feedback = Feedback {
            id: Uuid::new_v4(),
            recipient_id: recipient,
            reviewer_id: principal.id.clone(),
            feedback_type,
            rating: draft.rating,
            comment: draft.comment,
            review_period: draft.review_period.trim().to_string(),
            is_anonymous,
            responds_to_request_id: responds_to,
            created_at: chrono::Utc::now(),
        };
        let feedback = match self.store.create_feedback(feedback).await {
            Ok(feedback) => feedback,
            Err(StoreError::Conflict(what)) if responds_to.is_some() => {
                return Err(WorkflowError::InvalidTransition(what));
            }
            Err(err) => return Err(err.into()),
        };
        count_op("feedback.create");
        tracing::info!(
            feedback_id = %feedback.id,
            recipient = %feedback.recipient_id,
            kind = ?feedback.feedback_type,
            anonymous = feedback.is_anonymous,
            "feedback created"
        );
        Ok(feedback)
    }

    async fn ensure_recipient_visible(
        &self,
        action: &'static str,
        principal: &Principal,
        recipient: &UserId,
    ) -> WorkflowResult<User> {
        let user = self.directory.get_user(recipient).await?;
        if visible_feedback_recipients(principal, std::slice::from_ref(&user)).is_empty() {
            return Err(conceal(
                action,
                principal,
                DenyReason::OutsideDepartment,
                &format!("user {recipient}"),
            ));
        }
        Ok(user)
    }

    /// Feedback received by `recipient` (default: the caller), bucketed by
    /// type with anonymous reviewers redacted.
    pub async fn received_feedback(
        &self,
        principal: &Principal,
        recipient: Option<UserId>,
    ) -> WorkflowResult<FeedbackBuckets> {
        let recipient = recipient.unwrap_or_else(|| principal.id.clone());
        let department = self.department_of(&recipient).await?;
        if !can_view_feedback_about(principal, &recipient, department.as_ref()) {
            if recipient == principal.id {
                return Err(deny(
                    "feedback.received",
                    principal,
                    role_reason(principal),
                    "feedback",
                ));
            }
            return Err(conceal(
                "feedback.received",
                principal,
                DenyReason::OutsideDepartment,
                &format!("user {recipient}"),
            ));
        }
        let items = self.store.list_feedback_received(&recipient).await?;
        Ok(partition_received(principal, items))
    }

    pub async fn given_feedback(&self, principal: &Principal) -> WorkflowResult<Vec<Feedback>> {
        if !can_request_or_give_feedback(principal) {
            return Err(deny(
                "feedback.given",
                principal,
                role_reason(principal),
                "feedback",
            ));
        }
        Ok(self.store.list_feedback_given(&principal.id).await?)
    }

    /// Users the caller may give feedback to or ask feedback from.
    pub async fn feedback_recipients(&self, principal: &Principal) -> WorkflowResult<Vec<User>> {
        let users = self.directory.list_users(&UserFilter::default()).await?;
        Ok(visible_feedback_recipients(principal, &users)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn create_request(
        &self,
        principal: &Principal,
        draft: FeedbackRequestDraft,
    ) -> WorkflowResult<Mutation<FeedbackRequest>> {
        if !can_request_or_give_feedback(principal) {
            return Err(deny(
                "feedback_request.create",
                principal,
                role_reason(principal),
                "feedback request",
            ));
        }
        draft.validate().map_err(WorkflowError::Validation)?;
        if draft.recipient_id == principal.id {
            return Err(WorkflowError::Validation(
                "cannot request feedback from yourself".to_string(),
            ));
        }
        let asked = self
            .ensure_recipient_visible("feedback_request.create", principal, &draft.recipient_id)
            .await?;
        if !can_request_or_give_feedback(&asked.as_principal()) {
            return Err(WorkflowError::Validation(format!(
                "user {} cannot give feedback",
                asked.id
            )));
        }

        let request = self
            .store
            .create_request(draft.into_request(principal.id.clone()))
            .await?;
        count_op("feedback_request.create");
        tracing::info!(
            request_id = %request.id,
            requester = %request.requester_id,
            asked = %request.recipient_id,
            "feedback requested"
        );
        Ok(Mutation::new(request, ViewEffect::InsertLocal))
    }

    /// Open requests waiting for the caller to respond.
    pub async fn pending_requests(
        &self,
        principal: &Principal,
    ) -> WorkflowResult<Vec<FeedbackRequest>> {
        let requests = self.store.list_requests_for(&principal.id).await?;
        Ok(requests
            .into_iter()
            .filter(|request| request.status.is_open())
            .collect())
    }

    pub async fn sent_requests(
        &self,
        principal: &Principal,
    ) -> WorkflowResult<Vec<FeedbackRequest>> {
        Ok(self.store.list_requests_by(&principal.id).await?)
    }

    /// Load a request the caller takes part in. Requests between other people
    /// are reported as missing.
    async fn involved_request(
        &self,
        action: &'static str,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<FeedbackRequest> {
        let request = self.store.get_request(id).await?;
        if !request.involves(&principal.id) {
            return Err(conceal(
                action,
                principal,
                DenyReason::NotOwner,
                &format!("feedback request {id}"),
            ));
        }
        Ok(request)
    }

    /// Load a request only its asked party may act on.
    async fn asked_request(
        &self,
        action: &'static str,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<FeedbackRequest> {
        let request = self.involved_request(action, principal, id).await?;
        if request.recipient_id != principal.id {
            return Err(deny(
                action,
                principal,
                DenyReason::NotOwner,
                "feedback request",
            ));
        }
        Ok(request)
    }

    /// Feedback draft pre-filled from the request for the asked party.
    pub async fn response_draft(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<FeedbackDraft> {
        let request = self
            .asked_request("feedback_request.respond", principal, id)
            .await?;
        if request.status.is_terminal() {
            return Err(terminal_request(&request));
        }
        Ok(request.response_draft())
    }

    pub async fn respond_to_request(
        &self,
        principal: &Principal,
        id: Uuid,
        reply: RequestReply,
    ) -> WorkflowResult<RespondOutcome> {
        let request = self
            .asked_request("feedback_request.respond", principal, id)
            .await?;
        if request.status.is_terminal() {
            return Err(terminal_request(&request));
        }

        let mut draft = request.response_draft();
        draft.rating = reply.rating;
        draft.comment = reply.comment;
        draft.is_anonymous = reply.is_anonymous;
        let feedback = match self.store_feedback(principal, draft, Some(request.id)).await {
            Ok(feedback) => feedback,
            // Answered before but never completed: finish the completion
            // with the stored answer instead of writing a second one.
            Err(WorkflowError::InvalidTransition(what)) => self
                .stored_response(principal, request.id)
                .await?
                .ok_or(WorkflowError::InvalidTransition(what))?,
            Err(err) => return Err(err),
        };

        match self.complete_request(request.id).await {
            Ok(completed) => {
                count_op("feedback_request.respond");
                tracing::info!(
                    request_id = %completed.id,
                    feedback_id = %feedback.id,
                    "feedback request completed"
                );
                Ok(RespondOutcome {
                    feedback,
                    request: Some(completed),
                    request_completed: true,
                    effect: ViewEffect::RemoveLocal,
                })
            }
            Err(err) => {
                tracing::warn!(
                    request_id = %request.id,
                    feedback_id = %feedback.id,
                    error = %err,
                    "feedback stored but request completion failed"
                );
                metrics::counter!(
                    "perfdesk_workflow_partial_failures_total",
                    "op" => "feedback_request.respond"
                )
                .increment(1);
                Ok(RespondOutcome {
                    feedback,
                    request: None,
                    request_completed: false,
                    effect: ViewEffect::Refetch,
                })
            }
        }
    }

    async fn stored_response(
        &self,
        principal: &Principal,
        request_id: Uuid,
    ) -> WorkflowResult<Option<Feedback>> {
        let given = self.store.list_feedback_given(&principal.id).await?;
        Ok(given
            .into_iter()
            .find(|feedback| feedback.responds_to_request_id == Some(request_id)))
    }

    /// Move a request to `COMPLETED`. Losing the race to a concurrent
    /// completion still counts as completed.
    async fn complete_request(&self, id: Uuid) -> Result<FeedbackRequest, StoreError> {
        match self
            .store
            .patch_request_status(id, RequestStatus::Completed)
            .await
        {
            Err(StoreError::Conflict(what)) => {
                let current = self.store.get_request(id).await?;
                if current.status == RequestStatus::Completed {
                    Ok(current)
                } else {
                    Err(StoreError::Conflict(what))
                }
            }
            other => other,
        }
    }

    /// Acknowledge a request; accepting twice is a no-op.
    pub async fn accept_request(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<Mutation<FeedbackRequest>> {
        let request = self
            .asked_request("feedback_request.accept", principal, id)
            .await?;
        match request.status {
            RequestStatus::Accepted => Ok(Mutation::new(request, ViewEffect::ReplaceLocal)),
            RequestStatus::Pending => {
                let accepted = self
                    .store
                    .patch_request_status(id, RequestStatus::Accepted)
                    .await
                    .map_err(transition_conflict)?;
                count_op("feedback_request.accept");
                Ok(Mutation::new(accepted, ViewEffect::ReplaceLocal))
            }
            _ => Err(terminal_request(&request)),
        }
    }

    /// Decline a request. Either party may dismiss; dismissing an already
    /// declined request succeeds without changing it.
    pub async fn dismiss_request(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<Mutation<FeedbackRequest>> {
        let request = self
            .involved_request("feedback_request.dismiss", principal, id)
            .await?;
        match request.status {
            RequestStatus::Declined => Ok(Mutation::new(request, ViewEffect::RemoveLocal)),
            RequestStatus::Completed => Err(terminal_request(&request)),
            RequestStatus::Pending | RequestStatus::Accepted => {
                match self
                    .store
                    .patch_request_status(id, RequestStatus::Declined)
                    .await
                {
                    Ok(declined) => {
                        count_op("feedback_request.dismiss");
                        tracing::info!(
                            request_id = %declined.id,
                            by = %principal.id,
                            "feedback request declined"
                        );
                        Ok(Mutation::new(declined, ViewEffect::RemoveLocal))
                    }
                    Err(StoreError::Conflict(_)) => {
                        // Lost a race; only a concurrent decline counts as success.
                        let current = self.store.get_request(id).await?;
                        if current.status == RequestStatus::Declined {
                            Ok(Mutation::new(current, ViewEffect::RemoveLocal))
                        } else {
                            Err(terminal_request(&current))
                        }
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}

fn terminal_request(request: &FeedbackRequest) -> WorkflowError {
    WorkflowError::InvalidTransition(format!(
        "feedback request {} is already {:?}",
        request.id, request.status
    ))
}

fn transition_conflict(err: StoreError) -> WorkflowError {
    match err {
        StoreError::Conflict(what) => WorkflowError::InvalidTransition(what),
        other => other.into(),
    }
}
