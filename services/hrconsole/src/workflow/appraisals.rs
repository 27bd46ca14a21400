//! Appraisal lifecycle: `DRAFT -> SUBMITTED -> COMPLETED`.
//!
//! Edits are committed against the status currently stored, not the status
//! the editor loaded, and the store re-checks that status under its lock.
use super::{
    Mutation, Workflow, WorkflowError, WorkflowResult, conceal, count_op, deny, role_reason,
};
use crate::store::{OwnerFilter, StoreError};
use perfdesk_authz::{
    DenyReason, appraisal_edit_decision, can_create_appraisal, can_view_all_appraisals,
    can_view_appraisal, visible_appraisals, within_scope,
};
use perfdesk_common::{
    Appraisal, AppraisalDraft, AppraisalStatus, AppraisalUpdate, Principal, UserId, ViewEffect,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An appraisal loaded for editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppraisalEditDraft {
    pub appraisal: Appraisal,
    /// Status when the draft was loaded. Informational only; commits are
    /// checked against the stored status.
    pub loaded_status: AppraisalStatus,
    pub draft: AppraisalUpdate,
}

impl Workflow {
    /// Appraisals the caller may see, optionally for one employee.
    pub async fn list_appraisals(
        &self,
        principal: &Principal,
        employee: Option<UserId>,
    ) -> WorkflowResult<Vec<Appraisal>> {
        if let Some(employee) = employee {
            if !can_view_all_appraisals(principal) && employee != principal.id {
                return Ok(Vec::new());
            }
            let department = self.department_of(&employee).await?;
            let items = self
                .store
                .list_appraisals(&OwnerFilter::single(employee))
                .await?;
            return Ok(visible_appraisals(principal, department.as_ref(), items));
        }

        let filter = if can_view_all_appraisals(principal) {
            OwnerFilter::All
        } else {
            OwnerFilter::single(principal.id.clone())
        };
        let items = self.store.list_appraisals(&filter).await?;
        let departments = self.department_map().await?;
        Ok(items
            .into_iter()
            .filter(|appraisal| {
                let department = departments
                    .get(&appraisal.employee_id)
                    .and_then(|department| department.as_ref());
                can_view_appraisal(principal, appraisal, department)
            })
            .collect())
    }

    pub async fn get_appraisal(&self, principal: &Principal, id: Uuid) -> WorkflowResult<Appraisal> {
        let appraisal = self.store.get_appraisal(id).await?;
        self.ensure_visible("appraisal.get", principal, &appraisal)
            .await?;
        Ok(appraisal)
    }

    async fn ensure_visible(
        &self,
        action: &'static str,
        principal: &Principal,
        appraisal: &Appraisal,
    ) -> WorkflowResult<()> {
        let department = self.department_of(&appraisal.employee_id).await?;
        if can_view_appraisal(principal, appraisal, department.as_ref()) {
            return Ok(());
        }
        let reason = if principal.is_manager() {
            DenyReason::OutsideDepartment
        } else {
            DenyReason::NotOwner
        };
        Err(conceal(
            action,
            principal,
            reason,
            &format!("appraisal {}", appraisal.id),
        ))
    }

    pub async fn create_appraisal(
        &self,
        principal: &Principal,
        draft: AppraisalDraft,
    ) -> WorkflowResult<Mutation<Appraisal>> {
        if !can_create_appraisal(principal) {
            return Err(deny(
                "appraisal.create",
                principal,
                role_reason(principal),
                "appraisal",
            ));
        }
        let (employee, manager) = draft.validate().map_err(WorkflowError::Validation)?;
        let employee_user = self.directory.get_user(&employee).await?;
        if !within_scope(principal, &employee, employee_user.department()) {
            return Err(conceal(
                "appraisal.create",
                principal,
                DenyReason::OutsideDepartment,
                &format!("user {employee}"),
            ));
        }
        match self.directory.get_user(&manager).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => {
                return Err(WorkflowError::Validation(format!(
                    "manager {manager} is not in the directory"
                )));
            }
            Err(err) => return Err(WorkflowError::Store(err)),
        }

        let appraisal = self
            .store
            .create_appraisal(draft.into_appraisal(employee, manager))
            .await?;
        count_op("appraisal.create");
        tracing::info!(
            appraisal_id = %appraisal.id,
            employee = %appraisal.employee_id,
            manager = %appraisal.manager_id,
            period = %appraisal.period,
            "appraisal created"
        );
        Ok(Mutation::new(appraisal, ViewEffect::InsertLocal))
    }

    /// Load an appraisal into an edit draft, whoever authored it.
    pub async fn load_for_edit(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<AppraisalEditDraft> {
        let appraisal = self.store.get_appraisal(id).await?;
        self.ensure_visible("appraisal.edit", principal, &appraisal)
            .await?;
        if let Some(reason) = appraisal_edit_decision(principal, &appraisal).deny_reason() {
            return Err(deny("appraisal.edit", principal, reason, "appraisal"));
        }
        Ok(AppraisalEditDraft {
            loaded_status: appraisal.status,
            draft: AppraisalUpdate::from_appraisal(&appraisal),
            appraisal,
        })
    }

    /// Commit an edit, optionally moving the status one step forward.
    pub async fn commit_edit(
        &self,
        principal: &Principal,
        id: Uuid,
        update: AppraisalUpdate,
    ) -> WorkflowResult<Mutation<Appraisal>> {
        update.validate().map_err(WorkflowError::Validation)?;
        let current = self.store.get_appraisal(id).await?;
        self.ensure_visible("appraisal.update", principal, &current)
            .await?;
        if let Some(reason) = appraisal_edit_decision(principal, &current).deny_reason() {
            return Err(deny("appraisal.update", principal, reason, "appraisal"));
        }

        let from = current.status;
        let to = update.status.unwrap_or(from);
        if !from.can_transition_to(to) {
            return Err(WorkflowError::InvalidTransition(format!(
                "appraisal {id} cannot move from {from:?} to {to:?}"
            )));
        }

        let mut next = current;
        update.apply(&mut next);
        let saved = self
            .store
            .update_appraisal(next, from)
            .await
            .map_err(concurrent_change)?;
        count_op(if from == to {
            "appraisal.update"
        } else {
            "appraisal.transition"
        });
        tracing::info!(
            appraisal_id = %saved.id,
            editor = %principal.id,
            from = ?from,
            to = ?saved.status,
            "appraisal saved"
        );
        Ok(Mutation::new(saved, ViewEffect::ReplaceLocal))
    }

    pub async fn transition_appraisal(
        &self,
        principal: &Principal,
        id: Uuid,
        status: AppraisalStatus,
    ) -> WorkflowResult<Mutation<Appraisal>> {
        self.commit_edit(
            principal,
            id,
            AppraisalUpdate {
                status: Some(status),
                ..AppraisalUpdate::default()
            },
        )
        .await
    }

    /// Delete a `DRAFT` appraisal.
    pub async fn delete_appraisal(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> WorkflowResult<Mutation<Appraisal>> {
        let current = self.store.get_appraisal(id).await?;
        self.ensure_visible("appraisal.delete", principal, &current)
            .await?;
        if let Some(reason) = appraisal_edit_decision(principal, &current).deny_reason() {
            return Err(deny("appraisal.delete", principal, reason, "appraisal"));
        }
        if current.status != AppraisalStatus::Draft {
            return Err(WorkflowError::InvalidTransition(format!(
                "appraisal {id} is {:?}; only drafts can be deleted",
                current.status
            )));
        }
        self.store
            .delete_appraisal(id, AppraisalStatus::Draft)
            .await
            .map_err(concurrent_change)?;
        count_op("appraisal.delete");
        tracing::info!(appraisal_id = %id, by = %principal.id, "appraisal deleted");
        Ok(Mutation::new(current, ViewEffect::RemoveLocal))
    }
}

fn concurrent_change(err: StoreError) -> WorkflowError {
    match err {
        StoreError::Conflict(what) => {
            WorkflowError::InvalidTransition(format!("changed concurrently: {what}"))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{principal, workflow};
    use super::*;
    use crate::store::PerformanceStore;

    fn draft(employee: &str, manager: &str) -> AppraisalDraft {
        AppraisalDraft {
            employee_id: Some(UserId::new(employee)),
            manager_id: Some(UserId::new(manager)),
            period: "2024".to_string(),
            achievements: "Led the datacenter move".to_string(),
            ..AppraisalDraft::default()
        }
    }

    #[tokio::test]
    async fn admin_draft_manager_submits_completes_then_is_locked() {
        let (workflow, _) = workflow();
        let admin = principal("a1");
        let manager = principal("m1");

        let created = workflow
            .create_appraisal(
                &admin,
                AppraisalDraft {
                    status: Some(AppraisalStatus::Draft),
                    ..draft("e1", "m1")
                },
            )
            .await
            .expect("create")
            .record;
        assert_eq!(created.status, AppraisalStatus::Draft);
        assert_eq!(created.rating, perfdesk_common::NEUTRAL_RATING);

        let submitted = workflow
            .commit_edit(
                &manager,
                created.id,
                AppraisalUpdate {
                    rating: Some(4.0),
                    status: Some(AppraisalStatus::Submitted),
                    ..AppraisalUpdate::default()
                },
            )
            .await
            .expect("submit");
        assert_eq!(submitted.record.status, AppraisalStatus::Submitted);
        assert_eq!(submitted.effect, ViewEffect::ReplaceLocal);

        let completed = workflow
            .transition_appraisal(&manager, created.id, AppraisalStatus::Completed)
            .await
            .expect("complete");
        assert_eq!(completed.record.status, AppraisalStatus::Completed);

        let err = workflow
            .commit_edit(
                &manager,
                created.id,
                AppraisalUpdate {
                    manager_comments: Some("late edit".to_string()),
                    ..AppraisalUpdate::default()
                },
            )
            .await
            .expect_err("locked");
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let err = workflow
            .load_for_edit(&admin, created.id)
            .await
            .expect_err("admin locked too");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn status_cannot_skip_or_move_back() {
        let (workflow, _) = workflow();
        let manager = principal("m1");
        let created = workflow
            .create_appraisal(&manager, draft("e1", "m1"))
            .await
            .expect("create")
            .record;

        let skip = workflow
            .transition_appraisal(&manager, created.id, AppraisalStatus::Completed)
            .await
            .expect_err("skip");
        assert!(matches!(skip, WorkflowError::InvalidTransition(_)));

        workflow
            .transition_appraisal(&manager, created.id, AppraisalStatus::Submitted)
            .await
            .expect("submit");
        let back = workflow
            .transition_appraisal(&manager, created.id, AppraisalStatus::Draft)
            .await
            .expect_err("backwards");
        assert!(matches!(back, WorkflowError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn stale_edit_draft_is_rechecked_against_stored_status() {
        let (workflow, _) = workflow();
        let manager = principal("m1");
        let created = workflow
            .create_appraisal(&manager, draft("e1", "m1"))
            .await
            .expect("create")
            .record;
        workflow
            .transition_appraisal(&manager, created.id, AppraisalStatus::Submitted)
            .await
            .expect("submit");

        let loaded = workflow
            .load_for_edit(&principal("a1"), created.id)
            .await
            .expect("load");
        assert_eq!(loaded.loaded_status, AppraisalStatus::Submitted);

        workflow
            .transition_appraisal(&manager, created.id, AppraisalStatus::Completed)
            .await
            .expect("complete meanwhile");

        let mut stale = loaded.draft;
        stale.status = None;
        stale.improvements = Some("rewrite".to_string());
        let err = workflow
            .commit_edit(&principal("a1"), created.id, stale)
            .await
            .expect_err("stale draft");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn employees_only_see_their_completed_appraisals() {
        let (workflow, _) = workflow();
        let manager = principal("m1");
        let first = workflow
            .create_appraisal(&manager, draft("e1", "m1"))
            .await
            .expect("first")
            .record;
        workflow
            .create_appraisal(&manager, draft("e1", "m1"))
            .await
            .expect("second draft");
        workflow
            .create_appraisal(&manager, draft("e2", "m1"))
            .await
            .expect("other employee");
        for status in [AppraisalStatus::Submitted, AppraisalStatus::Completed] {
            workflow
                .transition_appraisal(&manager, first.id, status)
                .await
                .expect("advance");
        }

        let employee = principal("e1");
        let mine = workflow
            .list_appraisals(&employee, None)
            .await
            .expect("list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, first.id);
        assert!(
            workflow
                .list_appraisals(&employee, Some(UserId::new("e2")))
                .await
                .expect("other")
                .is_empty()
        );

        assert_eq!(
            workflow
                .list_appraisals(&manager, None)
                .await
                .expect("manager")
                .len(),
            3
        );
        assert_eq!(
            workflow
                .list_appraisals(&manager, Some(UserId::new("e1")))
                .await
                .expect("manager e1")
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn appraisal_creation_is_role_and_department_bound() {
        let (workflow, _) = workflow();
        let err = workflow
            .create_appraisal(&principal("e1"), draft("e2", "m1"))
            .await
            .expect_err("employee");
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let err = workflow
            .create_appraisal(&principal("m1"), draft("f1", "m2"))
            .await
            .expect_err("finance employee");
        assert!(matches!(err, WorkflowError::NotFound(_)));

        let err = workflow
            .create_appraisal(
                &principal("a1"),
                AppraisalDraft {
                    period: String::new(),
                    ..draft("e1", "m1")
                },
            )
            .await
            .expect_err("missing period");
        assert!(matches!(err, WorkflowError::Validation(_)));

        let err = workflow
            .create_appraisal(&principal("a1"), draft("e1", "ghost"))
            .await
            .expect_err("unknown manager");
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn foreign_manager_cannot_see_or_edit() {
        let (workflow, _) = workflow();
        let created = workflow
            .create_appraisal(&principal("m2"), draft("f1", "m2"))
            .await
            .expect("create")
            .record;
        let outsider = principal("m1");
        assert!(matches!(
            workflow.get_appraisal(&outsider, created.id).await,
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(
            workflow
                .transition_appraisal(&outsider, created.id, AppraisalStatus::Submitted)
                .await,
            Err(WorkflowError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn only_drafts_are_deleted() {
        let (workflow, store) = workflow();
        let manager = principal("m1");
        let keep = workflow
            .create_appraisal(&manager, draft("e1", "m1"))
            .await
            .expect("keep")
            .record;
        let discard = workflow
            .create_appraisal(&manager, draft("e2", "m1"))
            .await
            .expect("discard")
            .record;
        workflow
            .transition_appraisal(&manager, keep.id, AppraisalStatus::Submitted)
            .await
            .expect("submit");

        let err = workflow
            .delete_appraisal(&manager, keep.id)
            .await
            .expect_err("submitted");
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));

        let err = workflow
            .delete_appraisal(&principal("e2"), discard.id)
            .await
            .expect_err("employee");
        assert!(matches!(err, WorkflowError::NotFound(_)));

        let removed = workflow
            .delete_appraisal(&manager, discard.id)
            .await
            .expect("delete");
        assert_eq!(removed.effect, ViewEffect::RemoveLocal);
        assert!(matches!(
            store.get_appraisal(discard.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
