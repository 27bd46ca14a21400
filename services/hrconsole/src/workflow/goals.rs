//! Goal lifecycle: scoped listing, assignment, and progress updates.
//!
//! Goal status is editor-driven; there is no enforced ordering and a
//! `COMPLETED` goal may be reopened.
use super::{Mutation, Workflow, WorkflowError, WorkflowResult, conceal, count_op, deny};
use crate::store::OwnerFilter;
use perfdesk_authz::{
    DenyReason, GoalScope, GoalSetDecision, GoalViewMode, assignable_users, can_view_goal_set,
    goal_assign_decision, goal_edit_decision, within_scope,
};
use perfdesk_common::{
    Department, Goal, GoalDraft, GoalPatch, Principal, User, UserFilter, ViewEffect,
};
use uuid::Uuid;

impl Workflow {
    /// Goals in the set selected by `mode`, after the evaluator resolved it.
    ///
    /// `requested_department` is a hint; managers can only ever resolve to
    /// their own department.
    pub async fn list_goals(
        &self,
        principal: &Principal,
        mode: GoalViewMode,
        requested_department: Option<Department>,
    ) -> WorkflowResult<Vec<Goal>> {
        let scope = match can_view_goal_set(principal, mode, requested_department.as_ref()) {
            GoalSetDecision::Allowed(scope) => scope,
            GoalSetDecision::Denied(reason) => {
                return Err(deny("goal.list", principal, reason, "goal set"));
            }
        };
        let filter = match scope {
            GoalScope::User(owner) => OwnerFilter::single(owner),
            GoalScope::Department(department) => {
                let members = self
                    .directory
                    .list_users(&UserFilter::department(department.clone()))
                    .await?;
                OwnerFilter::Owners(
                    members
                        .into_iter()
                        .filter(|user| user.department() == Some(&department))
                        .map(|user| user.id)
                        .collect(),
                )
            }
            GoalScope::All => OwnerFilter::All,
        };
        tracing::debug!(principal = %principal.id, mode = mode.as_str(), ?filter, "listing goals");
        Ok(self.store.list_goals(&filter).await?)
    }

    pub async fn get_goal(&self, principal: &Principal, id: Uuid) -> WorkflowResult<Goal> {
        let goal = self.store.get_goal(id).await?;
        let owner_department = self.department_of(&goal.user_id).await?;
        if !within_scope(principal, &goal.user_id, owner_department.as_ref()) {
            return Err(conceal(
                "goal.get",
                principal,
                scope_reason(principal),
                &format!("goal {id}"),
            ));
        }
        Ok(goal)
    }

    /// Create a goal for `draft.user_id`, or for the caller when unset.
    ///
    /// Goals assigned to someone else come back with `ViewEffect::Refetch`:
    /// they may not belong in the list the creator is looking at.
    pub async fn create_goal(
        &self,
        principal: &Principal,
        draft: GoalDraft,
    ) -> WorkflowResult<Mutation<Goal>> {
        draft.validate().map_err(WorkflowError::Validation)?;
        let assignee = draft.user_id.clone().unwrap_or_else(|| principal.id.clone());
        let for_self = assignee == principal.id;
        let assignee_department = match self.department_of(&assignee).await? {
            Some(department) => Some(department),
            None if for_self => principal.department.clone(),
            None => None,
        };

        let decision = goal_assign_decision(principal, &assignee, assignee_department.as_ref());
        if let Some(reason) = decision.deny_reason() {
            return Err(deny("goal.create", principal, reason, &format!("user {assignee}")));
        }
        if !for_self {
            // Admins may target anyone, so the assignee still has to exist.
            self.directory.get_user(&assignee).await?;
        }

        let assigned_by = (!for_self).then(|| principal.id.clone());
        let goal = self
            .store
            .create_goal(draft.into_goal(assignee, assigned_by))
            .await?;
        count_op("goal.create");
        tracing::info!(
            goal_id = %goal.id,
            assignee = %goal.user_id,
            creator = %principal.id,
            "goal created"
        );
        let effect = if for_self {
            ViewEffect::InsertLocal
        } else {
            ViewEffect::Refetch
        };
        Ok(Mutation::new(goal, effect))
    }

    pub async fn update_goal(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: GoalPatch,
    ) -> WorkflowResult<Mutation<Goal>> {
        patch.validate().map_err(WorkflowError::Validation)?;
        let mut goal = self.store.get_goal(id).await?;

        if let Some(reason) = goal_edit_decision(principal, &goal).deny_reason() {
            return Err(deny("goal.update", principal, reason, &format!("goal {id}")));
        }
        let owner_department = self.department_of(&goal.user_id).await?;
        if !within_scope(principal, &goal.user_id, owner_department.as_ref()) {
            return Err(conceal(
                "goal.update",
                principal,
                DenyReason::OutsideDepartment,
                &format!("goal {id}"),
            ));
        }

        let previous = goal.status;
        patch.apply(&mut goal);
        let goal = self.store.update_goal(goal).await?;
        count_op("goal.update");
        tracing::info!(
            goal_id = %goal.id,
            editor = %principal.id,
            from = ?previous,
            to = ?goal.status,
            progress = goal.progress,
            "goal updated"
        );
        Ok(Mutation::new(goal, ViewEffect::ReplaceLocal))
    }

    /// Directory users the caller may assign goals to.
    pub async fn assignable_users(&self, principal: &Principal) -> WorkflowResult<Vec<User>> {
        let filter = match (principal.is_admin(), principal.department()) {
            (false, Some(department)) => UserFilter::department(department.clone()),
            _ => UserFilter::default(),
        };
        let users = self.directory.list_users(&filter).await?;
        Ok(assignable_users(principal, &users)
            .into_iter()
            .cloned()
            .collect())
    }
}

fn scope_reason(principal: &Principal) -> DenyReason {
    match principal.role {
        perfdesk_common::Role::Manager => DenyReason::OutsideDepartment,
        perfdesk_common::Role::Unknown => DenyReason::UnknownRole,
        _ => DenyReason::NotOwner,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{principal, workflow};
    use super::*;
    use perfdesk_common::{GoalStatus, UserId};

    fn draft(title: &str, user: Option<&str>) -> GoalDraft {
        GoalDraft {
            user_id: user.map(UserId::new),
            title: title.to_string(),
            target: 10.0,
            goal_type: "PERFORMANCE".to_string(),
            ..GoalDraft::default()
        }
    }

    #[tokio::test]
    async fn employee_my_view_returns_only_own_goals() {
        let (workflow, _) = workflow();
        let manager = principal("m1");
        let employee = principal("e1");
        workflow
            .create_goal(&employee, draft("Learn Rust", None))
            .await
            .expect("self goal");
        workflow
            .create_goal(&manager, draft("Mentor e2", Some("e2")))
            .await
            .expect("assigned goal");

        let mine = workflow
            .list_goals(&employee, GoalViewMode::My, None)
            .await
            .expect("list");
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|goal| goal.user_id == employee.id));
    }

    #[tokio::test]
    async fn employee_cannot_widen_view() {
        let (workflow, _) = workflow();
        let err = workflow
            .list_goals(&principal("e1"), GoalViewMode::Team, None)
            .await
            .expect_err("team view");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn manager_team_view_ignores_foreign_department_hint() {
        let (workflow, _) = workflow();
        let admin = principal("a1");
        workflow
            .create_goal(&admin, draft("Close Q4 books", Some("f1")))
            .await
            .expect("finance goal");
        workflow
            .create_goal(&admin, draft("Patch servers", Some("e1")))
            .await
            .expect("it goal");

        let manager = principal("m1");
        let team = workflow
            .list_goals(&manager, GoalViewMode::Team, None)
            .await
            .expect("team");
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].user_id.as_str(), "e1");

        let err = workflow
            .list_goals(
                &manager,
                GoalViewMode::Dept,
                Some(Department::new("FINANCE")),
            )
            .await
            .expect_err("other department");
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn manager_assignment_is_department_bound() {
        let (workflow, store) = workflow();
        let manager = principal("m1");
        let err = workflow
            .create_goal(&manager, draft("Audit", Some("f1")))
            .await
            .expect_err("finance user");
        assert!(matches!(err, WorkflowError::NotFound(_)));
        assert!(
            crate::store::PerformanceStore::list_goals(&store, &OwnerFilter::All)
                .await
                .expect("list")
                .is_empty()
        );

        let created = workflow
            .create_goal(&manager, draft("Migrate CI", Some("e2")))
            .await
            .expect("same department");
        assert_eq!(created.effect, ViewEffect::Refetch);
        assert_eq!(created.record.assigned_by_id, Some(manager.id.clone()));
    }

    #[tokio::test]
    async fn employee_self_goal_is_inserted_locally() {
        let (workflow, _) = workflow();
        let employee = principal("e1");
        let created = workflow
            .create_goal(&employee, draft("Certify", None))
            .await
            .expect("create");
        assert_eq!(created.effect, ViewEffect::InsertLocal);
        assert_eq!(created.record.user_id, employee.id);
        assert!(created.record.assigned_by_id.is_none());

        let err = workflow
            .create_goal(&employee, draft("Boss e2", Some("e2")))
            .await
            .expect_err("other user");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn it_support_cannot_create_goals() {
        let (workflow, _) = workflow();
        let err = workflow
            .create_goal(&principal("s1"), draft("Inventory", None))
            .await
            .expect_err("it support");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_goal_for_unknown_user_is_not_found() {
        let (workflow, _) = workflow();
        let err = workflow
            .create_goal(&principal("a1"), draft("Ghost", Some("zz")))
            .await
            .expect_err("missing user");
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_rules_follow_ownership_and_department() {
        let (workflow, _) = workflow();
        let admin = principal("a1");
        let it_goal = workflow
            .create_goal(&admin, draft("Rotate keys", Some("e1")))
            .await
            .expect("it goal")
            .record;
        let finance_goal = workflow
            .create_goal(&admin, draft("Reconcile", Some("f1")))
            .await
            .expect("finance goal")
            .record;

        let patch = GoalPatch {
            progress: Some(50),
            status: Some(GoalStatus::AtRisk),
            ..GoalPatch::default()
        };

        let owner = workflow
            .update_goal(&principal("e1"), it_goal.id, patch.clone())
            .await
            .expect("owner edit");
        assert_eq!(owner.record.progress, 50);
        assert_eq!(owner.effect, ViewEffect::ReplaceLocal);

        let peer = workflow
            .update_goal(&principal("e2"), it_goal.id, patch.clone())
            .await
            .expect_err("peer edit");
        assert!(matches!(peer, WorkflowError::Forbidden(_)));

        let foreign_manager = workflow
            .update_goal(&principal("m1"), finance_goal.id, patch.clone())
            .await
            .expect_err("foreign manager");
        assert!(matches!(foreign_manager, WorkflowError::NotFound(_)));

        let bad = workflow
            .update_goal(
                &principal("m1"),
                it_goal.id,
                GoalPatch {
                    progress: Some(120),
                    ..GoalPatch::default()
                },
            )
            .await
            .expect_err("progress bound");
        assert!(matches!(bad, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn completed_goal_can_be_reopened() {
        let (workflow, _) = workflow();
        let manager = principal("m1");
        let goal = workflow
            .create_goal(&manager, draft("Ship", Some("e1")))
            .await
            .expect("create")
            .record;
        for status in [GoalStatus::Completed, GoalStatus::OnTrack] {
            let updated = workflow
                .update_goal(
                    &manager,
                    goal.id,
                    GoalPatch {
                        status: Some(status),
                        ..GoalPatch::default()
                    },
                )
                .await
                .expect("update");
            assert_eq!(updated.record.status, status);
        }
    }

    #[tokio::test]
    async fn get_goal_conceals_out_of_scope_records() {
        let (workflow, _) = workflow();
        let goal = workflow
            .create_goal(&principal("f1"), draft("Budget", None))
            .await
            .expect("create")
            .record;
        assert!(workflow.get_goal(&principal("m2"), goal.id).await.is_ok());
        for viewer in ["m1", "e1", "zz"] {
            let err = workflow
                .get_goal(&principal(viewer), goal.id)
                .await
                .expect_err("concealed");
            assert!(matches!(err, WorkflowError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn assignable_pool_is_filtered() {
        let (workflow, _) = workflow();
        let pool = workflow
            .assignable_users(&principal("m1"))
            .await
            .expect("manager pool");
        assert!(pool.iter().all(|user| user.department() == Some(&Department::new("IT"))));
        let employee_pool = workflow
            .assignable_users(&principal("e1"))
            .await
            .expect("employee pool");
        assert_eq!(employee_pool.len(), 1);
        assert_eq!(employee_pool[0].id.as_str(), "e1");
        assert_eq!(
            workflow
                .assignable_users(&principal("a1"))
                .await
                .expect("admin pool")
                .len(),
            7
        );
    }
}
