//! In-memory implementation of the performance store and user directory.
//!
//! # Purpose
//! Keeps every entity in a `HashMap` guarded by `tokio::sync::RwLock`. Used
//! for local development, tests, and demo deployments.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - Mutations take the write lock of the map they touch, so status
//!   preconditions (`expected` / transition checks) are evaluated atomically
//!   with the write.
//! - List results are ordered by creation time so callers see a stable order.
//!
//! # Metrics
//! Gauges for entity counts are updated on every insert/delete.
use super::{OwnerFilter, PerformanceStore, StoreError, StoreResult, UserDirectory};
use async_trait::async_trait;
use chrono::Utc;
use perfdesk_common::{
    Appraisal, AppraisalStatus, Feedback, FeedbackRequest, Goal, RequestStatus, User, UserFilter,
    UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    goals: Arc<RwLock<HashMap<Uuid, Goal>>>,
    feedback: Arc<RwLock<HashMap<Uuid, Feedback>>>,
    requests: Arc<RwLock<HashMap<Uuid, FeedbackRequest>>>,
    appraisals: Arc<RwLock<HashMap<Uuid, Appraisal>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store whose directory already holds `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect::<HashMap<_, _>>();
        metrics::gauge!("perfdesk_users_total").set(users.len() as f64);
        Self {
            users: Arc::new(RwLock::new(users)),
            ..Self::default()
        }
    }

    pub async fn upsert_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        metrics::gauge!("perfdesk_users_total").set(users.len() as f64);
    }
}

fn sorted_by_creation<T>(mut items: Vec<T>, created: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    items.sort_by_key(|item| created(item));
    items
}

#[async_trait]
impl PerformanceStore for InMemoryStore {
    async fn list_goals(&self, filter: &OwnerFilter) -> StoreResult<Vec<Goal>> {
        let goals = self.goals.read().await;
        let items = goals
            .values()
            .filter(|goal| filter.includes(&goal.user_id))
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |goal: &Goal| goal.created_at))
    }

    async fn get_goal(&self, id: Uuid) -> StoreResult<Goal> {
        self.goals
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("goal {id}")))
    }

    async fn create_goal(&self, goal: Goal) -> StoreResult<Goal> {
        let mut goals = self.goals.write().await;
        if goals.contains_key(&goal.id) {
            return Err(StoreError::Conflict(format!("goal {}", goal.id)));
        }
        goals.insert(goal.id, goal.clone());
        metrics::gauge!("perfdesk_goals_total").set(goals.len() as f64);
        Ok(goal)
    }

    async fn update_goal(&self, goal: Goal) -> StoreResult<Goal> {
        let mut goals = self.goals.write().await;
        let slot = goals
            .get_mut(&goal.id)
            .ok_or_else(|| StoreError::NotFound(format!("goal {}", goal.id)))?;
        *slot = goal.clone();
        Ok(goal)
    }

    async fn list_feedback_received(&self, recipient: &UserId) -> StoreResult<Vec<Feedback>> {
        let feedback = self.feedback.read().await;
        let items = feedback
            .values()
            .filter(|item| &item.recipient_id == recipient)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |item: &Feedback| item.created_at))
    }

    async fn list_feedback_given(&self, reviewer: &UserId) -> StoreResult<Vec<Feedback>> {
        let feedback = self.feedback.read().await;
        let items = feedback
            .values()
            .filter(|item| &item.reviewer_id == reviewer)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |item: &Feedback| item.created_at))
    }

    async fn create_feedback(&self, item: Feedback) -> StoreResult<Feedback> {
        let mut feedback = self.feedback.write().await;
        if feedback.contains_key(&item.id) {
            return Err(StoreError::Conflict(format!("feedback {}", item.id)));
        }
        if let Some(request_id) = item.responds_to_request_id
            && feedback
                .values()
                .any(|existing| existing.responds_to_request_id == Some(request_id))
        {
            return Err(StoreError::Conflict(format!(
                "feedback request {request_id} already answered"
            )));
        }
        feedback.insert(item.id, item.clone());
        metrics::gauge!("perfdesk_feedback_total").set(feedback.len() as f64);
        Ok(item)
    }

    async fn list_requests_for(&self, recipient: &UserId) -> StoreResult<Vec<FeedbackRequest>> {
        let requests = self.requests.read().await;
        let items = requests
            .values()
            .filter(|request| &request.recipient_id == recipient)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |request: &FeedbackRequest| {
            request.created_at
        }))
    }

    async fn list_requests_by(&self, requester: &UserId) -> StoreResult<Vec<FeedbackRequest>> {
        let requests = self.requests.read().await;
        let items = requests
            .values()
            .filter(|request| &request.requester_id == requester)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |request: &FeedbackRequest| {
            request.created_at
        }))
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<FeedbackRequest> {
        self.requests
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("feedback request {id}")))
    }

    async fn create_request(&self, request: FeedbackRequest) -> StoreResult<FeedbackRequest> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(StoreError::Conflict(format!("feedback request {}", request.id)));
        }
        requests.insert(request.id, request.clone());
        let open = requests.values().filter(|item| item.status.is_open()).count();
        metrics::gauge!("perfdesk_feedback_requests_open").set(open as f64);
        Ok(request)
    }

    async fn patch_request_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<FeedbackRequest> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("feedback request {id}")))?;
        if !request.status.can_transition_to(status) {
            return Err(StoreError::Conflict(format!(
                "feedback request {id} is {:?}",
                request.status
            )));
        }
        request.status = status;
        request.updated_at = Utc::now();
        let updated = request.clone();
        let open = requests.values().filter(|item| item.status.is_open()).count();
        metrics::gauge!("perfdesk_feedback_requests_open").set(open as f64);
        Ok(updated)
    }

    async fn list_appraisals(&self, filter: &OwnerFilter) -> StoreResult<Vec<Appraisal>> {
        let appraisals = self.appraisals.read().await;
        let items = appraisals
            .values()
            .filter(|appraisal| filter.includes(&appraisal.employee_id))
            .cloned()
            .collect();
        Ok(sorted_by_creation(items, |appraisal: &Appraisal| {
            appraisal.created_at
        }))
    }

    async fn get_appraisal(&self, id: Uuid) -> StoreResult<Appraisal> {
        self.appraisals
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("appraisal {id}")))
    }

    async fn create_appraisal(&self, appraisal: Appraisal) -> StoreResult<Appraisal> {
        let mut appraisals = self.appraisals.write().await;
        if appraisals.contains_key(&appraisal.id) {
            return Err(StoreError::Conflict(format!("appraisal {}", appraisal.id)));
        }
        appraisals.insert(appraisal.id, appraisal.clone());
        metrics::gauge!("perfdesk_appraisals_total").set(appraisals.len() as f64);
        Ok(appraisal)
    }

    async fn update_appraisal(
        &self,
        appraisal: Appraisal,
        expected: AppraisalStatus,
    ) -> StoreResult<Appraisal> {
        let mut appraisals = self.appraisals.write().await;
        let slot = appraisals
            .get_mut(&appraisal.id)
            .ok_or_else(|| StoreError::NotFound(format!("appraisal {}", appraisal.id)))?;
        if slot.status != expected {
            return Err(StoreError::Conflict(format!(
                "appraisal {} is {:?}, expected {:?}",
                appraisal.id, slot.status, expected
            )));
        }
        *slot = appraisal.clone();
        Ok(appraisal)
    }

    async fn delete_appraisal(&self, id: Uuid, expected: AppraisalStatus) -> StoreResult<()> {
        let mut appraisals = self.appraisals.write().await;
        let current = appraisals
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("appraisal {id}")))?;
        if current.status != expected {
            return Err(StoreError::Conflict(format!(
                "appraisal {id} is {:?}, expected {:?}",
                current.status, expected
            )));
        }
        appraisals.remove(&id);
        metrics::gauge!("perfdesk_appraisals_total").set(appraisals.len() as f64);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut items: Vec<User> = users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect();
        items.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(items)
    }

    async fn get_user(&self, id: &UserId) -> StoreResult<User> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfdesk_common::{Department, FeedbackType, Role};

    fn user(id: &str, department: &str) -> User {
        User {
            id: UserId::new(id),
            name: id.to_string(),
            email: String::new(),
            role: Role::Employee,
            department: Some(Department::new(department)),
        }
    }

    fn request(status: RequestStatus) -> FeedbackRequest {
        FeedbackRequest {
            id: Uuid::new_v4(),
            requester_id: UserId::new("e1"),
            recipient_id: UserId::new("e2"),
            feedback_type: FeedbackType::Peer,
            review_period: "Q4 2024".to_string(),
            message: String::new(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn directory_filters_by_department() {
        let store = InMemoryStore::with_users(vec![user("e1", "IT"), user("f1", "FINANCE")]);
        let it = store
            .list_users(&UserFilter::department(Department::new("IT")))
            .await
            .expect("list");
        assert_eq!(it.len(), 1);
        assert_eq!(it[0].id.as_str(), "e1");
        assert_eq!(
            store.list_users(&UserFilter::default()).await.expect("all").len(),
            2
        );
        assert!(matches!(
            store.get_user(&UserId::new("zz")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn terminal_request_rejects_status_patch() {
        let store = InMemoryStore::new();
        let created = store
            .create_request(request(RequestStatus::Pending))
            .await
            .expect("create");
        store
            .patch_request_status(created.id, RequestStatus::Declined)
            .await
            .expect("decline");
        let err = store
            .patch_request_status(created.id, RequestStatus::Completed)
            .await
            .expect_err("terminal");
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(
            store.get_request(created.id).await.expect("get").status,
            RequestStatus::Declined
        );
    }

    #[tokio::test]
    async fn appraisal_update_requires_expected_status() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let appraisal = Appraisal {
            id: Uuid::new_v4(),
            employee_id: UserId::new("e1"),
            manager_id: UserId::new("m1"),
            period: "2024".to_string(),
            rating: 3.0,
            achievements: String::new(),
            improvements: String::new(),
            goals: String::new(),
            manager_comments: String::new(),
            employee_comments: None,
            status: AppraisalStatus::Submitted,
            created_at: now,
            updated_at: now,
        };
        store.create_appraisal(appraisal.clone()).await.expect("create");

        let mut edited = appraisal.clone();
        edited.rating = 4.5;
        let err = store
            .update_appraisal(edited.clone(), AppraisalStatus::Draft)
            .await
            .expect_err("stale expectation");
        assert!(matches!(err, StoreError::Conflict(_)));

        let saved = store
            .update_appraisal(edited, AppraisalStatus::Submitted)
            .await
            .expect("update");
        assert_eq!(saved.rating, 4.5);

        assert!(matches!(
            store.delete_appraisal(appraisal.id, AppraisalStatus::Draft).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn goals_filter_by_owner() {
        let store = InMemoryStore::new();
        let draft = perfdesk_common::GoalDraft {
            user_id: None,
            title: "Certify".to_string(),
            description: String::new(),
            status: None,
            progress: None,
            target: 1.0,
            current: 0.0,
            due_date: None,
            goal_type: "LEARNING".to_string(),
        };
        store
            .create_goal(draft.clone().into_goal(UserId::new("e1"), None))
            .await
            .expect("goal e1");
        store
            .create_goal(draft.into_goal(UserId::new("e2"), Some(UserId::new("m1"))))
            .await
            .expect("goal e2");

        let mine = store
            .list_goals(&OwnerFilter::single(UserId::new("e1")))
            .await
            .expect("list");
        assert_eq!(mine.len(), 1);
        assert_eq!(store.list_goals(&OwnerFilter::All).await.expect("all").len(), 2);
    }
}
