//! Feedback and feedback-request permissions.
use crate::scope::within_scope;
use perfdesk_common::{
    Department, Feedback, FeedbackBuckets, FeedbackType, Principal, ReceivedFeedback, Role, User,
    UserId, same_department,
};

/// ADMIN, MANAGER and EMPLOYEE may give feedback or ask for it.
pub fn can_request_or_give_feedback(principal: &Principal) -> bool {
    matches!(principal.role, Role::Admin | Role::Manager | Role::Employee)
}

/// Users the principal may name as a feedback recipient (or ask for
/// feedback). Employees never target themselves here; self-assessment goes
/// through the recipient-less create path.
pub fn visible_feedback_recipients<'a>(principal: &Principal, users: &'a [User]) -> Vec<&'a User> {
    match principal.role {
        Role::Admin => users.iter().collect(),
        Role::Manager => users
            .iter()
            .filter(|user| same_department(principal.department(), user.department()))
            .collect(),
        Role::Employee => users
            .iter()
            .filter(|user| user.id != principal.id)
            .filter(|user| same_department(principal.department(), user.department()))
            .collect(),
        Role::ItSupport | Role::Unknown => Vec::new(),
    }
}

/// Whether the principal may read feedback received by `recipient`.
pub fn can_view_feedback_about(
    principal: &Principal,
    recipient: &UserId,
    recipient_department: Option<&Department>,
) -> bool {
    can_request_or_give_feedback(principal) && within_scope(principal, recipient, recipient_department)
}

/// Anonymous feedback names its reviewer only to that reviewer and to ADMIN.
pub fn reveals_reviewer(principal: &Principal, feedback: &Feedback) -> bool {
    !feedback.is_anonymous || principal.is_admin() || feedback.reviewer_id == principal.id
}

/// Split a recipient's inbound feedback into type buckets.
///
/// Records whose reviewer is also the recipient are dropped unless they are
/// self-assessments. Anonymous reviewers are redacted per [`reveals_reviewer`].
pub fn partition_received(
    principal: &Principal,
    items: impl IntoIterator<Item = Feedback>,
) -> FeedbackBuckets {
    let mut buckets = FeedbackBuckets::default();
    for feedback in items {
        let authored_about_self = feedback.reviewer_id == feedback.recipient_id;
        if authored_about_self && feedback.feedback_type != FeedbackType::SelfAssessment {
            continue;
        }
        let reveal = reveals_reviewer(principal, &feedback);
        buckets.push(ReceivedFeedback::from_feedback(feedback, reveal));
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(id: &str, role: Role, department: Option<&str>) -> User {
        User {
            id: UserId::new(id),
            name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            role,
            department: department.map(Department::new),
        }
    }

    fn directory() -> Vec<User> {
        vec![
            user("a1", Role::Admin, None),
            user("m1", Role::Manager, Some("IT")),
            user("e1", Role::Employee, Some("IT")),
            user("e2", Role::Employee, Some("IT")),
            user("f1", Role::Employee, Some("FINANCE")),
        ]
    }

    fn feedback(reviewer: &str, recipient: &str, kind: FeedbackType, anonymous: bool) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            recipient_id: UserId::new(recipient),
            reviewer_id: UserId::new(reviewer),
            feedback_type: kind,
            rating: 4,
            comment: "Solid quarter".to_string(),
            review_period: "Q4 2024".to_string(),
            is_anonymous: anonymous,
            responds_to_request_id: None,
            created_at: Utc::now(),
        }
    }

    fn ids(users: Vec<&User>) -> Vec<&str> {
        users.into_iter().map(|user| user.id.as_str()).collect()
    }

    #[test]
    fn it_support_cannot_give_feedback() {
        let support = Principal::new("s1", Role::ItSupport, Some("IT"));
        assert!(!can_request_or_give_feedback(&support));
        let employee = Principal::new("e1", Role::Employee, Some("IT"));
        assert!(can_request_or_give_feedback(&employee));
    }

    #[test]
    fn recipients_follow_role_and_department() {
        let users = directory();
        let admin = Principal::new("a1", Role::Admin, None);
        assert_eq!(visible_feedback_recipients(&admin, &users).len(), users.len());

        let manager = Principal::new("m1", Role::Manager, Some("IT"));
        assert_eq!(
            ids(visible_feedback_recipients(&manager, &users)),
            vec!["m1", "e1", "e2"]
        );

        let employee = Principal::new("e1", Role::Employee, Some("IT"));
        assert_eq!(
            ids(visible_feedback_recipients(&employee, &users)),
            vec!["m1", "e2"]
        );

        let support = Principal::new("s1", Role::ItSupport, Some("IT"));
        assert!(visible_feedback_recipients(&support, &users).is_empty());
    }

    #[test]
    fn partition_drops_self_authored_non_self_records() {
        let viewer = Principal::new("e1", Role::Employee, Some("IT"));
        let buckets = partition_received(
            &viewer,
            vec![
                feedback("e1", "e1", FeedbackType::SelfAssessment, false),
                feedback("e1", "e1", FeedbackType::Peer, false),
                feedback("e2", "e1", FeedbackType::Peer, false),
                feedback("m1", "e1", FeedbackType::Manager, false),
                feedback("x9", "e1", FeedbackType::Subordinate, false),
            ],
        );
        assert_eq!(buckets.self_assessment.len(), 1);
        assert_eq!(buckets.peer.len(), 1);
        assert_eq!(buckets.manager.len(), 1);
        assert_eq!(buckets.subordinate.len(), 1);
        assert_eq!(buckets.len(), 4);
    }

    #[test]
    fn anonymous_reviewer_is_redacted_for_recipient() {
        let recipient = Principal::new("e1", Role::Employee, Some("IT"));
        let buckets = partition_received(
            &recipient,
            vec![feedback("e2", "e1", FeedbackType::Peer, true)],
        );
        assert_eq!(buckets.peer[0].reviewer_id, None);

        let admin = Principal::new("a1", Role::Admin, None);
        let buckets = partition_received(&admin, vec![feedback("e2", "e1", FeedbackType::Peer, true)]);
        assert_eq!(buckets.peer[0].reviewer_id, Some(UserId::new("e2")));
    }

    #[test]
    fn feedback_about_others_is_scoped() {
        let it = Department::new("IT");
        let finance = Department::new("FINANCE");
        let manager = Principal::new("m1", Role::Manager, Some("IT"));
        assert!(can_view_feedback_about(&manager, &UserId::new("e1"), Some(&it)));
        assert!(!can_view_feedback_about(&manager, &UserId::new("f1"), Some(&finance)));

        let employee = Principal::new("e1", Role::Employee, Some("IT"));
        assert!(can_view_feedback_about(&employee, &UserId::new("e1"), Some(&it)));
        assert!(!can_view_feedback_about(&employee, &UserId::new("e2"), Some(&it)));
    }
}
