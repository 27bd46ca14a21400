#![allow(dead_code)]

use axum::body::Body;
use hrconsole::app::{AppState, build_router};
use hrconsole::auth::token::{ConsoleClaims, TokenVerifier};
use hrconsole::store::memory::InMemoryStore;
use hrconsole::workflow::{Workflow, WorkflowSettings};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use perfdesk_common::{Department, Role, User, UserId};
use std::sync::Arc;

pub const SECRET: &[u8] = b"integration-secret";
pub const ISSUER: &str = "perfdesk-identity";
pub const AUDIENCE: &str = "perfdesk-console";

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn user(id: &str, role: Role, department: Option<&str>) -> User {
    User {
        id: UserId::new(id),
        name: id.to_uppercase(),
        email: format!("{id}@example.com"),
        role,
        department: department.map(Department::new),
    }
}

/// Admin `a1`; IT manager `m1` with employees `e1`, `e2`; IT support `s1`;
/// FINANCE manager `m2` with employee `f1`.
pub fn directory() -> Vec<User> {
    vec![
        user("a1", Role::Admin, None),
        user("m1", Role::Manager, Some("IT")),
        user("e1", Role::Employee, Some("IT")),
        user("e2", Role::Employee, Some("IT")),
        user("s1", Role::ItSupport, Some("IT")),
        user("m2", Role::Manager, Some("FINANCE")),
        user("f1", Role::Employee, Some("FINANCE")),
    ]
}

pub fn app() -> TestApp {
    app_with(WorkflowSettings::default())
}

pub fn app_with(settings: WorkflowSettings) -> TestApp {
    let store = InMemoryStore::with_users(directory());
    let state = AppState {
        service_name: "hrconsole".to_string(),
        api_version: "v1".to_string(),
        workflow: Workflow::new(Arc::new(store.clone()), Arc::new(store), settings),
        verifier: TokenVerifier::new(SECRET, ISSUER, AUDIENCE, 0),
    };
    build_router(state).into_service()
}

pub fn claims(sub: &str, role: &str, dept: Option<&str>) -> ConsoleClaims {
    let now = chrono::Utc::now().timestamp();
    ConsoleClaims {
        sub: sub.to_string(),
        role: role.to_string(),
        dept: dept.map(str::to_string),
        exp: now + 600,
        iat: now,
        iss: ISSUER.to_string(),
        aud: AUDIENCE.to_string(),
    }
}

pub fn mint(claims: &ConsoleClaims, secret: &[u8]) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("encode token")
}

/// Token for a directory user, carrying their directory role and department.
pub fn token_for(id: &str) -> String {
    let found = directory()
        .into_iter()
        .find(|user| user.id.as_str() == id)
        .expect("directory user");
    let claims = claims(
        id,
        found.role.as_str(),
        found.department.as_ref().map(|dept| dept.as_str()),
    );
    mint(&claims, SECRET)
}
