use crate::errors::{ClientError, ClientResult};
use crate::token::TokenPair;
use async_trait::async_trait;
use perfdesk_common::Principal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Result of a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    pub principal: Principal,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthGrant {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// The identity/token service the console authenticates against.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthGrant>;
    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthGrant>;
    async fn validate(&self, access_token: &str) -> ClientResult<bool>;
    async fn current_principal(&self, access_token: &str) -> ClientResult<Principal>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct ValidateResponse {
    valid: bool,
}

#[derive(Clone)]
pub struct HttpIdentityService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpIdentityService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Identity {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthGrant> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;
        decode(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthGrant> {
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        decode(response).await
    }

    async fn validate(&self, access_token: &str) -> ClientResult<bool> {
        let response = self
            .client
            .get(self.url("/auth/validate"))
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let body: ValidateResponse = decode(response).await?;
        Ok(body.valid)
    }

    async fn current_principal(&self, access_token: &str) -> ClientResult<Principal> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfdesk_common::Role;

    #[test]
    fn grant_uses_camel_case_wire_names() {
        let grant: AuthGrant = serde_json::from_value(serde_json::json!({
            "principal": {"id": "e1", "role": "EMPLOYEE", "department": "IT"},
            "accessToken": "a",
            "refreshToken": "r"
        }))
        .expect("grant");
        assert_eq!(grant.principal, Principal::new("e1", Role::Employee, Some("IT")));
        assert_eq!(grant.tokens().refresh_token, "r");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service = HttpIdentityService::new("http://identity.local/");
        assert_eq!(service.url("/auth/me"), "http://identity.local/auth/me");
    }
}
