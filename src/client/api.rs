//! HTTP client for the tracker API
//!
//! Wraps reqwest with bearer-token handling and the error taxonomy the UI
//! layer acts on. Any 401 discards the stored token so the caller can route
//! the user back to login; expired and malformed tokens are not treated
//! differently here.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::client::types::{GoalItem, GoalUpdate, TaskItem, TaskUpdate};
use crate::db::schemas::GoalType;
use crate::engine::OrderStore;
use crate::quote::Quote;
use crate::types::TrackerError;

/// Error body shape shared by all API failures
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Token and username returned by register/login
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    username: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[allow(dead_code)]
    message: String,
}

/// Typed client for the tracker service
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            http_client,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// Whether a bearer token is currently held
    pub fn has_token(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Drop the stored credential (logout, or after a 401)
    pub fn clear_token(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    fn store_token(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.to_string());
    }

    fn bearer(&self) -> Result<String, TrackerError> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| TrackerError::Auth("No token, authorization denied".into()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to the error taxonomy, discarding the
    /// token on 401.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|e| e.message)
            .unwrap_or_else(|_| status.to_string());

        Err(match status.as_u16() {
            401 => {
                warn!("Session rejected: {}", message);
                self.clear_token();
                TrackerError::Auth(message)
            }
            404 => TrackerError::NotFound(message),
            400 => TrackerError::BadRequest(message),
            _ => TrackerError::Internal(message),
        })
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, TrackerError> {
        let response = self
            .http_client
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(|e| TrackerError::Http(format!("Request failed: {}", e)))?;

        Ok(self.check(response).await?.json::<T>().await?)
    }

    async fn delete_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T, TrackerError> {
        let response = self
            .http_client
            .delete(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(|e| TrackerError::Http(format!("Request failed: {}", e)))?;

        Ok(self.check(response).await?.json::<T>().await?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, TrackerError> {
        let response = self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await
            .map_err(|e| TrackerError::Http(format!("Request failed: {}", e)))?;

        Ok(self.check(response).await?.json::<T>().await?)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create an account and store the returned session token
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<AuthSession, TrackerError> {
        let response = self
            .http_client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": password, "username": username }))
            .send()
            .await
            .map_err(|e| TrackerError::Http(format!("Request failed: {}", e)))?;

        let session: AuthSession = self.check(response).await?.json().await?;
        self.store_token(&session.token);
        debug!("Registered as {}", session.username);
        Ok(session)
    }

    /// Log in and store the returned session token
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, TrackerError> {
        let response = self
            .http_client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| TrackerError::Http(format!("Request failed: {}", e)))?;

        let session: AuthSession = self.check(response).await?.json().await?;
        self.store_token(&session.token);
        debug!("Logged in as {}", session.username);
        Ok(session)
    }

    /// Check the stored token, returning the username it belongs to
    pub async fn verify(&self) -> Result<String, TrackerError> {
        let response: VerifyResponse = self.get_authed("/api/auth/verify").await?;
        Ok(response.username)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Fetch all tasks, sorted ascending by order.
    ///
    /// The server returns store-native order; sorting happens here. The sort
    /// is stable, so equal order values keep their arrival order.
    pub async fn list_tasks(&self) -> Result<Vec<TaskItem>, TrackerError> {
        let mut tasks: Vec<TaskItem> = self.get_authed("/api/tasks").await?;
        tasks.sort_by(|a, b| a.order.total_cmp(&b.order));
        Ok(tasks)
    }

    pub async fn create_task(&self, title: &str) -> Result<TaskItem, TrackerError> {
        self.send_json(reqwest::Method::POST, "/api/tasks", &json!({ "title": title }))
            .await
    }

    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<TaskItem, TrackerError> {
        self.send_json(reqwest::Method::PUT, &format!("/api/tasks/{}", id), update)
            .await
    }

    /// Persist an absolute order value for one task; siblings are untouched
    pub async fn reorder_task(&self, id: &str, new_order: f64) -> Result<TaskItem, TrackerError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/api/tasks/{}/reorder", id),
            &json!({ "newOrder": new_order }),
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), TrackerError> {
        let _: MessageResponse = self.delete_authed(&format!("/api/tasks/{}", id)).await?;
        Ok(())
    }

    // =========================================================================
    // Goals
    // =========================================================================

    /// Fetch all goals, sorted ascending by order (stable for ties)
    pub async fn list_goals(&self) -> Result<Vec<GoalItem>, TrackerError> {
        let mut goals: Vec<GoalItem> = self.get_authed("/api/goals").await?;
        goals.sort_by(|a, b| a.order.total_cmp(&b.order));
        Ok(goals)
    }

    pub async fn create_goal(
        &self,
        title: &str,
        goal_type: Option<GoalType>,
    ) -> Result<GoalItem, TrackerError> {
        let body = match goal_type {
            Some(t) => json!({ "title": title, "type": t }),
            None => json!({ "title": title }),
        };
        self.send_json(reqwest::Method::POST, "/api/goals", &body).await
    }

    pub async fn update_goal(&self, id: &str, update: &GoalUpdate) -> Result<GoalItem, TrackerError> {
        self.send_json(reqwest::Method::PUT, &format!("/api/goals/{}", id), update)
            .await
    }

    /// Persist an absolute order value for one goal; siblings are untouched
    pub async fn reorder_goal(&self, id: &str, new_order: f64) -> Result<GoalItem, TrackerError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/api/goals/{}/reorder", id),
            &json!({ "newOrder": new_order }),
        )
        .await
    }

    pub async fn delete_goal(&self, id: &str) -> Result<(), TrackerError> {
        let _: MessageResponse = self.delete_authed(&format!("/api/goals/{}", id)).await?;
        Ok(())
    }

    // =========================================================================
    // Quote
    // =========================================================================

    /// Fetch the motivational quote. `refresh` bypasses the server cache.
    pub async fn quote(&self, refresh: bool) -> Result<Quote, TrackerError> {
        let response = self
            .http_client
            .get(self.url(&format!("/api/quote?refresh={}", refresh)))
            .send()
            .await
            .map_err(|e| TrackerError::Http(format!("Request failed: {}", e)))?;

        Ok(self.check(response).await?.json::<Quote>().await?)
    }
}

/// [`OrderStore`] over the task reorder endpoint
pub struct TaskReorderStore {
    client: Arc<ApiClient>,
}

impl TaskReorderStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderStore for TaskReorderStore {
    async fn persist_order(&self, item_id: &str, new_order: f64) -> Result<(), TrackerError> {
        self.client.reorder_task(item_id, new_order).await.map(|_| ())
    }
}

/// [`OrderStore`] over the goal reorder endpoint
pub struct GoalReorderStore {
    client: Arc<ApiClient>,
}

impl GoalReorderStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderStore for GoalReorderStore {
    async fn persist_order(&self, item_id: &str, new_order: f64) -> Result<(), TrackerError> {
        self.client.reorder_goal(item_id, new_order).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.url("/api/tasks"), "http://localhost:5000/api/tasks");
    }

    #[test]
    fn test_bearer_requires_a_token() {
        let client = ApiClient::new("http://localhost:5000");
        assert!(client.bearer().is_err());

        client.store_token("abc123");
        assert_eq!(client.bearer().unwrap(), "abc123");

        client.clear_token();
        assert!(client.bearer().is_err());
    }
}
