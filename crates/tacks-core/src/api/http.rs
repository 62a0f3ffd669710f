//! HTTP implementation of the remote API.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::models::{Project, ProjectId, Tag, TagId, Task, TaskId};
use crate::util::{compact_text, normalize_text_option};
use crate::{Error, Result};

use super::{RemoteApi, SessionStatus};

/// Remote API client over HTTP/JSON.
///
/// Reads the bearer token from the session signal on every request, so a
/// rotated token is picked up without rebuilding the client.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
    session: watch::Receiver<SessionStatus>,
}

impl HttpApi {
    /// Build a client for the given API base URL.
    pub fn new(
        base_url: impl Into<String>,
        session: watch::Receiver<SessionStatus>,
    ) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().build()?,
            session,
        })
    }

    /// The normalized base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer_token(&self) -> Result<String> {
        self.session
            .borrow()
            .session()
            .map(|session| session.access_token.clone())
            .ok_or(Error::SessionRequired)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(self.bearer_token()?)
            .header("Accept", "application/json")
            .send()
            .await?;
        decode_json(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<T> {
        let response = self
            .client
            .request(method, self.endpoint(path))
            .bearer_auth(self.bearer_token()?)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;
        decode_json(response).await
    }

    async fn send_delete(&self, path: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(path))
            .bearer_auth(self.bearer_token()?)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.get_json("tasks").await
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.get_json("projects").await
    }

    async fn fetch_tags(&self) -> Result<Vec<Tag>> {
        self.get_json("tags").await
    }

    async fn create_task(&self, body: &Value) -> Result<Task> {
        self.send_json(Method::POST, "tasks", body).await
    }

    async fn update_task(&self, id: TaskId, body: &Value) -> Result<Task> {
        self.send_json(Method::PATCH, &format!("tasks/{id}"), body)
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.send_delete(&format!("tasks/{id}")).await
    }

    async fn create_project(&self, body: &Value) -> Result<Project> {
        self.send_json(Method::POST, "projects", body).await
    }

    async fn update_project(&self, id: ProjectId, body: &Value) -> Result<Project> {
        self.send_json(Method::PATCH, &format!("projects/{id}"), body)
            .await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.send_delete(&format!("projects/{id}")).await
    }

    async fn create_tag(&self, body: &Value) -> Result<Tag> {
        self.send_json(Method::POST, "tags", body).await
    }

    async fn update_tag(&self, id: TagId, body: &Value) -> Result<Tag> {
        self.send_json(Method::PATCH, &format!("tags/{id}"), body)
            .await
    }

    async fn delete_tag(&self, id: TagId) -> Result<()> {
        self.send_delete(&format!("tags/{id}")).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Error::Api {
        status: status.as_u16(),
        message: parse_api_error(status, &body),
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message.trim().to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        compact_text(trimmed)
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("API base URL must not be empty".to_string()))?;
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}
