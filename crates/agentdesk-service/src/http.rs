use agentdesk_core::agent::Agent;
use agentdesk_core::attachment::{Attachment, RegisterAttachment, UploadSlot, DEFAULT_MIME_TYPE};
use agentdesk_core::reference::{Language, Model, Prompt, Voice};
use agentdesk_core::test_call::{TestCallParams, TestCallResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::{AgentApi, ServiceError};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Async HTTP client implementation of AgentApi.
/// Every path is relative to a base URL that already includes `/api`.
#[derive(Clone)]
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the backend is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }

    async fn send<T: DeserializeOwned + Default>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        handle_response(resp).await
    }

    async fn get_json<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ServiceError> {
        debug!("GET {}{path}", self.base_url);
        self.send(self.client.get(format!("{}{path}", self.base_url)))
            .await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("POST {}{path}", self.base_url);
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        self.send(builder).await
    }

    async fn post_empty<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ServiceError> {
        debug!("POST {}{path}", self.base_url);
        self.send(self.client.post(format!("{}{path}", self.base_url)))
            .await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("PUT {}{path}", self.base_url);
        let builder = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body);
        self.send(builder).await
    }
}

/// Decode a successful response, or turn a rejected one into `ServiceError::Http`.
/// A 204 decodes to `T::default()`.
async fn handle_response<T: DeserializeOwned + Default>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(T::default());
    }
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ServiceError::Http {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl AgentApi for HttpService {
    async fn list_languages(&self) -> Result<Vec<Language>, ServiceError> {
        self.get_json("/languages").await
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, ServiceError> {
        self.get_json("/voices").await
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServiceError> {
        self.get_json("/prompts").await
    }

    async fn list_models(&self) -> Result<Vec<Model>, ServiceError> {
        self.get_json("/models").await
    }

    async fn create_agent(&self, agent: &Agent) -> Result<Agent, ServiceError> {
        self.post_json("/agents", &agent.without_id()).await
    }

    async fn update_agent(&self, id: &str, agent: &Agent) -> Result<Agent, ServiceError> {
        self.put_json(&format!("/agents/{id}"), &agent.without_id())
            .await
    }

    async fn request_upload_slot(&self) -> Result<UploadSlot, ServiceError> {
        self.post_empty("/attachments/upload-url").await
    }

    async fn transfer_content(&self, signed_url: &str, content: Bytes) -> Result<(), ServiceError> {
        debug!("PUT {signed_url} ({} bytes)", content.len());
        let resp = self
            .client
            .put(signed_url)
            .header("Content-Type", DEFAULT_MIME_TYPE)
            .body(content)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Transfer {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            })
        }
    }

    async fn register_attachment(
        &self,
        input: &RegisterAttachment,
    ) -> Result<Attachment, ServiceError> {
        self.post_json("/attachments", input).await
    }

    async fn start_test_call(
        &self,
        agent_id: &str,
        params: &TestCallParams,
    ) -> Result<TestCallResponse, ServiceError> {
        self.post_json(&format!("/agents/{agent_id}/test-call"), params)
            .await
    }
}
