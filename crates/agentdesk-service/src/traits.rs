use agentdesk_core::agent::Agent;
use agentdesk_core::attachment::{Attachment, RegisterAttachment, UploadSlot};
use agentdesk_core::reference::{Language, Model, Prompt, Voice};
use agentdesk_core::test_call::{TestCallParams, TestCallResponse};
use agentdesk_core::ValidationError;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::file::FileHandle;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("connection failed: {0}")]
    Transport(String),

    #[error("API Error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to upload file content: {status} {reason}")]
    Transfer { status: u16, reason: String },

    #[error("json decode: {0}")]
    Decode(String),

    #[error("io: {0}")]
    Io(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ServiceError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Http { status, .. } | ServiceError::Transfer { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// The remote operations the dashboard hooks depend on.
///
/// `HttpService` talks to a real (or mock) backend over HTTP.
/// `MockApi` is a scripted in-process double used by tests.
#[async_trait]
pub trait AgentApi: Send + Sync {
    // -- Reference data --
    async fn list_languages(&self) -> Result<Vec<Language>, ServiceError>;
    async fn list_voices(&self) -> Result<Vec<Voice>, ServiceError>;
    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServiceError>;
    async fn list_models(&self) -> Result<Vec<Model>, ServiceError>;

    // -- Agents --
    async fn create_agent(&self, agent: &Agent) -> Result<Agent, ServiceError>;
    async fn update_agent(&self, id: &str, agent: &Agent) -> Result<Agent, ServiceError>;

    // -- Uploads --
    async fn request_upload_slot(&self) -> Result<UploadSlot, ServiceError>;
    /// PUT raw bytes to an absolute signed URL.
    async fn transfer_content(&self, signed_url: &str, content: Bytes) -> Result<(), ServiceError>;
    async fn register_attachment(
        &self,
        input: &RegisterAttachment,
    ) -> Result<Attachment, ServiceError>;

    // -- Test calls --
    async fn start_test_call(
        &self,
        agent_id: &str,
        params: &TestCallParams,
    ) -> Result<TestCallResponse, ServiceError>;

    /// Run the three upload steps for one file: slot, transfer, register.
    /// The first failing step aborts the rest.
    async fn upload_file(&self, file: &FileHandle) -> Result<Attachment, ServiceError> {
        let slot = self.request_upload_slot().await?;
        let content = file.read().await?;
        // Register what was actually sent; the file may have changed since selection.
        let file_size = content.len() as u64;
        self.transfer_content(&slot.signed_url, content).await?;
        self.register_attachment(&RegisterAttachment {
            key: slot.key,
            file_name: file.name().to_string(),
            file_size,
            mime_type: file.mime_type().to_string(),
        })
        .await
    }
}
