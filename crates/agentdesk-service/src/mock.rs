//! Scripted in-process `AgentApi` for tests and offline demos.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use agentdesk_core::agent::Agent;
use agentdesk_core::attachment::{Attachment, RegisterAttachment, UploadSlot};
use agentdesk_core::reference::{Language, Model, Prompt, ReferenceData, Voice};
use agentdesk_core::test_call::{TestCallParams, TestCallResponse, STATUS_INITIATED};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Semaphore;

use crate::{AgentApi, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListLanguages,
    ListVoices,
    ListPrompts,
    ListModels,
    CreateAgent,
    UpdateAgent,
    RequestUploadSlot,
    TransferContent,
    RegisterAttachment,
    StartTestCall,
}

/// A request the mock received, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListLanguages,
    ListVoices,
    ListPrompts,
    ListModels,
    CreateAgent(Agent),
    UpdateAgent(String, Agent),
    RequestUploadSlot,
    TransferContent { signed_url: String, size: usize },
    RegisterAttachment(RegisterAttachment),
    StartTestCall(String, TestCallParams),
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiCall::ListLanguages => Endpoint::ListLanguages,
            ApiCall::ListVoices => Endpoint::ListVoices,
            ApiCall::ListPrompts => Endpoint::ListPrompts,
            ApiCall::ListModels => Endpoint::ListModels,
            ApiCall::CreateAgent(_) => Endpoint::CreateAgent,
            ApiCall::UpdateAgent(..) => Endpoint::UpdateAgent,
            ApiCall::RequestUploadSlot => Endpoint::RequestUploadSlot,
            ApiCall::TransferContent { .. } => Endpoint::TransferContent,
            ApiCall::RegisterAttachment(_) => Endpoint::RegisterAttachment,
            ApiCall::StartTestCall(..) => Endpoint::StartTestCall,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<ApiCall>,
    failing: HashSet<Endpoint>,
    failing_content: Vec<Bytes>,
    upload_gate: Option<Arc<Semaphore>>,
    test_call_status: Option<String>,
}

pub struct MockApi {
    reference: ReferenceData,
    state: Mutex<MockState>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// A mock that answers every call successfully with sample data.
    pub fn new() -> Self {
        Self::with_reference(sample_reference_data())
    }

    pub fn with_reference(reference: ReferenceData) -> Self {
        Self {
            reference,
            state: Mutex::new(MockState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every call to `endpoint` fail with a 500.
    pub fn fail(&self, endpoint: Endpoint) {
        self.lock().failing.insert(endpoint);
    }

    /// Make content transfers fail when the body equals `content`.
    pub fn fail_transfer_of(&self, content: &[u8]) {
        self.lock()
            .failing_content
            .push(Bytes::copy_from_slice(content));
    }

    /// Answer test calls with this status instead of "initiated".
    pub fn set_test_call_status(&self, status: &str) {
        self.lock().test_call_status = Some(status.to_string());
    }

    /// Hold slot requests until permits are added to the returned semaphore.
    pub fn gate_uploads(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.lock().upload_gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count()
    }

    /// Record the call and return how many calls `call`'s endpoint has seen,
    /// or the scripted failure.
    fn record(&self, call: ApiCall) -> Result<usize, ServiceError> {
        let mut state = self.lock();
        let endpoint = call.endpoint();
        state.calls.push(call);
        if state.failing.contains(&endpoint) {
            return Err(ServiceError::Http {
                status: 500,
                body: format!("mock failure: {endpoint:?}"),
            });
        }
        Ok(state
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count())
    }
}

#[async_trait]
impl AgentApi for MockApi {
    async fn list_languages(&self) -> Result<Vec<Language>, ServiceError> {
        self.record(ApiCall::ListLanguages)?;
        Ok(self.reference.languages.clone())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, ServiceError> {
        self.record(ApiCall::ListVoices)?;
        Ok(self.reference.voices.clone())
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>, ServiceError> {
        self.record(ApiCall::ListPrompts)?;
        Ok(self.reference.prompts.clone())
    }

    async fn list_models(&self) -> Result<Vec<Model>, ServiceError> {
        self.record(ApiCall::ListModels)?;
        Ok(self.reference.models.clone())
    }

    async fn create_agent(&self, agent: &Agent) -> Result<Agent, ServiceError> {
        let n = self.record(ApiCall::CreateAgent(agent.clone()))?;
        Ok(Agent {
            id: Some(format!("agent-{n}")),
            ..agent.clone()
        })
    }

    async fn update_agent(&self, id: &str, agent: &Agent) -> Result<Agent, ServiceError> {
        self.record(ApiCall::UpdateAgent(id.to_string(), agent.clone()))?;
        Ok(Agent {
            id: Some(id.to_string()),
            ..agent.clone()
        })
    }

    async fn request_upload_slot(&self) -> Result<UploadSlot, ServiceError> {
        let gate = self.lock().upload_gate.clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let n = self.record(ApiCall::RequestUploadSlot)?;
        let key = format!("key-{n}");
        Ok(UploadSlot {
            signed_url: format!("mock://upload/{key}"),
            key,
            expires_in: 3600,
        })
    }

    async fn transfer_content(&self, signed_url: &str, content: Bytes) -> Result<(), ServiceError> {
        self.record(ApiCall::TransferContent {
            signed_url: signed_url.to_string(),
            size: content.len(),
        })?;
        if self.lock().failing_content.contains(&content) {
            return Err(ServiceError::Transfer {
                status: 500,
                reason: "Internal Server Error".into(),
            });
        }
        Ok(())
    }

    async fn register_attachment(
        &self,
        input: &RegisterAttachment,
    ) -> Result<Attachment, ServiceError> {
        let n = self.record(ApiCall::RegisterAttachment(input.clone()))?;
        Ok(Attachment {
            id: format!("att-{n}"),
            key: input.key.clone(),
            file_name: input.file_name.clone(),
            file_size: input.file_size,
            mime_type: input.mime_type.clone(),
        })
    }

    async fn start_test_call(
        &self,
        agent_id: &str,
        params: &TestCallParams,
    ) -> Result<TestCallResponse, ServiceError> {
        let n = self.record(ApiCall::StartTestCall(agent_id.to_string(), params.clone()))?;
        let status = self
            .lock()
            .test_call_status
            .clone()
            .unwrap_or_else(|| STATUS_INITIATED.to_string());
        Ok(TestCallResponse {
            success: true,
            call_id: format!("call-{n}"),
            agent_id: agent_id.to_string(),
            status,
        })
    }
}

/// Small reference catalogue served by `MockApi::new`.
pub fn sample_reference_data() -> ReferenceData {
    ReferenceData {
        languages: vec![
            Language {
                id: "en".into(),
                name: "English".into(),
                code: "en-US".into(),
            },
            Language {
                id: "es".into(),
                name: "Spanish".into(),
                code: "es-ES".into(),
            },
        ],
        voices: vec![
            Voice {
                id: "v-ava".into(),
                name: "Ava".into(),
                tag: "warm".into(),
                language: "en".into(),
            },
            Voice {
                id: "v-leo".into(),
                name: "Leo".into(),
                tag: "calm".into(),
                language: "en".into(),
            },
            Voice {
                id: "v-lucia".into(),
                name: "Lucia".into(),
                tag: "bright".into(),
                language: "es".into(),
            },
        ],
        prompts: vec![Prompt {
            id: "p-sales".into(),
            name: "Sales Outreach".into(),
            description: "Qualify leads and book demos".into(),
        }],
        models: vec![Model {
            id: "m-fast".into(),
            name: "Fast".into(),
            description: "Low-latency conversational model".into(),
        }],
    }
}
