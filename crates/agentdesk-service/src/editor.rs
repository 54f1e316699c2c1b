//! Controller behind the create / edit agent form.
//!
//! Holds the draft, the upload tracker and the save / test-call actions, and
//! reproduces the form's submit rules without any rendering.

use std::sync::Arc;

use agentdesk_core::agent::Agent;
use agentdesk_core::draft::{AgentDraft, RequiredField, TestCallDraft};
use agentdesk_core::test_call::TestCallResponse;
use tracing::{debug, error};

use crate::{AgentActions, AgentApi, Toaster, UploadTracker};

pub const MSG_REQUIRED_FIELDS: &str = "Please fill in all required fields in Basic Settings.";
pub const MSG_SAVED: &str = "Agent saved successfully!";
pub const MSG_PHONE_REQUIRED: &str = "Please enter a phone number for the test call.";
pub const MSG_TEST_CALL_STARTED: &str = "Test call initiated successfully";
pub const MSG_TEST_CALL_FAILED: &str = "Failed to initiate test call.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit,
}

pub struct AgentEditor {
    mode: EditorMode,
    pub draft: AgentDraft,
    pub call_target: TestCallDraft,
    agent_id: Option<String>,
    uploads: UploadTracker,
    actions: AgentActions,
    toaster: Toaster,
    show_validation: bool,
    show_test_call_validation: bool,
}

impl AgentEditor {
    /// Editor for a new agent with a default draft.
    pub fn create(api: Arc<dyn AgentApi>, toaster: Toaster) -> Self {
        Self::build(EditorMode::Create, api, toaster, AgentDraft::default(), None)
    }

    /// Editor seeded from an existing agent.
    pub fn edit(api: Arc<dyn AgentApi>, toaster: Toaster, agent: &Agent) -> Self {
        Self::build(
            EditorMode::Edit,
            api,
            toaster,
            AgentDraft::from_agent(agent),
            agent.id.clone(),
        )
    }

    fn build(
        mode: EditorMode,
        api: Arc<dyn AgentApi>,
        toaster: Toaster,
        draft: AgentDraft,
        agent_id: Option<String>,
    ) -> Self {
        Self {
            mode,
            draft,
            call_target: TestCallDraft::default(),
            agent_id,
            uploads: UploadTracker::new(api.clone()),
            actions: AgentActions::new(api),
            toaster,
            show_validation: false,
            show_test_call_validation: false,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    pub fn actions(&self) -> &AgentActions {
        &self.actions
    }

    pub fn show_validation(&self) -> bool {
        self.show_validation
    }

    pub fn show_test_call_validation(&self) -> bool {
        self.show_test_call_validation
    }

    /// Inline error for a required field, once validation has been shown.
    pub fn field_error(&self, field: RequiredField) -> Option<String> {
        (self.show_validation && self.draft.is_missing(field)).then(|| field.message())
    }

    /// Count shown on the "required" badge of the basic settings section.
    pub fn basic_settings_missing(&self) -> usize {
        self.draft.missing_fields().len()
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "Create Agent",
            EditorMode::Edit => "Edit Agent",
        }
    }

    pub fn save_label(&self) -> &'static str {
        if self.actions.is_saving() {
            "Saving..."
        } else {
            match self.mode {
                EditorMode::Create => "Save Agent",
                EditorMode::Edit => "Save Changes",
            }
        }
    }

    /// Whether leaving now would discard typed content.
    pub fn has_unsaved_content(&self) -> bool {
        self.draft.has_content() && !self.actions.is_saving()
    }

    /// Validate and save the draft with the ids of completed uploads.
    ///
    /// An auto save (the one preceding a test call) reports nothing to the
    /// user. Returns the saved agent id, or `None` if nothing was saved.
    pub async fn save(&mut self, auto: bool) -> Option<String> {
        let agent = match self
            .draft
            .to_agent(self.uploads.completed_attachment_ids())
        {
            Ok(agent) => agent,
            Err(e) => {
                debug!("save rejected: {e}");
                if !auto {
                    self.show_validation = true;
                    self.toaster.error(MSG_REQUIRED_FIELDS);
                }
                return None;
            }
        };

        match self
            .actions
            .save_agent(self.agent_id.as_deref(), &agent)
            .await
        {
            Ok(saved) => {
                self.agent_id = saved.id.filter(|id| !id.is_empty());
                if !auto {
                    self.toaster.success(MSG_SAVED);
                }
                self.agent_id.clone()
            }
            Err(e) => {
                error!("save failed: {e}");
                if !auto {
                    self.toaster.error(e.to_string());
                }
                None
            }
        }
    }

    /// Save the draft, then start a test call against the saved agent.
    pub async fn test_call(&mut self) -> Option<TestCallResponse> {
        let params = match self.call_target.to_params() {
            Ok(params) => params,
            Err(e) => {
                debug!("test call rejected: {e}");
                self.show_test_call_validation = true;
                self.toaster.warning(MSG_PHONE_REQUIRED);
                return None;
            }
        };

        let saved_id = self.save(true).await?;

        match self.actions.start_test_call(&saved_id, &params).await {
            Ok(resp) => {
                if resp.is_initiated() {
                    self.toaster.success(MSG_TEST_CALL_STARTED);
                }
                Some(resp)
            }
            Err(e) => {
                error!("test call error: {e}");
                self.toaster.error(MSG_TEST_CALL_FAILED);
                None
            }
        }
    }
}
