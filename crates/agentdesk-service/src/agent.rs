use std::sync::{Arc, Mutex, MutexGuard};

use agentdesk_core::agent::Agent;
use agentdesk_core::test_call::{TestCallParams, TestCallResponse};
use tracing::info;

use crate::{AgentApi, ServiceError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentActionState {
    pub is_saving: bool,
    pub is_testing: bool,
    /// Message of the most recent failure, cleared when a new action starts.
    pub error: Option<String>,
}

#[derive(Clone, Copy)]
enum Flag {
    Saving,
    Testing,
}

/// Save and test-call actions with independent busy flags.
#[derive(Clone)]
pub struct AgentActions {
    api: Arc<dyn AgentApi>,
    state: Arc<Mutex<AgentActionState>>,
}

impl AgentActions {
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(AgentActionState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AgentActionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> AgentActionState {
        self.lock().clone()
    }

    pub fn is_saving(&self) -> bool {
        self.lock().is_saving
    }

    pub fn is_testing(&self) -> bool {
        self.lock().is_testing
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Update when a prior id exists, create otherwise.
    pub async fn save_agent(
        &self,
        agent_id: Option<&str>,
        data: &Agent,
    ) -> Result<Agent, ServiceError> {
        let _busy = self.begin(Flag::Saving);
        let result = match agent_id {
            Some(id) => self.api.update_agent(id, data).await,
            None => self.api.create_agent(data).await,
        };
        match result {
            Ok(agent) => {
                info!("saved agent {}", agent.id.as_deref().unwrap_or("<no id>"));
                Ok(agent)
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    /// Ask the backend to place a test call. The agent must already be saved.
    pub async fn start_test_call(
        &self,
        agent_id: &str,
        params: &TestCallParams,
    ) -> Result<TestCallResponse, ServiceError> {
        let _busy = self.begin(Flag::Testing);
        match self.api.start_test_call(agent_id, params).await {
            Ok(resp) => {
                info!("test call {} for agent {agent_id}: {}", resp.call_id, resp.status);
                Ok(resp)
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    fn begin(&self, flag: Flag) -> BusyGuard<'_> {
        let mut state = self.lock();
        state.error = None;
        set_flag(&mut state, flag, true);
        BusyGuard {
            actions: self,
            flag,
        }
    }

    fn record_error(&self, e: ServiceError) -> ServiceError {
        self.lock().error = Some(e.to_string());
        e
    }
}

fn set_flag(state: &mut AgentActionState, flag: Flag, value: bool) {
    match flag {
        Flag::Saving => state.is_saving = value,
        Flag::Testing => state.is_testing = value,
    }
}

/// Clears its flag when dropped, whether the action succeeded or not.
struct BusyGuard<'a> {
    actions: &'a AgentActions,
    flag: Flag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        set_flag(&mut self.actions.lock(), self.flag, false);
    }
}
