//! Explicit draft records behind the agent form and the test-call panel.
//!
//! Drafts hold raw form input. They are validated as a whole before being
//! turned into wire payloads, so validation never depends on rendering.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentTools, CallType};
use crate::error::ValidationError;
use crate::test_call::{Gender, TestCallParams};

pub const DEFAULT_LATENCY: f64 = 0.5;
pub const DEFAULT_SPEED: u32 = 110;
pub const LATENCY_RANGE: RangeInclusive<f64> = 0.3..=1.0;
pub const SPEED_RANGE: RangeInclusive<u32> = 90..=130;

/// Fields of the basic settings section that must be filled before saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    CallType,
    Language,
    Voice,
    Prompt,
    Model,
}

impl RequiredField {
    pub const ALL: &[RequiredField] = &[
        RequiredField::Name,
        RequiredField::CallType,
        RequiredField::Language,
        RequiredField::Voice,
        RequiredField::Prompt,
        RequiredField::Model,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::Name => "Agent Name",
            RequiredField::CallType => "Call Type",
            RequiredField::Language => "Language",
            RequiredField::Voice => "Voice",
            RequiredField::Prompt => "Prompt",
            RequiredField::Model => "Model",
        }
    }

    /// Inline message shown under the field.
    pub fn message(&self) -> String {
        format!("{} is required", self.label())
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentDraft {
    pub name: String,
    pub description: String,
    pub call_type: Option<CallType>,
    pub language: String,
    pub voice: String,
    pub prompt: String,
    pub model: String,
    latency: f64,
    speed: u32,
    pub call_script: String,
    pub service_description: String,
    pub tools: AgentTools,
}

impl Default for AgentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            call_type: None,
            language: String::new(),
            voice: String::new(),
            prompt: String::new(),
            model: String::new(),
            latency: DEFAULT_LATENCY,
            speed: DEFAULT_SPEED,
            call_script: String::new(),
            service_description: String::new(),
            tools: AgentTools::default(),
        }
    }
}

impl AgentDraft {
    /// Seed a draft from an existing agent for editing.
    pub fn from_agent(agent: &Agent) -> Self {
        let mut draft = Self {
            name: agent.name.clone(),
            description: agent.description.clone(),
            call_type: Some(agent.call_type),
            language: agent.language.clone(),
            voice: agent.voice.clone(),
            prompt: agent.prompt.clone(),
            model: agent.model.clone(),
            call_script: agent.call_script.clone(),
            service_description: agent.service_description.clone(),
            tools: agent.tools,
            ..Self::default()
        };
        draft.set_latency(agent.latency);
        draft.set_speed(agent.speed);
        draft
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Set latency in seconds, clamped to the slider range.
    pub fn set_latency(&mut self, seconds: f64) {
        self.latency = seconds.clamp(*LATENCY_RANGE.start(), *LATENCY_RANGE.end());
    }

    /// Set speed in percent, clamped to the slider range.
    pub fn set_speed(&mut self, percent: u32) {
        self.speed = percent.clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end());
    }

    /// Required fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .iter()
            .copied()
            .filter(|f| self.is_missing(*f))
            .collect()
    }

    pub fn is_missing(&self, field: RequiredField) -> bool {
        match field {
            RequiredField::Name => self.name.is_empty(),
            RequiredField::CallType => self.call_type.is_none(),
            RequiredField::Language => self.language.is_empty(),
            RequiredField::Voice => self.voice.is_empty(),
            RequiredField::Prompt => self.prompt.is_empty(),
            RequiredField::Model => self.model.is_empty(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// True when the user has typed anything worth warning about on exit.
    pub fn has_content(&self) -> bool {
        !self.name.is_empty() || !self.description.is_empty() || !self.call_script.is_empty()
    }

    /// Build the agent payload from a validated draft.
    pub fn to_agent(&self, attachments: Vec<String>) -> Result<Agent, ValidationError> {
        self.validate()?;
        Ok(Agent {
            id: None,
            name: self.name.clone(),
            description: self.description.clone(),
            call_type: self.call_type.unwrap_or_default(),
            language: self.language.clone(),
            voice: self.voice.clone(),
            prompt: self.prompt.clone(),
            model: self.model.clone(),
            latency: self.latency,
            speed: self.speed,
            call_script: self.call_script.clone(),
            service_description: self.service_description.clone(),
            attachments,
            tools: self.tools,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCallDraft {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub phone_number: String,
}

impl TestCallDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.phone_number.trim().is_empty() {
            return Err(ValidationError::MissingPhoneNumber);
        }
        Ok(())
    }

    pub fn to_params(&self) -> Result<TestCallParams, ValidationError> {
        self.validate()?;
        Ok(TestCallParams {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            phone_number: self.phone_number.clone(),
        })
    }
}
