use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// The person the agent should call during a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCallParams {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub phone_number: String,
}

pub const STATUS_INITIATED: &str = "initiated";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCallResponse {
    pub success: bool,
    pub call_id: String,
    pub agent_id: String,
    pub status: String,
}

impl TestCallResponse {
    pub fn is_initiated(&self) -> bool {
        self.status == STATUS_INITIATED
    }
}
