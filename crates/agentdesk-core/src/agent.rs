use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    #[default]
    Inbound,
    Outbound,
}

impl CallType {
    pub const ALL: &[CallType] = &[CallType::Inbound, CallType::Outbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Inbound => "inbound",
            CallType::Outbound => "outbound",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CallType::Inbound => "Inbound (Receive Calls)",
            CallType::Outbound => "Outbound (Make Calls)",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "inbound" => Some(CallType::Inbound),
            "outbound" => Some(CallType::Outbound),
            _ => None,
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTools {
    pub allow_hang_up: bool,
    pub allow_callback: bool,
    pub live_transfer: bool,
}

impl Default for AgentTools {
    fn default() -> Self {
        Self {
            allow_hang_up: true,
            allow_callback: false,
            live_transfer: false,
        }
    }
}

/// An agent record as exchanged with the backend.
///
/// `id` is absent on create requests and assigned by the server. Every other
/// field tolerates being missing so that an empty response body decodes to a
/// default record instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Agent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub call_type: CallType,
    pub language: String,
    pub voice: String,
    pub prompt: String,
    pub model: String,
    /// Response latency in seconds.
    pub latency: f64,
    /// Speech speed in percent.
    pub speed: u32,
    pub call_script: String,
    pub service_description: String,
    /// Attachment ids used as knowledge-base inputs.
    pub attachments: Vec<String>,
    pub tools: AgentTools,
}

impl Agent {
    /// The same record with the id stripped, as sent on create and update.
    pub fn without_id(&self) -> Agent {
        Agent {
            id: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_type_parse_str_all() {
        assert_eq!(CallType::parse_str("inbound"), Some(CallType::Inbound));
        assert_eq!(CallType::parse_str("outbound"), Some(CallType::Outbound));
        assert_eq!(CallType::parse_str("Inbound"), None);
        assert_eq!(CallType::parse_str(""), None);
    }

    #[test]
    fn agent_serializes_camel_case_without_id() {
        let agent = Agent {
            name: "Sales".into(),
            call_type: CallType::Outbound,
            call_script: "Hi".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&agent).unwrap();
        assert!(v.get("id").is_none());
        assert_eq!(v["callType"], "outbound");
        assert_eq!(v["callScript"], "Hi");
        assert_eq!(v["tools"]["allowHangUp"], true);
        assert_eq!(v["tools"]["liveTransfer"], false);
    }

    #[test]
    fn empty_object_decodes_to_default_agent() {
        let agent: Agent = serde_json::from_str("{}").unwrap();
        assert!(agent.id.is_none());
        assert!(agent.name.is_empty());
        assert!(agent.attachments.is_empty());
    }

    #[test]
    fn without_id_keeps_fields() {
        let agent = Agent {
            id: Some("a1".into()),
            name: "Support".into(),
            ..Default::default()
        };
        let stripped = agent.without_id();
        assert!(stripped.id.is_none());
        assert_eq!(stripped.name, "Support");
    }
}
