use std::path::Path;

use agentdesk_core::agent::Agent;
use agentdesk_core::attachment::Attachment;
use agentdesk_core::reference::{Language, Model, Prompt, Voice};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// In-memory stand-in for the collaborator backend. Nothing is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    pub languages: Vec<Language>,
    pub voices: Vec<Voice>,
    pub prompts: Vec<Prompt>,
    pub models: Vec<Model>,
    pub agents: Vec<Agent>,
    pub attachments: Vec<Attachment>,
}

impl MemoryStore {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read seed file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse seed file {}", path.display()))
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id.as_deref() == Some(id))
    }

    pub fn insert_agent(&mut self, mut agent: Agent) -> Agent {
        agent.id = Some(uuid::Uuid::new_v4().to_string());
        self.agents.push(agent.clone());
        agent
    }

    /// Replace an agent's fields, keeping its id. `None` if it does not exist.
    pub fn replace_agent(&mut self, id: &str, agent: Agent) -> Option<Agent> {
        let slot = self
            .agents
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(id))?;
        *slot = Agent {
            id: Some(id.to_string()),
            ..agent
        };
        Some(slot.clone())
    }

    pub fn insert_attachment(&mut self, mut attachment: Attachment) -> Attachment {
        attachment.id = uuid::Uuid::new_v4().to_string();
        self.attachments.push(attachment.clone());
        attachment
    }

    /// Default catalogue served when no seed file is given.
    pub fn seeded() -> Self {
        let language = |id: &str, name: &str, code: &str| Language {
            id: id.into(),
            name: name.into(),
            code: code.into(),
        };
        let voice = |id: &str, name: &str, tag: &str, language: &str| Voice {
            id: id.into(),
            name: name.into(),
            tag: tag.into(),
            language: language.into(),
        };
        Self {
            languages: vec![
                language("en", "English", "en-US"),
                language("es", "Spanish", "es-ES"),
                language("fr", "French", "fr-FR"),
            ],
            voices: vec![
                voice("ava", "Ava", "Warm", "en"),
                voice("ethan", "Ethan", "Professional", "en"),
                voice("lucia", "Lucia", "Friendly", "es"),
                voice("claire", "Claire", "Calm", "fr"),
            ],
            prompts: vec![
                Prompt {
                    id: "sales".into(),
                    name: "Sales Outreach".into(),
                    description: "Qualify leads and book demos".into(),
                },
                Prompt {
                    id: "support".into(),
                    name: "Customer Support".into(),
                    description: "Answer account and billing questions".into(),
                },
            ],
            models: vec![
                Model {
                    id: "fast".into(),
                    name: "Fast".into(),
                    description: "Lowest latency, shorter answers".into(),
                },
                Model {
                    id: "balanced".into(),
                    name: "Balanced".into(),
                    description: "Good default for most calls".into(),
                },
            ],
            agents: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_replace_agent_keeps_id() {
        let mut store = MemoryStore::default();
        let created = store.insert_agent(Agent {
            name: "A".into(),
            ..Default::default()
        });
        let id = created.id.clone().unwrap();

        let replaced = store
            .replace_agent(
                &id,
                Agent {
                    name: "B".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(replaced.id.as_deref(), Some(id.as_str()));
        assert_eq!(store.agent(&id).unwrap().name, "B");
        assert_eq!(store.agents.len(), 1);
    }

    #[test]
    fn replace_missing_agent_is_none() {
        let mut store = MemoryStore::default();
        assert!(store.replace_agent("nope", Agent::default()).is_none());
    }

    #[test]
    fn seed_file_fills_missing_sections_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("db.json");
        std::fs::write(
            &path,
            r#"{"languages":[{"id":"de","name":"German","code":"de-DE"}]}"#,
        )
        .unwrap();

        let store = MemoryStore::from_json_file(&path).unwrap();
        assert_eq!(store.languages.len(), 1);
        assert!(store.voices.is_empty());
        assert!(store.agents.is_empty());
    }

    #[test]
    fn bad_seed_file_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("db.json");
        std::fs::write(&path, "not json").unwrap();
        let err = MemoryStore::from_json_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("db.json"));
    }
}
