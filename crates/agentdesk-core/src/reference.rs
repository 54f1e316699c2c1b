use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub tag: String,
    /// Language id this voice speaks.
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The four enumerations used to populate the agent form selectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub languages: Vec<Language>,
    pub voices: Vec<Voice>,
    pub prompts: Vec<Prompt>,
    pub models: Vec<Model>,
}

impl ReferenceData {
    /// Voices filtered to one language id.
    pub fn voices_for(&self, language_id: &str) -> Vec<&Voice> {
        self.voices
            .iter()
            .filter(|v| v.language == language_id)
            .collect()
    }
}
