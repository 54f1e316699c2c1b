use std::path::PathBuf;

use agentdesk_core::agent::{AgentTools, CallType};
use agentdesk_core::draft::{AgentDraft, TestCallDraft, DEFAULT_LATENCY, DEFAULT_SPEED};
use agentdesk_core::test_call::Gender;
use agentdesk_service::DEFAULT_API_BASE_URL;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "agentdesk", about = "Configure and test voice agents")]
pub struct Cli {
    /// Backend base URL, including the /api prefix
    #[arg(long, global = true, env = "AGENTDESK_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the languages, voices, prompts and models the backend offers
    Reference,
    /// Upload files as agent attachments
    Upload {
        /// Files to upload; unsupported types are skipped
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Create or update an agent
    Save(AgentArgs),
    /// Save an agent, then have it place a test call
    TestCall {
        #[command(flatten)]
        agent: AgentArgs,
        #[command(flatten)]
        target: CallTargetArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AgentArgs {
    /// Existing agent id; updates instead of creating
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// inbound or outbound
    #[arg(long, value_parser = parse_call_type)]
    pub call_type: Option<CallType>,

    /// Language id
    #[arg(long, default_value = "")]
    pub language: String,

    /// Voice id
    #[arg(long, default_value = "")]
    pub voice: String,

    /// Prompt id
    #[arg(long, default_value = "")]
    pub prompt: String,

    /// Model id
    #[arg(long, default_value = "")]
    pub model: String,

    /// Response latency in seconds (0.3 to 1.0)
    #[arg(long, default_value_t = DEFAULT_LATENCY)]
    pub latency: f64,

    /// Speech speed in percent (90 to 130)
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    pub speed: u32,

    #[arg(long, default_value = "")]
    pub call_script: String,

    #[arg(long, default_value = "")]
    pub service_description: String,

    /// Files to upload and attach before saving
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,

    /// Do not let the agent end calls on its own
    #[arg(long)]
    pub no_hang_up: bool,

    #[arg(long)]
    pub allow_callback: bool,

    #[arg(long)]
    pub live_transfer: bool,
}

impl AgentArgs {
    pub fn draft(&self) -> AgentDraft {
        let mut draft = AgentDraft::default();
        draft.name = self.name.clone();
        draft.description = self.description.clone();
        draft.call_type = self.call_type;
        draft.language = self.language.clone();
        draft.voice = self.voice.clone();
        draft.prompt = self.prompt.clone();
        draft.model = self.model.clone();
        draft.call_script = self.call_script.clone();
        draft.service_description = self.service_description.clone();
        draft.tools = AgentTools {
            allow_hang_up: !self.no_hang_up,
            allow_callback: self.allow_callback,
            live_transfer: self.live_transfer,
        };
        draft.set_latency(self.latency);
        draft.set_speed(self.speed);
        draft
    }
}

#[derive(Debug, Clone, Args)]
pub struct CallTargetArgs {
    #[arg(long, default_value = "")]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub last_name: String,

    /// male or female
    #[arg(long, value_parser = parse_gender, default_value = "male")]
    pub gender: Gender,

    /// Number the agent should dial
    #[arg(long = "phone", default_value = "")]
    pub phone_number: String,
}

impl CallTargetArgs {
    pub fn draft(&self) -> TestCallDraft {
        TestCallDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            phone_number: self.phone_number.clone(),
        }
    }
}

fn parse_call_type(s: &str) -> Result<CallType, String> {
    CallType::parse_str(s).ok_or_else(|| format!("unknown call type '{s}' (inbound, outbound)"))
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    Gender::parse_str(s).ok_or_else(|| format!("unknown gender '{s}' (male, female)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_defaults_to_local_middleware() {
        let cli = Cli::parse_from(["agentdesk", "reference"]);
        assert_eq!(cli.api_url, DEFAULT_API_BASE_URL);
        assert!(matches!(cli.command, Command::Reference));
    }

    #[test]
    fn upload_requires_a_path() {
        assert!(Cli::try_parse_from(["agentdesk", "upload"]).is_err());
        let cli = Cli::parse_from(["agentdesk", "upload", "a.pdf", "b.txt"]);
        match cli.command {
            Command::Upload { paths } => assert_eq!(paths.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn save_builds_clamped_draft() {
        let cli = Cli::parse_from([
            "agentdesk",
            "--api-url",
            "http://backend.test/api",
            "save",
            "--name",
            "Sales",
            "--call-type",
            "outbound",
            "--speed",
            "200",
            "--latency",
            "0.1",
            "--no-hang-up",
            "--attach",
            "script.pdf",
        ]);
        assert_eq!(cli.api_url, "http://backend.test/api");
        let Command::Save(args) = cli.command else {
            panic!("expected save");
        };
        let draft = args.draft();
        assert_eq!(draft.name, "Sales");
        assert_eq!(draft.call_type, Some(CallType::Outbound));
        assert_eq!(draft.speed(), 130);
        assert_eq!(draft.latency(), 0.3);
        assert!(!draft.tools.allow_hang_up);
        assert_eq!(args.attachments, [PathBuf::from("script.pdf")]);
    }

    #[test]
    fn unknown_call_type_is_rejected() {
        let err = Cli::try_parse_from(["agentdesk", "save", "--call-type", "sideways"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_call_takes_target_flags() {
        let cli = Cli::parse_from([
            "agentdesk",
            "test-call",
            "--id",
            "a-1",
            "--first-name",
            "Ada",
            "--gender",
            "female",
            "--phone",
            "+15550001111",
        ]);
        let Command::TestCall { agent, target } = cli.command else {
            panic!("expected test-call");
        };
        assert_eq!(agent.id.as_deref(), Some("a-1"));
        let target = target.draft();
        assert_eq!(target.gender, Gender::Female);
        assert_eq!(target.phone_number, "+15550001111");
        assert!(target.validate().is_ok());
    }
}
