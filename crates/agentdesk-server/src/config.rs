use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "agentdesk-server", about = "Mock backend for the agent dashboard")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "AGENTDESK_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "AGENTDESK_PORT", default_value = "3001")]
    pub port: u16,

    /// Externally reachable base URL used when issuing signed upload URLs.
    /// Defaults to http://localhost:<port>.
    #[arg(long, env = "AGENTDESK_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Forward every request the mock does not handle to this backend.
    /// When unset, the built-in in-memory backend answers instead.
    #[arg(long, env = "AGENTDESK_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// JSON file seeding the in-memory backend
    /// (languages, voices, prompts, models, agents, attachments).
    #[arg(long, env = "AGENTDESK_SEED")]
    pub seed: Option<PathBuf>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}
