use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

/// Runtime configuration. Everything has a sensible default; overrides
/// come from the environment. No credentials are required; public
/// video metadata needs none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_address: SocketAddr,
    /// Explicit yt-dlp binary path; `$PATH` probe when unset.
    pub ytdlp_path: Option<PathBuf>,
    /// Timeout for upstream metadata calls, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("static default address"),
            ytdlp_path: None,
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Some(addr) = lookup("VIDGATE_BIND_ADDR") {
            config.bind_address = addr
                .parse()
                .with_context(|| format!("invalid VIDGATE_BIND_ADDR: {}", addr))?;
        }

        if let Some(path) = lookup("VIDGATE_YTDLP_PATH") {
            if path.trim().is_empty() {
                return Err(anyhow!("VIDGATE_YTDLP_PATH is set but empty"));
            }
            config.ytdlp_path = Some(PathBuf::from(path));
        }

        if let Some(secs) = lookup("VIDGATE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs
                .parse()
                .with_context(|| format!("invalid VIDGATE_REQUEST_TIMEOUT_SECS: {}", secs))?;
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
