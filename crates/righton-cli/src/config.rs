//! `righton.toml`: optional file configuration, overridden by flags.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//! database = "/srv/righton/righton.db"
//! seed_demo_data = false
//! session_idle_minutes = 1440
//! max_sessions = 10000
//!
//! [companion]
//! memory_file = "/home/me/.jinxecho_memory.json"
//! pacing = true
//! resume = false
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use righton_store::memory_file::default_memory_path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub companion: CompanionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Defaults to `<data dir>/righton.db`.
    pub database: Option<PathBuf>,
    pub seed_demo_data: bool,
    /// Logins and unread flashes expire after this long without a visit.
    pub session_idle_minutes: u64,
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            database: None,
            seed_demo_data: true,
            session_idle_minutes: 24 * 60,
            max_sessions: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompanionConfig {
    pub memory_file: PathBuf,
    pub pacing: bool,
    pub resume: bool,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            memory_file: default_memory_path(),
            pacing: true,
            resume: false,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid righton.toml")
    }

    /// Load `path`. A missing file yields defaults unless `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!("loaded config from {}", path.display());
                Self::parse(&content).with_context(|| format!("in {}", path.display()))
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}
