use paramform_core::FormConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const ADDR_VAR: &str = "PARAMFORM_ADDR";
pub const SETTLE_VAR: &str = "PARAMFORM_SETTLE_MS";
pub const STATIC_VAR: &str = "PARAMFORM_STATIC_DIR";

/// Server settings, read from the environment with fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub commit_settle: Duration,
    /// Directory served at `/` for the browser side, if any.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            commit_settle: FormConfig::default().commit_settle(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparsable values are logged and
    /// replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ADDR_VAR) {
            match raw.parse() {
                Ok(addr) => config.addr = addr,
                Err(e) => warn!("Ignoring {}={:?}: {}", ADDR_VAR, raw, e),
            }
        }
        if let Some(raw) = lookup(SETTLE_VAR) {
            match raw.parse::<u64>() {
                Ok(ms) => config.commit_settle = Duration::from_millis(ms),
                Err(e) => warn!("Ignoring {}={:?}: {}", SETTLE_VAR, raw, e),
            }
        }
        config.static_dir = lookup(STATIC_VAR).filter(|s| !s.is_empty()).map(PathBuf::from);

        config
    }

    pub fn form_config(&self) -> FormConfig {
        FormConfig::default().with_commit_settle(self.commit_settle)
    }
}
