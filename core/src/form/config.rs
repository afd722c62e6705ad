use crate::params::ButtonSpec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables of a form instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Settle delay between the last commit and the change notification.
    pub commit_settle_ms: u64,
    /// Button row used when `render` is not given one.
    pub default_buttons: Vec<ButtonSpec>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            commit_settle_ms: 250,
            default_buttons: ButtonSpec::default_row(),
        }
    }
}

impl FormConfig {
    pub fn commit_settle(&self) -> Duration {
        Duration::from_millis(self.commit_settle_ms)
    }

    pub fn with_commit_settle(mut self, settle: Duration) -> Self {
        self.commit_settle_ms = u64::try_from(settle.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
