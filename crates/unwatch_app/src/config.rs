//! RON configuration for the `unwatch` binary.
//!
//! Only `listing_url` is required:
//!
//! ```ron
//! (
//!     listing_url: "https://wiki.example.com/users/viewnotifications.action",
//!     cursor_param: "startIndex",
//!     automation_marker: Some("unwatch=auto"),
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use unwatch_core::{AutomationMarker, ListingPolicy, DEFAULT_CURSOR_PARAM};
use unwatch_engine::{
    FetchSettings, ListingSelectors, RunnerSettings, DEFAULT_ITEM_SELECTOR, DEFAULT_NEXT_SELECTOR,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub listing_url: String,
    #[serde(default = "default_cursor_param")]
    pub cursor_param: String,
    /// `name=value` query pair added to automated navigations.
    #[serde(default)]
    pub automation_marker: Option<String>,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
    #[serde(default = "default_status_cap_secs")]
    pub status_cap_secs: u64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default = "default_item_selector")]
    pub item: String,
    #[serde(default = "default_next_selector")]
    pub next_page: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: None,
            item: default_item_selector(),
            next_page: default_next_selector(),
        }
    }
}

fn default_cursor_param() -> String {
    DEFAULT_CURSOR_PARAM.to_string()
}

fn default_item_selector() -> String {
    DEFAULT_ITEM_SELECTOR.to_string()
}

fn default_next_selector() -> String {
    DEFAULT_NEXT_SELECTOR.to_string()
}

fn default_settle_delay_ms() -> u64 {
    800
}

fn default_ready_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".unwatch")
}

fn default_status_interval_ms() -> u64 {
    1_000
}

fn default_status_cap_secs() -> u64 {
    600
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn policy(&self) -> anyhow::Result<ListingPolicy> {
        let mut policy = ListingPolicy::parse(&self.listing_url)
            .with_context(|| format!("invalid listing_url {:?}", self.listing_url))?
            .with_cursor_param(self.cursor_param.clone());
        if let Some(raw) = self.automation_marker.as_deref() {
            let marker = AutomationMarker::parse(raw)
                .ok_or_else(|| anyhow!("automation_marker must be name=value, got {raw:?}"))?;
            policy = policy.with_marker(marker);
        }
        Ok(policy)
    }

    pub fn selectors(&self) -> ListingSelectors {
        ListingSelectors {
            container: self.selectors.container.clone(),
            item: self.selectors.item.clone(),
            next_page: self.selectors.next_page.clone(),
        }
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            ready_timeout: Duration::from_millis(self.ready_timeout_ms),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..FetchSettings::default()
        }
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn status_cap(&self) -> Duration {
        Duration::from_secs(self.status_cap_secs)
    }
}
