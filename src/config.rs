// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::record::Category;
use crate::seen::DEFAULT_SEEN_CAPACITY;

const ENV_PATH: &str = "MONITOR_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/monitor.toml";

pub const ENV_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_CHAT_ID: &str = "CHAT_ID";
pub const TOKEN_PLACEHOLDER: &str = "여기에_봇_토큰_입력";
pub const CHAT_ID_PLACEHOLDER: &str = "여기에_채팅방_ID_입력";

/// Non-secret settings. Every field has a default, so a partial TOML file works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_url: String,
    pub query_selector: String,
    pub search_button_selector: String,
    /// `{case}` is replaced with the case number.
    pub detail_trigger_selector: String,
    pub list_response: String,
    pub detail_response: String,
    pub navigation_timeout_secs: u64,
    pub list_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    pub category_pause_ms: u64,
    pub detail_pause_ms: u64,
    pub poll_interval_secs: u64,
    /// Records fetched per category when polling continuously.
    pub continuous_fetch_count: usize,
    pub categories: Vec<Category>,
    pub state_path: PathBuf,
    pub seen_capacity: usize,
    /// Stop checking the seen set at the first already-notified record.
    pub stop_at_first_seen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_url: "https://nlrc.go.kr/nlrc/mainCase/judgment/search/index.do".into(),
            query_selector: "#pQuery".into(),
            search_button_selector: ".btnSearch".into(),
            detail_trigger_selector: r#"a[data-k2="{case}"]"#.into(),
            list_response: "/list.do".into(),
            detail_response: "/detail.do".into(),
            navigation_timeout_secs: 60,
            list_timeout_secs: 30,
            detail_timeout_secs: 15,
            category_pause_ms: 1_000,
            detail_pause_ms: 1_000,
            poll_interval_secs: 6 * 3600,
            continuous_fetch_count: 2,
            categories: Category::ALL.to_vec(),
            state_path: PathBuf::from("last_case.json"),
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            stop_at_first_seen: false,
        }
    }
}

impl Settings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn category_pause(&self) -> Duration {
        Duration::from_millis(self.category_pause_ms)
    }

    pub fn detail_pause(&self) -> Duration {
        Duration::from_millis(self.detail_pause_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn detail_selector(&self, case_number: &str) -> String {
        let escaped = case_number.replace('\\', "\\\\").replace('"', "\\\"");
        self.detail_trigger_selector.replace("{case}", &escaped)
    }
}

/// Load settings from an explicit path. Supports TOML only.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing settings in {}", path.display()))
}

/// Resolve settings:
/// 1) explicit path (`--config`)
/// 2) $MONITOR_CONFIG_PATH
/// 3) config/monitor.toml
/// 4) built-in defaults
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(p) = explicit {
        if !p.exists() {
            return Err(anyhow!("settings file {} does not exist", p.display()));
        }
        return load_settings_from(p);
    }
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_settings_from(&pb);
        } else {
            return Err(anyhow!("MONITOR_CONFIG_PATH points to non-existent path"));
        }
    }
    let default_p = PathBuf::from(DEFAULT_PATH);
    if default_p.exists() {
        return load_settings_from(&default_p);
    }
    Ok(Settings::default())
}

/// Where notifications go. `Disabled` when either secret is missing or still a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub enum Transport {
    Disabled,
    Telegram { token: String, chat_id: String },
}

impl Transport {
    pub fn from_parts(token: Option<String>, chat_id: Option<String>) -> Self {
        let usable = |v: Option<String>, placeholder: &str| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && s != placeholder)
        };
        match (
            usable(token, TOKEN_PLACEHOLDER),
            usable(chat_id, CHAT_ID_PLACEHOLDER),
        ) {
            (Some(token), Some(chat_id)) => Transport::Telegram { token, chat_id },
            _ => Transport::Disabled,
        }
    }

    pub fn from_env() -> Self {
        Self::from_parts(std::env::var(ENV_TOKEN).ok(), std::env::var(ENV_CHAT_ID).ok())
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Transport::Disabled)
    }
}

// Keep the bot token out of logs.
impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Disabled => f.write_str("Disabled"),
            Transport::Telegram { token, chat_id } => f
                .debug_struct("Telegram")
                .field("token_len", &token.len())
                .field("chat_id", chat_id)
                .finish(),
        }
    }
}
