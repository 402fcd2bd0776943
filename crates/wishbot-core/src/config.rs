//! Wishbot configuration system.
//!
//! Values come from an optional TOML file and are then overridden by the
//! process environment. `SENDER_NAME`, `SENDER_NUMBER` and `REPORT_NUMBER`
//! must end up non-empty, see [`WishbotConfig::validate`].

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WishbotError};
use crate::types::SenderIdentity;

pub const ENV_SENDER_NAME: &str = "SENDER_NAME";
pub const ENV_SENDER_NUMBER: &str = "SENDER_NUMBER";
pub const ENV_REPORT_NUMBER: &str = "REPORT_NUMBER";
pub const ENV_ROSTER: &str = "WISHBOT_ROSTER";
pub const ENV_WHATSAPP_TOKEN: &str = "WHATSAPP_ACCESS_TOKEN";
pub const ENV_WHATSAPP_PHONE_ID: &str = "WHATSAPP_PHONE_NUMBER_ID";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WishbotConfig {
    #[serde(default)]
    pub sender: SenderConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl WishbotConfig {
    /// Load config from the default path (~/.wishbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WishbotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| WishbotError::Config(format!("Failed to parse config: {e}")))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Wishbot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wishbot")
    }

    /// Override file values with the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override file values from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SENDER_NAME) {
            self.sender.name = v;
        }
        if let Some(v) = get(ENV_SENDER_NUMBER) {
            self.sender.number = v;
        }
        if let Some(v) = get(ENV_REPORT_NUMBER) {
            self.report.number = v;
        }
        if let Some(v) = get(ENV_ROSTER) {
            self.roster.path = v;
        }
        if let Some(v) = get(ENV_WHATSAPP_TOKEN) {
            self.channel.whatsapp.access_token = v;
        }
        if let Some(v) = get(ENV_WHATSAPP_PHONE_ID) {
            self.channel.whatsapp.phone_number_id = v;
        }
    }

    /// Check everything the daemon cannot start without.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            (ENV_SENDER_NAME, &self.sender.name),
            (ENV_SENDER_NUMBER, &self.sender.number),
            (ENV_REPORT_NUMBER, &self.report.number),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

        if !missing.is_empty() {
            return Err(WishbotError::Config(format!(
                "{} must be set",
                missing.join(", ")
            )));
        }

        self.schedule.anchor_time()?;
        Ok(())
    }

    pub fn sender_identity(&self) -> SenderIdentity {
        SenderIdentity {
            name: self.sender.name.trim().to_string(),
            number: self.sender.number.trim().to_string(),
        }
    }
}

/// Identity inserted into every greeting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
}

/// Where the daily summary goes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub number: String,
}

/// Roster source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_roster_path")]
    pub path: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

fn default_roster_path() -> String { "birthdays.csv".into() }
fn default_country_code() -> String { "91".into() }

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
            country_code: default_country_code(),
        }
    }
}

impl RosterConfig {
    /// Roster path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }
}

/// Daily cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily run, `HH:MM` or `HH:MM:SS`.
    #[serde(default = "default_anchor")]
    pub anchor: String,
    /// Run once right after startup, before waiting for the first anchor.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_anchor() -> String { "09:00:00".into() }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            run_on_startup: false,
        }
    }
}

impl ScheduleConfig {
    pub fn anchor_time(&self) -> Result<NaiveTime> {
        let raw = self.anchor.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|e| WishbotError::Config(format!("Invalid schedule.anchor '{raw}': {e}")))
    }
}

/// Per-run dispatch tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_send_delay")]
    pub send_delay_secs: u64,
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
    /// Ages strictly above this get the secondary template set.
    #[serde(default = "default_age_threshold")]
    pub age_threshold: i32,
}

fn default_send_delay() -> u64 { 3 }
fn default_send_timeout() -> u64 { 30 }
fn default_age_threshold() -> i32 { 40 }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_delay_secs: default_send_delay(),
            send_timeout_secs: default_send_timeout(),
            age_threshold: default_age_threshold(),
        }
    }
}

impl DispatchConfig {
    pub fn send_delay(&self) -> Duration {
        Duration::from_secs(self.send_delay_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

/// Greeting overrides. Empty lists keep the built-in sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

/// Which transport to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Whatsapp,
    Log,
}

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub kind: ChannelKind,
    /// How long to wait for the transport to report itself connected.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
    /// Extra pause once connected before the first run.
    #[serde(default)]
    pub settle_secs: u64,
    #[serde(default)]
    pub whatsapp: WhatsAppChannelConfig,
}

fn default_ready_timeout() -> u64 { 60 }

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            kind: ChannelKind::default(),
            ready_timeout_secs: default_ready_timeout(),
            settle_secs: 0,
            whatsapp: WhatsAppChannelConfig::default(),
        }
    }
}

/// WhatsApp Business Cloud API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppChannelConfig {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String { "https://graph.facebook.com/v21.0".into() }

impl Default for WhatsAppChannelConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            api_base: default_api_base(),
        }
    }
}
