//! Session configuration with TOML file support.

use serde::{Deserialize, Serialize};
use tablesync_types::{ExchangeRatios, UserId};

use crate::logging::LogFormat;
use crate::PeerError;

/// Which side of the arbitration gate this peer sits on.
///
/// Exactly one peer in a session runs as [`Role::Arbitrator`]; it alone
/// commits cross-actor mutations. The role is assigned here, at session
/// setup, and never re-derived from message traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Arbitrator,
    #[default]
    Participant,
}

/// Configuration for one session peer.
///
/// Can be loaded from a TOML file via [`SessionConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). `user_id` is the only required
/// field; everything else has a serde default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// This peer's user id in the session directory. Display names live in
    /// the directory, not here.
    pub user_id: UserId,

    /// Arbitrator or participant. Never inferred from traffic.
    #[serde(default)]
    pub role: Role,

    /// Whether currency offers are sent and processed by this peer.
    #[serde(default = "default_true")]
    pub enable_currency: bool,

    /// Whether item transfers are sent and processed by this peer.
    #[serde(default = "default_true")]
    pub enable_item_send: bool,

    /// Whether this peer (as arbitrator) sends roll requests.
    #[serde(default = "default_true")]
    pub enable_roll_requests: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Coins-per-coin conversion table shared by the whole session.
    #[serde(default)]
    pub ratios: ExchangeRatios,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SessionConfig {
    /// A participant config with defaults for everything but the user id.
    pub fn for_user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::default(),
            enable_currency: default_true(),
            enable_item_send: default_true(),
            enable_roll_requests: default_true(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            ratios: ExchangeRatios::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_ratios(mut self, ratios: ExchangeRatios) -> Self {
        self.ratios = ratios;
        self
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, PeerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PeerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PeerError> {
        toml::from_str(s).map_err(|e| PeerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("SessionConfig is always serializable to TOML")
    }

    pub fn log_format(&self) -> LogFormat {
        match self.log_format.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}
