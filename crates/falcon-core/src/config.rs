use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FalconError, Result};

/// Top-level configuration for the FalconCare triage engine.
///
/// Loaded from `~/.falcon/config.toml` by default. Every section falls back
/// to its defaults when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FalconConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub emergency: EmergencyConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl FalconConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// emergency number is not dialable.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FalconConfig = toml::from_str(&content)?;
        config.emergency.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote conversational backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// When false, every reply is synthesized locally.
    pub enabled: bool,
    /// REST webhook that accepts `{sender, message}` and returns fragments.
    pub endpoint: String,
    /// Upper bound on one backend round trip, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:5005/webhooks/rest/webhook".to_string(),
            timeout_ms: 8_000,
        }
    }
}

/// Pacing of multi-fragment replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Delay between consecutive fragments of one reply, in milliseconds.
    pub fragment_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            fragment_delay_ms: 500,
        }
    }
}

/// Direct-dial numbers attached to urgent and critical replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    pub ambulance_number: String,
    pub emergency_number: String,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            ambulance_number: DEFAULT_AMBULANCE_NUMBER.to_string(),
            emergency_number: DEFAULT_EMERGENCY_NUMBER.to_string(),
        }
    }
}

const DEFAULT_AMBULANCE_NUMBER: &str = "108";
const DEFAULT_EMERGENCY_NUMBER: &str = "112";

/// A phone number a `tel:` button can carry: digits with an optional leading
/// `+` and `-` or space separators.
pub fn is_dialable(number: &str) -> bool {
    let digits = number.strip_prefix('+').unwrap_or(number);
    digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ' ')
        && !digits.starts_with([' ', '-'])
        && !digits.ends_with([' ', '-'])
}

impl EmergencyConfig {
    /// Reject blank or non-dialable numbers.
    pub fn validate(&self) -> Result<()> {
        for (key, number) in [
            ("ambulance_number", &self.ambulance_number),
            ("emergency_number", &self.emergency_number),
        ] {
            if !is_dialable(number) {
                return Err(FalconError::InvalidValue(format!(
                    "emergency.{} '{}' is not a dialable number",
                    key, number
                )));
            }
        }
        Ok(())
    }

    /// Copy with every non-dialable number replaced by its default.
    pub fn sanitized(&self) -> Self {
        let pick = |key: &str, number: &str, default: &str| {
            if is_dialable(number) {
                number.to_string()
            } else {
                warn!(key, number, default, "Emergency number is not dialable, using default");
                default.to_string()
            }
        };
        Self {
            ambulance_number: pick(
                "ambulance_number",
                &self.ambulance_number,
                DEFAULT_AMBULANCE_NUMBER,
            ),
            emergency_number: pick(
                "emergency_number",
                &self.emergency_number,
                DEFAULT_EMERGENCY_NUMBER,
            ),
        }
    }
}

/// Chat input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum utterance length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
        }
    }
}
