//! CLI argument definitions for the FalconCare application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use falcon_core::FalconConfig;

/// FalconCare: bilingual health triage chat in the terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "falcon", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Remote webhook endpoint.
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// Answer every message locally without contacting the remote backend.
    #[arg(long = "offline")]
    pub offline: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FALCON_CONFIG env var > ~/.falcon/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FALCON_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Apply flag and environment overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut FalconConfig) {
        self.apply_overrides_with_env(config, std::env::var("FALCON_ENDPOINT").ok());
    }

    fn apply_overrides_with_env(&self, config: &mut FalconConfig, env_endpoint: Option<String>) {
        if let Some(endpoint) = self.endpoint.clone().or(env_endpoint) {
            config.remote.endpoint = endpoint;
        }
        if self.offline {
            config.remote.enabled = false;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".falcon").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".falcon").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "falcon",
            "--config",
            "/tmp/falcon.toml",
            "--endpoint",
            "http://rasa:5005/webhooks/rest/webhook",
            "--offline",
            "-l",
            "debug",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/falcon.toml")));
        assert_eq!(
            args.endpoint.as_deref(),
            Some("http://rasa:5005/webhooks/rest/webhook")
        );
        assert!(args.offline);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs {
            config: Some(PathBuf::from("custom.toml")),
            ..CliArgs::default()
        };
        assert_eq!(args.resolve_config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = FalconConfig::default();
        CliArgs::default().apply_overrides_with_env(&mut config, None);
        assert!(config.remote.enabled);
        assert_eq!(
            config.remote.endpoint,
            "http://localhost:5005/webhooks/rest/webhook"
        );
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_endpoint_flag_beats_env() {
        let args = CliArgs {
            endpoint: Some("http://flag".to_string()),
            ..CliArgs::default()
        };
        let mut config = FalconConfig::default();
        args.apply_overrides_with_env(&mut config, Some("http://env".to_string()));
        assert_eq!(config.remote.endpoint, "http://flag");
    }

    #[test]
    fn test_env_endpoint_beats_config() {
        let mut config = FalconConfig::default();
        CliArgs::default().apply_overrides_with_env(&mut config, Some("http://env".to_string()));
        assert_eq!(config.remote.endpoint, "http://env");
    }

    #[test]
    fn test_offline_and_log_level() {
        let args = CliArgs {
            offline: true,
            log_level: Some("warn".to_string()),
            ..CliArgs::default()
        };
        let mut config = FalconConfig::default();
        args.apply_overrides_with_env(&mut config, None);
        assert!(!config.remote.enabled);
        assert_eq!(config.general.log_level, "warn");
    }
}
