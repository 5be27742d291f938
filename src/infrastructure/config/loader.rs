use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file, lowest-priority file layer.
pub const PROJECT_CONFIG_PATH: &str = ".hackathon/config.yaml";
/// Local overrides, not meant to be committed.
pub const LOCAL_CONFIG_PATH: &str = ".hackathon/local.yaml";
/// Prefix for environment overrides; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "HACKATHON_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {field}: must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("Invalid team_formation_threshold: {0}. Must be in (0, 1]")]
    InvalidThreshold(f64),

    #[error("Invalid actionable_limit: must be at least 1")]
    InvalidActionableLimit,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Event end date is before its start date")]
    EventEndsBeforeStart,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.hackathon/config.yaml`
    /// 3. `.hackathon/local.yaml`
    /// 4. `HACKATHON_*` environment variables
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG_PATH))
            .merge(Yaml::file(LOCAL_CONFIG_PATH))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let coordination = &config.coordination;

        for (field, value) in [
            ("request_timeout_ms", coordination.request_timeout_ms),
            ("sweep_interval_ms", coordination.sweep_interval_ms),
            ("scheduling_interval_ms", coordination.scheduling_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { field });
            }
        }

        let threshold = coordination.team_formation_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        if coordination.actionable_limit == 0 {
            return Err(ConfigError::InvalidActionableLimit);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if let (Some(start), Some(end)) = (config.event.start_date, config.event.end_date) {
            if end < start {
                return Err(ConfigError::EventEndsBeforeStart);
            }
        }

        for template in config
            .playbook
            .team_formation
            .iter()
            .chain(std::iter::once(&config.playbook.follow_up))
        {
            if template.title.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "playbook task titles cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AgentId, AlertSeverity, HackathonPhase};
    use chrono::{Duration, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.coordination.request_timeout_ms, 5000);
        assert_eq!(config.coordination.scheduling_interval_ms, 60000);
        assert_eq!(config.coordination.due_soon_days, 2);
        assert_eq!(config.coordination.actionable_limit, 3);
        assert!((config.coordination.team_formation_threshold - 0.5).abs() < f64::EPSILON);
        assert!(!config.coordination.strict_transitions);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
coordination:
  request_timeout_ms: 2500
  urgent_severities: [critical]
  alert_routes:
    catering_issue: logistics
event:
  name: RustHack
  expected_participants: 200
  start_date: 2026-06-01T09:00:00Z
logging:
  level: debug
  format: json
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.coordination.request_timeout_ms, 2500);
        assert_eq!(config.coordination.urgent_severities, vec![AlertSeverity::Critical]);
        assert_eq!(
            config.coordination.route_alert("catering_issue"),
            AgentId::from("logistics")
        );
        // Unlisted alert types fall back to the coordinator
        assert_eq!(config.coordination.route_alert("venue_issue"), AgentId::coordinator());
        assert_eq!(config.event.name, "RustHack");
        assert_eq!(config.event.expected_participants, 200);
        assert!(config.event.start_date.is_some());
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.coordination.request_timeout_ms = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ZeroDuration { field: "request_timeout_ms" })
        ));
    }

    #[test]
    fn test_validate_threshold_bounds() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let mut config = Config::default();
            config.coordination.team_formation_threshold = bad;
            assert!(
                matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidThreshold(_))),
                "{bad} should be rejected"
            );
        }

        let mut config = Config::default();
        config.coordination.team_formation_threshold = 1.0;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_actionable_limit() {
        let mut config = Config::default();
        config.coordination.actionable_limit = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidActionableLimit)
        ));
    }

    #[test]
    fn test_validate_invalid_log_settings() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel, got {other:?}"),
        }

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_event_dates() {
        let mut config = Config::default();
        let start = Utc::now();
        config.event.start_date = Some(start);
        config.event.end_date = Some(start - Duration::days(1));

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EventEndsBeforeStart)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_yaml(
            "coordination:\n  due_soon_days: 5\nplaybook:\n  team_formation_phase: pre_event\n",
        );
        let config = ConfigLoader::load_from_file(file.path()).unwrap();

        assert_eq!(config.coordination.due_soon_days, 5);
        assert_eq!(config.playbook.team_formation_phase, HackathonPhase::PreEvent);
        // Untouched sections keep their defaults
        assert_eq!(config.playbook.planning.len(), 6);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let file = write_yaml("coordination:\n  actionable_limit: 0\n");
        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("actionable_limit"));
    }

    #[test]
    fn test_env_override() {
        let file = write_yaml("coordination:\n  request_timeout_ms: 1000\n");
        temp_env::with_vars(
            [
                ("HACKATHON_COORDINATION__REQUEST_TIMEOUT_MS", Some("7500")),
                ("HACKATHON_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.coordination.request_timeout_ms, 7500, "env should win");
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let base_file = write_yaml(
            "coordination:\n  due_soon_days: 4\nlogging:\n  level: info\n  format: json\n",
        );
        let override_file = write_yaml("logging:\n  level: debug\n");

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.coordination.due_soon_days, 4);
    }
}
