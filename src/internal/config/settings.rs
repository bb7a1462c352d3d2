// src/internal/config/settings.rs

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::loader::EffectiveConfig;

/// Level used when `log_level` is absent or cannot be parsed.
pub const DEFAULT_LOG_LEVEL: &str = "DEBUG";

/// Prefix for environment overrides, e.g. `SITELOG_LOG_LEVEL=ERROR`.
pub const ENV_PREFIX: &str = "SITELOG";

/// Output stream for formatted records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[serde(rename = "stdout", alias = "STDOUT")]
    #[default]
    Stdout,
    #[serde(rename = "stderr", alias = "STDERR")]
    Stderr,
}

/// The logging keys of the effective configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_output: LogOutput,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_output: LogOutput::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to serialize merged configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to extract logging settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid {key}, using {fallback}: {source}")]
    Key {
        key: &'static str,
        fallback: &'static str,
        #[source]
        source: config::ConfigError,
    },
}

impl LoggingSettings {
    /// Extract logging settings from the merged file configuration.
    ///
    /// With `env_prefix` set, variables such as `<PREFIX>_LOG_LEVEL` take
    /// precedence over every file.
    pub fn from_effective(
        effective: &EffectiveConfig,
        env_prefix: Option<&str>,
    ) -> Result<Self, SettingsError> {
        Self::extract(effective, env_prefix).map(|(settings, _)| settings)
    }

    /// Like [`LoggingSettings::from_effective`], but also returns one
    /// [`SettingsError::Key`] per key that fell back to its default.
    ///
    /// Keys are read independently, so a bad `log_output` never discards a
    /// good `log_level`.
    pub fn extract(
        effective: &EffectiveConfig,
        env_prefix: Option<&str>,
    ) -> Result<(Self, Vec<SettingsError>), SettingsError> {
        let merged = serde_json::to_string(effective.values())?;

        let mut builder = Config::builder()
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("log_output", "stdout")?
            .add_source(File::from_str(&merged, FileFormat::Json));

        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let config = builder.build()?;
        let mut notes = Vec::new();

        let log_level = config.get_string("log_level").unwrap_or_else(|source| {
            notes.push(SettingsError::Key {
                key: "log_level",
                fallback: DEFAULT_LOG_LEVEL,
                source,
            });
            default_log_level()
        });

        let log_output = config.get::<LogOutput>("log_output").unwrap_or_else(|source| {
            notes.push(SettingsError::Key {
                key: "log_output",
                fallback: "stdout",
                source,
            });
            LogOutput::default()
        });

        Ok((
            Self {
                log_level,
                log_output,
            },
            notes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn effective(value: serde_json::Value) -> EffectiveConfig {
        match value {
            serde_json::Value::Object(map) => EffectiveConfig::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_defaults_when_keys_absent() {
        let settings = LoggingSettings::from_effective(&effective(json!({})), None).unwrap();
        assert_eq!(settings, LoggingSettings::default());
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_reads_logging_keys_and_ignores_others() {
        let config = effective(json!({
            "log_level": "WARNING",
            "log_output": "stderr",
            "lang": "en-us",
            "tts": {"module": "mimic"}
        }));
        let settings = LoggingSettings::from_effective(&config, None).unwrap();
        assert_eq!(settings.log_level, "WARNING");
        assert_eq!(settings.log_output, LogOutput::Stderr);
    }

    #[test]
    fn test_bad_output_keeps_level() {
        for output in [json!("file"), json!(null), json!({"path": "/tmp/x"})] {
            let config = effective(json!({"log_level": "ERROR", "log_output": output}));
            let (settings, notes) = LoggingSettings::extract(&config, None).unwrap();

            assert_eq!(settings.log_level, "ERROR");
            assert_eq!(settings.log_output, LogOutput::Stdout);
            assert_eq!(notes.len(), 1);
            assert!(matches!(notes[0], SettingsError::Key { key: "log_output", .. }));
        }
    }

    #[test]
    fn test_bad_level_type_keeps_output() {
        let config = effective(json!({"log_level": ["INFO"], "log_output": "stderr"}));
        let (settings, notes) = LoggingSettings::extract(&config, None).unwrap();

        assert_eq!(settings.log_level, "DEBUG");
        assert_eq!(settings.log_output, LogOutput::Stderr);
        assert!(matches!(notes[0], SettingsError::Key { key: "log_level", .. }));
    }

    #[test]
    fn test_environment_overrides_files() {
        std::env::set_var("SITELOG_SETTINGS_TEST_LOG_LEVEL", "ERROR");
        let config = effective(json!({"log_level": "INFO"}));
        let settings =
            LoggingSettings::from_effective(&config, Some("SITELOG_SETTINGS_TEST")).unwrap();
        std::env::remove_var("SITELOG_SETTINGS_TEST_LOG_LEVEL");

        assert_eq!(settings.log_level, "ERROR");
    }
}
