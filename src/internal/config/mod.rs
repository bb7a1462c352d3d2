// src/internal/config/mod.rs

pub mod commented_json;
pub mod loader;
pub mod settings;

pub use commented_json::{load_commented_json, parse_commented_json, strip_comments};
pub use loader::{
    deep_merge, ConfigLoader, ConfigSource, ConfigSourceError, EffectiveConfig, SourceScope,
};
pub use settings::{LogOutput, LoggingSettings, SettingsError, DEFAULT_LOG_LEVEL, ENV_PREFIX};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
