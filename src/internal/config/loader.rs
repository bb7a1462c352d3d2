// src/internal/config/loader.rs

use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::commented_json::load_commented_json;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sitelog/sitelog.conf";

/// User configuration file, relative to `$HOME`.
pub const USER_CONFIG_RELATIVE: &str = ".sitelog/sitelog.conf";

/// Environment variable naming one extra configuration file.
pub const EXTRA_CONFIG_ENV: &str = "SITELOG_CONFIG";

/// Problems with a single configuration source.
///
/// None of these abort loading: the affected source contributes nothing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigSourceError {
    #[error("config source {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config source {} is not valid commented JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config source {} must hold a JSON object, found {found}", path.display())]
    NotAnObject { path: PathBuf, found: &'static str },
}

impl ConfigSourceError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSourceError::Unavailable { path, .. }
            | ConfigSourceError::Parse { path, .. }
            | ConfigSourceError::NotAnObject { path, .. } => path,
        }
    }
}

/// Where a configuration source sits in the precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceScope {
    System,
    User,
    Extra,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub scope: SourceScope,
    pub path: PathBuf,
}

impl ConfigSource {
    pub fn new(scope: SourceScope, path: impl Into<PathBuf>) -> Self {
        Self {
            scope,
            path: path.into(),
        }
    }
}

/// The merged settings mapping plus any non-fatal problems met on the way.
#[derive(Debug, Default)]
pub struct EffectiveConfig {
    values: Map<String, Value>,
    issues: Vec<ConfigSourceError>,
}

impl EffectiveConfig {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            issues: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a string setting, falling back to `default` when the key is
    /// absent or not a string.
    pub fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn issues(&self) -> &[ConfigSourceError] {
        &self.issues
    }

    pub fn take_issues(&mut self) -> Vec<ConfigSourceError> {
        std::mem::take(&mut self.issues)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// Merge another mapping on top of this one.
    pub fn merge(&mut self, overlay: Map<String, Value>) {
        deep_merge(&mut self.values, overlay);
    }
}

/// Merge `overlay` into `base` key by key.
///
/// Objects present on both sides merge recursively; any other value from
/// `overlay` replaces the one in `base`.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, incoming);
                } else {
                    base.insert(key, Value::Object(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Reads configuration sources in order, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self { sources }
    }

    /// System file, then the user file, then `$SITELOG_CONFIG` if set.
    pub fn with_default_sources() -> Self {
        Self::new(Self::default_sources())
    }

    pub fn default_sources() -> Vec<ConfigSource> {
        let mut sources = vec![ConfigSource::new(SourceScope::System, SYSTEM_CONFIG_PATH)];

        if let Some(home) = env::var_os("HOME").filter(|h| !h.is_empty()) {
            sources.push(ConfigSource::new(
                SourceScope::User,
                Path::new(&home).join(USER_CONFIG_RELATIVE),
            ));
        }

        if let Some(extra) = env::var_os(EXTRA_CONFIG_ENV).filter(|p| !p.is_empty()) {
            sources.push(ConfigSource::new(SourceScope::Extra, extra));
        }

        sources
    }

    /// Append a source with the highest precedence so far.
    pub fn push(&mut self, source: ConfigSource) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Produce the effective configuration.
    ///
    /// A missing file is skipped silently. Unreadable or malformed files are
    /// recorded as issues and contribute an empty mapping.
    pub fn load(&self) -> EffectiveConfig {
        let mut effective = EffectiveConfig::default();

        for source in &self.sources {
            match fs::metadata(&source.path) {
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    debug!("Config source not present: {}", source.path.display());
                    continue;
                }
                Err(err) => {
                    debug!("Config source {} unavailable: {}", source.path.display(), err);
                    effective.issues.push(ConfigSourceError::Unavailable {
                        path: source.path.clone(),
                        source: err,
                    });
                    continue;
                }
            }

            match load_commented_json(&source.path) {
                Ok(map) => {
                    debug!(
                        "Merging {} keys from {:?} config {}",
                        map.len(),
                        source.scope,
                        source.path.display()
                    );
                    effective.merge(map);
                }
                Err(err) => {
                    debug!("Skipping config source: {}", err);
                    effective.issues.push(err);
                }
            }
        }

        effective
    }
}
