// src/internal/logger/facade.rs

use arc_swap::ArcSwapOption;
use serde_json::{Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt::{self, Write as _};
use std::sync::{Arc, LazyLock, OnceLock};

use super::bridge;
use super::callsite::{resolve_identity, set_pending_name, Origin};
use super::level::Level;
use super::registry::{HandleRegistry, LoggerHandle, Output};
use super::sink::{sink_for, Sink, StdoutSink};
use crate::internal::config::{
    ConfigLoader, ConfigSource, LoggingSettings, DEFAULT_LOG_LEVEL, ENV_PREFIX,
};

/// Identity of the handle created eagerly at construction.
pub const ROOT_IDENTITY: &str = "";

/// Identity used for problems found while reading configuration.
pub const CONFIG_IDENTITY: &str = "sitelog::config";

/// How [`Facade::build`] finds its configuration and output.
#[derive(Debug, Clone)]
pub struct FacadeOptions {
    pub sources: Vec<ConfigSource>,
    pub env_prefix: Option<String>,
    /// Overrides the sink named by `log_output`.
    pub sink: Option<Arc<dyn Sink>>,
    pub install_tracing_bridge: bool,
}

impl Default for FacadeOptions {
    fn default() -> Self {
        Self {
            sources: ConfigLoader::default_sources(),
            env_prefix: Some(ENV_PREFIX.to_string()),
            sink: None,
            install_tracing_bridge: true,
        }
    }
}

impl FacadeOptions {
    pub fn with_sources(mut self, sources: Vec<ConfigSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Read environment overrides as `<prefix>_LOG_LEVEL` and so on.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn without_tracing_bridge(mut self) -> Self {
        self.install_tracing_bridge = false;
        self
    }
}

/// The logging service: a fixed threshold, one formatter/sink pair and the
/// per-identity handle registry.
///
/// Configuration is read once at construction; a facade never changes
/// afterwards.
#[derive(Debug)]
pub struct Facade {
    threshold: Level,
    settings: LoggingSettings,
    config: Map<String, Value>,
    output: Arc<Output>,
    registry: HandleRegistry,
}

impl Facade {
    /// A facade with an explicit threshold and sink and no file
    /// configuration.
    pub fn new(threshold: Level, sink: Arc<dyn Sink>) -> Self {
        let settings = LoggingSettings {
            log_level: threshold.as_str().to_string(),
            ..LoggingSettings::default()
        };
        Self::from_parts(threshold, settings, Map::new(), sink)
    }

    /// Load configuration as described by `options` and construct the
    /// facade. Never fails: every configuration problem degrades to a
    /// default and is reported through the new facade at WARNING.
    pub fn build(options: FacadeOptions) -> Self {
        let mut effective = ConfigLoader::new(options.sources).load();
        let mut notes: Vec<String> = effective
            .take_issues()
            .iter()
            .map(ToString::to_string)
            .collect();

        let settings = match LoggingSettings::extract(&effective, options.env_prefix.as_deref())
        {
            Ok((settings, key_errors)) => {
                notes.extend(key_errors.iter().map(ToString::to_string));
                settings
            }
            Err(err) => {
                notes.push(err.to_string());
                LoggingSettings::default()
            }
        };

        let threshold = match Level::parse(&settings.log_level) {
            Some(level) => level,
            None => {
                notes.push(format!(
                    "unknown log_level {:?}, using {}",
                    settings.log_level, DEFAULT_LOG_LEVEL
                ));
                Level::default()
            }
        };

        let sink = options
            .sink
            .unwrap_or_else(|| sink_for(settings.log_output));
        let facade = Self::from_parts(threshold, settings, effective.into_map(), sink);

        for note in notes {
            facade.emit(
                Level::Warning,
                Origin::Named(CONFIG_IDENTITY),
                format_args!("{}", note),
            );
        }

        facade
    }

    /// Used before `initialize` runs: everything at DEBUG and above goes to
    /// standard output.
    pub fn bootstrap() -> Self {
        Self::new(Level::Debug, Arc::new(StdoutSink))
    }

    fn from_parts(
        threshold: Level,
        settings: LoggingSettings,
        config: Map<String, Value>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        let output = Arc::new(Output::new(sink));
        let registry = HandleRegistry::new(threshold, Arc::clone(&output));
        registry.get_or_create(ROOT_IDENTITY);

        Self {
            threshold,
            settings,
            config,
            output,
            registry,
        }
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.threshold)
    }

    pub fn settings(&self) -> &LoggingSettings {
        &self.settings
    }

    /// The merged configuration, including keys the facade does not use.
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn root(&self) -> Arc<LoggerHandle> {
        self.registry.get_or_create(ROOT_IDENTITY)
    }

    pub fn handle(&self, identity: &str) -> Arc<LoggerHandle> {
        self.registry.get_or_create(identity)
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Records dropped because the sink refused the write.
    pub fn write_failures(&self) -> u64 {
        self.output.write_failures()
    }

    /// Attribute the next site-derived emission made on this thread to
    /// `name`. Returns `self` for `info!(logger: f.name_next("x"), ...)`.
    pub fn name_next(&self, name: impl Into<String>) -> &Self {
        set_pending_name(name.into());
        self
    }

    /// A handle whose emissions all carry `name`.
    pub fn named(&self, name: impl Into<String>) -> NamedLogger<'_> {
        NamedLogger {
            facade: self,
            name: name.into(),
        }
    }

    pub fn emit(&self, level: Level, origin: Origin<'_>, args: fmt::Arguments<'_>) {
        self.dispatch(level, origin, args, None);
    }

    /// Emit at ERROR with the error, its sources and a backtrace (when
    /// backtraces are enabled) appended to the message.
    pub fn emit_exception(&self, origin: Origin<'_>, err: &dyn Error, args: fmt::Arguments<'_>) {
        self.dispatch(Level::Error, origin, args, Some(err));
    }

    fn dispatch(
        &self,
        level: Level,
        origin: Origin<'_>,
        args: fmt::Arguments<'_>,
        err: Option<&dyn Error>,
    ) {
        // Resolve first so a pending name is consumed even when the record
        // is dropped.
        let identity = resolve_identity(origin);
        if !self.is_enabled(level) {
            return;
        }
        let handle = self.registry.get_or_create(&identity);

        let mut message = fmt::format(args);
        if let Some(err) = err {
            message.push('\n');
            message.push_str(&render_trace(err));
        }
        handle.emit(level, &message);
    }
}

/// `Error: ...` followed by one `Caused by: ...` line per source.
pub fn render_trace(err: &dyn Error) -> String {
    let mut out = format!("Error: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\nCaused by: {}", cause);
        source = cause.source();
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(out, "\nStack backtrace:\n{}", backtrace);
    }
    out
}

/// A facade view that attributes every record to one identity.
#[derive(Debug)]
pub struct NamedLogger<'a> {
    facade: &'a Facade,
    name: String,
}

impl NamedLogger<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.facade.emit(level, Origin::Named(&self.name), args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn warning(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warning, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn exception(&self, err: &dyn Error, args: fmt::Arguments<'_>) {
        self.facade
            .emit_exception(Origin::Named(&self.name), err, args);
    }
}

static GLOBAL: LazyLock<ArcSwapOption<Facade>> = LazyLock::new(ArcSwapOption::empty);
static BOOTSTRAP: OnceLock<Arc<Facade>> = OnceLock::new();

/// The process-wide facade; the bootstrap facade until `initialize` runs.
pub fn global() -> Arc<Facade> {
    GLOBAL.load_full().unwrap_or_else(|| {
        Arc::clone(BOOTSTRAP.get_or_init(|| Arc::new(Facade::bootstrap())))
    })
}

pub fn is_initialized() -> bool {
    GLOBAL.load().is_some()
}

/// Build the process-wide facade from the default configuration sources.
///
/// Call once early in `main`. Calling again replaces the facade (and with
/// it the sink); handles already obtained keep writing to the old one.
pub fn initialize() -> Arc<Facade> {
    initialize_with(FacadeOptions::default())
}

pub fn initialize_with(options: FacadeOptions) -> Arc<Facade> {
    let install_bridge = options.install_tracing_bridge;
    let facade = install(Facade::build(options));

    if install_bridge {
        bridge::install_global();
    }
    facade
}

/// Make an explicitly constructed facade the process-wide one.
pub fn install(facade: Facade) -> Arc<Facade> {
    let facade = Arc::new(facade);
    GLOBAL.store(Some(Arc::clone(&facade)));
    facade
}

/// Attribute the next site-derived emission on this thread to `name`, for
/// the pattern `info!(logger: name_logger("x"), ...)`.
pub fn name_logger(name: impl Into<String>) -> Arc<Facade> {
    let facade = global();
    facade.name_next(name);
    facade
}
