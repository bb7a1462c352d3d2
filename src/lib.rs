//! Self-naming, configuration-driven logging.
//!
//! Records are attributed to the call site that produced them
//! (`module:function:line`) unless a name is given, and the threshold and
//! output stream come from layered commented-JSON configuration files read
//! once at startup.
//!
//! ```rust,no_run
//! sitelog::initialize();
//! sitelog::info!("loaded {} skills", 12);
//! sitelog::warning!(name: "audio", "underrun on {}", "hw:0");
//! ```

pub mod cli;
pub mod internal;

// Re-export commonly used types
pub use internal::config::{ConfigLoader, ConfigSource, EffectiveConfig, LoggingSettings};
pub use internal::logger::{
    global, initialize, initialize_with, install, is_initialized, name_logger, CallSite, Facade,
    FacadeOptions, Level, MemorySink, NamedLogger, Origin, RecordLine, Sink,
};
