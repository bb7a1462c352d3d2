// src/internal/logger/mod.rs

pub mod bridge;
pub mod callsite;
pub mod facade;
pub mod format;
pub mod level;
mod macros;
pub mod registry;
pub mod sink;

pub use bridge::TracingBridge;
pub use callsite::{CallSite, Origin};
pub use facade::{
    global, initialize, initialize_with, install, is_initialized, name_logger, render_trace,
    Facade, FacadeOptions, NamedLogger, CONFIG_IDENTITY, ROOT_IDENTITY,
};
pub use format::{LineFormatter, RecordLine, TIME_FORMAT};
pub use level::{Level, UnknownLevel};
pub use registry::{HandleRegistry, LoggerHandle};
pub use sink::{sink_for, MemorySink, Sink, StderrSink, StdoutSink};

// The emission macros (`debug!`, `info!`, `warning!`, `error!`,
// `exception!`, `callsite!`) are exported at the crate root.
