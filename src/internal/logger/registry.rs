// src/internal/logger/registry.rs

use chrono::Local;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use super::format::LineFormatter;
use super::level::Level;
use super::sink::Sink;

/// Formatter and sink shared by every handle of one facade.
#[derive(Debug)]
pub(crate) struct Output {
    formatter: LineFormatter,
    sink: Arc<dyn Sink>,
    write_failures: AtomicU64,
}

impl Output {
    pub(crate) fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            formatter: LineFormatter,
            sink,
            write_failures: AtomicU64::new(0),
        }
    }

    pub(crate) fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }
}

/// A logger bound to one identity, configured with the facade's threshold
/// and output. Handles never forward records anywhere else, so each record
/// is written exactly once.
#[derive(Debug)]
pub struct LoggerHandle {
    identity: String,
    threshold: Level,
    output: Arc<Output>,
}

impl LoggerHandle {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.threshold)
    }

    /// Format and write `message` if `level` passes the threshold.
    ///
    /// Returns whether a line was written. A failed write drops the record
    /// and is counted on the facade.
    pub fn emit(&self, level: Level, message: &str) -> bool {
        if !self.is_enabled(level) {
            return false;
        }

        let line = self.output.formatter.format(
            Local::now().time(),
            &self.identity,
            level,
            message,
        );

        match self.output.sink.write_line(&line) {
            Ok(()) => true,
            Err(_) => {
                self.output.write_failures.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// Identity → handle cache. Concurrent first use of an identity builds a
/// single handle.
#[derive(Debug)]
pub struct HandleRegistry {
    handles: DashMap<String, Arc<LoggerHandle>>,
    threshold: Level,
    output: Arc<Output>,
    created: AtomicUsize,
}

impl HandleRegistry {
    pub(crate) fn new(threshold: Level, output: Arc<Output>) -> Self {
        Self {
            handles: DashMap::new(),
            threshold,
            output,
            created: AtomicUsize::new(0),
        }
    }

    pub fn get_or_create(&self, identity: &str) -> Arc<LoggerHandle> {
        if let Some(handle) = self.handles.get(identity) {
            return Arc::clone(handle.value());
        }

        let entry = self
            .handles
            .entry(identity.to_string())
            .or_insert_with(|| {
                self.created.fetch_add(1, Ordering::Relaxed);
                Arc::new(LoggerHandle {
                    identity: identity.to_string(),
                    threshold: self.threshold,
                    output: Arc::clone(&self.output),
                })
            });
        Arc::clone(entry.value())
    }

    pub fn get(&self, identity: &str) -> Option<Arc<LoggerHandle>> {
        self.handles.get(identity).map(|h| Arc::clone(h.value()))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Number of handles ever constructed.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}
