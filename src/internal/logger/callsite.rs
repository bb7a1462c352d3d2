// src/internal/logger/callsite.rs

use std::cell::RefCell;
use std::fmt;

/// Name of the probe item the `callsite!` macro declares inside the caller.
pub const PROBE_NAME: &str = "__sitelog_probe";

/// Source location of a logging call, captured at compile time by
/// [`callsite!`](crate::callsite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    module: &'static str,
    function: &'static str,
    line: u32,
}

impl CallSite {
    pub const fn new(module: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            module,
            function,
            line,
        }
    }

    /// Placeholder for records whose origin cannot be determined.
    pub const fn unknown() -> Self {
        Self::new("", "", 0)
    }

    pub fn module(&self) -> &'static str {
        self.module
    }

    pub fn function(&self) -> &'static str {
        self.function
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// `<module>:<function>:<line>`
    pub fn identity(&self) -> String {
        self.to_string()
    }

    /// Recover the enclosing function name from the type name of a probe
    /// item declared inside it, e.g. `app::tts::speak::__sitelog_probe`
    /// yields `speak`. Closure and async-block frames are skipped.
    pub fn function_from_probe(probe_path: &'static str) -> &'static str {
        let mut path = probe_path
            .strip_suffix(PROBE_NAME)
            .map(|p| p.trim_end_matches("::"))
            .unwrap_or(probe_path);

        while let Some(outer) = path.strip_suffix("::{{closure}}") {
            path = outer;
        }

        path.rsplit("::").next().unwrap_or("")
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.module, self.function, self.line)
    }
}

/// Who a record is attributed to.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// Explicit identity, scoped to a single call.
    Named(&'a str),
    /// Derived from the call site unless a pending name is waiting.
    Site(&'a CallSite),
}

thread_local! {
    static PENDING_NAME: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Store an identity for the next site-attributed emission on this thread.
pub fn set_pending_name(name: String) {
    PENDING_NAME.with(|slot| *slot.borrow_mut() = Some(name));
}

/// Consume the calling thread's pending identity, if any.
pub fn take_pending_name() -> Option<String> {
    PENDING_NAME.with(|slot| slot.borrow_mut().take())
}

/// Identity resolution: call-scoped name, then pending name, then site.
pub fn resolve_identity(origin: Origin<'_>) -> String {
    match origin {
        Origin::Named(name) => name.to_string(),
        Origin::Site(site) => take_pending_name().unwrap_or_else(|| site.identity()),
    }
}
