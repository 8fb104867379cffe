//! Weaving errors and the host-facing logging collaborator.
//!
//! There is a single error kind: substitution failures differ only by
//! message text and the offending type, not by a type hierarchy. The engine
//! never writes to any output stream itself; everything user-visible goes
//! through a [`WeaveLogger`] supplied by the host.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::position::SourceLocation;
use crate::typeref::TypeRef;

/// A fatal substitution failure.
///
/// Carries the type the failure is about (when there is one) so the host
/// can attach a source location to the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeavingError {
    pub message: String,
    pub offending_type: Option<TypeRef>,
}

impl WeavingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offending_type: None,
        }
    }

    pub fn for_type(message: impl Into<String>, offending: TypeRef) -> Self {
        Self {
            message: message.into(),
            offending_type: Some(offending),
        }
    }
}

impl fmt::Display for WeavingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WeavingError {}

/// Report severity, host side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

/// The reporting collaborator the host exposes to the engine.
///
/// Only `error` carries a location; the other severities are plain text.
pub trait WeaveLogger {
    fn log_debug(&self, message: &str);
    fn log_info(&self, message: &str);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str, location: Option<&SourceLocation>);
}

/// Adapter that forwards collaborator calls onto `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl WeaveLogger for TracingLogger {
    fn log_debug(&self, message: &str) {
        tracing::debug!(target: "typeswap", "{message}");
    }

    fn log_info(&self, message: &str) {
        tracing::info!(target: "typeswap", "{message}");
    }

    fn log_warning(&self, message: &str) {
        tracing::warn!(target: "typeswap", "{message}");
    }

    fn log_error(&self, message: &str, location: Option<&SourceLocation>) {
        match location {
            Some(loc) => tracing::error!(target: "typeswap", location = %loc, "{message}"),
            None => tracing::error!(target: "typeswap", "{message}"),
        }
    }
}

/// In-memory logger for tests and host harnesses.
#[derive(Debug, Default)]
pub struct CollectingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl CollectingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("logger poisoned").clone()
    }

    pub fn errors(&self) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect()
    }

    fn push(&self, severity: Severity, message: &str, location: Option<&SourceLocation>) {
        self.entries.lock().expect("logger poisoned").push(LogEntry {
            severity,
            message: message.to_string(),
            location: location.cloned(),
        });
    }
}

impl WeaveLogger for CollectingLogger {
    fn log_debug(&self, message: &str) {
        self.push(Severity::Debug, message, None);
    }

    fn log_info(&self, message: &str) {
        self.push(Severity::Info, message, None);
    }

    fn log_warning(&self, message: &str) {
        self.push(Severity::Warning, message, None);
    }

    fn log_error(&self, message: &str, location: Option<&SourceLocation>) {
        self.push(Severity::Error, message, location);
    }
}
