//! Common types and utilities for the typeswap substitution weaver.
//!
//! This crate provides foundational types used across all typeswap crates:
//! - Canonical type-reference identity (`TypeRef`, `ScopeName`)
//! - Weaving diagnostics (`WeavingError`, `Severity`)
//! - The host-facing logging collaborator (`WeaveLogger` and adapters)
//! - Source locations for error reporting (`SourceLocation`)

// Type-reference identity - the sole equality/hash basis of the system
pub mod typeref;
pub use typeref::{ScopeName, TypeRef};

// Weaving errors and the logging collaborator
pub mod diagnostics;
pub use diagnostics::{CollectingLogger, Severity, TracingLogger, WeaveLogger, WeavingError};

// Source locations (sequence-point equivalent)
pub mod position;
pub use position::SourceLocation;
