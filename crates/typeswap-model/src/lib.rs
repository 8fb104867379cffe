//! Mutable program metadata graph consumed by the typeswap weaver.
//!
//! This crate models the host's compiled-module snapshot:
//! - `ModuleGraph` - arena of type definitions with a resolution index,
//!   ancestor walks, and the module-level import-reference operation
//! - Type and member definitions (`TypeDef`, `FieldDef`, `PropertyDef`,
//!   `MethodDef`) with attached declarative directives
//! - Instruction streams with type/method/field operands
//! - `TypeDefBuilder` for hosts and tests assembling graphs by hand
//!
//! The graph is mutated in place by the weaver; nothing here persists
//! between invocations.

pub mod directives;
pub use directives::{AttachedDirective, SUBSTITUTE_ATTRIBUTE};

pub mod instructions;
pub use instructions::{FieldRef, Instruction, MethodRef, OpCode, Operand};

pub mod types;
pub use types::{FieldDef, GenericParam, MethodDef, Param, PropertyDef, TypeDef, Visibility};

pub mod graph;
pub use graph::{ModuleGraph, TypeId};

pub mod builder;
pub use builder::TypeDefBuilder;
