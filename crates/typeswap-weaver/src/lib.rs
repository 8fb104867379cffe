//! Type-substitution rewriting engine.
//!
//! Given a module graph and the declarative substitution directives
//! attached to its scopes, the weaver:
//! - extracts raw rules per scope (`rules`)
//! - merges them into scope-specific effective maps (`scope_map`)
//! - validates structural soundness of every mapping (`validate`)
//! - rewrites every reference to a substituted type in signatures, generic
//!   arguments, and instruction operands (`weave`), re-resolving member
//!   references against the substitute type (`members`)
//! - strips the consumed directives afterwards (`cleaner`)
//!
//! The engine mutates the graph in place and stops at the first fatal
//! error; there is no rollback. A failed run must be retried from a fresh
//! snapshot.

pub mod rules;
pub use rules::{SubstitutionOptions, SubstitutionRule, extract_rules};

pub mod scope_map;
pub use scope_map::{EffectiveMap, MapEntry};

pub mod validate;
pub use validate::Validation;

pub mod members;

pub mod weave;
pub use weave::weave_module;

pub mod cleaner;
pub use cleaner::remove_references;

use typeswap_common::WeaveLogger;
use typeswap_model::ModuleGraph;

/// Host entry point: weave the module and report the outcome through the
/// logging collaborator. Returns `true` on success.
///
/// On failure the error is reported with the offending type's source
/// location when the graph can supply one; mutations applied before the
/// failure remain in the graph.
pub fn weave(graph: &mut ModuleGraph, logger: &dyn WeaveLogger) -> bool {
    match weave_module(graph) {
        Ok(()) => {
            logger.log_debug("substitution weaving finished");
            true
        }
        Err(err) => {
            let location = err
                .offending_type
                .as_ref()
                .and_then(|t| graph.try_get_sequence_point(t));
            logger.log_error(&err.message, location.as_ref());
            false
        }
    }
}
