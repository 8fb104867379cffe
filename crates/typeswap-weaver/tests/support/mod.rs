//! Shared test harness: scenario module construction and the
//! invocation-keyed result cache used by the end-to-end tests.
#![allow(dead_code)]

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use typeswap_common::{CollectingLogger, TypeRef};
use typeswap_common::diagnostics::LogEntry;
use typeswap_model::{AttachedDirective, ModuleGraph};

/// Outcome of one cached weave invocation.
pub struct WeaveOutcome {
    pub graph: ModuleGraph,
    pub succeeded: bool,
    pub errors: Vec<LogEntry>,
}

static CACHE: Lazy<DashMap<String, Arc<WeaveOutcome>>> = Lazy::new(DashMap::new);

/// Weaves the module produced by `build` once per invocation id and reuses
/// the outcome for repeated requests, cleanup included on success.
pub fn weave_cached(invocation_id: &str, build: fn() -> ModuleGraph) -> Arc<WeaveOutcome> {
    CACHE
        .entry(invocation_id.to_string())
        .or_insert_with(|| {
            init_tracing();
            let mut graph = build();
            let logger = CollectingLogger::new();
            let succeeded = typeswap_weaver::weave(&mut graph, &logger);
            if succeeded {
                typeswap_weaver::remove_references(&mut graph);
            }
            Arc::new(WeaveOutcome {
                graph,
                succeeded,
                errors: logger.errors(),
            })
        })
        .clone()
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Reference into the app module under test.
pub fn app(name: &str) -> TypeRef {
    TypeRef::new("App", name)
}

/// Reference into the external runtime scope.
pub fn runtime(name: &str) -> TypeRef {
    TypeRef::new("Runtime", name)
}

/// A substitution directive as the host would attach it, with the
/// vocabulary attribute living in its own scope.
pub fn substitute(source: TypeRef, target: TypeRef) -> AttachedDirective {
    let mut directive = AttachedDirective::substitute(source, target);
    directive.attribute_type = TypeRef::new("Typeswap", typeswap_model::SUBSTITUTE_ATTRIBUTE);
    directive
}
