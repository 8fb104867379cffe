//! Structural validation of a complete substitution map.
//!
//! Two failure classes, raised at different times:
//! - cycle and interface-coverage violations abort immediately, before any
//!   graph mutation
//! - hierarchy-position problems are precomputed into an immutable table of
//!   deferred errors, keyed by the offending ancestor reference, and are
//!   only raised when the rewriter first encounters that type
//!
//! Validation never mutates the graph.

use rustc_hash::{FxHashMap, FxHashSet};
use typeswap_common::{TypeRef, WeavingError};
use typeswap_model::ModuleGraph;

use crate::scope_map::EffectiveMap;

/// Outcome of the eager validation phase.
#[derive(Debug, Default)]
pub struct Validation {
    /// Hierarchy diagnostics, keyed by the ancestor type that triggered
    /// them. Consulted, never recomputed, during the whole rewrite pass.
    pub deferred: FxHashMap<TypeRef, WeavingError>,
}

/// Validates every entry of the full map against the graph.
///
/// Errors returned here (cycles, interface coverage) block the run before
/// any rewriting begins.
pub fn validate(graph: &ModuleGraph, map: &EffectiveMap) -> Result<Validation, WeavingError> {
    check_cycles(map)?;

    let mut validation = Validation::default();
    for (source, entry) in map.iter() {
        check_interface_coverage(graph, source, &entry.target)?;
        check_hierarchy_positions(graph, map, source, &entry.target, &mut validation);
    }
    Ok(validation)
}

/// A type that is replaced by one rule and replaces another type in a
/// second rule would make the rewrite chase its own tail.
fn check_cycles(map: &EffectiveMap) -> Result<(), WeavingError> {
    let targets: FxHashSet<&TypeRef> = map.iter().map(|(_, entry)| &entry.target).collect();
    for (source, _) in map.iter() {
        if targets.contains(source) {
            return Err(WeavingError::for_type(
                format!("{source} is both source and target of a substitution."),
                source.clone(),
            ));
        }
    }
    Ok(())
}

/// The target must implement every interface the source implements,
/// transitively. Code holding the source through an interface would
/// otherwise break at runtime, so this can never be deferred.
fn check_interface_coverage(
    graph: &ModuleGraph,
    source: &TypeRef,
    target: &TypeRef,
) -> Result<(), WeavingError> {
    let source_interfaces = graph.transitive_interfaces(source);
    if source_interfaces.is_empty() {
        return Ok(());
    }
    let target_interfaces = graph.transitive_interfaces(target);
    for interface in &source_interfaces {
        if !target_interfaces.contains(interface) {
            return Err(WeavingError::for_type(
                format!(
                    "{source} => {target} substitution error. {target} does not implement {interface}, which is implemented by {source}."
                ),
                target.clone(),
            ));
        }
    }
    Ok(())
}

/// Walks the source's ancestor chain and checks each ancestor's position in
/// the target's self-and-base chain.
///
/// Position 0 is the target itself, increasing toward its root. A direct
/// match must sit strictly above the last matched position; an ancestor
/// that is itself substituted may match at the same position. Anything
/// else becomes a deferred diagnostic for that ancestor.
fn check_hierarchy_positions(
    graph: &ModuleGraph,
    map: &EffectiveMap,
    source: &TypeRef,
    target: &TypeRef,
    validation: &mut Validation,
) {
    let mut positions: FxHashMap<TypeRef, usize> = FxHashMap::default();
    for (index, reference) in graph.self_and_base_chain(target).into_iter().enumerate() {
        positions.entry(reference).or_insert(index);
    }

    let mut last_index = 0usize;

    for ancestor in graph.base_chain(source) {
        let direct = positions.get(&ancestor).copied();
        if let Some(index) = direct {
            if index > last_index {
                last_index = index;
                continue;
            }
        }

        let substituted = map
            .get(&ancestor)
            .and_then(|entry| positions.get(&entry.target).copied());
        if let Some(index) = substituted {
            if index >= last_index {
                last_index = index;
                continue;
            }
        }

        let error = if direct.is_some() || substituted.is_some() {
            WeavingError::for_type(
                format!(
                    "{source} => {target} substitution error. {ancestor} resolves to an out-of-order position in the base classes of {target}; this is a cross-mapping in the hierarchy."
                ),
                target.clone(),
            )
        } else {
            WeavingError::for_type(
                format!(
                    "{source} => {target} substitution error. {source} derives from {ancestor}, but there is no direct or substituted counterpart for {ancestor} in the targets base classes.\nEither derive {target} from {ancestor}, or substitute {ancestor} with {target} or one of it's base classes."
                ),
                target.clone(),
            )
        };

        tracing::debug!(ancestor = %ancestor, "deferring hierarchy diagnostic");
        validation.deferred.entry(ancestor).or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{SubstitutionOptions, SubstitutionRule};
    use typeswap_model::TypeDefBuilder;

    fn t(name: &str) -> TypeRef {
        TypeRef::new("M", name)
    }

    fn rule(source: &str, target: &str) -> SubstitutionRule {
        SubstitutionRule {
            source: t(source),
            target: t(target),
            options: SubstitutionOptions::default(),
            disabled: false,
        }
    }

    fn map_of(rules: &[SubstitutionRule]) -> std::sync::Arc<EffectiveMap> {
        EffectiveMap::build(rules, &EffectiveMap::empty())
    }

    #[test]
    fn cycle_is_detected_across_the_whole_map() {
        let graph = ModuleGraph::new("M");
        let map = map_of(&[rule("A", "B"), rule("B", "C")]);
        let err = validate(&graph, &map).unwrap_err();
        assert!(err.message.contains("both source and target"));
        assert_eq!(err.offending_type, Some(t("B")));
    }

    #[test]
    fn missing_interface_fails_eagerly() {
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("ICap")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).interface(t("ICap")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).build());

        let err = validate(&graph, &map_of(&[rule("Src", "Tgt")])).unwrap_err();
        assert!(err.message.contains("does not implement"));
        assert_eq!(err.offending_type, Some(t("Tgt")));
    }

    #[test]
    fn matching_interfaces_pass() {
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("ICap")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).interface(t("ICap")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).interface(t("ICap")).build());

        let validation = validate(&graph, &map_of(&[rule("Src", "Tgt")])).unwrap();
        assert!(validation.deferred.is_empty());
    }

    #[test]
    fn shared_ancestor_at_increasing_positions_passes() {
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("Root")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).base(t("Root")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).base(t("Root")).build());

        let validation = validate(&graph, &map_of(&[rule("Src", "Tgt")])).unwrap();
        assert!(validation.deferred.is_empty());
    }

    #[test]
    fn unmapped_ancestor_is_deferred_not_raised() {
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("Orphan")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).base(t("Orphan")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).build());

        let validation = validate(&graph, &map_of(&[rule("Src", "Tgt")])).unwrap();
        let err = validation.deferred.get(&t("Orphan")).unwrap();
        assert!(err.message.contains("no direct or substituted counterpart"));
    }

    #[test]
    fn substituted_ancestor_may_share_a_position() {
        // Src derives from Base; Base -> Tgt and Src -> Tgt. Base's
        // counterpart is Tgt itself at position 0, which is allowed for a
        // substituted ancestor.
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("Base")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).base(t("Base")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).build());

        let validation =
            validate(&graph, &map_of(&[rule("Src", "Tgt"), rule("Base", "Tgt")])).unwrap();
        assert!(validation.deferred.is_empty());
    }

    #[test]
    fn deep_chains_with_increasing_positions_pass() {
        // Src chain: Src -> SrcBase -> Mid -> Root; Tgt chain:
        // Tgt -> SrcBase -> Mid -> Root. Every ancestor matches at a
        // strictly increasing position.
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("Root")).build());
        graph.add_type(TypeDefBuilder::new(t("Mid")).base(t("Root")).build());
        graph.add_type(TypeDefBuilder::new(t("SrcBase")).base(t("Mid")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).base(t("SrcBase")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).base(t("SrcBase")).build());

        let validation = validate(&graph, &map_of(&[rule("Src", "Tgt")])).unwrap();
        assert!(validation.deferred.is_empty());
    }

    #[test]
    fn out_of_order_substituted_ancestor_defers_a_cross_mapping() {
        // Src chain: Src -> X -> Y. Tgt chain: Tgt -> TgtA -> TgtB.
        // X -> TgtB puts X at position 2; Y -> TgtA resolves to position 1,
        // behind the last match: a cross-mapping.
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("Y")).build());
        graph.add_type(TypeDefBuilder::new(t("X")).base(t("Y")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).base(t("X")).build());
        graph.add_type(TypeDefBuilder::new(t("TgtB")).build());
        graph.add_type(TypeDefBuilder::new(t("TgtA")).base(t("TgtB")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).base(t("TgtA")).build());

        let validation = validate(
            &graph,
            &map_of(&[rule("Src", "Tgt"), rule("X", "TgtB"), rule("Y", "TgtA")]),
        )
        .unwrap();
        let err = validation.deferred.get(&t("Y")).expect("Y must be deferred");
        assert!(err.message.contains("cross-mapping"));
    }

    #[test]
    fn every_failing_ancestor_is_recorded_separately() {
        // Tgt's chain is only [Tgt, Shared]; the source's ancestors B and A
        // have no counterpart at all, Shared matches fine.
        let mut graph = ModuleGraph::new("M");
        graph.add_type(TypeDefBuilder::new(t("Shared")).build());
        graph.add_type(TypeDefBuilder::new(t("A")).base(t("Shared")).build());
        graph.add_type(TypeDefBuilder::new(t("B")).base(t("A")).build());
        graph.add_type(TypeDefBuilder::new(t("Src")).base(t("B")).build());
        graph.add_type(TypeDefBuilder::new(t("Tgt")).base(t("Shared")).build());

        let validation = validate(&graph, &map_of(&[rule("Src", "Tgt")])).unwrap();
        assert!(validation.deferred.contains_key(&t("B")));
        assert!(validation.deferred.contains_key(&t("A")));
        assert!(!validation.deferred.contains_key(&t("Shared")));
    }
}
