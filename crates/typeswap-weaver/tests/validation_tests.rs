//! Map-construction failures: duplicates, cycles, interface coverage, and
//! the lazy surfacing of hierarchy diagnostics.

mod support;

use support::{app, substitute};
use typeswap_model::{FieldDef, ModuleGraph, TypeDefBuilder};
use typeswap_weaver::weave_module;

#[test]
fn duplicate_sources_fail_in_any_scope() {
    // Module scope.
    let mut graph = ModuleGraph::new("App");
    graph.directives.push(substitute(app("App.A"), app("App.B")));
    graph.directives.push(substitute(app("App.A"), app("App.C")));
    let err = weave_module(&mut graph).unwrap_err();
    assert!(err.message.contains("Duplicate mapping"));
    assert!(err.message.contains("App.A"));

    // Type scope behaves identically.
    let mut graph = ModuleGraph::new("App");
    graph.add_type(
        TypeDefBuilder::new(app("App.Holder"))
            .directive(substitute(app("App.A"), app("App.B")))
            .directive(substitute(app("App.A"), app("App.C")))
            .build(),
    );
    let err = weave_module(&mut graph).unwrap_err();
    assert!(err.message.contains("Duplicate mapping"));
}

#[test]
fn a_type_that_is_both_source_and_target_fails_eagerly() {
    let mut graph = ModuleGraph::new("App");
    graph.directives.push(substitute(app("App.A"), app("App.B")));
    graph.directives.push(substitute(app("App.B"), app("App.C")));
    graph.add_type(TypeDefBuilder::new(app("App.A")).build());
    graph.add_type(TypeDefBuilder::new(app("App.B")).build());
    graph.add_type(TypeDefBuilder::new(app("App.C")).build());

    let err = weave_module(&mut graph).unwrap_err();
    assert!(err.message.contains("both source and target"));
    assert!(err.message.contains("App.B"));
}

#[test]
fn cycles_across_different_scopes_still_fail() {
    let mut graph = ModuleGraph::new("App");
    graph.directives.push(substitute(app("App.A"), app("App.B")));
    graph.add_type(
        TypeDefBuilder::new(app("App.Elsewhere"))
            .directive(substitute(app("App.B"), app("App.C")))
            .build(),
    );

    let err = weave_module(&mut graph).unwrap_err();
    assert!(err.message.contains("both source and target"));
}

#[test]
fn interface_coverage_fails_before_any_mutation() {
    let mut graph = ModuleGraph::new("App");
    graph.directives.push(substitute(app("App.Src"), app("App.Tgt")));
    graph.add_type(TypeDefBuilder::new(app("App.ICap")).build());
    graph.add_type(
        TypeDefBuilder::new(app("App.Src"))
            .interface(app("App.ICap"))
            .build(),
    );
    graph.add_type(TypeDefBuilder::new(app("App.Tgt")).build());
    // A rewrite that would otherwise happen.
    graph.add_type(
        TypeDefBuilder::new(app("App.Holder"))
            .field(FieldDef::new("s", app("App.Src")))
            .build(),
    );

    let before = graph.clone();
    let err = weave_module(&mut graph).unwrap_err();
    assert!(err.message.contains("does not implement"));
    // The graph is untouched: the failure happened at map construction.
    assert_eq!(graph, before);
}

#[test]
fn unmapped_ancestor_is_harmless_until_referenced() {
    let build = |with_reference: bool| {
        let mut graph = ModuleGraph::new("App");
        graph.directives.push(substitute(app("App.Src"), app("App.Tgt")));
        graph.add_type(TypeDefBuilder::new(app("App.Orphan")).build());
        graph.add_type(
            TypeDefBuilder::new(app("App.Src"))
                .base(app("App.Orphan"))
                .build(),
        );
        graph.add_type(TypeDefBuilder::new(app("App.Tgt")).build());
        if with_reference {
            graph.add_type(
                TypeDefBuilder::new(app("App.Holder"))
                    .field(FieldDef::new("o", app("App.Orphan")))
                    .build(),
            );
        }
        graph
    };

    // The diagnostic is precomputed but never surfaces.
    let mut quiet = build(false);
    weave_module(&mut quiet).unwrap();

    // First encounter of the orphan raises it.
    let mut loud = build(true);
    let err = weave_module(&mut loud).unwrap_err();
    assert!(err.message.contains("no direct or substituted counterpart"));
    assert!(err.message.contains("App.Orphan"));
}

#[test]
fn prior_mutations_survive_a_late_failure() {
    // One consumer is rewritten before the traversal reaches the orphan
    // reference; its edits must remain after the error.
    let mut graph = ModuleGraph::new("App");
    graph.directives.push(substitute(app("App.Src"), app("App.Tgt")));
    graph.add_type(TypeDefBuilder::new(app("App.Orphan")).build());
    graph.add_type(
        TypeDefBuilder::new(app("App.Src"))
            .base(app("App.Orphan"))
            .build(),
    );
    graph.add_type(TypeDefBuilder::new(app("App.Tgt")).build());
    graph.add_type(
        TypeDefBuilder::new(app("App.Early"))
            .field(FieldDef::new("s", app("App.Src")))
            .build(),
    );
    graph.add_type(
        TypeDefBuilder::new(app("App.Late"))
            .field(FieldDef::new("o", app("App.Orphan")))
            .build(),
    );

    let err = weave_module(&mut graph).unwrap_err();
    assert!(err.message.contains("App.Orphan"));
    let early = graph.resolve_def(&app("App.Early")).unwrap();
    assert_eq!(early.fields[0].field_type, app("App.Tgt"));
}
