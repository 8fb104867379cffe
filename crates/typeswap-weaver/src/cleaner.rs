//! Post-weave cleanup: strip consumed directives and drop the now-unused
//! reference to the directive-defining scope.
//!
//! Runs only after a successful weave. The rewritten module must carry no
//! residual dependency on the substitution vocabulary.

use rustc_hash::FxHashSet;
use typeswap_common::ScopeName;
use typeswap_model::{AttachedDirective, ModuleGraph};

/// Removes every substitution directive from the module and all of its
/// scopes, then prunes scope references that only the directives used.
pub fn remove_references(graph: &mut ModuleGraph) {
    let mut directive_scopes: FxHashSet<ScopeName> = FxHashSet::default();

    strip(&mut graph.directives, &mut directive_scopes);
    for id in graph.all_type_ids() {
        let def = graph.get_mut(id);
        strip(&mut def.directives, &mut directive_scopes);
        for field in &mut def.fields {
            strip(&mut field.directives, &mut directive_scopes);
        }
        for property in &mut def.properties {
            strip(&mut property.directives, &mut directive_scopes);
        }
        for method in &mut def.methods {
            strip(&mut method.directives, &mut directive_scopes);
        }
    }

    if directive_scopes.is_empty() {
        return;
    }

    let still_used = used_scopes(graph);
    let module_scope = graph.scope.clone();
    graph.scope_references.retain(|scope| {
        *scope == module_scope
            || !directive_scopes.contains(scope)
            || still_used.contains(scope)
    });
}

fn strip(directives: &mut Vec<AttachedDirective>, removed_scopes: &mut FxHashSet<ScopeName>) {
    directives.retain(|d| {
        if d.is_substitution_vocabulary() {
            if let Some(scope) = &d.attribute_type.scope {
                removed_scopes.insert(scope.clone());
            }
            false
        } else {
            true
        }
    });
}

/// Every scope name any remaining reference in the graph points at.
fn used_scopes(graph: &ModuleGraph) -> FxHashSet<ScopeName> {
    use typeswap_common::TypeRef;
    use typeswap_model::Operand;

    let mut used = FxHashSet::default();

    fn visit(type_ref: &TypeRef, used: &mut FxHashSet<ScopeName>) {
        if let Some(scope) = &type_ref.scope {
            used.insert(scope.clone());
        }
        for arg in &type_ref.args {
            visit(arg, used);
        }
    }

    for id in graph.all_type_ids() {
        let def = graph.get(id);
        if let Some(base) = &def.base {
            visit(base, &mut used);
        }
        for interface in &def.interfaces {
            visit(interface, &mut used);
        }
        for gp in &def.generic_params {
            for constraint in &gp.constraints {
                visit(constraint, &mut used);
            }
        }
        for field in &def.fields {
            visit(&field.field_type, &mut used);
        }
        for property in &def.properties {
            visit(&property.property_type, &mut used);
        }
        for directive in def
            .directives
            .iter()
            .chain(def.fields.iter().flat_map(|f| f.directives.iter()))
            .chain(def.properties.iter().flat_map(|p| p.directives.iter()))
            .chain(def.methods.iter().flat_map(|m| m.directives.iter()))
        {
            visit(&directive.attribute_type, &mut used);
            for arg in &directive.type_args {
                visit(arg, &mut used);
            }
        }
        for method in &def.methods {
            visit(&method.return_type, &mut used);
            for param in &method.params {
                visit(&param.param_type, &mut used);
            }
            for gp in &method.generic_params {
                for constraint in &gp.constraints {
                    visit(constraint, &mut used);
                }
            }
            for local in &method.locals {
                visit(local, &mut used);
            }
            for instruction in &method.body {
                match &instruction.operand {
                    Operand::Type(t) => visit(t, &mut used),
                    Operand::Method(m) => {
                        visit(&m.declaring_type, &mut used);
                        visit(&m.return_type, &mut used);
                        for p in &m.params {
                            visit(p, &mut used);
                        }
                    }
                    Operand::Field(f) => {
                        visit(&f.declaring_type, &mut used);
                        visit(&f.field_type, &mut used);
                    }
                    _ => {}
                }
            }
        }
    }
    for directive in &graph.directives {
        visit(&directive.attribute_type, &mut used);
        for arg in &directive.type_args {
            visit(arg, &mut used);
        }
    }
    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeswap_common::TypeRef;
    use typeswap_model::{FieldDef, TypeDefBuilder};

    fn attr_ref() -> TypeRef {
        TypeRef::new("Typeswap", typeswap_model::SUBSTITUTE_ATTRIBUTE)
    }

    fn substitute_directive(source: &str, target: &str) -> AttachedDirective {
        let mut d = AttachedDirective::substitute(
            TypeRef::new("M", source),
            TypeRef::new("M", target),
        );
        d.attribute_type = attr_ref();
        d
    }

    #[test]
    fn strips_directives_everywhere_and_drops_the_vocabulary_scope() {
        let mut graph = ModuleGraph::new("M");
        graph.add_scope_reference(ScopeName::new("Typeswap"));
        graph.add_scope_reference(ScopeName::new("Runtime"));
        graph.directives.push(substitute_directive("A", "B"));
        graph.add_type(
            TypeDefBuilder::new(TypeRef::new("M", "Holder"))
                .directive(substitute_directive("C", "D"))
                .field(
                    FieldDef::new("x", TypeRef::new("Runtime", "Sys.String"))
                        .with_directive(substitute_directive("E", "F")),
                )
                .build(),
        );

        remove_references(&mut graph);

        assert!(graph.directives.is_empty());
        let holder = graph.get(graph.top_level_ids()[0]);
        assert!(holder.directives.is_empty());
        assert!(holder.fields[0].directives.is_empty());
        assert_eq!(graph.scope_references, vec![ScopeName::new("Runtime")]);
    }

    #[test]
    fn keeps_the_vocabulary_scope_while_other_references_use_it() {
        let mut graph = ModuleGraph::new("M");
        graph.add_scope_reference(ScopeName::new("Typeswap"));
        graph.directives.push(substitute_directive("A", "B"));
        // Something else from the vocabulary scope is genuinely in use.
        graph.add_type(
            TypeDefBuilder::new(TypeRef::new("M", "Holder"))
                .field(FieldDef::new("helper", TypeRef::new("Typeswap", "Typeswap.Helper")))
                .build(),
        );

        remove_references(&mut graph);

        assert!(graph.directives.is_empty());
        assert_eq!(graph.scope_references, vec![ScopeName::new("Typeswap")]);
    }

    #[test]
    fn foreign_directives_survive() {
        let mut graph = ModuleGraph::new("M");
        graph.directives.push(AttachedDirective::foreign(
            TypeRef::new("Other", "Other.Marker"),
            vec![],
        ));
        remove_references(&mut graph);
        assert_eq!(graph.directives.len(), 1);
    }
}
