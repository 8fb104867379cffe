//! Member re-resolution on a substitute type.
//!
//! When an instruction references a method or field whose declaring type
//! is substituted, the reference must be relocated to the structurally
//! equivalent member of the target type. Matching is structural: kind,
//! name, static-ness, arity, and parameter/field types after mapping them
//! through the same substitution. Only the target's own members are
//! searched, never inherited ones. A rendered signature appears in error
//! messages only; it is never used for matching.

use std::sync::Arc;

use typeswap_common::{TypeRef, WeavingError};
use typeswap_model::{FieldRef, MethodRef, ModuleGraph, TypeDef, Visibility};

use crate::scope_map::EffectiveMap;

/// Relocates a method reference onto `target`.
pub fn find_method(
    graph: &ModuleGraph,
    target: &TypeRef,
    template: &MethodRef,
    map: &Arc<EffectiveMap>,
) -> Result<MethodRef, WeavingError> {
    let def = resolve_target(graph, target)?;

    let mapped_params: Vec<TypeRef> = template
        .params
        .iter()
        .map(|p| map_type(p, map))
        .collect();

    let candidate = def.methods.iter().find(|m| {
        m.name == template.name
            && m.is_static == template.is_static
            && m.params.len() == mapped_params.len()
            && m.params
                .iter()
                .zip(&mapped_params)
                .all(|(own, wanted)| own.param_type == *wanted)
    });

    let Some(method) = candidate else {
        return Err(WeavingError::for_type(
            format!(
                "{target} does not contain a member {}.",
                render_method(template, target, &mapped_params)
            ),
            target.clone(),
        ));
    };

    if method.visibility == Visibility::Private {
        return Err(WeavingError::for_type(
            format!(
                "Member {} must not be private.",
                render_method(template, target, &mapped_params)
            ),
            target.clone(),
        ));
    }

    Ok(MethodRef {
        declaring_type: target.clone(),
        name: method.name.clone(),
        params: mapped_params.into_iter().collect(),
        return_type: map_type(&template.return_type, map),
        is_static: method.is_static,
    })
}

/// Relocates a field reference onto `target`.
pub fn find_field(
    graph: &ModuleGraph,
    target: &TypeRef,
    template: &FieldRef,
    map: &Arc<EffectiveMap>,
) -> Result<FieldRef, WeavingError> {
    let def = resolve_target(graph, target)?;
    let mapped_type = map_type(&template.field_type, map);

    let candidate = def.fields.iter().find(|f| {
        f.name == template.name
            && f.is_static == template.is_static
            && f.field_type == mapped_type
    });

    let Some(field) = candidate else {
        return Err(WeavingError::for_type(
            format!(
                "{target} does not contain a member {}.",
                render_field(template, target, &mapped_type)
            ),
            target.clone(),
        ));
    };

    if field.visibility == Visibility::Private {
        return Err(WeavingError::for_type(
            format!(
                "Member {} must not be private.",
                render_field(template, target, &mapped_type)
            ),
            target.clone(),
        ));
    }

    Ok(FieldRef {
        declaring_type: target.clone(),
        name: field.name.clone(),
        field_type: mapped_type,
        is_static: field.is_static,
    })
}

fn resolve_target<'g>(graph: &'g ModuleGraph, target: &TypeRef) -> Result<&'g TypeDef, WeavingError> {
    graph.resolve_def(target).ok_or_else(|| {
        WeavingError::for_type(
            format!("{target} could not be resolved to a definition in this module."),
            target.clone(),
        )
    })
}

/// Maps one type through the substitution, arguments included. Signature
/// flags do not apply here: member relocation always follows the map.
fn map_type(type_ref: &TypeRef, map: &Arc<EffectiveMap>) -> TypeRef {
    if let Some(entry) = map.get(type_ref) {
        return entry.target.clone();
    }
    if type_ref.is_generic_instance() {
        let args = type_ref.args.iter().map(|a| map_type(a, map)).collect();
        return type_ref.clone().with_args(args);
    }
    type_ref.clone()
}

/// Signature rendering for error messages, declaring type replaced by the
/// target and prefixed with `static ` for static members.
fn render_method(template: &MethodRef, target: &TypeRef, params: &[TypeRef]) -> String {
    let prefix = if template.is_static { "static " } else { "" };
    let params = params
        .iter()
        .map(TypeRef::full_name)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{prefix}{} {target}::{}({params})",
        template.return_type, template.name
    )
}

fn render_field(template: &FieldRef, target: &TypeRef, field_type: &TypeRef) -> String {
    let prefix = if template.is_static { "static " } else { "" };
    format!("{prefix}{field_type} {target}::{}", template.name)
}
