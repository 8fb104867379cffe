//! The reference rewriter.
//!
//! Walks every type in the graph top-down, building each scope's effective
//! map from its parent's and rewriting signatures, generic arguments, and
//! instruction operands in place. Signature positions (generic constraints,
//! field/property types, return types) honor the signature-only flag;
//! local variables and instruction operands never do.
//!
//! Types that are themselves a source or a target of the full map are
//! skipped, so the substitution machinery's own declarations are never
//! rewritten into themselves.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use typeswap_common::{TypeRef, WeavingError};
use typeswap_model::{ModuleGraph, Operand, TypeId};

use crate::members;
use crate::rules::extract_rules;
use crate::scope_map::EffectiveMap;
use crate::validate::validate;

/// Rewrites the whole module. First fatal error aborts the run; mutations
/// applied before it stay in the graph.
pub fn weave_module(graph: &mut ModuleGraph) -> Result<(), WeavingError> {
    let module_rules = extract_rules(&graph.directives)?;

    // The full rule set across every scope feeds validation, the cycle
    // check, and the skip/forced-substitution decisions.
    let mut all_rules = module_rules.clone();
    for id in graph.all_type_ids() {
        let def = graph.get(id);
        all_rules.extend(extract_rules(&def.directives)?);
        for field in &def.fields {
            all_rules.extend(extract_rules(&field.directives)?);
        }
        for property in &def.properties {
            all_rules.extend(extract_rules(&property.directives)?);
        }
        for method in &def.methods {
            all_rules.extend(extract_rules(&method.directives)?);
        }
    }

    let enabled: Vec<_> = all_rules.into_iter().filter(|r| !r.disabled).collect();
    let full_map = EffectiveMap::build(&enabled, &EffectiveMap::empty());
    tracing::debug!(rules = full_map.len(), "validating substitution map");
    let validation = validate(graph, &full_map)?;

    // Every target will be written somewhere; import them up front.
    let targets: Vec<TypeRef> = full_map.iter().map(|(_, e)| e.target.clone()).collect();
    for target in &targets {
        graph.import_reference(target);
    }

    let mut weaver = Weaver {
        graph,
        visited: FxHashSet::default(),
        deferred: validation.deferred,
        full_sources: full_map.iter().map(|(s, _)| s.clone()).collect(),
        full_targets: targets.into_iter().collect(),
    };

    let module_map = EffectiveMap::build(&module_rules, &EffectiveMap::empty());
    for id in weaver.graph.top_level_ids().to_vec() {
        weaver.weave_type(id, &module_map)?;
    }
    Ok(())
}

struct Weaver<'g> {
    graph: &'g mut ModuleGraph,
    /// Types already checked and found not substituted.
    visited: FxHashSet<TypeRef>,
    /// Precomputed hierarchy diagnostics, raised on first encounter.
    deferred: FxHashMap<TypeRef, WeavingError>,
    full_sources: FxHashSet<TypeRef>,
    full_targets: FxHashSet<TypeRef>,
}

impl Weaver<'_> {
    fn weave_type(&mut self, id: TypeId, parent_map: &Arc<EffectiveMap>) -> Result<(), WeavingError> {
        let self_ref = self.graph.get(id).self_ref.clone();
        if self.full_sources.contains(&self_ref) || self.full_targets.contains(&self_ref) {
            tracing::debug!(type_ref = %self_ref, "skipping substitution participant");
            return Ok(());
        }

        let local_rules = extract_rules(&self.graph.get(id).directives)?;
        let map = EffectiveMap::build(&local_rules, parent_map);

        // Generic parameter constraints are signature positions.
        for gi in 0..self.graph.get(id).generic_params.len() {
            for ci in 0..self.graph.get(id).generic_params[gi].constraints.len() {
                let current = self.graph.get(id).generic_params[gi].constraints[ci].clone();
                let resolved = self.resolve_ref(&current, &map, true)?;
                self.graph.get_mut(id).generic_params[gi].constraints[ci] = resolved;
            }
        }

        for fi in 0..self.graph.get(id).fields.len() {
            let field_rules = extract_rules(&self.graph.get(id).fields[fi].directives)?;
            let field_map = EffectiveMap::build(&field_rules, &map);
            let current = self.graph.get(id).fields[fi].field_type.clone();
            let resolved = self.resolve_ref(&current, &field_map, true)?;
            self.graph.get_mut(id).fields[fi].field_type = resolved;
        }

        for pi in 0..self.graph.get(id).properties.len() {
            let property_rules = extract_rules(&self.graph.get(id).properties[pi].directives)?;
            let property_map = EffectiveMap::build(&property_rules, &map);
            let current = self.graph.get(id).properties[pi].property_type.clone();
            let resolved = self.resolve_ref(&current, &property_map, true)?;
            self.graph.get_mut(id).properties[pi].property_type = resolved;
        }

        for mi in 0..self.graph.get(id).methods.len() {
            self.weave_method(id, mi, &map)?;
        }

        for nested in self.graph.get(id).nested.clone() {
            self.weave_type(nested, &map)?;
        }
        Ok(())
    }

    fn weave_method(
        &mut self,
        id: TypeId,
        mi: usize,
        type_map: &Arc<EffectiveMap>,
    ) -> Result<(), WeavingError> {
        let method_rules = extract_rules(&self.graph.get(id).methods[mi].directives)?;
        let map = EffectiveMap::build(&method_rules, type_map);

        for gi in 0..self.graph.get(id).methods[mi].generic_params.len() {
            for ci in 0..self.graph.get(id).methods[mi].generic_params[gi].constraints.len() {
                let current =
                    self.graph.get(id).methods[mi].generic_params[gi].constraints[ci].clone();
                let resolved = self.resolve_ref(&current, &map, true)?;
                self.graph.get_mut(id).methods[mi].generic_params[gi].constraints[ci] = resolved;
            }
        }

        let current = self.graph.get(id).methods[mi].return_type.clone();
        let resolved = self.resolve_ref(&current, &map, true)?;
        self.graph.get_mut(id).methods[mi].return_type = resolved;

        // Locals belong to the body, not the signature.
        for li in 0..self.graph.get(id).methods[mi].locals.len() {
            let current = self.graph.get(id).methods[mi].locals[li].clone();
            let resolved = self.resolve_ref(&current, &map, false)?;
            self.graph.get_mut(id).methods[mi].locals[li] = resolved;
        }

        for ii in 0..self.graph.get(id).methods[mi].body.len() {
            let operand = self.graph.get(id).methods[mi].body[ii].operand.clone();
            match operand {
                Operand::Type(type_ref) => {
                    let resolved = self.resolve_ref(&type_ref, &map, false)?;
                    if resolved != type_ref {
                        self.graph.get_mut(id).methods[mi].body[ii].operand =
                            Operand::Type(resolved);
                    }
                }
                Operand::Method(method_ref) => {
                    if let Some(substitute) =
                        self.try_get_substitute(&method_ref.declaring_type, &map)?
                    {
                        let relocated =
                            members::find_method(self.graph, &substitute, &method_ref, &map)?;
                        self.graph.import_reference(&relocated.declaring_type);
                        self.graph.get_mut(id).methods[mi].body[ii].operand =
                            Operand::Method(relocated);
                    }
                }
                Operand::Field(field_ref) => {
                    if let Some(substitute) =
                        self.try_get_substitute(&field_ref.declaring_type, &map)?
                    {
                        let relocated =
                            members::find_field(self.graph, &substitute, &field_ref, &map)?;
                        self.graph.import_reference(&relocated.declaring_type);
                        self.graph.get_mut(id).methods[mi].body[ii].operand =
                            Operand::Field(relocated);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The substitute for `type_ref` under `map`, or `None` when nothing
    /// about the reference changes.
    fn try_get_substitute(
        &mut self,
        type_ref: &TypeRef,
        map: &Arc<EffectiveMap>,
    ) -> Result<Option<TypeRef>, WeavingError> {
        let resolved = self.resolve_ref(type_ref, map, false)?;
        Ok((resolved != *type_ref).then_some(resolved))
    }

    /// Resolves one reference against the scope's map.
    ///
    /// Signature positions pass `honor_signature_flag = true` and keep the
    /// source when the applicable rule is signature-only; body positions
    /// never honor the flag. A reference that is not substituted is checked
    /// once: a precomputed hierarchy diagnostic for it is raised here, and
    /// deriving from a substituted base without being substituted itself is
    /// fatal.
    fn resolve_ref(
        &mut self,
        type_ref: &TypeRef,
        map: &Arc<EffectiveMap>,
        honor_signature_flag: bool,
    ) -> Result<TypeRef, WeavingError> {
        if let Some(entry) = map.get(type_ref) {
            if honor_signature_flag && entry.options.is_signature_only() {
                // Substituted in bodies only; this signature slot keeps the source.
                return Ok(type_ref.clone());
            }
            return Ok(entry.target.clone());
        }

        if type_ref.is_generic_instance() {
            let mut changed = false;
            let mut args = Vec::with_capacity(type_ref.args.len());
            for arg in &type_ref.args {
                let resolved = self.resolve_ref(arg, map, honor_signature_flag)?;
                changed |= resolved != *arg;
                args.push(resolved);
            }
            if changed {
                return Ok(type_ref.clone().with_args(args));
            }
        }

        if self.visited.insert(type_ref.clone()) {
            if let Some(error) = self.deferred.get(type_ref) {
                return Err(error.clone());
            }
            let substituted_base = self
                .graph
                .base_chain(type_ref)
                .into_iter()
                .find(|base| self.full_sources.contains(base));
            if let Some(base) = substituted_base {
                return Err(WeavingError::for_type(
                    format!(
                        "{type_ref} is not substituted, but is derived from the substituted type {base}. You must substitute {type_ref}, too."
                    ),
                    type_ref.clone(),
                ));
            }
        }
        Ok(type_ref.clone())
    }
}
