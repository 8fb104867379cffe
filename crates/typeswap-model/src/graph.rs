//! The module graph: an arena of type definitions plus the operations the
//! weaver needs to traverse and mutate it.
//!
//! Resolution is by canonical reference identity. External types (defined
//! in some other scope) simply do not resolve; ancestor walks stop silently
//! at the first unresolvable reference.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use typeswap_common::{ScopeName, SourceLocation, TypeRef};

use crate::directives::AttachedDirective;
use crate::types::TypeDef;

/// Index of a type definition in the graph's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModuleGraph {
    pub name: String,
    /// The identity of this module's own defining scope.
    pub scope: ScopeName,
    /// Directives attached at module level.
    pub directives: Vec<AttachedDirective>,
    /// External scopes this module references.
    pub scope_references: Vec<ScopeName>,
    types: Vec<TypeDef>,
    top_level: Vec<TypeId>,
    /// Lookup cache, rebuilt from `types`; not part of the serialized form.
    #[serde(skip)]
    index: FxHashMap<TypeRef, TypeId>,
    imported: FxHashSet<TypeRef>,
}

impl ModuleGraph {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            scope: ScopeName::new(name.clone()),
            name,
            directives: Vec::new(),
            scope_references: Vec::new(),
            types: Vec::new(),
            top_level: Vec::new(),
            index: FxHashMap::default(),
            imported: FxHashSet::default(),
        }
    }

    pub fn add_scope_reference(&mut self, scope: ScopeName) {
        if !self.scope_references.contains(&scope) {
            self.scope_references.push(scope);
        }
    }

    /// Adds a top-level type definition and indexes it by its own reference.
    pub fn add_type(&mut self, def: TypeDef) -> TypeId {
        let id = self.alloc(def);
        self.top_level.push(id);
        id
    }

    /// Adds a nested type definition under `parent`.
    pub fn add_nested_type(&mut self, parent: TypeId, def: TypeDef) -> TypeId {
        let id = self.alloc(def);
        self.types[parent.0 as usize].nested.push(id);
        id
    }

    fn alloc(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.index.insert(def.self_ref.clone(), id);
        self.types.push(def);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.types[id.0 as usize]
    }

    /// Resolves a reference to its definition in this graph, if any.
    /// A generic instantiation resolves to its open type's definition.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<TypeId> {
        if type_ref.is_generic_instance() {
            let open = TypeRef {
                scope: type_ref.scope.clone(),
                name: type_ref.name.clone(),
                args: Vec::new(),
            };
            return self.index.get(&open).copied();
        }
        self.index.get(type_ref).copied()
    }

    pub fn resolve_def(&self, type_ref: &TypeRef) -> Option<&TypeDef> {
        self.resolve(type_ref).map(|id| self.get(id))
    }

    /// All type ids, top-level first, nested types after their parent.
    pub fn all_type_ids(&self) -> Vec<TypeId> {
        let mut out = Vec::with_capacity(self.types.len());
        for &id in &self.top_level {
            self.collect_with_nested(id, &mut out);
        }
        out
    }

    fn collect_with_nested(&self, id: TypeId, out: &mut Vec<TypeId>) {
        out.push(id);
        for &nested in &self.get(id).nested {
            self.collect_with_nested(nested, out);
        }
    }

    pub fn top_level_ids(&self) -> &[TypeId] {
        &self.top_level
    }

    /// The base-type chain of `type_ref`, exclusive of the type itself,
    /// stopping at the first reference this graph cannot resolve.
    pub fn base_chain(&self, type_ref: &TypeRef) -> Vec<TypeRef> {
        let mut out = Vec::new();
        let mut current = type_ref.clone();
        while let Some(base) = self.resolve_def(&current).and_then(|def| def.base.clone()) {
            out.push(base.clone());
            current = base;
        }
        out
    }

    /// Like [`ModuleGraph::base_chain`], but including the type itself at
    /// position zero.
    pub fn self_and_base_chain(&self, type_ref: &TypeRef) -> Vec<TypeRef> {
        let mut out = vec![type_ref.clone()];
        out.extend(self.base_chain(type_ref));
        out
    }

    /// The transitively computed interface set of `type_ref`: interfaces
    /// declared on the type, on every ancestor, and on those interfaces in
    /// turn, as far as this graph can resolve.
    pub fn transitive_interfaces(&self, type_ref: &TypeRef) -> FxHashSet<TypeRef> {
        let mut set = FxHashSet::default();
        let mut work: Vec<TypeRef> = self.self_and_base_chain(type_ref);
        while let Some(current) = work.pop() {
            let Some(def) = self.resolve_def(&current) else {
                continue;
            };
            for iface in &def.interfaces {
                if set.insert(iface.clone()) {
                    work.extend(self.self_and_base_chain(iface));
                }
            }
        }
        set
    }

    /// Records that a reference crossing scope boundaries is used by this
    /// module. Must be called before writing any cross-scope reference into
    /// an instruction or signature slot. Idempotent.
    pub fn import_reference(&mut self, type_ref: &TypeRef) {
        if self.imported.insert(type_ref.clone()) {
            tracing::debug!(reference = %type_ref, "imported reference");
        }
        if let Some(scope) = &type_ref.scope {
            if *scope != self.scope {
                self.add_scope_reference(scope.clone());
            }
        }
    }

    pub fn is_imported(&self, type_ref: &TypeRef) -> bool {
        self.imported.contains(type_ref)
    }

    /// Best-effort source location for a type: the definition's own
    /// location if the reference resolves here.
    pub fn try_get_sequence_point(&self, type_ref: &TypeRef) -> Option<SourceLocation> {
        self.resolve_def(type_ref).and_then(|def| def.location.clone())
    }
}
