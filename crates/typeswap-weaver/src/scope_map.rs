//! Effective substitution maps, one per scope.
//!
//! A scope's map is its parent's map with the scope's own rules merged on
//! top. Maps are immutable once built and shared by `Arc`; a scope with no
//! local rules reuses its parent's map outright, so callers must not rely
//! on pointer identity to detect "no local overrides".
//!
//! Entries keep declaration order (insertion-ordered map) so validation
//! and traversal are deterministic.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use typeswap_common::TypeRef;

use crate::rules::{SubstitutionOptions, SubstitutionRule};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// One resolved mapping: where a source type goes and under which options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapEntry {
    pub target: TypeRef,
    pub options: SubstitutionOptions,
}

/// The fully merged source -> (target, options) view of one scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectiveMap {
    entries: FxIndexMap<TypeRef, MapEntry>,
}

impl EffectiveMap {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, source: &TypeRef) -> Option<&MapEntry> {
        self.entries.get(source)
    }

    pub fn contains_source(&self, source: &TypeRef) -> bool {
        self.entries.contains_key(source)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeRef, &MapEntry)> {
        self.entries.iter()
    }

    /// Builds the effective map of a scope from its own rules and the
    /// inherited parent map.
    ///
    /// Merge semantics per local rule:
    /// - disabled: the source key is removed
    /// - source already mapped: the stored target is kept and unset option
    ///   fields inherit; the entry is rewritten only when the merged
    ///   (target, options) actually differs
    /// - otherwise: the rule is inserted
    pub fn build(local_rules: &[SubstitutionRule], parent: &Arc<EffectiveMap>) -> Arc<EffectiveMap> {
        if local_rules.is_empty() {
            return Arc::clone(parent);
        }

        let mut entries = parent.entries.clone();

        for rule in local_rules {
            if rule.disabled {
                entries.shift_remove(&rule.source);
                continue;
            }

            match entries.get(&rule.source) {
                Some(existing) => {
                    let merged = MapEntry {
                        target: existing.target.clone(),
                        options: existing.options.merged_with(rule.options),
                    };
                    if merged != *existing {
                        entries.insert(rule.source.clone(), merged);
                    }
                }
                None => {
                    entries.insert(
                        rule.source.clone(),
                        MapEntry {
                            target: rule.target.clone(),
                            options: rule.options,
                        },
                    );
                }
            }
        }

        Arc::new(EffectiveMap { entries })
    }
}
