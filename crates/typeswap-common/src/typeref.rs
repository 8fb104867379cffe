//! Canonical type-reference identity.
//!
//! A metadata graph hands out many reference instances for the same logical
//! type. Everything in the weaver keys its maps and sets by the canonical
//! key of a reference (defining-scope identity + fully qualified name), so
//! equality survives duplicated instances. Instance identity is never used.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Sentinel used as the scope identity of references with no defining scope.
const NO_SCOPE: &str = "<none>";

/// Identity of a defining scope (an assembly or module name).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeName(pub String);

impl ScopeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a type, possibly a generic instantiation.
///
/// Equality and hashing are defined by [`TypeRef::canonical_key`] alone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeRef {
    /// The scope that defines the referenced type, if known.
    pub scope: Option<ScopeName>,
    /// Fully qualified name of the open type, e.g. `System.Resources.ResourceManager`.
    pub name: String,
    /// Generic arguments; empty for a plain reference.
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: Some(ScopeName::new(scope)),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A reference whose defining scope is unknown to the graph.
    pub fn scopeless(name: impl Into<String>) -> Self {
        Self {
            scope: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Turns this reference into a generic instantiation of itself.
    #[must_use]
    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.args = args;
        self
    }

    pub fn is_generic_instance(&self) -> bool {
        !self.args.is_empty()
    }

    /// The identity of the defining scope, or the sentinel when absent.
    pub fn scope_identity(&self) -> &str {
        self.scope.as_ref().map_or(NO_SCOPE, |s| s.as_str())
    }

    /// Fully qualified name, with generic arguments rendered when present.
    pub fn full_name(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let args = self
            .args
            .iter()
            .map(TypeRef::full_name)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}<{}>", self.name, args)
    }

    /// The stable key this reference is equal and hashed by:
    /// `scope identity + "|" + fully qualified name`.
    pub fn canonical_key(&self) -> String {
        format!("{}|{}", self.scope_identity(), self.full_name())
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
