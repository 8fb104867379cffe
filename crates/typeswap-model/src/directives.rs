//! Raw declarative directives attached to graph scopes.
//!
//! A directive is the graph-level shape of one substitution attribute:
//! the attribute's own type, its positional type arguments, and the named
//! options. The model only stores them; interpretation (well-formedness,
//! duplicate detection, option merging) belongs to the weaver's rule
//! extraction.

use serde::Serialize;
use typeswap_common::TypeRef;

/// Fully qualified name of the substitution attribute the weaver consumes.
pub const SUBSTITUTE_ATTRIBUTE: &str = "Typeswap.SubstituteAttribute";

/// One attached directive, read straight off the graph.
///
/// Options are tri-state: `None` means "not set here, inherit from the
/// enclosing scope".
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachedDirective {
    /// The attribute type this directive was written with. Directives whose
    /// type is not [`SUBSTITUTE_ATTRIBUTE`] are ignored by the weaver.
    pub attribute_type: TypeRef,
    /// Positional type arguments. Well-formed substitution directives carry
    /// exactly two: (source, target).
    pub type_args: Vec<TypeRef>,
    /// Removes the source from the effective map instead of adding it.
    pub disable: bool,
    /// Apply the substitution to method bodies only, leaving declared
    /// signatures untouched.
    pub signature_only: Option<bool>,
    /// Reserved: keep the signature of members overriding a member that is
    /// not subject to the substitution.
    pub keep_base_member_signature: Option<bool>,
}

impl AttachedDirective {
    /// A well-formed `source -> target` substitution directive.
    pub fn substitute(source: TypeRef, target: TypeRef) -> Self {
        Self {
            attribute_type: TypeRef::scopeless(SUBSTITUTE_ATTRIBUTE),
            type_args: vec![source, target],
            disable: false,
            signature_only: None,
            keep_base_member_signature: None,
        }
    }

    /// A tombstone directive disabling `source -> target` for this scope
    /// and its children.
    pub fn disable(source: TypeRef, target: TypeRef) -> Self {
        Self {
            disable: true,
            ..Self::substitute(source, target)
        }
    }

    #[must_use]
    pub fn with_signature_only(mut self, value: bool) -> Self {
        self.signature_only = Some(value);
        self
    }

    #[must_use]
    pub fn with_keep_base_member_signature(mut self, value: bool) -> Self {
        self.keep_base_member_signature = Some(value);
        self
    }

    /// An attribute of some other vocabulary; the weaver leaves these alone.
    pub fn foreign(attribute_type: TypeRef, type_args: Vec<TypeRef>) -> Self {
        Self {
            attribute_type,
            type_args,
            disable: false,
            signature_only: None,
            keep_base_member_signature: None,
        }
    }

    /// Whether this directive belongs to the substitution vocabulary at all
    /// (well-formed or not).
    pub fn is_substitution_vocabulary(&self) -> bool {
        self.attribute_type.name == SUBSTITUTE_ATTRIBUTE
    }
}
