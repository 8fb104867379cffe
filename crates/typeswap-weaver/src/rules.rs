//! Rule extraction: attached directives to raw substitution rules.
//!
//! Extraction is deliberately forgiving about shape: a directive that is
//! not part of the substitution vocabulary, or that does not carry exactly
//! two type arguments, is ignored rather than rejected. The only hard
//! failure is a source type declared twice within the same directive set.

use rustc_hash::FxHashSet;
use typeswap_common::{TypeRef, WeavingError};
use typeswap_model::AttachedDirective;

/// Tri-state substitution options. `None` inherits from the enclosing
/// scope; `Some` overrides it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionOptions {
    pub signature_only: Option<bool>,
    pub keep_base_member_signature: Option<bool>,
}

impl SubstitutionOptions {
    /// Effective value of the signature-only flag.
    pub fn is_signature_only(&self) -> bool {
        self.signature_only.unwrap_or(false)
    }

    /// Effective value of the reserved keep-base-member-signature flag.
    pub fn keeps_base_member_signature(&self) -> bool {
        self.keep_base_member_signature.unwrap_or(false)
    }

    /// Merge `other` onto `self`: explicitly set values win, unset values
    /// keep the current (inherited) value.
    #[must_use]
    pub fn merged_with(self, other: SubstitutionOptions) -> SubstitutionOptions {
        SubstitutionOptions {
            signature_only: other.signature_only.or(self.signature_only),
            keep_base_member_signature: other
                .keep_base_member_signature
                .or(self.keep_base_member_signature),
        }
    }
}

/// One parsed substitution rule from one directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub source: TypeRef,
    pub target: TypeRef,
    pub options: SubstitutionOptions,
    /// Tombstone: removes the source from the effective map instead of
    /// mapping it. Never stored as map state.
    pub disabled: bool,
}

/// Extracts the substitution rules of one scope's directive set, in
/// declaration order.
///
/// Fails with a duplicate-mapping error when the same source type appears
/// in more than one well-formed directive of this set.
pub fn extract_rules(directives: &[AttachedDirective]) -> Result<Vec<SubstitutionRule>, WeavingError> {
    let mut rules = Vec::new();
    let mut seen: FxHashSet<&TypeRef> = FxHashSet::default();

    for directive in directives {
        if !directive.is_substitution_vocabulary() {
            continue;
        }
        // Malformed directives are not ours to complain about.
        let [source, target] = directive.type_args.as_slice() else {
            tracing::debug!(args = directive.type_args.len(), "ignoring malformed directive");
            continue;
        };

        if !seen.insert(source) {
            return Err(WeavingError::for_type(
                format!("Duplicate mapping: {source} is the source of more than one substitution in the same directive set."),
                source.clone(),
            ));
        }

        rules.push(SubstitutionRule {
            source: source.clone(),
            target: target.clone(),
            options: SubstitutionOptions {
                signature_only: directive.signature_only,
                keep_base_member_signature: directive.keep_base_member_signature,
            },
            disabled: directive.disable,
        });
    }

    Ok(rules)
}
