//! Type and member definitions.

use serde::Serialize;
use smallvec::SmallVec;
use typeswap_common::{SourceLocation, TypeRef};

use crate::directives::AttachedDirective;
use crate::graph::TypeId;
use crate::instructions::Instruction;

/// Member and type visibility. The weaver only distinguishes private from
/// everything else; the rest is carried for the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

/// A generic parameter with its constraint list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenericParam {
    pub name: String,
    pub constraints: Vec<TypeRef>,
}

impl GenericParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn constrained_to(mut self, constraint: TypeRef) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub param_type: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, param_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: TypeRef,
    pub is_static: bool,
    pub visibility: Visibility,
    pub directives: Vec<AttachedDirective>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_static: false,
            visibility: Visibility::Private,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: AttachedDirective) -> Self {
        self.directives.push(directive);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyDef {
    pub name: String,
    pub property_type: TypeRef,
    pub is_static: bool,
    pub directives: Vec<AttachedDirective>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, property_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            property_type,
            is_static: false,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_directive(mut self, directive: AttachedDirective) -> Self {
        self.directives.push(directive);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MethodDef {
    pub name: String,
    pub return_type: TypeRef,
    pub params: SmallVec<[Param; 4]>,
    pub generic_params: Vec<GenericParam>,
    /// Local-variable slot types, part of the body rather than the signature.
    pub locals: Vec<TypeRef>,
    pub body: Vec<Instruction>,
    pub is_static: bool,
    pub visibility: Visibility,
    pub directives: Vec<AttachedDirective>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type,
            params: SmallVec::new(),
            generic_params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
            is_static: false,
            visibility: Visibility::Public,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn with_generic_param(mut self, param: GenericParam) -> Self {
        self.generic_params.push(param);
        self
    }

    #[must_use]
    pub fn with_local(mut self, local_type: TypeRef) -> Self {
        self.locals.push(local_type);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<Instruction>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: AttachedDirective) -> Self {
        self.directives.push(directive);
        self
    }
}

/// One type definition in the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    /// The reference this definition answers to.
    pub self_ref: TypeRef,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub generic_params: Vec<GenericParam>,
    pub fields: Vec<FieldDef>,
    pub properties: Vec<PropertyDef>,
    pub methods: Vec<MethodDef>,
    pub nested: Vec<TypeId>,
    pub visibility: Visibility,
    pub directives: Vec<AttachedDirective>,
    /// Sequence-point equivalent used when reporting errors about this type.
    pub location: Option<SourceLocation>,
}
