//! Fluent construction of type definitions.
//!
//! Hosts adapt their metadata into the graph through these builders; tests
//! use them to assemble scenario modules by hand.

use typeswap_common::{SourceLocation, TypeRef};

use crate::directives::AttachedDirective;
use crate::types::{FieldDef, GenericParam, MethodDef, PropertyDef, TypeDef, Visibility};

pub struct TypeDefBuilder {
    def: TypeDef,
}

impl TypeDefBuilder {
    pub fn new(self_ref: TypeRef) -> Self {
        Self {
            def: TypeDef {
                self_ref,
                base: None,
                interfaces: Vec::new(),
                generic_params: Vec::new(),
                fields: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
                nested: Vec::new(),
                visibility: Visibility::Public,
                directives: Vec::new(),
                location: None,
            },
        }
    }

    #[must_use]
    pub fn base(mut self, base: TypeRef) -> Self {
        self.def.base = Some(base);
        self
    }

    #[must_use]
    pub fn interface(mut self, interface: TypeRef) -> Self {
        self.def.interfaces.push(interface);
        self
    }

    #[must_use]
    pub fn generic_param(mut self, param: GenericParam) -> Self {
        self.def.generic_params.push(param);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.def.fields.push(field);
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.def.properties.push(property);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.def.methods.push(method);
        self
    }

    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.def.visibility = visibility;
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: AttachedDirective) -> Self {
        self.def.directives.push(directive);
        self
    }

    #[must_use]
    pub fn location(mut self, location: SourceLocation) -> Self {
        self.def.location = Some(location);
        self
    }

    pub fn build(self) -> TypeDef {
        self.def
    }
}
