//! Instruction streams and their operands.
//!
//! Only the shape the weaver cares about is modeled: an ordered list of
//! instructions whose operands may reference types, methods, or fields.
//! Opcodes are carried through rewrites untouched.

use serde::Serialize;
use smallvec::SmallVec;
use typeswap_common::TypeRef;

/// Operation code of one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OpCode {
    NewObj,
    Call,
    CallVirt,
    LdFld,
    StFld,
    LdSFld,
    StSFld,
    LdLoc,
    StLoc,
    LdArg,
    LdStr,
    LdToken,
    CastClass,
    IsInst,
    Box,
    Unbox,
    Ret,
    Nop,
}

/// A reference to a method declared on some type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub params: SmallVec<[TypeRef; 4]>,
    pub return_type: TypeRef,
    pub is_static: bool,
}

impl MethodRef {
    pub fn new(
        declaring_type: TypeRef,
        name: impl Into<String>,
        params: impl IntoIterator<Item = TypeRef>,
        return_type: TypeRef,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            params: params.into_iter().collect(),
            return_type,
            is_static: false,
        }
    }

    #[must_use]
    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A reference to a field declared on some type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub field_type: TypeRef,
    pub is_static: bool,
}

impl FieldRef {
    pub fn new(declaring_type: TypeRef, name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            field_type,
            is_static: false,
        }
    }

    #[must_use]
    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Instruction operand. Anything that is not a metadata reference is
/// opaque to the weaver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Operand {
    None,
    Type(TypeRef),
    Method(MethodRef),
    Field(FieldRef),
    Local(u16),
    Arg(u16),
    Str(String),
    I64(i64),
}

/// One instruction in a method body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(opcode: OpCode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    pub fn simple(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: Operand::None,
        }
    }
}
