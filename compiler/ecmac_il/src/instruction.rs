//! The concrete instruction vocabulary (`spec.md` §6 "IL emitter contract").
//!
//! One variant per emitter method; [`crate::RecordingEmitter`] stores exactly
//! this shape, so disassembly and interpretation both walk the same enum the
//! trait methods produce.

use crate::handle::{LabelId, Token, VariableHandle};
use ecmac_ir::Name;
use ecmac_types::{MethodId, Type};

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    LoadArgument(u32),
    StoreArgument(u32),
    DeclareVariable(Type, Option<Name>, VariableHandle),
    LoadVariable(VariableHandle),
    StoreVariable(VariableHandle),
    LoadField(Name),
    StoreField(Name),
    LoadInt32(i32),
    LoadInt64(i64),
    LoadDouble(f64),
    LoadBoolean(bool),
    LoadString(String),
    LoadStringOrNull(Option<String>),
    LoadNull,
    LoadToken(Token),
    NewArray(Type),
    NewObject(MethodId),
    StoreArrayElement(Type),
    LoadArrayElement(Type),
    Call(MethodId),
    Duplicate,
    Pop,
    CreateLabel(LabelId),
    DefineLabelPosition(LabelId),
    Branch(LabelId),
    BranchIfTrue(LabelId),
    BranchIfFalse(LabelId),
    Leave(LabelId),
    Throw,
    Switch(Vec<LabelId>),
    BeginExceptionBlock,
    BeginCatchBlock(Token),
    BeginFinallyBlock,
    EndExceptionBlock,
    Breakpoint,
    NoOperation,
    Complete,
    ConvertToBool,
    ConvertToAny,
    ConvertToString,
    ConvertGeneric(Type, Type),
}
