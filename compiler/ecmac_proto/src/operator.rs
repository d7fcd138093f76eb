//! Which host-provided intrinsic a binary/unary operator or implicit
//! ToString conversion lowers to (`spec.md` §6 "Runtime contract").
//!
//! The IL emitter contract (`spec.md` §4.10) has no arithmetic opcodes of
//! its own — `LoadInt32`/`LoadDouble`/etc. only push constants, and the
//! only way to combine two stack values is `Call(methodId)`. Every operator
//! other than the three scope-chain primitives (`strict_equals_method` and
//! the two `for-in`/`for-of` enumerators, already on [`crate::HostRuntime`])
//! is therefore one more such well-known method id, grouped here instead of
//! one accessor per operator so adding a missing one is a one-line match
//! arm rather than a new trait method.

/// One entry per operator the code-generation driver (C9) lowers through a
/// host intrinsic call rather than a static-type-specific IL conversion.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Gt,
    LtEq,
    GtEq,
    LooseEquals,
    In,
    InstanceOf,
    TypeOf,
    UnaryNegate,
    UnaryBitNot,
    /// `ToString(value)` — template-literal interpolation and implicit
    /// string coercion where [`ecmac_il::IlEmitter::convert_to_string`]
    /// isn't enough because the source type is [`ecmac_types::Type::Universal`].
    ToDisplayString,
}
