//! The mutable record threaded through one function's `ResolveVariables`
//! pass (`spec.md` §4.6 "Optimization context").
//!
//! Split from the code-generation driver's own context (`ecmac_codegen`):
//! break/continue targets, labels, IL slots, and the long-jump table are
//! pure codegen concerns that never feed type inference, so they live where
//! they're actually consumed instead of riding along on every resolve pass.

use bitflags::bitflags;
use ecmac_ir::Name;
use ecmac_scope::{ConstValue, ScopeId};
use ecmac_types::{MethodId, Type};
use rustc_hash::FxHashSet;

/// Script truthiness of a compile-time-known value (`spec.md` §4.7
/// "Constant tracking" feeds the dead-branch elision in §4.9): shared by
/// the `if`/ternary constant-condition checks in both `expr.rs` and
/// `stmt.rs`.
pub(crate) fn is_truthy(value: &ConstValue) -> bool {
    match value {
        ConstValue::Undefined | ConstValue::Null => false,
        ConstValue::Boolean(b) => *b,
        ConstValue::Number(bits) => {
            let n = f64::from_bits(*bits);
            n != 0.0 && !n.is_nan()
        }
        ConstValue::String(_) => true,
        ConstValue::Method(_) => true,
    }
}

bitflags! {
    /// Optimization hints accumulated while resolving a function body
    /// (`spec.md` §4.6). Consulted by specialization (`arguments` object
    /// materialization, nested-closure capture) and by the dispatch
    /// resolver's argument-type-vector cache key.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodHints: u8 {
        /// `this` was referenced anywhere in the body.
        const THIS_REFERENCED = 1 << 0;
        /// The `arguments` object was referenced anywhere in the body.
        const ARGUMENTS_REFERENCED = 1 << 1;
        /// A nested `function` expression or declaration was seen.
        const CONTAINS_NESTED_FUNCTION = 1 << 2;
    }
}

/// Per-function resolve state: scope position, strict-mode flag, hint
/// accumulator, and the function's return-type accumulator
/// (`spec.md` §4.6, §4.7 "Return-type accumulation").
pub struct ResolveContext {
    pub scope: ScopeId,
    pub strict: bool,
    pub hints: MethodHints,
    /// Every distinct name read or written anywhere in the body — part of
    /// the method hints record (`spec.md` §4.6).
    pub encountered_names: FxHashSet<Name>,
    /// The currently-compiling function, used to record global
    /// reader/writer facts for recompilation (`spec.md` §4.12). `None`
    /// while resolving top-level script statements, which have no
    /// specialization to invalidate.
    pub current_method: Option<MethodId>,
    return_type: Option<Type>,
}

impl ResolveContext {
    pub fn new(scope: ScopeId, strict: bool, current_method: Option<MethodId>) -> Self {
        ResolveContext {
            scope,
            strict,
            hints: MethodHints::empty(),
            encountered_names: FxHashSet::default(),
            current_method,
            return_type: None,
        }
    }

    pub fn note_name(&mut self, name: Name) {
        self.encountered_names.insert(name);
    }

    /// `return e` contributes `typeOf(e)` (`spec.md` §4.7): the first
    /// contribution sets the accumulator; a disagreeing later one collapses
    /// it to the universal type. Returns `true` on collapse.
    pub fn accumulate_return(&mut self, ty: Type) -> bool {
        match self.return_type {
            None => {
                self.return_type = Some(ty);
                false
            }
            Some(existing) if existing == ty => false,
            Some(Type::Universal) => false,
            Some(_) => {
                self.return_type = Some(Type::Universal);
                true
            }
        }
    }

    /// The function's resolved return type once every `return` has been
    /// visited: the undefined singleton if none was seen (`spec.md` §4.7).
    pub fn finish_return_type(&self) -> Type {
        self.return_type.unwrap_or(Type::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_scope::ScopeChain;

    #[test]
    fn no_return_statements_yields_undefined() {
        let ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);
        assert_eq!(ctx.finish_return_type(), Type::Undefined);
    }

    #[test]
    fn agreeing_returns_keep_their_type() {
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);
        assert!(!ctx.accumulate_return(Type::I32));
        assert!(!ctx.accumulate_return(Type::I32));
        assert_eq!(ctx.finish_return_type(), Type::I32);
    }

    #[test]
    fn disagreeing_returns_collapse_to_universal() {
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);
        ctx.accumulate_return(Type::I32);
        assert!(ctx.accumulate_return(Type::String));
        assert_eq!(ctx.finish_return_type(), Type::Universal);
        assert!(!ctx.accumulate_return(Type::Boolean));
        assert_eq!(ctx.finish_return_type(), Type::Universal);
    }
}
