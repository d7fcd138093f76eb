//! Lowering a resolved [`ecmac_ir::Name`] read or write to IL (`spec.md`
//! §4.6 "Scope chain", §4.10 "Local-slot and temporary management"),
//! mirroring the scope walk `ecmac_resolve::names` already performed during
//! type inference — this time emitting instructions instead of unifying
//! types.
//!
//! By the time codegen runs, [`ecmac_resolve`] has already bound every name
//! to a scope (creating an implicit global for a loose, non-strict read).
//! A lookup failing here is this crate's own bug, not a user error, so it
//! reports through [`internal_invariant`] rather than surfacing as an
//! ordinary [`CompileError`].

use crate::context::{CodegenContext, GLOBAL_OBJECT_TOKEN};
use ecmac_diagnostic::CompileError;
use ecmac_ir::{Name, Span};
use ecmac_il::{IlEmitter, VariableHandle};
use ecmac_proto::HostRuntime;
use ecmac_scope::{ScopeChain, ScopeId, ScopeKind, Variable};
use ecmac_types::Type;
use std::sync::Arc;

fn slot_for<E: IlEmitter>(
    emitter: &mut E,
    chain: &mut ScopeChain,
    owner: ScopeId,
    name: Name,
    ty: Type,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<VariableHandle, CompileError> {
    let declared = match chain.get_mut(owner).own_variable_mut(name) {
        Some(Variable::Declared(declared)) => Some(declared),
        _ => None,
    };
    let declared = internal_invariant(declared, path, source, span, "a resolved declared-variable slot request found no declared variable")?;
    if let Some(slot) = declared.slot {
        return Ok(crate::context::slot_to_variable(slot));
    }
    let handle = emitter.declare_variable(ty, Some(name));
    declared.slot = Some(crate::context::variable_to_slot(handle));
    Ok(handle)
}

/// Push the receiver an `Object` scope's field access forwards against: the
/// global object for [`ScopeChain::GLOBAL`], or the local a `with`
/// statement's object expression was cached into otherwise.
fn load_object_scope_receiver<E: IlEmitter>(
    emitter: &mut E,
    ctx: &CodegenContext,
    scope: ScopeId,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<(), CompileError> {
    if scope == ScopeChain::GLOBAL {
        emitter.load_token(GLOBAL_OBJECT_TOKEN);
        return Ok(());
    }
    let handle = internal_invariant(ctx.with_object(scope), path, source, span, "a `with` scope was resolved to but its object reference was never bound")?;
    emitter.load_variable(handle);
    Ok(())
}

/// `GenerateLoad(name)`: leave exactly the name's current value on top of
/// the stack.
#[allow(clippy::too_many_arguments)]
pub fn load_name<E: IlEmitter, R: HostRuntime>(
    emitter: &mut E,
    ctx: &mut CodegenContext,
    chain: &mut ScopeChain,
    runtime: &R,
    from: ScopeId,
    name: Name,
    ty: Type,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<(), CompileError> {
    let owner = internal_invariant(
        chain.resolve(from, name, runtime),
        path,
        source,
        span,
        "a name reached codegen without having been bound by resolution",
    )?;

    match &chain.get(owner).kind {
        ScopeKind::Object { .. } => {
            load_object_scope_receiver(emitter, ctx, owner, path, source, span)?;
            emitter.load_field(name);
            Ok(())
        }
        ScopeKind::Declarative { .. } => match chain.get(owner).own_variable(name) {
            Some(Variable::Argument(arg)) => {
                emitter.load_argument(arg.index as u32);
                Ok(())
            }
            Some(Variable::Declared(_)) => {
                let handle = slot_for(emitter, chain, owner, name, ty, path, source, span)?;
                emitter.load_variable(handle);
                Ok(())
            }
            _ => {
                let line = ecmac_diagnostic::line_at(source, span.start);
                Err(CompileError::internal(
                    "a declarative scope's resolved binding was neither an argument nor a declared variable",
                    path.clone(),
                    line,
                    span,
                ))
            }
        },
    }
}

/// `GenerateSet(name, keepResult)` (`spec.md` §4.9 "Assignment"): the value
/// to store is already on top of the stack. When a property write, the
/// receiver must already be beneath it — [`crate::expr`]'s assignment
/// lowering arranges that ordering before calling this, since
/// `StoreField`/`StoreArrayElement` pop the receiver *after* the value.
///
/// `keep_result` duplicates the value first, so a copy remains on the stack
/// after the store consumes its operands — the duplicate is always of the
/// value alone, which is what every assignment target's store instruction
/// actually pops regardless of what else sits beneath it.
#[allow(clippy::too_many_arguments)]
pub fn store_name<E: IlEmitter, R: HostRuntime>(
    emitter: &mut E,
    ctx: &mut CodegenContext,
    chain: &mut ScopeChain,
    runtime: &R,
    from: ScopeId,
    name: Name,
    ty: Type,
    keep_result: bool,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<(), CompileError> {
    let owner = internal_invariant(
        chain.resolve(from, name, runtime),
        path,
        source,
        span,
        "a name reached codegen without having been bound by resolution",
    )?;

    if keep_result {
        emitter.duplicate();
    }

    match &chain.get(owner).kind {
        ScopeKind::Object { .. } => {
            // The value is on top, but a field store needs the receiver
            // underneath it — park the value in a temporary, push the
            // receiver, then bring the value back on top.
            let value_holder = emitter.create_temporary_variable(ty);
            emitter.store_variable(value_holder);
            load_object_scope_receiver(emitter, ctx, owner, path, source, span)?;
            emitter.load_variable(value_holder);
            emitter.release_temporary_variable(value_holder);
            emitter.store_field(name);
            Ok(())
        }
        ScopeKind::Declarative { .. } => match chain.get(owner).own_variable(name) {
            Some(Variable::Argument(arg)) => {
                emitter.store_argument(arg.index as u32);
                Ok(())
            }
            Some(Variable::Declared(_)) => {
                let handle = slot_for(emitter, chain, owner, name, ty, path, source, span)?;
                emitter.store_variable(handle);
                Ok(())
            }
            _ => {
                let line = ecmac_diagnostic::line_at(source, span.start);
                Err(CompileError::internal(
                    "a declarative scope's resolved binding was neither an argument nor a declared variable",
                    path.clone(),
                    line,
                    span,
                ))
            }
        },
    }
}

/// Wrap an invariant the scope-chain/prototype model guarantees — violating
/// it indicates a compiler bug, not a user-facing failure — as a
/// `CompileError::internal` instead of panicking, matching the no-panic
/// discipline `ecmac_resolve::names` already follows.
fn internal_invariant<T>(value: Option<T>, path: &Arc<str>, source: &str, span: Span, message: &str) -> Result<T, CompileError> {
    value.ok_or_else(|| {
        let line = ecmac_diagnostic::line_at(source, span.start);
        CompileError::internal(message, path.clone(), line, span)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_il::RecordingEmitter;
    use ecmac_proto::PrototypeRegistry;
    use ecmac_scope::{ConstantState, DeclaredVariable, Scope};
    use ecmac_types::MethodId;

    struct TestRuntime {
        prototypes: PrototypeRegistry,
    }

    impl HostRuntime for TestRuntime {
        fn prototypes(&self) -> &PrototypeRegistry {
            &self.prototypes
        }
        fn prototypes_mut(&mut self) -> &mut PrototypeRegistry {
            &mut self.prototypes
        }
        fn strict_equals_method() -> MethodId {
            MethodId(0)
        }
        fn enumerate_property_names_method() -> MethodId {
            MethodId(1)
        }
        fn enumerate_property_values_method() -> MethodId {
            MethodId(2)
        }
        fn operator_method(_kind: ecmac_proto::OperatorKind) -> MethodId {
            MethodId(3)
        }
    }

    fn path() -> Arc<str> {
        Arc::from("<test>")
    }

    #[test]
    fn a_declared_local_allocates_its_slot_on_first_load_and_reuses_it_after() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        chain.declare_variable(
            function_scope,
            Name(1),
            Variable::Declared(DeclaredVariable { ty: Some(Type::I32), slot: None, constant: ConstantState::Unset, initialized: true }),
        );

        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        load_name(&mut emitter, &mut ctx, &mut chain, &runtime, function_scope, Name(1), Type::I32, &path(), "", Span::DUMMY).unwrap();
        load_name(&mut emitter, &mut ctx, &mut chain, &runtime, function_scope, Name(1), Type::I32, &path(), "", Span::DUMMY).unwrap();

        let Some(Variable::Declared(declared)) = chain.get(function_scope).own_variable(Name(1)) else {
            panic!("expected a declared variable");
        };
        assert!(declared.slot.is_some());
    }

    #[test]
    fn reading_a_global_loads_the_global_token_then_the_field() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        registry.get_mut(global).add_property(Name(5), Type::Universal, ecmac_proto::PropertyAttributes::DEFAULT);
        let runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();

        load_name(&mut emitter, &mut ctx, &mut chain, &runtime, ScopeChain::GLOBAL, Name(5), Type::Universal, &path(), "", Span::DUMMY).unwrap();

        let instructions = emitter.instructions();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0], ecmac_il::Instruction::LoadToken(GLOBAL_OBJECT_TOKEN));
        assert_eq!(instructions[1], ecmac_il::Instruction::LoadField(Name(5)));
    }
}
