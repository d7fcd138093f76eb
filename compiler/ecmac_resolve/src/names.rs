//! `NameExpression` resolution (`spec.md` §4.7 point 1): binds a name to
//! the nearest enclosing scope entry, or creates a global property when
//! nothing already binds it.

use crate::context::ResolveContext;
use crate::globals::GlobalEnvironment;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{Name, Span};
use ecmac_proto::HostRuntime;
use ecmac_scope::{ConstValue, ConstantState, ScopeChain, ScopeKind};
use ecmac_types::Type;
use std::sync::Arc;

/// Read a name's current type and (if any) constant value.
pub fn read_name(
    name: Name,
    span: Span,
    path: &Arc<str>,
    source: &str,
    ctx: &mut ResolveContext,
    chain: &mut ScopeChain,
    globals: &mut GlobalEnvironment,
    runtime: &mut impl HostRuntime,
) -> Result<(Type, Option<ConstValue>), CompileError> {
    ctx.note_name(name);

    if let Some(found) = chain.resolve(ctx.scope, name, runtime) {
        if found == ScopeChain::GLOBAL {
            let prototype = internal_invariant(chain.prototype_of(found), path, source, span, "global scope is an object scope")?;
            let ty = runtime.prototypes().resolve_property(prototype, name).map_or(Type::Universal, |p| p.ty);
            let constant = globals.constant_of(name).and_then(ConstantState::value).copied();
            return Ok((ty, constant));
        }
        let scope = chain.get(found);
        return Ok(match &scope.kind {
            ScopeKind::Declarative { vars, .. } => {
                let var = internal_invariant(
                    vars.get(&name),
                    path,
                    source,
                    span,
                    "resolve returned a declarative scope owning this name",
                )?;
                (var.read_type(), var.constant().value().copied())
            }
            ScopeKind::Object { prototype } => {
                let ty = runtime.prototypes().resolve_property(*prototype, name).map_or(Type::Universal, |p| p.ty);
                (ty, None)
            }
        });
    }

    if ctx.strict {
        let line = ecmac_diagnostic::line_at(source, span.start);
        return Err(CompileError::reference("name is not defined", path.clone(), line, span));
    }

    let global_prototype = internal_invariant(
        chain.prototype_of(ScopeChain::GLOBAL),
        path,
        source,
        span,
        "global scope is always an object scope",
    )?;
    let ty = globals.declare_on_read(name, runtime.prototypes_mut(), global_prototype, ctx.current_method);
    Ok((ty, None))
}

/// Wrap an invariant the scope-chain/prototype model guarantees — violating
/// it indicates a compiler bug, not a user-facing failure — as a
/// `CompileError::internal` instead of panicking, matching the no-panic
/// discipline required of non-test code here.
fn internal_invariant<T>(value: Option<T>, path: &Arc<str>, source: &str, span: Span, message: &str) -> Result<T, CompileError> {
    value.ok_or_else(|| {
        let line = ecmac_diagnostic::line_at(source, span.start);
        CompileError::internal(message, path.clone(), line, span)
    })
}

/// Apply a newly observed type to a name on assignment (`ApplyType`,
/// `spec.md` §4.7 point 3). Returns `true` if this write caused a
/// collapse — the caller schedules recompilation of any reported users.
pub fn write_name(
    name: Name,
    ty: Type,
    span: Span,
    path: &Arc<str>,
    source: &str,
    ctx: &mut ResolveContext,
    chain: &mut ScopeChain,
    globals: &mut GlobalEnvironment,
    runtime: &mut impl HostRuntime,
) -> Result<bool, CompileError> {
    ctx.note_name(name);

    if let Some(found) = chain.resolve(ctx.scope, name, runtime) {
        if found == ScopeChain::GLOBAL {
            let prototype = internal_invariant(chain.prototype_of(found), path, source, span, "global scope is an object scope")?;
            let collapsed_users =
                globals.apply_type(name, ty, runtime.prototypes_mut(), prototype, ctx.current_method);
            return Ok(!collapsed_users.is_empty());
        }
        if let ScopeKind::Object { .. } = chain.get(found).kind {
            // A `with`-scoped write targets a plain property; it does not
            // participate in the declared-variable collapse/slot model.
            return Ok(false);
        }
        let var = internal_invariant(
            chain.get_mut(found).own_variable_mut(name),
            path,
            source,
            span,
            "resolve returned a declarative scope owning this name",
        )?;
        return Ok(var.apply_type(ty));
    }

    // Implicit global creation on write (`spec.md` §4.7 point 1): always
    // non-strict here, since a strict-mode write to an undeclared name is a
    // parse-time-checkable error the caller should have already rejected
    // via `read_name` on the same identifier, or is a first assignment that
    // legitimately creates the binding through `declare_variable` instead.
    let global_prototype = internal_invariant(
        chain.prototype_of(ScopeChain::GLOBAL),
        path,
        source,
        span,
        "global scope is always an object scope",
    )?;
    let collapsed_users = globals.apply_type(name, ty, runtime.prototypes_mut(), global_prototype, ctx.current_method);
    Ok(!collapsed_users.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ResolveContext;
    use ecmac_proto::PrototypeRegistry;
    use ecmac_scope::{DeclaredVariable, Scope, Variable};

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
        fn strict_equals_method() -> ecmac_types::MethodId {
            ecmac_types::MethodId(0)
        }
        fn enumerate_property_names_method() -> ecmac_types::MethodId {
            ecmac_types::MethodId(1)
        }
        fn enumerate_property_values_method() -> ecmac_types::MethodId {
            ecmac_types::MethodId(2)
        }
        fn operator_method(_kind: ecmac_proto::OperatorKind) -> ecmac_types::MethodId {
            ecmac_types::MethodId(3)
        }
    }

    fn setup() -> (ScopeChain, TestRuntime, GlobalEnvironment) {
        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        (ScopeChain::new(global), TestRuntime { prototypes: registry }, GlobalEnvironment::new())
    }

    #[test]
    fn unresolved_non_strict_read_creates_a_global() {
        let (mut chain, mut runtime, mut globals) = setup();
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);
        let path: Arc<str> = Arc::from("t.js");
        let (ty, constant) = read_name(Name(1), Span::DUMMY, &path, "", &mut ctx, &mut chain, &mut globals, &mut runtime).unwrap();
        assert_eq!(ty, Type::Universal);
        assert!(constant.is_none());
    }

    #[test]
    fn unresolved_strict_read_is_a_reference_error() {
        let (mut chain, mut runtime, mut globals) = setup();
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, true, None);
        let path: Arc<str> = Arc::from("t.js");
        let err = read_name(Name(1), Span::DUMMY, &path, "", &mut ctx, &mut chain, &mut globals, &mut runtime).unwrap_err();
        assert_eq!(err.kind, ecmac_diagnostic::ErrorKind::Reference);
    }

    #[test]
    fn declared_local_reads_its_own_type() {
        let (mut chain, mut runtime, mut globals) = setup();
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        chain.declare_variable(
            function_scope,
            Name(5),
            Variable::Declared(DeclaredVariable {
                ty: Some(Type::I32),
                slot: None,
                constant: ConstantState::Unset,
                initialized: true,
            }),
        );
        let mut ctx = ResolveContext::new(function_scope, false, None);
        let path: Arc<str> = Arc::from("t.js");
        let (ty, _) = read_name(Name(5), Span::DUMMY, &path, "", &mut ctx, &mut chain, &mut globals, &mut runtime).unwrap();
        assert_eq!(ty, Type::I32);
    }

    #[test]
    fn disagreeing_write_to_local_collapses() {
        let (mut chain, mut runtime, mut globals) = setup();
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        chain.declare_variable(
            function_scope,
            Name(5),
            Variable::Declared(DeclaredVariable { ty: Some(Type::I32), slot: None, constant: ConstantState::Unset, initialized: true }),
        );
        let mut ctx = ResolveContext::new(function_scope, false, None);
        let path: Arc<str> = Arc::from("t.js");
        let collapsed =
            write_name(Name(5), Type::String, Span::DUMMY, &path, "", &mut ctx, &mut chain, &mut globals, &mut runtime)
                .unwrap();
        assert!(collapsed);
    }
}
