//! Call-site lowering: resolving `a.b(args…)` and bare `f(args…)` to a
//! concrete call target (`spec.md` §4.8 "Member-access call", "Bare call").
//!
//! Both paths bottom out in the same two primitives: select an overload out
//! of a built-in [`MethodGroup`], or follow a [`Callable::Method`] handle —
//! which may itself be a user-function generator's id, in which case it is
//! specialized for this call's argument-type vector instead of being a
//! directly-callable native method.

use crate::generator::SpecializationCompiler;
use crate::overload::select_overload;
use crate::registry::GeneratorRegistry;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{Name, Span};
use ecmac_proto::{Callable, HostRuntime, PropertyValue};
use ecmac_types::{MethodId, Type};
use std::sync::Arc;

/// Whether a call site is a plain invocation or a `new` expression — the
/// generator specialization cache keys these separately (`spec.md` §4.8
/// "`GetCompiled(args, isCtor)`").
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CallKind {
    Call,
    New,
}

/// What a resolved call site lowers to: either a concrete, already-callable
/// method (a native overload target, or a user-function specialization
/// freshly compiled or pulled from cache), or the function's declared
/// return type when that's all a caller needs without actually lowering
/// the call (used by `ecmac_resolve`'s best-effort type inference, which
/// never has a [`SpecializationCompiler`] in hand).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ResolvedCall {
    pub target: MethodId,
    pub return_type: Type,
}

/// Resolve `a.b(args…)` (`spec.md` §4.8 "Member-access call"): walk the
/// prototype chain of `receiver_type` for `property`, then dispatch on what
/// kind of callable slot it is.
#[allow(clippy::too_many_arguments)]
pub fn resolve_member_call(
    runtime: &mut impl HostRuntime,
    generators: &mut GeneratorRegistry,
    compiler: &mut dyn SpecializationCompiler,
    receiver_type: Type,
    property: Name,
    argument_types: &[Type],
    kind: CallKind,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<ResolvedCall, CompileError> {
    let Type::Instance(prototype) = receiver_type else {
        return Err(unresolved_call(path, source, span, "member access on a non-instance receiver"));
    };

    let Some(found) = runtime.prototypes().resolve_property(prototype, property) else {
        return Err(unresolved_call(path, source, span, "no such property on the receiver"));
    };

    match &found.value {
        PropertyValue::Method(group) => {
            let best = select_overload(group, argument_types)
                .ok_or_else(|| unresolved_call(path, source, span, "no overload matches the call's argument types"))?;
            Ok(ResolvedCall { target: best.overload.target, return_type: best.overload.return_type })
        }
        PropertyValue::Constant => {
            resolve_through_generator(generators, compiler, found.ty, argument_types, receiver_type, kind, path, source, span)
        }
        _ => Err(unresolved_call(path, source, span, "property is not callable")),
    }
}

/// Resolve bare `f(args…)` (`spec.md` §4.8 "Bare call"): if `f`'s constant
/// is a user-function generator, specialize it directly; otherwise follow
/// its runtime type's `OnCall`/`OnConstruct` entry.
#[allow(clippy::too_many_arguments)]
pub fn resolve_bare_call(
    runtime: &mut impl HostRuntime,
    generators: &mut GeneratorRegistry,
    compiler: &mut dyn SpecializationCompiler,
    callee_type: Type,
    callee_constant_generator: Option<MethodId>,
    argument_types: &[Type],
    kind: CallKind,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<ResolvedCall, CompileError> {
    if let Some(generator_id) = callee_constant_generator {
        return specialize_generator(generators, compiler, generator_id, argument_types, kind, path, source, span);
    }

    let Type::Instance(prototype) = callee_type else {
        return Err(unresolved_call(path, source, span, "callee has no statically known prototype"));
    };
    let proto = runtime.prototypes().get(prototype);
    let callable = match kind {
        CallKind::Call => proto.on_call.clone(),
        CallKind::New => proto.on_construct.clone(),
    };
    let Some(callable) = callable else {
        return Err(unresolved_call(path, source, span, "callee's prototype has no call/construct entry"));
    };

    resolve_callable(runtime, generators, compiler, &callable, argument_types, callee_type, kind, path, source, span)
}

#[allow(clippy::too_many_arguments)]
fn resolve_through_generator(
    generators: &mut GeneratorRegistry,
    compiler: &mut dyn SpecializationCompiler,
    property_type: Type,
    argument_types: &[Type],
    _receiver_type: Type,
    kind: CallKind,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<ResolvedCall, CompileError> {
    let Type::Method(generator_id) = property_type else {
        return Err(unresolved_call(path, source, span, "constant property is not a callable generator"));
    };
    specialize_generator(generators, compiler, generator_id, argument_types, kind, path, source, span)
}

#[allow(clippy::too_many_arguments)]
fn resolve_callable(
    _runtime: &mut impl HostRuntime,
    generators: &mut GeneratorRegistry,
    compiler: &mut dyn SpecializationCompiler,
    callable: &Callable,
    argument_types: &[Type],
    _this_type: Type,
    kind: CallKind,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<ResolvedCall, CompileError> {
    match callable {
        // A method-group-backed `OnCall`/`OnConstruct` is resolved by name
        // elsewhere (`spec.md` §4.5 "Callable::Group"); this crate's call
        // sites only ever see a direct handle, so an unresolved group here
        // means the built-in wiring never populated it correctly.
        Callable::Group(_) => Err(unresolved_call(path, source, span, "unresolved method-group callable")),
        Callable::Method(id) => {
            if generators.get(*id).is_some() {
                specialize_generator(generators, compiler, *id, argument_types, kind, path, source, span)
            } else {
                Ok(ResolvedCall { target: *id, return_type: Type::Universal })
            }
        }
    }
}

fn specialize_generator(
    generators: &mut GeneratorRegistry,
    compiler: &mut dyn SpecializationCompiler,
    generator_id: MethodId,
    argument_types: &[Type],
    kind: CallKind,
    path: &Arc<str>,
    source: &str,
    span: Span,
) -> Result<ResolvedCall, CompileError> {
    let Some(generator) = generators.get_mut(generator_id) else {
        return Err(unresolved_call(path, source, span, "generator id has no registered function"));
    };
    let declared_param_count = argument_types.len();
    let method = generator.get_compiled(declared_param_count, argument_types, kind == CallKind::New, compiler)?;
    Ok(ResolvedCall { target: method, return_type: Type::Universal })
}

fn unresolved_call(path: &Arc<str>, source: &str, span: Span, message: &str) -> CompileError {
    let line = ecmac_diagnostic::line_at(source, span.start);
    CompileError::type_error(message, path.clone(), line, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FunctionGenerator;
    use ecmac_ir::FunctionId;
    use ecmac_proto::{MethodGroup, Overload, PrototypeRegistry};
    use ecmac_scope::ScopeChain;
    use std::cell::Cell;

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

    struct NoopCompiler {
        next_id: u64,
        compiled: Cell<u32>,
    }

    impl SpecializationCompiler for NoopCompiler {
        fn allocate_method_id(&mut self) -> MethodId {
            self.next_id += 1;
            MethodId(self.next_id)
        }
        fn compile_specialization(
            &mut self,
            _generator: &FunctionGenerator,
            _method: MethodId,
            _argument_types: &[Type],
            _is_constructor: bool,
        ) -> Result<(), CompileError> {
            self.compiled.set(self.compiled.get() + 1);
            Ok(())
        }
    }

    fn path() -> Arc<str> {
        Arc::from("t.js")
    }

    #[test]
    fn member_call_selects_the_matching_overload() {
        let mut registry = PrototypeRegistry::new();
        let prototype = registry.create(None);
        let mut group = MethodGroup::new();
        group.push(Overload {
            target: MethodId(42),
            params: vec![Type::I32],
            return_type: Type::Boolean,
            leading_engine_param: false,
            leading_this_obj: false,
            params_array: false,
            trailing_optional: 0,
        });
        registry.get_mut(prototype).add_method(Name(1), PropertyValue::Method(group), Default::default());

        let mut runtime = TestRuntime { prototypes: registry };
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0, compiled: Cell::new(0) };

        let resolved = resolve_member_call(
            &mut runtime,
            &mut generators,
            &mut compiler,
            Type::Instance(prototype),
            Name(1),
            &[Type::I32],
            CallKind::Call,
            &path(),
            "",
            Span::DUMMY,
        )
        .unwrap();

        assert_eq!(resolved.target, MethodId(42));
        assert_eq!(resolved.return_type, Type::Boolean);
    }

    #[test]
    fn bare_call_specializes_a_user_function_generator() {
        let mut runtime = TestRuntime { prototypes: PrototypeRegistry::new() };
        let mut generators = GeneratorRegistry::new();
        let generator_id = generators.create(FunctionId(0), ScopeChain::GLOBAL);
        let mut compiler = NoopCompiler { next_id: 100, compiled: Cell::new(0) };

        let resolved = resolve_bare_call(
            &mut runtime,
            &mut generators,
            &mut compiler,
            Type::Universal,
            Some(generator_id),
            &[Type::I32],
            CallKind::Call,
            &path(),
            "",
            Span::DUMMY,
        )
        .unwrap();

        assert_eq!(compiler.compiled.get(), 1);
        assert_eq!(resolved.target, MethodId(101));
    }

    #[test]
    fn unresolved_member_access_reports_a_type_error() {
        let mut runtime = TestRuntime { prototypes: PrototypeRegistry::new() };
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0, compiled: Cell::new(0) };

        let err = resolve_member_call(
            &mut runtime,
            &mut generators,
            &mut compiler,
            Type::Universal,
            Name(1),
            &[],
            CallKind::Call,
            &path(),
            "",
            Span::DUMMY,
        )
        .unwrap_err();

        assert_eq!(err.kind, ecmac_diagnostic::ErrorKind::Type);
    }
}
