//! Call and `new` expression lowering (`spec.md` §4.9 "GenerateCode",
//! §4.8 "Member-access call"/"Bare call"/"New expression"): both shapes
//! bottom out in [`ecmac_dispatch::resolve_member_call`]/
//! [`ecmac_dispatch::resolve_bare_call`] once the full argument-type vector
//! is known, exactly as the dispatch resolver's own doc comment describes.

use crate::lowering::Lowering;
use ecmac_diagnostic::CompileError;
use ecmac_dispatch::{resolve_bare_call, resolve_member_call, CallKind, ResolvedCall};
use ecmac_il::IlEmitter;
use ecmac_ir::{ExprId, ExprKind, ExprRange};
use ecmac_proto::HostRuntime;
use ecmac_scope::{ConstValue, ScopeId};
use ecmac_types::Type;

/// Resolve `callee`'s call target. There is no `this` expression in this
/// language's grammar, so a member call's receiver contributes nothing to
/// the call but the overload/generator it picks out — it is evaluated for
/// its side effects (per left-to-right evaluation order) and then
/// discarded, exactly like a bare callee.
fn resolve_callee<E: IlEmitter, R: HostRuntime>(
    lowering: &mut Lowering<'_, E, R>,
    scope: ScopeId,
    callee: ExprId,
    arg_types: &[Type],
    kind: CallKind,
    span: ecmac_ir::Span,
) -> Result<ResolvedCall, CompileError> {
    let callee_kind = lowering.arena.expr(callee).kind.clone();
    if let ExprKind::Member { object, property } = callee_kind {
        let receiver_ty = lowering.facts.type_of(object);
        lowering.generate_expr_for_effect(scope, object)?;
        resolve_member_call(
            lowering.runtime,
            lowering.generators,
            lowering.compiler,
            receiver_ty,
            property,
            arg_types,
            kind,
            &lowering.path,
            lowering.source,
            span,
        )
    } else {
        // A bare callee is resolved purely from its static type and
        // compile-time-constant generator handle (`spec.md` §4.8 "Bare
        // call") — dispatch to a concrete `MethodId` happens entirely at
        // compile time, so the callee's runtime value never reaches the IL
        // stack either.
        let callee_ty = lowering.facts.type_of(callee);
        let generator = match lowering.facts.constant_of(callee) {
            Some(ConstValue::Method(id)) => Some(*id),
            _ => None,
        };
        lowering.generate_expr_for_effect(scope, callee)?;
        resolve_bare_call(
            lowering.runtime,
            lowering.generators,
            lowering.compiler,
            callee_ty,
            generator,
            arg_types,
            kind,
            &lowering.path,
            lowering.source,
            span,
        )
    }
}

fn argument_types<E: IlEmitter, R: HostRuntime>(lowering: &Lowering<'_, E, R>, arg_ids: &[ExprId]) -> Vec<Type> {
    arg_ids.iter().map(|id| lowering.facts.type_of(*id)).collect()
}

fn push_converted_arguments<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, arg_ids: &[ExprId]) -> Result<(), CompileError> {
    for &arg in arg_ids {
        lowering.generate_expr(scope, arg)?;
        lowering.convert_to(lowering.facts.type_of(arg), Type::Universal);
    }
    Ok(())
}

/// `a.b(args…)`/`f(args…)` (`spec.md` §4.9): the call leaves exactly its
/// return value on the stack, matching [`ecmac_il::interpret`]'s `Call`
/// contract — arity there is however many arguments the resolved target
/// was registered with, which is always just the script-visible argument
/// count this lowering pushes.
pub fn generate_call<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, callee: ExprId, args: ExprRange, expr_id: ExprId) -> Result<(), CompileError> {
    let span = lowering.arena.expr(expr_id).span;
    let arg_ids: Vec<ExprId> = lowering.arena.expr_ids(args).collect();
    let arg_types = argument_types(lowering, &arg_ids);

    let resolved = resolve_callee(lowering, scope, callee, &arg_types, CallKind::Call, span)?;
    push_converted_arguments(lowering, scope, &arg_ids)?;
    lowering.emitter.call(resolved.target);
    Ok(())
}

/// `new callee(args…)` (`spec.md` §4.8 "New expression"): allocate a fresh
/// instance via the resolved constructor's prototype wiring, run the
/// constructor for its side effects exactly like an ordinary call, then
/// leave the instance — not the constructor's return value — on the
/// stack. There is no `this` expression in this language, so a
/// constructor body has no way to act on the instance being built; running
/// it is still required for any other side effect it has.
pub fn generate_new<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, callee: ExprId, args: ExprRange, expr_id: ExprId) -> Result<(), CompileError> {
    let span = lowering.arena.expr(expr_id).span;
    let arg_ids: Vec<ExprId> = lowering.arena.expr_ids(args).collect();
    let arg_types = argument_types(lowering, &arg_ids);

    let resolved = resolve_callee(lowering, scope, callee, &arg_types, CallKind::New, span)?;

    lowering.emitter.new_object(resolved.target);
    let instance = lowering.emitter.create_temporary_variable(Type::Universal);
    lowering.emitter.store_variable(instance);

    push_converted_arguments(lowering, scope, &arg_ids)?;
    lowering.emitter.call(resolved.target);
    lowering.emitter.pop();

    lowering.emitter.load_variable(instance);
    lowering.emitter.release_temporary_variable(instance);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CodegenContext, GLOBAL_OBJECT_TOKEN};
    use crate::lowering::Lowering;
    use ecmac_dispatch::{FunctionGenerator, GeneratorRegistry, SpecializationCompiler};
    use ecmac_il::{Instruction, RecordingEmitter};
    use ecmac_ir::{Arena, Expr, ExprKind, Name, PrimitiveLiteral, Span, StringInterner};
    use ecmac_proto::{Callable, PropertyAttributes, PrototypeRegistry};
    use ecmac_resolve::ResolvedFacts;
    use ecmac_scope::ScopeChain;
    use ecmac_types::MethodId as ProtoMethodId;
    use std::sync::Arc;

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
        fn strict_equals_method() -> ProtoMethodId {
            ProtoMethodId(0)
        }
        fn enumerate_property_names_method() -> ProtoMethodId {
            ProtoMethodId(1)
        }
        fn enumerate_property_values_method() -> ProtoMethodId {
            ProtoMethodId(2)
        }
        fn operator_method(_kind: ecmac_proto::OperatorKind) -> ProtoMethodId {
            ProtoMethodId(3)
        }
    }

    struct NoopCompiler {
        next_id: u64,
    }

    impl SpecializationCompiler for NoopCompiler {
        fn allocate_method_id(&mut self) -> ProtoMethodId {
            self.next_id += 1;
            ProtoMethodId(self.next_id)
        }
        fn compile_specialization(
            &mut self,
            _generator: &FunctionGenerator,
            _method: ProtoMethodId,
            _argument_types: &[Type],
            _is_constructor: bool,
        ) -> Result<(), CompileError> {
            Ok(())
        }
    }

    fn path() -> Arc<str> {
        Arc::from("<test>")
    }

    /// `f(3)` where `f` is a plain global whose resolved call target is a
    /// native method handle, not a user-function generator — the simplest
    /// shape that still exercises the full bare-call path.
    #[test]
    fn bare_call_pushes_only_the_script_visible_argument_then_calls() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let callee_prototype = registry.create(None);
        registry.get_mut(global).add_property(Name(5), Type::Universal, PropertyAttributes::DEFAULT);
        registry.get_mut(callee_prototype).on_call = Some(Callable::Method(ProtoMethodId(99)));

        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let callee = arena.push_expr(Expr { kind: ExprKind::Name(Name(5)), span: Span::DUMMY });
        let arg_range = arena.push_exprs([Expr { kind: ExprKind::Literal(PrimitiveLiteral::Number(3.0)), span: Span::DUMMY }]);
        let arg = arena.expr_ids(arg_range).next().unwrap();
        let call_expr = arena.push_expr(Expr { kind: ExprKind::Call { callee, args: arg_range }, span: Span::DUMMY });

        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        facts.set_type(callee, Type::Instance(callee_prototype));
        facts.set_type(arg, Type::F64);
        facts.set_type(call_expr, Type::Universal);

        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();

        let mut lowering = Lowering::new(
            &mut emitter,
            &mut ctx,
            &arena,
            &interner,
            &mut chain,
            &mut runtime,
            &mut generators,
            &mut compiler,
            &facts,
            path(),
            "",
        );

        let ExprKind::Call { callee: callee_id, args } = arena.expr(call_expr).kind else {
            unreachable!()
        };
        generate_call(&mut lowering, ScopeChain::GLOBAL, callee_id, args, call_expr).unwrap();

        let instructions = emitter.instructions();
        assert_eq!(
            instructions,
            &[
                Instruction::LoadToken(GLOBAL_OBJECT_TOKEN),
                Instruction::LoadField(Name(5)),
                Instruction::Pop,
                Instruction::LoadDouble(3.0),
                Instruction::ConvertToAny,
                Instruction::Call(ProtoMethodId(99)),
            ]
        );
    }

    /// `new f()` leaves the freshly allocated instance on the stack, never
    /// the constructor's own return value, and never pushes the instance as
    /// an implicit argument to the constructor call.
    #[test]
    fn construct_discards_the_constructors_return_value_and_keeps_the_instance() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let ctor_prototype = registry.create(None);
        registry.get_mut(global).add_property(Name(6), Type::Universal, PropertyAttributes::DEFAULT);
        registry.get_mut(ctor_prototype).on_construct = Some(Callable::Method(ProtoMethodId(77)));

        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let callee = arena.push_expr(Expr { kind: ExprKind::Name(Name(6)), span: Span::DUMMY });
        let args = arena.push_exprs(std::iter::empty::<Expr>());
        let new_expr = arena.push_expr(Expr { kind: ExprKind::New { callee, args }, span: Span::DUMMY });

        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        facts.set_type(callee, Type::Instance(ctor_prototype));
        facts.set_type(new_expr, Type::Instance(ctor_prototype));

        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();

        let mut lowering = Lowering::new(
            &mut emitter,
            &mut ctx,
            &arena,
            &interner,
            &mut chain,
            &mut runtime,
            &mut generators,
            &mut compiler,
            &facts,
            path(),
            "",
        );

        generate_new(&mut lowering, ScopeChain::GLOBAL, callee, args, new_expr).unwrap();

        let instructions = emitter.instructions();
        assert_eq!(
            instructions,
            &[
                Instruction::LoadToken(GLOBAL_OBJECT_TOKEN),
                Instruction::LoadField(Name(6)),
                Instruction::Pop,
                Instruction::NewObject(ProtoMethodId(77)),
                Instruction::DeclareVariable(Type::Universal, None, ecmac_il::VariableHandle(0)),
                Instruction::StoreVariable(ecmac_il::VariableHandle(0)),
                Instruction::Call(ProtoMethodId(77)),
                Instruction::Pop,
                Instruction::LoadVariable(ecmac_il::VariableHandle(0)),
            ]
        );
    }
}
