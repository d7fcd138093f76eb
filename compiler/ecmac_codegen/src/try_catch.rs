//! `try`/`catch`/`finally` lowering (`spec.md` §4.9 "Try/Catch/Finally"):
//! the three bodies land back to back in the instruction stream with no
//! branch of their own — `ecmac_il::interpret`'s region scanner locates
//! `catch`/`finally` purely by where `BeginCatchBlock`/`BeginFinallyBlock`
//! sit relative to the enclosing `BeginExceptionBlock`/`EndExceptionBlock`
//! pair. The only branch this lowering has to emit by hand is the one that
//! skips over the catch body on ordinary (non-throwing) completion of the
//! try body — the interpreter has no other way to know the try body
//! finished without throwing.

use crate::context::CATCH_ALL_EXCEPTION_TOKEN;
use crate::lowering::Lowering;
use ecmac_diagnostic::CompileError;
use ecmac_il::IlEmitter;
use ecmac_ir::{CatchClause, StmtId, StmtRange};
use ecmac_proto::HostRuntime;
use ecmac_scope::ScopeId;
use ecmac_types::Type;

pub fn generate_try<E: IlEmitter, R: HostRuntime>(
    lowering: &mut Lowering<'_, E, R>,
    scope: ScopeId,
    id: StmtId,
    block: StmtRange,
    catch: Option<CatchClause>,
    finally: Option<StmtRange>,
) -> Result<(), CompileError> {
    lowering.emitter.begin_exception_block();
    lowering.ctx.enter_exception_region();
    lowering.generate_block(scope, block)?;
    lowering.ctx.exit_exception_region();

    if let Some(clause) = catch {
        let skip_catch = lowering.emitter.create_label();
        lowering.emitter.branch(skip_catch);

        lowering.emitter.begin_catch_block(CATCH_ALL_EXCEPTION_TOKEN);
        // Resolution already pushed this clause's own scope while
        // inferring types; reuse that `ScopeId` so the body's already-bound
        // names resolve against the binding the `catch (e)` parameter (if
        // any) was actually declared in.
        let catch_scope = lowering.facts.scope_of(id).unwrap_or(scope);
        match clause.param {
            Some(param) => crate::names::store_name(
                lowering.emitter,
                lowering.ctx,
                lowering.chain,
                lowering.runtime,
                catch_scope,
                param,
                Type::Universal,
                false,
                &lowering.path,
                lowering.source,
                lowering.arena.stmt(id).span,
            )?,
            None => lowering.emitter.pop(),
        }

        lowering.ctx.enter_exception_region();
        lowering.generate_block(catch_scope, clause.body)?;
        lowering.ctx.exit_exception_region();

        lowering.emitter.define_label_position(skip_catch);
    }

    if let Some(finally_body) = finally {
        lowering.emitter.begin_finally_block();
        lowering.generate_block(scope, finally_body)?;
    }

    lowering.emitter.end_exception_block();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CodegenContext;
    use ecmac_dispatch::{FunctionGenerator, GeneratorRegistry, SpecializationCompiler};
    use ecmac_il::{Instruction, RecordingEmitter};
    use ecmac_ir::{Arena, Span, Stmt, StmtKind, StringInterner};
    use ecmac_proto::PrototypeRegistry;
    use ecmac_resolve::ResolvedFacts;
    use ecmac_scope::ScopeChain;
    use ecmac_types::MethodId;
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
    }

    impl SpecializationCompiler for NoopCompiler {
        fn allocate_method_id(&mut self) -> MethodId {
            self.next_id += 1;
            MethodId(self.next_id)
        }
        fn compile_specialization(&mut self, _g: &FunctionGenerator, _m: MethodId, _a: &[Type], _c: bool) -> Result<(), CompileError> {
            Ok(())
        }
    }

    fn path() -> Arc<str> {
        Arc::from("<test>")
    }

    #[test]
    fn a_bare_try_finally_needs_no_branch_over_the_missing_catch() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let block = arena.push_stmts(std::iter::empty::<Stmt>());
        let finally_body = arena.push_stmts(std::iter::empty::<Stmt>());
        let try_stmt = arena.push_stmt(Stmt {
            kind: StmtKind::Try { block, catch: None, finally: Some(finally_body) },
            span: Span::DUMMY,
            labels: vec![],
        });

        let facts = ResolvedFacts::with_capacity(arena.expr_count());
        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let mut lowering = Lowering::new(&mut emitter, &mut ctx, &arena, &interner, &mut chain, &mut runtime, &mut generators, &mut compiler, &facts, path(), "");

        generate_try(&mut lowering, ScopeChain::GLOBAL, try_stmt, block, None, Some(finally_body)).unwrap();

        let instructions = emitter.instructions();
        assert!(matches!(instructions.first(), Some(Instruction::BeginExceptionBlock)));
        assert!(!instructions.iter().any(|i| matches!(i, Instruction::BeginCatchBlock(_))));
        assert!(instructions.iter().any(|i| matches!(i, Instruction::BeginFinallyBlock)));
        assert!(matches!(instructions.last(), Some(Instruction::EndExceptionBlock)));
    }

    #[test]
    fn a_catch_without_a_parameter_pops_the_thrown_value() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let block = arena.push_stmts(std::iter::empty::<Stmt>());
        let catch_body = arena.push_stmts(std::iter::empty::<Stmt>());
        let try_stmt = arena.push_stmt(Stmt {
            kind: StmtKind::Try { block, catch: Some(CatchClause { param: None, body: catch_body }), finally: None },
            span: Span::DUMMY,
            labels: vec![],
        });

        let facts = ResolvedFacts::with_capacity(arena.expr_count());
        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let mut lowering = Lowering::new(&mut emitter, &mut ctx, &arena, &interner, &mut chain, &mut runtime, &mut generators, &mut compiler, &facts, path(), "");

        generate_try(&mut lowering, ScopeChain::GLOBAL, try_stmt, block, Some(CatchClause { param: None, body: catch_body }), None).unwrap();

        let instructions = emitter.instructions();
        let catch_index = instructions.iter().position(|i| matches!(i, Instruction::BeginCatchBlock(_))).unwrap();
        assert!(matches!(instructions[catch_index + 1], Instruction::Pop));
    }
}
