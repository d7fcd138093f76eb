//! Per-statement code generation (`spec.md` §4.9 "GenerateCode", statement
//! variants): control flow lowers to the label/branch primitives
//! [`ecmac_il::IlEmitter`] exposes, mirroring the shape
//! `ecmac_resolve::stmt` already walks for type inference over the same
//! tree, minus the dead-branch/hoisting bookkeeping that pass already did.

use crate::context::LoopFrame;
use crate::loops::{generate_do_while, generate_for, generate_for_in, generate_for_of, generate_while};
use crate::lowering::Lowering;
use ecmac_diagnostic::CompileError;
use ecmac_il::IlEmitter;
use ecmac_ir::{ForInit, Name, StmtId, StmtKind, StmtRange, VarDeclarator};
use ecmac_proto::{Callable, HostRuntime};
use ecmac_scope::ScopeId;
use ecmac_types::Type;

impl<'a, E: IlEmitter, R: HostRuntime> Lowering<'a, E, R> {
    pub fn generate_block(&mut self, scope: ScopeId, range: StmtRange) -> Result<(), CompileError> {
        for id in self.arena.stmt_ids(range).collect::<Vec<_>>() {
            self.generate_stmt(scope, id)?;
        }
        Ok(())
    }

    pub fn generate_stmt(&mut self, scope: ScopeId, id: StmtId) -> Result<(), CompileError> {
        let stmt = self.arena.stmt(id).clone();
        if self.facts.is_dead(id) {
            return Ok(());
        }
        let label = stmt.labels.last().copied();
        let span = stmt.span;
        match stmt.kind {
            StmtKind::Block(range) => self.generate_block(scope, range),
            StmtKind::Expression(e) => self.generate_expr_for_effect(scope, e),
            StmtKind::VarDecl { decls, .. } => self.generate_var_decl(scope, &decls),
            StmtKind::If { cond, then_branch, else_branch } => self.generate_if(scope, cond, then_branch, else_branch),
            StmtKind::While { cond, body } => generate_while(self, scope, label, cond, body),
            StmtKind::DoWhile { body, cond } => generate_do_while(self, scope, label, body, cond),
            StmtKind::For { init, cond, update, body } => self.generate_for_stmt(scope, label, init, cond, update, body),
            StmtKind::ForIn { lhs_name, declares, object, body } => {
                generate_for_in(self, scope, label, lhs_name, declares, object, body)
            }
            StmtKind::ForOf { lhs_name, declares, iterable, body } => {
                generate_for_of(self, scope, label, lhs_name, declares, iterable, body)
            }
            StmtKind::Switch { discriminant, cases } => self.generate_switch(scope, label, discriminant, &cases),
            StmtKind::Try { block, catch, finally } => crate::try_catch::generate_try(self, scope, id, block, catch, finally),
            StmtKind::Break(target) => self.generate_break(span, target),
            StmtKind::Continue(target) => self.generate_continue(span, target),
            StmtKind::Return(value) => self.generate_return(scope, value, span),
            StmtKind::Throw(e) => {
                self.generate_expr(scope, e)?;
                self.convert_to(self.facts.type_of(e), Type::Universal);
                self.emitter.throw();
                Ok(())
            }
            StmtKind::With { object, body } => self.generate_with(scope, id, object, body),
            StmtKind::Empty | StmtKind::Debugger => Ok(()),
            StmtKind::FunctionDecl(function_id) => self.generate_function_decl(scope, function_id),
        }
    }

    fn generate_var_decl(&mut self, scope: ScopeId, decls: &[VarDeclarator]) -> Result<(), CompileError> {
        for decl in decls {
            let Some(init) = decl.init else { continue };
            let value_ty = self.facts.type_of(init);
            self.generate_expr(scope, init)?;
            let span = self.arena.expr(init).span;
            let target_ty = self.target_type_of(scope, decl.name, span)?;
            self.convert_to(value_ty, target_ty);
            crate::names::store_name(self.emitter, self.ctx, self.chain, self.runtime, scope, decl.name, target_ty, false, &self.path, self.source, span)?;
        }
        Ok(())
    }

    /// `var`/`let`/`const` without an initializer never reaches codegen
    /// (`spec.md` §4.9 skips `GenerateSet` entirely when there's nothing to
    /// store), but the declared type an initialized sibling stores against
    /// is whatever resolution widened the binding to — read straight back
    /// off the scope chain rather than re-deriving it here.
    fn target_type_of(&mut self, scope: ScopeId, name: Name, span: ecmac_ir::Span) -> Result<Type, CompileError> {
        let owner = self.chain.resolve(scope, name, self.runtime).ok_or_else(|| self.internal_invariant(span, "a var-decl target was never bound by resolution"))?;
        if let Some(prototype) = self.chain.prototype_of(owner) {
            return Ok(self.runtime.prototypes().resolve_property(prototype, name).map(|p| p.ty).unwrap_or(Type::Universal));
        }
        match self.chain.get(owner).own_variable(name) {
            Some(ecmac_scope::Variable::Declared(declared)) => Ok(declared.ty.unwrap_or(Type::Universal)),
            _ => Ok(Type::Universal),
        }
    }

    fn generate_if(&mut self, scope: ScopeId, cond: ecmac_ir::ExprId, then_branch: StmtId, else_branch: Option<StmtId>) -> Result<(), CompileError> {
        if self.facts.is_dead(then_branch) {
            return match else_branch {
                Some(e) => self.generate_stmt(scope, e),
                None => Ok(()),
            };
        }
        if let Some(e) = else_branch {
            if self.facts.is_dead(e) {
                self.generate_expr_for_effect(scope, cond)?;
                return self.generate_stmt(scope, then_branch);
            }
        }

        self.generate_expr(scope, cond)?;
        self.emitter.convert_to_bool();
        let else_label = self.emitter.create_label();
        self.emitter.branch_if_false(else_label);
        self.generate_stmt(scope, then_branch)?;
        match else_branch {
            None => self.emitter.define_label_position(else_label),
            Some(e) => {
                let end = self.emitter.create_label();
                self.emitter.branch(end);
                self.emitter.define_label_position(else_label);
                self.generate_stmt(scope, e)?;
                self.emitter.define_label_position(end);
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn generate_for_stmt(&mut self, scope: ScopeId, label: Option<Name>, init: ForInit, cond: Option<ecmac_ir::ExprId>, update: Option<ecmac_ir::ExprId>, body: StmtId) -> Result<(), CompileError> {
        match init {
            ForInit::Expr(e) => self.generate_expr_for_effect(scope, e)?,
            ForInit::VarDecl { decls, .. } => self.generate_var_decl(scope, &decls)?,
            ForInit::None => {}
        }
        generate_for(self, scope, label, cond, update, body)
    }

    fn generate_switch(&mut self, scope: ScopeId, label: Option<Name>, discriminant: ecmac_ir::ExprId, cases: &[ecmac_ir::SwitchCase]) -> Result<(), CompileError> {
        self.generate_expr(scope, discriminant)?;
        let discriminant_ty = self.facts.type_of(discriminant);
        let holder = self.emitter.create_temporary_variable(discriminant_ty);
        self.emitter.store_variable(holder);

        let break_label = self.emitter.create_label();
        self.ctx.push_loop(LoopFrame { label, continue_label: break_label, break_label, is_switch: true });

        let mut case_labels = Vec::with_capacity(cases.len());
        let mut default_label = None;
        for case in cases {
            let target = self.emitter.create_label();
            case_labels.push(target);
            if case.test.is_none() {
                default_label = Some(target);
            }
        }

        for (case, &target) in cases.iter().zip(&case_labels) {
            if let Some(test) = case.test {
                self.emitter.load_variable(holder);
                self.generate_expr(scope, test)?;
                self.emitter.call(R::strict_equals_method());
                self.emitter.convert_to_bool();
                self.emitter.branch_if_true(target);
            }
        }
        self.emitter.branch(default_label.unwrap_or(break_label));

        for (case, &target) in cases.iter().zip(&case_labels) {
            self.emitter.define_label_position(target);
            self.generate_block(scope, case.body)?;
        }

        self.emitter.define_label_position(break_label);
        self.ctx.pop_loop();
        self.emitter.release_temporary_variable(holder);
        Ok(())
    }

    fn generate_break(&mut self, span: ecmac_ir::Span, target: Option<Name>) -> Result<(), CompileError> {
        let frame = self.ctx.find_loop(target).ok_or_else(|| self.internal_invariant(span, "a break statement had no enclosing loop/switch target"))?;
        self.emit_exit(frame.break_label);
        Ok(())
    }

    fn generate_continue(&mut self, span: ecmac_ir::Span, target: Option<Name>) -> Result<(), CompileError> {
        let frame = self.ctx.find_continue_target(target).ok_or_else(|| self.internal_invariant(span, "a continue statement had no enclosing loop target"))?;
        self.emit_exit(frame.continue_label);
        Ok(())
    }

    fn generate_return(&mut self, scope: ScopeId, value: Option<ecmac_ir::ExprId>, span: ecmac_ir::Span) -> Result<(), CompileError> {
        let (slot, label) = self.ctx.return_target().ok_or_else(|| self.internal_invariant(span, "a return statement was lowered outside any specialization's return target"))?;
        match value {
            Some(e) => {
                self.generate_expr(scope, e)?;
                self.convert_to(self.facts.type_of(e), Type::Universal);
            }
            None => self.push_undefined(Type::Universal)?,
        }
        self.emitter.store_variable(slot);
        self.emit_exit(label);
        Ok(())
    }

    /// Branch to `label` directly, or through the exception-safe `Leave`
    /// form when the exit crosses at least one `try` boundary (`spec.md`
    /// §4.9: every intervening `finally` must still run on the way out).
    fn emit_exit(&mut self, label: ecmac_il::LabelId) {
        if self.ctx.in_exception_region() {
            self.emitter.leave(label);
        } else {
            self.emitter.branch(label);
        }
    }

    fn generate_with(&mut self, scope: ScopeId, id: StmtId, object: ecmac_ir::ExprId, body: StmtId) -> Result<(), CompileError> {
        let object_ty = self.facts.type_of(object);
        self.generate_expr(scope, object)?;
        let Type::Instance(_) = object_ty else {
            self.emitter.pop();
            return self.generate_stmt(scope, body);
        };
        let handle = self.emitter.create_temporary_variable(Type::Universal);
        self.emitter.store_variable(handle);

        // Resolution already pushed this block's object scope while
        // inferring types over the same tree; reuse that `ScopeId` rather
        // than pushing a second, disconnected one that none of the body's
        // already-resolved names actually point at.
        let with_scope = self.facts.scope_of(id).unwrap_or(scope);
        self.ctx.bind_with_object(with_scope, handle);
        self.generate_stmt(with_scope, body)?;
        self.emitter.release_temporary_variable(handle);
        Ok(())
    }

    fn generate_function_decl(&mut self, scope: ScopeId, function_id: ecmac_ir::FunctionId) -> Result<(), CompileError> {
        let function = self.arena.function(function_id);
        let Some(name) = function.name else {
            return Ok(());
        };
        let generator_id = self.generators.create(function_id, scope);
        let prototype = self.runtime.prototypes_mut().create(None);
        let proto = self.runtime.prototypes_mut().get_mut(prototype);
        proto.on_call = Some(Callable::Method(generator_id));
        proto.on_construct = Some(Callable::Method(generator_id));

        self.emitter.new_object(generator_id);
        let span = function.span;
        crate::names::store_name(self.emitter, self.ctx, self.chain, self.runtime, scope, name, Type::Instance(prototype), false, &self.path, self.source, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CodegenContext;
    use ecmac_dispatch::{GeneratorRegistry, SpecializationCompiler};
    use ecmac_il::RecordingEmitter;
    use ecmac_ir::{Arena, Expr, ExprKind, PrimitiveLiteral, Span, Stmt, StringInterner};
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
        fn compile_specialization(
            &mut self,
            _generator: &ecmac_dispatch::FunctionGenerator,
            _method: MethodId,
            _argument_types: &[Type],
            _is_constructor: bool,
        ) -> Result<(), CompileError> {
            Ok(())
        }
    }

    fn path() -> Arc<str> {
        Arc::from("<test>")
    }

    #[test]
    fn a_dead_if_branch_is_elided_entirely() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let cond = arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Boolean(false)), span: Span::DUMMY });
        let then_branch = arena.push_stmt(Stmt { kind: StmtKind::Debugger, span: Span::DUMMY, labels: vec![] });
        let if_stmt = arena.push_stmt(Stmt { kind: StmtKind::If { cond, then_branch, else_branch: None }, span: Span::DUMMY, labels: vec![] });

        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        facts.mark_dead(then_branch);

        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let mut lowering = Lowering::new(&mut emitter, &mut ctx, &arena, &interner, &mut chain, &mut runtime, &mut generators, &mut compiler, &facts, path(), "");

        lowering.generate_stmt(ScopeChain::GLOBAL, if_stmt).unwrap();

        assert!(emitter.instructions().is_empty());
    }

    #[test]
    fn a_break_outside_any_loop_is_an_internal_error() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let break_stmt = arena.push_stmt(Stmt { kind: StmtKind::Break(None), span: Span::DUMMY, labels: vec![] });

        let facts = ResolvedFacts::with_capacity(arena.expr_count());
        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let mut lowering = Lowering::new(&mut emitter, &mut ctx, &arena, &interner, &mut chain, &mut runtime, &mut generators, &mut compiler, &facts, path(), "");

        let err = lowering.generate_stmt(ScopeChain::GLOBAL, break_stmt).unwrap_err();
        assert_eq!(err.kind, ecmac_diagnostic::ErrorKind::Internal);
    }

    #[test]
    fn an_empty_statement_emits_nothing() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let mut arena = Arena::new();
        let empty = arena.push_stmt(Stmt { kind: StmtKind::Empty, span: Span::DUMMY, labels: vec![] });

        let facts = ResolvedFacts::with_capacity(arena.expr_count());
        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let mut lowering = Lowering::new(&mut emitter, &mut ctx, &arena, &interner, &mut chain, &mut runtime, &mut generators, &mut compiler, &facts, path(), "");

        lowering.generate_stmt(ScopeChain::GLOBAL, empty).unwrap();
        assert!(emitter.instructions().is_empty());
    }

    #[test]
    fn target_type_of_reads_a_globals_own_narrowed_property_type() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let name = Name(1);
        registry.get_mut(global).add_property(name, Type::I32, ecmac_proto::PropertyAttributes::default());
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut generators = GeneratorRegistry::new();
        let mut compiler = NoopCompiler { next_id: 0 };

        let arena = Arena::new();
        let facts = ResolvedFacts::with_capacity(arena.expr_count());
        let interner = StringInterner::new();
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let mut lowering = Lowering::new(&mut emitter, &mut ctx, &arena, &interner, &mut chain, &mut runtime, &mut generators, &mut compiler, &facts, path(), "");

        let ty = lowering.target_type_of(ScopeChain::GLOBAL, name, Span::DUMMY).unwrap();
        assert_eq!(ty, Type::I32);
    }
}
