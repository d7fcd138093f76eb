//! Statement resolution (`spec.md` §4.7 "Statement resolution", §4.9
//! "Control flow" for the dead-branch bookkeeping a constant `if` leaves
//! behind).

use crate::context::{is_truthy, MethodHints, ResolveContext};
use crate::names::write_name;
use crate::resolver::Resolver;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{DeclKind, ForInit, Name, StmtId, StmtKind, StmtRange, VarDeclarator};
use ecmac_proto::HostRuntime;
use ecmac_scope::{ConstValue, ConstantState, DeclaredVariable, Scope, Variable};
use ecmac_types::Type;

impl<'a, R: HostRuntime> Resolver<'a, R> {
    pub fn resolve_block(&mut self, ctx: &mut ResolveContext, range: StmtRange) -> Result<(), CompileError> {
        for id in self.arena.stmt_ids(range).collect::<Vec<_>>() {
            self.resolve_stmt(ctx, id)?;
        }
        Ok(())
    }

    pub fn resolve_stmt(&mut self, ctx: &mut ResolveContext, id: StmtId) -> Result<(), CompileError> {
        let stmt = self.arena.stmt(id);
        let span = stmt.span;
        let kind = stmt.kind.clone();
        match kind {
            StmtKind::Block(range) => self.resolve_block(ctx, range)?,

            StmtKind::Expression(e) => {
                self.infer_expr(ctx, e)?;
            }

            StmtKind::VarDecl { kind, decls } => self.resolve_var_decl(ctx, kind, &decls)?,

            StmtKind::If { cond, then_branch, else_branch } => {
                self.infer_expr(ctx, cond)?;
                match self.facts.constant_of(cond).copied() {
                    Some(c) if is_truthy(&c) => {
                        self.resolve_stmt(ctx, then_branch)?;
                        if let Some(dead) = else_branch {
                            self.facts.mark_dead(dead);
                        }
                    }
                    Some(_) => {
                        self.facts.mark_dead(then_branch);
                        if let Some(e) = else_branch {
                            self.resolve_stmt(ctx, e)?;
                        }
                    }
                    None => {
                        self.resolve_stmt(ctx, then_branch)?;
                        if let Some(e) = else_branch {
                            self.resolve_stmt(ctx, e)?;
                        }
                    }
                }
            }

            StmtKind::While { cond, body } => {
                self.infer_expr(ctx, cond)?;
                self.resolve_stmt(ctx, body)?;
            }

            StmtKind::DoWhile { body, cond } => {
                self.resolve_stmt(ctx, body)?;
                self.infer_expr(ctx, cond)?;
            }

            StmtKind::For { init, cond, update, body } => {
                match init {
                    ForInit::Expr(e) => {
                        self.infer_expr(ctx, e)?;
                    }
                    ForInit::VarDecl { kind, decls } => self.resolve_var_decl(ctx, kind, &decls)?,
                    ForInit::None => {}
                }
                if let Some(c) = cond {
                    self.infer_expr(ctx, c)?;
                }
                if let Some(u) = update {
                    self.infer_expr(ctx, u)?;
                }
                self.resolve_stmt(ctx, body)?;
            }

            StmtKind::ForIn { lhs_name, declares, object, body } => {
                self.infer_expr(ctx, object)?;
                self.bind_loop_variable(ctx, lhs_name, declares, Type::String, span)?;
                self.resolve_stmt(ctx, body)?;
            }

            StmtKind::ForOf { lhs_name, declares, iterable, body } => {
                self.infer_expr(ctx, iterable)?;
                self.bind_loop_variable(ctx, lhs_name, declares, Type::Universal, span)?;
                self.resolve_stmt(ctx, body)?;
            }

            StmtKind::Switch { discriminant, cases } => {
                self.infer_expr(ctx, discriminant)?;
                for case in cases {
                    if let Some(test) = case.test {
                        self.infer_expr(ctx, test)?;
                    }
                    self.resolve_block(ctx, case.body)?;
                }
            }

            StmtKind::Try { block, catch, finally } => {
                self.resolve_block(ctx, block)?;
                if let Some(clause) = catch {
                    let catch_scope = self.chain.push(Scope::catch(Some(ctx.scope)));
                    self.facts.record_scope(id, catch_scope);
                    let saved = ctx.scope;
                    ctx.scope = catch_scope;
                    if let Some(param) = clause.param {
                        self.declare(ctx, param, Type::Universal, None, false);
                    }
                    self.resolve_block(ctx, clause.body)?;
                    ctx.scope = saved;
                }
                if let Some(finally_body) = finally {
                    self.resolve_block(ctx, finally_body)?;
                }
            }

            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty | StmtKind::Debugger => {}

            StmtKind::Return(value) => {
                let ty = match value {
                    Some(e) => self.infer_expr(ctx, e)?,
                    None => Type::Undefined,
                };
                if ctx.accumulate_return(ty) {
                    self.log_return_collapse();
                }
            }

            StmtKind::Throw(e) => {
                self.infer_expr(ctx, e)?;
            }

            StmtKind::With { object, body } => {
                let object_ty = self.infer_expr(ctx, object)?;
                if let Type::Instance(prototype) = object_ty {
                    let with_scope = self.chain.push(Scope::with(Some(ctx.scope), prototype));
                    self.facts.record_scope(id, with_scope);
                    let saved = ctx.scope;
                    ctx.scope = with_scope;
                    self.resolve_stmt(ctx, body)?;
                    ctx.scope = saved;
                } else {
                    self.resolve_stmt(ctx, body)?;
                }
            }

            StmtKind::FunctionDecl(_function_id) => {
                ctx.hints |= MethodHints::CONTAINS_NESTED_FUNCTION;
            }
        }
        Ok(())
    }

    fn resolve_var_decl(
        &mut self,
        ctx: &mut ResolveContext,
        kind: DeclKind,
        decls: &[VarDeclarator],
    ) -> Result<(), CompileError> {
        for decl in decls {
            let (ty, constant) = match decl.init {
                Some(e) => (self.infer_expr(ctx, e)?, self.facts.constant_of(e).copied()),
                None => (Type::Undefined, Some(ConstValue::Undefined)),
            };
            self.declare(ctx, decl.name, ty, constant, kind != DeclKind::Var);
        }
        Ok(())
    }

    /// `for (lhs in/of ...)`: a bare identifier writes through the existing
    /// binding; `for (var/let/const lhs in/of ...)` declares a fresh one
    /// (`spec.md` §4.2 grammar for `ForInStatement`/`ForOfStatement`).
    fn bind_loop_variable(
        &mut self,
        ctx: &mut ResolveContext,
        name: Name,
        declares: bool,
        ty: Type,
        span: ecmac_ir::Span,
    ) -> Result<(), CompileError> {
        if declares {
            self.declare(ctx, name, ty, None, false);
        } else if write_name(name, ty, span, &self.path, self.source, ctx, self.chain, self.globals, self.runtime)? {
            self.log_collapse("variable", name);
        }
        Ok(())
    }

    /// `DeclareVariable`/`ApplyType` for a `var`/`let`/`const`/catch-param
    /// binding (`spec.md` §4.6 "Hoisting", §4.7 point 3): widen an existing
    /// binding in place, or declare a fresh one in the nearest scope that
    /// accepts declarations.
    fn declare(&mut self, ctx: &mut ResolveContext, name: Name, ty: Type, constant: Option<ConstValue>, block_scoped: bool) {
        let target = if block_scoped { ctx.scope } else { self.chain.nearest_declaring_scope(ctx.scope) };

        // The global scope is an object scope (`spec.md` §4.6): a `var`
        // hoisted all the way out to it is really `AddProperty` on the
        // global prototype, tracked through `GlobalEnvironment` rather than
        // a declarative scope's variable map.
        if let Some(prototype) = self.chain.prototype_of(target) {
            let collapsed_users = self.globals.apply_type(name, ty, self.runtime.prototypes_mut(), prototype, ctx.current_method);
            if !collapsed_users.is_empty() {
                self.log_collapse("global", name);
            }
            if let Some(c) = constant {
                self.globals.try_set_constant(name, c);
            }
            return;
        }

        let declared_update = if let Some(Variable::Declared(existing)) = self.chain.get_mut(target).own_variable_mut(name) {
            let collapsed = matches!(existing.ty, Some(t) if t != ty);
            existing.ty = Some(match existing.ty {
                Some(t) if t == ty => t,
                Some(_) => Type::Universal,
                None => ty,
            });
            if let Some(c) = constant {
                existing.constant.try_set(c);
            }
            Some(collapsed)
        } else {
            None
        };
        if let Some(collapsed) = declared_update {
            if collapsed {
                self.log_collapse("variable", name);
            }
        } else {
            let var = Variable::Declared(DeclaredVariable {
                ty: Some(ty),
                slot: None,
                constant: constant.map(ConstantState::Value).unwrap_or(ConstantState::Unset),
                initialized: true,
            });
            self.chain.declare_variable(target, name, var);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::ResolvedFacts;
    use crate::globals::GlobalEnvironment;
    use ecmac_ir::{Arena, Expr, ExprKind, PrimitiveLiteral, Span, Stmt};
    use ecmac_proto::PrototypeRegistry;
    use ecmac_scope::ScopeChain;
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

    fn setup() -> (Arena, ScopeChain, TestRuntime, GlobalEnvironment) {
        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        (Arena::new(), ScopeChain::new(global), TestRuntime { prototypes: registry }, GlobalEnvironment::new())
    }

    #[test]
    fn constant_false_if_marks_the_then_branch_dead() {
        let (mut arena, mut chain, mut runtime, mut globals) = setup();
        let cond =
            arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Boolean(false)), span: Span::DUMMY });
        let then_branch = arena.push_stmt(Stmt { kind: StmtKind::Empty, span: Span::DUMMY, labels: vec![] });
        let else_branch = arena.push_stmt(Stmt { kind: StmtKind::Empty, span: Span::DUMMY, labels: vec![] });
        let if_stmt = arena.push_stmt(Stmt {
            kind: StmtKind::If { cond, then_branch, else_branch: Some(else_branch) },
            span: Span::DUMMY,
            labels: vec![],
        });

        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");
        let mut resolver = Resolver::new(&arena, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false);
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);
        resolver.resolve_stmt(&mut ctx, if_stmt).unwrap();

        assert!(facts.is_dead(then_branch));
        assert!(!facts.is_dead(else_branch));
    }

    #[test]
    fn var_declared_inside_a_nested_block_hoists_to_the_function_scope() {
        let (mut arena, mut chain, mut runtime, mut globals) = setup();
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        let value = arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Number(1.0)), span: Span::DUMMY });
        let decl = arena.push_stmt(Stmt {
            kind: StmtKind::VarDecl {
                kind: DeclKind::Var,
                decls: vec![VarDeclarator { name: Name(3), init: Some(value) }],
            },
            span: Span::DUMMY,
            labels: vec![],
        });

        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");
        let mut resolver = Resolver::new(&arena, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false);
        let mut ctx = ResolveContext::new(function_scope, false, None);
        resolver.resolve_stmt(&mut ctx, decl).unwrap();

        assert!(resolver.chain.get(function_scope).own_variable(Name(3)).is_some());
    }

    #[test]
    fn with_statement_records_the_scope_it_pushed() {
        let (mut arena, mut chain, mut runtime, mut globals) = setup();
        let empty_body = arena.push_stmts(std::iter::empty::<Stmt>());
        let function_id = arena.push_function(ecmac_ir::Function {
            name: None,
            params: vec![],
            body: empty_body,
            span: Span::DUMMY,
            is_strict: false,
        });
        let object = arena.push_expr(Expr { kind: ExprKind::Function(function_id), span: Span::DUMMY });
        let body = arena.push_stmt(Stmt { kind: StmtKind::Empty, span: Span::DUMMY, labels: vec![] });
        let with_stmt =
            arena.push_stmt(Stmt { kind: StmtKind::With { object, body }, span: Span::DUMMY, labels: vec![] });

        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");
        let mut resolver = Resolver::new(&arena, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false);
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);
        resolver.resolve_stmt(&mut ctx, with_stmt).unwrap();

        assert!(facts.scope_of(with_stmt).is_some());
        assert_ne!(facts.scope_of(with_stmt), Some(ScopeChain::GLOBAL));
    }
}
