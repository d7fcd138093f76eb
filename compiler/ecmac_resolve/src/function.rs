//! Top-level entry points: resolving one function body against a concrete
//! argument-type vector (`spec.md` §3 "Argument-type vector", §4.12
//! "Specialization"), and resolving a whole top-level script.

use crate::context::{MethodHints, ResolveContext};
use crate::facts::ResolvedFacts;
use crate::globals::GlobalEnvironment;
use crate::resolver::Resolver;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{Arena, Function, Name, StmtRange};
use ecmac_proto::HostRuntime;
use ecmac_scope::{ArgumentVariable, ConstantState, Scope, ScopeChain, ScopeId, Variable};
use ecmac_types::{MethodId, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// What resolving one function body establishes about it, handed back to
/// the dispatch/codegen stages (`spec.md` §4.6 "Optimization context"):
/// its inferred return type, the accumulated method hints, and the scope
/// its body was resolved into — codegen walks the same tree afterward and
/// needs this exact `ScopeId` rather than pushing a second, disconnected
/// one of its own.
pub struct FunctionResolution {
    pub return_type: Type,
    pub hints: MethodHints,
    pub encountered_names: FxHashSet<Name>,
    pub scope: ScopeId,
}

/// `ResolveVariables` entry point for one function body, specialized
/// against a concrete `argument_types` vector (`spec.md` §4.7, §4.12).
#[allow(clippy::too_many_arguments)]
pub fn resolve_function(
    arena: &Arena,
    function: &Function,
    argument_types: &[Type],
    parent_scope: ScopeId,
    method_id: Option<MethodId>,
    chain: &mut ScopeChain,
    globals: &mut GlobalEnvironment,
    runtime: &mut impl HostRuntime,
    facts: &mut ResolvedFacts,
    path: Arc<str>,
    source: &str,
    collapse_warning: bool,
) -> Result<FunctionResolution, CompileError> {
    let function_scope = chain.push(Scope::declarative(Some(parent_scope)));
    for (index, &name) in function.params.iter().enumerate() {
        let ty = argument_types.get(index).copied().unwrap_or(Type::Undefined);
        chain.declare_variable(
            function_scope,
            name,
            Variable::Argument(ArgumentVariable {
                index,
                ty,
                constant: ConstantState::Unset,
                changes_properties: FxHashMap::default(),
            }),
        );
    }

    let mut ctx = ResolveContext::new(function_scope, function.is_strict, method_id);
    let mut resolver = Resolver::new(arena, chain, globals, runtime, facts, path, source, collapse_warning);
    resolver.resolve_block(&mut ctx, function.body)?;

    Ok(FunctionResolution {
        return_type: ctx.finish_return_type(),
        hints: ctx.hints,
        encountered_names: ctx.encountered_names,
        scope: function_scope,
    })
}

/// `ResolveVariables` entry point for a source unit's top-level statements:
/// these run directly in the global scope, with no argument vector and no
/// specialization to invalidate on a later collapse (`spec.md` §4.12).
#[allow(clippy::too_many_arguments)]
pub fn resolve_module(
    arena: &Arena,
    body: StmtRange,
    strict: bool,
    chain: &mut ScopeChain,
    globals: &mut GlobalEnvironment,
    runtime: &mut impl HostRuntime,
    facts: &mut ResolvedFacts,
    path: Arc<str>,
    source: &str,
    collapse_warning: bool,
) -> Result<FunctionResolution, CompileError> {
    let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, strict, None);
    let mut resolver = Resolver::new(arena, chain, globals, runtime, facts, path, source, collapse_warning);
    resolver.resolve_block(&mut ctx, body)?;

    Ok(FunctionResolution {
        return_type: ctx.finish_return_type(),
        hints: ctx.hints,
        encountered_names: ctx.encountered_names,
        scope: ScopeChain::GLOBAL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_ir::{DeclKind, Expr, ExprKind, PrimitiveLiteral, Span, Stmt, StmtKind, VarDeclarator};
    use ecmac_proto::PrototypeRegistry;

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

    #[test]
    fn resolving_a_function_that_returns_its_argument_reports_the_argument_type() {
        let mut arena = Arena::new();
        let arg_name = Name(10);
        let name_expr = arena.push_expr(Expr { kind: ExprKind::Name(arg_name), span: Span::DUMMY });
        let body = arena.push_stmts([Stmt { kind: StmtKind::Return(Some(name_expr)), span: Span::DUMMY, labels: vec![] }]);
        let function = Function { name: None, params: vec![arg_name], body, span: Span::DUMMY, is_strict: false };

        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut globals = GlobalEnvironment::new();
        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");

        let resolution = resolve_function(
            &arena,
            &function,
            &[Type::I32],
            ScopeChain::GLOBAL,
            None,
            &mut chain,
            &mut globals,
            &mut runtime,
            &mut facts,
            path,
            "",
            false,
        )
        .unwrap();

        assert_eq!(resolution.return_type, Type::I32);
    }

    #[test]
    fn missing_declaration_at_the_top_level_is_a_global_var_and_loop_body_hoists() {
        let mut arena = Arena::new();
        let value = arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Number(1.0)), span: Span::DUMMY });
        let body = arena.push_stmts([Stmt {
            kind: StmtKind::VarDecl { kind: DeclKind::Var, decls: vec![VarDeclarator { name: Name(1), init: Some(value) }] },
            span: Span::DUMMY,
            labels: vec![],
        }]);

        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut globals = GlobalEnvironment::new();
        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");

        resolve_module(&arena, body, false, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false).unwrap();
        assert!(registry_has_property(&runtime, global, Name(1)));
    }

    fn registry_has_property(runtime: &TestRuntime, prototype: ecmac_types::PrototypeId, name: Name) -> bool {
        runtime.prototypes.resolve_property(prototype, name).is_some()
    }
}
