//! The resolve-then-codegen entry point (`spec.md` §4.12 "Specialization"):
//! owns the engine-wide state one compile walks through exactly once —
//! scope chain, global table, generator registry, prototype registry — and
//! drives every specialization `ecmac_dispatch` discovers along the way to
//! a finished [`ecmac_il::Program`].
//!
//! [`Driver::compile_module`] resolves and lowers the top-level script body
//! first; lowering a call site may ask [`ecmac_dispatch`] to specialize a
//! user function, which asks this crate (via [`SpecializationCompiler`]) to
//! compile one. That can't happen *inside* the top-level body's own
//! [`Lowering`] — its constructor already borrows `chain`/`runtime`/
//! `generators` mutably, and a second, nested `Lowering` for the callee's
//! body would need the exact same fields borrowed again. [`SpecializationQueue`]
//! breaks the cycle: `compile_specialization` only records the request,
//! and [`Driver::drain_pending`] works through the queue afterward, one
//! item at a time, with nothing else borrowing `self`.

use crate::context::CodegenContext;
use crate::lowering::Lowering;
use ecmac_diagnostic::CompileError;
use ecmac_dispatch::{FunctionGenerator, GeneratorRegistry, SpecializationCompiler};
use ecmac_il::{IlEmitter, Program, RecordingEmitter};
use ecmac_ir::{Arena, StmtRange, StringInterner};
use ecmac_proto::HostRuntime;
use ecmac_resolve::{resolve_function, resolve_module, GlobalEnvironment, ResolvedFacts};
use ecmac_scope::ScopeChain;
use ecmac_types::{MethodId, Type};
use std::sync::Arc;

/// Method ids this driver hands out itself (the top-level entry, and every
/// specialization `compile_specialization` defers) live above this offset,
/// keeping them out of the low range [`GeneratorRegistry`] hands out for
/// generator identities — the two counters are independent, and
/// `ecmac_dispatch::call_site::resolve_callable` tells them apart only by
/// whether a `MethodId` happens to be a registered generator, so the two
/// ranges must never overlap.
pub const SPECIALIZATION_ID_BASE: u64 = 1 << 32;

struct PendingSpecialization {
    generator_id: MethodId,
    method: MethodId,
    argument_types: Vec<Type>,
    is_constructor: bool,
}

/// The half of [`Driver`] that implements [`SpecializationCompiler`] —
/// split into its own struct purely so it borrows disjointly from
/// `chain`/`runtime`/`generators` when [`Lowering::new`] needs both at
/// once (see the module doc comment).
#[derive(Default)]
struct SpecializationQueue {
    pending: Vec<PendingSpecialization>,
    next_id: u64,
}

impl SpecializationCompiler for SpecializationQueue {
    fn allocate_method_id(&mut self) -> MethodId {
        if self.next_id == 0 {
            self.next_id = SPECIALIZATION_ID_BASE;
        }
        self.next_id += 1;
        MethodId(self.next_id)
    }

    fn compile_specialization(
        &mut self,
        generator: &FunctionGenerator,
        method: MethodId,
        argument_types: &[Type],
        is_constructor: bool,
    ) -> Result<(), CompileError> {
        self.pending.push(PendingSpecialization {
            generator_id: generator.id,
            method,
            argument_types: argument_types.to_vec(),
            is_constructor,
        });
        Ok(())
    }
}

/// Resolves and lowers one source unit against a concrete [`HostRuntime`],
/// producing an [`ecmac_il::Program`] ready for
/// [`ecmac_il::interpret`] (`spec.md` §4.12).
pub struct Driver<R: HostRuntime> {
    arena: Arc<Arena>,
    interner: Arc<StringInterner>,
    chain: ScopeChain,
    globals: GlobalEnvironment,
    runtime: R,
    generators: GeneratorRegistry,
    facts: ResolvedFacts,
    queue: SpecializationQueue,
    program: Program,
    path: Arc<str>,
    source: String,
    collapse_warning: bool,
}

impl<R: HostRuntime> Driver<R> {
    /// `runtime` must not have created a global prototype yet — this
    /// constructor creates it and wires `ScopeChain::GLOBAL` to it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        arena: Arc<Arena>,
        interner: Arc<StringInterner>,
        mut runtime: R,
        path: Arc<str>,
        source: String,
        collapse_warning: bool,
    ) -> Self {
        let global_prototype = runtime.prototypes_mut().create(None);
        let facts = ResolvedFacts::with_capacity(arena.expr_count());
        Driver {
            arena,
            interner,
            chain: ScopeChain::new(global_prototype),
            globals: GlobalEnvironment::new(),
            runtime,
            generators: GeneratorRegistry::new(),
            facts,
            queue: SpecializationQueue::default(),
            program: Program::new(),
            path,
            source,
            collapse_warning,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Resolve and lower a top-level script body, then drain every
    /// specialization discovered along the way. Returns the finished
    /// program plus the entry method to hand to [`ecmac_il::interpret`].
    pub fn compile_module(mut self, body: StmtRange, strict: bool) -> Result<(Program, MethodId), CompileError> {
        resolve_module(
            &self.arena,
            body,
            strict,
            &mut self.chain,
            &mut self.globals,
            &mut self.runtime,
            &mut self.facts,
            self.path.clone(),
            &self.source,
            self.collapse_warning,
        )?;

        let entry = self.queue.allocate_method_id();
        self.lower_body(ScopeChain::GLOBAL, body, 0, entry)?;
        self.drain_pending()?;
        Ok((self.program, entry))
    }

    /// Lower one already-resolved body (the module body or a specialized
    /// function body) into a fresh instruction stream and register it under
    /// `method`. Sets the return target (`spec.md` §4.9 "Return") before
    /// lowering — a `return` anywhere in `body`, including nested inside a
    /// `try`, stores through this slot and exits through this label.
    fn lower_body(&mut self, scope: ecmac_scope::ScopeId, body: StmtRange, arity: usize, method: MethodId) -> Result<(), CompileError> {
        let mut emitter = RecordingEmitter::default();
        let mut ctx = CodegenContext::new();
        let return_slot = emitter.declare_variable(Type::Universal, None);
        let exit_label = emitter.create_label();
        ctx.set_return_target(return_slot, exit_label);

        {
            let mut lowering = Lowering::new(
                &mut emitter,
                &mut ctx,
                &self.arena,
                &self.interner,
                &mut self.chain,
                &mut self.runtime,
                &mut self.generators,
                &mut self.queue,
                &self.facts,
                self.path.clone(),
                &self.source,
            );
            lowering.generate_block(scope, body)?;
        }

        emitter.define_label_position(exit_label);
        emitter.load_variable(return_slot);
        emitter.complete();
        self.program.define(method, arity, emitter.instructions().to_vec());
        Ok(())
    }

    /// Compile every specialization [`SpecializationCompiler::compile_specialization`]
    /// enqueued while lowering `body` above, and every further one *that*
    /// lowering in turn discovers — hence the `while`, not a single pass.
    fn drain_pending(&mut self) -> Result<(), CompileError> {
        while let Some(item) = self.queue.pending.pop() {
            let generator = self.generators.get(item.generator_id).ok_or_else(|| {
                CompileError::internal(
                    "a pending specialization referenced a generator id with no registered function",
                    self.path.clone(),
                    0,
                    ecmac_ir::Span::DUMMY,
                )
            })?;
            let function_id = generator.function;
            let closure_scope = generator.closure_scope;
            let function = self.arena.function(function_id);

            let resolution = resolve_function(
                &self.arena,
                function,
                &item.argument_types,
                closure_scope,
                Some(item.method),
                &mut self.chain,
                &mut self.globals,
                &mut self.runtime,
                &mut self.facts,
                self.path.clone(),
                &self.source,
                self.collapse_warning,
            )?;

            let arity = function.params.len();
            let body = function.body;
            let _ = item.is_constructor;
            self.lower_body(resolution.scope, body, arity, item.method)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_il::{interpret, Value};
    use ecmac_ir::{Expr, ExprKind, PrimitiveLiteral, Span, Stmt, StmtKind};
    use ecmac_proto::PrototypeRegistry;

    #[derive(Default)]
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

    #[test]
    fn a_top_level_return_statement_is_reachable_through_the_driver() {
        let mut arena = Arena::new();
        let literal = arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Number(1.0)), span: Span::DUMMY });
        let body = arena.push_stmts([Stmt { kind: StmtKind::Return(Some(literal)), span: Span::DUMMY, labels: vec![] }]);

        let driver = Driver::new(Arc::new(arena), Arc::new(StringInterner::new()), TestRuntime::default(), Arc::from("<test>"), String::new(), false);
        let (program, entry) = driver.compile_module(body, false).unwrap();

        let result = interpret(&program, entry, &[]).unwrap();
        match result {
            Value::F64(n) => assert_eq!(n, 1.0),
            other => panic!("expected a numeric return value, got {other:?}"),
        }
    }
}
