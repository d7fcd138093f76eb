//! The shared handle code generation threads across one specialization's
//! body (`spec.md` §4.9 "GenerateCode"), mirroring
//! [`ecmac_resolve::Resolver`]'s split: this struct holds what's constant
//! for the whole specialization, [`crate::context::CodegenContext`] holds
//! what a nested loop/try temporarily pushes and pops.

use crate::context::CodegenContext;
use ecmac_dispatch::{GeneratorRegistry, SpecializationCompiler};
use ecmac_il::IlEmitter;
use ecmac_ir::{Arena, StringInterner};
use ecmac_proto::HostRuntime;
use ecmac_resolve::ResolvedFacts;
use ecmac_scope::ScopeChain;
use std::sync::Arc;

pub struct Lowering<'a, E: IlEmitter, R: HostRuntime> {
    pub(crate) emitter: &'a mut E,
    pub(crate) ctx: &'a mut CodegenContext,
    pub(crate) arena: &'a Arena,
    pub(crate) interner: &'a StringInterner,
    pub(crate) chain: &'a mut ScopeChain,
    pub(crate) runtime: &'a mut R,
    pub(crate) generators: &'a mut GeneratorRegistry,
    pub(crate) compiler: &'a mut dyn SpecializationCompiler,
    pub(crate) facts: &'a ResolvedFacts,
    pub(crate) path: Arc<str>,
    pub(crate) source: &'a str,
}

impl<'a, E: IlEmitter, R: HostRuntime> Lowering<'a, E, R> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        emitter: &'a mut E,
        ctx: &'a mut CodegenContext,
        arena: &'a Arena,
        interner: &'a StringInterner,
        chain: &'a mut ScopeChain,
        runtime: &'a mut R,
        generators: &'a mut GeneratorRegistry,
        compiler: &'a mut dyn SpecializationCompiler,
        facts: &'a ResolvedFacts,
        path: Arc<str>,
        source: &'a str,
    ) -> Self {
        Lowering { emitter, ctx, arena, interner, chain, runtime, generators, compiler, facts, path, source }
    }

    pub(crate) fn internal_invariant(&self, span: ecmac_ir::Span, message: &str) -> ecmac_diagnostic::CompileError {
        let line = ecmac_diagnostic::line_at(self.source, span.start);
        ecmac_diagnostic::CompileError::internal(message, self.path.clone(), line, span)
    }
}
