//! User-function generators and their specialization cache (`spec.md` §4.8
//! "User-function specialization", §4.12 "a generator's set of compiled
//! specializations").
//!
//! A generator is the compile-time identity of one `function` declaration
//! or expression; each concrete argument-type vector it is called with gets
//! its own compiled method, cached here so a second call with the same
//! vector is free. The actual compilation step lives outside this crate
//! (the code-generation driver, built after this one) and is injected
//! through [`SpecializationCompiler`] — the same "depend on a trait, not a
//! concrete downstream crate" shape `ecmac_proto::HostRuntime` uses to keep
//! the engine/compiler layering acyclic.

use ecmac_diagnostic::CompileError;
use ecmac_ir::FunctionId;
use ecmac_scope::ScopeId;
use ecmac_types::{MethodId, Type};
use rustc_hash::FxHashMap;

/// The compile-time identity of one `function` declaration/expression
/// (`spec.md` §3 "Method cache entry"): which AST node it is, the scope its
/// closure captures run against, and its cache of already-compiled
/// specializations.
pub struct FunctionGenerator {
    pub id: MethodId,
    pub function: FunctionId,
    pub closure_scope: ScopeId,
    specializations: FxHashMap<(Vec<Type>, bool), MethodId>,
}

impl FunctionGenerator {
    pub fn new(id: MethodId, function: FunctionId, closure_scope: ScopeId) -> Self {
        FunctionGenerator { id, function, closure_scope, specializations: FxHashMap::default() }
    }

    /// An existing specialization for this exact `(argument_types,
    /// is_constructor)` key, if one was already compiled.
    pub fn existing_specialization(&self, argument_types: &[Type], is_constructor: bool) -> Option<MethodId> {
        self.specializations.get(&(argument_types.to_vec(), is_constructor)).copied()
    }

    /// `GetCompiled(args, isCtor)` (`spec.md` §4.8): return the cached
    /// specialization for this argument vector, or compile a fresh one.
    /// The fresh entry is registered *before* `compiler` emits its body, so
    /// a function that calls itself recursively with the same argument
    /// vector sees the in-progress entry instead of recursing into a second
    /// compilation.
    pub fn get_compiled(
        &mut self,
        declared_param_count: usize,
        provided_argument_types: &[Type],
        is_constructor: bool,
        compiler: &mut (impl SpecializationCompiler + ?Sized),
    ) -> Result<MethodId, CompileError> {
        let argument_types = normalize_argument_vector(declared_param_count, provided_argument_types);
        if let Some(existing) = self.existing_specialization(&argument_types, is_constructor) {
            return Ok(existing);
        }

        let method = compiler.allocate_method_id();
        self.specializations.insert((argument_types.clone(), is_constructor), method);
        compiler.compile_specialization(self, method, &argument_types, is_constructor)?;
        Ok(method)
    }
}

/// Build the argument-type vector a call site's actual arguments specialize
/// against (`spec.md` §4.8): positions covered by a declared parameter that
/// the caller omitted get the undefined singleton type; positions beyond
/// the declared parameters (absorbed by a spread/`arguments`-style
/// overflow) are kept as-is and become part of the cache key, since a
/// differently-shaped overflow genuinely needs its own specialization.
fn normalize_argument_vector(declared_param_count: usize, provided: &[Type]) -> Vec<Type> {
    if provided.len() >= declared_param_count {
        return provided.to_vec();
    }
    let mut vector = provided.to_vec();
    vector.resize(declared_param_count, Type::Undefined);
    vector
}

/// Injected by the code-generation driver: allocates fresh method handles
/// and compiles one specialization's body. Breaks the dependency cycle
/// between dispatch (which needs a callee compiled before a call site can
/// reference it) and code generation (which needs dispatch to resolve its
/// own call sites).
pub trait SpecializationCompiler {
    fn allocate_method_id(&mut self) -> MethodId;

    fn compile_specialization(
        &mut self,
        generator: &FunctionGenerator,
        method: MethodId,
        argument_types: &[Type],
        is_constructor: bool,
    ) -> Result<(), CompileError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_scope::ScopeChain;
    use std::cell::Cell;

    struct CountingCompiler {
        next_id: u64,
        compiled: Cell<u32>,
    }

    impl SpecializationCompiler for CountingCompiler {
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

    #[test]
    fn repeated_specialization_reuses_the_cached_entry() {
        let mut generator = FunctionGenerator::new(MethodId(0), FunctionId(0), ScopeChain::GLOBAL);
        let mut compiler = CountingCompiler { next_id: 0, compiled: Cell::new(0) };

        let first = generator.get_compiled(1, &[Type::I32], false, &mut compiler).unwrap();
        let second = generator.get_compiled(1, &[Type::I32], false, &mut compiler).unwrap();

        assert_eq!(first, second);
        assert_eq!(compiler.compiled.get(), 1);
    }

    #[test]
    fn different_argument_types_get_distinct_specializations() {
        let mut generator = FunctionGenerator::new(MethodId(0), FunctionId(0), ScopeChain::GLOBAL);
        let mut compiler = CountingCompiler { next_id: 0, compiled: Cell::new(0) };

        let int_specialization = generator.get_compiled(1, &[Type::I32], false, &mut compiler).unwrap();
        let string_specialization = generator.get_compiled(1, &[Type::String], false, &mut compiler).unwrap();

        assert_ne!(int_specialization, string_specialization);
        assert_eq!(compiler.compiled.get(), 2);
    }

    #[test]
    fn missing_trailing_arguments_fill_with_undefined() {
        let mut generator = FunctionGenerator::new(MethodId(0), FunctionId(0), ScopeChain::GLOBAL);
        let mut compiler = CountingCompiler { next_id: 0, compiled: Cell::new(0) };

        generator.get_compiled(2, &[Type::I32], false, &mut compiler).unwrap();
        assert!(generator.existing_specialization(&[Type::I32, Type::Undefined], false).is_some());
    }
}
