//! Owns every [`FunctionGenerator`] for one engine instance, keyed by the
//! same [`MethodId`] a generator's constant value carries
//! (`ecmac_types::Type::Method`/`ecmac_scope::ConstValue::Method`) — the
//! dispatch/call-site resolver's counterpart to
//! `ecmac_proto::PrototypeRegistry`.

use crate::generator::FunctionGenerator;
use ecmac_ir::FunctionId;
use ecmac_scope::ScopeId;
use ecmac_types::MethodId;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct GeneratorRegistry {
    generators: FxHashMap<MethodId, FunctionGenerator>,
    next_id: u64,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh generator identity for a `function` AST node the
    /// first time it is reached by resolution (`spec.md` §4.7 "Function
    /// expression" rule, which creates this generator lazily).
    pub fn create(&mut self, function: FunctionId, closure_scope: ScopeId) -> MethodId {
        self.next_id += 1;
        let id = MethodId(self.next_id);
        self.generators.insert(id, FunctionGenerator::new(id, function, closure_scope));
        id
    }

    pub fn get(&self, id: MethodId) -> Option<&FunctionGenerator> {
        self.generators.get(&id)
    }

    pub fn get_mut(&mut self, id: MethodId) -> Option<&mut FunctionGenerator> {
        self.generators.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_generators_are_addressable_by_their_own_id() {
        let mut registry = GeneratorRegistry::new();
        let id = registry.create(FunctionId(3), ScopeId(0));
        let generator = registry.get(id).unwrap();
        assert_eq!(generator.function, FunctionId(3));
        assert_eq!(generator.id, id);
    }

    #[test]
    fn distinct_creations_get_distinct_ids() {
        let mut registry = GeneratorRegistry::new();
        let a = registry.create(FunctionId(1), ScopeId(0));
        let b = registry.create(FunctionId(2), ScopeId(0));
        assert_ne!(a, b);
    }
}
