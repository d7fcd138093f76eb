//! Declarative and object scopes (`spec.md` §4.6 "Scope chain").

use crate::variable::Variable;
use ecmac_ir::Name;
use ecmac_proto::HostRuntime;
use ecmac_types::PrototypeId;
use rustc_hash::FxHashMap;

/// A scope's identity in a [`ScopeChain`]'s arena, cheap to copy and hold
/// across a traversal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId(pub u32);

/// What kind of binding container a scope is backed by
/// (`spec.md` §4.6: "a scope is either declarative or an object scope").
pub enum ScopeKind {
    /// A function body, `catch` clause, or top-level `eval`: an ordered
    /// name-to-variable map private to this scope.
    Declarative { vars: FxHashMap<Name, Variable>, order: Vec<Name> },
    /// The global scope or a `with` statement's scope: variable lookups and
    /// declarations forward to a prototype's own properties instead.
    Object { prototype: PrototypeId },
}

pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// `with` scopes never accept new declarations — hoisted `var`s and
    /// function declarations skip straight past them to the nearest
    /// enclosing scope that does (`spec.md` §4.6 "Hoisting").
    pub can_declare_variables: bool,
}

impl Scope {
    pub fn declarative(parent: Option<ScopeId>) -> Self {
        Scope {
            kind: ScopeKind::Declarative { vars: FxHashMap::default(), order: Vec::new() },
            parent,
            can_declare_variables: true,
        }
    }

    /// A `catch (e) { ... }` clause's scope: declarative, but in practice
    /// holds exactly the one bound identifier before ordinary `let`/`const`
    /// declarations inside the block add more.
    pub fn catch(parent: Option<ScopeId>) -> Self {
        Scope::declarative(parent)
    }

    pub fn with(parent: Option<ScopeId>, prototype: PrototypeId) -> Self {
        Scope {
            kind: ScopeKind::Object { prototype },
            parent,
            can_declare_variables: false,
        }
    }

    pub fn global(prototype: PrototypeId) -> Self {
        Scope {
            kind: ScopeKind::Object { prototype },
            parent: None,
            can_declare_variables: true,
        }
    }

    pub fn own_variable(&self, name: Name) -> Option<&Variable> {
        match &self.kind {
            ScopeKind::Declarative { vars, .. } => vars.get(&name),
            ScopeKind::Object { .. } => None,
        }
    }

    pub fn own_variable_mut(&mut self, name: Name) -> Option<&mut Variable> {
        match &mut self.kind {
            ScopeKind::Declarative { vars, .. } => vars.get_mut(&name),
            ScopeKind::Object { .. } => None,
        }
    }

    /// `DeclareVariable(name, variable)` (`spec.md` §4.6). Only meaningful
    /// on a declarative scope; object scopes declare through their backing
    /// prototype instead (see [`ScopeChain::declare_global`]).
    pub fn declare(&mut self, name: Name, var: Variable) {
        if let ScopeKind::Declarative { vars, order } = &mut self.kind {
            if !vars.contains_key(&name) {
                order.push(name);
            }
            vars.insert(name, var);
        }
    }
}

/// The full chain of nested scopes for one compilation unit, plus the
/// prototype registry any object scope forwards to
/// (`spec.md` §4.6, C5).
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl ScopeChain {
    pub fn new(global_prototype: PrototypeId) -> Self {
        ScopeChain { scopes: vec![Scope::global(global_prototype)] }
    }

    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    /// `Resolve(name)` (`spec.md` §4.6): walk from `from` outward through
    /// parents, returning the first scope that either owns a declarative
    /// binding for `name`, or is an object scope whose prototype has an own
    /// property of that name (consulting `runtime` to resolve the
    /// prototype's sibling chain per `spec.md` §4.5).
    pub fn resolve(
        &self,
        from: ScopeId,
        name: Name,
        runtime: &impl HostRuntime,
    ) -> Option<ScopeId> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.get(id);
            match &scope.kind {
                ScopeKind::Declarative { vars, .. } => {
                    if vars.contains_key(&name) {
                        return Some(id);
                    }
                }
                ScopeKind::Object { prototype } => {
                    if runtime.prototypes().resolve_property(*prototype, name).is_some() {
                        return Some(id);
                    }
                }
            }
            current = scope.parent;
        }
        None
    }

    /// `CanDeclareVariables` forwarding (`spec.md` §4.6 "Hoisting"): find
    /// the nearest scope starting from `from` (inclusive) that accepts new
    /// declarations, skipping `with` scopes along the way.
    pub fn nearest_declaring_scope(&self, from: ScopeId) -> ScopeId {
        let mut current = from;
        loop {
            let scope = self.get(current);
            if scope.can_declare_variables {
                return current;
            }
            match scope.parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    pub fn declare_variable(&mut self, from: ScopeId, name: Name, var: Variable) {
        let target = self.nearest_declaring_scope(from);
        self.get_mut(target).declare(name, var);
    }

    pub fn prototype_of(&self, id: ScopeId) -> Option<PrototypeId> {
        match &self.get(id).kind {
            ScopeKind::Object { prototype } => Some(*prototype),
            ScopeKind::Declarative { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ConstantState;
    use crate::variable::DeclaredVariable;

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

    fn declared(ty: Option<ecmac_types::Type>) -> Variable {
        Variable::Declared(DeclaredVariable { ty, slot: None, constant: ConstantState::Unset, initialized: false })
    }

    #[test]
    fn resolve_finds_binding_in_parent_function_scope() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        let block_scope = chain.push(Scope::declarative(Some(function_scope)));
        chain.declare_variable(function_scope, Name(7), declared(None));

        let found = chain.resolve(block_scope, Name(7), &runtime);
        assert_eq!(found, Some(function_scope));
    }

    #[test]
    fn with_scope_does_not_accept_declarations() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let with_proto = registry.create(None);
        let mut chain = ScopeChain::new(global);
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        let with_scope = chain.push(Scope::with(Some(function_scope), with_proto));

        chain.declare_variable(with_scope, Name(3), declared(None));

        assert!(chain.get(with_scope).own_variable(Name(3)).is_none());
        assert!(chain.get(function_scope).own_variable(Name(3)).is_some());
    }

    #[test]
    fn resolve_returns_none_for_unbound_name() {
        let mut registry = PrototypeRegistry::default();
        let global = registry.create(None);
        let runtime = TestRuntime { prototypes: registry };
        let chain = ScopeChain::new(global);
        assert!(chain.resolve(ScopeChain::GLOBAL, Name(99), &runtime).is_none());
    }
}
