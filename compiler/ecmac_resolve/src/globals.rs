//! Global-variable bookkeeping the scope chain doesn't carry on its own.
//!
//! [`ecmac_scope::ScopeChain`]'s global scope is an object scope: it
//! forwards name lookups straight to the global prototype's properties.
//! That covers the property's type/attributes, but not the parallel fact
//! this crate needs for `spec.md` §4.12 "recompilation triggers" — which
//! compiled functions read or wrote a given global, so a later type
//! collapse can schedule their re-resolution. This table holds that.

use ecmac_ir::Name;
use ecmac_proto::{PrototypeRegistry, PropertyAttributes};
use ecmac_scope::{ConstantState, GlobalVariable};
use ecmac_types::{MethodId, PrototypeId, Type};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Default)]
pub struct GlobalEnvironment {
    vars: FxHashMap<Name, GlobalVariable>,
}

impl GlobalEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: Name) -> &mut GlobalVariable {
        self.vars.entry(name).or_insert_with(|| GlobalVariable {
            name,
            ty: None,
            constant: ConstantState::Unset,
            users: FxHashSet::default(),
        })
    }

    /// A `NameExpression` that resolved to nothing anywhere in scope
    /// (`spec.md` §4.7 point 1): creates the property on the global
    /// prototype and records `reader` as a user.
    pub fn declare_on_read(
        &mut self,
        name: Name,
        registry: &mut PrototypeRegistry,
        global_prototype: PrototypeId,
        reader: Option<MethodId>,
    ) -> Type {
        registry.get_mut(global_prototype).add_property(name, Type::Universal, PropertyAttributes::default());
        let entry = self.entry(name);
        if let Some(m) = reader {
            entry.users.insert(m);
        }
        entry.ty.unwrap_or(Type::Universal)
    }

    /// `ApplyType` on a global (`spec.md` §4.7, §4.12): widen the tracked
    /// type and the backing prototype property together. Returns the set
    /// of prior users to invalidate if this write caused a collapse.
    pub fn apply_type(
        &mut self,
        name: Name,
        ty: Type,
        registry: &mut PrototypeRegistry,
        global_prototype: PrototypeId,
        writer: Option<MethodId>,
    ) -> FxHashSet<MethodId> {
        let entry = self.entry(name);
        if let Some(m) = writer {
            entry.users.insert(m);
        }
        let collapsed = match entry.ty {
            None => {
                entry.ty = Some(ty);
                false
            }
            Some(existing) if existing == ty || existing == Type::Universal => false,
            Some(_) => {
                entry.ty = Some(Type::Universal);
                true
            }
        };
        let resolved_ty = entry.ty.unwrap_or(Type::Universal);
        registry.get_mut(global_prototype).add_property(name, resolved_ty, PropertyAttributes::default());
        if collapsed {
            entry.users.clone()
        } else {
            FxHashSet::default()
        }
    }

    pub fn constant_of(&self, name: Name) -> Option<&ConstantState> {
        self.vars.get(&name).map(|v| &v.constant)
    }

    /// `TrySetConstant` on a global read/write (`spec.md` §4.7 "Constant
    /// tracking"). Returns `true` if this call caused a collapse to
    /// non-constant.
    pub fn try_set_constant(&mut self, name: Name, value: ecmac_scope::ConstValue) -> bool {
        self.entry(name).constant.try_set(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_on_read_creates_the_property() {
        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut env = GlobalEnvironment::new();
        let ty = env.declare_on_read(Name(1), &mut registry, global, None);
        assert_eq!(ty, Type::Universal);
        assert!(registry.resolve_property(global, Name(1)).is_some());
    }

    #[test]
    fn apply_type_collapses_on_disagreement_and_reports_users() {
        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut env = GlobalEnvironment::new();
        env.apply_type(Name(1), Type::I32, &mut registry, global, Some(MethodId(1)));
        let collapsed_users = env.apply_type(Name(1), Type::String, &mut registry, global, Some(MethodId(2)));
        assert_eq!(collapsed_users.len(), 2);
        assert_eq!(registry.resolve_property(global, Name(1)).unwrap().ty, Type::Universal);
    }
}
