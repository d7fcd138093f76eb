//! Per-engine prototype registry: the "engine handle with prototype
//! registry lookup by host type" of `spec.md` §6.

use crate::property::Property;
use crate::prototype::Prototype;
use ecmac_ir::Name;
use ecmac_types::PrototypeId;

/// Owns every [`Prototype`] for one engine instance. Single-threaded: an
/// engine (and therefore its registry) must not be used concurrently from
/// multiple threads (`spec.md` §5).
#[derive(Default)]
pub struct PrototypeRegistry {
    prototypes: Vec<Prototype>,
}

impl PrototypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, parent: Option<PrototypeId>) -> PrototypeId {
        let id = PrototypeId(self.prototypes.len() as u32);
        self.prototypes.push(Prototype::new(id, parent));
        id
    }

    pub fn get(&self, id: PrototypeId) -> &Prototype {
        &self.prototypes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: PrototypeId) -> &mut Prototype {
        &mut self.prototypes[id.0 as usize]
    }

    /// `GetProperty(name)` (`spec.md` §4.5): walk `id`'s own properties,
    /// then its sibling chain.
    pub fn resolve_property(&self, id: PrototypeId, name: Name) -> Option<&Property> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let proto = self.get(cur);
            if let Some(prop) = proto.own_property(name) {
                return Some(prop);
            }
            current = proto.parent;
        }
        None
    }
}

/// The runtime contract the compiler depends on (`spec.md` §6): an engine
/// handle exposing prototype lookup by host type, plus the
/// equality/enumeration helper tokens referenced by `for-in`/`for-of`
/// lowering. Implemented by the embedding host; `ecmacc` provides a
/// reference implementation for tests.
pub trait HostRuntime {
    fn prototypes(&self) -> &PrototypeRegistry;
    fn prototypes_mut(&mut self) -> &mut PrototypeRegistry;

    /// `TypeComparer_StrictEquals` token (`spec.md` §6).
    fn strict_equals_method() -> ecmac_types::MethodId;
    /// `TypeUtilities_EnumeratePropertyNames` token (`for-in`).
    fn enumerate_property_names_method() -> ecmac_types::MethodId;
    /// `TypeUtilities_EnumeratePropertyValues` token (`for-of`).
    fn enumerate_property_values_method() -> ecmac_types::MethodId;

    /// The host method id backing a binary/unary operator or implicit
    /// display-string conversion (`spec.md` §6, see [`crate::OperatorKind`]).
    fn operator_method(kind: crate::OperatorKind) -> ecmac_types::MethodId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::PropertyAttributes;
    use ecmac_types::Type;

    #[test]
    fn resolve_property_walks_sibling_chain() {
        let mut reg = PrototypeRegistry::new();
        let object_proto = reg.create(None);
        reg.get_mut(object_proto).add_property(Name(0), Type::Universal, PropertyAttributes::default());
        let array_proto = reg.create(Some(object_proto));

        let found = reg.resolve_property(array_proto, Name(0));
        assert!(found.is_some());
    }

    #[test]
    fn own_property_shadows_parent() {
        let mut reg = PrototypeRegistry::new();
        let object_proto = reg.create(None);
        reg.get_mut(object_proto).add_property(Name(0), Type::Universal, PropertyAttributes::default());
        let array_proto = reg.create(Some(object_proto));
        reg.get_mut(array_proto).add_property(Name(0), Type::I32, PropertyAttributes::default());

        let found = reg.resolve_property(array_proto, Name(0)).unwrap();
        assert_eq!(found.ty, Type::I32);
    }
}
