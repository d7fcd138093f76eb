//! The prototype: the unit of property layout (`spec.md` §3 "Prototype",
//! §4.5).

use crate::attributes::PropertyAttributes;
use crate::indexer::Indexer;
use crate::property::{Property, PropertyValue};
use ecmac_ir::Name;
use ecmac_types::{MethodId, PrototypeId, Type};
use rustc_hash::FxHashMap;

/// A built-in call/construct target: either a single concrete method or an
/// overloaded group (the group case is resolved to one `MethodId` by
/// `ecmac_dispatch`'s overload selector before code generation).
#[derive(Clone, Debug)]
pub enum Callable {
    Method(MethodId),
    Group(Name),
}

pub struct Prototype {
    pub id: PrototypeId,
    /// Parent in the sibling chain established at prototype creation
    /// (`spec.md` §4.5) — e.g. every built-in type's prototype chains to
    /// `Object.prototype`.
    pub parent: Option<PrototypeId>,
    properties: FxHashMap<Name, Property>,
    /// Declaration order, needed wherever iteration order is observable
    /// (e.g. `for-in` enumeration order for own properties).
    order: Vec<Name>,
    pub indexer: Option<Indexer>,
    pub on_call: Option<Callable>,
    pub on_construct: Option<Callable>,
    /// The constructor function used by `new` on this prototype's
    /// instance type, when distinct from `on_construct` (`spec.md` §6
    /// "TypeConstructor").
    pub type_constructor: Option<MethodId>,
}

impl Prototype {
    pub fn new(id: PrototypeId, parent: Option<PrototypeId>) -> Self {
        Prototype {
            id,
            parent,
            properties: FxHashMap::default(),
            order: Vec::new(),
            indexer: None,
            on_call: None,
            on_construct: None,
            type_constructor: None,
        }
    }

    /// Look up `name` on self only (no sibling-chain walk); used by
    /// `AddProperty` to decide whether this is a first declaration or a
    /// refinement.
    pub fn own_property(&self, name: Name) -> Option<&Property> {
        self.properties.get(&name)
    }

    pub fn own_property_mut(&mut self, name: Name) -> Option<&mut Property> {
        self.properties.get_mut(&name)
    }

    /// `GetProperty(name)`: walk self then the sibling chain.
    ///
    /// Requires a registry lookup for the chain walk; callers without one
    /// in hand should use
    /// [`crate::registry::PrototypeRegistry::resolve_property`] instead.
    pub fn own_properties(&self) -> impl Iterator<Item = (Name, &Property)> {
        self.order.iter().map(move |n| (*n, &self.properties[n]))
    }

    /// `AddProperty(name, value, attributes)`: idempotent; a later call
    /// with a different-typed value collapses the slot to the universal
    /// type (`spec.md` §4.5). Returns `true` if this call caused a
    /// collapse, so the caller (resolve/dispatch) can schedule
    /// recompilation of anything that already read the old type.
    pub fn add_property(&mut self, name: Name, ty: Type, attributes: PropertyAttributes) -> bool {
        match self.properties.get_mut(&name) {
            None => {
                self.properties.insert(name, Property::data(ty, attributes));
                self.order.push(name);
                false
            }
            Some(existing) => {
                if existing.ty == ty || existing.ty == Type::Universal {
                    false
                } else if existing.attributes.sealed {
                    // Sealed built-in properties are exact by construction;
                    // a disagreeing write here is a caller bug, not a type
                    // fact to learn from.
                    false
                } else {
                    existing.collapse();
                    true
                }
            }
        }
    }

    pub fn add_method(&mut self, name: Name, value: PropertyValue, attributes: PropertyAttributes) {
        if !self.properties.contains_key(&name) {
            self.order.push(name);
        }
        self.properties.insert(name, Property { ty: Type::Universal, attributes, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: u32) -> Name {
        Name(n)
    }

    #[test]
    fn first_add_property_sets_the_type() {
        let mut p = Prototype::new(PrototypeId(0), None);
        p.add_property(name(1), Type::I32, PropertyAttributes::default());
        assert_eq!(p.own_property(name(1)).unwrap().ty, Type::I32);
    }

    #[test]
    fn disagreeing_add_property_collapses_to_universal() {
        let mut p = Prototype::new(PrototypeId(0), None);
        p.add_property(name(1), Type::I32, PropertyAttributes::default());
        let collapsed = p.add_property(name(1), Type::String, PropertyAttributes::default());
        assert!(collapsed);
        assert_eq!(p.own_property(name(1)).unwrap().ty, Type::Universal);
    }

    #[test]
    fn collapse_is_monotone() {
        let mut p = Prototype::new(PrototypeId(0), None);
        p.add_property(name(1), Type::I32, PropertyAttributes::default());
        p.add_property(name(1), Type::String, PropertyAttributes::default());
        let collapsed_again = p.add_property(name(1), Type::Boolean, PropertyAttributes::default());
        assert!(!collapsed_again, "already-universal slot reports no further collapse");
        assert_eq!(p.own_property(name(1)).unwrap().ty, Type::Universal);
    }

    #[test]
    fn sealed_property_never_collapses() {
        let mut p = Prototype::new(PrototypeId(0), None);
        p.add_property(name(1), Type::I32, PropertyAttributes::READONLY);
        p.add_property(name(1), Type::String, PropertyAttributes::READONLY);
        assert_eq!(p.own_property(name(1)).unwrap().ty, Type::I32);
    }
}
