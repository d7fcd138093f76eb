//! Prototype property slots (`spec.md` §3 "Property variable").

use crate::attributes::PropertyAttributes;
use crate::method_group::MethodGroup;
use ecmac_types::{MethodId, Type};

/// What a property slot holds, beyond its static type.
#[derive(Clone, Debug)]
pub enum PropertyValue {
    /// A plain data slot.
    Data,
    /// A getter/accessor pair; reading the property calls `getter` (and,
    /// if present, writing calls `setter`) instead of loading a field.
    Accessor { getter: MethodId, setter: Option<MethodId> },
    /// A callable method group (built-in overloaded method, e.g.
    /// `Array.prototype.slice`).
    Method(MethodGroup),
    /// A constant value baked in at resolve time (`spec.md` §3 "constant
    /// tracking"); `None` once collapsed to non-constant.
    Constant,
}

/// One named slot on a [`crate::Prototype`].
#[derive(Clone, Debug)]
pub struct Property {
    pub ty: Type,
    pub attributes: PropertyAttributes,
    pub value: PropertyValue,
}

impl Property {
    pub fn data(ty: Type, attributes: PropertyAttributes) -> Self {
        Property { ty, attributes, value: PropertyValue::Data }
    }

    pub fn method(group: MethodGroup) -> Self {
        Property {
            ty: Type::Universal,
            attributes: PropertyAttributes::READONLY,
            value: PropertyValue::Method(group),
        }
    }

    /// Collapse this property's type to the universal type, per
    /// `spec.md` §4.5 ("a subsequent `AddProperty` with a different-typed
    /// value collapses the slot"). Once collapsed, it never un-collapses
    /// (`spec.md` §3 invariants) — enforced by the caller never invoking
    /// this on a `sealed` property.
    pub fn collapse(&mut self) {
        debug_assert!(!self.attributes.sealed, "sealed properties must never collapse");
        self.ty = Type::Universal;
    }
}
