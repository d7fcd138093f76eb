//! The static type lattice (`spec.md` §4.7, §4.8).
//!
//! Script values flow as native primitive types whenever possible; this
//! crate is the shared vocabulary every other compiler crate uses to talk
//! about "the static type of this storage location".

mod convert;
mod numeric;

pub use convert::{classify, Conversion, ConversionRank};
pub use numeric::common_numeric_type;

/// A handle to a [`Prototype`](../ecmac_proto/struct.Prototype.html) owned
/// by `ecmac_proto`. Kept as a bare integer here (rather than depending on
/// `ecmac_proto`) so the type lattice has no dependency on the
/// prototype/property model that is built on top of it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PrototypeId(pub u32);

/// A handle to a compiled method, stable across recompilation (the method
/// the handle identifies may later be superseded, but the handle value
/// itself never changes meaning — see `spec.md` §4.12).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodId(pub u64);

/// The static type of a storage location (argument, local, global field, or
/// prototype property) or of an expression's result.
///
/// `Eq`/`Hash`/`Ord` make `Vec<Type>` usable directly as an argument-type
/// vector cache key (`spec.md` §3 "Argument-type vector").
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    /// The `undefined` singleton type: functions with no `return`
    /// statement, and formals with no supplied argument, have this type.
    Undefined,
    Null,
    Boolean,
    I32,
    U32,
    F64,
    /// Interned-string-backed string values.
    String,
    /// An instance of a specific host-type prototype — e.g. the type
    /// produced by `new F()` for a user function `F`, or a built-in
    /// `Array`/`Object` instance.
    Instance(PrototypeId),
    /// A reference to a specific compiled method (the type of a constant
    /// whose value is a user-function generator — `spec.md` §3 "constant
    /// tracking").
    Method(MethodId),
    /// The universal (fully dynamic, boxed) type a slot collapses to once
    /// two disagreeing concrete types are observed.
    Universal,
}

impl Type {
    /// Numeric types participate in the common-numeric-type rule
    /// (`spec.md` §4.7).
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::I32 | Type::U32 | Type::F64)
    }

    pub fn is_universal(self) -> bool {
        matches!(self, Type::Universal)
    }

    /// `true` once this type can no longer disagree with a further
    /// assignment without being treated as the same fact — used as a
    /// (weak) sanity check in tests of the collapse monotonicity invariant
    /// (`spec.md` §8).
    pub fn is_concrete(self) -> bool {
        !self.is_universal()
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Undefined => write!(f, "undefined"),
            Type::Null => write!(f, "null"),
            Type::Boolean => write!(f, "boolean"),
            Type::I32 => write!(f, "i32"),
            Type::U32 => write!(f, "u32"),
            Type::F64 => write!(f, "f64"),
            Type::String => write!(f, "string"),
            Type::Instance(id) => write!(f, "instance#{}", id.0),
            Type::Method(id) => write!(f, "method#{}", id.0),
            Type::Universal => write!(f, "any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_classification() {
        assert!(Type::I32.is_numeric());
        assert!(Type::F64.is_numeric());
        assert!(!Type::String.is_numeric());
    }
}
