//! Property attributes (`spec.md` §3 "Property variable").

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PropertyAttributes {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
    /// Once sealed, the slot's type can never widen further even if the
    /// prototype itself is still being built (used for built-in
    /// properties whose type is known exactly).
    pub sealed: bool,
}

impl PropertyAttributes {
    pub const DEFAULT: PropertyAttributes = PropertyAttributes {
        writable: true,
        enumerable: true,
        configurable: true,
        sealed: false,
    };

    pub const READONLY: PropertyAttributes = PropertyAttributes {
        writable: false,
        enumerable: true,
        configurable: false,
        sealed: true,
    };
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self::DEFAULT
    }
}
