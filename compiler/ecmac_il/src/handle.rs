//! Opaque handles the emitter hands back to its caller.
//!
//! The code-generation driver never inspects these values — it only ever
//! passes one back into a later emitter call (`LoadVariable(h)` after a
//! `DeclareVariable` returned `h`, `Branch(l)` after a `CreateLabel`
//! returned `l`) — so each is a bare opaque integer, not a type the driver
//! could accidentally introspect.

use std::fmt;

/// A declared or temporary local (`spec.md` §4.10).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct VariableHandle(pub u32);

impl fmt::Debug for VariableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A branch target created by `CreateLabel` and fixed in place by a later
/// `DefineLabelPosition` (`spec.md` §6 "IL emitter contract").
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct LabelId(pub u32);

impl fmt::Debug for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// An opaque token identifying a host-runtime helper or exception type —
/// `TypeComparer_StrictEquals`, `TypeUtilities_EnumeratePropertyNames`, a
/// catch clause's filter type, and so on (`spec.md` §6 "Runtime contract").
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Token(pub u32);

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tok{}", self.0)
    }
}
