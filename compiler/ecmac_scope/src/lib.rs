//! Scope chain and variable model (`spec.md` §3 "Variable", §4.6 "Scope
//! chain", C5): the binding environment the dispatch resolver and
//! type-inference pass both read and mutate while walking a function body.

mod constant;
mod scope;
mod variable;

pub use constant::{ConstValue, ConstantState};
pub use scope::{Scope, ScopeChain, ScopeId, ScopeKind};
pub use variable::{ArgumentVariable, DeclaredVariable, GlobalVariable, PropertyVariable, SlotHandle, Variable};
