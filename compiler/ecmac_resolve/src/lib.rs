//! `ResolveVariables`: name resolution, static type inference, constant
//! folding, and dead-branch elision over one parsed source unit
//! (`spec.md` §4.7, C7).
//!
//! Runs after parsing and before dispatch/code generation: it turns a raw
//! AST into the same AST plus a [`ResolvedFacts`] side-table recording each
//! expression's static type and (if any) compile-time-known value, and it
//! mutates the scope chain / global table / prototype registry in place as
//! it learns facts about the bindings it walks.

mod context;
mod expr;
mod facts;
mod function;
mod globals;
mod names;
mod resolver;
mod stmt;

pub use context::{MethodHints, ResolveContext};
pub use facts::ResolvedFacts;
pub use function::{resolve_function, resolve_module, FunctionResolution};
pub use globals::GlobalEnvironment;
pub use names::{read_name, write_name};
pub use resolver::Resolver;
