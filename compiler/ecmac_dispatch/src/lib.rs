//! Dispatch resolver: overload selection over a built-in method group, and
//! user-function specialization, for member-access and bare call sites
//! (`spec.md` §4.8, C8).
//!
//! Consulted by the code-generation driver (C9) while lowering a call or
//! `new` expression — by the time a call site is actually emitted, its
//! callee's static type is already known from resolution (C7), and this
//! crate turns that type plus the call's argument-type vector into a
//! concrete method handle, compiling a fresh user-function specialization
//! on demand.

mod call_site;
mod generator;
mod overload;
mod registry;

pub use call_site::{resolve_bare_call, resolve_member_call, CallKind, ResolvedCall};
pub use generator::{FunctionGenerator, SpecializationCompiler};
pub use overload::{select_overload, OverloadMatch};
pub use registry::GeneratorRegistry;
