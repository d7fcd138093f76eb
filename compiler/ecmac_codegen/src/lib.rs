//! `GenerateCode`: per-node instruction emission over a resolved AST
//! (`spec.md` §4.9, C9).
//!
//! Runs after name resolution/type inference (C7) and depends on dispatch
//! (C8) to turn a call or `new` expression's statically known argument-type
//! vector into a concrete method handle. [`Lowering`] holds what stays
//! constant across one specialization's body; [`context::CodegenContext`]
//! holds what a nested loop or `try` region pushes and pops for its
//! duration.

mod call;
mod context;
mod driver;
mod expr;
mod loops;
mod lowering;
mod names;
mod stmt;
mod try_catch;

pub use context::{CodegenContext, LoopFrame, GLOBAL_OBJECT_TOKEN};
pub use driver::{Driver, SPECIALIZATION_ID_BASE};
pub use lowering::Lowering;
pub use names::{load_name, store_name};
