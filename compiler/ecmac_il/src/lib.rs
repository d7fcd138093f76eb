//! The abstract stack-machine IL the code-generation driver (C9) emits
//! against (`spec.md` §6 "IL emitter contract"), plus a recording and
//! interpreting reference implementation sufficient to check the testable
//! properties of `spec.md` §8 without a production host VM in the loop
//! (`SPEC_FULL.md` §1, ADDED).

mod emitter;
mod handle;
mod instruction;
mod interpret;
mod recording;
mod value;

pub use emitter::IlEmitter;
pub use handle::{LabelId, Token, VariableHandle};
pub use instruction::Instruction;
pub use interpret::{interpret, InterpretError, Method, Program};
pub use recording::RecordingEmitter;
pub use value::Value;
