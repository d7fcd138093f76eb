//! `IlEmitter`: the trait the code-generation driver (C9) emits against
//! (`spec.md` §6 "IL emitter contract", §4.10 "Local-slot and temporary
//! management").
//!
//! Every method either appends one instruction to the method body under
//! construction, or allocates a fresh opaque handle the driver threads back
//! into a later call. The driver never needs a second trait for locals or
//! labels — they're just emitter calls like any other instruction.

use crate::handle::{LabelId, Token, VariableHandle};
use ecmac_ir::Name;
use ecmac_types::{MethodId, Type};

pub trait IlEmitter {
    fn load_argument(&mut self, index: u32);
    fn store_argument(&mut self, index: u32);

    /// Declare a named or anonymous local of `ty`; the driver reuses the
    /// returned handle across a specialization's lifetime.
    fn declare_variable(&mut self, ty: Type, name: Option<Name>) -> VariableHandle;

    /// A scratch local requested mid-method (`spec.md` §4.10); release it
    /// with [`IlEmitter::release_temporary_variable`] once it is no longer
    /// live so a later request of the same type can reuse the slot.
    fn create_temporary_variable(&mut self, ty: Type) -> VariableHandle;
    fn release_temporary_variable(&mut self, handle: VariableHandle);

    fn load_variable(&mut self, handle: VariableHandle);
    fn store_variable(&mut self, handle: VariableHandle);

    fn load_field(&mut self, field: Name);
    fn store_field(&mut self, field: Name);

    fn load_i32(&mut self, value: i32);
    fn load_i64(&mut self, value: i64);
    fn load_f64(&mut self, value: f64);
    fn load_bool(&mut self, value: bool);
    fn load_string(&mut self, value: &str);
    fn load_string_or_null(&mut self, value: Option<&str>);
    fn load_null(&mut self);
    fn load_token(&mut self, token: Token);

    fn new_array(&mut self, element_type: Type);
    fn new_object(&mut self, constructor: MethodId);
    fn store_array_element(&mut self, element_type: Type);
    fn load_array_element(&mut self, element_type: Type);

    fn call(&mut self, method: MethodId);
    fn duplicate(&mut self);
    fn pop(&mut self);

    /// Allocate a branch target; emit its position later with
    /// [`IlEmitter::define_label_position`].
    fn create_label(&mut self) -> LabelId;
    fn define_label_position(&mut self, label: LabelId);

    fn branch(&mut self, label: LabelId);
    fn branch_if_true(&mut self, label: LabelId);
    fn branch_if_false(&mut self, label: LabelId);

    /// Exit an exception region toward `label`, running any intervening
    /// `finally` blocks first (`spec.md` §4.9 "Try/Catch/Finally" — used in
    /// place of an unconditional branch for every jump originating inside a
    /// try/catch/finally).
    fn leave(&mut self, label: LabelId);

    fn throw(&mut self);
    fn switch(&mut self, labels: &[LabelId]);

    fn begin_exception_block(&mut self);
    fn begin_catch_block(&mut self, exception_type: Token);
    fn begin_finally_block(&mut self);
    fn end_exception_block(&mut self);

    fn breakpoint(&mut self);
    fn no_operation(&mut self);

    /// Mark the method body complete; no further instructions may be
    /// emitted afterward.
    fn complete(&mut self);

    fn convert_to_bool(&mut self);
    fn convert_to_any(&mut self);
    fn convert_to_string(&mut self);
    fn convert_generic(&mut self, from: Type, to: Type);
}
