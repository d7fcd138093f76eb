//! [`RecordingEmitter`]: an `IlEmitter` that appends every call to a plain
//! `Vec<Instruction>` instead of targeting a real host VM (`spec.md` §1,
//! ADDED reference fixture — see `SPEC_FULL.md` §1).
//!
//! Exists so every testable property in `spec.md` §8 can be checked by
//! disassembling or [`crate::interpret`]ing the stream a compilation
//! produced, without a second project standing in for "the real emitter".

use crate::handle::{LabelId, Token, VariableHandle};
use crate::instruction::Instruction;
use crate::IlEmitter;
use ecmac_ir::Name;
use ecmac_types::{MethodId, Type};
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct RecordingEmitter {
    instructions: Vec<Instruction>,
    next_variable: u32,
    next_label: u32,
    free_temporaries: FxHashMap<Type, Vec<VariableHandle>>,
    temporary_types: FxHashMap<VariableHandle, Type>,
    completed: bool,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    fn push(&mut self, instruction: Instruction) {
        debug_assert!(!self.completed, "emission after Complete");
        self.instructions.push(instruction);
    }

    fn fresh_variable(&mut self) -> VariableHandle {
        let handle = VariableHandle(self.next_variable);
        self.next_variable += 1;
        handle
    }

    /// Render the recorded stream one instruction per line, labels shown as
    /// `L<n>:` markers — a minimal disassembly sufficient to verify, e.g.,
    /// that constant folding emitted no `LoadVariable` for a folded name
    /// (`spec.md` §8 "Constant folding").
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (index, instruction) in self.instructions.iter().enumerate() {
            if let Instruction::DefineLabelPosition(LabelId(id)) = instruction {
                out.push_str(&format!("L{id}:\n"));
            }
            out.push_str(&format!("{index:>4}: {instruction:?}\n"));
        }
        out
    }
}

impl IlEmitter for RecordingEmitter {
    fn load_argument(&mut self, index: u32) {
        self.push(Instruction::LoadArgument(index));
    }

    fn store_argument(&mut self, index: u32) {
        self.push(Instruction::StoreArgument(index));
    }

    fn declare_variable(&mut self, ty: Type, name: Option<Name>) -> VariableHandle {
        let handle = self.fresh_variable();
        self.push(Instruction::DeclareVariable(ty, name, handle));
        handle
    }

    fn create_temporary_variable(&mut self, ty: Type) -> VariableHandle {
        if let Some(handle) = self.free_temporaries.get_mut(&ty).and_then(Vec::pop) {
            return handle;
        }
        let handle = self.fresh_variable();
        self.temporary_types.insert(handle, ty);
        self.push(Instruction::DeclareVariable(ty, None, handle));
        handle
    }

    fn release_temporary_variable(&mut self, handle: VariableHandle) {
        if let Some(&ty) = self.temporary_types.get(&handle) {
            self.free_temporaries.entry(ty).or_default().push(handle);
        }
    }

    fn load_variable(&mut self, handle: VariableHandle) {
        self.push(Instruction::LoadVariable(handle));
    }

    fn store_variable(&mut self, handle: VariableHandle) {
        self.push(Instruction::StoreVariable(handle));
    }

    fn load_field(&mut self, field: Name) {
        self.push(Instruction::LoadField(field));
    }

    fn store_field(&mut self, field: Name) {
        self.push(Instruction::StoreField(field));
    }

    fn load_i32(&mut self, value: i32) {
        self.push(Instruction::LoadInt32(value));
    }

    fn load_i64(&mut self, value: i64) {
        self.push(Instruction::LoadInt64(value));
    }

    fn load_f64(&mut self, value: f64) {
        self.push(Instruction::LoadDouble(value));
    }

    fn load_bool(&mut self, value: bool) {
        self.push(Instruction::LoadBoolean(value));
    }

    fn load_string(&mut self, value: &str) {
        self.push(Instruction::LoadString(value.to_owned()));
    }

    fn load_string_or_null(&mut self, value: Option<&str>) {
        self.push(Instruction::LoadStringOrNull(value.map(ToOwned::to_owned)));
    }

    fn load_null(&mut self) {
        self.push(Instruction::LoadNull);
    }

    fn load_token(&mut self, token: Token) {
        self.push(Instruction::LoadToken(token));
    }

    fn new_array(&mut self, element_type: Type) {
        self.push(Instruction::NewArray(element_type));
    }

    fn new_object(&mut self, constructor: MethodId) {
        self.push(Instruction::NewObject(constructor));
    }

    fn store_array_element(&mut self, element_type: Type) {
        self.push(Instruction::StoreArrayElement(element_type));
    }

    fn load_array_element(&mut self, element_type: Type) {
        self.push(Instruction::LoadArrayElement(element_type));
    }

    fn call(&mut self, method: MethodId) {
        self.push(Instruction::Call(method));
    }

    fn duplicate(&mut self) {
        self.push(Instruction::Duplicate);
    }

    fn pop(&mut self) {
        self.push(Instruction::Pop);
    }

    fn create_label(&mut self) -> LabelId {
        let label = LabelId(self.next_label);
        self.next_label += 1;
        self.push(Instruction::CreateLabel(label));
        label
    }

    fn define_label_position(&mut self, label: LabelId) {
        self.push(Instruction::DefineLabelPosition(label));
    }

    fn branch(&mut self, label: LabelId) {
        self.push(Instruction::Branch(label));
    }

    fn branch_if_true(&mut self, label: LabelId) {
        self.push(Instruction::BranchIfTrue(label));
    }

    fn branch_if_false(&mut self, label: LabelId) {
        self.push(Instruction::BranchIfFalse(label));
    }

    fn leave(&mut self, label: LabelId) {
        self.push(Instruction::Leave(label));
    }

    fn throw(&mut self) {
        self.push(Instruction::Throw);
    }

    fn switch(&mut self, labels: &[LabelId]) {
        self.push(Instruction::Switch(labels.to_vec()));
    }

    fn begin_exception_block(&mut self) {
        self.push(Instruction::BeginExceptionBlock);
    }

    fn begin_catch_block(&mut self, exception_type: Token) {
        self.push(Instruction::BeginCatchBlock(exception_type));
    }

    fn begin_finally_block(&mut self) {
        self.push(Instruction::BeginFinallyBlock);
    }

    fn end_exception_block(&mut self) {
        self.push(Instruction::EndExceptionBlock);
    }

    fn breakpoint(&mut self) {
        self.push(Instruction::Breakpoint);
    }

    fn no_operation(&mut self) {
        self.push(Instruction::NoOperation);
    }

    fn complete(&mut self) {
        self.push(Instruction::Complete);
        self.completed = true;
    }

    fn convert_to_bool(&mut self) {
        self.push(Instruction::ConvertToBool);
    }

    fn convert_to_any(&mut self) {
        self.push(Instruction::ConvertToAny);
    }

    fn convert_to_string(&mut self) {
        self.push(Instruction::ConvertToString);
    }

    fn convert_generic(&mut self, from: Type, to: Type) {
        self.push(Instruction::ConvertGeneric(from, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_variable_returns_increasing_handles() {
        let mut emitter = RecordingEmitter::new();
        let a = emitter.declare_variable(Type::I32, None);
        let b = emitter.declare_variable(Type::I32, None);
        assert_ne!(a, b);
    }

    #[test]
    fn released_temporary_is_reused() {
        let mut emitter = RecordingEmitter::new();
        let first = emitter.create_temporary_variable(Type::I32);
        emitter.release_temporary_variable(first);
        let second = emitter.create_temporary_variable(Type::I32);
        assert_eq!(first, second);
    }

    #[test]
    fn complete_marks_the_stream_closed() {
        let mut emitter = RecordingEmitter::new();
        emitter.load_i32(1);
        emitter.complete();
        assert!(emitter.is_complete());
        assert!(matches!(emitter.instructions().last(), Some(Instruction::Complete)));
    }

    #[test]
    fn disassembly_shows_label_markers() {
        let mut emitter = RecordingEmitter::new();
        let label = emitter.create_label();
        emitter.branch(label);
        emitter.define_label_position(label);
        emitter.complete();

        let text = emitter.disassemble();
        assert!(text.contains("L0:\n"));
    }
}
