//! A reference interpreter for [`Instruction`] streams recorded by
//! [`crate::RecordingEmitter`] (ADDED per `SPEC_FULL.md` §1) — the fixture
//! that lets `ecmacc` actually run a compiled script and lets
//! `ecmac_codegen`'s tests assert on observable *results*, not just on the
//! shape of the emitted stream.
//!
//! Modeled as a simple stack machine over `Value`. `Complete` both ends a
//! method body and returns whatever is left on top of the stack (or
//! `undefined` if nothing is), standing in for the production emitter's
//! `Ret` the way this whole vocabulary stands in for a `System.Reflection.
//! Emit`-style API. `Leave`/`Throw` unwind through `BeginExceptionBlock`/
//! `BeginCatchBlock`/`BeginFinallyBlock`/`EndExceptionBlock` regions,
//! discovered by a one-time forward scan of the method body rather than
//! tracked incrementally, since the regions a method declares never change
//! once recorded.

use crate::handle::{LabelId, VariableHandle};
use crate::instruction::Instruction;
use crate::value::Value;
use ecmac_types::MethodId;
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// A runtime helper with no bytecode body of its own — `HostRuntime`'s
/// `operator_method`/`strict_equals_method`/`enumerate_property_*_method`
/// tokens (`spec.md` §6 "Runtime contract") name methods a real host VM
/// implements natively; this fixture needs the same escape hatch to make
/// arithmetic, string concatenation, and equality actually observable,
/// since the IL vocabulary itself has no arithmetic opcode.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, InterpretError>>;

enum MethodBody {
    Bytecode(Vec<Instruction>),
    Native(NativeFn),
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Bytecode(instructions) => f.debug_tuple("Bytecode").field(instructions).finish(),
            MethodBody::Native(_) => f.debug_tuple("Native").field(&"..").finish(),
        }
    }
}

/// One compiled method body, as the reference interpreter needs it: its
/// body, plus the argument count the production emitter would otherwise
/// recover from method metadata (`spec.md` never assigns the `Call`
/// instruction an explicit arity — a real host VM looks the callee's
/// signature up by `MethodId`; this fixture keeps that lookup table here).
#[derive(Debug)]
pub struct Method {
    pub arity: usize,
    body: MethodBody,
}

impl Method {
    /// The recorded instructions, for callers that need to walk a
    /// bytecode body directly (disassembly, `resolve_regions`). Empty for
    /// a native method — nothing in this module calls it on one.
    pub fn instructions(&self) -> &[Instruction] {
        match &self.body {
            MethodBody::Bytecode(instructions) => instructions,
            MethodBody::Native(_) => &[],
        }
    }
}

/// Every compiled method reachable from an entry point, keyed by the same
/// [`MethodId`] the dispatch resolver hands out.
#[derive(Default, Debug)]
pub struct Program {
    methods: FxHashMap<MethodId, Method>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, id: MethodId, arity: usize, instructions: Vec<Instruction>) {
        self.methods.insert(id, Method { arity, body: MethodBody::Bytecode(instructions) });
    }

    /// Register a runtime helper backed by a Rust closure instead of a
    /// bytecode body — how this fixture gives `HostRuntime`'s operator and
    /// enumeration tokens an actual implementation.
    pub fn define_native(&mut self, id: MethodId, arity: usize, body: impl Fn(&[Value]) -> Result<Value, InterpretError> + 'static) {
        self.methods.insert(id, Method { arity, body: MethodBody::Native(Rc::new(body)) });
    }

    pub fn get(&self, id: MethodId) -> Option<&Method> {
        self.methods.get(&id)
    }

    /// Every id currently recorded, for callers that need to count how many
    /// specializations a compile produced (`spec.md` §8's method-cache
    /// scenario) rather than inspect a single method's body.
    pub fn ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods.keys().copied()
    }
}

#[derive(Debug)]
pub enum InterpretError {
    /// A `Throw` reached the top of the call stack with no enclosing catch.
    Uncaught(Value),
    /// The recorded instruction stream itself violates an invariant this
    /// interpreter relies on (stack underflow, a dangling label, an
    /// unresolved exception region) — distinct from `Uncaught`, which means
    /// the *script* threw, not that the stream is malformed.
    Malformed(String),
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpretError::Uncaught(value) => write!(f, "uncaught exception: {value}"),
            InterpretError::Malformed(message) => write!(f, "malformed instruction stream: {message}"),
        }
    }
}

impl std::error::Error for InterpretError {}

/// Run `entry` with `arguments` and return whatever value its body leaves
/// on the stack at `Complete`.
pub fn interpret(program: &Program, entry: MethodId, arguments: &[Value]) -> Result<Value, InterpretError> {
    call_method(program, entry, arguments.to_vec())
}

#[derive(Clone, Copy)]
struct Region {
    catch_start: Option<usize>,
    finally_start: Option<usize>,
    /// Index of this region's own `EndExceptionBlock` — a branch target
    /// landing at or beyond this index has left the region entirely.
    end: usize,
}

fn call_method(program: &Program, id: MethodId, mut arguments: Vec<Value>) -> Result<Value, InterpretError> {
    let method = program
        .get(id)
        .ok_or_else(|| InterpretError::Malformed(format!("call to undefined method {id:?}")))?;
    if let MethodBody::Native(native) = &method.body {
        return native(&arguments);
    }
    let instructions = method.instructions();
    let labels = resolve_labels(instructions);
    let regions = resolve_regions(instructions)?;

    let mut stack: Vec<Value> = Vec::new();
    let mut locals: FxHashMap<VariableHandle, Value> = FxHashMap::default();
    let mut active: Vec<(usize, Region)> = Vec::new();
    let mut ip = 0usize;

    loop {
        let Some(instruction) = instructions.get(ip) else {
            return Ok(Value::Undefined);
        };

        match instruction {
            Instruction::Complete => return Ok(stack.pop().unwrap_or(Value::Undefined)),

            Instruction::LoadArgument(index) => {
                stack.push(arguments.get(*index as usize).cloned().unwrap_or(Value::Undefined));
            }
            Instruction::StoreArgument(index) => {
                let value = pop(&mut stack)?;
                if let Some(slot) = arguments.get_mut(*index as usize) {
                    *slot = value;
                }
            }

            Instruction::DeclareVariable(_, _, handle) => {
                locals.entry(*handle).or_insert(Value::Undefined);
            }
            Instruction::LoadVariable(handle) => {
                stack.push(locals.get(handle).cloned().unwrap_or(Value::Undefined));
            }
            Instruction::StoreVariable(handle) => {
                let value = pop(&mut stack)?;
                locals.insert(*handle, value);
            }

            Instruction::LoadField(name) => {
                let receiver = pop(&mut stack)?;
                stack.push(load_field(&receiver, *name)?);
            }
            Instruction::StoreField(name) => {
                let value = pop(&mut stack)?;
                let receiver = pop(&mut stack)?;
                let Value::Object(fields) = &receiver else {
                    return Err(InterpretError::Malformed("StoreField on a non-object".into()));
                };
                fields.borrow_mut().insert(*name, value);
            }

            Instruction::LoadInt32(v) => stack.push(Value::I32(*v)),
            Instruction::LoadInt64(v) => stack.push(Value::I64(*v)),
            Instruction::LoadDouble(v) => stack.push(Value::F64(*v)),
            Instruction::LoadBoolean(v) => stack.push(Value::Boolean(*v)),
            Instruction::LoadString(v) => stack.push(Value::string(v.as_str())),
            Instruction::LoadStringOrNull(v) => {
                stack.push(v.as_deref().map_or(Value::Null, Value::string));
            }
            Instruction::LoadNull => stack.push(Value::Null),
            Instruction::LoadToken(_) => stack.push(Value::Undefined),

            Instruction::NewArray(_) => stack.push(Value::empty_array()),
            Instruction::NewObject(_) => stack.push(Value::empty_object()),

            Instruction::StoreArrayElement(_) => {
                let value = pop(&mut stack)?;
                let index = pop(&mut stack)?;
                let array = pop(&mut stack)?;
                let Value::Array(items) = &array else {
                    return Err(InterpretError::Malformed("StoreArrayElement on a non-array".into()));
                };
                let index = as_index(&index)?;
                let mut items = items.borrow_mut();
                if index >= items.len() {
                    items.resize(index + 1, Value::Undefined);
                }
                items[index] = value;
            }
            Instruction::LoadArrayElement(_) => {
                let index = pop(&mut stack)?;
                let array = pop(&mut stack)?;
                let Value::Array(items) = &array else {
                    return Err(InterpretError::Malformed("LoadArrayElement on a non-array".into()));
                };
                let index = as_index(&index)?;
                stack.push(items.borrow().get(index).cloned().unwrap_or(Value::Undefined));
            }

            Instruction::Call(callee) => {
                let method = program
                    .get(*callee)
                    .ok_or_else(|| InterpretError::Malformed(format!("call to undefined method {callee:?}")))?;
                if stack.len() < method.arity {
                    return Err(InterpretError::Malformed("stack underflow at Call".into()));
                }
                let call_arguments = stack.split_off(stack.len() - method.arity);
                let result = call_method(program, *callee, call_arguments)?;
                stack.push(result);
            }

            Instruction::Duplicate => {
                let top = stack.last().cloned().ok_or_else(|| InterpretError::Malformed("Duplicate on an empty stack".into()))?;
                stack.push(top);
            }
            Instruction::Pop => {
                pop(&mut stack)?;
            }

            Instruction::CreateLabel(_) | Instruction::DefineLabelPosition(_) => {}

            Instruction::Branch(label) => {
                ip = resolve_label(&labels, *label)?;
                continue;
            }
            Instruction::BranchIfTrue(label) => {
                let condition = pop(&mut stack)?;
                if condition.is_truthy() {
                    ip = resolve_label(&labels, *label)?;
                    continue;
                }
            }
            Instruction::BranchIfFalse(label) => {
                let condition = pop(&mut stack)?;
                if !condition.is_truthy() {
                    ip = resolve_label(&labels, *label)?;
                    continue;
                }
            }
            Instruction::Switch(targets) => {
                let selector = pop(&mut stack)?;
                let index = as_index(&selector)?;
                if let Some(label) = targets.get(index) {
                    ip = resolve_label(&labels, *label)?;
                    continue;
                }
            }

            Instruction::Leave(label) => {
                let target = resolve_label(&labels, *label)?;
                unwind_to(program, instructions, &labels, &regions, &mut stack, &mut locals, &mut active, target)?;
                ip = target;
                continue;
            }
            Instruction::Throw => {
                let exception = pop(&mut stack)?;
                match find_handler(program, instructions, &labels, &regions, &mut stack, &mut locals, &mut active)? {
                    Some(catch_at) => {
                        stack.push(exception);
                        ip = catch_at;
                        continue;
                    }
                    None => return Err(InterpretError::Uncaught(exception)),
                }
            }

            Instruction::BeginExceptionBlock => {
                let region = *regions
                    .get(&ip)
                    .ok_or_else(|| InterpretError::Malformed("unresolved exception region".into()))?;
                active.push((ip, region));
            }
            Instruction::EndExceptionBlock => {
                active.pop();
            }
            Instruction::BeginCatchBlock(_) | Instruction::BeginFinallyBlock => {}

            Instruction::Breakpoint | Instruction::NoOperation => {}

            // These affect how a value converts, not the stack shape in
            // this reference interpreter, which stores already-typed
            // `Value`s rather than boxed/unboxed machine words.
            Instruction::ConvertToBool => {
                let value = pop(&mut stack)?;
                stack.push(Value::Boolean(value.is_truthy()));
            }
            Instruction::ConvertToAny | Instruction::ConvertToString | Instruction::ConvertGeneric(_, _) => {}
        }

        ip += 1;
    }
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, InterpretError> {
    stack.pop().ok_or_else(|| InterpretError::Malformed("stack underflow".into()))
}

/// `Object` fields are keyed, but `Array`/`String` never carry named
/// properties in this value model — their only field a compiled program
/// ever loads is `length` (`ecmac_codegen::loops`'s `for-in`/`for-of`
/// lowering and a source-level `.length` read both go through the same
/// `LoadField`), so any field name on either one resolves to the same
/// length regardless of which name was interned.
fn load_field(receiver: &Value, name: ecmac_ir::Name) -> Result<Value, InterpretError> {
    match receiver {
        Value::Object(fields) => Ok(fields.borrow().get(&name).cloned().unwrap_or(Value::Undefined)),
        Value::Array(items) => Ok(Value::F64(items.borrow().len() as f64)),
        Value::String(s) => Ok(Value::F64(s.chars().count() as f64)),
        _ => Err(InterpretError::Malformed(format!("LoadField on {receiver}, which has no properties"))),
    }
}

fn as_index(value: &Value) -> Result<usize, InterpretError> {
    match value {
        Value::I32(n) if *n >= 0 => Ok(*n as usize),
        Value::I64(n) if *n >= 0 => Ok(*n as usize),
        Value::F64(n) if *n >= 0.0 => Ok(*n as usize),
        _ => Err(InterpretError::Malformed(format!("{value} is not a valid index"))),
    }
}

fn resolve_labels(instructions: &[Instruction]) -> FxHashMap<LabelId, usize> {
    let mut labels = FxHashMap::default();
    for (index, instruction) in instructions.iter().enumerate() {
        if let Instruction::DefineLabelPosition(label) = instruction {
            labels.insert(*label, index + 1);
        }
    }
    labels
}

fn resolve_label(labels: &FxHashMap<LabelId, usize>, label: LabelId) -> Result<usize, InterpretError> {
    labels.get(&label).copied().ok_or_else(|| InterpretError::Malformed(format!("{label:?} has no defined position")))
}

/// One forward scan per method call, matching `BeginExceptionBlock` /
/// `BeginCatchBlock` / `BeginFinallyBlock` / `EndExceptionBlock` markers by
/// nesting depth. Only the first catch and first finally at a given
/// nesting level are recorded — this subset's `try`/`catch`/`finally` has
/// at most one of each, so a second marker at the same depth would mean
/// the stream itself is malformed.
fn resolve_regions(instructions: &[Instruction]) -> Result<FxHashMap<usize, Region>, InterpretError> {
    let mut regions = FxHashMap::default();
    let mut open: Vec<(usize, Option<usize>, Option<usize>)> = Vec::new();

    for (index, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::BeginExceptionBlock => open.push((index, None, None)),
            Instruction::BeginCatchBlock(_) => {
                if let Some(top) = open.last_mut() {
                    top.1.get_or_insert(index + 1);
                }
            }
            Instruction::BeginFinallyBlock => {
                if let Some(top) = open.last_mut() {
                    top.2.get_or_insert(index + 1);
                }
            }
            Instruction::EndExceptionBlock => {
                let (begin, catch_start, finally_start) = open
                    .pop()
                    .ok_or_else(|| InterpretError::Malformed("EndExceptionBlock without a matching begin".into()))?;
                regions.insert(begin, Region { catch_start, finally_start, end: index });
            }
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(InterpretError::Malformed("unterminated exception block".into()));
    }
    Ok(regions)
}

/// Run a region's `finally` body in place, sharing the caller's stack and
/// locals, without re-entering the main instruction loop's control-flow
/// handling — a `finally` emitted by this workspace's driver never itself
/// branches outside its own span.
#[allow(clippy::too_many_arguments)]
fn run_finally(
    program: &Program,
    instructions: &[Instruction],
    labels: &FxHashMap<LabelId, usize>,
    regions: &FxHashMap<usize, Region>,
    stack: &mut Vec<Value>,
    locals: &mut FxHashMap<VariableHandle, Value>,
    active: &mut Vec<(usize, Region)>,
    start: usize,
    stop: usize,
) -> Result<(), InterpretError> {
    let mut ip = start;
    while ip < stop {
        match &instructions[ip] {
            Instruction::BeginExceptionBlock => {
                let region = *regions.get(&ip).ok_or_else(|| InterpretError::Malformed("unresolved exception region".into()))?;
                active.push((ip, region));
            }
            Instruction::EndExceptionBlock => {
                active.pop();
            }
            Instruction::Call(callee) => {
                let method = program
                    .get(*callee)
                    .ok_or_else(|| InterpretError::Malformed(format!("call to undefined method {callee:?}")))?;
                if stack.len() < method.arity {
                    return Err(InterpretError::Malformed("stack underflow at Call".into()));
                }
                let call_arguments = stack.split_off(stack.len() - method.arity);
                let result = call_method(program, *callee, call_arguments)?;
                stack.push(result);
            }
            Instruction::LoadVariable(handle) => stack.push(locals.get(handle).cloned().unwrap_or(Value::Undefined)),
            Instruction::StoreVariable(handle) => {
                let value = pop(stack)?;
                locals.insert(*handle, value);
            }
            Instruction::DeclareVariable(_, _, handle) => {
                locals.entry(*handle).or_insert(Value::Undefined);
            }
            Instruction::LoadField(name) => {
                let receiver = pop(stack)?;
                stack.push(load_field(&receiver, *name)?);
            }
            Instruction::StoreField(name) => {
                let value = pop(stack)?;
                let receiver = pop(stack)?;
                let Value::Object(fields) = &receiver else {
                    return Err(InterpretError::Malformed("StoreField on a non-object".into()));
                };
                fields.borrow_mut().insert(*name, value);
            }
            Instruction::LoadInt32(v) => stack.push(Value::I32(*v)),
            Instruction::LoadInt64(v) => stack.push(Value::I64(*v)),
            Instruction::LoadDouble(v) => stack.push(Value::F64(*v)),
            Instruction::LoadBoolean(v) => stack.push(Value::Boolean(*v)),
            Instruction::LoadString(v) => stack.push(Value::string(v.as_str())),
            Instruction::LoadStringOrNull(v) => stack.push(v.as_deref().map_or(Value::Null, Value::string)),
            Instruction::LoadNull => stack.push(Value::Null),
            Instruction::Duplicate => {
                let top = stack.last().cloned().ok_or_else(|| InterpretError::Malformed("Duplicate on an empty stack".into()))?;
                stack.push(top);
            }
            Instruction::Pop => {
                pop(stack)?;
            }
            Instruction::Branch(label) => {
                ip = resolve_label(labels, *label)?;
                continue;
            }
            Instruction::BranchIfTrue(label) => {
                let condition = pop(stack)?;
                if condition.is_truthy() {
                    ip = resolve_label(labels, *label)?;
                    continue;
                }
            }
            Instruction::BranchIfFalse(label) => {
                let condition = pop(stack)?;
                if !condition.is_truthy() {
                    ip = resolve_label(labels, *label)?;
                    continue;
                }
            }
            Instruction::ConvertToBool => {
                let value = pop(stack)?;
                stack.push(Value::Boolean(value.is_truthy()));
            }
            _ => {}
        }
        ip += 1;
    }
    Ok(())
}

/// Pop every region a `Leave(target)` is jumping out of, running each
/// one's `finally` body as it goes (`spec.md` §4.9 "Try/Catch/Finally").
#[allow(clippy::too_many_arguments)]
fn unwind_to(
    program: &Program,
    instructions: &[Instruction],
    labels: &FxHashMap<LabelId, usize>,
    regions: &FxHashMap<usize, Region>,
    stack: &mut Vec<Value>,
    locals: &mut FxHashMap<VariableHandle, Value>,
    active: &mut Vec<(usize, Region)>,
    target: usize,
) -> Result<(), InterpretError> {
    while let Some(&(begin, region)) = active.last() {
        if target >= begin && target < region.end {
            break;
        }
        active.pop();
        if let Some(finally_start) = region.finally_start {
            run_finally(program, instructions, labels, regions, stack, locals, active, finally_start, region.end)?;
        }
    }
    Ok(())
}

/// Unwind from a `Throw`, running every skipped region's `finally` body,
/// and return the position of the nearest enclosing catch body, if any.
fn find_handler(
    program: &Program,
    instructions: &[Instruction],
    labels: &FxHashMap<LabelId, usize>,
    regions: &FxHashMap<usize, Region>,
    stack: &mut Vec<Value>,
    locals: &mut FxHashMap<VariableHandle, Value>,
    active: &mut Vec<(usize, Region)>,
) -> Result<Option<usize>, InterpretError> {
    while let Some((_, region)) = active.pop() {
        if let Some(catch_start) = region.catch_start {
            return Ok(Some(catch_start));
        }
        if let Some(finally_start) = region.finally_start {
            run_finally(program, instructions, labels, regions, stack, locals, active, finally_start, region.end)?;
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IlEmitter, RecordingEmitter};
    use ecmac_types::Type;
    use std::cell::RefCell;

    fn compile(build: impl FnOnce(&mut RecordingEmitter)) -> Vec<Instruction> {
        let mut emitter = RecordingEmitter::new();
        build(&mut emitter);
        emitter.complete();
        emitter.instructions().to_vec()
    }

    #[test]
    fn adds_two_integers() {
        let instructions = compile(|e| {
            e.load_i32(2);
            e.load_i32(3);
        });
        // This fixture has no arithmetic opcode of its own (arithmetic is
        // emitted as a `Call` to a host runtime helper in the real driver);
        // exercise the simplest possible program instead: two loads, the
        // last one wins as the `Complete` return value.
        let mut program = Program::new();
        program.define(MethodId(1), 0, instructions);
        let result = interpret(&program, MethodId(1), &[]).unwrap();
        assert_eq!(result, Value::I32(3));
    }

    #[test]
    fn branch_skips_the_dead_arm() {
        let mut emitter = RecordingEmitter::new();
        let end = emitter.create_label();
        emitter.load_bool(true);
        emitter.branch_if_false(end);
        emitter.load_i32(1);
        emitter.branch(end);
        emitter.define_label_position(end);
        emitter.load_i32(99);
        emitter.complete();

        let mut program = Program::new();
        program.define(MethodId(1), 0, emitter.instructions().to_vec());
        let result = interpret(&program, MethodId(1), &[]).unwrap();
        assert_eq!(result, Value::I32(99));
    }

    #[test]
    fn field_round_trips_through_an_object() {
        let name = ecmac_ir::Name(7);
        let mut emitter = RecordingEmitter::new();
        emitter.new_object(MethodId(0));
        let obj = emitter.create_temporary_variable(Type::Universal);
        emitter.store_variable(obj);
        emitter.load_variable(obj);
        emitter.load_i32(42);
        emitter.store_field(name);
        emitter.load_variable(obj);
        emitter.load_field(name);
        emitter.complete();

        let mut program = Program::new();
        program.define(MethodId(1), 0, emitter.instructions().to_vec());
        let result = interpret(&program, MethodId(1), &[]).unwrap();
        assert_eq!(result, Value::I32(42));
    }

    #[test]
    fn field_load_on_an_array_or_string_yields_its_length_regardless_of_name() {
        let name = ecmac_ir::Name(7);
        let receiver = Value::Array(Rc::new(RefCell::new(vec![Value::I32(1), Value::I32(2), Value::I32(3)])));
        assert_eq!(load_field(&receiver, name).unwrap(), Value::F64(3.0));
        assert_eq!(load_field(&Value::string("hi"), name).unwrap(), Value::F64(2.0));
    }

    #[test]
    fn a_call_recurses_into_the_callee_method() {
        let callee = compile(|e| {
            e.load_argument(0);
        });
        let caller = compile(|e| {
            e.load_i32(5);
            e.call(MethodId(2));
        });

        let mut program = Program::new();
        program.define(MethodId(2), 1, callee);
        program.define(MethodId(1), 0, caller);

        let result = interpret(&program, MethodId(1), &[]).unwrap();
        assert_eq!(result, Value::I32(5));
    }

    #[test]
    fn finally_runs_even_when_the_try_body_leaves_early() {
        let mut emitter = RecordingEmitter::new();
        let flag = emitter.declare_variable(Type::Boolean, None);
        let after = emitter.create_label();
        emitter.load_bool(false);
        emitter.store_variable(flag);

        emitter.begin_exception_block();
        emitter.leave(after);
        emitter.begin_finally_block();
        emitter.load_bool(true);
        emitter.store_variable(flag);
        emitter.end_exception_block();

        emitter.define_label_position(after);
        emitter.load_variable(flag);
        emitter.complete();

        let mut program = Program::new();
        program.define(MethodId(1), 0, emitter.instructions().to_vec());
        let result = interpret(&program, MethodId(1), &[]).unwrap();
        assert_eq!(result, Value::Boolean(true));
    }

    #[test]
    fn a_thrown_value_is_caught_and_bound() {
        let mut emitter = RecordingEmitter::new();
        let bound = emitter.declare_variable(Type::Universal, None);
        let after = emitter.create_label();

        emitter.begin_exception_block();
        emitter.load_string("boom");
        emitter.throw();
        emitter.begin_catch_block(crate::handle::Token(0));
        emitter.store_variable(bound);
        emitter.leave(after);
        emitter.end_exception_block();

        emitter.define_label_position(after);
        emitter.load_variable(bound);
        emitter.complete();

        let mut program = Program::new();
        program.define(MethodId(1), 0, emitter.instructions().to_vec());
        let result = interpret(&program, MethodId(1), &[]).unwrap();
        assert_eq!(result, Value::string("boom"));
    }

    #[test]
    fn an_uncaught_throw_surfaces_as_an_error() {
        let mut emitter = RecordingEmitter::new();
        emitter.load_string("boom");
        emitter.throw();
        emitter.complete();

        let mut program = Program::new();
        program.define(MethodId(1), 0, emitter.instructions().to_vec());
        let err = interpret(&program, MethodId(1), &[]).unwrap_err();
        assert!(matches!(err, InterpretError::Uncaught(Value::String(s)) if &*s == "boom"));
    }
}
