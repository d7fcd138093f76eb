//! Per-specialization codegen state (`spec.md` §4.6 "Optimization context",
//! §4.10 "Local-slot and temporary management", §4.11 "Loop lowering").
//!
//! Split from [`ecmac_resolve::ResolveContext`], which holds the parts type
//! inference needs and this driver does not: break/continue targets, the
//! declared-variable-to-IL-slot map, and the exception-region nesting depth
//! that decides whether an exit emits `Branch` or `Leave`.

use ecmac_il::{LabelId, Token, VariableHandle};
use ecmac_ir::Name;
use ecmac_scope::{ScopeId, SlotHandle};
use rustc_hash::FxHashMap;

/// The opaque handle a `with` statement's object expression is evaluated
/// into once on entry (`spec.md` §4.6's object scopes name a static
/// prototype only; the runtime reference they forward `LoadField`/
/// `StoreField` against still has to live somewhere for the duration of the
/// body, since re-evaluating the `with(expr)` expression per name lookup
/// would re-run its side effects).
///
/// `Token(0)` is reserved to mean "the global object" — every `load_token`
/// the emitter sees with this value must resolve to the same host-provided
/// reference (`spec.md` §6 "Runtime contract": host-resolved opaque
/// references go through a token, and the global object is exactly such a
/// reference with no dedicated IL instruction of its own).
pub const GLOBAL_OBJECT_TOKEN: Token = Token(0);

/// `catch (e) { ... }` with no type filter catches anything thrown
/// (`spec.md` §4.9 "Try/Catch/Finally" has no `catch (e if ...)` guard
/// form) — every `BeginCatchBlock` this crate emits uses this one token.
pub const CATCH_ALL_EXCEPTION_TOKEN: Token = Token(1);

/// One loop's break/continue targets (`spec.md` §4.11), pushed for the
/// duration of the loop body.
#[derive(Copy, Clone)]
pub struct LoopFrame {
    /// The statement label this loop is addressable by (`continue outer;`),
    /// if any was attached.
    pub label: Option<Name>,
    pub continue_label: ecmac_il::LabelId,
    pub break_label: ecmac_il::LabelId,
    /// `switch` pushes a frame too so an unlabeled `break` inside a case
    /// finds it, but an unlabeled `continue` must skip straight past it to
    /// the nearest enclosing loop (`spec.md` §4.9: a `switch` body is not
    /// itself iterable) — `find_loop`'s label-free path can't tell a
    /// `switch` frame from a loop's without this.
    pub is_switch: bool,
}

#[derive(Default)]
pub struct CodegenContext {
    loops: Vec<LoopFrame>,
    /// How many `try` regions (`spec.md` §4.9) the current statement is
    /// lexically nested inside. A `break`/`continue`/`return` emitted at a
    /// depth greater than zero uses the emitter's `leave` form rather than
    /// a bare `branch`/`return`, so the interpreter (or a real host VM)
    /// runs every intervening `finally` on the way out.
    exception_depth: u32,
    /// `SlotHandle(n) <-> VariableHandle(n)`: the scope chain's opaque slot
    /// handle and this emitter's variable handle share one numbering by
    /// construction (see [`CodegenContext::slot_for`]), so this table only
    /// needs to remember which declared-variable `Name` a slot was most
    /// recently allocated for — `ecmac_resolve` already owns the
    /// `DeclaredVariable::slot` field itself; this side table exists so a
    /// fresh lookup by `Name` alone (e.g. a loop variable rebound each
    /// iteration) does not require threading a `ScopeId` through every
    /// call site.
    temporaries_in_flight: FxHashMap<Name, VariableHandle>,
    /// Which local holds a `with` scope's evaluated object reference.
    with_objects: FxHashMap<ScopeId, VariableHandle>,
    /// Where a `return` statement's value is parked and where control
    /// transfers to pick it back up (`spec.md` §4.9 "Return"): set once per
    /// specialization before its body is lowered, so a `return` nested
    /// inside a `try` can still reach the method's single exit point
    /// through `Leave` rather than needing its own copy of every enclosing
    /// `finally`.
    return_target: Option<(VariableHandle, LabelId)>,
}

impl CodegenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_loop(&mut self, frame: LoopFrame) {
        self.loops.push(frame);
    }

    pub fn pop_loop(&mut self) {
        self.loops.pop();
    }

    /// `break label?` / `continue label?` target lookup (`spec.md` §4.11):
    /// the nearest loop when `label` is `None`, otherwise the loop that
    /// label was attached to.
    pub fn find_loop(&self, label: Option<Name>) -> Option<LoopFrame> {
        match label {
            None => self.loops.last().copied(),
            Some(name) => self.loops.iter().rev().find(|frame| frame.label == Some(name)).copied(),
        }
    }

    /// `continue label?` target lookup: unlike [`Self::find_loop`], an
    /// unlabeled search skips any `switch` frame in the way — `continue`
    /// with no label always means the nearest enclosing loop.
    pub fn find_continue_target(&self, label: Option<Name>) -> Option<LoopFrame> {
        match label {
            None => self.loops.iter().rev().find(|frame| !frame.is_switch).copied(),
            Some(name) => self.loops.iter().rev().find(|frame| frame.label == Some(name)).copied(),
        }
    }

    pub fn enter_exception_region(&mut self) {
        self.exception_depth += 1;
    }

    pub fn exit_exception_region(&mut self) {
        self.exception_depth = self.exception_depth.saturating_sub(1);
    }

    /// Whether a `break`/`continue`/`return` here must cross a `try`
    /// boundary on its way to its target (`spec.md` §4.9: "Inside a
    /// try/catch/finally, all branch emissions use the emitter's leave form
    /// instead of unconditional branch").
    pub fn in_exception_region(&self) -> bool {
        self.exception_depth > 0
    }

    pub fn remember_slot(&mut self, name: Name, handle: VariableHandle) {
        self.temporaries_in_flight.insert(name, handle);
    }

    pub fn recall_slot(&self, name: Name) -> Option<VariableHandle> {
        self.temporaries_in_flight.get(&name).copied()
    }

    pub fn bind_with_object(&mut self, scope: ScopeId, handle: VariableHandle) {
        self.with_objects.insert(scope, handle);
    }

    pub fn with_object(&self, scope: ScopeId) -> Option<VariableHandle> {
        self.with_objects.get(&scope).copied()
    }

    pub fn set_return_target(&mut self, slot: VariableHandle, label: LabelId) {
        self.return_target = Some((slot, label));
    }

    pub fn return_target(&self) -> Option<(VariableHandle, LabelId)> {
        self.return_target
    }
}

/// The scope chain's handle and this emitter's handle are deliberately kept
/// numerically identical (`ecmac_scope::SlotHandle` is opaque exactly so a
/// downstream crate can make this choice) — converting between them is
/// therefore a bare reinterpretation, not a lookup.
pub fn slot_to_variable(slot: SlotHandle) -> VariableHandle {
    VariableHandle(slot.0)
}

pub fn variable_to_slot(handle: VariableHandle) -> SlotHandle {
    SlotHandle(handle.0)
}
