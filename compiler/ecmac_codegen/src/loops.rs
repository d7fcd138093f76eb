//! Loop lowering (`spec.md` §4.11 "Loop lowering"): the test-at-top
//! template shared by `while`/`for`/`for-in`/`for-of`, and the
//! test-at-bottom template `do-while` needs instead, both built from the
//! same [`ecmac_il::IlEmitter`] label/branch primitives [`crate::stmt`]
//! uses for `if`.
//!
//! `for-in`/`for-of` have no dedicated iterator opcode in this IL — both
//! desugar to materializing the receiver's enumerated names/values into an
//! array once via [`ecmac_proto::HostRuntime::enumerate_property_names_method`]
//! / `enumerate_property_values_method`, then indexing through it with an
//! ordinary counted loop.

use crate::context::LoopFrame;
use crate::lowering::Lowering;
use ecmac_diagnostic::CompileError;
use ecmac_il::IlEmitter;
use ecmac_ir::{ExprId, Name, StmtId};
use ecmac_proto::{HostRuntime, OperatorKind};
use ecmac_scope::ScopeId;
use ecmac_types::Type;

pub fn generate_while<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, label: Option<Name>, cond: ExprId, body: StmtId) -> Result<(), CompileError> {
    let test = lowering.emitter.create_label();
    let break_label = lowering.emitter.create_label();

    lowering.emitter.define_label_position(test);
    lowering.generate_expr(scope, cond)?;
    lowering.emitter.convert_to_bool();
    lowering.emitter.branch_if_false(break_label);

    lowering.ctx.push_loop(LoopFrame { label, continue_label: test, break_label, is_switch: false });
    lowering.generate_stmt(scope, body)?;
    lowering.ctx.pop_loop();

    lowering.emitter.branch(test);
    lowering.emitter.define_label_position(break_label);
    Ok(())
}

pub fn generate_do_while<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, label: Option<Name>, body: StmtId, cond: ExprId) -> Result<(), CompileError> {
    let body_start = lowering.emitter.create_label();
    let test = lowering.emitter.create_label();
    let break_label = lowering.emitter.create_label();

    lowering.emitter.define_label_position(body_start);
    lowering.ctx.push_loop(LoopFrame { label, continue_label: test, break_label, is_switch: false });
    lowering.generate_stmt(scope, body)?;
    lowering.ctx.pop_loop();

    lowering.emitter.define_label_position(test);
    lowering.generate_expr(scope, cond)?;
    lowering.emitter.convert_to_bool();
    lowering.emitter.branch_if_true(body_start);
    lowering.emitter.define_label_position(break_label);
    Ok(())
}

/// `for (;cond;update) body` once `init` has already run (`spec.md` §4.11):
/// `continue` runs `update` before re-testing `cond`, matching the
/// language's own per-iteration evaluation order.
pub fn generate_for<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, label: Option<Name>, cond: Option<ExprId>, update: Option<ExprId>, body: StmtId) -> Result<(), CompileError> {
    let test = lowering.emitter.create_label();
    let continue_label = lowering.emitter.create_label();
    let break_label = lowering.emitter.create_label();

    lowering.emitter.define_label_position(test);
    if let Some(cond) = cond {
        lowering.generate_expr(scope, cond)?;
        lowering.emitter.convert_to_bool();
        lowering.emitter.branch_if_false(break_label);
    }

    lowering.ctx.push_loop(LoopFrame { label, continue_label, break_label, is_switch: false });
    lowering.generate_stmt(scope, body)?;
    lowering.ctx.pop_loop();

    lowering.emitter.define_label_position(continue_label);
    if let Some(update) = update {
        lowering.generate_expr_for_effect(scope, update)?;
    }
    lowering.emitter.branch(test);
    lowering.emitter.define_label_position(break_label);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn generate_for_in<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, label: Option<Name>, lhs_name: Name, declares: bool, object: ExprId, body: StmtId) -> Result<(), CompileError> {
    generate_enumerated_for(lowering, scope, label, lhs_name, declares, object, body, R::enumerate_property_names_method(), Type::String)
}

#[allow(clippy::too_many_arguments)]
pub fn generate_for_of<E: IlEmitter, R: HostRuntime>(lowering: &mut Lowering<'_, E, R>, scope: ScopeId, label: Option<Name>, lhs_name: Name, declares: bool, iterable: ExprId, body: StmtId) -> Result<(), CompileError> {
    generate_enumerated_for(lowering, scope, label, lhs_name, declares, iterable, body, R::enumerate_property_values_method(), Type::Universal)
}

#[allow(clippy::too_many_arguments)]
fn generate_enumerated_for<E: IlEmitter, R: HostRuntime>(
    lowering: &mut Lowering<'_, E, R>,
    scope: ScopeId,
    label: Option<Name>,
    lhs_name: Name,
    _declares: bool,
    source: ExprId,
    body: StmtId,
    enumerate: ecmac_types::MethodId,
    element_ty: Type,
) -> Result<(), CompileError> {
    let span = lowering.arena.expr(source).span;
    lowering.generate_expr(scope, source)?;
    lowering.convert_to(lowering.facts.type_of(source), Type::Universal);
    lowering.emitter.call(enumerate);
    let items = lowering.emitter.create_temporary_variable(Type::Universal);
    lowering.emitter.store_variable(items);

    let index = lowering.emitter.create_temporary_variable(Type::I32);
    lowering.emitter.load_i32(0);
    lowering.emitter.store_variable(index);

    let length_name = lowering.interner.intern("length");
    let test = lowering.emitter.create_label();
    let continue_label = lowering.emitter.create_label();
    let break_label = lowering.emitter.create_label();

    lowering.emitter.define_label_position(test);
    lowering.emitter.load_variable(index);
    lowering.emitter.convert_to_any();
    lowering.emitter.load_variable(items);
    lowering.emitter.load_field(length_name);
    lowering.emit_operator_call(OperatorKind::Lt);
    lowering.emitter.convert_to_bool();
    lowering.emitter.branch_if_false(break_label);

    lowering.emitter.load_variable(items);
    lowering.emitter.load_variable(index);
    lowering.emitter.load_array_element(element_ty);
    crate::names::store_name(lowering.emitter, lowering.ctx, lowering.chain, lowering.runtime, scope, lhs_name, element_ty, false, &lowering.path, lowering.source, span)?;

    lowering.ctx.push_loop(LoopFrame { label, continue_label, break_label, is_switch: false });
    lowering.generate_stmt(scope, body)?;
    lowering.ctx.pop_loop();

    lowering.emitter.define_label_position(continue_label);
    lowering.emitter.load_variable(index);
    lowering.emitter.load_i32(1);
    lowering.emit_operator_call(OperatorKind::Add);
    lowering.emitter.convert_generic(Type::Universal, Type::I32);
    lowering.emitter.store_variable(index);
    lowering.emitter.branch(test);

    lowering.emitter.define_label_position(break_label);
    lowering.emitter.release_temporary_variable(index);
    lowering.emitter.release_temporary_variable(items);
    Ok(())
}
