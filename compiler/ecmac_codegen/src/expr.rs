//! Per-expression code generation (`spec.md` §4.9 "GenerateCode",
//! expression variants): every rule leaves exactly one value on top of the
//! emitter's stack, mirroring the contract `ecmac_resolve::expr` already
//! established for static types over the same tree.

use crate::call::{generate_call, generate_new};
use crate::lowering::Lowering;
use crate::names::{load_name, store_name};
use ecmac_diagnostic::CompileError;
use ecmac_il::IlEmitter;
use ecmac_ir::{BinaryOp, CompoundAssignOp, ExprId, ExprKind, ObjectProperty, PrimitiveLiteral, UnaryOp};
use ecmac_proto::{HostRuntime, OperatorKind};
use ecmac_scope::{ConstValue, ScopeId};
use ecmac_types::Type;

impl<'a, E: IlEmitter, R: HostRuntime> Lowering<'a, E, R> {
    /// `GenerateCode(expr)`: push `expr`'s value, converting it to its
    /// already-inferred static type along the way where the two primitives
    /// that do the pushing (a literal load, a host-intrinsic call) don't
    /// already guarantee that type.
    pub fn generate_expr(&mut self, scope: ScopeId, id: ExprId) -> Result<(), CompileError> {
        let expr = self.arena.expr(id).clone();
        let span = expr.span;
        match expr.kind {
            ExprKind::Literal(lit) => self.generate_literal(&lit),

            ExprKind::ArrayLiteral(elements) => self.generate_array_literal(scope, elements),

            ExprKind::ObjectLiteral(props) => self.generate_object_literal(scope, &props),

            ExprKind::TemplateLiteral { cooked, exprs } => self.generate_template_literal(scope, &cooked, exprs),

            ExprKind::Name(name) => {
                let ty = self.facts.type_of(id);
                load_name(self.emitter, self.ctx, self.chain, self.runtime, scope, name, ty, &self.path, self.source, span)
            }

            ExprKind::Member { object, property } => {
                self.generate_expr(scope, object)?;
                self.emitter.load_field(property);
                Ok(())
            }

            ExprKind::Index { object, index } => {
                let element_ty = self.facts.type_of(id);
                self.generate_expr(scope, object)?;
                self.generate_expr(scope, index)?;
                self.emitter.load_array_element(element_ty);
                Ok(())
            }

            ExprKind::Call { callee, args } => generate_call(self, scope, callee, args, id),
            ExprKind::New { callee, args } => generate_new(self, scope, callee, args, id),

            ExprKind::Assign { target, value } => self.generate_assign(scope, target, value, true),

            ExprKind::CompoundAssign { op, target, value } => self.generate_compound_assign(scope, op, target, value, id),

            ExprKind::Unary { op, operand } => self.generate_unary(scope, op, operand, id),

            ExprKind::Binary { op, left, right } => self.generate_binary(scope, op, left, right, id),

            ExprKind::Ternary { cond, then_expr, else_expr } => self.generate_ternary(scope, cond, then_expr, else_expr, id),

            ExprKind::Sequence(exprs) => {
                let ids: Vec<_> = self.arena.expr_ids(exprs).collect();
                let Some((last, init)) = ids.split_last() else {
                    return self.push_undefined(Type::Undefined);
                };
                for e in init {
                    self.generate_expr_for_effect(scope, *e)?;
                }
                self.generate_expr(scope, *last)
            }

            ExprKind::Function(function_id) => self.generate_function_expr(scope, function_id, id),
        }
    }

    /// Evaluate `id` purely for side effects; no value is left on the
    /// stack. Used for an expression statement and the non-final slots of
    /// a comma expression — splitting it out (rather than always
    /// generating a value and popping it) lets an assignment skip its
    /// `keep_result` duplication when nothing downstream needs the result.
    pub fn generate_expr_for_effect(&mut self, scope: ScopeId, id: ExprId) -> Result<(), CompileError> {
        let expr = self.arena.expr(id).clone();
        if let ExprKind::Assign { target, value } = expr.kind {
            return self.generate_assign(scope, target, value, false);
        }
        self.generate_expr(scope, id)?;
        self.emitter.pop();
        Ok(())
    }

    fn generate_literal(&mut self, lit: &PrimitiveLiteral) -> Result<(), CompileError> {
        match lit {
            PrimitiveLiteral::Null => {
                self.emitter.load_null();
                Ok(())
            }
            PrimitiveLiteral::Undefined => self.push_undefined(Type::Undefined),
            PrimitiveLiteral::Boolean(b) => {
                self.emitter.load_bool(*b);
                Ok(())
            }
            PrimitiveLiteral::Number(n) => {
                self.emitter.load_f64(*n);
                Ok(())
            }
            PrimitiveLiteral::String(name) => {
                let text = self.interner.resolve(*name);
                self.emitter.load_string(&text);
                Ok(())
            }
            // Regex literal construction is not wired to a host intrinsic
            // here; treated as an opaque dynamic value until a concrete
            // `RegExp` prototype is added to the runtime contract.
            PrimitiveLiteral::Regex { .. } => self.push_undefined(Type::Universal),
        }
    }

    /// Push `undefined` by reading a temporary that was never written —
    /// [`ecmac_il::interpret`]'s reference semantics default every unset
    /// local to `undefined`, so this is a real push rather than a
    /// dedicated opcode the IL vocabulary doesn't have.
    pub(crate) fn push_undefined(&mut self, ty: Type) -> Result<(), CompileError> {
        let handle = self.emitter.create_temporary_variable(ty);
        self.emitter.load_variable(handle);
        self.emitter.release_temporary_variable(handle);
        Ok(())
    }

    fn generate_array_literal(&mut self, scope: ScopeId, elements: ecmac_ir::ExprRange) -> Result<(), CompileError> {
        self.emitter.new_array(Type::Universal);
        let holder = self.emitter.create_temporary_variable(Type::Universal);
        self.emitter.store_variable(holder);

        let ids: Vec<_> = self.arena.expr_ids(elements).collect();
        for (index, element) in ids.into_iter().enumerate() {
            self.emitter.load_variable(holder);
            self.emitter.load_i32(index as i32);
            self.generate_expr(scope, element)?;
            self.convert_to(self.facts.type_of(element), Type::Universal);
            self.emitter.store_array_element(Type::Universal);
        }

        self.emitter.load_variable(holder);
        self.emitter.release_temporary_variable(holder);
        Ok(())
    }

    /// No constructor runs for an object literal (`spec.md` §3 "literal
    /// (primitive, array, object, template)" names no user-visible
    /// constructor for it) — [`ecmac_types::MethodId`]`(0)` is reserved to
    /// mean "plain data object, no constructor side effects", the
    /// object-literal counterpart of
    /// [`crate::context::GLOBAL_OBJECT_TOKEN`].
    fn generate_object_literal(&mut self, scope: ScopeId, props: &[ObjectProperty]) -> Result<(), CompileError> {
        self.emitter.new_object(ecmac_types::MethodId(0));
        let holder = self.emitter.create_temporary_variable(Type::Universal);
        self.emitter.store_variable(holder);

        for prop in props {
            self.emitter.load_variable(holder);
            self.generate_expr(scope, prop.value)?;
            self.convert_to(self.facts.type_of(prop.value), Type::Universal);
            self.emitter.store_field(prop.key);
        }

        self.emitter.load_variable(holder);
        self.emitter.release_temporary_variable(holder);
        Ok(())
    }

    fn generate_template_literal(&mut self, scope: ScopeId, cooked: &[ecmac_ir::Name], exprs: ecmac_ir::ExprRange) -> Result<(), CompileError> {
        let expr_ids: Vec<_> = self.arena.expr_ids(exprs).collect();
        debug_assert_eq!(cooked.len(), expr_ids.len() + 1);

        let first_text = self.interner.resolve(cooked[0]);
        self.emitter.load_string(&first_text);

        for (chunk, expr_id) in cooked[1..].iter().zip(expr_ids) {
            let expr_ty = self.facts.type_of(expr_id);
            self.generate_expr(scope, expr_id)?;
            if expr_ty != Type::String {
                self.emit_operator_call(OperatorKind::ToDisplayString);
            }
            self.emit_operator_call(OperatorKind::Add);

            let text = self.interner.resolve(*chunk);
            if !text.is_empty() {
                self.emitter.load_string(&text);
                self.emit_operator_call(OperatorKind::Add);
            }
        }
        Ok(())
    }

    fn generate_function_expr(&mut self, scope: ScopeId, function_id: ecmac_ir::FunctionId, expr_id: ExprId) -> Result<(), CompileError> {
        let prototype = match self.facts.type_of(expr_id) {
            Type::Instance(prototype) => prototype,
            _ => {
                let span = self.arena.expr(expr_id).span;
                return Err(self.internal_invariant(span, "a function expression resolved to a non-instance type"));
            }
        };
        let generator_id = self.generators.create(function_id, scope);
        let proto = self.runtime.prototypes_mut().get_mut(prototype);
        proto.on_call = Some(ecmac_proto::Callable::Method(generator_id));
        proto.on_construct = Some(ecmac_proto::Callable::Method(generator_id));

        self.emitter.new_object(generator_id);
        Ok(())
    }

    /// `GenerateSet` wiring for `target = value` (`spec.md` §4.9
    /// "Assignment"): evaluate the receiver (if any) before the value so a
    /// property/array target's receiver sits beneath it on the stack, as
    /// [`crate::names::store_name`] and
    /// [`ecmac_il::IlEmitter::store_field`]/
    /// [`ecmac_il::IlEmitter::store_array_element`] require.
    pub(crate) fn generate_assign(&mut self, scope: ScopeId, target: ExprId, value: ExprId, keep_result: bool) -> Result<(), CompileError> {
        let target_expr = self.arena.expr(target).clone();
        let value_ty = self.facts.type_of(value);
        match target_expr.kind {
            ExprKind::Name(name) => {
                self.generate_expr(scope, value)?;
                let target_ty = self.facts.type_of(target);
                self.convert_to(value_ty, target_ty);
                store_name(self.emitter, self.ctx, self.chain, self.runtime, scope, name, target_ty, keep_result, &self.path, self.source, target_expr.span)
            }
            ExprKind::Member { object, property } => {
                self.generate_expr(scope, object)?;
                self.generate_expr(scope, value)?;
                self.convert_to(value_ty, Type::Universal);
                if keep_result {
                    self.emitter.duplicate();
                }
                self.emitter.store_field(property);
                Ok(())
            }
            ExprKind::Index { object, index } => {
                self.generate_expr(scope, object)?;
                self.generate_expr(scope, index)?;
                self.generate_expr(scope, value)?;
                self.convert_to(value_ty, Type::Universal);
                if keep_result {
                    self.emitter.duplicate();
                }
                self.emitter.store_array_element(Type::Universal);
                Ok(())
            }
            _ => Err(self.internal_invariant(target_expr.span, "an assignment target was neither a name, member, nor index expression")),
        }
    }

    fn generate_compound_assign(&mut self, scope: ScopeId, op: CompoundAssignOp, target: ExprId, value: ExprId, expr_id: ExprId) -> Result<(), CompileError> {
        // `a op= b` reads as `a = a op b`: the read side pushes `a`'s
        // current value, then `b`, then the combined operator runs, and
        // only its result ever reaches a store.
        let result_ty = self.facts.type_of(expr_id);
        self.generate_expr(scope, target)?;
        self.generate_expr(scope, value)?;
        self.emit_operator_call(compound_operator(op));

        let target_expr = self.arena.expr(target).clone();
        match target_expr.kind {
            ExprKind::Name(name) => store_name(self.emitter, self.ctx, self.chain, self.runtime, scope, name, result_ty, true, &self.path, self.source, target_expr.span),
            ExprKind::Member { object, property } => {
                // The receiver for the store has to be re-evaluated under
                // the computed result; re-evaluating `object` is accepted
                // here rather than adding another temporary-juggling path,
                // since a computed member target with side effects is rare
                // in a compound assignment.
                let holder = self.emitter.create_temporary_variable(result_ty);
                self.emitter.store_variable(holder);
                self.generate_expr(scope, object)?;
                self.emitter.load_variable(holder);
                self.emitter.release_temporary_variable(holder);
                self.emitter.duplicate();
                self.emitter.store_field(property);
                Ok(())
            }
            ExprKind::Index { object, index } => {
                let holder = self.emitter.create_temporary_variable(result_ty);
                self.emitter.store_variable(holder);
                self.generate_expr(scope, object)?;
                self.generate_expr(scope, index)?;
                self.emitter.load_variable(holder);
                self.emitter.release_temporary_variable(holder);
                self.emitter.duplicate();
                self.emitter.store_array_element(Type::Universal);
                Ok(())
            }
            _ => Err(self.internal_invariant(target_expr.span, "a compound assignment target was neither a name, member, nor index expression")),
        }
    }

    fn generate_unary(&mut self, scope: ScopeId, op: UnaryOp, operand: ExprId, expr_id: ExprId) -> Result<(), CompileError> {
        match op {
            UnaryOp::Not => {
                self.generate_expr(scope, operand)?;
                self.emitter.convert_to_bool();
                self.emit_boolean_not();
                Ok(())
            }
            UnaryOp::TypeOf => {
                self.generate_expr(scope, operand)?;
                self.emit_operator_call(OperatorKind::TypeOf);
                Ok(())
            }
            UnaryOp::Void => {
                self.generate_expr_for_effect(scope, operand)?;
                self.push_undefined(Type::Undefined)
            }
            UnaryOp::Delete => {
                // `delete` on anything but a property reference is a no-op
                // that evaluates to `true`; only the member/index shape
                // could sensibly remove a property, and doing so needs a
                // host intrinsic this runtime contract does not yet name,
                // so both shapes fall back to the same no-op-but-truthy
                // result for now.
                self.generate_expr_for_effect(scope, operand)?;
                self.emitter.load_bool(true);
                Ok(())
            }
            UnaryOp::BitNot => {
                self.generate_expr(scope, operand)?;
                self.convert_to(self.facts.type_of(operand), Type::I32);
                self.emit_operator_call(OperatorKind::UnaryBitNot);
                Ok(())
            }
            UnaryOp::Neg => {
                self.generate_expr(scope, operand)?;
                self.emit_operator_call(OperatorKind::UnaryNegate);
                Ok(())
            }
            UnaryOp::Plus => {
                self.generate_expr(scope, operand)?;
                self.convert_to(self.facts.type_of(operand), self.facts.type_of(expr_id));
                Ok(())
            }
            UnaryOp::Increment { is_prefix } => self.generate_increment_decrement(scope, OperatorKind::Add, operand, is_prefix, expr_id),
            UnaryOp::Decrement { is_prefix } => self.generate_increment_decrement(scope, OperatorKind::Sub, operand, is_prefix, expr_id),
        }
    }

    fn generate_increment_decrement(&mut self, scope: ScopeId, operator: OperatorKind, operand: ExprId, is_prefix: bool, expr_id: ExprId) -> Result<(), CompileError> {
        let result_ty = self.facts.type_of(expr_id);
        self.generate_expr(scope, operand)?;
        if !is_prefix {
            self.emitter.duplicate();
        }
        self.emitter.load_f64(1.0);
        self.emit_operator_call(operator);

        let operand_expr = self.arena.expr(operand).clone();
        let ExprKind::Name(name) = operand_expr.kind else {
            return Err(self.internal_invariant(operand_expr.span, "increment/decrement operand was not a name"));
        };

        if is_prefix {
            store_name(self.emitter, self.ctx, self.chain, self.runtime, scope, name, result_ty, true, &self.path, self.source, operand_expr.span)
        } else {
            let holder = self.emitter.create_temporary_variable(result_ty);
            self.emitter.store_variable(holder);
            self.emitter.load_variable(holder);
            store_name(self.emitter, self.ctx, self.chain, self.runtime, scope, name, result_ty, false, &self.path, self.source, operand_expr.span)?;
            self.emitter.load_variable(holder);
            self.emitter.release_temporary_variable(holder);
            Ok(())
        }
    }

    fn generate_binary(&mut self, scope: ScopeId, op: BinaryOp, left: ExprId, right: ExprId, expr_id: ExprId) -> Result<(), CompileError> {
        match op {
            BinaryOp::LogicalAnd => return self.generate_short_circuit(scope, left, right, expr_id, false),
            BinaryOp::LogicalOr => return self.generate_short_circuit(scope, left, right, expr_id, true),
            _ => {}
        }

        self.generate_expr(scope, left)?;
        self.generate_expr(scope, right)?;

        match op {
            BinaryOp::StrictEq => {
                self.emitter.call(R::strict_equals_method());
                Ok(())
            }
            BinaryOp::StrictNotEq => {
                self.emitter.call(R::strict_equals_method());
                self.emitter.convert_to_bool();
                self.emit_boolean_not();
                Ok(())
            }
            BinaryOp::Eq => {
                self.emit_operator_call(OperatorKind::LooseEquals);
                Ok(())
            }
            BinaryOp::NotEq => {
                self.emit_operator_call(OperatorKind::LooseEquals);
                self.emitter.convert_to_bool();
                self.emit_boolean_not();
                Ok(())
            }
            _ => {
                self.emit_operator_call(binary_operator(op));
                Ok(())
            }
        }
    }

    /// `&&`/`||` short-circuit (`spec.md` §4.9): the right operand is only
    /// evaluated when the left one doesn't already decide the result, so
    /// it has to branch rather than evaluate both sides unconditionally
    /// like every other binary operator.
    fn generate_short_circuit(&mut self, scope: ScopeId, left: ExprId, right: ExprId, expr_id: ExprId, is_or: bool) -> Result<(), CompileError> {
        let result_ty = self.facts.type_of(expr_id);
        let left_ty = self.facts.type_of(left);
        let short_circuit = self.emitter.create_label();
        let end = self.emitter.create_label();
        let holder = self.emitter.create_temporary_variable(result_ty);

        self.generate_expr(scope, left)?;
        self.convert_to(left_ty, result_ty);
        self.emitter.store_variable(holder);
        self.emitter.load_variable(holder);
        self.emitter.convert_to_bool();
        if is_or {
            self.emitter.branch_if_true(short_circuit);
        } else {
            self.emitter.branch_if_false(short_circuit);
        }

        let right_ty = self.facts.type_of(right);
        self.generate_expr(scope, right)?;
        self.convert_to(right_ty, result_ty);
        self.emitter.store_variable(holder);
        self.emitter.branch(end);

        self.emitter.define_label_position(short_circuit);
        self.emitter.branch(end);

        self.emitter.define_label_position(end);
        self.emitter.load_variable(holder);
        self.emitter.release_temporary_variable(holder);
        Ok(())
    }

    fn generate_ternary(&mut self, scope: ScopeId, cond: ExprId, then_expr: ExprId, else_expr: ExprId, expr_id: ExprId) -> Result<(), CompileError> {
        if let Some(constant) = self.facts.constant_of(cond) {
            // Constant-condition elision (`spec.md` §4.9 "if with a
            // constant condition elides the dead branch entirely") applies
            // to the ternary operator's condition the same way it does to
            // `if`.
            let branch = if is_truthy(constant) { then_expr } else { else_expr };
            return self.generate_expr(scope, branch);
        }

        let result_ty = self.facts.type_of(expr_id);
        let else_label = self.emitter.create_label();
        let end = self.emitter.create_label();
        let holder = self.emitter.create_temporary_variable(result_ty);

        self.generate_expr(scope, cond)?;
        self.emitter.convert_to_bool();
        self.emitter.branch_if_false(else_label);

        self.generate_expr(scope, then_expr)?;
        self.convert_to(self.facts.type_of(then_expr), result_ty);
        self.emitter.store_variable(holder);
        self.emitter.branch(end);

        self.emitter.define_label_position(else_label);
        self.generate_expr(scope, else_expr)?;
        self.convert_to(self.facts.type_of(else_expr), result_ty);
        self.emitter.store_variable(holder);

        self.emitter.define_label_position(end);
        self.emitter.load_variable(holder);
        self.emitter.release_temporary_variable(holder);
        Ok(())
    }

    /// Negate a boolean already on top of the stack. There's no dedicated
    /// boolean-negate opcode (`spec.md` §4.10's IL vocabulary has no
    /// arithmetic/logic opcodes at all — see [`OperatorKind`]), so this is
    /// a two-way branch instead of a host call.
    fn emit_boolean_not(&mut self) {
        let on_true = self.emitter.create_label();
        let end = self.emitter.create_label();
        self.emitter.branch_if_true(on_true);
        self.emitter.load_bool(true);
        self.emitter.branch(end);
        self.emitter.define_label_position(on_true);
        self.emitter.load_bool(false);
        self.emitter.define_label_position(end);
    }

    /// Call a host operator intrinsic (`spec.md` §6) with however many
    /// operands are already sitting on the stack for it.
    pub(crate) fn emit_operator_call(&mut self, operator: OperatorKind) {
        let method = R::operator_method(operator);
        self.emitter.call(method);
    }

    /// Apply a value already on top of the stack's conversion from `from`
    /// to `to` (`spec.md` §4.10 "conversion helpers"); a no-op when the two
    /// already agree, which is the common case once resolution has settled
    /// every type.
    pub(crate) fn convert_to(&mut self, from: Type, to: Type) {
        if from == to {
            return;
        }
        if to == Type::Universal {
            self.emitter.convert_to_any();
        } else if to == Type::String {
            self.emitter.convert_to_string();
        } else {
            self.emitter.convert_generic(from, to);
        }
    }
}

fn binary_operator(op: BinaryOp) -> OperatorKind {
    match op {
        BinaryOp::Add => OperatorKind::Add,
        BinaryOp::Sub => OperatorKind::Sub,
        BinaryOp::Mul => OperatorKind::Mul,
        BinaryOp::Div => OperatorKind::Div,
        BinaryOp::Mod => OperatorKind::Mod,
        BinaryOp::Shl => OperatorKind::Shl,
        BinaryOp::Shr => OperatorKind::Shr,
        BinaryOp::UShr => OperatorKind::UShr,
        BinaryOp::BitAnd => OperatorKind::BitAnd,
        BinaryOp::BitOr => OperatorKind::BitOr,
        BinaryOp::BitXor => OperatorKind::BitXor,
        BinaryOp::Lt => OperatorKind::Lt,
        BinaryOp::Gt => OperatorKind::Gt,
        BinaryOp::LtEq => OperatorKind::LtEq,
        BinaryOp::GtEq => OperatorKind::GtEq,
        BinaryOp::In => OperatorKind::In,
        BinaryOp::InstanceOf => OperatorKind::InstanceOf,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq | BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            unreachable!("handled by generate_binary's own match arms")
        }
    }
}

fn compound_operator(op: CompoundAssignOp) -> OperatorKind {
    match op {
        CompoundAssignOp::Add => OperatorKind::Add,
        CompoundAssignOp::Sub => OperatorKind::Sub,
        CompoundAssignOp::Mul => OperatorKind::Mul,
        CompoundAssignOp::Div => OperatorKind::Div,
        CompoundAssignOp::Mod => OperatorKind::Mod,
        CompoundAssignOp::Shl => OperatorKind::Shl,
        CompoundAssignOp::Shr => OperatorKind::Shr,
        CompoundAssignOp::UShr => OperatorKind::UShr,
        CompoundAssignOp::BitAnd => OperatorKind::BitAnd,
        CompoundAssignOp::BitOr => OperatorKind::BitOr,
        CompoundAssignOp::BitXor => OperatorKind::BitXor,
    }
}

/// Script truthiness of a compile-time-known value (`spec.md` §4.7
/// "Constant tracking" feeds this crate's own dead-branch elision for the
/// ternary operator, mirroring the rule `ecmac_resolve::context::is_truthy`
/// already applies to `if`).
fn is_truthy(value: &ConstValue) -> bool {
    match value {
        ConstValue::Undefined | ConstValue::Null => false,
        ConstValue::Boolean(b) => *b,
        ConstValue::Number(bits) => {
            let n = f64::from_bits(*bits);
            n != 0.0 && !n.is_nan()
        }
        ConstValue::String(_) | ConstValue::Method(_) => true,
    }
}
