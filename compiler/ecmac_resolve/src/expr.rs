//! Per-expression type inference (`spec.md` §4.7 "Expression resolution").
//!
//! A post-order walk: every child is resolved (and has its type recorded in
//! [`crate::facts::ResolvedFacts`]) before the parent's own rule runs, so a
//! binary operator's rule can simply read its operands' already-resolved
//! types back out of the facts table.

use crate::context::{is_truthy, ResolveContext};
use crate::names::{read_name, write_name};
use crate::resolver::Resolver;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{BinaryOp, CompoundAssignOp, ExprId, ExprKind, PrimitiveLiteral, UnaryOp};
use ecmac_proto::HostRuntime;
use ecmac_scope::ConstValue;
use ecmac_types::{common_numeric_type, Type};

impl<'a, R: HostRuntime> Resolver<'a, R> {
    pub fn infer_expr(&mut self, ctx: &mut ResolveContext, id: ExprId) -> Result<Type, CompileError> {
        let expr = self.arena.expr(id);
        let span = expr.span;
        let (ty, constant) = match expr.kind.clone() {
            ExprKind::Literal(lit) => self.infer_literal(&lit),

            ExprKind::ArrayLiteral(elements) => {
                for e in self.arena.expr_ids(elements).collect::<Vec<_>>() {
                    self.infer_expr(ctx, e)?;
                }
                (Type::Universal, None)
            }

            ExprKind::ObjectLiteral(props) => {
                for prop in &props {
                    self.infer_expr(ctx, prop.value)?;
                }
                (Type::Universal, None)
            }

            ExprKind::TemplateLiteral { exprs, .. } => {
                for e in self.arena.expr_ids(exprs).collect::<Vec<_>>() {
                    self.infer_expr(ctx, e)?;
                }
                (Type::String, None)
            }

            ExprKind::Name(name) => {
                let (ty, constant) =
                    read_name(name, span, &self.path, self.source, ctx, self.chain, self.globals, self.runtime)?;
                (ty, constant)
            }

            ExprKind::Member { object, property } => {
                let object_ty = self.infer_expr(ctx, object)?;
                let ty = self.property_type(object_ty, property);
                (ty, None)
            }

            ExprKind::Index { object, index } => {
                self.infer_expr(ctx, object)?;
                self.infer_expr(ctx, index)?;
                (Type::Universal, None)
            }

            ExprKind::Call { callee, args } => {
                self.infer_expr(ctx, callee)?;
                for a in self.arena.expr_ids(args).collect::<Vec<_>>() {
                    self.infer_expr(ctx, a)?;
                }
                // Overload selection (`spec.md` §4.8) happens in dispatch,
                // once the call site's full argument-type vector is known;
                // resolution only establishes that a call occurred.
                (Type::Universal, None)
            }

            ExprKind::New { callee, args } => {
                let callee_ty = self.infer_expr(ctx, callee)?;
                for a in self.arena.expr_ids(args).collect::<Vec<_>>() {
                    self.infer_expr(ctx, a)?;
                }
                let ty = match callee_ty {
                    Type::Instance(p) => Type::Instance(p),
                    _ => Type::Universal,
                };
                (ty, None)
            }

            ExprKind::Assign { target, value } => {
                let value_ty = self.infer_expr(ctx, value)?;
                let value_const = self.facts.constant_of(value).copied();
                self.apply_assignment_target(ctx, target, value_ty, value_const)?;
                (value_ty, value_const)
            }

            ExprKind::CompoundAssign { op, target, value } => {
                let target_ty = self.infer_expr(ctx, target)?;
                let value_ty = self.infer_expr(ctx, value)?;
                let result_ty = self.compound_assign_result(op, target_ty, value_ty);
                self.apply_assignment_target(ctx, target, result_ty, None)?;
                (result_ty, None)
            }

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.infer_expr(ctx, operand)?;
                let ty = match op {
                    UnaryOp::Not | UnaryOp::Delete => Type::Boolean,
                    UnaryOp::TypeOf => Type::String,
                    UnaryOp::Void => Type::Undefined,
                    UnaryOp::BitNot => Type::I32,
                    UnaryOp::Neg | UnaryOp::Plus => {
                        if operand_ty.is_numeric() {
                            operand_ty
                        } else {
                            Type::F64
                        }
                    }
                    UnaryOp::Increment { .. } | UnaryOp::Decrement { .. } => {
                        let result = if operand_ty.is_numeric() { operand_ty } else { Type::F64 };
                        self.apply_assignment_target(ctx, operand, result, None)?;
                        result
                    }
                };
                (ty, None)
            }

            ExprKind::Binary { op, left, right } => {
                let left_ty = self.infer_expr(ctx, left)?;
                let right_ty = self.infer_expr(ctx, right)?;
                let left_const = self.facts.constant_of(left).copied();
                let right_const = self.facts.constant_of(right).copied();
                let ty = self.binary_result_type(op, left_ty, right_ty);
                let constant = fold_binary_constant(op, left_const, right_const);
                (ty, constant)
            }

            ExprKind::Ternary { cond, then_expr, else_expr } => {
                self.infer_expr(ctx, cond)?;
                let cond_const = self.facts.constant_of(cond).copied();
                let then_ty = self.infer_expr(ctx, then_expr)?;
                let else_ty = self.infer_expr(ctx, else_expr)?;
                let ty = if then_ty == else_ty { then_ty } else { Type::Universal };
                let constant = match cond_const {
                    Some(c) if is_truthy(&c) => self.facts.constant_of(then_expr).copied(),
                    Some(_) => self.facts.constant_of(else_expr).copied(),
                    None => None,
                };
                (ty, constant)
            }

            ExprKind::Sequence(exprs) => {
                let ids: Vec<_> = self.arena.expr_ids(exprs).collect();
                let mut last = Type::Undefined;
                for e in ids {
                    last = self.infer_expr(ctx, e)?;
                }
                (last, None)
            }

            ExprKind::Function(_function_id) => {
                ctx.hints |= crate::context::MethodHints::CONTAINS_NESTED_FUNCTION;
                // The closure's own body is resolved separately once its
                // specialization argument types are known (`spec.md` §4.12);
                // here it only contributes a fresh instance type for the
                // function-object value itself.
                let prototype = self.runtime.prototypes_mut().create(None);
                (Type::Instance(prototype), None)
            }
        };

        self.facts.set_type(id, ty);
        if let Some(c) = constant {
            self.facts.set_constant(id, c);
        }
        Ok(ty)
    }

    fn infer_literal(&self, lit: &PrimitiveLiteral) -> (Type, Option<ConstValue>) {
        match lit {
            PrimitiveLiteral::Null => (Type::Null, Some(ConstValue::Null)),
            PrimitiveLiteral::Undefined => (Type::Undefined, Some(ConstValue::Undefined)),
            PrimitiveLiteral::Boolean(b) => (Type::Boolean, Some(ConstValue::Boolean(*b))),
            PrimitiveLiteral::Number(n) => (Type::F64, Some(ConstValue::number(*n))),
            PrimitiveLiteral::String(name) => (Type::String, Some(ConstValue::String(*name))),
            PrimitiveLiteral::Regex { .. } => (Type::Universal, None),
        }
    }

    fn property_type(&self, object_ty: Type, property: ecmac_ir::Name) -> Type {
        match object_ty {
            Type::Instance(prototype) => {
                self.runtime.prototypes().resolve_property(prototype, property).map_or(Type::Universal, |p| p.ty)
            }
            _ => Type::Universal,
        }
    }

    fn binary_result_type(&self, op: BinaryOp, left: Type, right: Type) -> Type {
        use BinaryOp::*;
        match op {
            Add => {
                if let Some(common) = common_numeric_type(left, right) {
                    common
                } else if left == Type::String || right == Type::String {
                    Type::String
                } else {
                    Type::Universal
                }
            }
            Sub | Mul | Div | Mod => common_numeric_type(left, right).unwrap_or(Type::F64),
            Shl | Shr | UShr | BitAnd | BitOr | BitXor => Type::I32,
            Lt | Gt | LtEq | GtEq | Eq | NotEq | StrictEq | StrictNotEq | In | InstanceOf => Type::Boolean,
            LogicalAnd => right,
            LogicalOr => {
                if left == right {
                    left
                } else {
                    Type::Universal
                }
            }
        }
    }

    fn compound_assign_result(&self, op: CompoundAssignOp, target: Type, value: Type) -> Type {
        use CompoundAssignOp::*;
        match op {
            Add => {
                if let Some(common) = common_numeric_type(target, value) {
                    common
                } else if target == Type::String || value == Type::String {
                    Type::String
                } else {
                    Type::Universal
                }
            }
            Sub | Mul | Div | Mod => common_numeric_type(target, value).unwrap_or(Type::F64),
            Shl | Shr | UShr | BitAnd | BitOr | BitXor => Type::I32,
        }
    }

    /// `ApplyType` for the left-hand side of `=`/a compound assignment/an
    /// increment-decrement (`spec.md` §4.7 point 3): only a name or member
    /// target participates in the static variable/property model; any other
    /// target (e.g. an index expression with a computed key) already has its
    /// own dynamic-dispatch store semantics and carries no static slot.
    fn apply_assignment_target(
        &mut self,
        ctx: &mut ResolveContext,
        target: ExprId,
        ty: Type,
        constant: Option<ConstValue>,
    ) -> Result<(), CompileError> {
        let target_expr = self.arena.expr(target);
        let target_span = target_expr.span;
        match target_expr.kind.clone() {
            ExprKind::Name(name) => {
                if write_name(name, ty, target_span, &self.path, self.source, ctx, self.chain, self.globals, self.runtime)? {
                    self.log_collapse("variable", name);
                }
                if let Some(c) = constant {
                    self.globals.try_set_constant(name, c);
                }
                Ok(())
            }
            ExprKind::Member { object, property } => {
                let object_ty = self.facts.type_of(object);
                if let Type::Instance(prototype) = object_ty {
                    self.runtime.prototypes_mut().get_mut(prototype).add_property(
                        property,
                        ty,
                        ecmac_proto::PropertyAttributes::default(),
                    );
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Constant-fold a binary operator over two already-known constants
/// (`spec.md` §4.7 "Constant tracking" feeds §4.9's dead-branch elision).
/// Deliberately conservative: only the handful of operators whose result
/// stays representable as a [`ConstValue`] are folded; everything else
/// reports "not a compile-time constant" rather than guessing.
fn fold_binary_constant(op: BinaryOp, left: Option<ConstValue>, right: Option<ConstValue>) -> Option<ConstValue> {
    use BinaryOp::*;
    let (ConstValue::Number(l), ConstValue::Number(r)) = (left?, right?) else {
        return None;
    };
    let (l, r) = (f64::from_bits(l), f64::from_bits(r));
    match op {
        Add => Some(ConstValue::number(l + r)),
        Sub => Some(ConstValue::number(l - r)),
        Mul => Some(ConstValue::number(l * r)),
        Div => Some(ConstValue::number(l / r)),
        Mod => Some(ConstValue::number(l % r)),
        Lt => Some(ConstValue::Boolean(l < r)),
        Gt => Some(ConstValue::Boolean(l > r)),
        LtEq => Some(ConstValue::Boolean(l <= r)),
        GtEq => Some(ConstValue::Boolean(l >= r)),
        Eq | StrictEq => Some(ConstValue::Boolean(l == r)),
        NotEq | StrictNotEq => Some(ConstValue::Boolean(l != r)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::ResolvedFacts;
    use crate::globals::GlobalEnvironment;
    use ecmac_ir::{Arena, Expr, Name, Span};
    use ecmac_proto::PrototypeRegistry;
    use ecmac_scope::{Scope, ScopeChain};
    use std::sync::Arc;

    struct TestRuntime {
        prototypes: PrototypeRegistry,
    }

    impl HostRuntime for TestRuntime {
        fn prototypes(&self) -> &PrototypeRegistry {
            &self.prototypes
        }
        fn prototypes_mut(&mut self) -> &mut PrototypeRegistry {
            &mut self.prototypes
        }
        fn strict_equals_method() -> ecmac_types::MethodId {
            ecmac_types::MethodId(0)
        }
        fn enumerate_property_names_method() -> ecmac_types::MethodId {
            ecmac_types::MethodId(1)
        }
        fn enumerate_property_values_method() -> ecmac_types::MethodId {
            ecmac_types::MethodId(2)
        }
        fn operator_method(_kind: ecmac_proto::OperatorKind) -> ecmac_types::MethodId {
            ecmac_types::MethodId(3)
        }
    }

    fn push_number(arena: &mut Arena, n: f64) -> ExprId {
        arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Number(n)), span: Span::DUMMY })
    }

    #[test]
    fn numeric_addition_folds_to_a_constant() {
        let mut arena = Arena::new();
        let left = push_number(&mut arena, 1.0);
        let right = push_number(&mut arena, 2.0);
        let add = arena.push_expr(Expr {
            kind: ExprKind::Binary { op: BinaryOp::Add, left, right },
            span: Span::DUMMY,
        });

        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut globals = GlobalEnvironment::new();
        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");
        let mut resolver = Resolver::new(&arena, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false);
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);

        let ty = resolver.infer_expr(&mut ctx, add).unwrap();
        assert_eq!(ty, Type::F64);
        assert_eq!(facts.constant_of(add), Some(&ConstValue::number(3.0)));
    }

    #[test]
    fn string_concatenation_with_a_number_is_a_string() {
        let mut arena = Arena::new();
        let left =
            arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::String(Name(1))), span: Span::DUMMY });
        let right = push_number(&mut arena, 2.0);
        let add = arena.push_expr(Expr {
            kind: ExprKind::Binary { op: BinaryOp::Add, left, right },
            span: Span::DUMMY,
        });

        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let mut globals = GlobalEnvironment::new();
        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");
        let mut resolver = Resolver::new(&arena, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false);
        let mut ctx = ResolveContext::new(ScopeChain::GLOBAL, false, None);

        let ty = resolver.infer_expr(&mut ctx, add).unwrap();
        assert_eq!(ty, Type::String);
    }

    #[test]
    fn assigning_a_new_type_to_a_local_collapses_it() {
        let mut arena = Arena::new();
        let name_expr =
            arena.push_expr(Expr { kind: ExprKind::Name(Name(5)), span: Span::DUMMY });
        let value = arena.push_expr(Expr {
            kind: ExprKind::Literal(PrimitiveLiteral::String(Name(9))),
            span: Span::DUMMY,
        });
        let assign = arena.push_expr(Expr {
            kind: ExprKind::Assign { target: name_expr, value },
            span: Span::DUMMY,
        });

        let mut registry = PrototypeRegistry::new();
        let global = registry.create(None);
        let mut runtime = TestRuntime { prototypes: registry };
        let mut chain = ScopeChain::new(global);
        let function_scope = chain.push(Scope::declarative(Some(ScopeChain::GLOBAL)));
        chain.declare_variable(
            function_scope,
            Name(5),
            ecmac_scope::Variable::Declared(ecmac_scope::DeclaredVariable {
                ty: Some(Type::I32),
                slot: None,
                constant: ecmac_scope::ConstantState::Unset,
                initialized: true,
            }),
        );
        let mut globals = GlobalEnvironment::new();
        let mut facts = ResolvedFacts::with_capacity(arena.expr_count());
        let path: Arc<str> = Arc::from("t.js");
        let mut resolver = Resolver::new(&arena, &mut chain, &mut globals, &mut runtime, &mut facts, path, "", false);
        let mut ctx = ResolveContext::new(function_scope, false, None);

        resolver.infer_expr(&mut ctx, assign).unwrap();
        assert_eq!(resolver.chain.get(function_scope).own_variable(Name(5)).unwrap().read_type(), Type::Universal);
    }
}
