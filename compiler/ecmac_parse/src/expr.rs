//! Expression grammar: an operator-precedence cascade from assignment down
//! to primary expressions (`spec.md` §4.2 "Expression parser", C3).
//!
//! Each precedence level is one function that parses its next-tighter level
//! for an operand, then loops consuming same-level operators — the same
//! shape as a classic recursive-descent binary-operator cascade, just
//! driven off `ecmac_ir`'s token vocabulary instead of a hand-matched set
//! of strings.

use crate::Parser;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{
    BinaryOp, CompoundAssignOp, Expr, ExprId, ExprKind, Function, Keyword, ObjectProperty,
    PrimitiveLiteral, Punct, Span, TokenKind, UnaryOp,
};
use ecmac_lexer::LexMode::{Literal, Operator, TemplateContinuation};

impl<'a> Parser<'a> {
    fn span_of(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    /// Clone each element's already-pushed `Expr` into one contiguous run
    /// (`spec.md` §3 "AST node": array-literal elements, call arguments, and
    /// comma-sequence operands are all stored as `ExprRange`s).
    fn to_range(&mut self, ids: &[ExprId]) -> ecmac_ir::ExprRange {
        let exprs: Vec<Expr> = ids.iter().map(|&id| self.arena.expr(id).clone()).collect();
        self.arena.push_exprs(exprs)
    }

    pub(crate) fn at_punct(&self, p: Punct) -> bool {
        matches!(self.cursor.kind(), TokenKind::Punct(pp) if *pp == p)
    }

    pub(crate) fn at_keyword(&self, k: Keyword) -> bool {
        matches!(self.cursor.kind(), TokenKind::Keyword(kk) if *kk == k)
    }

    /// Top-level comma expression (`spec.md` §4.2: the `Sequence` node).
    pub(crate) fn parse_expression(&mut self) -> Result<ExprId, CompileError> {
        let first = self.parse_assignment_expression()?;
        if !self.at_punct(Punct::Comma) {
            return Ok(first);
        }
        let mut ids = vec![first];
        while self.at_punct(Punct::Comma) {
            self.cursor.bump(Literal)?;
            ids.push(self.parse_assignment_expression()?);
        }
        let span = self.span_of(ids[0]).to(self.span_of(*ids.last().unwrap()));
        let range = self.to_range(&ids);
        Ok(self.arena.push_expr(Expr { kind: ExprKind::Sequence(range), span }))
    }

    fn match_compound_assign_op(&self) -> Option<CompoundAssignOp> {
        let TokenKind::Punct(p) = self.cursor.kind() else { return None };
        Some(match p {
            Punct::PlusAssign => CompoundAssignOp::Add,
            Punct::MinusAssign => CompoundAssignOp::Sub,
            Punct::StarAssign => CompoundAssignOp::Mul,
            Punct::SlashAssign => CompoundAssignOp::Div,
            Punct::PercentAssign => CompoundAssignOp::Mod,
            Punct::ShlAssign => CompoundAssignOp::Shl,
            Punct::ShrAssign => CompoundAssignOp::Shr,
            Punct::UShrAssign => CompoundAssignOp::UShr,
            Punct::AndAssign => CompoundAssignOp::BitAnd,
            Punct::OrAssign => CompoundAssignOp::BitOr,
            Punct::XorAssign => CompoundAssignOp::BitXor,
            _ => return None,
        })
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Result<ExprId, CompileError> {
        let left = self.parse_conditional()?;
        if let Some(op) = self.match_compound_assign_op() {
            self.cursor.bump(Literal)?;
            let value = self.parse_assignment_expression()?;
            let span = self.span_of(left).to(self.span_of(value));
            return Ok(self.arena.push_expr(Expr { kind: ExprKind::CompoundAssign { op, target: left, value }, span }));
        }
        if self.at_punct(Punct::Assign) {
            self.cursor.bump(Literal)?;
            let value = self.parse_assignment_expression()?;
            let span = self.span_of(left).to(self.span_of(value));
            return Ok(self.arena.push_expr(Expr { kind: ExprKind::Assign { target: left, value }, span }));
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> Result<ExprId, CompileError> {
        let cond = self.parse_logical_or()?;
        if !self.at_punct(Punct::Question) {
            return Ok(cond);
        }
        self.cursor.bump(Literal)?;
        let then_expr = self.parse_assignment_expression()?;
        if !self.at_punct(Punct::Colon) {
            return Err(self.error("expected ':' in conditional expression"));
        }
        self.cursor.bump(Literal)?;
        let else_expr = self.parse_assignment_expression()?;
        let span = self.span_of(cond).to(self.span_of(else_expr));
        Ok(self.arena.push_expr(Expr { kind: ExprKind::Ternary { cond, then_expr, else_expr }, span }))
    }

    fn parse_logical_or(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_logical_and()?;
        while self.at_punct(Punct::OrOr) {
            self.cursor.bump(Literal)?;
            let right = self.parse_logical_and()?;
            left = self.push_binary(BinaryOp::LogicalOr, left, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_bitor()?;
        while self.at_punct(Punct::AndAnd) {
            self.cursor.bump(Literal)?;
            let right = self.parse_bitor()?;
            left = self.push_binary(BinaryOp::LogicalAnd, left, right);
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_bitxor()?;
        while self.at_punct(Punct::Pipe) {
            self.cursor.bump(Literal)?;
            let right = self.parse_bitxor()?;
            left = self.push_binary(BinaryOp::BitOr, left, right);
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_bitand()?;
        while self.at_punct(Punct::Caret) {
            self.cursor.bump(Literal)?;
            let right = self.parse_bitand()?;
            left = self.push_binary(BinaryOp::BitXor, left, right);
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_equality()?;
        while self.at_punct(Punct::Amp) {
            self.cursor.bump(Literal)?;
            let right = self.parse_equality()?;
            left = self.push_binary(BinaryOp::BitAnd, left, right);
        }
        Ok(left)
    }

    fn match_equality_op(&self) -> Option<BinaryOp> {
        let TokenKind::Punct(p) = self.cursor.kind() else { return None };
        Some(match p {
            Punct::Eq => BinaryOp::Eq,
            Punct::NotEq => BinaryOp::NotEq,
            Punct::StrictEq => BinaryOp::StrictEq,
            Punct::StrictNotEq => BinaryOp::StrictNotEq,
            _ => return None,
        })
    }

    fn parse_equality(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_relational()?;
        while let Some(op) = self.match_equality_op() {
            self.cursor.bump(Literal)?;
            let right = self.parse_relational()?;
            left = self.push_binary(op, left, right);
        }
        Ok(left)
    }

    fn match_relational_op(&self) -> Option<BinaryOp> {
        match self.cursor.kind() {
            TokenKind::Punct(Punct::Lt) => Some(BinaryOp::Lt),
            TokenKind::Punct(Punct::Gt) => Some(BinaryOp::Gt),
            TokenKind::Punct(Punct::LtEq) => Some(BinaryOp::LtEq),
            TokenKind::Punct(Punct::GtEq) => Some(BinaryOp::GtEq),
            TokenKind::Keyword(Keyword::InstanceOf) => Some(BinaryOp::InstanceOf),
            TokenKind::Keyword(Keyword::In) => Some(BinaryOp::In),
            _ => None,
        }
    }

    fn parse_relational(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_shift()?;
        while let Some(op) = self.match_relational_op() {
            self.cursor.bump(Literal)?;
            let right = self.parse_shift()?;
            left = self.push_binary(op, left, right);
        }
        Ok(left)
    }

    fn match_shift_op(&self) -> Option<BinaryOp> {
        let TokenKind::Punct(p) = self.cursor.kind() else { return None };
        Some(match p {
            Punct::Shl => BinaryOp::Shl,
            Punct::Shr => BinaryOp::Shr,
            Punct::UShr => BinaryOp::UShr,
            _ => return None,
        })
    }

    fn parse_shift(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.match_shift_op() {
            self.cursor.bump(Literal)?;
            let right = self.parse_additive()?;
            left = self.push_binary(op, left, right);
        }
        Ok(left)
    }

    fn match_additive_op(&self) -> Option<BinaryOp> {
        match self.cursor.kind() {
            TokenKind::Punct(Punct::Plus) => Some(BinaryOp::Add),
            TokenKind::Punct(Punct::Minus) => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    fn parse_additive(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_additive_op() {
            self.cursor.bump(Literal)?;
            let right = self.parse_multiplicative()?;
            left = self.push_binary(op, left, right);
        }
        Ok(left)
    }

    fn match_multiplicative_op(&self) -> Option<BinaryOp> {
        match self.cursor.kind() {
            TokenKind::Punct(Punct::Star) => Some(BinaryOp::Mul),
            TokenKind::Punct(Punct::Slash) => Some(BinaryOp::Div),
            TokenKind::Punct(Punct::Percent) => Some(BinaryOp::Mod),
            _ => None,
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, CompileError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.match_multiplicative_op() {
            self.cursor.bump(Literal)?;
            let right = self.parse_unary()?;
            left = self.push_binary(op, left, right);
        }
        Ok(left)
    }

    fn push_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.span_of(left).to(self.span_of(right));
        self.arena.push_expr(Expr { kind: ExprKind::Binary { op, left, right }, span })
    }

    fn match_unary_prefix_op(&self) -> Option<UnaryOp> {
        match self.cursor.kind() {
            TokenKind::Punct(Punct::Minus) => Some(UnaryOp::Neg),
            TokenKind::Punct(Punct::Plus) => Some(UnaryOp::Plus),
            TokenKind::Punct(Punct::Not) => Some(UnaryOp::Not),
            TokenKind::Punct(Punct::Tilde) => Some(UnaryOp::BitNot),
            TokenKind::Punct(Punct::PlusPlus) => Some(UnaryOp::Increment { is_prefix: true }),
            TokenKind::Punct(Punct::MinusMinus) => Some(UnaryOp::Decrement { is_prefix: true }),
            TokenKind::Keyword(Keyword::TypeOf) => Some(UnaryOp::TypeOf),
            TokenKind::Keyword(Keyword::Void) => Some(UnaryOp::Void),
            TokenKind::Keyword(Keyword::Delete) => Some(UnaryOp::Delete),
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> Result<ExprId, CompileError> {
        if let Some(op) = self.match_unary_prefix_op() {
            let start = self.cursor.span();
            self.cursor.bump(Literal)?;
            let operand = self.parse_unary()?;
            let span = start.to(self.span_of(operand));
            return Ok(self.arena.push_expr(Expr { kind: ExprKind::Unary { op, operand }, span }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<ExprId, CompileError> {
        let start = self.cursor.span();
        let primary = if self.at_keyword(Keyword::New) { self.parse_new_expression()? } else { self.parse_primary()? };
        self.parse_call_member_tail(primary, start)
    }

    /// `new Callee(args)` (`spec.md` §4.2): the callee is parsed as a
    /// member expression only — trailing calls bind to the `new` as a
    /// whole via [`Parser::parse_call_member_tail`], not to the callee.
    fn parse_new_expression(&mut self) -> Result<ExprId, CompileError> {
        let start = self.cursor.span();
        self.cursor.bump(Literal)?; // `new`
        let callee_start = self.cursor.span();
        let mut callee = if self.at_keyword(Keyword::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };
        callee = self.parse_member_tail_only(callee, callee_start)?;
        let (args, end_span) = if self.at_punct(Punct::LParen) {
            self.parse_arguments()?
        } else {
            (ecmac_ir::ExprRange::EMPTY, self.span_of(callee))
        };
        let span = start.to(end_span);
        Ok(self.arena.push_expr(Expr { kind: ExprKind::New { callee, args }, span }))
    }

    /// Member/index chaining only, no calls — used while parsing a `new`
    /// callee, where a `(` belongs to the `new` itself.
    fn parse_member_tail_only(&mut self, mut expr: ExprId, start: Span) -> Result<ExprId, CompileError> {
        loop {
            if self.at_punct(Punct::Dot) {
                self.cursor.bump(Literal)?;
                let name = self.expect_ident_as_name()?;
                let span = start.to(self.cursor.span());
                expr = self.arena.push_expr(Expr { kind: ExprKind::Member { object: expr, property: name }, span });
            } else if self.at_punct(Punct::LBracket) {
                self.cursor.bump(Literal)?;
                let index = self.parse_expression()?;
                if !self.at_punct(Punct::RBracket) {
                    return Err(self.error("expected ']'"));
                }
                self.cursor.bump(Operator)?;
                let span = start.to(self.span_of(index));
                expr = self.arena.push_expr(Expr { kind: ExprKind::Index { object: expr, index }, span });
            } else {
                return Ok(expr);
            }
        }
    }

    /// Member/index/call/postfix-increment chaining (`spec.md` §4.2).
    fn parse_call_member_tail(&mut self, mut expr: ExprId, start: Span) -> Result<ExprId, CompileError> {
        loop {
            if self.at_punct(Punct::Dot) {
                self.cursor.bump(Literal)?;
                let name = self.expect_ident_as_name()?;
                let span = start.to(self.cursor.span());
                expr = self.arena.push_expr(Expr { kind: ExprKind::Member { object: expr, property: name }, span });
            } else if self.at_punct(Punct::LBracket) {
                self.cursor.bump(Literal)?;
                let index = self.parse_expression()?;
                if !self.at_punct(Punct::RBracket) {
                    return Err(self.error("expected ']'"));
                }
                self.cursor.bump(Operator)?;
                let span = start.to(self.span_of(index));
                expr = self.arena.push_expr(Expr { kind: ExprKind::Index { object: expr, index }, span });
            } else if self.at_punct(Punct::LParen) {
                let (args, end_span) = self.parse_arguments()?;
                let span = start.to(end_span);
                expr = self.arena.push_expr(Expr { kind: ExprKind::Call { callee: expr, args }, span });
            } else if !self.cursor.preceded_by_newline()
                && (self.at_punct(Punct::PlusPlus) || self.at_punct(Punct::MinusMinus))
            {
                let is_incr = self.at_punct(Punct::PlusPlus);
                let op_span = self.cursor.span();
                self.cursor.bump(Operator)?;
                let op = if is_incr {
                    UnaryOp::Increment { is_prefix: false }
                } else {
                    UnaryOp::Decrement { is_prefix: false }
                };
                let span = start.to(op_span);
                expr = self.arena.push_expr(Expr { kind: ExprKind::Unary { op, operand: expr }, span });
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parses `(arg, arg, ...)`, returning the argument range and the span
    /// of the closing paren.
    fn parse_arguments(&mut self) -> Result<(ecmac_ir::ExprRange, Span), CompileError> {
        self.cursor.bump(Literal)?; // `(`
        let mut ids = Vec::new();
        if !self.at_punct(Punct::RParen) {
            loop {
                ids.push(self.parse_assignment_expression()?);
                if self.at_punct(Punct::Comma) {
                    self.cursor.bump(Literal)?;
                    continue;
                }
                break;
            }
        }
        if !self.at_punct(Punct::RParen) {
            return Err(self.error("expected ')' in argument list"));
        }
        let end_span = self.cursor.span();
        self.cursor.bump(Operator)?;
        let range = self.to_range(&ids);
        Ok((range, end_span))
    }

    fn expect_ident_as_name(&mut self) -> Result<ecmac_ir::Name, CompileError> {
        match self.cursor.kind().clone() {
            TokenKind::Ident(name) => {
                self.cursor.bump(Operator)?;
                Ok(name)
            }
            _ => Err(self.error("expected a property name")),
        }
    }

    pub(crate) fn parse_primary(&mut self) -> Result<ExprId, CompileError> {
        let span = self.cursor.span();
        match self.cursor.kind().clone() {
            TokenKind::Ident(name) => {
                self.cursor.bump(Operator)?;
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Name(name), span }))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.cursor.bump(Operator)?;
                let name = self.intern("this");
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Name(name), span }))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.cursor.bump(Operator)?;
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Boolean(true)), span }))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.cursor.bump(Operator)?;
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Boolean(false)), span }))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.cursor.bump(Operator)?;
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Null), span }))
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_function_expression(),
            TokenKind::Number { bits, .. } => {
                self.cursor.bump(Operator)?;
                let n = f64::from_bits(bits);
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Number(n)), span }))
            }
            TokenKind::String(name) => {
                self.cursor.bump(Operator)?;
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::String(name)), span }))
            }
            TokenKind::Regex { pattern, flags } => {
                self.cursor.bump(Operator)?;
                Ok(self.arena.push_expr(Expr { kind: ExprKind::Literal(PrimitiveLiteral::Regex { pattern, flags }), span }))
            }
            TokenKind::Template { .. } => self.parse_template_literal(),
            TokenKind::Punct(Punct::LParen) => {
                self.cursor.bump(Literal)?;
                let inner = self.parse_expression()?;
                if !self.at_punct(Punct::RParen) {
                    return Err(self.error("expected ')'"));
                }
                self.cursor.bump(Operator)?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => self.parse_array_literal(),
            TokenKind::Punct(Punct::LBrace) => self.parse_object_literal(),
            _ => Err(self.error("expected an expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<ExprId, CompileError> {
        let start = self.cursor.span();
        self.cursor.bump(Literal)?; // `[`
        let mut ids = Vec::new();
        while !self.at_punct(Punct::RBracket) {
            if self.at_punct(Punct::Comma) {
                // Elision: a skipped array element reads as `undefined`.
                let hole_span = self.cursor.span();
                ids.push(self.arena.push_expr(Expr {
                    kind: ExprKind::Literal(PrimitiveLiteral::Undefined),
                    span: hole_span,
                }));
                self.cursor.bump(Literal)?;
                continue;
            }
            ids.push(self.parse_assignment_expression()?);
            if self.at_punct(Punct::Comma) {
                self.cursor.bump(Literal)?;
            } else {
                break;
            }
        }
        if !self.at_punct(Punct::RBracket) {
            return Err(self.error("expected ']'"));
        }
        let span = start.to(self.cursor.span());
        self.cursor.bump(Operator)?;
        let range = self.to_range(&ids);
        Ok(self.arena.push_expr(Expr { kind: ExprKind::ArrayLiteral(range), span }))
    }

    fn parse_object_literal(&mut self) -> Result<ExprId, CompileError> {
        let start = self.cursor.span();
        self.cursor.bump(Literal)?; // `{`
        let mut props = Vec::new();
        while !self.at_punct(Punct::RBrace) {
            let key_span = self.cursor.span();
            let key = match self.cursor.kind().clone() {
                TokenKind::Ident(name) => {
                    self.cursor.bump(Operator)?;
                    name
                }
                TokenKind::String(name) => {
                    self.cursor.bump(Operator)?;
                    name
                }
                TokenKind::Number { bits, .. } => {
                    self.cursor.bump(Operator)?;
                    let n = f64::from_bits(bits);
                    self.intern(&format_number_key(n))
                }
                TokenKind::Keyword(kw) => {
                    self.cursor.bump(Operator)?;
                    self.intern(kw.text())
                }
                _ => return Err(self.error("expected a property name")),
            };
            if self.at_punct(Punct::Colon) {
                self.cursor.bump(Literal)?;
                let value = self.parse_assignment_expression()?;
                props.push(ObjectProperty { key, value, shorthand: false });
            } else {
                // ES5 shorthand `{ x }` (`spec.md` §1 ES6 additions).
                let value = self.arena.push_expr(Expr { kind: ExprKind::Name(key), span: key_span });
                props.push(ObjectProperty { key, value, shorthand: true });
            }
            if self.at_punct(Punct::Comma) {
                self.cursor.bump(Literal)?;
            } else {
                break;
            }
        }
        if !self.at_punct(Punct::RBrace) {
            return Err(self.error("expected '}'"));
        }
        let span = start.to(self.cursor.span());
        self.cursor.bump(Operator)?;
        Ok(self.arena.push_expr(Expr { kind: ExprKind::ObjectLiteral(props), span }))
    }

    fn parse_template_literal(&mut self) -> Result<ExprId, CompileError> {
        let start = self.cursor.span();
        let mut cooked = Vec::new();
        let mut expr_ids = Vec::new();
        loop {
            let TokenKind::Template { cooked: chunk, tail } = self.cursor.kind().clone() else {
                return Err(self.error("expected template literal chunk"));
            };
            cooked.push(chunk);
            if tail {
                self.cursor.bump(Operator)?;
                break;
            }
            // Consume the chunk and resume lexing inside the substitution.
            self.cursor.bump(Literal)?;
            expr_ids.push(self.parse_expression()?);
            if !self.at_punct(Punct::RBrace) {
                return Err(self.error("expected '}' to close template substitution"));
            }
            self.cursor.bump(TemplateContinuation)?;
        }
        let span = start.to(self.cursor.span());
        let exprs = self.to_range(&expr_ids);
        Ok(self.arena.push_expr(Expr { kind: ExprKind::TemplateLiteral { cooked, exprs }, span }))
    }

    /// `function [name](params) { body }` (`spec.md` §3 "Function").
    pub(crate) fn parse_function_expression(&mut self) -> Result<ExprId, CompileError> {
        let f = self.parse_function_common()?;
        let span = self.arena.function(f).span;
        Ok(self.arena.push_expr(Expr { kind: ExprKind::Function(f), span }))
    }

    pub(crate) fn parse_function_common(&mut self) -> Result<ecmac_ir::FunctionId, CompileError> {
        let start = self.cursor.span();
        self.cursor.bump(Literal)?; // `function`
        let name = if let TokenKind::Ident(n) = self.cursor.kind().clone() {
            self.cursor.bump(Operator)?;
            Some(n)
        } else {
            None
        };
        if !self.at_punct(Punct::LParen) {
            return Err(self.error("expected '(' in function parameter list"));
        }
        self.cursor.bump(Literal)?;
        let mut params = Vec::new();
        if !self.at_punct(Punct::RParen) {
            loop {
                let TokenKind::Ident(p) = self.cursor.kind().clone() else {
                    return Err(self.error("expected a parameter name"));
                };
                self.cursor.bump(Operator)?;
                params.push(p);
                if self.at_punct(Punct::Comma) {
                    self.cursor.bump(Literal)?;
                    continue;
                }
                break;
            }
        }
        if !self.at_punct(Punct::RParen) {
            return Err(self.error("expected ')' after parameters"));
        }
        self.cursor.bump(Literal)?;
        if !self.at_punct(Punct::LBrace) {
            return Err(self.error("expected '{' to start function body"));
        }
        let outer_strict = self.cursor.is_strict();
        let (body, body_is_strict) = self.parse_function_body()?;
        self.cursor.set_strict(outer_strict);
        let span = start.to(self.cursor.span());
        Ok(self.push_function(Function { name, params, body, span, is_strict: body_is_strict || outer_strict }))
    }
}

fn format_number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
