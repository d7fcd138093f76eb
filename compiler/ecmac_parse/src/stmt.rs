//! Statement grammar (`spec.md` §4.2 "Statement parser", C4).

use crate::Parser;
use ecmac_diagnostic::CompileError;
use ecmac_ir::{
    CatchClause, DeclKind, ForInit, Keyword, Punct, Span, Stmt, StmtId, StmtKind, StmtRange,
    SwitchCase, TokenKind, VarDeclarator,
};
use ecmac_lexer::LexMode::{Literal, Operator};

impl<'a> Parser<'a> {
    fn span(&self) -> Span {
        self.cursor.span()
    }

    /// ASI (`spec.md` §4.1): a statement terminator is either an explicit
    /// `;`, or is implicitly inserted before `}`, at end of input, or
    /// wherever the next token was preceded by a line terminator.
    fn consume_statement_terminator(&mut self) -> Result<(), CompileError> {
        if self.at_punct(Punct::Semi) {
            self.cursor.bump(Literal)?;
            return Ok(());
        }
        if self.at_punct(Punct::RBrace) || self.cursor.is_eof() || self.cursor.preceded_by_newline() {
            return Ok(());
        }
        Err(self.error("expected ';'"))
    }

    /// The top-level program body, after consuming an optional
    /// `"use strict";` directive prologue (`spec.md` §8 "Strict mode").
    pub(crate) fn parse_directive_prologue_and_statements_until_eof(
        &mut self,
    ) -> Result<Vec<Stmt>, CompileError> {
        self.apply_directive_prologue()?;
        let mut stmts = Vec::new();
        while !self.cursor.is_eof() {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// Consumes leading string-literal-expression-statements, switching on
    /// strict mode the moment `"use strict"` is seen among them (it need not
    /// be literally the first one the parser reaches if earlier ones were
    /// other string literals, though in valid code it always is).
    fn apply_directive_prologue(&mut self) -> Result<(), CompileError> {
        loop {
            let TokenKind::String(_) = self.cursor.kind() else { break };
            let is_use_strict = self.current_string_is("use strict");
            let stmt = self.parse_statement()?;
            if is_use_strict {
                self.cursor.set_strict(true);
            }
            // A directive must be a bare string-literal expression
            // statement; anything else ends the prologue.
            if !matches!(stmt.kind, StmtKind::Expression(_)) {
                break;
            }
        }
        Ok(())
    }

    fn current_string_is(&self, text: &str) -> bool {
        matches!(self.cursor.kind(), TokenKind::String(_))
            && self.interner.resolve(self.string_name()) == text
    }

    fn string_name(&self) -> ecmac_ir::Name {
        match self.cursor.kind() {
            TokenKind::String(n) => *n,
            _ => unreachable!("string_name called off a non-string token"),
        }
    }

    /// A function body's statement list, plus whether it opens with its own
    /// `"use strict"` directive.
    pub(crate) fn parse_function_body(&mut self) -> Result<(StmtRange, bool), CompileError> {
        self.cursor.bump(Literal)?; // `{`
        let was_strict = self.cursor.is_strict();
        self.apply_directive_prologue()?;
        let became_strict = self.cursor.is_strict() && !was_strict;
        let mut stmts = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.cursor.is_eof() {
            stmts.push(self.parse_statement()?);
        }
        if !self.at_punct(Punct::RBrace) {
            return Err(self.error("expected '}' to close function body"));
        }
        self.cursor.bump(Operator)?;
        let range = self.arena.push_stmts(stmts);
        Ok((range, became_strict))
    }

    fn parse_block(&mut self) -> Result<StmtRange, CompileError> {
        self.cursor.bump(Literal)?; // `{`
        let mut stmts = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.cursor.is_eof() {
            stmts.push(self.parse_statement()?);
        }
        if !self.at_punct(Punct::RBrace) {
            return Err(self.error("expected '}'"));
        }
        self.cursor.bump(Operator)?;
        Ok(self.arena.push_stmts(stmts))
    }

    fn push_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.arena.push_stmt(Stmt { kind, span, labels: Vec::new() })
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        let id = self.parse_statement_id()?;
        Ok(self.arena.stmt(id).clone())
    }

    fn parse_statement_id(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        match self.cursor.kind().clone() {
            TokenKind::Punct(Punct::LBrace) => {
                let body = self.parse_block()?;
                Ok(self.push_stmt(StmtKind::Block(body), start))
            }
            TokenKind::Punct(Punct::Semi) => {
                self.cursor.bump(Literal)?;
                Ok(self.push_stmt(StmtKind::Empty, start))
            }
            TokenKind::Keyword(Keyword::Var) | TokenKind::Keyword(Keyword::Let) | TokenKind::Keyword(Keyword::Const) => {
                let stmt = self.parse_var_decl_statement()?;
                Ok(stmt)
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Do) => self.parse_do_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try(),
            TokenKind::Keyword(Keyword::Break) => self.parse_break_continue(true),
            TokenKind::Keyword(Keyword::Continue) => self.parse_break_continue(false),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Keyword(Keyword::Throw) => self.parse_throw(),
            TokenKind::Keyword(Keyword::With) => self.parse_with(),
            TokenKind::Keyword(Keyword::Debugger) => {
                self.cursor.bump(Operator)?;
                self.consume_statement_terminator()?;
                Ok(self.push_stmt(StmtKind::Debugger, start))
            }
            TokenKind::Keyword(Keyword::Function) => {
                let f = self.parse_function_common()?;
                Ok(self.push_stmt(StmtKind::FunctionDecl(f), start))
            }
            TokenKind::Ident(_) => self.parse_labeled_or_expression_statement(start),
            _ => {
                let expr = self.parse_expression()?;
                self.consume_statement_terminator()?;
                Ok(self.push_stmt(StmtKind::Expression(expr), start))
            }
        }
    }

    /// Disambiguates `label: stmt` from an expression statement that
    /// happens to start with an identifier, using the cursor's one-token
    /// lookahead (`spec.md` §4.2).
    fn parse_labeled_or_expression_statement(&mut self, start: Span) -> Result<StmtId, CompileError> {
        if matches!(self.cursor.peek_after_ident()?, TokenKind::Punct(Punct::Colon)) {
            let TokenKind::Ident(label) = self.cursor.kind().clone() else { unreachable!() };
            self.cursor.bump(Operator)?; // the identifier
            self.cursor.bump(Literal)?; // the colon
            let inner_id = self.parse_statement_id()?;
            // `Arena` only appends (`spec.md` §3: AST nodes are immutable
            // once pushed), so attaching the label means cloning the
            // already-parsed inner statement and pushing it again with the
            // label attached; the original, label-less copy is unreachable
            // and simply dead arena space.
            let mut inner = self.arena.stmt(inner_id).clone();
            inner.labels.push(label);
            return Ok(self.arena.push_stmt(inner));
        }
        let expr = self.parse_expression()?;
        self.consume_statement_terminator()?;
        Ok(self.push_stmt(StmtKind::Expression(expr), start))
    }

    fn parse_var_decl_statement(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        let (kind, decls) = self.parse_var_decl_list()?;
        self.consume_statement_terminator()?;
        Ok(self.push_stmt(StmtKind::VarDecl { kind, decls }, start))
    }

    fn parse_var_decl_list(&mut self) -> Result<(DeclKind, Vec<VarDeclarator>), CompileError> {
        let kind = match self.cursor.kind() {
            TokenKind::Keyword(Keyword::Var) => DeclKind::Var,
            TokenKind::Keyword(Keyword::Let) => DeclKind::Let,
            TokenKind::Keyword(Keyword::Const) => DeclKind::Const,
            _ => return Err(self.error("expected a declaration keyword")),
        };
        self.cursor.bump(Literal)?;
        let mut decls = Vec::new();
        loop {
            let TokenKind::Ident(name) = self.cursor.kind().clone() else {
                return Err(self.error("expected a variable name"));
            };
            self.cursor.bump(Operator)?;
            let init = if self.at_punct(Punct::Assign) {
                self.cursor.bump(Literal)?;
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            decls.push(VarDeclarator { name, init });
            if self.at_punct(Punct::Comma) {
                self.cursor.bump(Literal)?;
                continue;
            }
            break;
        }
        Ok((kind, decls))
    }

    fn expect_punct(&mut self, p: Punct, mode: ecmac_lexer::LexMode) -> Result<(), CompileError> {
        if !self.at_punct(p) {
            return Err(self.error(format!("expected '{p}'")));
        }
        self.cursor.bump(mode)?;
        Ok(())
    }

    fn parse_parenthesized_expression(&mut self) -> Result<ecmac_ir::ExprId, CompileError> {
        self.expect_punct(Punct::LParen, Literal)?;
        let expr = self.parse_expression()?;
        self.expect_punct(Punct::RParen, Literal)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `if`
        let cond = self.parse_parenthesized_expression()?;
        let then_branch = self.parse_statement_id()?;
        let else_branch = if self.at_keyword(Keyword::Else) {
            self.cursor.bump(Literal)?;
            Some(self.parse_statement_id()?)
        } else {
            None
        };
        Ok(self.push_stmt(StmtKind::If { cond, then_branch, else_branch }, start))
    }

    fn parse_while(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `while`
        let cond = self.parse_parenthesized_expression()?;
        let body = self.parse_statement_id()?;
        Ok(self.push_stmt(StmtKind::While { cond, body }, start))
    }

    fn parse_do_while(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `do`
        let body = self.parse_statement_id()?;
        if !self.at_keyword(Keyword::While) {
            return Err(self.error("expected 'while' after 'do' body"));
        }
        self.cursor.bump(Literal)?;
        let cond = self.parse_parenthesized_expression()?;
        self.consume_statement_terminator()?;
        Ok(self.push_stmt(StmtKind::DoWhile { body, cond }, start))
    }

    /// `for (init; cond; update)`, `for (lhs in obj)`, `for (lhs of iterable)`
    /// (`spec.md` §4.2, §4.11 "Loop lowering").
    fn parse_for(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `for`
        self.expect_punct(Punct::LParen, Literal)?;

        if let TokenKind::Keyword(decl_kw @ (Keyword::Var | Keyword::Let | Keyword::Const)) = self.cursor.kind() {
            let decl_kind = match decl_kw {
                Keyword::Var => DeclKind::Var,
                Keyword::Let => DeclKind::Let,
                _ => DeclKind::Const,
            };
            self.cursor.bump(Literal)?;
            let TokenKind::Ident(name) = self.cursor.kind().clone() else {
                return Err(self.error("expected a variable name"));
            };
            if matches!(self.cursor.peek_after_ident()?, TokenKind::Keyword(Keyword::In)) {
                self.cursor.bump(Operator)?; // name
                self.cursor.bump(Literal)?; // `in`
                let object = self.parse_expression()?;
                self.expect_punct(Punct::RParen, Literal)?;
                let body = self.parse_statement_id()?;
                return Ok(self.push_stmt(StmtKind::ForIn { lhs_name: name, declares: true, object, body }, start));
            }
            if matches!(self.cursor.peek_after_ident()?, TokenKind::Keyword(Keyword::Of)) {
                self.cursor.bump(Operator)?; // name
                self.cursor.bump(Literal)?; // `of`
                let iterable = self.parse_expression()?;
                self.expect_punct(Punct::RParen, Literal)?;
                let body = self.parse_statement_id()?;
                return Ok(self.push_stmt(StmtKind::ForOf { lhs_name: name, declares: true, iterable, body }, start));
            }
            self.cursor.bump(Operator)?; // name, as an ordinary declarator
            let init_expr = if self.at_punct(Punct::Assign) {
                self.cursor.bump(Literal)?;
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            let mut decls = vec![VarDeclarator { name, init: init_expr }];
            while self.at_punct(Punct::Comma) {
                self.cursor.bump(Literal)?;
                let TokenKind::Ident(n) = self.cursor.kind().clone() else {
                    return Err(self.error("expected a variable name"));
                };
                self.cursor.bump(Operator)?;
                let init = if self.at_punct(Punct::Assign) {
                    self.cursor.bump(Literal)?;
                    Some(self.parse_assignment_expression()?)
                } else {
                    None
                };
                decls.push(VarDeclarator { name: n, init });
            }
            return self.finish_classic_for(start, ForInit::VarDecl { kind: decl_kind, decls });
        }

        if self.at_punct(Punct::Semi) {
            return self.finish_classic_for(start, ForInit::None);
        }

        if let TokenKind::Ident(name) = self.cursor.kind().clone() {
            if matches!(self.cursor.peek_after_ident()?, TokenKind::Keyword(Keyword::In)) {
                self.cursor.bump(Operator)?;
                self.cursor.bump(Literal)?;
                let object = self.parse_expression()?;
                self.expect_punct(Punct::RParen, Literal)?;
                let body = self.parse_statement_id()?;
                return Ok(self.push_stmt(StmtKind::ForIn { lhs_name: name, declares: false, object, body }, start));
            }
            if matches!(self.cursor.peek_after_ident()?, TokenKind::Keyword(Keyword::Of)) {
                self.cursor.bump(Operator)?;
                self.cursor.bump(Literal)?;
                let iterable = self.parse_expression()?;
                self.expect_punct(Punct::RParen, Literal)?;
                let body = self.parse_statement_id()?;
                return Ok(self.push_stmt(StmtKind::ForOf { lhs_name: name, declares: false, iterable, body }, start));
            }
        }
        let init = self.parse_expression()?;
        self.finish_classic_for(start, ForInit::Expr(init))
    }

    fn finish_classic_for(&mut self, start: Span, init: ForInit) -> Result<StmtId, CompileError> {
        self.expect_punct(Punct::Semi, Literal)?;
        let cond = if self.at_punct(Punct::Semi) { None } else { Some(self.parse_expression()?) };
        self.expect_punct(Punct::Semi, Literal)?;
        let update = if self.at_punct(Punct::RParen) { None } else { Some(self.parse_expression()?) };
        self.expect_punct(Punct::RParen, Literal)?;
        let body = self.parse_statement_id()?;
        Ok(self.push_stmt(StmtKind::For { init, cond, update, body }, start))
    }

    fn parse_switch(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `switch`
        let discriminant = self.parse_parenthesized_expression()?;
        self.expect_punct(Punct::LBrace, Literal)?;
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.at_punct(Punct::RBrace) {
            let test = if self.at_keyword(Keyword::Case) {
                self.cursor.bump(Literal)?;
                let e = self.parse_expression()?;
                Some(e)
            } else if self.at_keyword(Keyword::Default) {
                if seen_default {
                    return Err(self.error("a switch statement may have at most one default clause"));
                }
                seen_default = true;
                self.cursor.bump(Literal)?;
                None
            } else {
                return Err(self.error("expected 'case' or 'default'"));
            };
            self.expect_punct(Punct::Colon, Literal)?;
            let mut body = Vec::new();
            while !self.at_keyword(Keyword::Case) && !self.at_keyword(Keyword::Default) && !self.at_punct(Punct::RBrace) {
                body.push(self.parse_statement()?);
            }
            let body = self.arena.push_stmts(body);
            cases.push(SwitchCase { test, body });
        }
        self.cursor.bump(Operator)?; // `}`
        Ok(self.push_stmt(StmtKind::Switch { discriminant, cases }, start))
    }

    fn parse_try(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `try`
        if !self.at_punct(Punct::LBrace) {
            return Err(self.error("expected '{' after 'try'"));
        }
        let block = self.parse_block()?;
        let catch = if self.at_keyword(Keyword::Catch) {
            self.cursor.bump(Literal)?;
            let param = if self.at_punct(Punct::LParen) {
                self.cursor.bump(Literal)?;
                let TokenKind::Ident(name) = self.cursor.kind().clone() else {
                    return Err(self.error("expected a catch parameter name"));
                };
                self.cursor.bump(Operator)?;
                self.expect_punct(Punct::RParen, Literal)?;
                Some(name)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };
        let finally = if self.at_keyword(Keyword::Finally) {
            self.cursor.bump(Literal)?;
            Some(self.parse_block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            return Err(self.error("a 'try' statement needs a 'catch' or 'finally' clause"));
        }
        Ok(self.push_stmt(StmtKind::Try { block, catch, finally }, start))
    }

    fn parse_break_continue(&mut self, is_break: bool) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Operator)?; // `break`/`continue`
        let label = if !self.cursor.preceded_by_newline() {
            if let TokenKind::Ident(name) = self.cursor.kind().clone() {
                self.cursor.bump(Operator)?;
                Some(name)
            } else {
                None
            }
        } else {
            None
        };
        self.consume_statement_terminator()?;
        let kind = if is_break { StmtKind::Break(label) } else { StmtKind::Continue(label) };
        Ok(self.push_stmt(kind, start))
    }

    fn parse_return(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `return`
        let value = if self.at_punct(Punct::Semi) || self.at_punct(Punct::RBrace) || self.cursor.is_eof() || self.cursor.preceded_by_newline() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_statement_terminator()?;
        Ok(self.push_stmt(StmtKind::Return(value), start))
    }

    fn parse_throw(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `throw`
        if self.cursor.preceded_by_newline() {
            return Err(self.error("illegal newline after 'throw'"));
        }
        let value = self.parse_expression()?;
        self.consume_statement_terminator()?;
        Ok(self.push_stmt(StmtKind::Throw(value), start))
    }

    fn parse_with(&mut self) -> Result<StmtId, CompileError> {
        let start = self.span();
        self.cursor.bump(Literal)?; // `with`
        let object = self.parse_parenthesized_expression()?;
        let body = self.parse_statement_id()?;
        Ok(self.push_stmt(StmtKind::With { object, body }, start))
    }
}
