//! Token cursor with one-token lookahead (`spec.md` §4.2 "Statement
//! parser").
//!
//! The lookahead slot exists for exactly one ambiguity: after a leading
//! identifier at statement position, the parser must see the *following*
//! token (`:` for a label, anything else for an expression statement)
//! before committing. Everywhere else the grammar is LL(1).

use ecmac_diagnostic::CompileError;
use ecmac_ir::{Span, Token, TokenKind};
use ecmac_lexer::{LexMode, Lexer};

pub struct Cursor<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peeked: Option<Token>,
}

impl<'a> Cursor<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, CompileError> {
        let cur = lexer.next(LexMode::Literal)?;
        Ok(Cursor { lexer, cur, peeked: None })
    }

    pub fn kind(&self) -> &TokenKind {
        &self.cur.kind
    }

    pub fn span(&self) -> Span {
        self.cur.span
    }

    pub fn preceded_by_newline(&self) -> bool {
        self.cur.preceded_by_newline
    }

    pub fn is_eof(&self) -> bool {
        self.cur.is_eof()
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.lexer.set_strict(strict);
    }

    pub fn is_strict(&self) -> bool {
        self.lexer.is_strict()
    }

    /// Consume the current token and fetch the next one under `mode`.
    /// Returns the consumed token. If a lookahead was already buffered (see
    /// [`Cursor::peek_after_ident`]) it is returned as the new current token
    /// regardless of `mode` — it was fetched in `Operator` mode, which is
    /// always correct immediately after an identifier.
    pub fn bump(&mut self, mode: LexMode) -> Result<Token, CompileError> {
        let next = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next(mode)?,
        };
        Ok(std::mem::replace(&mut self.cur, next))
    }

    /// Look at the token after the current one without consuming it. Only
    /// valid when the current token is an identifier (the only place the
    /// grammar needs two-token lookahead): the peeked token is always
    /// lexed in `Operator` mode.
    pub fn peek_after_ident(&mut self) -> Result<&TokenKind, CompileError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next(LexMode::Operator)?);
        }
        Ok(&self.peeked.as_ref().unwrap().kind)
    }
}
