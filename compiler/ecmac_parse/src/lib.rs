//! Recursive-descent parser (`spec.md` §4.2 "Expression parser", §4.2
//! "Statement parser", C3/C4).
//!
//! Builds the flat AST directly into an [`ecmac_ir::Arena`] as it walks the
//! token stream — there is no intermediate concrete syntax tree.

mod cursor;
mod expr;
mod stmt;

pub(crate) use cursor::Cursor;

use ecmac_diagnostic::CompileError;
use ecmac_ir::{Arena, FunctionId, Name, StmtRange, StringInterner};
use ecmac_lexer::Lexer;
use std::sync::Arc;

pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: Arena,
    interner: Arc<StringInterner>,
    path: Arc<str>,
    source: &'a str,
}

/// A fully parsed program: the arena of every expression/statement/function
/// produced, the range of top-level statements, and whether the source unit
/// as a whole runs in strict mode (either an engine-wide `ForceStrictMode`
/// option or a `"use strict"` directive prologue).
pub struct ParsedProgram {
    pub arena: Arena,
    pub body: StmtRange,
    pub strict: bool,
}

impl<'a> Parser<'a> {
    pub fn new(path: &'a str, source: &'a str, interner: Arc<StringInterner>) -> Result<Self, CompileError> {
        Self::new_with_strict_mode(path, source, interner, false)
    }

    /// Like [`Parser::new`], but `force_strict` seeds the lexer/cursor as
    /// already strict before a single token is read — the engine-wide
    /// `ForceStrictMode` option from a `"use strict"` directive prologue.
    pub fn new_with_strict_mode(
        path: &'a str,
        source: &'a str,
        interner: Arc<StringInterner>,
        force_strict: bool,
    ) -> Result<Self, CompileError> {
        let mut lexer = Lexer::new(path, source, interner.clone());
        lexer.set_strict(force_strict);
        let cursor = Cursor::new(lexer)?;
        Ok(Parser {
            cursor,
            arena: Arena::new(),
            interner,
            path: Arc::from(path),
            source,
        })
    }

    pub fn parse_program(mut self) -> Result<ParsedProgram, CompileError> {
        let stmts = self.parse_directive_prologue_and_statements_until_eof()?;
        let body = self.arena.push_stmts(stmts);
        let strict = self.cursor.is_strict();
        Ok(ParsedProgram { arena: self.arena, body, strict })
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> CompileError {
        let span = self.cursor.span();
        let line = ecmac_diagnostic::line_at(self.source, span.start);
        CompileError::syntax(message, self.path.clone(), line, span)
    }

    pub(crate) fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub(crate) fn push_function(&mut self, f: ecmac_ir::Function) -> FunctionId {
        self.arena.push_function(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParsedProgram {
        let interner = Arc::new(StringInterner::new());
        Parser::new("t.js", src, interner).unwrap().parse_program().unwrap()
    }

    #[test]
    fn parses_empty_program() {
        let p = parse("");
        assert_eq!(p.body.len(), 0);
    }

    #[test]
    fn parses_var_declaration_statement() {
        let p = parse("var x = 1 + 2;");
        assert_eq!(p.body.len(), 1);
    }
}
