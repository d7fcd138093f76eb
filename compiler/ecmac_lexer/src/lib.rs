//! ECMAScript lexer (`spec.md` §4.1, C2).
//!
//! Streams tokens from a [`SourceBuffer`], skipping whitespace but
//! recording whether a line terminator was crossed (for ASI). The parser
//! drives recognition by passing a [`LexMode`] hint before each token:
//! `Literal` accepts an operand or prefix operator next (so `/` starts a
//! regex); `Operator` accepts a binary/postfix operator (so `/` is divide);
//! `TemplateContinuation` resumes a template literal body after `${…}`.

mod cook_escape;
mod keywords;

use ecmac_diagnostic::CompileError;
use ecmac_ir::{NumericKind, Punct, Span, StringInterner, Token, TokenKind};
use ecmac_lexer_core::raw_scanner::{
    is_decimal_digit, is_hex_digit, is_ident_continue, is_ident_start, is_octal_digit,
    is_whitespace,
};
use ecmac_lexer_core::SourceBuffer;
use std::sync::Arc;

/// Next-token expectation, set by the parser before each call to
/// [`Lexer::next`] (`spec.md` §4.1).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexMode {
    /// An operand or prefix operator is expected: `/` starts a regex.
    Literal,
    /// A binary/postfix operator or end-of-expression is expected: `/` is
    /// division.
    Operator,
    /// Resume a template literal body after a `${…}` substitution.
    TemplateContinuation,
}

pub struct Lexer<'a> {
    buffer: SourceBuffer<'a>,
    pos: u32,
    strict: bool,
    interner: Arc<StringInterner>,
    path: Arc<str>,
}

impl<'a> Lexer<'a> {
    pub fn new(path: &'a str, source: &'a str, interner: Arc<StringInterner>) -> Self {
        Lexer {
            buffer: SourceBuffer::new(path, source),
            pos: 0,
            strict: false,
            interner,
            path: Arc::from(path),
        }
    }

    /// Toggled by the parser once a `"use strict"` directive prologue
    /// string, or an engine-wide `ForceStrictMode` option, is observed.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn error(&mut self, message: impl Into<String>, span: Span) -> CompileError {
        let line = self.buffer.line_at(span.start);
        CompileError::syntax(message, self.path.clone(), line, span)
    }

    /// Skip whitespace and comments, returning whether a line terminator
    /// was crossed.
    fn skip_trivia(&mut self) -> bool {
        let mut crossed_newline = false;
        loop {
            match self.buffer.byte_at(self.pos) {
                Some(b) if is_whitespace(b) => {
                    self.pos += 1;
                }
                Some(b'\n') | Some(b'\r') => {
                    crossed_newline = true;
                    self.pos += 1;
                }
                Some(b'/') if self.buffer.byte_at(self.pos + 1) == Some(b'/') => {
                    self.pos += 2;
                    while let Some(b) = self.buffer.byte_at(self.pos) {
                        if b == b'\n' || b == b'\r' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.buffer.byte_at(self.pos + 1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.buffer.byte_at(self.pos) {
                            None => break,
                            Some(b'\n') | Some(b'\r') => {
                                crossed_newline = true;
                                self.pos += 1;
                            }
                            Some(b'*') if self.buffer.byte_at(self.pos + 1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => break,
            }
        }
        crossed_newline
    }

    /// Produce the next token under `mode`.
    pub fn next(&mut self, mode: LexMode) -> Result<Token, CompileError> {
        let preceded_by_newline = self.skip_trivia();
        let start = self.pos;

        let Some(b) = self.buffer.byte_at(self.pos) else {
            return Ok(Token::new(TokenKind::Eof, Span::new(start, start), preceded_by_newline));
        };

        if mode == LexMode::TemplateContinuation {
            return self.lex_template_chunk(start, preceded_by_newline, false);
        }

        if is_ident_start(b) {
            return Ok(self.lex_ident_or_keyword(start, preceded_by_newline));
        }
        if is_decimal_digit(b) {
            return self.lex_number(start, preceded_by_newline);
        }
        match b {
            b'"' | b'\'' => self.lex_string(start, preceded_by_newline, b),
            b'`' => self.lex_template_chunk(start, preceded_by_newline, true),
            b'/' if mode == LexMode::Literal => self.lex_regex(start, preceded_by_newline),
            _ => self.lex_punct(start, preceded_by_newline),
        }
    }

    fn lex_ident_or_keyword(&mut self, start: u32, preceded_by_newline: bool) -> Token {
        self.pos += 1;
        while let Some(b) = self.buffer.byte_at(self.pos) {
            if !is_ident_continue(b) {
                break;
            }
            self.pos += 1;
        }
        let text = std::str::from_utf8(self.buffer.bytes())
            .ok()
            .and_then(|s| s.get(start as usize..self.pos as usize))
            .unwrap_or("");
        let span = Span::new(start, self.pos);
        if let Some(kw) = keywords::classify(text, self.strict) {
            Token::new(TokenKind::Keyword(kw), span, preceded_by_newline)
        } else {
            let name = self.interner.intern(text);
            Token::new(TokenKind::Ident(name), span, preceded_by_newline)
        }
    }

    fn lex_number(&mut self, start: u32, preceded_by_newline: bool) -> Result<Token, CompileError> {
        let mut is_float = false;
        if self.buffer.byte_at(self.pos) == Some(b'0')
            && matches!(self.buffer.byte_at(self.pos + 1), Some(b'x') | Some(b'X'))
        {
            self.pos += 2;
            let digit_start = self.pos;
            while self.buffer.byte_at(self.pos).is_some_and(is_hex_digit) {
                self.pos += 1;
            }
            let span = Span::new(start, self.pos);
            let text = self.text(digit_start, self.pos);
            let value = u64::from_str_radix(text, 16).unwrap_or(0) as f64;
            return Ok(Token::new(
                TokenKind::Number { bits: value.to_bits(), kind: NumericKind::Integer },
                span,
                preceded_by_newline,
            ));
        }
        // Legacy octal: a leading zero followed by octal digits, disallowed
        // in strict mode (`spec.md` §4.1 "tightens numeric-literal rules").
        if self.buffer.byte_at(self.pos) == Some(b'0')
            && self.buffer.byte_at(self.pos + 1).is_some_and(is_octal_digit)
        {
            if self.strict {
                let span = Span::new(start, self.pos + 1);
                return Err(self.error("octal literals are not allowed in strict mode", span));
            }
            self.pos += 1;
            let digit_start = self.pos;
            while self.buffer.byte_at(self.pos).is_some_and(is_octal_digit) {
                self.pos += 1;
            }
            let text = self.text(digit_start, self.pos);
            let value = u64::from_str_radix(text, 8).unwrap_or(0) as f64;
            let span = Span::new(start, self.pos);
            return Ok(Token::new(
                TokenKind::Number { bits: value.to_bits(), kind: NumericKind::Integer },
                span,
                preceded_by_newline,
            ));
        }

        while self.buffer.byte_at(self.pos).is_some_and(is_decimal_digit) {
            self.pos += 1;
        }
        if self.buffer.byte_at(self.pos) == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while self.buffer.byte_at(self.pos).is_some_and(is_decimal_digit) {
                self.pos += 1;
            }
        }
        if matches!(self.buffer.byte_at(self.pos), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.buffer.byte_at(self.pos), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            while self.buffer.byte_at(self.pos).is_some_and(is_decimal_digit) {
                self.pos += 1;
            }
        }
        let span = Span::new(start, self.pos);
        let text = self.text(start, self.pos);
        let value: f64 = text.parse().unwrap_or(f64::NAN);
        let kind = if is_float { NumericKind::Float } else { NumericKind::Integer };
        Ok(Token::new(
            TokenKind::Number { bits: value.to_bits(), kind },
            span,
            preceded_by_newline,
        ))
    }

    fn lex_string(&mut self, start: u32, preceded_by_newline: bool, quote: u8) -> Result<Token, CompileError> {
        self.pos += 1;
        let content_start = self.pos;
        loop {
            match self.buffer.byte_at(self.pos) {
                None => return Err(self.error("unterminated string literal", Span::new(start, self.pos))),
                Some(b) if b == quote => break,
                Some(b'\\') => self.pos += 2,
                Some(b'\n') | Some(b'\r') => {
                    return Err(self.error("unterminated string literal", Span::new(start, self.pos)))
                }
                Some(_) => self.pos += 1,
            }
        }
        let raw = self.text(content_start, self.pos);
        let (cooked, _, _) = cook_escape::cook(raw);
        self.pos += 1; // closing quote
        let span = Span::new(start, self.pos);
        let name = self.interner.intern(&cooked);
        Ok(Token::new(TokenKind::String(name), span, preceded_by_newline))
    }

    /// Lex one chunk of a template literal (the text between backtick/`}`
    /// and the next `${`/closing backtick). `at_open` is true when called
    /// for the opening backtick itself.
    fn lex_template_chunk(
        &mut self,
        start: u32,
        preceded_by_newline: bool,
        at_open: bool,
    ) -> Result<Token, CompileError> {
        if at_open {
            self.pos += 1;
        }
        let content_start = self.pos;
        let tail;
        loop {
            match self.buffer.byte_at(self.pos) {
                None => return Err(self.error("unterminated template literal", Span::new(start, self.pos))),
                Some(b'`') => {
                    tail = true;
                    break;
                }
                Some(b'$') if self.buffer.byte_at(self.pos + 1) == Some(b'{') => {
                    tail = false;
                    break;
                }
                Some(b'\\') => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }
        let raw = self.text(content_start, self.pos);
        let (cooked, _, _) = cook_escape::cook(raw);
        self.pos += if tail { 1 } else { 2 };
        let span = Span::new(start, self.pos);
        let name = self.interner.intern(&cooked);
        Ok(Token::new(TokenKind::Template { cooked: name, tail }, span, preceded_by_newline))
    }

    fn lex_regex(&mut self, start: u32, preceded_by_newline: bool) -> Result<Token, CompileError> {
        self.pos += 1;
        let pattern_start = self.pos;
        let mut in_class = false;
        loop {
            match self.buffer.byte_at(self.pos) {
                None => return Err(self.error("unterminated regular expression", Span::new(start, self.pos))),
                Some(b'\n') | Some(b'\r') => {
                    return Err(self.error("unterminated regular expression", Span::new(start, self.pos)))
                }
                Some(b'\\') => self.pos += 2,
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => break,
                Some(_) => self.pos += 1,
            }
        }
        let pattern = self.text(pattern_start, self.pos);
        self.pos += 1; // closing /
        let flags_start = self.pos;
        while self.buffer.byte_at(self.pos).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let flags = self.text(flags_start, self.pos);
        let span = Span::new(start, self.pos);
        Ok(Token::new(
            TokenKind::Regex { pattern: self.interner.intern(pattern), flags: self.interner.intern(flags) },
            span,
            preceded_by_newline,
        ))
    }

    fn lex_punct(&mut self, start: u32, preceded_by_newline: bool) -> Result<Token, CompileError> {
        // Longest-match-first table of multi-character punctuators.
        const TABLE: &[(&str, Punct)] = &[
            (">>>=", Punct::UShrAssign),
            ("===", Punct::StrictEq),
            ("!==", Punct::StrictNotEq),
            ("...", Punct::Ellipsis),
            (">>>", Punct::UShr),
            ("<<=", Punct::ShlAssign),
            (">>=", Punct::ShrAssign),
            ("=>", Punct::Arrow),
            ("==", Punct::Eq),
            ("!=", Punct::NotEq),
            ("<=", Punct::LtEq),
            (">=", Punct::GtEq),
            ("&&", Punct::AndAnd),
            ("||", Punct::OrOr),
            ("++", Punct::PlusPlus),
            ("--", Punct::MinusMinus),
            ("+=", Punct::PlusAssign),
            ("-=", Punct::MinusAssign),
            ("*=", Punct::StarAssign),
            ("/=", Punct::SlashAssign),
            ("%=", Punct::PercentAssign),
            ("&=", Punct::AndAssign),
            ("|=", Punct::OrAssign),
            ("^=", Punct::XorAssign),
            ("<<", Punct::Shl),
            (">>", Punct::Shr),
            ("${", Punct::DollarBrace),
            ("(", Punct::LParen),
            (")", Punct::RParen),
            ("{", Punct::LBrace),
            ("}", Punct::RBrace),
            ("[", Punct::LBracket),
            ("]", Punct::RBracket),
            (";", Punct::Semi),
            (",", Punct::Comma),
            (".", Punct::Dot),
            (":", Punct::Colon),
            ("?", Punct::Question),
            ("=", Punct::Assign),
            ("+", Punct::Plus),
            ("-", Punct::Minus),
            ("*", Punct::Star),
            ("/", Punct::Slash),
            ("%", Punct::Percent),
            ("<", Punct::Lt),
            (">", Punct::Gt),
            ("&", Punct::Amp),
            ("|", Punct::Pipe),
            ("^", Punct::Caret),
            ("!", Punct::Not),
            ("~", Punct::Tilde),
            ("`", Punct::Backtick),
        ];
        let remaining = self.text(start, self.buffer.len());
        for (lexeme, punct) in TABLE {
            if remaining.starts_with(lexeme) {
                self.pos = start + lexeme.len() as u32;
                let span = Span::new(start, self.pos);
                return Ok(Token::new(TokenKind::Punct(*punct), span, preceded_by_newline));
            }
        }
        let span = Span::new(start, start + 1);
        Err(self.error(format!("unexpected character {:?}", remaining.chars().next()), span))
    }

    fn text(&self, start: u32, end: u32) -> &'a str {
        std::str::from_utf8(&self.buffer.bytes()[start as usize..end as usize]).unwrap_or("")
    }
}

/// Eagerly lex `source` end-to-end under an alternating Literal/Operator
/// heuristic, used only by tests and the `ecmacc` driver's disassembly
/// path; the parser drives [`Lexer::next`] directly during real
/// compilation so it can supply the correct [`LexMode`] per position.
pub fn lex_all(path: &str, source: &str, interner: Arc<StringInterner>) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::new(path, source, interner);
    let mut tokens = Vec::new();
    let mut mode = LexMode::Literal;
    loop {
        let tok = lexer.next(mode)?;
        let is_eof = tok.is_eof();
        mode = match &tok.kind {
            TokenKind::Ident(_)
            | TokenKind::Number { .. }
            | TokenKind::String(_)
            | TokenKind::Regex { .. }
            | TokenKind::Template { tail: true, .. } => LexMode::Operator,
            _ => LexMode::Literal,
        };
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_ir::Keyword;

    fn toks(src: &str) -> Vec<TokenKind> {
        let interner = Arc::new(StringInterner::new());
        lex_all("t.js", src, interner).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_var_declaration() {
        let kinds = toks("var x = 1;");
        assert!(matches!(kinds[0], TokenKind::Keyword(Keyword::Var)));
        assert!(matches!(kinds[1], TokenKind::Ident(_)));
        assert!(matches!(kinds[2], TokenKind::Punct(Punct::Assign)));
        assert!(matches!(kinds[3], TokenKind::Number { .. }));
        assert!(matches!(kinds[4], TokenKind::Punct(Punct::Semi)));
    }

    #[test]
    fn slash_after_identifier_is_divide() {
        let interner = Arc::new(StringInterner::new());
        let mut lexer = Lexer::new("t.js", "a / b", interner);
        let _a = lexer.next(LexMode::Literal).unwrap();
        let slash = lexer.next(LexMode::Operator).unwrap();
        assert!(matches!(slash.kind, TokenKind::Punct(Punct::Slash)));
    }

    #[test]
    fn slash_in_literal_position_is_regex() {
        let interner = Arc::new(StringInterner::new());
        let mut lexer = Lexer::new("t.js", "/abc/g", interner);
        let tok = lexer.next(LexMode::Literal).unwrap();
        assert!(matches!(tok.kind, TokenKind::Regex { .. }));
    }

    #[test]
    fn newline_crossing_is_recorded() {
        let interner = Arc::new(StringInterner::new());
        let mut lexer = Lexer::new("t.js", "a\nb", interner);
        let _a = lexer.next(LexMode::Literal).unwrap();
        let b = lexer.next(LexMode::Literal).unwrap();
        assert!(b.preceded_by_newline);
    }

    #[test]
    fn strict_mode_rejects_legacy_octal() {
        let interner = Arc::new(StringInterner::new());
        let mut lexer = Lexer::new("t.js", "010", interner);
        lexer.set_strict(true);
        assert!(lexer.next(LexMode::Literal).is_err());
    }

    #[test]
    fn template_literal_splits_into_chunks() {
        let interner = Arc::new(StringInterner::new());
        let mut lexer = Lexer::new("t.js", "`a${1}b`", interner);
        let head = lexer.next(LexMode::Literal).unwrap();
        assert!(matches!(head.kind, TokenKind::Template { tail: false, .. }));
        let one = lexer.next(LexMode::Literal).unwrap();
        assert!(matches!(one.kind, TokenKind::Number { .. }));
        let rbrace = lexer.next(LexMode::Operator).unwrap();
        assert!(matches!(rbrace.kind, TokenKind::Punct(Punct::RBrace)));
        let tail = lexer.next(LexMode::TemplateContinuation).unwrap();
        assert!(matches!(tail.kind, TokenKind::Template { tail: true, .. }));
    }
}
