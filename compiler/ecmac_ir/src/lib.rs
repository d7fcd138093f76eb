//! Core IR data structures for the ecmac compiler.
//!
//! - Spans for source locations
//! - Interned names for identifiers and string literals
//! - Tokens produced by the lexer
//! - AST nodes (expressions, statements, functions), arena-allocated
//!
//! # Design philosophy
//!
//! - **Intern everything**: strings become `Name(u32)`.
//! - **Flatten everything**: no `Box<Expr>`, only arena indices
//!   (`ExprId`/`StmtId`).
//! - Every type is `Clone + Eq + Hash + Debug` so it can be used as a cache
//!   key by `ecmac_cache` without restriction.

pub mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod name;
mod span;
pub mod token;

pub use arena::{Arena, SharedArena};
pub use ast::{
    BinaryOp, CatchClause, CompoundAssignOp, DeclKind, Expr, ExprKind, ForInit, Function,
    FunctionId, ObjectProperty, PrimitiveLiteral, Stmt, StmtKind, SwitchCase, UnaryOp,
    VarDeclarator,
};
pub use expr_id::{ExprId, ExprRange, StmtId, StmtRange};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use token::{Keyword, NumericKind, Punct, Token, TokenKind};
