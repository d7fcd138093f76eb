//! Flat-arena storage for the AST.
//!
//! Capacity limits: up to `u32::MAX` expressions/statements, up to
//! `u16::MAX` elements in a single `ExprRange`/`StmtRange`. Exceeding
//! either is a bug in the parser (scripts large enough to hit these limits
//! are not a realistic input), so we panic with a clear message rather
//! than thread an error return through every arena push.

use crate::ast::{Expr, Function, Stmt};
use crate::{ExprId, ExprRange, FunctionId, StmtId, StmtRange};

#[cold]
#[inline(never)]
fn panic_capacity_exceeded(what: &str, len: usize) -> ! {
    panic!("ecmac_ir arena capacity exceeded: {what} has {len} elements, max is {}", u32::MAX);
}

fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic_capacity_exceeded(what, len))
}

fn to_u16(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic_capacity_exceeded(what, len))
}

/// Owns every `Expr`/`Stmt`/`Function` produced while parsing one source
/// unit. AST nodes reference each other exclusively through `ExprId`/
/// `StmtId`/`FunctionId` indices into this arena — never through pointers —
/// so the arena (and therefore the AST) is freely `Clone`.
#[derive(Clone, Default)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    functions: Vec<Function>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_expr(&mut self, expr: Expr) -> ExprId {
        let id = to_u32(self.exprs.len(), "ExprArena");
        self.exprs.push(expr);
        ExprId(id)
    }

    pub fn push_exprs(&mut self, exprs: impl IntoIterator<Item = Expr>) -> ExprRange {
        let start = to_u32(self.exprs.len(), "ExprArena");
        let before = self.exprs.len();
        self.exprs.extend(exprs);
        let len = to_u16(self.exprs.len() - before, "ExprRange");
        ExprRange { start, len }
    }

    pub fn push_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = to_u32(self.stmts.len(), "StmtArena");
        self.stmts.push(stmt);
        StmtId(id)
    }

    pub fn push_stmts(&mut self, stmts: impl IntoIterator<Item = Stmt>) -> StmtRange {
        let start = to_u32(self.stmts.len(), "StmtArena");
        let before = self.stmts.len();
        self.stmts.extend(stmts);
        let len = to_u16(self.stmts.len() - before, "StmtRange");
        StmtRange { start, len }
    }

    pub fn push_function(&mut self, function: Function) -> FunctionId {
        let id = to_u32(self.functions.len(), "FunctionArena");
        self.functions.push(function);
        FunctionId(id)
    }

    /// Number of expressions pushed so far — sizes a side-table indexed by
    /// `ExprId` (e.g. the per-expression type/constant facts `ecmac_resolve`
    /// attaches to an already-parsed arena).
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Number of statements pushed so far, for the same reason as
    /// [`Arena::expr_count`].
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub fn expr_range(&self, range: ExprRange) -> &[Expr] {
        let start = range.start as usize;
        &self.exprs[start..start + range.len()]
    }

    pub fn stmt_range(&self, range: StmtRange) -> &[Stmt] {
        let start = range.start as usize;
        &self.stmts[start..start + range.len()]
    }

    pub fn expr_ids(&self, range: ExprRange) -> impl Iterator<Item = ExprId> {
        (range.start..range.start + u32::from(range.len)).map(ExprId)
    }

    pub fn stmt_ids(&self, range: StmtRange) -> impl Iterator<Item = StmtId> {
        (range.start..range.start + u32::from(range.len)).map(StmtId)
    }
}

/// An `Arena` shared (read-only, post-parse) across compilation of every
/// function nested in one source unit.
pub type SharedArena = std::sync::Arc<Arena>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, PrimitiveLiteral};
    use crate::Span;

    fn lit(n: f64) -> Expr {
        Expr {
            kind: ExprKind::Literal(PrimitiveLiteral::Number(n)),
            span: Span::DUMMY,
        }
    }

    #[test]
    fn push_and_fetch_single_expr() {
        let mut arena = Arena::new();
        let id = arena.push_expr(lit(1.0));
        match arena.expr(id).kind {
            ExprKind::Literal(PrimitiveLiteral::Number(n)) => assert_eq!(n, 1.0),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn push_exprs_range_covers_all_pushed() {
        let mut arena = Arena::new();
        let range = arena.push_exprs([lit(1.0), lit(2.0), lit(3.0)]);
        assert_eq!(range.len(), 3);
        let ids: Vec<_> = arena.expr_ids(range).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], ExprId(0));
        assert_eq!(ids[2], ExprId(2));
    }
}
