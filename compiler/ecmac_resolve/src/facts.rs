//! Per-node resolve output: the type and (if any) constant value every
//! expression resolved to, plus which statements/branches turned out dead
//! (`spec.md` §4.7 "Constant tracking").
//!
//! Indexed directly by `ExprId`/`StmtId`, sized to the arena at the moment
//! resolution ran — a later arena growth (there is none once parsing is
//! done) would simply leave the new indices unanswered.

use ecmac_ir::{ExprId, StmtId};
use ecmac_scope::{ConstValue, ScopeId};
use ecmac_types::Type;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Default)]
pub struct ResolvedFacts {
    expr_types: Vec<Option<Type>>,
    expr_constants: Vec<Option<ConstValue>>,
    /// Statements elided because they live inside the dead branch of a
    /// constant `if` (`spec.md` §4.7, §4.9 "Control flow").
    dead_stmts: FxHashSet<StmtId>,
    /// The scope a `with` or `catch` clause's own block resolved its names
    /// against. Codegen walks the same tree but does not re-run scope
    /// creation — it needs the exact `ScopeId` resolution already pushed so
    /// a name bound inside that block is looked up starting from the right
    /// place, not a disconnected duplicate.
    stmt_scopes: FxHashMap<StmtId, ScopeId>,
}

impl ResolvedFacts {
    pub fn with_capacity(expr_count: usize) -> Self {
        ResolvedFacts {
            expr_types: vec![None; expr_count],
            expr_constants: vec![None; expr_count],
            dead_stmts: FxHashSet::default(),
            stmt_scopes: FxHashMap::default(),
        }
    }

    pub fn set_type(&mut self, id: ExprId, ty: Type) {
        self.expr_types[id.index()] = Some(ty);
    }

    /// The resolved type of `id`. Every expression the resolver visits gets
    /// one; `Type::Universal` is returned for an id the traversal skipped
    /// (e.g. the dead branch of a constant conditional), matching how a
    /// fully dynamic value would be treated if it were ever read.
    pub fn type_of(&self, id: ExprId) -> Type {
        self.expr_types[id.index()].unwrap_or(Type::Universal)
    }

    pub fn set_constant(&mut self, id: ExprId, value: ConstValue) {
        self.expr_constants[id.index()] = Some(value);
    }

    pub fn constant_of(&self, id: ExprId) -> Option<&ConstValue> {
        self.expr_constants[id.index()].as_ref()
    }

    pub fn mark_dead(&mut self, id: StmtId) {
        self.dead_stmts.insert(id);
    }

    pub fn is_dead(&self, id: StmtId) -> bool {
        self.dead_stmts.contains(&id)
    }

    pub fn record_scope(&mut self, id: StmtId, scope: ScopeId) {
        self.stmt_scopes.insert(id, scope);
    }

    pub fn scope_of(&self, id: StmtId) -> Option<ScopeId> {
        self.stmt_scopes.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_expr_type_defaults_to_universal() {
        let facts = ResolvedFacts::with_capacity(4);
        assert_eq!(facts.type_of(ExprId(0)), Type::Universal);
    }

    #[test]
    fn set_type_round_trips() {
        let mut facts = ResolvedFacts::with_capacity(4);
        facts.set_type(ExprId(2), Type::I32);
        assert_eq!(facts.type_of(ExprId(2)), Type::I32);
    }

    #[test]
    fn dead_statement_tracking() {
        let mut facts = ResolvedFacts::with_capacity(1);
        assert!(!facts.is_dead(StmtId(5)));
        facts.mark_dead(StmtId(5));
        assert!(facts.is_dead(StmtId(5)));
    }

    #[test]
    fn recorded_scope_round_trips_by_statement() {
        let mut facts = ResolvedFacts::with_capacity(1);
        assert!(facts.scope_of(StmtId(5)).is_none());
        facts.record_scope(StmtId(5), ScopeId(2));
        assert_eq!(facts.scope_of(StmtId(5)), Some(ScopeId(2)));
    }
}
