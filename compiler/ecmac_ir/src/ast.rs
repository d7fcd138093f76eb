//! AST node data model (`spec.md` §3 "AST node").
//!
//! Every statement and expression variant named in the spec is represented
//! here as a plain data variant; the `GenerateCode`/`ResolveVariables`
//! behavior lives in `ecmac_resolve`/`ecmac_codegen` as dispatch over
//! `ExprKind`/`StmtKind` tags (see the "Dynamic dispatch" design note),
//! not as methods on these types.

use crate::{ExprId, ExprRange, Name, Span, StmtId, StmtRange};

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    /// Labels directly attached to this statement (`L: stmt`), consumed by
    /// `break`/`continue` resolution in `ecmac_resolve`.
    pub labels: Vec<Name>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    In,
    InstanceOf,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    /// Prefix or postfix `++`; `is_prefix` distinguishes the two (both
    /// share the same value-producing contract described in `spec.md`
    /// §4.9, differing only in which value is left on the stack).
    Increment { is_prefix: bool },
    Decrement { is_prefix: bool },
}

/// Compound assignment operator, or plain `=` (`None` case handled by
/// `ExprKind::Assign` directly rather than an `AssignOp` variant).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompoundAssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
}

#[derive(Clone, Debug)]
pub enum PrimitiveLiteral {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    String(Name),
    Regex { pattern: Name, flags: Name },
}

#[derive(Clone, Debug)]
pub struct ObjectProperty {
    pub key: Name,
    pub value: ExprId,
    /// `true` when written as the ES6 shorthand `{ x }` (desugars to
    /// `{ x: x }` during lowering — see `spec.md` §1 ES6 additions).
    pub shorthand: bool,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(PrimitiveLiteral),
    ArrayLiteral(ExprRange),
    ObjectLiteral(Vec<ObjectProperty>),
    /// Template literal: `cooked` chunks interleaved with `exprs`
    /// (`cooked.len() == exprs.len() + 1`).
    TemplateLiteral { cooked: Vec<Name>, exprs: ExprRange },
    Name(Name),
    /// `obj.prop`
    Member { object: ExprId, property: Name },
    /// `obj[index]`
    Index { object: ExprId, index: ExprId },
    Call { callee: ExprId, args: ExprRange },
    New { callee: ExprId, args: ExprRange },
    Assign { target: ExprId, value: ExprId },
    CompoundAssign { op: CompoundAssignOp, target: ExprId, value: ExprId },
    Unary { op: UnaryOp, operand: ExprId },
    Binary { op: BinaryOp, left: ExprId, right: ExprId },
    Ternary { cond: ExprId, then_expr: ExprId, else_expr: ExprId },
    /// Comma expression `a, b, c`.
    Sequence(ExprRange),
    Function(FunctionId),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionId(pub u32);

#[derive(Clone, Debug)]
pub struct Function {
    pub name: Option<Name>,
    pub params: Vec<Name>,
    pub body: StmtRange,
    pub span: Span,
    pub is_strict: bool,
}

#[derive(Clone, Debug)]
pub struct VarDeclarator {
    pub name: Name,
    pub init: Option<ExprId>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug)]
pub struct SwitchCase {
    /// `None` for the `default:` clause (`spec.md` §4.2: "a possibly-null
    /// test value"; at most one clause per switch may omit it).
    pub test: Option<ExprId>,
    pub body: StmtRange,
}

#[derive(Clone, Debug)]
pub struct CatchClause {
    pub param: Option<Name>,
    pub body: StmtRange,
}

#[derive(Clone, Debug)]
pub enum ForInit {
    Expr(ExprId),
    VarDecl { kind: DeclKind, decls: Vec<VarDeclarator> },
    None,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Block(StmtRange),
    Expression(ExprId),
    VarDecl { kind: DeclKind, decls: Vec<VarDeclarator> },
    If { cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId> },
    While { cond: ExprId, body: StmtId },
    DoWhile { body: StmtId, cond: ExprId },
    For { init: ForInit, cond: Option<ExprId>, update: Option<ExprId>, body: StmtId },
    /// `for (lhs in obj) body` — `lhs_name` is the bound variable;
    /// `declares` is true when written as `for (var x in obj)`.
    ForIn { lhs_name: Name, declares: bool, object: ExprId, body: StmtId },
    /// `for (lhs of iterable) body`.
    ForOf { lhs_name: Name, declares: bool, iterable: ExprId, body: StmtId },
    Switch { discriminant: ExprId, cases: Vec<SwitchCase> },
    Try { block: StmtRange, catch: Option<CatchClause>, finally: Option<StmtRange> },
    Break(Option<Name>),
    Continue(Option<Name>),
    Return(Option<ExprId>),
    Throw(ExprId),
    With { object: ExprId, body: StmtId },
    Empty,
    Debugger,
    FunctionDecl(FunctionId),
}
