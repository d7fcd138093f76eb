//! Flat arena indices for AST nodes.
//!
//! No `Box<Expr>`/`Box<Stmt>` anywhere in the AST: every child reference is
//! an index into the owning [`crate::arena::Arena`], so the tree can be
//! cloned and compared cheaply and specializations can share the same
//! parsed AST.

use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(ExprId);
arena_id!(StmtId);

/// A contiguous run `[start, start+len)` of `ExprId`s in the arena —
/// used for argument lists, array-literal elements, etc.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExprRange {
    pub start: u32,
    pub len: u16,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// A contiguous run of `StmtId`s — used for block bodies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct StmtRange {
    pub start: u32,
    pub len: u16,
}

impl StmtRange {
    pub const EMPTY: StmtRange = StmtRange { start: 0, len: 0 };

    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }
}
