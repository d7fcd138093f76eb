//! The four variable kinds (`spec.md` §3 "Variable").

use crate::constant::ConstantState;
use ecmac_ir::Name;
use ecmac_proto::PropertyAttributes;
use ecmac_types::{MethodId, PrototypeId, Type};
use rustc_hash::{FxHashMap, FxHashSet};

/// An opaque IL local-slot handle, allocated lazily (`spec.md` §3 "A
/// declared variable's IL slot exists iff its type has stabilized").
/// Opaque here because the concrete representation belongs to whatever
/// `IlEmitter` implementation is in use; `ecmac_codegen` downcasts through
/// its own handle type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SlotHandle(pub u32);

pub struct ArgumentVariable {
    pub index: usize,
    pub ty: Type,
    pub constant: ConstantState,
    /// Properties this function is observed to assign on this argument,
    /// with their types — propagates type facts across calls
    /// (`spec.md` §3 "Argument variable").
    pub changes_properties: FxHashMap<Name, Type>,
}

pub struct DeclaredVariable {
    /// `None` until the first write (`spec.md` §3 "Declared variable").
    pub ty: Option<Type>,
    pub slot: Option<SlotHandle>,
    pub constant: ConstantState,
    /// Prevents a hoisted function declaration's initializer from running
    /// twice.
    pub initialized: bool,
}

pub struct GlobalVariable {
    pub name: Name,
    pub ty: Option<Type>,
    pub constant: ConstantState,
    /// Compiled functions recorded as readers/writers of this global, so a
    /// type collapse can schedule their re-resolution
    /// (`spec.md` §4.12 "Recompilation triggers").
    pub users: FxHashSet<MethodId>,
}

pub struct PropertyVariable {
    pub prototype: PrototypeId,
    pub name: Name,
    pub ty: Type,
    pub attributes: PropertyAttributes,
    pub getter: Option<MethodId>,
    pub setter: Option<MethodId>,
    /// `this[int]`/`this[uint]` indexer type, if this property also backs
    /// an indexer.
    pub first_indexer_type: Option<Type>,
    pub constant: ConstantState,
}

pub enum Variable {
    Argument(ArgumentVariable),
    Declared(DeclaredVariable),
    Global(GlobalVariable),
    Property(PropertyVariable),
}

impl Variable {
    pub fn read_type(&self) -> Type {
        match self {
            Variable::Argument(v) => v.ty,
            Variable::Declared(v) => v.ty.unwrap_or(Type::Undefined),
            Variable::Global(v) => v.ty.unwrap_or(Type::Universal),
            Variable::Property(v) => v.ty,
        }
    }

    pub fn constant(&self) -> &ConstantState {
        match self {
            Variable::Argument(v) => &v.constant,
            Variable::Declared(v) => &v.constant,
            Variable::Global(v) => &v.constant,
            Variable::Property(v) => &v.constant,
        }
    }

    /// `ApplyType(ctx, type)` (`spec.md` §4.7): apply a newly observed type
    /// to this storage location on an assignment-like reference. Returns
    /// `true` if this call caused a collapse to the universal type — the
    /// caller is responsible for invalidating any allocated IL slot and
    /// (for globals) scheduling recompilation of `users`.
    pub fn apply_type(&mut self, ty: Type) -> bool {
        match self {
            Variable::Argument(v) => apply_to_slot(&mut v.ty, ty, true),
            Variable::Declared(v) => match v.ty {
                None => {
                    v.ty = Some(ty);
                    false
                }
                Some(existing) => {
                    let mut slot = existing;
                    let collapsed = apply_to_slot(&mut slot, ty, false);
                    v.ty = Some(slot);
                    if collapsed {
                        v.slot = None;
                    }
                    collapsed
                }
            },
            Variable::Global(v) => match v.ty {
                None => {
                    v.ty = Some(ty);
                    false
                }
                Some(existing) => {
                    let mut slot = existing;
                    let collapsed = apply_to_slot(&mut slot, ty, false);
                    v.ty = Some(slot);
                    collapsed
                }
            },
            Variable::Property(v) => {
                if v.attributes.sealed {
                    false
                } else {
                    apply_to_slot(&mut v.ty, ty, false)
                }
            }
        }
    }
}

/// Shared widening rule used by every non-initial `ApplyType` call: a
/// slot whose type has already been set only ever *widens* — agreement is
/// a no-op, disagreement collapses to [`Type::Universal`] and never
/// un-collapses (`spec.md` §3 invariants).
///
/// `allow_reset` is set for argument variables, whose initial type is a
/// placeholder (not "unset") established at specialization time rather
/// than learned from the first assignment.
fn apply_to_slot(slot: &mut Type, new_ty: Type, allow_reset: bool) -> bool {
    if *slot == Type::Universal {
        return false;
    }
    if *slot == new_ty {
        return false;
    }
    if allow_reset && *slot == Type::Undefined {
        *slot = new_ty;
        return false;
    }
    *slot = Type::Universal;
    true
}
