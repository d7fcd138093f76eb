//! Constant tracking (`spec.md` §4.7 "Constant tracking").

use ecmac_ir::Name;
use ecmac_types::MethodId;

/// A compile-time-known value a variable's first write established.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ConstValue {
    Undefined,
    Null,
    Boolean(bool),
    /// Stored as bits so `ConstValue` can derive `PartialEq` without
    /// `f64`'s partial-equality footguns biting the `ConstantState`
    /// disagreement check below.
    Number(u64),
    String(Name),
    /// A user-function generator's method id (`spec.md` §3 invariants:
    /// "retains that value even after the method's return-type
    /// collapses").
    Method(MethodId),
}

impl ConstValue {
    pub fn number(n: f64) -> Self {
        ConstValue::Number(n.to_bits())
    }
}

/// Every variable's constant state (`spec.md` §3 "Variable").
#[derive(Clone, PartialEq, Debug, Default)]
pub enum ConstantState {
    #[default]
    Unset,
    Value(ConstValue),
    NonConstant,
}

impl ConstantState {
    /// `TrySetConstant(v)`: `Unset -> v`; `v == v` unchanged; any other
    /// disagreement collapses to `NonConstant`. Returns `true` if this
    /// call caused a collapse.
    pub fn try_set(&mut self, v: ConstValue) -> bool {
        match self {
            ConstantState::Unset => {
                *self = ConstantState::Value(v);
                false
            }
            ConstantState::Value(existing) if *existing == v => false,
            ConstantState::Value(_) => {
                *self = ConstantState::NonConstant;
                true
            }
            ConstantState::NonConstant => false,
        }
    }

    pub fn value(&self) -> Option<&ConstValue> {
        match self {
            ConstantState::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_non_constant(&self) -> bool {
        matches!(self, ConstantState::NonConstant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_sets_value() {
        let mut state = ConstantState::Unset;
        let collapsed = state.try_set(ConstValue::number(5.0));
        assert!(!collapsed);
        assert_eq!(state.value(), Some(&ConstValue::number(5.0)));
    }

    #[test]
    fn agreeing_second_write_does_not_collapse() {
        let mut state = ConstantState::Unset;
        state.try_set(ConstValue::number(5.0));
        let collapsed = state.try_set(ConstValue::number(5.0));
        assert!(!collapsed);
        assert!(!state.is_non_constant());
    }

    #[test]
    fn disagreeing_second_write_collapses() {
        let mut state = ConstantState::Unset;
        state.try_set(ConstValue::number(5.0));
        let collapsed = state.try_set(ConstValue::number(6.0));
        assert!(collapsed);
        assert!(state.is_non_constant());
    }

    #[test]
    fn collapse_is_permanent() {
        let mut state = ConstantState::Unset;
        state.try_set(ConstValue::number(5.0));
        state.try_set(ConstValue::number(6.0));
        let collapsed_again = state.try_set(ConstValue::number(5.0));
        assert!(!collapsed_again);
        assert!(state.is_non_constant());
    }
}
