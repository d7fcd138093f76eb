//! The common numeric type rule (`spec.md` §4.7).

use crate::Type;

/// If both operand types are numeric, return the common numeric type: `f64`
/// if they differ, or the shared type if they agree. Returns `None` if
/// either operand is non-numeric (the caller then falls back to its own
/// per-operator rule, e.g. string `+` or bitwise-to-i32 coercion).
pub fn common_numeric_type(left: Type, right: Type) -> Option<Type> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    if left == right {
        Some(left)
    } else {
        Some(Type::F64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_numeric_type_stays_the_same() {
        assert_eq!(common_numeric_type(Type::I32, Type::I32), Some(Type::I32));
    }

    #[test]
    fn mixed_numeric_types_widen_to_f64() {
        assert_eq!(common_numeric_type(Type::I32, Type::U32), Some(Type::F64));
        assert_eq!(common_numeric_type(Type::I32, Type::F64), Some(Type::F64));
    }

    #[test]
    fn non_numeric_operand_yields_none() {
        assert_eq!(common_numeric_type(Type::I32, Type::String), None);
    }
}
