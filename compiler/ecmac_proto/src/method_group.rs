//! Method groups: ordered overload sets (`spec.md` §3 "Method group",
//! §4.8 "Overload selection").

use ecmac_types::{MethodId, Type};

/// One overload in a [`MethodGroup`].
#[derive(Clone, Debug)]
pub struct Overload {
    pub target: MethodId,
    /// Formal parameter types, *not* counting the leading engine/`this`
    /// parameters (those are tracked by the flags below so arity
    /// accounting can treat them uniformly with user functions, which have
    /// no such leading parameters).
    pub params: Vec<Type>,
    /// The formal's return type.
    pub return_type: Type,
    /// `true` when the first native formal is the engine handle, invisible
    /// to script-level call sites.
    pub leading_engine_param: bool,
    /// `true` when the (possibly second, after the engine parameter)
    /// formal is conventionally named `thisObj` and receives the call's
    /// `this` value.
    pub leading_this_obj: bool,
    /// `true` when the last formal is a `params`-style trailing array that
    /// absorbs zero or more extra actual arguments.
    pub params_array: bool,
    /// Parameters (from the end) that have a default value and may
    /// therefore be omitted by the caller.
    pub trailing_optional: u8,
}

impl Overload {
    /// Minimum and maximum number of *script-visible* arguments this
    /// overload accepts (`None` max means unbounded, via `params_array`).
    pub fn arity(&self) -> (usize, Option<usize>) {
        let fixed = self.params.len() - usize::from(self.params_array);
        let min = fixed.saturating_sub(self.trailing_optional as usize);
        let max = if self.params_array { None } else { Some(fixed) };
        (min, max)
    }
}

/// An ordered bundle of overloads sharing a name. Overload selection picks
/// at most one; ties break in insertion order (`spec.md` §4.8).
#[derive(Clone, Debug, Default)]
pub struct MethodGroup {
    overloads: Vec<Overload>,
    /// `true` once the group is dense enough (every overload differs only
    /// in a single leading discriminant) to lower as a jump table rather
    /// than a chain of type tests (`spec.md` §3 "jump-table mode").
    pub jump_table: bool,
}

impl MethodGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, overload: Overload) {
        self.overloads.push(overload);
    }

    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    /// Insertion index of `overload` within this group, used to break ties
    /// during overload selection (`spec.md` §4.8).
    pub fn insertion_index(&self, target: MethodId) -> Option<usize> {
        self.overloads.iter().position(|o| o.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overload(params: usize, params_array: bool) -> Overload {
        Overload {
            target: MethodId(1),
            params: vec![Type::I32; params],
            return_type: Type::I32,
            leading_engine_param: false,
            leading_this_obj: false,
            params_array,
            trailing_optional: 0,
        }
    }

    #[test]
    fn fixed_arity_has_matching_min_and_max() {
        let o = overload(2, false);
        assert_eq!(o.arity(), (2, Some(2)));
    }

    #[test]
    fn params_array_overload_has_unbounded_max() {
        let o = overload(1, true);
        assert_eq!(o.arity(), (0, None));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut group = MethodGroup::new();
        let a = Overload { target: MethodId(1), ..overload(1, false) };
        let b = Overload { target: MethodId(2), ..overload(2, false) };
        group.push(a);
        group.push(b);
        assert_eq!(group.insertion_index(MethodId(1)), Some(0));
        assert_eq!(group.insertion_index(MethodId(2)), Some(1));
    }
}
