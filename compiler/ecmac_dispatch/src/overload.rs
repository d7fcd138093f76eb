//! Overload selection over a [`MethodGroup`] (`spec.md` §4.8 "Overload
//! selection").
//!
//! Candidates are filtered by arity, scored by per-argument conversion
//! penalty, and the minimum-penalty survivor wins; unlike the conversion
//! scoring itself (grounded on a cost-ranking overload resolver elsewhere in
//! the pack), ties here break by insertion order rather than by reporting
//! ambiguity — `spec.md` is explicit that the first-added overload wins a
//! tie, so there is no `AmbiguousOverload` error kind at all.

use ecmac_proto::{MethodGroup, Overload};
use ecmac_types::{classify, Type};

/// One argument's contribution to an overload's total penalty.
#[derive(Copy, Clone, Debug)]
struct ArgumentScore {
    penalty: u32,
}

/// The winning overload plus its total penalty, returned by
/// [`select_overload`].
#[derive(Clone, Debug)]
pub struct OverloadMatch<'a> {
    pub overload: &'a Overload,
    pub total_penalty: u32,
}

/// Select the best-matching overload in `group` for `argument_types`,
/// accounting for a leading engine parameter, a `thisObj` formal, and a
/// trailing `params` array (`spec.md` §4.8). Returns `None` if no overload
/// accepts this arity and argument types, or if `group` is empty.
pub fn select_overload<'a>(group: &'a MethodGroup, argument_types: &[Type]) -> Option<OverloadMatch<'a>> {
    let mut best: Option<(usize, u32)> = None;

    for (index, overload) in group.overloads().iter().enumerate() {
        let Some(penalty) = score_candidate(overload, argument_types) else { continue };
        match best {
            None => best = Some((index, penalty)),
            Some((_, best_penalty)) if penalty < best_penalty => best = Some((index, penalty)),
            _ => {}
        }
    }

    best.map(|(index, total_penalty)| OverloadMatch { overload: &group.overloads()[index], total_penalty })
}

/// Visible (script-level) formal slice of `overload`'s parameters, with the
/// leading engine/`thisObj` formals stripped off — those are supplied by
/// the call site's dispatch machinery, never by an explicit script
/// argument.
fn visible_params(overload: &Overload) -> &[Type] {
    let skip = usize::from(overload.leading_engine_param) + usize::from(overload.leading_this_obj);
    &overload.params[skip.min(overload.params.len())..]
}

fn score_candidate(overload: &Overload, argument_types: &[Type]) -> Option<u32> {
    let params = visible_params(overload);
    let (min, max) = visible_arity(overload, params);
    if argument_types.len() < min {
        return None;
    }
    if let Some(max) = max {
        if argument_types.len() > max {
            return None;
        }
    }

    let fixed_len = params.len() - usize::from(overload.params_array);
    let mut total = 0u32;

    for (index, &actual) in argument_types.iter().enumerate() {
        let formal = if index < fixed_len {
            params[index]
        } else if overload.params_array {
            // Every argument beyond the fixed formals converts against the
            // params array's element type, which `spec.md` does not name
            // separately — the array formal's own declared type stands in
            // for its element type here, matching the teacher's univeral
            // converter fallback for untyped collections.
            *params.last()?
        } else {
            return None;
        };
        let ArgumentScore { penalty } = score_argument(actual, formal)?;
        total = total.saturating_add(penalty);
    }

    Some(total)
}

fn visible_arity(overload: &Overload, params: &[Type]) -> (usize, Option<usize>) {
    let fixed = params.len() - usize::from(overload.params_array);
    let min = fixed.saturating_sub(overload.trailing_optional as usize);
    let max = if overload.params_array { None } else { Some(fixed) };
    (min, max)
}

fn score_argument(actual: Type, formal: Type) -> Option<ArgumentScore> {
    classify(actual, formal).map(|conversion| ArgumentScore { penalty: conversion.penalty })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_types::MethodId;

    fn overload(target: u64, params: Vec<Type>, params_array: bool) -> Overload {
        Overload {
            target: MethodId(target),
            params,
            return_type: Type::Universal,
            leading_engine_param: false,
            leading_this_obj: false,
            params_array,
            trailing_optional: 0,
        }
    }

    #[test]
    fn identity_match_beats_widening() {
        let mut group = MethodGroup::new();
        group.push(overload(1, vec![Type::F64], false));
        group.push(overload(2, vec![Type::I32], false));

        let best = select_overload(&group, &[Type::I32]).unwrap();
        assert_eq!(best.overload.target, MethodId(2));
        assert_eq!(best.total_penalty, 0);
    }

    #[test]
    fn tie_breaks_by_insertion_order() {
        let mut group = MethodGroup::new();
        group.push(overload(1, vec![Type::F64], false));
        group.push(overload(2, vec![Type::String], false));

        // Both require the same-rank conversion from Universal, so the
        // first-added overload wins rather than reporting an ambiguity.
        let best = select_overload(&group, &[Type::Universal]).unwrap();
        assert_eq!(best.overload.target, MethodId(1));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut group = MethodGroup::new();
        group.push(overload(1, vec![Type::I32, Type::I32], false));

        assert!(select_overload(&group, &[Type::I32]).is_none());
    }

    #[test]
    fn params_array_absorbs_extra_arguments() {
        let mut group = MethodGroup::new();
        group.push(overload(1, vec![Type::Universal], true));

        let best = select_overload(&group, &[Type::I32, Type::String, Type::Boolean]).unwrap();
        assert_eq!(best.overload.target, MethodId(1));
    }

    #[test]
    fn no_overload_accepts_an_incompatible_instance() {
        use ecmac_types::PrototypeId;
        let mut group = MethodGroup::new();
        group.push(overload(1, vec![Type::Instance(PrototypeId(1))], false));

        assert!(select_overload(&group, &[Type::Instance(PrototypeId(2))]).is_none());
    }
}
