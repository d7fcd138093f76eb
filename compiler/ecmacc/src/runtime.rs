//! The production [`HostRuntime`] this driver compiles against, and the
//! native method bodies that back every `OperatorKind`/enumeration token
//! it hands out (`spec.md` §6 "Runtime contract").
//!
//! Every id this module hands out lives above [`NATIVE_METHOD_ID_BASE`],
//! clear of the low range [`ecmac_dispatch::GeneratorRegistry`] hands out
//! for generator identities and of the
//! [`ecmac_codegen`]-internal specialization range — the three ranges are
//! independent counters and must never overlap, since
//! `ecmac_dispatch::call_site::resolve_callable` tells a generator id from
//! a directly-callable native one only by whether it happens to be
//! registered in [`ecmac_dispatch::GeneratorRegistry`].

use ecmac_ir::StringInterner;
use ecmac_il::{Program, Value};
use ecmac_proto::{HostRuntime, OperatorKind, PrototypeRegistry};
use ecmac_types::MethodId;
use std::sync::Arc;

const NATIVE_METHOD_ID_BASE: u64 = 1 << 40;

const STRICT_EQUALS: MethodId = MethodId(NATIVE_METHOD_ID_BASE + 1);
const ENUMERATE_PROPERTY_NAMES: MethodId = MethodId(NATIVE_METHOD_ID_BASE + 2);
const ENUMERATE_PROPERTY_VALUES: MethodId = MethodId(NATIVE_METHOD_ID_BASE + 3);

fn operator_method_id(kind: OperatorKind) -> MethodId {
    let offset = match kind {
        OperatorKind::Add => 10,
        OperatorKind::Sub => 11,
        OperatorKind::Mul => 12,
        OperatorKind::Div => 13,
        OperatorKind::Mod => 14,
        OperatorKind::Shl => 15,
        OperatorKind::Shr => 16,
        OperatorKind::UShr => 17,
        OperatorKind::BitAnd => 18,
        OperatorKind::BitOr => 19,
        OperatorKind::BitXor => 20,
        OperatorKind::Lt => 21,
        OperatorKind::Gt => 22,
        OperatorKind::LtEq => 23,
        OperatorKind::GtEq => 24,
        OperatorKind::LooseEquals => 25,
        OperatorKind::In => 26,
        OperatorKind::InstanceOf => 27,
        OperatorKind::TypeOf => 28,
        OperatorKind::UnaryNegate => 29,
        OperatorKind::UnaryBitNot => 30,
        OperatorKind::ToDisplayString => 31,
    };
    MethodId(NATIVE_METHOD_ID_BASE + offset)
}

/// Owns the prototype registry; every other runtime concern (the method
/// cache, the scope chain) lives in [`ecmac_codegen::Driver`] instead,
/// matching `spec.md` §5 "the prototype registry is per-engine and
/// single-threaded."
#[derive(Default)]
pub struct Runtime {
    prototypes: PrototypeRegistry,
}

impl HostRuntime for Runtime {
    fn prototypes(&self) -> &PrototypeRegistry {
        &self.prototypes
    }

    fn prototypes_mut(&mut self) -> &mut PrototypeRegistry {
        &mut self.prototypes
    }

    fn strict_equals_method() -> MethodId {
        STRICT_EQUALS
    }

    fn enumerate_property_names_method() -> MethodId {
        ENUMERATE_PROPERTY_NAMES
    }

    fn enumerate_property_values_method() -> MethodId {
        ENUMERATE_PROPERTY_VALUES
    }

    fn operator_method(kind: OperatorKind) -> MethodId {
        operator_method_id(kind)
    }
}

/// Register a bytecode-free implementation for every id [`Runtime`] hands
/// out, in `program` — called once per compile, after the driver has
/// finished recording every specialization's own instructions.
///
/// `interner` resolves an object's [`ecmac_ir::Name`] property keys back to
/// text for `for-in`/`in` — a [`Value::Object`] carries only the interned
/// id, never the string it came from.
pub fn install_native_methods(program: &mut Program, interner: Arc<StringInterner>) {
    program.define_native(STRICT_EQUALS, 2, |args| Ok(Value::Boolean(strict_equals(&args[0], &args[1]))));
    let names_interner = interner.clone();
    program.define_native(ENUMERATE_PROPERTY_NAMES, 1, move |args| Ok(enumerate_property_names(&args[0], &names_interner)));
    program.define_native(ENUMERATE_PROPERTY_VALUES, 1, |args| Ok(enumerate_property_values(&args[0])));

    program.define_native(operator_method_id(OperatorKind::Add), 2, |args| Ok(add(&args[0], &args[1])));
    program.define_native(operator_method_id(OperatorKind::Sub), 2, |args| Ok(Value::F64(to_number(&args[0]) - to_number(&args[1]))));
    program.define_native(operator_method_id(OperatorKind::Mul), 2, |args| Ok(Value::F64(to_number(&args[0]) * to_number(&args[1]))));
    program.define_native(operator_method_id(OperatorKind::Div), 2, |args| Ok(Value::F64(to_number(&args[0]) / to_number(&args[1]))));
    program.define_native(operator_method_id(OperatorKind::Mod), 2, |args| Ok(Value::F64(to_number(&args[0]) % to_number(&args[1]))));
    program.define_native(operator_method_id(OperatorKind::Shl), 2, |args| Ok(Value::I32(to_i32(&args[0]) << (to_i32(&args[1]) & 31))));
    program.define_native(operator_method_id(OperatorKind::Shr), 2, |args| Ok(Value::I32(to_i32(&args[0]) >> (to_i32(&args[1]) & 31))));
    program.define_native(operator_method_id(OperatorKind::UShr), 2, |args| {
        Ok(Value::I32(((to_i32(&args[0]) as u32) >> (to_i32(&args[1]) & 31)) as i32))
    });
    program.define_native(operator_method_id(OperatorKind::BitAnd), 2, |args| Ok(Value::I32(to_i32(&args[0]) & to_i32(&args[1]))));
    program.define_native(operator_method_id(OperatorKind::BitOr), 2, |args| Ok(Value::I32(to_i32(&args[0]) | to_i32(&args[1]))));
    program.define_native(operator_method_id(OperatorKind::BitXor), 2, |args| Ok(Value::I32(to_i32(&args[0]) ^ to_i32(&args[1]))));

    program.define_native(operator_method_id(OperatorKind::Lt), 2, |args| Ok(Value::Boolean(compare(&args[0], &args[1]) == std::cmp::Ordering::Less)));
    program.define_native(operator_method_id(OperatorKind::Gt), 2, |args| Ok(Value::Boolean(compare(&args[0], &args[1]) == std::cmp::Ordering::Greater)));
    program.define_native(operator_method_id(OperatorKind::LtEq), 2, |args| Ok(Value::Boolean(compare(&args[0], &args[1]) != std::cmp::Ordering::Greater)));
    program.define_native(operator_method_id(OperatorKind::GtEq), 2, |args| Ok(Value::Boolean(compare(&args[0], &args[1]) != std::cmp::Ordering::Less)));

    program.define_native(operator_method_id(OperatorKind::LooseEquals), 2, |args| Ok(Value::Boolean(loose_equals(&args[0], &args[1]))));
    let in_interner = interner.clone();
    program.define_native(operator_method_id(OperatorKind::In), 2, move |args| Ok(Value::Boolean(has_property(&args[0], &args[1], &in_interner))));
    // No class identity exists in this value representation; every
    // `instanceof` is false until constructors carry a prototype handle
    // through to runtime `Value`s.
    program.define_native(operator_method_id(OperatorKind::InstanceOf), 2, |_args| Ok(Value::Boolean(false)));
    program.define_native(operator_method_id(OperatorKind::TypeOf), 1, |args| Ok(Value::string(type_of(&args[0]))));
    program.define_native(operator_method_id(OperatorKind::UnaryNegate), 1, |args| Ok(Value::F64(-to_number(&args[0]))));
    program.define_native(operator_method_id(OperatorKind::UnaryBitNot), 1, |args| Ok(Value::I32(!to_i32(&args[0]))));
    program.define_native(operator_method_id(OperatorKind::ToDisplayString), 1, |args| Ok(Value::string(args[0].to_string())));
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::I32(n) => f64::from(*n),
        Value::I64(n) => *n as f64,
        Value::F64(n) => *n,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn to_i32(value: &Value) -> i32 {
    let n = to_number(value);
    if n.is_finite() {
        n as i32
    } else {
        0
    }
}

fn add(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        Value::string(format!("{left}{right}"))
    } else {
        Value::F64(to_number(left) + to_number(right))
    }
}

fn compare(left: &Value, right: &Value) -> std::cmp::Ordering {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return a.as_ref().cmp(b.as_ref());
    }
    to_number(left).partial_cmp(&to_number(right)).unwrap_or(std::cmp::Ordering::Greater)
}

fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::I32(a), Value::I32(b)) => a == b,
        (Value::I64(a), Value::I64(b)) => a == b,
        (Value::F64(a), Value::F64(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => std::rc::Rc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => std::rc::Rc::ptr_eq(a, b),
        _ => false,
    }
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(_), Value::String(_)) | (Value::Boolean(_), Value::Boolean(_)) => strict_equals(left, right),
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        _ => to_number(left) == to_number(right),
    }
}

fn has_property(key: &Value, receiver: &Value, interner: &StringInterner) -> bool {
    let Value::Object(fields) = receiver else {
        return false;
    };
    let key = key.to_string();
    fields.borrow().keys().any(|name| interner.resolve(*name) == key)
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Boolean(_) => "boolean",
        Value::I32(_) | Value::I64(_) | Value::F64(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

fn enumerate_property_names(receiver: &Value, interner: &StringInterner) -> Value {
    let Value::Object(fields) = receiver else {
        return Value::empty_array();
    };
    let names: Vec<Value> = fields.borrow().keys().map(|name| Value::string(interner.resolve(*name))).collect();
    Value::Array(std::rc::Rc::new(std::cell::RefCell::new(names)))
}

fn enumerate_property_values(receiver: &Value) -> Value {
    let Value::Object(fields) = receiver else {
        return Value::empty_array();
    };
    let values: Vec<Value> = fields.borrow().values().cloned().collect();
    Value::Array(std::rc::Rc::new(std::cell::RefCell::new(values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn operator_and_native_ids_never_overlap() {
        let mut ids = vec![STRICT_EQUALS, ENUMERATE_PROPERTY_NAMES, ENUMERATE_PROPERTY_VALUES];
        for kind in [
            OperatorKind::Add,
            OperatorKind::Sub,
            OperatorKind::Mul,
            OperatorKind::Div,
            OperatorKind::Mod,
            OperatorKind::Shl,
            OperatorKind::Shr,
            OperatorKind::UShr,
            OperatorKind::BitAnd,
            OperatorKind::BitOr,
            OperatorKind::BitXor,
            OperatorKind::Lt,
            OperatorKind::Gt,
            OperatorKind::LtEq,
            OperatorKind::GtEq,
            OperatorKind::LooseEquals,
            OperatorKind::In,
            OperatorKind::InstanceOf,
            OperatorKind::TypeOf,
            OperatorKind::UnaryNegate,
            OperatorKind::UnaryBitNot,
            OperatorKind::ToDisplayString,
        ] {
            ids.push(operator_method_id(kind));
        }
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn add_concatenates_when_either_side_is_a_string() {
        let result = add(&Value::string("a"), &Value::F64(1.0));
        assert_eq!(result, Value::string("a1"));
    }

    #[test]
    fn add_sums_two_numbers() {
        assert_eq!(add(&Value::F64(2.0), &Value::F64(3.0)), Value::F64(5.0));
    }
}
