//! `if (true) a = 1; else a = 2;` — the condition is a constant `true`, so
//! the resolver marks the `else` branch dead and the code generator never
//! emits it (`spec.md` §4.9, `ecmac_resolve`'s constant-condition pass).

use ecmacc::CompileOptions;
use ecmac_il::Value;
use pretty_assertions::assert_eq;

#[test]
fn only_the_live_branch_is_reachable() {
    let source = "if (true) { a = 1; } else { a = 2; } return a;";
    let script = ecmacc::compile_global("scenario6.js", source, &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert_eq!(result, Value::F64(1.0));
}

#[test]
fn a_constant_false_condition_takes_only_the_else_branch() {
    let source = "if (false) { a = 1; } else { a = 2; } return a;";
    let script = ecmacc::compile_global("scenario6b.js", source, &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert_eq!(result, Value::F64(2.0));
}
