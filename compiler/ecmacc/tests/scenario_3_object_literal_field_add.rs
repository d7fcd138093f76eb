//! `var p = { x: 1, y: 2 }; p.x + p.y` — direct field loads into a native
//! `Add` call, no dynamic property lookup involved.

use ecmacc::CompileOptions;
use ecmac_il::Value;
use pretty_assertions::assert_eq;

#[test]
fn field_addition_returns_three() {
    let source = "var p = { x: 1, y: 2 }; return p.x + p.y;";
    let script = ecmacc::compile_global("scenario3.js", source, &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert_eq!(result, Value::F64(3.0));
}
