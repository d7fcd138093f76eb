//! `var x = 2 + 3;` compiled as a top-level global, read back.
//!
//! Every numeric literal resolves to `Type::F64` (`ecmac_resolve`'s literal
//! table has no separate integer type for a literal like `2`), so `x`'s
//! type collapses to f64 rather than i32 — the addition still runs through
//! the same native `Add` method either way.

use ecmacc::CompileOptions;
use ecmac_il::Value;
use pretty_assertions::assert_eq;

#[test]
fn reading_x_back_returns_five() {
    let script = ecmacc::compile_global("scenario1.js", "var x = 2 + 3; return x;", &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert_eq!(result, Value::F64(5.0));
}
