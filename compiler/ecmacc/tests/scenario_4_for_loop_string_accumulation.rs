//! `for (var i = 0; i < 3; i++) s += i;` with `s` starting as `""` — a
//! test-at-top loop whose body coerces the loop counter to a string on
//! every iteration through the same native `Add`/`ToDisplayString` path a
//! template literal uses.

use ecmacc::CompileOptions;
use ecmac_il::Value;
use pretty_assertions::assert_eq;

#[test]
fn accumulates_the_loop_counter_as_a_string() {
    let source = r#"
        var s = "";
        for (var i = 0; i < 3; i++) { s += i; }
        return s;
    "#;
    let script = ecmacc::compile_global("scenario4.js", source, &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert_eq!(result, Value::string("012"));
}
