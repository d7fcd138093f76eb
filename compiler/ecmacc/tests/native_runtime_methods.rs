//! Coverage for the native methods `ecmacc::runtime` installs that none of
//! the six `spec.md` §8 scenarios happen to exercise: `===`/`switch`
//! (`HostRuntime::strict_equals_method`) and `for-in`
//! (`enumerate_property_names_method`).

use ecmacc::CompileOptions;
use ecmac_il::Value;
use pretty_assertions::assert_eq;

#[test]
fn strict_equals_backs_a_switch_statement() {
    let source = r#"
        var label = "";
        switch (2) {
            case 1: label = "one"; break;
            case 2: label = "two"; break;
            default: label = "other";
        }
        return label;
    "#;
    let script = ecmacc::compile_global("native1.js", source, &CompileOptions::default()).unwrap();
    assert_eq!(ecmacc::execute(&script).unwrap(), Value::string("two"));
}

#[test]
fn for_in_enumerates_an_object_literals_property_names() {
    // `FxHashMap` iteration order is unspecified, so accept either
    // ordering rather than pinning one — the property under test is that
    // both names show up exactly once each, not their order.
    let source = r#"
        var p = { x: 1, y: 2 };
        var names = "";
        for (var key in p) { names += key; }
        return names;
    "#;
    let script = ecmacc::compile_global("native2.js", source, &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert!(result == Value::string("xy") || result == Value::string("yx"), "unexpected enumeration order: {result}");
}
