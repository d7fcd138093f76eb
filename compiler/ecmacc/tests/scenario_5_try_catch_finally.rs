//! `try { throw 'e'; } catch(e) { result = e; } finally { done = true; }`
//!
//! `result`/`done` are implicit globals, created on first assignment
//! (`spec.md` §4.6's name resolution rule) rather than declared with `var`.

use ecmacc::CompileOptions;
use ecmac_il::Value;
use pretty_assertions::assert_eq;

#[test]
fn catch_binds_the_thrown_value_and_finally_always_runs() {
    let source = r#"
        try {
            throw "e";
        } catch (e) {
            result = e;
        } finally {
            done = true;
        }
        return result + done;
    "#;
    let script = ecmacc::compile_global("scenario5.js", source, &CompileOptions::default()).unwrap();
    let result = ecmacc::execute(&script).unwrap();
    assert_eq!(result, Value::string("etrue"));
}
