//! Thin end-to-end driver (`SPEC_FULL.md` §4.14): wires lexing through
//! code generation for one source unit, and gives the operator/enumeration
//! tokens `ecmac_proto::HostRuntime` exposes an actual implementation so
//! the recorded instruction stream is runnable, not just inspectable.
//!
//! `ecmac_il`'s instruction vocabulary has no arithmetic opcode of its own
//! — every operator lowers to `Call(methodId)` against a host intrinsic
//! (`ecmac_proto::OperatorKind`). [`Runtime`] answers those calls with
//! [`ecmac_il::Program::define_native`] closures rather than bytecode, the
//! same way a real host VM backs an intrinsic with native code instead of
//! IL.

mod options;
mod runtime;

pub use options::CompileOptions;
pub use runtime::Runtime;

use ecmac_diagnostic::CompileError;
use ecmac_il::{Program, Value};
use ecmac_ir::StringInterner;
use ecmac_parse::Parser;
use ecmac_types::MethodId;
use std::sync::Arc;

/// A finished compile: the instruction streams for the module body and
/// every specialization it reached, plus the method to hand to
/// [`ecmac_il::interpret`].
#[derive(Debug)]
pub struct CompiledScript {
    pub program: Program,
    pub entry: MethodId,
}

/// Run the full pipeline — `lex` (internal to [`Parser`]) → `parse` →
/// `resolve_module` → the code-generation driver — against one source
/// unit, then install the native operator/enumeration methods the
/// recorded stream calls into.
pub fn compile_global(path: &str, source: &str, options: &CompileOptions) -> Result<CompiledScript, CompileError> {
    let interner = Arc::new(StringInterner::new());
    let parsed = Parser::new_with_strict_mode(path, source, interner.clone(), options.force_strict_mode)?.parse_program()?;
    let strict = parsed.strict || options.force_strict_mode;

    let driver = ecmac_codegen::Driver::new(
        Arc::new(parsed.arena),
        interner.clone(),
        Runtime::default(),
        Arc::from(path),
        source.to_string(),
        options.collapse_warning,
    );
    let (mut program, entry) = driver.compile_module(parsed.body, strict)?;
    runtime::install_native_methods(&mut program, interner);

    if options.enable_il_analysis {
        tracing::debug!(entry = ?entry, "{}", disassemble(&program, entry));
    }
    Ok(CompiledScript { program, entry })
}

/// Execute a [`CompiledScript`]'s entry method with no arguments — the
/// `ecmacc` CLI's only calling convention; embedders that need to pass
/// arguments call [`ecmac_il::interpret`] directly.
pub fn execute(script: &CompiledScript) -> Result<Value, ecmac_il::InterpretError> {
    ecmac_il::interpret(&script.program, script.entry, &[])
}

/// A one-method-per-line dump of `id`'s recorded instructions, for
/// `CompileOptions::enable_il_analysis` and the CLI's `--disassemble` flag.
pub fn disassemble(program: &Program, id: MethodId) -> String {
    match program.get(id) {
        Some(method) => method
            .instructions()
            .iter()
            .enumerate()
            .map(|(index, instruction)| format!("{index:>4}  {instruction:?}"))
            .collect::<Vec<_>>()
            .join("\n"),
        None => format!("<no method recorded for {id:?}>"),
    }
}

/// Initialize `tracing-subscriber` exactly once per process, from the
/// `ECMAC_LOG` environment variable (`SPEC_FULL.md` §4.14).
pub fn init_logging() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("ECMAC_LOG").unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compiles_and_runs_a_trivial_addition() {
        let script = compile_global("t.js", "return 2 + 3;", &CompileOptions::default()).unwrap();
        let result = execute(&script).unwrap();
        assert_eq!(result, Value::F64(5.0));
    }

    #[test]
    fn force_strict_mode_rejects_a_legacy_octal_literal() {
        let err = compile_global("t.js", "010;", &CompileOptions { force_strict_mode: true, ..Default::default() }).unwrap_err();
        assert_eq!(err.kind, ecmac_diagnostic::ErrorKind::Syntax);
    }
}
