//! `ecmacc` — compile one source unit and run it against the reference
//! interpreter (`SPEC_FULL.md` §4.14).

use clap::Parser;
use ecmacc::CompileOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ecmacc", version, about = "AOT ECMAScript-subset compiler")]
struct Args {
    /// Source file to compile; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Print the entry method's recorded instruction stream before running it.
    #[arg(long)]
    disassemble: bool,

    /// Compile as if the source opened with a `"use strict"` directive.
    #[arg(long)]
    strict: bool,

    /// Raise the default log level, as if collapse warnings were visible.
    #[arg(long)]
    collapse_warning: bool,

    /// Compile only; skip execution.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    ecmacc::init_logging();
    let args = Args::parse();

    let path = args.input.as_deref().map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    let source = match &args.input {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error reading '{}': {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => match std::io::read_to_string(std::io::stdin()) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error reading stdin: {err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let options = CompileOptions {
        enable_il_analysis: args.disassemble,
        collapse_warning: args.collapse_warning,
        force_strict_mode: args.strict,
    };

    let script = match ecmacc::compile_global(&path, &source, &options) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("{}", ecmac_diagnostic::render_report(&err, &source));
            return ExitCode::FAILURE;
        }
    };

    if args.disassemble {
        println!("{}", ecmacc::disassemble(&script.program, script.entry));
    }

    if args.check {
        return ExitCode::SUCCESS;
    }

    match ecmacc::execute(&script) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
