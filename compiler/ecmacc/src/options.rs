//! Process-wide options (`spec.md` §6 "Process-wide options",
//! `SPEC_FULL.md` §4.14), exposed as both a library struct and CLI flags.

/// `EnableILAnalysis`/`CollapseWarning`/`ForceStrictMode` from `spec.md`
/// §6, under the names this workspace's CLI flags spell them with.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileOptions {
    /// Wrap the emitted method in a disassembly dump, logged at `debug`.
    pub enable_il_analysis: bool,
    /// Raise the default log level so a variable/return-type collapse is
    /// visible without an explicit `ECMAC_LOG` override.
    pub collapse_warning: bool,
    /// Compile as if every source unit opened with a `"use strict"`
    /// directive, independent of what the source itself declares.
    pub force_strict_mode: bool,
}
