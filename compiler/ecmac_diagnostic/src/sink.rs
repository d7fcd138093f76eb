//! Shared diagnostic collector for a single compilation.

use crate::CompileError;

/// Collects every [`CompileError`] raised during one compilation so callers
/// that want "collect everything, then report" semantics (e.g. the parser's
/// error recovery) aren't forced to abort on the first failure.
#[derive(Default)]
pub struct DiagnosticSink {
    errors: Vec<CompileError>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_ir::Span;
    use std::sync::Arc;

    #[test]
    fn empty_sink_has_no_errors() {
        assert!(!DiagnosticSink::new().has_errors());
    }

    #[test]
    fn pushed_error_is_visible() {
        let mut sink = DiagnosticSink::new();
        sink.push(CompileError::syntax("oops", Arc::from("t.js"), 1, Span::DUMMY));
        assert!(sink.has_errors());
        assert_eq!(sink.errors().len(), 1);
    }
}
