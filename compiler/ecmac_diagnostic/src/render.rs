//! Source-snippet rendering via `ariadne`.

use crate::CompileError;
use ariadne::{Label, Report, ReportKind, Source};

/// Render a [`CompileError`] as an `ariadne` report against `source`.
pub fn render_report(error: &CompileError, source: &str) -> String {
    let id = error.path.as_ref();
    let start = error.span.start as usize;
    let end = (error.span.end as usize).max(start + 1).min(source.len().max(1));
    let start = start.min(end.saturating_sub(1));

    let mut buf = Vec::new();
    let report = Report::build(ReportKind::Error, id, start)
        .with_message(format!("{}: {}", error.kind.exception_name(), error.message))
        .with_label(
            Label::new((id, start..end)).with_message(error.kind.exception_name().to_string()),
        )
        .finish();
    // `ariadne` writes UTF-8; a failure here means the buffer itself is
    // broken, which is unrecoverable for a diagnostic renderer.
    let _ = report.write((id, Source::from(source)), &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmac_ir::Span;
    use std::sync::Arc;

    #[test]
    fn render_produces_nonempty_output() {
        let err = CompileError::syntax("unexpected token", Arc::from("t.js"), 1, Span::new(4, 5));
        let out = render_report(&err, "var 1x = 1;");
        assert!(out.contains("SyntaxError"));
    }
}
