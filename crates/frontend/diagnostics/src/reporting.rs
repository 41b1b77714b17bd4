//! # Error Reporting
//!
//! Renders diagnostics with ariadne, labelled with the translation unit path.

use crate::Diagnostic;
use ariadne::{Label, Report, Source};

/// Build a formatted report for a diagnostic against the source it points into
pub fn build_diagnostic_message(source: &str, diagnostic: &Diagnostic, with_color: bool) -> String {
    let mut write_buffer = Vec::new();
    let code_u32: u32 = diagnostic.code.into();
    let file = diagnostic.file_path.as_str();
    let mut report = Report::build(diagnostic.severity.into(), (file, diagnostic.span.into_range()))
        .with_config(
            ariadne::Config::new()
                .with_index_type(ariadne::IndexType::Byte)
                .with_color(with_color),
        )
        .with_code(code_u32)
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((file, diagnostic.span.into_range()))
                .with_message(diagnostic.code.id()),
        );
    for (span, message) in &diagnostic.related_spans {
        report = report.with_label(Label::new((file, span.into_range())).with_message(message));
    }
    match report
        .finish()
        .write((file, Source::from(source)), &mut write_buffer)
    {
        Ok(()) => String::from_utf8_lossy(&write_buffer).to_string(),
        Err(_) => diagnostic.to_string(),
    }
}
