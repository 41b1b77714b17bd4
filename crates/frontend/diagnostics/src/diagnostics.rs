use ariadne::ReportKind;
use chumsky::span::SimpleSpan;
use std::fmt;

/// A diagnostic produced while preprocessing, parsing or binding a translation unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Path of the translation unit the diagnostic belongs to
    pub file_path: String,
    /// Logical source span where this diagnostic applies
    pub span: SimpleSpan<usize>,
    /// Optional related spans for additional context
    pub related_spans: Vec<(SimpleSpan<usize>, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<ReportKind<'static>> for DiagnosticSeverity {
    fn from(kind: ReportKind<'static>) -> Self {
        match kind {
            ReportKind::Error => Self::Error,
            ReportKind::Warning => Self::Warning,
            ReportKind::Advice => Self::Info,
            ReportKind::Custom(_, _) => Self::Info,
        }
    }
}

impl From<DiagnosticSeverity> for ReportKind<'static> {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => ReportKind::Error,
            DiagnosticSeverity::Warning => ReportKind::Warning,
            DiagnosticSeverity::Info => ReportKind::Advice,
            DiagnosticSeverity::Hint => ReportKind::Advice,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCode {
    // Preprocessing and parsing (1-999)
    LexicalError,
    SyntaxError,
    InvalidDirective,

    // Problem bindings (1000-1999)
    AmbiguousReference,
    CircularReference,
    FieldResolutionFailure,
    FunctionResolutionFailure,
    InvalidArguments,
    InvalidTemplateArguments,
    LabelNotFound,
    MemberNotFound,
    MethodResolutionFailure,
    OverloadAmbiguous,
    Redeclaration,
    Redefinition,
    TypeResolutionFailure,
    VariableResolutionFailure,
}

impl DiagnosticCode {
    /// Stable textual identifier, used for markers and test expectations
    pub const fn id(self) -> &'static str {
        match self {
            Self::LexicalError => "lexical-error",
            Self::SyntaxError => "syntax-error",
            Self::InvalidDirective => "invalid-directive",
            Self::AmbiguousReference => "ambiguous-reference",
            Self::CircularReference => "circular-reference",
            Self::FieldResolutionFailure => "field-resolution-failure",
            Self::FunctionResolutionFailure => "function-resolution-failure",
            Self::InvalidArguments => "invalid-arguments",
            Self::InvalidTemplateArguments => "invalid-template-arguments",
            Self::LabelNotFound => "label-not-found",
            Self::MemberNotFound => "member-not-found",
            Self::MethodResolutionFailure => "method-resolution-failure",
            Self::OverloadAmbiguous => "overload-ambiguous",
            Self::Redeclaration => "redeclaration",
            Self::Redefinition => "redefinition",
            Self::TypeResolutionFailure => "type-resolution-failure",
            Self::VariableResolutionFailure => "variable-resolution-failure",
        }
    }

    /// Whether this code describes a problem binding rather than a syntax problem
    pub const fn is_binding_problem(self) -> bool {
        u32_code(self) >= 1000
    }
}

const fn u32_code(code: DiagnosticCode) -> u32 {
    match code {
        DiagnosticCode::LexicalError => 1,
        DiagnosticCode::SyntaxError => 2,
        DiagnosticCode::InvalidDirective => 3,
        DiagnosticCode::AmbiguousReference => 1001,
        DiagnosticCode::CircularReference => 1002,
        DiagnosticCode::FieldResolutionFailure => 1003,
        DiagnosticCode::FunctionResolutionFailure => 1004,
        DiagnosticCode::InvalidArguments => 1005,
        DiagnosticCode::InvalidTemplateArguments => 1006,
        DiagnosticCode::LabelNotFound => 1007,
        DiagnosticCode::MemberNotFound => 1008,
        DiagnosticCode::MethodResolutionFailure => 1009,
        DiagnosticCode::OverloadAmbiguous => 1010,
        DiagnosticCode::Redeclaration => 1011,
        DiagnosticCode::Redefinition => 1012,
        DiagnosticCode::TypeResolutionFailure => 1013,
        DiagnosticCode::VariableResolutionFailure => 1014,
    }
}

impl From<DiagnosticCode> for u32 {
    fn from(code: DiagnosticCode) -> Self {
        u32_code(code)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message,
            file_path: String::new(),
            span: SimpleSpan::from(0..0),
            related_spans: Vec::new(),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            ..Self::error(code, message)
        }
    }

    /// Add location information to this diagnostic
    pub const fn with_location(mut self, span: SimpleSpan<usize>) -> Self {
        self.span = span;
        self
    }

    /// Attach the translation unit path
    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    /// Add a related span with context message
    pub fn with_related_span(mut self, span: SimpleSpan<usize>, message: String) -> Self {
        self.related_spans.push((span, message));
        self
    }

    /// Convenience method for lexical errors
    pub fn lexical_error(message: String, span: SimpleSpan<usize>) -> Self {
        Self::error(DiagnosticCode::LexicalError, message).with_location(span)
    }

    /// Convenience method for syntax errors
    pub fn syntax_error(message: String, span: SimpleSpan<usize>) -> Self {
        Self::error(DiagnosticCode::SyntaxError, message).with_location(span)
    }

    /// Convenience method for malformed or unbalanced preprocessor directives
    pub fn invalid_directive(message: String, span: SimpleSpan<usize>) -> Self {
        Self::warning(DiagnosticCode::InvalidDirective, message).with_location(span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        write!(f, " (at {}:{})", self.span.start, self.span.end)?;
        for (span, message) in &self.related_spans {
            write!(f, "\n  note: {} (at {}:{})", message, span.start, span.end)?;
        }
        Ok(())
    }
}

/// Collection of diagnostics for one or more translation units
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic to the collection
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add multiple diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get only error diagnostics
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Get only warning diagnostics
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .collect()
    }

    /// Diagnostics carrying the given code
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub const fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sort by file, then position, then code
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then(a.span.start.cmp(&b.span.start))
                .then(a.code.cmp(&b.code))
        });
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let errors = self.errors().len();
        let warnings = self.warnings().len();

        if self.diagnostics.is_empty() {
            "No issues found".to_string()
        } else {
            format!("{errors} errors, {warnings} warnings")
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let span = SimpleSpan::from(10..20);
        let diag = Diagnostic::syntax_error("Syntax error".to_string(), span).with_file("a.c");
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.code, DiagnosticCode::SyntaxError);
        assert_eq!(diag.file_path, "a.c");
        assert_eq!(diag.span, span);
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        collection.add(
            Diagnostic::error(
                DiagnosticCode::VariableResolutionFailure,
                "Symbol 'x' could not be resolved".to_string(),
            )
            .with_location(SimpleSpan::from(12..13)),
        );
        collection.add(Diagnostic::invalid_directive(
            "Unterminated conditional".to_string(),
            SimpleSpan::from(0..3),
        ));

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.errors().len(), 1);
        assert_eq!(collection.warnings().len(), 1);
        assert!(collection.has_errors());
        assert_eq!(collection.summary(), "1 errors, 1 warnings");

        collection.sort();
        assert_eq!(collection.all()[0].code, DiagnosticCode::InvalidDirective);
    }

    #[test]
    fn test_problem_codes() {
        assert!(DiagnosticCode::Redefinition.is_binding_problem());
        assert!(!DiagnosticCode::SyntaxError.is_binding_problem());
        assert_eq!(u32::from(DiagnosticCode::VariableResolutionFailure), 1014);
        assert_eq!(
            DiagnosticCode::FieldResolutionFailure.to_string(),
            "field-resolution-failure"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(
            DiagnosticCode::LabelNotFound,
            "Label 'out' could not be resolved".to_string(),
        )
        .with_location(SimpleSpan::from(5..8));
        insta::assert_snapshot!(
            diag.to_string(),
            @"error[label-not-found]: Label 'out' could not be resolved (at 5:8)"
        );
    }
}
