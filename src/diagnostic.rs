use std::fmt;

use crate::span::Span;

/// A compiler diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Error class shown in the report header, e.g. `NameError`.
    pub code: Option<String>,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: impl fmt::Display) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic against the source text on stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let (kind, color) = match self.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(code) = &self.code {
            report = report.with_code(code);
        }

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        if let Err(e) = report.finish().eprint((filename, Source::from(source))) {
            eprintln!("{}", self);
            eprintln!("(could not render source snippet: {})", e);
        }
    }
}

/// Plain single-line form, used when no source text is available.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
        };
        match &self.code {
            Some(code) => write!(f, "{}[{}]: {}", level, code, self.message)?,
            None => write!(f, "{}: {}", level, self.message)?,
        }
        if !self.span.is_dummy() {
            write!(f, " (at {}..{})", self.span.start, self.span.end)?;
        }
        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n  help: {}", help)?;
        }
        Ok(())
    }
}

/// Render a list of diagnostics, with source snippets when the source is known.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: Option<&str>) {
    for diag in diagnostics {
        match source {
            Some(source) => diag.render(filename, source),
            None => eprintln!("{}", diag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let span = Span::new(10, 15);
        let d = Diagnostic::error("'x' is undefined".to_string(), span);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "'x' is undefined");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.code.is_none());
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::error("hint".to_string(), Span::new(0, 5))
            .with_code("SyntaxError")
            .with_note("note 1".to_string())
            .with_help("help text".to_string())
            .with_note("note 2".to_string());
        assert_eq!(d.code.as_deref(), Some("SyntaxError"));
        assert_eq!(d.notes.len(), 2);
        assert!(d.help.is_some());
    }

    #[test]
    fn test_plain_display() {
        let d = Diagnostic::error("undefined function 'heal'".to_string(), Span::new(4, 8))
            .with_code("SyntaxError")
            .with_help("declare it with %heal".to_string());
        assert_eq!(
            d.to_string(),
            "error[SyntaxError]: undefined function 'heal' (at 4..8)\n  help: declare it with %heal"
        );
    }

    #[test]
    fn test_plain_display_without_span() {
        let d = Diagnostic::error("bad".to_string(), Span::dummy());
        assert_eq!(d.to_string(), "error: bad");
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "Actions\n    x = y\n";
        let d = Diagnostic::error("'y' is undefined".to_string(), Span::new(16, 17))
            .with_code("NameError");
        d.render("test.owpy", source);
    }

    #[test]
    fn test_render_diagnostics_without_source() {
        let diagnostics = vec![
            Diagnostic::error("first".to_string(), Span::new(0, 1)),
            Diagnostic::error("second".to_string(), Span::dummy()),
        ];
        render_diagnostics(&diagnostics, "test.json", None);
    }
}
