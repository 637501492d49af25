use crate::source::Sources;
use crate::span::Span;

/// A generator diagnostic. Every error the generator detects is fatal.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Plain one-line form: `file:line:col: error: message`.
    pub fn location(&self, sources: &Sources) -> String {
        match sources.locate(self.span) {
            Some((file, line, col)) => {
                format!("{}:{}:{}: error: {}", file, line, col, self.message)
            }
            None => format!("error: {}", self.message),
        }
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, sources: &Sources) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let Some(file) = sources.get(self.span.file_id) else {
            eprintln!("{}", self.location(sources));
            return;
        };
        let filename = file.name.as_str();

        let mut report = Report::build(ReportKind::Error, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        if report
            .finish()
            .eprint((filename, Source::from(file.text.as_str())))
            .is_err()
        {
            eprintln!("{}", self.location(sources));
        }
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], sources: &Sources) {
    for diag in diagnostics {
        diag.render(sources);
    }
}
