//! Error types for loading scene files

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::layout::LayoutError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scene TOML: {message}")]
    Toml { message: String, span: Option<Span> },

    #[error("Unknown canvas '{name}'{}", format_suggestions(suggestions))]
    UnknownCanvas {
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },

    #[error("Canvas '{name}' is defined more than once")]
    DuplicateCanvas { name: String, span: Span, first: Span },

    #[error("'master' is reserved for the image's master canvas")]
    ReservedName { span: Span },

    #[error("Canvas parents form a cycle: {}", cycle.join(" -> "))]
    CyclicParent { cycle: Vec<String>, span: Span },

    #[error("A '{kind}' entry requires the field '{field}'")]
    MissingField {
        kind: &'static str,
        field: &'static str,
        span: Span,
    },

    #[error("{source}")]
    Layout { source: LayoutError, span: Span },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

impl From<toml::de::Error> for SceneError {
    fn from(err: toml::de::Error) -> Self {
        SceneError::Toml {
            message: err.message().to_string(),
            span: err.span(),
        }
    }
}

impl SceneError {
    /// Source location of the problem, when one is known
    pub fn span(&self) -> Option<Span> {
        match self {
            SceneError::Io(_) => None,
            SceneError::Toml { span, .. } => span.clone(),
            SceneError::UnknownCanvas { span, .. }
            | SceneError::DuplicateCanvas { span, .. }
            | SceneError::ReservedName { span }
            | SceneError::CyclicParent { span, .. }
            | SceneError::MissingField { span, .. }
            | SceneError::Layout { span, .. } => Some(span.clone()),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("Error: {}\n", self);
        };

        let message = self.to_string();
        let mut report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(self.label_message())
                    .with_color(Color::Red),
            );

        if let SceneError::DuplicateCanvas { first, .. } = self {
            report = report.with_label(
                Label::new((filename, first.clone()))
                    .with_message("first defined here")
                    .with_color(Color::Blue),
            );
        }
        if let SceneError::UnknownCanvas { suggestions, .. } = self {
            if !suggestions.is_empty() {
                report = report.with_help(format!("did you mean {}?", suggestions.join(", ")));
            }
        }

        let mut buf = Vec::new();
        if report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return format!("Error: {}\n", message);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn label_message(&self) -> String {
        match self {
            SceneError::UnknownCanvas { .. } => "not defined in this scene".to_string(),
            SceneError::DuplicateCanvas { .. } => "defined again here".to_string(),
            SceneError::CyclicParent { .. } => "this parent closes the cycle".to_string(),
            SceneError::MissingField { field, .. } => format!("missing '{}'", field),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_canvas_message() {
        let err = SceneError::UnknownCanvas {
            name: "plto".to_string(),
            span: 3..7,
            suggestions: vec!["plot".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown canvas 'plto' (did you mean plot?)");
        assert_eq!(err.span(), Some(3..7));
    }

    #[test]
    fn test_format_includes_source_line() {
        let source = "parent = \"plto\"\n";
        let err = SceneError::UnknownCanvas {
            name: "plto".to_string(),
            span: 9..15,
            suggestions: vec![],
        };
        let formatted = err.format(source, "scene.toml");
        assert!(formatted.contains("scene.toml"));
        assert!(formatted.contains("Unknown canvas 'plto'"));
    }

    #[test]
    fn test_io_error_has_no_span() {
        let err = SceneError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.span(), None);
        assert!(err.format("", "scene.toml").starts_with("Error: Failed to read scene file"));
    }
}
