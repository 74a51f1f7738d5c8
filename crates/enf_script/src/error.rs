//! Diagnostics reported while reconstructing a script.

use miette::{Diagnostic, LabeledSpan};
pub use miette::Severity;
use thiserror::Error;

/// A single problem found in a script source.
///
/// Reconstruction never fails outright, so everything from a stray byte to a
/// skipped declaration is reported through one of these. `offset` is the byte
/// position in the source passed to [`parse`](crate::parse), which lets a
/// caller render the diagnostic against the original text with miette.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseDiagnostic {
    pub offset: usize,
    pub severity: Severity,
    pub message: String,
}

impl ParseDiagnostic {
    pub(crate) fn warning(offset: usize, message: impl Into<String>) -> Self {
        ParseDiagnostic {
            offset,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub(crate) fn error(offset: usize, message: impl Into<String>) -> Self {
        ParseDiagnostic {
            offset,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Whether this diagnostic is a hard error rather than a warning.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Diagnostic for ParseDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::at_offset(
            self.offset,
            self.message.clone(),
        ))))
    }
}

