//! Shared semantic types: diagnostic severity, diagnostics, grammar kind
//!
//! Diagnostics are plain values - analysis never throws for a finding.
//! A context "has errors" iff any diagnostic carries Error severity.

use crate::base::Span;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// A hard error (syntax error, unresolved reference, duplicate)
    #[default]
    Error,
    /// A finding that doesn't invalidate the grammar
    Warning,
    /// An informational hint (e.g. unreferenced rule)
    Hint,
}

impl Severity {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }
}

/// Related location information for a diagnostic
///
/// Used to point to related source locations, e.g. "previously defined
/// here" next to a duplicate-definition error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// Description of this related location
    pub message: String,
    /// Source span
    pub span: Span,
}

impl RelatedInfo {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A diagnostic produced by parsing or semantic analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            related: Vec::new(),
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            related: Vec::new(),
        }
    }

    /// Create a new hint diagnostic
    pub fn hint(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Hint,
            message: message.into(),
            span,
            related: Vec::new(),
        }
    }

    /// Attach a related location
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

/// The kind of grammar a source file declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GrammarKind {
    /// Not parsed yet, or header missing
    #[default]
    Unknown,
    /// `lexer grammar X;`
    Lexer,
    /// `parser grammar X;`
    Parser,
    /// `grammar X;` - lexer and parser rules in one file
    Combined,
}

impl GrammarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Lexer => "lexer",
            Self::Parser => "parser",
            Self::Combined => "combined",
        }
    }
}
