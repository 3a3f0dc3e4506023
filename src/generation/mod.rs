//! Contracts with the external generation step.
//!
//! Producing automaton data is an external tool's job; the engine
//! only consumes the loaded result. These types pin down the
//! configuration surface and the naming convention for the data
//! files, keeping process management and file IO with the host.

use std::path::PathBuf;

use crate::semantic::GrammarKind;

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub output_dir: Option<PathBuf>,
    /// Target language for generated recognizers; `None` lets the
    /// tool pick its default
    pub language: Option<String>,
    pub generate_listener: bool,
    pub generate_visitor: bool,
    /// Only load existing data, run no tool
    pub load_only: bool,
    pub additional_flags: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            language: None,
            generate_listener: true,
            generate_visitor: false,
            load_only: false,
            additional_flags: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The tool's diagnostic output, passed through verbatim
    #[error("generation tool failed:\n{output}")]
    Tool { output: String },
}

/// Single-shot generation over one grammar and its dependent files.
///
/// Returns the paths of the produced data files. Cancellation and
/// timeouts are the implementor's business; the engine consumes
/// loaded data only after the call settles.
pub trait Generator {
    fn generate(
        &self,
        files: &[PathBuf],
        config: &GenerationConfig,
    ) -> Result<Vec<String>, GenerationError>;
}

/// The data-file naming convention for a generated grammar.
///
/// Lexer-only and parser-only grammars produce `<base>.interp`. A
/// combined grammar additionally produces a lexer file named after
/// the base with any trailing `Parser` stripped and `Lexer` appended.
pub fn interp_file_names(base: &str, kind: GrammarKind) -> Vec<PathBuf> {
    let mut names = vec![PathBuf::from(format!("{base}.interp"))];
    if kind == GrammarKind::Combined {
        let stem = base.strip_suffix("Parser").unwrap_or(base);
        names.push(PathBuf::from(format!("{stem}Lexer.interp")));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interp_file_names_single_pole() {
        assert_eq!(
            interp_file_names("MyLexer", GrammarKind::Lexer),
            [PathBuf::from("MyLexer.interp")]
        );
        assert_eq!(
            interp_file_names("ExprParser", GrammarKind::Parser),
            [PathBuf::from("ExprParser.interp")]
        );
    }

    #[test]
    fn test_interp_file_names_combined() {
        assert_eq!(
            interp_file_names("Expr", GrammarKind::Combined),
            [PathBuf::from("Expr.interp"), PathBuf::from("ExprLexer.interp")]
        );
    }

    #[test]
    fn test_interp_file_names_strips_parser_suffix() {
        assert_eq!(
            interp_file_names("ExprParser", GrammarKind::Combined),
            [
                PathBuf::from("ExprParser.interp"),
                PathBuf::from("ExprLexer.interp")
            ]
        );
    }

    #[test]
    fn test_default_config_mirrors_tool_defaults() {
        let config = GenerationConfig::default();
        assert!(config.generate_listener);
        assert!(!config.generate_visitor);
        assert!(!config.load_only);
    }
}
