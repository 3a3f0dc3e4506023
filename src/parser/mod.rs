//! Rowan-based parser for grammar definition files
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! We build a lossless CST that preserves all whitespace and comments,
//! then expose a typed AST layer on top. The analysis passes and the
//! caret-position feature surface both work against the CST.
//!
//! ## Architecture
//!
//! ```text
//! Grammar Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! Semantic model → symbol table, diagnostics
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod lexer;
mod syntax_kind;

pub use ast::*;
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{Parse, ParseMode, PredictionAbort, SyntaxError, parse, parse_with_mode};
pub use syntax_kind::{GrammarLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Re-export rowan position types for convenience
pub use text_size::{TextRange, TextSize};

/// The smallest syntax element covering a byte offset.
///
/// This is the single primitive behind all caret-position features
/// (completion, symbol-at-position, enclosing-scope lookup).
pub fn covering_element(root: &SyntaxNode, offset: TextSize) -> SyntaxElement {
    root.covering_element(TextRange::empty(offset))
}
