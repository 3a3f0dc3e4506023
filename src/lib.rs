//! # gramlab-base
//!
//! Core analysis engine for a grammar-authoring tool: parses grammar
//! definition files, builds a cross-file symbol model, runs semantic
//! checks, and derives artifacts (automaton graphs, interpreted
//! execution, sentence generation) without ever generating target
//! language code.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! generation → contracts for the external generator / data loader
//!   ↓
//! interp     → lexer/parser interpreters, sentence generator
//!   ↓
//! graphs     → per-rule automaton visualization graphs
//!   ↓
//! atn        → automaton data model, interval sets, interpreter data
//!   ↓
//! semantic   → symbol table, two-pass analyzer, source contexts
//!   ↓
//! parser     → Logos lexer, recursive-descent parser, typed AST
//!   ↓
//! base       → primitives (Position, Span, LineIndex)
//! ```
//!
//! The core is synchronous and single-threaded end to end; each
//! [`semantic::SourceContext`] expects a single logical owner. The one
//! asynchronous boundary, generation of automaton data by an external
//! tool, lives behind the traits in [`generation`].

/// Foundation types: Position, Span, LineIndex
pub mod base;

/// Parser: Logos lexer, recursive-descent rowan parser, typed AST
pub mod parser;

/// Semantic model: symbol table, analysis passes, source contexts
pub mod semantic;

/// Automaton data model: states, transitions, interpreter data
pub mod atn;

/// Derived visualization graphs for automaton states
pub mod graphs;

/// Interpreter engine: test-input validation and sentence generation
pub mod interp;

/// Contracts with the external generator and data loader
pub mod generation;

// Re-export foundation types
pub use base::{LineIndex, Position, Span};
pub use semantic::{Diagnostic, GrammarKind, Severity, SourceContext, SymbolKind};
