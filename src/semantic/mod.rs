//! Semantic model: symbols, diagnostics, and per-file contexts.
//!
//! The [`SourceContext`] is the unit of analysis. Its symbol table
//! links into a dependency mesh with the tables of other contexts and
//! the process-wide global table of builtin symbols.

pub mod analysis;
mod context;
pub mod symbol_table;
mod types;

pub use context::{
    AnalysisState, ContextRef, DataPole, ParseError, SourceContext,
};
pub use symbol_table::{
    DefineError, DuplicatePolicy, Symbol, SymbolId, SymbolKind, SymbolTable, TableRef,
    global_table,
};
pub use types::{Diagnostic, GrammarKind, RelatedInfo, Severity};
