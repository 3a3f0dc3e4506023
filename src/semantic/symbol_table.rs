/// Scoped, cross-file symbol registry for grammar entities
mod globals;
mod symbol;
mod table;

pub use globals::global_table;
pub use symbol::{Symbol, SymbolId, SymbolKind};
pub use table::{DefineError, DuplicatePolicy, SymbolTable, TableRef};

#[cfg(test)]
mod tests;
