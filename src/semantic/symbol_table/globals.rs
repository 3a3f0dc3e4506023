//! The process-wide built-in symbol table.
//!
//! Lazily built exactly once per process, read-only afterwards. Every
//! new context table receives it explicitly as its first dependency.

use std::sync::OnceLock;

use super::symbol::SymbolKind;
use super::table::{DuplicatePolicy, SymbolTable, TableRef};

static GLOBAL_TABLE: OnceLock<TableRef> = OnceLock::new();

/// The shared table holding built-in grammar entities: `EOF`,
/// `DEFAULT_MODE`, `HIDDEN`, and `DEFAULT_TOKEN_CHANNEL`.
pub fn global_table() -> TableRef {
    GLOBAL_TABLE
        .get_or_init(|| {
            let table = SymbolTable::new_ref("global", DuplicatePolicy::Reject);
            {
                let mut guard = table.write();
                // A OnceLock initializer runs once, so these cannot collide.
                let _ = guard.define(SymbolKind::VirtualToken, None, "EOF");
                let _ = guard.define(SymbolKind::Mode, None, "DEFAULT_MODE");
                let _ = guard.define(SymbolKind::Channel, None, "DEFAULT_TOKEN_CHANNEL");
                let _ = guard.define(SymbolKind::Channel, None, "HIDDEN");
            }
            table
        })
        .clone()
}
