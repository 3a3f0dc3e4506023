//! The per-file symbol table with explicit dependency edges.
//!
//! Tables form a directed graph: a parser grammar's table typically
//! depends on the process-wide global table and on its companion
//! lexer's table. Resolution is breadth-first over that graph with a
//! visited set keyed on table identity, so dependency cycles are safe.
//!
//! All cross-table operations take a [`TableRef`] and lock one table
//! at a time; callers must not hold a table's lock while calling them.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::Span;

use super::symbol::{Symbol, SymbolId, SymbolKind};

/// Shared handle to a symbol table. Identity (the `Arc` pointer) is
/// what dependency edges and visited sets key on.
pub type TableRef = Arc<RwLock<SymbolTable>>;

/// Whether a table tolerates two definitions with the same name.
///
/// Lexer rule tables allow duplicates so analysis survives recovery
/// from parse errors; global and parser tables do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Allow,
}

/// Rejected definition. Recorded by callers as a diagnostic, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    #[error("symbol '{name}' is already defined")]
    Duplicate {
        name: SmolStr,
        /// Span of the earlier definition, for related-info diagnostics
        previous: Option<Span>,
    },
}

pub struct SymbolTable {
    name: SmolStr,
    policy: DuplicatePolicy,
    /// Insertion-ordered arena - single source of truth
    arena: Vec<Symbol>,
    /// Name index over the arena
    by_name: FxHashMap<SmolStr, Vec<SymbolId>>,
    /// Directed dependency edges to other tables
    dependencies: Vec<TableRef>,
}

impl SymbolTable {
    pub fn new(name: impl Into<SmolStr>, policy: DuplicatePolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            arena: Vec::new(),
            by_name: FxHashMap::default(),
            dependencies: Vec::new(),
        }
    }

    /// Create a table already wrapped in its shared handle
    pub fn new_ref(name: impl Into<SmolStr>, policy: DuplicatePolicy) -> TableRef {
        Arc::new(RwLock::new(Self::new(name, policy)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Retune the duplicate policy, e.g. once a file turns out to be a
    /// lexer grammar. Existing symbols are not revalidated.
    pub fn set_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    /// The table-scoped unique name of a symbol
    pub fn qualified_name(&self, symbol: &Symbol) -> String {
        format!("{}::{}", self.name, symbol.name)
    }

    // =========================================================================
    // Definition
    // =========================================================================

    /// Add a symbol. Definition kinds are checked against the duplicate
    /// policy; reference kinds are always accepted.
    pub fn define(
        &mut self,
        kind: SymbolKind,
        parent: Option<SymbolId>,
        name: impl Into<SmolStr>,
    ) -> Result<SymbolId, DefineError> {
        let name = name.into();
        if kind.is_definition() && self.policy == DuplicatePolicy::Reject {
            if let Some(previous) = self.local_definition(&name) {
                return Err(DefineError::Duplicate {
                    name,
                    previous: previous.span,
                });
            }
        }
        let id = SymbolId::new(self.arena.len());
        tracing::trace!(table = %self.name, symbol = %name, ?kind, "define");
        self.by_name.entry(name.clone()).or_default().push(id);
        self.arena.push(Symbol {
            id,
            name,
            kind,
            parent,
            span: None,
        });
        Ok(id)
    }

    /// Add a symbol with a source span
    pub fn define_at(
        &mut self,
        kind: SymbolKind,
        parent: Option<SymbolId>,
        name: impl Into<SmolStr>,
        span: Span,
    ) -> Result<SymbolId, DefineError> {
        let id = self.define(kind, parent, name)?;
        self.arena[id.index()].span = Some(span);
        Ok(id)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.arena.get(id.index())
    }

    /// Drop all symbols but keep the table's identity, policy, and
    /// dependency edges. Called at the start of every parse.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.by_name.clear();
    }

    // =========================================================================
    // Local lookup
    // =========================================================================

    /// Resolve a name in this table only. Definitions win over
    /// references with the same name.
    pub fn resolve_local(&self, name: &str) -> Option<&Symbol> {
        let ids = self.by_name.get(name)?;
        ids.iter()
            .map(|id| &self.arena[id.index()])
            .find(|s| s.is_definition())
            .or_else(|| ids.first().map(|id| &self.arena[id.index()]))
    }

    /// The first local definition with this name, if any
    pub fn local_definition(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name)?.iter().find_map(|id| {
            let symbol = &self.arena[id.index()];
            symbol.is_definition().then_some(symbol)
        })
    }

    /// All local symbols in insertion order
    pub fn local_symbols(&self) -> &[Symbol] {
        &self.arena
    }

    /// Count of local reference symbols with the given name
    pub fn local_reference_count(&self, name: &str) -> usize {
        self.by_name
            .get(name)
            .map(|ids| {
                ids.iter()
                    .filter(|id| self.arena[id.index()].is_reference())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Local top-level definitions (no parent symbol), insertion order
    pub fn top_level_symbols(&self) -> Vec<Symbol> {
        self.arena
            .iter()
            .filter(|s| s.is_definition() && s.parent.is_none())
            .cloned()
            .collect()
    }

    /// Local symbols of one exact kind (used for action/predicate lists)
    pub fn actions(&self, kind: SymbolKind) -> Vec<Symbol> {
        self.arena
            .iter()
            .filter(|s| s.kind == kind)
            .cloned()
            .collect()
    }

    /// Rule-like definitions with zero local references
    pub fn unreferenced_symbols(&self) -> Vec<Symbol> {
        self.arena
            .iter()
            .filter(|s| {
                matches!(
                    s.kind,
                    SymbolKind::Rule
                        | SymbolKind::LexerRule
                        | SymbolKind::Fragment
                        | SymbolKind::VirtualToken
                ) && self.local_reference_count(&s.name) == 0
            })
            .cloned()
            .collect()
    }

    // =========================================================================
    // Dependency edges
    // =========================================================================

    /// Add a dependency edge. Idempotent: an already-present table
    /// (by identity) is not added twice.
    pub fn add_dependency(&mut self, dep: TableRef) {
        let key = Arc::as_ptr(&dep) as usize;
        if self
            .dependencies
            .iter()
            .any(|d| Arc::as_ptr(d) as usize == key)
        {
            return;
        }
        self.dependencies.push(dep);
    }

    /// Remove one dependency edge; unrelated edges are untouched.
    pub fn remove_dependency(&mut self, dep: &TableRef) {
        let key = Arc::as_ptr(dep) as usize;
        self.dependencies
            .retain(|d| Arc::as_ptr(d) as usize != key);
    }

    pub fn dependencies(&self) -> &[TableRef] {
        &self.dependencies
    }

    // =========================================================================
    // Cross-table operations
    // =========================================================================

    /// Resolve a name starting at `table`: breadth-first over the
    /// dependency mesh looking for a definition, falling back to a
    /// local reference symbol when no table defines the name. A table
    /// is never visited twice in one resolution, which makes
    /// dependency cycles safe.
    pub fn resolve_in(table: &TableRef, name: &str, local_only: bool) -> Option<Symbol> {
        if local_only {
            return table.read().resolve_local(name).cloned();
        }
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut queue: VecDeque<TableRef> = VecDeque::new();
        queue.push_back(table.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(Arc::as_ptr(&current) as usize) {
                continue;
            }
            let guard = current.read();
            if let Some(symbol) = guard.local_definition(name) {
                tracing::trace!(table = %guard.name, symbol = name, "resolved");
                return Some(symbol.clone());
            }
            for dep in guard.dependencies() {
                queue.push_back(dep.clone());
            }
        }
        table.read().resolve_local(name).cloned()
    }

    /// Aggregate symbols from `table` and (unless `local_only`) all
    /// transitively-dependent tables, deduplicated by identity.
    pub fn all_symbols_in(
        table: &TableRef,
        kind: Option<SymbolKind>,
        local_only: bool,
    ) -> Vec<Symbol> {
        let mut out = Vec::new();
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut queue: VecDeque<TableRef> = VecDeque::new();
        queue.push_back(table.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(Arc::as_ptr(&current) as usize) {
                continue;
            }
            let guard = current.read();
            for symbol in guard.local_symbols() {
                if kind.map(|k| symbol.kind == k).unwrap_or(true) {
                    out.push(symbol.clone());
                }
            }
            if local_only {
                break;
            }
            for dep in guard.dependencies() {
                queue.push_back(dep.clone());
            }
        }
        out
    }
}
