//! Source context: the per-file analysis unit.
//!
//! A context owns one grammar file's text, parse tree, symbol table,
//! diagnostics, and interpreter data, and coordinates the analysis
//! passes. Contexts link into a reference mesh (a cyclic directed
//! graph, not a tree): a parser grammar and its split lexer grammar
//! legitimately reference each other.
//!
//! Contexts are not designed for concurrent mutation; callers must
//! serialize parse/analyze calls per context. The mesh-walking
//! associated functions lock one context at a time and must not be
//! called while holding that context's lock.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::atn::InterpreterData;
use crate::base::{LineIndex, Position};
use crate::parser::{
    AstNode, GrammarFile, Parse, ParseMode, SyntaxElement, parse_with_mode,
};
use crate::semantic::analysis::{
    PendingDuplicate, rrd_script, run_semantic_pass, run_structural_pass,
};
use crate::semantic::symbol_table::{
    DuplicatePolicy, Symbol, SymbolKind, SymbolTable, TableRef, global_table,
};
use crate::semantic::types::{Diagnostic, GrammarKind};

/// Shared handle to a context; mesh edges key on the `Arc` pointer.
pub type ContextRef = Arc<RwLock<SourceContext>>;

/// Which automaton slot interpreter data belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPole {
    Lexer,
    Parser,
}

/// Observable position in the per-parse state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Unparsed,
    Parsed,
    SemanticsDone,
}

/// The whole unit failed: the token stream was rejected by both parse
/// strategies.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("grammar could not be parsed: {0}")]
    Unrecoverable(String),
}

pub struct SourceContext {
    path: PathBuf,
    /// Short identifier derived from the file name
    name: SmolStr,
    source: String,
    line_index: LineIndex,
    parse: Option<Parse>,
    grammar_kind: GrammarKind,
    imports: Vec<SmolStr>,
    duplicates: Vec<PendingDuplicate>,
    diagnostics: Vec<Diagnostic>,
    symbol_table: TableRef,
    /// Diagram scripts per rule, in declaration order
    rrd_cache: IndexMap<SmolStr, String>,
    /// Bumped by every parse; the semantic pass memoizes against it
    generation: u32,
    analyzed_generation: Option<u32>,
    lexer_data: Option<Arc<InterpreterData>>,
    parser_data: Option<Arc<InterpreterData>>,
    /// Contexts that declared a dependency on this one
    referenced_by: Vec<ContextRef>,
}

impl SourceContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name: SmolStr = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .into();
        let symbol_table = SymbolTable::new_ref(name.clone(), DuplicatePolicy::Reject);
        symbol_table.write().add_dependency(global_table());
        Self {
            path,
            name,
            source: String::new(),
            line_index: LineIndex::default(),
            parse: None,
            grammar_kind: GrammarKind::Unknown,
            imports: Vec::new(),
            duplicates: Vec::new(),
            diagnostics: Vec::new(),
            symbol_table,
            rrd_cache: IndexMap::new(),
            generation: 0,
            analyzed_generation: None,
            lexer_data: None,
            parser_data: None,
            referenced_by: Vec::new(),
        }
    }

    /// Create a context already wrapped in its shared handle
    pub fn new_ref(path: impl Into<PathBuf>) -> ContextRef {
        Arc::new(RwLock::new(Self::new(path)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grammar_kind(&self) -> GrammarKind {
        self.grammar_kind
    }

    /// Imported grammar names found by the last parse
    pub fn imports(&self) -> &[SmolStr] {
        &self.imports
    }

    pub fn symbol_table(&self) -> TableRef {
        self.symbol_table.clone()
    }

    pub fn analysis_state(&self) -> AnalysisState {
        if self.parse.is_none() {
            AnalysisState::Unparsed
        } else if self.analyzed_generation == Some(self.generation) {
            AnalysisState::SemanticsDone
        } else {
            AnalysisState::Parsed
        }
    }

    // =========================================================================
    // Parse lifecycle
    // =========================================================================

    /// Refresh the pending source text. Cheap; safe to call on every
    /// edit. Nothing is reanalyzed until the next [`Self::parse`].
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.line_index = LineIndex::new(&self.source);
    }

    /// Full re-analysis of the current text: the expensive transition.
    ///
    /// Tries the fail-fast strategy first; on a prediction abort the
    /// input is rewound and reparsed once with the recovering strategy.
    /// Previous symbols, diagnostics, and diagram scripts are cleared;
    /// interpreter data survives until an explicit reload.
    pub fn parse(&mut self) -> Result<GrammarKind, ParseError> {
        tracing::debug!(context = %self.name, "parse");
        self.diagnostics.clear();
        self.rrd_cache.clear();
        self.duplicates.clear();
        self.imports.clear();
        self.symbol_table.write().clear();
        self.generation = self.generation.wrapping_add(1);
        self.analyzed_generation = None;

        let parse = match parse_with_mode(&self.source, ParseMode::FailFast) {
            Ok(parse) => parse,
            Err(_) => parse_with_mode(&self.source, ParseMode::Recovering)
                .map_err(|_| ParseError::Unrecoverable("no recovery possible".into()))?,
        };
        for error in &parse.errors {
            self.diagnostics.push(Diagnostic::error(
                error.message.clone(),
                self.line_index.span(error.range),
            ));
        }

        if let Some(file) = GrammarFile::cast(parse.syntax()) {
            let mut table = self.symbol_table.write();
            // The policy must be in place before definitions arrive;
            // lexer rule tables tolerate duplicates from error recovery.
            let is_lexer = file.header().map(|h| h.is_lexer()).unwrap_or(false);
            table.set_policy(if is_lexer {
                DuplicatePolicy::Allow
            } else {
                DuplicatePolicy::Reject
            });
            let outcome = run_structural_pass(&file, &self.line_index, &mut table);
            self.grammar_kind = outcome.grammar_kind;
            self.imports = outcome.imports;
            self.duplicates = outcome.duplicates;
        }
        self.parse = Some(parse);
        Ok(self.grammar_kind)
    }

    /// Run the semantic pass if this parse generation hasn't been
    /// analyzed yet. Idempotent between parses.
    fn ensure_semantics(&mut self) {
        if self.parse.is_none() || self.analyzed_generation == Some(self.generation) {
            return;
        }
        self.analyzed_generation = Some(self.generation);
        run_semantic_pass(&self.symbol_table, &self.duplicates, &mut self.diagnostics);
        // Diagram scripts are a side artifact of this pass
        if let Some(file) = self.grammar_file() {
            for rule in file.rules() {
                if let Some(name) = rule.name() {
                    self.rrd_cache
                        .insert(SmolStr::new(name.text()), rrd_script(&rule));
                }
            }
        }
    }

    /// All diagnostics for the current text; triggers the semantic
    /// pass on first request after a parse.
    pub fn diagnostics(&mut self) -> &[Diagnostic] {
        self.ensure_semantics();
        &self.diagnostics
    }

    /// True iff any diagnostic carries Error severity
    pub fn has_errors(&mut self) -> bool {
        self.ensure_semantics();
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// The rule-reference-diagram script for one rule
    pub fn rrd_script(&mut self, rule_name: &str) -> Option<String> {
        self.ensure_semantics();
        self.rrd_cache.get(rule_name).cloned()
    }

    /// All diagram scripts, in rule declaration order
    pub fn rrd_scripts(&mut self) -> Vec<(SmolStr, String)> {
        self.ensure_semantics();
        self.rrd_cache
            .iter()
            .map(|(name, script)| (name.clone(), script.clone()))
            .collect()
    }

    // =========================================================================
    // Symbol views
    // =========================================================================

    /// Resolve a name through this file's table and its dependencies
    pub fn resolve_symbol(&self, name: &str) -> Option<Symbol> {
        SymbolTable::resolve_in(&self.symbol_table, name, false)
    }

    pub fn list_top_level_symbols(&self) -> Vec<Symbol> {
        self.symbol_table.read().top_level_symbols()
    }

    pub fn list_actions(&self, kind: SymbolKind) -> Vec<Symbol> {
        self.symbol_table.read().actions(kind)
    }

    pub fn unreferenced_symbols(&self) -> Vec<Symbol> {
        self.symbol_table.read().unreferenced_symbols()
    }

    // =========================================================================
    // Parse tree access
    // =========================================================================

    /// The current parse tree's typed root
    pub fn grammar_file(&self) -> Option<GrammarFile> {
        self.parse
            .as_ref()
            .and_then(|parse| GrammarFile::cast(parse.syntax()))
    }

    /// Smallest syntax element covering a caret position; the
    /// primitive behind completion and symbol-at-position lookups.
    pub fn covering_node(&self, position: Position) -> Option<SyntaxElement> {
        let parse = self.parse.as_ref()?;
        // A caret past the end of a line (or of the text) clamps to
        // the text; rowan rejects out-of-range offsets.
        let end = text_size::TextSize::new(self.source.len() as u32);
        let offset = self.line_index.offset(position).min(end);
        Some(crate::parser::covering_element(&parse.syntax(), offset))
    }

    // =========================================================================
    // Interpreter data
    // =========================================================================

    /// Replace one pole's interpreter data wholesale
    pub fn set_interpreter_data(&mut self, pole: DataPole, data: Arc<InterpreterData>) {
        match pole {
            DataPole::Lexer => self.lexer_data = Some(data),
            DataPole::Parser => self.parser_data = Some(data),
        }
    }

    pub fn lexer_data(&self) -> Option<Arc<InterpreterData>> {
        self.lexer_data.clone()
    }

    pub fn parser_data(&self) -> Option<Arc<InterpreterData>> {
        self.parser_data.clone()
    }

    // =========================================================================
    // Reference mesh
    // =========================================================================

    /// Contexts that reference this one (direct edges only)
    pub fn referenced_by(&self) -> &[ContextRef] {
        &self.referenced_by
    }

    /// Record that `source` references `target` (e.g. a parser grammar
    /// referencing its split lexer). Idempotent: an existing edge is
    /// not duplicated. Mutual references are legal; the mesh walk uses
    /// a visited set, never unguarded recursion. Returns true when a
    /// new edge was added.
    pub fn add_as_reference_to(source: &ContextRef, target: &ContextRef) -> bool {
        if Self::has_direct_reference(target, source) {
            return false;
        }
        if Self::is_referencing(source, target) {
            // Closing a cycle (parser <-> lexer split grammars); fine,
            // but worth a trace when debugging mesh walks.
            tracing::trace!("reference edge closes a cycle in the mesh");
        }
        let table = source.read().symbol_table();
        table.write().add_dependency(target.read().symbol_table());
        target.write().referenced_by.push(source.clone());
        true
    }

    /// Undo one reference edge; unrelated edges stay intact.
    pub fn remove_reference(source: &ContextRef, target: &ContextRef) {
        let key = Arc::as_ptr(source) as usize;
        target
            .write()
            .referenced_by
            .retain(|c| Arc::as_ptr(c) as usize != key);
        let table = source.read().symbol_table();
        table
            .write()
            .remove_dependency(&target.read().symbol_table());
    }

    /// Breadth-first check whether `source` (transitively) references
    /// `target`, i.e. whether `target` can reach `source` over its
    /// referenced-by edges.
    pub fn is_referencing(target: &ContextRef, source: &ContextRef) -> bool {
        let wanted = Arc::as_ptr(source) as usize;
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut queue: VecDeque<ContextRef> = VecDeque::new();
        queue.push_back(target.clone());
        while let Some(current) = queue.pop_front() {
            let key = Arc::as_ptr(&current) as usize;
            if !visited.insert(key) {
                continue;
            }
            let direct: Vec<ContextRef> = current.read().referenced_by.to_vec();
            for referrer in direct {
                if Arc::as_ptr(&referrer) as usize == wanted {
                    return true;
                }
                queue.push_back(referrer);
            }
        }
        false
    }

    fn has_direct_reference(target: &ContextRef, source: &ContextRef) -> bool {
        let key = Arc::as_ptr(source) as usize;
        target
            .read()
            .referenced_by
            .iter()
            .any(|c| Arc::as_ptr(c) as usize == key)
    }

    /// Count references to `name`: local reference symbols plus one
    /// contribution per distinct context referencing this one,
    /// propagated through the mesh with a visited set.
    pub fn reference_count(context: &ContextRef, name: &str) -> usize {
        let mut total = 0;
        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut queue: VecDeque<ContextRef> = VecDeque::new();
        queue.push_back(context.clone());
        while let Some(current) = queue.pop_front() {
            if !visited.insert(Arc::as_ptr(&current) as usize) {
                continue;
            }
            let (table, referrers) = {
                let guard = current.read();
                (guard.symbol_table(), guard.referenced_by.to_vec())
            };
            total += table.read().local_reference_count(name);
            for referrer in referrers {
                queue.push_back(referrer);
            }
        }
        total
    }
}
