//! Semantic pass: reference resolution and diagnostics.
//!
//! Resolution failures downgrade to diagnostics, never to errors, so
//! editing features keep working on a partially-valid grammar.

use crate::base::Span;
use crate::semantic::symbol_table::{SymbolKind, SymbolTable, TableRef};
use crate::semantic::types::{Diagnostic, RelatedInfo};

use super::structural::PendingDuplicate;

/// Resolve every reference symbol in `table` across its dependency
/// mesh and append findings to `diagnostics`.
///
/// The caller must not hold the table's lock.
pub fn run_semantic_pass(
    table: &TableRef,
    duplicates: &[PendingDuplicate],
    diagnostics: &mut Vec<Diagnostic>,
) {
    tracing::trace!("semantic pass");

    for duplicate in duplicates {
        let mut diagnostic = Diagnostic::error(
            format!("symbol '{}' is already defined", duplicate.name),
            duplicate.span,
        );
        if let Some(previous) = duplicate.previous {
            diagnostic =
                diagnostic.with_related(RelatedInfo::new("previously defined here", previous));
        }
        diagnostics.push(diagnostic);
    }

    // Snapshot references first; resolution locks tables one at a time.
    let references: Vec<(SymbolKind, smol_str::SmolStr, Option<Span>, Option<SymbolKind>)> = {
        let guard = table.read();
        guard
            .local_symbols()
            .iter()
            .filter(|s| s.is_reference())
            .map(|s| {
                let parent_kind = s
                    .parent
                    .and_then(|id| guard.symbol(id))
                    .map(|parent| parent.kind);
                (s.kind, s.name.clone(), s.span, parent_kind)
            })
            .collect()
    };

    for (kind, name, span, parent_kind) in references {
        let resolved = SymbolTable::resolve_in(table, &name, false)
            .filter(|symbol| symbol.is_definition());
        let span = span.unwrap_or_else(|| Span::from_coords(0, 0, 0, 0));
        match (kind, resolved) {
            (SymbolKind::RuleReference, None) => {
                diagnostics.push(Diagnostic::error(
                    format!("unknown parser rule '{name}'"),
                    span,
                ));
            }
            (SymbolKind::RuleReference, Some(symbol))
                if symbol.kind != SymbolKind::Rule =>
            {
                diagnostics.push(Diagnostic::error(
                    format!("'{name}' is a {}, not a parser rule", symbol.kind.describe()),
                    span,
                ));
            }
            (SymbolKind::TokenReference, None) => {
                diagnostics.push(Diagnostic::error(
                    format!("unknown token reference '{name}'"),
                    span,
                ));
            }
            (SymbolKind::TokenReference, Some(symbol))
                if symbol.kind == SymbolKind::Fragment
                    && parent_kind == Some(SymbolKind::Rule) =>
            {
                diagnostics.push(Diagnostic::warning(
                    format!("fragment rule '{name}' referenced outside lexer rules"),
                    span,
                ));
            }
            // A tokens{} declaration satisfies the reference, but no
            // lexer rule will ever produce the token. EOF is the one
            // virtual token the lexer emits itself.
            (SymbolKind::TokenReference, Some(symbol))
                if symbol.kind == SymbolKind::VirtualToken && name != "EOF" =>
            {
                diagnostics.push(Diagnostic::warning(
                    format!("token '{name}' is implicitly defined and has no lexer rule"),
                    span,
                ));
            }
            _ => {}
        }
    }

    // Unreferenced rules become hints; the first-declared rule is the
    // conventional entry point and stays quiet.
    let unreferenced: Vec<_> = {
        let guard = table.read();
        let entry = guard
            .local_symbols()
            .iter()
            .find(|s| matches!(s.kind, SymbolKind::Rule | SymbolKind::LexerRule))
            .map(|s| s.id);
        guard
            .unreferenced_symbols()
            .into_iter()
            .filter(|s| Some(s.id) != entry)
            .collect()
    };
    for symbol in unreferenced {
        if let Some(span) = symbol.span {
            diagnostics.push(Diagnostic::hint(
                format!(
                    "{} '{}' is never used",
                    symbol.kind.describe(),
                    symbol.name
                ),
                span,
            ));
        }
    }
}
