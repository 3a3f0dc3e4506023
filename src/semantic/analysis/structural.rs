//! Structural pass: one tree walk populating the symbol table.
//!
//! Every definition and reference found in the parse tree lands in the
//! table; imports and the grammar kind are collected on the way.
//! Duplicate definitions are not diagnosed here - they are recorded
//! and reported by the semantic pass.

use smol_str::SmolStr;

use crate::base::{LineIndex, Span};
use crate::parser::{Alternative, Element, ElementAtom, GrammarFile, SyntaxToken};
use crate::semantic::symbol_table::{SymbolId, SymbolKind, SymbolTable};
use crate::semantic::types::GrammarKind;

/// A rejected duplicate definition, reported later by the semantic pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDuplicate {
    pub name: SmolStr,
    pub span: Span,
    pub previous: Option<Span>,
}

/// What the structural pass learned beyond the table contents
#[derive(Debug, Clone, Default)]
pub struct StructuralOutcome {
    pub grammar_kind: GrammarKind,
    /// Imported grammar names, in declaration order
    pub imports: Vec<SmolStr>,
    pub duplicates: Vec<PendingDuplicate>,
}

/// Walk the tree once and populate `table`.
pub fn run_structural_pass(
    file: &GrammarFile,
    line_index: &LineIndex,
    table: &mut SymbolTable,
) -> StructuralOutcome {
    let mut pass = Structural {
        line_index,
        table,
        outcome: StructuralOutcome::default(),
    };
    pass.run(file);
    pass.outcome
}

struct Structural<'a> {
    line_index: &'a LineIndex,
    table: &'a mut SymbolTable,
    outcome: StructuralOutcome,
}

impl Structural<'_> {
    fn run(&mut self, file: &GrammarFile) {
        self.outcome.grammar_kind = match file.header() {
            Some(header) if header.is_lexer() => GrammarKind::Lexer,
            Some(header) if header.is_parser() => GrammarKind::Parser,
            Some(_) => GrammarKind::Combined,
            None => GrammarKind::Unknown,
        };
        tracing::trace!(kind = self.outcome.grammar_kind.as_str(), "structural pass");

        for import in file.imports() {
            for name in import.names() {
                self.outcome.imports.push(SmolStr::new(name.text()));
                self.define(SymbolKind::Import, None, &name);
            }
        }
        for spec in file.tokens_specs() {
            for name in spec.names() {
                self.define(SymbolKind::VirtualToken, None, &name);
            }
        }
        for spec in file.channels_specs() {
            for name in spec.names() {
                self.define(SymbolKind::Channel, None, &name);
            }
        }
        for action in file.named_actions() {
            if let Some(name) = action.name() {
                let parent = self.define(SymbolKind::NamedAction, None, &name);
                if let Some(code) = action.action() {
                    self.define(SymbolKind::Action, parent, &code);
                }
            }
        }
        for mode in file.modes() {
            if let Some(name) = mode.name() {
                self.define(SymbolKind::Mode, None, &name);
            }
        }
        for rule in file.rules() {
            let Some(name) = rule.name() else { continue };
            let kind = if rule.is_fragment() {
                SymbolKind::Fragment
            } else if rule.is_lexer_rule() {
                SymbolKind::LexerRule
            } else {
                SymbolKind::Rule
            };
            let rule_symbol = self.define(kind, None, &name);
            if let Some(alts) = rule.alt_list() {
                for alt in alts.alternatives() {
                    self.walk_alternative(&alt, rule_symbol);
                }
            }
        }
    }

    fn walk_alternative(&mut self, alt: &Alternative, parent: Option<SymbolId>) {
        for element in alt.elements() {
            self.walk_element(&element, parent);
        }
    }

    fn walk_element(&mut self, element: &Element, parent: Option<SymbolId>) {
        match element.atom() {
            Some(ElementAtom::TokenRef(token)) => {
                self.define(SymbolKind::TokenReference, parent, &token);
            }
            Some(ElementAtom::RuleRef(token)) => {
                self.define(SymbolKind::RuleReference, parent, &token);
            }
            Some(ElementAtom::Literal(token)) => {
                self.define(SymbolKind::Operator, parent, &token);
            }
            Some(ElementAtom::Action {
                token,
                is_predicate,
            }) => {
                let kind = if is_predicate {
                    SymbolKind::Predicate
                } else {
                    SymbolKind::Action
                };
                self.define(kind, parent, &token);
            }
            Some(ElementAtom::Block(block)) => {
                if let Some(alts) = block.alt_list() {
                    for alt in alts.alternatives() {
                        self.walk_alternative(&alt, parent);
                    }
                }
            }
            Some(ElementAtom::NotSet(not_set)) => {
                if let Some(block) = not_set.block() {
                    if let Some(alts) = block.alt_list() {
                        for alt in alts.alternatives() {
                            self.walk_alternative(&alt, parent);
                        }
                    }
                } else if let Some(token) = not_set.token() {
                    if token.kind() == crate::parser::SyntaxKind::TOKEN_REF {
                        self.define(SymbolKind::TokenReference, parent, &token);
                    }
                }
            }
            Some(ElementAtom::Range(_)) | Some(ElementAtom::CharSet(_))
            | Some(ElementAtom::Wildcard) | None => {}
        }
    }

    /// Define a symbol for a token, downgrading duplicates to pending
    /// findings. Returns the id when the definition succeeded.
    fn define(
        &mut self,
        kind: SymbolKind,
        parent: Option<SymbolId>,
        token: &SyntaxToken,
    ) -> Option<SymbolId> {
        let span = self.line_index.span(token.text_range());
        match self.table.define_at(kind, parent, token.text(), span) {
            Ok(id) => Some(id),
            Err(crate::semantic::symbol_table::DefineError::Duplicate { name, previous }) => {
                self.outcome.duplicates.push(PendingDuplicate {
                    name,
                    span,
                    previous,
                });
                None
            }
        }
    }
}
