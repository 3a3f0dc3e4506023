//! Symbol and symbol-kind definitions.

use crate::base::Span;
use smol_str::SmolStr;

/// Unique identifier for a symbol within its owning table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Closed enumeration of every grammar entity kind.
///
/// Definition kinds and reference kinds share one enum so a table can
/// hold both; `is_definition` separates them. Adding a variant forces
/// every `match` below to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Parser rule definition
    Rule,
    /// Lexer rule definition
    LexerRule,
    /// Fragment lexer rule definition
    Fragment,
    /// Token declared in a `tokens {}` block or built-in (no rule body)
    VirtualToken,
    /// Lexer mode
    Mode,
    /// Token channel
    Channel,
    /// Embedded action inside a rule
    Action,
    /// Grammar-level `@name {...}` action
    NamedAction,
    /// Semantic predicate (`{...}?`)
    Predicate,
    /// Operator literal appearing in a rule body
    Operator,
    /// An `import X;` entry
    Import,
    /// Reference to a token / lexer rule
    TokenReference,
    /// Reference to a parser rule
    RuleReference,
}

impl SymbolKind {
    /// True for kinds that define a named entity (as opposed to
    /// referencing one or being an anonymous body part).
    pub fn is_definition(self) -> bool {
        match self {
            Self::Rule
            | Self::LexerRule
            | Self::Fragment
            | Self::VirtualToken
            | Self::Mode
            | Self::Channel
            | Self::NamedAction => true,
            Self::Action
            | Self::Predicate
            | Self::Operator
            | Self::Import
            | Self::TokenReference
            | Self::RuleReference => false,
        }
    }

    /// True for the two reference kinds.
    pub fn is_reference(self) -> bool {
        matches!(self, Self::TokenReference | Self::RuleReference)
    }

    /// Display name for UI surfaces. Total by construction.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Rule => "parser rule",
            Self::LexerRule => "lexer rule",
            Self::Fragment => "fragment rule",
            Self::VirtualToken => "virtual token",
            Self::Mode => "lexer mode",
            Self::Channel => "token channel",
            Self::Action => "action",
            Self::NamedAction => "named action",
            Self::Predicate => "predicate",
            Self::Operator => "operator",
            Self::Import => "import",
            Self::TokenReference => "token reference",
            Self::RuleReference => "rule reference",
        }
    }
}

/// A named grammar entity (definition or reference) with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Enclosing symbol, e.g. an action nested in a named action
    pub parent: Option<SymbolId>,
    pub span: Option<Span>,
}

impl Symbol {
    pub fn is_definition(&self) -> bool {
        self.kind.is_definition()
    }

    pub fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }
}
