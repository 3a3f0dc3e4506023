//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for grammar syntax
//! nodes. Each struct wraps a SyntaxNode and provides methods to
//! access children; the analysis passes and the RRD generator work
//! entirely through these.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

/// First non-trivia token of a given kind among a node's direct children
fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// All identifier tokens (TOKEN_REF or RULE_REF) among direct children
fn identifier_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind().is_identifier())
}

// ============================================================================
// Root
// ============================================================================

ast_node!(GrammarFile, GRAMMAR_FILE);

impl GrammarFile {
    pub fn header(&self) -> Option<GrammarHeader> {
        self.0.children().find_map(GrammarHeader::cast)
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDecl> + '_ {
        self.0.children().filter_map(ImportDecl::cast)
    }

    pub fn tokens_specs(&self) -> impl Iterator<Item = TokensSpec> + '_ {
        self.0.children().filter_map(TokensSpec::cast)
    }

    pub fn channels_specs(&self) -> impl Iterator<Item = ChannelsSpec> + '_ {
        self.0.children().filter_map(ChannelsSpec::cast)
    }

    pub fn named_actions(&self) -> impl Iterator<Item = NamedAction> + '_ {
        self.0.children().filter_map(NamedAction::cast)
    }

    pub fn modes(&self) -> impl Iterator<Item = ModeDecl> + '_ {
        self.0.children().filter_map(ModeDecl::cast)
    }

    pub fn rules(&self) -> impl Iterator<Item = RuleDecl> + '_ {
        self.0.children().filter_map(RuleDecl::cast)
    }
}

// ============================================================================
// Header & prequel sections
// ============================================================================

ast_node!(GrammarHeader, GRAMMAR_HEADER);

impl GrammarHeader {
    /// The grammar name token
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier_tokens(&self.0).next()
    }

    pub fn is_lexer(&self) -> bool {
        child_token(&self.0, SyntaxKind::LEXER_KW).is_some()
    }

    pub fn is_parser(&self) -> bool {
        child_token(&self.0, SyntaxKind::PARSER_KW).is_some()
    }
}

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    /// Imported grammar name tokens
    pub fn names(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        identifier_tokens(&self.0)
    }
}

ast_node!(TokensSpec, TOKENS_SPEC);

impl TokensSpec {
    /// Declared virtual token name tokens
    pub fn names(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        identifier_tokens(&self.0)
    }
}

ast_node!(ChannelsSpec, CHANNELS_SPEC);

impl ChannelsSpec {
    pub fn names(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        identifier_tokens(&self.0)
    }
}

ast_node!(OptionsSpec, OPTIONS_SPEC);

ast_node!(OptionDecl, OPTION_DECL);

impl OptionDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier_tokens(&self.0).next()
    }

    /// The value tokens after `=`, concatenated
    pub fn value(&self) -> String {
        let mut seen_assign = false;
        let mut out = String::new();
        for element in self.0.children_with_tokens() {
            if let Some(token) = element.into_token() {
                if token.kind() == SyntaxKind::ASSIGN {
                    seen_assign = true;
                } else if seen_assign && !token.kind().is_trivia() {
                    out.push_str(token.text());
                }
            }
        }
        out
    }
}

ast_node!(NamedAction, NAMED_ACTION);

impl NamedAction {
    /// The action scope when written `@scope::name`
    pub fn scope(&self) -> Option<SyntaxToken> {
        if child_token(&self.0, SyntaxKind::COLON_COLON).is_some() {
            self.0
                .children_with_tokens()
                .filter_map(|e| e.into_token())
                .find(|t| {
                    t.kind().is_identifier()
                        || matches!(t.kind(), SyntaxKind::LEXER_KW | SyntaxKind::PARSER_KW)
                })
        } else {
            None
        }
    }

    /// The action name token (`members` in `@parser::members`)
    pub fn name(&self) -> Option<SyntaxToken> {
        let mut names: Vec<_> = self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| {
                t.kind().is_identifier()
                    || matches!(t.kind(), SyntaxKind::LEXER_KW | SyntaxKind::PARSER_KW)
            })
            .collect();
        names.pop()
    }

    pub fn action(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::ACTION_BLOCK)
    }
}

ast_node!(ModeDecl, MODE_DECL);

impl ModeDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier_tokens(&self.0).next()
    }
}

// ============================================================================
// Rules
// ============================================================================

ast_node!(RuleDecl, RULE_DECL);

impl RuleDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        identifier_tokens(&self.0).next()
    }

    pub fn is_fragment(&self) -> bool {
        child_token(&self.0, SyntaxKind::FRAGMENT_KW).is_some()
    }

    /// Lexer rule by naming convention: uppercase initial letter
    pub fn is_lexer_rule(&self) -> bool {
        self.name()
            .map(|t| t.kind() == SyntaxKind::TOKEN_REF)
            .unwrap_or(false)
    }

    pub fn alt_list(&self) -> Option<AltList> {
        self.0.children().find_map(AltList::cast)
    }
}

ast_node!(AltList, ALT_LIST);

impl AltList {
    pub fn alternatives(&self) -> impl Iterator<Item = Alternative> + '_ {
        self.0.children().filter_map(Alternative::cast)
    }
}

ast_node!(Alternative, ALTERNATIVE);

impl Alternative {
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.children().filter_map(Element::cast)
    }

    /// Label after `#`, for labeled alternatives
    pub fn label(&self) -> Option<SyntaxToken> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::ALT_LABEL)
            .and_then(|n| identifier_tokens(&n).next())
    }

    pub fn lexer_commands(&self) -> Option<LexerCommands> {
        self.0.children().find_map(LexerCommands::cast)
    }
}

/// The atom inside an element, classified for the analysis passes
#[derive(Debug, Clone)]
pub enum ElementAtom {
    /// Reference to a token / lexer rule (`ID`)
    TokenRef(SyntaxToken),
    /// Reference to a parser rule (`expr`)
    RuleRef(SyntaxToken),
    /// String literal (`'a'`)
    Literal(SyntaxToken),
    /// Character set (`[a-z]`)
    CharSet(SyntaxToken),
    /// `.` wildcard
    Wildcard,
    /// Parenthesized block
    Block(Block),
    /// `~`-negated set
    NotSet(NotSet),
    /// `'a'..'z'` character range
    Range(RangeExpr),
    /// Embedded action or, with `?`, a semantic predicate
    Action {
        token: SyntaxToken,
        is_predicate: bool,
    },
}

/// EBNF suffix on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EbnfSuffix {
    Optional,
    ZeroOrMore,
    OneOrMore,
}

ast_node!(Element, ELEMENT);

impl Element {
    /// The (first) label token of a `label=atom` element
    pub fn label(&self) -> Option<SyntaxToken> {
        let has_assign = self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| matches!(t.kind(), SyntaxKind::ASSIGN | SyntaxKind::PLUS_ASSIGN));
        if has_assign {
            identifier_tokens(&self.0).next()
        } else {
            None
        }
    }

    /// Classify the element's atom
    pub fn atom(&self) -> Option<ElementAtom> {
        // Composite atoms first
        for child in self.0.children() {
            match child.kind() {
                SyntaxKind::BLOCK => return Block::cast(child).map(ElementAtom::Block),
                SyntaxKind::NOT_SET => return NotSet::cast(child).map(ElementAtom::NotSet),
                SyntaxKind::RANGE_EXPR => return RangeExpr::cast(child).map(ElementAtom::Range),
                _ => {}
            }
        }
        let label = self.label();
        let mut skipped_label = label.is_none();
        for element in self.0.children_with_tokens() {
            let Some(token) = element.into_token() else {
                continue;
            };
            if !skipped_label {
                if token.kind().is_identifier() {
                    skipped_label = true;
                }
                continue;
            }
            match token.kind() {
                SyntaxKind::TOKEN_REF => return Some(ElementAtom::TokenRef(token)),
                SyntaxKind::RULE_REF => return Some(ElementAtom::RuleRef(token)),
                SyntaxKind::STRING_LIT => return Some(ElementAtom::Literal(token)),
                SyntaxKind::CHAR_SET => return Some(ElementAtom::CharSet(token)),
                SyntaxKind::DOT => return Some(ElementAtom::Wildcard),
                SyntaxKind::ACTION_BLOCK => {
                    let is_predicate = self
                        .0
                        .children_with_tokens()
                        .filter_map(|e| e.into_token())
                        .any(|t| t.kind() == SyntaxKind::QUESTION);
                    return Some(ElementAtom::Action {
                        token,
                        is_predicate,
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// The EBNF suffix, if any
    pub fn suffix(&self) -> Option<EbnfSuffix> {
        // A QUESTION also marks predicates; only count suffixes that
        // follow the atom, which for actions means there is no suffix.
        if matches!(self.atom(), Some(ElementAtom::Action { .. })) {
            return None;
        }
        // Child-token iterators only run forward; keep the last match.
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .fold(None, |last, t| match t.kind() {
                SyntaxKind::QUESTION => Some(EbnfSuffix::Optional),
                SyntaxKind::STAR => Some(EbnfSuffix::ZeroOrMore),
                SyntaxKind::PLUS => Some(EbnfSuffix::OneOrMore),
                _ => last,
            })
    }
}

ast_node!(Block, BLOCK);

impl Block {
    pub fn alt_list(&self) -> Option<AltList> {
        self.0.children().find_map(AltList::cast)
    }
}

ast_node!(NotSet, NOT_SET);

impl NotSet {
    pub fn block(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }

    /// The negated single token, when not a block
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::TOKEN_REF | SyntaxKind::STRING_LIT | SyntaxKind::CHAR_SET
                )
            })
    }
}

ast_node!(RangeExpr, RANGE_EXPR);

impl RangeExpr {
    pub fn bounds(&self) -> (Option<SyntaxToken>, Option<SyntaxToken>) {
        let mut literals = self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::STRING_LIT);
        (literals.next(), literals.next())
    }
}

ast_node!(LexerCommands, LEXER_COMMANDS);

impl LexerCommands {
    pub fn commands(&self) -> impl Iterator<Item = LexerCommand> + '_ {
        self.0.children().filter_map(LexerCommand::cast)
    }
}

ast_node!(LexerCommand, LEXER_COMMAND);

impl LexerCommand {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| {
                t.kind().is_identifier()
                    || matches!(t.kind(), SyntaxKind::MODE_KW | SyntaxKind::CHANNELS_KW)
            })
    }

    /// Argument between parentheses, when present
    pub fn argument(&self) -> Option<SyntaxToken> {
        let mut after_paren = false;
        for element in self.0.children_with_tokens() {
            let Some(token) = element.into_token() else {
                continue;
            };
            match token.kind() {
                SyntaxKind::L_PAREN => after_paren = true,
                k if after_paren && (k.is_identifier() || k == SyntaxKind::INT) => {
                    return Some(token);
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    fn grammar(text: &str) -> GrammarFile {
        GrammarFile::cast(parse(text).syntax()).expect("root is a grammar file")
    }

    #[test]
    fn test_header_accessors() {
        let file = grammar("lexer grammar L;\nA: 'a';\n");
        let header = file.header().unwrap();
        assert!(header.is_lexer());
        assert!(!header.is_parser());
        assert_eq!(header.name().unwrap().text(), "L");
    }

    #[test]
    fn test_rule_iteration_and_kinds() {
        let file = grammar("grammar T;\nr: A;\nfragment DIGIT: [0-9];\nA: DIGIT+;\n");
        let rules: Vec<_> = file.rules().collect();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].name().unwrap().text(), "r");
        assert!(!rules[0].is_lexer_rule());
        assert!(rules[1].is_fragment());
        assert!(rules[2].is_lexer_rule());
    }

    #[test]
    fn test_element_atoms() {
        let file = grammar("grammar T;\nr: tag=A sub* 'lit' (B | C)? ;\n");
        let rule = file.rules().next().unwrap();
        let alt = rule.alt_list().unwrap().alternatives().next().unwrap();
        let atoms: Vec<_> = alt.elements().map(|e| e.atom().unwrap()).collect();
        assert!(matches!(atoms[0], ElementAtom::TokenRef(_)));
        assert!(matches!(atoms[1], ElementAtom::RuleRef(_)));
        assert!(matches!(atoms[2], ElementAtom::Literal(_)));
        assert!(matches!(atoms[3], ElementAtom::Block(_)));

        let elements: Vec<_> = alt.elements().collect();
        assert_eq!(elements[0].label().unwrap().text(), "tag");
        assert_eq!(elements[1].suffix(), Some(EbnfSuffix::ZeroOrMore));
        assert_eq!(elements[3].suffix(), Some(EbnfSuffix::Optional));
    }

    #[test]
    fn test_suffix_is_last_cardinality_token() {
        let file = grammar("grammar T;\nr: tags+=A+ B? ;\n");
        let rule = file.rules().next().unwrap();
        let alt = rule.alt_list().unwrap().alternatives().next().unwrap();
        let elements: Vec<_> = alt.elements().collect();
        assert_eq!(elements[0].label().unwrap().text(), "tags");
        assert_eq!(elements[0].suffix(), Some(EbnfSuffix::OneOrMore));
        assert_eq!(elements[1].suffix(), Some(EbnfSuffix::Optional));
    }

    #[test]
    fn test_lexer_commands() {
        let file = grammar("lexer grammar L;\nWS: [ \\t]+ -> channel(HIDDEN), skip;\n");
        let rule = file.rules().next().unwrap();
        let alt = rule.alt_list().unwrap().alternatives().next().unwrap();
        let commands: Vec<_> = alt.lexer_commands().unwrap().commands().collect();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].name().unwrap().text(), "channel");
        assert_eq!(commands[0].argument().unwrap().text(), "HIDDEN");
        assert_eq!(commands[1].name().unwrap().text(), "skip");
        assert!(commands[1].argument().is_none());
    }

    #[test]
    fn test_named_action_accessors() {
        let file = grammar("grammar T;\n@parser::members { int x; }\nr: 'a';\n");
        let action = file.named_actions().next().unwrap();
        assert_eq!(action.scope().unwrap().text(), "parser");
        assert_eq!(action.name().unwrap().text(), "members");
        assert!(action.action().unwrap().text().contains("int x;"));
    }
}
