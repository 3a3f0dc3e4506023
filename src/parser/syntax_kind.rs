//! Syntax kinds for the rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax
//! tree of a grammar definition file (ANTLR-style `.g4` syntax).

/// All syntax kinds (tokens and nodes) in a grammar definition file
///
/// Tokens are leaf nodes (references, literals, punctuation).
/// Nodes are composite (rules, alternatives, blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS & REFERENCES
    // =========================================================================
    TOKEN_REF,    // Uppercase-initial identifier: lexer rule / token name
    RULE_REF,     // Lowercase-initial identifier: parser rule name
    STRING_LIT,   // 'literal'
    CHAR_SET,     // [a-z0-9] (also carries rule argument blocks)
    INT,          // 42
    ACTION_BLOCK, // { arbitrary code }, braces balanced by the lexer

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,     // { (only in options/tokens/channels specs)
    R_BRACE,     // }
    L_PAREN,     // (
    R_PAREN,     // )
    COLON,       // :
    COLON_COLON, // ::
    SEMICOLON,   // ;
    COMMA,       // ,
    PIPE,        // |
    QUESTION,    // ?
    STAR,        // *
    PLUS,        // +
    PLUS_ASSIGN, // +=
    ASSIGN,      // =
    RARROW,      // ->
    DOT,         // .
    RANGE,       // ..
    NOT,         // ~
    POUND,       // #
    AT,          // @
    LT,          // <
    GT,          // >

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    GRAMMAR_KW,
    LEXER_KW,
    PARSER_KW,
    OPTIONS_KW,
    IMPORT_KW,
    TOKENS_KW,
    CHANNELS_KW,
    MODE_KW,
    FRAGMENT_KW,
    RETURNS_KW,
    LOCALS_KW,
    THROWS_KW,
    CATCH_KW,
    FINALLY_KW,

    /// Unrecognized input
    ERROR,

    // =========================================================================
    // COMPOSITE NODES
    // =========================================================================
    GRAMMAR_FILE,
    GRAMMAR_HEADER,
    OPTIONS_SPEC,
    OPTION_DECL,
    IMPORT_DECL,
    TOKENS_SPEC,
    CHANNELS_SPEC,
    NAMED_ACTION,
    MODE_DECL,
    RULE_DECL,
    RULE_PRELUDE, // arguments, returns, locals, throws between name and colon
    ALT_LIST,
    ALTERNATIVE,
    ALT_LABEL,
    ELEMENT,
    BLOCK,
    NOT_SET,
    RANGE_EXPR,
    ELEMENT_OPTIONS,
    LEXER_COMMANDS,
    LEXER_COMMAND,
    EXCEPTION_HANDLER,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::GRAMMAR_KW as u16) && (self as u16) <= (Self::FINALLY_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::GT as u16)
    }

    /// Check if this token can name a grammar element (rule, token, mode, channel)
    pub fn is_identifier(self) -> bool {
        matches!(self, Self::TOKEN_REF | Self::RULE_REF)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarLanguage {}

impl rowan::Language for GrammarLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<GrammarLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<GrammarLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<GrammarLanguage>;
