//! Logos-based lexer for grammar definition files
//!
//! Fast tokenization using the logos crate. Action blocks are matched
//! with balanced braces (string and comment aware) so arbitrary target
//! language code inside `{...}` stays a single token; the braces of
//! `options`/`tokens`/`channels` specs stay structural instead.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(LogosToken::BraceOrAction) if text == "{" => SyntaxKind::L_BRACE,
            Ok(LogosToken::BraceOrAction) => SyntaxKind::ACTION_BLOCK,
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Mutable lexer state threaded through logos callbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct LexerState {
    /// The next `{` opens an options/tokens/channels body, not an action
    structural_brace: bool,
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(extras = LexerState)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // REFERENCES & LITERALS
    // =========================================================================
    #[regex(r"[A-Z][a-zA-Z0-9_]*")]
    TokenRef,

    #[regex(r"[a-z][a-zA-Z0-9_]*")]
    RuleRef,

    #[regex(r"'(\\.|[^'\\\n])*'")]
    StringLit,

    #[regex(r"\[(\\.|[^\]\\])*\]")]
    CharSet,

    #[regex(r"[0-9]+")]
    Int,

    /// Either a structural `{` or a whole balanced action block
    #[token("{", lex_brace)]
    BraceOrAction,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("::")]
    ColonColon,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("|")]
    Pipe,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+=")]
    PlusAssign,

    #[token("+")]
    Plus,

    #[token("=")]
    Assign,

    #[token("->")]
    RArrow,

    #[token("..")]
    Range,

    #[token(".")]
    Dot,

    #[token("~")]
    Not,

    #[token("#")]
    Pound,

    #[token("@")]
    At,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("grammar")]
    GrammarKw,

    #[token("lexer")]
    LexerKw,

    #[token("parser")]
    ParserKw,

    #[token("options", |lex| lex.extras.structural_brace = true)]
    OptionsKw,

    #[token("import")]
    ImportKw,

    #[token("tokens", |lex| lex.extras.structural_brace = true)]
    TokensKw,

    #[token("channels", |lex| lex.extras.structural_brace = true)]
    ChannelsKw,

    #[token("mode")]
    ModeKw,

    #[token("fragment")]
    FragmentKw,

    #[token("returns")]
    ReturnsKw,

    #[token("locals")]
    LocalsKw,

    #[token("throws")]
    ThrowsKw,

    #[token("catch")]
    CatchKw,

    #[token("finally")]
    FinallyKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(t: LogosToken) -> Self {
        match t {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::TokenRef => SyntaxKind::TOKEN_REF,
            LogosToken::RuleRef => SyntaxKind::RULE_REF,
            LogosToken::StringLit => SyntaxKind::STRING_LIT,
            LogosToken::CharSet => SyntaxKind::CHAR_SET,
            LogosToken::Int => SyntaxKind::INT,
            LogosToken::BraceOrAction => SyntaxKind::ACTION_BLOCK,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::ColonColon => SyntaxKind::COLON_COLON,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Question => SyntaxKind::QUESTION,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::PlusAssign => SyntaxKind::PLUS_ASSIGN,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Assign => SyntaxKind::ASSIGN,
            LogosToken::RArrow => SyntaxKind::RARROW,
            LogosToken::Range => SyntaxKind::RANGE,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Not => SyntaxKind::NOT,
            LogosToken::Pound => SyntaxKind::POUND,
            LogosToken::At => SyntaxKind::AT,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::GrammarKw => SyntaxKind::GRAMMAR_KW,
            LogosToken::LexerKw => SyntaxKind::LEXER_KW,
            LogosToken::ParserKw => SyntaxKind::PARSER_KW,
            LogosToken::OptionsKw => SyntaxKind::OPTIONS_KW,
            LogosToken::ImportKw => SyntaxKind::IMPORT_KW,
            LogosToken::TokensKw => SyntaxKind::TOKENS_KW,
            LogosToken::ChannelsKw => SyntaxKind::CHANNELS_KW,
            LogosToken::ModeKw => SyntaxKind::MODE_KW,
            LogosToken::FragmentKw => SyntaxKind::FRAGMENT_KW,
            LogosToken::ReturnsKw => SyntaxKind::RETURNS_KW,
            LogosToken::LocalsKw => SyntaxKind::LOCALS_KW,
            LogosToken::ThrowsKw => SyntaxKind::THROWS_KW,
            LogosToken::CatchKw => SyntaxKind::CATCH_KW,
            LogosToken::FinallyKw => SyntaxKind::FINALLY_KW,
        }
    }
}

/// Consume a `{`. For structural specs the single brace is the token;
/// otherwise bump forward to the matching `}`, skipping over strings
/// and comments so embedded braces do not unbalance the block.
fn lex_brace(lex: &mut logos::Lexer<LogosToken>) {
    if lex.extras.structural_brace {
        lex.extras.structural_brace = false;
        return;
    }

    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    i += 1;
                    break;
                }
            }
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    lex.bump(i.min(bytes.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_header_tokens() {
        assert_eq!(
            kinds("lexer grammar MyLexer;"),
            vec![
                SyntaxKind::LEXER_KW,
                SyntaxKind::GRAMMAR_KW,
                SyntaxKind::TOKEN_REF,
                SyntaxKind::SEMICOLON,
            ]
        );
    }

    #[test]
    fn test_refs_classified_by_case() {
        assert_eq!(
            kinds("expr ID"),
            vec![SyntaxKind::RULE_REF, SyntaxKind::TOKEN_REF]
        );
    }

    #[test]
    fn test_action_block_is_one_token() {
        let toks = tokenize("r : 'a' { foo(\"}\"); if (x) { y(); } } ;");
        let action: Vec<_> = toks
            .iter()
            .filter(|t| t.kind == SyntaxKind::ACTION_BLOCK)
            .collect();
        assert_eq!(action.len(), 1);
        assert_eq!(action[0].text, "{ foo(\"}\"); if (x) { y(); } }");
    }

    #[test]
    fn test_tokens_spec_brace_stays_structural() {
        assert_eq!(
            kinds("tokens { A, B }"),
            vec![
                SyntaxKind::TOKENS_KW,
                SyntaxKind::L_BRACE,
                SyntaxKind::TOKEN_REF,
                SyntaxKind::COMMA,
                SyntaxKind::TOKEN_REF,
                SyntaxKind::R_BRACE,
            ]
        );
    }

    #[test]
    fn test_char_set_and_range() {
        assert_eq!(
            kinds(r"[a-z\]] 'a'..'z' ."),
            vec![
                SyntaxKind::CHAR_SET,
                SyntaxKind::STRING_LIT,
                SyntaxKind::RANGE,
                SyntaxKind::STRING_LIT,
                SyntaxKind::DOT,
            ]
        );
    }

    #[test]
    fn test_unknown_input_is_error() {
        assert_eq!(kinds("r § ;")[1], SyntaxKind::ERROR);
    }

    #[test]
    fn test_offsets_are_cumulative() {
        let toks = tokenize("ab cd");
        assert_eq!(toks[0].offset, TextSize::new(0));
        assert_eq!(toks[1].offset, TextSize::new(2));
        assert_eq!(toks[2].offset, TextSize::new(3));
    }
}
