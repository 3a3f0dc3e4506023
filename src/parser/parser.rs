//! Recursive descent parser for grammar definition files
//!
//! Builds a rowan GreenNode tree from tokens. Two strategies share
//! every production: [`ParseMode::FailFast`] bails out at the first
//! hard mismatch (the cheap prediction pass), [`ParseMode::Recovering`]
//! recovers at synchronization points and always yields a tree. Both
//! accept the same language; only the error path differs.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder};
use text_size::{TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Strategy selection for one parse attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Bail out on the first hard mismatch
    FailFast,
    /// Recover at synchronization points, always produce a tree
    Recovering,
}

/// Signal that the fail-fast strategy hit a mismatch and the caller
/// should rewind and reparse with [`ParseMode::Recovering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionAbort;

/// Parse grammar source, retrying once with the recovering strategy.
///
/// The fail-fast attempt is the common, cheap path; its abort is a
/// deterministic rewind-and-reparse, not control flow by exception.
pub fn parse(input: &str) -> Parse {
    match parse_with_mode(input, ParseMode::FailFast) {
        Ok(parse) => parse,
        Err(PredictionAbort) => parse_with_mode(input, ParseMode::Recovering)
            .unwrap_or_else(|_| unreachable!("recovering parse never aborts")),
    }
}

/// Parse with an explicit strategy. Only [`ParseMode::FailFast`]
/// can return `Err`.
pub fn parse_with_mode(input: &str, mode: ParseMode) -> Result<Parse, PredictionAbort> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, mode);
    parser.parse_grammar_file();
    parser.finish()
}

/// Tokens that resynchronize the recovering strategy
const RECOVERY_SET: &[SyntaxKind] = &[
    SyntaxKind::SEMICOLON,
    SyntaxKind::MODE_KW,
    SyntaxKind::FRAGMENT_KW,
    SyntaxKind::R_BRACE,
];

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    mode: ParseMode,
    aborted: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], mode: ParseMode) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            mode,
            aborted: false,
        }
    }

    fn finish(self) -> Result<Parse, PredictionAbort> {
        if self.aborted {
            return Err(PredictionAbort);
        }
        Ok(Parse {
            green: self.builder.finish(),
            errors: self.errors,
        })
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Look ahead n non-trivia tokens (0 = current)
    fn nth(&self, n: usize) -> SyntaxKind {
        let mut idx = self.pos;
        let mut count = 0;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return self.tokens[idx].kind;
                }
                count += 1;
            }
            idx += 1;
        }
        SyntaxKind::ERROR
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!(
                "expected {:?}, found {:?}",
                kind,
                self.current_kind()
            ));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().map(|t| t.kind.is_trivia()).unwrap_or(false) {
            self.bump();
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            });
        self.errors.push(SyntaxError::new(message, range));
        if self.mode == ParseMode::FailFast {
            self.aborted = true;
        }
    }

    /// Report an error and, in recovering mode, swallow tokens into an
    /// ERROR node until a synchronization point.
    fn error_recover(&mut self, message: impl Into<String>) {
        self.error(message);
        if self.aborted {
            return;
        }
        self.builder.start_node(SyntaxKind::ERROR.into());
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(RECOVERY_SET) {
            self.bump();
            consumed = true;
        }
        // Always make progress, otherwise the outer loop spins
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Grammar productions
    // =========================================================================

    /// GrammarFile = GrammarHeader Prequel* (RuleDecl | ModeDecl)*
    fn parse_grammar_file(&mut self) {
        self.start_node(SyntaxKind::GRAMMAR_FILE);
        self.skip_trivia();

        if self.at_any(&[
            SyntaxKind::GRAMMAR_KW,
            SyntaxKind::LEXER_KW,
            SyntaxKind::PARSER_KW,
        ]) {
            self.parse_grammar_header();
        } else if !self.at_eof() {
            self.error_recover("expected grammar declaration");
        }

        while !self.at_eof() && !self.aborted {
            let pos_before = self.pos;
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            match self.current_kind() {
                SyntaxKind::OPTIONS_KW => self.parse_options_spec(),
                SyntaxKind::IMPORT_KW => self.parse_import_decl(),
                SyntaxKind::TOKENS_KW => self.parse_tokens_spec(SyntaxKind::TOKENS_SPEC),
                SyntaxKind::CHANNELS_KW => self.parse_tokens_spec(SyntaxKind::CHANNELS_SPEC),
                SyntaxKind::AT => self.parse_named_action(),
                SyntaxKind::MODE_KW => self.parse_mode_decl(),
                SyntaxKind::FRAGMENT_KW | SyntaxKind::TOKEN_REF | SyntaxKind::RULE_REF => {
                    self.parse_rule_decl()
                }
                _ => self.error_recover(format!(
                    "unexpected {:?} at grammar level",
                    self.current_kind()
                )),
            }
            // Safety net against a stuck recovering parse
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }

        self.finish_node();
    }

    /// GrammarHeader = ('lexer' | 'parser')? 'grammar' Identifier ';'
    fn parse_grammar_header(&mut self) {
        self.start_node(SyntaxKind::GRAMMAR_HEADER);
        if self.at(SyntaxKind::LEXER_KW) || self.at(SyntaxKind::PARSER_KW) {
            self.bump();
            self.skip_trivia();
        }
        self.expect(SyntaxKind::GRAMMAR_KW);
        self.skip_trivia();
        if self.current_kind().is_identifier() {
            self.bump();
        } else {
            self.error("expected grammar name");
        }
        self.skip_trivia();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// OptionsSpec = 'options' '{' (Option ';')* '}'
    fn parse_options_spec(&mut self) {
        self.start_node(SyntaxKind::OPTIONS_SPEC);
        self.bump(); // options
        self.skip_trivia();
        self.expect(SyntaxKind::L_BRACE);
        self.skip_trivia();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            if self.current_kind().is_identifier() {
                self.start_node(SyntaxKind::OPTION_DECL);
                self.bump();
                self.skip_trivia();
                if self.eat(SyntaxKind::ASSIGN) {
                    self.skip_trivia();
                    // Option values: identifier, literal, int, dotted path
                    while self.at_any(&[
                        SyntaxKind::TOKEN_REF,
                        SyntaxKind::RULE_REF,
                        SyntaxKind::STRING_LIT,
                        SyntaxKind::INT,
                        SyntaxKind::DOT,
                    ]) {
                        self.bump();
                    }
                }
                self.skip_trivia();
                self.eat(SyntaxKind::SEMICOLON);
                self.finish_node();
            } else {
                self.error_recover("expected option name");
                if self.at(SyntaxKind::SEMICOLON) {
                    self.bump();
                }
            }
            self.skip_trivia();
            if self.aborted {
                break;
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// ImportDecl = 'import' Identifier (',' Identifier)* ';'
    fn parse_import_decl(&mut self) {
        self.start_node(SyntaxKind::IMPORT_DECL);
        self.bump(); // import
        self.skip_trivia();
        loop {
            if self.current_kind().is_identifier() {
                self.bump();
            } else {
                self.error("expected imported grammar name");
                break;
            }
            self.skip_trivia();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
            self.skip_trivia();
        }
        self.skip_trivia();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// TokensSpec = ('tokens' | 'channels') '{' Identifier (',' Identifier)* ','? '}'
    fn parse_tokens_spec(&mut self, node: SyntaxKind) {
        self.start_node(node);
        self.bump(); // tokens / channels
        self.skip_trivia();
        self.expect(SyntaxKind::L_BRACE);
        self.skip_trivia();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            if self.current_kind().is_identifier() {
                self.bump();
            } else {
                self.error(format!("expected name, found {:?}", self.current_kind()));
                if self.aborted {
                    break;
                }
                self.bump();
            }
            self.skip_trivia();
            self.eat(SyntaxKind::COMMA);
            self.skip_trivia();
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// NamedAction = '@' ActionScope ('::' Identifier)? ActionBlock
    ///
    /// The scope position also accepts the `lexer`/`parser` keywords
    /// (`@lexer::members`, `@parser::header`).
    fn parse_named_action(&mut self) {
        self.start_node(SyntaxKind::NAMED_ACTION);
        self.bump(); // @
        self.skip_trivia();
        if self.current_kind().is_identifier()
            || self.at(SyntaxKind::LEXER_KW)
            || self.at(SyntaxKind::PARSER_KW)
        {
            self.bump();
        } else {
            self.error("expected action name");
        }
        self.skip_trivia();
        if self.eat(SyntaxKind::COLON_COLON) {
            self.skip_trivia();
            if self.current_kind().is_identifier() {
                self.bump();
            } else {
                self.error("expected action name after '::'");
            }
        }
        self.skip_trivia();
        self.expect(SyntaxKind::ACTION_BLOCK);
        self.finish_node();
    }

    /// ModeDecl = 'mode' Identifier ';'
    fn parse_mode_decl(&mut self) {
        self.start_node(SyntaxKind::MODE_DECL);
        self.bump(); // mode
        self.skip_trivia();
        if self.current_kind().is_identifier() {
            self.bump();
        } else {
            self.error("expected mode name");
        }
        self.skip_trivia();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// RuleDecl = 'fragment'? Identifier RulePrelude? ':' AltList ';' ExceptionHandler*
    fn parse_rule_decl(&mut self) {
        self.start_node(SyntaxKind::RULE_DECL);
        self.eat(SyntaxKind::FRAGMENT_KW);
        self.skip_trivia();
        if self.current_kind().is_identifier() {
            self.bump();
        } else {
            self.error("expected rule name");
        }
        self.skip_trivia();
        self.parse_rule_prelude();
        if !self.expect(SyntaxKind::COLON) {
            if !self.aborted {
                self.error_recover("rule has no body");
                self.eat(SyntaxKind::SEMICOLON);
            }
            self.finish_node();
            return;
        }
        self.skip_trivia();
        self.parse_alt_list(SyntaxKind::SEMICOLON);
        self.expect(SyntaxKind::SEMICOLON);
        self.skip_trivia();
        while self.at(SyntaxKind::CATCH_KW) || self.at(SyntaxKind::FINALLY_KW) {
            self.parse_exception_handler();
            self.skip_trivia();
        }
        self.finish_node();
    }

    /// Everything between the rule name and the colon: arguments,
    /// return/locals clauses, throws lists, rule-level options and
    /// actions. Kept as a tolerant blob, the analyzer does not look
    /// inside.
    fn parse_rule_prelude(&mut self) {
        if !self.at_any(&[
            SyntaxKind::CHAR_SET,
            SyntaxKind::RETURNS_KW,
            SyntaxKind::LOCALS_KW,
            SyntaxKind::THROWS_KW,
            SyntaxKind::OPTIONS_KW,
            SyntaxKind::AT,
        ]) {
            return;
        }
        self.start_node(SyntaxKind::RULE_PRELUDE);
        loop {
            self.skip_trivia();
            match self.current_kind() {
                SyntaxKind::CHAR_SET => self.bump(),
                SyntaxKind::RETURNS_KW | SyntaxKind::LOCALS_KW => {
                    self.bump();
                    self.skip_trivia();
                    self.expect(SyntaxKind::CHAR_SET);
                }
                SyntaxKind::THROWS_KW => {
                    self.bump();
                    self.skip_trivia();
                    while self.current_kind().is_identifier() {
                        self.bump();
                        self.skip_trivia();
                        if !self.eat(SyntaxKind::COMMA) {
                            break;
                        }
                        self.skip_trivia();
                    }
                }
                SyntaxKind::OPTIONS_KW => self.parse_options_spec(),
                SyntaxKind::AT => self.parse_named_action(),
                _ => break,
            }
            if self.aborted {
                break;
            }
        }
        self.finish_node();
    }

    /// ExceptionHandler = 'catch' ArgBlock ActionBlock | 'finally' ActionBlock
    fn parse_exception_handler(&mut self) {
        self.start_node(SyntaxKind::EXCEPTION_HANDLER);
        if self.eat(SyntaxKind::CATCH_KW) {
            self.skip_trivia();
            self.expect(SyntaxKind::CHAR_SET);
        } else {
            self.bump(); // finally
        }
        self.skip_trivia();
        self.expect(SyntaxKind::ACTION_BLOCK);
        self.finish_node();
    }

    /// AltList = Alternative ('|' Alternative)*
    fn parse_alt_list(&mut self, terminator: SyntaxKind) {
        self.start_node(SyntaxKind::ALT_LIST);
        self.parse_alternative(terminator);
        self.skip_trivia();
        while self.eat(SyntaxKind::PIPE) && !self.aborted {
            self.skip_trivia();
            self.parse_alternative(terminator);
            self.skip_trivia();
        }
        self.finish_node();
    }

    /// Alternative = Element* ('#' Identifier)? ('->' LexerCommands)?
    fn parse_alternative(&mut self, terminator: SyntaxKind) {
        self.start_node(SyntaxKind::ALTERNATIVE);
        loop {
            self.skip_trivia();
            if self.aborted
                || self.at_eof()
                || self.at(terminator)
                || self.at(SyntaxKind::PIPE)
                || self.at(SyntaxKind::SEMICOLON)
            {
                break;
            }
            match self.current_kind() {
                SyntaxKind::POUND => {
                    self.start_node(SyntaxKind::ALT_LABEL);
                    self.bump();
                    self.skip_trivia();
                    if self.current_kind().is_identifier() {
                        self.bump();
                    } else {
                        self.error("expected alternative label");
                    }
                    self.finish_node();
                }
                SyntaxKind::RARROW => {
                    self.parse_lexer_commands();
                }
                _ => {
                    if !self.parse_element() {
                        break;
                    }
                }
            }
        }
        self.finish_node();
    }

    /// Element = (label ('=' | '+='))? Atom Suffix? | ActionBlock '?'?
    ///
    /// Returns false when the current token cannot start an element.
    fn parse_element(&mut self) -> bool {
        // Label prefix: `x=atom` or `x+=atom`
        let labeled = self.current_kind().is_identifier()
            && matches!(self.nth(1), SyntaxKind::ASSIGN | SyntaxKind::PLUS_ASSIGN);

        match self.current_kind() {
            SyntaxKind::TOKEN_REF
            | SyntaxKind::RULE_REF
            | SyntaxKind::STRING_LIT
            | SyntaxKind::CHAR_SET
            | SyntaxKind::DOT
            | SyntaxKind::NOT
            | SyntaxKind::L_PAREN
            | SyntaxKind::ACTION_BLOCK => {}
            _ => {
                self.error_recover(format!(
                    "unexpected {:?} in rule body",
                    self.current_kind()
                ));
                return false;
            }
        }

        self.start_node(SyntaxKind::ELEMENT);
        if labeled {
            self.bump(); // label
            self.skip_trivia();
            self.bump(); // = or +=
            self.skip_trivia();
        }
        match self.current_kind() {
            SyntaxKind::ACTION_BLOCK => {
                self.bump();
                self.skip_trivia();
                // `{...}?` is a semantic predicate
                self.eat(SyntaxKind::QUESTION);
                self.finish_node();
                return true;
            }
            SyntaxKind::NOT => {
                self.start_node(SyntaxKind::NOT_SET);
                self.bump();
                self.skip_trivia();
                match self.current_kind() {
                    SyntaxKind::TOKEN_REF | SyntaxKind::STRING_LIT | SyntaxKind::CHAR_SET => {
                        self.bump()
                    }
                    SyntaxKind::L_PAREN => self.parse_block(),
                    _ => self.error("expected set after '~'"),
                }
                self.finish_node();
            }
            SyntaxKind::L_PAREN => self.parse_block(),
            SyntaxKind::STRING_LIT if self.nth(1) == SyntaxKind::RANGE => {
                self.start_node(SyntaxKind::RANGE_EXPR);
                self.bump(); // 'a'
                self.skip_trivia();
                self.bump(); // ..
                self.skip_trivia();
                self.expect(SyntaxKind::STRING_LIT);
                self.finish_node();
            }
            SyntaxKind::TOKEN_REF
            | SyntaxKind::RULE_REF
            | SyntaxKind::STRING_LIT
            | SyntaxKind::CHAR_SET
            | SyntaxKind::DOT => {
                self.bump();
            }
            // Only reachable through a label prefix with a missing atom
            _ => self.error(format!(
                "expected element after label, found {:?}",
                self.current_kind()
            )),
        }
        self.skip_trivia();
        self.parse_element_options();
        // EBNF suffix with optional non-greedy marker
        if self.at_any(&[SyntaxKind::QUESTION, SyntaxKind::STAR, SyntaxKind::PLUS]) {
            self.bump();
            self.eat(SyntaxKind::QUESTION);
        }
        self.finish_node();
        true
    }

    /// Block = '(' AltList ')'
    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::BLOCK);
        self.bump(); // (
        self.skip_trivia();
        self.parse_alt_list(SyntaxKind::R_PAREN);
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// ElementOptions = '<' option (',' option)* '>'
    fn parse_element_options(&mut self) {
        if !self.at(SyntaxKind::LT) {
            return;
        }
        self.start_node(SyntaxKind::ELEMENT_OPTIONS);
        self.bump();
        while !self.at_eof() && !self.at(SyntaxKind::GT) && !self.at(SyntaxKind::SEMICOLON) {
            self.bump();
        }
        self.expect(SyntaxKind::GT);
        self.finish_node();
    }

    /// LexerCommands = '->' Command (',' Command)*
    /// Command = name ('(' (name | INT) ')')?
    ///
    /// `mode` and `channel` lex as keywords but are valid command names.
    fn parse_lexer_commands(&mut self) {
        self.start_node(SyntaxKind::LEXER_COMMANDS);
        self.bump(); // ->
        self.skip_trivia();
        loop {
            self.start_node(SyntaxKind::LEXER_COMMAND);
            if self.current_kind().is_identifier()
                || self.at(SyntaxKind::MODE_KW)
                || self.at(SyntaxKind::CHANNELS_KW)
            {
                self.bump();
                self.skip_trivia();
                if self.eat(SyntaxKind::L_PAREN) {
                    self.skip_trivia();
                    if self.current_kind().is_identifier() || self.at(SyntaxKind::INT) {
                        self.bump();
                    } else {
                        self.error("expected lexer command argument");
                    }
                    self.skip_trivia();
                    self.expect(SyntaxKind::R_PAREN);
                }
            } else {
                self.error("expected lexer command");
            }
            self.finish_node();
            self.skip_trivia();
            if self.aborted || !self.eat(SyntaxKind::COMMA) {
                break;
            }
            self.skip_trivia();
        }
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_grammar() {
        let parse = parse("grammar T;\nr: 'a' 'b' ;\n");
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        let root = parse.syntax();
        assert_eq!(root.kind(), SyntaxKind::GRAMMAR_FILE);
    }

    #[test]
    fn test_parse_preserves_all_text() {
        let text = "grammar T; // comment\nr: A | b c? ;\nA: [a-z]+ -> skip;\n";
        let parse = parse(text);
        assert_eq!(parse.syntax().text().to_string(), text);
    }

    #[test]
    fn test_fail_fast_aborts_on_error() {
        let result = parse_with_mode("grammar T; r: ) ;", ParseMode::FailFast);
        assert_eq!(result.unwrap_err(), PredictionAbort);
    }

    #[test]
    fn test_recovering_always_yields_tree() {
        let parse = parse_with_mode("grammar T; r: ) ; s: 'x';", ParseMode::Recovering)
            .expect("recovering mode cannot abort");
        assert!(!parse.errors.is_empty());
        // The rule after the error still parses
        let rules: Vec<_> = parse
            .syntax()
            .children()
            .filter(|n| n.kind() == SyntaxKind::RULE_DECL)
            .collect();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_both_strategies_accept_same_language() {
        let text = "grammar T;\nexpr: expr '*' expr # Mult | INT # Lit ;\nINT: [0-9]+;\n";
        let fast = parse_with_mode(text, ParseMode::FailFast).expect("fast parse");
        let general =
            parse_with_mode(text, ParseMode::Recovering).expect("recovering parse");
        assert_eq!(fast.green, general.green);
        assert!(fast.ok() && general.ok());
    }

    #[test]
    fn test_parse_lexer_grammar_with_modes() {
        let text = "lexer grammar L;\nSTART: '<' -> pushMode(INSIDE);\nmode INSIDE;\nEND: '>' -> popMode;\n";
        let parse = parse(text);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        let modes: Vec<_> = parse
            .syntax()
            .children()
            .filter(|n| n.kind() == SyntaxKind::MODE_DECL)
            .collect();
        assert_eq!(modes.len(), 1);
    }

    #[test]
    fn test_parse_prequel_sections() {
        let text = "grammar T;\noptions { tokenVocab = MyLexer; }\nimport Common, Extra;\ntokens { VIRT }\nchannels { COMMENTS }\n@parser::members { int i = 0; }\nr: VIRT;\n";
        let parse = parse(text);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    }

    #[test]
    fn test_parse_predicate_and_action() {
        let text = "grammar T;\nr: {p1}? 'a' {act();} ;\n";
        let parse = parse(text);
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    }
}
