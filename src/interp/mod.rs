//! Interpreter engine: runs grammars directly from their automaton
//! data without generating a recognizer.
//!
//! Both interpreters and the sentence generator treat
//! [`InterpreterData`](crate::atn::InterpreterData) as an opaque,
//! immutable input. Predicates are delegated to an injected
//! [`PredicateEvaluator`]; without one, gates simply pass.

mod lexer;
mod parser;
mod predicate;
mod sentence;

pub use lexer::{EOF_TOKEN, LexError, LexToken, LexerInterpreter};
pub use parser::{ParseErrorEntry, ParseOutcome, ParserInterpreter};
pub use predicate::{
    InertEvaluator, MapEvaluator, PredicateContext, PredicateError, PredicateEvaluator,
};
pub use sentence::{
    GenerateError, GenerationOptions, RuleMappings, SentenceGenerator, SplitMix64,
};

use crate::atn::InterpreterData;

/// Outcome of running test input against a rule: token lines plus
/// error lines, both preformatted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestInputResult {
    pub tokens: Vec<String>,
    pub errors: Vec<String>,
}

impl TestInputResult {
    fn message(text: &str) -> Self {
        Self {
            tokens: Vec::new(),
            errors: vec![text.to_string()],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Interpret `input` against `rule_name`.
///
/// The case convention picks the pole: an uppercase initial selects a
/// lexer rule (tokenize only), a lowercase initial a parser rule
/// (tokenize, then parse). Missing data degrades to a descriptive
/// placeholder result instead of an error.
///
/// For split grammars the caller passes the companion context's data
/// as the other pole; combined grammars supply both from one context.
pub fn run_test_input(
    input: &str,
    rule_name: &str,
    parser_data: Option<&InterpreterData>,
    lexer_data: Option<&InterpreterData>,
    evaluator: &dyn PredicateEvaluator,
) -> TestInputResult {
    if rule_name.starts_with(|c: char| c.is_uppercase()) {
        let Some(lexer_data) = lexer_data else {
            return TestInputResult::message("no lexer data available");
        };
        // Tokens declared in a tokens{} block have no rule to run
        if lexer_data.rule_index(rule_name).is_none() {
            return TestInputResult::message("virtual or undefined token");
        }
        let (tokens, errors) = LexerInterpreter::new(lexer_data, evaluator).tokenize(input);
        return TestInputResult {
            tokens: format_tokens(&tokens, lexer_data),
            errors: errors
                .iter()
                .map(|e| format!("{}: {}", e.offset, e.message))
                .collect(),
        };
    }

    let Some(parser_data) = parser_data else {
        return TestInputResult::message("no grammar data available");
    };
    if parser_data.rule_index(rule_name).is_none() {
        return TestInputResult::message("undefined rule");
    }
    let Some(lexer_data) = lexer_data else {
        return TestInputResult::message("no lexer data available");
    };

    let (tokens, lex_errors) = LexerInterpreter::new(lexer_data, evaluator).tokenize(input);
    let outcome = ParserInterpreter::new(parser_data, evaluator).parse(&tokens, rule_name);

    let mut errors: Vec<String> = lex_errors
        .iter()
        .map(|e| format!("{}: {}", e.offset, e.message))
        .collect();
    errors.extend(
        outcome
            .errors
            .iter()
            .map(|e| format!("token {}: {}", e.token_index, e.message)),
    );
    TestInputResult {
        tokens: format_tokens(&tokens, parser_data),
        errors,
    }
}

fn format_tokens(tokens: &[LexToken], data: &InterpreterData) -> Vec<String> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            format!(
                "[@{i},{}:{}='{}',<{}>,channel={}]",
                token.start,
                token.end,
                token.text,
                data.vocabulary.display_name(token.token_type),
                token.channel
            )
        })
        .collect()
}
