//! End-to-end interpreter tests: test-input validation and sentence
//! generation over hand-built automaton data, the way a loader would
//! provide it for `grammar T; r: 'a' 'b';`.

#![allow(clippy::unwrap_used)]

use gramlab::atn::{
    AtnStateKind, AutomatonBuilder, InterpreterData, TransitionKind, Vocabulary,
};
use gramlab::interp::{
    GenerationOptions, InertEvaluator, SentenceGenerator, run_test_input,
};
use once_cell::sync::Lazy;

const A: i32 = 1;
const B: i32 = 2;

static LEXER_DATA: Lazy<InterpreterData> = Lazy::new(build_lexer_data);
static PARSER_DATA: Lazy<InterpreterData> = Lazy::new(build_parser_data);

/// Lexer pole: A: 'a'; B: 'b';
fn build_lexer_data() -> InterpreterData {
    let mut builder = AutomatonBuilder::new();
    let mut literal_rule = |builder: &mut AutomatonBuilder, rule: usize, c: char| {
        let (start, stop) = builder.add_rule();
        let done = builder.add_state(AtnStateKind::Basic, rule);
        builder.transition(start, done, TransitionKind::Atom(c as i32));
        builder.epsilon(done, stop);
        start
    };
    let a_start = literal_rule(&mut builder, 0, 'a');
    let b_start = literal_rule(&mut builder, 1, 'b');
    let entry = builder.add_state(AtnStateKind::TokensStart, 0);
    builder.epsilon(entry, a_start);
    builder.epsilon(entry, b_start);
    builder.add_mode_start(entry);
    builder.set_token_type(0, A);
    builder.set_token_type(1, B);

    InterpreterData {
        automaton: builder.finish(),
        rule_names: vec!["A".into(), "B".into()],
        vocabulary: vocabulary(),
        channel_names: vec![],
        mode_names: vec!["DEFAULT_MODE".into()],
        predicate_texts: vec![],
    }
}

/// Parser pole: r: 'a' 'b';
fn build_parser_data() -> InterpreterData {
    let mut builder = AutomatonBuilder::new();
    let (start, stop) = builder.add_rule();
    let mid = builder.add_state(AtnStateKind::Basic, 0);
    let done = builder.add_state(AtnStateKind::Basic, 0);
    builder.transition(start, mid, TransitionKind::Atom(A));
    builder.transition(mid, done, TransitionKind::Atom(B));
    builder.epsilon(done, stop);

    InterpreterData {
        automaton: builder.finish(),
        rule_names: vec!["r".into()],
        vocabulary: vocabulary(),
        channel_names: vec![],
        mode_names: vec![],
        predicate_texts: vec![],
    }
}

fn vocabulary() -> Vocabulary {
    let mut vocabulary = Vocabulary::new(
        vec![None, Some("A".into()), Some("B".into())],
        vec![None; 3],
    );
    vocabulary.set_literal(A as usize, "'a'");
    vocabulary.set_literal(B as usize, "'b'");
    vocabulary
}

#[test]
fn test_valid_input_produces_tokens_and_no_errors() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;
    let result = run_test_input("ab", "r", Some(parser), Some(lexer), &InertEvaluator);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    // Two real tokens plus EOF
    assert_eq!(result.tokens.len(), 3, "{:?}", result.tokens);
    assert!(result.tokens[0].contains("'a'"), "{}", result.tokens[0]);
    assert!(result.tokens[1].contains("'b'"), "{}", result.tokens[1]);
    assert!(result.tokens[2].contains("<EOF>"), "{}", result.tokens[2]);
}

#[test]
fn test_invalid_input_reports_parse_error() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;
    let result = run_test_input("ba", "r", Some(parser), Some(lexer), &InertEvaluator);
    assert!(result.has_errors());
}

#[test]
fn test_unlexable_input_reports_recognition_error() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;
    let result = run_test_input("a!b", "r", Some(parser), Some(lexer), &InertEvaluator);
    assert!(result.errors.iter().any(|e| e.contains("token recognition error")));
}

#[test]
fn test_missing_data_degrades_to_placeholders() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;

    let result = run_test_input("ab", "r", None, Some(lexer), &InertEvaluator);
    assert_eq!(result.errors, ["no grammar data available"]);

    let result = run_test_input("ab", "r", Some(parser), None, &InertEvaluator);
    assert_eq!(result.errors, ["no lexer data available"]);

    let result = run_test_input("ab", "A", Some(parser), None, &InertEvaluator);
    assert_eq!(result.errors, ["no lexer data available"]);
}

#[test]
fn test_unknown_rules_report_placeholders() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;

    let result = run_test_input("ab", "nope", Some(parser), Some(lexer), &InertEvaluator);
    assert_eq!(result.errors, ["undefined rule"]);

    // EOF is a token without a lexer rule behind it
    let result = run_test_input("ab", "EOF", Some(parser), Some(lexer), &InertEvaluator);
    assert_eq!(result.errors, ["virtual or undefined token"]);
}

#[test]
fn test_lexer_rule_request_tokenizes_only() {
    let lexer = &*LEXER_DATA;
    let result = run_test_input("ab", "A", None, Some(lexer), &InertEvaluator);
    assert!(result.errors.is_empty());
    assert_eq!(result.tokens.len(), 3);
}

#[test]
fn test_sentence_generation_matches_grammar() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;
    let options = GenerationOptions {
        seed: Some(99),
        ..GenerationOptions::default()
    };
    let mut generator = SentenceGenerator::new(Some(parser), Some(lexer), options);
    for sentence in generator.generate_many("r", 5) {
        assert_eq!(sentence, "a b");
    }
}

#[test]
fn test_generated_sentences_parse_back() {
    let parser = &*PARSER_DATA;
    let lexer = &*LEXER_DATA;
    let options = GenerationOptions {
        seed: Some(7),
        ..GenerationOptions::default()
    };
    let mut generator = SentenceGenerator::new(Some(parser), Some(lexer), options);
    let sentence = generator.generate("r").unwrap().replace(' ', "");
    let result = run_test_input(&sentence, "r", Some(parser), Some(lexer), &InertEvaluator);
    assert!(result.errors.is_empty(), "{sentence}: {:?}", result.errors);
}
