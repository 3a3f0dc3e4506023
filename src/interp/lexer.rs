//! Lexer interpretation: maximal-munch NFA simulation over the lexer
//! automaton.
//!
//! Each token attempt runs an epsilon-closure/consume loop from the
//! current mode's entry state, remembering the last accepting
//! configuration. Ties at equal length go to the lowest rule index,
//! matching declaration order.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::atn::{InterpreterData, LexerAction, StateId, TransitionKind};

use super::predicate::{PredicateContext, PredicateEvaluator};

/// Token type of the synthesized end-of-input token
pub const EOF_TOKEN: i32 = -1;

/// One token produced by interpretation. Offsets are character
/// indices into the test input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    pub token_type: i32,
    pub text: SmolStr,
    pub start: usize,
    pub end: usize,
    pub channel: i32,
    /// Lexer rule that accepted; `None` for the EOF token
    pub rule: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub offset: usize,
    pub message: String,
}

/// NFA configuration: a state plus the return stack of pending
/// fragment-rule calls.
type Config = (StateId, Vec<StateId>);

pub struct LexerInterpreter<'a> {
    data: &'a InterpreterData,
    evaluator: &'a dyn PredicateEvaluator,
}

impl<'a> LexerInterpreter<'a> {
    pub fn new(data: &'a InterpreterData, evaluator: &'a dyn PredicateEvaluator) -> Self {
        Self { data, evaluator }
    }

    /// Tokenize the whole input, collecting recognition errors along
    /// the way. Always terminates: an unmatchable character produces
    /// one error and advances by one.
    pub fn tokenize(&self, input: &str) -> (Vec<LexToken>, Vec<LexError>) {
        let chars: Vec<char> = input.chars().collect();
        let automaton = &self.data.automaton;
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        let mut mode = 0usize;
        let mut mode_stack: Vec<usize> = Vec::new();
        let mut more_start: Option<usize> = None;
        let mut pos = 0usize;

        while pos < chars.len() {
            let start = more_start.take().unwrap_or(pos);
            let matched = self.match_token(&chars, pos, mode);
            let Some((rule, end)) = matched.filter(|&(_, end)| end > pos) else {
                errors.push(LexError {
                    offset: pos,
                    message: format!("token recognition error at: '{}'", chars[pos]),
                });
                pos += 1;
                continue;
            };
            pos = end;

            let mut token_type = automaton
                .rule_to_token_type
                .get(rule)
                .copied()
                .unwrap_or(EOF_TOKEN);
            let mut channel = 0i32;
            let mut skip = false;
            let mut more = false;
            for action in automaton
                .rule_actions
                .get(rule)
                .map(Vec::as_slice)
                .unwrap_or_default()
            {
                match *action {
                    LexerAction::Skip => skip = true,
                    LexerAction::More => more = true,
                    LexerAction::Type(t) => token_type = t,
                    LexerAction::Channel(c) => channel = c,
                    LexerAction::Mode(m) => mode = m,
                    LexerAction::PushMode(m) => {
                        mode_stack.push(mode);
                        mode = m;
                    }
                    LexerAction::PopMode => {
                        if let Some(previous) = mode_stack.pop() {
                            mode = previous;
                        }
                    }
                }
            }
            if more {
                more_start = Some(start);
                continue;
            }
            if skip {
                continue;
            }
            tokens.push(LexToken {
                token_type,
                text: chars[start..end].iter().collect::<String>().into(),
                start,
                end,
                channel,
                rule: Some(rule),
            });
        }

        tokens.push(LexToken {
            token_type: EOF_TOKEN,
            text: SmolStr::new("<EOF>"),
            start: pos,
            end: pos,
            channel: 0,
            rule: None,
        });
        (tokens, errors)
    }

    /// Longest match from `start` in `mode`: `(rule, end)` of the last
    /// accepting configuration, lowest rule index on ties.
    fn match_token(&self, chars: &[char], start: usize, mode: usize) -> Option<(usize, usize)> {
        let automaton = &self.data.automaton;
        let entry = automaton
            .mode_start
            .get(mode)
            .or_else(|| automaton.mode_start.first())
            .copied()?;

        let mut best: Option<(usize, usize)> = None;
        let mut current = self.closure(vec![(entry, Vec::new())], start, &mut best);
        let mut pos = start;

        while pos < chars.len() && !current.is_empty() {
            let symbol = chars[pos] as i32;
            let mut moved: Vec<Config> = Vec::new();
            for (state, stack) in &current {
                for transition in &automaton.state(*state).transitions {
                    if consumes(&transition.kind, symbol) {
                        moved.push((transition.target, stack.clone()));
                    }
                }
            }
            pos += 1;
            current = self.closure(moved, pos, &mut best);
        }
        best
    }

    /// Epsilon closure over a configuration set; accepting
    /// configurations (rule stop, empty stack) update `best`.
    fn closure(&self, seed: Vec<Config>, pos: usize, best: &mut Option<(usize, usize)>) -> Vec<Config> {
        let automaton = &self.data.automaton;
        let mut out: Vec<Config> = Vec::new();
        let mut visited: FxHashSet<Config> = FxHashSet::default();
        let mut work = seed;

        while let Some((state_id, stack)) = work.pop() {
            if !visited.insert((state_id, stack.clone())) {
                continue;
            }
            let state = automaton.state(state_id);
            if automaton.is_stop_state(state_id) {
                if let Some((&ret, rest)) = stack.split_last() {
                    work.push((ret, rest.to_vec()));
                } else {
                    record_accept(best, state.rule, pos);
                }
                continue;
            }
            for transition in &state.transitions {
                match &transition.kind {
                    TransitionKind::Epsilon | TransitionKind::Action { .. } => {
                        work.push((transition.target, stack.clone()));
                    }
                    TransitionKind::Rule { rule, follow } => {
                        // A rule transition enters the callee's start
                        // state; `target` is bookkeeping only.
                        let mut pushed = stack.clone();
                        pushed.push(*follow);
                        work.push((automaton.rule_start[*rule], pushed));
                    }
                    TransitionKind::PrecedencePredicate { .. } => {
                        work.push((transition.target, stack.clone()));
                    }
                    TransitionKind::Predicate { rule, index } => {
                        if self.predicate_passes(*rule, *index, pos) {
                            work.push((transition.target, stack.clone()));
                        }
                    }
                    _ => {}
                }
            }
            out.push((state_id, stack));
        }
        out
    }

    fn predicate_passes(&self, rule: usize, index: usize, pos: usize) -> bool {
        let text = self
            .data
            .predicate_texts
            .get(index)
            .map(SmolStr::to_string)
            .unwrap_or_else(|| format!("{rule}:{index}"));
        let ctx = PredicateContext {
            rule_name: self.data.rule_names.get(rule).cloned(),
            offset: pos,
        };
        self.evaluator.evaluate(&text, &ctx).unwrap_or(false)
    }
}

fn record_accept(best: &mut Option<(usize, usize)>, rule: usize, end: usize) {
    let better = match best {
        None => true,
        Some((best_rule, best_end)) => end > *best_end || (end == *best_end && rule < *best_rule),
    };
    if better {
        *best = Some((rule, end));
    }
}

fn consumes(kind: &TransitionKind, symbol: i32) -> bool {
    match kind {
        TransitionKind::Atom(value) => *value == symbol,
        TransitionKind::Range(low, high) => (*low..=*high).contains(&symbol),
        TransitionKind::Set(set) => set.contains(symbol),
        TransitionKind::NotSet(set) => !set.contains(symbol),
        TransitionKind::Wildcard => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::atn::{AtnStateKind, AutomatonBuilder, IntervalSet, Vocabulary};
    use crate::interp::predicate::InertEvaluator;

    /// ID: [a-z]+ ; NUM: [0-9]+ ; WS: ' ' -> skip
    fn letters_data() -> InterpreterData {
        let mut builder = AutomatonBuilder::new();
        let mut rule_loop = |builder: &mut AutomatonBuilder, rule: usize, low: char, high: char| {
            let (start, stop) = builder.add_rule();
            let body = builder.add_state(AtnStateKind::Basic, rule);
            let after = builder.add_state(AtnStateKind::Basic, rule);
            builder.epsilon(start, body);
            builder.transition(body, after, TransitionKind::Range(low as i32, high as i32));
            builder.epsilon(after, body);
            builder.epsilon(after, stop);
            start
        };
        let id_start = rule_loop(&mut builder, 0, 'a', 'z');
        let num_start = rule_loop(&mut builder, 1, '0', '9');
        let (ws_start, ws_stop) = builder.add_rule();
        let ws_body = builder.add_state(AtnStateKind::Basic, 2);
        builder.transition(ws_start, ws_body, TransitionKind::Atom(' ' as i32));
        builder.epsilon(ws_body, ws_stop);

        let entry = builder.add_state(AtnStateKind::TokensStart, 0);
        builder.epsilon(entry, id_start);
        builder.epsilon(entry, num_start);
        builder.epsilon(entry, ws_start);
        builder.add_mode_start(entry);
        builder.set_token_type(0, 1);
        builder.set_token_type(1, 2);
        builder.set_token_type(2, 3);
        builder.add_rule_action(2, LexerAction::Skip);

        InterpreterData {
            automaton: builder.finish(),
            rule_names: vec!["ID".into(), "NUM".into(), "WS".into()],
            vocabulary: Vocabulary::new(
                vec![None, Some("ID".into()), Some("NUM".into()), Some("WS".into())],
                vec![None; 4],
            ),
            channel_names: vec![],
            mode_names: vec!["DEFAULT_MODE".into()],
            predicate_texts: vec![],
        }
    }

    #[test]
    fn test_maximal_munch_and_skip() {
        let data = letters_data();
        let interp = LexerInterpreter::new(&data, &InertEvaluator);
        let (tokens, errors) = interp.tokenize("abc 42");
        assert!(errors.is_empty());
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["abc", "42", "<EOF>"]);
        assert_eq!(tokens[0].token_type, 1);
        assert_eq!(tokens[1].token_type, 2);
    }

    #[test]
    fn test_recognition_error_advances() {
        let data = letters_data();
        let interp = LexerInterpreter::new(&data, &InertEvaluator);
        let (tokens, errors) = interp.tokenize("a!b");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].offset, 1);
        assert!(errors[0].message.contains("'!'"));
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "<EOF>"]);
    }

    #[test]
    fn test_tie_goes_to_lowest_rule_index() {
        // Two rules both matching a single 'x'
        let mut builder = AutomatonBuilder::new();
        let mut single = |builder: &mut AutomatonBuilder, rule: usize| {
            let (start, stop) = builder.add_rule();
            let after = builder.add_state(AtnStateKind::Basic, rule);
            builder.transition(start, after, TransitionKind::Atom('x' as i32));
            builder.epsilon(after, stop);
            start
        };
        let first = single(&mut builder, 0);
        let second = single(&mut builder, 1);
        let entry = builder.add_state(AtnStateKind::TokensStart, 0);
        builder.epsilon(entry, first);
        builder.epsilon(entry, second);
        builder.add_mode_start(entry);
        builder.set_token_type(0, 1);
        builder.set_token_type(1, 2);
        let data = InterpreterData {
            automaton: builder.finish(),
            rule_names: vec!["A".into(), "B".into()],
            vocabulary: Vocabulary::default(),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        };
        let (tokens, _) = LexerInterpreter::new(&data, &InertEvaluator).tokenize("x");
        assert_eq!(tokens[0].token_type, 1);
        assert_eq!(tokens[0].rule, Some(0));
    }

    #[test]
    fn test_fragment_call_with_return() {
        // NUM: DIGIT ; fragment DIGIT: [0-9] ;
        let mut builder = AutomatonBuilder::new();
        let (num_start, num_stop) = builder.add_rule();
        let (digit_start, digit_stop) = builder.add_rule();
        let after_call = builder.add_state(AtnStateKind::Basic, 0);
        builder.transition(
            num_start,
            after_call,
            TransitionKind::Rule { rule: 1, follow: after_call },
        );
        builder.epsilon(after_call, num_stop);
        let digit_done = builder.add_state(AtnStateKind::Basic, 1);
        let mut digits = IntervalSet::new();
        digits.add_range('0' as i32, '9' as i32);
        builder.transition(digit_start, digit_done, TransitionKind::Set(digits));
        builder.epsilon(digit_done, digit_stop);
        let entry = builder.add_state(AtnStateKind::TokensStart, 0);
        builder.epsilon(entry, num_start);
        builder.add_mode_start(entry);
        builder.set_token_type(0, 1);
        let data = InterpreterData {
            automaton: builder.finish(),
            rule_names: vec!["NUM".into(), "DIGIT".into()],
            vocabulary: Vocabulary::default(),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        };
        let (tokens, errors) = LexerInterpreter::new(&data, &InertEvaluator).tokenize("7");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].text, "7");
        assert_eq!(tokens[0].rule, Some(0), "token credits the caller, not the fragment");
    }

    #[test]
    fn test_rule_transition_into_callee_consumes() {
        // The code path above also proves the return stack unwinds; here
        // the callee is entered mid-rule and the caller continues after.
        let data = letters_data();
        let interp = LexerInterpreter::new(&data, &InertEvaluator);
        let (tokens, _) = interp.tokenize("ab 7 cd");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["ab", "7", "cd", "<EOF>"]);
    }
}
