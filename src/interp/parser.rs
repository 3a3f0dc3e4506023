//! Parser interpretation: depth-first walk over the parser automaton.
//!
//! Alternatives are tried in declared order with backtracking. A step
//! budget and a call-depth cap bound the search, so pathological or
//! left-recursive grammars fail with a diagnostic instead of hanging.

use crate::atn::{InterpreterData, StateId, TransitionKind};

use super::lexer::{EOF_TOKEN, LexToken};
use super::predicate::{PredicateContext, PredicateEvaluator};

const DEFAULT_STEP_BUDGET: usize = 100_000;
const MAX_CALL_DEPTH: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorEntry {
    /// Index into the on-channel token stream
    pub token_index: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub matched: bool,
    pub errors: Vec<ParseErrorEntry>,
}

pub struct ParserInterpreter<'a> {
    data: &'a InterpreterData,
    evaluator: &'a dyn PredicateEvaluator,
    step_budget: usize,
}

struct Search<'a> {
    interp: &'a ParserInterpreter<'a>,
    tokens: &'a [LexToken],
    steps: usize,
    exhausted: bool,
    /// Furthest token index any path consumed up to, for diagnostics
    furthest: usize,
    /// Deepest position where the start rule completed short of EOF
    best_partial: Option<usize>,
}

impl<'a> ParserInterpreter<'a> {
    pub fn new(data: &'a InterpreterData, evaluator: &'a dyn PredicateEvaluator) -> Self {
        Self {
            data,
            evaluator,
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = budget;
        self
    }

    /// Interpret `tokens` (default channel only, EOF-terminated)
    /// starting at `rule_name`. The whole stream must be consumed.
    pub fn parse(&self, tokens: &[LexToken], rule_name: &str) -> ParseOutcome {
        let Some(rule) = self.data.rule_index(rule_name) else {
            return ParseOutcome {
                matched: false,
                errors: vec![ParseErrorEntry {
                    token_index: 0,
                    message: format!("undefined rule '{rule_name}'"),
                }],
            };
        };
        let owned: Vec<LexToken> = tokens.iter().filter(|t| t.channel == 0).cloned().collect();
        let start = self.data.automaton.rule_start[rule];

        let mut search = Search {
            interp: self,
            tokens: &owned,
            steps: 0,
            exhausted: false,
            furthest: 0,
            best_partial: None,
        };
        let result = search.walk(start, &mut Vec::new(), 0);
        let mut errors = Vec::new();
        if result.is_some() {
            return ParseOutcome { matched: true, errors };
        }
        if search.exhausted {
            errors.push(ParseErrorEntry {
                token_index: search.furthest,
                message: format!(
                    "interpretation of rule '{rule_name}' exceeded the step budget"
                ),
            });
        } else if search.best_partial.is_some_and(|p| p >= search.furthest) {
            // The rule completed but left trailing input, and no path
            // got any deeper: the leftover token is the problem.
            let pos = search.best_partial.unwrap_or(0);
            let text = owned.get(pos).map(|t| t.text.as_str()).unwrap_or("<EOF>");
            errors.push(ParseErrorEntry {
                token_index: pos,
                message: format!("extraneous input '{text}' after rule '{rule_name}'"),
            });
        } else {
            let text = owned
                .get(search.furthest)
                .map(|t| t.text.as_str())
                .unwrap_or("<EOF>");
            errors.push(ParseErrorEntry {
                token_index: search.furthest,
                message: format!("mismatched input '{text}' in rule '{rule_name}'"),
            });
        }
        ParseOutcome { matched: false, errors }
    }
}

impl Search<'_> {
    /// Returns the token position after a successful walk from
    /// `state` to the start rule's stop state, or `None`.
    fn walk(&mut self, state_id: StateId, stack: &mut Vec<StateId>, pos: usize) -> Option<usize> {
        if self.exhausted {
            return None;
        }
        self.steps += 1;
        if self.steps > self.interp.step_budget || stack.len() > MAX_CALL_DEPTH {
            self.exhausted = true;
            return None;
        }

        let automaton = &self.interp.data.automaton;
        if automaton.is_stop_state(state_id) {
            return match stack.pop() {
                Some(follow) => {
                    let result = self.walk(follow, stack, pos);
                    if result.is_none() {
                        // Restore for the caller's next alternative
                        stack.push(follow);
                    }
                    result
                }
                None => {
                    let at_eof = self
                        .tokens
                        .get(pos)
                        .map(|t| t.token_type == EOF_TOKEN)
                        .unwrap_or(true);
                    if at_eof {
                        Some(pos)
                    } else {
                        // Completed short of EOF; keep searching, but
                        // remember the deepest such end for diagnostics
                        self.best_partial =
                            Some(self.best_partial.map_or(pos, |best| best.max(pos)));
                        None
                    }
                }
            };
        }

        let transitions = automaton.state(state_id).transitions.clone();
        for transition in &transitions {
            let result = match &transition.kind {
                TransitionKind::Epsilon
                | TransitionKind::Action { .. }
                | TransitionKind::PrecedencePredicate { .. } => {
                    self.walk(transition.target, stack, pos)
                }
                TransitionKind::Predicate { rule, index } => {
                    if self.predicate_passes(*rule, *index, pos) {
                        self.walk(transition.target, stack, pos)
                    } else {
                        None
                    }
                }
                TransitionKind::Rule { rule, follow } => {
                    // Enter the callee's start state, not `target`
                    stack.push(*follow);
                    let result = self.walk(automaton.rule_start[*rule], stack, pos);
                    if result.is_none() {
                        stack.pop();
                    }
                    result
                }
                kind => {
                    let token = self.tokens.get(pos);
                    let matches = token
                        .map(|t| consumes_token(kind, t.token_type))
                        .unwrap_or(false);
                    if matches {
                        self.furthest = self.furthest.max(pos + 1);
                        self.walk(transition.target, stack, pos + 1)
                    } else {
                        None
                    }
                }
            };
            if result.is_some() {
                return result;
            }
        }
        None
    }

    fn predicate_passes(&self, rule: usize, index: usize, pos: usize) -> bool {
        let data = self.interp.data;
        let text = data
            .predicate_texts
            .get(index)
            .map(|t| t.to_string())
            .unwrap_or_else(|| format!("{rule}:{index}"));
        let ctx = PredicateContext {
            rule_name: data.rule_names.get(rule).cloned(),
            offset: pos,
        };
        self.interp.evaluator.evaluate(&text, &ctx).unwrap_or(false)
    }
}

fn consumes_token(kind: &TransitionKind, token_type: i32) -> bool {
    match kind {
        TransitionKind::Atom(value) => *value == token_type,
        TransitionKind::Range(low, high) => (*low..=*high).contains(&token_type),
        TransitionKind::Set(set) => set.contains(token_type),
        TransitionKind::NotSet(set) => !set.contains(token_type),
        TransitionKind::Wildcard => token_type != EOF_TOKEN,
        _ => false,
    }
}
