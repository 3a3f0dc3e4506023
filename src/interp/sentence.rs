//! Random sentence generation by walking the automaton.
//!
//! Parser rules are expanded top-down; decision states pick uniformly
//! among their alternatives, loop states honor configurable minimum
//! and maximum iteration counts, and a per-rule recursion cap keeps
//! (left-)recursive grammars from running away. Token text comes from
//! literal spellings when the vocabulary has them, otherwise from a
//! walk over the lexer automaton sampling concrete code points.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::atn::{AtnStateKind, InterpreterData, StateId, TransitionKind};

/// Highest code point sampled when a lexer transition is a negated
/// set; keeps generated text printable.
const SAMPLE_CEILING: i32 = 0x7E;

/// SplitMix64: small, seedable, and good enough for uniform choices.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `0..bound`; `bound` of zero yields zero.
    pub fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            (self.next_u64() % bound as u64) as usize
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("rule '{0}' is not part of the grammar data")]
    UnknownRule(String),
    #[error("recursion limit reached in rule '{0}'")]
    RecursionLimit(String),
    #[error("no token text derivable for token type {0}")]
    NoTokenText(i32),
    #[error("state {0} has no outgoing transitions")]
    DeadEnd(u32),
}

/// Host-supplied overrides: a rule name maps to a pool of fixed
/// output strings, sampled instead of walking the rule.
#[derive(Debug, Clone, Default)]
pub struct RuleMappings {
    pool: FxHashMap<SmolStr, Vec<SmolStr>>,
}

impl RuleMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&mut self, rule: impl Into<SmolStr>, texts: Vec<SmolStr>) {
        self.pool.insert(rule.into(), texts);
    }

    fn pick(&self, rule: &str, rng: &mut SplitMix64) -> Option<SmolStr> {
        let texts = self.pool.get(rule)?;
        texts.get(rng.below(texts.len())).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub seed: Option<u64>,
    /// How often one rule may appear on the expansion stack
    pub max_recursion: usize,
    pub min_loop_iterations: usize,
    pub max_loop_iterations: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_recursion: 3,
            min_loop_iterations: 0,
            max_loop_iterations: 3,
        }
    }
}

pub struct SentenceGenerator<'a> {
    /// Parser pole; absent when generating directly from a lexer rule
    parser_data: Option<&'a InterpreterData>,
    /// Lexer pole; token text synthesis needs it
    lexer_data: Option<&'a InterpreterData>,
    mappings: RuleMappings,
    options: GenerationOptions,
    rng: SplitMix64,
}

impl<'a> SentenceGenerator<'a> {
    pub fn new(
        parser_data: Option<&'a InterpreterData>,
        lexer_data: Option<&'a InterpreterData>,
        options: GenerationOptions,
    ) -> Self {
        let seed = options.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x5EED)
        });
        Self {
            parser_data,
            lexer_data,
            mappings: RuleMappings::default(),
            options,
            rng: SplitMix64::new(seed),
        }
    }

    pub fn with_mappings(mut self, mappings: RuleMappings) -> Self {
        self.mappings = mappings;
        self
    }

    /// Generate one sentence for a rule. Uppercase-initial names are
    /// lexer rules and synthesize token text directly.
    pub fn generate(&mut self, rule_name: &str) -> Result<String, GenerateError> {
        if rule_name.starts_with(|c: char| c.is_uppercase()) {
            let data = self
                .lexer_data
                .ok_or_else(|| GenerateError::UnknownRule(rule_name.to_string()))?;
            let rule = data
                .rule_index(rule_name)
                .ok_or_else(|| GenerateError::UnknownRule(rule_name.to_string()))?;
            let mut depth: FxHashMap<usize, usize> = FxHashMap::default();
            return self.lexer_text(data, rule, &mut depth);
        }
        let data = self
            .parser_data
            .ok_or_else(|| GenerateError::UnknownRule(rule_name.to_string()))?;
        let rule = data
            .rule_index(rule_name)
            .ok_or_else(|| GenerateError::UnknownRule(rule_name.to_string()))?;
        let mut depth: FxHashMap<usize, usize> = FxHashMap::default();
        let mut tokens: Vec<SmolStr> = Vec::new();
        self.expand_rule(data, rule, &mut depth, &mut tokens)?;
        Ok(tokens.join(" "))
    }

    /// Generate `count` sentences; a failure at index `i` becomes a
    /// diagnostic line instead of aborting the batch.
    pub fn generate_many(&mut self, rule_name: &str, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| match self.generate(rule_name) {
                Ok(sentence) => sentence,
                Err(error) => format!("[{i}] generation failed: {error}"),
            })
            .collect()
    }

    fn expand_rule(
        &mut self,
        data: &'a InterpreterData,
        rule: usize,
        depth: &mut FxHashMap<usize, usize>,
        out: &mut Vec<SmolStr>,
    ) -> Result<(), GenerateError> {
        let rule_name = data
            .rule_names
            .get(rule)
            .map(SmolStr::as_str)
            .unwrap_or("<unknown>");
        if let Some(text) = self.mappings.pick(rule_name, &mut self.rng) {
            out.push(text);
            return Ok(());
        }
        let entry = depth.entry(rule).or_insert(0);
        if *entry >= self.options.max_recursion {
            return Err(GenerateError::RecursionLimit(rule_name.to_string()));
        }
        *entry += 1;
        let result = self.walk_rule(data, rule, depth, out);
        *depth.entry(rule).or_insert(1) -= 1;
        result
    }

    fn walk_rule(
        &mut self,
        data: &'a InterpreterData,
        rule: usize,
        depth: &mut FxHashMap<usize, usize>,
        out: &mut Vec<SmolStr>,
    ) -> Result<(), GenerateError> {
        let automaton = &data.automaton;
        let mut state_id = automaton.rule_start[rule];
        let mut loop_counts: FxHashMap<StateId, usize> = FxHashMap::default();

        while !automaton.is_stop_state(state_id) {
            let state = automaton.state(state_id);
            let transition = {
                let choices = self.viable_choices(data, state_id, depth, &mut loop_counts);
                let Some(&index) = choices.get(self.rng.below(choices.len())) else {
                    return Err(GenerateError::DeadEnd(state_id.0));
                };
                state.transitions[index].clone()
            };
            match &transition.kind {
                TransitionKind::Rule { rule: callee, follow } => {
                    self.expand_rule(data, *callee, depth, out)?;
                    state_id = *follow;
                }
                TransitionKind::Atom(value) => {
                    out.push(self.token_text(data, *value)?);
                    state_id = transition.target;
                }
                TransitionKind::Range(low, high) => {
                    let value = low + self.rng.below((high - low + 1) as usize) as i32;
                    out.push(self.token_text(data, value)?);
                    state_id = transition.target;
                }
                TransitionKind::Set(set) => {
                    let value = set
                        .nth(self.rng.below(set.len()))
                        .ok_or(GenerateError::NoTokenText(-1))?;
                    out.push(self.token_text(data, value)?);
                    state_id = transition.target;
                }
                TransitionKind::NotSet(set) => {
                    let complement = set.complement(SAMPLE_CEILING);
                    let value = complement
                        .nth(self.rng.below(complement.len()))
                        .ok_or(GenerateError::NoTokenText(-1))?;
                    out.push(self.token_text(data, value)?);
                    state_id = transition.target;
                }
                TransitionKind::Wildcard => {
                    out.push(self.token_text(data, 1)?);
                    state_id = transition.target;
                }
                _ => state_id = transition.target,
            }
        }
        Ok(())
    }

    /// Candidate transition indices at a state, with loop-iteration
    /// bounds and the recursion cap applied. Empty only when a
    /// non-stop state has no outgoing transitions at all.
    fn viable_choices(
        &mut self,
        data: &'a InterpreterData,
        state_id: StateId,
        depth: &FxHashMap<usize, usize>,
        loop_counts: &mut FxHashMap<StateId, usize>,
    ) -> Vec<usize> {
        let automaton = &data.automaton;
        let state = automaton.state(state_id);
        let all: Vec<usize> = (0..state.transitions.len()).collect();
        if state.transitions.len() < 2 {
            return all;
        }

        // Loop decision states: classify exits by their LoopEnd target
        if matches!(
            state.kind,
            AtnStateKind::StarLoopEntry | AtnStateKind::PlusLoopBack
        ) {
            let count = loop_counts.entry(state_id).or_insert(0);
            let iteration = *count;
            *count += 1;
            let exits: Vec<usize> = all
                .iter()
                .copied()
                .filter(|&i| {
                    automaton.state(state.transitions[i].target).kind == AtnStateKind::LoopEnd
                })
                .collect();
            let continues: Vec<usize> =
                all.iter().copied().filter(|i| !exits.contains(i)).collect();
            if iteration < self.options.min_loop_iterations && !continues.is_empty() {
                return continues;
            }
            if iteration >= self.options.max_loop_iterations && !exits.is_empty() {
                return exits;
            }
            return all;
        }

        // Plain decisions: steer away from rules at their depth cap
        let open: Vec<usize> = all
            .iter()
            .copied()
            .filter(|&i| match &state.transitions[i].kind {
                TransitionKind::Rule { rule, .. } => {
                    depth.get(rule).copied().unwrap_or(0) < self.options.max_recursion
                }
                _ => true,
            })
            .collect();
        if open.is_empty() { all } else { open }
    }

    /// Concrete text for one token type: literal spelling first, then
    /// a lexer-automaton walk, then the symbolic name.
    fn token_text(&mut self, data: &'a InterpreterData, token_type: i32) -> Result<SmolStr, GenerateError> {
        if let Some(literal) = data.vocabulary.literal_name(token_type) {
            return Ok(SmolStr::new(literal.trim_matches('\'')));
        }
        if let Some(symbolic) = data.vocabulary.symbolic_name(token_type) {
            if let Some(text) = self.mappings.pick(symbolic, &mut self.rng) {
                return Ok(text);
            }
        }
        if let Some(lexer) = self.lexer_data {
            let rule = lexer
                .automaton
                .rule_to_token_type
                .iter()
                .position(|&t| t == token_type);
            if let Some(rule) = rule {
                let mut depth: FxHashMap<usize, usize> = FxHashMap::default();
                return Ok(SmolStr::new(self.lexer_text(lexer, rule, &mut depth)?));
            }
        }
        data.vocabulary
            .symbolic_name(token_type)
            .map(SmolStr::new)
            .ok_or(GenerateError::NoTokenText(token_type))
    }

    /// Synthesize literal text for a lexer rule by walking its slice
    /// of the lexer automaton and sampling code points.
    fn lexer_text(
        &mut self,
        data: &'a InterpreterData,
        rule: usize,
        depth: &mut FxHashMap<usize, usize>,
    ) -> Result<String, GenerateError> {
        let rule_name = data
            .rule_names
            .get(rule)
            .map(SmolStr::as_str)
            .unwrap_or("<unknown>");
        if let Some(text) = self.mappings.pick(rule_name, &mut self.rng) {
            return Ok(text.to_string());
        }
        let entry = depth.entry(rule).or_insert(0);
        if *entry >= self.options.max_recursion {
            return Err(GenerateError::RecursionLimit(rule_name.to_string()));
        }
        *entry += 1;

        let automaton = &data.automaton;
        let mut state_id = automaton.rule_start[rule];
        let mut loop_counts: FxHashMap<StateId, usize> = FxHashMap::default();
        let mut text = String::new();

        while !automaton.is_stop_state(state_id) {
            let transition = {
                let choices = self.viable_choices(data, state_id, depth, &mut loop_counts);
                let Some(&index) = choices.get(self.rng.below(choices.len())) else {
                    return Err(GenerateError::DeadEnd(state_id.0));
                };
                automaton.state(state_id).transitions[index].clone()
            };
            match &transition.kind {
                TransitionKind::Rule { rule: callee, follow } => {
                    text.push_str(&self.lexer_text(data, *callee, depth)?);
                    state_id = *follow;
                }
                TransitionKind::Atom(value) => {
                    push_code_point(&mut text, *value);
                    state_id = transition.target;
                }
                TransitionKind::Range(low, high) => {
                    let value = low + self.rng.below((high - low + 1) as usize) as i32;
                    push_code_point(&mut text, value);
                    state_id = transition.target;
                }
                TransitionKind::Set(set) => {
                    if let Some(value) = set.nth(self.rng.below(set.len())) {
                        push_code_point(&mut text, value);
                    }
                    state_id = transition.target;
                }
                TransitionKind::NotSet(set) => {
                    let complement = set.complement(SAMPLE_CEILING);
                    if let Some(value) = complement.nth(self.rng.below(complement.len())) {
                        push_code_point(&mut text, value);
                    }
                    state_id = transition.target;
                }
                TransitionKind::Wildcard => {
                    text.push('.');
                    state_id = transition.target;
                }
                _ => state_id = transition.target,
            }
        }

        *depth.entry(rule).or_insert(1) -= 1;
        Ok(text)
    }
}

fn push_code_point(text: &mut String, value: i32) {
    if let Some(c) = u32::try_from(value).ok().and_then(char::from_u32) {
        text.push(c);
    }
}
