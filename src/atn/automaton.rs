//! The automaton state/transition model.
//!
//! One automaton covers a whole grammar: every rule contributes a
//! start and a stop state plus its body states. The model is produced
//! by the external data loader (or, in tests, by [`AutomatonBuilder`])
//! and consumed read-only by the graph extractor and the interpreter
//! engine.

use super::intervals::IntervalSet;

/// Index of a state in [`Automaton::states`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural role of an automaton state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtnStateKind {
    Basic,
    RuleStart,
    RuleStop,
    BlockStart,
    BlockEnd,
    PlusBlockStart,
    PlusLoopBack,
    StarBlockStart,
    StarLoopEntry,
    StarLoopBack,
    LoopEnd,
    /// Entry state of a lexer mode
    TokensStart,
}

impl AtnStateKind {
    /// Short display tag. Total by construction.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::RuleStart => "rule start",
            Self::RuleStop => "rule stop",
            Self::BlockStart => "block start",
            Self::BlockEnd => "block end",
            Self::PlusBlockStart => "plus block start",
            Self::PlusLoopBack => "plus loop back",
            Self::StarBlockStart => "star block start",
            Self::StarLoopEntry => "star loop entry",
            Self::StarLoopBack => "star loop back",
            Self::LoopEnd => "loop end",
            Self::TokensStart => "tokens start",
        }
    }
}

/// What a transition consumes or checks
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionKind {
    Epsilon,
    /// Call into another rule; control returns at `follow`
    Rule { rule: usize, follow: StateId },
    /// Match exactly one symbol (token type or code point)
    Atom(i32),
    /// Match one symbol in a closed range
    Range(i32, i32),
    /// Match one symbol in a set
    Set(IntervalSet),
    /// Match one symbol outside a set
    NotSet(IntervalSet),
    /// Match any one symbol
    Wildcard,
    /// Gated by a semantic predicate
    Predicate { rule: usize, index: usize },
    /// Gated by a precedence check
    PrecedencePredicate { precedence: i32 },
    /// Run a lexer action; consumes nothing
    Action { index: usize },
}

impl TransitionKind {
    /// True when the transition consumes no input symbol
    pub fn is_epsilon_only(&self) -> bool {
        matches!(
            self,
            Self::Epsilon
                | Self::Rule { .. }
                | Self::Predicate { .. }
                | Self::PrecedencePredicate { .. }
                | Self::Action { .. }
        )
    }
}

/// A directed edge between two automaton states
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub target: StateId,
    pub kind: TransitionKind,
}

/// One automaton state
#[derive(Debug, Clone, PartialEq)]
pub struct AtnState {
    pub kind: AtnStateKind,
    /// The rule this state belongs to
    pub rule: usize,
    pub transitions: Vec<Transition>,
}

/// Lexer action attached to an accepting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerAction {
    Skip,
    More,
    Type(i32),
    Channel(i32),
    Mode(usize),
    PushMode(usize),
    PopMode,
}

/// The whole-grammar automaton
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    pub states: Vec<AtnState>,
    /// Per-rule entry states
    pub rule_start: Vec<StateId>,
    /// Per-rule stop states; transitions out of these only model
    /// returns to callers and are never followed directly
    pub rule_stop: Vec<StateId>,
    /// Entry state per lexer mode (empty for parser automatons)
    pub mode_start: Vec<StateId>,
    /// Token type emitted when a lexer rule accepts (parallel to rules)
    pub rule_to_token_type: Vec<i32>,
    /// Actions executed when a lexer rule accepts
    pub rule_actions: Vec<Vec<LexerAction>>,
}

impl Automaton {
    pub fn state(&self, id: StateId) -> &AtnState {
        &self.states[id.index()]
    }

    pub fn rule_count(&self) -> usize {
        self.rule_start.len()
    }

    /// The rule whose start state this is, if any
    pub fn rule_of_start(&self, id: StateId) -> Option<usize> {
        self.rule_start.iter().position(|&s| s == id)
    }

    pub fn is_stop_state(&self, id: StateId) -> bool {
        self.state(id).kind == AtnStateKind::RuleStop
    }
}

/// Incremental construction of an [`Automaton`], used by data loaders
/// and tests.
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    automaton: Automaton,
}

impl AutomatonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self, kind: AtnStateKind, rule: usize) -> StateId {
        let id = StateId::new(self.automaton.states.len());
        self.automaton.states.push(AtnState {
            kind,
            rule,
            transitions: Vec::new(),
        });
        id
    }

    /// Add a rule with fresh start/stop states, returning `(start, stop)`
    pub fn add_rule(&mut self) -> (StateId, StateId) {
        let rule = self.automaton.rule_start.len();
        let start = self.add_state(AtnStateKind::RuleStart, rule);
        let stop = self.add_state(AtnStateKind::RuleStop, rule);
        self.automaton.rule_start.push(start);
        self.automaton.rule_stop.push(stop);
        self.automaton.rule_to_token_type.push(rule as i32 + 1);
        self.automaton.rule_actions.push(Vec::new());
        (start, stop)
    }

    pub fn transition(&mut self, from: StateId, target: StateId, kind: TransitionKind) {
        self.automaton.states[from.index()]
            .transitions
            .push(Transition { target, kind });
    }

    pub fn epsilon(&mut self, from: StateId, target: StateId) {
        self.transition(from, target, TransitionKind::Epsilon);
    }

    /// Declare the entry state of a lexer mode
    pub fn add_mode_start(&mut self, state: StateId) {
        self.automaton.mode_start.push(state);
    }

    pub fn set_token_type(&mut self, rule: usize, token_type: i32) {
        self.automaton.rule_to_token_type[rule] = token_type;
    }

    pub fn add_rule_action(&mut self, rule: usize, action: LexerAction) {
        self.automaton.rule_actions[rule].push(action);
    }

    pub fn finish(self) -> Automaton {
        self.automaton
    }
}
