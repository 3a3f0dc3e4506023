//! Interpreter data: the serialized-grammar payload the engine runs on.
//!
//! Produced per grammar by the external generation step and loaded by
//! the host; immutable once constructed, replaced wholesale on reload.

use smol_str::SmolStr;

use super::automaton::Automaton;

/// Token-type naming for one grammar.
///
/// Parallel arrays indexed by token type; either side of an entry may
/// be missing (literal-only or symbolic-only tokens).
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    symbolic: Vec<Option<SmolStr>>,
    literal: Vec<Option<SmolStr>>,
}

impl Vocabulary {
    pub fn new(symbolic: Vec<Option<SmolStr>>, literal: Vec<Option<SmolStr>>) -> Self {
        Self { symbolic, literal }
    }

    /// Build a vocabulary from symbolic names only
    pub fn from_symbolic<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let symbolic: Vec<_> = names.into_iter().map(|n| Some(n.into())).collect();
        let literal = vec![None; symbolic.len()];
        Self { symbolic, literal }
    }

    pub fn symbolic_name(&self, token_type: i32) -> Option<&str> {
        usize::try_from(token_type)
            .ok()
            .and_then(|i| self.symbolic.get(i))
            .and_then(|n| n.as_deref())
    }

    pub fn literal_name(&self, token_type: i32) -> Option<&str> {
        usize::try_from(token_type)
            .ok()
            .and_then(|i| self.literal.get(i))
            .and_then(|n| n.as_deref())
    }

    /// Set the literal spelling of one token type
    pub fn set_literal(&mut self, token_type: usize, literal: impl Into<SmolStr>) {
        if token_type >= self.literal.len() {
            self.literal.resize(token_type + 1, None);
        }
        self.literal[token_type] = Some(literal.into());
    }

    /// Display name: literal first, then symbolic, `EOF` for -1,
    /// `<invalid>` otherwise.
    pub fn display_name(&self, token_type: i32) -> String {
        if token_type < 0 {
            return "EOF".to_string();
        }
        self.literal_name(token_type)
            .or_else(|| self.symbolic_name(token_type))
            .map(str::to_string)
            .unwrap_or_else(|| "<invalid>".to_string())
    }

    /// The token type carrying this symbolic name, if any
    pub fn token_type(&self, name: &str) -> Option<i32> {
        self.symbolic
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|i| i as i32)
    }
}

/// Everything the interpreter engine needs for one grammar.
#[derive(Debug, Clone, Default)]
pub struct InterpreterData {
    pub automaton: Automaton,
    /// Rule names, indexed by rule index
    pub rule_names: Vec<SmolStr>,
    pub vocabulary: Vocabulary,
    pub channel_names: Vec<SmolStr>,
    pub mode_names: Vec<SmolStr>,
    /// Source text of semantic predicates, indexed by predicate index
    pub predicate_texts: Vec<SmolStr>,
}

impl InterpreterData {
    /// Index of a rule by name
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rule_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_preferences() {
        let mut vocabulary = Vocabulary::from_symbolic(["A", "B"]);
        vocabulary.set_literal(0, "'a'");
        assert_eq!(vocabulary.display_name(0), "'a'");
        assert_eq!(vocabulary.display_name(1), "B");
        assert_eq!(vocabulary.display_name(-1), "EOF");
        assert_eq!(vocabulary.display_name(9), "<invalid>");
    }

    #[test]
    fn test_token_type_lookup() {
        let vocabulary = Vocabulary::from_symbolic(["A", "B"]);
        assert_eq!(vocabulary.token_type("B"), Some(1));
        assert_eq!(vocabulary.token_type("C"), None);
    }
}
