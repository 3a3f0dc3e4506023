//! Per-rule automaton graph extraction.
//!
//! Flattens one rule's slice of the automaton into a node/link list
//! suitable for rendering. Rule-call transitions become synthetic
//! call nodes with a back edge to the follow state; the called rule's
//! states are never expanded, so the graph stays bounded by the
//! owning rule's own state count.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::atn::{
    AtnStateKind, IntervalSet, InterpreterData, StateId, TransitionKind, display_code_point,
};

/// What a graph node stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtnNodeKind {
    /// A real automaton state, tagged with its state kind
    State(AtnStateKind),
    /// Synthetic stand-in for a call into another rule
    RuleCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtnGraphNode {
    /// Unique within the graph. Real states use their state number;
    /// call nodes use a composite of call site and callee so the same
    /// rule called twice yields two nodes.
    pub id: i64,
    pub name: SmolStr,
    pub kind: AtnNodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Epsilon,
    Rule,
    Predicate,
    PrecedencePredicate,
    Action,
    /// Consumes an input symbol; the label names what it matches
    Label,
}

/// Directed edge between two nodes, by index into the node list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtnLink {
    pub source: usize,
    pub target: usize,
    pub label: SmolStr,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtnGraph {
    pub nodes: Vec<AtnGraphNode>,
    pub links: Vec<AtnLink>,
}

/// Extract the graph for one rule from loaded interpreter data.
///
/// Returns `None` when the rule is not present in the data. The
/// `is_lexer` flag picks the label vocabulary: character intervals
/// for lexer rules, token names for parser rules.
pub fn extract(rule_name: &str, data: &InterpreterData, is_lexer: bool) -> Option<AtnGraph> {
    let rule = data.rule_index(rule_name)?;
    let automaton = &data.automaton;
    let start = *automaton.rule_start.get(rule)?;

    let mut graph = AtnGraph::default();
    // Composite id -> node index, doubling as the visited set
    let mut seen: FxHashMap<i64, usize> = FxHashMap::default();
    let mut queue: VecDeque<StateId> = VecDeque::new();

    intern_state(&mut graph, &mut seen, automaton, start);
    queue.push_back(start);

    while let Some(state_id) = queue.pop_front() {
        // The rule's stop state ends every path; its outgoing edges
        // (the follow sets of call sites) belong to other rules.
        if automaton.is_stop_state(state_id) {
            continue;
        }
        let source_index = seen[&(state_id.0 as i64)];
        let transitions = automaton.state(state_id).transitions.clone();
        for transition in &transitions {
            match &transition.kind {
                TransitionKind::Rule { rule: callee, follow } => {
                    let call_id = call_node_id(state_id, automaton.rule_start[*callee]);
                    let call_index = *seen.entry(call_id).or_insert_with(|| {
                        let name = data
                            .rule_names
                            .get(*callee)
                            .cloned()
                            .unwrap_or_else(|| SmolStr::new("<unknown>"));
                        graph.nodes.push(AtnGraphNode {
                            id: call_id,
                            name,
                            kind: AtnNodeKind::RuleCall,
                        });
                        graph.nodes.len() - 1
                    });
                    graph.links.push(AtnLink {
                        source: source_index,
                        target: call_index,
                        label: SmolStr::new("ε"),
                        kind: LinkKind::Rule,
                    });
                    let followed = seen.contains_key(&(follow.0 as i64));
                    let follow_index = intern_state(&mut graph, &mut seen, automaton, *follow);
                    graph.links.push(AtnLink {
                        source: call_index,
                        target: follow_index,
                        label: SmolStr::new("ε"),
                        kind: LinkKind::Epsilon,
                    });
                    if !followed {
                        queue.push_back(*follow);
                    }
                }
                kind => {
                    let followed = seen.contains_key(&(transition.target.0 as i64));
                    let target_index =
                        intern_state(&mut graph, &mut seen, automaton, transition.target);
                    graph.links.push(AtnLink {
                        source: source_index,
                        target: target_index,
                        label: transition_label(kind, data, is_lexer),
                        kind: link_kind(kind),
                    });
                    if !followed {
                        queue.push_back(transition.target);
                    }
                }
            }
        }
    }
    Some(graph)
}

fn intern_state(
    graph: &mut AtnGraph,
    seen: &mut FxHashMap<i64, usize>,
    automaton: &crate::atn::Automaton,
    state_id: StateId,
) -> usize {
    let id = state_id.0 as i64;
    if let Some(&index) = seen.get(&id) {
        return index;
    }
    let state = automaton.state(state_id);
    graph.nodes.push(AtnGraphNode {
        id,
        name: SmolStr::new(state.kind.label()),
        kind: AtnNodeKind::State(state.kind),
    });
    let index = graph.nodes.len() - 1;
    seen.insert(id, index);
    index
}

/// Two calls to the same rule from different states must not collapse
/// into one node, so the id folds in the call site.
fn call_node_id(caller: StateId, callee_start: StateId) -> i64 {
    -(((caller.0 as i64) << 32) | callee_start.0 as i64) - 1
}

fn link_kind(kind: &TransitionKind) -> LinkKind {
    match kind {
        TransitionKind::Epsilon => LinkKind::Epsilon,
        TransitionKind::Rule { .. } => LinkKind::Rule,
        TransitionKind::Predicate { .. } => LinkKind::Predicate,
        TransitionKind::PrecedencePredicate { .. } => LinkKind::PrecedencePredicate,
        TransitionKind::Action { .. } => LinkKind::Action,
        _ => LinkKind::Label,
    }
}

fn transition_label(kind: &TransitionKind, data: &InterpreterData, is_lexer: bool) -> SmolStr {
    match kind {
        TransitionKind::Epsilon => SmolStr::new("ε"),
        TransitionKind::Rule { .. } => SmolStr::new("ε"),
        TransitionKind::Predicate { rule, index } => {
            SmolStr::new(format!("pred({rule}:{index})"))
        }
        TransitionKind::PrecedencePredicate { precedence } => {
            SmolStr::new(format!("prec({precedence})"))
        }
        TransitionKind::Action { index } => {
            // Lexer actions are indexed and executable; parser-side
            // actions only ever show up as inert epsilon edges.
            if is_lexer {
                SmolStr::new(format!("action({index})"))
            } else {
                SmolStr::new("ε action")
            }
        }
        TransitionKind::Wildcard => SmolStr::new("."),
        TransitionKind::Atom(value) => symbol_label(*value, data, is_lexer),
        TransitionKind::Range(low, high) => {
            let mut set = IntervalSet::new();
            set.add_range(*low, *high);
            set_label(&set, data, is_lexer, false)
        }
        TransitionKind::Set(set) => set_label(set, data, is_lexer, false),
        TransitionKind::NotSet(set) => set_label(set, data, is_lexer, true),
    }
}

fn symbol_label(value: i32, data: &InterpreterData, is_lexer: bool) -> SmolStr {
    if is_lexer {
        SmolStr::new(display_code_point(value))
    } else {
        SmolStr::new(data.vocabulary.display_name(value))
    }
}

fn set_label(set: &IntervalSet, data: &InterpreterData, is_lexer: bool, negated: bool) -> SmolStr {
    let body = if is_lexer {
        set.to_string()
    } else {
        let mut names = Vec::new();
        for &(low, high) in set.intervals() {
            for value in low..=high {
                names.push(data.vocabulary.display_name(value));
            }
        }
        names.join(", ")
    };
    if negated {
        SmolStr::new(format!("~({body})"))
    } else {
        SmolStr::new(body)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::atn::{AutomatonBuilder, InterpreterData, Vocabulary};

    fn two_rule_data() -> InterpreterData {
        // expr calls term twice: expr: term '+' term ;
        let mut builder = AutomatonBuilder::new();
        let (expr_start, expr_stop) = builder.add_rule();
        let (term_start, term_stop) = builder.add_rule();

        let s1 = builder.add_state(AtnStateKind::Basic, 0);
        let s2 = builder.add_state(AtnStateKind::Basic, 0);
        let s3 = builder.add_state(AtnStateKind::Basic, 0);
        builder.transition(
            expr_start,
            s1,
            TransitionKind::Rule { rule: 1, follow: s1 },
        );
        builder.transition(s1, s2, TransitionKind::Atom(1));
        builder.transition(s2, s3, TransitionKind::Rule { rule: 1, follow: s3 });
        builder.epsilon(s3, expr_stop);

        let t1 = builder.add_state(AtnStateKind::Basic, 1);
        builder.transition(term_start, t1, TransitionKind::Atom(2));
        builder.epsilon(t1, term_stop);

        let automaton = builder.finish();
        InterpreterData {
            automaton,
            rule_names: vec![SmolStr::new("expr"), SmolStr::new("term")],
            vocabulary: Vocabulary::new(
                vec![None, Some("PLUS".into()), Some("ID".into())],
                vec![None; 3],
            ),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        }
    }

    #[test]
    fn test_unknown_rule_yields_none() {
        let data = two_rule_data();
        assert!(extract("nope", &data, false).is_none());
    }

    #[test]
    fn test_rule_calls_become_synthetic_nodes() {
        let data = two_rule_data();
        let graph = extract("expr", &data, false).unwrap();
        let calls: Vec<_> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == AtnNodeKind::RuleCall)
            .collect();
        assert_eq!(calls.len(), 2, "two distinct call sites, two nodes");
        assert!(calls.iter().all(|n| n.name == "term"));
        assert!(calls.iter().all(|n| n.id < 0));
    }

    #[test]
    fn test_called_rule_states_not_expanded() {
        let data = two_rule_data();
        let graph = extract("expr", &data, false).unwrap();
        // All real-state nodes must belong to expr (rule 0)
        for node in &graph.nodes {
            if let AtnNodeKind::State(_) = node.kind {
                let state = data.automaton.state(StateId(node.id as u32));
                assert_eq!(state.rule, 0, "state {} leaked from callee", node.id);
            }
        }
    }

    #[test]
    fn test_stop_state_transitions_not_followed() {
        let data = two_rule_data();
        let graph = extract("term", &data, false).unwrap();
        let stop = data.automaton.rule_stop[1];
        assert!(
            graph
                .links
                .iter()
                .all(|l| graph.nodes[l.source].id != stop.0 as i64),
            "stop state must have no outgoing links"
        );
    }

    #[test]
    fn test_parser_labels_use_token_names() {
        let data = two_rule_data();
        let graph = extract("expr", &data, false).unwrap();
        assert!(graph.links.iter().any(|l| l.label == "PLUS"));
    }

    #[test]
    fn test_lexer_labels_use_code_points() {
        let mut builder = AutomatonBuilder::new();
        let (start, stop) = builder.add_rule();
        let s1 = builder.add_state(AtnStateKind::Basic, 0);
        let mut set = IntervalSet::new();
        set.add_range('a' as i32, 'z' as i32);
        builder.transition(start, s1, TransitionKind::Set(set));
        builder.epsilon(s1, stop);
        let data = InterpreterData {
            automaton: builder.finish(),
            rule_names: vec![SmolStr::new("ID")],
            vocabulary: Vocabulary::default(),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        };
        let graph = extract("ID", &data, true).unwrap();
        assert!(graph.links.iter().any(|l| l.label.contains("'a'")));
    }

    #[test]
    fn test_loop_in_rule_terminates() {
        // r: 'a'+ ; modeled as a plus loop back edge
        let mut builder = AutomatonBuilder::new();
        let (start, stop) = builder.add_rule();
        let block = builder.add_state(AtnStateKind::PlusBlockStart, 0);
        let body = builder.add_state(AtnStateKind::Basic, 0);
        let loopback = builder.add_state(AtnStateKind::PlusLoopBack, 0);
        let end = builder.add_state(AtnStateKind::LoopEnd, 0);
        builder.epsilon(start, block);
        builder.transition(block, body, TransitionKind::Atom('a' as i32));
        builder.epsilon(body, loopback);
        builder.epsilon(loopback, block);
        builder.epsilon(loopback, end);
        builder.epsilon(end, stop);
        let data = InterpreterData {
            automaton: builder.finish(),
            rule_names: vec![SmolStr::new("r")],
            vocabulary: Vocabulary::default(),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        };
        let graph = extract("r", &data, true).unwrap();
        assert_eq!(graph.nodes.len(), 6);
        // The back edge exists exactly once
        let back_edges = graph
            .links
            .iter()
            .filter(|l| graph.nodes[l.target].id < graph.nodes[l.source].id)
            .count();
        assert!(back_edges >= 1);
    }

    #[test]
    fn test_action_labels_differ_by_pole() {
        let mut builder = AutomatonBuilder::new();
        let (start, stop) = builder.add_rule();
        let s1 = builder.add_state(AtnStateKind::Basic, 0);
        builder.transition(start, s1, TransitionKind::Action { index: 2 });
        builder.epsilon(s1, stop);
        let data = InterpreterData {
            automaton: builder.finish(),
            rule_names: vec![SmolStr::new("r")],
            vocabulary: Vocabulary::default(),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        };
        let lexer_graph = extract("r", &data, true).unwrap();
        assert!(lexer_graph.links.iter().any(|l| l.label == "action(2)"));
        let parser_graph = extract("r", &data, false).unwrap();
        assert!(parser_graph.links.iter().any(|l| l.label == "ε action"));
    }

    #[test]
    fn test_predicate_label() {
        let mut builder = AutomatonBuilder::new();
        let (start, stop) = builder.add_rule();
        let s1 = builder.add_state(AtnStateKind::Basic, 0);
        builder.transition(
            start,
            s1,
            TransitionKind::Predicate { rule: 0, index: 3 },
        );
        builder.epsilon(s1, stop);
        let data = InterpreterData {
            automaton: builder.finish(),
            rule_names: vec![SmolStr::new("r")],
            vocabulary: Vocabulary::default(),
            channel_names: vec![],
            mode_names: vec![],
            predicate_texts: vec![],
        };
        let graph = extract("r", &data, false).unwrap();
        let link = graph
            .links
            .iter()
            .find(|l| l.kind == LinkKind::Predicate)
            .unwrap();
        assert_eq!(link.label, "pred(0:3)");
    }
}
