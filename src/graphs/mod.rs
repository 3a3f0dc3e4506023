//! Visualization graphs derived from automaton data.

mod atn_graph;

pub use atn_graph::{AtnGraph, AtnGraphNode, AtnLink, AtnNodeKind, LinkKind, extract};
