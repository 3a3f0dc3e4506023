//! Automaton (ATN) data model.
//!
//! The state/transition graph representing each rule's recognition
//! logic, used both for visualization ([`crate::graphs`]) and for
//! interpreted execution ([`crate::interp`]). The engine consumes this
//! data as an opaque input; producing it is the external generation
//! step's job.

mod automaton;
mod interp_data;
mod intervals;

pub use automaton::{
    AtnState, AtnStateKind, Automaton, AutomatonBuilder, LexerAction, StateId, Transition,
    TransitionKind,
};
pub use interp_data::{InterpreterData, Vocabulary};
pub use intervals::{IntervalSet, display_code_point};
