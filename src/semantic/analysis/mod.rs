//! The two-pass semantic analyzer.
//!
//! 1. The **structural pass** runs right after parsing: it populates
//!    the symbol table with every definition and reference in the
//!    tree, records imports, and classifies the grammar kind.
//! 2. The **semantic pass** runs lazily on the first diagnostic or
//!    reference-graph request and is memoized until the next parse:
//!    it resolves references across the dependency mesh and turns
//!    findings into diagnostics, never into errors.
//!
//! The rule-reference-diagram scripts produced per rule are a side
//! artifact of the semantic pass.

mod rrd;
mod semantic;
mod structural;

pub use rrd::rrd_script;
pub use semantic::run_semantic_pass;
pub use structural::{PendingDuplicate, StructuralOutcome, run_structural_pass};
