//! Foundation types shared by every layer: source positions, spans,
//! and the offset-to-line/column index.

mod position;

pub use position::{LineIndex, Position, Span};
