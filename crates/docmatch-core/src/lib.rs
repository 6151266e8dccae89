//! Core data structures for docmatch: the pattern model, compiled line
//! regexes, the line-NFA, and the shared output value type.
//!
//! Two layers, same split the rest of the workspace relies on:
//! - **Spec layer** (`pattern::PatternSpec` and friends): the ergonomic,
//!   recursively-constructed tree a caller (or the JSON loader in
//!   `docmatch-compiler`) assembles.
//! - **Arena layer** (`pattern::PatternRoot`, `nfa::Nfa`): validated,
//!   ID-indexed structures built once from a spec and then shared
//!   read-only across matches.

pub mod error;
pub mod line;
pub mod nfa;
pub mod pattern;
pub mod value;

pub use error::{LineCompileError, PatternBuildError, PatternCompilation};
pub use line::{CompiledLine, Line};
pub use nfa::{deletion_skip, match_line, structural, EditKind, Nfa, Op, StateId, Transition};
pub use pattern::{
    FormatterSpec, NodeId, PatternNodeData, PatternRoot, PatternSpec, PropertyBinding, RepeatMode,
};
pub use value::Value;
