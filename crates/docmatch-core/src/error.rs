//! Compile-time error taxonomy shared by the pattern model and line regexes.

use std::fmt;

/// A pattern-tree construction failed an invariant (empty required name,
/// empty child list where one is required, missing `Repeat` body, ...).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PatternBuildError {
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },

    #[error("Or must have at least one child")]
    EmptyOr,

    #[error("Repeat must have exactly one child element")]
    MissingRepeatChild,

    #[error("Line must have a non-empty regex source")]
    EmptyRegex,
}

/// A `Line`'s regex source failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCompileError {
    pub source: Box<str>,
    pub message: Box<str>,
}

impl fmt::Display for LineCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid regex `{}`: {}", self.source, self.message)
    }
}

impl std::error::Error for LineCompileError {}

/// Top-level compilation error surfaced by `Matcher::compile`.
///
/// Covers both halves of the spec's `PatternCompilation` taxonomy entry:
/// tree-shape validation failures and per-line regex failures.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PatternCompilation {
    #[error("pattern is invalid: {0}")]
    Build(#[from] PatternBuildError),

    #[error("line regex failed to compile: {0}")]
    Regex(#[from] LineCompileError),
}
