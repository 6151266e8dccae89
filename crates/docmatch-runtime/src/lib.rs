//! The binding context and greedy one-pass simulator: everything needed to
//! drive a compiled [`docmatch_core::Nfa`] over a document's lines and
//! produce a [`MatchResult`].
//!
//! Depends on `docmatch-core` only; `docmatch-compiler` is a dev-dependency
//! used to build realistic Line-NFAs for this crate's own tests, not a
//! runtime dependency — a `Matcher` is handed an already-compiled `Nfa`.

pub mod binding;
pub mod formatter;
pub mod result;
pub mod simulate;

pub use binding::{BindingContext, CaptureEntry};
pub use formatter::{FormatterFn, FormatterRegistry};
pub use result::{FailureReason, MatchFailure, MatchResult, MatchSuccess};
pub use simulate::{MatchLimits, NoopTracer, Simulator, Tracer};
