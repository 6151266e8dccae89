//! The outcome of one `find_match` call: success with a record, or a
//! non-exceptional failure with a reason.

use std::fmt;

use docmatch_core::Value;

/// Why a match failed. Covers the `MatchFailure` taxonomy entries
/// `spec.md` §7 requires verbatim, plus `Internal` for exceptions trapped
/// at the matcher-facade boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum FailureReason {
    /// No outgoing transition at the current state was applicable.
    NoValidTransition {
        line_index: usize,
        line_text: Option<String>,
    },
    /// End of input was reached without the walk landing on the accept
    /// state.
    Incomplete,
    /// An otherwise-unreachable internal error, trapped at the matcher
    /// facade boundary rather than propagated as a panic.
    Internal(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoValidTransition {
                line_index,
                line_text: Some(text),
            } => write!(f, "No valid transition found at line {line_index}: {text}"),
            FailureReason::NoValidTransition {
                line_index,
                line_text: None,
            } => write!(f, "No valid transition found at line {line_index}"),
            FailureReason::Incomplete => write!(
                f,
                "Pattern incomplete: reached end of document without completing pattern"
            ),
            FailureReason::Internal(detail) => write!(f, "Internal matching error: {detail}"),
        }
    }
}

/// A successful match: the extracted record plus line-accounting figures.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSuccess {
    pub record: Value,
    pub lines_processed: usize,
    pub lines_matched: usize,
}

/// A match that did not conform to the pattern. Not an error — a value.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchFailure {
    pub reason: FailureReason,
    pub lines_processed: usize,
}

/// The outcome of `find_match`/`find_match_str`.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchResult {
    Success(MatchSuccess),
    Failure(MatchFailure),
}

impl MatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MatchResult::Success(_))
    }

    pub fn as_success(&self) -> Option<&MatchSuccess> {
        match self {
            MatchResult::Success(success) => Some(success),
            MatchResult::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&MatchFailure> {
        match self {
            MatchResult::Failure(failure) => Some(failure),
            MatchResult::Success(_) => None,
        }
    }

    /// A convenience JSON rendering of the record, `None` for a failure.
    pub fn to_json(&self) -> Option<String> {
        self.as_success()
            .map(|success| serde_json::to_string(&success.record).expect("Value serialization is infallible"))
    }
}
