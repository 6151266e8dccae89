//! The document line-pattern matching engine: compile a pattern once, then
//! run it against any number of documents via a lightweight `Matcher`
//! facade that layers `docmatch-core`, `docmatch-compiler`, and
//! `docmatch-runtime` together.

use docmatch_core::pattern::PatternRoot;
use docmatch_core::{Nfa, PatternCompilation};
use docmatch_runtime::{FormatterRegistry, MatchLimits, MatchResult, Simulator, Tracer};

pub use docmatch_core::pattern::{
    FormatterSpec, PatternRootSpec, PatternSpec, PropertyBinding, RepeatMode,
};
pub use docmatch_core::value::Value;
pub use docmatch_core::{LineCompileError, PatternBuildError};
pub use docmatch_compiler::{load_pattern_spec, CompileJsonError, JsonLoadError};
pub use docmatch_runtime::{FailureReason, MatchFailure, MatchSuccess};

/// A compiled pattern, ready to match any number of documents.
///
/// Owns the validated pattern tree, its Line-NFA, and a formatter registry.
/// All three are read-only after construction, so a `Matcher` is `Sync`
/// and safe to share across threads: each [`find_match`](Self::find_match)
/// call builds a fresh binding context of its own.
pub struct Matcher {
    root: PatternRoot,
    nfa: Nfa,
    formatters: FormatterRegistry,
}

impl Matcher {
    /// Validate `pattern`, compile every embedded line regex, and build its
    /// Line-NFA. The sole constructor — there is no separate two-phase
    /// build-then-compile API, since both steps are cheap and idempotent
    /// failure belongs entirely to this call.
    pub fn compile(pattern: PatternRootSpec) -> Result<Self, PatternCompilation> {
        let root = PatternRoot::build(pattern)?;
        for line in root.lines() {
            line.compiled()?;
        }
        let nfa = docmatch_compiler::build_nfa(&root);
        Ok(Self {
            root,
            nfa,
            formatters: FormatterRegistry::builtin(),
        })
    }

    /// Parse pattern JSON (§6's wire shape) and compile it in one step.
    pub fn compile_json(json: &str) -> Result<Self, CompileJsonError> {
        let spec = load_pattern_spec(json)?;
        Ok(Self::compile(spec)?)
    }

    /// Register an additional formatter, or override one of the built-ins.
    /// Only meaningful before the first `find_match` call — the registry is
    /// read-only during matching, mirroring the pattern tree and NFA.
    pub fn register_formatter(&mut self, name: &'static str, formatter: docmatch_runtime::FormatterFn) {
        self.formatters.register(name, formatter);
    }

    /// Match `lines` against the compiled pattern.
    ///
    /// Does not mutate the matcher; safe to call concurrently from multiple
    /// threads provided each call supplies its own input.
    pub fn find_match(&self, lines: &[&str]) -> MatchResult {
        Simulator::new(&self.nfa, &self.root, &self.formatters).run(lines)
    }

    /// As [`find_match`](Self::find_match), but with an explicit [`Tracer`]
    /// and [`MatchLimits`] for diagnostics or bounded-iteration defense.
    pub fn find_match_with(
        &self,
        lines: &[&str],
        tracer: &mut dyn Tracer,
        limits: MatchLimits,
    ) -> MatchResult {
        Simulator::new(&self.nfa, &self.root, &self.formatters).run_with(lines, tracer, limits)
    }

    /// Split `text` on `\n`, trimming an optional trailing `\r` off each
    /// line, and match the result. A trailing newline does not produce an
    /// extra empty final line.
    pub fn find_match_str(&self, text: &str) -> MatchResult {
        let mut lines: Vec<&str> = text.split('\n').collect();
        if lines.last() == Some(&"") {
            lines.pop();
        }
        let lines: Vec<&str> = lines
            .into_iter()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        self.find_match(&lines)
    }

    pub fn edit_distance(&self) -> u32 {
        self.root.edit_distance
    }
}
