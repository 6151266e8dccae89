//! Pattern JSON ingestion and the Line-NFA builder.
//!
//! `docmatch_core` owns the data structures (`PatternRoot`, `Nfa`);
//! this crate owns turning external input (JSON text, or an
//! already-assembled `PatternRootSpec`) into those structures.

pub mod build;
pub mod json;

pub use build::build_nfa;
pub use json::{load_pattern_spec, JsonLoadError};

use docmatch_core::pattern::{PatternRoot, PatternRootSpec};
use docmatch_core::{Nfa, PatternCompilation};

/// A compiled pattern: the validated tree plus its Line-NFA.
pub struct CompiledPattern {
    pub root: PatternRoot,
    pub nfa: Nfa,
}

/// Validate a [`PatternRootSpec`] and build its Line-NFA in one step.
pub fn compile(spec: PatternRootSpec) -> Result<CompiledPattern, PatternCompilation> {
    let root = PatternRoot::build(spec)?;
    for line in root.lines() {
        // Force eager compilation so a bad regex is reported here, not on
        // the first match.
        line.compiled()?;
    }
    let nfa = build_nfa(&root);
    Ok(CompiledPattern { root, nfa })
}

/// Parse pattern JSON and compile it in one step.
pub fn compile_json(json: &str) -> Result<CompiledPattern, CompileJsonError> {
    let spec = load_pattern_spec(json)?;
    Ok(compile(spec)?)
}

#[derive(Debug, thiserror::Error)]
pub enum CompileJsonError {
    #[error(transparent)]
    Json(#[from] JsonLoadError),
    #[error(transparent)]
    Compilation(#[from] PatternCompilation),
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn compiles_minimal_json_pattern() {
        let compiled = compile_json(
            r#"{
                "version": "1",
                "name": "invoice",
                "bindObject": "invoice",
                "elements": [
                    {"line": {"regex": "^Invoice #(\\d+)$",
                     "bindProperties": [{"property": "id"}]}}
                ]
            }"#,
        )
        .unwrap();
        assert!(compiled.nfa.state_count() > 0);
    }

    #[test]
    fn surfaces_bad_regex_at_compile_time() {
        let err = compile_json(
            r#"{
                "version": "1",
                "name": "x",
                "bindObject": "x",
                "elements": [
                    {"line": {"regex": "(unclosed"}}
                ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CompileJsonError::Compilation(_)));
    }
}
