//! A single line-matching regex plus its idempotent compiled form.

use std::sync::OnceLock;

use regex_automata::meta::Regex;

use crate::error::LineCompileError;

/// A compiled line regex, holding the engine plus the number of capture
/// groups (including the implicit whole-match group 0).
pub struct CompiledLine {
    regex: Regex,
    group_len: usize,
}

/// The result of matching a single line against a `CompiledLine`.
///
/// `groups[i]` corresponds to capture group `i + 1`; a non-participating
/// group is `None`.
pub struct LineMatch {
    pub whole: String,
    pub groups: Vec<Option<String>>,
}

impl CompiledLine {
    fn compile(source: &str) -> Result<Self, LineCompileError> {
        let regex = Regex::new(source).map_err(|err| LineCompileError {
            source: source.into(),
            message: err.to_string().into(),
        })?;
        let group_len = regex.captures_len();
        Ok(Self { regex, group_len })
    }

    /// Find-semantics match: the regex may match anywhere on the line.
    pub fn find(&self, text: &str) -> Option<LineMatch> {
        let mut caps = self.regex.create_captures();
        self.regex.captures(text, &mut caps);
        let whole_span = caps.get_match()?;
        let whole = text[whole_span.range()].to_string();

        let mut groups = Vec::with_capacity(self.group_len.saturating_sub(1));
        for i in 1..self.group_len {
            groups.push(caps.get_group(i).map(|span| text[span.range()].to_string()));
        }

        Some(LineMatch { whole, groups })
    }
}

/// A single line pattern: its regex source plus the property bindings that
/// read from its capture groups.
///
/// Compilation is idempotent: the first call to [`Line::compiled`] caches
/// the result in a `OnceLock`; later calls return the cached value without
/// recompiling, and without requiring `&mut self`.
pub struct Line {
    source: Box<str>,
    compiled: OnceLock<Result<CompiledLine, LineCompileError>>,
}

impl Line {
    pub fn new(source: impl Into<Box<str>>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compile (once) and return the compiled regex, or the cached error.
    pub fn compiled(&self) -> Result<&CompiledLine, LineCompileError> {
        self.compiled
            .get_or_init(|| CompiledLine::compile(&self.source))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Run `find` semantics against a line, compiling lazily if necessary.
    pub fn find(&self, text: &str) -> Result<Option<LineMatch>, LineCompileError> {
        Ok(self.compiled()?.find(text))
    }
}
