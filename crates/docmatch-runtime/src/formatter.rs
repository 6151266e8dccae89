//! The formatter registry: an open map of name → string-to-string function,
//! built once and read-only during matching.
//!
//! Grounded in `spec.md` §9's "Formatter registry" design note (a plain
//! function-pointer map, not a trait-object registry — formatters have no
//! state and never fail visibly) and, for the open-registration mechanics,
//! `plotnik-vm`'s pattern of a `HashMap` built once at construction and
//! never mutated again during execution.

use std::collections::HashMap;

/// A formatter: a captured string plus its formatter arguments, producing
/// a (possibly unchanged) string. Formatters never throw — on any internal
/// failure they are expected to return `raw` unchanged.
pub type FormatterFn = fn(raw: &str, args: &[Box<str>]) -> String;

pub struct FormatterRegistry {
    formatters: HashMap<&'static str, FormatterFn>,
}

impl FormatterRegistry {
    /// An empty registry with no formatters registered.
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// The registry the MVP ships with: `currency`, `trim`, `parseDate`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("currency", currency);
        registry.register("trim", trim);
        registry.register("parseDate", parse_date);
        registry
    }

    /// Register `name` to `formatter`, overwriting any prior registration.
    /// Implementers may call this at matcher-construction time but the
    /// registry is read-only afterward (it is never exposed `&mut` once a
    /// `Matcher` is built).
    pub fn register(&mut self, name: &'static str, formatter: FormatterFn) {
        self.formatters.insert(name, formatter);
    }

    /// Apply `name(args)` to `raw`. An unknown formatter name passes `raw`
    /// through unchanged — formatters never fail visibly.
    pub fn apply(&self, name: &str, args: &[Box<str>], raw: &str) -> String {
        match self.formatters.get(name) {
            Some(formatter) => formatter(raw, args),
            None => raw.to_string(),
        }
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Strip `$` and `,` from a captured currency amount.
fn currency(raw: &str, _args: &[Box<str>]) -> String {
    raw.chars().filter(|c| *c != '$' && *c != ',').collect()
}

/// Trim leading/trailing whitespace.
fn trim(raw: &str, _args: &[Box<str>]) -> String {
    raw.trim().to_string()
}

/// Best-effort date reformatting. The MVP only recognizes a small set of
/// token substitutions (`yyyy`, `MM`, `dd`) in the source format and
/// re-emits the date in ISO order; anything it can't parse against the
/// given format is returned unchanged.
fn parse_date(raw: &str, args: &[Box<str>]) -> String {
    let Some(format) = args.first() else {
        return raw.to_string();
    };
    match reformat_date(raw, format) {
        Some(iso) => iso,
        None => raw.to_string(),
    }
}

fn reformat_date(raw: &str, format: &str) -> Option<String> {
    let format_parts: Vec<&str> = format.split(|c: char| !c.is_alphanumeric()).collect();
    let raw_parts: Vec<&str> = raw.split(|c: char| !c.is_alphanumeric()).collect();
    if format_parts.len() != raw_parts.len() {
        return None;
    }
    let mut year = None;
    let mut month = None;
    let mut day = None;
    for (token, value) in format_parts.iter().zip(&raw_parts) {
        match *token {
            "yyyy" | "yy" => year = Some(*value),
            "MM" | "M" => month = Some(*value),
            "dd" | "d" => day = Some(*value),
            _ => return None,
        }
    }
    let (year, month, day) = (year?, month?, day?);
    Some(format!("{year:0>4}-{month:0>2}-{day:0>2}"))
}
