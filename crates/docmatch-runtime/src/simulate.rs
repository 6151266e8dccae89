//! The greedy one-pass simulator: a tight, non-recursive loop over the
//! Line-NFA that drives the binding context and produces a `MatchResult`.
//!
//! Selection follows `spec.md` §4.3's three-tier preference policy exactly:
//! structural transitions are always applicable and tried first (in
//! declared order), an exact `MatchLine` is tried next, and fuzzy
//! (edit-distance) alternatives are tried last. This is deliberately *not*
//! a single linear scan over the declared transition order — the builder
//! emits a `Line`'s fuzzy transitions *before* its exact one (§4.2), so a
//! naive first-applicable-in-array-order scan would prefer a stray
//! Insertion over an exact match whenever both could apply. Tiering is
//! what makes "declared order is the greedy policy" actually hold.
//!
//! A handful of structural ops are "trivially true" in name only.
//! `REPEAT_ONE`/`REPEAT_ZERO` at a repeat's entry and `REPEAT_END`/
//! `REPEAT_MORE`/`REPEAT_ANYLINE_MORE` at its back-edge are each pairs
//! where the builder's declared order alone cannot encode "enter/continue
//! the body when it would match, stop otherwise" — both halves of each
//! pair are nominally always-applicable ε-transitions, so a pure
//! first-in-order scan would always pick the same one regardless of input
//! (REPEAT_ONE always beating REPEAT_ZERO makes an absent optional section
//! fail outright; REPEAT_END always beating REPEAT_MORE would cap every
//! repeat at one iteration). `structural_applies` closes that gap with a
//! one-step-ahead check — `line_reachable` walks the purely-structural
//! closure from a candidate target to see whether the current line would
//! actually be consumed from there — so the declared order still decides
//! ties, but only among genuinely applicable alternatives.

use docmatch_core::pattern::{PatternNodeData, PatternRoot, PropertyBinding};
use docmatch_core::{EditKind, Nfa, NodeId, Op, StateId, Transition};
use std::collections::HashSet;

use crate::binding::{BindingContext, CaptureEntry};
use crate::formatter::FormatterRegistry;
use crate::result::{FailureReason, MatchFailure, MatchResult, MatchSuccess};

/// A debug hook the simulator calls on every transition taken and every
/// property bound. Zero-cost when left at the default (empty) methods —
/// mirrors `plotnik-vm::engine::trace::{Tracer, NoopTracer}`, not a
/// logging dependency.
pub trait Tracer {
    fn on_transition(&mut self, _from: StateId, _transition: &Transition, _line_index: usize) {}
    fn on_bind(&mut self, _path: &str, _property: &str, _value: &str) {}
}

/// The default, side-effect-free tracer.
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// An optional bounded-iteration guard against pathological inputs.
/// Non-required per `spec.md` §5; `None` (the default) means unbounded.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchLimits {
    pub max_transitions: Option<usize>,
}

/// Drives one `find_match` call over a compiled `Nfa`.
///
/// Borrows everything it needs (`Nfa`, `PatternRoot`, `FormatterRegistry`)
/// and owns no per-match state itself — a fresh [`BindingContext`] is
/// created inside [`run`](Self::run), so a `Simulator` is safely reusable
/// (and shareable across threads) for any number of concurrent matches.
pub struct Simulator<'a> {
    nfa: &'a Nfa,
    root: &'a PatternRoot,
    formatters: &'a FormatterRegistry,
}

impl<'a> Simulator<'a> {
    pub fn new(nfa: &'a Nfa, root: &'a PatternRoot, formatters: &'a FormatterRegistry) -> Self {
        Self {
            nfa,
            root,
            formatters,
        }
    }

    pub fn run(&self, lines: &[&str]) -> MatchResult {
        self.run_with(lines, &mut NoopTracer, MatchLimits::default())
    }

    pub fn run_with(
        &self,
        lines: &[&str],
        tracer: &mut dyn Tracer,
        limits: MatchLimits,
    ) -> MatchResult {
        let mut state = self.nfa.start();
        let mut line_index = 0usize;
        let mut lines_matched = 0usize;
        let mut ctx = BindingContext::new();
        let mut steps = 0usize;

        loop {
            if self.nfa.is_accepting(state) {
                return MatchResult::Success(MatchSuccess {
                    record: ctx.to_record(),
                    lines_processed: line_index,
                    lines_matched,
                });
            }

            if let Some(max) = limits.max_transitions {
                if steps >= max {
                    return MatchResult::Failure(MatchFailure {
                        reason: FailureReason::Internal(format!(
                            "transition budget of {max} exceeded"
                        )),
                        lines_processed: line_index,
                    });
                }
            }

            let Some(transition) = self.select(state, line_index, lines) else {
                let reason = if line_index >= lines.len() {
                    FailureReason::Incomplete
                } else {
                    FailureReason::NoValidTransition {
                        line_index,
                        line_text: Some(lines[line_index].to_string()),
                    }
                };
                return MatchResult::Failure(MatchFailure {
                    reason,
                    lines_processed: line_index,
                });
            };

            tracer.on_transition(state, transition, line_index);

            if transition.op == Op::MatchLine {
                let current = lines.get(line_index).copied();
                self.execute_match_line(transition, current, &mut ctx, line_index, tracer);
                lines_matched += 1;
                line_index += 1;
            } else {
                self.execute_structural(transition, &mut ctx);
            }

            state = transition.target;
            steps += 1;
        }
    }

    /// The three-tier transition-selection policy (§4.3).
    fn select(&self, state: StateId, line_index: usize, lines: &[&str]) -> Option<&'a Transition> {
        let transitions = self.nfa.transitions(state);

        if let Some(t) = transitions
            .iter()
            .find(|t| is_structural(t) && self.structural_applies(transitions, t, line_index, lines))
        {
            return Some(t);
        }
        if let Some(t) = transitions
            .iter()
            .find(|t| t.op == Op::MatchLine && t.edit == EditKind::None && self.exact_applies(t, line_index, lines))
        {
            return Some(t);
        }
        if self.root.edit_distance > 0 {
            if let Some(t) = transitions
                .iter()
                .find(|t| fuzzy_applies(t, line_index, lines))
            {
                return Some(t);
            }
        }
        None
    }

    fn exact_applies(&self, t: &Transition, line_index: usize, lines: &[&str]) -> bool {
        let Some(text) = lines.get(line_index) else {
            return false;
        };
        match self.root.node(t.line_ref.expect("MatchLine carries a line_ref")) {
            PatternNodeData::Line(line_node) => line_node
                .line
                .compiled()
                .expect("regex already validated at compile time")
                .find(text)
                .is_some(),
            PatternNodeData::AnyLine(_) => true,
            _ => unreachable!("line_ref must name a Line or AnyLine node"),
        }
    }

    fn execute_match_line(
        &self,
        transition: &Transition,
        current_line: Option<&str>,
        ctx: &mut BindingContext,
        line_index: usize,
        tracer: &mut dyn Tracer,
    ) {
        if transition.edit != EditKind::None {
            // Fuzzy-matched lines (Substitution/Insertion) consume a line
            // but, per the resolved Open Question, never run the regex or
            // produce captures.
            return;
        }
        let text = current_line.expect("exact MatchLine requires a current line");
        let node_id = transition.line_ref.expect("MatchLine carries a line_ref");
        match self.root.node(node_id) {
            PatternNodeData::Line(line_node) => {
                let m = line_node
                    .line
                    .compiled()
                    .expect("regex already validated at compile time")
                    .find(text)
                    .expect("tier-2 selection already confirmed a match");
                for (index, binding) in line_node.bindings.iter().enumerate() {
                    let Some(group) = m.groups.get(index) else {
                        // Surplus bindings (k > m): no further property is bound.
                        break;
                    };
                    let raw = group.clone().unwrap_or_default();
                    self.bind_one(binding, raw, ctx, line_index, tracer);
                }
            }
            PatternNodeData::AnyLine(anyline_node) => {
                for binding in &anyline_node.bindings {
                    self.bind_one(binding, text.to_string(), ctx, line_index, tracer);
                }
            }
            _ => unreachable!("line_ref must name a Line or AnyLine node"),
        }
    }

    fn bind_one(
        &self,
        binding: &PropertyBinding,
        raw: String,
        ctx: &mut BindingContext,
        line_index: usize,
        tracer: &mut dyn Tracer,
    ) {
        let formatted = match &binding.formatter {
            Some(spec) => self.formatters.apply(&spec.name, &spec.args, &raw),
            None => raw.clone(),
        };
        let path = format!("{}/{}", ctx.current_path(), binding.property);
        ctx.record_capture(CaptureEntry {
            path: path.clone(),
            raw,
            formatted: formatted.clone(),
            line: line_index + 1,
            columns: None,
        });
        tracer.on_bind(&path, &binding.property, &formatted);
        ctx.bind_property(&binding.property, formatted);
    }

    fn execute_structural(&self, transition: &Transition, ctx: &mut BindingContext) {
        match transition.op {
            Op::StartGroup => ctx.push_object(self.bind_object_name(transition.composite_ref)),
            Op::EndGroup => ctx.pop_object(),
            Op::RepeatZero => {
                if let Some(repeat_id) = transition.composite_ref {
                    // Array-creation-law resolution: the skipped-body path
                    // still produces an empty array under bindArrayName.
                    let name = self.bind_array_name(repeat_id);
                    ctx.push_array(name);
                    ctx.pop_array();
                }
                // edit == Deletion (Line-level skip): genuinely a no-op.
            }
            Op::RepeatOne => {
                let repeat_id = transition
                    .composite_ref
                    .expect("RepeatOne carries a composite_ref");
                ctx.push_array(self.bind_array_name(repeat_id));
                ctx.push_array_item();
            }
            Op::RepeatMore | Op::RepeatAnylineMore => {
                ctx.pop_array_item();
                ctx.push_array_item();
            }
            Op::RepeatEnd => {
                ctx.pop_array_item();
                ctx.pop_array();
            }
            Op::OrSplit | Op::OrJoin | Op::StartContinuation | Op::EndContinuation => {}
            Op::MatchLine => unreachable!("MatchLine is handled by execute_match_line"),
        }
    }

    fn bind_object_name(&self, composite_ref: Option<NodeId>) -> &str {
        match composite_ref {
            None => &self.root.bind_object_name,
            Some(id) => match self.root.node(id) {
                PatternNodeData::Group(group) => &group.bind_object_name,
                _ => unreachable!("StartGroup/EndGroup composite_ref must name a Group"),
            },
        }
    }

    fn bind_array_name(&self, repeat_id: NodeId) -> &str {
        match self.root.node(repeat_id) {
            PatternNodeData::Repeat(repeat) => &repeat.bind_array_name,
            _ => unreachable!("Repeat* composite_ref must name a Repeat"),
        }
    }

    /// Whether a structural-tier transition's guard is satisfied. Most ops
    /// are trivially true per §4.3. The repeat-entry (`RepeatOne`) and
    /// repeat-loop (`RepeatMore`/`RepeatAnylineMore`/`RepeatEnd`)
    /// transitions are not: declared order alone can't tell "enter/continue
    /// the body" from "stop", since both halves of each pair are nominally
    /// unconditional ε-edges. `RepeatOne`/`RepeatMore`/`RepeatAnylineMore`
    /// are applicable only when the current line is actually reachable by
    /// walking forward through the body's structural transitions to a
    /// `MatchLine`; `RepeatEnd` is applicable when its sibling loop-back
    /// transition at this same state (if any) is *not* — i.e. stop only
    /// once continuing the loop genuinely can't consume the current line.
    fn structural_applies(
        &self,
        transitions: &[Transition],
        t: &Transition,
        line_index: usize,
        lines: &[&str],
    ) -> bool {
        match t.op {
            Op::RepeatOne | Op::RepeatMore | Op::RepeatAnylineMore => {
                self.line_reachable(t.target, line_index, lines)
            }
            Op::RepeatEnd => match transitions
                .iter()
                .find(|sibling| matches!(sibling.op, Op::RepeatMore | Op::RepeatAnylineMore))
            {
                Some(sibling) => !self.line_reachable(sibling.target, line_index, lines),
                None => true,
            },
            _ => true,
        }
    }

    /// Whether, starting from `start` and following only structural (ε)
    /// transitions, a `MatchLine` transition is reachable whose tier-2 or
    /// tier-3 guard currently holds against `lines[line_index]`. Bounded by
    /// a visited set since a repeat body's own back-edges would otherwise
    /// loop this search forever.
    fn line_reachable(&self, start: StateId, line_index: usize, lines: &[&str]) -> bool {
        let mut visited = HashSet::new();
        self.line_reachable_inner(start, line_index, lines, &mut visited)
    }

    fn line_reachable_inner(
        &self,
        state: StateId,
        line_index: usize,
        lines: &[&str],
        visited: &mut HashSet<StateId>,
    ) -> bool {
        if !visited.insert(state) {
            return false;
        }
        for t in self.nfa.transitions(state) {
            let reaches = match t.op {
                Op::MatchLine if t.edit == EditKind::None => {
                    self.exact_applies(t, line_index, lines)
                }
                Op::MatchLine => fuzzy_applies(t, line_index, lines) && self.root.edit_distance > 0,
                _ if is_structural(t) => {
                    self.line_reachable_inner(t.target, line_index, lines, visited)
                }
                _ => false,
            };
            if reaches {
                return true;
            }
        }
        false
    }
}

fn is_structural(t: &Transition) -> bool {
    !(t.op == Op::MatchLine || (t.op == Op::RepeatZero && t.edit == EditKind::Deletion))
}

fn fuzzy_applies(t: &Transition, line_index: usize, lines: &[&str]) -> bool {
    match (t.op, t.edit) {
        (Op::MatchLine, EditKind::Insertion) | (Op::MatchLine, EditKind::Substitution) => {
            line_index < lines.len()
        }
        (Op::RepeatZero, EditKind::Deletion) => true,
        _ => false,
    }
}

#[cfg(test)]
mod simulate_tests {
    use super::*;
    use docmatch_compiler::build_nfa;
    use docmatch_core::pattern::{PatternRootSpec, PatternSpec, PropertyBinding, RepeatMode};
    use docmatch_core::Value;

    fn prop(name: &str) -> PropertyBinding {
        PropertyBinding::new(name, None).unwrap()
    }

    fn line(regex: &str, bindings: Vec<PropertyBinding>) -> PatternSpec {
        PatternSpec::Line {
            comment: None,
            regex: regex.to_string(),
            bindings,
        }
    }

    fn run(root_spec: PatternRootSpec, lines: &[&str]) -> MatchResult {
        let root = PatternRoot::build(root_spec).unwrap();
        let nfa = build_nfa(&root);
        let formatters = FormatterRegistry::builtin();
        Simulator::new(&nfa, &root, &formatters).run(lines)
    }

    /// Scenario A — simple invoice, exact matching.
    #[test]
    fn scenario_a_simple_invoice() {
        let spec = PatternRootSpec {
            version: "1".into(),
            name: "invoice".into(),
            comment: None,
            bind_object: "invoice".into(),
            edit_distance: 0,
            children: vec![
                line(r"^Invoice #(\d+)$", vec![prop("id")]),
                PatternSpec::Repeat {
                    comment: None,
                    mode: RepeatMode::OneOrMore,
                    bind_array: "items".into(),
                    child: Box::new(line(
                        r"^(\S+)\s+(\d+)\s+([\d.]+)$",
                        vec![prop("name"), prop("qty"), prop("price")],
                    )),
                },
                line(r"^Total: ([\d.]+)$", vec![prop("total")]),
            ],
        };
        let result = run(
            spec,
            &[
                "Invoice #12345",
                "Pen 2 1.50",
                "Notebook 1 3.99",
                "Total: 6.99",
            ],
        );
        let success = result.as_success().expect("expected success");
        assert_eq!(success.lines_matched, 4);
        assert_eq!(success.lines_processed, 4);

        let invoice = success.record.get("invoice").unwrap();
        assert_eq!(invoice.get("id").and_then(Value::as_str), Some("12345"));
        assert_eq!(invoice.get("total").and_then(Value::as_str), Some("6.99"));
        let items = invoice.get("items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("name").and_then(Value::as_str), Some("Pen"));
        assert_eq!(
            items[1].get("name").and_then(Value::as_str),
            Some("Notebook")
        );
    }

    /// Scenario B — Or fallback to AnyLine, no bindings written.
    #[test]
    fn scenario_b_or_fallback() {
        let spec = PatternRootSpec {
            version: "1".into(),
            name: "r".into(),
            comment: None,
            bind_object: "r".into(),
            edit_distance: 0,
            children: vec![PatternSpec::Or {
                comment: None,
                children: vec![
                    line(r"^Total: ([\d.]+)$", vec![prop("total")]),
                    PatternSpec::AnyLine {
                        comment: None,
                        bindings: Vec::new(),
                    },
                ],
            }],
        };
        let result = run(spec, &["Subtotal: 1.00"]);
        let success = result.as_success().expect("expected success");
        assert_eq!(success.lines_matched, 1);
        assert_eq!(success.record.get("r").unwrap().get("total"), None);
    }

    /// Scenario C — optional section, both with and without the note.
    #[test]
    fn scenario_c_optional_section_absent() {
        let spec = || PatternRootSpec {
            version: "1".into(),
            name: "r".into(),
            comment: None,
            bind_object: "r".into(),
            edit_distance: 0,
            children: vec![
                PatternSpec::Repeat {
                    comment: None,
                    mode: RepeatMode::ZeroOrOne,
                    bind_array: "notes".into(),
                    child: Box::new(line(r"^Notes: (.+)$", vec![prop("note")])),
                },
                line(r"^End$", Vec::new()),
            ],
        };

        let absent = run(spec(), &["End"]).as_success().unwrap().clone();
        let notes = absent.record.get("r").unwrap().get("notes").unwrap();
        assert_eq!(notes.as_array().unwrap().len(), 0);

        let present = run(spec(), &["Notes: hi", "End"]).as_success().unwrap().clone();
        let notes = present.record.get("r").unwrap().get("notes").unwrap();
        let notes = notes.as_array().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].get("note").and_then(Value::as_str), Some("hi"));
    }

    /// Scenario D — fuzzy substitution produces no captures.
    #[test]
    fn scenario_d_fuzzy_substitution_has_no_captures() {
        let spec = PatternRootSpec {
            version: "1".into(),
            name: "r".into(),
            comment: None,
            bind_object: "r".into(),
            edit_distance: 1,
            children: vec![line(r"^Invoice #(\d+)$", vec![prop("id")])],
        };
        let result = run(spec, &["lnvoice #12345"]);
        let success = result.as_success().expect("expected fuzzy success");
        assert_eq!(success.record.get("r").unwrap().get("id"), None);
    }

    /// Scenario E — match failure at line 0.
    #[test]
    fn scenario_e_match_failure() {
        let spec = PatternRootSpec {
            version: "1".into(),
            name: "r".into(),
            comment: None,
            bind_object: "r".into(),
            edit_distance: 0,
            children: vec![line(r"^Hello: (.+)$", vec![prop("name")])],
        };
        let result = run(spec, &["Goodbye: World"]);
        let failure = result.as_failure().expect("expected failure");
        assert_eq!(failure.lines_processed, 1);
        assert!(failure.reason.to_string().contains("No valid transition found at line 0"));
    }

    /// Scenario F — greedy repeat stops exactly at the boundary.
    #[test]
    fn scenario_f_greedy_repeat_stops_at_boundary() {
        let spec = PatternRootSpec {
            version: "1".into(),
            name: "r".into(),
            comment: None,
            bind_object: "r".into(),
            edit_distance: 0,
            children: vec![
                PatternSpec::Repeat {
                    comment: None,
                    mode: RepeatMode::OneOrMore,
                    bind_array: "xs".into(),
                    child: Box::new(line(r"^\d+$", vec![prop("n")])),
                },
                line(r"^END$", Vec::new()),
            ],
        };
        let result = run(spec, &["1", "2", "3", "END"]);
        let success = result.as_success().expect("expected success");
        assert_eq!(success.lines_matched, 4);
        let xs = success.record.get("r").unwrap().get("xs").unwrap();
        assert_eq!(xs.as_array().unwrap().len(), 3);
    }

    /// Property #6 — ONE_OR_MORE with zero iterations is a MatchFailure.
    #[test]
    fn one_or_more_with_no_matching_lines_fails() {
        let spec = PatternRootSpec {
            version: "1".into(),
            name: "r".into(),
            comment: None,
            bind_object: "r".into(),
            edit_distance: 0,
            children: vec![PatternSpec::Repeat {
                comment: None,
                mode: RepeatMode::OneOrMore,
                bind_array: "xs".into(),
                child: Box::new(line(r"^\d+$", vec![prop("n")])),
            }],
        };
        let result = run(spec, &["not-a-digit"]);
        assert!(!result.is_success());
    }
}
