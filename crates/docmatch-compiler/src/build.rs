//! The NFA builder: a visitor over a [`PatternRoot`] that emits a Line-NFA.
//!
//! One function per node kind, each returning an `(init, final)` state
//! pair, following the "single function dispatching on the node tag"
//! strategy — mirrors the match-on-`Expr`-variant dispatch style of the
//! teacher compiler's expression lowering, adapted from bytecode emission
//! to state-graph emission. A fresh `Nfa` owns the monotonic state counter;
//! nothing here is recursive-Rc or borrows across calls, since every
//! reference back into the pattern tree is a plain `NodeId`.

use docmatch_core::nfa::{deletion_skip, match_line, structural};
use docmatch_core::pattern::{GroupNode, OrNode, PatternNodeData, PatternRoot, RepeatMode, RepeatNode};
use docmatch_core::{EditKind, Nfa, NodeId, Op, StateId};

/// Build the Line-NFA for a whole pattern. The root acts as a Group: its
/// children are concatenated and wrapped in a `StartGroup`/`EndGroup` pair
/// whose composite-ref is `None` (meaning "read `bindObjectName` off the
/// root itself", not off an arena node).
pub fn build_nfa(root: &PatternRoot) -> Nfa {
    let mut nfa = Nfa::new();
    let outer_start = nfa.start();
    let (body_init, body_fin) = build_concat(&mut nfa, root, &root.children);
    let outer_accept = nfa.add_state();
    nfa.add_transition(outer_start, structural(Op::StartGroup, body_init, None));
    nfa.add_transition(body_fin, structural(Op::EndGroup, outer_accept, None));
    nfa.set_accept(outer_accept);
    nfa
}

fn build_node(nfa: &mut Nfa, root: &PatternRoot, id: NodeId) -> (StateId, StateId) {
    match root.node(id) {
        PatternNodeData::Line(_) => build_line(nfa, root, id),
        PatternNodeData::AnyLine(_) => build_anyline(nfa, id),
        PatternNodeData::Group(group) => build_group(nfa, root, id, group),
        PatternNodeData::Repeat(repeat) => build_repeat(nfa, root, id, repeat),
        PatternNodeData::Or(or) => build_or(nfa, root, or),
    }
}

/// Concatenation of a sibling list: chain each child's `(init, final)` pair
/// with a `StartContinuation` join; an empty list is a single
/// `StartContinuation` edge between two fresh states.
fn build_concat(nfa: &mut Nfa, root: &PatternRoot, children: &[NodeId]) -> (StateId, StateId) {
    if children.is_empty() {
        let init = nfa.add_state();
        let fin = nfa.add_state();
        nfa.add_transition(init, structural(Op::StartContinuation, fin, None));
        return (init, fin);
    }

    let mut inits = Vec::with_capacity(children.len());
    let mut fins = Vec::with_capacity(children.len());
    for &child in children {
        let (child_init, child_fin) = build_node(nfa, root, child);
        inits.push(child_init);
        fins.push(child_fin);
    }
    for i in 0..children.len() - 1 {
        nfa.add_transition(fins[i], structural(Op::StartContinuation, inits[i + 1], None));
    }
    (inits[0], *fins.last().unwrap())
}

fn build_line(nfa: &mut Nfa, root: &PatternRoot, id: NodeId) -> (StateId, StateId) {
    let init = nfa.add_state();
    let fin = nfa.add_state();
    if root.edit_distance > 0 {
        nfa.add_transition(init, match_line(EditKind::Insertion, init, id));
        nfa.add_transition(init, deletion_skip(fin));
        nfa.add_transition(init, match_line(EditKind::Substitution, fin, id));
    }
    nfa.add_transition(init, match_line(EditKind::None, fin, id));
    (init, fin)
}

fn build_anyline(nfa: &mut Nfa, id: NodeId) -> (StateId, StateId) {
    let init = nfa.add_state();
    let fin = nfa.add_state();
    nfa.add_transition(init, match_line(EditKind::None, fin, id));
    (init, fin)
}

fn build_group(nfa: &mut Nfa, root: &PatternRoot, id: NodeId, group: &GroupNode) -> (StateId, StateId) {
    let (body_init, body_fin) = build_concat(nfa, root, &group.children);
    let init = nfa.add_state();
    let fin = nfa.add_state();
    nfa.add_transition(init, structural(Op::StartGroup, body_init, Some(id)));
    nfa.add_transition(body_fin, structural(Op::EndGroup, fin, Some(id)));
    (init, fin)
}

fn build_or(nfa: &mut Nfa, root: &PatternRoot, or: &OrNode) -> (StateId, StateId) {
    let init = nfa.add_state();
    let fin = nfa.add_state();
    for &child in &or.children {
        let (child_init, child_fin) = build_node(nfa, root, child);
        nfa.add_transition(init, structural(Op::OrSplit, child_init, None));
        nfa.add_transition(child_fin, structural(Op::OrJoin, fin, None));
    }
    (init, fin)
}

fn build_repeat(nfa: &mut Nfa, root: &PatternRoot, id: NodeId, repeat: &RepeatNode) -> (StateId, StateId) {
    let (body_init, body_fin) = build_node(nfa, root, repeat.child);
    let init = nfa.add_state();
    let fin = nfa.add_state();
    let anyline_body = root.node(repeat.child).is_anyline();

    match repeat.mode {
        RepeatMode::ZeroOrMore => {
            // spec.md §9's ZERO_OR_MORE emission-order open question is
            // resolved by swapping the order: REPEAT_ONE before
            // REPEAT_ZERO, so the simulator's declared-order tie-break
            // within the structural tier prefers entering the body.
            nfa.add_transition(init, structural(Op::RepeatOne, body_init, Some(id)));
            nfa.add_transition(init, structural(Op::RepeatZero, fin, Some(id)));
            add_loop_back(nfa, body_fin, body_init, fin, id, anyline_body);
        }
        RepeatMode::OneOrMore => {
            nfa.add_transition(init, structural(Op::RepeatOne, body_init, Some(id)));
            add_loop_back(nfa, body_fin, body_init, fin, id, anyline_body);
        }
        RepeatMode::ZeroOrOne => {
            // Same ambiguity as ZERO_OR_MORE applies here (there is still a
            // skip edge at `init` competing with entering the body), so the
            // same emission-order fix is applied for consistency.
            nfa.add_transition(init, structural(Op::RepeatOne, body_init, Some(id)));
            nfa.add_transition(init, structural(Op::RepeatZero, fin, Some(id)));
            nfa.add_transition(body_fin, structural(Op::RepeatEnd, fin, Some(id)));
        }
    }
    (init, fin)
}

/// The back-edge out of a repeat body, shared by ZERO_OR_MORE and
/// ONE_OR_MORE. For a non-`AnyLine` body, `REPEAT_END` is listed before
/// `REPEAT_MORE`; for an `AnyLine` body the order is flipped
/// (`REPEAT_ANYLINE_MORE` before `REPEAT_END`) so a greedy walk still
/// prefers looping when another line is available, without diverging once
/// it isn't (§4.3's AnyLine non-divergence property).
fn add_loop_back(
    nfa: &mut Nfa,
    body_fin: StateId,
    body_init: StateId,
    fin: StateId,
    repeat_id: NodeId,
    anyline_body: bool,
) {
    if anyline_body {
        nfa.add_transition(
            body_fin,
            structural(Op::RepeatAnylineMore, body_init, Some(repeat_id)),
        );
        nfa.add_transition(body_fin, structural(Op::RepeatEnd, fin, Some(repeat_id)));
    } else {
        nfa.add_transition(body_fin, structural(Op::RepeatEnd, fin, Some(repeat_id)));
        nfa.add_transition(body_fin, structural(Op::RepeatMore, body_init, Some(repeat_id)));
    }
}
