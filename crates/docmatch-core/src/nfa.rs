//! The line-NFA: a Thompson-style state graph whose transitions consume
//! whole lines (or are pattern-structural epsilons) rather than characters.
//!
//! Grounded in the index-newtype arena idiom from a hand-rolled automata
//! implementation in the reference pack (`State(usize)` over a flat `Vec`),
//! adapted to carry the richer transition shape a document pattern needs:
//! a bare op kind, an edit kind (exact vs. fuzzy), and optional references
//! back into the originating `PatternRoot` arena. Using index newtypes
//! instead of `Rc`/`RefCell` keeps the repeat back-edge (a genuine cycle)
//! trivial to represent, and keeps a `Transition` `Copy`.

use crate::pattern::NodeId;

/// Index into an [`Nfa`]'s state arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// The action a transition performs, independent of whether it's an exact
/// or fuzzy line match.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    /// Consume one line against `line_ref`'s line (checked by `edit`).
    MatchLine,
    /// Enter the alternation; the simulator fans out to every outgoing
    /// `OrSplit` transition in declaration order.
    OrSplit,
    /// Rejoin after an alternation branch completes.
    OrJoin,
    /// Skip a repeat body entirely (`edit == None`), or — reused at a
    /// `Line`'s own edit-distance entry state — skip the expected line
    /// without consuming one (`edit == Deletion`).
    RepeatZero,
    /// Take the repeat body for the first time this repeat instance.
    RepeatOne,
    /// Loop back into the body for another iteration.
    RepeatMore,
    /// The `AnyLine`-body repeat's "consume another line and stay" edge,
    /// kept distinct from `RepeatMore` so the builder can flip its
    /// emission order relative to `RepeatEnd` (see §4.2's AnyLine variant).
    RepeatAnylineMore,
    /// Leave the repeat; no further iterations will be attempted.
    RepeatEnd,
    /// Push a new object frame named by `composite_ref`'s `bindObjectName`
    /// (or the pattern root's, when `composite_ref` is `None`).
    StartGroup,
    /// Pop the object frame pushed by the matching `StartGroup`.
    EndGroup,
    /// Join point between concatenated siblings; no binding-context effect.
    StartContinuation,
    /// Reserved concatenation-exit counterpart to `StartContinuation`; the
    /// builder currently never emits this as a distinct transition (the
    /// next sibling's entry state serves as the join point), but the op
    /// kind is part of the data model so the simulator still matches on it.
    EndContinuation,
}

/// Which per-line comparison a `MatchLine` transition performs, or `None`
/// for every structural op.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EditKind {
    None,
    Substitution,
    Deletion,
    Insertion,
}

/// One outgoing edge of a state.
///
/// `composite_ref` names the `Group`/`Repeat`/`Or` node a structural
/// transition belongs to (for `StartGroup`/`EndGroup`, `None` denotes the
/// pattern root); `line_ref` names the `Line`/`AnyLine` node a `MatchLine`
/// transition reads from. Both borrow from the same `PatternRoot` arena the
/// `Nfa` was built from.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    pub op: Op,
    pub edit: EditKind,
    pub target: StateId,
    pub composite_ref: Option<NodeId>,
    pub line_ref: Option<NodeId>,
}

struct State {
    transitions: Vec<Transition>,
}

/// A validated line-NFA built from a [`PatternRoot`](crate::pattern::PatternRoot).
///
/// Like the pattern tree it's built from, an `Nfa` is immutable once built
/// and carries no per-match state, so the simulator only ever needs shared
/// (`&Nfa`) access, even across concurrent matches.
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    /// An NFA with a single, unconnected start/accept state. Builders grow
    /// it with [`add_state`](Self::add_state) and
    /// [`add_transition`](Self::add_transition), then call
    /// [`set_start`](Self::set_start)/[`set_accept`](Self::set_accept) once
    /// the whole pattern tree has been lowered.
    pub fn new() -> Self {
        let mut nfa = Self {
            states: Vec::new(),
            start: StateId(0),
            accept: StateId(0),
        };
        let root = nfa.add_state();
        nfa.start = root;
        nfa.accept = root;
        nfa
    }

    pub fn add_state(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State {
            transitions: Vec::new(),
        });
        id
    }

    /// Append a transition to `from`'s outgoing list, in the order given —
    /// that order is the simulator's selection priority (§4.3).
    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.states[from.0 as usize].transitions.push(transition);
    }

    pub fn set_start(&mut self, state: StateId) {
        self.start = state;
    }

    pub fn set_accept(&mut self, state: StateId) {
        self.accept = state;
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        state == self.accept
    }

    /// Outgoing transitions of `state`, in declared order.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.states[state.0 as usize].transitions
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructor for a structural (non-`MatchLine`) transition.
pub fn structural(op: Op, target: StateId, composite_ref: Option<NodeId>) -> Transition {
    Transition {
        op,
        edit: EditKind::None,
        target,
        composite_ref,
        line_ref: None,
    }
}

/// Convenience constructor for a `MatchLine` transition.
pub fn match_line(edit: EditKind, target: StateId, line_ref: NodeId) -> Transition {
    Transition {
        op: Op::MatchLine,
        edit,
        target,
        composite_ref: None,
        line_ref: Some(line_ref),
    }
}

/// The Line edit-distance "skip the expected line, consume nothing" edge:
/// a `RepeatZero` op reused outside any `Repeat`, tagged `Deletion` so the
/// simulator treats it as a fuzzy (tier-3) alternative rather than an
/// always-applicable structural one.
pub fn deletion_skip(target: StateId) -> Transition {
    Transition {
        op: Op::RepeatZero,
        edit: EditKind::Deletion,
        target,
        composite_ref: None,
        line_ref: None,
    }
}
