//! The pattern tree: a spec layer for construction, and an arena layer for
//! storage and lookup.
//!
//! Mirrors the split the teacher crate draws between a raw deserialization
//! shape and an ID-indexed analysis shape: [`PatternSpec`]/[`PatternRootSpec`]
//! are how a caller (or the JSON loader) assembles a pattern; [`PatternRoot`]
//! is the validated, immutable, arena-backed tree that the NFA builder and
//! simulator actually walk. `NodeId`s returned during construction are
//! reused directly as NFA composite-refs and line-refs, so transitions never
//! need to borrow from the tree.

use crate::error::PatternBuildError;
use crate::line::Line;

/// Index into a [`PatternRoot`]'s node arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// How many times a [`Repeat`]'s body may match.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RepeatMode {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
}

/// An opaque formatter reference: a name plus its parenthesized arguments,
/// e.g. `parseDate(yyyy-MM-dd)` becomes `{name: "parseDate", args: ["yyyy-MM-dd"]}`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FormatterSpec {
    pub name: Box<str>,
    pub args: Vec<Box<str>>,
}

/// A declaration that a capture group's text should be bound to a named
/// property of the enclosing object frame, optionally through a formatter.
#[derive(Clone, Debug)]
pub struct PropertyBinding {
    pub property: Box<str>,
    pub formatter: Option<FormatterSpec>,
}

impl PropertyBinding {
    pub fn new(
        property: &str,
        formatter: Option<FormatterSpec>,
    ) -> Result<Self, PatternBuildError> {
        Ok(Self {
            property: trimmed_non_empty(property, "property")?,
            formatter,
        })
    }
}

fn trimmed_non_empty(s: &str, field: &'static str) -> Result<Box<str>, PatternBuildError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(PatternBuildError::EmptyName { field });
    }
    Ok(trimmed.into())
}

// ===========================================================================
// Spec layer — ergonomic, recursively-owned construction tree.
// ===========================================================================

/// A pattern node as assembled by a caller, before validation and
/// arena-flattening into a [`PatternRoot`].
pub enum PatternSpec {
    Line {
        comment: Option<String>,
        regex: String,
        bindings: Vec<PropertyBinding>,
    },
    AnyLine {
        comment: Option<String>,
        bindings: Vec<PropertyBinding>,
    },
    Group {
        comment: Option<String>,
        bind_object: String,
        children: Vec<PatternSpec>,
    },
    Repeat {
        comment: Option<String>,
        mode: RepeatMode,
        bind_array: String,
        child: Box<PatternSpec>,
    },
    Or {
        comment: Option<String>,
        children: Vec<PatternSpec>,
    },
}

/// The top-level spec: a [`PatternSpec::Group`]-shaped child list plus the
/// root-only fields (`version`, `editDistance`, ...).
pub struct PatternRootSpec {
    pub version: String,
    pub name: String,
    pub comment: Option<String>,
    pub bind_object: String,
    pub edit_distance: u32,
    pub children: Vec<PatternSpec>,
}

// ===========================================================================
// Arena layer — validated, ID-indexed storage.
// ===========================================================================

pub struct LineNode {
    pub comment: Option<Box<str>>,
    pub line: Line,
    pub bindings: Vec<PropertyBinding>,
}

pub struct AnyLineNode {
    pub comment: Option<Box<str>>,
    pub bindings: Vec<PropertyBinding>,
}

pub struct GroupNode {
    pub comment: Option<Box<str>>,
    pub bind_object_name: Box<str>,
    pub children: Vec<NodeId>,
}

pub struct RepeatNode {
    pub comment: Option<Box<str>>,
    pub mode: RepeatMode,
    pub bind_array_name: Box<str>,
    pub child: NodeId,
}

pub struct OrNode {
    pub comment: Option<Box<str>>,
    pub children: Vec<NodeId>,
}

/// A single node in a [`PatternRoot`]'s arena.
pub enum PatternNodeData {
    Line(LineNode),
    AnyLine(AnyLineNode),
    Group(GroupNode),
    Repeat(RepeatNode),
    Or(OrNode),
}

impl PatternNodeData {
    /// Whether this node is an `AnyLine` — used by the NFA builder to pick
    /// the `REPEAT_END`/`REPEAT_ANYLINE_MORE` ordering under a `Repeat`.
    pub fn is_anyline(&self) -> bool {
        matches!(self, PatternNodeData::AnyLine(_))
    }
}

/// A validated, immutable, arena-backed pattern tree.
///
/// Deeply immutable and carries no mutable per-match state, so a single
/// `PatternRoot` (and the `Nfa` built from it) is safely shareable across
/// concurrent matches.
pub struct PatternRoot {
    pub version: Box<str>,
    pub name: Box<str>,
    pub comment: Option<Box<str>>,
    pub bind_object_name: Box<str>,
    pub edit_distance: u32,
    pub children: Vec<NodeId>,
    nodes: Vec<PatternNodeData>,
}

impl PatternRoot {
    /// Validate and flatten a [`PatternRootSpec`] into an arena-backed tree.
    pub fn build(spec: PatternRootSpec) -> Result<Self, PatternBuildError> {
        let bind_object_name = trimmed_non_empty(&spec.bind_object, "bindObject")?;
        let name = spec.name.trim().to_string().into_boxed_str();
        let comment = spec.comment.map(|c| c.into_boxed_str());

        let mut nodes = Vec::new();
        let mut children = Vec::with_capacity(spec.children.len());
        for child in spec.children {
            children.push(push_spec(&mut nodes, child)?);
        }

        Ok(Self {
            version: spec.version.into_boxed_str(),
            name,
            comment,
            bind_object_name,
            edit_distance: spec.edit_distance,
            children,
            nodes,
        })
    }

    /// Look up a node by id. Ids are only ever handed out by this tree, so
    /// this never panics for an id obtained from it.
    pub fn node(&self, id: NodeId) -> &PatternNodeData {
        &self.nodes[id.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every `Line` node's compiled-regex wrapper, in arena order. Used to
    /// force eager compilation so a bad regex is reported at compile time
    /// rather than on first match.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.nodes.iter().filter_map(|node| match node {
            PatternNodeData::Line(line_node) => Some(&line_node.line),
            _ => None,
        })
    }
}

fn push_spec(
    nodes: &mut Vec<PatternNodeData>,
    spec: PatternSpec,
) -> Result<NodeId, PatternBuildError> {
    let data = match spec {
        PatternSpec::Line {
            comment,
            regex,
            bindings,
        } => {
            let trimmed = regex.trim();
            if trimmed.is_empty() {
                return Err(PatternBuildError::EmptyRegex);
            }
            PatternNodeData::Line(LineNode {
                comment: comment.map(|c| c.into_boxed_str()),
                line: Line::new(trimmed),
                bindings,
            })
        }
        PatternSpec::AnyLine { comment, bindings } => PatternNodeData::AnyLine(AnyLineNode {
            comment: comment.map(|c| c.into_boxed_str()),
            bindings,
        }),
        PatternSpec::Group {
            comment,
            bind_object,
            children,
        } => {
            let bind_object_name = trimmed_non_empty(&bind_object, "bindObject")?;
            let mut child_ids = Vec::with_capacity(children.len());
            for child in children {
                child_ids.push(push_spec(nodes, child)?);
            }
            PatternNodeData::Group(GroupNode {
                comment: comment.map(|c| c.into_boxed_str()),
                bind_object_name,
                children: child_ids,
            })
        }
        PatternSpec::Repeat {
            comment,
            mode,
            bind_array,
            child,
        } => {
            let bind_array_name = trimmed_non_empty(&bind_array, "bindArray")?;
            let child_id = push_spec(nodes, *child)?;
            PatternNodeData::Repeat(RepeatNode {
                comment: comment.map(|c| c.into_boxed_str()),
                mode,
                bind_array_name,
                child: child_id,
            })
        }
        PatternSpec::Or { comment, children } => {
            if children.is_empty() {
                return Err(PatternBuildError::EmptyOr);
            }
            let mut child_ids = Vec::with_capacity(children.len());
            for child in children {
                child_ids.push(push_spec(nodes, child)?);
            }
            PatternNodeData::Or(OrNode {
                comment: comment.map(|c| c.into_boxed_str()),
                children: child_ids,
            })
        }
    };
    nodes.push(data);
    Ok(NodeId((nodes.len() - 1) as u32))
}
