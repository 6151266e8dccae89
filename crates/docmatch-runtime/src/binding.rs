//! The binding context: a stack of frames that the simulator drives to
//! incrementally build the output record.
//!
//! Grounded in `plotnik-vm::engine::frame::FrameArena`, but trimmed to a
//! plain `Vec<Frame>` — the greedy one-pass simulator never backtracks, so
//! there is no need for that arena's checkpoint/restore machinery. Each
//! frame accumulates its fields in an `indexmap::IndexMap`, mirroring the
//! teacher's own use of `IndexMap` for insertion-ordered construction;
//! popping a frame freezes it into a plain `Vec<(Box<str>, Value)>` inside
//! a `Value::Object`, which is the shape the rest of the crate (and
//! `serde_json::to_string`) actually consumes.
//!
//! Every public operation here is a `UsageState` boundary (spec.md §7): an
//! impossible call order is a programming error, not a recoverable result,
//! so misuse panics via `expect`/`debug_assert!` rather than returning
//! `Result` — the same idiom as `FrameArena::pop`'s
//! `.expect("pop on empty frame stack")`.

use docmatch_core::Value;
use indexmap::IndexMap;

/// One bound property's provenance, kept for future position reporting.
///
/// Not exposed by [`crate::result::MatchResult`] today; carried because the
/// capture log is part of the binding context's contract even though the
/// MVP result type doesn't surface it yet.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureEntry {
    pub path: String,
    pub raw: String,
    pub formatted: String,
    pub line: usize,
    pub columns: Option<(usize, usize)>,
}

enum Frame {
    Object {
        name: Option<Box<str>>,
        fields: IndexMap<Box<str>, Value>,
    },
    Array {
        name: Box<str>,
        items: Vec<Value>,
    },
    ArrayItem {
        fields: IndexMap<Box<str>, Value>,
    },
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Object { .. } => "object",
            Frame::Array { .. } => "array",
            Frame::ArrayItem { .. } => "array-item",
        }
    }
}

/// The stack of frames backing one `find_match` call.
///
/// Owned per call, never shared: the simulator constructs a fresh
/// `BindingContext` for every match, so there is no aliasing between
/// concurrent `find_match` calls on the same `Matcher`.
pub struct BindingContext {
    stack: Vec<Frame>,
    captures: Vec<CaptureEntry>,
}

impl BindingContext {
    /// A fresh context holding only the synthetic root object frame.
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::Object {
                name: None,
                fields: IndexMap::new(),
            }],
            captures: Vec::new(),
        }
    }

    /// Push a new object frame named `name` under the current frame.
    pub fn push_object(&mut self, name: &str) {
        debug_assert!(!name.is_empty(), "push_object: name must not be empty");
        self.stack.push(Frame::Object {
            name: Some(name.into()),
            fields: IndexMap::new(),
        });
    }

    /// Pop the top object frame, attaching it to its enclosing frame.
    pub fn pop_object(&mut self) {
        match self.stack.pop().expect("pop_object: frame stack is empty") {
            Frame::Object { name, fields } => self.attach(name, to_object_value(fields)),
            other => panic!("pop_object: top frame is {}, not object", other.kind()),
        }
    }

    /// Push a new (initially empty) array frame named `name`.
    pub fn push_array(&mut self, name: &str) {
        debug_assert!(!name.is_empty(), "push_array: name must not be empty");
        self.stack.push(Frame::Array {
            name: name.into(),
            items: Vec::new(),
        });
    }

    /// Pop the top array frame, attaching it to its enclosing frame.
    pub fn pop_array(&mut self) {
        match self.stack.pop().expect("pop_array: frame stack is empty") {
            Frame::Array { name, items } => self.attach(Some(name), Value::Array(items)),
            other => panic!("pop_array: top frame is {}, not array", other.kind()),
        }
    }

    /// Push a new array-item (object) frame onto the current array frame.
    pub fn push_array_item(&mut self) {
        debug_assert!(
            matches!(self.stack.last(), Some(Frame::Array { .. })),
            "push_array_item: top frame is not an array"
        );
        self.stack.push(Frame::ArrayItem {
            fields: IndexMap::new(),
        });
    }

    /// Pop the top array-item frame and append it as the next element of
    /// the enclosing array frame.
    pub fn pop_array_item(&mut self) {
        let fields = match self
            .stack
            .pop()
            .expect("pop_array_item: frame stack is empty")
        {
            Frame::ArrayItem { fields } => fields,
            other => panic!(
                "pop_array_item: top frame is {}, not array-item",
                other.kind()
            ),
        };
        match self.stack.last_mut() {
            Some(Frame::Array { items, .. }) => items.push(to_object_value(fields)),
            other => panic!(
                "pop_array_item: enclosing frame is {}, not array",
                other.map(Frame::kind).unwrap_or("<empty>")
            ),
        }
    }

    /// Bind `name` to `value` in the current object or array-item frame.
    pub fn bind_property(&mut self, name: &str, value: String) {
        debug_assert!(!name.is_empty(), "bind_property: name must not be empty");
        match self.stack.last_mut() {
            Some(Frame::Object { fields, .. }) | Some(Frame::ArrayItem { fields }) => {
                fields.insert(name.into(), Value::String(value));
            }
            other => panic!(
                "bind_property: top frame is {}, not an object",
                other.map(Frame::kind).unwrap_or("<empty>")
            ),
        }
    }

    fn attach(&mut self, name: Option<Box<str>>, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::Object { fields, .. }) => {
                let name = name.expect("attach: object child requires a name");
                fields.insert(name, value);
            }
            Some(Frame::ArrayItem { fields }) => {
                let name = name.expect("attach: array-item child requires a name");
                fields.insert(name, value);
            }
            Some(Frame::Array { items, .. }) => {
                // Per spec.md §4.4: pushing a named child onto an array
                // frame is unused by any tree the builder emits, but must
                // not corrupt state — fold it in as a plain element.
                items.push(value);
            }
            None => panic!("attach: frame stack is empty"),
        }
    }

    /// A JSON-Pointer-like path built from frame names and, for arrays, the
    /// index of the element currently being filled in. Used only for
    /// capture logs and diagnostics.
    pub fn current_path(&self) -> String {
        let mut path = String::new();
        for frame in &self.stack {
            match frame {
                Frame::Object { name: Some(n), .. } => {
                    path.push('/');
                    path.push_str(n);
                }
                Frame::Object { name: None, .. } => {}
                Frame::Array { name, items } => {
                    path.push('/');
                    path.push_str(name);
                    path.push('/');
                    path.push_str(&items.len().to_string());
                }
                Frame::ArrayItem { .. } => {}
            }
        }
        path
    }

    pub fn record_capture(&mut self, entry: CaptureEntry) {
        self.captures.push(entry);
    }

    pub fn captures(&self) -> &[CaptureEntry] {
        &self.captures
    }

    /// A deep, insertion-order-preserving snapshot of the synthetic root
    /// frame. Only meaningful once the stack has unwound back to that
    /// single frame, i.e. at a successful match's end.
    pub fn to_record(&self) -> Value {
        match &self.stack[0] {
            Frame::Object { fields, .. } => to_object_value(fields.clone()),
            _ => unreachable!("the synthetic root frame is always an object"),
        }
    }
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

fn to_object_value(fields: IndexMap<Box<str>, Value>) -> Value {
    Value::Object(fields.into_iter().collect())
}

#[cfg(test)]
mod binding_tests {
    use super::*;

    #[test]
    fn object_round_trip_preserves_order() {
        let mut ctx = BindingContext::new();
        ctx.push_object("invoice");
        ctx.bind_property("id", "12345".to_string());
        ctx.bind_property("total", "6.99".to_string());
        ctx.pop_object();

        let record = ctx.to_record();
        let invoice = record.get("invoice").unwrap();
        assert_eq!(invoice.get("id").and_then(Value::as_str), Some("12345"));
        assert_eq!(invoice.get("total").and_then(Value::as_str), Some("6.99"));
    }

    #[test]
    fn array_with_items_accumulates_in_order() {
        let mut ctx = BindingContext::new();
        ctx.push_object("r");
        ctx.push_array("items");
        ctx.push_array_item();
        ctx.bind_property("n", "1".to_string());
        ctx.pop_array_item();
        ctx.push_array_item();
        ctx.bind_property("n", "2".to_string());
        ctx.pop_array_item();
        ctx.pop_array();
        ctx.pop_object();

        let record = ctx.to_record();
        let items = record.get("r").unwrap().get("items").unwrap();
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("n").and_then(Value::as_str), Some("1"));
        assert_eq!(items[1].get("n").and_then(Value::as_str), Some("2"));
    }

    #[test]
    fn empty_array_is_present_with_zero_elements() {
        let mut ctx = BindingContext::new();
        ctx.push_object("r");
        ctx.push_array("notes");
        ctx.pop_array();
        ctx.pop_object();

        let record = ctx.to_record();
        let notes = record.get("r").unwrap().get("notes").unwrap();
        assert_eq!(notes.as_array().unwrap().len(), 0);
    }

    #[test]
    #[should_panic(expected = "top frame is object, not array")]
    fn pop_array_on_object_frame_panics() {
        let mut ctx = BindingContext::new();
        ctx.push_object("r");
        ctx.pop_array();
    }

    #[test]
    fn current_path_reports_array_index() {
        let mut ctx = BindingContext::new();
        ctx.push_object("r");
        ctx.push_array("items");
        ctx.push_array_item();
        assert_eq!(ctx.current_path(), "/r/items/0");
    }
}
