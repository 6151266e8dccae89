//! End-to-end scenarios, reproduced literally from the specification's
//! worked examples. Exercises the public `Matcher` facade only.

use docmatch::{Matcher, PatternRootSpec, PatternSpec, PropertyBinding, RepeatMode, Value};

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

fn root(bind_object: &str, edit_distance: u32, children: Vec<PatternSpec>) -> PatternRootSpec {
    PatternRootSpec {
        version: "1".into(),
        name: "scenario".into(),
        comment: None,
        bind_object: bind_object.into(),
        edit_distance,
        children,
    }
}

#[test]
fn scenario_a_simple_invoice() {
    let matcher = Matcher::compile(root(
        "invoice",
        0,
        vec![
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
    ))
    .unwrap();

    let result = matcher.find_match(&[
        "Invoice #12345",
        "Pen 2 1.50",
        "Notebook 1 3.99",
        "Total: 6.99",
    ]);
    let success = result.as_success().expect("expected success");
    assert_eq!(success.lines_matched, 4);
    assert_eq!(success.lines_processed, 4);

    let invoice = success.record.get("invoice").unwrap();
    assert_eq!(invoice.get("id").and_then(Value::as_str), Some("12345"));
    assert_eq!(invoice.get("total").and_then(Value::as_str), Some("6.99"));
    let items = invoice.get("items").unwrap().as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get("price").and_then(Value::as_str), Some("1.50"));
    assert_eq!(items[1].get("name").and_then(Value::as_str), Some("Notebook"));
}

#[test]
fn scenario_b_or_fallback_binds_nothing() {
    let matcher = Matcher::compile(root(
        "r",
        0,
        vec![PatternSpec::Or {
            comment: None,
            children: vec![
                line(r"^Total: ([\d.]+)$", vec![prop("total")]),
                PatternSpec::AnyLine {
                    comment: None,
                    bindings: Vec::new(),
                },
            ],
        }],
    ))
    .unwrap();

    let result = matcher.find_match(&["Subtotal: 1.00"]);
    let success = result.as_success().expect("expected success");
    assert_eq!(success.lines_matched, 1);
    assert_eq!(success.lines_processed, 1);
    assert_eq!(success.record.get("r").unwrap().get("total"), None);
}

#[test]
fn scenario_c_optional_section_both_ways() {
    let spec = || {
        root(
            "r",
            0,
            vec![
                PatternSpec::Repeat {
                    comment: None,
                    mode: RepeatMode::ZeroOrOne,
                    bind_array: "notes".into(),
                    child: Box::new(line(r"^Notes: (.+)$", vec![prop("note")])),
                },
                line(r"^End$", Vec::new()),
            ],
        )
    };

    let absent = Matcher::compile(spec()).unwrap();
    let result = absent.find_match(&["End"]);
    let success = result.as_success().unwrap();
    assert_eq!(success.lines_matched, 1);
    let notes = success.record.get("r").unwrap().get("notes").unwrap();
    assert_eq!(notes.as_array().unwrap().len(), 0);

    let present = Matcher::compile(spec()).unwrap();
    let result = present.find_match(&["Notes: hi", "End"]);
    let success = result.as_success().unwrap();
    assert_eq!(success.lines_matched, 2);
    let notes = success.record.get("r").unwrap().get("notes").unwrap();
    let notes = notes.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].get("note").and_then(Value::as_str), Some("hi"));
}

#[test]
fn scenario_d_fuzzy_match_yields_no_captures() {
    let matcher = Matcher::compile(root(
        "r",
        1,
        vec![line(r"^Invoice #(\d+)$", vec![prop("id")])],
    ))
    .unwrap();

    let result = matcher.find_match(&["lnvoice #12345"]);
    let success = result.as_success().expect("expected fuzzy success");
    assert_eq!(success.record.get("r").unwrap().get("id"), None);
}

#[test]
fn scenario_e_match_failure_reports_line_zero() {
    let matcher = Matcher::compile(root(
        "r",
        0,
        vec![line(r"^Hello: (.+)$", vec![prop("name")])],
    ))
    .unwrap();

    let result = matcher.find_match(&["Goodbye: World"]);
    let failure = result.as_failure().expect("expected failure");
    assert_eq!(failure.lines_processed, 1);
    assert!(failure
        .reason
        .to_string()
        .contains("No valid transition found at line 0"));
}

#[test]
fn scenario_f_greedy_repeat_stops_at_boundary() {
    let matcher = Matcher::compile(root(
        "r",
        0,
        vec![
            PatternSpec::Repeat {
                comment: None,
                mode: RepeatMode::OneOrMore,
                bind_array: "xs".into(),
                child: Box::new(line(r"^\d+$", vec![prop("n")])),
            },
            line(r"^END$", Vec::new()),
        ],
    ))
    .unwrap();

    let result = matcher.find_match(&["1", "2", "3", "END"]);
    let success = result.as_success().expect("expected success");
    assert_eq!(success.lines_matched, 4);
    let xs = success.record.get("r").unwrap().get("xs").unwrap();
    assert_eq!(xs.as_array().unwrap().len(), 3);
}

#[test]
fn scenario_a_via_json_wire_format() {
    let json = r#"{
        "version": "1",
        "name": "invoice",
        "bindObject": "invoice",
        "elements": [
            {"line": {"regex": "^Invoice #(\\d+)$", "bindProperties": [{"property": "id"}]}},
            {"repeat": {
                "mode": "oneOrMore",
                "bindArray": "items",
                "elements": [
                    {"line": {
                        "regex": "^(\\S+)\\s+(\\d+)\\s+([\\d.]+)$",
                        "bindProperties": [
                            {"property": "name"},
                            {"property": "qty"},
                            {"property": "price"}
                        ]
                    }}
                ]
            }},
            {"line": {"regex": "^Total: ([\\d.]+)$", "bindProperties": [{"property": "total"}]}}
        ]
    }"#;

    let matcher = Matcher::compile_json(json).unwrap();
    let result = matcher.find_match(&[
        "Invoice #12345",
        "Pen 2 1.50",
        "Notebook 1 3.99",
        "Total: 6.99",
    ]);
    let success = result.as_success().expect("expected success");
    let invoice = success.record.get("invoice").unwrap();
    assert_eq!(invoice.get("id").and_then(Value::as_str), Some("12345"));
}
