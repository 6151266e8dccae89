//! JSON ingestion: deserialize a pattern document 1:1 into `Raw*` shapes,
//! then lower those into the `docmatch_core::pattern` spec layer.
//!
//! The wire shape mirrors the pattern model directly: each element is a
//! single-key object whose key names its kind (`group`, `repeat`, `or`,
//! `line`, `anyline`) — serde's default externally-tagged enum
//! representation gives us exactly that for free, so `RawElement` needs no
//! `#[serde(tag = ...)]`. All validation — non-empty names, non-empty `Or`
//! children, trimming — happens once, in `PatternRoot::build`, not twice.

use docmatch_core::pattern::{
    FormatterSpec, PatternRootSpec, PatternSpec, PropertyBinding, RepeatMode,
};
use docmatch_core::PatternBuildError;
use serde::Deserialize;

/// Failure while turning a JSON document into a validated pattern.
#[derive(Debug, thiserror::Error)]
pub enum JsonLoadError {
    #[error("invalid pattern JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid formatter expression `{0}`")]
    BadFormatter(String),
    #[error(transparent)]
    Build(#[from] PatternBuildError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoot {
    version: String,
    name: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    bind_object: Option<String>,
    #[serde(default)]
    edit_distance: u32,
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
struct RawBindProperty {
    property: String,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawElement {
    Group {
        #[serde(default)]
        comment: Option<String>,
        #[serde(rename = "bindObject")]
        bind_object: String,
        #[serde(default)]
        elements: Vec<RawElement>,
    },
    Repeat {
        #[serde(default)]
        comment: Option<String>,
        mode: RawRepeatMode,
        #[serde(rename = "bindArray")]
        bind_array: String,
        #[serde(default)]
        elements: Vec<RawElement>,
    },
    Or {
        #[serde(default)]
        comment: Option<String>,
        #[serde(default)]
        elements: Vec<RawElement>,
    },
    Line {
        #[serde(default)]
        comment: Option<String>,
        regex: String,
        #[serde(rename = "bindProperties", default)]
        bind_properties: Vec<RawBindProperty>,
    },
    Anyline {
        #[serde(default)]
        comment: Option<String>,
        #[serde(rename = "bindProperties", default)]
        bind_properties: Vec<RawBindProperty>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum RawRepeatMode {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
}

impl From<RawRepeatMode> for RepeatMode {
    fn from(mode: RawRepeatMode) -> Self {
        match mode {
            RawRepeatMode::ZeroOrMore => RepeatMode::ZeroOrMore,
            RawRepeatMode::OneOrMore => RepeatMode::OneOrMore,
            RawRepeatMode::ZeroOrOne => RepeatMode::ZeroOrOne,
        }
    }
}

/// Parse `name(arg1, arg2, …)`, `name()`, or a bare `name` into a
/// [`FormatterSpec`].
fn parse_formatter(expr: &str) -> Result<FormatterSpec, JsonLoadError> {
    let expr = expr.trim();
    let Some(open) = expr.find('(') else {
        if expr.is_empty() {
            return Err(JsonLoadError::BadFormatter(expr.to_string()));
        }
        return Ok(FormatterSpec {
            name: expr.into(),
            args: Vec::new(),
        });
    };
    if !expr.ends_with(')') {
        return Err(JsonLoadError::BadFormatter(expr.to_string()));
    }
    let name = expr[..open].trim();
    if name.is_empty() {
        return Err(JsonLoadError::BadFormatter(expr.to_string()));
    }
    let inner = &expr[open + 1..expr.len() - 1];
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(|a| a.trim().into()).collect()
    };
    Ok(FormatterSpec {
        name: name.into(),
        args,
    })
}

fn lower_bind_property(raw: RawBindProperty) -> Result<PropertyBinding, JsonLoadError> {
    let formatter = raw.format.as_deref().map(parse_formatter).transpose()?;
    Ok(PropertyBinding::new(&raw.property, formatter)?)
}

fn lower_bind_properties(
    raw: Vec<RawBindProperty>,
) -> Result<Vec<PropertyBinding>, JsonLoadError> {
    raw.into_iter().map(lower_bind_property).collect()
}

fn lower_element(raw: RawElement) -> Result<PatternSpec, JsonLoadError> {
    Ok(match raw {
        RawElement::Line {
            comment,
            regex,
            bind_properties,
        } => PatternSpec::Line {
            comment,
            regex,
            bindings: lower_bind_properties(bind_properties)?,
        },
        RawElement::Anyline {
            comment,
            bind_properties,
        } => PatternSpec::AnyLine {
            comment,
            bindings: lower_bind_properties(bind_properties)?,
        },
        RawElement::Group {
            comment,
            bind_object,
            elements,
        } => PatternSpec::Group {
            comment,
            bind_object,
            children: lower_elements(elements)?,
        },
        RawElement::Repeat {
            comment,
            mode,
            bind_array,
            elements,
        } => {
            let mut children = lower_elements(elements)?;
            // §3: Repeat has exactly one child element; a composite is used
            // when multiple are needed. The wire format still carries a
            // list (symmetric with group/or), so a multi-element repeat
            // body is implicitly wrapped into an anonymous Group. An empty
            // list has no element to wrap or promote.
            let child = if children.is_empty() {
                return Err(PatternBuildError::MissingRepeatChild.into());
            } else if children.len() == 1 {
                children.remove(0)
            } else {
                PatternSpec::Group {
                    comment: None,
                    bind_object: bind_array.clone(),
                    children,
                }
            };
            PatternSpec::Repeat {
                comment,
                mode: mode.into(),
                bind_array,
                child: Box::new(child),
            }
        }
        RawElement::Or { comment, elements } => PatternSpec::Or {
            comment,
            children: lower_elements(elements)?,
        },
    })
}

fn lower_elements(raw: Vec<RawElement>) -> Result<Vec<PatternSpec>, JsonLoadError> {
    raw.into_iter().map(lower_element).collect()
}

/// Parse and lower a pattern JSON document into a [`PatternRootSpec`],
/// ready for [`docmatch_core::pattern::PatternRoot::build`].
pub fn load_pattern_spec(json: &str) -> Result<PatternRootSpec, JsonLoadError> {
    let raw: RawRoot = serde_json::from_str(json)?;
    Ok(PatternRootSpec {
        version: raw.version,
        name: raw.name,
        comment: raw.comment,
        bind_object: raw.bind_object.unwrap_or_default(),
        edit_distance: raw.edit_distance,
        children: lower_elements(raw.elements)?,
    })
}
