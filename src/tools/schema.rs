//! Parameter shapes and JSON Schema generation for catalog entries.
//!
//! A [`Param`] declares one argument: its name, [`Shape`], [`Rule`] and
//! description. The same declarations feed the published `inputSchema`
//! and the dispatcher's required-argument checks.

use serde_json::{Map, Value, json};

/// Suffix appended to every identifier description.
pub const ID_SUFFIX: &str = " (uuidv4)";

/// Values accepted by the `format` argument every tool carries.
pub const FORMAT_VALUES: &[&str] = &["markdown", "json"];

/// How a parameter participates in validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Listed as required and checked at call time.
    Required,
    Optional,
    /// Listed as required so that clients rejecting empty `required`
    /// arrays accept the tool; never checked at call time.
    Placeholder,
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Opaque identifier string. Shape is not validated here.
    Id,
    Text,
    Number,
    /// String restricted to the listed values.
    Enum(&'static [&'static str]),
    /// Either the named JSON type or `null`.
    Nullable(&'static str),
    /// Object with the listed properties (free-form when empty).
    Object(&'static [Param]),
    Array(&'static Shape),
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub shape: Shape,
    pub rule: Rule,
    pub description: &'static str,
}

impl Param {
    pub const fn required(name: &'static str, shape: Shape, description: &'static str) -> Self {
        Self {
            name,
            shape,
            rule: Rule::Required,
            description,
        }
    }

    pub const fn optional(name: &'static str, shape: Shape, description: &'static str) -> Self {
        Self {
            name,
            shape,
            rule: Rule::Optional,
            description,
        }
    }

    pub const fn placeholder(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            shape: Shape::Text,
            rule: Rule::Placeholder,
            description,
        }
    }

    /// Nested property without a description.
    pub const fn field(name: &'static str, shape: Shape) -> Self {
        Self::optional(name, shape, "")
    }

    /// Whether the parameter appears in the schema's `required` list.
    pub fn listed_required(&self) -> bool {
        matches!(self.rule, Rule::Required | Rule::Placeholder)
    }

    /// JSON Schema fragment for this parameter.
    pub fn schema(&self) -> Value {
        let description = match (self.description, self.shape) {
            ("", _) => None,
            (d, Shape::Id) => Some(format!("{d}{ID_SUFFIX}")),
            (d, _) => Some(d.to_string()),
        };
        Value::Object(self.shape.schema(description))
    }
}

impl Shape {
    /// JSON type name as it appears in the schema's `type` keyword.
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Id | Shape::Text | Shape::Enum(_) => "string",
            Shape::Number => "number",
            Shape::Nullable(inner) => *inner,
            Shape::Object(_) => "object",
            Shape::Array(_) => "array",
        }
    }

    /// Schema object with `type` first and the description right after it.
    fn schema(&self, description: Option<String>) -> Map<String, Value> {
        let mut obj = Map::new();
        let ty = match self {
            Shape::Nullable(inner) => json!([inner, "null"]),
            _ => json!(self.type_name()),
        };
        obj.insert("type".into(), ty);
        if let Some(d) = description {
            obj.insert("description".into(), Value::String(d));
        }
        match self {
            Shape::Id | Shape::Text | Shape::Number | Shape::Nullable(_) => {}
            Shape::Enum(values) => {
                obj.insert("enum".into(), json!(values));
            }
            Shape::Object(props) => {
                if !props.is_empty() {
                    obj.insert("properties".into(), properties(props));
                    let required = required_names(props);
                    if !required.is_empty() {
                        obj.insert("required".into(), json!(required));
                    }
                }
            }
            Shape::Array(item) => {
                obj.insert("items".into(), Value::Object(item.schema(None)));
            }
        }
        obj
    }
}

/// `properties` object for a parameter list, in declaration order.
pub fn properties(params: &[Param]) -> Value {
    let mut props = Map::new();
    for p in params {
        props.insert(p.name.to_string(), p.schema());
    }
    Value::Object(props)
}

pub fn required_names(params: &[Param]) -> Vec<&'static str> {
    params
        .iter()
        .filter(|p| p.listed_required())
        .map(|p| p.name)
        .collect()
}

/// The `format` selector shared by every tool.
pub fn format_param_schema() -> Value {
    json!({
        "type": "string",
        "description": "Format of the response. Use 'markdown' for converted content or 'json' for raw API response.",
        "enum": FORMAT_VALUES,
        "default": "markdown",
    })
}

/* ---- Shared fragments ---- */

const RICH_TEXT_CONTENT: &[Param] = &[
    Param::field("content", Shape::Text),
    Param::field("link", Shape::Nullable("object")),
];

const RICH_TEXT_PROPS: &[Param] = &[
    Param::field("type", Shape::Enum(&["text", "mention", "equation"])),
    Param::field("text", Shape::Object(RICH_TEXT_CONTENT)),
    Param::field("annotations", Shape::Object(&[])),
    Param::field("plain_text", Shape::Text),
    Param::field("href", Shape::Nullable("string")),
];

/// A Notion rich text object.
pub const RICH_TEXT: Shape = Shape::Object(RICH_TEXT_PROPS);

const BLOCK_PROPS: &[Param] = &[
    Param::field("object", Shape::Enum(&["block"])),
    Param::required("type", Shape::Text, ""),
];

/// A Notion block object; only `type` is required.
pub const BLOCK: Shape = Shape::Object(BLOCK_PROPS);

pub const SORT_DIRECTION: Shape = Shape::Enum(&["ascending", "descending"]);
