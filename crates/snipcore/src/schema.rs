use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of kinds a port or parameter can declare.
///
/// `Passthrough` is the opaque fallback: no coercion, no validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeTag {
    ShortText,
    LongText,
    Integer,
    Float,
    Boolean,
    Url,
    Date,
    SchemaRef,
    Passthrough,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::ShortText => "short-text",
            TypeTag::LongText => "long-text",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Url => "url",
            TypeTag::Date => "date",
            TypeTag::SchemaRef => "json-schema-ref",
            TypeTag::Passthrough => "passthrough",
        };
        f.write_str(name)
    }
}

/// Typed descriptor for a single input, output, or parameter.
///
/// Names are unique within their port group; inputs, outputs, and
/// parameters are three independent namespaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSchema {
    pub name: String,
    pub kind: TypeTag,
    pub required: bool,
}

impl PortSchema {
    pub fn required(name: impl Into<String>, kind: TypeTag) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: TypeTag) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}
