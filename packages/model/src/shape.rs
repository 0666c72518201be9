use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::values::PropValueType;

/// Declared type contract for a component's configurable values, keyed by
/// prop name in declaration order.
pub type PropShape = IndexMap<String, PropMetadata>;

/// One entry of a prop shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropMetadata {
    pub prop_type: PropType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl PropMetadata {
    pub fn required(prop_type: PropType) -> Self {
        Self {
            prop_type,
            required: true,
            doc: None,
        }
    }

    pub fn optional(prop_type: PropType) -> Self {
        Self {
            prop_type,
            required: false,
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// The closed set of declarable prop types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropType {
    /// number | string | boolean | HexColor | ReactNode
    Simple(PropValueType),
    /// A union of string literals, collapsed to a string type carrying the
    /// allowed values.
    StringUnion(Vec<String>),
    /// Nested object literal type.
    Object(PropShape),
    /// Homogeneous array with a declared item type.
    Array(Box<PropType>),
    /// `Record<string, any>`-style open mapping.
    Record,
}

impl PropType {
    pub fn value_type(&self) -> PropValueType {
        match self {
            PropType::Simple(value_type) => *value_type,
            PropType::StringUnion(_) => PropValueType::String,
            PropType::Object(_) => PropValueType::Object,
            PropType::Array(_) => PropValueType::Array,
            PropType::Record => PropValueType::Record,
        }
    }

    pub fn union_values(&self) -> Option<&[String]> {
        match self {
            PropType::StringUnion(values) => Some(values),
            _ => None,
        }
    }

    pub fn object_shape(&self) -> Option<&PropShape> {
        match self {
            PropType::Object(shape) => Some(shape),
            _ => None,
        }
    }
}
