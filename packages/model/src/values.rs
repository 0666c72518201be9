use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prop name -> value mapping. Insertion order is preserved so that
/// regenerated source keeps the author's prop ordering.
pub type PropValues = IndexMap<String, PropVal>;

/// The closed set of value types a prop can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropValueType {
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "boolean")]
    Boolean,
    HexColor,
    ReactNode,
    Object,
    Array,
    Record,
}

impl PropValueType {
    /// Maps a source-level type name to a value type, if it is one of the
    /// recognized primitives.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "HexColor" => Some(Self::HexColor),
            "ReactNode" | "React.ReactNode" => Some(Self::ReactNode),
            _ => None,
        }
    }
}

/// A prop's value: either a concrete literal or an opaque source expression
/// evaluated at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropVal {
    Literal(LiteralProp),
    Expression(ExpressionProp),
}

/// Concrete literal values. Object and Array literals recursively contain
/// further `PropVal`s; an expression nested inside them stays opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LiteralProp {
    Number(f64),
    String(String),
    Boolean(bool),
    /// 6-hex-digit color string, e.g. `#ffffff`.
    HexColor(String),
    Object(PropValues),
    Array(Vec<PropVal>),
}

/// An opaque source-text fragment, tagged with the type it evaluates to.
/// The text is never re-interpreted as a nested structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionProp {
    pub value_type: PropValueType,
    pub value: String,
}

impl PropVal {
    pub fn literal_string(value: impl Into<String>) -> Self {
        PropVal::Literal(LiteralProp::String(value.into()))
    }

    pub fn literal_number(value: f64) -> Self {
        PropVal::Literal(LiteralProp::Number(value))
    }

    pub fn literal_boolean(value: bool) -> Self {
        PropVal::Literal(LiteralProp::Boolean(value))
    }

    pub fn expression(value_type: PropValueType, value: impl Into<String>) -> Self {
        PropVal::Expression(ExpressionProp {
            value_type,
            value: value.into(),
        })
    }

    pub fn value_type(&self) -> PropValueType {
        match self {
            PropVal::Literal(literal) => literal.value_type(),
            PropVal::Expression(expression) => expression.value_type,
        }
    }

    pub fn as_expression(&self) -> Option<&ExpressionProp> {
        match self {
            PropVal::Expression(expression) => Some(expression),
            PropVal::Literal(_) => None,
        }
    }
}

impl LiteralProp {
    pub fn value_type(&self) -> PropValueType {
        match self {
            LiteralProp::Number(_) => PropValueType::Number,
            LiteralProp::String(_) => PropValueType::String,
            LiteralProp::Boolean(_) => PropValueType::Boolean,
            LiteralProp::HexColor(_) => PropValueType::HexColor,
            LiteralProp::Object(_) => PropValueType::Object,
            LiteralProp::Array(_) => PropValueType::Array,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(
            PropVal::literal_string("hi").value_type(),
            PropValueType::String
        );
        assert_eq!(
            PropVal::Literal(LiteralProp::HexColor("#abcdef".to_string())).value_type(),
            PropValueType::HexColor
        );
        assert_eq!(
            PropVal::expression(PropValueType::Array, "document.services").value_type(),
            PropValueType::Array
        );
    }

    #[test]
    fn test_from_type_name() {
        assert_eq!(
            PropValueType::from_type_name("number"),
            Some(PropValueType::Number)
        );
        assert_eq!(
            PropValueType::from_type_name("React.ReactNode"),
            Some(PropValueType::ReactNode)
        );
        assert_eq!(PropValueType::from_type_name("ColorProp"), None);
    }
}
