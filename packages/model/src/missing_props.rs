use crate::shape::{PropMetadata, PropShape, PropType};
use crate::values::{LiteralProp, PropVal, PropValues};

/// Reports the dotted path of every required field whose value is absent,
/// recursing into nested object shapes.
///
/// Expression values are skipped: they are opaque and cannot be statically
/// verified against a nested shape. Literal array items are checked per
/// item against the declared item type.
pub fn missing_required_props(values: &PropValues, shape: &PropShape) -> Vec<String> {
    missing_at_path(values, shape, None)
}

fn missing_at_path(values: &PropValues, shape: &PropShape, path: Option<&str>) -> Vec<String> {
    shape
        .iter()
        .flat_map(|(prop_name, metadata)| {
            let prop_path = extend_field_path(path, prop_name);
            match values.get(prop_name) {
                None => {
                    if metadata.required {
                        vec![prop_path]
                    } else {
                        Vec::new()
                    }
                }
                Some(value) => missing_from_prop(value, metadata, &prop_path),
            }
        })
        .collect()
}

fn missing_from_prop(value: &PropVal, metadata: &PropMetadata, path: &str) -> Vec<String> {
    let literal = match value {
        PropVal::Expression(_) => return Vec::new(),
        PropVal::Literal(literal) => literal,
    };

    match (literal, &metadata.prop_type) {
        (LiteralProp::Array(items), PropType::Array(item_type)) => {
            let item_metadata = PropMetadata::required((**item_type).clone());
            items
                .iter()
                .flat_map(|item| missing_from_prop(item, &item_metadata, path))
                .collect()
        }
        (LiteralProp::Object(nested_values), PropType::Object(nested_shape)) => {
            missing_at_path(nested_values, nested_shape, Some(path))
        }
        _ => Vec::new(),
    }
}

fn extend_field_path(current: Option<&str>, prop_name: &str) -> String {
    match current {
        Some(path) => format!("{}.{}", path, prop_name),
        None => prop_name.to_string(),
    }
}
