//! Canonical text rendering for generated regions
//!
//! Everything the writer regenerates (returned markup, prop
//! interfaces, initial-prop constants, stream configuration) comes
//! through here, in one fixed format: two-space indent, double-quoted
//! strings, trailing commas in multi-line literals. Untouched regions
//! keep whatever formatting the file already had.

use tracery_model::{
    is_template_string, map_component_tree, ComponentState, ComponentTree, LiteralProp,
    PropMetadata, PropShape, PropType, PropVal, PropValueType, PropValues, StreamConfig,
    TemplateConfig,
};

pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape_string(value))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn member_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

pub fn indent_lines(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A prop value as a TypeScript expression, single line
pub fn render_prop_val(value: &PropVal) -> String {
    match value {
        PropVal::Literal(LiteralProp::String(s)) => quote(s),
        PropVal::Literal(LiteralProp::HexColor(s)) => quote(s),
        PropVal::Literal(LiteralProp::Number(n)) => format_number(*n),
        PropVal::Literal(LiteralProp::Boolean(b)) => b.to_string(),
        PropVal::Literal(LiteralProp::Object(values)) => render_object_inline(values),
        PropVal::Literal(LiteralProp::Array(items)) => {
            let items: Vec<String> = items.iter().map(render_prop_val).collect();
            format!("[{}]", items.join(", "))
        }
        PropVal::Expression(expr) => expr.value.clone(),
    }
}

fn render_object_inline(values: &PropValues) -> String {
    if values.is_empty() {
        return "{}".to_string();
    }
    let members: Vec<String> = values
        .iter()
        .map(|(key, value)| format!("{}: {}", member_key(key), render_prop_val(value)))
        .collect();
    format!("{{ {} }}", members.join(", "))
}

/// JSX attribute text, leading space included
fn render_attr(name: &str, value: &PropVal) -> String {
    match value {
        PropVal::Literal(LiteralProp::String(s)) | PropVal::Literal(LiteralProp::HexColor(s)) => {
            format!(" {}={}", name, quote(s))
        }
        other => format!(" {}={{{}}}", name, render_prop_val(other)),
    }
}

pub fn render_attrs(props: &PropValues) -> String {
    props
        .iter()
        .map(|(name, value)| render_attr(name, value))
        .collect()
}

/// Multi-line object literal for prop constants, two-space indented
pub fn render_object_literal(values: &PropValues) -> String {
    if values.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{\n");
    for (key, value) in values {
        out.push_str(&format!("  {}: {},\n", member_key(key), render_prop_val(value)));
    }
    out.push('}');
    out
}

fn ts_type_name(value_type: PropValueType) -> &'static str {
    match value_type {
        PropValueType::Number => "number",
        PropValueType::String => "string",
        PropValueType::Boolean => "boolean",
        PropValueType::HexColor => "HexColor",
        PropValueType::ReactNode => "React.ReactNode",
        PropValueType::Object => "Record<string, any>",
        PropValueType::Array => "unknown[]",
        PropValueType::Record => "Record<string, any>",
    }
}

pub fn render_prop_type(prop_type: &PropType) -> String {
    match prop_type {
        PropType::Simple(value_type) => ts_type_name(*value_type).to_string(),
        PropType::StringUnion(values) => values
            .iter()
            .map(|v| quote(v))
            .collect::<Vec<_>>()
            .join(" | "),
        PropType::Object(shape) => {
            let members: Vec<String> = shape
                .iter()
                .map(|(name, meta)| member_signature(name, meta))
                .collect();
            format!("{{ {} }}", members.join(" "))
        }
        PropType::Array(inner) => match inner.as_ref() {
            PropType::StringUnion(_) => format!("({})[]", render_prop_type(inner)),
            other => format!("{}[]", render_prop_type(other)),
        },
        PropType::Record => "Record<string, any>".to_string(),
    }
}

fn member_signature(name: &str, meta: &PropMetadata) -> String {
    let optional = if meta.required { "" } else { "?" };
    format!(
        "{}{}: {};",
        member_key(name),
        optional,
        render_prop_type(&meta.prop_type)
    )
}

/// `export interface ${Name}Props { ... }`. Members are written
/// optional so partially-filled props never fail the type checker.
pub fn render_prop_interface(interface_name: &str, shape: &PropShape) -> String {
    if shape.is_empty() {
        return format!("export interface {} {{}}", interface_name);
    }
    let mut out = format!("export interface {} {{\n", interface_name);
    for (name, meta) in shape {
        if let Some(doc) = &meta.doc {
            out.push_str(&render_doc_comment(doc, 2));
        }
        out.push_str(&format!(
            "  {}?: {};\n",
            member_key(name),
            render_prop_type(&meta.prop_type)
        ));
    }
    out.push('}');
    out
}

fn render_doc_comment(doc: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    if !doc.contains('\n') {
        return format!("{}/** {} */\n", pad, doc);
    }
    let mut out = format!("{}/**\n", pad);
    for line in doc.lines().skip_while(|l| l.is_empty()) {
        if line.is_empty() {
            out.push_str(&format!("{} *\n", pad));
        } else {
            out.push_str(&format!("{} * {}\n", pad, line));
        }
    }
    out.push_str(&format!("{} */\n", pad));
    out
}

/// A JSON value as TypeScript literal text. Objects go multi-line at
/// `indent`; scalar arrays stay inline. Template strings round-trip
/// verbatim.
pub fn render_ts_value(value: &serde_json::Value, indent: usize) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) if is_template_string(s) => s.clone(),
        serde_json::Value::String(s) => quote(s),
        serde_json::Value::Array(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| render_ts_value(item, indent + 2))
                .collect();
            if items.iter().all(|i| !i.is_object() && !i.is_array()) {
                format!("[{}]", rendered.join(", "))
            } else {
                let pad = " ".repeat(indent + 2);
                let close = " ".repeat(indent);
                let body: Vec<String> =
                    rendered.into_iter().map(|r| format!("{}{},", pad, r)).collect();
                format!("[\n{}\n{}]", body.join("\n"), close)
            }
        }
        serde_json::Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let pad = " ".repeat(indent + 2);
            let close = " ".repeat(indent);
            let members: Vec<String> = map
                .iter()
                .map(|(key, value)| {
                    format!("{}{}: {},", pad, member_key(key), render_ts_value(value, indent + 2))
                })
                .collect();
            format!("{{\n{}\n{}}}", members.join("\n"), close)
        }
    }
}

/// The full `export const config: TemplateConfig = { ... };` statement
pub fn render_config_statement(config: &TemplateConfig) -> String {
    let body = match &config.stream {
        Some(stream) => format!("{{\n  stream: {},\n}}", render_stream_config(stream, 2)),
        None => "{}".to_string(),
    };
    format!("export const config: TemplateConfig = {};", body)
}

fn render_stream_config(stream: &StreamConfig, indent: usize) -> String {
    let pad = " ".repeat(indent + 2);
    let close = " ".repeat(indent);
    let fields: Vec<String> = stream.fields.iter().map(|f| quote(f)).collect();
    let mut out = String::from("{\n");
    out.push_str(&format!("{}$id: {},\n", pad, quote(&stream.id)));
    out.push_str(&format!("{}localization: {{\n", pad));
    out.push_str(&format!(
        "{}  locales: [{}],\n",
        pad,
        stream
            .localization
            .locales
            .iter()
            .map(|l| quote(l))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!("{}  primary: {},\n", pad, stream.localization.primary));
    out.push_str(&format!("{}}},\n", pad));
    if !stream.filter.is_null() {
        out.push_str(&format!(
            "{}filter: {},\n",
            pad,
            render_ts_value(&stream.filter, indent + 2)
        ));
    }
    out.push_str(&format!("{}fields: [{}],\n", pad, fields.join(", ")));
    out.push_str(&format!("{}}}", close));
    out
}

/// Render a component tree back to JSX, one canonical format.
///
/// Error nodes are excluded from generation; a tree with several roots
/// gets wrapped in a fragment.
pub fn render_component_tree(tree: &ComponentTree) -> String {
    let roots: Vec<String> = map_component_tree(tree, &mut render_node)
        .into_iter()
        .filter(|text| !text.is_empty())
        .collect();
    match roots.len() {
        0 => "<></>".to_string(),
        1 => roots.into_iter().next().unwrap_or_default(),
        _ => format!("<>\n{}\n</>", indent_lines(&roots.join("\n"), 2)),
    }
}

fn render_node(state: &ComponentState, children: Vec<String>) -> String {
    let children: Vec<String> = children.into_iter().filter(|c| !c.is_empty()).collect();
    match state {
        ComponentState::Standard(s) | ComponentState::Module(s) => {
            render_element(&s.component_name, render_attrs(&s.props), &children)
        }
        ComponentState::BuiltIn(s) => {
            render_element(&s.component_name, String::new(), &children)
        }
        ComponentState::Fragment(_) => {
            if children.is_empty() {
                "<></>".to_string()
            } else {
                format!("<>\n{}\n</>", indent_lines(&children.join("\n"), 2))
            }
        }
        ComponentState::Repeater(r) => {
            let element = format!(
                "<{} key={{index}}{} />",
                r.repeated_component.component_name,
                render_attrs(&r.repeated_component.props)
            );
            format!(
                "{{{}.map((item, index) => (\n{}\n))}}",
                r.list_expression,
                indent_lines(&element, 2)
            )
        }
        ComponentState::Error(_) => String::new(),
    }
}

fn render_element(name: &str, attrs: String, children: &[String]) -> String {
    if children.is_empty() {
        format!("<{}{} />", name, attrs)
    } else {
        format!(
            "<{}{}>\n{}\n</{}>",
            name,
            attrs,
            indent_lines(&children.join("\n"), 2),
            name
        )
    }
}

/// The canonical return statement, starting at the `return` keyword.
/// Callers splice it at the original statement's indentation.
pub fn render_return_statement(tree: &ComponentTree) -> String {
    let body = render_component_tree(tree);
    if body == "<></>" && tree.is_empty() {
        return "return <></>;".to_string();
    }
    format!("return (\n{}\n  );", indent_lines(&body, 4))
}
