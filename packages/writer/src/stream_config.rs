//! Stream configuration maintenance for page files
//!
//! Scans a page's component tree for `document.*` data dependencies and
//! keeps the page's exported `config` constant in sync: fields already
//! declared are never dropped, newly discovered fields are appended in
//! sorted order, and a page that gains its first dependency gets a
//! synthesized config, the `TemplateConfig`/`TemplateProps` imports,
//! and a destructured `document` parameter.

use crate::error::{WriteError, WriteResult};
use crate::render;
use crate::text_edit::TextEdit;
use std::collections::BTreeSet;
use tracery_model::{
    is_streams_data_expression, is_template_string, merge_stream_fields, template_expressions,
    top_level_stream_field, ComponentState, ComponentTree, LiteralProp, PropVal, StreamConfig,
    TemplateConfig, PAGES_PACKAGE_NAME, STREAM_CONFIG_VARIABLE_NAME, STREAM_CONFIG_VARIABLE_TYPE,
    STREAM_DATA_ROOT, STREAM_PAGE_PROPS_TYPE,
};
use tracery_parser::SourceFile;

/// Top-level `document.*` fields referenced anywhere in the tree:
/// expression props, template-string interpolations, and repeater list
/// expressions.
pub fn collect_stream_fields(tree: &ComponentTree) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    for state in tree {
        if let ComponentState::Repeater(repeater) = state {
            collect_from_expression(&repeater.list_expression, &mut fields);
        }
        if let Some(props) = state.props() {
            for value in props.values() {
                collect_from_prop_val(value, &mut fields);
            }
        }
    }
    fields
}

fn collect_from_prop_val(value: &PropVal, fields: &mut BTreeSet<String>) {
    match value {
        PropVal::Expression(expr) => collect_from_expression(&expr.value, fields),
        PropVal::Literal(LiteralProp::Object(values)) => {
            for nested in values.values() {
                collect_from_prop_val(nested, fields);
            }
        }
        PropVal::Literal(LiteralProp::Array(items)) => {
            for item in items {
                collect_from_prop_val(item, fields);
            }
        }
        PropVal::Literal(_) => {}
    }
}

fn collect_from_expression(expression: &str, fields: &mut BTreeSet<String>) {
    if is_template_string(expression) {
        for interpolation in template_expressions(expression) {
            if is_streams_data_expression(&interpolation) {
                fields.extend(top_level_stream_field(&interpolation));
            }
        }
    } else if is_streams_data_expression(expression) {
        fields.extend(top_level_stream_field(expression));
    }
}

/// Edits that bring the page's stream configuration up to date with
/// `tree`. Empty when the page neither uses stream data nor already
/// declares a config.
pub fn stream_config_edits(file: &SourceFile, tree: &ComponentTree) -> WriteResult<Vec<TextEdit>> {
    let discovered = collect_stream_fields(tree);

    let existing = file.exported_object_literal(STREAM_CONFIG_VARIABLE_NAME)?;
    if discovered.is_empty() && existing.is_none() {
        return Ok(Vec::new());
    }

    let mut config: TemplateConfig = match existing {
        Some(value) => serde_json::from_value(value).map_err(|err| {
            WriteError::InvalidStreamConfig {
                message: err.to_string(),
            }
        })?,
        None => TemplateConfig::default(),
    };
    let mut stream = config.stream.take().unwrap_or_else(StreamConfig::synthesized);
    stream.fields = merge_stream_fields(&stream.fields, &discovered);
    config.stream = Some(stream);

    let statement_text = render::render_config_statement(&config);
    let mut edits = Vec::new();

    match file.var_statement(STREAM_CONFIG_VARIABLE_NAME) {
        Some((_, statement)) => {
            edits.push(TextEdit::replace(statement.span.clone(), statement_text));
        }
        None => {
            let at = insertion_point_after_imports(file);
            edits.push(TextEdit::insert(at, format!("\n{}\n", statement_text)));
        }
    }

    edits.extend(pages_import_edit(file));

    if !discovered.is_empty() {
        edits.extend(document_param_edit(file)?);
    }

    Ok(edits)
}

/// Ensure `TemplateConfig` and `TemplateProps` are imported from the
/// pages package.
fn pages_import_edit(file: &SourceFile) -> Option<TextEdit> {
    let wanted = [STREAM_CONFIG_VARIABLE_TYPE, STREAM_PAGE_PROPS_TYPE];
    match file.import_of(PAGES_PACKAGE_NAME) {
        Some((decl, statement)) => {
            let mut names = decl.named_imports.clone();
            let mut changed = false;
            for name in wanted {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                    changed = true;
                }
            }
            changed.then(|| {
                TextEdit::replace(
                    statement.span.clone(),
                    format!(
                        "import {{ {} }} from \"{}\";",
                        names.join(", "),
                        PAGES_PACKAGE_NAME
                    ),
                )
            })
        }
        None => Some(TextEdit::insert(
            0,
            format!(
                "import {{ {}, {} }} from \"{}\";\n",
                STREAM_CONFIG_VARIABLE_TYPE, STREAM_PAGE_PROPS_TYPE, PAGES_PACKAGE_NAME
            ),
        )),
    }
}

/// Give the component function a destructured `document` parameter when
/// it does not already have one.
fn document_param_edit(file: &SourceFile) -> WriteResult<Option<TextEdit>> {
    let func = file.default_exported_component()?;
    let params = file.slice(&func.params_span);
    if params.contains(STREAM_DATA_ROOT) {
        return Ok(None);
    }
    Ok(Some(TextEdit::replace(
        func.params_span,
        format!("({{ {} }}: {})", STREAM_DATA_ROOT, STREAM_PAGE_PROPS_TYPE),
    )))
}

pub(crate) fn insertion_point_after_imports(file: &SourceFile) -> usize {
    let last_import_end = file
        .imports()
        .map(|(_, statement)| statement.span.end)
        .max();
    match last_import_end {
        Some(end) => {
            // Past the import's trailing newline, if present
            if file.text()[end..].starts_with('\n') {
                end + 1
            } else {
                end
            }
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_edit::apply_edits;
    use tracery_model::{
        ExpressionProp, PropValueType, PropValues, RepeatedComponent, RepeatedComponentKind,
        RepeaterState, StandardComponentState,
    };

    fn expr_component(props: &[(&str, &str)]) -> ComponentTree {
        let mut values = PropValues::new();
        for (name, value) in props {
            values.insert(
                name.to_string(),
                PropVal::Expression(ExpressionProp {
                    value_type: PropValueType::String,
                    value: value.to_string(),
                }),
            );
        }
        vec![ComponentState::Standard(StandardComponentState {
            component_name: "Banner".to_string(),
            props: values,
            uuid: "u-0".to_string(),
            parent_uuid: None,
            metadata_uuid: "meta-banner".to_string(),
        })]
    }

    #[test]
    fn test_collects_direct_and_template_fields() {
        let tree = expr_component(&[
            ("title", "document.title"),
            ("line", "`${document.address.line1}, ${document.city}`"),
            ("other", "siteSettings.name"),
        ]);

        let fields = collect_stream_fields(&tree);
        assert_eq!(
            fields.into_iter().collect::<Vec<_>>(),
            vec!["address", "city", "title"]
        );
    }

    #[test]
    fn test_collects_repeater_list_expression() {
        let tree = vec![ComponentState::Repeater(RepeaterState {
            uuid: "u-0".to_string(),
            parent_uuid: None,
            list_expression: "document.services".to_string(),
            repeated_component: RepeatedComponent {
                kind: RepeatedComponentKind::Standard,
                component_name: "Card".to_string(),
                props: PropValues::new(),
                metadata_uuid: "meta-card".to_string(),
            },
        })];

        assert!(collect_stream_fields(&tree).contains("services"));
    }

    #[test]
    fn test_collection_is_independent_of_sibling_order() {
        let repeater = ComponentState::Repeater(RepeaterState {
            uuid: "u-9".to_string(),
            parent_uuid: None,
            list_expression: "document.items".to_string(),
            repeated_component: RepeatedComponent {
                kind: RepeatedComponentKind::Standard,
                component_name: "Card".to_string(),
                props: PropValues::new(),
                metadata_uuid: "meta-card".to_string(),
            },
        });
        let banner = expr_component(&[
            ("title", "document.a"),
            ("line", "`${document.b}-${document.c}`"),
        ])
        .pop()
        .unwrap();

        let forward = collect_stream_fields(&vec![banner.clone(), repeater.clone()]);
        let reverse = collect_stream_fields(&vec![repeater, banner]);
        let expected: Vec<_> = vec!["a", "b", "c", "items"];
        assert_eq!(forward.iter().collect::<Vec<_>>(), expected);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_no_fields_no_config_no_edits() {
        let file = SourceFile::parse(
            "/pages/Plain.tsx",
            "const Page = () => <div />;\nexport default Page;\n",
        );

        let edits = stream_config_edits(&file, &Vec::new()).unwrap();
        assert!(edits.is_empty());
    }

    #[test]
    fn test_synthesizes_config_import_and_param() {
        let src = concat!(
            "import Banner from \"../components/Banner\";\n",
            "\n",
            "const Page = () => {\n",
            "  return (\n",
            "    <Banner />\n",
            "  );\n",
            "};\n",
            "\n",
            "export default Page;\n",
        );
        let file = SourceFile::parse("/pages/Universal.tsx", src);
        let tree = expr_component(&[("title", "document.title")]);

        let out = apply_edits(
            file.text(),
            stream_config_edits(&file, &tree).unwrap(),
        )
        .unwrap();

        assert!(out.contains("import { TemplateConfig, TemplateProps } from \"@tracery/pages\";"));
        assert!(out.contains("export const config: TemplateConfig = {"));
        assert!(out.contains("fields: [\"title\"],"));
        assert!(out.contains("$id: \"tracery-stream-id\","));
        assert!(out.contains("const Page = ({ document }: TemplateProps) => {"));
    }

    #[test]
    fn test_merges_without_dropping_declared_fields() {
        let src = concat!(
            "import { TemplateConfig, TemplateProps } from \"@tracery/pages\";\n",
            "\n",
            "export const config: TemplateConfig = {\n",
            "  stream: {\n",
            "    $id: \"existing-stream\",\n",
            "    localization: {\n",
            "      locales: [\"en\", \"fr\"],\n",
            "      primary: false,\n",
            "    },\n",
            "    filter: {},\n",
            "    fields: [\"zeta\", \"alpha\"],\n",
            "  },\n",
            "};\n",
            "\n",
            "const Page = ({ document }: TemplateProps) => {\n",
            "  return (\n",
            "    <div />\n",
            "  );\n",
            "};\n",
            "\n",
            "export default Page;\n",
        );
        let file = SourceFile::parse("/pages/Universal.tsx", src);
        let tree = expr_component(&[("a", "document.beta"), ("b", "document.alpha")]);

        let out = apply_edits(
            file.text(),
            stream_config_edits(&file, &tree).unwrap(),
        )
        .unwrap();

        // Declared order kept, new field appended sorted, nothing dropped
        assert!(out.contains("fields: [\"zeta\", \"alpha\", \"beta\"],"));
        assert!(out.contains("$id: \"existing-stream\","));
        assert!(out.contains("locales: [\"en\", \"fr\"],"));
    }

    #[test]
    fn test_existing_config_kept_when_fields_gone() {
        let src = concat!(
            "import { TemplateConfig } from \"@tracery/pages\";\n",
            "\n",
            "export const config: TemplateConfig = {\n",
            "  stream: {\n",
            "    $id: \"existing-stream\",\n",
            "    localization: {\n",
            "      locales: [\"en\"],\n",
            "      primary: false,\n",
            "    },\n",
            "    filter: {},\n",
            "    fields: [\"title\"],\n",
            "  },\n",
            "};\n",
            "\n",
            "const Page = () => {\n",
            "  return (\n",
            "    <div />\n",
            "  );\n",
            "};\n",
            "\n",
            "export default Page;\n",
        );
        let file = SourceFile::parse("/pages/Universal.tsx", src);

        let out = apply_edits(
            file.text(),
            stream_config_edits(&file, &Vec::new()).unwrap(),
        )
        .unwrap();

        assert!(out.contains("fields: [\"title\"],"));
    }

    #[test]
    fn test_malformed_config_errors() {
        let src = concat!(
            "export const config: TemplateConfig = {\n",
            "  stream: {\n",
            "    $id: \"s\",\n",
            "    localization: \"not-an-object\",\n",
            "    filter: {},\n",
            "    fields: [],\n",
            "  },\n",
            "};\n",
            "const Page = () => <div />;\n",
            "export default Page;\n",
        );
        let file = SourceFile::parse("/pages/Universal.tsx", src);
        let tree = expr_component(&[("title", "document.title")]);

        let err = stream_config_edits(&file, &tree).unwrap_err();
        assert!(matches!(err, WriteError::InvalidStreamConfig { .. }));
    }
}
