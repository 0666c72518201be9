//! Parse a file, write its tree back, and compare the bytes.
//!
//! Files already in the writer's canonical format must round-trip
//! byte-identically; anything else must converge after one write.

use tracery_model::{
    FileMetadata, FileMetadataKind, MetadataSnapshot, PropMetadata, PropShape, PropType,
    PropValueType,
};
use tracery_parser::{parse_component_tree, SourceFile};
use tracery_writer::ComponentFileWriter;

fn banner_shape() -> PropShape {
    let mut shape = PropShape::new();
    shape.insert(
        "title".to_string(),
        PropMetadata::optional(PropType::Simple(PropValueType::String)),
    );
    shape.insert(
        "num".to_string(),
        PropMetadata::optional(PropType::Simple(PropValueType::Number)),
    );
    shape.insert(
        "bgColor".to_string(),
        PropMetadata::optional(PropType::Simple(PropValueType::HexColor)),
    );
    shape
}

fn snapshot() -> MetadataSnapshot {
    let mut snapshot = MetadataSnapshot::new();
    snapshot.insert(
        "Banner",
        FileMetadata {
            kind: FileMetadataKind::Component,
            metadata_uuid: "meta-Banner".to_string(),
            filepath: "/project/src/components/Banner.tsx".into(),
            prop_shape: banner_shape(),
            initial_props: None,
            initial_component_tree: None,
            css_imports: Vec::new(),
            accepts_children: false,
        },
    );
    snapshot
}

fn rewrite(filepath: &str, source: &str, stream_enabled: bool) -> String {
    let snapshot = snapshot();
    let file = SourceFile::parse(filepath, source);
    let tree = parse_component_tree(&file, &snapshot).unwrap();
    ComponentFileWriter::new(&file, &snapshot)
        .update_page(&tree, stream_enabled)
        .unwrap()
}

#[test]
fn test_canonical_page_round_trips_byte_identically() {
    let source = concat!(
        "import Banner from \"../components/Banner\";\n",
        "\n",
        "const Universal = () => {\n",
        "  return (\n",
        "    <Banner title=\"hello\" num={3} bgColor=\"#abc123\" />\n",
        "  );\n",
        "};\n",
        "\n",
        "export default Universal;\n",
    );
    let out = rewrite("/project/src/pages/Universal.tsx", source, false);
    assert_eq!(out, source);
}

#[test]
fn test_canonical_repeater_page_round_trips_byte_identically() {
    let source = concat!(
        "import Banner from \"../components/Banner\";\n",
        "import { TemplateProps } from \"@tracery/pages\";\n",
        "\n",
        "const Universal = ({ document }: TemplateProps) => {\n",
        "  return (\n",
        "    <>\n",
        "      {document.services.map((item, index) => (\n",
        "        <Banner key={index} title={item.name} />\n",
        "      ))}\n",
        "    </>\n",
        "  );\n",
        "};\n",
        "\n",
        "export default Universal;\n",
    );
    let out = rewrite("/project/src/pages/Universal.tsx", source, false);
    assert_eq!(out, source);
}

#[test]
fn test_non_canonical_file_converges_after_one_write() {
    let source = concat!(
        "import Banner from \"../components/Banner\";\n",
        "\n",
        "const Universal = () => {\n",
        "  return <Banner   title=\"hello\"    num={3} />;\n",
        "};\n",
        "\n",
        "export default Universal;\n",
    );
    let first = rewrite("/project/src/pages/Universal.tsx", source, false);
    assert_ne!(first, source);
    let second = rewrite("/project/src/pages/Universal.tsx", &first, false);
    assert_eq!(second, first);
}

#[test]
fn test_unrelated_code_survives_rewrite() {
    let source = concat!(
        "import Banner from \"../components/Banner\";\n",
        "import { formatDate } from \"../utils/dates\";\n",
        "\n",
        "/** Hand-written helper kept out of the generated regions */\n",
        "function sortKeys(values: string[]): string[] {\n",
        "  return [...values].sort();\n",
        "}\n",
        "\n",
        "const Universal = () => {\n",
        "  return (\n",
        "    <Banner title=\"hello\" />\n",
        "  );\n",
        "};\n",
        "\n",
        "export default Universal;\n",
    );
    let out = rewrite("/project/src/pages/Universal.tsx", source, false);
    assert!(out.contains("import { formatDate } from \"../utils/dates\";"));
    assert!(out.contains("function sortKeys(values: string[]): string[] {"));
    assert!(out.contains("return [...values].sort();"));
}

#[test]
fn test_stream_config_synthesized_for_document_fields() {
    let source = concat!(
        "import Banner from \"../components/Banner\";\n",
        "\n",
        "const Universal = (props) => {\n",
        "  return (\n",
        "    <Banner title={document.name} />\n",
        "  );\n",
        "};\n",
        "\n",
        "export default Universal;\n",
    );
    let out = rewrite("/project/src/pages/Universal.tsx", source, true);
    assert!(out.contains("import { TemplateConfig, TemplateProps } from \"@tracery/pages\";"));
    assert!(out.contains("const Universal = ({ document }: TemplateProps) => {"));
    assert!(out.contains("export const config: TemplateConfig = {"));
    assert!(out.contains("fields: [\"name\"],"));
}

#[test]
fn test_stream_page_with_config_round_trips_byte_identically() {
    let source = concat!(
        "import Banner from \"../components/Banner\";\n",
        "import { TemplateConfig, TemplateProps } from \"@tracery/pages\";\n",
        "\n",
        "export const config: TemplateConfig = {\n",
        "  stream: {\n",
        "    $id: \"tracery-stream-id\",\n",
        "    localization: {\n",
        "      locales: [\"en\"],\n",
        "      primary: false,\n",
        "    },\n",
        "    fields: [\"name\"],\n",
        "  },\n",
        "};\n",
        "\n",
        "const Universal = ({ document }: TemplateProps) => {\n",
        "  return (\n",
        "    <Banner title={document.name} />\n",
        "  );\n",
        "};\n",
        "\n",
        "export default Universal;\n",
    );
    let out = rewrite("/project/src/pages/Universal.tsx", source, true);
    assert_eq!(out, source);
}
