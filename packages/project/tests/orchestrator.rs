use std::collections::BTreeSet;
use std::path::Path;

use tracery_common::{FileSystem, MockFileSystem, RealFileSystem};
use tracery_model::{ComponentState, FileMetadataKind, PropVal, PropValues, StandardComponentState};
use tracery_project::{Orchestrator, ProjectConfig};

const BANNER: &str = concat!(
    "import \"./Banner.css\";\n",
    "\n",
    "export interface BannerProps {\n",
    "  title?: string;\n",
    "  children?: React.ReactNode;\n",
    "}\n",
    "\n",
    "export const initialProps: BannerProps = {\n",
    "  title: \"hello\",\n",
    "};\n",
    "\n",
    "export default function Banner(props: BannerProps) {\n",
    "  return <div />;\n",
    "}\n",
);

const UNIVERSAL: &str = concat!(
    "import Banner from \"../components/Banner\";\n",
    "import \"./index.css\";\n",
    "\n",
    "const Universal = () => {\n",
    "  return (\n",
    "    <Banner title=\"hi\" />\n",
    "  );\n",
    "};\n",
    "\n",
    "export default Universal;\n",
);

const HERO_MODULE: &str = concat!(
    "export interface HeroProps {}\n",
    "\n",
    "const Hero = () => {\n",
    "  return (\n",
    "    <Banner title=\"hero\" />\n",
    "  );\n",
    "};\n",
    "\n",
    "export default Hero;\n",
);

fn project_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/project/src/components/Banner.tsx", BANNER);
    fs.add_file("/project/src/pages/Universal.tsx", UNIVERSAL);
    fs
}

fn orchestrator(fs: &MockFileSystem) -> Orchestrator<'_> {
    let config = ProjectConfig::load(fs, Path::new("/project")).unwrap();
    Orchestrator::new(fs, "/project", config)
}

fn banner_state(uuid: &str) -> ComponentState {
    let mut props = PropValues::new();
    props.insert("title".to_string(), PropVal::literal_string("hi"));
    ComponentState::Standard(StandardComponentState {
        component_name: "Banner".to_string(),
        props,
        uuid: uuid.to_string(),
        parent_uuid: None,
        metadata_uuid: String::new(),
    })
}

#[test]
fn test_scan_builds_snapshot_and_pages() {
    let fs = project_fs();
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    let banner = orchestrator.snapshot().resolve("Banner").unwrap();
    assert_eq!(banner.kind, FileMetadataKind::Component);
    assert!(banner.prop_shape.contains_key("title"));
    assert!(banner.accepts_children);
    assert_eq!(banner.css_imports, vec!["./Banner.css".to_string()]);
    let initial = banner.initial_props.as_ref().unwrap();
    assert_eq!(
        initial.get("title"),
        Some(&PropVal::literal_string("hello"))
    );

    let page = orchestrator.page("Universal").unwrap();
    assert_eq!(page.component_tree.len(), 1);
    assert!(
        matches!(&page.component_tree[0], ComponentState::Standard(s) if s.component_name == "Banner")
    );
    assert_eq!(page.css_imports, vec!["./index.css".to_string()]);
    assert!(orchestrator.errors().is_empty());
}

#[test]
fn test_module_files_get_initial_trees() {
    let fs = project_fs();
    fs.add_file("/project/src/modules/Hero.tsx", HERO_MODULE);
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    let hero = orchestrator.snapshot().resolve("Hero").unwrap();
    assert_eq!(hero.kind, FileMetadataKind::Module);
    let tree = hero.initial_component_tree.as_ref().unwrap();
    assert_eq!(tree.len(), 1);
    assert!(matches!(&tree[0], ComponentState::Standard(s) if s.component_name == "Banner"));
}

#[test]
fn test_one_bad_page_does_not_abort_the_scan() {
    let fs = project_fs();
    fs.add_file(
        "/project/src/pages/Broken.tsx",
        concat!(
            "const Broken = () => {\n",
            "  return <div>oops</div>;\n",
            "};\n",
            "\n",
            "export default Broken;\n",
        ),
    );
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    assert!(orchestrator.page_tree("Universal").is_some());
    assert!(orchestrator.page_tree("Broken").is_none());
    let errors = orchestrator.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors
        .get(Path::new("/project/src/pages/Broken.tsx"))
        .unwrap()
        .contains("JsxText"));
}

#[test]
fn test_write_page_scaffolds_missing_file() {
    let fs = project_fs();
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    let tree = vec![banner_state("u-1")];
    orchestrator.write_page("Fresh", &tree).unwrap();

    let written = fs
        .read_to_string(Path::new("/project/src/pages/Fresh.tsx"))
        .unwrap();
    assert!(written.contains("import Banner from \"../components/Banner\";"));
    assert!(written.contains("<Banner title=\"hi\" />"));
    assert!(written.contains("export default Fresh;"));
    assert_eq!(orchestrator.page_tree("Fresh").unwrap().len(), 1);
}

#[test]
fn test_write_page_synthesizes_missing_default_export() {
    let fs = project_fs();
    fs.add_file("/project/src/pages/Notes.tsx", "const helper = 1;\n");
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    let tree = vec![banner_state("u-1")];
    orchestrator.write_page("Notes", &tree).unwrap();

    let written = fs
        .read_to_string(Path::new("/project/src/pages/Notes.tsx"))
        .unwrap();
    assert!(written.contains("const helper = 1;"));
    assert!(written.contains("export default Notes;"));
    assert!(written.contains("<Banner title=\"hi\" />"));
}

#[test]
fn test_write_component_refreshes_snapshot() {
    let fs = project_fs();
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    let mut shape = orchestrator
        .snapshot()
        .resolve("Banner")
        .unwrap()
        .prop_shape
        .clone();
    shape.insert(
        "num".to_string(),
        tracery_model::PropMetadata::optional(tracery_model::PropType::Simple(
            tracery_model::PropValueType::Number,
        )),
    );
    let mut values = PropValues::new();
    values.insert("title".to_string(), PropVal::literal_string("fresh"));

    orchestrator
        .write_component(
            "Banner",
            &shape,
            Some(&values),
            &["./Banner.css".to_string(), "./theme.css".to_string()],
            None,
        )
        .unwrap();

    let banner = orchestrator.snapshot().resolve("Banner").unwrap();
    assert!(banner.prop_shape.contains_key("num"));
    assert_eq!(
        banner.initial_props.as_ref().unwrap().get("title"),
        Some(&PropVal::literal_string("fresh"))
    );
    // Merged, not duplicated
    assert_eq!(
        banner.css_imports,
        vec!["./Banner.css".to_string(), "./theme.css".to_string()]
    );
}

#[test]
fn test_sync_file_metadata_removes_stale_files() {
    let fs = project_fs();
    fs.add_file("/project/src/components/Old.tsx", BANNER);
    let mut orchestrator = orchestrator(&fs);
    orchestrator.scan().unwrap();

    let mut keep = BTreeSet::new();
    keep.insert("Banner".to_string());
    orchestrator.sync_file_metadata(&keep).unwrap();

    assert!(!fs.exists(Path::new("/project/src/components/Old.tsx")));
    assert!(fs.exists(Path::new("/project/src/components/Banner.tsx")));
    assert!(orchestrator.snapshot().resolve("Old").is_none());
}

#[test]
fn test_scan_on_a_real_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src/components")).unwrap();
    std::fs::create_dir_all(root.join("src/pages")).unwrap();
    std::fs::write(root.join("src/components/Banner.tsx"), BANNER).unwrap();
    std::fs::write(root.join("src/pages/Universal.tsx"), UNIVERSAL).unwrap();

    let fs = RealFileSystem;
    let config = ProjectConfig::load(&fs, root).unwrap();
    let mut orchestrator = Orchestrator::new(&fs, root, config);
    orchestrator.scan().unwrap();

    assert!(orchestrator.snapshot().resolve("Banner").is_some());
    assert_eq!(orchestrator.pages().len(), 1);
}
