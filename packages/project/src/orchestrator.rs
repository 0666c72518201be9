use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracery_common::{CommonError, CommonResult, FileSystem};
use tracery_model::{
    get_document_id, ComponentTree, FileMetadata, FileMetadataKind, MetadataSnapshot, PropShape,
    PropValues,
};
use tracery_parser::{parse_component_tree, parse_prop_shape, parse_prop_values, Initializer,
    SourceFile};
use tracery_writer::{
    scaffold_component, scaffold_page, ComponentFileWriter, INITIAL_PROPS_VARIABLE_NAME,
};

use crate::config::ProjectConfig;

pub const MARKUP_EXTENSION: &str = "tsx";

/// Parsed state of one page file: its component tree plus the page's
/// own side-file style imports.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub component_tree: ComponentTree,
    pub css_imports: Vec<String>,
}

/// Owns the authoritative in-memory state for one project: the metadata
/// snapshot over component and module files, and the parsed tree per
/// page. The snapshot is fully rebuilt before any page is parsed, so
/// tag resolution never sees a half-populated registry.
pub struct Orchestrator<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    config: ProjectConfig,
    snapshot: MetadataSnapshot,
    pages: IndexMap<String, PageState>,
    errors: IndexMap<PathBuf, String>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            fs,
            root: root.into(),
            config,
            snapshot: MetadataSnapshot::new(),
            pages: IndexMap::new(),
            errors: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    pub fn pages(&self) -> &IndexMap<String, PageState> {
        &self.pages
    }

    pub fn page(&self, page_name: &str) -> Option<&PageState> {
        self.pages.get(page_name)
    }

    pub fn page_tree(&self, page_name: &str) -> Option<&ComponentTree> {
        self.pages.get(page_name).map(|state| &state.component_tree)
    }

    /// Per-file failures from the last scan, keyed by path. A failed
    /// file is excluded from the snapshot and page set; the rest of the
    /// project parses normally.
    pub fn errors(&self) -> &IndexMap<PathBuf, String> {
        &self.errors
    }

    /// Rebuild everything from the current file contents. Components
    /// are scanned first, then modules (whose initial trees resolve
    /// against component metadata), then pages.
    pub fn scan(&mut self) -> anyhow::Result<()> {
        self.snapshot = MetadataSnapshot::new();
        self.pages.clear();
        self.errors.clear();

        let components_dir = self.config.components_dir(&self.root);
        for path in self.markup_files(&components_dir)? {
            match read_file_metadata(self.fs, &path, FileMetadataKind::Component, &self.snapshot) {
                Ok((name, metadata)) => self.snapshot.insert(name, metadata),
                Err(err) => self.record_failure(path, err),
            }
        }

        let modules_dir = self.config.modules_dir(&self.root);
        for path in self.markup_files(&modules_dir)? {
            match read_file_metadata(self.fs, &path, FileMetadataKind::Module, &self.snapshot) {
                Ok((name, metadata)) => self.snapshot.insert(name, metadata),
                Err(err) => self.record_failure(path, err),
            }
        }

        let pages_dir = self.config.pages_dir(&self.root);
        for path in self.markup_files(&pages_dir)? {
            match self.parse_page(&path) {
                Ok((name, state)) => {
                    self.pages.insert(name, state);
                }
                Err(err) => self.record_failure(path, err),
            }
        }
        Ok(())
    }

    fn parse_page(&self, path: &Path) -> CommonResult<(String, PageState)> {
        let text = self.fs.read_to_string(path)?;
        let file = SourceFile::parse(path, text);
        let component_tree = parse_component_tree(&file, &self.snapshot)?;
        let state = PageState {
            component_tree,
            css_imports: file.css_imports(),
        };
        Ok((file_name(path), state))
    }

    /// Write a page's tree back to its source file, scaffolding the
    /// file when it does not exist yet. The cached tree is refreshed
    /// from the written text.
    pub fn write_page(&mut self, page_name: &str, tree: &ComponentTree) -> anyhow::Result<()> {
        let path = self
            .config
            .pages_dir(&self.root)
            .join(format!("{}.{}", page_name, MARKUP_EXTENSION));
        if !self.fs.exists(&path) {
            self.fs.write(&path, &scaffold_page(page_name))?;
        }
        let text = self.fs.read_to_string(&path)?;
        let file = with_default_export(&path, text, || scaffold_page(page_name));
        let out = ComponentFileWriter::new(&file, &self.snapshot)
            .update_page(tree, self.config.pages_js_repo)?;
        self.fs.write(&path, &out)?;

        let file = SourceFile::parse(&path, out);
        let state = PageState {
            component_tree: parse_component_tree(&file, &self.snapshot)?,
            css_imports: file.css_imports(),
        };
        self.pages.insert(page_name.to_string(), state);
        Ok(())
    }

    /// Write a component's prop shape, initial values, css imports, and
    /// (optionally) its tree, then refresh its snapshot entry.
    pub fn write_component(
        &mut self,
        component_name: &str,
        shape: &PropShape,
        initial_props: Option<&PropValues>,
        css_imports: &[String],
        tree: Option<&ComponentTree>,
    ) -> anyhow::Result<()> {
        let path = self
            .config
            .components_dir(&self.root)
            .join(format!("{}.{}", component_name, MARKUP_EXTENSION));
        if !self.fs.exists(&path) {
            self.fs.write(&path, &scaffold_component(component_name))?;
        }
        let text = self.fs.read_to_string(&path)?;
        let file = with_default_export(&path, text, || scaffold_component(component_name));
        let out = ComponentFileWriter::new(&file, &self.snapshot).update_component(
            component_name,
            shape,
            initial_props,
            css_imports,
            tree,
        )?;
        self.fs.write(&path, &out)?;

        let (name, metadata) =
            read_file_metadata(self.fs, &path, FileMetadataKind::Component, &self.snapshot)?;
        self.snapshot.insert(name, metadata);
        Ok(())
    }

    pub fn remove_page(&mut self, page_name: &str) -> anyhow::Result<()> {
        let path = self
            .config
            .pages_dir(&self.root)
            .join(format!("{}.{}", page_name, MARKUP_EXTENSION));
        self.fs.remove(&path)?;
        self.pages.shift_remove(page_name);
        Ok(())
    }

    /// Delete component and module files whose names are no longer in
    /// `active_names`, then rescan so the snapshot matches the tree on
    /// disk.
    pub fn sync_file_metadata(&mut self, active_names: &BTreeSet<String>) -> anyhow::Result<()> {
        let dirs = [
            self.config.components_dir(&self.root),
            self.config.modules_dir(&self.root),
        ];
        for dir in dirs {
            for path in self.markup_files(&dir)? {
                let name = file_name(&path);
                if !active_names.contains(&name) {
                    tracing::info!(path = %path.display(), "Removing markup file with no metadata entry");
                    self.fs.remove(&path)?;
                }
            }
        }
        self.scan()
    }

    fn markup_files(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        Ok(self
            .fs
            .list_files(dir)?
            .into_iter()
            .filter(|path| {
                path.extension().and_then(|e| e.to_str()) == Some(MARKUP_EXTENSION)
            })
            .collect())
    }

    fn record_failure(&mut self, path: PathBuf, err: CommonError) {
        tracing::error!(path = %path.display(), error = %err, "Failed to parse file");
        self.errors.insert(path, err.to_string());
    }
}

/// Parse `text`, appending a scaffold when the file has no default
/// export yet so regeneration always has a component function to work
/// against. Other default-export problems are left for the writer to
/// report.
fn with_default_export(
    path: &Path,
    text: String,
    scaffold: impl FnOnce() -> String,
) -> SourceFile {
    let file = SourceFile::parse(path, text);
    match file.default_exported_component() {
        Err(tracery_parser::ParseError::MissingDefaultExport { .. }) => {
            let existing = file.text().trim_end();
            let patched = if existing.is_empty() {
                scaffold()
            } else {
                format!("{}\n\n{}", existing, scaffold())
            };
            SourceFile::parse(path, patched)
        }
        _ => file,
    }
}

fn file_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read one markup file into its metadata entry. Module files also get
/// their initial tree, resolved against the snapshot built so far.
fn read_file_metadata(
    fs: &dyn FileSystem,
    path: &Path,
    kind: FileMetadataKind,
    snapshot: &MetadataSnapshot,
) -> CommonResult<(String, FileMetadata)> {
    let text = fs.read_to_string(path)?;
    let file = SourceFile::parse(path, text);
    let name = file_name(path);

    let prop_shape = parse_prop_shape(&file, &format!("{}Props", name))?.unwrap_or_default();
    let accepts_children = prop_shape.contains_key("children");
    let initial_props = read_initial_props(&file, &prop_shape)?;
    let initial_component_tree = match kind {
        FileMetadataKind::Module => Some(parse_component_tree(&file, snapshot)?),
        FileMetadataKind::Component => None,
    };

    let metadata = FileMetadata {
        kind,
        metadata_uuid: get_document_id(&path.display().to_string()),
        filepath: path.to_path_buf(),
        prop_shape,
        initial_props,
        initial_component_tree,
        css_imports: file.css_imports(),
        accepts_children,
    };
    Ok((name, metadata))
}

fn read_initial_props(
    file: &SourceFile,
    shape: &PropShape,
) -> CommonResult<Option<PropValues>> {
    let Some((decl, _)) = file.var_statement(INITIAL_PROPS_VARIABLE_NAME) else {
        return Ok(None);
    };
    let Initializer::ObjectLiteral(span) = &decl.initializer else {
        return Ok(None);
    };
    let values = parse_prop_values(file.slice(span), Some(shape))?;
    Ok(Some(values))
}
