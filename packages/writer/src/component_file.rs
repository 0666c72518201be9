//! Per-file writer for component and page sources
//!
//! Each update re-reads the file through [`SourceFile`], computes span
//! edits for the regions the model owns (the returned markup, the prop
//! interface, `initialProps`, imports, stream config), and splices
//! them. Statements the model does not own are never touched.

use crate::error::{WriteError, WriteResult};
use crate::render;
use crate::stream_config;
use crate::text_edit::{apply_edits, TextEdit};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracery_model::{ComponentState, ComponentTree, MetadataSnapshot, PropShape, PropValues};
use tracery_parser::SourceFile;

pub const INITIAL_PROPS_VARIABLE_NAME: &str = "initialProps";

pub struct ComponentFileWriter<'a> {
    file: &'a SourceFile,
    snapshot: &'a MetadataSnapshot,
}

impl<'a> ComponentFileWriter<'a> {
    pub fn new(file: &'a SourceFile, snapshot: &'a MetadataSnapshot) -> Self {
        Self { file, snapshot }
    }

    /// Full page update: returned markup, imports, and (when enabled)
    /// the stream configuration.
    pub fn update_page(&self, tree: &ComponentTree, stream_enabled: bool) -> WriteResult<String> {
        let mut edits = self.returned_tree_edits(tree)?;
        edits.extend(self.import_edits(tree)?);
        if stream_enabled {
            edits.extend(stream_config::stream_config_edits(self.file, tree)?);
        }
        apply_edits(self.file.text(), edits)
    }

    /// Full component update: prop interface, optional initial props,
    /// side-file style imports, and (when given) the returned markup
    /// with its imports.
    pub fn update_component(
        &self,
        component_name: &str,
        shape: &PropShape,
        initial_props: Option<&PropValues>,
        css_imports: &[String],
        tree: Option<&ComponentTree>,
    ) -> WriteResult<String> {
        let interface_name = format!("{}Props", component_name);
        let mut edits = self.prop_interface_edits(&interface_name, shape)?;
        edits.extend(self.param_edits(&interface_name, shape)?);
        if let Some(values) = initial_props {
            edits.extend(self.initial_props_edits(&interface_name, values)?);
        }
        edits.extend(self.css_import_edits(css_imports));
        if let Some(tree) = tree {
            edits.extend(self.returned_tree_edits(tree)?);
            edits.extend(self.import_edits(tree)?);
        }
        apply_edits(self.file.text(), edits)
    }

    /// Replace the component function's returned markup with the
    /// canonical rendering of `tree`.
    pub fn returned_tree_edits(&self, tree: &ComponentTree) -> WriteResult<Vec<TextEdit>> {
        let func = self.file.default_exported_component()?;
        let statement = render::render_return_statement(tree);

        if !func.braced {
            // Concise arrow body: the body is the returned expression itself
            let body = render::render_component_tree(tree);
            return Ok(vec![TextEdit::replace(
                func.body_span,
                format!("(\n{}\n  )", render::indent_lines(&body, 4)),
            )]);
        }

        match self.file.return_statement(&func) {
            Some(ret) => Ok(vec![TextEdit::replace(ret.span, statement)]),
            None => {
                // No return yet: add one just before the closing brace
                let at = func.body_span.end - 1;
                let needs_newline = !self.file.text()[..at].ends_with('\n');
                let prefix = if needs_newline { "\n" } else { "" };
                Ok(vec![TextEdit::insert(
                    at,
                    format!("{}  {}\n", prefix, statement),
                )])
            }
        }
    }

    /// Reconcile default imports of component files with the tree:
    /// imports of known components that are no longer used are removed,
    /// missing ones are added after the import block. Imports the
    /// snapshot does not recognize are left alone.
    pub fn import_edits(&self, tree: &ComponentTree) -> WriteResult<Vec<TextEdit>> {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        for state in tree {
            match state {
                ComponentState::Standard(s) | ComponentState::Module(s) => {
                    used.insert(&s.component_name);
                }
                ComponentState::Repeater(r) => {
                    used.insert(&r.repeated_component.component_name);
                }
                _ => {}
            }
        }

        let mut edits = Vec::new();
        let mut imported: BTreeSet<&str> = BTreeSet::new();
        for (decl, statement) in self.file.imports() {
            for name in &decl.named_imports {
                imported.insert(name);
            }
            let Some(name) = &decl.default_import else {
                continue;
            };
            imported.insert(name);
            if !decl.source.starts_with("./") && !decl.source.starts_with("../") {
                continue;
            }
            if used.contains(name.as_str()) || self.snapshot.resolve(name).is_none() {
                continue;
            }
            let mut span = statement.span.clone();
            if self.file.text()[span.end..].starts_with('\n') {
                span.end += 1;
            }
            edits.push(TextEdit::delete(span));
        }

        let mut additions = String::new();
        for name in &used {
            if imported.contains(name) {
                continue;
            }
            let Some(path) = self.snapshot.filepath_for_component(name) else {
                return Err(WriteError::UnknownComponent {
                    component_name: name.to_string(),
                });
            };
            additions.push_str(&format!(
                "import {} from \"{}\";\n",
                name,
                relative_import(self.file.filepath(), path)
            ));
        }
        if !additions.is_empty() {
            edits.push(TextEdit::insert(
                stream_config::insertion_point_after_imports(self.file),
                additions,
            ));
        }
        Ok(edits)
    }

    /// Merge side-file style imports into the import block; sources the
    /// file already imports are left as they are.
    pub fn css_import_edits(&self, css_imports: &[String]) -> Vec<TextEdit> {
        let existing = self.file.css_imports();
        let mut additions = String::new();
        for source in css_imports {
            if !existing.contains(source) {
                additions.push_str(&format!("import \"{}\";\n", source));
            }
        }
        if additions.is_empty() {
            Vec::new()
        } else {
            vec![TextEdit::insert(
                stream_config::insertion_point_after_imports(self.file),
                additions,
            )]
        }
    }

    /// Regenerate `export interface ${Name}Props`, inserting it above
    /// the component function when the file has none.
    pub fn prop_interface_edits(
        &self,
        interface_name: &str,
        shape: &PropShape,
    ) -> WriteResult<Vec<TextEdit>> {
        let text = render::render_prop_interface(interface_name, shape);
        match self.file.interface_statement(interface_name) {
            Some(statement) => Ok(vec![TextEdit::replace(statement.span.clone(), text)]),
            None => {
                let func = self.file.default_exported_component()?;
                Ok(vec![TextEdit::insert(
                    func.statement_span.start,
                    format!("{}\n\n", text),
                )])
            }
        }
    }

    /// Type the component function's parameter list against the prop
    /// interface, destructured by the shape's keys. Parameters already
    /// typed against it are left alone so body references survive.
    pub fn param_edits(&self, interface_name: &str, shape: &PropShape) -> WriteResult<Vec<TextEdit>> {
        let func = self.file.default_exported_component()?;
        let params = self.file.slice(&func.params_span);
        if params.contains(interface_name) {
            return Ok(Vec::new());
        }
        let replacement = if shape.is_empty() {
            format!("(props: {})", interface_name)
        } else {
            let keys: Vec<&str> = shape.keys().map(String::as_str).collect();
            format!("({{ {} }}: {})", keys.join(", "), interface_name)
        };
        Ok(vec![TextEdit::replace(func.params_span, replacement)])
    }

    /// Regenerate `export const initialProps`, inserting it above the
    /// component function when the file has none.
    pub fn initial_props_edits(
        &self,
        interface_name: &str,
        values: &PropValues,
    ) -> WriteResult<Vec<TextEdit>> {
        let text = format!(
            "export const {}: {} = {};",
            INITIAL_PROPS_VARIABLE_NAME,
            interface_name,
            render::render_object_literal(values)
        );
        match self.file.var_statement(INITIAL_PROPS_VARIABLE_NAME) {
            Some((_, statement)) => Ok(vec![TextEdit::replace(statement.span.clone(), text)]),
            None => {
                let func = self.file.default_exported_component()?;
                Ok(vec![TextEdit::insert(
                    func.statement_span.start,
                    format!("{}\n\n", text),
                )])
            }
        }
    }
}

/// Starting source for a page file that has no markup yet
pub fn scaffold_page(component_name: &str) -> String {
    format!(
        "const {0} = () => {{\n  return <></>;\n}};\n\nexport default {0};\n",
        component_name
    )
}

/// Starting source for a component file
pub fn scaffold_component(component_name: &str) -> String {
    format!(
        "export interface {0}Props {{}}\n\nexport default function {0}(props: {0}Props) {{\n  return <></>;\n}}\n",
        component_name
    )
}

fn relative_import(from_file: &Path, to_file: &Path) -> String {
    let from_dir = from_file.parent().unwrap_or_else(|| Path::new(""));
    let rel = relative_path(from_dir, to_file);
    let text = rel.to_string_lossy();
    let text = text.strip_suffix(".tsx").unwrap_or(&text);
    if text.starts_with('.') {
        text.to_string()
    } else {
        format!("./{}", text)
    }
}

fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from_dir.components().collect();
    let to: Vec<_> = to.components().collect();
    let mut shared = 0;
    while shared < from.len() && shared < to.len() && from[shared] == to[shared] {
        shared += 1;
    }
    let mut out = PathBuf::new();
    for _ in shared..from.len() {
        out.push("..");
    }
    for component in &to[shared..] {
        out.push(component.as_os_str());
    }
    out
}
