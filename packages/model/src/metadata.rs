use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shape::PropShape;
use crate::state::ComponentTree;
use crate::values::PropValues;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileMetadataKind {
    Component,
    Module,
}

/// One entry per markup source file, recording everything the tree parser
/// and writer need to know about it without re-reading the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub kind: FileMetadataKind,
    pub metadata_uuid: String,
    pub filepath: PathBuf,
    pub prop_shape: PropShape,
    /// Default initial prop values (component files).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_props: Option<PropValues>,
    /// Initial constructed tree (module files).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_component_tree: Option<ComponentTree>,
    pub css_imports: Vec<String>,
    /// Whether the component accepts child content.
    pub accepts_children: bool,
}

/// Read-only registry snapshot mapping tag names to file metadata.
///
/// Built deterministically before any file's markup is parsed; tag names
/// are resolved against it, so it must cover every component and module
/// file up front. Never mutated during a parsing pass.
#[derive(Debug, Clone, Default)]
pub struct MetadataSnapshot {
    by_name: HashMap<String, FileMetadata>,
    uuid_to_name: HashMap<String, String>,
}

impl MetadataSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component_name: impl Into<String>, metadata: FileMetadata) {
        let component_name = component_name.into();
        self.uuid_to_name
            .insert(metadata.metadata_uuid.clone(), component_name.clone());
        self.by_name.insert(component_name, metadata);
    }

    /// Resolves a tag name against the snapshot. `None` means the tag is
    /// not a known component or module.
    pub fn resolve(&self, tag_name: &str) -> Option<&FileMetadata> {
        self.by_name.get(tag_name)
    }

    pub fn by_uuid(&self, metadata_uuid: &str) -> Option<&FileMetadata> {
        self.uuid_to_name
            .get(metadata_uuid)
            .and_then(|name| self.by_name.get(name))
    }

    pub fn filepath_for_component(&self, component_name: &str) -> Option<&Path> {
        self.by_name
            .get(component_name)
            .map(|metadata| metadata.filepath.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileMetadata)> {
        self.by_name.iter()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
