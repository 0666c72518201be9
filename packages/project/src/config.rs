use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracery_common::FileSystem;

pub const CONFIG_FILE_NAME: &str = "tracery.config.json";

/// Project-level settings, read from `tracery.config.json` at the
/// project root. Every field has a default so the file is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub paths: ProjectPaths,
    /// Whether pages belong to a streaming-data repo. When set, page
    /// writes also maintain the stream config block.
    pub pages_js_repo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPaths {
    pub components: PathBuf,
    pub pages: PathBuf,
    pub modules: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            paths: ProjectPaths::default(),
            pages_js_repo: false,
        }
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            components: PathBuf::from("src/components"),
            pages: PathBuf::from("src/pages"),
            modules: PathBuf::from("src/modules"),
        }
    }
}

impl ProjectConfig {
    /// Load the config from `root`, falling back to defaults when the
    /// file is absent.
    pub fn load(fs: &dyn FileSystem, root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !fs.exists(&path) {
            return Ok(Self::default());
        }
        let text = fs
            .read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn components_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.components)
    }

    pub fn pages_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.pages)
    }

    pub fn modules_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.modules)
    }
}
