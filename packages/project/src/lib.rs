//! Project-level orchestration: config loading, the metadata snapshot
//! build over component and module directories, and per-file parse and
//! write routing with failure isolation.

pub mod config;
pub mod orchestrator;

pub use config::{ProjectConfig, ProjectPaths, CONFIG_FILE_NAME};
pub use orchestrator::{Orchestrator, PageState, MARKUP_EXTENSION};
