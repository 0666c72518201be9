//! Writes component-tree state back into markup source files.
//!
//! Edits are span-based: the writer only rewrites the statements it
//! owns (returned markup, prop interface, `initialProps`, component
//! imports, the stream config) and copies everything else through
//! verbatim, so hand-written code in the same file survives.

pub mod component_file;
pub mod error;
pub mod render;
pub mod stream_config;
pub mod text_edit;

pub use component_file::{
    scaffold_component, scaffold_page, ComponentFileWriter, INITIAL_PROPS_VARIABLE_NAME,
};
pub use error::{WriteError, WriteResult};
pub use render::{render_component_tree, render_prop_interface, render_return_statement};
pub use stream_config::{collect_stream_fields, stream_config_edits};
pub use text_edit::{apply_edits, TextEdit};
