//! Data model for Tracery component files.
//!
//! Everything the parser produces and the writer consumes lives here: the
//! value model (`PropVal`), declared prop shapes, the flat component-tree
//! representation, per-file metadata, and the stream-configuration types
//! with their expression grammar.

pub mod id_generator;
pub mod metadata;
pub mod missing_props;
pub mod shape;
pub mod state;
pub mod stream;
pub mod tree;
pub mod values;

pub use id_generator::{get_document_id, IdGenerator};
pub use metadata::{FileMetadata, FileMetadataKind, MetadataSnapshot};
pub use missing_props::missing_required_props;
pub use shape::{PropMetadata, PropShape, PropType};
pub use state::{
    BuiltInState, ComponentState, ComponentTree, ErrorComponentState, FragmentState,
    RepeatedComponent, RepeatedComponentKind, RepeaterState, StandardComponentState,
};
pub use stream::{
    is_streams_data_expression, is_template_string, merge_stream_fields, template_expressions,
    top_level_stream_field, StreamConfig, StreamLocalization, TemplateConfig, PAGES_PACKAGE_NAME,
    STREAM_CONFIG_DEFAULT_ID, STREAM_CONFIG_VARIABLE_NAME, STREAM_CONFIG_VARIABLE_TYPE,
    STREAM_DATA_ROOT, STREAM_PAGE_PROPS_TYPE,
};
pub use tree::{children_of, extract_repeated_state, map_component_tree};
pub use values::{ExpressionProp, LiteralProp, PropVal, PropValueType, PropValues};
