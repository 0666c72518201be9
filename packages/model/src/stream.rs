use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Name of the exported constant holding the stream configuration.
pub const STREAM_CONFIG_VARIABLE_NAME: &str = "config";
/// Declared type of the stream configuration constant.
pub const STREAM_CONFIG_VARIABLE_TYPE: &str = "TemplateConfig";
/// Declared type of a stream page's props.
pub const STREAM_PAGE_PROPS_TYPE: &str = "TemplateProps";
/// Package both stream types are imported from.
pub const PAGES_PACKAGE_NAME: &str = "@tracery/pages";
/// `$id` assigned to stream configs synthesized by the writer.
pub const STREAM_CONFIG_DEFAULT_ID: &str = "tracery-stream-id";
/// Name of the streaming-data root object inside page components.
pub const STREAM_DATA_ROOT: &str = "document";

/// Declarative block attached to page-level source files describing which
/// external data fields the page needs and how its source is filtered and
/// localized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub localization: StreamLocalization,
    /// Opaque entity filter, carried through verbatim.
    #[serde(default)]
    pub filter: serde_json::Value,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamLocalization {
    pub locales: Vec<String>,
    pub primary: bool,
}

impl Default for StreamLocalization {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string()],
            primary: false,
        }
    }
}

impl StreamConfig {
    /// The config synthesized when a page gains its first data dependency.
    pub fn synthesized() -> Self {
        Self {
            id: STREAM_CONFIG_DEFAULT_ID.to_string(),
            localization: StreamLocalization::default(),
            filter: serde_json::json!({}),
            fields: Vec::new(),
        }
    }
}

/// Whether a source fragment references the streaming-data object, e.g.
/// `document.title`.
pub fn is_streams_data_expression(value: &str) -> bool {
    value.starts_with("document.")
}

/// Whether a source fragment is a template string.
pub fn is_template_string(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('`') && value.ends_with('`')
}

/// Extracts every `${...}` interpolation body from a template string.
///
/// This is the one interpolation-marker contract of the expression grammar;
/// all template-string field extraction goes through it.
pub fn template_expressions(value: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\$\{(.*?)\}").unwrap());
    re.captures_iter(value)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Extracts the first path segment after the streaming-data root, e.g.
/// `document.address.line1` -> `address`. Sub-field and array-index access
/// are not representable in the stream configuration.
pub fn top_level_stream_field(expression: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^document\.([^\[.]+)").unwrap());
    re.captures(expression)
        .map(|captures| captures[1].to_string())
}

/// Merges previously-declared stream fields with newly discovered ones.
///
/// Previously-declared fields keep their order and are never dropped, even
/// when no longer referenced, since external consumers of the configuration may
/// depend on them. Discovered fields are appended in sorted order,
/// deduplicated.
pub fn merge_stream_fields(current: &[String], discovered: &BTreeSet<String>) -> Vec<String> {
    let mut merged: Vec<String> = current.to_vec();
    for field in discovered {
        if !merged.iter().any(|existing| existing == field) {
            merged.push(field.clone());
        }
    }
    merged
}
